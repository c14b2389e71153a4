//! Density-driven spacing between grid cells and relationship rows.

use crate::config::SpacingConfig;
use crate::ir::ErGraph;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spacing {
    /// Horizontal gap between entity columns.
    pub h: f64,
    /// Vertical distance between entity rows.
    pub v: f64,
    /// Drop from the lower endpoint to a relationship diamond.
    pub rel: f64,
}

/// Denser entities get wider columns; more relationships get more room
/// below each row. Attribute counts are capped so spacing stays bounded.
pub fn plan_spacing(graph: &ErGraph, cfg: &SpacingConfig) -> Spacing {
    let max_attrs = graph
        .entities
        .iter()
        .map(|e| graph.attributes_of(&e.name).count())
        .max()
        .unwrap_or(0);
    let rel_count = graph.relationships.len();

    Spacing {
        h: cfg.h_base + max_attrs.min(cfg.h_attribute_cap) as f64 * cfg.h_per_attribute,
        v: cfg.v_base + max_attrs.min(cfg.v_attribute_cap) as f64 * cfg.v_per_attribute,
        rel: cfg.rel_base + rel_count as f64 * cfg.rel_per_relationship,
    }
}
