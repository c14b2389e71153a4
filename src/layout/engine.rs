//! Layout engine core implementation.

use log::{debug, info};

use crate::config::LayoutConfig;
use crate::ir::ErGraph;
use crate::schema::Schema;

use super::labels::place_labels;
use super::placement::place;
use super::spacing::plan_spacing;
use super::types::LayoutResult;
use super::viewport::compute_viewport;

/// Layout engine configuration and computation.
///
/// The engine holds no state between runs; identical input always yields
/// identical coordinates.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    pub(crate) config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Compute the layout for a schema, or `None` when it has no entities.
    pub fn layout(&self, schema: &Schema) -> Option<LayoutResult> {
        if schema.entities.is_empty() {
            debug!("Schema has no entities, nothing to lay out");
            return None;
        }
        self.layout_graph(&ErGraph::from_schema(schema))
    }

    pub fn layout_graph(&self, graph: &ErGraph) -> Option<LayoutResult> {
        if graph.entities.is_empty() {
            return None;
        }

        // Phase 1: Spacing from schema density
        let spacing = plan_spacing(graph, &self.config.spacing);
        debug!(
            entities = graph.entities.len(),
            h_spacing = spacing.h,
            v_spacing = spacing.v,
            rel_spacing = spacing.rel;
            "Planned spacing"
        );

        // Phase 2: Node placement
        let placement = place(graph, &spacing, &self.config);

        // Phase 3: Viewport
        let view_box = compute_viewport(&placement.nodes, &self.config)?;

        // Phase 4: Cardinality labels
        let labels = place_labels(&placement.nodes, &graph.cardinalities, &self.config);

        info!(
            nodes = placement.nodes.len(),
            links = placement.links.len(),
            labels = labels.len();
            "Layout computed"
        );

        Some(LayoutResult {
            nodes: placement.nodes,
            links: placement.links,
            view_box,
            cardinalities: graph.cardinalities.clone(),
            labels,
        })
    }
}
