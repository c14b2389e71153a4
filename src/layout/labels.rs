//! Cardinality symbols along entity–relationship edges.

use std::collections::HashMap;

use log::debug;

use crate::config::{LabelConfig, LayoutConfig};
use crate::geometry::Point;
use crate::measure::TextMetrics;
use crate::schema::Cardinality;

use super::types::{CardinalityLabel, LabelAnchor, Node, NodeKind, Plate};

/// Place a symbol pair for every cardinality whose two entities and
/// connecting relationship are all present.
///
/// The relationship is the first one whose endpoints match the pair in
/// either order. Plates are sized per pair and may overlap plates of other
/// pairs.
pub fn place_labels(
    nodes: &[Node],
    cardinalities: &[Cardinality],
    cfg: &LayoutConfig,
) -> Vec<CardinalityLabel> {
    let entities: HashMap<&str, &Node> = nodes
        .iter()
        .filter(|n| n.is_entity())
        .map(|n| (n.id.as_str(), n))
        .collect();
    let metrics = TextMetrics::new(cfg.labels.char_width);

    cardinalities
        .iter()
        .filter_map(|card| {
            let from = entities.get(card.from.as_str()).copied()?;
            let to = entities.get(card.to.as_str()).copied()?;
            let rel = find_relationship(nodes, &card.from, &card.to)?;
            let mut symbols = card.kind.split(':');
            let (Some(from_symbol), Some(to_symbol)) = (symbols.next(), symbols.next()) else {
                debug!(kind = card.kind.as_str(); "Skipping cardinality without separator");
                return None;
            };

            let text_width = metrics.max_width([from_symbol, to_symbol]);
            let anchor = |entity: &Node, text: &str| {
                let position = entity.position().lerp(rel.position(), cfg.labels.fraction);
                LabelAnchor {
                    text: text.to_string(),
                    position,
                    plate: plate(position, text_width, &cfg.labels),
                }
            };

            Some(CardinalityLabel {
                relationship: rel.id.clone(),
                from: anchor(from, from_symbol),
                to: anchor(to, to_symbol),
            })
        })
        .collect()
}

fn find_relationship<'a>(nodes: &'a [Node], a: &str, b: &str) -> Option<&'a Node> {
    let mut matches = nodes.iter().filter(|n| match &n.kind {
        NodeKind::Relationship { from, to, .. } => {
            (from == a && to == b) || (from == b && to == a)
        }
        _ => false,
    });
    let first = matches.next()?;
    if matches.next().is_some() {
        debug!(
            from = a, to = b, relationship = first.id.as_str();
            "Several relationships join this pair; labelling the first"
        );
    }
    Some(first)
}

fn plate(center: Point, text_width: f64, cfg: &LabelConfig) -> Plate {
    Plate {
        x: center.x - text_width / 2.0 - cfg.plate_padding,
        y: center.y - cfg.plate_half_height - cfg.plate_padding,
        width: text_width + cfg.plate_padding * 2.0,
        height: cfg.plate_half_height * 2.0 + cfg.plate_padding * 2.0,
        radius: cfg.plate_radius,
    }
}
