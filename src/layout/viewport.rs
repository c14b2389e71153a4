use crate::config::LayoutConfig;
use crate::geometry::Bounds;

use super::types::{Node, ViewBox};

/// Bounding box of every node footprint, padded on all sides.
///
/// Returns `None` when there is nothing to frame.
pub fn compute_viewport(nodes: &[Node], cfg: &LayoutConfig) -> Option<ViewBox> {
    let mut bounds = Bounds::default();
    for node in nodes {
        bounds.include(node.position(), &node.shape(cfg));
    }
    if bounds.is_empty() {
        return None;
    }

    Some(ViewBox {
        min_x: bounds.min_x - cfg.padding,
        min_y: bounds.min_y - cfg.padding,
        width: bounds.max_x - bounds.min_x + cfg.padding * 2.0,
        height: bounds.max_y - bounds.min_y + cfg.padding * 2.0,
    })
}
