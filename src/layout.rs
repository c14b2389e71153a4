//! Layout pipeline: spacing, placement, viewport and cardinality labels.

mod engine;
mod labels;
mod placement;
mod spacing;
mod types;
mod viewport;

pub use engine::LayoutEngine;
pub use labels::place_labels;
pub use placement::{Placement, place};
pub use spacing::{Spacing, plan_spacing};
pub use types::{
    AttributeFlags, CardinalityLabel, LabelAnchor, LayoutResult, Link, Node, NodeKind, Plate,
    ViewBox,
};
pub use viewport::compute_viewport;
