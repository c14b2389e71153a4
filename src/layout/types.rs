//! Data structures produced by the layout pipeline.

use std::fmt;

use serde::Serialize;

use crate::config::LayoutConfig;
use crate::geometry::{Point, Shape};
use crate::ir::AttributeRole;
use crate::schema::Cardinality;

/// A positioned diagram element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub x: f64,
    pub y: f64,
    #[serde(flatten)]
    pub kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum NodeKind {
    #[serde(rename_all = "camelCase")]
    Entity { is_weak: bool },
    Attribute(AttributeFlags),
    RelAttribute(AttributeFlags),
    #[serde(rename_all = "camelCase")]
    Relationship {
        is_identifying: bool,
        /// Endpoint entity names, used to match cardinalities.
        from: String,
        to: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AttributeFlags {
    #[serde(rename = "isPK")]
    pub is_pk: bool,
    #[serde(rename = "isMV")]
    pub is_mv: bool,
    #[serde(rename = "isDerived")]
    pub is_derived: bool,
    #[serde(rename = "isComposite")]
    pub is_composite: bool,
}

impl From<AttributeRole> for AttributeFlags {
    fn from(role: AttributeRole) -> Self {
        Self {
            is_pk: role == AttributeRole::PrimaryKey,
            is_mv: role == AttributeRole::MultiValued,
            is_derived: role == AttributeRole::Derived,
            is_composite: false,
        }
    }
}

impl NodeKind {
    pub fn shape(&self, cfg: &LayoutConfig) -> Shape {
        match self {
            NodeKind::Entity { .. } => Shape::Rect {
                width: cfg.entity.width,
                height: cfg.entity.height,
            },
            NodeKind::Relationship { .. } => Shape::Diamond {
                width: cfg.relationship.width,
                height: cfg.relationship.height,
            },
            NodeKind::Attribute(_) | NodeKind::RelAttribute(_) => Shape::Ellipse {
                rx: cfg.attribute_rx,
                ry: cfg.attribute_ry,
            },
        }
    }
}

impl Node {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn set_position(&mut self, p: Point) {
        self.x = p.x;
        self.y = p.y;
    }

    pub fn shape(&self, cfg: &LayoutConfig) -> Shape {
        self.kind.shape(cfg)
    }

    pub fn is_entity(&self) -> bool {
        matches!(self.kind, NodeKind::Entity { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub source: String,
    pub target: String,
    pub is_dashed: bool,
}

impl Link {
    pub fn solid(source: &str, target: &str) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            is_dashed: false,
        }
    }

    pub fn dashed(source: &str, target: &str) -> Self {
        Self {
            is_dashed: true,
            ..Self::solid(source, target)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewBox {
    pub min_x: f64,
    pub min_y: f64,
    pub width: f64,
    pub height: f64,
}

/// Formats as an SVG `viewBox` attribute value.
impl fmt::Display for ViewBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.min_x, self.min_y, self.width, self.height)
    }
}

/// Rounded rectangle drawn behind a cardinality symbol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Plate {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub radius: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelAnchor {
    pub text: String,
    pub position: Point,
    pub plate: Plate,
}

/// The pair of cardinality symbols placed on one relationship's two edges.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardinalityLabel {
    pub relationship: String,
    pub from: LabelAnchor,
    pub to: LabelAnchor,
}

/// The complete layout result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResult {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
    pub view_box: ViewBox,
    /// Schema cardinalities, carried through unchanged.
    pub cardinalities: Vec<Cardinality>,
    pub labels: Vec<CardinalityLabel>,
}

impl LayoutResult {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }
}
