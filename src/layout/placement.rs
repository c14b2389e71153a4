//! Node placement: entity grid, attribute columns, composite fans,
//! relationship diamonds and their attributes.

use std::collections::HashMap;

use log::debug;

use crate::config::LayoutConfig;
use crate::geometry::Point;
use crate::ir::{AttributeIR, EntityIR, ErGraph, RelationshipIR};

use super::spacing::Spacing;
use super::types::{AttributeFlags, Link, Node, NodeKind};

/// Nodes and links in placement order.
#[derive(Debug, Clone, Default)]
pub struct Placement {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

/// Ordered node list that refuses duplicate ids (first one wins).
#[derive(Default)]
struct NodeSet {
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
}

impl NodeSet {
    fn insert(&mut self, node: Node) -> bool {
        if self.index.contains_key(&node.id) {
            debug!(id = node.id.as_str(); "Skipping node with duplicate id");
            return false;
        }
        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        true
    }

    fn position(&self, id: &str) -> Option<Point> {
        self.index.get(id).map(|&i| self.nodes[i].position())
    }
}

/// Assign coordinates to every node the graph produces.
///
/// Items that reference a missing entity, or whose id collides with an
/// already placed node, are left out together with their descendants.
pub fn place(graph: &ErGraph, spacing: &Spacing, cfg: &LayoutConfig) -> Placement {
    let mut set = NodeSet::default();
    let mut links = Vec::new();

    let entity_ids = place_entities(graph, spacing, cfg, &mut set);
    let entity_pos: HashMap<&str, Point> = entity_ids
        .iter()
        .filter_map(|id| set.position(id).map(|p| (id.as_str(), p)))
        .collect();

    for id in &entity_ids {
        let origin = entity_pos[id.as_str()];
        let attrs: Vec<&AttributeIR> = graph.attributes_of(id).collect();
        place_attribute_column(id, origin, &attrs, cfg, &mut set, &mut links);
    }

    for (index, rel) in graph.relationships.iter().enumerate() {
        let (Some(&from), Some(&to)) = (
            entity_pos.get(rel.from.as_str()),
            entity_pos.get(rel.to.as_str()),
        ) else {
            debug!(
                label = rel.label.as_str(), from = rel.from.as_str(), to = rel.to.as_str();
                "Skipping relationship with unknown endpoint"
            );
            continue;
        };
        place_relationship(index, rel, from, to, spacing, cfg, &mut set, &mut links);
    }

    Placement {
        nodes: set.nodes,
        links,
    }
}

/// Row-major grid; returns the ids of the entities actually placed.
fn place_entities(
    graph: &ErGraph,
    spacing: &Spacing,
    cfg: &LayoutConfig,
    set: &mut NodeSet,
) -> Vec<String> {
    let mut unique: Vec<&EntityIR> = Vec::new();
    for entity in &graph.entities {
        if unique.iter().any(|e| e.name == entity.name) {
            debug!(name = entity.name.as_str(); "Skipping duplicate entity");
            continue;
        }
        unique.push(entity);
    }

    let per_row = cfg.entities_per_row.min(unique.len()).max(1);
    let cell_width = cfg.entity.width + spacing.h;

    let mut placed = Vec::with_capacity(unique.len());
    for (i, entity) in unique.into_iter().enumerate() {
        let col = (i % per_row) as f64;
        let row = (i / per_row) as f64;
        let inserted = set.insert(Node {
            id: entity.name.clone(),
            label: entity.name.clone(),
            x: cfg.padding + col * cell_width,
            y: cfg.padding + row * spacing.v,
            kind: NodeKind::Entity {
                is_weak: entity.is_weak,
            },
        });
        if inserted {
            placed.push(entity.name.clone());
        }
    }
    placed
}

/// Stack attributes in a column right of the entity, centered on its y.
fn place_attribute_column(
    entity_id: &str,
    origin: Point,
    attrs: &[&AttributeIR],
    cfg: &LayoutConfig,
    set: &mut NodeSet,
    links: &mut Vec<Link>,
) {
    let step = cfg.attribute_ry * 2.0 + cfg.attribute_gap;
    let column_height = attrs.len() as f64 * step;
    let top = origin.y - column_height / 2.0 + cfg.attribute_ry;
    let x = origin.x + cfg.entity.width / 2.0 + cfg.attribute_rx + cfg.attribute_gap;

    for (i, attr) in attrs.iter().enumerate() {
        let id = format!("{}-{}", entity_id, attr.key);
        let flags = AttributeFlags {
            is_composite: attr.components.is_some(),
            ..AttributeFlags::from(attr.role)
        };
        let pos = Point::new(x, top + i as f64 * step);
        let inserted = set.insert(Node {
            id: id.clone(),
            label: attr.label.clone(),
            x: pos.x,
            y: pos.y,
            kind: NodeKind::Attribute(flags),
        });
        if !inserted {
            continue;
        }
        links.push(Link::solid(&id, entity_id));

        if let Some(components) = &attr.components {
            place_components(&id, pos, components, cfg, set, links);
        }
    }
}

/// Fan composite parts out horizontally above their attribute.
///
/// Part ids carry their position (`E-address#0-street`), so repeated part
/// names and entity attributes with a matching name never collide.
fn place_components(
    parent_id: &str,
    parent: Point,
    components: &[String],
    cfg: &LayoutConfig,
    set: &mut NodeSet,
    links: &mut Vec<Link>,
) {
    let center = (components.len() as f64 - 1.0) / 2.0;
    let fan = cfg.attribute_rx * cfg.component_fan;
    let y = parent.y - cfg.attribute_ry - cfg.component_lift;

    for (j, component) in components.iter().enumerate() {
        let id = format!("{}#{}-{}", parent_id, j, component);
        let inserted = set.insert(Node {
            id: id.clone(),
            label: component.clone(),
            x: parent.x + (j as f64 - center) * fan,
            y,
            kind: NodeKind::Attribute(AttributeFlags::default()),
        });
        if inserted {
            links.push(Link::solid(&id, parent_id));
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn place_relationship(
    index: usize,
    rel: &RelationshipIR,
    from: Point,
    to: Point,
    spacing: &Spacing,
    cfg: &LayoutConfig,
    set: &mut NodeSet,
    links: &mut Vec<Link>,
) {
    let id = format!("{}-{}", rel.label, index);
    let pos = Point::new(
        (from.x + to.x) / 2.0,
        from.y.max(to.y) + spacing.rel + index as f64 * cfg.relationship_stagger,
    );
    let inserted = set.insert(Node {
        id: id.clone(),
        label: rel.label.clone(),
        x: pos.x,
        y: pos.y,
        kind: NodeKind::Relationship {
            is_identifying: rel.is_identifying,
            from: rel.from.clone(),
            to: rel.to.clone(),
        },
    });
    if !inserted {
        return;
    }
    links.push(Link::solid(&id, &rel.from));
    links.push(Link::solid(&id, &rel.to));

    let top = pos.y + cfg.relationship.height / 2.0 + cfg.attribute_ry + cfg.attribute_gap;
    for (j, attr) in rel.attributes.iter().enumerate() {
        let attr_id = format!("{}-{}", id, attr.key);
        let inserted = set.insert(Node {
            id: attr_id.clone(),
            label: attr.label.clone(),
            x: pos.x,
            y: top + j as f64 * cfg.rel_attribute_step,
            kind: NodeKind::RelAttribute(attr.role.into()),
        });
        if inserted {
            links.push(Link::dashed(&attr_id, &id));
        }
    }
}
