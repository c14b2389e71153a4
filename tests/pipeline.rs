use chenerd::config::LayoutConfig;
use chenerd::geometry::Point;
use chenerd::interact::{Canvas, Event, Response};
use chenerd::layout::{LayoutEngine, LayoutResult, NodeKind};
use chenerd::schema::Schema;

const UNIVERSITY: &str = r#"{
    "entities": [{"name": "Student"}, {"name": "Course"}],
    "attributes": [{"entity": "Student", "attribute": "PK_student_id"}],
    "relationships": [
        {"from": "Student", "to": "Course", "label": "enrolls", "isIdentifying": false, "attributes": ["grade"]}
    ],
    "cardinalities": [{"from": "Student", "to": "Course", "type": "M:N"}]
}"#;

fn layout(json: &str) -> LayoutResult {
    let schema = Schema::from_json(json).unwrap();
    LayoutEngine::default().layout(&schema).unwrap()
}

fn assert_close(actual: Point, x: f64, y: f64) {
    assert!(
        (actual.x - x).abs() < 1e-9 && (actual.y - y).abs() < 1e-9,
        "expected ({x}, {y}), got ({}, {})",
        actual.x,
        actual.y
    );
}

#[test]
fn student_course_end_to_end() {
    let result = layout(UNIVERSITY);

    let entities: Vec<_> = result.nodes.iter().filter(|n| n.is_entity()).collect();
    assert_eq!(entities.len(), 2);
    assert_close(result.node("Student").unwrap().position(), 80.0, 80.0);
    assert_close(result.node("Course").unwrap().position(), 430.0, 80.0);

    let attr = result.node("Student-PK_student_id").unwrap();
    assert_eq!(attr.label, "student_id");
    match &attr.kind {
        NodeKind::Attribute(flags) => {
            assert!(flags.is_pk);
            assert!(!flags.is_mv && !flags.is_derived && !flags.is_composite);
        }
        other => panic!("unexpected kind {other:?}"),
    }
    assert_close(attr.position(), 245.0, 70.0);

    let rel = result.node("enrolls-0").unwrap();
    assert_eq!(rel.label, "enrolls");
    assert_close(rel.position(), 255.0, 240.0);

    let grade = result.node("enrolls-0-grade").unwrap();
    assert!(matches!(grade.kind, NodeKind::RelAttribute(_)));
    assert_close(grade.position(), 255.0, 310.0);

    assert_eq!(result.nodes.len(), 5);
    assert_eq!(result.links.len(), 4);
    let dashed: Vec<_> = result.links.iter().filter(|l| l.is_dashed).collect();
    assert_eq!(dashed.len(), 1);
    assert_eq!(dashed[0].source, "enrolls-0-grade");
    assert_eq!(dashed[0].target, "enrolls-0");

    assert_eq!(result.labels.len(), 1);
    let label = &result.labels[0];
    assert_eq!(label.relationship, "enrolls-0");
    assert_eq!(label.from.text, "M");
    assert_eq!(label.to.text, "N");
    assert_close(label.from.position, 150.0, 144.0);
    assert_close(label.to.position, 360.0, 144.0);
}

#[test]
fn viewport_encloses_every_shape() {
    let result = layout(UNIVERSITY);
    let vb = result.view_box;
    assert_eq!(vb.min_x, -70.0);
    assert_eq!(vb.min_y, -35.0);
    assert_eq!(vb.width, 650.0);
    assert_eq!(vb.height, 450.0);

    let cfg = LayoutConfig::default();
    for node in &result.nodes {
        let (hw, hh) = node.shape(&cfg).half_extents();
        assert!(node.x - hw >= vb.min_x + cfg.padding - 1e-9, "{} escapes left", node.id);
        assert!(node.y - hh >= vb.min_y + cfg.padding - 1e-9, "{} escapes top", node.id);
        assert!(node.x + hw <= vb.min_x + vb.width - cfg.padding + 1e-9);
        assert!(node.y + hh <= vb.min_y + vb.height - cfg.padding + 1e-9);
    }
}

#[test]
fn layout_is_deterministic() {
    let first = serde_json::to_string(&layout(UNIVERSITY)).unwrap();
    let second = serde_json::to_string(&layout(UNIVERSITY)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn links_reference_existing_nodes() {
    let result = layout(
        r#"{
            "entities": [{"name": "A"}, {"name": "B"}, {"name": "C", "isWeak": true}],
            "attributes": [
                {"entity": "A", "attribute": "PK_id"},
                {"entity": "A", "attribute": "address", "components": ["street", "city"]},
                {"entity": "Ghost", "attribute": "x"}
            ],
            "relationships": [
                {"from": "A", "to": "B", "label": "r", "attributes": ["since"]},
                {"from": "B", "to": "C", "label": "owns", "isIdentifying": true},
                {"from": "A", "to": "Ghost", "label": "haunts"}
            ],
            "cardinalities": [
                {"from": "A", "to": "B", "type": "1:N"},
                {"from": "A", "to": "Ghost", "type": "1:1"}
            ]
        }"#,
    );

    for link in &result.links {
        assert!(result.node(&link.source).is_some(), "dangling source {}", link.source);
        assert!(result.node(&link.target).is_some(), "dangling target {}", link.target);
    }

    let mut ids: Vec<_> = result.nodes.iter().map(|n| n.id.as_str()).collect();
    let total = ids.len();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), total);

    assert!(result.node("haunts-2").is_none());
    assert!(result.nodes.iter().all(|n| !n.id.starts_with("Ghost")));
    assert_eq!(result.labels.len(), 1);
}

#[test]
fn duplicate_attributes_collapse() {
    let result = layout(
        r#"{
            "entities": [{"name": "A"}],
            "attributes": [
                {"entity": "A", "attribute": "name"},
                {"entity": "A", "attribute": "name"},
                {"entity": "A", "attribute": {"name": "name"}}
            ]
        }"#,
    );
    let attrs = result
        .nodes
        .iter()
        .filter(|n| matches!(n.kind, NodeKind::Attribute(_)))
        .count();
    assert_eq!(attrs, 1);
    assert_eq!(result.links.len(), 1);
}

#[test]
fn composite_components_fan_out_above() {
    let result = layout(
        r#"{
            "entities": [{"name": "E"}],
            "attributes": [{"entity": "E", "attribute": "address", "components": ["street", "city", "zip"]}]
        }"#,
    );
    let parent = result.node("E-address").unwrap().position();
    let xs: Vec<f64> = ["street", "city", "zip"]
        .iter()
        .enumerate()
        .map(|(j, c)| {
            let p = result.node(&format!("E-address#{j}-{c}")).unwrap().position();
            assert!((p.y - (parent.y - 65.0)).abs() < 1e-9);
            p.x - parent.x
        })
        .collect();
    assert_eq!(xs, vec![-112.5, 0.0, 112.5]);
}

#[test]
fn empty_schema_has_no_layout() {
    let schema = Schema::from_json(r#"{"entities": [], "attributes": []}"#).unwrap();
    assert!(LayoutEngine::default().layout(&schema).is_none());
}

#[test]
fn dragging_moves_node_and_its_labels() {
    let schema = Schema::from_json(UNIVERSITY).unwrap();
    let mut canvas = Canvas::new(LayoutEngine::default());
    assert!(canvas.load(&schema));

    let response = canvas.handle(Event::PointerDown {
        at: Point::new(90.0, 85.0),
    });
    assert_eq!(response, Response::DragStarted("Student".to_string()));

    let response = canvas.handle(Event::PointerMove {
        at: Point::new(110.0, 105.0),
    });
    assert_eq!(response, Response::Moved("Student".to_string()));
    canvas.handle(Event::PointerUp);

    let result = canvas.layout().unwrap();
    assert_close(result.node("Student").unwrap().position(), 100.0, 100.0);
    // Relationship stays put; the label follows the moved endpoint
    assert_close(result.node("enrolls-0").unwrap().position(), 255.0, 240.0);
    assert_close(result.labels[0].from.position, 162.0, 156.0);

    assert_eq!(canvas.handle(Event::Reset(Box::new(schema))), Response::Reset { has_layout: true });
    assert_close(canvas.layout().unwrap().node("Student").unwrap().position(), 80.0, 80.0);
}

#[test]
fn dangling_relationship_leaves_entities_in_place() {
    let base = r#"{
        "entities": [{"name": "A"}, {"name": "B"}, {"name": "C"}],
        "attributes": [
            {"entity": "A", "attribute": "PK_id"},
            {"entity": "B", "attribute": "name", "components": ["first", "last"]}
        ],
        "relationships": [{"from": "A", "to": "B", "label": "r"}RELS]
    }"#;
    let clean = layout(&base.replace("RELS", ""));
    let dangling = layout(&base.replace("RELS", r#", {"from": "A", "to": "Ghost", "label": "haunts"}"#));

    let placed = |result: &LayoutResult| -> Vec<(String, Point)> {
        result
            .nodes
            .iter()
            .filter(|n| matches!(n.kind, NodeKind::Entity { .. } | NodeKind::Attribute(_)))
            .map(|n| (n.id.clone(), n.position()))
            .collect()
    };
    assert_eq!(placed(&clean), placed(&dangling));
    assert!(dangling.node("haunts-1").is_none());
    assert_eq!(clean.nodes.len(), dangling.nodes.len());

    // Relationship spacing still counts the dangling relationship
    let drop = dangling.node("r-0").unwrap().y - clean.node("r-0").unwrap().y;
    assert_eq!(drop, 40.0);
}

#[test]
fn partial_records_are_omitted_not_fatal() {
    let result = layout(
        r#"{
            "entities": [{"name": "A", "isWeak": null}, {"name": "B"}, {"isWeak": true}],
            "attributes": [
                {"entity": "A", "attribute": "PK_id"},
                {"attribute": "orphan"},
                {"entity": null, "attribute": "stray"}
            ],
            "relationships": [
                {"from": "A", "to": "B", "label": null},
                {"from": "A", "label": "half"}
            ],
            "cardinalities": [
                {"from": "A", "to": "B"},
                {"from": "A", "to": "B", "type": null},
                {"from": "A", "type": "1:N"}
            ]
        }"#,
    );

    let entities: Vec<_> = result.nodes.iter().filter(|n| n.is_entity()).map(|n| n.id.as_str()).collect();
    assert_eq!(entities, vec!["A", "B"]);
    assert!(matches!(result.node("A").unwrap().kind, NodeKind::Entity { is_weak: false }));

    let attrs: Vec<_> = result
        .nodes
        .iter()
        .filter(|n| matches!(n.kind, NodeKind::Attribute(_)))
        .map(|n| n.id.as_str())
        .collect();
    assert_eq!(attrs, vec!["A-PK_id"]);

    let rels: Vec<_> = result
        .nodes
        .iter()
        .filter(|n| matches!(n.kind, NodeKind::Relationship { .. }))
        .collect();
    assert_eq!(rels.len(), 1);
    assert_eq!(rels[0].id, "-0");
    assert_eq!(rels[0].label, "");
    assert!(result.node("half-1").is_none());
    assert!(result.labels.is_empty());

    for link in &result.links {
        assert!(result.node(&link.source).is_some());
        assert!(result.node(&link.target).is_some());
    }
}
