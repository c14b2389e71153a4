//! Pointer-driven repositioning of nodes in a computed layout.
//!
//! A [`Canvas`] owns the live [`LayoutResult`] and is its only mutator. It
//! runs a small state machine (idle, dragging) fed by [`Event`]s, converting
//! screen coordinates into diagram coordinates through a [`ViewTransform`]
//! before touching any node.

use std::collections::HashMap;
use std::sync::mpsc::Receiver;

use log::{debug, info, warn};

use crate::error::GeometryError;
use crate::geometry::Point;
use crate::layout::{LayoutEngine, LayoutResult, ViewBox, compute_viewport, place_labels};
use crate::schema::Schema;

/// Maps diagram space to screen space: `screen = diagram * scale + offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub scale: f64,
    pub offset: Point,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: Point::default(),
        }
    }
}

impl ViewTransform {
    /// Fit a view box into a `width` × `height` viewport, centered and
    /// uniformly scaled (SVG `xMidYMid meet`).
    pub fn fit(view_box: &ViewBox, width: f64, height: f64) -> Self {
        let scale = (width / view_box.width).min(height / view_box.height);
        Self {
            scale,
            offset: Point::new(
                (width - view_box.width * scale) / 2.0 - view_box.min_x * scale,
                (height - view_box.height * scale) / 2.0 - view_box.min_y * scale,
            ),
        }
    }

    /// Zoom by `factor` keeping the screen point `anchor` fixed.
    pub fn zoomed(self, factor: f64, anchor: Point) -> Self {
        let rel = anchor - self.offset;
        Self {
            scale: self.scale * factor,
            offset: anchor - Point::new(rel.x * factor, rel.y * factor),
        }
    }

    /// Scroll the viewport by `(dx, dy)` screen pixels.
    pub fn scrolled(self, dx: f64, dy: f64) -> Self {
        Self {
            offset: self.offset - Point::new(dx, dy),
            ..self
        }
    }

    pub fn to_screen(&self, p: Point) -> Point {
        Point::new(p.x * self.scale, p.y * self.scale) + self.offset
    }

    pub fn to_diagram(&self, screen: Point) -> Result<Point, GeometryError> {
        if !screen.is_finite() {
            return Err(GeometryError::NonFinite);
        }
        if !self.scale.is_finite() || self.scale.abs() <= f64::EPSILON {
            return Err(GeometryError::Singular(self.scale));
        }
        let rel = screen - self.offset;
        let p = Point::new(rel.x / self.scale, rel.y / self.scale);
        if p.is_finite() {
            Ok(p)
        } else {
            Err(GeometryError::NonFinite)
        }
    }
}

/// Input to the canvas. Pointer positions are in screen space.
#[derive(Debug, Clone)]
pub enum Event {
    /// Press at a screen point; the topmost node under it is picked.
    PointerDown { at: Point },
    /// Press on a known node's visual region.
    PointerDownOn { node: String, at: Point },
    PointerMove { at: Point },
    PointerUp,
    PointerLeave,
    /// Discard drag state and lay the schema out from scratch.
    Reset(Box<Schema>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Ignored,
    DragStarted(String),
    Moved(String),
    DragEnded(String),
    /// The pointer could not be mapped into the diagram; nothing changed.
    Abandoned(GeometryError),
    Reset { has_layout: bool },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DragState {
    Idle,
    Dragging { index: usize, offset: Point },
}

#[derive(Debug, Clone)]
struct Scene {
    layout: LayoutResult,
    index: HashMap<String, usize>,
}

impl Scene {
    fn new(layout: LayoutResult) -> Self {
        let index = layout
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();
        Self { layout, index }
    }
}

pub struct Canvas {
    engine: LayoutEngine,
    transform: ViewTransform,
    scene: Option<Scene>,
    drag: DragState,
}

impl Canvas {
    pub fn new(engine: LayoutEngine) -> Self {
        Self {
            engine,
            transform: ViewTransform::default(),
            scene: None,
            drag: DragState::Idle,
        }
    }

    /// Run the full pipeline for `schema`, replacing any current layout.
    /// Returns whether a layout was produced.
    pub fn load(&mut self, schema: &Schema) -> bool {
        self.drag = DragState::Idle;
        self.scene = self.engine.layout(schema).map(Scene::new);
        self.scene.is_some()
    }

    pub fn layout(&self) -> Option<&LayoutResult> {
        self.scene.as_ref().map(|s| &s.layout)
    }

    /// Current layout with its viewport recomputed around dragged nodes.
    pub fn fitted(&self) -> Option<LayoutResult> {
        let layout = self.layout()?;
        let view_box = compute_viewport(&layout.nodes, self.engine.config())?;
        Some(LayoutResult {
            view_box,
            ..layout.clone()
        })
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn set_transform(&mut self, transform: ViewTransform) {
        self.transform = transform;
    }

    pub fn dragging(&self) -> Option<&str> {
        match (self.drag, &self.scene) {
            (DragState::Dragging { index, .. }, Some(scene)) => {
                Some(scene.layout.nodes[index].id.as_str())
            }
            _ => None,
        }
    }

    /// Topmost node whose shape contains the diagram-space point.
    pub fn hit_test(&self, p: Point) -> Option<&str> {
        let scene = self.scene.as_ref()?;
        let cfg = self.engine.config();
        scene
            .layout
            .nodes
            .iter()
            .rev()
            .find(|n| n.shape(cfg).contains(n.position(), p))
            .map(|n| n.id.as_str())
    }

    pub fn handle(&mut self, event: Event) -> Response {
        match event {
            Event::PointerDown { at } => match self.transform.to_diagram(at) {
                Ok(p) => match self.hit_test(p).map(str::to_string) {
                    Some(id) => self.begin_drag(&id, p),
                    None => Response::Ignored,
                },
                Err(err) => self.abandon(err),
            },
            Event::PointerDownOn { node, at } => match self.transform.to_diagram(at) {
                Ok(p) => self.begin_drag(&node, p),
                Err(err) => self.abandon(err),
            },
            Event::PointerMove { at } => self.drag_to(at),
            Event::PointerUp | Event::PointerLeave => self.end_drag(),
            Event::Reset(schema) => {
                info!("Layout reset requested");
                let has_layout = self.load(&schema);
                Response::Reset { has_layout }
            }
        }
    }

    /// Handle every event queued on `events` without blocking.
    pub fn drain(&mut self, events: &Receiver<Event>) -> Vec<Response> {
        events.try_iter().map(|e| self.handle(e)).collect()
    }

    fn begin_drag(&mut self, id: &str, pointer: Point) -> Response {
        let Some(scene) = &self.scene else {
            return Response::Ignored;
        };
        let Some(&index) = scene.index.get(id) else {
            debug!(id; "Pointer down on unknown node");
            return Response::Ignored;
        };
        let offset = pointer - scene.layout.nodes[index].position();
        self.drag = DragState::Dragging { index, offset };
        debug!(id; "Drag started");
        Response::DragStarted(id.to_string())
    }

    fn drag_to(&mut self, at: Point) -> Response {
        let DragState::Dragging { index, offset } = self.drag else {
            return Response::Ignored;
        };
        let pointer = match self.transform.to_diagram(at) {
            Ok(p) => p,
            Err(err) => return self.abandon(err),
        };
        let Some(scene) = self.scene.as_mut() else {
            self.drag = DragState::Idle;
            return Response::Ignored;
        };

        let node = &mut scene.layout.nodes[index];
        node.set_position(pointer - offset);
        let id = node.id.clone();
        scene.layout.labels = place_labels(
            &scene.layout.nodes,
            &scene.layout.cardinalities,
            self.engine.config(),
        );
        Response::Moved(id)
    }

    fn end_drag(&mut self) -> Response {
        let ended = self.dragging().map(str::to_string);
        self.drag = DragState::Idle;
        match ended {
            Some(id) => {
                debug!(id = id.as_str(); "Drag completed");
                Response::DragEnded(id)
            }
            None => Response::Ignored,
        }
    }

    fn abandon(&self, err: GeometryError) -> Response {
        warn!(error:% = err; "Dropping pointer event");
        Response::Abandoned(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn schema() -> Schema {
        Schema::from_json(
            r#"{
                "entities": [{"name": "A"}, {"name": "B"}],
                "attributes": [{"entity": "A", "attribute": "PK_id"}],
                "relationships": [{"from": "A", "to": "B", "label": "r"}],
                "cardinalities": [{"from": "A", "to": "B", "type": "1:N"}]
            }"#,
        )
        .unwrap()
    }

    fn canvas() -> Canvas {
        let mut canvas = Canvas::new(LayoutEngine::default());
        assert!(canvas.load(&schema()));
        canvas
    }

    fn pos(canvas: &Canvas, id: &str) -> Point {
        canvas.layout().unwrap().node(id).unwrap().position()
    }

    #[test]
    fn test_transform_round_trip() {
        let t = ViewTransform {
            scale: 2.0,
            offset: Point::new(10.0, -4.0),
        };
        let screen = t.to_screen(Point::new(3.0, 5.0));
        assert_eq!(screen, Point::new(16.0, 6.0));
        assert_eq!(t.to_diagram(screen).unwrap(), Point::new(3.0, 5.0));
    }

    #[test]
    fn test_fit_centers_view_box() {
        let vb = ViewBox {
            min_x: -100.0,
            min_y: 0.0,
            width: 200.0,
            height: 100.0,
        };
        let t = ViewTransform::fit(&vb, 400.0, 400.0);
        assert_eq!(t.scale, 2.0);
        // Diagram origin maps to horizontal center, vertical letterbox of 100px.
        assert_eq!(t.to_screen(Point::new(0.0, 0.0)), Point::new(200.0, 100.0));
    }

    #[test]
    fn test_zoom_keeps_anchor_fixed() {
        let t = ViewTransform::default().scrolled(10.0, 20.0);
        let anchor = Point::new(50.0, 50.0);
        let before = t.to_diagram(anchor).unwrap();
        let after = t.zoomed(2.0, anchor).to_diagram(anchor).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_singular_transform_is_an_error() {
        let t = ViewTransform {
            scale: 0.0,
            offset: Point::default(),
        };
        assert_eq!(
            t.to_diagram(Point::new(1.0, 1.0)),
            Err(GeometryError::Singular(0.0))
        );
        assert_eq!(
            ViewTransform::default().to_diagram(Point::new(f64::NAN, 0.0)),
            Err(GeometryError::NonFinite)
        );
    }

    #[test]
    fn test_drag_moves_only_the_dragged_node() {
        let mut canvas = canvas();
        let a = pos(&canvas, "A");
        let b = pos(&canvas, "B");

        let grab = a + Point::new(5.0, 3.0);
        assert_eq!(
            canvas.handle(Event::PointerDown { at: grab }),
            Response::DragStarted("A".to_string())
        );
        assert_eq!(canvas.dragging(), Some("A"));

        let drop = grab + Point::new(100.0, 50.0);
        assert_eq!(
            canvas.handle(Event::PointerMove { at: drop }),
            Response::Moved("A".to_string())
        );
        assert_eq!(pos(&canvas, "A"), a + Point::new(100.0, 50.0));
        assert_eq!(pos(&canvas, "B"), b);

        assert_eq!(canvas.handle(Event::PointerUp), Response::DragEnded("A".to_string()));
        assert_eq!(canvas.dragging(), None);
        assert_eq!(canvas.handle(Event::PointerMove { at: grab }), Response::Ignored);
        assert_eq!(pos(&canvas, "A"), a + Point::new(100.0, 50.0));
    }

    #[test]
    fn test_drag_without_movement_is_identity() {
        let mut canvas = canvas();
        let before = canvas.layout().unwrap().clone();
        let at = pos(&canvas, "B") + Point::new(-20.0, 10.0);

        canvas.handle(Event::PointerDownOn {
            node: "B".to_string(),
            at,
        });
        canvas.handle(Event::PointerLeave);

        assert_eq!(canvas.layout().unwrap(), &before);
    }

    #[test]
    fn test_drag_respects_view_transform() {
        let mut canvas = canvas();
        canvas.set_transform(ViewTransform {
            scale: 0.5,
            offset: Point::new(30.0, 30.0),
        });
        let a = pos(&canvas, "A");
        let t = canvas.transform();

        canvas.handle(Event::PointerDown { at: t.to_screen(a) });
        canvas.handle(Event::PointerMove {
            at: t.to_screen(a) + Point::new(10.0, 0.0),
        });

        // 10 screen pixels at half scale is 20 diagram units.
        assert_eq!(pos(&canvas, "A"), a + Point::new(20.0, 0.0));
    }

    #[test]
    fn test_links_unchanged_and_labels_follow() {
        let mut canvas = canvas();
        let links = canvas.layout().unwrap().links.clone();
        let label_before = canvas.layout().unwrap().labels[0].from.position;
        let a = pos(&canvas, "A");

        canvas.handle(Event::PointerDownOn {
            node: "A".to_string(),
            at: a,
        });
        canvas.handle(Event::PointerMove {
            at: a + Point::new(0.0, -100.0),
        });

        let layout = canvas.layout().unwrap();
        assert_eq!(layout.links, links);
        assert_eq!(layout.labels[0].from.position.y, label_before.y - 60.0);
    }

    #[test]
    fn test_pointer_down_on_empty_space() {
        let mut canvas = canvas();
        let vb = canvas.layout().unwrap().view_box;
        let corner = Point::new(vb.min_x + 1.0, vb.min_y + 1.0);
        assert_eq!(canvas.handle(Event::PointerDown { at: corner }), Response::Ignored);
        assert_eq!(canvas.dragging(), None);
    }

    #[test]
    fn test_hit_test_prefers_topmost() {
        let canvas = canvas();
        let attr = pos(&canvas, "A-PK_id");
        assert_eq!(canvas.hit_test(attr), Some("A-PK_id"));
        assert_eq!(canvas.hit_test(pos(&canvas, "r-0")), Some("r-0"));
    }

    #[test]
    fn test_geometry_failure_abandons_event() {
        let mut canvas = canvas();
        let a = pos(&canvas, "A");
        canvas.handle(Event::PointerDownOn {
            node: "A".to_string(),
            at: a,
        });
        canvas.set_transform(ViewTransform {
            scale: 0.0,
            offset: Point::default(),
        });

        let response = canvas.handle(Event::PointerMove {
            at: Point::new(1.0, 1.0),
        });
        assert_eq!(response, Response::Abandoned(GeometryError::Singular(0.0)));
        assert_eq!(pos(&canvas, "A"), a);
        assert_eq!(canvas.dragging(), Some("A"));
    }

    #[test]
    fn test_reset_discards_drag_state() {
        let mut canvas = canvas();
        let a = pos(&canvas, "A");
        canvas.handle(Event::PointerDownOn {
            node: "A".to_string(),
            at: a,
        });
        canvas.handle(Event::PointerMove {
            at: a + Point::new(300.0, 300.0),
        });

        let (tx, rx) = mpsc::channel();
        tx.send(Event::Reset(Box::new(schema()))).unwrap();
        tx.send(Event::PointerMove { at: a }).unwrap();
        let responses = canvas.drain(&rx);

        assert_eq!(
            responses,
            vec![Response::Reset { has_layout: true }, Response::Ignored]
        );
        assert_eq!(pos(&canvas, "A"), a);
    }

    #[test]
    fn test_reset_with_empty_schema_clears_layout() {
        let mut canvas = canvas();
        let empty = Schema::default();
        assert_eq!(
            canvas.handle(Event::Reset(Box::new(empty))),
            Response::Reset { has_layout: false }
        );
        assert!(canvas.layout().is_none());
        assert_eq!(canvas.handle(Event::PointerDown { at: Point::default() }), Response::Ignored);
    }

    #[test]
    fn test_fitted_viewport_follows_drag() {
        let mut canvas = canvas();
        let original = canvas.layout().unwrap().view_box;
        let b = pos(&canvas, "B");
        canvas.handle(Event::PointerDownOn {
            node: "B".to_string(),
            at: b,
        });
        canvas.handle(Event::PointerMove {
            at: b + Point::new(1000.0, 0.0),
        });

        assert_eq!(canvas.layout().unwrap().view_box, original);
        let fitted = canvas.fitted().unwrap();
        assert_eq!(fitted.view_box.width, original.width + 1000.0);
    }
}
