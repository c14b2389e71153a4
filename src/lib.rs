pub mod config;
pub mod error;
pub mod extract;
pub mod geometry;
pub mod interact;
pub mod ir;
pub mod layout;
pub mod measure;
#[cfg(feature = "png")]
pub mod png;
pub mod schema;
pub mod svg;

use wasm_bindgen::prelude::*;

use config::Config;
use error::SchemaError;
use extract::{ExtractionRequest, build_prompt, parse_reply};
use geometry::Point;
use interact::{Canvas, Event, Response, ViewTransform};
use layout::{LayoutEngine, LayoutResult};
use schema::Schema;
use svg::SvgRenderer;

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Lay out schema JSON and render it, or `None` when the schema has no
/// entities.
pub fn render_schema_json(json: &str, config: &Config) -> Result<Option<String>, SchemaError> {
    let schema = Schema::from_json(json)?;
    let renderer = SvgRenderer::new(config.layout, config.theme.clone());
    Ok(LayoutEngine::new(config.layout)
        .layout(&schema)
        .map(|layout| renderer.render(&layout)))
}

fn parse_config(config_json: Option<String>) -> Result<Config, String> {
    match config_json.as_deref() {
        None | Some("") => Ok(Config::default()),
        Some(s) => serde_json::from_str(s).map_err(|e| format!("Invalid config: {}", e)),
    }
}

fn layout_json(layout: &LayoutResult) -> Result<String, String> {
    serde_json::to_string(layout).map_err(|e| e.to_string())
}

/// Render schema JSON to SVG. Returns `undefined` for a schema without
/// entities.
#[wasm_bindgen(js_name = "erToSvg")]
pub fn render_er(json: &str, config_json: Option<String>) -> Result<Option<String>, String> {
    let config = parse_config(config_json)?;
    render_schema_json(json, &config).map_err(|e| e.to_string())
}

/// Compute the layout for schema JSON and return it as JSON.
#[wasm_bindgen(js_name = "erLayout")]
pub fn layout_er(json: &str, config_json: Option<String>) -> Result<Option<String>, String> {
    let config = parse_config(config_json)?;
    let schema = Schema::from_json(json).map_err(|e| e.to_string())?;
    LayoutEngine::new(config.layout)
        .layout(&schema)
        .map(|layout| layout_json(&layout))
        .transpose()
}

/// Prompt sent to the extraction service for a user description.
#[wasm_bindgen(js_name = "erPrompt")]
pub fn prompt_er(user_text: &str) -> String {
    build_prompt(user_text)
}

/// JSON body for the extraction endpoint.
#[wasm_bindgen(js_name = "erRequestBody")]
pub fn request_body_er(user_text: &str) -> Result<String, String> {
    ExtractionRequest::new(user_text)
        .to_json()
        .map_err(|e| e.to_string())
}

/// Decode a raw extraction reply (possibly fenced) into normalized schema
/// JSON ready for `erToSvg` or `DiagramCanvas`.
#[wasm_bindgen(js_name = "erParseReply")]
pub fn parse_reply_er(raw: &str) -> Result<String, String> {
    let schema = parse_reply(raw).map_err(|e| e.to_string())?;
    serde_json::to_string(&schema).map_err(|e| e.to_string())
}

/// Interactive diagram held on the Rust side; the host forwards pointer
/// events in screen pixels and re-renders from `toSvg`.
#[wasm_bindgen]
pub struct DiagramCanvas {
    canvas: Canvas,
    renderer: SvgRenderer,
}

#[wasm_bindgen]
impl DiagramCanvas {
    #[wasm_bindgen(constructor)]
    pub fn new(json: &str, config_json: Option<String>) -> Result<DiagramCanvas, String> {
        let config = parse_config(config_json)?;
        let schema = Schema::from_json(json).map_err(|e| e.to_string())?;
        let mut canvas = Canvas::new(LayoutEngine::new(config.layout));
        canvas.load(&schema);
        Ok(Self {
            canvas,
            renderer: SvgRenderer::new(config.layout, config.theme),
        })
    }

    #[wasm_bindgen(getter, js_name = "hasLayout")]
    pub fn has_layout(&self) -> bool {
        self.canvas.layout().is_some()
    }

    /// Press at a screen point; returns the id of the node picked up.
    #[wasm_bindgen(js_name = "pointerDown")]
    pub fn pointer_down(&mut self, x: f64, y: f64) -> Option<String> {
        started(self.canvas.handle(Event::PointerDown {
            at: Point::new(x, y),
        }))
    }

    #[wasm_bindgen(js_name = "pointerDownOn")]
    pub fn pointer_down_on(&mut self, id: &str, x: f64, y: f64) -> Option<String> {
        started(self.canvas.handle(Event::PointerDownOn {
            node: id.to_string(),
            at: Point::new(x, y),
        }))
    }

    /// Returns whether a node moved.
    #[wasm_bindgen(js_name = "pointerMove")]
    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        matches!(
            self.canvas.handle(Event::PointerMove {
                at: Point::new(x, y)
            }),
            Response::Moved(_)
        )
    }

    #[wasm_bindgen(js_name = "pointerUp")]
    pub fn pointer_up(&mut self) {
        self.canvas.handle(Event::PointerUp);
    }

    #[wasm_bindgen(js_name = "pointerLeave")]
    pub fn pointer_leave(&mut self) {
        self.canvas.handle(Event::PointerLeave);
    }

    /// Discard manual positions and lay out `json` from scratch.
    pub fn reset(&mut self, json: &str) -> Result<bool, String> {
        let schema = Schema::from_json(json).map_err(|e| e.to_string())?;
        match self.canvas.handle(Event::Reset(Box::new(schema))) {
            Response::Reset { has_layout } => Ok(has_layout),
            _ => Ok(false),
        }
    }

    /// Fit the diagram into a `width` × `height` screen viewport.
    #[wasm_bindgen(js_name = "fitViewport")]
    pub fn fit_viewport(&mut self, width: f64, height: f64) {
        if let Some(layout) = self.canvas.layout() {
            let transform = ViewTransform::fit(&layout.view_box, width, height);
            self.canvas.set_transform(transform);
        }
    }

    pub fn scroll(&mut self, dx: f64, dy: f64) {
        let transform = self.canvas.transform().scrolled(dx, dy);
        self.canvas.set_transform(transform);
    }

    pub fn zoom(&mut self, factor: f64, x: f64, y: f64) {
        let transform = self.canvas.transform().zoomed(factor, Point::new(x, y));
        self.canvas.set_transform(transform);
    }

    /// Current diagram as SVG, with the viewport grown around moved nodes.
    #[wasm_bindgen(js_name = "toSvg")]
    pub fn to_svg(&self) -> Option<String> {
        self.canvas
            .fitted()
            .map(|layout| self.renderer.render(&layout))
    }

    #[wasm_bindgen(js_name = "layoutJson")]
    pub fn layout_json(&self) -> Result<Option<String>, String> {
        self.canvas.layout().map(layout_json).transpose()
    }

    /// `[minX, minY, width, height]` of the current layout.
    #[wasm_bindgen(js_name = "viewBox")]
    pub fn view_box(&self) -> Option<js_sys::Float64Array> {
        let vb = &self.canvas.layout()?.view_box;
        let values = [vb.min_x, vb.min_y, vb.width, vb.height];
        Some(js_sys::Float64Array::from(&values[..]))
    }
}

fn started(response: Response) -> Option<String> {
    match response {
        Response::DragStarted(id) => Some(id),
        _ => None,
    }
}
