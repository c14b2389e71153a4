//! Layout constants and render theme, loadable from a JSON file.

use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub layout: LayoutConfig,
    pub theme: Theme,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Margin around the grid and around the final viewport.
    pub padding: f64,
    pub entity: Size,
    pub relationship: Size,
    pub attribute_rx: f64,
    pub attribute_ry: f64,
    pub entities_per_row: usize,
    /// Vertical gap between stacked attributes, and between an entity's
    /// edge and its attribute column.
    pub attribute_gap: f64,
    /// Distance between a composite attribute's top and its components.
    pub component_lift: f64,
    /// Horizontal fan step for components, in multiples of `attribute_rx`.
    pub component_fan: f64,
    pub relationship_stagger: f64,
    pub rel_attribute_step: f64,
    pub spacing: SpacingConfig,
    pub labels: LabelConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            padding: 80.0,
            entity: Size {
                width: 140.0,
                height: 50.0,
            },
            relationship: Size {
                width: 130.0,
                height: 50.0,
            },
            attribute_rx: 75.0,
            attribute_ry: 25.0,
            entities_per_row: 3,
            attribute_gap: 20.0,
            component_lift: 40.0,
            component_fan: 1.5,
            relationship_stagger: 60.0,
            rel_attribute_step: 60.0,
            spacing: SpacingConfig::default(),
            labels: LabelConfig::default(),
        }
    }
}

/// Base, per-item increment and cap for each density-driven spacing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpacingConfig {
    pub h_base: f64,
    pub h_per_attribute: f64,
    pub h_attribute_cap: usize,
    pub v_base: f64,
    pub v_per_attribute: f64,
    pub v_attribute_cap: usize,
    pub rel_base: f64,
    pub rel_per_relationship: f64,
}

impl Default for SpacingConfig {
    fn default() -> Self {
        Self {
            h_base: 180.0,
            h_per_attribute: 30.0,
            h_attribute_cap: 5,
            v_base: 250.0,
            v_per_attribute: 60.0,
            v_attribute_cap: 3,
            rel_base: 120.0,
            rel_per_relationship: 40.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LabelConfig {
    /// Fraction of the entity→relationship segment where a symbol sits.
    pub fraction: f64,
    pub char_width: f64,
    pub plate_padding: f64,
    pub plate_half_height: f64,
    pub plate_radius: f64,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            fraction: 0.4,
            char_width: 9.0,
            plate_padding: 5.0,
            plate_half_height: 12.0,
            plate_radius: 8.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Theme {
    pub font_family: String,
    pub entity_font_size: f64,
    pub attribute_font_size: f64,
    pub cardinality_font_size: f64,
    pub background: String,
    pub border: String,
    pub line_color: String,
    pub entity_fill: String,
    pub attribute_fill: String,
    pub relationship_fill: String,
    pub cardinality_color: String,
    pub plate_fill: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            font_family: "Segoe UI, Arial".to_string(),
            entity_font_size: 16.0,
            attribute_font_size: 14.0,
            cardinality_font_size: 16.0,
            background: "#fff".to_string(),
            border: "#222".to_string(),
            line_color: "#333".to_string(),
            entity_fill: "#f8f8ff".to_string(),
            attribute_fill: "#fffbe7".to_string(),
            relationship_fill: "#e6f2ff".to_string(),
            cardinality_color: "#d32f2f".to_string(),
            plate_fill: "white".to_string(),
        }
    }
}

/// Load configuration from a JSON file, or defaults when no path is given.
///
/// Missing keys fall back to their defaults at every nesting level.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let Some(path) = path else {
        debug!("No configuration file given, using default configuration");
        return Ok(Config::default());
    };

    info!(path = path.display().to_string(); "Loading configuration");
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })
}
