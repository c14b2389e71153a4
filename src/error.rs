//! Error types shared across the crate.

use std::path::PathBuf;

/// Failure to turn input text into a [`Schema`](crate::schema::Schema).
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Invalid schema JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid {field} format: expected an array")]
    Malformed { field: &'static str },
    #[error("No valid JSON found in extraction output")]
    EmptyReply,
}

/// Screen-to-diagram mapping could not be computed.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("View transform is not invertible (scale {0})")]
    Singular(f64),
    #[error("Pointer coordinate is not finite")]
    NonFinite,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(feature = "png")]
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to parse rendered SVG: {0}")]
    Svg(#[from] usvg::Error),
    #[error("Failed to allocate a {0}x{1} pixmap")]
    Pixmap(u32, u32),
    #[error("Failed to encode PNG: {0}")]
    Encode(String),
    #[error("Failed to write PNG: {0}")]
    Io(#[from] std::io::Error),
}
