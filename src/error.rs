use std::path::PathBuf;

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum GpxArtError {
    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("Missing attribute '{attribute}' on <{element}>")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("Invalid value '{value}' for attribute '{attribute}' on <{element}>")]
    InvalidAttribute {
        element: &'static str,
        attribute: &'static str,
        value: String,
    },

    #[error("{field} must be between {min} and {max}, got {value}")]
    CoordinateOutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Marker interval must be a positive number, got {0}")]
    InvalidInterval(f64),

    #[error("Invalid {kind}: '{value}'. Valid values: {expected}")]
    UnknownValue {
        kind: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("Invalid option {name}: {reason}")]
    InvalidOption { name: &'static str, reason: String },

    #[error("Configuration error in {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Export error for {}: {reason}", path.display())]
    Export { path: PathBuf, reason: String },

    #[error("Cannot render empty route. No track points found.")]
    EmptyRoute,

    #[error("Rendering failed: {0}")]
    Render(String),
}

impl From<GpxArtError> for JsValue {
    fn from(e: GpxArtError) -> Self {
        js_sys::Error::new(&e.to_string()).into()
    }
}
