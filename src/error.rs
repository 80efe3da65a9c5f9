// src/error.rs
use folio_layout::LayoutError;
use folio_style::StyleParseError;
use folio_types::GeometryError;
use thiserror::Error;

/// Error type of everything driven through the `folio` facade.
#[derive(Error, Debug)]
pub enum FolioError {
    #[error("Layout failed: {0}")]
    Layout(#[from] LayoutError),

    #[error("Invalid page geometry: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Style error: {0}")]
    Style(#[from] StyleParseError),

    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Output processing failed: {0}")]
    Output(String),
}
