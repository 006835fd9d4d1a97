//! Defines the unified error type for document operations.

use folio_render_core::RenderError;
use folio_script::ScriptError;
use folio_theme::ThemeError;
use folio_types::ColorError;
use thiserror::Error;

/// The main error enum for every fallible operation on a document.
#[derive(Error, Debug)]
pub enum FolioError {
    #[error("Color error: {0}")]
    Color(#[from] ColorError),
    #[error("Theme error: {0}")]
    Theme(#[from] ThemeError),
    #[error("Code block failed: {0}")]
    Script(#[from] ScriptError),
    #[error("Rendering error: {0}")]
    Render(#[from] RenderError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Document has no page {0}")]
    UnknownPage(usize),
    #[error("Page has no element {0}")]
    UnknownElement(usize),
    #[error("Unknown template '{0}'")]
    UnknownTemplate(String),
    #[error("Invalid value '{value}' for {option}")]
    InvalidOption { option: &'static str, value: String },
}

impl FolioError {
    pub(crate) fn invalid(option: &'static str, value: impl Into<String>) -> Self {
        FolioError::InvalidOption {
            option,
            value: value.into(),
        }
    }
}
