use crate::error::FolioError;
use folio_render_core::{DrawingContext, RecordingContext};
use folio_render_lopdf::PdfContext;
use folio_theme::ThemeConfig;
use folio_types::{A4, Padding};
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Directory `export_default` writes into unless configured otherwise.
pub const EXPORT_DIR: &str = "_export";

/// Page padding used when nothing else is configured.
pub const DEFAULT_PADDING: f32 = 30.0;

/// Selects the drawing backend a document builds into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// In-memory PDF generation using `lopdf`.
    #[default]
    Pdf,
    /// Records drawing calls without producing output.
    Recording,
}

impl Backend {
    pub fn context(&self) -> Box<dyn DrawingContext> {
        match self {
            Backend::Pdf => Box::new(PdfContext::new()),
            Backend::Recording => Box::new(RecordingContext::new()),
        }
    }
}

/// Document settings as read from JSON.
///
/// ```json
/// { "width": 420, "height": 595, "padding": [40, 30],
///   "theme": { "palette": "fairy_tales", "mood": "dark" } }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct DocumentConfig {
    pub width: f32,
    pub height: f32,
    /// One to four values, in CSS order.
    pub padding: Padding,
    pub export_dir: PathBuf,
    /// Draw code block sources instead of hiding them.
    pub show_source: bool,
    pub theme: ThemeConfig,
    /// Template for pages that do not name one.
    pub template: Option<String>,
    pub backend: Backend,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            width: A4.width,
            height: A4.height,
            padding: Padding::uniform(DEFAULT_PADDING),
            export_dir: PathBuf::from(EXPORT_DIR),
            show_source: false,
            theme: ThemeConfig::default(),
            template: None,
            backend: Backend::default(),
        }
    }
}

impl DocumentConfig {
    pub fn from_json(source: &str) -> Result<Self, FolioError> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, FolioError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| {
            FolioError::Io(io::Error::new(
                e.kind(),
                format!("Failed to read config from '{}': {}", path.display(), e),
            ))
        })?;
        Self::from_json(&source)
    }

    pub fn validate(&self) -> Result<(), FolioError> {
        for (name, value) in [("width", self.width), ("height", self.height)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(FolioError::Config(format!(
                    "Document {} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}
