use crate::config::{Backend, DEFAULT_PADDING, DocumentConfig, EXPORT_DIR};
use crate::document::Document;
use crate::error::FolioError;
use crate::template::{TemplateFn, Templates};
use folio_render_core::DrawingContext;
use folio_render_lopdf::PdfContext;
use folio_script::Bindings;
use folio_theme::Theme;
use folio_types::{A4, Padding, Size};
use std::path::PathBuf;

/// A builder for creating a `Document`.
pub struct DocumentBuilder {
    size: Size,
    padding: Padding,
    theme: Theme,
    templates: Templates,
    default_template: Option<String>,
    context: Option<Box<dyn DrawingContext>>,
    export_dir: PathBuf,
    show_source: bool,
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self {
            size: A4,
            padding: Padding::uniform(DEFAULT_PADDING),
            theme: Theme::default(),
            templates: Templates::default(),
            default_template: None,
            context: None,
            export_dir: PathBuf::from(EXPORT_DIR),
            show_source: false,
        }
    }
}

impl DocumentBuilder {
    /// A4, 30pt padding, the default theme and templates, PDF output.
    pub fn new() -> Self {
        Default::default()
    }

    /// Starts from settings read with [`DocumentConfig`].
    pub fn from_config(config: DocumentConfig) -> Result<Self, FolioError> {
        config.validate()?;
        let theme = config.theme.into_theme()?;
        Ok(Self::new()
            .with_size(config.width, config.height)
            .with_padding(config.padding)
            .with_theme(theme)
            .with_backend(config.backend)
            .with_export_dir(config.export_dir)
            .with_show_source(config.show_source)
            .with_default_template(config.template))
    }

    pub fn with_size(mut self, w: f32, h: f32) -> Self {
        self.size = Size::new(w, h);
        self
    }

    pub fn with_padding(mut self, padding: impl Into<Padding>) -> Self {
        self.padding = padding.into();
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Replaces the whole template set.
    pub fn with_templates(mut self, templates: Templates) -> Self {
        self.templates = templates;
        self
    }

    /// Adds one template to the set.
    pub fn with_template(mut self, name: impl Into<String>, template: TemplateFn) -> Self {
        self.templates.register(name, template);
        self
    }

    /// Template for pages that do not name their own.
    pub fn with_default_template(mut self, name: Option<String>) -> Self {
        self.default_template = name;
        self
    }

    pub fn with_context(mut self, context: Box<dyn DrawingContext>) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.context = Some(backend.context());
        self
    }

    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = dir.into();
        self
    }

    pub fn with_show_source(mut self, show_source: bool) -> Self {
        self.show_source = show_source;
        self
    }

    /// Consumes the builder and creates the `Document`, checking that the
    /// size is usable and the default template exists.
    pub fn build(self) -> Result<Document, FolioError> {
        for (name, value) in [("width", self.size.width), ("height", self.size.height)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(FolioError::Config(format!(
                    "Document {} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        if let Some(name) = &self.default_template {
            self.templates.get(name)?;
        }
        Ok(self.into_document())
    }

    /// Creates the `Document` without any checks.
    pub fn into_document(self) -> Document {
        let context = self
            .context
            .unwrap_or_else(|| Box::new(PdfContext::new()));
        Document {
            size: self.size,
            padding: self.padding,
            pages: Vec::new(),
            theme: self.theme,
            templates: self.templates,
            default_template: self.default_template,
            context,
            export_dir: self.export_dir,
            show_source: self.show_source,
            has_composed: false,
            has_built: false,
            globals: Bindings::new(),
            handles: Vec::new(),
        }
    }
}
