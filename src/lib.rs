//! # folio
//!
//! A page layout toolkit. Build a [`Document`] out of pages and elements
//! (rectangles, text, text boxes, images, colour swatches and runnable
//! code blocks), give it a [`Theme`], and export it to PDF.
//!
//! ```no_run
//! use folio::{Color, Document, Element, FolioError};
//!
//! fn main() -> Result<(), FolioError> {
//!     let mut doc = Document::new();
//!     let page = doc.new_page();
//!     page.add_element(Element::rect(50.0, 50.0, 200.0, 100.0).with_fill(Color::spot(300)?));
//!     doc.export("_export/Example.pdf", false, true)?;
//!     Ok(())
//! }
//! ```
//!
//! The workspace crates are re-exported under their concern:
//! [`types`] (colour and geometry), [`theme`], [`script`] (the code block
//! language), [`render`] (drawing contexts) and [`core`] (documents).

pub use folio_core as core;
pub use folio_render_core as render;
pub use folio_render_lopdf as pdf;
pub use folio_script as script;
pub use folio_theme as theme;
pub use folio_types as types;

pub use folio_core::{
    Backend, CellLabel, CellLayout, CodeBlock, ColorCell, Document, DocumentBuilder, DocumentConfig,
    Element, ElementId, ElementKind, FolioError, Frame, Image, Page, PageOptions, RunState,
    TemplateContext, Templates, Text, TextBox, add_theme_specimen,
};
pub use folio_render_core::{DrawingContext, RecordingContext, RenderError};
pub use folio_render_lopdf::PdfContext;
pub use folio_script::{Bindings, ScriptError, Value};
pub use folio_theme::{Mood, Theme, ThemeConfig};
pub use folio_types::{A4, Color, ColorError, Padding, Paint, Point, Rect, Size, TextAlign, TextStyle};
