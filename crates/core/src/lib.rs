//! # folio-core
//!
//! Documents made of pages, pages made of element trees.
//!
//! A [`Document`] turns into output in two passes:
//! - **compose**: templates add page furniture, code blocks run against the
//!   document, and every element resolves its size and generated children
//! - **build**: each page replays its composed tree into a
//!   [`DrawingContext`](folio_render_core::DrawingContext)
//!
//! [`Document::export`] runs whichever passes are outstanding and saves the
//! result.

pub mod builder;
pub mod config;
pub mod document;
pub mod element;
pub mod elements;
pub mod error;
mod host;
pub mod page;
pub mod specimen;
pub mod template;
pub mod tree;

pub use builder::DocumentBuilder;
pub use config::{Backend, DocumentConfig};
pub use document::{Document, PageOptions};
pub use element::{Element, ElementId, ElementKind, Frame, Provenance};
pub use elements::{CellLabel, CellLayout, CodeBlock, ColorCell, Image, RunState, Text, TextBox};
pub use error::FolioError;
pub use page::Page;
pub use specimen::add_theme_specimen;
pub use template::{TemplateContext, TemplateFn, Templates};
pub use tree::{ElementTree, Node};
