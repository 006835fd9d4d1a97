//! PDF drawing backend using lopdf.
//!
//! This crate provides a `DrawingContext` that builds a PDF object graph in
//! memory and writes it out when the document is saved.

mod renderer;

pub use renderer::PdfContext;
