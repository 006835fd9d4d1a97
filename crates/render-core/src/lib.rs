//! Drawing backend abstractions.
//!
//! This crate provides the seam between documents and whatever draws them:
//! - `DrawingContext` trait for the drawing primitives a document needs
//! - `RenderError` for backend failures
//! - Text measuring and wrapping helpers shared by backends and layout
//! - `RecordingContext`, a backend that records calls instead of drawing

mod error;
mod recording;
mod traits;
pub mod utils;

pub use error::RenderError;
pub use recording::{DrawOp, RecordingContext};
pub use traits::DrawingContext;
