use crate::error::RenderError;
use crate::traits::DrawingContext;
use folio_types::{Paint, Point, Rect, TextStyle};
use std::any::Any;
use std::path::{Path, PathBuf};

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    NewDrawing,
    NewPage {
        width: f32,
        height: f32,
    },
    Rect {
        rect: Rect,
        paint: Paint,
    },
    Text {
        text: String,
        origin: Point,
        style: TextStyle,
    },
    Image {
        path: String,
        rect: Rect,
    },
    Save {
        path: PathBuf,
        multipage: bool,
    },
}

/// A backend that draws nothing and remembers every call.
///
/// `new_drawing` clears the recorded drawing operations but the call
/// counters keep counting, so tests can observe how often a document
/// rebuilt itself.
#[derive(Debug, Default)]
pub struct RecordingContext {
    ops: Vec<DrawOp>,
    saved: Vec<PathBuf>,
    new_drawing_calls: usize,
    new_page_calls: usize,
    save_calls: usize,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Operations since the last `new_drawing`.
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn new_drawing_calls(&self) -> usize {
        self.new_drawing_calls
    }

    pub fn new_page_calls(&self) -> usize {
        self.new_page_calls
    }

    pub fn save_calls(&self) -> usize {
        self.save_calls
    }

    /// Every path `save_image` was called with, oldest first.
    pub fn saved_paths(&self) -> &[PathBuf] {
        &self.saved
    }

    /// Number of pages in the current drawing.
    pub fn page_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::NewPage { .. }))
            .count()
    }

    /// All text drawn in the current drawing, in call order.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn rects(&self) -> Vec<&Rect> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Rect { rect, .. } => Some(rect),
                _ => None,
            })
            .collect()
    }
}

impl DrawingContext for RecordingContext {
    fn new_drawing(&mut self) -> Result<(), RenderError> {
        self.new_drawing_calls += 1;
        self.ops.clear();
        self.ops.push(DrawOp::NewDrawing);
        Ok(())
    }

    fn new_page(&mut self, width: f32, height: f32) -> Result<(), RenderError> {
        self.new_page_calls += 1;
        self.ops.push(DrawOp::NewPage { width, height });
        Ok(())
    }

    fn draw_rect(&mut self, rect: Rect, paint: &Paint) -> Result<(), RenderError> {
        self.ops.push(DrawOp::Rect {
            rect,
            paint: paint.clone(),
        });
        Ok(())
    }

    fn draw_text(&mut self, text: &str, origin: Point, style: &TextStyle) -> Result<(), RenderError> {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            origin,
            style: style.clone(),
        });
        Ok(())
    }

    fn draw_image(&mut self, path: &str, rect: Rect) -> Result<(), RenderError> {
        self.ops.push(DrawOp::Image {
            path: path.to_string(),
            rect,
        });
        Ok(())
    }

    fn save_image(&mut self, path: &Path, multipage: bool) -> Result<(), RenderError> {
        self.save_calls += 1;
        self.saved.push(path.to_path_buf());
        self.ops.push(DrawOp::Save {
            path: path.to_path_buf(),
            multipage,
        });
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
