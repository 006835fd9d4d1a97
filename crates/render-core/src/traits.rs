use crate::error::RenderError;
use crate::utils;
use folio_types::{Color, Paint, Point, Rect, Size, TextStyle};
use std::any::Any;
use std::path::Path;

/// The drawing capability a document builds itself into.
///
/// Coordinates are in points with the origin at the bottom-left of the
/// current page, y pointing up.
pub trait DrawingContext {
    /// Discards everything drawn so far and starts an empty drawing.
    fn new_drawing(&mut self) -> Result<(), RenderError>;

    /// Opens a new page; subsequent calls draw onto it.
    fn new_page(&mut self, width: f32, height: f32) -> Result<(), RenderError>;

    fn draw_rect(&mut self, rect: Rect, paint: &Paint) -> Result<(), RenderError>;

    /// Draws a single line of text with its baseline starting at `origin`.
    fn draw_text(&mut self, text: &str, origin: Point, style: &TextStyle) -> Result<(), RenderError>;

    /// Width and height of a single line of `text`.
    fn text_size(&self, text: &str, style: &TextStyle) -> Size {
        utils::measure_text(text, style)
    }

    /// Draws the image at `path` into `rect`. Backends without image
    /// support draw a framed placeholder with the file name.
    fn draw_image(&mut self, path: &str, rect: Rect) -> Result<(), RenderError> {
        log::warn!("Image '{}' drawn as a placeholder", path);
        let frame = Paint {
            fill: Some(Color::gray(0.9)),
            stroke: Some(Color::gray(0.5)),
            stroke_width: 0.5,
        };
        self.draw_rect(rect, &frame)?;
        let style = TextStyle::new("Helvetica", 7.0).with_fill(Color::gray(0.3));
        let label = Path::new(path)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string());
        self.draw_text(&label, Point::new(rect.x + 4.0, rect.y + 4.0), &style)
    }

    /// Writes the drawing to `path`. The format follows the extension.
    /// `multipage` asks image-like formats to write one file per page.
    fn save_image(&mut self, path: &Path, multipage: bool) -> Result<(), RenderError>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}
