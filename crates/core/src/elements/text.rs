use super::{ComposeContext, aligned_x, baseline_offset, inner_rect};
use crate::error::FolioError;
use folio_render_core::DrawingContext;
use folio_types::{Padding, Point, Rect, Size, TextStyle};

/// A single line of text. Unsized frames take the measured line size.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub text: String,
    pub style: TextStyle,
}

impl Text {
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    pub(crate) fn measure(&self, cx: &ComposeContext<'_>) -> Size {
        cx.measure.text_size(&self.text, &self.style)
    }

    pub(crate) fn draw(
        &self,
        area: Rect,
        padding: &Padding,
        ctx: &mut dyn DrawingContext,
    ) -> Result<(), FolioError> {
        if self.text.is_empty() {
            return Ok(());
        }
        let inner = inner_rect(area, padding);
        let width = ctx.text_size(&self.text, &self.style).width;
        let origin = Point::new(
            aligned_x(&inner, width, self.style.align),
            inner.y + baseline_offset(&self.style),
        );
        ctx.draw_text(&self.text, origin, &self.style)?;
        Ok(())
    }
}
