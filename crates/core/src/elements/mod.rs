//! Per-variant behaviour: what each element measures and generates during
//! compose, and which drawing calls it makes during build.

mod code;
mod color_cell;
mod image;
mod text;
mod text_box;

pub use code::{CodeBlock, RunState};
pub use color_cell::{CellLabel, CellLayout, ColorCell};
pub use image::Image;
pub use text::Text;
pub use text_box::TextBox;

use crate::element::{Element, ElementKind, Frame};
use crate::error::FolioError;
use folio_render_core::DrawingContext;
use folio_theme::Theme;
use folio_types::{Padding, Paint, Point, Rect, Size, TextAlign, TextStyle};

/// What compose may consult while resolving a page's elements.
pub struct ComposeContext<'a> {
    /// Text measurement comes from the backend that will draw the text.
    pub measure: &'a dyn DrawingContext,
    pub theme: &'a Theme,
    pub show_source: bool,
}

impl ElementKind {
    /// The natural size of the element, padding included. Used for any
    /// dimension the frame leaves unset.
    pub(crate) fn measure(&mut self, frame: &Frame, cx: &ComposeContext<'_>) -> Size {
        let inner = match self {
            ElementKind::Group | ElementKind::Rect | ElementKind::Image(_) => Size::zero(),
            ElementKind::Text(text) => text.measure(cx),
            ElementKind::TextBox(text_box) => text_box.measure(frame, cx),
            ElementKind::ColorCell(cell) => cell.measure(cx),
            ElementKind::CodeBlock(block) => block.measure(cx),
        };
        Size::new(
            inner.width + frame.padding.horizontal(),
            inner.height + frame.padding.vertical(),
        )
    }

    /// Children this element derives from its own content. They replace
    /// the ones generated by the previous compose.
    pub(crate) fn generate(
        &self,
        size: Size,
        cx: &ComposeContext<'_>,
    ) -> Result<Vec<Element>, FolioError> {
        match self {
            ElementKind::ColorCell(cell) => cell.generate(size, cx),
            _ => Ok(Vec::new()),
        }
    }

    /// Draws this element, without its children, into the absolute `area`.
    pub(crate) fn draw(
        &self,
        area: Rect,
        padding: &Padding,
        paint: &Paint,
        ctx: &mut dyn DrawingContext,
        show_source: bool,
    ) -> Result<(), FolioError> {
        let has_area = area.width > 0.0 || area.height > 0.0;
        match self {
            ElementKind::Group | ElementKind::ColorCell(_) => {
                if paint.is_visible() && has_area {
                    ctx.draw_rect(area, paint)?;
                }
            }
            ElementKind::Rect => ctx.draw_rect(area, paint)?,
            ElementKind::Text(text) => {
                if paint.is_visible() {
                    ctx.draw_rect(area, paint)?;
                }
                text.draw(area, padding, ctx)?;
            }
            ElementKind::TextBox(text_box) => {
                if paint.is_visible() {
                    ctx.draw_rect(area, paint)?;
                }
                draw_lines(ctx, &text_box.lines, area, padding, &text_box.style, true)?;
            }
            ElementKind::Image(image) => {
                if paint.is_visible() {
                    ctx.draw_rect(area, paint)?;
                }
                ctx.draw_image(&image.path, inner_rect(area, padding))?;
            }
            ElementKind::CodeBlock(block) => {
                if show_source {
                    if paint.is_visible() {
                        ctx.draw_rect(area, paint)?;
                    }
                    let lines: Vec<String> = block.code().lines().map(str::to_string).collect();
                    draw_lines(ctx, &lines, area, padding, block.style(), false)?;
                }
            }
        }
        Ok(())
    }
}

/// Distance from the bottom of a line box to the text baseline.
pub(crate) fn baseline_offset(style: &TextStyle) -> f32 {
    (style.leading() - style.font_size) / 2.0 + style.font_size * 0.2
}

pub(crate) fn inner_rect(area: Rect, padding: &Padding) -> Rect {
    Rect::new(
        area.x + padding.left,
        area.y + padding.bottom,
        area.width - padding.horizontal(),
        area.height - padding.vertical(),
    )
}

/// Horizontal start of a line of `width` within `inner`, per alignment.
pub(crate) fn aligned_x(inner: &Rect, width: f32, align: TextAlign) -> f32 {
    match align {
        TextAlign::Left => inner.x,
        TextAlign::Center => inner.x + (inner.width - width) / 2.0,
        TextAlign::Right => inner.x + inner.width - width,
    }
}

/// Draws `lines` from the top of `area` down. With `clip`, lines that
/// would fall below the inner bottom edge are dropped.
pub(crate) fn draw_lines(
    ctx: &mut dyn DrawingContext,
    lines: &[String],
    area: Rect,
    padding: &Padding,
    style: &TextStyle,
    clip: bool,
) -> Result<(), FolioError> {
    let inner = inner_rect(area, padding);
    let leading = style.leading();
    let top = inner.y + inner.height;
    for (i, line) in lines.iter().enumerate() {
        let bottom = top - (i as f32 + 1.0) * leading;
        if clip && bottom < inner.y - 0.01 {
            log::debug!("Text box clipped after {} of {} lines", i, lines.len());
            break;
        }
        if line.is_empty() {
            continue;
        }
        let width = ctx.text_size(line, style).width;
        let origin = Point::new(
            aligned_x(&inner, width, style.align),
            bottom + baseline_offset(style),
        );
        ctx.draw_text(line, origin, style)?;
    }
    Ok(())
}
