use super::ComposeContext;
use crate::element::Frame;
use folio_render_core::utils;
use folio_types::{Size, TextStyle};

/// Multi-line text wrapped to the inner width of its frame.
///
/// Without a width only explicit newlines break lines and the box takes
/// the width of its longest line.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    pub text: String,
    pub style: TextStyle,
    /// Lines from the last compose.
    pub(crate) lines: Vec<String>,
}

impl TextBox {
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
            lines: Vec::new(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub(crate) fn measure(&mut self, frame: &Frame, cx: &ComposeContext<'_>) -> Size {
        self.lines = match frame.w {
            Some(w) => utils::wrap_text(&self.text, w - frame.padding.horizontal(), &self.style),
            None => self.text.split('\n').map(str::to_string).collect(),
        };
        let width = self
            .lines
            .iter()
            .map(|line| cx.measure.text_size(line, &self.style).width)
            .fold(0.0, f32::max);
        Size::new(width, self.lines.len() as f32 * self.style.leading())
    }
}
