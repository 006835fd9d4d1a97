//! Standalone elements and the closed set of element variants.
//!
//! An [`Element`] is built outside of any page with the constructor and
//! `with_*` methods below, then moved into a page's tree with
//! [`crate::Page::add_element`]. Inside the tree it becomes a node that is
//! addressed by an [`ElementId`].

use crate::elements::{CodeBlock, ColorCell, Image, Text, TextBox};
use folio_types::{Color, Padding, Paint, TextStyle};
use std::fmt;

/// Index of a node in a page's element arena. Ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub(crate) usize);

impl ElementId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Position, optional size and padding of an element.
///
/// `x`/`y` are relative to the parent's origin, y pointing up. A missing
/// width or height is resolved during compose (measured text, or the
/// extent of the children).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Frame {
    pub x: f32,
    pub y: f32,
    pub w: Option<f32>,
    pub h: Option<f32>,
    pub padding: Padding,
}

impl Frame {
    pub fn new(x: f32, y: f32, w: Option<f32>, h: Option<f32>) -> Self {
        Self {
            x,
            y,
            w,
            h,
            padding: Padding::default(),
        }
    }
}

/// Who put a node into the tree. Everything except `Authored` is
/// regenerated by the next compose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provenance {
    #[default]
    Authored,
    /// Added by the page template.
    Template,
    /// Added by a code block.
    Script,
    /// Generated by the parent's own compose step.
    Layout,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    /// A plain container; draws its paint as a background, if any.
    Group,
    Rect,
    Text(Text),
    TextBox(TextBox),
    Image(Image),
    ColorCell(ColorCell),
    CodeBlock(CodeBlock),
}

impl ElementKind {
    /// The name scripts and diagnostics use for this variant.
    pub fn type_name(&self) -> &'static str {
        match self {
            ElementKind::Group => "Element",
            ElementKind::Rect => "Rect",
            ElementKind::Text(_) => "Text",
            ElementKind::TextBox(_) => "TextBox",
            ElementKind::Image(_) => "Image",
            ElementKind::ColorCell(_) => "ColorCell",
            ElementKind::CodeBlock(_) => "CodeBlock",
        }
    }

    /// The text content of text-like variants.
    pub fn text(&self) -> Option<&str> {
        match self {
            ElementKind::Text(t) => Some(&t.text),
            ElementKind::TextBox(t) => Some(&t.text),
            ElementKind::CodeBlock(c) => Some(c.code()),
            _ => None,
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) -> bool {
        match self {
            ElementKind::Text(t) => t.text = text.into(),
            ElementKind::TextBox(t) => t.text = text.into(),
            ElementKind::CodeBlock(c) => c.set_code(text),
            _ => return false,
        }
        true
    }
}

/// A standalone element with its own children, not yet part of a page.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub kind: ElementKind,
    pub frame: Frame,
    pub paint: Paint,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(kind: ElementKind, frame: Frame) -> Self {
        Self {
            kind,
            frame,
            paint: Paint::default(),
            children: Vec::new(),
        }
    }

    /// An empty container at `(x, y)` sized by its children.
    pub fn group(x: f32, y: f32) -> Self {
        Self::new(ElementKind::Group, Frame::new(x, y, None, None))
    }

    pub fn rect(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::new(ElementKind::Rect, Frame::new(x, y, Some(w), Some(h)))
    }

    /// A single line of text; measured during compose unless sized.
    pub fn text(text: impl Into<String>, style: TextStyle) -> Self {
        Self::new(
            ElementKind::Text(Text::new(text, style)),
            Frame::default(),
        )
    }

    /// Text wrapped to the box width, drawn from the top down.
    pub fn text_box(text: impl Into<String>, style: TextStyle, w: f32, h: f32) -> Self {
        Self::new(
            ElementKind::TextBox(TextBox::new(text, style)),
            Frame::new(0.0, 0.0, Some(w), Some(h)),
        )
    }

    pub fn image(path: impl Into<String>, w: f32, h: f32) -> Self {
        Self::new(
            ElementKind::Image(Image::new(path)),
            Frame::new(0.0, 0.0, Some(w), Some(h)),
        )
    }

    pub fn color_cell(cell: ColorCell, w: f32, h: f32) -> Self {
        Self::new(
            ElementKind::ColorCell(cell),
            Frame::new(0.0, 0.0, Some(w), Some(h)),
        )
    }

    pub fn code_block(block: CodeBlock) -> Self {
        let mut element = Self::new(ElementKind::CodeBlock(block), Frame::default());
        element.paint = Paint::fill(Color::gray(0.9));
        element
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.frame.x = x;
        self.frame.y = y;
        self
    }

    pub fn with_size(mut self, w: f32, h: f32) -> Self {
        self.frame.w = Some(w);
        self.frame.h = Some(h);
        self
    }

    pub fn with_width(mut self, w: f32) -> Self {
        self.frame.w = Some(w);
        self
    }

    pub fn with_height(mut self, h: f32) -> Self {
        self.frame.h = Some(h);
        self
    }

    pub fn with_padding(mut self, padding: impl Into<Padding>) -> Self {
        self.frame.padding = padding.into();
        self
    }

    pub fn with_fill(mut self, fill: Color) -> Self {
        self.paint.fill = Some(fill);
        self
    }

    pub fn with_stroke(mut self, stroke: Color, width: f32) -> Self {
        self.paint.stroke = Some(stroke);
        self.paint.stroke_width = width;
        self
    }

    pub fn with_paint(mut self, paint: Paint) -> Self {
        self.paint = paint;
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Appends `child` to the end of this element's children.
    pub fn add_element(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Number of elements in this subtree, including this one.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Element::subtree_len).sum::<usize>()
    }
}
