//! Exposes a [`Document`] to code blocks.
//!
//! Scripts hold opaque handles. `doc` is the document, pages are addressed
//! by index and elements by a slot in [`Document::handles`]. An element
//! created by a script starts detached; adding it to a page or to an
//! element moves it. Everything a script attaches is regenerated by the
//! next compose, so running a document twice never duplicates output.

use crate::document::{Document, PageOptions};
use crate::element::{Element, ElementId, ElementKind, Frame, Provenance};
use crate::elements::{CellLabel, CellLayout, ColorCell};
use crate::error::FolioError;
use crate::page::Page;
use folio_script::{Args, ErrorKind, Host, ObjectKind, ObjectRef, ScriptError, Value};
use folio_types::{Color, Padding, Paint, TextAlign, TextStyle};

/// Where a script-visible element lives.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ScriptObject {
    /// Created by a script, not added anywhere yet.
    Detached(Element),
    /// In a page tree.
    Attached { page: usize, id: ElementId },
    /// Added as child `index` of another detached element.
    Moved { parent: usize, index: usize },
}

/// Where a handle resolves to right now.
enum Located {
    /// Inside the detached element in slot `root`, down `path`.
    Free { root: usize, path: Vec<usize> },
    Placed { page: usize, id: ElementId },
}

/// What `add_element` was called on.
enum Target {
    Page(usize),
    Element(usize),
}

/// Where `add_element` puts its argument.
enum Destination {
    Free {
        parent: usize,
        root: usize,
        path: Vec<usize>,
    },
    Placed {
        page: usize,
        parent: Option<ElementId>,
    },
}

/// The functions scripts can call to create elements.
const ELEMENT_FUNCTIONS: [&str; 6] = ["Element", "Rect", "Text", "TextBox", "Image", "ColorCell"];

const FRAME_KEYWORDS: [&str; 8] = ["x", "y", "w", "h", "fill", "stroke", "stroke_width", "padding"];
const TEXT_KEYWORDS: [&str; 4] = ["font", "font_size", "text_fill", "align"];

pub(crate) struct DocumentHost<'a> {
    doc: &'a mut Document,
}

impl<'a> DocumentHost<'a> {
    pub(crate) fn new(doc: &'a mut Document) -> Self {
        Self { doc }
    }

    fn page_ref(&self, index: usize) -> Result<&Page, ScriptError> {
        self.doc
            .pages
            .get(index)
            .ok_or_else(|| ScriptError::other(format!("page {} no longer exists", index + 1)))
    }

    fn page_mut(&mut self, index: usize) -> Result<&mut Page, ScriptError> {
        self.doc
            .pages
            .get_mut(index)
            .ok_or_else(|| ScriptError::other(format!("page {} no longer exists", index + 1)))
    }

    fn new_handle(&mut self, element: Element) -> Value {
        let slot = self.doc.handles.len();
        self.doc.handles.push(ScriptObject::Detached(element));
        Value::Object(ObjectRef::element(slot))
    }

    fn locate(&self, slot: usize) -> Result<Located, ScriptError> {
        let mut path = Vec::new();
        let mut current = slot;
        loop {
            match self.doc.handles.get(current) {
                None => return Err(stale_handle()),
                Some(ScriptObject::Detached(_)) => {
                    path.reverse();
                    return Ok(Located::Free {
                        root: current,
                        path,
                    });
                }
                Some(ScriptObject::Attached { page, id }) => {
                    let tree = self.page_ref(*page)?.tree();
                    let mut id = *id;
                    for index in path.iter().rev() {
                        id = tree
                            .get(id)
                            .and_then(|node| node.children().get(*index).copied())
                            .ok_or_else(stale_handle)?;
                    }
                    return Ok(Located::Placed { page: *page, id });
                }
                Some(ScriptObject::Moved { parent, index }) => {
                    path.push(*index);
                    current = *parent;
                }
            }
        }
    }

    fn element(&self, slot: usize) -> Result<ElementView<'_>, ScriptError> {
        match self.locate(slot)? {
            Located::Free { root, path } => {
                let Some(ScriptObject::Detached(root)) = self.doc.handles.get(root) else {
                    return Err(stale_handle());
                };
                let mut element = root;
                for index in path {
                    element = element.children.get(index).ok_or_else(stale_handle)?;
                }
                Ok(ElementView {
                    kind: &element.kind,
                    frame: &element.frame,
                    paint: &element.paint,
                })
            }
            Located::Placed { page, id } => {
                let node = self.page_ref(page)?.element(id).ok_or_else(stale_handle)?;
                Ok(ElementView {
                    kind: &node.kind,
                    frame: &node.frame,
                    paint: &node.paint,
                })
            }
        }
    }

    fn element_mut(&mut self, slot: usize) -> Result<ElementViewMut<'_>, ScriptError> {
        match self.locate(slot)? {
            Located::Free { root, path } => {
                let Some(ScriptObject::Detached(root)) = self.doc.handles.get_mut(root) else {
                    return Err(stale_handle());
                };
                let mut element = root;
                for index in path {
                    element = element.children.get_mut(index).ok_or_else(stale_handle)?;
                }
                Ok(ElementViewMut {
                    kind: &mut element.kind,
                    frame: &mut element.frame,
                    paint: &mut element.paint,
                })
            }
            Located::Placed { page, id } => {
                let node = self.page_mut(page)?.element_mut(id).ok_or_else(stale_handle)?;
                Ok(ElementViewMut {
                    kind: &mut node.kind,
                    frame: &mut node.frame,
                    paint: &mut node.paint,
                })
            }
        }
    }

    /// Moves the detached element `child` onto a page or under another
    /// element.
    fn attach(&mut self, child: &Value, target: Target) -> Result<(), ScriptError> {
        let slot = match child.as_object() {
            Some(ObjectRef {
                kind: ObjectKind::Element,
                id,
            }) => id,
            _ => {
                return Err(ScriptError::type_error(format!(
                    "add_element() expects an element, not '{}'",
                    child.type_name()
                )));
            }
        };
        match self.doc.handles.get(slot) {
            Some(ScriptObject::Detached(_)) => {}
            Some(_) => return Err(ScriptError::other("element has already been added")),
            None => return Err(stale_handle()),
        }
        let destination = match target {
            Target::Page(page) => {
                self.page_ref(page)?;
                Destination::Placed { page, parent: None }
            }
            Target::Element(parent) => match self.locate(parent)? {
                Located::Free { root, .. } if root == slot => {
                    return Err(ScriptError::other("cannot add an element to itself"));
                }
                Located::Free { root, path } => Destination::Free { parent, root, path },
                Located::Placed { page, id } => Destination::Placed {
                    page,
                    parent: Some(id),
                },
            },
        };
        let element = match self.doc.handles.get(slot) {
            Some(ScriptObject::Detached(element)) => element.clone(),
            _ => return Err(stale_handle()),
        };
        let placed = match destination {
            Destination::Free {
                parent: parent_slot,
                root,
                path,
            } => {
                let Some(ScriptObject::Detached(root_element)) = self.doc.handles.get_mut(root) else {
                    return Err(stale_handle());
                };
                let mut parent = root_element;
                for index in path {
                    parent = parent.children.get_mut(index).ok_or_else(stale_handle)?;
                }
                parent.children.push(element);
                ScriptObject::Moved {
                    parent: parent_slot,
                    index: parent.children.len() - 1,
                }
            }
            Destination::Placed { page, parent } => {
                let id = self
                    .page_mut(page)?
                    .insert(parent, element, Provenance::Script)
                    .map_err(folio_error)?;
                ScriptObject::Attached { page, id }
            }
        };
        self.doc.handles[slot] = placed;
        Ok(())
    }

    fn create(&mut self, name: &str, args: &Args) -> Result<Value, ScriptError> {
        let element = match name {
            "Element" | "Rect" => {
                args.check(name, &FRAME_KEYWORDS)?;
                let kind = if name == "Rect" {
                    ElementKind::Rect
                } else {
                    ElementKind::Group
                };
                let frame = frame_args(args, name, 0)?;
                Element::new(kind, frame).with_paint(paint_args(args, name)?)
            }
            "Text" | "TextBox" => {
                args.check(name, &[&FRAME_KEYWORDS[..], &TEXT_KEYWORDS[..], &["text"][..]].concat())?;
                let text = args.string(0, "text", name)?.unwrap_or_default().to_string();
                let style = text_style_args(args, name)?;
                let kind = if name == "Text" {
                    ElementKind::Text(crate::elements::Text::new(text, style))
                } else {
                    ElementKind::TextBox(crate::elements::TextBox::new(text, style))
                };
                Element::new(kind, frame_args(args, name, 1)?).with_paint(paint_args(args, name)?)
            }
            "Image" => {
                args.check(name, &[&FRAME_KEYWORDS[..], &["path"][..]].concat())?;
                let path = args
                    .string(0, "path", name)?
                    .ok_or_else(|| missing_argument(name, "path"))?
                    .to_string();
                let kind = ElementKind::Image(crate::elements::Image::new(path));
                Element::new(kind, frame_args(args, name, 1)?).with_paint(paint_args(args, name)?)
            }
            "ColorCell" => {
                args.check(
                    name,
                    &[&FRAME_KEYWORDS[..], &["color", "layout", "labels", "base", "shade"][..]].concat(),
                )?;
                let color = color_value(args.require(0, "color", name)?, name)?
                    .ok_or_else(|| missing_argument(name, "color"))?;
                let mut cell = ColorCell::new(color);
                if let Some(layout) = args.keyword("layout") {
                    let layout = layout.as_str().ok_or_else(|| {
                        ScriptError::type_error("ColorCell() layout must be a string")
                    })?;
                    cell = cell.with_layout(layout.parse::<CellLayout>().map_err(folio_error)?);
                }
                if let Some(labels) = args.keyword("labels") {
                    cell = cell.with_labels(label_values(labels)?);
                }
                if let (Some(base), Some(shade)) = (args.keyword("base"), args.keyword("shade")) {
                    cell = cell.with_theme_position(index_value(base, name)?, index_value(shade, name)?);
                }
                let kind = ElementKind::ColorCell(cell);
                Element::new(kind, frame_args(args, name, 1)?).with_paint(paint_args(args, name)?)
            }
            _ => return Err(ScriptError::name_error(name)),
        };
        Ok(self.new_handle(element))
    }

    fn document_attr(&self, name: &str) -> Result<Value, ScriptError> {
        let doc = &*self.doc;
        Ok(match name {
            "w" => number(doc.w()),
            "h" => number(doc.h()),
            "pw" => number(doc.pw()),
            "ph" => number(doc.ph()),
            "padding" => padding_value(doc.padding()),
            "pages" => Value::List((0..doc.pages.len()).map(|i| ObjectRef::page(i).into()).collect()),
            "page_count" => Value::from(doc.pages.len()),
            "theme" => Value::from(doc.theme.name()),
            _ => return Err(ScriptError::attribute("Document", name)),
        })
    }

    fn page_attr(&self, index: usize, name: &str) -> Result<Value, ScriptError> {
        let page = self.page_ref(index)?;
        Ok(match name {
            "w" => page.w().map(number).unwrap_or_default(),
            "h" => page.h().map(number).unwrap_or_default(),
            "pn" => Value::from(page.pn()),
            "name" => Value::from(page.name().map(str::to_string)),
            "template" => Value::from(page.template().map(str::to_string)),
            "padding" => padding_value(page.padding()),
            "pt" => number(page.pt()),
            "pr" => number(page.pr()),
            "pb" => number(page.pb()),
            "pl" => number(page.pl()),
            "pw" => number(page.pw()),
            "ph" => number(page.ph()),
            _ => return Err(ScriptError::attribute("Page", name)),
        })
    }

    fn set_page_attr(&mut self, index: usize, name: &str, value: Value) -> Result<(), ScriptError> {
        let page = self.page_mut(index)?;
        let mut padding = page.padding();
        match name {
            "w" => page.set_w(number_value(&value, "Page.w")?),
            "h" => page.set_h(number_value(&value, "Page.h")?),
            "name" => page.set_name(optional_string(&value, "Page.name")?),
            "padding" => page.set_padding(padding_from(&value)?),
            "pt" | "pr" | "pb" | "pl" => {
                let v = number_value(&value, name)?;
                match name {
                    "pt" => padding.top = v,
                    "pr" => padding.right = v,
                    "pb" => padding.bottom = v,
                    _ => padding.left = v,
                }
                page.set_padding(padding);
            }
            "pn" | "pw" | "ph" | "template" => return Err(read_only("Page", name)),
            _ => return Err(ScriptError::attribute("Page", name)),
        }
        Ok(())
    }

    fn element_attr(&self, slot: usize, name: &str) -> Result<Value, ScriptError> {
        let view = self.element(slot)?;
        let type_name = view.kind.type_name();
        Ok(match name {
            "x" => number(view.frame.x),
            "y" => number(view.frame.y),
            "w" => view.frame.w.map(number).unwrap_or_default(),
            "h" => view.frame.h.map(number).unwrap_or_default(),
            "padding" => padding_value(view.frame.padding),
            "fill" => Value::from(view.paint.fill.clone()),
            "stroke" => Value::from(view.paint.stroke.clone()),
            "kind" => Value::from(type_name),
            "text" => match view.kind.text() {
                Some(text) => Value::from(text),
                None => return Err(ScriptError::attribute(type_name, name)),
            },
            "color" => match view.kind {
                ElementKind::ColorCell(cell) => Value::Color(cell.color.clone()),
                _ => return Err(ScriptError::attribute(type_name, name)),
            },
            _ => return Err(ScriptError::attribute(type_name, name)),
        })
    }

    fn set_element_attr(&mut self, slot: usize, name: &str, value: Value) -> Result<(), ScriptError> {
        let view = self.element_mut(slot)?;
        let type_name = view.kind.type_name();
        match name {
            "x" => view.frame.x = number_value(&value, "x")?,
            "y" => view.frame.y = number_value(&value, "y")?,
            "w" => view.frame.w = optional_number(&value, "w")?,
            "h" => view.frame.h = optional_number(&value, "h")?,
            "padding" => view.frame.padding = padding_from(&value)?,
            "fill" => view.paint.fill = color_value(&value, "fill")?,
            "stroke" => view.paint.stroke = color_value(&value, "stroke")?,
            "text" => {
                let text = value
                    .as_str()
                    .ok_or_else(|| ScriptError::type_error("text must be a string"))?;
                if !view.kind.set_text(text) {
                    return Err(ScriptError::attribute(type_name, name));
                }
            }
            "color" => match view.kind {
                ElementKind::ColorCell(cell) => {
                    cell.color = color_value(&value, "color")?
                        .ok_or_else(|| ScriptError::type_error("color cannot be None"))?;
                }
                _ => return Err(ScriptError::attribute(type_name, name)),
            },
            "kind" => return Err(read_only(type_name, name)),
            _ => return Err(ScriptError::attribute(type_name, name)),
        }
        Ok(())
    }

    fn document_method(&mut self, name: &str, args: Args) -> Result<Value, ScriptError> {
        match name {
            "new_page" => {
                args.check(name, &["w", "h", "name", "template"])?;
                let options = PageOptions {
                    w: args.number(0, "w", name)?.map(|v| v as f32),
                    h: args.number(1, "h", name)?.map(|v| v as f32),
                    name: args.string(2, "name", name)?.map(str::to_string),
                    template: args.string(3, "template", name)?.map(str::to_string),
                };
                let page = self.doc.new_page_with(options).map_err(folio_error)?;
                page.scripted = true;
                Ok(Value::Object(ObjectRef::page(self.doc.pages.len() - 1)))
            }
            "page" => {
                args.check(name, &["pn"])?;
                let pn = args
                    .require(0, "pn", name)?
                    .as_int()
                    .ok_or_else(|| ScriptError::type_error("page() expects an integer page number"))?;
                let index = usize::try_from(pn)
                    .ok()
                    .and_then(|pn| pn.checked_sub(1))
                    .filter(|index| *index < self.doc.pages.len())
                    .ok_or_else(|| ScriptError::other(format!("Document has no page {}", pn)))?;
                Ok(Value::Object(ObjectRef::page(index)))
            }
            "color" | "text_color" => {
                args.check(name, &["base", "shade"])?;
                let base = args.require(0, "base", name)?.as_int();
                let shade = args.require(1, "shade", name)?.as_int();
                let (Some(base), Some(shade)) = (base, shade) else {
                    return Err(ScriptError::type_error(format!("{}() expects integer indices", name)));
                };
                let (base, shade) = (base as isize, shade as isize);
                let color = if name == "color" {
                    self.doc.theme.get_color(base, shade)
                } else {
                    self.doc.theme.text_color(base, shade)
                };
                color
                    .map(|c| Value::Color(c.clone()))
                    .map_err(|e| ScriptError::other(e.to_string()))
            }
            _ => Err(ScriptError::attribute("Document", name)),
        }
    }
}

impl Host for DocumentHost<'_> {
    fn get_attr(&self, object: ObjectRef, name: &str) -> Result<Value, ScriptError> {
        match object.kind {
            ObjectKind::Document => self.document_attr(name),
            ObjectKind::Page => self.page_attr(object.id, name),
            ObjectKind::Element => self.element_attr(object.id, name),
        }
    }

    fn set_attr(&mut self, object: ObjectRef, name: &str, value: Value) -> Result<(), ScriptError> {
        match object.kind {
            ObjectKind::Document => match name {
                "w" => {
                    let w = number_value(&value, "Document.w")?;
                    self.doc.set_size(w, self.doc.h());
                    Ok(())
                }
                "h" => {
                    let h = number_value(&value, "Document.h")?;
                    self.doc.set_size(self.doc.w(), h);
                    Ok(())
                }
                "padding" => {
                    self.doc.set_padding(padding_from(&value)?);
                    Ok(())
                }
                "pw" | "ph" | "pages" | "page_count" | "theme" => Err(read_only("Document", name)),
                _ => Err(ScriptError::attribute("Document", name)),
            },
            ObjectKind::Page => self.set_page_attr(object.id, name, value),
            ObjectKind::Element => self.set_element_attr(object.id, name, value),
        }
    }

    fn call_method(&mut self, object: ObjectRef, name: &str, args: Args) -> Result<Value, ScriptError> {
        match (object.kind, name) {
            (ObjectKind::Document, _) => self.document_method(name, args),
            (ObjectKind::Page | ObjectKind::Element, "add_element") => {
                args.check(name, &["element"])?;
                let child = args.require(0, "element", name)?.clone();
                let target = match object.kind {
                    ObjectKind::Page => Target::Page(object.id),
                    _ => Target::Element(object.id),
                };
                self.attach(&child, target)?;
                Ok(child)
            }
            (ObjectKind::Page, _) => Err(ScriptError::attribute("Page", name)),
            (ObjectKind::Element, _) => {
                let type_name = self.element(object.id)?.kind.type_name();
                Err(ScriptError::attribute(type_name, name))
            }
        }
    }

    fn has_function(&self, name: &str) -> bool {
        ELEMENT_FUNCTIONS.contains(&name)
    }

    fn call_function(&mut self, name: &str, args: Args) -> Result<Value, ScriptError> {
        self.create(name, &args)
    }
}

struct ElementView<'a> {
    kind: &'a ElementKind,
    frame: &'a Frame,
    paint: &'a Paint,
}

struct ElementViewMut<'a> {
    kind: &'a mut ElementKind,
    frame: &'a mut Frame,
    paint: &'a mut Paint,
}

fn stale_handle() -> ScriptError {
    ScriptError::other("element handle is no longer valid")
}

fn read_only(type_name: &str, name: &str) -> ScriptError {
    ScriptError::new(
        ErrorKind::MissingAttribute,
        format!("'{}' attribute '{}' is read-only", type_name, name),
    )
}

fn missing_argument(func: &str, name: &str) -> ScriptError {
    ScriptError::type_error(format!("{}() missing required argument '{}'", func, name))
}

fn folio_error(err: FolioError) -> ScriptError {
    ScriptError::other(err.to_string())
}

/// Whole numbers come back as ints, so `str(page.w)` reads `300`.
fn number(value: f32) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f32 {
        Value::Int(value as i64)
    } else {
        Value::Float(value as f64)
    }
}

fn number_value(value: &Value, what: &str) -> Result<f32, ScriptError> {
    match value {
        Value::Int(_) | Value::Float(_) => value
            .as_f64()
            .map(|v| v as f32)
            .ok_or_else(|| ScriptError::type_error(format!("{} must be a number", what))),
        other => Err(ScriptError::type_error(format!(
            "{} must be a number, not {}",
            what,
            other.type_name()
        ))),
    }
}

fn optional_number(value: &Value, what: &str) -> Result<Option<f32>, ScriptError> {
    match value {
        Value::None => Ok(None),
        other => number_value(other, what).map(Some),
    }
}

fn optional_string(value: &Value, what: &str) -> Result<Option<String>, ScriptError> {
    match value {
        Value::None => Ok(None),
        Value::Str(s) => Ok(Some(s.clone())),
        other => Err(ScriptError::type_error(format!(
            "{} must be a string, not {}",
            what,
            other.type_name()
        ))),
    }
}

fn index_value(value: &Value, func: &str) -> Result<usize, ScriptError> {
    value
        .as_int()
        .and_then(|i| usize::try_from(i).ok())
        .ok_or_else(|| ScriptError::type_error(format!("{}() expects a non-negative integer", func)))
}

fn padding_value(padding: Padding) -> Value {
    Value::List(vec![
        number(padding.top),
        number(padding.right),
        number(padding.bottom),
        number(padding.left),
    ])
}

/// A number, or a list of one to four numbers in CSS order.
fn padding_from(value: &Value) -> Result<Padding, ScriptError> {
    let values = match value {
        Value::List(items) => items
            .iter()
            .map(|item| number_value(item, "padding"))
            .collect::<Result<Vec<_>, _>>()?,
        other => vec![number_value(other, "padding")?],
    };
    Padding::from_values(&values)
        .ok_or_else(|| ScriptError::other(format!("padding takes 1 to 4 values, got {}", values.len())))
}

/// Accepts a colour, a hex string or CSS name, a spot number, a grey
/// level between 0 and 1, or `None`.
fn color_value(value: &Value, what: &str) -> Result<Option<Color>, ScriptError> {
    let color = match value {
        Value::None => return Ok(None),
        Value::Color(c) => Ok(c.clone()),
        Value::Str(s) => Color::from_hex(s).or_else(|_| Color::named(s)),
        Value::Int(n) => match u32::try_from(*n) {
            Ok(spot) => Color::spot(spot),
            Err(_) => return Err(ScriptError::other(format!("{} is not a spot number", n))),
        },
        Value::Float(level) => Ok(Color::gray(*level as f32)),
        other => {
            return Err(ScriptError::type_error(format!(
                "{} must be a color, not {}",
                what,
                other.type_name()
            )));
        }
    };
    color.map(Some).map_err(|e| ScriptError::other(e.to_string()))
}

fn label_values(value: &Value) -> Result<Vec<CellLabel>, ScriptError> {
    let items = match value {
        Value::List(items) => items.as_slice(),
        other => std::slice::from_ref(other),
    };
    items
        .iter()
        .map(|item| {
            item.as_str()
                .ok_or_else(|| ScriptError::type_error("labels must be strings"))?
                .parse::<CellLabel>()
                .map_err(folio_error)
        })
        .collect()
}

fn frame_args(args: &Args, func: &str, first: usize) -> Result<Frame, ScriptError> {
    let mut frame = Frame::new(
        args.number(first, "x", func)?.unwrap_or(0.0) as f32,
        args.number(first + 1, "y", func)?.unwrap_or(0.0) as f32,
        args.number(first + 2, "w", func)?.map(|v| v as f32),
        args.number(first + 3, "h", func)?.map(|v| v as f32),
    );
    if let Some(padding) = args.keyword("padding") {
        frame.padding = padding_from(padding)?;
    }
    Ok(frame)
}

fn paint_args(args: &Args, func: &str) -> Result<Paint, ScriptError> {
    let mut paint = Paint::default();
    if let Some(fill) = args.keyword("fill") {
        paint.fill = color_value(fill, func)?;
    }
    if let Some(stroke) = args.keyword("stroke") {
        paint.stroke = color_value(stroke, func)?;
    }
    if let Some(width) = args.keyword("stroke_width") {
        paint.stroke_width = number_value(width, "stroke_width")?;
    }
    Ok(paint)
}

fn text_style_args(args: &Args, func: &str) -> Result<TextStyle, ScriptError> {
    let mut style = TextStyle::default();
    if let Some(font) = args.keyword("font") {
        style.font = font
            .as_str()
            .ok_or_else(|| ScriptError::type_error(format!("{}() font must be a string", func)))?
            .to_string();
    }
    if let Some(size) = args.keyword("font_size") {
        style.font_size = number_value(size, "font_size")?;
    }
    if let Some(fill) = args.keyword("text_fill") {
        if let Some(color) = color_value(fill, func)? {
            style.fill = color;
        }
    }
    if let Some(align) = args.keyword("align") {
        style.align = match align.as_str() {
            Some("left") => TextAlign::Left,
            Some("center") => TextAlign::Center,
            Some("right") => TextAlign::Right,
            _ => {
                return Err(ScriptError::other(format!(
                    "{}() align must be 'left', 'center' or 'right'",
                    func
                )));
            }
        };
    }
    Ok(style)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_render_core::RecordingContext;
    use folio_script::Bindings;

    fn document() -> Document {
        let mut doc = Document::builder()
            .with_size(500.0, 400.0)
            .with_context(Box::new(RecordingContext::new()))
            .into_document();
        doc.new_page();
        doc
    }

    fn run(doc: &mut Document, source: &str) -> Result<Bindings, ScriptError> {
        let mut bindings = Bindings::new();
        bindings.insert("doc", ObjectRef::document());
        bindings.insert("page", ObjectRef::page(0));
        folio_script::execute(source, &mut DocumentHost::new(doc), &mut bindings)?;
        Ok(bindings)
    }

    #[test]
    fn reads_document_and_page_attributes() {
        let mut doc = document();
        let bindings = run(
            &mut doc,
            "w = doc.w\npw = doc.pw\nn = doc.page_count\npn = page.pn\npl = page.pl",
        )
        .unwrap();
        assert_eq!(bindings.get_int("w"), Some(500));
        assert_eq!(bindings.get_int("pw"), Some(440));
        assert_eq!(bindings.get_int("n"), Some(1));
        assert_eq!(bindings.get_int("pn"), Some(1));
        assert_eq!(bindings.get_int("pl"), Some(30));
    }

    #[test]
    fn scripted_pages_are_marked() {
        let mut doc = document();
        run(&mut doc, "p = doc.new_page(200, name='extra')\np.h = 250").unwrap();
        let page = doc.page(2).unwrap();
        assert!(page.scripted);
        assert_eq!((page.w(), page.h()), (Some(200.0), Some(250.0)));
        assert_eq!(page.name(), Some("extra"));
    }

    #[test]
    fn read_only_attributes_fail() {
        let mut doc = document();
        let err = run(&mut doc, "page.pn = 4").unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingAttribute);
        let err = run(&mut doc, "page.nothing").unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingAttribute);
    }

    #[test]
    fn elements_start_detached_and_can_nest() {
        let mut doc = document();
        run(
            &mut doc,
            "g = Element(10, 20)\nr = Rect(0, 0, 50, 60, fill='#FF0000')\ng.add_element(r)\nr.w = 70\npage.add_element(g)\nr.h = 80",
        )
        .unwrap();
        let page = doc.page(1).unwrap();
        let roots = page.tree().roots();
        assert_eq!(roots.len(), 1);
        let group = page.element(roots[0]).unwrap();
        assert_eq!(group.provenance(), Provenance::Script);
        assert_eq!((group.frame.x, group.frame.y), (10.0, 20.0));
        let rect = page.element(group.children()[0]).unwrap();
        assert_eq!((rect.frame.w, rect.frame.h), (Some(70.0), Some(80.0)));
        assert_eq!(rect.paint.fill, Some(Color::from_hex("FF0000").unwrap()));
    }

    #[test]
    fn deeply_nested_handles_stay_valid() {
        let mut doc = document();
        let bindings = run(
            &mut doc,
            "a = Element()\nb = Element()\nc = Text('deep')\na.add_element(b)\nb.add_element(c)\nc.text = 'deeper'\npage.add_element(a)\nt = c.text",
        )
        .unwrap();
        assert_eq!(bindings.get_str("t"), Some("deeper"));
    }

    #[test]
    fn elements_cannot_be_added_twice_or_into_themselves() {
        let mut doc = document();
        let err = run(&mut doc, "r = Rect()\npage.add_element(r)\npage.add_element(r)").unwrap_err();
        assert!(err.message.contains("already"));
        let err = run(&mut doc, "a = Element()\nb = Element()\na.add_element(b)\nb.add_element(a)").unwrap_err();
        assert!(err.message.contains("itself"));
    }

    #[test]
    fn constructors_check_arguments() {
        let mut doc = document();
        let err = run(&mut doc, "r = Rect(0, 0, 10, 10, colour='red')").unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
        let err = run(&mut doc, "r = Rect('x')").unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
        let err = run(&mut doc, "c = ColorCell(layout='overlay')").unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn color_cells_and_theme_colors() {
        let mut doc = document();
        let bindings = run(
            &mut doc,
            "c = doc.color(1, 4)\ncell = ColorCell(c, 0, 0, 100, 80, layout='spotsample', labels=['hex', 'spot'])\npage.add_element(cell)\nsame = cell.color",
        )
        .unwrap();
        let expected = doc.theme().get_color(1, 4).unwrap().clone();
        assert_eq!(bindings.get("same"), Some(&Value::Color(expected)));
        let page = doc.page(1).unwrap();
        let node = page.element(page.tree().roots()[0]).unwrap();
        match &node.kind {
            ElementKind::ColorCell(cell) => {
                assert_eq!(cell.layout, CellLayout::SpotSample);
                assert_eq!(cell.labels, vec![CellLabel::Hex, CellLabel::Spot]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn color_values_accept_several_forms() {
        assert_eq!(color_value(&Value::None, "fill").unwrap(), None);
        assert_eq!(
            color_value(&Value::from("#00FF00"), "fill").unwrap(),
            Some(Color::rgb(0.0, 1.0, 0.0))
        );
        assert!(color_value(&Value::from("red"), "fill").unwrap().is_some());
        assert_eq!(color_value(&Value::Float(0.5), "fill").unwrap(), Some(Color::gray(0.5)));
        assert!(color_value(&Value::Bool(true), "fill").is_err());
    }

    #[test]
    fn padding_shorthand() {
        let mut doc = document();
        let bindings = run(&mut doc, "page.padding = [10, 20]\np = page.padding\npw = page.pw").unwrap();
        assert_eq!(
            bindings.get("p"),
            Some(&Value::List(vec![
                Value::Int(10),
                Value::Int(20),
                Value::Int(10),
                Value::Int(20)
            ]))
        );
        assert_eq!(bindings.get_int("pw"), Some(460));
    }

    #[test]
    fn page_lookup_by_number() {
        let mut doc = document();
        let bindings = run(&mut doc, "p = doc.page(1)\nn = p.pn").unwrap();
        assert_eq!(bindings.get_int("n"), Some(1));
        assert!(run(&mut doc, "doc.page(3)").is_err());
    }
}
