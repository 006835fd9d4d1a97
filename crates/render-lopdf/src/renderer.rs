use folio_render_core::{DrawingContext, RenderError, utils};
use folio_types::{Color, Paint, Point, Rect, TextStyle};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};
use std::any::Any;
use std::io::Write;
use std::path::Path;

/// An in-memory PDF drawing surface built on `lopdf`.
///
/// Pages are kept as operation lists until the next page opens or the
/// document is saved. Fonts are the standard Type1 fonts, registered the
/// first time a family is drawn.
pub struct PdfContext {
    document: Document,
    pages_id: ObjectId,
    resources_id: ObjectId,
    page_ids: Vec<ObjectId>,
    /// Standard font name and its resource name, in registration order.
    fonts: Vec<(&'static str, String)>,
    current: Option<PageState>,
}

struct PageState {
    width: f32,
    height: f32,
    content: Content,
}

impl Default for PdfContext {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfContext {
    pub fn new() -> Self {
        let mut document = Document::with_version("1.7");
        let pages_id = document.new_object_id();
        let resources_id = document.new_object_id();
        let catalog_id = document.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        document.trailer.set("Root", catalog_id);
        Self {
            document,
            pages_id,
            resources_id,
            page_ids: Vec::new(),
            fonts: Vec::new(),
            current: None,
        }
    }

    /// Pages written so far, including the open one.
    pub fn page_count(&self) -> usize {
        self.page_ids.len() + usize::from(self.current.is_some())
    }

    /// Finalizes the document and returns the PDF bytes.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>, RenderError> {
        self.finalize()?;
        let mut buffer = Vec::new();
        self.document.save_to(&mut buffer)?;
        Ok(buffer)
    }

    fn page(&mut self) -> Result<&mut PageState, RenderError> {
        self.current.as_mut().ok_or(RenderError::NoPage)
    }

    fn font_resource(&mut self, family: &str) -> String {
        let base = utils::standard_font(family);
        if let Some((_, resource)) = self.fonts.iter().find(|(name, _)| *name == base) {
            return resource.clone();
        }
        let resource = format!("F{}", self.fonts.len() + 1);
        self.fonts.push((base, resource.clone()));
        resource
    }

    /// Moves the open page into the document object graph.
    fn flush_page(&mut self) -> Result<(), RenderError> {
        let Some(page) = self.current.take() else {
            return Ok(());
        };
        let content_id = self
            .document
            .add_object(Stream::new(Dictionary::new(), page.content.encode()?));
        let page_id = self.document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), page.width.into(), page.height.into()],
            "Contents" => content_id,
            "Resources" => self.resources_id,
        });
        self.page_ids.push(page_id);
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), RenderError> {
        self.flush_page()?;
        let mut font_dict = Dictionary::new();
        for (base, resource) in &self.fonts {
            font_dict.set(
                resource.as_bytes(),
                Object::Dictionary(dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => *base,
                    "Encoding" => "WinAnsiEncoding",
                }),
            );
        }
        self.document.objects.insert(
            self.resources_id,
            Object::Dictionary(dictionary! { "Font" => font_dict }),
        );
        let kids: Vec<Object> = self.page_ids.iter().map(|id| Object::from(*id)).collect();
        self.document.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => self.page_ids.len() as i64,
            }),
        );
        Ok(())
    }
}

/// `k`/`K` for colours made from a CMYK recipe, `rg`/`RG` for the rest.
fn color_operation(color: &Color, stroke: bool) -> Operation {
    if color.is_cmyk() {
        let [c, m, y, k] = color.cmyk_components();
        let operator = if stroke { "K" } else { "k" };
        Operation::new(operator, vec![c.into(), m.into(), y.into(), k.into()])
    } else {
        let (r, g, b) = color.rgb_components();
        let operator = if stroke { "RG" } else { "rg" };
        Operation::new(operator, vec![r.into(), g.into(), b.into()])
    }
}

/// Standard fonts use WinAnsi; characters outside Latin-1 become `?`.
fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            code @ 0..=255 => code as u8,
            _ => b'?',
        })
        .collect()
}

impl DrawingContext for PdfContext {
    fn new_drawing(&mut self) -> Result<(), RenderError> {
        *self = Self::new();
        Ok(())
    }

    fn new_page(&mut self, width: f32, height: f32) -> Result<(), RenderError> {
        self.flush_page()?;
        self.current = Some(PageState {
            width,
            height,
            content: Content { operations: vec![] },
        });
        Ok(())
    }

    fn draw_rect(&mut self, rect: Rect, paint: &Paint) -> Result<(), RenderError> {
        let page = self.page()?;
        let ops = &mut page.content.operations;
        ops.push(Operation::new("q", vec![]));
        if let Some(fill) = &paint.fill {
            ops.push(color_operation(fill, false));
        }
        if let Some(stroke) = &paint.stroke {
            ops.push(color_operation(stroke, true));
            ops.push(Operation::new("w", vec![paint.stroke_width.into()]));
        }
        ops.push(Operation::new(
            "re",
            vec![rect.x.into(), rect.y.into(), rect.width.into(), rect.height.into()],
        ));
        let paint_op = match (paint.fill.is_some(), paint.stroke.is_some()) {
            (true, true) => "B",
            (true, false) => "f",
            (false, true) => "S",
            (false, false) => "n",
        };
        ops.push(Operation::new(paint_op, vec![]));
        ops.push(Operation::new("Q", vec![]));
        Ok(())
    }

    fn draw_text(&mut self, text: &str, origin: Point, style: &TextStyle) -> Result<(), RenderError> {
        if text.is_empty() {
            return Ok(());
        }
        self.page()?;
        let font = self.font_resource(&style.font);
        let ops = &mut self.page()?.content.operations;
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new(
            "Tf",
            vec![Object::Name(font.into_bytes()), style.font_size.into()],
        ));
        ops.push(color_operation(&style.fill, false));
        ops.push(Operation::new("Td", vec![origin.x.into(), origin.y.into()]));
        ops.push(Operation::new(
            "Tj",
            vec![Object::String(encode_text(text), StringFormat::Literal)],
        ));
        ops.push(Operation::new("ET", vec![]));
        Ok(())
    }

    fn save_image(&mut self, path: &Path, multipage: bool) -> Result<(), RenderError> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        if extension != "pdf" {
            return Err(RenderError::UnsupportedFormat(if extension.is_empty() {
                path.display().to_string()
            } else {
                extension
            }));
        }
        if multipage {
            log::debug!("PDF output always holds every page; multipage flag ignored");
        }
        let bytes = self.to_bytes()?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(&bytes)?;
        log::info!("Wrote {} page(s) to {}", self.page_ids.len(), path.display());
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_texts(doc: &Document) -> Vec<Vec<String>> {
        doc.get_pages()
            .values()
            .map(|page_id| {
                let bytes = doc.get_page_content(*page_id).unwrap();
                Content::decode(&bytes)
                    .unwrap()
                    .operations
                    .into_iter()
                    .filter(|op| op.operator == "Tj")
                    .filter_map(|op| match op.operands.first() {
                        Some(Object::String(s, _)) => Some(String::from_utf8_lossy(s).into_owned()),
                        _ => None,
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn writes_pages_and_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pdf");
        let mut ctx = PdfContext::new();
        ctx.new_drawing().unwrap();
        ctx.new_page(300.0, 400.0).unwrap();
        ctx.draw_rect(Rect::new(10.0, 10.0, 100.0, 50.0), &Paint::fill(Color::black()))
            .unwrap();
        ctx.draw_text("Hello", Point::new(20.0, 20.0), &TextStyle::default())
            .unwrap();
        ctx.new_page(300.0, 400.0).unwrap();
        ctx.draw_text("Page two", Point::new(20.0, 20.0), &TextStyle::new("Courier", 9.0))
            .unwrap();
        ctx.save_image(&path, false).unwrap();

        let doc = Document::load(&path).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
        assert_eq!(
            page_texts(&doc),
            vec![vec!["Hello".to_string()], vec!["Page two".to_string()]]
        );
    }

    #[test]
    fn new_drawing_discards_previous_pages() {
        let mut ctx = PdfContext::new();
        ctx.new_page(100.0, 100.0).unwrap();
        ctx.new_page(100.0, 100.0).unwrap();
        assert_eq!(ctx.page_count(), 2);
        ctx.new_drawing().unwrap();
        assert_eq!(ctx.page_count(), 0);
    }

    #[test]
    fn drawing_without_a_page_fails() {
        let mut ctx = PdfContext::new();
        assert!(matches!(
            ctx.draw_rect(Rect::default(), &Paint::default()),
            Err(RenderError::NoPage)
        ));
    }

    #[test]
    fn only_pdf_is_supported() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = PdfContext::new();
        ctx.new_page(100.0, 100.0).unwrap();
        let err = ctx.save_image(&dir.path().join("out.png"), true).unwrap_err();
        assert!(matches!(err, RenderError::UnsupportedFormat(ext) if ext == "png"));
        assert!(!dir.path().join("out.png").exists());
    }

    #[test]
    fn cmyk_colors_use_cmyk_operators() {
        let mut ctx = PdfContext::new();
        ctx.new_page(100.0, 100.0).unwrap();
        let paint = Paint {
            stroke: Some(Color::cmyk(1.0, 0.0, 0.0, 0.0)),
            ..Paint::fill(Color::cmyk(0.0, 1.0, 1.0, 0.0))
        };
        ctx.draw_rect(Rect::new(0.0, 0.0, 10.0, 10.0), &paint).unwrap();
        ctx.draw_text("rgb", Point::new(0.0, 0.0), &TextStyle::default())
            .unwrap();
        let ops = &ctx.page().unwrap().content.operations;
        let operators: Vec<&str> = ops.iter().map(|op| op.operator.as_str()).collect();
        assert!(operators.contains(&"k"));
        assert!(operators.contains(&"K"));
        assert!(operators.contains(&"rg"));
        assert!(!operators.contains(&"RG"));
        let fill = ops.iter().find(|op| op.operator == "k").unwrap();
        assert_eq!(fill.operands.len(), 4);
        assert_eq!(fill.operands[1].as_float().unwrap(), 1.0);
    }

    #[test]
    fn text_outside_latin1_is_replaced() {
        assert_eq!(encode_text("a€é"), vec![b'a', b'?', 0xE9]);
    }
}
