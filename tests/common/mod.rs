#![allow(dead_code)]

use folio::{Document, RecordingContext};
use lopdf::content::Content;
use lopdf::{Document as LopdfDocument, Object};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A document that records drawing calls instead of producing a file.
pub fn recording_document() -> Document {
    init_logging();
    Document::builder()
        .with_context(Box::new(RecordingContext::new()))
        .into_document()
}

pub fn recording(doc: &Document) -> &RecordingContext {
    doc.context()
        .as_any()
        .downcast_ref::<RecordingContext>()
        .expect("document draws into a RecordingContext")
}

/// Wrapper around an exported PDF with helper methods
pub struct GeneratedPdf {
    pub bytes: Vec<u8>,
    pub doc: LopdfDocument,
}

impl GeneratedPdf {
    pub fn load(path: &std::path::Path) -> Result<Self, Box<dyn std::error::Error>> {
        let bytes = std::fs::read(path)?;
        let doc = LopdfDocument::load_mem(&bytes)?;
        Ok(Self { bytes, doc })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// `[width, height]` of every page, from the media boxes.
    pub fn page_sizes(&self) -> Vec<(f32, f32)> {
        self.doc
            .get_pages()
            .values()
            .filter_map(|id| {
                let page = self.doc.get_dictionary(*id).ok()?;
                let media_box = page.get(b"MediaBox").ok()?.as_array().ok()?;
                let number = |o: &Object| o.as_float().ok().or_else(|| o.as_i64().ok().map(|i| i as f32));
                Some((number(&media_box[2])?, number(&media_box[3])?))
            })
            .collect()
    }

    /// Strings shown with `Tj`, per page.
    pub fn page_texts(&self) -> Vec<Vec<String>> {
        self.doc
            .get_pages()
            .values()
            .map(|id| {
                let bytes = self.doc.get_page_content(*id).unwrap_or_default();
                Content::decode(&bytes)
                    .map(|content| {
                        content
                            .operations
                            .into_iter()
                            .filter(|op| op.operator == "Tj")
                            .filter_map(|op| match op.operands.first() {
                                Some(Object::String(s, _)) => Some(String::from_utf8_lossy(s).into_owned()),
                                _ => None,
                            })
                            .collect()
                    })
                    .unwrap_or_default()
            })
            .collect()
    }
}
