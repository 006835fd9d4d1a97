use crate::builder::DocumentBuilder;
use crate::config::DocumentConfig;
use crate::element::{ElementId, ElementKind};
use crate::elements::ComposeContext;
use crate::error::FolioError;
use crate::host::{DocumentHost, ScriptObject};
use crate::page::Page;
use crate::template::{TemplateContext, Templates};
use folio_render_core::DrawingContext;
use folio_script::{Bindings, ObjectRef};
use folio_theme::Theme;
use folio_types::{Padding, Size};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Options for [`Document::new_page_with`]. Unset sizes take the document's.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageOptions {
    pub w: Option<f32>,
    pub h: Option<f32>,
    pub name: Option<String>,
    pub template: Option<String>,
}

impl PageOptions {
    pub fn with_size(mut self, w: f32, h: f32) -> Self {
        self.w = Some(w);
        self.h = Some(h);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }
}

/// An ordered set of pages and everything needed to turn them into output.
///
/// [`export`](Self::export) runs the two passes on demand: `compose` lets
/// templates, code blocks and elements resolve their content, `build`
/// replays the composed pages into the drawing context.
pub struct Document {
    pub(crate) size: Size,
    pub(crate) padding: Padding,
    pub(crate) pages: Vec<Page>,
    pub(crate) theme: Theme,
    pub(crate) templates: Templates,
    pub(crate) default_template: Option<String>,
    pub(crate) context: Box<dyn DrawingContext>,
    pub(crate) export_dir: PathBuf,
    pub(crate) show_source: bool,
    pub(crate) has_composed: bool,
    pub(crate) has_built: bool,
    pub(crate) globals: Bindings,
    /// Elements scripts hold handles to, indexed by handle id.
    pub(crate) handles: Vec<ScriptObject>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An A4 document with 30pt padding, the default theme and templates,
    /// drawing into PDF.
    pub fn new() -> Self {
        DocumentBuilder::new().into_document()
    }

    pub fn builder() -> DocumentBuilder {
        DocumentBuilder::new()
    }

    pub fn from_config(config: DocumentConfig) -> Result<Self, FolioError> {
        DocumentBuilder::from_config(config)?.build()
    }

    pub fn w(&self) -> f32 {
        self.size.width
    }

    pub fn h(&self) -> f32 {
        self.size.height
    }

    /// Changes the size given to pages attached from now on.
    pub fn set_size(&mut self, w: f32, h: f32) {
        self.size = Size::new(w, h);
    }

    pub fn padding(&self) -> Padding {
        self.padding
    }

    /// Changes the padding given to pages attached from now on.
    pub fn set_padding(&mut self, padding: impl Into<Padding>) {
        self.padding = padding.into();
    }

    pub fn pw(&self) -> f32 {
        self.size.width - self.padding.horizontal()
    }

    pub fn ph(&self) -> f32 {
        self.size.height - self.padding.vertical()
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn templates(&self) -> &Templates {
        &self.templates
    }

    pub fn templates_mut(&mut self) -> &mut Templates {
        &mut self.templates
    }

    pub fn default_template(&self) -> Option<&str> {
        self.default_template.as_deref()
    }

    /// Template for pages that do not name their own.
    pub fn set_default_template(&mut self, name: Option<String>) -> Result<(), FolioError> {
        if let Some(name) = &name {
            self.templates.get(name)?;
        }
        self.default_template = name;
        Ok(())
    }

    pub fn context(&self) -> &dyn DrawingContext {
        self.context.as_ref()
    }

    pub fn context_mut(&mut self) -> &mut dyn DrawingContext {
        self.context.as_mut()
    }

    /// Replaces the drawing context. The next export rebuilds.
    pub fn set_context(&mut self, context: Box<dyn DrawingContext>) {
        self.context = context;
        self.has_built = false;
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    pub fn set_export_dir(&mut self, dir: impl Into<PathBuf>) {
        self.export_dir = dir.into();
    }

    pub fn show_source(&self) -> bool {
        self.show_source
    }

    pub fn set_show_source(&mut self, show_source: bool) {
        self.show_source = show_source;
    }

    pub fn has_composed(&self) -> bool {
        self.has_composed
    }

    pub fn has_built(&self) -> bool {
        self.has_built
    }

    /// The bindings the code blocks shared during the last compose.
    pub fn globals(&self) -> &Bindings {
        &self.globals
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// The page with 1-based number `pn`.
    pub fn page(&self, pn: usize) -> Result<&Page, FolioError> {
        let index = self.page_index(pn)?;
        Ok(&self.pages[index])
    }

    pub fn page_mut(&mut self, pn: usize) -> Result<&mut Page, FolioError> {
        let index = self.page_index(pn)?;
        Ok(&mut self.pages[index])
    }

    fn page_index(&self, pn: usize) -> Result<usize, FolioError> {
        pn.checked_sub(1)
            .filter(|index| *index < self.pages.len())
            .ok_or(FolioError::UnknownPage(pn))
    }

    /// Appends a page of the document size, numbered after the last page.
    pub fn new_page(&mut self) -> &mut Page {
        let page = Page::new(None, None, self.pages.len() + 1, None);
        self.add_page(page)
    }

    pub fn new_page_with(&mut self, options: PageOptions) -> Result<&mut Page, FolioError> {
        if let Some(template) = &options.template {
            self.templates.get(template)?;
        }
        let mut page = Page::new(options.w, options.h, self.pages.len() + 1, options.template);
        page.set_name(options.name);
        Ok(self.add_page(page))
    }

    /// Appends `page`, filling its unset size and padding from the
    /// document's current values.
    pub fn add_page(&mut self, mut page: Page) -> &mut Page {
        page.attach(self.size.width, self.size.height, self.padding);
        let index = self.pages.len();
        self.pages.push(page);
        &mut self.pages[index]
    }

    /// Composes every page from scratch: template, code blocks, then the
    /// element tree. Pages that code blocks append are composed in turn.
    pub fn compose(&mut self) -> Result<(), FolioError> {
        self.reset_generated();
        let mut globals = Bindings::new();
        globals.insert("doc", ObjectRef::document());
        let result = self.compose_pages(&mut globals);
        self.globals = globals;
        result?;
        self.has_composed = true;
        self.has_built = false;
        log::debug!("Composed {} page(s)", self.pages.len());
        Ok(())
    }

    fn compose_pages(&mut self, globals: &mut Bindings) -> Result<(), FolioError> {
        let mut index = 0;
        while index < self.pages.len() {
            self.apply_template(index)?;
            let blocks = self.pages[index].code_blocks();
            if !blocks.is_empty() {
                globals.insert("page", ObjectRef::page(index));
                for id in blocks {
                    self.run_block(index, id, globals)?;
                }
            }
            let Document {
                pages,
                context,
                theme,
                show_source,
                ..
            } = self;
            let cx = ComposeContext {
                measure: &**context,
                theme,
                show_source: *show_source,
            };
            pages[index].compose(&cx)?;
            index += 1;
        }
        Ok(())
    }

    /// Drops what the previous compose generated: pages and elements
    /// created by code blocks, template output and script handles. The
    /// remaining pages close ranks so numbers stay contiguous.
    fn reset_generated(&mut self) {
        let before = self.pages.len();
        self.pages.retain(|page| !page.scripted);
        for (index, page) in self.pages.iter_mut().enumerate() {
            page.renumber(index + 1);
        }
        let removed: usize = self.pages.iter_mut().map(Page::clear_generated).sum();
        if before != self.pages.len() || removed > 0 {
            log::debug!(
                "Cleared {} generated page(s) and {} generated element(s)",
                before - self.pages.len(),
                removed
            );
        }
        self.handles.clear();
    }

    fn apply_template(&mut self, index: usize) -> Result<(), FolioError> {
        let page = &self.pages[index];
        let Some(name) = page
            .template()
            .map(str::to_string)
            .or_else(|| self.default_template.clone())
        else {
            return Ok(());
        };
        let template = self.templates.get(&name)?;
        let cx = TemplateContext {
            theme: &self.theme,
            page_count: self.pages.len(),
        };
        let elements = template(page, &cx)?;
        log::debug!("Applied template '{}' to page {}", name, page.pn());
        self.pages[index].apply_template_elements(elements);
        Ok(())
    }

    /// Runs one code block with this document as its host. The block is
    /// taken out of the tree for the run and written back with its new
    /// state afterwards.
    fn run_block(&mut self, index: usize, id: ElementId, globals: &mut Bindings) -> Result<(), FolioError> {
        let mut block = match self.pages.get(index).and_then(|page| page.element(id)) {
            Some(node) => match &node.kind {
                ElementKind::CodeBlock(block) => block.clone(),
                other => {
                    return Err(FolioError::invalid("code block", other.type_name()));
                }
            },
            None => return Err(FolioError::UnknownElement(id.index())),
        };
        let result = block.run_with(&mut DocumentHost::new(self), globals);
        if let Some(node) = self.pages.get_mut(index).and_then(|page| page.element_mut(id)) {
            node.kind = ElementKind::CodeBlock(block);
        }
        result.map_err(FolioError::from)
    }

    /// Runs the code block `id` on page `pn` outside of compose. Without
    /// targets the block starts from a binding set holding only `doc`.
    pub fn run_code_block(
        &mut self,
        pn: usize,
        id: ElementId,
        targets: Option<Bindings>,
    ) -> Result<Bindings, FolioError> {
        let index = self.page_index(pn)?;
        let mut targets = targets.unwrap_or_else(|| {
            let mut bindings = Bindings::new();
            bindings.insert("doc", ObjectRef::document());
            bindings
        });
        self.run_block(index, id, &mut targets)?;
        Ok(targets)
    }

    /// Starts a fresh drawing and draws every composed page into it.
    pub fn build(&mut self) -> Result<(), FolioError> {
        self.context.new_drawing()?;
        for page in &self.pages {
            page.build(self.context.as_mut(), self.show_source)?;
        }
        self.has_built = true;
        log::debug!("Built {} page(s)", self.pages.len());
        Ok(())
    }

    /// Composes and builds as needed, then saves to `path`. The drawing
    /// context picks the format from the extension.
    pub fn export<P: AsRef<Path>>(&mut self, path: P, force: bool, multipage: bool) -> Result<(), FolioError> {
        let path = path.as_ref();
        if force || !self.has_composed {
            self.compose()?;
        }
        if force || !self.has_built {
            self.build()?;
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        self.context.save_image(path, multipage)?;
        log::info!("Exported {} page(s) to {}", self.pages.len(), path.display());
        Ok(())
    }

    /// Exports `file_name` into the configured export directory.
    pub fn export_default(&mut self, file_name: &str) -> Result<PathBuf, FolioError> {
        let path = self.export_dir.join(file_name);
        self.export(&path, false, true)?;
        Ok(path)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Document w={} h={} pages={}>",
            self.size.width as i64,
            self.size.height as i64,
            self.pages.len()
        )
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("size", &self.size)
            .field("padding", &self.padding)
            .field("pages", &self.pages.len())
            .field("theme", &self.theme.name())
            .field("templates", &self.templates)
            .field("has_composed", &self.has_composed)
            .field("has_built", &self.has_built)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;
    use crate::elements::{CellLabel, CellLayout, CodeBlock, ColorCell, RunState};
    use folio_render_core::RecordingContext;
    use folio_script::{CODE_KEY, ERROR_KEY, ErrorKind, Value};
    use folio_types::{Color, TextStyle};

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn recording_doc() -> Document {
        init_logger();
        Document::builder()
            .with_context(Box::new(RecordingContext::new()))
            .into_document()
    }

    fn recording(doc: &Document) -> &RecordingContext {
        doc.context()
            .as_any()
            .downcast_ref::<RecordingContext>()
            .unwrap()
    }

    #[test]
    fn pages_are_numbered_in_order() {
        let mut doc = Document::new();
        for _ in 0..3 {
            doc.new_page();
        }
        assert_eq!(doc.pages().len(), 3);
        for (i, page) in doc.pages().iter().enumerate() {
            assert_eq!(page.pn(), i + 1);
        }
        assert_eq!(doc.to_string(), "<Document w=595 h=842 pages=3>");
        assert_eq!(doc.pages()[0].to_string(), "<Page pn=1 w=595 h=842 elements=0>");
    }

    #[test]
    fn add_page_fills_size_at_attachment() {
        let mut doc = Document::new();
        let page = doc.add_page(Page::default());
        assert_eq!((page.w(), page.h()), (Some(595.0), Some(842.0)));
        assert_eq!(page.pl(), 30.0);
        doc.set_size(300.0, 400.0);
        assert_eq!(doc.page(1).unwrap().w(), Some(595.0));
        assert_eq!(doc.new_page().w(), Some(300.0));
    }

    #[test]
    fn unknown_pages_and_templates() {
        let mut doc = Document::new();
        doc.new_page();
        assert!(matches!(doc.page(0), Err(FolioError::UnknownPage(0))));
        assert!(matches!(doc.page(2), Err(FolioError::UnknownPage(2))));
        assert!(matches!(
            doc.new_page_with(PageOptions::default().with_template("nope")),
            Err(FolioError::UnknownTemplate(_))
        ));
        assert_eq!(doc.pages().len(), 1);
    }

    #[test]
    fn export_composes_and_builds_once_unless_forced() {
        let mut doc = recording_doc();
        doc.new_page();
        doc.new_page();
        doc.export("a.pdf", false, false).unwrap();
        doc.export("b.pdf", false, false).unwrap();
        {
            let rec = recording(&doc);
            assert_eq!(rec.new_drawing_calls(), 1);
            assert_eq!(rec.new_page_calls(), 2);
            assert_eq!(rec.save_calls(), 2);
        }
        doc.export("c.pdf", true, false).unwrap();
        let rec = recording(&doc);
        assert_eq!(rec.new_drawing_calls(), 2);
        assert_eq!(rec.new_page_calls(), 4);
        assert_eq!(rec.page_count(), 2);
        assert_eq!(rec.saved_paths().len(), 3);
    }

    #[test]
    fn export_creates_the_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = recording_doc();
        doc.new_page();
        let path = dir.path().join("nested/deeper/out.pdf");
        doc.export(&path, false, true).unwrap();
        assert!(path.parent().unwrap().is_dir());
        assert_eq!(recording(&doc).saved_paths(), &[path]);
    }

    #[test]
    fn guarded_block_in_compose_records_name_error() {
        let mut doc = recording_doc();
        let id = doc
            .new_page()
            .add_element(Element::code_block(CodeBlock::new("a = missing_name")));
        doc.compose().unwrap();
        assert_eq!(doc.globals().get_str(ERROR_KEY), Some("NameError"));
        assert_eq!(doc.globals().get_str(CODE_KEY), Some("a = missing_name"));
        let node = doc.page(1).unwrap().element(id).unwrap();
        match &node.kind {
            ElementKind::CodeBlock(block) => {
                assert_eq!(block.state(), RunState::Failed(ErrorKind::UnresolvedName))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn strict_block_fails_export() {
        let mut doc = recording_doc();
        doc.new_page()
            .add_element(Element::code_block(CodeBlock::strict("a = 1 + 'x'")));
        let err = doc.export("x.pdf", false, false).unwrap_err();
        match err {
            FolioError::Script(e) => assert_eq!(e.kind, ErrorKind::TypeMismatch),
            other => panic!("unexpected {:?}", other),
        }
        assert!(!doc.has_composed());
        assert_eq!(recording(&doc).save_calls(), 0);
    }

    #[test]
    fn run_code_block_seeds_doc_and_adds_a_page() {
        let mut doc = Document::builder().with_size(500.0, 500.0).into_document();
        let id = doc.new_page().add_element(Element::code_block(CodeBlock::strict(
            "a = 100 * 300\npage = doc.new_page()\npage.w = 300",
        )));
        let result = doc.run_code_block(1, id, None).unwrap();
        let mut keys: Vec<_> = result.keys().collect();
        keys.sort();
        assert_eq!(keys, vec!["__code__", "a", "doc", "page"]);
        assert_eq!(result.get_int("a"), Some(30000));
        assert_eq!(result.get("page"), Some(&Value::Object(ObjectRef::page(1))));
        let page = doc.page(2).unwrap();
        assert_eq!((page.pn(), page.w(), page.h()), (2, Some(300.0), Some(500.0)));
        assert_eq!(page.to_string(), "<Page pn=2 w=300 h=500 elements=0>");
    }

    #[test]
    fn recompose_does_not_duplicate_script_output() {
        let mut doc = recording_doc();
        doc.new_page().add_element(Element::code_block(CodeBlock::strict(
            "p = doc.new_page(name='extra')\np.add_element(Rect(10, 10, 50, 50, fill='#FF0000'))\npage.add_element(Text('hello'))",
        )));
        doc.compose().unwrap();
        doc.compose().unwrap();
        assert_eq!(doc.pages().len(), 2);
        assert_eq!(doc.page(2).unwrap().name(), Some("extra"));
        assert_eq!(doc.page(2).unwrap().elements().count(), 1);
        // The code block and the scripted text.
        assert_eq!(doc.page(1).unwrap().elements().count(), 2);
    }

    #[test]
    fn recompose_keeps_page_numbers_contiguous() {
        let mut doc = recording_doc();
        doc.new_page()
            .add_element(Element::code_block(CodeBlock::strict("doc.new_page(name='scripted')")));
        doc.compose().unwrap();
        doc.new_page().set_name(Some("appended".to_string()));
        doc.compose().unwrap();
        let pns: Vec<_> = doc.pages().iter().map(Page::pn).collect();
        assert_eq!(pns, vec![1, 2, 3]);
        assert_eq!(doc.page(2).unwrap().name(), Some("appended"));
        assert_eq!(doc.page(3).unwrap().name(), Some("scripted"));
    }

    #[test]
    fn color_cells_are_composed_and_drawn() {
        let mut doc = recording_doc();
        let cell = ColorCell::new(Color::spot(300).unwrap())
            .with_layout(CellLayout::SpotSample)
            .with_labels(vec![CellLabel::Spot, CellLabel::Hex]);
        let page = doc.new_page();
        let id = page.add_element(Element::color_cell(cell, 100.0, 150.0).at(30.0, 30.0));
        doc.export("cells.pdf", false, false).unwrap();
        doc.export("cells.pdf", true, false).unwrap();
        assert_eq!(doc.page(1).unwrap().element(id).unwrap().children().len(), 3);
        let rec = recording(&doc);
        assert_eq!(rec.texts()[0], "Spot 300");
        assert!(rec.texts()[1].starts_with("(#"));
        assert_eq!(rec.rects()[0].y, 30.0 + 24.0);
    }

    #[test]
    fn templates_apply_during_compose() {
        let mut doc = recording_doc();
        doc.set_default_template(Some("default".to_string())).unwrap();
        doc.new_page();
        doc.new_page_with(PageOptions::default().with_name("Cover").with_template("cover"))
            .unwrap();
        doc.compose().unwrap();
        doc.compose().unwrap();
        doc.build().unwrap();
        let rec = recording(&doc);
        assert_eq!(rec.texts(), vec!["1", "Cover"]);
        assert!(doc.set_default_template(Some("missing".to_string())).is_err());
    }

    #[test]
    fn show_source_draws_code() {
        let mut doc = recording_doc();
        doc.set_show_source(true);
        doc.new_page()
            .add_element(Element::code_block(CodeBlock::new("x = 1\ny = 2")).at(30.0, 700.0));
        doc.export("src.pdf", false, false).unwrap();
        assert_eq!(recording(&doc).texts(), vec!["x = 1", "y = 2"]);

        let mut hidden = recording_doc();
        hidden
            .new_page()
            .add_element(Element::code_block(CodeBlock::new("x = 1")));
        hidden.export("src.pdf", false, false).unwrap();
        assert!(recording(&hidden).texts().is_empty());
    }

    #[test]
    fn text_is_drawn_at_its_baseline() {
        let mut doc = recording_doc();
        doc.new_page()
            .add_element(Element::text("Title", TextStyle::new("Helvetica", 20.0)).at(30.0, 800.0));
        doc.export("t.pdf", false, false).unwrap();
        assert_eq!(recording(&doc).texts(), vec!["Title"]);
    }
}
