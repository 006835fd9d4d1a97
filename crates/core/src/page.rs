use crate::element::{Element, ElementId, ElementKind, Provenance};
use crate::elements::ComposeContext;
use crate::error::FolioError;
use crate::tree::{ElementTree, Node};
use folio_render_core::DrawingContext;
use folio_types::Padding;
use std::fmt;

/// A page: the root of an element tree plus its size and page number.
///
/// Size and padding stay unset until the page is attached to a document,
/// which fills in its defaults. The page number never changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pn: usize,
    w: Option<f32>,
    h: Option<f32>,
    padding: Option<Padding>,
    name: Option<String>,
    template: Option<String>,
    tree: ElementTree,
    /// Created by a code block; dropped before the next compose.
    pub(crate) scripted: bool,
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None, 1, None)
    }
}

impl Page {
    pub fn new(w: Option<f32>, h: Option<f32>, pn: usize, template: Option<String>) -> Self {
        Self {
            pn,
            w,
            h,
            padding: None,
            name: None,
            template,
            tree: ElementTree::new(),
            scripted: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_padding(mut self, padding: impl Into<Padding>) -> Self {
        self.padding = Some(padding.into());
        self
    }

    /// 1-based page number.
    pub fn pn(&self) -> usize {
        self.pn
    }

    pub fn w(&self) -> Option<f32> {
        self.w
    }

    pub fn h(&self) -> Option<f32> {
        self.h
    }

    /// Width in points, zero while unset.
    pub fn width(&self) -> f32 {
        self.w.unwrap_or(0.0)
    }

    pub fn height(&self) -> f32 {
        self.h.unwrap_or(0.0)
    }

    pub fn set_w(&mut self, w: f32) {
        self.w = Some(w);
    }

    pub fn set_h(&mut self, h: f32) {
        self.h = Some(h);
    }

    pub fn set_size(&mut self, w: f32, h: f32) {
        self.w = Some(w);
        self.h = Some(h);
    }

    pub fn padding(&self) -> Padding {
        self.padding.unwrap_or_default()
    }

    pub fn set_padding(&mut self, padding: impl Into<Padding>) {
        self.padding = Some(padding.into());
    }

    pub fn pt(&self) -> f32 {
        self.padding().top
    }

    pub fn pr(&self) -> f32 {
        self.padding().right
    }

    pub fn pb(&self) -> f32 {
        self.padding().bottom
    }

    pub fn pl(&self) -> f32 {
        self.padding().left
    }

    /// Usable width inside the padding.
    pub fn pw(&self) -> f32 {
        self.width() - self.padding().horizontal()
    }

    /// Usable height inside the padding.
    pub fn ph(&self) -> f32 {
        self.height() - self.padding().vertical()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    pub fn set_template(&mut self, template: Option<String>) {
        self.template = template;
    }

    /// Fills in whatever the page left unset.
    pub(crate) fn attach(&mut self, w: f32, h: f32, padding: Padding) {
        self.w.get_or_insert(w);
        self.h.get_or_insert(h);
        self.padding.get_or_insert(padding);
    }

    pub(crate) fn renumber(&mut self, pn: usize) {
        self.pn = pn;
    }

    pub fn tree(&self) -> &ElementTree {
        &self.tree
    }

    /// Appends `element` to the page's top-level elements.
    pub fn add_element(&mut self, element: Element) -> ElementId {
        self.tree
            .insert_root_at(usize::MAX, element, Provenance::Authored)
    }

    /// Appends `element` to the children of `parent`.
    pub fn add_child(&mut self, parent: ElementId, element: Element) -> Result<ElementId, FolioError> {
        self.tree.insert(Some(parent), element, Provenance::Authored)
    }

    pub(crate) fn insert(
        &mut self,
        parent: Option<ElementId>,
        element: Element,
        provenance: Provenance,
    ) -> Result<ElementId, FolioError> {
        self.tree.insert(parent, element, provenance)
    }

    /// Detaches an element and its children from the page.
    pub fn remove_element(&mut self, id: ElementId) -> Result<Element, FolioError> {
        self.tree.remove(id)
    }

    pub fn element(&self, id: ElementId) -> Option<&Node> {
        self.tree.get(id)
    }

    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut Node> {
        self.tree.get_mut(id)
    }

    /// Every element on the page, depth first in drawing order.
    pub fn elements(&self) -> impl Iterator<Item = (ElementId, &Node)> {
        self.tree
            .ids()
            .into_iter()
            .filter_map(|id| self.tree.get(id).map(|node| (id, node)))
    }

    /// Authored code blocks in drawing order.
    pub fn code_blocks(&self) -> Vec<ElementId> {
        self.elements()
            .filter(|(_, node)| {
                node.provenance() == Provenance::Authored
                    && matches!(node.kind, ElementKind::CodeBlock(_))
            })
            .map(|(id, _)| id)
            .collect()
    }

    /// Drops everything the template and code blocks added last time.
    pub(crate) fn clear_generated(&mut self) -> usize {
        self.tree
            .remove_where(|p| matches!(p, Provenance::Template | Provenance::Script))
    }

    /// Template output goes beneath the authored elements, in order.
    pub(crate) fn apply_template_elements(&mut self, elements: Vec<Element>) {
        for (index, element) in elements.into_iter().enumerate() {
            self.tree.insert_root_at(index, element, Provenance::Template);
        }
    }

    pub(crate) fn compose(&mut self, cx: &ComposeContext<'_>) -> Result<(), FolioError> {
        self.tree.compose(cx)
    }

    pub(crate) fn build(&self, ctx: &mut dyn DrawingContext, show_source: bool) -> Result<(), FolioError> {
        ctx.new_page(self.width(), self.height())?;
        self.tree.build(ctx, show_source)
    }
}

fn points(value: Option<f32>) -> String {
    value.map_or_else(|| "None".to_string(), |v| format!("{}", v as i64))
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Page pn={} w={} h={} elements={}>",
            self.pn,
            points(self.w),
            points(self.h),
            self.tree.roots().len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::CodeBlock;
    use folio_types::TextStyle;

    #[test]
    fn unattached_page_has_no_size() {
        let page = Page::default();
        assert_eq!((page.w(), page.h()), (None, None));
        assert_eq!(page.to_string(), "<Page pn=1 w=None h=None elements=0>");
    }

    #[test]
    fn attach_only_fills_missing_values() {
        let mut page = Page::new(Some(300.0), None, 3, None);
        page.attach(595.0, 842.0, Padding::uniform(30.0));
        assert_eq!((page.w(), page.h()), (Some(300.0), Some(842.0)));
        assert_eq!(page.pl(), 30.0);
        assert_eq!(page.pw(), 240.0);
        assert_eq!(page.ph(), 782.0);
        assert_eq!(page.to_string(), "<Page pn=3 w=300 h=842 elements=0>");
    }

    #[test]
    fn padding_accessors() {
        let mut page = Page::new(Some(500.0), Some(500.0), 1, None);
        page.set_padding(Padding::new(100.0, 20.0, 50.0, 10.0));
        assert_eq!((page.pt(), page.pr(), page.pb(), page.pl()), (100.0, 20.0, 50.0, 10.0));
        assert_eq!(page.pw(), 470.0);
        assert_eq!(page.ph(), 350.0);
    }

    #[test]
    fn add_and_remove_elements() {
        let mut page = Page::new(Some(100.0), Some(100.0), 1, None);
        let group = page.add_element(Element::group(0.0, 0.0));
        let child = page
            .add_child(group, Element::text("x", TextStyle::default()))
            .unwrap();
        page.add_element(Element::code_block(CodeBlock::new("a = 1")));
        assert_eq!(page.elements().count(), 3);
        assert_eq!(page.code_blocks().len(), 1);
        assert_eq!(page.element(child).unwrap().parent(), Some(group));

        let removed = page.remove_element(group).unwrap();
        assert_eq!(removed.children.len(), 1);
        assert!(page.element(child).is_none());
        assert_eq!(page.to_string(), "<Page pn=1 w=100 h=100 elements=1>");
    }

    #[test]
    fn template_elements_go_beneath_authored_ones() {
        let mut page = Page::new(Some(100.0), Some(100.0), 1, None);
        let authored = page.add_element(Element::rect(0.0, 0.0, 1.0, 1.0));
        page.apply_template_elements(vec![
            Element::rect(0.0, 0.0, 100.0, 100.0),
            Element::text("1", TextStyle::default()),
        ]);
        assert_eq!(page.tree().roots().len(), 3);
        assert_eq!(page.tree().roots()[2], authored);
        assert_eq!(page.clear_generated(), 2);
        assert_eq!(page.tree().roots(), &[authored]);
    }
}
