//! The element arena owned by each page.
//!
//! Nodes live in a slot vector and refer to each other by [`ElementId`].
//! A node owns its children through the `children` list; the `parent`
//! index exists only for lookups and detaching. Removed slots are reused,
//! so an id is only meaningful while its node is in the tree.

use crate::element::{Element, ElementId, ElementKind, Frame, Provenance};
use crate::elements::ComposeContext;
use crate::error::FolioError;
use folio_render_core::DrawingContext;
use folio_types::{Paint, Point, Rect, Size};

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: ElementKind,
    pub frame: Frame,
    pub paint: Paint,
    resolved: Size,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    provenance: Provenance,
}

impl Node {
    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    /// Size after the last compose; the frame's own size where it has one.
    pub fn resolved_size(&self) -> Size {
        self.resolved
    }

    pub fn width(&self) -> f32 {
        self.frame.w.unwrap_or(self.resolved.width)
    }

    pub fn height(&self) -> f32 {
        self.frame.h.unwrap_or(self.resolved.height)
    }

    /// Usable width inside the padding. Not clamped at zero.
    pub fn pw(&self) -> f32 {
        self.width() - self.frame.padding.horizontal()
    }

    pub fn ph(&self) -> f32 {
        self.height() - self.frame.padding.vertical()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementTree {
    nodes: Vec<Option<Node>>,
    roots: Vec<ElementId>,
    free: Vec<usize>,
}

impl ElementTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Top-level elements in drawing order.
    pub fn roots(&self) -> &[ElementId] {
        &self.roots
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: ElementId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    fn node(&self, id: ElementId) -> Result<&Node, FolioError> {
        self.get(id).ok_or(FolioError::UnknownElement(id.0))
    }

    fn node_mut(&mut self, id: ElementId) -> Result<&mut Node, FolioError> {
        self.get_mut(id).ok_or(FolioError::UnknownElement(id.0))
    }

    /// Every live node id, depth first in drawing order.
    pub fn ids(&self) -> Vec<ElementId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<ElementId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if let Some(node) = self.get(id) {
                out.push(id);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Moves `element` and its children into the tree, appended to the
    /// children of `parent`, or to the roots.
    pub fn insert(
        &mut self,
        parent: Option<ElementId>,
        element: Element,
        provenance: Provenance,
    ) -> Result<ElementId, FolioError> {
        if let Some(parent) = parent {
            self.node(parent)?;
        }
        let id = self.insert_subtree(parent, element, provenance);
        match parent {
            Some(parent) => self.node_mut(parent)?.children.push(id),
            None => self.roots.push(id),
        }
        Ok(id)
    }

    /// Inserts a root before all existing roots, so it draws beneath them.
    pub fn insert_root_at(
        &mut self,
        index: usize,
        element: Element,
        provenance: Provenance,
    ) -> ElementId {
        let id = self.insert_subtree(None, element, provenance);
        let index = index.min(self.roots.len());
        self.roots.insert(index, id);
        id
    }

    fn insert_subtree(
        &mut self,
        parent: Option<ElementId>,
        element: Element,
        provenance: Provenance,
    ) -> ElementId {
        let Element {
            kind,
            frame,
            paint,
            children,
        } = element;
        let id = self.alloc(Node {
            kind,
            resolved: Size::new(frame.w.unwrap_or(0.0), frame.h.unwrap_or(0.0)),
            frame,
            paint,
            parent,
            children: Vec::new(),
            provenance,
        });
        let child_ids: Vec<ElementId> = children
            .into_iter()
            .map(|child| self.insert_subtree(Some(id), child, provenance))
            .collect();
        if let Some(Some(node)) = self.nodes.get_mut(id.0) {
            node.children = child_ids;
        }
        id
    }

    fn alloc(&mut self, node: Node) -> ElementId {
        match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = Some(node);
                ElementId(slot)
            }
            None => {
                self.nodes.push(Some(node));
                ElementId(self.nodes.len() - 1)
            }
        }
    }

    /// Detaches the subtree at `id` and hands it back as a standalone element.
    pub fn remove(&mut self, id: ElementId) -> Result<Element, FolioError> {
        let parent = self.node(id)?.parent;
        match parent {
            Some(parent) => self.node_mut(parent)?.children.retain(|c| *c != id),
            None => self.roots.retain(|r| *r != id),
        }
        self.take_subtree(id)
    }

    fn take_subtree(&mut self, id: ElementId) -> Result<Element, FolioError> {
        let node = self
            .nodes
            .get_mut(id.0)
            .and_then(Option::take)
            .ok_or(FolioError::UnknownElement(id.0))?;
        self.free.push(id.0);
        let children = node
            .children
            .into_iter()
            .map(|child| self.take_subtree(child))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Element {
            kind: node.kind,
            frame: node.frame,
            paint: node.paint,
            children,
        })
    }

    /// Removes every node, anywhere in the tree, whose provenance matches.
    /// Returns the number of subtrees removed.
    pub fn remove_where(&mut self, matches: impl Fn(Provenance) -> bool) -> usize {
        let doomed: Vec<ElementId> = self
            .ids()
            .into_iter()
            .filter(|id| self.get(*id).is_some_and(|n| matches(n.provenance)))
            .collect();
        let mut removed = 0;
        for id in doomed {
            // Already gone with an ancestor.
            if self.contains(id) && self.remove(id).is_ok() {
                removed += 1;
            }
        }
        removed
    }

    /// Rebuilds the subtree at `id` as a standalone element.
    pub fn to_element(&self, id: ElementId) -> Result<Element, FolioError> {
        let node = self.node(id)?;
        Ok(Element {
            kind: node.kind.clone(),
            frame: node.frame,
            paint: node.paint.clone(),
            children: node
                .children
                .iter()
                .map(|child| self.to_element(*child))
                .collect::<Result<_, _>>()?,
        })
    }

    /// Resolves sizes and regenerates layout children, top-down.
    pub(crate) fn compose(&mut self, cx: &ComposeContext<'_>) -> Result<(), FolioError> {
        for id in self.roots.clone() {
            self.compose_node(id, cx)?;
        }
        Ok(())
    }

    fn compose_node(&mut self, id: ElementId, cx: &ComposeContext<'_>) -> Result<Size, FolioError> {
        let stale: Vec<ElementId> = self
            .node(id)?
            .children
            .iter()
            .copied()
            .filter(|child| {
                self.get(*child)
                    .is_some_and(|n| n.provenance == Provenance::Layout)
            })
            .collect();
        for child in stale {
            self.remove(child)?;
        }

        let node = self.node_mut(id)?;
        let Node { kind, frame, .. } = &mut *node;
        let natural = kind.measure(frame, cx);
        let size = Size::new(
            frame.w.unwrap_or(natural.width),
            frame.h.unwrap_or(natural.height),
        );
        node.resolved = size;
        let generated = node.kind.generate(size, cx)?;
        for element in generated {
            self.insert(Some(id), element, Provenance::Layout)?;
        }

        let mut extent = Size::zero();
        for child in self.node(id)?.children.clone() {
            let child_size = self.compose_node(child, cx)?;
            let child_frame = self.node(child)?.frame;
            extent.width = extent.width.max(child_frame.x + child_size.width);
            extent.height = extent.height.max(child_frame.y + child_size.height);
        }

        let node = self.node_mut(id)?;
        if matches!(node.kind, ElementKind::Group) {
            let padding = node.frame.padding;
            node.resolved = Size::new(
                node.frame.w.unwrap_or(extent.width + padding.right),
                node.frame.h.unwrap_or(extent.height + padding.top),
            );
        }
        Ok(node.resolved)
    }

    /// Emits drawing calls for every node. Each node draws at its parent's
    /// absolute origin plus its own `(x, y)`.
    pub(crate) fn build(
        &self,
        ctx: &mut dyn DrawingContext,
        show_source: bool,
    ) -> Result<(), FolioError> {
        for id in &self.roots {
            self.build_node(*id, Point::default(), ctx, show_source)?;
        }
        Ok(())
    }

    fn build_node(
        &self,
        id: ElementId,
        origin: Point,
        ctx: &mut dyn DrawingContext,
        show_source: bool,
    ) -> Result<(), FolioError> {
        let node = self.node(id)?;
        let absolute = origin.offset(node.frame.x, node.frame.y);
        let area = Rect::new(absolute.x, absolute.y, node.width(), node.height());
        node.kind
            .draw(area, &node.frame.padding, &node.paint, ctx, show_source)?;
        for child in &node.children {
            self.build_node(*child, absolute, ctx, show_source)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{CellLayout, ColorCell};
    use folio_render_core::{DrawOp, RecordingContext};
    use folio_theme::Theme;
    use folio_types::{Color, TextStyle};

    fn compose(tree: &mut ElementTree) {
        let ctx = RecordingContext::new();
        let theme = Theme::default();
        let cx = ComposeContext {
            measure: &ctx,
            theme: &theme,
            show_source: false,
        };
        tree.compose(&cx).unwrap();
    }

    #[test]
    fn insert_links_parent_and_children() {
        let mut tree = ElementTree::new();
        let group = tree
            .insert(
                None,
                Element::group(10.0, 10.0).with_child(Element::rect(0.0, 0.0, 5.0, 5.0)),
                Provenance::Authored,
            )
            .unwrap();
        let text = tree
            .insert(Some(group), Element::text("hi", TextStyle::default()), Provenance::Authored)
            .unwrap();
        let children = tree.get(group).unwrap().children().to_vec();
        assert_eq!(children.len(), 2);
        assert_eq!(children[1], text);
        assert_eq!(tree.get(text).unwrap().parent(), Some(group));
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.ids(), vec![group, children[0], text]);
    }

    #[test]
    fn insert_under_unknown_parent_fails() {
        let mut tree = ElementTree::new();
        let err = tree
            .insert(Some(ElementId(7)), Element::group(0.0, 0.0), Provenance::Authored)
            .unwrap_err();
        assert!(matches!(err, FolioError::UnknownElement(7)));
    }

    #[test]
    fn remove_returns_the_subtree() {
        let mut tree = ElementTree::new();
        let keep = tree
            .insert(None, Element::rect(0.0, 0.0, 1.0, 1.0), Provenance::Authored)
            .unwrap();
        let group = tree
            .insert(
                None,
                Element::group(0.0, 0.0).with_child(Element::text("a", TextStyle::default())),
                Provenance::Authored,
            )
            .unwrap();
        let removed = tree.remove(group).unwrap();
        assert_eq!(removed.children.len(), 1);
        assert_eq!(removed.children[0].kind.text(), Some("a"));
        assert_eq!(tree.roots(), &[keep]);
        assert_eq!(tree.len(), 1);
        assert!(!tree.contains(group));
        assert!(tree.remove(group).is_err());
    }

    #[test]
    fn text_is_measured_and_groups_take_their_extent() {
        let mut tree = ElementTree::new();
        let group = tree
            .insert(
                None,
                Element::group(0.0, 0.0)
                    .with_child(Element::text("Hello", TextStyle::new("Courier", 10.0)).at(20.0, 30.0)),
                Provenance::Authored,
            )
            .unwrap();
        compose(&mut tree);
        let text = tree.get(group).unwrap().children()[0];
        let size = tree.get(text).unwrap().resolved_size();
        assert!((size.width - 30.0).abs() < 1e-4);
        assert!((size.height - 12.0).abs() < 1e-4);
        let group_size = tree.get(group).unwrap().resolved_size();
        assert!((group_size.width - 50.0).abs() < 1e-4);
        assert!((group_size.height - 42.0).abs() < 1e-4);
    }

    #[test]
    fn recompose_replaces_generated_children() {
        let mut tree = ElementTree::new();
        let cell = ColorCell::new(Color::from_hex("#336699").unwrap())
            .with_layout(CellLayout::SpotSample);
        let id = tree
            .insert(None, Element::color_cell(cell, 100.0, 120.0), Provenance::Authored)
            .unwrap();
        compose(&mut tree);
        let first = tree.get(id).unwrap().children().len();
        compose(&mut tree);
        compose(&mut tree);
        assert_eq!(first, 2);
        assert_eq!(tree.get(id).unwrap().children().len(), first);
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.nodes.len(), 3);
    }

    #[test]
    fn removed_slots_are_reused() {
        let mut tree = ElementTree::new();
        let keep = tree
            .insert(None, Element::rect(0.0, 0.0, 1.0, 1.0), Provenance::Authored)
            .unwrap();
        let group = tree
            .insert(
                None,
                Element::group(0.0, 0.0).with_child(Element::rect(0.0, 0.0, 2.0, 2.0)),
                Provenance::Template,
            )
            .unwrap();
        assert_eq!(tree.remove_where(|p| p == Provenance::Template), 1);
        assert!(!tree.contains(group));
        let again = tree
            .insert(
                None,
                Element::group(0.0, 0.0).with_child(Element::rect(0.0, 0.0, 3.0, 3.0)),
                Provenance::Template,
            )
            .unwrap();
        assert_eq!(tree.nodes.len(), 3);
        assert!(tree.contains(keep));
        let child = tree.get(again).unwrap().children()[0];
        assert_eq!(tree.get(child).unwrap().parent(), Some(again));
        assert_eq!(tree.get(child).unwrap().frame.w, Some(3.0));
    }

    #[test]
    fn build_uses_absolute_origins() {
        let mut tree = ElementTree::new();
        tree.insert(
            None,
            Element::group(100.0, 200.0)
                .with_child(Element::rect(10.0, 20.0, 5.0, 5.0).with_fill(Color::black())),
            Provenance::Authored,
        )
        .unwrap();
        compose(&mut tree);
        let mut ctx = RecordingContext::new();
        ctx.new_page(500.0, 500.0).unwrap();
        tree.build(&mut ctx, false).unwrap();
        assert_eq!(ctx.rects(), vec![&Rect::new(110.0, 220.0, 5.0, 5.0)]);
    }

    #[test]
    fn centred_text_is_placed_inside_its_width() {
        let mut tree = ElementTree::new();
        let style = TextStyle::new("Courier", 10.0).with_align(folio_types::TextAlign::Center);
        tree.insert(
            None,
            Element::text("ab", style).at(0.0, 0.0).with_size(100.0, 12.0),
            Provenance::Authored,
        )
        .unwrap();
        compose(&mut tree);
        let mut ctx = RecordingContext::new();
        tree.build(&mut ctx, false).unwrap();
        let origin = ctx
            .ops()
            .iter()
            .find_map(|op| match op {
                DrawOp::Text { origin, .. } => Some(*origin),
                _ => None,
            })
            .unwrap();
        // "ab" in 10pt Courier is 12pt wide.
        assert!((origin.x - 44.0).abs() < 1e-4);
        assert!((origin.y - 3.0).abs() < 1e-4);
    }

    #[test]
    fn remove_where_drops_matching_subtrees() {
        let mut tree = ElementTree::new();
        tree.insert(None, Element::rect(0.0, 0.0, 1.0, 1.0), Provenance::Authored)
            .unwrap();
        let scripted = tree
            .insert(
                None,
                Element::group(0.0, 0.0).with_child(Element::rect(0.0, 0.0, 1.0, 1.0)),
                Provenance::Script,
            )
            .unwrap();
        assert_eq!(tree.remove_where(|p| p == Provenance::Script), 1);
        assert!(!tree.contains(scripted));
        assert_eq!(tree.len(), 1);
    }
}
