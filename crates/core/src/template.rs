//! Page templates: named functions that lay out the furniture of a page
//! (backgrounds, folios, titles) before its code blocks run.

use crate::element::Element;
use crate::error::FolioError;
use crate::page::Page;
use folio_theme::{BASE_SHADE, Theme};
use folio_types::{Color, TextAlign, TextStyle};
use indexmap::IndexMap;

/// What a template may read besides the page itself.
pub struct TemplateContext<'a> {
    pub theme: &'a Theme,
    /// Pages in the document when the template runs.
    pub page_count: usize,
}

/// Returns the elements to place beneath the page's own elements.
pub type TemplateFn = fn(&Page, &TemplateContext<'_>) -> Result<Vec<Element>, FolioError>;

/// A set of named templates. The default set holds `default` (a centred
/// page number in the bottom margin) and `cover` (a theme-coloured
/// background with the page name as title).
#[derive(Clone)]
pub struct Templates {
    entries: IndexMap<String, TemplateFn>,
}

impl Default for Templates {
    fn default() -> Self {
        let mut templates = Self::empty();
        templates.register("default", page_number);
        templates.register("cover", cover);
        templates
    }
}

impl std::fmt::Debug for Templates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.entries.keys()).finish()
    }
}

impl Templates {
    pub fn empty() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Adds or replaces the template called `name`.
    pub fn register(&mut self, name: impl Into<String>, template: TemplateFn) {
        self.entries.insert(name.into(), template);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Result<TemplateFn, FolioError> {
        self.entries
            .get(name)
            .copied()
            .ok_or_else(|| FolioError::UnknownTemplate(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

fn page_number(page: &Page, _cx: &TemplateContext<'_>) -> Result<Vec<Element>, FolioError> {
    let style = TextStyle::new("Helvetica", 9.0)
        .with_fill(Color::gray(0.4))
        .with_align(TextAlign::Center);
    let leading = style.leading();
    let y = ((page.pb() - leading) / 2.0).max(0.0);
    Ok(vec![
        Element::text(page.pn().to_string(), style)
            .at(page.pl(), y)
            .with_size(page.pw(), leading),
    ])
}

fn cover(page: &Page, cx: &TemplateContext<'_>) -> Result<Vec<Element>, FolioError> {
    let shade = BASE_SHADE as isize;
    let background = cx.theme.get_color(0, shade)?.clone();
    let mut elements = vec![Element::rect(0.0, 0.0, page.width(), page.height()).with_fill(background)];
    if let Some(title) = page.name() {
        let style = TextStyle::new("Helvetica-Bold", 36.0).with_fill(cx.theme.text_color(0, shade)?.clone());
        let leading = style.leading();
        elements.push(
            Element::text(title, style)
                .at(page.pl(), page.height() - page.pt() - leading)
                .with_size(page.pw(), leading),
        );
    }
    Ok(elements)
}
