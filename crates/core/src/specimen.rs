//! A page showing every colour of a theme with its nearest recipes.

use crate::document::Document;
use crate::element::Element;
use crate::elements::{CellLabel, ColorCell};
use crate::error::FolioError;
use crate::page::Page;
use folio_theme::Theme;
use folio_types::{Padding, TextAlign, TextStyle};

const SPECIMEN_PADDING: f32 = 40.0;
const TITLE_SIZE: f32 = 18.0;
const LABEL_SIZE: f32 = 6.0;
const LABEL_LEADING: f32 = 8.0;
const TITLE_INDENT: f32 = 20.0;

/// Appends a page with one cell per `theme` colour: shades left to right,
/// bases bottom to top, under a header naming the theme and its mood.
pub fn add_theme_specimen<'a>(doc: &'a mut Document, theme: &Theme) -> Result<&'a mut Page, FolioError> {
    let page = doc.new_page();
    page.set_padding(Padding::uniform(SPECIMEN_PADDING));
    let colors = theme.colors();
    let rows = colors.len().max(1);
    let columns = colors.first().map_or(1, |row| row.len().max(1));
    let cw = page.pw() / columns as f32;
    let ch = page.ph() / rows as f32;
    let (pl, pb) = (page.pl(), page.pb());

    let label_style = TextStyle::new("Helvetica", LABEL_SIZE)
        .with_line_height(LABEL_LEADING)
        .with_align(TextAlign::Center);
    for (base, row) in colors.iter().enumerate() {
        for (shade, color) in row.iter().enumerate() {
            let cell = ColorCell::new(color.clone())
                .with_labels(vec![
                    CellLabel::Hex,
                    CellLabel::Name,
                    CellLabel::Spot,
                    CellLabel::Ral,
                    CellLabel::Theme,
                ])
                .with_style(label_style.clone())
                .with_theme_position(base, shade);
            page.add_element(
                Element::color_cell(cell, cw, ch).at(pl + shade as f32 * cw, pb + base as f32 * ch),
            );
        }
    }

    let header = theme.get_color(0, 2)?.clone();
    let title_fill = theme.get_color(-2, 2)?.clone();
    page.add_element(
        Element::rect(pl, page.height() - page.pt(), page.pw(), page.pt()).with_fill(header),
    );
    let title = TextStyle::new("Helvetica", TITLE_SIZE).with_fill(title_fill);
    let leading = title.leading();
    page.add_element(
        Element::text(format!("{} - {}", theme.name(), theme.mood()), title)
            .at(pl + TITLE_INDENT, page.height() - page.pt() * 2.0 / 3.0 - leading / 2.0)
            .with_height(leading),
    );
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementKind;
    use folio_render_core::RecordingContext;
    use folio_theme::{BASE_COUNT, Mood, SHADES, palettes};

    #[test]
    fn one_cell_per_theme_color() {
        let mut doc = Document::builder()
            .with_context(Box::new(RecordingContext::new()))
            .into_document();
        let theme = palettes::back_to_the_city(Mood::Dark).unwrap();
        let page = add_theme_specimen(&mut doc, &theme).unwrap();
        let cells: Vec<_> = page
            .elements()
            .filter_map(|(_, node)| match &node.kind {
                ElementKind::ColorCell(cell) => Some(cell.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(cells.len(), BASE_COUNT * SHADES);
        assert_eq!(cells[SHADES + 2].theme_position, Some((1, 2)));
        assert_eq!(&cells[SHADES + 2].color, theme.get_color(1, 2).unwrap());
        assert_eq!(page.pl(), 40.0);
    }

    #[test]
    fn header_names_theme_and_mood() {
        let mut doc = Document::builder()
            .with_context(Box::new(RecordingContext::new()))
            .into_document();
        let theme = palettes::fairy_tales(Mood::Light).unwrap();
        add_theme_specimen(&mut doc, &theme).unwrap();
        doc.compose().unwrap();
        doc.build().unwrap();
        let ctx = doc
            .context()
            .as_any()
            .downcast_ref::<RecordingContext>()
            .unwrap();
        assert!(ctx.texts().contains(&"Fairy Tales - light"));
        assert!(ctx.texts().contains(&"Theme[0][0]"));
    }
}
