use folio_types::{Size, TextStyle};

/// Helvetica advance widths for printable ASCII (32..=126), in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' ' .. '/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0' .. '?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@' .. 'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P' .. '_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`' .. 'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p' .. '~'
];

const COURIER_WIDTH: u16 = 600;
const DEFAULT_WIDTH: u16 = 556;

/// Maps a font family to the standard PDF font used to draw it.
pub fn standard_font(family: &str) -> &'static str {
    let lower = family.to_ascii_lowercase();
    let bold = lower.contains("bold");
    let italic = lower.contains("italic") || lower.contains("oblique");
    if lower.starts_with("courier") || lower.contains("mono") {
        match (bold, italic) {
            (true, true) => "Courier-BoldOblique",
            (true, false) => "Courier-Bold",
            (false, true) => "Courier-Oblique",
            (false, false) => "Courier",
        }
    } else if lower.starts_with("times") || (lower.contains("serif") && !lower.contains("sans")) {
        match (bold, italic) {
            (true, true) => "Times-BoldItalic",
            (true, false) => "Times-Bold",
            (false, true) => "Times-Italic",
            (false, false) => "Times-Roman",
        }
    } else {
        match (bold, italic) {
            (true, true) => "Helvetica-BoldOblique",
            (true, false) => "Helvetica-Bold",
            (false, true) => "Helvetica-Oblique",
            (false, false) => "Helvetica",
        }
    }
}

fn char_width(c: char, monospace: bool) -> u16 {
    if monospace {
        return COURIER_WIDTH;
    }
    match c as u32 {
        code @ 32..=126 => HELVETICA_WIDTHS[(code - 32) as usize],
        _ => DEFAULT_WIDTH,
    }
}

/// Approximate advance width of one line of text in points.
///
/// Courier is exact; every other family is measured with Helvetica
/// metrics, which is close enough for layout decisions.
pub fn text_width(text: &str, style: &TextStyle) -> f32 {
    let monospace = standard_font(&style.font).starts_with("Courier");
    let units: u32 = text.chars().map(|c| char_width(c, monospace) as u32).sum();
    units as f32 * style.font_size / 1000.0
}

/// Size of a single line: measured width by the style's leading.
pub fn measure_text(text: &str, style: &TextStyle) -> Size {
    Size::new(text_width(text, style), style.leading())
}

/// Greedy word wrap. Explicit newlines always break; a word wider than
/// `max_width` gets a line of its own.
pub fn wrap_text(text: &str, max_width: f32, style: &TextStyle) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate = format!("{} {}", current, word);
            if text_width(&candidate, style) <= max_width {
                current = candidate;
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
            }
        }
        lines.push(current);
    }
    lines
}
