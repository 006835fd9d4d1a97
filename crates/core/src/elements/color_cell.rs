use super::ComposeContext;
use crate::element::Element;
use crate::error::FolioError;
use folio_types::{Color, Size, TextAlign, TextStyle};
use std::str::FromStr;

/// How a colour cell arranges its swatch and recipe labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CellLayout {
    /// The swatch fills the cell; labels sit on top of it, near the bottom.
    #[default]
    Overlay,
    /// The swatch sits above the labels, like a printed spot colour chip.
    SpotSample,
}

impl FromStr for CellLayout {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "overlay" => Ok(CellLayout::Overlay),
            "spotsample" | "spot_sample" => Ok(CellLayout::SpotSample),
            _ => Err(FolioError::invalid("color cell layout", s)),
        }
    }
}

/// One recipe line in a colour cell label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellLabel {
    Hex,
    Name,
    Spot,
    Cmyk,
    Ral,
    /// The cell's position in a theme matrix, if it has one.
    Theme,
}

impl CellLabel {
    pub const ALL: [CellLabel; 6] = [
        CellLabel::Hex,
        CellLabel::Name,
        CellLabel::Spot,
        CellLabel::Cmyk,
        CellLabel::Ral,
        CellLabel::Theme,
    ];
}

impl FromStr for CellLabel {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hex" => Ok(CellLabel::Hex),
            "name" => Ok(CellLabel::Name),
            "spot" => Ok(CellLabel::Spot),
            "cmyk" => Ok(CellLabel::Cmyk),
            "ral" => Ok(CellLabel::Ral),
            "theme" => Ok(CellLabel::Theme),
            _ => Err(FolioError::invalid("color cell label", s)),
        }
    }
}

/// A colour swatch annotated with its recipes.
///
/// Recipes that are only the nearest match for the colour, rather than
/// the recipe it was made from, are shown in parentheses.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorCell {
    pub color: Color,
    pub layout: CellLayout,
    pub labels: Vec<CellLabel>,
    pub style: TextStyle,
    pub theme_position: Option<(usize, usize)>,
}

impl ColorCell {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            layout: CellLayout::default(),
            labels: vec![CellLabel::Hex],
            style: TextStyle::new("Helvetica", 10.0)
                .with_line_height(12.0)
                .with_align(TextAlign::Center),
            theme_position: None,
        }
    }

    pub fn with_layout(mut self, layout: CellLayout) -> Self {
        self.layout = layout;
        self
    }

    /// An empty list falls back to the hex recipe.
    pub fn with_labels(mut self, labels: Vec<CellLabel>) -> Self {
        self.labels = if labels.is_empty() {
            vec![CellLabel::Hex]
        } else {
            labels
        };
        self
    }

    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_theme_position(mut self, base: usize, shade: usize) -> Self {
        self.theme_position = Some((base, shade));
        self
    }

    /// The label lines, top to bottom.
    pub fn label_lines(&self) -> Vec<String> {
        let c = &self.color;
        self.labels
            .iter()
            .filter_map(|label| match label {
                CellLabel::Hex => Some(approximate(format!("#{}", c.hex()), c.is_rgb())),
                CellLabel::Name => Some(approximate(capitalize(&c.name()), c.is_name())),
                CellLabel::Spot => {
                    Some(approximate(format!("Spot {}", c.spot_number()), c.is_spot()))
                }
                CellLabel::Cmyk => {
                    let [cc, m, y, k] = c.cmyk_components().map(|v| (v * 100.0) as i32);
                    Some(approximate(format!("cmyk {} {} {} {}", cc, m, y, k), c.is_cmyk()))
                }
                CellLabel::Ral => Some(approximate(format!("Ral {}", c.ral_code()), c.is_ral())),
                CellLabel::Theme => self
                    .theme_position
                    .map(|(base, shade)| format!("Theme[{}][{}]", base, shade)),
            })
            .collect()
    }

    pub(crate) fn measure(&self, cx: &ComposeContext<'_>) -> Size {
        let lines = self.label_lines();
        let width = lines
            .iter()
            .map(|line| cx.measure.text_size(line, &self.style).width)
            .fold(0.0, f32::max);
        Size::new(width, lines.len() as f32 * self.style.leading())
    }

    /// The swatch rectangle and one centred text element per label line.
    pub(crate) fn generate(
        &self,
        size: Size,
        _cx: &ComposeContext<'_>,
    ) -> Result<Vec<Element>, FolioError> {
        let lines = self.label_lines();
        let leading = self.style.leading();
        let block = lines.len() as f32 * leading;
        let (swatch, block_bottom, text_fill) = match self.layout {
            CellLayout::SpotSample => (
                Element::rect(0.0, block, size.width, size.height - block),
                0.0,
                self.style.fill.clone(),
            ),
            CellLayout::Overlay => (
                Element::rect(0.0, 0.0, size.width, size.height),
                leading / 2.0,
                readable_on(&self.color),
            ),
        };
        let mut generated = vec![swatch.with_fill(self.color.clone())];
        let top = block_bottom + block;
        for (i, line) in lines.into_iter().enumerate() {
            let style = self.style.clone().with_fill(text_fill.clone());
            generated.push(
                Element::text(line, style)
                    .at(0.0, top - (i as f32 + 1.0) * leading)
                    .with_size(size.width, leading),
            );
        }
        Ok(generated)
    }
}

fn approximate(recipe: String, exact: bool) -> String {
    if exact { recipe } else { format!("({})", recipe) }
}

fn capitalize(s: &str) -> String {
    let lower = s.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Black or white, whichever contrasts more with `background`.
fn readable_on(background: &Color) -> Color {
    let (black, white) = (Color::black(), Color::white());
    if background.contrast_ratio(&black) >= background.contrast_ratio(&white) {
        black
    } else {
        white
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_recipes_have_no_parentheses() {
        let cell = ColorCell::new(Color::from_hex("#FF8000").unwrap())
            .with_labels(vec![CellLabel::Hex, CellLabel::Spot]);
        let lines = cell.label_lines();
        assert_eq!(lines[0], "#FF8000");
        assert!(lines[1].starts_with("(Spot "), "{}", lines[1]);
    }

    #[test]
    fn spot_origin_labels() {
        let cell = ColorCell::new(Color::spot(300).unwrap())
            .with_labels(vec![CellLabel::Spot, CellLabel::Hex, CellLabel::Cmyk]);
        let lines = cell.label_lines();
        assert_eq!(lines[0], "Spot 300");
        assert!(lines[1].starts_with("(#"));
        assert!(lines[2].starts_with("(cmyk "));
    }

    #[test]
    fn cmyk_and_name_labels() {
        let cell = ColorCell::new(Color::cmyk(1.0, 0.5, 0.0, 0.25))
            .with_labels(vec![CellLabel::Cmyk]);
        assert_eq!(cell.label_lines(), vec!["cmyk 100 50 0 25"]);

        let cell = ColorCell::new(Color::named("yellow").unwrap()).with_labels(vec![CellLabel::Name]);
        assert_eq!(cell.label_lines(), vec!["Yellow"]);
    }

    #[test]
    fn theme_label_needs_a_position() {
        let cell = ColorCell::new(Color::black()).with_labels(vec![CellLabel::Theme]);
        assert!(cell.label_lines().is_empty());
        let cell = cell.with_theme_position(2, 4);
        assert_eq!(cell.label_lines(), vec!["Theme[2][4]"]);
    }

    #[test]
    fn empty_labels_fall_back_to_hex() {
        let cell = ColorCell::new(Color::white()).with_labels(Vec::new());
        assert_eq!(cell.labels, vec![CellLabel::Hex]);
    }

    #[test]
    fn parses_layout_and_label_names() {
        assert_eq!("SpotSample".parse::<CellLayout>().unwrap(), CellLayout::SpotSample);
        assert_eq!("overlay".parse::<CellLayout>().unwrap(), CellLayout::Overlay);
        assert!(matches!(
            "grid".parse::<CellLayout>(),
            Err(FolioError::InvalidOption { .. })
        ));
        assert_eq!("RAL".parse::<CellLabel>().unwrap(), CellLabel::Ral);
        assert!("pantone".parse::<CellLabel>().is_err());
    }

    #[test]
    fn overlay_text_contrasts_with_the_swatch() {
        assert_eq!(readable_on(&Color::black()), Color::white());
        assert_eq!(readable_on(&Color::from_hex("#FFFF00").unwrap()), Color::black());
    }
}
