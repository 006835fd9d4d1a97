use crate::error::ThemeError;
use folio_types::Color;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Number of base colours a theme is built from.
pub const BASE_COUNT: usize = 6;

/// Number of shade variants generated per base colour.
pub const SHADES: usize = 9;

/// Position of the unmodified base colour on the (light mood) shade axis.
pub const BASE_SHADE: usize = 4;

/// Mix factors toward white, lightest first.
const TINTS: [f32; 4] = [0.85, 0.7, 0.5, 0.25];
/// Mix factors toward black, lightest first.
const DARKENINGS: [f32; 4] = [0.25, 0.5, 0.7, 0.85];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    #[default]
    Light,
    Dark,
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mood::Light => write!(f, "light"),
            Mood::Dark => write!(f, "dark"),
        }
    }
}

/// A named palette of six base colours expanded into a `base x shade` matrix.
///
/// In a light mood shade index `0` is the lightest tint, so backgrounds taken
/// from the start of the axis are light. A dark mood reads the same axis from
/// the dark end.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    name: String,
    mood: Mood,
    bases: [Color; BASE_COUNT],
    colors: Vec<Vec<Color>>,
}

impl Theme {
    pub fn new(name: impl Into<String>, bases: [Color; BASE_COUNT], mood: Mood) -> Self {
        let colors = bases
            .iter()
            .map(|base| expand_shades(base, mood))
            .collect();
        Self {
            name: name.into(),
            mood,
            bases,
            colors,
        }
    }

    /// Builds a theme from a map that must contain exactly `base0` .. `base5`.
    pub fn from_map(
        name: impl Into<String>,
        mut colors: HashMap<String, Color>,
        mood: Mood,
    ) -> Result<Self, ThemeError> {
        let mut bases = Vec::with_capacity(BASE_COUNT);
        for i in 0..BASE_COUNT {
            let key = format!("base{}", i);
            let color = colors.remove(&key).ok_or(ThemeError::MissingBase(key))?;
            bases.push(color);
        }
        if let Some(extra) = colors.into_keys().min() {
            return Err(ThemeError::UnknownBase(extra));
        }
        let bases: [Color; BASE_COUNT] = bases
            .try_into()
            .map_err(|_| ThemeError::MissingBase("base5".to_string()))?;
        Ok(Self::new(name, bases, mood))
    }

    /// Same palette, other mood.
    pub fn with_mood(&self, mood: Mood) -> Self {
        Self::new(self.name.clone(), self.bases.clone(), mood)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mood(&self) -> Mood {
        self.mood
    }

    pub fn bases(&self) -> &[Color; BASE_COUNT] {
        &self.bases
    }

    /// The shade matrix in mood order, indexed `[base][shade]`.
    pub fn colors(&self) -> &[Vec<Color>] {
        &self.colors
    }

    /// Looks up `colors[base][shade]`. Negative indices count from the end.
    pub fn get_color(&self, base: isize, shade: isize) -> Result<&Color, ThemeError> {
        let (b, s) = self.resolve(base, shade)?;
        Ok(&self.colors[b][s])
    }

    /// A foreground colour readable on top of `get_color(base, shade)`.
    ///
    /// Always one of the two ends of the base's shade axis: whichever
    /// contrasts more with the background.
    pub fn text_color(&self, base: isize, shade: isize) -> Result<&Color, ThemeError> {
        let (b, s) = self.resolve(base, shade)?;
        let row = &self.colors[b];
        let background = &row[s];
        let (first, last) = (&row[0], &row[SHADES - 1]);
        if s == 0 {
            return Ok(last);
        }
        if s == SHADES - 1 {
            return Ok(first);
        }
        if background.contrast_ratio(last) >= background.contrast_ratio(first) {
            Ok(last)
        } else {
            Ok(first)
        }
    }

    fn resolve(&self, base: isize, shade: isize) -> Result<(usize, usize), ThemeError> {
        Ok((
            resolve_index("base", base, BASE_COUNT)?,
            resolve_index("shade", shade, SHADES)?,
        ))
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::new(
            "Default",
            [
                Color::from_bytes(0x2D, 0x6A, 0x9F),
                Color::from_bytes(0xC0, 0x39, 0x2B),
                Color::from_bytes(0xE6, 0xA1, 0x17),
                Color::from_bytes(0x3E, 0x8E, 0x5E),
                Color::from_bytes(0x80, 0x80, 0x80),
                Color::from_bytes(0x6C, 0x4F, 0x8F),
            ],
            Mood::Light,
        )
    }
}

fn resolve_index(axis: &'static str, index: isize, len: usize) -> Result<usize, ThemeError> {
    let resolved = if index < 0 {
        len as isize + index
    } else {
        index
    };
    if resolved < 0 || resolved >= len as isize {
        return Err(ThemeError::OutOfRange { axis, index, len });
    }
    Ok(resolved as usize)
}

fn expand_shades(base: &Color, mood: Mood) -> Vec<Color> {
    let mut shades = Vec::with_capacity(SHADES);
    shades.extend(TINTS.iter().map(|t| base.lighter(*t)));
    shades.push(base.clone());
    shades.extend(DARKENINGS.iter().map(|d| base.darker(*d)));
    if mood == Mood::Dark {
        shades.reverse();
    }
    shades
}

#[cfg(test)]
mod tests {
    use super::*;

    fn theme(mood: Mood) -> Theme {
        Theme::default().with_mood(mood)
    }

    #[test]
    fn matrix_has_fixed_dimensions() {
        let t = theme(Mood::Light);
        assert_eq!(t.colors().len(), BASE_COUNT);
        assert!(t.colors().iter().all(|row| row.len() == SHADES));
        assert_eq!(t.get_color(0, BASE_SHADE as isize).unwrap(), &t.bases()[0]);
    }

    #[test]
    fn negative_indices_count_from_the_end() {
        let t = theme(Mood::Light);
        assert_eq!(t.get_color(-1, -1).unwrap(), t.get_color(5, 8).unwrap());
        assert_eq!(t.get_color(-6, -9).unwrap(), t.get_color(0, 0).unwrap());
    }

    #[test]
    fn out_of_range_is_not_wrapped() {
        let t = theme(Mood::Light);
        assert!(matches!(
            t.get_color(0, 9),
            Err(ThemeError::OutOfRange { axis: "shade", .. })
        ));
        assert!(matches!(
            t.get_color(-7, 0),
            Err(ThemeError::OutOfRange { axis: "base", .. })
        ));
    }

    #[test]
    fn light_mood_starts_light_and_dark_mood_starts_dark() {
        let light = theme(Mood::Light);
        let dark = theme(Mood::Dark);
        for base in 0..BASE_COUNT as isize {
            let l0 = light.get_color(base, 0).unwrap().luminance();
            let l_end = light.get_color(base, -1).unwrap().luminance();
            assert!(l0 > l_end);
            assert_eq!(dark.get_color(base, 0).unwrap(), light.get_color(base, -1).unwrap());
        }
    }

    #[test]
    fn text_color_comes_from_the_opposite_end() {
        for mood in [Mood::Light, Mood::Dark] {
            let t = theme(mood);
            for base in 0..BASE_COUNT as isize {
                let first = t.get_color(base, 0).unwrap();
                let last = t.get_color(base, -1).unwrap();
                assert_eq!(t.text_color(base, 0).unwrap(), last);
                assert_eq!(t.text_color(base, -1).unwrap(), first);
                for shade in 0..SHADES as isize {
                    let bg = t.get_color(base, shade).unwrap();
                    let fg = t.text_color(base, shade).unwrap();
                    assert!(fg == first || fg == last);
                    let other = if fg == first { last } else { first };
                    assert!(bg.contrast_ratio(fg) >= bg.contrast_ratio(other));
                }
            }
        }
    }

    #[test]
    fn from_map_requires_exactly_six_bases() {
        let full: HashMap<String, Color> = (0..6)
            .map(|i| (format!("base{}", i), Color::gray(i as f32 / 6.0)))
            .collect();
        assert!(Theme::from_map("ok", full.clone(), Mood::Light).is_ok());

        let mut missing = full.clone();
        missing.remove("base3");
        assert_eq!(
            Theme::from_map("missing", missing, Mood::Light).unwrap_err(),
            ThemeError::MissingBase("base3".to_string())
        );

        let mut extra = full;
        extra.insert("accent".to_string(), Color::white());
        assert_eq!(
            Theme::from_map("extra", extra, Mood::Light).unwrap_err(),
            ThemeError::UnknownBase("accent".to_string())
        );
    }
}
