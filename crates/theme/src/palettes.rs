//! Built-in palettes, all defined by spot colour bases.

use crate::error::ThemeError;
use crate::theme::{BASE_COUNT, Mood, Theme};
use folio_types::Color;

/// Names accepted by [`by_name`].
pub const PALETTES: &[&str] = &["back_to_the_city", "fairy_tales"];

pub fn back_to_the_city(mood: Mood) -> Result<Theme, ThemeError> {
    from_spots("Back to the City", [476, 1405, 139, 480, 421, 157], mood)
}

pub fn fairy_tales(mood: Mood) -> Result<Theme, ThemeError> {
    from_spots("Fairy Tales", [425, 237, 278, 373, 422, 473], mood)
}

pub fn by_name(name: &str, mood: Mood) -> Result<Theme, ThemeError> {
    match name {
        "back_to_the_city" => back_to_the_city(mood),
        "fairy_tales" => fairy_tales(mood),
        "default" => Ok(Theme::default().with_mood(mood)),
        other => Err(ThemeError::UnknownPalette(other.to_string())),
    }
}

/// Every built-in palette in both moods, for specimen pages.
pub fn all() -> Result<Vec<Theme>, ThemeError> {
    let mut themes = Vec::with_capacity(PALETTES.len() * 2);
    for name in PALETTES {
        for mood in [Mood::Dark, Mood::Light] {
            themes.push(by_name(name, mood)?);
        }
    }
    Ok(themes)
}

fn from_spots(name: &str, spots: [u32; BASE_COUNT], mood: Mood) -> Result<Theme, ThemeError> {
    let mut bases = Vec::with_capacity(BASE_COUNT);
    for spot in spots {
        bases.push(Color::spot(spot)?);
    }
    let bases: [Color; BASE_COUNT] = bases
        .try_into()
        .map_err(|_| ThemeError::MissingBase(format!("base{}", BASE_COUNT - 1)))?;
    Ok(Theme::new(name, bases, mood))
}
