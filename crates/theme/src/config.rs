use crate::error::ThemeError;
use crate::palettes;
use crate::theme::{Mood, Theme};
use folio_types::Color;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Serializable theme selection: a built-in palette or explicit base colours.
///
/// ```json
/// { "palette": "fairy_tales", "mood": "dark" }
/// { "name": "House", "colors": { "base0": "#102030", "base1": { "spot": 300 }, ... } }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThemeConfig {
    #[serde(default)]
    pub palette: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub colors: Option<HashMap<String, Color>>,
    #[serde(default)]
    pub mood: Mood,
}

impl ThemeConfig {
    pub fn into_theme(self) -> Result<Theme, ThemeError> {
        match (self.colors, self.palette) {
            (Some(colors), _) => Theme::from_map(
                self.name.unwrap_or_else(|| "Custom".to_string()),
                colors,
                self.mood,
            ),
            (None, Some(palette)) => palettes::by_name(&palette, self.mood),
            (None, None) => Ok(Theme::default().with_mood(self.mood)),
        }
    }
}
