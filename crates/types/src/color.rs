//! Colour values that remember the recipe they were created from.
//!
//! A [`Color`] always carries an sRGB value, but the recipe it was built from
//! (RGB, CMYK, spot, CSS name or RAL) stays authoritative. Values in the other
//! spaces are derived and only approximate; check the `is_*` flags before
//! treating one of them as exact.

use crate::tables::{BuiltinTable, ColorTable};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ColorError {
    #[error("Invalid hex color '{0}': expected #RGB or #RRGGBB")]
    InvalidHex(String),
    #[error("Unknown spot color {0}")]
    UnknownSpot(u32),
    #[error("Unknown color name '{0}'")]
    UnknownName(String),
    #[error("Unknown RAL color {0}")]
    UnknownRal(u32),
}

/// The recipe a colour was constructed from.
#[derive(Debug, Clone, PartialEq)]
pub enum Recipe {
    Rgb,
    Cmyk([f32; 4]),
    Spot(u32),
    Name(String),
    Ral(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Color {
    r: f32,
    g: f32,
    b: f32,
    a: f32,
    recipe: Recipe,
}

impl Default for Color {
    fn default() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }
}

impl Color {
    /// Creates an RGB colour from components in `0.0..=1.0`. Values are clamped.
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
            a: 1.0,
            recipe: Recipe::Rgb,
        }
    }

    pub fn from_bytes(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    pub fn gray(value: f32) -> Self {
        Self::rgb(value, value, value)
    }

    pub fn white() -> Self {
        Self::gray(1.0)
    }

    pub fn black() -> Self {
        Self::gray(0.0)
    }

    /// Parses `#RRGGBB`, `RRGGBB`, `#RGB` or `RGB`.
    pub fn from_hex(s: &str) -> Result<Self, ColorError> {
        let trimmed = s.trim();
        let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
        let invalid = || ColorError::InvalidHex(s.to_string());
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let (r, g, b) = match hex.len() {
            3 => {
                let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1].repeat(2), 16);
                (
                    digit(0).map_err(|_| invalid())?,
                    digit(1).map_err(|_| invalid())?,
                    digit(2).map_err(|_| invalid())?,
                )
            }
            6 => {
                let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
                (
                    pair(0).map_err(|_| invalid())?,
                    pair(2).map_err(|_| invalid())?,
                    pair(4).map_err(|_| invalid())?,
                )
            }
            _ => return Err(invalid()),
        };
        Ok(Self::from_bytes(r, g, b))
    }

    /// Creates a CMYK colour. The RGB value is the naive device conversion.
    pub fn cmyk(c: f32, m: f32, y: f32, k: f32) -> Self {
        let cmyk = [
            c.clamp(0.0, 1.0),
            m.clamp(0.0, 1.0),
            y.clamp(0.0, 1.0),
            k.clamp(0.0, 1.0),
        ];
        let (r, g, b) = cmyk_to_rgb(cmyk);
        Self {
            r,
            g,
            b,
            a: 1.0,
            recipe: Recipe::Cmyk(cmyk),
        }
    }

    pub fn spot(spot: u32) -> Result<Self, ColorError> {
        Self::spot_in(spot, &BuiltinTable)
    }

    pub fn spot_in(spot: u32, table: &dyn ColorTable) -> Result<Self, ColorError> {
        let (r, g, b) = table.spot_rgb(spot).ok_or(ColorError::UnknownSpot(spot))?;
        Ok(Self::from_bytes(r, g, b).with_recipe(Recipe::Spot(spot)))
    }

    /// Creates a colour from a CSS colour name (case-insensitive).
    pub fn named(name: &str) -> Result<Self, ColorError> {
        Self::named_in(name, &BuiltinTable)
    }

    pub fn named_in(name: &str, table: &dyn ColorTable) -> Result<Self, ColorError> {
        let key = name.trim().to_lowercase();
        let (r, g, b) = table
            .name_rgb(&key)
            .ok_or_else(|| ColorError::UnknownName(name.to_string()))?;
        Ok(Self::from_bytes(r, g, b).with_recipe(Recipe::Name(key)))
    }

    pub fn ral(code: u32) -> Result<Self, ColorError> {
        Self::ral_in(code, &BuiltinTable)
    }

    pub fn ral_in(code: u32, table: &dyn ColorTable) -> Result<Self, ColorError> {
        let (r, g, b) = table.ral_rgb(code).ok_or(ColorError::UnknownRal(code))?;
        Ok(Self::from_bytes(r, g, b).with_recipe(Recipe::Ral(code)))
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.a = alpha.clamp(0.0, 1.0);
        self
    }

    fn with_recipe(mut self, recipe: Recipe) -> Self {
        self.recipe = recipe;
        self
    }

    pub fn recipe(&self) -> &Recipe {
        &self.recipe
    }

    pub fn is_rgb(&self) -> bool {
        matches!(self.recipe, Recipe::Rgb)
    }

    pub fn is_cmyk(&self) -> bool {
        matches!(self.recipe, Recipe::Cmyk(_))
    }

    pub fn is_spot(&self) -> bool {
        matches!(self.recipe, Recipe::Spot(_))
    }

    pub fn is_name(&self) -> bool {
        matches!(self.recipe, Recipe::Name(_))
    }

    pub fn is_ral(&self) -> bool {
        matches!(self.recipe, Recipe::Ral(_))
    }

    pub fn rgb_components(&self) -> (f32, f32, f32) {
        (self.r, self.g, self.b)
    }

    pub fn rgb_bytes(&self) -> (u8, u8, u8) {
        (to_byte(self.r), to_byte(self.g), to_byte(self.b))
    }

    pub fn alpha(&self) -> f32 {
        self.a
    }

    /// Uppercase CSS hex recipe without the leading `#`.
    pub fn hex(&self) -> String {
        let (r, g, b) = self.rgb_bytes();
        format!("{:02X}{:02X}{:02X}", r, g, b)
    }

    /// CMYK recipe, exact for CMYK-origin colours and derived otherwise.
    pub fn cmyk_components(&self) -> [f32; 4] {
        match self.recipe {
            Recipe::Cmyk(cmyk) => cmyk,
            _ => rgb_to_cmyk(self.r, self.g, self.b),
        }
    }

    pub fn spot_number(&self) -> u32 {
        self.spot_number_in(&BuiltinTable)
    }

    pub fn spot_number_in(&self, table: &dyn ColorTable) -> u32 {
        match self.recipe {
            Recipe::Spot(spot) => spot,
            _ => table.nearest_spot(self.rgb_bytes()),
        }
    }

    pub fn name(&self) -> String {
        self.name_in(&BuiltinTable)
    }

    pub fn name_in(&self, table: &dyn ColorTable) -> String {
        match &self.recipe {
            Recipe::Name(name) => name.clone(),
            _ => table.nearest_name(self.rgb_bytes()).to_string(),
        }
    }

    pub fn ral_code(&self) -> u32 {
        self.ral_code_in(&BuiltinTable)
    }

    pub fn ral_code_in(&self, table: &dyn ColorTable) -> u32 {
        match self.recipe {
            Recipe::Ral(code) => code,
            _ => table.nearest_ral(self.rgb_bytes()),
        }
    }

    /// Mixes toward white by `amount` (0 = unchanged, 1 = white).
    pub fn lighter(&self, amount: f32) -> Self {
        self.mix(&Self::white(), amount)
    }

    /// Mixes toward black by `amount` (0 = unchanged, 1 = black).
    pub fn darker(&self, amount: f32) -> Self {
        self.mix(&Self::black(), amount)
    }

    pub fn mix(&self, other: &Color, amount: f32) -> Self {
        let t = amount.clamp(0.0, 1.0);
        Self::rgb(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
        .with_alpha(self.a)
    }

    /// WCAG relative luminance.
    pub fn luminance(&self) -> f32 {
        fn channel(c: f32) -> f32 {
            if c <= 0.03928 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        0.2126 * channel(self.r) + 0.7152 * channel(self.g) + 0.0722 * channel(self.b)
    }

    /// WCAG contrast ratio between two colours, in `1.0..=21.0`.
    pub fn contrast_ratio(&self, other: &Color) -> f32 {
        let (a, b) = (self.luminance(), other.luminance());
        let (hi, lo) = if a > b { (a, b) } else { (b, a) };
        (hi + 0.05) / (lo + 0.05)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.hex())
    }
}

fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn rgb_to_cmyk(r: f32, g: f32, b: f32) -> [f32; 4] {
    let k = 1.0 - r.max(g).max(b);
    if k >= 1.0 {
        return [0.0, 0.0, 0.0, 1.0];
    }
    [
        (1.0 - r - k) / (1.0 - k),
        (1.0 - g - k) / (1.0 - k),
        (1.0 - b - k) / (1.0 - k),
        k,
    ]
}

fn cmyk_to_rgb([c, m, y, k]: [f32; 4]) -> (f32, f32, f32) {
    ((1.0 - c) * (1.0 - k), (1.0 - m) * (1.0 - k), (1.0 - y) * (1.0 - k))
}

fn default_one() -> f32 {
    1.0
}

/// Wire form of a colour: a hex string, a CSS name, or a recipe map.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ColorDef {
    Str(String),
    Spot { spot: u32 },
    Cmyk { cmyk: [f32; 4] },
    Name { name: String },
    Ral { ral: u32 },
    Map {
        r: u8,
        g: u8,
        b: u8,
        #[serde(default = "default_one")]
        a: f32,
    },
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let def = match &self.recipe {
            Recipe::Rgb => ColorDef::Str(self.to_string()),
            Recipe::Cmyk(cmyk) => ColorDef::Cmyk { cmyk: *cmyk },
            Recipe::Spot(spot) => ColorDef::Spot { spot: *spot },
            Recipe::Name(name) => ColorDef::Name { name: name.clone() },
            Recipe::Ral(ral) => ColorDef::Ral { ral: *ral },
        };
        def.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match ColorDef::deserialize(deserializer)? {
            ColorDef::Str(s) if s.trim_start().starts_with('#') => {
                Color::from_hex(&s).map_err(de::Error::custom)
            }
            ColorDef::Str(s) => Color::named(&s).map_err(de::Error::custom),
            ColorDef::Spot { spot } => Color::spot(spot).map_err(de::Error::custom),
            ColorDef::Cmyk { cmyk: [c, m, y, k] } => Ok(Color::cmyk(c, m, y, k)),
            ColorDef::Name { name } => Color::named(&name).map_err(de::Error::custom),
            ColorDef::Ral { ral } => Color::ral(ral).map_err(de::Error::custom),
            ColorDef::Map { r, g, b, a } => Ok(Color::from_bytes(r, g, b).with_alpha(a)),
        }
    }
}
