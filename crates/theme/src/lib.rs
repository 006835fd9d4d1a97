//! Themes for folio documents.
//!
//! A [`Theme`] expands six base colours into a fixed `base x shade` matrix.
//! The [`Mood`] decides which end of the shade axis backgrounds are taken
//! from; [`Theme::text_color`] answers a readable foreground for any cell.

mod config;
mod error;
pub mod palettes;
mod theme;

pub use config::ThemeConfig;
pub use error::ThemeError;
pub use theme::{BASE_COUNT, BASE_SHADE, Mood, SHADES, Theme};
