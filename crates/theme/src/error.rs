use folio_types::ColorError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ThemeError {
    #[error("Theme {axis} index {index} is out of range for {len} entries")]
    OutOfRange {
        axis: &'static str,
        index: isize,
        len: usize,
    },
    #[error("Theme is missing base color '{0}'")]
    MissingBase(String),
    #[error("Unknown theme base color '{0}', expected base0 .. base5")]
    UnknownBase(String),
    #[error("Unknown palette '{0}'")]
    UnknownPalette(String),
    #[error("Invalid palette color: {0}")]
    Color(#[from] ColorError),
}
