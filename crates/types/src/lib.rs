pub mod color;
pub mod geometry;
pub mod style;
pub mod tables;

pub use color::{Color, ColorError, Recipe};
pub use geometry::{A4, Padding, Point, Rect, Size};
pub use style::{Paint, TextAlign, TextStyle};
pub use tables::{BuiltinTable, ColorTable};
