use serde::{Deserialize, Deserializer, Serialize, de};

/// A4 portrait in points.
pub const A4: Size = Size {
    width: 595.0,
    height: 842.0,
};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn zero() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
        }
    }
}

/// Padding in CSS order: top, right, bottom, left.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Padding {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Padding {
    pub fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn uniform(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    /// Expands 1, 2, 3 or 4 values the way CSS shorthand does.
    pub fn from_values(values: &[f32]) -> Option<Self> {
        match *values {
            [all] => Some(Self::uniform(all)),
            [vertical, horizontal] => Some(Self::new(vertical, horizontal, vertical, horizontal)),
            [top, horizontal, bottom] => Some(Self::new(top, horizontal, bottom, horizontal)),
            [top, right, bottom, left] => Some(Self::new(top, right, bottom, left)),
            _ => None,
        }
    }

    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

impl From<f32> for Padding {
    fn from(value: f32) -> Self {
        Self::uniform(value)
    }
}

impl<'de> Deserialize<'de> for Padding {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum PaddingDef {
            Uniform(f32),
            Values(Vec<f32>),
            Map {
                top: f32,
                right: f32,
                bottom: f32,
                left: f32,
            },
        }

        match PaddingDef::deserialize(deserializer)? {
            PaddingDef::Uniform(v) => Ok(Padding::uniform(v)),
            PaddingDef::Values(values) => Padding::from_values(&values).ok_or_else(|| {
                de::Error::custom(format!(
                    "Invalid number of padding values: got {}, expected 1, 2, 3 or 4",
                    values.len()
                ))
            }),
            PaddingDef::Map {
                top,
                right,
                bottom,
                left,
            } => Ok(Padding::new(top, right, bottom, left)),
        }
    }
}
