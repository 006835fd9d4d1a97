/// An image reference. Backends without image support draw a placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub path: String,
}

impl Image {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}
