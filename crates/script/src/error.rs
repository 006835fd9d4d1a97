use std::fmt;
use thiserror::Error;

/// The classes of failure a script run can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An operation was applied to a value of the wrong type.
    TypeMismatch,
    /// A name was read that is not bound and is not a known function.
    UnresolvedName,
    /// The source could not be parsed.
    MalformedSource,
    /// An attribute or method does not exist on the target.
    MissingAttribute,
    /// Everything else: division by zero, bad index, host failures.
    Unclassified,
}

impl ErrorKind {
    /// The label recorded under `__error__` by guarded code blocks.
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::TypeMismatch => "TypeError",
            ErrorKind::UnresolvedName => "NameError",
            ErrorKind::MalformedSource => "SyntaxError",
            ErrorKind::MissingAttribute => "AttributeError",
            ErrorKind::Unclassified => "Unknown Error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind}: {message}")]
pub struct ScriptError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ScriptError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeMismatch, message)
    }

    pub fn name_error(name: &str) -> Self {
        Self::new(
            ErrorKind::UnresolvedName,
            format!("name '{}' is not defined", name),
        )
    }

    pub fn syntax(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedSource, message)
    }

    pub fn attribute(type_name: &str, attribute: &str) -> Self {
        Self::new(
            ErrorKind::MissingAttribute,
            format!("'{}' object has no attribute '{}'", type_name, attribute),
        )
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unclassified, message)
    }
}
