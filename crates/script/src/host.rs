//! The seam between the interpreter and the objects it manipulates.

use crate::error::ScriptError;
use crate::value::{ObjectRef, Value};
use indexmap::IndexMap;

/// Call arguments, positional first, then keywords in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    positional: Vec<Value>,
    keywords: IndexMap<String, Value>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn positional(values: Vec<Value>) -> Self {
        Self {
            positional: values,
            keywords: IndexMap::new(),
        }
    }

    pub fn push(&mut self, value: Value) {
        self.positional.push(value);
    }

    pub fn push_keyword(&mut self, name: impl Into<String>, value: Value) {
        self.keywords.insert(name.into(), value);
    }

    pub fn values(&self) -> &[Value] {
        &self.positional
    }

    pub fn keywords(&self) -> &IndexMap<String, Value> {
        &self.keywords
    }

    pub fn len(&self) -> usize {
        self.positional.len() + self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The argument at `index`, or the keyword `name`.
    pub fn get(&self, index: usize, name: &str) -> Option<&Value> {
        self.positional
            .get(index)
            .or_else(|| self.keywords.get(name))
    }

    pub fn keyword(&self, name: &str) -> Option<&Value> {
        self.keywords.get(name)
    }

    pub fn require(&self, index: usize, name: &str, func: &str) -> Result<&Value, ScriptError> {
        self.get(index, name).ok_or_else(|| {
            ScriptError::type_error(format!(
                "{}() missing required argument: '{}'",
                func, name
            ))
        })
    }

    pub fn number(&self, index: usize, name: &str, func: &str) -> Result<Option<f64>, ScriptError> {
        match self.get(index, name) {
            None | Some(Value::None) => Ok(None),
            Some(v) => v.as_f64().map(Some).ok_or_else(|| {
                ScriptError::type_error(format!(
                    "{}() argument '{}' must be a number, not '{}'",
                    func,
                    name,
                    v.type_name()
                ))
            }),
        }
    }

    pub fn string(&self, index: usize, name: &str, func: &str) -> Result<Option<&str>, ScriptError> {
        match self.get(index, name) {
            None | Some(Value::None) => Ok(None),
            Some(Value::Str(s)) => Ok(Some(s)),
            Some(v) => Err(ScriptError::type_error(format!(
                "{}() argument '{}' must be str, not '{}'",
                func,
                name,
                v.type_name()
            ))),
        }
    }

    /// Fails on more positionals than `accepted` names, or on a keyword
    /// not among them.
    pub fn check(&self, func: &str, accepted: &[&str]) -> Result<(), ScriptError> {
        if self.positional.len() > accepted.len() {
            return Err(ScriptError::type_error(format!(
                "{}() takes at most {} positional arguments but {} were given",
                func,
                accepted.len(),
                self.positional.len()
            )));
        }
        if let Some(unknown) = self.keywords.keys().find(|k| !accepted.contains(&k.as_str())) {
            return Err(ScriptError::type_error(format!(
                "{}() got an unexpected keyword argument '{}'",
                func, unknown
            )));
        }
        Ok(())
    }
}

/// Resolves attribute access, method calls and host functions on behalf of
/// the interpreter.
pub trait Host {
    fn get_attr(&self, object: ObjectRef, name: &str) -> Result<Value, ScriptError>;

    fn set_attr(&mut self, object: ObjectRef, name: &str, value: Value) -> Result<(), ScriptError>;

    fn call_method(&mut self, object: ObjectRef, name: &str, args: Args) -> Result<Value, ScriptError>;

    /// Whether `name` is a constructor or function the host provides.
    fn has_function(&self, _name: &str) -> bool {
        false
    }

    fn call_function(&mut self, name: &str, _args: Args) -> Result<Value, ScriptError> {
        Err(ScriptError::name_error(name))
    }
}

/// A host without objects, for running plain scripts.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHost;

impl Host for NoHost {
    fn get_attr(&self, object: ObjectRef, name: &str) -> Result<Value, ScriptError> {
        Err(ScriptError::attribute(object.kind.type_name(), name))
    }

    fn set_attr(&mut self, object: ObjectRef, name: &str, _value: Value) -> Result<(), ScriptError> {
        Err(ScriptError::attribute(object.kind.type_name(), name))
    }

    fn call_method(&mut self, object: ObjectRef, name: &str, _args: Args) -> Result<Value, ScriptError> {
        Err(ScriptError::attribute(object.kind.type_name(), name))
    }
}
