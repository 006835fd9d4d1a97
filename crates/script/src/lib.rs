//! A small, sandboxed scripting language for runnable code blocks.
//!
//! Scripts are sequences of assignments, deletions and expressions over
//! numbers, strings, lists, colours and opaque host objects. There are no
//! loops, imports or function definitions, so every script terminates.
//! Everything a script can touch beyond its own bindings goes through a
//! [`Host`].

pub mod ast;
pub mod bindings;
pub mod engine;
pub mod error;
pub mod functions;
pub mod host;
pub mod parser;
pub mod value;

pub use ast::Program;
pub use bindings::{Bindings, CODE_KEY, ERROR_KEY};
pub use engine::Interpreter;
pub use error::{ErrorKind, ScriptError};
pub use functions::{FunctionRegistry, ScriptFunction};
pub use host::{Args, Host, NoHost};
pub use parser::parse_program;
pub use value::{ObjectKind, ObjectRef, Value};

/// Parses and runs `source` with the built-in functions.
///
/// A syntax error is reported before any statement runs. A runtime error
/// leaves the effects of earlier statements in `bindings`.
pub fn execute(source: &str, host: &mut dyn Host, bindings: &mut Bindings) -> Result<(), ScriptError> {
    let program = parse_program(source)?;
    let functions = FunctionRegistry::default();
    Interpreter::new(host, &functions).run(&program, bindings)
}
