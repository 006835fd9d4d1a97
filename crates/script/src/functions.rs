//! Built-in functions available to every script.
use crate::error::ScriptError;
use crate::host::Args;
use crate::value::Value;
use folio_types::{Color, ColorError};
use std::collections::HashMap;

/// Upper bound on the length of lists built by `range`.
pub const MAX_RANGE: usize = 100_000;

pub type ScriptFunction = fn(&Args) -> Result<Value, ScriptError>;

/// Maps function names to implementations.
pub struct FunctionRegistry {
    functions: HashMap<String, ScriptFunction>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    pub fn register(&mut self, name: &str, func: ScriptFunction) {
        self.functions.insert(name.to_string(), func);
    }

    pub fn get(&self, name: &str) -> Option<&ScriptFunction> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register("len", len);
        registry.register("str", str_fn);
        registry.register("int", int_fn);
        registry.register("float", float_fn);
        registry.register("bool", bool_fn);
        registry.register("abs", abs);
        registry.register("min", min);
        registry.register("max", max);
        registry.register("round", round);
        registry.register("range", range);
        registry.register("print", print);
        registry.register("color", color);
        registry.register("rgb", rgb);
        registry.register("cmyk", cmyk);
        registry.register("spot", spot);
        registry.register("ral", ral);
        registry
    }
}

fn color_error(err: ColorError) -> ScriptError {
    ScriptError::other(err.to_string())
}

fn single<'a>(args: &'a Args, func: &str) -> Result<&'a Value, ScriptError> {
    args.check(func, &["x"])?;
    args.require(0, "x", func)
}

fn len(args: &Args) -> Result<Value, ScriptError> {
    match single(args, "len")? {
        Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
        Value::List(items) => Ok(Value::Int(items.len() as i64)),
        other => Err(ScriptError::type_error(format!(
            "object of type '{}' has no len()",
            other.type_name()
        ))),
    }
}

fn str_fn(args: &Args) -> Result<Value, ScriptError> {
    args.check("str", &["x"])?;
    Ok(Value::Str(
        args.get(0, "x").map(ToString::to_string).unwrap_or_default(),
    ))
}

fn int_fn(args: &Args) -> Result<Value, ScriptError> {
    match single(args, "int")? {
        Value::Int(i) => Ok(Value::Int(*i)),
        Value::Bool(b) => Ok(Value::Int(*b as i64)),
        Value::Float(f) if f.is_finite() => Ok(Value::Int(f.trunc() as i64)),
        Value::Str(s) => s.trim().parse::<i64>().map(Value::Int).map_err(|_| {
            ScriptError::other(format!("invalid literal for int() with base 10: '{}'", s))
        }),
        other => Err(ScriptError::type_error(format!(
            "int() argument must be a string or a number, not '{}'",
            other.type_name()
        ))),
    }
}

fn float_fn(args: &Args) -> Result<Value, ScriptError> {
    match single(args, "float")? {
        Value::Str(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| ScriptError::other(format!("could not convert string to float: '{}'", s))),
        other => other.as_f64().map(Value::Float).ok_or_else(|| {
            ScriptError::type_error(format!(
                "float() argument must be a string or a number, not '{}'",
                other.type_name()
            ))
        }),
    }
}

fn bool_fn(args: &Args) -> Result<Value, ScriptError> {
    args.check("bool", &["x"])?;
    Ok(Value::Bool(
        args.get(0, "x").is_some_and(Value::is_truthy),
    ))
}

fn abs(args: &Args) -> Result<Value, ScriptError> {
    match single(args, "abs")? {
        Value::Int(i) => i
            .checked_abs()
            .map(Value::Int)
            .ok_or_else(|| ScriptError::other("integer overflow")),
        Value::Float(f) => Ok(Value::Float(f.abs())),
        Value::Bool(b) => Ok(Value::Int(*b as i64)),
        other => Err(ScriptError::type_error(format!(
            "bad operand type for abs(): '{}'",
            other.type_name()
        ))),
    }
}

/// A single list argument is unpacked, otherwise all positionals compete.
fn candidates<'a>(args: &'a Args, func: &str) -> Result<&'a [Value], ScriptError> {
    if let Some(key) = args.keywords().keys().next() {
        return Err(ScriptError::type_error(format!(
            "{}() got an unexpected keyword argument '{}'",
            func, key
        )));
    }
    let values = match args.values() {
        [Value::List(items)] => items.as_slice(),
        values => values,
    };
    if values.is_empty() {
        return Err(ScriptError::other(format!("{}() arg is an empty sequence", func)));
    }
    Ok(values)
}

fn extreme(args: &Args, func: &str, want_greater: bool) -> Result<Value, ScriptError> {
    let values = candidates(args, func)?;
    let mut best = &values[0];
    for v in &values[1..] {
        let ordering = crate::engine::compare(v, best, if want_greater { ">" } else { "<" })?;
        let better = if want_greater { ordering.is_gt() } else { ordering.is_lt() };
        if better {
            best = v;
        }
    }
    Ok(best.clone())
}

fn min(args: &Args) -> Result<Value, ScriptError> {
    extreme(args, "min", false)
}

fn max(args: &Args) -> Result<Value, ScriptError> {
    extreme(args, "max", true)
}

fn round(args: &Args) -> Result<Value, ScriptError> {
    args.check("round", &["number", "ndigits"])?;
    let number = args
        .number(0, "number", "round")?
        .ok_or_else(|| ScriptError::type_error("round() missing required argument: 'number'"))?;
    match args.number(1, "ndigits", "round")? {
        None => Ok(Value::Int(number.round() as i64)),
        Some(digits) => {
            let factor = 10f64.powi(digits as i32);
            Ok(Value::Float((number * factor).round() / factor))
        }
    }
}

fn range(args: &Args) -> Result<Value, ScriptError> {
    args.check("range", &["start", "stop", "step"])?;
    let ints: Vec<i64> = args
        .values()
        .iter()
        .map(|v| {
            v.as_int().ok_or_else(|| {
                ScriptError::type_error(format!(
                    "'{}' object cannot be interpreted as an integer",
                    v.type_name()
                ))
            })
        })
        .collect::<Result<_, _>>()?;
    let (start, stop, step) = match ints.as_slice() {
        [stop] => (0, *stop, 1),
        [start, stop] => (*start, *stop, 1),
        [start, stop, step] => (*start, *stop, *step),
        _ => return Err(ScriptError::type_error("range expected at least 1 argument")),
    };
    if step == 0 {
        return Err(ScriptError::other("range() arg 3 must not be zero"));
    }
    let span = (stop as i128 - start as i128) / step as i128;
    if span > MAX_RANGE as i128 {
        return Err(ScriptError::other(format!("range() longer than {} items", MAX_RANGE)));
    }
    let mut items = Vec::new();
    let mut i = start;
    while (step > 0 && i < stop) || (step < 0 && i > stop) {
        items.push(Value::Int(i));
        match i.checked_add(step) {
            Some(next) => i = next,
            None => break,
        }
    }
    Ok(Value::List(items))
}

fn print(args: &Args) -> Result<Value, ScriptError> {
    let line: Vec<String> = args.values().iter().map(ToString::to_string).collect();
    log::info!("{}", line.join(" "));
    Ok(Value::None)
}

/// `color("#FF0000")`, `color("navy")`, or one of the keywords
/// `spot`, `ral`, `name`, `cmyk`.
fn color(args: &Args) -> Result<Value, ScriptError> {
    args.check("color", &["value", "spot", "ral", "name", "cmyk"])?;
    if let Some(v) = args.get(0, "value") {
        return match v {
            Value::Color(c) => Ok(Value::Color(c.clone())),
            Value::Str(s) if s.starts_with('#') => {
                Color::from_hex(s).map(Value::Color).map_err(color_error)
            }
            Value::Str(s) => Color::named(s).map(Value::Color).map_err(color_error),
            Value::Int(n) if *n >= 0 => Color::spot(*n as u32).map(Value::Color).map_err(color_error),
            other => Err(ScriptError::type_error(format!(
                "color() cannot interpret '{}'",
                other.type_name()
            ))),
        };
    }
    if let Some(n) = args.keyword("spot").and_then(Value::as_int) {
        return Color::spot(n as u32).map(Value::Color).map_err(color_error);
    }
    if let Some(n) = args.keyword("ral").and_then(Value::as_int) {
        return Color::ral(n as u32).map(Value::Color).map_err(color_error);
    }
    if let Some(name) = args.keyword("name").and_then(Value::as_str) {
        return Color::named(name).map(Value::Color).map_err(color_error);
    }
    if let Some(Value::List(items)) = args.keyword("cmyk") {
        let cmyk = components::<4>(items, "cmyk")?;
        return Ok(Value::Color(Color::cmyk(cmyk[0], cmyk[1], cmyk[2], cmyk[3])));
    }
    Err(ScriptError::type_error("color() needs a value or one of spot, ral, name, cmyk"))
}

fn components<const N: usize>(items: &[Value], func: &str) -> Result<[f32; N], ScriptError> {
    if items.len() != N {
        return Err(ScriptError::type_error(format!(
            "{}() takes {} components, got {}",
            func,
            N,
            items.len()
        )));
    }
    let mut out = [0.0f32; N];
    for (slot, item) in out.iter_mut().zip(items) {
        *slot = item.as_f64().ok_or_else(|| {
            ScriptError::type_error(format!("{}() components must be numbers", func))
        })? as f32;
    }
    Ok(out)
}

fn rgb(args: &Args) -> Result<Value, ScriptError> {
    args.check("rgb", &["r", "g", "b", "a"])?;
    let mut rgb = [0.0f32; 3];
    for (i, name) in ["r", "g", "b"].iter().enumerate() {
        rgb[i] = args
            .number(i, name, "rgb")?
            .ok_or_else(|| ScriptError::type_error(format!("rgb() missing required argument: '{}'", name)))?
            as f32;
    }
    let color = Color::rgb(rgb[0], rgb[1], rgb[2]);
    match args.number(3, "a", "rgb")? {
        Some(a) => Ok(Value::Color(color.with_alpha(a as f32))),
        None => Ok(Value::Color(color)),
    }
}

fn cmyk(args: &Args) -> Result<Value, ScriptError> {
    args.check("cmyk", &["c", "m", "y", "k"])?;
    let mut cmyk = [0.0f32; 4];
    for (i, name) in ["c", "m", "y", "k"].iter().enumerate() {
        cmyk[i] = args.number(i, name, "cmyk")?.unwrap_or(0.0) as f32;
    }
    Ok(Value::Color(Color::cmyk(cmyk[0], cmyk[1], cmyk[2], cmyk[3])))
}

fn code_argument(args: &Args, func: &str) -> Result<u32, ScriptError> {
    args.check(func, &["code"])?;
    match args.require(0, "code", func)? {
        Value::Int(n) if *n >= 0 => Ok(*n as u32),
        other => Err(ScriptError::type_error(format!(
            "{}() code must be a positive int, not '{}'",
            func,
            other.type_name()
        ))),
    }
}

fn spot(args: &Args) -> Result<Value, ScriptError> {
    let code = code_argument(args, "spot")?;
    Color::spot(code).map(Value::Color).map_err(color_error)
}

fn ral(args: &Args) -> Result<Value, ScriptError> {
    let code = code_argument(args, "ral")?;
    Color::ral(code).map(Value::Color).map_err(color_error)
}
