//! Tree-walking evaluator for parsed programs.
use crate::ast::{Argument, BinaryOp, Expr, Program, Statement, Target, UnaryOp};
use crate::bindings::Bindings;
use crate::error::ScriptError;
use crate::functions::FunctionRegistry;
use crate::host::{Args, Host};
use crate::value::Value;
use folio_types::Color;
use std::cmp::Ordering;

/// Runs statements against a set of bindings. Statements that completed
/// before a failure keep their effects.
pub struct Interpreter<'a> {
    host: &'a mut dyn Host,
    functions: &'a FunctionRegistry,
}

impl<'a> Interpreter<'a> {
    pub fn new(host: &'a mut dyn Host, functions: &'a FunctionRegistry) -> Self {
        Self { host, functions }
    }

    pub fn run(&mut self, program: &Program, bindings: &mut Bindings) -> Result<(), ScriptError> {
        for statement in &program.statements {
            self.execute(statement, bindings)?;
        }
        Ok(())
    }

    fn execute(&mut self, statement: &Statement, bindings: &mut Bindings) -> Result<(), ScriptError> {
        match statement {
            Statement::Assign {
                target: Target::Name(name),
                value,
            } => {
                let v = self.eval(value, bindings)?;
                bindings.insert(name.clone(), v);
            }
            Statement::Assign {
                target: Target::Attribute { object, name },
                value,
            } => {
                let v = self.eval(value, bindings)?;
                match self.eval(object, bindings)? {
                    Value::Object(obj) => self.host.set_attr(obj, name, v)?,
                    other => return Err(ScriptError::attribute(other.type_name(), name)),
                }
            }
            Statement::Delete(name) => {
                if bindings.remove(name).is_none() {
                    return Err(ScriptError::name_error(name));
                }
            }
            Statement::Expr(expr) => {
                self.eval(expr, bindings)?;
            }
        }
        Ok(())
    }

    pub fn eval(&mut self, expr: &Expr, bindings: &Bindings) -> Result<Value, ScriptError> {
        match expr {
            Expr::Literal(v) => Ok(v.clone()),
            Expr::Name(name) => match bindings.get(name) {
                Some(v) => Ok(v.clone()),
                None if self.is_function(name) => Err(ScriptError::type_error(format!(
                    "function '{}' can only be called",
                    name
                ))),
                None => Err(ScriptError::name_error(name)),
            },
            Expr::List(items) => items
                .iter()
                .map(|item| self.eval(item, bindings))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            Expr::Attribute { object, name } => {
                let target = self.eval(object, bindings)?;
                self.get_attribute(target, name)
            }
            Expr::Index { object, index } => {
                let target = self.eval(object, bindings)?;
                let index = self.eval(index, bindings)?;
                subscript(&target, &index)
            }
            Expr::Call { callee, args } => match callee.as_ref() {
                Expr::Name(name) => {
                    let args = self.eval_args(args, bindings)?;
                    self.call_name(name, args, bindings)
                }
                Expr::Attribute { object, name } => {
                    let target = self.eval(object, bindings)?;
                    let args = self.eval_args(args, bindings)?;
                    self.call_method(target, name, args)
                }
                other => {
                    let v = self.eval(other, bindings)?;
                    Err(ScriptError::type_error(format!(
                        "'{}' object is not callable",
                        v.type_name()
                    )))
                }
            },
            Expr::Unary { op, operand } => {
                let v = self.eval(operand, bindings)?;
                match op {
                    UnaryOp::Not => Ok(Value::Bool(!v.is_truthy())),
                    UnaryOp::Neg => match v {
                        Value::Int(i) => i
                            .checked_neg()
                            .map(Value::Int)
                            .ok_or_else(|| ScriptError::other("integer overflow")),
                        Value::Float(f) => Ok(Value::Float(-f)),
                        Value::Bool(b) => Ok(Value::Int(-(b as i64))),
                        other => Err(ScriptError::type_error(format!(
                            "bad operand type for unary -: '{}'",
                            other.type_name()
                        ))),
                    },
                }
            }
            Expr::Binary { op, left, right } => {
                let l = self.eval(left, bindings)?;
                match op {
                    BinaryOp::And if !l.is_truthy() => Ok(l),
                    BinaryOp::Or if l.is_truthy() => Ok(l),
                    BinaryOp::And | BinaryOp::Or => self.eval(right, bindings),
                    _ => {
                        let r = self.eval(right, bindings)?;
                        binary(*op, &l, &r)
                    }
                }
            }
        }
    }

    fn is_function(&self, name: &str) -> bool {
        self.host.has_function(name) || self.functions.contains(name)
    }

    fn eval_args(&mut self, args: &[Argument], bindings: &Bindings) -> Result<Args, ScriptError> {
        let mut out = Args::new();
        for arg in args {
            match arg {
                Argument::Positional(expr) => out.push(self.eval(expr, bindings)?),
                Argument::Keyword(key, expr) => {
                    if out.keyword(key).is_some() {
                        return Err(ScriptError::syntax(format!(
                            "keyword argument repeated: {}",
                            key
                        )));
                    }
                    let v = self.eval(expr, bindings)?;
                    out.push_keyword(key.clone(), v);
                }
            }
        }
        Ok(out)
    }

    /// Bound names shadow host functions, which shadow built-ins.
    fn call_name(&mut self, name: &str, args: Args, bindings: &Bindings) -> Result<Value, ScriptError> {
        if let Some(v) = bindings.get(name) {
            return Err(ScriptError::type_error(format!(
                "'{}' object is not callable",
                v.type_name()
            )));
        }
        if self.host.has_function(name) {
            return self.host.call_function(name, args);
        }
        match self.functions.get(name) {
            Some(func) => func(&args),
            None => Err(ScriptError::name_error(name)),
        }
    }

    fn get_attribute(&self, target: Value, name: &str) -> Result<Value, ScriptError> {
        match target {
            Value::Object(obj) => self.host.get_attr(obj, name),
            Value::Color(c) => color_attribute(&c, name),
            other => Err(ScriptError::attribute(other.type_name(), name)),
        }
    }

    fn call_method(&mut self, target: Value, name: &str, args: Args) -> Result<Value, ScriptError> {
        match target {
            Value::Object(obj) => self.host.call_method(obj, name, args),
            Value::Str(s) => str_method(&s, name, &args),
            Value::Color(c) => color_method(&c, name, &args),
            other => Err(ScriptError::attribute(other.type_name(), name)),
        }
    }
}

fn color_attribute(c: &Color, name: &str) -> Result<Value, ScriptError> {
    let (r, g, b) = c.rgb_components();
    Ok(match name {
        "hex" => Value::Str(c.hex()),
        "name" => Value::Str(c.name()),
        "spot" => Value::Int(c.spot_number() as i64),
        "ral" => Value::Int(c.ral_code() as i64),
        "cmyk" => Value::List(c.cmyk_components().iter().map(|v| Value::from(*v)).collect()),
        "rgb" => Value::List(vec![r.into(), g.into(), b.into()]),
        "r" => r.into(),
        "g" => g.into(),
        "b" => b.into(),
        "alpha" => c.alpha().into(),
        "luminance" => c.luminance().into(),
        "is_rgb" => c.is_rgb().into(),
        "is_cmyk" => c.is_cmyk().into(),
        "is_spot" => c.is_spot().into(),
        "is_name" => c.is_name().into(),
        "is_ral" => c.is_ral().into(),
        _ => return Err(ScriptError::attribute("Color", name)),
    })
}

fn color_method(c: &Color, name: &str, args: &Args) -> Result<Value, ScriptError> {
    match name {
        "lighter" | "darker" | "with_alpha" => {
            args.check(name, &["amount"])?;
            let amount = args.number(0, "amount", name)?.unwrap_or(0.5) as f32;
            Ok(Value::Color(match name {
                "lighter" => c.lighter(amount),
                "darker" => c.darker(amount),
                _ => c.clone().with_alpha(amount),
            }))
        }
        "mix" => {
            args.check(name, &["other", "amount"])?;
            let other = match args.require(0, "other", name)? {
                Value::Color(other) => other,
                v => {
                    return Err(ScriptError::type_error(format!(
                        "mix() needs a Color, not '{}'",
                        v.type_name()
                    )));
                }
            };
            let amount = args.number(1, "amount", name)?.unwrap_or(0.5) as f32;
            Ok(Value::Color(c.mix(other, amount)))
        }
        "contrast" => match args.require(0, "other", name)? {
            Value::Color(other) => Ok(c.contrast_ratio(other).into()),
            v => Err(ScriptError::type_error(format!(
                "contrast() needs a Color, not '{}'",
                v.type_name()
            ))),
        },
        _ => Err(ScriptError::attribute("Color", name)),
    }
}

fn str_method(s: &str, name: &str, args: &Args) -> Result<Value, ScriptError> {
    let text_arg = |index: usize, arg: &str| -> Result<String, ScriptError> {
        args.string(index, arg, name)?
            .map(str::to_string)
            .ok_or_else(|| {
                ScriptError::type_error(format!("{}() missing required argument: '{}'", name, arg))
            })
    };
    Ok(match name {
        "upper" => Value::Str(s.to_uppercase()),
        "lower" => Value::Str(s.to_lowercase()),
        "strip" => Value::Str(s.trim().to_string()),
        "title" => Value::Str(
            s.split(' ')
                .map(|word| {
                    let mut chars = word.chars();
                    match chars.next() {
                        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                        None => String::new(),
                    }
                })
                .collect::<Vec<String>>()
                .join(" "),
        ),
        "startswith" => Value::Bool(s.starts_with(text_arg(0, "prefix")?.as_str())),
        "endswith" => Value::Bool(s.ends_with(text_arg(0, "suffix")?.as_str())),
        "replace" => Value::Str(s.replace(text_arg(0, "old")?.as_str(), &text_arg(1, "new")?)),
        "split" => {
            let parts: Vec<Value> = match args.string(0, "sep", name)? {
                Some(sep) => s.split(sep).map(Value::from).collect(),
                None => s.split_whitespace().map(Value::from).collect(),
            };
            Value::List(parts)
        }
        "join" => match args.require(0, "iterable", name)? {
            Value::List(items) => Value::Str(
                items
                    .iter()
                    .map(|item| match item {
                        Value::Str(part) => Ok(part.clone()),
                        other => Err(ScriptError::type_error(format!(
                            "sequence item: expected str instance, {} found",
                            other.type_name()
                        ))),
                    })
                    .collect::<Result<Vec<_>, _>>()?
                    .join(s),
            ),
            other => {
                return Err(ScriptError::type_error(format!(
                    "can only join a list, not '{}'",
                    other.type_name()
                )));
            }
        },
        _ => return Err(ScriptError::attribute("str", name)),
    })
}

fn subscript(target: &Value, index: &Value) -> Result<Value, ScriptError> {
    let i = index.as_int().ok_or_else(|| {
        ScriptError::type_error(format!(
            "indices must be integers, not '{}'",
            index.type_name()
        ))
    })?;
    let resolve = |len: usize| -> Result<usize, ScriptError> {
        let resolved = if i < 0 { len as i64 + i } else { i };
        if resolved < 0 || resolved >= len as i64 {
            return Err(ScriptError::other("index out of range"));
        }
        Ok(resolved as usize)
    };
    match target {
        Value::List(items) => Ok(items[resolve(items.len())?].clone()),
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            Ok(Value::Str(chars[resolve(chars.len())?].to_string()))
        }
        other => Err(ScriptError::type_error(format!(
            "'{}' object is not subscriptable",
            other.type_name()
        ))),
    }
}

fn unsupported(op: BinaryOp, l: &Value, r: &Value) -> ScriptError {
    ScriptError::type_error(format!(
        "unsupported operand type(s) for {}: '{}' and '{}'",
        op.symbol(),
        l.type_name(),
        r.type_name()
    ))
}

fn overflow() -> ScriptError {
    ScriptError::other("integer overflow")
}

fn not_arithmetic(op: BinaryOp) -> ScriptError {
    ScriptError::other(format!("'{}' is not an arithmetic operator", op.symbol()))
}

fn zero_division() -> ScriptError {
    ScriptError::other("division by zero")
}

/// Non-numeric values compare by structural equality; numbers compare by value.
pub(crate) fn values_equal(l: &Value, r: &Value) -> bool {
    match (l, r) {
        (Value::Int(a), Value::Int(b)) => a == b,
        _ => match (l.as_f64(), r.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => l == r,
        },
    }
}

pub(crate) fn compare(l: &Value, r: &Value, symbol: &str) -> Result<Ordering, ScriptError> {
    let ordering = match (l, r) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        _ => match (l.as_f64(), r.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => None,
        },
    };
    ordering.ok_or_else(|| {
        ScriptError::type_error(format!(
            "'{}' not supported between instances of '{}' and '{}'",
            symbol,
            l.type_name(),
            r.type_name()
        ))
    })
}

fn repeat(items: &[Value], n: i64) -> Result<Value, ScriptError> {
    let n = n.max(0) as usize;
    if items.len().saturating_mul(n) > crate::functions::MAX_RANGE {
        return Err(ScriptError::other("repeated sequence is too long"));
    }
    Ok(Value::List((0..n).flat_map(|_| items.iter().cloned()).collect()))
}

pub(crate) fn binary(op: BinaryOp, l: &Value, r: &Value) -> Result<Value, ScriptError> {
    use BinaryOp::*;
    match op {
        Eq => return Ok(Value::Bool(values_equal(l, r))),
        Ne => return Ok(Value::Bool(!values_equal(l, r))),
        Lt => return Ok(Value::Bool(compare(l, r, "<")?.is_lt())),
        Le => return Ok(Value::Bool(compare(l, r, "<=")?.is_le())),
        Gt => return Ok(Value::Bool(compare(l, r, ">")?.is_gt())),
        Ge => return Ok(Value::Bool(compare(l, r, ">=")?.is_ge())),
        _ => {}
    }
    match (op, l, r) {
        (Add, Value::Str(a), Value::Str(b)) => return Ok(Value::Str(format!("{}{}", a, b))),
        (Add, Value::List(a), Value::List(b)) => {
            return Ok(Value::List(a.iter().chain(b).cloned().collect()));
        }
        (Mul, Value::Str(s), Value::Int(n)) | (Mul, Value::Int(n), Value::Str(s)) => {
            let n = (*n).max(0) as usize;
            if s.len().saturating_mul(n) > crate::functions::MAX_RANGE {
                return Err(ScriptError::other("repeated string is too long"));
            }
            return Ok(Value::Str(s.repeat(n)));
        }
        (Mul, Value::List(items), Value::Int(n)) | (Mul, Value::Int(n), Value::List(items)) => {
            return repeat(items, *n);
        }
        _ => {}
    }
    let is_int = |v: &Value| matches!(v, Value::Int(_) | Value::Bool(_));
    if is_int(l) && is_int(r) {
        let (a, b) = match (l.as_int(), r.as_int()) {
            (Some(a), Some(b)) => (a, b),
            _ => return Err(unsupported(op, l, r)),
        };
        return int_arithmetic(op, a, b);
    }
    match (l.as_f64(), r.as_f64()) {
        (Some(a), Some(b)) => float_arithmetic(op, a, b),
        _ => Err(unsupported(op, l, r)),
    }
}

fn int_arithmetic(op: BinaryOp, a: i64, b: i64) -> Result<Value, ScriptError> {
    let result = match op {
        BinaryOp::Add => a.checked_add(b).ok_or_else(overflow)?,
        BinaryOp::Sub => a.checked_sub(b).ok_or_else(overflow)?,
        BinaryOp::Mul => a.checked_mul(b).ok_or_else(overflow)?,
        BinaryOp::Div => {
            if b == 0 {
                return Err(zero_division());
            }
            return Ok(Value::Float(a as f64 / b as f64));
        }
        BinaryOp::FloorDiv => {
            if b == 0 {
                return Err(zero_division());
            }
            let q = a.checked_div(b).ok_or_else(overflow)?;
            if a % b != 0 && ((a < 0) != (b < 0)) {
                q - 1
            } else {
                q
            }
        }
        BinaryOp::Mod => {
            if b == 0 {
                return Err(zero_division());
            }
            let m = a.checked_rem(b).ok_or_else(overflow)?;
            if m != 0 && ((m < 0) != (b < 0)) { m + b } else { m }
        }
        _ => return Err(not_arithmetic(op)),
    };
    Ok(Value::Int(result))
}

fn float_arithmetic(op: BinaryOp, a: f64, b: f64) -> Result<Value, ScriptError> {
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div | BinaryOp::FloorDiv | BinaryOp::Mod if b == 0.0 => {
            return Err(zero_division());
        }
        BinaryOp::Div => a / b,
        BinaryOp::FloorDiv => (a / b).floor(),
        BinaryOp::Mod => a - b * (a / b).floor(),
        _ => return Err(not_arithmetic(op)),
    };
    Ok(Value::Float(result))
}
