//! A `nom`-based parser for the script language.
//!
//! Statements are separated by newlines or `;`. Inside brackets, newlines
//! and comments are insignificant, so long calls can span lines.
use crate::ast::{Argument, BinaryOp, Expr, Program, Statement, Target, UnaryOp};
use crate::error::ScriptError;
use crate::value::Value;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{alpha1, char, digit1, multispace0, one_of, satisfy},
    combinator::{not, opt, recognize, value},
    error::{Error as NomError, ErrorKind as NomErrorKind},
    sequence::{pair, preceded, terminated},
};

type Res<'a, T> = IResult<&'a str, T, NomError<&'a str>>;

/// Words that can never be used as names.
const RESERVED: &[&str] = &[
    "True", "False", "None", "and", "or", "not", "del", "if", "elif", "else", "for", "while",
    "def", "return", "import", "from", "class", "lambda", "in", "is", "pass", "with", "try",
    "except", "global", "yield",
];

// --- Main Public Parser ---

pub fn parse_program(source: &str) -> Result<Program, ScriptError> {
    let mut statements = Vec::new();
    let mut rest = skip_separators(source);
    while !rest.is_empty() {
        let (after, stmt) = statement(rest).map_err(|e| syntax_error(source, e))?;
        statements.push(stmt);
        let (after, _) = sp(after).map_err(|e| syntax_error(source, e))?;
        if !at_statement_end(after) {
            return Err(error_at(source, after));
        }
        rest = skip_separators(after);
    }
    Ok(Program { statements })
}

fn at_statement_end(input: &str) -> bool {
    input.is_empty()
        || input.starts_with('\n')
        || input.starts_with("\r\n")
        || input.starts_with(';')
        || input.starts_with('#')
}

fn syntax_error(source: &str, err: nom::Err<NomError<&str>>) -> ScriptError {
    match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => error_at(source, e.input),
        nom::Err::Incomplete(_) => ScriptError::syntax("unexpected end of input"),
    }
}

fn error_at(source: &str, remaining: &str) -> ScriptError {
    let offset = source.len().saturating_sub(remaining.len());
    let line = source[..offset].matches('\n').count() + 1;
    let near: String = remaining
        .lines()
        .next()
        .unwrap_or("")
        .chars()
        .take(20)
        .collect();
    if near.is_empty() {
        ScriptError::syntax(format!("invalid syntax at line {}: unexpected end of input", line))
    } else {
        ScriptError::syntax(format!("invalid syntax at line {} near '{}'", line, near))
    }
}

fn fail<T>(input: &str) -> Res<'_, T> {
    Err(nom::Err::Failure(NomError::new(input, NomErrorKind::Verify)))
}

// --- Whitespace ---

/// Spaces and tabs only.
fn sp(input: &str) -> Res<'_, &str> {
    take_while(|c: char| c == ' ' || c == '\t').parse(input)
}

/// Whitespace including newlines and comments, used inside brackets.
fn blank(input: &str) -> Res<'_, ()> {
    let mut rest = input;
    loop {
        let (r, _) = multispace0(rest)?;
        match r.strip_prefix('#') {
            Some(comment) => rest = comment.find('\n').map_or("", |i| &comment[i..]),
            None => return Ok((r, ())),
        }
    }
}

fn skip_separators(input: &str) -> &str {
    let mut rest = input;
    loop {
        let trimmed = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ';');
        match trimmed.strip_prefix('#') {
            Some(comment) => rest = comment.find('\n').map_or("", |i| &comment[i..]),
            None => return trimmed,
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn keyword<'a>(kw: &'static str) -> impl FnMut(&'a str) -> Res<'a, &'a str> {
    move |input| terminated(tag(kw), not(satisfy(is_ident_char))).parse(input)
}

fn identifier(input: &str) -> Res<'_, &str> {
    recognize(pair(alt((alpha1, tag("_"))), take_while(is_ident_char))).parse(input)
}

fn name(input: &str) -> Res<'_, &str> {
    let (rest, ident) = identifier(input)?;
    if RESERVED.contains(&ident) {
        return Err(nom::Err::Error(NomError::new(input, NomErrorKind::Tag)));
    }
    Ok((rest, ident))
}

// --- Statements ---

fn statement(input: &str) -> Res<'_, Statement> {
    alt((delete, assignment, expression_statement)).parse(input)
}

fn delete(input: &str) -> Res<'_, Statement> {
    let (rest, _) = keyword("del")(input)?;
    let (rest, _) = sp(rest)?;
    match name(rest) {
        Ok((rest, target)) => Ok((rest, Statement::Delete(target.to_string()))),
        Err(_) => fail(rest),
    }
}

fn augmented_op(input: &str) -> Res<'_, BinaryOp> {
    alt((
        value(BinaryOp::FloorDiv, tag("//")),
        value(BinaryOp::Add, char('+')),
        value(BinaryOp::Sub, char('-')),
        value(BinaryOp::Mul, char('*')),
        value(BinaryOp::Div, char('/')),
        value(BinaryOp::Mod, char('%')),
    ))
    .parse(input)
}

fn assignment(input: &str) -> Res<'_, Statement> {
    let (rest, target_expr) = postfix(input)?;
    let (rest, _) = sp(rest)?;
    let (rest, augmented) = opt(augmented_op).parse(rest)?;
    let (rest, _) = char('=').parse(rest)?;
    let (rest, _) = not(char('=')).parse(rest)?;
    let (rest, _) = sp(rest)?;
    let (rest, rhs) = match expression(rest) {
        Ok(ok) => ok,
        Err(nom::Err::Error(e)) => return fail(e.input),
        Err(e) => return Err(e),
    };
    let value = match augmented {
        Some(op) => Expr::Binary {
            op,
            left: Box::new(target_expr.clone()),
            right: Box::new(rhs),
        },
        None => rhs,
    };
    let target = match target_expr {
        Expr::Name(n) => Target::Name(n),
        Expr::Attribute { object, name } => Target::Attribute {
            object: *object,
            name,
        },
        _ => return fail(input),
    };
    Ok((rest, Statement::Assign { target, value }))
}

fn expression_statement(input: &str) -> Res<'_, Statement> {
    let (rest, expr) = expression(input)?;
    Ok((rest, Statement::Expr(expr)))
}

// --- Expressions, loosest binding first ---

pub(crate) fn expression(input: &str) -> Res<'_, Expr> {
    binary_level(input, and_expr, or_op)
}

fn or_op(input: &str) -> Res<'_, BinaryOp> {
    preceded(sp, value(BinaryOp::Or, keyword("or"))).parse(input)
}

fn and_expr(input: &str) -> Res<'_, Expr> {
    binary_level(input, not_expr, and_op)
}

fn and_op(input: &str) -> Res<'_, BinaryOp> {
    preceded(sp, value(BinaryOp::And, keyword("and"))).parse(input)
}

fn not_expr(input: &str) -> Res<'_, Expr> {
    match keyword("not")(input) {
        Ok((rest, _)) => {
            let (rest, _) = sp(rest)?;
            let (rest, operand) = not_expr(rest)?;
            Ok((
                rest,
                Expr::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                },
            ))
        }
        Err(_) => comparison(input),
    }
}

fn comparison(input: &str) -> Res<'_, Expr> {
    binary_level(input, additive, comparison_op)
}

fn comparison_op(input: &str) -> Res<'_, BinaryOp> {
    preceded(
        sp,
        alt((
            value(BinaryOp::Eq, tag("==")),
            value(BinaryOp::Ne, tag("!=")),
            value(BinaryOp::Le, tag("<=")),
            value(BinaryOp::Ge, tag(">=")),
            value(BinaryOp::Lt, char('<')),
            value(BinaryOp::Gt, char('>')),
        )),
    )
    .parse(input)
}

fn additive(input: &str) -> Res<'_, Expr> {
    binary_level(input, term, additive_op)
}

fn additive_op(input: &str) -> Res<'_, BinaryOp> {
    preceded(
        sp,
        terminated(
            alt((value(BinaryOp::Add, char('+')), value(BinaryOp::Sub, char('-')))),
            not(char('=')),
        ),
    )
    .parse(input)
}

fn term(input: &str) -> Res<'_, Expr> {
    binary_level(input, unary, term_op)
}

fn term_op(input: &str) -> Res<'_, BinaryOp> {
    preceded(
        sp,
        terminated(
            alt((
                value(BinaryOp::FloorDiv, tag("//")),
                value(BinaryOp::Mul, char('*')),
                value(BinaryOp::Div, char('/')),
                value(BinaryOp::Mod, char('%')),
            )),
            not(char('=')),
        ),
    )
    .parse(input)
}

fn unary(input: &str) -> Res<'_, Expr> {
    if let Ok((rest, sign)) = one_of::<_, _, NomError<&str>>("-+").parse(input) {
        let (rest, _) = sp(rest)?;
        let (rest, operand) = unary(rest)?;
        if sign == '+' {
            return Ok((rest, operand));
        }
        return Ok((
            rest,
            Expr::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(operand),
            },
        ));
    }
    postfix(input)
}

/// Left-associative chain of `operand (operator operand)*`.
fn binary_level<'a>(
    input: &'a str,
    operand: fn(&'a str) -> Res<'a, Expr>,
    operator: fn(&'a str) -> Res<'a, BinaryOp>,
) -> Res<'a, Expr> {
    let (mut rest, mut left) = operand(input)?;
    loop {
        let (after_op, op) = match operator(rest) {
            Ok(ok) => ok,
            Err(nom::Err::Error(_)) => return Ok((rest, left)),
            Err(e) => return Err(e),
        };
        let (after_op, _) = sp(after_op)?;
        let (after, right) = match operand(after_op) {
            Ok(ok) => ok,
            Err(nom::Err::Error(e)) => return fail(e.input),
            Err(e) => return Err(e),
        };
        left = Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        };
        rest = after;
    }
}

// --- Postfix: attribute access, calls, indexing ---

enum Suffix {
    Attribute(String),
    Call(Vec<Argument>),
    Index(Expr),
}

fn suffix(input: &str) -> Res<'_, Suffix> {
    if let Ok((rest, _)) = char::<_, NomError<&str>>('.').parse(input) {
        return match identifier(rest) {
            Ok((rest, attr)) => Ok((rest, Suffix::Attribute(attr.to_string()))),
            Err(_) => fail(rest),
        };
    }
    if let Ok((rest, _)) = char::<_, NomError<&str>>('(').parse(input) {
        let (rest, args) = arguments(rest)?;
        return closing(rest, ')').map(|(rest, _)| (rest, Suffix::Call(args)));
    }
    if let Ok((rest, _)) = char::<_, NomError<&str>>('[').parse(input) {
        let (rest, _) = blank(rest)?;
        let (rest, index) = required(expression, rest)?;
        let (rest, _) = blank(rest)?;
        return closing(rest, ']').map(|(rest, _)| (rest, Suffix::Index(index)));
    }
    Err(nom::Err::Error(NomError::new(input, NomErrorKind::Char)))
}

fn postfix(input: &str) -> Res<'_, Expr> {
    let (mut rest, mut expr) = atom(input)?;
    loop {
        match suffix(rest) {
            Ok((after, s)) => {
                expr = match s {
                    Suffix::Attribute(name) => Expr::Attribute {
                        object: Box::new(expr),
                        name,
                    },
                    Suffix::Call(args) => Expr::Call {
                        callee: Box::new(expr),
                        args,
                    },
                    Suffix::Index(index) => Expr::Index {
                        object: Box::new(expr),
                        index: Box::new(index),
                    },
                };
                rest = after;
            }
            Err(nom::Err::Error(_)) => return Ok((rest, expr)),
            Err(e) => return Err(e),
        }
    }
}

fn closing(input: &str, delimiter: char) -> Res<'_, char> {
    match char::<_, NomError<&str>>(delimiter).parse(input) {
        Ok(ok) => Ok(ok),
        Err(_) => fail(input),
    }
}

/// Runs `parser`, turning a soft failure into a hard one.
fn required<'a, T>(parser: fn(&'a str) -> Res<'a, T>, input: &'a str) -> Res<'a, T> {
    match parser(input) {
        Err(nom::Err::Error(e)) => fail(e.input),
        other => other,
    }
}

fn keyword_argument(input: &str) -> Res<'_, (String, Expr)> {
    let (rest, key) = name(input)?;
    let (rest, _) = blank(rest)?;
    let (rest, _) = char('=').parse(rest)?;
    let (rest, _) = not(char('=')).parse(rest)?;
    let (rest, _) = blank(rest)?;
    let (rest, value) = required(expression, rest)?;
    Ok((rest, (key.to_string(), value)))
}

fn arguments(input: &str) -> Res<'_, Vec<Argument>> {
    let (mut rest, _) = blank(input)?;
    let mut args = Vec::new();
    let mut seen_keyword = false;
    while !rest.starts_with(')') {
        let (after, arg) = match keyword_argument(rest) {
            Ok((after, (key, value))) => {
                seen_keyword = true;
                (after, Argument::Keyword(key, value))
            }
            Err(nom::Err::Error(_)) => {
                if seen_keyword {
                    return fail(rest);
                }
                let (after, value) = required(expression, rest)?;
                (after, Argument::Positional(value))
            }
            Err(e) => return Err(e),
        };
        args.push(arg);
        let (after, _) = blank(after)?;
        match char::<_, NomError<&str>>(',').parse(after) {
            Ok((after, _)) => rest = blank(after)?.0,
            Err(_) => {
                rest = after;
                break;
            }
        }
    }
    Ok((rest, args))
}

// --- Atoms ---

fn atom(input: &str) -> Res<'_, Expr> {
    alt((number, string_literal, list_literal, parenthesized, constant, variable)).parse(input)
}

fn skip_digits(input: &str) -> &str {
    input.trim_start_matches(|c: char| c.is_ascii_digit())
}

fn number(input: &str) -> Res<'_, Expr> {
    let (mut rest, _) = digit1(input)?;
    if let Some(fraction) = rest.strip_prefix('.') {
        rest = skip_digits(fraction);
    }
    if let Some(exponent) = rest.strip_prefix(['e', 'E']) {
        let exponent = exponent.strip_prefix(['+', '-']).unwrap_or(exponent);
        let after = skip_digits(exponent);
        if after.len() < exponent.len() {
            rest = after;
        }
    }
    let text = &input[..input.len() - rest.len()];
    if text.contains(['.', 'e', 'E']) {
        match text.parse::<f64>() {
            Ok(f) => Ok((rest, Expr::Literal(Value::Float(f)))),
            Err(_) => fail(input),
        }
    } else {
        match text.parse::<i64>() {
            Ok(i) => Ok((rest, Expr::Literal(Value::Int(i)))),
            Err(_) => fail(input),
        }
    }
}

fn string_literal(input: &str) -> Res<'_, Expr> {
    let quote = match input.chars().next() {
        Some(q @ ('\'' | '"')) => q,
        _ => return Err(nom::Err::Error(NomError::new(input, NomErrorKind::Char))),
    };
    let body = &input[1..];
    let mut out = String::new();
    let mut chars = body.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            c if c == quote => {
                return Ok((&body[i + 1..], Expr::Literal(Value::Str(out))));
            }
            '\\' => match chars.next() {
                Some((_, 'n')) => out.push('\n'),
                Some((_, 't')) => out.push('\t'),
                Some((_, other)) => out.push(other),
                None => break,
            },
            '\n' => break,
            c => out.push(c),
        }
    }
    fail(input)
}

fn list_literal(input: &str) -> Res<'_, Expr> {
    let (mut rest, _) = char('[').parse(input)?;
    rest = blank(rest)?.0;
    let mut items = Vec::new();
    while !rest.starts_with(']') {
        let (after, item) = required(expression, rest)?;
        items.push(item);
        let (after, _) = blank(after)?;
        match char::<_, NomError<&str>>(',').parse(after) {
            Ok((after, _)) => rest = blank(after)?.0,
            Err(_) => {
                rest = after;
                break;
            }
        }
    }
    let (rest, _) = closing(rest, ']')?;
    Ok((rest, Expr::List(items)))
}

fn parenthesized(input: &str) -> Res<'_, Expr> {
    let (rest, _) = char('(').parse(input)?;
    let (rest, _) = blank(rest)?;
    let (rest, expr) = required(expression, rest)?;
    let (rest, _) = blank(rest)?;
    let (rest, _) = closing(rest, ')')?;
    Ok((rest, expr))
}

fn constant(input: &str) -> Res<'_, Expr> {
    alt((
        value(Expr::Literal(Value::Bool(true)), keyword("True")),
        value(Expr::Literal(Value::Bool(false)), keyword("False")),
        value(Expr::Literal(Value::None), keyword("None")),
    ))
    .parse(input)
}

fn variable(input: &str) -> Res<'_, Expr> {
    let (rest, ident) = name(input)?;
    Ok((rest, Expr::Name(ident.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn expr(source: &str) -> Expr {
        match parse_program(source).unwrap().statements.remove(0) {
            Statement::Expr(e) => e,
            other => panic!("expected expression, got {:?}", other),
        }
    }

    fn int(i: i64) -> Box<Expr> {
        Box::new(Expr::Literal(Value::Int(i)))
    }

    #[test]
    fn precedence_binds_multiplication_tighter() {
        assert_eq!(
            expr("1 + 2 * 3"),
            Expr::Binary {
                op: BinaryOp::Add,
                left: int(1),
                right: Box::new(Expr::Binary {
                    op: BinaryOp::Mul,
                    left: int(2),
                    right: int(3),
                }),
            }
        );
    }

    #[test]
    fn statements_split_on_newlines_semicolons_and_comments() {
        let program = parse_program("a = 1; b = 2\n# note\n\nc = a + b  # trailing\n").unwrap();
        assert_eq!(program.statements.len(), 3);
    }

    #[test]
    fn calls_with_keywords_span_lines() {
        let program = parse_program("page.add_element(Rect(\n    x=10, y=20,\n    w=100,\n))").unwrap();
        let Statement::Expr(Expr::Call { callee, args }) = &program.statements[0] else {
            panic!("expected call");
        };
        assert!(matches!(callee.as_ref(), Expr::Attribute { name, .. } if name == "add_element"));
        let Argument::Positional(Expr::Call { args: inner, .. }) = &args[0] else {
            panic!("expected nested call");
        };
        assert_eq!(inner.len(), 3);
        assert!(matches!(&inner[0], Argument::Keyword(k, _) if k == "x"));
    }

    #[test]
    fn attribute_assignment_and_augmented_assignment() {
        let program = parse_program("e.x = 5\nn += 1").unwrap();
        assert!(matches!(
            &program.statements[0],
            Statement::Assign { target: Target::Attribute { name, .. }, .. } if name == "x"
        ));
        assert!(matches!(
            &program.statements[1],
            Statement::Assign { target: Target::Name(n), value: Expr::Binary { op: BinaryOp::Add, .. } } if n == "n"
        ));
    }

    #[test]
    fn literals() {
        assert_eq!(expr("'it\\'s'"), Expr::Literal(Value::Str("it's".into())));
        assert_eq!(expr("\"x\""), Expr::Literal(Value::Str("x".into())));
        assert_eq!(expr("2.5"), Expr::Literal(Value::Float(2.5)));
        assert_eq!(expr("1e3"), Expr::Literal(Value::Float(1000.0)));
        assert_eq!(expr("None"), Expr::Literal(Value::None));
        assert_eq!(expr("[1, 2,]"), Expr::List(vec![*int(1), *int(2)]));
        assert_eq!(expr("Nonesuch"), Expr::Name("Nonesuch".into()));
    }

    #[test]
    fn comparison_is_not_assignment() {
        assert!(matches!(expr("a == 1"), Expr::Binary { op: BinaryOp::Eq, .. }));
    }

    #[test]
    fn syntax_errors_report_the_line() {
        let err = parse_program("a = 1\nb = (2 +\nc = 3").unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedSource);

        let err = parse_program("a = 1\nb = 2 2").unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedSource);
        assert!(err.message.contains("line 2"), "{}", err.message);

        for bad in ["x = ", "f(a=1, 2)", "1 = x", "import os", "'open", "del 3"] {
            assert_eq!(
                parse_program(bad).unwrap_err().kind,
                ErrorKind::MalformedSource,
                "{}",
                bad
            );
        }
    }

    #[test]
    fn empty_source_is_an_empty_program() {
        assert!(parse_program("").unwrap().statements.is_empty());
        assert!(parse_program("  \n# only a comment\n").unwrap().statements.is_empty());
    }
}
