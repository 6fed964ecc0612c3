use nom::{
    IResult, Parser, character::complete::digit1, combinator::all_consuming,
    number::complete::double,
};

use crate::MAX_PARSE_DEPTH;
use crate::ParseError;
use crate::ast::{NumberType, Value, is_valid_symbol};

fn parse_float(text: &str) -> IResult<&str, NumberType> {
    all_consuming(double).parse(text)
}

/// Parse a whole token as a decimal floating-point number, including the
/// non-finite forms `inf`, `infinity` and `nan` with an optional sign
fn parse_number(token: &str) -> Option<NumberType> {
    if let Ok((_, n)) = parse_float(token) {
        return Some(n);
    }

    // `double` only reads the non-finite forms unsigned
    let (sign, unsigned) = match token.as_bytes().first() {
        Some(b'-') => (-1.0, &token[1..]),
        Some(b'+') => (1.0, &token[1..]),
        _ => return None,
    };
    match parse_float(unsigned) {
        Ok((_, n)) if !n.is_finite() => Some(sign * n),
        _ => None,
    }
}

/// A token that starts like a number but isn't one, e.g. `12abc` or `1.2.3`.
/// Symbols such as `-`, `+` or `-x` never look numeric.
fn looks_numeric(token: &str) -> bool {
    let unsigned = token.strip_prefix(&['-', '+'][..]).unwrap_or(token);
    let unsigned = unsigned.strip_prefix('.').unwrap_or(unsigned);
    digit1::<&str, nom::error::Error<&str>>(unsigned).is_ok()
}

/// Strip the delimiting quotes from a string token and resolve `\"` and `\\`.
/// Any other backslash is kept literally.
fn parse_string(token: &str) -> Result<Value, ParseError> {
    let malformed = || ParseError::MalformedString(token.to_owned());
    let inner = token
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or_else(malformed)?;

    let mut text = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some(escaped @ ('"' | '\\')) => text.push(escaped),
                Some(other) => {
                    text.push('\\');
                    text.push(other);
                }
                // The closing quote itself was escaped
                None => return Err(malformed()),
            },
            // Bare quote in the middle of the token
            '"' => return Err(malformed()),
            c => text.push(c),
        }
    }
    Ok(Value::Str(text))
}

/// Parse the expression at the start of `tokens`, returning it together with
/// the number of tokens it spans.
fn parse_expr<S: AsRef<str>>(tokens: &[S], depth: usize) -> Result<(Value, usize), ParseError> {
    let head = tokens.first().ok_or(ParseError::EmptyInput)?.as_ref();

    if depth >= MAX_PARSE_DEPTH {
        return Err(ParseError::TooDeeplyNested {
            max_depth: MAX_PARSE_DEPTH,
        });
    }

    if head.starts_with('"') {
        return Ok((parse_string(head)?, 1));
    }

    if let Some(n) = parse_number(head) {
        return Ok((Value::Number(n), 1));
    }

    match head {
        "(" => parse_list(tokens, depth),
        ")" => Err(ParseError::UnexpectedCloseParen),
        _ if looks_numeric(head) => Err(ParseError::MalformedNumber(head.to_owned())),
        // A quote inside an atom, e.g. `ab"c`, is a broken string literal
        _ if head.contains('"') => Err(ParseError::MalformedString(head.to_owned())),
        _ if !is_valid_symbol(head) => Err(ParseError::InvalidSymbol(head.to_owned())),
        _ => Ok((Value::Symbol(head.to_owned()), 1)),
    }
}

/// `tokens[0]` is the opening paren. Children are parsed in order and the first
/// failing child aborts the whole list.
fn parse_list<S: AsRef<str>>(tokens: &[S], depth: usize) -> Result<(Value, usize), ParseError> {
    let mut children = Vec::new();
    let mut pos = 1;

    loop {
        match tokens.get(pos).map(AsRef::as_ref) {
            None => return Err(ParseError::UnclosedList),
            Some(")") => return Ok((Value::List(children), pos + 1)),
            Some(_) => {
                let (child, consumed) = parse_expr(&tokens[pos..], depth + 1)?;
                children.push(child);
                pos += consumed;
            }
        }
    }
}

/// Parse the first complete expression in `tokens`.
///
/// Tokens after that expression are ignored. Fails with
/// [`ParseError::EmptyInput`] when there are no tokens.
pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Result<Value, ParseError> {
    parse_expr(tokens, 0).map(|(value, _)| value)
}

/// Parse every top-level expression in `tokens`, in order.
///
/// An empty token sequence yields no expressions rather than an error.
pub fn parse_all<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<Value>, ParseError> {
    let mut exprs = Vec::new();
    let mut pos = 0;
    while pos < tokens.len() {
        let (expr, consumed) = parse_expr(&tokens[pos..], 0)?;
        exprs.push(expr);
        pos += consumed;
    }
    Ok(exprs)
}
