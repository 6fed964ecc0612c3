//! This module defines [`Value`], the single tree type shared by the parser and
//! the evaluator. Programs and the data they compute are both `Value`s: a
//! parsed list is evaluated as a call, and a list bound to a parameter is just
//! data until something forces it. Helper functions such as [`val`], [`sym`]
//! and [`nil`] keep tree construction short in code and tests, and the
//! `Display` impl renders every variant in a form the lexer reads back.

/// Type alias for number values in the interpreter
pub type NumberType = f64;

/// Core value type of the interpreter
///
/// The empty list is the language's nil and evaluates to itself.
///
/// To build a tree, use the helper functions:
/// - `val(42)` for numbers, `str_val("hi")` for strings, `sym("name")` for symbols
/// - `nil()` for the empty list
/// - `val(vec![sym("+"), val(1), val(2)])` for lists
#[derive(Clone, PartialEq)]
pub enum Value {
    /// Identifiers
    Symbol(String),
    /// String literals, stored without delimiters and unescaped
    Str(String),
    Number(NumberType),
    /// S-expressions
    List(Vec<Value>),
    /// User-defined function created by `lambda`. Holds no environment.
    Function { params: Vec<String>, body: Vec<Value> },
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Symbol(s) => write!(f, "Symbol({s})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::Number(n) => write!(f, "Number({n})"),
            Value::List(list) => {
                write!(f, "List(")?;
                for (i, v) in list.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v:?}")?;
                }
                write!(f, ")")
            }
            Value::Function { params, body } => {
                write!(f, "Function(params={params:?}, body={body:?})")
            }
        }
    }
}

impl From<NumberType> for Value {
    fn from(n: NumberType) -> Self {
        Value::Number(n)
    }
}

// Integer literals in Rust code default to i32, which converts losslessly
impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(NumberType::from(n))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(arr: [T; N]) -> Self {
        Value::List(arr.into_iter().map(Into::into).collect())
    }
}

/// Characters the lexer never leaves inside a symbol token
const SYMBOL_FORBIDDEN_CHARS: &str = "\"() \r\n";

/// Check if a token can stand as a symbol name:
/// non-empty, no quotes, no parens, no separators
pub(crate) fn is_valid_symbol(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(|c| SYMBOL_FORBIDDEN_CHARS.contains(c))
}

/// Helper function for creating symbols
pub fn sym<S: AsRef<str>>(name: S) -> Value {
    Value::Symbol(name.as_ref().to_owned())
}

/// Helper function for creating string values
pub fn str_val<S: AsRef<str>>(text: S) -> Value {
    Value::Str(text.as_ref().to_owned())
}

/// Helper function for creating Values from anything convertible
pub fn val<T: Into<Value>>(value: T) -> Value {
    value.into()
}

/// The empty list, which is the language's nil
pub fn nil() -> Value {
    Value::List(vec![])
}

fn write_list(f: &mut std::fmt::Formatter<'_>, elements: &[Value]) -> std::fmt::Result {
    write!(f, "(")?;
    for (i, elem) in elements.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{elem}")?;
    }
    write!(f, ")")
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Symbol(s) => write!(f, "{s}"),
            Value::Str(s) => {
                write!(f, "\"")?;
                for ch in s.chars() {
                    match ch {
                        '"' => write!(f, "\\\"")?,
                        '\\' => write!(f, "\\\\")?,
                        c => write!(f, "{c}")?,
                    }
                }
                write!(f, "\"")
            }
            Value::Number(n) => write!(f, "{n}"),
            Value::List(elements) => write_list(f, elements),
            // Rendered as the lambda form that builds an equivalent function
            Value::Function { params, body } => {
                write!(f, "(lambda (")?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{param}")?;
                }
                write!(f, ")")?;
                for expr in body {
                    write!(f, " {expr}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl Value {
    /// Check if a value is nil (empty list)
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::List(list) if list.is_empty())
    }

    /// Short name of the variant, used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Symbol(_) => "symbol",
            Value::Str(_) => "string",
            Value::Number(_) => "number",
            Value::List(list) if list.is_empty() => "nil",
            Value::List(_) => "list",
            Value::Function { .. } => "function",
        }
    }
}
