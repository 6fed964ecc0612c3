//! Lisg - a minimal interactive interpreter for a small Lisp dialect
//!
//! Each input line flows through a three-stage pipeline:
//!
//! ```text
//! text --lex--> tokens --parse--> Value tree --evaluate(global, local)--> Value
//! ```
//!
//! The language is deliberately tiny:
//!
//! ```lisp
//! (+ 1 2 3)                                  ; arithmetic over 64-bit floats
//! (defvar x 5)                               ; global definition
//! (defvar sq (lambda (n) (* (eval n) (eval n))))
//! (funcall sq (+ 1 2))                       ; => 9
//! ```
//!
//! ## Argument passing
//!
//! Function parameters are bound to the *unevaluated* argument expressions,
//! and a function body sees the caller's scope rather than the scope the
//! lambda was written in. `eval` forces a bound expression. Conventional
//! eager application is available through [`evaluator::ArgumentPassing`].
//!
//! ## Modules
//!
//! - `lexer`: source text to token strings
//! - `ast`: the [`ast::Value`] sum type and its rendering
//! - `parser`: token strings to a value tree
//! - `environment`: the scope chain used during evaluation
//! - `evaluator`: special-form dispatch and function application
//! - `builtinops`: the registry of special forms and arithmetic builtins

use thiserror::Error;

use crate::ast::Value;
use crate::environment::Environment;
use crate::evaluator::EvalConfig;

/// Maximum nesting depth accepted by the parser
pub const MAX_PARSE_DEPTH: usize = 128;

/// Default maximum evaluation depth.
/// Exceeding it fails with [`EvalError::StackExhausted`] instead of overflowing the native stack.
pub const MAX_EVAL_DEPTH: usize = 256;

/// Failure to turn a token sequence into a value tree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("no tokens to parse")]
    EmptyInput,
    #[error("malformed number literal: {0}")]
    MalformedNumber(String),
    #[error("malformed string literal: {0}")]
    MalformedString(String),
    #[error("invalid symbol: {0:?}")]
    InvalidSymbol(String),
    #[error("unexpected ')'")]
    UnexpectedCloseParen,
    #[error("list is missing its closing ')'")]
    UnclosedList,
    #[error("expression too deeply nested (max depth: {max_depth})")]
    TooDeeplyNested { max_depth: usize },
}

/// Failure while evaluating a value tree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("symbol has no value: {0}")]
    UnboundSymbol(String),
    #[error("list headed by uncallable {0}")]
    UncallableHead(Value),
    #[error("calling uncallable: {0}")]
    UncallableValue(Value),
    #[error("arg count mismatch: expected {expected}, got {got}")]
    ArityMismatch { expected: usize, got: usize },
    #[error("{operator} requires numbers, found {found}")]
    TypeMismatch { operator: String, found: Value },
    #[error("malformed {form}: {reason}")]
    MalformedSpecialForm { form: &'static str, reason: String },
    #[error("evaluation depth limit exceeded (max: {max_depth})")]
    StackExhausted { max_depth: usize },
}

impl EvalError {
    pub(crate) fn malformed(form: &'static str, reason: impl Into<String>) -> Self {
        EvalError::MalformedSpecialForm {
            form,
            reason: reason.into(),
        }
    }
}

/// Error type for a whole line of input
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("ParseError: {0}")]
    Parse(#[from] ParseError),
    #[error("EvaluationError: {0}")]
    Eval(#[from] EvalError),
}

/// Lex, parse and evaluate every expression on `line` against `global`.
///
/// Each top-level expression is evaluated with `global` as both the global
/// and the local scope. Returns the value of the last expression, or nil
/// when the line holds no complete expression.
pub fn run(global: &Environment, line: &str) -> Result<Value, Error> {
    run_with_config(global, line, &EvalConfig::default())
}

/// [`run`] with an explicit evaluation configuration
pub fn run_with_config(
    global: &Environment,
    line: &str,
    config: &EvalConfig,
) -> Result<Value, Error> {
    let tokens = lexer::lex(line);
    let mut result = ast::nil();
    for expr in parser::parse_all(&tokens)? {
        result = evaluator::evaluate_with_config(global, global, &expr, config)?;
    }
    Ok(result)
}

pub mod ast;
pub mod builtinops;
pub mod environment;
pub mod evaluator;
pub mod lexer;
pub mod parser;
