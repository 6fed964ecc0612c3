//! Registry of the special forms and builtin operations.
//!
//! A list whose head symbol names an entry here is dispatched to that entry
//! instead of being applied as a user function, so builtins cannot be
//! shadowed by `defvar`. Every handler receives its arguments unevaluated:
//!
//! - **Special forms** decide for themselves what to evaluate
//!   (`eval`, `defvar`, `lambda`, `funcall`)
//! - **Arithmetic** operations have the evaluator evaluate every argument in
//!   order, require each result to be a number, and fold the numbers
//!
//! ## Arithmetic folds
//!
//! `+` folds left from 0 and `*` folds left from 1. `-` and `/` start from
//! their first argument and fold the rest; with no arguments both return 0.
//! A single argument is returned unchanged, so `(- 5)` is 5, not -5.
//! Division follows IEEE-754: dividing by zero gives an infinity or NaN.

use crate::EvalError;
use crate::ast::{NumberType, Value};
use crate::environment::Environment;
use crate::evaluator::{Evaluator, eval_defvar, eval_eval, eval_funcall, eval_lambda};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Handler for a special form: the evaluator, the caller's local scope, the
/// unevaluated arguments and the current evaluation depth.
pub type SpecialFormFn =
    fn(&Evaluator<'_>, &Environment, &[Value], usize) -> Result<Value, EvalError>;

/// Fold over already evaluated numeric arguments
pub type ArithmeticFn = fn(&[NumberType]) -> NumberType;

/// Represents the implementation of a builtin
#[derive(Clone, Copy)]
pub enum OpKind {
    SpecialForm(SpecialFormFn),
    Arithmetic(ArithmeticFn),
}

impl std::fmt::Debug for OpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OpKind::SpecialForm(_) => write!(f, "SpecialForm(<fn>)"),
            OpKind::Arithmetic(_) => write!(f, "Arithmetic(<fn>)"),
        }
    }
}

/// Accepted argument counts for a builtin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
    Any,
}

impl Arity {
    /// Check `got` arguments against this arity for the builtin `form`
    pub fn validate(&self, form: &'static str, got: usize) -> Result<(), EvalError> {
        match *self {
            Arity::Exact(n) if got != n => Err(EvalError::malformed(
                form,
                format!("expected {n} arguments, got {got}"),
            )),
            Arity::AtLeast(n) if got < n => Err(EvalError::malformed(
                form,
                format!("expected at least {n} arguments, got {got}"),
            )),
            _ => Ok(()),
        }
    }
}

/// Definition of a builtin operation
#[derive(Debug, Clone)]
pub struct BuiltinOp {
    /// The head symbol that selects this operation
    pub name: &'static str,
    pub op_kind: OpKind,
    pub arity: Arity,
}

impl BuiltinOp {
    pub fn is_special_form(&self) -> bool {
        matches!(self.op_kind, OpKind::SpecialForm(_))
    }
}

//
// Arithmetic implementations
//

fn builtin_add(nums: &[NumberType]) -> NumberType {
    nums.iter().fold(0.0, |acc, n| acc + n)
}

fn builtin_mul(nums: &[NumberType]) -> NumberType {
    nums.iter().fold(1.0, |acc, n| acc * n)
}

// Left fold seeded with the first argument; 0 when there are no arguments
macro_rules! seeded_fold {
    ($name:ident, $op:tt) => {
        fn $name(nums: &[NumberType]) -> NumberType {
            match nums {
                [] => 0.0,
                [first, rest @ ..] => rest.iter().fold(*first, |acc, n| acc $op n),
            }
        }
    };
}

seeded_fold!(builtin_sub, -);
seeded_fold!(builtin_div, /);

static BUILTIN_OPS: [BuiltinOp; 8] = [
    // Special forms
    BuiltinOp {
        name: "eval",
        op_kind: OpKind::SpecialForm(eval_eval),
        arity: Arity::Exact(1),
    },
    BuiltinOp {
        name: "defvar",
        op_kind: OpKind::SpecialForm(eval_defvar),
        arity: Arity::Exact(2),
    },
    BuiltinOp {
        name: "lambda",
        op_kind: OpKind::SpecialForm(eval_lambda),
        arity: Arity::AtLeast(2),
    },
    BuiltinOp {
        name: "funcall",
        op_kind: OpKind::SpecialForm(eval_funcall),
        arity: Arity::AtLeast(1),
    },
    // Arithmetic
    BuiltinOp {
        name: "+",
        op_kind: OpKind::Arithmetic(builtin_add),
        arity: Arity::Any,
    },
    BuiltinOp {
        name: "*",
        op_kind: OpKind::Arithmetic(builtin_mul),
        arity: Arity::Any,
    },
    BuiltinOp {
        name: "-",
        op_kind: OpKind::Arithmetic(builtin_sub),
        arity: Arity::Any,
    },
    BuiltinOp {
        name: "/",
        op_kind: OpKind::Arithmetic(builtin_div),
        arity: Arity::Any,
    },
];

static BUILTIN_BY_NAME: LazyLock<HashMap<&'static str, &'static BuiltinOp>> =
    LazyLock::new(|| BUILTIN_OPS.iter().map(|op| (op.name, op)).collect());

/// Get all builtin operations
pub fn builtin_ops() -> &'static [BuiltinOp] {
    &BUILTIN_OPS
}

/// Find a builtin operation by its head symbol
pub fn find_builtin_op(name: &str) -> Option<&'static BuiltinOp> {
    BUILTIN_BY_NAME.get(name).copied()
}

#[cfg(test)]
#[expect(clippy::unwrap_used)] // test code OK
mod tests {
    use super::*;

    fn fold_with(name: &str, nums: &[NumberType]) -> NumberType {
        match find_builtin_op(name).unwrap().op_kind {
            OpKind::Arithmetic(fold) => fold(nums),
            OpKind::SpecialForm(_) => panic!("expected arithmetic builtin: {name}"),
        }
    }

    #[test]
    fn test_builtin_ops_registry() {
        for name in ["eval", "defvar", "lambda", "funcall"] {
            assert!(find_builtin_op(name).unwrap().is_special_form(), "{name}");
        }
        for name in ["+", "*", "-", "/"] {
            let op = find_builtin_op(name).unwrap();
            assert!(!op.is_special_form(), "{name}");
            assert_eq!(op.arity, Arity::Any);
        }

        assert_eq!(find_builtin_op("defvar").unwrap().arity, Arity::Exact(2));
        assert_eq!(find_builtin_op("lambda").unwrap().arity, Arity::AtLeast(2));
        assert!(find_builtin_op("defun").is_none());
        assert!(find_builtin_op("apply").is_none());
        assert_eq!(builtin_ops().len(), 8);
    }

    #[test]
    fn test_arithmetic_folds() {
        let test_cases: Vec<(&str, Vec<NumberType>, NumberType)> = vec![
            ("+", vec![], 0.0),
            ("+", vec![1.0, 2.0, 3.0], 6.0),
            ("+", vec![-5.0, 10.0], 5.0),
            ("*", vec![], 1.0),
            ("*", vec![2.0, 3.0, 4.0], 24.0),
            ("*", vec![7.0], 7.0),
            ("-", vec![], 0.0),
            ("-", vec![5.0], 5.0),
            ("-", vec![10.0, 3.0, 2.0], 5.0),
            ("/", vec![], 0.0),
            ("/", vec![9.0], 9.0),
            ("/", vec![100.0, 5.0, 2.0], 10.0),
            ("/", vec![1.0, 4.0], 0.25),
        ];

        for (name, args, expected) in test_cases {
            assert_eq!(fold_with(name, &args), expected, "({name} {args:?})");
        }
    }

    #[test]
    fn test_division_by_zero_is_ieee() {
        assert_eq!(fold_with("/", &[1.0, 0.0]), NumberType::INFINITY);
        assert!(fold_with("/", &[0.0, 0.0]).is_nan());
    }

    #[test]
    fn test_arity_validation() {
        assert!(Arity::Exact(2).validate("defvar", 2).is_ok());
        assert!(Arity::AtLeast(2).validate("lambda", 5).is_ok());
        assert!(Arity::Any.validate("+", 0).is_ok());
        assert_eq!(
            Arity::Exact(2).validate("defvar", 1),
            Err(EvalError::MalformedSpecialForm {
                form: "defvar",
                reason: "expected 2 arguments, got 1".to_owned(),
            })
        );
        assert!(matches!(
            Arity::AtLeast(1).validate("funcall", 0),
            Err(EvalError::MalformedSpecialForm { form: "funcall", .. })
        ));
    }
}
