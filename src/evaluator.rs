use std::collections::HashMap;

use tracing::{debug, trace};

use crate::EvalError;
use crate::MAX_EVAL_DEPTH;
use crate::ast::{NumberType, Value, nil};
use crate::builtinops::{OpKind, find_builtin_op};
use crate::environment::Environment;

/// How `funcall` binds parameters to call-site arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArgumentPassing {
    /// Bind each parameter to the argument expression as written; `eval` forces it
    #[default]
    Unevaluated,
    /// Evaluate each argument in the caller's scope before binding
    Evaluated,
}

/// Runtime evaluation settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalConfig {
    /// Nesting depth at which evaluation fails with [`EvalError::StackExhausted`]
    pub max_depth: usize,
    pub argument_passing: ArgumentPassing,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            max_depth: MAX_EVAL_DEPTH,
            argument_passing: ArgumentPassing::default(),
        }
    }
}

/// State shared by every step of one top-level evaluation
pub struct Evaluator<'a> {
    global: &'a Environment,
    config: &'a EvalConfig,
}

impl<'a> Evaluator<'a> {
    pub fn new(global: &'a Environment, config: &'a EvalConfig) -> Self {
        Evaluator { global, config }
    }

    /// Evaluate `expr` against `local`, tracking nesting depth
    pub fn eval(
        &self,
        local: &Environment,
        expr: &Value,
        depth: usize,
    ) -> Result<Value, EvalError> {
        if depth >= self.config.max_depth {
            return Err(EvalError::StackExhausted {
                max_depth: self.config.max_depth,
            });
        }
        trace!(depth, %expr, "eval");

        match expr {
            Value::Symbol(name) => local.get(name),

            // Self-evaluating forms, including nil
            Value::Str(_) | Value::Number(_) | Value::Function { .. } => Ok(expr.clone()),
            Value::List(_) if expr.is_nil() => Ok(expr.clone()),

            Value::List(elements) => match elements.as_slice() {
                [Value::Symbol(name), args @ ..] => match find_builtin_op(name) {
                    Some(op) => {
                        op.arity.validate(op.name, args.len())?;
                        match op.op_kind {
                            OpKind::SpecialForm(special_form) => {
                                special_form(self, local, args, depth)
                            }
                            OpKind::Arithmetic(fold) => {
                                let nums = self.eval_numbers(op.name, local, args, depth)?;
                                Ok(Value::Number(fold(&nums)))
                            }
                        }
                    }
                    None => {
                        let func = self.eval(local, &elements[0], depth + 1)?;
                        self.apply_function(local, &func, args, depth)
                    }
                },
                [head, ..] => Err(EvalError::UncallableHead(head.clone())),
                [] => Ok(nil()),
            },
        }
    }

    /// Evaluate arithmetic arguments in order, requiring each to be a number
    fn eval_numbers(
        &self,
        operator: &str,
        local: &Environment,
        args: &[Value],
        depth: usize,
    ) -> Result<Vec<NumberType>, EvalError> {
        let mut nums = Vec::with_capacity(args.len());
        for arg in args {
            match self.eval(local, arg, depth + 1)? {
                Value::Number(n) => nums.push(n),
                other => {
                    return Err(EvalError::TypeMismatch {
                        operator: operator.to_owned(),
                        found: other,
                    });
                }
            }
        }
        Ok(nums)
    }

    /// Call `func` with `arg_exprs`, binding parameters in a fresh child of `local`.
    /// Returns the value of the last body expression, or nil for an empty body.
    fn apply_function(
        &self,
        local: &Environment,
        func: &Value,
        arg_exprs: &[Value],
        depth: usize,
    ) -> Result<Value, EvalError> {
        let Value::Function { params, body } = func else {
            return Err(EvalError::UncallableValue(func.clone()));
        };

        if params.len() != arg_exprs.len() {
            return Err(EvalError::ArityMismatch {
                expected: params.len(),
                got: arg_exprs.len(),
            });
        }

        let mut bindings = HashMap::with_capacity(params.len());
        for (param, arg) in params.iter().zip(arg_exprs) {
            let bound = match self.config.argument_passing {
                ArgumentPassing::Unevaluated => arg.clone(),
                ArgumentPassing::Evaluated => self.eval(local, arg, depth + 1)?,
            };
            bindings.insert(param.clone(), bound);
        }
        debug!(depth, params = ?params, "applying function");

        let scope = local.push_scope(bindings);
        let mut result = nil();
        for expr in body {
            result = self.eval(&scope, expr, depth + 1)?;
        }
        Ok(result)
    }
}

/// Evaluate an expression with the default configuration (public API)
pub fn evaluate(
    global: &Environment,
    local: &Environment,
    expr: &Value,
) -> Result<Value, EvalError> {
    evaluate_with_config(global, local, expr, &EvalConfig::default())
}

/// Evaluate an expression. `defvar` writes into `global`; everything else
/// resolves through `local`.
#[tracing::instrument(level = "debug", skip_all)]
pub fn evaluate_with_config(
    global: &Environment,
    local: &Environment,
    expr: &Value,
    config: &EvalConfig,
) -> Result<Value, EvalError> {
    Evaluator::new(global, config).eval(local, expr, 0)
}

/// `(eval x)`: evaluate `x`, then evaluate the result once more
pub(crate) fn eval_eval(
    ev: &Evaluator<'_>,
    local: &Environment,
    args: &[Value],
    depth: usize,
) -> Result<Value, EvalError> {
    match args {
        [expr] => {
            let value = ev.eval(local, expr, depth + 1)?;
            ev.eval(local, &value, depth + 1)
        }
        _ => Err(EvalError::malformed("eval", "expected exactly one argument")),
    }
}

/// `(defvar name expr)`: bind the value of `expr` to `name` in the global scope
pub(crate) fn eval_defvar(
    ev: &Evaluator<'_>,
    local: &Environment,
    args: &[Value],
    depth: usize,
) -> Result<Value, EvalError> {
    match args {
        [Value::Symbol(name), expr] => {
            let value = ev.eval(local, expr, depth + 1)?;
            debug!(%name, %value, "defvar");
            Ok(ev.global.set_global(name.as_str(), value))
        }
        [other, _] => Err(EvalError::malformed(
            "defvar",
            format!("cannot define non-symbol {other}"),
        )),
        _ => Err(EvalError::malformed("defvar", "expected a symbol and a value")),
    }
}

/// `(lambda (params...) body...)`: build a function from the parameter names
/// and body expressions, both taken verbatim
pub(crate) fn eval_lambda(
    _ev: &Evaluator<'_>,
    _local: &Environment,
    args: &[Value],
    _depth: usize,
) -> Result<Value, EvalError> {
    let [param_list, body @ ..] = args else {
        return Err(EvalError::malformed("lambda", "missing parameter list"));
    };
    if body.is_empty() {
        return Err(EvalError::malformed("lambda", "missing body"));
    }
    let Value::List(param_list) = param_list else {
        return Err(EvalError::malformed(
            "lambda",
            format!("parameter list must be a list, found {param_list}"),
        ));
    };

    let mut params = Vec::with_capacity(param_list.len());
    for param in param_list {
        match param {
            Value::Symbol(name) if params.contains(name) => {
                return Err(EvalError::malformed(
                    "lambda",
                    format!("duplicate parameter name: {name}"),
                ));
            }
            Value::Symbol(name) => params.push(name.clone()),
            other => {
                return Err(EvalError::malformed(
                    "lambda",
                    format!("parameters must be symbols, found {}", other.type_name()),
                ));
            }
        }
    }

    Ok(Value::Function {
        params,
        body: body.to_vec(),
    })
}

/// `(funcall f args...)`: evaluate `f` and apply it to `args`
pub(crate) fn eval_funcall(
    ev: &Evaluator<'_>,
    local: &Environment,
    args: &[Value],
    depth: usize,
) -> Result<Value, EvalError> {
    let [func_expr, arg_exprs @ ..] = args else {
        return Err(EvalError::malformed("funcall", "missing function"));
    };
    let func = ev.eval(local, func_expr, depth + 1)?;
    ev.apply_function(local, &func, arg_exprs, depth + 1)
}
