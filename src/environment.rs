use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::EvalError;
use crate::ast::Value;

#[derive(Debug, Default)]
struct Scope {
    bindings: RefCell<HashMap<String, Value>>,
    parent: Option<Environment>,
}

/// A chain of scopes mapping symbol names to values.
///
/// `Environment` is a cheap handle: cloning it shares the same scope. The
/// root scope lives as long as any handle to it; a child scope created by
/// [`Environment::push_scope`] is dropped when the call that created it
/// lets go of its handle.
#[derive(Debug, Clone, Default)]
pub struct Environment(Rc<Scope>);

impl Environment {
    /// Create an empty root scope
    pub fn new_global() -> Self {
        Environment::default()
    }

    /// Whether this is a root scope
    pub fn is_global(&self) -> bool {
        self.0.parent.is_none()
    }

    /// Look `name` up in this scope, then in each ancestor toward the root
    pub fn get(&self, name: &str) -> Result<Value, EvalError> {
        let mut scope = self;
        loop {
            if let Some(value) = scope.0.bindings.borrow().get(name) {
                return Ok(value.clone());
            }
            match &scope.0.parent {
                Some(parent) => scope = parent,
                None => return Err(EvalError::UnboundSymbol(name.to_owned())),
            }
        }
    }

    /// Bind `name` in the root scope, replacing any existing binding there.
    /// Returns the assigned value.
    pub fn set_global(&self, name: impl Into<String>, value: Value) -> Value {
        let mut root = self;
        while let Some(parent) = &root.0.parent {
            root = parent;
        }
        root.0.bindings.borrow_mut().insert(name.into(), value.clone());
        value
    }

    /// Create a child scope holding `bindings` whose parent is this scope.
    /// This scope is left untouched.
    pub fn push_scope(&self, bindings: HashMap<String, Value>) -> Environment {
        Environment(Rc::new(Scope {
            bindings: RefCell::new(bindings),
            parent: Some(self.clone()),
        }))
    }

    /// Get all bindings visible from this scope.
    /// Returns (name, value) pairs sorted by name; inner bindings shadow outer ones.
    pub fn bindings(&self) -> Vec<(String, Value)> {
        let mut visible = HashMap::new();

        let mut scope = Some(self);
        while let Some(current) = scope {
            for (name, value) in current.0.bindings.borrow().iter() {
                visible
                    .entry(name.clone())
                    .or_insert_with(|| value.clone());
            }
            scope = current.0.parent.as_ref();
        }

        let mut result: Vec<_> = visible.into_iter().collect();
        result.sort_by(|a, b| a.0.cmp(&b.0));
        result
    }
}
