// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Variable scopes.

use crate::builtins;
use crate::error::EvalError;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

struct Scope {
    vars: HashMap<String, Value>,
    parent: Option<Environment>,
}

/// A chain of variable scopes.
///
/// Lookup walks from the current scope to the root; assignment always
/// writes into the current scope. Cloning an `Environment` yields another
/// handle on the same scope, which is how loop bodies observe and mutate
/// the enclosing environment. The chain is acyclic (children never outlive
/// the root), so plain reference counting is enough.
#[derive(Clone)]
pub struct Environment {
    scope: Rc<RefCell<Scope>>,
}

impl Environment {
    /// A fresh root scope pre-populated with the built-in functions.
    pub fn global() -> Self {
        let mut vars = HashMap::new();
        for builtin in builtins::BUILTINS {
            vars.insert(builtin.name.to_string(), Value::Function(builtin));
        }
        Environment {
            scope: Rc::new(RefCell::new(Scope { vars, parent: None })),
        }
    }

    /// A child scope whose lookups fall through to `self`.
    pub fn child(&self) -> Self {
        Environment {
            scope: Rc::new(RefCell::new(Scope {
                vars: HashMap::new(),
                parent: Some(self.clone()),
            })),
        }
    }

    /// Look up a variable, walking the scope chain to the root.
    pub fn value(&self, key: &str) -> Result<Value, EvalError> {
        let scope = self.scope.borrow();
        if let Some(value) = scope.vars.get(key) {
            return Ok(value.clone());
        }
        match &scope.parent {
            Some(parent) => parent.value(key),
            None => Err(EvalError(format!("unknown variable {}", key))),
        }
    }

    /// Bind a variable in the current scope.
    ///
    /// There is no assign-in-ancestor behavior: shadowing a parent binding
    /// is always possible, updating one is not.
    pub fn assign(&self, key: &str, value: Value) {
        self.scope.borrow_mut().vars.insert(key.to_string(), value);
    }

    /// The enclosing scope, if any.
    pub fn parent(&self) -> Option<Environment> {
        self.scope.borrow().parent.clone()
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scope = self.scope.borrow();
        f.debug_struct("Environment")
            .field("vars", &scope.vars.len())
            .field("has_parent", &scope.parent.is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
