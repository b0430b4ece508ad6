// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime values.

use crate::builtins::Builtin;
use crate::error::EvalError;
use std::collections::BTreeMap;
use std::fmt;

/// A flowscript runtime value.
///
/// Values are immutable once constructed; variables rebind rather than
/// mutate. `Display` renders the debug form used by the REPL; embedding a
/// value into a shell line goes through [`Value::as_string`] instead.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Str(String),
    Array(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Function(&'static Builtin),
}

impl Value {
    /// Convert to the string form used for substitution.
    ///
    /// Arrays join their elements with single spaces; maps render as
    /// space-separated `key=value` pairs. Functions have no string form.
    pub fn as_string(&self) -> Result<String, EvalError> {
        match self {
            Value::Int(v) => Ok(v.to_string()),
            Value::Str(s) => Ok(s.clone()),
            Value::Array(items) => {
                let parts: Result<Vec<String>, EvalError> =
                    items.iter().map(Value::as_string).collect();
                Ok(parts?.join(" "))
            }
            Value::Map(entries) => {
                let mut parts = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    parts.push(format!("{}={}", key, value.as_string()?));
                }
                Ok(parts.join(" "))
            }
            Value::Function(_) => Err(EvalError::new("cannot convert function to string")),
        }
    }

    /// Convert to an integer. Succeeds for ints and numeric strings.
    pub fn as_int(&self) -> Result<i64, EvalError> {
        match self {
            Value::Int(v) => Ok(*v),
            Value::Str(s) => s
                .parse::<i64>()
                .map_err(|_| EvalError(format!("cannot convert {:?} to int", s))),
            Value::Array(_) => Err(EvalError::new("cannot convert array to int")),
            Value::Map(_) => Err(EvalError::new("cannot convert map to int")),
            Value::Function(_) => Err(EvalError::new("cannot convert function to int")),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i != 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i != 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}={}", key, value)?;
                }
                write!(f, "}}")
            }
            Value::Function(builtin) => write!(f, "{}", builtin.name),
        }
    }
}

#[cfg(test)]
#[path = "value_tests.rs"]
mod tests;
