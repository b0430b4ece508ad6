// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Built-in functions.
//!
//! The registry is static; function values are references into it. There
//! are no user-defined functions.

use crate::error::EvalError;
use crate::value::Value;
use std::fmt;

type BuiltinFn = fn(&[Value]) -> Result<Value, EvalError>;

/// A built-in function. Each entry checks its own arity.
pub struct Builtin {
    pub name: &'static str,
    call: BuiltinFn,
}

impl Builtin {
    pub fn invoke(&self, args: &[Value]) -> Result<Value, EvalError> {
        (self.call)(args)
    }
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builtin").field("name", &self.name).finish()
    }
}

impl PartialEq for Builtin {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// The built-in registry, loaded into every root environment.
pub static BUILTINS: &[Builtin] = &[
    Builtin {
        name: "basename",
        call: builtin_basename,
    },
    Builtin {
        name: "dirname",
        call: builtin_dirname,
    },
    Builtin {
        name: "prefix",
        call: builtin_prefix,
    },
    Builtin {
        name: "zip",
        call: builtin_zip,
    },
];

/// Look up a built-in by name.
pub fn lookup(name: &str) -> Option<&'static Builtin> {
    BUILTINS.iter().find(|builtin| builtin.name == name)
}

/// Last path element, slash-insensitive (`path.Base` semantics).
fn path_base(path: &str) -> &str {
    if path.is_empty() {
        return ".";
    }
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/";
    }
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Everything but the last path element (`path.Dir` semantics).
fn path_dir(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return if path.is_empty() { "." } else { "/" };
    }
    match trimmed.rfind('/') {
        None => ".",
        Some(0) => "/",
        Some(pos) => &trimmed[..pos],
    }
}

fn builtin_basename(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() >= 3 {
        return Err(EvalError::new("too many arguments for basename"));
    }
    if args.is_empty() {
        return Err(EvalError::new("basename requires one or two arguments"));
    }

    let path = args[0].as_string()?;
    let base = path_base(&path);

    if args.len() == 2 {
        let suffix = args[1].as_string()?;
        if !suffix.is_empty() {
            if let Some(stripped) = base.strip_suffix(suffix.as_str()) {
                return Ok(Value::Str(stripped.to_string()));
            }
        }
    }
    Ok(Value::Str(base.to_string()))
}

fn builtin_dirname(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() >= 2 {
        return Err(EvalError::new("too many arguments for dirname"));
    }
    if args.is_empty() {
        return Err(EvalError::new("dirname requires one argument"));
    }

    let path = args[0].as_string()?;
    Ok(Value::Str(path_dir(&path).to_string()))
}

fn builtin_prefix(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::new("prefix requires two arguments"));
    }

    let prefix = args[0].as_string()?;
    let Value::Array(items) = &args[1] else {
        return Err(EvalError(format!("{} is not an array", args[1])));
    };

    let mut values = Vec::with_capacity(items.len());
    for item in items {
        values.push(Value::Str(format!("{}{}", prefix, item.as_string()?)));
    }
    Ok(Value::Array(values))
}

fn builtin_zip(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::new("zip requires two arguments"));
    }

    let Value::Array(left) = &args[0] else {
        return Err(EvalError(format!("{} is not an array", args[0])));
    };
    let Value::Array(right) = &args[1] else {
        return Err(EvalError(format!("{} is not an array", args[1])));
    };

    let values = left
        .iter()
        .zip(right.iter())
        .map(|(a, b)| Value::Array(vec![a.clone(), b.clone()]))
        .collect();
    Ok(Value::Array(values))
}

#[cfg(test)]
#[path = "builtins_tests.rs"]
mod tests;
