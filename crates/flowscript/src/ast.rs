// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Expression tree and tree-walking evaluation.

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::Value;
use std::fmt;

/// Integer arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArithOp::Add => write!(f, "+"),
            ArithOp::Sub => write!(f, "-"),
            ArithOp::Mul => write!(f, "*"),
            ArithOp::Div => write!(f, "/"),
        }
    }
}

/// A parsed expression.
///
/// `Display` renders a form that re-parses to the same tree (modulo
/// whitespace), which the tests rely on.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal value (number or string).
    Literal(Value),
    /// A variable reference by name.
    Variable(String),
    /// `target[index]` over an array or map.
    Index { target: Box<Expr>, index: Box<Expr> },
    /// `target = value`. The target must evaluate-time resolve to a plain
    /// variable; anything else is an evaluation error, not a parse error.
    Assign { target: Box<Expr>, value: Box<Expr> },
    /// `lhs + rhs`: integer addition when both sides are ints, otherwise
    /// string concatenation of the two string forms.
    Plus { lhs: Box<Expr>, rhs: Box<Expr> },
    /// Integer-only arithmetic.
    Arith {
        op: ArithOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// `first; second` — evaluates both, yields the second.
    Seq { first: Box<Expr>, second: Box<Expr> },
    /// `callee(args…)`.
    Call { callee: Box<Expr>, args: Vec<Expr> },
    /// `[a, b, …]`.
    Array(Vec<Expr>),
}

impl Expr {
    /// Direct child expressions, in source order.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Literal(_) | Expr::Variable(_) => Vec::new(),
            Expr::Index { target, index } => vec![target, index],
            Expr::Assign { target, value } => vec![target, value],
            Expr::Plus { lhs, rhs } => vec![lhs, rhs],
            Expr::Arith { lhs, rhs, .. } => vec![lhs, rhs],
            Expr::Seq { first, second } => vec![first, second],
            Expr::Call { callee, args } => {
                let mut children: Vec<&Expr> = args.iter().collect();
                children.push(callee);
                children
            }
            Expr::Array(items) => items.iter().collect(),
        }
    }

    /// Evaluate against an environment.
    pub fn evaluate(&self, env: &Environment) -> Result<Value, EvalError> {
        match self {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Variable(name) => env.value(name),
            Expr::Index { target, index } => evaluate_index(target, index, env),
            Expr::Assign { target, value } => {
                let result = value.evaluate(env)?;
                let Expr::Variable(name) = target.as_ref() else {
                    return Err(EvalError(format!("{} is not a variable", target)));
                };
                env.assign(name, result.clone());
                Ok(result)
            }
            Expr::Plus { lhs, rhs } => {
                let left = lhs.evaluate(env)?;
                let right = rhs.evaluate(env)?;
                if let (Value::Int(a), Value::Int(b)) = (&left, &right) {
                    return Ok(Value::Int(a.wrapping_add(*b)));
                }
                match (left.as_string(), right.as_string()) {
                    (Ok(a), Ok(b)) => Ok(Value::Str(a + &b)),
                    _ => Err(EvalError(format!("cannot combine {} and {}", lhs, rhs))),
                }
            }
            Expr::Arith { op, lhs, rhs } => {
                let fail = || EvalError(format!("cannot calculate {}", self));
                let a = lhs.evaluate(env)?.as_int().map_err(|_| fail())?;
                let b = rhs.evaluate(env)?.as_int().map_err(|_| fail())?;
                let result = match op {
                    ArithOp::Add => a.wrapping_add(b),
                    ArithOp::Sub => a.wrapping_sub(b),
                    ArithOp::Mul => a.wrapping_mul(b),
                    ArithOp::Div => a.checked_div(b).ok_or_else(fail)?,
                };
                Ok(Value::Int(result))
            }
            Expr::Seq { first, second } => {
                first.evaluate(env)?;
                second.evaluate(env)
            }
            Expr::Call { callee, args } => {
                let function = callee.evaluate(env)?;
                let Value::Function(builtin) = function else {
                    return Err(EvalError(format!("{} is not a function", function)));
                };
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(arg.evaluate(env)?);
                }
                builtin.invoke(&values)
            }
            Expr::Array(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(item.evaluate(env)?);
                }
                Ok(Value::Array(values))
            }
        }
    }
}

fn evaluate_index(target: &Expr, index: &Expr, env: &Environment) -> Result<Value, EvalError> {
    let container = target.evaluate(env)?;
    let key = index.evaluate(env)?;

    match container {
        Value::Array(items) => {
            let Value::Int(i) = key else {
                return Err(EvalError(format!("{} is not an int", index)));
            };
            if i < 0 || i as usize >= items.len() {
                return Err(EvalError(format!("index out of range: {}[{}]", target, i)));
            }
            Ok(items[i as usize].clone())
        }
        Value::Map(entries) => {
            let name = key
                .as_string()
                .map_err(|_| EvalError(format!("{} is not a string", index)))?;
            entries
                .get(&name)
                .cloned()
                .ok_or_else(|| EvalError(format!("{} is not found in {}", name, target)))
        }
        _ => Err(EvalError(format!("{} is not an array or map", target))),
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(value) => write!(f, "{}", value),
            Expr::Variable(name) => write!(f, "{}", name),
            Expr::Index { target, index } => write!(f, "{}[{}]", target, index),
            Expr::Assign { target, value } => write!(f, "{} = {}", target, value),
            Expr::Plus { lhs, rhs } => write!(f, "{} + {}", lhs, rhs),
            Expr::Arith { op, lhs, rhs } => write!(f, "{} {} {}", lhs, op, rhs),
            Expr::Seq { first, second } => write!(f, "{}; {}", first, second),
            Expr::Call { callee, args } => {
                write!(f, "{}(", callee)?;
                for (i, arg) in args.iter().enumerate() {
                    if i != 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Expr::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i != 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

#[cfg(test)]
#[path = "ast_tests.rs"]
mod tests;
