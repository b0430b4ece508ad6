// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for parsing and evaluation

use thiserror::Error;

/// Errors produced while tokenizing or parsing an expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Sentinel: the current token does not begin this production.
    ///
    /// Parser alternatives catch this and try the next production; it only
    /// escapes to callers when no production matched at all.
    #[error("no expression matched")]
    Unmatched,

    /// A production committed (consumed an opening token) and the rest of
    /// the input does not complete it.
    #[error("syntax error: {0}")]
    Syntax(String),
}

/// Errors produced while evaluating an expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct EvalError(pub String);

impl EvalError {
    pub fn new(message: impl Into<String>) -> Self {
        EvalError(message.into())
    }
}

/// Combined error for parse-then-evaluate entry points.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}
