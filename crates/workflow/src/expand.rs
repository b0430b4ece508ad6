// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Block-tree expansion.

use crate::block::{BlockNode, BlockTree, ForBlock, ForItem, ShellLine};
use sf_flowscript::{Environment, Value};
use std::fmt;
use thiserror::Error;

/// Errors from expanding a workflow.
#[derive(Debug, Error)]
pub enum ExpandError {
    /// An embedded expression or directive failed to evaluate.
    #[error("evaluation error at line {line}: {message}")]
    Eval { line: usize, message: String },

    /// The task sink rejected an expanded shell line.
    #[error("error at line {line}: {message}")]
    Task { line: usize, message: String },
}

/// Receiver for expanded shell lines, in expansion order.
///
/// The engine's task builder implements this; tests use simple
/// collectors.
pub trait TaskSink {
    type Error: fmt::Display;

    fn push_line(&mut self, line_num: usize, line: String) -> Result<(), Self::Error>;
}

/// Every `Vec<(line, text)>` is a sink, for tests and dry inspection.
impl TaskSink for Vec<(usize, String)> {
    type Error = std::convert::Infallible;

    fn push_line(&mut self, line_num: usize, line: String) -> Result<(), Self::Error> {
        self.push((line_num, line));
        Ok(())
    }
}

/// Walk the block tree once, in textual order, evaluating directives and
/// substituting embedded expressions; every concrete shell line goes to
/// the sink.
///
/// Loop variables are assigned into the given environment and stay bound
/// after the loop, so a line following `done` sees the last iteration's
/// value.
pub fn expand<S: TaskSink>(
    tree: &BlockTree,
    env: &Environment,
    sink: &mut S,
) -> Result<(), ExpandError> {
    expand_children(&tree.children, env, sink)
}

fn expand_children<S: TaskSink>(
    children: &[BlockNode],
    env: &Environment,
    sink: &mut S,
) -> Result<(), ExpandError> {
    for child in children {
        expand_node(child, env, sink)?;
    }
    Ok(())
}

fn expand_node<S: TaskSink>(
    node: &BlockNode,
    env: &Environment,
    sink: &mut S,
) -> Result<(), ExpandError> {
    match node {
        BlockNode::Flow(flow) => {
            flow.expr.evaluate(env).map_err(|err| ExpandError::Eval {
                line: flow.line,
                message: err.to_string(),
            })?;
            Ok(())
        }
        BlockNode::Shell(shell) => expand_shell_line(shell, env, sink),
        BlockNode::For(block) => expand_for_block(block, env, sink),
    }
}

fn expand_shell_line<S: TaskSink>(
    shell: &ShellLine,
    env: &Environment,
    sink: &mut S,
) -> Result<(), ExpandError> {
    let eval_error = |err: &dyn fmt::Display| ExpandError::Eval {
        line: shell.line,
        message: err.to_string(),
    };

    let mut substitutions = Vec::with_capacity(shell.embedded.len());
    for embedded in &shell.embedded {
        let value = embedded.expr.evaluate(env).map_err(|err| eval_error(&err))?;
        let text = value.as_string().map_err(|err| eval_error(&err))?;
        substitutions.push(text);
    }

    // splice right to left so earlier spans stay valid
    let mut line = shell.literal.clone();
    for (embedded, text) in shell.embedded.iter().zip(substitutions).rev() {
        line.replace_range(embedded.start..embedded.end, &text);
    }

    sink.push_line(shell.line, line).map_err(|err| ExpandError::Task {
        line: shell.line,
        message: err.to_string(),
    })
}

fn expand_for_block<S: TaskSink>(
    block: &ForBlock,
    env: &Environment,
    sink: &mut S,
) -> Result<(), ExpandError> {
    for item in &block.items {
        let values = item_values(item, env, block.line)?;
        for value in values {
            env.assign(&block.var_name, value);
            expand_children(&block.children, env, sink)?;
        }
    }
    Ok(())
}

/// Values one for-item contributes: a literal contributes itself, an
/// expression contributes its value — element-wise for arrays (one level
/// of flattening), as a single iteration otherwise.
fn item_values(item: &ForItem, env: &Environment, line: usize) -> Result<Vec<Value>, ExpandError> {
    match item {
        ForItem::Literal(text) => Ok(vec![Value::Str(text.clone())]),
        ForItem::Expr(expr) => {
            let value = expr.evaluate(env).map_err(|err| ExpandError::Eval {
                line,
                message: err.to_string(),
            })?;
            match value {
                Value::Array(items) => Ok(items),
                other => Ok(vec![other]),
            }
        }
    }
}

#[cfg(test)]
#[path = "expand_tests.rs"]
mod tests;
