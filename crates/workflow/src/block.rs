// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow file → nested block tree.

use crate::items::split_for_items;
use regex::Regex;
use sf_flowscript::{parse_script, Expr};
use std::collections::BTreeSet;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::warn;

/// Regex for a `for` statement: `for <var> in <items> [; do]`.
// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static FOR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^for\s+(\w+)\s+in\s+(\S.+?)\s*(;?\s*do\s*)?$")
        .expect("constant regex pattern is valid")
});

/// Regex for an embedded `{{…}}` hole in a shell line.
#[allow(clippy::expect_used)]
static EMBEDDED_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{[^}]*\}\}").expect("constant regex pattern is valid"));

/// At most this many `{{…}}` holes are recognized per line.
const MAX_EMBEDDED_PER_LINE: usize = 100;

/// Errors from parsing a workflow file into blocks.
#[derive(Debug, Error)]
pub enum BlockError {
    #[error("invalid for statement at line {line}: {text}")]
    InvalidFor { line: usize, text: String },

    #[error("invalid done statement at line {line}: {text}")]
    InvalidDone { line: usize, text: String },

    #[error("expression parse error at line {line}: {message}")]
    Expression { line: usize, message: String },

    #[error("invalid glob pattern at line {line}: {message}")]
    Glob { line: usize, message: String },
}

/// One item of a `for` statement.
///
/// Glob items are expanded against the filesystem at block-parse time;
/// each match becomes its own literal.
#[derive(Debug, Clone)]
pub enum ForItem {
    Literal(String),
    Expr(Expr),
}

/// A `{{…}}` hole: byte span within the trimmed line, plus the parsed
/// expression.
#[derive(Debug, Clone)]
pub struct Embedded {
    pub start: usize,
    pub end: usize,
    pub expr: Expr,
}

/// A shell line with its embedded expressions parsed ahead of time.
#[derive(Debug, Clone)]
pub struct ShellLine {
    pub line: usize,
    pub literal: String,
    pub embedded: Vec<Embedded>,
}

/// A `#% …` directive.
#[derive(Debug, Clone)]
pub struct FlowExpr {
    pub line: usize,
    pub source: String,
    pub expr: Expr,
}

/// A `for … done` block with its body.
#[derive(Debug, Clone)]
pub struct ForBlock {
    pub line: usize,
    pub var_name: String,
    pub items: Vec<ForItem>,
    pub children: Vec<BlockNode>,
}

/// One node of the block tree.
#[derive(Debug, Clone)]
pub enum BlockNode {
    Flow(FlowExpr),
    Shell(ShellLine),
    For(ForBlock),
}

impl BlockNode {
    pub fn line(&self) -> usize {
        match self {
            BlockNode::Flow(flow) => flow.line,
            BlockNode::Shell(shell) => shell.line,
            BlockNode::For(block) => block.line,
        }
    }

    /// Variables this node reads, aggregated over shell-line holes and
    /// directives; `for` blocks aggregate their body.
    pub fn dependent_variables(&self) -> BTreeSet<String> {
        match self {
            BlockNode::Flow(flow) => sf_flowscript::dependent_variables(&flow.expr),
            BlockNode::Shell(shell) => {
                let mut names = BTreeSet::new();
                for embedded in &shell.embedded {
                    names.extend(sf_flowscript::dependent_variables(&embedded.expr));
                }
                names
            }
            BlockNode::For(block) => {
                let mut names = BTreeSet::new();
                for child in &block.children {
                    names.extend(child.dependent_variables());
                }
                names
            }
        }
    }

    /// Variables this node assigns.
    pub fn created_variables(&self) -> BTreeSet<String> {
        match self {
            BlockNode::Flow(flow) => sf_flowscript::created_variables(&flow.expr),
            BlockNode::Shell(shell) => {
                let mut names = BTreeSet::new();
                for embedded in &shell.embedded {
                    names.extend(sf_flowscript::created_variables(&embedded.expr));
                }
                names
            }
            BlockNode::For(block) => {
                let mut names = BTreeSet::new();
                for child in &block.children {
                    names.extend(child.created_variables());
                }
                names
            }
        }
    }
}

/// The parsed workflow: top-level blocks plus the submitted content,
/// kept verbatim for the run metadata.
#[derive(Debug, Clone)]
pub struct BlockTree {
    pub children: Vec<BlockNode>,
    pub content: String,
}

impl BlockTree {
    pub fn dependent_variables(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        for child in &self.children {
            names.extend(child.dependent_variables());
        }
        names
    }

    pub fn created_variables(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        for child in &self.children {
            names.extend(child.created_variables());
        }
        names
    }
}

/// Parse a workflow file.
///
/// Lines are trimmed before classification. `#` comments and blank
/// lines are skipped; `#%` directives, `for`/`done` and shell lines
/// build the tree. A `for` left unclosed at end of input keeps its body
/// and is treated as closed.
pub fn parse_workflow(content: &str) -> Result<BlockTree, BlockError> {
    let mut root: Vec<BlockNode> = Vec::new();
    let mut stack: Vec<ForBlock> = Vec::new();

    for (index, raw_line) in content.lines().enumerate() {
        let line_num = index + 1;
        let line = raw_line.trim();

        if line.starts_with("for ") {
            let captures = FOR_PATTERN.captures(line).ok_or_else(|| BlockError::InvalidFor {
                line: line_num,
                text: line.to_string(),
            })?;
            let block = new_for_block(&captures[1], &captures[2], line_num)?;
            stack.push(block);
            continue;
        }

        if line.starts_with("done") {
            if line != "done" {
                return Err(BlockError::InvalidDone {
                    line: line_num,
                    text: line.to_string(),
                });
            }
            let block = stack.pop().ok_or_else(|| BlockError::InvalidDone {
                line: line_num,
                text: "done without an open for".to_string(),
            })?;
            push_node(&mut root, &mut stack, BlockNode::For(block));
            continue;
        }

        if let Some(source) = line.strip_prefix("#%") {
            let expr = parse_script(source).map_err(|err| BlockError::Expression {
                line: line_num,
                message: err.to_string(),
            })?;
            push_node(
                &mut root,
                &mut stack,
                BlockNode::Flow(FlowExpr {
                    line: line_num,
                    source: source.to_string(),
                    expr,
                }),
            );
            continue;
        }

        if line.starts_with('#') || line.is_empty() {
            continue;
        }

        let shell = parse_shell_line(line_num, line)?;
        push_node(&mut root, &mut stack, BlockNode::Shell(shell));
    }

    // tolerate a missing final `done`
    while let Some(block) = stack.pop() {
        warn!(line = block.line, "for block left unclosed at end of workflow");
        push_node(&mut root, &mut stack, BlockNode::For(block));
    }

    Ok(BlockTree {
        children: root,
        content: content.to_string(),
    })
}

fn push_node(root: &mut Vec<BlockNode>, stack: &mut [ForBlock], node: BlockNode) {
    match stack.last_mut() {
        Some(top) => top.children.push(node),
        None => root.push(node),
    }
}

fn new_for_block(var_name: &str, items_text: &str, line_num: usize) -> Result<ForBlock, BlockError> {
    let mut items = Vec::new();

    for raw in split_for_items(items_text) {
        if raw.starts_with("{{") && raw.ends_with("}}") && raw.len() >= 4 {
            let expr = parse_script(&raw[2..raw.len() - 2]).map_err(|err| {
                BlockError::Expression {
                    line: line_num,
                    message: err.to_string(),
                }
            })?;
            items.push(ForItem::Expr(expr));
        } else if raw.contains('*') || raw.contains('?') {
            let paths = glob::glob(&raw).map_err(|err| BlockError::Glob {
                line: line_num,
                message: err.to_string(),
            })?;
            for path in paths.flatten() {
                items.push(ForItem::Literal(path.to_string_lossy().to_string()));
            }
        } else {
            items.push(ForItem::Literal(raw));
        }
    }

    Ok(ForBlock {
        line: line_num,
        var_name: var_name.to_string(),
        items,
        children: Vec::new(),
    })
}

fn parse_shell_line(line_num: usize, line: &str) -> Result<ShellLine, BlockError> {
    let mut embedded = Vec::new();
    for hole in EMBEDDED_PATTERN.find_iter(line).take(MAX_EMBEDDED_PER_LINE) {
        let source = &line[hole.start() + 2..hole.end() - 2];
        let expr = parse_script(source).map_err(|err| BlockError::Expression {
            line: line_num,
            message: err.to_string(),
        })?;
        embedded.push(Embedded {
            start: hole.start(),
            end: hole.end(),
            expr,
        });
    }

    Ok(ShellLine {
        line: line_num,
        literal: line.to_string(),
        embedded,
    })
}

#[cfg(test)]
#[path = "block_tests.rs"]
mod tests;
