// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Variable queries over expression trees.

use crate::ast::Expr;
use std::collections::BTreeSet;

/// Names an expression reads: every variable reference that is not the
/// left-hand side of an assignment.
pub fn dependent_variables(expr: &Expr) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    walk_dependent(expr, &mut names);
    names
}

fn walk_dependent(expr: &Expr, names: &mut BTreeSet<String>) {
    match expr {
        Expr::Assign { value, .. } => walk_dependent(value, names),
        Expr::Variable(name) => {
            names.insert(name.clone());
        }
        _ => {
            for child in expr.children() {
                walk_dependent(child, names);
            }
        }
    }
}

/// Names an expression writes: the left-hand sides of assignments.
///
/// Assignment right-hand sides are not descended into, so an assignment
/// nested inside another assignment's value does not count.
pub fn created_variables(expr: &Expr) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    walk_created(expr, &mut names);
    names
}

fn walk_created(expr: &Expr, names: &mut BTreeSet<String>) {
    match expr {
        Expr::Assign { target, .. } => {
            if let Expr::Variable(name) = target.as_ref() {
                names.insert(name.clone());
            }
        }
        _ => {
            for child in expr.children() {
                walk_created(child, names);
            }
        }
    }
}

#[cfg(test)]
#[path = "vars_tests.rs"]
mod tests;
