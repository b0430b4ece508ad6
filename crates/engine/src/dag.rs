// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! DOT export of the task DAG.

use crate::builder::ShellTaskBuilder;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Serialize the task graph in DOT.
///
/// Tasks are boxes; external inputs (files with no producer) are red
/// nodes, terminal outputs (files no task consumes) are blue nodes, and
/// producer→consumer edges are labeled with the shared file name.
pub fn create_dag(builder: &ShellTaskBuilder) -> String {
    let mut out = String::new();
    out.push_str("digraph shelltask {\n  node [shape=box];\n");

    for task in &builder.tasks {
        let _ = writeln!(out, "  task{} [label={:?}];", task.id, task.shell_script);
    }

    for (index, input) in builder.missing_creator_files.iter().enumerate() {
        let _ = writeln!(out, "  input{} [label={:?}, color=red];", index, input);
        for task in &builder.tasks {
            if task.dependent_files.contains(input) {
                let _ = writeln!(out, "  input{} -> task{};", index, task.id);
            }
        }
    }

    for task in &builder.tasks {
        for &producer_id in &task.dependent_task_ids {
            let producer = &builder.tasks[producer_id - 1];
            for file in task.dependent_files.intersection(&producer.creating_files) {
                let _ = writeln!(
                    out,
                    "  task{} -> task{} [label={:?}];",
                    producer_id, task.id, file
                );
            }
        }
    }

    // files created but never consumed are the workflow's outputs
    let mut all_created: BTreeMap<&str, usize> = BTreeMap::new();
    let mut all_dependent: BTreeMap<&str, usize> = BTreeMap::new();
    for task in &builder.tasks {
        for file in &task.dependent_files {
            all_dependent.insert(file, task.id);
        }
        for file in &task.creating_files {
            all_created.insert(file, task.id);
        }
    }

    let mut output_id = 0;
    for (file, producer_id) in &all_created {
        if !all_dependent.contains_key(file) {
            output_id += 1;
            let _ = writeln!(out, "  output{} [label={:?}, color=blue];", output_id, file);
            let _ = writeln!(out, "  task{} -> output{};", producer_id, output_id);
        }
    }

    out.push_str("}\n");
    out
}

#[cfg(test)]
#[path = "dag_tests.rs"]
mod tests;
