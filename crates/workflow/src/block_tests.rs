// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

#[test]
fn shell_lines_and_comments() {
    let tree = parse_workflow("# a comment\n\ncat hoge > foo\n  indented line  \n").unwrap();
    assert_eq!(tree.children.len(), 2);

    let BlockNode::Shell(first) = &tree.children[0] else {
        panic!("expected shell line");
    };
    assert_eq!(first.line, 3);
    assert_eq!(first.literal, "cat hoge > foo");
    assert!(first.embedded.is_empty());

    let BlockNode::Shell(second) = &tree.children[1] else {
        panic!("expected shell line");
    };
    // lines are trimmed before classification
    assert_eq!(second.literal, "indented line");
}

#[test]
fn raw_content_is_preserved_verbatim() {
    let content = "# header\ncat a > b\n";
    let tree = parse_workflow(content).unwrap();
    assert_eq!(tree.content, content);
}

#[test]
fn flow_directives() {
    let tree = parse_workflow("#% a = [1, 2, 3]\n").unwrap();
    let BlockNode::Flow(flow) = &tree.children[0] else {
        panic!("expected flow directive");
    };
    assert_eq!(flow.line, 1);
    assert_eq!(flow.source, " a = [1, 2, 3]");
    assert_eq!(flow.expr.to_string(), "a = [1, 2, 3]");
}

#[test]
fn embedded_holes_keep_their_spans() {
    let tree = parse_workflow("cat {{x}} > {{y + \"1\"}}\n").unwrap();
    let BlockNode::Shell(shell) = &tree.children[0] else {
        panic!("expected shell line");
    };
    assert_eq!(shell.embedded.len(), 2);
    assert_eq!(&shell.literal[shell.embedded[0].start..shell.embedded[0].end], "{{x}}");
    assert_eq!(shell.embedded[0].expr.to_string(), "x");
    assert_eq!(shell.embedded[1].expr.to_string(), "y + \"1\"");
}

#[test]
fn for_blocks_nest() {
    let tree = parse_workflow(
        "for x in a b; do\nfor y in c; do\necho {{x}}{{y}}\ndone\ndone\necho after\n",
    )
    .unwrap();
    assert_eq!(tree.children.len(), 2);

    let BlockNode::For(outer) = &tree.children[0] else {
        panic!("expected for block");
    };
    assert_eq!(outer.var_name, "x");
    assert_eq!(outer.items.len(), 2);
    assert_eq!(outer.children.len(), 1);

    let BlockNode::For(inner) = &outer.children[0] else {
        panic!("expected nested for block");
    };
    assert_eq!(inner.var_name, "y");
    assert_eq!(inner.children.len(), 1);
}

#[test]
fn for_accepts_optional_semicolon_do() {
    for text in ["for x in a b; do", "for x in a b do", "for x in a b"] {
        let tree = parse_workflow(&format!("{}\ndone\n", text)).unwrap();
        let BlockNode::For(block) = &tree.children[0] else {
            panic!("expected for block for {:?}", text);
        };
        assert_eq!(block.items.len(), 2, "items for {:?}", text);
    }
}

#[test]
fn expression_items_are_parsed_ahead_of_time() {
    let tree = parse_workflow("for y in {{zip(a, b)}} tail; do\necho {{y}}\ndone\n").unwrap();
    let BlockNode::For(block) = &tree.children[0] else {
        panic!("expected for block");
    };
    assert_eq!(block.items.len(), 2);
    assert!(matches!(block.items[0], ForItem::Expr(_)));
    match &block.items[1] {
        ForItem::Literal(text) => assert_eq!(text, "tail"),
        other => panic!("expected literal, got {:?}", other),
    }
}

#[test]
#[serial]
fn glob_items_expand_at_parse_time() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("examples")).unwrap();
    std::fs::write(dir.path().join("examples/hello.c"), "").unwrap();
    std::fs::write(dir.path().join("examples/helloprint.c"), "").unwrap();
    std::fs::write(dir.path().join("examples/readme.md"), "").unwrap();

    let original = std::env::current_dir().unwrap();
    std::env::set_current_dir(dir.path()).unwrap();
    let tree = parse_workflow("for y in examples/*.c; do\ntest {{y}}\ndone\n");
    std::env::set_current_dir(original).unwrap();

    let tree = tree.unwrap();
    let BlockNode::For(block) = &tree.children[0] else {
        panic!("expected for block");
    };
    let names: Vec<&str> = block
        .items
        .iter()
        .map(|item| match item {
            ForItem::Literal(text) => text.as_str(),
            other => panic!("expected literal, got {:?}", other),
        })
        .collect();
    assert_eq!(names, ["examples/hello.c", "examples/helloprint.c"]);
}

#[test]
#[serial]
fn glob_with_no_matches_adds_no_items() {
    let dir = tempfile::tempdir().unwrap();
    let original = std::env::current_dir().unwrap();
    std::env::set_current_dir(dir.path()).unwrap();
    let tree = parse_workflow("for y in *.nothing; do\ntest {{y}}\ndone\n");
    std::env::set_current_dir(original).unwrap();

    let tree = tree.unwrap();
    let BlockNode::For(block) = &tree.children[0] else {
        panic!("expected for block");
    };
    assert!(block.items.is_empty());
}

#[test]
fn invalid_for_statement() {
    let err = parse_workflow("for in broken\n").unwrap_err();
    assert!(matches!(err, BlockError::InvalidFor { line: 1, .. }));
}

#[test]
fn invalid_done_statement() {
    let err = parse_workflow("for x in a; do\ndone extra\n").unwrap_err();
    assert!(matches!(err, BlockError::InvalidDone { line: 2, .. }));

    let err = parse_workflow("done\n").unwrap_err();
    assert!(matches!(err, BlockError::InvalidDone { line: 1, .. }));
}

#[test]
fn expression_errors_carry_the_line_number() {
    let err = parse_workflow("echo ok\necho {{(1}}\n").unwrap_err();
    match err {
        BlockError::Expression { line, .. } => assert_eq!(line, 2),
        other => panic!("expected expression error, got {:?}", other),
    }
}

#[test]
fn unclosed_for_is_tolerated() {
    let tree = parse_workflow("for x in a b; do\necho {{x}}\n").unwrap();
    let BlockNode::For(block) = &tree.children[0] else {
        panic!("expected for block");
    };
    assert_eq!(block.children.len(), 1);
}

#[test]
fn variable_queries_aggregate_over_blocks() {
    let tree = parse_workflow(
        "#% out = \"result\"\nfor x in a b; do\ncat {{x}} > {{out + x}}\ndone\n",
    )
    .unwrap();
    let deps = tree.dependent_variables();
    assert!(deps.contains("x"));
    assert!(deps.contains("out"));
    let created = tree.created_variables();
    assert!(created.contains("out"));
    assert!(!created.contains("x"));
}
