// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde::Serialize;

#[derive(Serialize)]
struct Row {
    name: String,
}

#[test]
fn output_format_defaults_to_text() {
    assert_eq!(OutputFormat::default(), OutputFormat::Text);
}

#[test]
fn format_or_json_calls_text_fn_for_text() {
    let mut called = false;
    format_or_json(OutputFormat::Text, &Row { name: "a".into() }, || called = true).unwrap();
    assert!(called);
}

#[test]
fn format_or_json_skips_text_fn_for_json() {
    let mut called = false;
    format_or_json(OutputFormat::Json, &Row { name: "a".into() }, || called = true).unwrap();
    assert!(!called);
}

#[test]
fn handle_list_renders_empty_message() {
    let rows: Vec<Row> = Vec::new();
    handle_list(OutputFormat::Text, &rows, "no rows", |_, _| panic!("should not render")).unwrap();
}

#[test]
fn handle_list_renders_text_for_nonempty() {
    let rows = vec![Row { name: "a".into() }];
    let mut rendered = false;
    handle_list(OutputFormat::Text, &rows, "no rows", |items, _| {
        rendered = items.len() == 1;
    })
    .unwrap();
    assert!(rendered);
}

#[test]
fn handle_list_skips_render_fn_for_json() {
    let rows = vec![Row { name: "a".into() }];
    handle_list(OutputFormat::Json, &rows, "no rows", |_, _| panic!("should not render")).unwrap();
}
