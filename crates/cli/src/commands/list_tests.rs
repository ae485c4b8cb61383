// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn add_creates_a_list() {
    let store = LocalStore::open_in_memory().unwrap();
    let config = Config::default();

    add(&store, &config, OutputFormat::Json, "Work".into()).unwrap();

    let lists = store.list_all_lists(false).unwrap();
    assert_eq!(lists.len(), 1);
    assert_eq!(lists[0].name, "Work");
}

#[test]
fn add_rejects_a_duplicate_name() {
    let store = LocalStore::open_in_memory().unwrap();
    let config = Config::default();

    add(&store, &config, OutputFormat::Json, "Work".into()).unwrap();
    let err = add(&store, &config, OutputFormat::Json, "Work".into()).unwrap_err();
    assert_eq!(err.code, 1);
}

#[test]
fn rm_soft_deletes_a_list() {
    let store = LocalStore::open_in_memory().unwrap();
    let config = Config::default();
    add(&store, &config, OutputFormat::Json, "Work".into()).unwrap();
    let list = store.list_all_lists(false).unwrap().remove(0);

    rm(&store, &config, OutputFormat::Json, list.uid.as_str()).unwrap();

    assert!(store.list_all_lists(false).unwrap().is_empty());
    assert_eq!(store.list_all_lists(true).unwrap().len(), 1);
}
