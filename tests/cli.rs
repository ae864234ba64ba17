use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use plankey_core::PrimitiveTypeKind;
use plankey_ir::{Expr, entity_set, primitive, save_tree};
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

fn orders_with_status(status: &str) -> Expr {
    let input = Expr::scan(entity_set("Shop", "Orders", "Shop.Order")).bind_as("o");
    let property = input
        .variable_ref()
        .property("Status", primitive(PrimitiveTypeKind::String));
    input.filter(property.equal(Expr::constant(status)))
}

fn write_tree(dir: &Path, name: &str, tree: &Expr) -> PathBuf {
    let path = dir.join(name);
    save_tree(tree, &path).expect("save tree");
    path
}

#[test]
fn key_prints_the_canonical_key() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_tree(dir.path(), "open.json", &orders_with_status("Open"));

    cargo_bin_cmd!("plankey")
        .args(["--no-color", "key"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("[Filter](BV'o'=([Scan](Shop.Orders"))
        .stdout(predicate::str::contains("'Open':Edm.String"));
}

#[test]
fn key_emits_json() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_tree(dir.path(), "open.json", &orders_with_status("Open"));

    let output = cargo_bin_cmd!("plankey")
        .args(["key", "--json"])
        .arg(&path)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: Value = serde_json::from_slice(&output).expect("valid json");
    assert_eq!(json["cacheable"], true);
    assert!(json["key"].as_str().expect("key").starts_with("[Filter]"));
    assert!(json["nodes"].as_u64().expect("nodes") > 1);
}

#[test]
fn depth_flag_makes_tree_uncacheable() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_tree(dir.path(), "open.json", &orders_with_status("Open"));

    cargo_bin_cmd!("plankey")
        .args(["--no-color", "--max-depth", "2", "key"])
        .arg(&path)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("not cacheable"));
}

#[test]
fn compare_reports_equivalent_trees() {
    let dir = TempDir::new().expect("tempdir");
    let a = write_tree(dir.path(), "a.json", &orders_with_status("Open"));
    let b = write_tree(dir.path(), "b.json", &orders_with_status("Open"));

    cargo_bin_cmd!("plankey")
        .args(["--no-color", "compare"])
        .arg(&a)
        .arg(&b)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("equivalent"));
}

#[test]
fn compare_reports_different_trees() {
    let dir = TempDir::new().expect("tempdir");
    let a = write_tree(dir.path(), "a.json", &orders_with_status("Open"));
    let b = write_tree(dir.path(), "b.json", &orders_with_status("Closed"));

    cargo_bin_cmd!("plankey")
        .args(["--no-color", "compare"])
        .arg(&a)
        .arg(&b)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("different"));
}

#[test]
fn validate_accepts_a_well_formed_tree() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_tree(dir.path(), "open.json", &orders_with_status("Open"));

    cargo_bin_cmd!("plankey")
        .args(["--no-color", "validate"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("valid"));
}

#[test]
fn validate_rejects_an_empty_in_list() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_tree(dir.path(), "in.json", &Expr::constant(1).in_list(vec![]));

    cargo_bin_cmd!("plankey")
        .args(["--no-color", "validate"])
        .arg(&path)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("IN list cannot be empty"));
}

#[test]
fn kinds_lists_join_tokens() {
    cargo_bin_cmd!("plankey")
        .arg("kinds")
        .assert()
        .success()
        .stdout(predicate::str::contains("LeftOuterJoin"))
        .stdout(predicate::str::contains("LOJ"));
}

#[test]
fn missing_tree_file_fails() {
    cargo_bin_cmd!("plankey")
        .args(["key", "/nonexistent/tree.json"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error: reading tree"));
}
