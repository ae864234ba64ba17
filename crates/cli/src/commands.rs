//! Command handlers
//!
//! Each handler writes its report to `out` and returns an [`Outcome`].
//! Failures to read or parse a tree are errors; a tree that cannot be
//! keyed is a negative outcome.

use crate::Outcome;
use anyhow::Context;
use colored::Colorize;
use plankey_core::PlanKeyError;
use plankey_ir::{Expr, ExprKind, Validator, load_tree};
use plankey_keygen::{CacheKey, KeyGenConfig, KeyGenerator, token};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// JSON report printed by `key --json`
#[derive(Debug, Serialize)]
pub struct KeyReport {
    pub file: String,
    pub cacheable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<CacheKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub nodes: usize,
    pub depth: usize,
}

/// Key of a tree, or the reason it has none
enum Keyed {
    Key(CacheKey),
    NotCacheable(PlanKeyError),
}

fn load(path: &Path) -> anyhow::Result<Expr> {
    load_tree(path).with_context(|| format!("reading tree {}", path.display()))
}

fn key_tree(generator: &KeyGenerator, tree: &Expr) -> anyhow::Result<Keyed> {
    match generator.generate(tree) {
        Ok(key) => Ok(Keyed::Key(key)),
        Err(e) if e.is_unsupported() => Ok(Keyed::NotCacheable(e)),
        Err(e) => Err(e.into()),
    }
}

// ============================================================================
// key
// ============================================================================

/// Print the key of one tree file
pub fn key(
    out: &mut dyn Write,
    file: &Path,
    json: bool,
    config: KeyGenConfig,
) -> anyhow::Result<Outcome> {
    let tree = load(file)?;
    let keyed = key_tree(&KeyGenerator::new(config), &tree)?;

    if json {
        let (key, reason) = match keyed {
            Keyed::Key(key) => (Some(key), None),
            Keyed::NotCacheable(e) => (None, Some(e.to_string())),
        };
        let report = KeyReport {
            file: file.display().to_string(),
            cacheable: key.is_some(),
            key,
            reason,
            nodes: tree.node_count(),
            depth: tree.depth(),
        };
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        return Ok(if report.cacheable {
            Outcome::Success
        } else {
            Outcome::Negative
        });
    }

    match keyed {
        Keyed::Key(key) => {
            writeln!(out, "{}", key)?;
            Ok(Outcome::Success)
        }
        Keyed::NotCacheable(e) => {
            writeln!(out, "{} {}", "not cacheable:".yellow(), e)?;
            Ok(Outcome::Negative)
        }
    }
}

// ============================================================================
// compare
// ============================================================================

/// Report whether two tree files share a key
pub fn compare(
    out: &mut dyn Write,
    left: &Path,
    right: &Path,
    config: KeyGenConfig,
) -> anyhow::Result<Outcome> {
    let generator = KeyGenerator::new(config);
    let left_key = key_tree(&generator, &load(left)?)?;
    let right_key = key_tree(&generator, &load(right)?)?;

    match (left_key, right_key) {
        (Keyed::Key(a), Keyed::Key(b)) if a == b => {
            writeln!(out, "{} {}", "equivalent".green(), a)?;
            Ok(Outcome::Success)
        }
        (Keyed::Key(a), Keyed::Key(b)) => {
            writeln!(out, "{}", "different".red())?;
            writeln!(out, "  {}: {}", left.display(), a)?;
            writeln!(out, "  {}: {}", right.display(), b)?;
            Ok(Outcome::Negative)
        }
        (l, r) => {
            for (path, keyed) in [(left, l), (right, r)] {
                if let Keyed::NotCacheable(e) = keyed {
                    writeln!(out, "{} {}: {}", "not cacheable:".yellow(), path.display(), e)?;
                }
            }
            Ok(Outcome::Negative)
        }
    }
}

// ============================================================================
// validate
// ============================================================================

/// Run the default validation rules over a tree file
pub fn validate(out: &mut dyn Write, file: &Path) -> anyhow::Result<Outcome> {
    let tree = load(file)?;
    let result = Validator::with_default_rules().validate(&tree);

    for error in &result.errors {
        writeln!(out, "{} {}", "error:".red(), error)?;
    }
    for warning in &result.warnings {
        writeln!(out, "{} {}", "warning:".yellow(), warning)?;
    }

    if result.valid {
        writeln!(
            out,
            "{} {} ({} nodes, {} warning(s))",
            "valid".green(),
            file.display(),
            tree.node_count(),
            result.warnings.len()
        )?;
        Ok(Outcome::Success)
    } else {
        writeln!(
            out,
            "{} {} ({} error(s))",
            "invalid".red(),
            file.display(),
            result.errors.len()
        )?;
        Ok(Outcome::Negative)
    }
}

// ============================================================================
// kinds
// ============================================================================

/// Print the node-kind table
pub fn kinds(out: &mut dyn Write) -> anyhow::Result<Outcome> {
    for kind in ExprKind::ALL {
        writeln!(out, "{:>2}  {:<24}{}", kind.index(), kind.name(), token(kind))?;
    }
    Ok(Outcome::Success)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use plankey_core::{PrimitiveTypeKind, TypeUsage};
    use plankey_ir::{entity_set, primitive, save_tree};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn lenient() -> KeyGenConfig {
        KeyGenConfig::default().allow_generated_aliases()
    }

    fn open_orders(status: &str) -> Expr {
        let input = Expr::scan(entity_set("Shop", "Orders", "Shop.Order")).bind_as("o");
        let property = input
            .variable_ref()
            .property("Status", primitive(PrimitiveTypeKind::String));
        input.filter(property.equal(Expr::constant(status)))
    }

    fn write_tree(dir: &TempDir, name: &str, tree: &Expr) -> std::path::PathBuf {
        let path = dir.path().join(name);
        save_tree(tree, &path).unwrap();
        path
    }

    fn text(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_key_prints_the_key() {
        colored::control::set_override(false);
        let dir = TempDir::new().unwrap();
        let path = write_tree(&dir, "open.json", &open_orders("Open"));

        let mut buf = Vec::new();
        let outcome = key(&mut buf, &path, false, lenient()).unwrap();
        assert_eq!(outcome, Outcome::Success);
        assert!(text(buf).starts_with("[Filter](BV'o'="));
    }

    #[test]
    fn test_key_json_report_for_uncacheable_tree() {
        let dir = TempDir::new().unwrap();
        let tree = Expr::extension("FullTextMatch", TypeUsage::boolean(), vec![]);
        let path = write_tree(&dir, "ext.json", &tree);

        let mut buf = Vec::new();
        let outcome = key(&mut buf, &path, true, lenient()).unwrap();
        assert_eq!(outcome, Outcome::Negative);

        let report: serde_json::Value = serde_json::from_str(&text(buf)).unwrap();
        assert_eq!(report["cacheable"], false);
        assert_eq!(report["nodes"], 1);
        assert!(report.get("key").is_none());
        assert!(report["reason"].as_str().unwrap().contains("FullTextMatch"));
    }

    #[test]
    fn test_compare() {
        let dir = TempDir::new().unwrap();
        let a = write_tree(&dir, "a.json", &open_orders("Open"));
        let b = write_tree(&dir, "b.json", &open_orders("Open"));
        let c = write_tree(&dir, "c.json", &open_orders("Closed"));

        let mut buf = Vec::new();
        assert_eq!(compare(&mut buf, &a, &b, lenient()).unwrap(), Outcome::Success);
        let mut buf = Vec::new();
        assert_eq!(compare(&mut buf, &a, &c, lenient()).unwrap(), Outcome::Negative);
        assert!(text(buf).contains("different"));
    }

    #[test]
    fn test_validate_reports_errors() {
        let dir = TempDir::new().unwrap();
        let path = write_tree(&dir, "in.json", &Expr::constant(1).in_list(vec![]));

        let mut buf = Vec::new();
        assert_eq!(validate(&mut buf, &path).unwrap(), Outcome::Negative);
        assert!(text(buf).contains("IN list cannot be empty"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let mut buf = Vec::new();
        let err = key(&mut buf, Path::new("/nonexistent/tree.json"), false, lenient()).unwrap_err();
        assert!(err.to_string().contains("reading tree"));
    }

    #[test]
    fn test_kinds_lists_every_kind() {
        let mut buf = Vec::new();
        kinds(&mut buf).unwrap();
        let listing = text(buf);
        assert_eq!(listing.lines().count(), ExprKind::COUNT);
        assert!(listing.contains("LeftOuterJoin"));
        assert!(listing.lines().any(|l| l.ends_with("LOJ")));
    }

    #[test]
    fn test_contract_violation_is_an_error() {
        let dir = TempDir::new().unwrap();
        let tree = Expr::new(
            TypeUsage::entity("Shop.Order"),
            plankey_ir::ExprBody::Ref {
                entity_set: entity_set("Shop", "Orders", "Shop.Order"),
                argument: Box::new(Expr::constant(1)),
            },
        );
        let path = write_tree(&dir, "ref.json", &tree);
        let mut buf = Vec::new();
        assert!(key(&mut buf, &path, false, lenient()).is_err());
    }
}
