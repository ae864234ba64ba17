//! Serialization and deserialization of expression tree files
//!
//! This module provides functionality for saving and loading command trees
//! as JSON, including a versioned file wrapper and schema version checks.

use crate::{Expr, SCHEMA_VERSION};
use plankey_core::{PlanKeyError, PlanKeyResult, ResultExt};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ============================================================================
// Tree File Wrapper
// ============================================================================

/// Wrapper for tree files that includes version information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeFile {
    /// Schema version of the tree encoding
    pub schema_version: u32,

    /// The expression tree
    pub tree: Expr,
}

impl TreeFile {
    /// Create a new tree file for an expression tree
    pub fn new(tree: Expr) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            tree,
        }
    }
}

// ============================================================================
// Save Functions
// ============================================================================

/// Save a tree to a file
///
/// # Example
///
/// ```rust,ignore
/// use plankey_ir::{Expr, save_tree};
///
/// let tree = Expr::constant(42);
/// save_tree(&tree, "answer.json").unwrap();
/// ```
pub fn save_tree(tree: &Expr, path: impl AsRef<Path>) -> PlanKeyResult<()> {
    let path = path.as_ref();
    let json = save_tree_to_string(tree).map_err(|e| PlanKeyError::FileWrite {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| PlanKeyError::FileWrite {
                path: parent.to_path_buf(),
                message: e.to_string(),
            })?;
        }
    }

    std::fs::write(path, json).map_err(|e| PlanKeyError::FileWrite {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    Ok(())
}

/// Save a tree to a pretty-printed JSON string
pub fn save_tree_to_string(tree: &Expr) -> PlanKeyResult<String> {
    let file = TreeFile::new(tree.clone());
    serde_json::to_string_pretty(&file).with_context("Encoding tree")
}

// ============================================================================
// Load Functions
// ============================================================================

/// Load a tree from a file
pub fn load_tree(path: impl AsRef<Path>) -> PlanKeyResult<Expr> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(PlanKeyError::TreeNotFound(path.to_path_buf()));
    }

    let json = std::fs::read_to_string(path).map_err(|e| PlanKeyError::FileRead {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    load_tree_from_string(&json).map_err(|e| match e {
        PlanKeyError::JsonSerialization(je) => PlanKeyError::FileRead {
            path: path.to_path_buf(),
            message: format!("Invalid tree file format: {}", je),
        },
        other => other,
    })
}

/// Load a tree from a JSON string
///
/// Accepts either a versioned [`TreeFile`] or a bare tree. A document with a
/// `schema_version` key is always read as a [`TreeFile`], so errors in its
/// tree are reported as such.
pub fn load_tree_from_string(json: &str) -> PlanKeyResult<Expr> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let Some(version) = value.get("schema_version") else {
        return Ok(serde_json::from_value(value)?);
    };

    check_schema_version(u32::deserialize(version)?)?;
    let file: TreeFile = serde_json::from_value(value)?;
    Ok(file.tree)
}

fn check_schema_version(found: u32) -> PlanKeyResult<()> {
    if found > SCHEMA_VERSION {
        return Err(PlanKeyError::SchemaVersionMismatch {
            expected: SCHEMA_VERSION,
            found,
        });
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::entity_set;
    use plankey_core::{PrimitiveTypeKind, TypeUsage};
    use tempfile::TempDir;

    fn sample_tree() -> Expr {
        let input = Expr::scan(entity_set("Shop", "Orders", "Shop.Order")).bind_as("o");
        let status = input
            .variable_ref()
            .property("Status", TypeUsage::primitive(PrimitiveTypeKind::String));
        input.filter(status.equal(Expr::constant("Open")))
    }

    #[test]
    fn test_save_and_load_tree() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("filter.json");

        let tree = sample_tree();
        save_tree(&tree, &path).unwrap();
        assert!(path.exists());

        let loaded = load_tree(&path).unwrap();
        assert_eq!(loaded, tree);
    }

    #[test]
    fn test_bare_tree_is_accepted() {
        let tree = sample_tree();
        let bare = serde_json::to_string(&tree).unwrap();
        assert_eq!(load_tree_from_string(&bare).unwrap(), tree);
    }

    #[test]
    fn test_newer_schema_is_rejected() {
        let mut file = TreeFile::new(Expr::constant(1));
        file.schema_version = SCHEMA_VERSION + 1;
        let json = serde_json::to_string(&file).unwrap();

        match load_tree_from_string(&json) {
            Err(PlanKeyError::SchemaVersionMismatch { found, .. }) => {
                assert_eq!(found, SCHEMA_VERSION + 1)
            }
            other => panic!("Expected SchemaVersionMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = load_tree("/nonexistent/path/tree.json");
        if let Err(PlanKeyError::TreeNotFound(path)) = result {
            assert!(path.to_string_lossy().contains("nonexistent"));
        } else {
            panic!("Expected TreeNotFound error");
        }
    }

    #[test]
    fn test_invalid_json_reports_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = load_tree(&path).unwrap_err();
        assert!(err.is_io());
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_newer_schema_is_reported_before_tree_errors() {
        let json = r#"{"schema_version": 99, "tree": {"shape": "from the future"}}"#;
        assert!(matches!(
            load_tree_from_string(json),
            Err(PlanKeyError::SchemaVersionMismatch { found: 99, .. })
        ));
    }

    #[test]
    fn test_malformed_tree_in_versioned_file() {
        let json = r#"{"schema_version": 1, "tree": {"type": 7}}"#;
        let err = load_tree_from_string(json).unwrap_err();
        assert!(matches!(err, PlanKeyError::JsonSerialization(_)));
        assert!(!err.to_string().contains("schema_version"), "{}", err);
    }
}
