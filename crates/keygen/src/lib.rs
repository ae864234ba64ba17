//! # Plankey Keygen
//!
//! Canonical cache keys for expression trees.
//!
//! A key is a string built by a single walk of the tree. Two trees get the
//! same key exactly when they have the same node kinds, operand order,
//! literal values and metadata identities, so the key can be used to look up
//! a compiled plan for a structurally identical query.
//!
//! ## Features
//!
//! - **Visitor**: [`ExpressionKeyGen`] writes one tag per node kind followed by its children
//! - **Symbols**: operators and joins are written with short tokens (`+`, `<=`, `LOJ`)
//! - **Literals**: locale-independent text, quoted strings, type identity suffixes
//! - **Failure tiers**: unsupported trees yield `Ok(None)`, producer defects yield `Err`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use plankey_keygen::try_generate_key;
//!
//! match try_generate_key(&tree)? {
//!     Some(key) => cache.get_or_compile(key, || compile(&tree)),
//!     None => compile(&tree),
//! }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod generator;
pub mod literal;
pub mod symbols;
pub mod visitor;

// ============================================================================
// Re-exports
// ============================================================================

pub use generator::{KeyGenerator, generate_key, try_generate_key};
pub use symbols::{KIND_TOKENS, token};
pub use visitor::ExpressionKeyGen;

use plankey_core::{PlanKeyError, PlanKeyResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default bound on tree depth
pub const DEFAULT_MAX_DEPTH: usize = 1024;

// ============================================================================
// KeyGenConfig
// ============================================================================

/// Configuration for key generation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct KeyGenConfig {
    /// Deepest tree that will be keyed; deeper trees are not cacheable.
    /// `None` disables the bound.
    pub max_depth: Option<usize>,

    /// Treat names from the default alias generator as a producer defect
    pub reject_generated_aliases: bool,
}

impl Default for KeyGenConfig {
    fn default() -> Self {
        Self {
            max_depth: Some(DEFAULT_MAX_DEPTH),
            reject_generated_aliases: cfg!(debug_assertions),
        }
    }
}

impl KeyGenConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the depth bound
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Remove the depth bound
    pub fn without_depth_limit(mut self) -> Self {
        self.max_depth = None;
        self
    }

    /// Reject variable names from the default alias generator
    pub fn strict_aliases(mut self) -> Self {
        self.reject_generated_aliases = true;
        self
    }

    /// Accept variable names from the default alias generator
    pub fn allow_generated_aliases(mut self) -> Self {
        self.reject_generated_aliases = false;
        self
    }

    /// Parse a configuration from TOML; missing fields keep their defaults
    pub fn from_toml_str(text: &str) -> PlanKeyResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> PlanKeyResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| PlanKeyError::FileRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }
}

// ============================================================================
// CacheKey
// ============================================================================

/// Canonical key of an expression tree
///
/// Opaque to consumers: equal keys mean the trees are interchangeable for
/// plan caching, unequal keys mean they must be treated as different.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<CacheKey> for String {
    fn from(key: CacheKey) -> Self {
        key.0
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    #[test]
    fn test_config_default() {
        let config = KeyGenConfig::default();
        assert_eq!(config.max_depth, Some(DEFAULT_MAX_DEPTH));
        assert_eq!(config.reject_generated_aliases, cfg!(debug_assertions));
    }

    #[test]
    fn test_config_builder() {
        let config = KeyGenConfig::new()
            .with_max_depth(64)
            .allow_generated_aliases();
        assert_eq!(config.max_depth, Some(64));
        assert!(!config.reject_generated_aliases);

        let config = config.without_depth_limit().strict_aliases();
        assert_eq!(config.max_depth, None);
        assert!(config.reject_generated_aliases);
    }

    #[test]
    fn test_config_from_toml() {
        let config = KeyGenConfig::from_toml_str("max_depth = 32\nreject_generated_aliases = true\n")
            .unwrap();
        assert_eq!(config, KeyGenConfig::new().with_max_depth(32).strict_aliases());

        let partial = KeyGenConfig::from_toml_str("max_depth = 8").unwrap();
        assert_eq!(partial.reject_generated_aliases, cfg!(debug_assertions));

        let err = KeyGenConfig::from_toml_str("max_depth = \"deep\"").unwrap_err();
        assert!(matches!(err, PlanKeyError::InvalidConfig(_)));
    }

    #[test]
    fn test_config_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("plankey.toml");
        std::fs::write(&path, "max_depth = 16").unwrap();
        assert_eq!(KeyGenConfig::from_file(&path).unwrap().max_depth, Some(16));

        let missing = KeyGenConfig::from_file(dir.path().join("missing.toml")).unwrap_err();
        assert!(missing.is_io());
    }

    #[test]
    fn test_cache_key_behaves_like_a_string_key() {
        let a = CacheKey::new("[Scan](Shop.Orders:collection[Shop.Order])");
        let b = CacheKey::new(String::from(a.as_str()));
        assert_eq!(a, b);
        assert_eq!(a.to_string(), a.as_str());
        assert_eq!(a.len(), a.as_str().len());

        let set: HashSet<_> = [a.clone(), b].into_iter().collect();
        assert_eq!(set.len(), 1);

        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, "\"[Scan](Shop.Orders:collection[Shop.Order])\"");
        assert_eq!(String::from(a.clone()), a.into_string());
    }
}
