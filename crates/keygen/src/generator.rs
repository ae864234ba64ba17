//! # Key Generation Entry Points
//!
//! [`KeyGenerator`] holds a [`KeyGenConfig`] and runs a fresh
//! [`ExpressionKeyGen`] per tree. It sorts failures into the two tiers
//! callers care about:
//!
//! ```text
//! Expr
//!   │
//!   ▼
//! ExpressionKeyGen::visit()
//!   │
//!   ├──► Ok                         → Ok(Some(CacheKey))
//!   ├──► unsupported / too deep     → Ok(None)   (run uncached)
//!   └──► contract violation         → Err(..)    (producer defect)
//! ```

use plankey_core::PlanKeyResult;
use plankey_ir::Expr;

use crate::visitor::ExpressionKeyGen;
use crate::{CacheKey, KeyGenConfig};

// ============================================================================
// KeyGenerator
// ============================================================================

/// Produces cache keys for expression trees
///
/// Stateless aside from its configuration; one generator may key any number
/// of trees, from any number of threads.
#[derive(Debug, Clone, Default)]
pub struct KeyGenerator {
    config: KeyGenConfig,
}

impl KeyGenerator {
    /// Create a generator with the given configuration
    pub fn new(config: KeyGenConfig) -> Self {
        Self { config }
    }

    /// Create a generator with default configuration
    pub fn with_defaults() -> Self {
        Self::new(KeyGenConfig::default())
    }

    /// Get the current configuration
    pub fn config(&self) -> &KeyGenConfig {
        &self.config
    }

    /// Replace the configuration
    pub fn set_config(&mut self, config: KeyGenConfig) {
        self.config = config;
    }

    /// Key a tree, reporting every failure as an error
    pub fn generate(&self, tree: &Expr) -> PlanKeyResult<CacheKey> {
        let mut keygen = ExpressionKeyGen::new(&self.config);
        keygen.visit(tree)?;
        Ok(CacheKey::new(keygen.into_key()))
    }

    /// Key a tree, or `Ok(None)` when it cannot be keyed deterministically
    ///
    /// # Errors
    ///
    /// Contract violations by the tree's producer (a reference constructor
    /// without a reference type, a reserved alias name in strict mode).
    pub fn try_generate(&self, tree: &Expr) -> PlanKeyResult<Option<CacheKey>> {
        match self.generate(tree) {
            Ok(key) => {
                tracing::trace!(len = key.len(), "generated cache key");
                Ok(Some(key))
            }
            Err(e) if e.is_unsupported() => {
                let root = tree.label();
                tracing::debug!(reason = %e, root = %root, "expression tree is not cacheable");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

// ============================================================================
// Standalone Functions
// ============================================================================

/// Key a tree with default configuration; `Ok(None)` when not cacheable
pub fn try_generate_key(tree: &Expr) -> PlanKeyResult<Option<CacheKey>> {
    KeyGenerator::with_defaults().try_generate(tree)
}

/// Key a tree with default configuration, failing on unsupported input
pub fn generate_key(tree: &Expr) -> PlanKeyResult<CacheKey> {
    KeyGenerator::with_defaults().generate(tree)
}

// ============================================================================
// Tests
// ============================================================================
