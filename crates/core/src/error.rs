//! Error types for plankey
//!
//! This module provides unified error handling across the workspace. Key
//! generation failures come in two tiers: *unsupported* input, which callers
//! are expected to recover from by skipping the plan cache, and *contract
//! violations*, which indicate a defect in whoever built the tree.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for plankey
#[derive(Debug, Error)]
pub enum PlanKeyError {
    // ========================================================================
    // Unsupported Input (recoverable)
    // ========================================================================
    /// The tree contains a node kind the key generator has no rule for
    #[error("Unsupported expression kind: {0}")]
    UnsupportedExpression(String),

    /// A constant cannot be rendered deterministically
    #[error("Unsupported constant of kind '{kind}': {reason}")]
    UnsupportedConstant { kind: String, reason: String },

    /// The tree is nested deeper than the configured limit
    #[error("Expression tree exceeds the maximum depth of {limit}")]
    DepthLimitExceeded { limit: usize },

    // ========================================================================
    // Contract Violations (programmer error)
    // ========================================================================
    /// The tree breaks a structural rule its producer must uphold
    #[error("Contract violation in {node}: {message}")]
    ContractViolation { node: String, message: String },

    /// A variable name was produced by the non-deterministic alias generator
    #[error("Variable name '{0}' comes from the default alias generator and is not stable")]
    ReservedVariableName(String),

    // ========================================================================
    // Validation Errors
    // ========================================================================
    /// Structural validation of a tree failed
    #[error("Validation error: {0}")]
    Validation(String),

    // ========================================================================
    // IO Errors
    // ========================================================================
    /// File IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File read error
    #[error("Failed to read file '{path}': {message}")]
    FileRead { path: PathBuf, message: String },

    /// File write error
    #[error("Failed to write file '{path}': {message}")]
    FileWrite { path: PathBuf, message: String },

    /// Tree file not found
    #[error("Tree file not found at path: {0}")]
    TreeNotFound(PathBuf),

    // ========================================================================
    // Serialization Errors
    // ========================================================================
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    /// Configuration file could not be parsed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] toml::de::Error),

    /// Schema version mismatch
    #[error("Schema version mismatch: expected at most {expected}, found {found}")]
    SchemaVersionMismatch { expected: u32, found: u32 },

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Generic error with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },
}

impl PlanKeyError {
    /// Create an unsupported-expression error
    pub fn unsupported(kind: impl Into<String>) -> Self {
        PlanKeyError::UnsupportedExpression(kind.into())
    }

    /// Create an unsupported-constant error
    pub fn unsupported_constant(kind: impl Into<String>, reason: impl Into<String>) -> Self {
        PlanKeyError::UnsupportedConstant {
            kind: kind.into(),
            reason: reason.into(),
        }
    }

    /// Create a contract violation error
    pub fn contract(node: impl Into<String>, msg: impl Into<String>) -> Self {
        PlanKeyError::ContractViolation {
            node: node.into(),
            message: msg.into(),
        }
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        PlanKeyError::Validation(msg.into())
    }

    /// Create an error with context
    pub fn with_context(context: impl Into<String>, msg: impl Into<String>) -> Self {
        PlanKeyError::WithContext {
            context: context.into(),
            message: msg.into(),
        }
    }

    /// Check if the tree simply cannot be keyed (callers fall back to no caching)
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            PlanKeyError::UnsupportedExpression(_)
                | PlanKeyError::UnsupportedConstant { .. }
                | PlanKeyError::DepthLimitExceeded { .. }
        )
    }

    /// Check if this error is a contract violation by the tree's producer
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            PlanKeyError::ContractViolation { .. } | PlanKeyError::ReservedVariableName(_)
        )
    }

    /// Check if this error is an IO error
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            PlanKeyError::Io(_)
                | PlanKeyError::FileRead { .. }
                | PlanKeyError::FileWrite { .. }
                | PlanKeyError::TreeNotFound(_)
        )
    }
}

/// Result type alias using PlanKeyError
pub type PlanKeyResult<T> = Result<T, PlanKeyError>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn with_context<C: Into<String>>(self, context: C) -> PlanKeyResult<T>;
}

impl<T, E: Into<PlanKeyError>> ResultExt<T> for Result<T, E> {
    fn with_context<C: Into<String>>(self, context: C) -> PlanKeyResult<T> {
        self.map_err(|e| {
            let err: PlanKeyError = e.into();
            PlanKeyError::WithContext {
                context: context.into(),
                message: err.to_string(),
            }
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
