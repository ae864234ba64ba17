//! Core traits for plankey
//!
//! This module defines the small set of behaviours shared by metadata items
//! and expression trees.

use crate::error::PlanKeyResult;

// ============================================================================
// Identified Trait
// ============================================================================

/// Trait for metadata items that carry a stable identity
///
/// An identity is a fully qualified string that names exactly one metadata
/// item for the lifetime of the process. Key generation embeds identities
/// verbatim, so two items with equal identities are interchangeable as far
/// as caching is concerned.
pub trait Identified {
    /// The item's identity
    fn identity(&self) -> &str;
}

// ============================================================================
// Validatable Trait
// ============================================================================

/// Trait for types that can be validated
///
/// Types implementing this trait can check their internal consistency
/// and return validation errors if the state is invalid.
///
/// # Example
///
/// ```rust,ignore
/// use plankey_core::{PlanKeyError, PlanKeyResult, Validatable};
///
/// struct Binding {
///     name: String,
/// }
///
/// impl Validatable for Binding {
///     fn validate(&self) -> PlanKeyResult<()> {
///         if self.name.is_empty() {
///             return Err(PlanKeyError::validation("Variable name cannot be empty"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Validatable {
    /// Validate the current state of the object
    ///
    /// Returns `Ok(())` if valid, or a `PlanKeyError` describing the problem.
    fn validate(&self) -> PlanKeyResult<()>;

    /// Check if the object is valid without returning error details
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Get all validation errors (for types that can have multiple errors)
    fn validation_errors(&self) -> Vec<String> {
        match self.validate() {
            Ok(()) => vec![],
            Err(e) => vec![e.to_string()],
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
