//! # Plankey Core
//!
//! Core types, traits, and error handling for plankey.
//!
//! This crate provides the foundational building blocks used throughout
//! the workspace, including:
//!
//! - **Types**: Metadata items referenced by expression trees (type usages,
//!   functions, entity sets, relationship ends, members)
//! - **Traits**: `Identified` for identity-bearing metadata, `Validatable`
//! - **Errors**: Unified error handling with `PlanKeyError` and `PlanKeyResult`
//!

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{PlanKeyError, PlanKeyResult, ResultExt};
pub use traits::{Identified, Validatable};
pub use types::{
    EDM_NAMESPACE, EdmFunction, EdmMember, EdmType, EdmTypeKind, EntitySet, Facet,
    PrimitiveTypeKind, RelationshipEnd, TypeUsage,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
