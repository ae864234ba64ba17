//! # Plankey IR
//!
//! Typed representation of compiled query command trees.
//!
//! A tree is built from immutable [`Expr`] nodes, each carrying a result type
//! and an [`ExprBody`]. The node kinds form a closed set ([`ExprKind`]) with
//! one escape hatch, [`ExprBody::Extension`], for provider-specific nodes.
//!
//! ## Core Concepts
//!
//! - **Expr**: A node with a result type and an operation
//! - **Binding**: An iteration variable bound over a collection input
//! - **ConstantValue**: The runtime payload of a literal
//! - **TreeFile**: The versioned on-disk form of a tree
//! - **Validator**: Structural checks a producer must pass before keying
//!

// Module declarations
pub mod builder;
pub mod expr;
pub mod kind;
pub mod literal;
pub mod serialization;
pub mod validation;

// Re-export commonly used types at crate root
pub use builder::{entity_set, primitive};
pub use expr::{
    Aggregate, Binding, CaseArm, Expr, ExprBody, GroupBinding, LambdaVariable, RelatedEntityRef,
    SortClause,
};
pub use kind::{ApplyKind, ArithmeticOp, ComparisonOp, ExprKind, JoinKind, QuantifierKind};
pub use literal::{ConstantValue, SpatialValue};
pub use serialization::{TreeFile, load_tree, load_tree_from_string, save_tree, save_tree_to_string};
pub use validation::{
    GENERATED_ALIAS_PREFIX, ValidationError, ValidationResult, ValidationRule, ValidationWarning,
    Validator, is_generated_alias,
};

// Re-export core types that are commonly used with IR
pub use plankey_core::{
    EdmFunction, EdmMember, EdmType, EdmTypeKind, EntitySet, Facet, PlanKeyError, PlanKeyResult,
    PrimitiveTypeKind, RelationshipEnd, TypeUsage,
};

/// Current schema version for tree files
pub const SCHEMA_VERSION: u32 = 1;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Prelude Module
// ============================================================================

/// Convenient re-exports for building trees
pub mod prelude {
    pub use crate::{
        Aggregate,
        ArithmeticOp,
        Binding,
        ComparisonOp,
        ConstantValue,
        // Metadata
        EdmFunction,
        EdmType,
        EntitySet,
        // Tree
        Expr,
        ExprBody,
        ExprKind,
        JoinKind,
        PrimitiveTypeKind,
        RelationshipEnd,
        SortClause,
        TypeUsage,
        // Builder helpers
        entity_set,
        primitive,
    };
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_version() {
        assert_eq!(SCHEMA_VERSION, 1);
    }

    #[test]
    fn test_prelude_builds_a_tree() {
        use crate::prelude::*;

        let input = Expr::scan(entity_set("Shop", "Orders", "Shop.Order")).bind_as("o");
        let id = input
            .variable_ref()
            .property("Id", primitive(PrimitiveTypeKind::Int32));
        let tree = input.project(id);
        assert_eq!(tree.kind(), Some(ExprKind::Project));
    }
}
