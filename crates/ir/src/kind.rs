//! The closed enumeration of expression node kinds
//!
//! Several tree variants share a body shape but differ in kind (comparisons,
//! arithmetic, joins, applies, quantifiers, the `Only` type tests). The kind
//! is what the key generator writes as a node's tag.

use serde::{Deserialize, Serialize};

/// Kind of an expression node
///
/// Discriminants are dense, starting at zero, in declaration order; tables
/// indexed by `kind as usize` rely on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExprKind {
    All,
    And,
    Any,
    Case,
    Cast,
    Constant,
    CrossApply,
    CrossJoin,
    Deref,
    Distinct,
    Divide,
    Element,
    EntityRef,
    Equals,
    Except,
    Filter,
    FullOuterJoin,
    Function,
    GreaterThan,
    GreaterThanOrEquals,
    GroupBy,
    InnerJoin,
    Intersect,
    IsEmpty,
    IsNull,
    IsOf,
    IsOfOnly,
    LeftOuterJoin,
    LessThan,
    LessThanOrEquals,
    Like,
    Limit,
    Minus,
    Modulo,
    Multiply,
    NewInstance,
    Not,
    NotEquals,
    Null,
    OfType,
    OfTypeOnly,
    Or,
    OuterApply,
    ParameterReference,
    Plus,
    Project,
    Property,
    Ref,
    RefKey,
    RelationshipNavigation,
    Scan,
    Skip,
    Sort,
    Treat,
    UnaryMinus,
    UnionAll,
    VariableReference,
    Lambda,
    In,
}

impl ExprKind {
    /// Number of kinds
    pub const COUNT: usize = 59;

    /// Every kind, in discriminant order
    pub const ALL: [ExprKind; ExprKind::COUNT] = [
        ExprKind::All,
        ExprKind::And,
        ExprKind::Any,
        ExprKind::Case,
        ExprKind::Cast,
        ExprKind::Constant,
        ExprKind::CrossApply,
        ExprKind::CrossJoin,
        ExprKind::Deref,
        ExprKind::Distinct,
        ExprKind::Divide,
        ExprKind::Element,
        ExprKind::EntityRef,
        ExprKind::Equals,
        ExprKind::Except,
        ExprKind::Filter,
        ExprKind::FullOuterJoin,
        ExprKind::Function,
        ExprKind::GreaterThan,
        ExprKind::GreaterThanOrEquals,
        ExprKind::GroupBy,
        ExprKind::InnerJoin,
        ExprKind::Intersect,
        ExprKind::IsEmpty,
        ExprKind::IsNull,
        ExprKind::IsOf,
        ExprKind::IsOfOnly,
        ExprKind::LeftOuterJoin,
        ExprKind::LessThan,
        ExprKind::LessThanOrEquals,
        ExprKind::Like,
        ExprKind::Limit,
        ExprKind::Minus,
        ExprKind::Modulo,
        ExprKind::Multiply,
        ExprKind::NewInstance,
        ExprKind::Not,
        ExprKind::NotEquals,
        ExprKind::Null,
        ExprKind::OfType,
        ExprKind::OfTypeOnly,
        ExprKind::Or,
        ExprKind::OuterApply,
        ExprKind::ParameterReference,
        ExprKind::Plus,
        ExprKind::Project,
        ExprKind::Property,
        ExprKind::Ref,
        ExprKind::RefKey,
        ExprKind::RelationshipNavigation,
        ExprKind::Scan,
        ExprKind::Skip,
        ExprKind::Sort,
        ExprKind::Treat,
        ExprKind::UnaryMinus,
        ExprKind::UnionAll,
        ExprKind::VariableReference,
        ExprKind::Lambda,
        ExprKind::In,
    ];

    /// Position of this kind in [`ExprKind::ALL`]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Enumerant name
    pub const fn name(&self) -> &'static str {
        match self {
            ExprKind::All => "All",
            ExprKind::And => "And",
            ExprKind::Any => "Any",
            ExprKind::Case => "Case",
            ExprKind::Cast => "Cast",
            ExprKind::Constant => "Constant",
            ExprKind::CrossApply => "CrossApply",
            ExprKind::CrossJoin => "CrossJoin",
            ExprKind::Deref => "Deref",
            ExprKind::Distinct => "Distinct",
            ExprKind::Divide => "Divide",
            ExprKind::Element => "Element",
            ExprKind::EntityRef => "EntityRef",
            ExprKind::Equals => "Equals",
            ExprKind::Except => "Except",
            ExprKind::Filter => "Filter",
            ExprKind::FullOuterJoin => "FullOuterJoin",
            ExprKind::Function => "Function",
            ExprKind::GreaterThan => "GreaterThan",
            ExprKind::GreaterThanOrEquals => "GreaterThanOrEquals",
            ExprKind::GroupBy => "GroupBy",
            ExprKind::InnerJoin => "InnerJoin",
            ExprKind::Intersect => "Intersect",
            ExprKind::IsEmpty => "IsEmpty",
            ExprKind::IsNull => "IsNull",
            ExprKind::IsOf => "IsOf",
            ExprKind::IsOfOnly => "IsOfOnly",
            ExprKind::LeftOuterJoin => "LeftOuterJoin",
            ExprKind::LessThan => "LessThan",
            ExprKind::LessThanOrEquals => "LessThanOrEquals",
            ExprKind::Like => "Like",
            ExprKind::Limit => "Limit",
            ExprKind::Minus => "Minus",
            ExprKind::Modulo => "Modulo",
            ExprKind::Multiply => "Multiply",
            ExprKind::NewInstance => "NewInstance",
            ExprKind::Not => "Not",
            ExprKind::NotEquals => "NotEquals",
            ExprKind::Null => "Null",
            ExprKind::OfType => "OfType",
            ExprKind::OfTypeOnly => "OfTypeOnly",
            ExprKind::Or => "Or",
            ExprKind::OuterApply => "OuterApply",
            ExprKind::ParameterReference => "ParameterReference",
            ExprKind::Plus => "Plus",
            ExprKind::Project => "Project",
            ExprKind::Property => "Property",
            ExprKind::Ref => "Ref",
            ExprKind::RefKey => "RefKey",
            ExprKind::RelationshipNavigation => "RelationshipNavigation",
            ExprKind::Scan => "Scan",
            ExprKind::Skip => "Skip",
            ExprKind::Sort => "Sort",
            ExprKind::Treat => "Treat",
            ExprKind::UnaryMinus => "UnaryMinus",
            ExprKind::UnionAll => "UnionAll",
            ExprKind::VariableReference => "VariableReference",
            ExprKind::Lambda => "Lambda",
            ExprKind::In => "In",
        }
    }
}

impl std::fmt::Display for ExprKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Operator Families
// ============================================================================

/// The six relational comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOp {
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEquals,
    GreaterThan,
    GreaterThanOrEquals,
}

impl ComparisonOp {
    pub fn kind(&self) -> ExprKind {
        match self {
            ComparisonOp::Equals => ExprKind::Equals,
            ComparisonOp::NotEquals => ExprKind::NotEquals,
            ComparisonOp::LessThan => ExprKind::LessThan,
            ComparisonOp::LessThanOrEquals => ExprKind::LessThanOrEquals,
            ComparisonOp::GreaterThan => ExprKind::GreaterThan,
            ComparisonOp::GreaterThanOrEquals => ExprKind::GreaterThanOrEquals,
        }
    }
}

/// Arithmetic operators; `UnaryMinus` takes one argument, the rest two
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithmeticOp {
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
    UnaryMinus,
}

impl ArithmeticOp {
    pub fn kind(&self) -> ExprKind {
        match self {
            ArithmeticOp::Plus => ExprKind::Plus,
            ArithmeticOp::Minus => ExprKind::Minus,
            ArithmeticOp::Multiply => ExprKind::Multiply,
            ArithmeticOp::Divide => ExprKind::Divide,
            ArithmeticOp::Modulo => ExprKind::Modulo,
            ArithmeticOp::UnaryMinus => ExprKind::UnaryMinus,
        }
    }

    /// Number of arguments the operator takes
    pub fn arity(&self) -> usize {
        match self {
            ArithmeticOp::UnaryMinus => 1,
            _ => 2,
        }
    }
}

/// Join flavours with an explicit join condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinKind {
    Inner,
    LeftOuter,
    FullOuter,
}

impl JoinKind {
    pub fn kind(&self) -> ExprKind {
        match self {
            JoinKind::Inner => ExprKind::InnerJoin,
            JoinKind::LeftOuter => ExprKind::LeftOuterJoin,
            JoinKind::FullOuter => ExprKind::FullOuterJoin,
        }
    }
}

/// Correlated apply flavours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplyKind {
    Cross,
    Outer,
}

impl ApplyKind {
    pub fn kind(&self) -> ExprKind {
        match self {
            ApplyKind::Cross => ExprKind::CrossApply,
            ApplyKind::Outer => ExprKind::OuterApply,
        }
    }
}

/// Existential and universal quantifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuantifierKind {
    Any,
    All,
}

impl QuantifierKind {
    pub fn kind(&self) -> ExprKind {
        match self {
            QuantifierKind::Any => ExprKind::Any,
            QuantifierKind::All => ExprKind::All,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_discriminants_are_dense() {
        for (i, kind) in ExprKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i, "gap or reordering at {}", kind);
        }
    }

    #[test]
    fn test_names_are_unique() {
        let names: HashSet<_> = ExprKind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(names.len(), ExprKind::COUNT);
    }

    #[test]
    fn test_display_matches_name() {
        assert_eq!(ExprKind::RelationshipNavigation.to_string(), "RelationshipNavigation");
    }

    #[test]
    fn test_operator_families_map_to_kinds() {
        assert_eq!(ComparisonOp::LessThanOrEquals.kind(), ExprKind::LessThanOrEquals);
        assert_eq!(ArithmeticOp::UnaryMinus.kind(), ExprKind::UnaryMinus);
        assert_eq!(ArithmeticOp::UnaryMinus.arity(), 1);
        assert_eq!(ArithmeticOp::Modulo.arity(), 2);
        assert_eq!(JoinKind::FullOuter.kind(), ExprKind::FullOuterJoin);
        assert_eq!(ApplyKind::Outer.kind(), ExprKind::OuterApply);
        assert_eq!(QuantifierKind::All.kind(), ExprKind::All);
    }
}
