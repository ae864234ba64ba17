//! Expression tree definitions
//!
//! An [`Expr`] is an immutable node of a compiled query command tree: a
//! result type plus an [`ExprBody`] describing the operation. Children are
//! owned, so a tree can never contain a missing operand; the only optional
//! operand is the escape character of `LIKE`.

use crate::kind::{ApplyKind, ArithmeticOp, ComparisonOp, ExprKind, JoinKind, QuantifierKind};
use crate::literal::ConstantValue;
use plankey_core::{EdmFunction, EdmMember, EntitySet, RelationshipEnd, TypeUsage};
use serde::{Deserialize, Serialize};

// ============================================================================
// Expr
// ============================================================================

/// A typed expression tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    /// Static type of the node's result
    #[serde(rename = "type")]
    pub result_type: TypeUsage,

    /// The operation
    pub node: ExprBody,
}

/// The operation performed by an expression node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ExprBody {
    // ── leaves ───────────────────────────────────────────────────────────
    Constant {
        value: ConstantValue,
    },
    Null,
    VariableReference {
        name: String,
    },
    ParameterReference {
        name: String,
    },
    Scan {
        target: EntitySet,
    },

    // ── functions ────────────────────────────────────────────────────────
    Function {
        function: EdmFunction,
        arguments: Vec<Expr>,
    },
    Lambda {
        variables: Vec<LambdaVariable>,
        body: Box<Expr>,
        arguments: Vec<Expr>,
    },

    // ── scalar operators ─────────────────────────────────────────────────
    Property {
        instance: Box<Expr>,
        property: EdmMember,
    },
    Comparison {
        op: ComparisonOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Like {
        argument: Box<Expr>,
        pattern: Box<Expr>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        escape: Option<Box<Expr>>,
    },
    IsNull {
        argument: Box<Expr>,
    },
    Arithmetic {
        op: ArithmeticOp,
        arguments: Vec<Expr>,
    },
    And {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Or {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Not {
        argument: Box<Expr>,
    },
    In {
        item: Box<Expr>,
        list: Vec<Expr>,
    },
    Case {
        arms: Vec<CaseArm>,
        otherwise: Box<Expr>,
    },

    // ── type operators ───────────────────────────────────────────────────
    Treat {
        argument: Box<Expr>,
    },
    Cast {
        argument: Box<Expr>,
    },
    IsOf {
        argument: Box<Expr>,
        of_type: TypeUsage,
        #[serde(default)]
        only: bool,
    },
    OfType {
        argument: Box<Expr>,
        of_type: TypeUsage,
        #[serde(default)]
        only: bool,
    },

    // ── construction and references ──────────────────────────────────────
    NewInstance {
        arguments: Vec<Expr>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        related: Vec<RelatedEntityRef>,
    },
    Ref {
        entity_set: EntitySet,
        argument: Box<Expr>,
    },
    RelationshipNavigation {
        source: Box<Expr>,
        from: RelationshipEnd,
        to: RelationshipEnd,
    },
    Deref {
        argument: Box<Expr>,
    },
    RefKey {
        argument: Box<Expr>,
    },
    EntityRef {
        argument: Box<Expr>,
    },

    // ── collection operators ─────────────────────────────────────────────
    Distinct {
        argument: Box<Expr>,
    },
    Element {
        argument: Box<Expr>,
    },
    IsEmpty {
        argument: Box<Expr>,
    },
    UnionAll {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Intersect {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Except {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Limit {
        argument: Box<Expr>,
        limit: Box<Expr>,
        #[serde(default)]
        with_ties: bool,
    },

    // ── relational operators ─────────────────────────────────────────────
    Filter {
        input: Binding,
        predicate: Box<Expr>,
    },
    Project {
        input: Binding,
        projection: Box<Expr>,
    },
    CrossJoin {
        inputs: Vec<Binding>,
    },
    Join {
        join: JoinKind,
        left: Binding,
        right: Binding,
        condition: Box<Expr>,
    },
    Apply {
        apply_kind: ApplyKind,
        input: Binding,
        apply: Binding,
    },
    GroupBy {
        input: GroupBinding,
        keys: Vec<Expr>,
        aggregates: Vec<Aggregate>,
    },
    Skip {
        input: Binding,
        sort_order: Vec<SortClause>,
        count: Box<Expr>,
    },
    Sort {
        input: Binding,
        sort_order: Vec<SortClause>,
    },
    Quantifier {
        quantifier: QuantifierKind,
        input: Binding,
        predicate: Box<Expr>,
    },

    /// A provider-specific node kind outside the closed set above
    Extension {
        name: String,
        #[serde(default)]
        arguments: Vec<Expr>,
    },
}

// ============================================================================
// Supporting Structures
// ============================================================================

/// Names an iteration variable over a collection-valued expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    pub variable: String,
    pub expression: Box<Expr>,
}

/// Binding for `GroupBy`: the element variable plus the group variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupBinding {
    pub variable: String,
    pub group_variable: String,
    pub expression: Box<Expr>,
}

/// One `WHEN .. THEN ..` branch of a case expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseArm {
    pub when: Expr,
    pub then: Expr,
}

/// One key of a sort order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortClause {
    pub expression: Expr,
    pub ascending: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collation: Option<String>,
}

/// Formal parameter of an inline lambda
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LambdaVariable {
    pub name: String,
    #[serde(rename = "type")]
    pub result_type: TypeUsage,
}

/// A related-end reference attached to an entity constructor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedEntityRef {
    pub source_end: RelationshipEnd,
    pub target_end: RelationshipEnd,
    pub target_entity_ref: Box<Expr>,
}

/// An aggregate computed by `GroupBy`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "aggregate")]
pub enum Aggregate {
    /// Aggregate function such as `Count` or `Sum`
    Function {
        function: EdmFunction,
        #[serde(default)]
        distinct: bool,
        arguments: Vec<Expr>,
    },
    /// The group partition itself
    Group { argument: Box<Expr> },
}

// ============================================================================
// Introspection
// ============================================================================

impl Expr {
    /// Create a node from its parts
    pub fn new(result_type: TypeUsage, node: ExprBody) -> Self {
        Self { result_type, node }
    }

    /// Kind of the node; `None` for extension nodes
    pub fn kind(&self) -> Option<ExprKind> {
        let kind = match &self.node {
            ExprBody::Constant { .. } => ExprKind::Constant,
            ExprBody::Null => ExprKind::Null,
            ExprBody::VariableReference { .. } => ExprKind::VariableReference,
            ExprBody::ParameterReference { .. } => ExprKind::ParameterReference,
            ExprBody::Scan { .. } => ExprKind::Scan,
            ExprBody::Function { .. } => ExprKind::Function,
            ExprBody::Lambda { .. } => ExprKind::Lambda,
            ExprBody::Property { .. } => ExprKind::Property,
            ExprBody::Comparison { op, .. } => op.kind(),
            ExprBody::Like { .. } => ExprKind::Like,
            ExprBody::IsNull { .. } => ExprKind::IsNull,
            ExprBody::Arithmetic { op, .. } => op.kind(),
            ExprBody::And { .. } => ExprKind::And,
            ExprBody::Or { .. } => ExprKind::Or,
            ExprBody::Not { .. } => ExprKind::Not,
            ExprBody::In { .. } => ExprKind::In,
            ExprBody::Case { .. } => ExprKind::Case,
            ExprBody::Treat { .. } => ExprKind::Treat,
            ExprBody::Cast { .. } => ExprKind::Cast,
            ExprBody::IsOf { only: false, .. } => ExprKind::IsOf,
            ExprBody::IsOf { only: true, .. } => ExprKind::IsOfOnly,
            ExprBody::OfType { only: false, .. } => ExprKind::OfType,
            ExprBody::OfType { only: true, .. } => ExprKind::OfTypeOnly,
            ExprBody::NewInstance { .. } => ExprKind::NewInstance,
            ExprBody::Ref { .. } => ExprKind::Ref,
            ExprBody::RelationshipNavigation { .. } => ExprKind::RelationshipNavigation,
            ExprBody::Deref { .. } => ExprKind::Deref,
            ExprBody::RefKey { .. } => ExprKind::RefKey,
            ExprBody::EntityRef { .. } => ExprKind::EntityRef,
            ExprBody::Distinct { .. } => ExprKind::Distinct,
            ExprBody::Element { .. } => ExprKind::Element,
            ExprBody::IsEmpty { .. } => ExprKind::IsEmpty,
            ExprBody::UnionAll { .. } => ExprKind::UnionAll,
            ExprBody::Intersect { .. } => ExprKind::Intersect,
            ExprBody::Except { .. } => ExprKind::Except,
            ExprBody::Limit { .. } => ExprKind::Limit,
            ExprBody::Filter { .. } => ExprKind::Filter,
            ExprBody::Project { .. } => ExprKind::Project,
            ExprBody::CrossJoin { .. } => ExprKind::CrossJoin,
            ExprBody::Join { join, .. } => join.kind(),
            ExprBody::Apply { apply_kind, .. } => apply_kind.kind(),
            ExprBody::GroupBy { .. } => ExprKind::GroupBy,
            ExprBody::Skip { .. } => ExprKind::Skip,
            ExprBody::Sort { .. } => ExprKind::Sort,
            ExprBody::Quantifier { quantifier, .. } => quantifier.kind(),
            ExprBody::Extension { .. } => return None,
        };
        Some(kind)
    }

    /// Human-readable node label for diagnostics
    pub fn label(&self) -> String {
        match (&self.node, self.kind()) {
            (ExprBody::Extension { name, .. }, _) => format!("Extension({})", name),
            (_, Some(kind)) => kind.name().to_string(),
            (_, None) => "Unknown".to_string(),
        }
    }

    /// Direct children in field order
    pub fn children(&self) -> Vec<&Expr> {
        fn b(binding: &Binding) -> &Expr {
            &binding.expression
        }

        match &self.node {
            ExprBody::Constant { .. }
            | ExprBody::Null
            | ExprBody::VariableReference { .. }
            | ExprBody::ParameterReference { .. }
            | ExprBody::Scan { .. } => Vec::new(),
            ExprBody::Function { arguments, .. }
            | ExprBody::Arithmetic { arguments, .. }
            | ExprBody::Extension { arguments, .. } => arguments.iter().collect(),
            ExprBody::Lambda {
                body, arguments, ..
            } => arguments.iter().chain(std::iter::once(&**body)).collect(),
            ExprBody::Property { instance, .. } => vec![&**instance],
            ExprBody::Comparison { left, right, .. }
            | ExprBody::And { left, right }
            | ExprBody::Or { left, right }
            | ExprBody::UnionAll { left, right }
            | ExprBody::Intersect { left, right }
            | ExprBody::Except { left, right } => vec![&**left, &**right],
            ExprBody::Like {
                argument,
                pattern,
                escape,
            } => {
                let mut out: Vec<&Expr> = vec![&**argument, &**pattern];
                if let Some(escape) = escape {
                    out.push(&**escape);
                }
                out
            }
            ExprBody::IsNull { argument }
            | ExprBody::Not { argument }
            | ExprBody::Treat { argument }
            | ExprBody::Cast { argument }
            | ExprBody::IsOf { argument, .. }
            | ExprBody::OfType { argument, .. }
            | ExprBody::Ref { argument, .. }
            | ExprBody::Deref { argument }
            | ExprBody::RefKey { argument }
            | ExprBody::EntityRef { argument }
            | ExprBody::Distinct { argument }
            | ExprBody::Element { argument }
            | ExprBody::IsEmpty { argument } => vec![&**argument],
            ExprBody::In { item, list } => std::iter::once(&**item).chain(list.iter()).collect(),
            ExprBody::Case { arms, otherwise } => arms
                .iter()
                .flat_map(|arm| [&arm.when, &arm.then])
                .chain(std::iter::once(&**otherwise))
                .collect(),
            ExprBody::NewInstance { arguments, related } => arguments
                .iter()
                .chain(related.iter().map(|r| &*r.target_entity_ref))
                .collect(),
            ExprBody::RelationshipNavigation { source, .. } => vec![&**source],
            ExprBody::Limit {
                argument, limit, ..
            } => vec![&**argument, &**limit],
            ExprBody::Filter { input, predicate } => vec![b(input), &**predicate],
            ExprBody::Project { input, projection } => vec![b(input), &**projection],
            ExprBody::CrossJoin { inputs } => inputs.iter().map(b).collect(),
            ExprBody::Join {
                left,
                right,
                condition,
                ..
            } => vec![b(left), b(right), &**condition],
            ExprBody::Apply { input, apply, .. } => vec![b(input), b(apply)],
            ExprBody::GroupBy {
                input,
                keys,
                aggregates,
            } => {
                let mut out: Vec<&Expr> = vec![&*input.expression];
                out.extend(keys.iter());
                for aggregate in aggregates {
                    match aggregate {
                        Aggregate::Function { arguments, .. } => out.extend(arguments.iter()),
                        Aggregate::Group { argument } => out.push(&**argument),
                    }
                }
                out
            }
            ExprBody::Skip {
                input,
                sort_order,
                count,
            } => std::iter::once(b(input))
                .chain(sort_order.iter().map(|c| &c.expression))
                .chain(std::iter::once(&**count))
                .collect(),
            ExprBody::Sort { input, sort_order } => std::iter::once(b(input))
                .chain(sort_order.iter().map(|c| &c.expression))
                .collect(),
            ExprBody::Quantifier {
                input, predicate, ..
            } => vec![b(input), &**predicate],
        }
    }

    /// Number of nodes in the tree
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(expr) = stack.pop() {
            count += 1;
            stack.extend(expr.children());
        }
        count
    }

    /// Length of the longest root-to-leaf path, counting nodes
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((expr, level)) = stack.pop() {
            deepest = deepest.max(level);
            stack.extend(expr.children().into_iter().map(|c| (c, level + 1)));
        }
        deepest
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use plankey_core::{EdmType, PrimitiveTypeKind};

    fn int(v: i32) -> Expr {
        Expr::new(
            TypeUsage::primitive(PrimitiveTypeKind::Int32),
            ExprBody::Constant {
                value: ConstantValue::Int32(v),
            },
        )
    }

    #[test]
    fn test_kind_follows_operator() {
        let expr = Expr::new(
            TypeUsage::boolean(),
            ExprBody::Comparison {
                op: ComparisonOp::GreaterThan,
                left: Box::new(int(1)),
                right: Box::new(int(2)),
            },
        );
        assert_eq!(expr.kind(), Some(ExprKind::GreaterThan));
        assert_eq!(expr.label(), "GreaterThan");
    }

    #[test]
    fn test_only_variants_have_distinct_kinds() {
        let of = |only| {
            Expr::new(
                TypeUsage::boolean(),
                ExprBody::IsOf {
                    argument: Box::new(int(1)),
                    of_type: TypeUsage::entity("Shop.Order"),
                    only,
                },
            )
        };
        assert_eq!(of(false).kind(), Some(ExprKind::IsOf));
        assert_eq!(of(true).kind(), Some(ExprKind::IsOfOnly));
    }

    #[test]
    fn test_extension_has_no_kind() {
        let expr = Expr::new(
            TypeUsage::boolean(),
            ExprBody::Extension {
                name: "FullTextMatch".to_string(),
                arguments: vec![int(1)],
            },
        );
        assert_eq!(expr.kind(), None);
        assert_eq!(expr.label(), "Extension(FullTextMatch)");
        assert_eq!(expr.children().len(), 1);
    }

    #[test]
    fn test_children_in_field_order() {
        let expr = Expr::new(
            TypeUsage::boolean(),
            ExprBody::In {
                item: Box::new(int(0)),
                list: vec![int(1), int(2)],
            },
        );
        let children = expr.children();
        assert_eq!(children, vec![&int(0), &int(1), &int(2)]);
        assert_eq!(expr.node_count(), 4);
        assert_eq!(expr.depth(), 2);
    }

    #[test]
    fn test_json_round_trip_of_scan() {
        let set = plankey_core::EntitySet::new("Shop", "Orders", EdmType::entity("Shop.Order"));
        let scan = Expr::new(
            TypeUsage::collection_of(TypeUsage::entity("Shop.Order")),
            ExprBody::Scan { target: set },
        );
        let json = serde_json::to_string(&scan).unwrap();
        assert!(json.contains(r#""kind":"Scan""#));
        let back: Expr = serde_json::from_str(&json).unwrap();
        assert_eq!(back, scan);
    }
}
