//! Builder methods for expression trees
//!
//! These mirror how a query compiler assembles command trees: leaves are
//! created with associated constructors, operators are chained on their
//! first operand, and relational operators start from a [`Binding`]. Result
//! types are derived from the operands where the type system makes that
//! unambiguous; everything else takes the result type explicitly.

use crate::expr::{
    Aggregate, Binding, CaseArm, Expr, ExprBody, GroupBinding, LambdaVariable, RelatedEntityRef,
    SortClause,
};
use crate::kind::{ApplyKind, ArithmeticOp, ComparisonOp, JoinKind, QuantifierKind};
use crate::literal::ConstantValue;
use plankey_core::{
    EdmFunction, EdmMember, EdmType, EntitySet, PrimitiveTypeKind, RelationshipEnd, TypeUsage,
};

// ============================================================================
// Leaves
// ============================================================================

impl Expr {
    /// Constant typed by the natural kind of its value
    pub fn constant(value: impl Into<ConstantValue>) -> Self {
        let value = value.into();
        Self::new(
            TypeUsage::primitive(value.natural_kind()),
            ExprBody::Constant { value },
        )
    }

    /// Constant with an explicit result type (facets, enums, spatial subtypes)
    pub fn typed_constant(value: impl Into<ConstantValue>, result_type: TypeUsage) -> Self {
        Self::new(
            result_type,
            ExprBody::Constant {
                value: value.into(),
            },
        )
    }

    /// Typed null
    pub fn null(result_type: TypeUsage) -> Self {
        Self::new(result_type, ExprBody::Null)
    }

    /// Reference to a bound variable
    pub fn variable(name: impl Into<String>, result_type: TypeUsage) -> Self {
        Self::new(
            result_type,
            ExprBody::VariableReference { name: name.into() },
        )
    }

    /// Reference to a query parameter
    pub fn parameter(name: impl Into<String>, result_type: TypeUsage) -> Self {
        Self::new(
            result_type,
            ExprBody::ParameterReference { name: name.into() },
        )
    }

    /// Scan of an entity set, typed as a collection of its element type
    pub fn scan(target: EntitySet) -> Self {
        let element = TypeUsage::new(target.element_type.clone());
        Self::new(TypeUsage::collection_of(element), ExprBody::Scan { target })
    }

    /// Provider-specific node
    pub fn extension(name: impl Into<String>, result_type: TypeUsage, arguments: Vec<Expr>) -> Self {
        Self::new(
            result_type,
            ExprBody::Extension {
                name: name.into(),
                arguments,
            },
        )
    }

    // ========================================================================
    // Functions
    // ========================================================================

    /// Function invocation
    pub fn function(function: EdmFunction, result_type: TypeUsage, arguments: Vec<Expr>) -> Self {
        Self::new(
            result_type,
            ExprBody::Function {
                function,
                arguments,
            },
        )
    }

    /// Inline lambda applied to `arguments`; typed by its body
    pub fn lambda(variables: Vec<LambdaVariable>, body: Expr, arguments: Vec<Expr>) -> Self {
        Self::new(
            body.result_type.clone(),
            ExprBody::Lambda {
                variables,
                body: Box::new(body),
                arguments,
            },
        )
    }

    // ========================================================================
    // Scalar Operators
    // ========================================================================

    /// Member access on this instance
    pub fn property(self, name: impl Into<String>, result_type: TypeUsage) -> Self {
        Self::new(
            result_type,
            ExprBody::Property {
                instance: Box::new(self),
                property: EdmMember::new(name),
            },
        )
    }

    /// Relational comparison
    pub fn compare(self, op: ComparisonOp, right: Expr) -> Self {
        Self::new(
            TypeUsage::boolean(),
            ExprBody::Comparison {
                op,
                left: Box::new(self),
                right: Box::new(right),
            },
        )
    }

    pub fn equal(self, right: Expr) -> Self {
        self.compare(ComparisonOp::Equals, right)
    }

    pub fn not_equal(self, right: Expr) -> Self {
        self.compare(ComparisonOp::NotEquals, right)
    }

    pub fn less_than(self, right: Expr) -> Self {
        self.compare(ComparisonOp::LessThan, right)
    }

    pub fn less_than_or_equal(self, right: Expr) -> Self {
        self.compare(ComparisonOp::LessThanOrEquals, right)
    }

    pub fn greater_than(self, right: Expr) -> Self {
        self.compare(ComparisonOp::GreaterThan, right)
    }

    pub fn greater_than_or_equal(self, right: Expr) -> Self {
        self.compare(ComparisonOp::GreaterThanOrEquals, right)
    }

    /// `self LIKE pattern [ESCAPE escape]`
    pub fn like(self, pattern: Expr, escape: Option<Expr>) -> Self {
        Self::new(
            TypeUsage::boolean(),
            ExprBody::Like {
                argument: Box::new(self),
                pattern: Box::new(pattern),
                escape: escape.map(Box::new),
            },
        )
    }

    pub fn is_null(self) -> Self {
        Self::new(
            TypeUsage::boolean(),
            ExprBody::IsNull {
                argument: Box::new(self),
            },
        )
    }

    /// Binary arithmetic, typed like the left operand
    pub fn arithmetic(self, op: ArithmeticOp, right: Expr) -> Self {
        Self::new(
            self.result_type.clone(),
            ExprBody::Arithmetic {
                op,
                arguments: vec![self, right],
            },
        )
    }

    pub fn plus(self, right: Expr) -> Self {
        self.arithmetic(ArithmeticOp::Plus, right)
    }

    pub fn minus(self, right: Expr) -> Self {
        self.arithmetic(ArithmeticOp::Minus, right)
    }

    pub fn multiply(self, right: Expr) -> Self {
        self.arithmetic(ArithmeticOp::Multiply, right)
    }

    pub fn divide(self, right: Expr) -> Self {
        self.arithmetic(ArithmeticOp::Divide, right)
    }

    pub fn modulo(self, right: Expr) -> Self {
        self.arithmetic(ArithmeticOp::Modulo, right)
    }

    /// Unary minus
    pub fn negate(self) -> Self {
        Self::new(
            self.result_type.clone(),
            ExprBody::Arithmetic {
                op: ArithmeticOp::UnaryMinus,
                arguments: vec![self],
            },
        )
    }

    pub fn and(self, right: Expr) -> Self {
        Self::new(
            TypeUsage::boolean(),
            ExprBody::And {
                left: Box::new(self),
                right: Box::new(right),
            },
        )
    }

    pub fn or(self, right: Expr) -> Self {
        Self::new(
            TypeUsage::boolean(),
            ExprBody::Or {
                left: Box::new(self),
                right: Box::new(right),
            },
        )
    }

    pub fn not(self) -> Self {
        Self::new(
            TypeUsage::boolean(),
            ExprBody::Not {
                argument: Box::new(self),
            },
        )
    }

    /// `self IN (list...)`
    pub fn in_list(self, list: Vec<Expr>) -> Self {
        Self::new(
            TypeUsage::boolean(),
            ExprBody::In {
                item: Box::new(self),
                list,
            },
        )
    }

    /// Searched case; typed like the else branch
    pub fn case(arms: Vec<(Expr, Expr)>, otherwise: Expr) -> Self {
        Self::new(
            otherwise.result_type.clone(),
            ExprBody::Case {
                arms: arms
                    .into_iter()
                    .map(|(when, then)| CaseArm { when, then })
                    .collect(),
                otherwise: Box::new(otherwise),
            },
        )
    }

    // ========================================================================
    // Type Operators
    // ========================================================================

    pub fn cast_to(self, result_type: TypeUsage) -> Self {
        Self::new(
            result_type,
            ExprBody::Cast {
                argument: Box::new(self),
            },
        )
    }

    pub fn treat_as(self, result_type: TypeUsage) -> Self {
        Self::new(
            result_type,
            ExprBody::Treat {
                argument: Box::new(self),
            },
        )
    }

    /// Type test; `only` excludes subtypes
    pub fn is_of(self, of_type: TypeUsage, only: bool) -> Self {
        Self::new(
            TypeUsage::boolean(),
            ExprBody::IsOf {
                argument: Box::new(self),
                of_type,
                only,
            },
        )
    }

    /// Collection filter by type; `only` excludes subtypes
    pub fn of_type(self, of_type: TypeUsage, only: bool) -> Self {
        Self::new(
            TypeUsage::collection_of(of_type.clone()),
            ExprBody::OfType {
                argument: Box::new(self),
                of_type,
                only,
            },
        )
    }

    // ========================================================================
    // Construction and References
    // ========================================================================

    /// Construct an instance of `result_type`
    pub fn new_instance(result_type: TypeUsage, arguments: Vec<Expr>) -> Self {
        Self::new(
            result_type,
            ExprBody::NewInstance {
                arguments,
                related: Vec::new(),
            },
        )
    }

    /// Attach a related-entity reference to an entity constructor
    ///
    /// Only [`ExprBody::NewInstance`] nodes carry related references; calling
    /// this on any other node panics in debug builds and is ignored otherwise.
    pub fn with_related(
        mut self,
        source_end: RelationshipEnd,
        target_end: RelationshipEnd,
        target_entity_ref: Expr,
    ) -> Self {
        debug_assert!(
            matches!(self.node, ExprBody::NewInstance { .. }),
            "related references attach to NewInstance, not {}",
            self.label()
        );
        if let ExprBody::NewInstance { related, .. } = &mut self.node {
            related.push(RelatedEntityRef {
                source_end,
                target_end,
                target_entity_ref: Box::new(target_entity_ref),
            });
        }
        self
    }

    /// Reference to the entity in `entity_set` with key `key`
    pub fn entity_ref_to(entity_set: EntitySet, key: Expr) -> Self {
        let result_type = TypeUsage::reference_to(entity_set.element_type.clone());
        Self::new(
            result_type,
            ExprBody::Ref {
                entity_set,
                argument: Box::new(key),
            },
        )
    }

    /// Navigate from this reference across a relationship
    pub fn navigate(self, from: RelationshipEnd, to: RelationshipEnd, result_type: TypeUsage) -> Self {
        Self::new(
            result_type,
            ExprBody::RelationshipNavigation {
                source: Box::new(self),
                from,
                to,
            },
        )
    }

    /// Dereference; typed as the referenced entity
    pub fn deref(self) -> Self {
        let result_type = match self.result_type.edm_type.ref_element() {
            Some(element) => TypeUsage::new(element.clone()),
            None => self.result_type.clone(),
        };
        Self::new(
            result_type,
            ExprBody::Deref {
                argument: Box::new(self),
            },
        )
    }

    /// Key of a reference
    pub fn ref_key(self, result_type: TypeUsage) -> Self {
        Self::new(
            result_type,
            ExprBody::RefKey {
                argument: Box::new(self),
            },
        )
    }

    /// Reference to this entity instance
    pub fn entity_ref(self) -> Self {
        let result_type = TypeUsage::reference_to(self.result_type.edm_type.clone());
        Self::new(
            result_type,
            ExprBody::EntityRef {
                argument: Box::new(self),
            },
        )
    }

    // ========================================================================
    // Collection Operators
    // ========================================================================

    pub fn distinct(self) -> Self {
        Self::new(
            self.result_type.clone(),
            ExprBody::Distinct {
                argument: Box::new(self),
            },
        )
    }

    /// Single element of a collection
    pub fn element(self) -> Self {
        let result_type = self.element_type();
        Self::new(
            result_type,
            ExprBody::Element {
                argument: Box::new(self),
            },
        )
    }

    pub fn is_empty(self) -> Self {
        Self::new(
            TypeUsage::boolean(),
            ExprBody::IsEmpty {
                argument: Box::new(self),
            },
        )
    }

    pub fn union_all(self, right: Expr) -> Self {
        Self::new(
            self.result_type.clone(),
            ExprBody::UnionAll {
                left: Box::new(self),
                right: Box::new(right),
            },
        )
    }

    pub fn intersect(self, right: Expr) -> Self {
        Self::new(
            self.result_type.clone(),
            ExprBody::Intersect {
                left: Box::new(self),
                right: Box::new(right),
            },
        )
    }

    pub fn except(self, right: Expr) -> Self {
        Self::new(
            self.result_type.clone(),
            ExprBody::Except {
                left: Box::new(self),
                right: Box::new(right),
            },
        )
    }

    /// First `limit` elements
    pub fn limit(self, limit: Expr, with_ties: bool) -> Self {
        Self::new(
            self.result_type.clone(),
            ExprBody::Limit {
                argument: Box::new(self),
                limit: Box::new(limit),
                with_ties,
            },
        )
    }

    // ========================================================================
    // Bindings
    // ========================================================================

    /// Element type when this is a collection, otherwise the type itself
    pub fn element_type(&self) -> TypeUsage {
        self.result_type
            .collection_element()
            .cloned()
            .unwrap_or_else(|| self.result_type.clone())
    }

    /// Bind this collection to an iteration variable
    pub fn bind_as(self, variable: impl Into<String>) -> Binding {
        Binding {
            variable: variable.into(),
            expression: Box::new(self),
        }
    }

    /// Bind this collection for grouping
    pub fn group_bind_as(
        self,
        variable: impl Into<String>,
        group_variable: impl Into<String>,
    ) -> GroupBinding {
        GroupBinding {
            variable: variable.into(),
            group_variable: group_variable.into(),
            expression: Box::new(self),
        }
    }

    // ========================================================================
    // Relational Operators
    // ========================================================================

    /// Cartesian product of two or more inputs
    pub fn cross_join(inputs: Vec<Binding>, result_type: TypeUsage) -> Self {
        Self::new(result_type, ExprBody::CrossJoin { inputs })
    }

    /// Join with an explicit condition
    pub fn join(
        join: JoinKind,
        left: Binding,
        right: Binding,
        condition: Expr,
        result_type: TypeUsage,
    ) -> Self {
        Self::new(
            result_type,
            ExprBody::Join {
                join,
                left,
                right,
                condition: Box::new(condition),
            },
        )
    }

    /// Correlated apply
    pub fn apply(apply_kind: ApplyKind, input: Binding, apply: Binding, result_type: TypeUsage) -> Self {
        Self::new(
            result_type,
            ExprBody::Apply {
                apply_kind,
                input,
                apply,
            },
        )
    }

    /// Grouping with keys and aggregates
    pub fn group_by(
        input: GroupBinding,
        keys: Vec<Expr>,
        aggregates: Vec<Aggregate>,
        result_type: TypeUsage,
    ) -> Self {
        Self::new(
            result_type,
            ExprBody::GroupBy {
                input,
                keys,
                aggregates,
            },
        )
    }
}

impl Binding {
    /// Reference to this binding's variable, typed as the element type
    pub fn variable_ref(&self) -> Expr {
        Expr::variable(self.variable.clone(), self.expression.element_type())
    }

    pub fn filter(self, predicate: Expr) -> Expr {
        Expr::new(
            self.expression.result_type.clone(),
            ExprBody::Filter {
                input: self,
                predicate: Box::new(predicate),
            },
        )
    }

    /// Projection; typed as a collection of the projection's type
    pub fn project(self, projection: Expr) -> Expr {
        Expr::new(
            TypeUsage::collection_of(projection.result_type.clone()),
            ExprBody::Project {
                input: self,
                projection: Box::new(projection),
            },
        )
    }

    pub fn sort(self, sort_order: Vec<SortClause>) -> Expr {
        Expr::new(
            self.expression.result_type.clone(),
            ExprBody::Sort {
                input: self,
                sort_order,
            },
        )
    }

    pub fn skip(self, sort_order: Vec<SortClause>, count: Expr) -> Expr {
        Expr::new(
            self.expression.result_type.clone(),
            ExprBody::Skip {
                input: self,
                sort_order,
                count: Box::new(count),
            },
        )
    }

    pub fn quantify(self, quantifier: QuantifierKind, predicate: Expr) -> Expr {
        Expr::new(
            TypeUsage::boolean(),
            ExprBody::Quantifier {
                quantifier,
                input: self,
                predicate: Box::new(predicate),
            },
        )
    }

    pub fn any(self, predicate: Expr) -> Expr {
        self.quantify(QuantifierKind::Any, predicate)
    }

    pub fn all(self, predicate: Expr) -> Expr {
        self.quantify(QuantifierKind::All, predicate)
    }
}

impl GroupBinding {
    /// Reference to the element variable
    pub fn variable_ref(&self) -> Expr {
        Expr::variable(self.variable.clone(), self.expression.element_type())
    }

    /// Reference to the group variable (a collection of elements)
    pub fn group_variable_ref(&self) -> Expr {
        Expr::variable(
            self.group_variable.clone(),
            self.expression.result_type.clone(),
        )
    }
}

impl SortClause {
    pub fn ascending(expression: Expr) -> Self {
        Self {
            expression,
            ascending: true,
            collation: None,
        }
    }

    pub fn descending(expression: Expr) -> Self {
        Self {
            expression,
            ascending: false,
            collation: None,
        }
    }

    pub fn with_collation(mut self, collation: impl Into<String>) -> Self {
        self.collation = Some(collation.into());
        self
    }
}

impl LambdaVariable {
    pub fn new(name: impl Into<String>, result_type: TypeUsage) -> Self {
        Self {
            name: name.into(),
            result_type,
        }
    }
}

impl Aggregate {
    /// Function aggregate over `arguments`
    pub fn function(function: EdmFunction, distinct: bool, arguments: Vec<Expr>) -> Self {
        Aggregate::Function {
            function,
            distinct,
            arguments,
        }
    }

    /// The group partition
    pub fn group(argument: Expr) -> Self {
        Aggregate::Group {
            argument: Box::new(argument),
        }
    }
}

/// Usage of a primitive type, a shorthand for leaf builders
pub fn primitive(kind: PrimitiveTypeKind) -> TypeUsage {
    TypeUsage::primitive(kind)
}

/// Entity set whose element type is the entity `container.type_name`
pub fn entity_set(container: &str, set: &str, entity_type: &str) -> EntitySet {
    EntitySet::new(container, set, EdmType::entity(entity_type))
}

// ============================================================================
// Tests
// ============================================================================
