//! The canonicalization visitor
//!
//! [`ExpressionKeyGen`] walks a tree once, appending a fixed tag for each node
//! followed by its children in field order. Nothing is sorted or reordered,
//! so operand order is part of the key. Variable names and string literals
//! are single-quoted with embedded quotes doubled; metadata identities are
//! written verbatim.
//!
//! A generator is used for exactly one tree. Any error aborts the walk and
//! leaves the buffer in an unspecified state.

use crate::KeyGenConfig;
use crate::literal::{append_constant, append_quoted};
use crate::symbols::token;
use plankey_core::{EdmFunction, Identified, PlanKeyError, PlanKeyResult, RelationshipEnd};
use plankey_ir::{
    Aggregate, Binding, Expr, ExprBody, ExprKind, GroupBinding, SortClause, is_generated_alias,
};

/// Single-use key builder for one expression tree
#[derive(Debug)]
pub struct ExpressionKeyGen<'a> {
    key: String,
    config: &'a KeyGenConfig,
    depth: usize,
}

impl<'a> ExpressionKeyGen<'a> {
    pub fn new(config: &'a KeyGenConfig) -> Self {
        Self {
            key: String::new(),
            config,
            depth: 0,
        }
    }

    /// Key text built so far
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Consume the generator, returning the key text
    pub fn into_key(self) -> String {
        self.key
    }

    /// Append the key of `e` and all its descendants
    pub fn visit(&mut self, e: &Expr) -> PlanKeyResult<()> {
        if let Some(limit) = self.config.max_depth {
            if self.depth >= limit {
                return Err(PlanKeyError::DepthLimitExceeded { limit });
            }
        }
        self.depth += 1;
        let result = self.visit_node(e);
        self.depth -= 1;
        result
    }

    // ========================================================================
    // Fragments
    // ========================================================================

    fn push(&mut self, text: &str) {
        self.key.push_str(text);
    }

    fn visit_kind(&mut self, kind: ExprKind) {
        self.key.push('[');
        self.key.push_str(token(kind));
        self.key.push(']');
    }

    fn visit_variable_name(&mut self, name: &str) -> PlanKeyResult<()> {
        if self.config.reject_generated_aliases && is_generated_alias(name) {
            return Err(PlanKeyError::ReservedVariableName(name.to_string()));
        }
        append_quoted(&mut self.key, name);
        Ok(())
    }

    fn visit_parenthesized(&mut self, e: &Expr) -> PlanKeyResult<()> {
        self.key.push('(');
        self.visit(e)?;
        self.key.push(')');
        Ok(())
    }

    fn visit_each_parenthesized(&mut self, items: &[Expr]) -> PlanKeyResult<()> {
        for item in items {
            self.visit_parenthesized(item)?;
        }
        Ok(())
    }

    fn visit_binding(&mut self, binding: &Binding) -> PlanKeyResult<()> {
        self.push("BV");
        self.visit_variable_name(&binding.variable)?;
        self.push("=(");
        self.visit(&binding.expression)?;
        self.key.push(')');
        Ok(())
    }

    fn visit_group_binding(&mut self, binding: &GroupBinding) -> PlanKeyResult<()> {
        self.push("GBVV");
        self.visit_variable_name(&binding.variable)?;
        self.key.push(',');
        self.visit_variable_name(&binding.group_variable)?;
        self.push("=(");
        self.visit(&binding.expression)?;
        self.key.push(')');
        Ok(())
    }

    fn visit_function(&mut self, function: &EdmFunction, arguments: &[Expr]) -> PlanKeyResult<()> {
        self.push("FUNC<");
        self.push(function.identity());
        self.push(">:ARGS(");
        self.visit_each_parenthesized(arguments)?;
        self.key.push(')');
        Ok(())
    }

    fn visit_unary(&mut self, kind: ExprKind, argument: &Expr) -> PlanKeyResult<()> {
        self.visit_kind(kind);
        self.visit_parenthesized(argument)
    }

    fn visit_binary(&mut self, kind: ExprKind, left: &Expr, right: &Expr) -> PlanKeyResult<()> {
        self.visit_kind(kind);
        self.key.push('(');
        self.visit(left)?;
        self.key.push(',');
        self.visit(right)?;
        self.key.push(')');
        Ok(())
    }

    /// `[kind](argument:identity)`
    fn visit_typed_unary(&mut self, kind: ExprKind, argument: &Expr, identity: &str) -> PlanKeyResult<()> {
        self.visit_kind(kind);
        self.key.push('(');
        self.visit(argument)?;
        self.key.push(':');
        self.push(identity);
        self.key.push(')');
        Ok(())
    }

    /// `A(declaring type)(from->to)`
    fn visit_navigation(&mut self, from: &RelationshipEnd, to: &RelationshipEnd) {
        self.push("A(");
        self.push(&from.declaring_type);
        self.push(")(");
        self.push(&from.name);
        self.push("->");
        self.push(&to.name);
        self.key.push(')');
    }

    fn visit_sort_order(&mut self, sort_order: &[SortClause]) -> PlanKeyResult<()> {
        self.push("SO(");
        for clause in sort_order {
            self.push(if clause.ascending { "ASC(" } else { "DESC(" });
            self.visit(&clause.expression)?;
            self.key.push(')');
            if let Some(collation) = clause.collation.as_deref().filter(|c| !c.is_empty()) {
                self.push(":(");
                self.push(collation);
                self.key.push(')');
            }
        }
        self.key.push(')');
        Ok(())
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    fn visit_node(&mut self, e: &Expr) -> PlanKeyResult<()> {
        let Some(kind) = e.kind() else {
            return Err(PlanKeyError::unsupported(e.label()));
        };

        match &e.node {
            ExprBody::Constant { value } => append_constant(&mut self.key, value, &e.result_type)?,
            ExprBody::Null => {
                self.push("NULL:");
                self.push(e.result_type.identity());
            }
            ExprBody::VariableReference { name } => {
                self.push("Var(");
                self.visit_variable_name(name)?;
                self.key.push(')');
            }
            ExprBody::ParameterReference { name } => {
                self.key.push('@');
                self.push(name);
                self.key.push(':');
                self.push(e.result_type.identity());
            }
            ExprBody::Scan { target } => {
                self.visit_kind(kind);
                self.key.push('(');
                self.push(&target.qualified_name());
                self.key.push(':');
                self.push(&e.result_type.edm_type.identity);
                self.key.push(')');
            }

            ExprBody::Function {
                function,
                arguments,
            } => self.visit_function(function, arguments)?,
            ExprBody::Lambda {
                variables,
                body,
                arguments,
            } => {
                self.push("Lambda(");
                for variable in variables {
                    self.push("(V");
                    self.visit_variable_name(&variable.name)?;
                    self.key.push(':');
                    self.push(variable.result_type.identity());
                    self.key.push(')');
                }
                self.key.push('=');
                self.visit_each_parenthesized(arguments)?;
                self.push(")Body(");
                self.visit(body)?;
                self.key.push(')');
            }

            ExprBody::Property { instance, property } => {
                self.visit(instance)?;
                self.visit_kind(kind);
                self.push(&property.name);
            }
            ExprBody::Comparison { left, right, .. }
            | ExprBody::And { left, right }
            | ExprBody::Or { left, right }
            | ExprBody::UnionAll { left, right }
            | ExprBody::Intersect { left, right }
            | ExprBody::Except { left, right } => self.visit_binary(kind, left, right)?,
            ExprBody::Like {
                argument,
                pattern,
                escape,
            } => {
                self.visit_kind(kind);
                self.visit_parenthesized(argument)?;
                self.visit_parenthesized(pattern)?;
                self.key.push('(');
                if let Some(escape) = escape {
                    self.visit(escape)?;
                }
                self.key.push(')');
            }
            ExprBody::IsNull { argument }
            | ExprBody::Not { argument }
            | ExprBody::Deref { argument }
            | ExprBody::RefKey { argument }
            | ExprBody::EntityRef { argument }
            | ExprBody::Distinct { argument }
            | ExprBody::Element { argument }
            | ExprBody::IsEmpty { argument } => self.visit_unary(kind, argument)?,
            ExprBody::Arithmetic { op, arguments } => {
                // `-` is shared by Minus and UnaryMinus; arity tells them apart
                if arguments.len() != op.arity() {
                    return Err(PlanKeyError::contract(
                        e.label(),
                        format!(
                            "expected {} argument(s), found {}",
                            op.arity(),
                            arguments.len()
                        ),
                    ));
                }
                self.visit_kind(kind);
                self.visit_each_parenthesized(arguments)?;
            }
            ExprBody::In { item, list } => {
                self.visit_kind(kind);
                self.key.push('(');
                self.visit(item)?;
                self.push(",(");
                for (i, element) in list.iter().enumerate() {
                    if i > 0 {
                        self.key.push(',');
                    }
                    self.visit(element)?;
                }
                self.push("))");
            }
            ExprBody::Case { arms, otherwise } => {
                self.visit_kind(kind);
                self.key.push('(');
                for arm in arms {
                    self.push("WHEN:(");
                    self.visit(&arm.when)?;
                    self.push(")THEN:(");
                    self.visit(&arm.then)?;
                    self.key.push(')');
                }
                self.push("ELSE:(");
                self.visit(otherwise)?;
                self.push("))");
            }

            ExprBody::Treat { argument } | ExprBody::Cast { argument } => {
                self.visit_typed_unary(kind, argument, e.result_type.identity())?
            }
            ExprBody::IsOf {
                argument, of_type, ..
            }
            | ExprBody::OfType {
                argument, of_type, ..
            } => self.visit_typed_unary(kind, argument, of_type.edm_type.identity())?,

            ExprBody::NewInstance { arguments, related } => {
                self.visit_kind(kind);
                self.key.push(':');
                self.push(&e.result_type.edm_type.identity);
                self.key.push('(');
                self.visit_each_parenthesized(arguments)?;
                for related_ref in related {
                    self.push("RE(");
                    self.visit_navigation(&related_ref.source_end, &related_ref.target_end);
                    self.visit_parenthesized(&related_ref.target_entity_ref)?;
                    self.key.push(')');
                }
                self.key.push(')');
            }
            ExprBody::Ref {
                entity_set,
                argument,
            } => {
                let Some(element) = e.result_type.edm_type.ref_element() else {
                    return Err(PlanKeyError::contract(
                        e.label(),
                        format!(
                            "result type '{}' is not a reference type",
                            e.result_type.identity
                        ),
                    ));
                };
                self.visit_kind(kind);
                self.push("(ESET(");
                self.push(&entity_set.qualified_name());
                self.push(")T(");
                self.push(&element.identity);
                self.key.push(')');
                self.visit_parenthesized(argument)?;
                self.key.push(')');
            }
            ExprBody::RelationshipNavigation { source, from, to } => {
                self.visit_kind(kind);
                self.visit_parenthesized(source)?;
                self.visit_navigation(from, to);
            }

            ExprBody::Limit {
                argument,
                limit,
                with_ties,
            } => {
                self.visit_kind(kind);
                if *with_ties {
                    self.push("WithTies");
                }
                self.visit_parenthesized(argument)?;
                self.visit_parenthesized(limit)?;
            }

            ExprBody::Filter {
                input,
                predicate: body,
            }
            | ExprBody::Project {
                input,
                projection: body,
            }
            | ExprBody::Quantifier {
                input,
                predicate: body,
                ..
            } => {
                self.visit_kind(kind);
                self.key.push('(');
                self.visit_binding(input)?;
                self.visit_parenthesized(body)?;
                self.key.push(')');
            }
            ExprBody::CrossJoin { inputs } => {
                self.visit_kind(kind);
                self.key.push('(');
                for input in inputs {
                    self.visit_binding(input)?;
                }
                self.key.push(')');
            }
            ExprBody::Join {
                left,
                right,
                condition,
                ..
            } => {
                self.visit_kind(kind);
                self.key.push('(');
                self.visit_binding(left)?;
                self.visit_binding(right)?;
                self.visit_parenthesized(condition)?;
                self.key.push(')');
            }
            ExprBody::Apply { input, apply, .. } => {
                self.visit_kind(kind);
                self.key.push('(');
                self.visit_binding(input)?;
                self.visit_binding(apply)?;
                self.key.push(')');
            }
            ExprBody::GroupBy {
                input,
                keys,
                aggregates,
            } => {
                self.visit_kind(kind);
                self.key.push('(');
                self.visit_group_binding(input)?;
                for key in keys {
                    self.key.push('K');
                    self.visit_parenthesized(key)?;
                }
                for aggregate in aggregates {
                    match aggregate {
                        Aggregate::Group { argument } => {
                            self.push("GA");
                            self.visit_parenthesized(argument)?;
                        }
                        Aggregate::Function {
                            function,
                            distinct,
                            arguments,
                        } => {
                            self.push("A:");
                            if *distinct {
                                self.push("D:");
                            }
                            self.visit_function(function, arguments)?;
                        }
                    }
                }
                self.key.push(')');
            }
            ExprBody::Skip {
                input,
                sort_order,
                count,
            } => {
                self.visit_kind(kind);
                self.key.push('(');
                self.visit_binding(input)?;
                self.visit_sort_order(sort_order)?;
                self.visit_parenthesized(count)?;
                self.key.push(')');
            }
            ExprBody::Sort { input, sort_order } => {
                self.visit_kind(kind);
                self.key.push('(');
                self.visit_binding(input)?;
                self.visit_sort_order(sort_order)?;
                self.key.push(')');
            }

            ExprBody::Extension { .. } => return Err(PlanKeyError::unsupported(e.label())),
        }

        Ok(())
    }
}
