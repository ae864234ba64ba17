//! Structural validation of expression trees
//!
//! Trees arrive from upstream compilers or from files. Validation checks the
//! producer's side of the contract (names present, operator arities, payload
//! types) before a tree is handed to key generation, and reports every
//! problem at once with a path to the offending node.

use crate::expr::{Expr, ExprBody};
use plankey_core::{EdmTypeKind, PlanKeyError, PlanKeyResult, Validatable};
use regex::Regex;
use std::sync::LazyLock;

// ============================================================================
// Naming Contract
// ============================================================================

/// Prefix used by the default expression-builder alias generator
pub const GENERATED_ALIAS_PREFIX: &str = "Var_";

static GENERATED_ALIAS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^{}[0-9]+", regex::escape(GENERATED_ALIAS_PREFIX)))
        .unwrap_or_else(|e| panic!("invalid alias pattern: {}", e))
});

/// Check whether a variable name comes from the default alias generator
///
/// Such names are numbered per process rather than per query, so two
/// compilations of the same query can bind different names. Producers that
/// want cacheable trees must not use them.
pub fn is_generated_alias(name: &str) -> bool {
    GENERATED_ALIAS.is_match(name)
}

// ============================================================================
// ValidationResult
// ============================================================================

/// Result of a validation operation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether the validation passed
    pub valid: bool,

    /// List of errors (empty if valid)
    pub errors: Vec<ValidationError>,

    /// List of warnings (non-fatal issues)
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    /// Create a successful validation result
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Add an error to the result
    pub fn add_error(&mut self, error: ValidationError) {
        self.valid = false;
        self.errors.push(error);
    }

    /// Add a warning to the result
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Merge another validation result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        if !other.valid {
            self.valid = false;
        }
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Convert to PlanKeyResult (fails if any errors)
    pub fn to_result(self) -> PlanKeyResult<()> {
        if self.valid {
            Ok(())
        } else {
            let msg = self
                .errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            Err(PlanKeyError::validation(msg))
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::ok()
    }
}

// ============================================================================
// ValidationError / ValidationWarning
// ============================================================================

/// A validation error
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Error code for programmatic handling
    pub code: ValidationErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Path to the offending node (e.g. `Filter/1:Equals/0:Property`)
    pub path: String,
}

impl ValidationError {
    pub fn new(code: ValidationErrorCode, message: impl Into<String>, path: &str) -> Self {
        Self {
            code,
            message: message.into(),
            path: path.to_string(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.path, self.message)
    }
}

/// Error codes for validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorCode {
    EmptyVariableName,
    EmptyParameterName,
    EmptyMemberName,
    EmptyIdentity,
    ArityMismatch,
    EmptyList,
    NonScalarConstant,
}

/// A validation warning (non-fatal issue)
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// Warning code
    pub code: ValidationWarningCode,

    /// Human-readable warning message
    pub message: String,

    /// Path to the node
    pub path: String,
}

impl ValidationWarning {
    pub fn new(code: ValidationWarningCode, message: impl Into<String>, path: &str) -> Self {
        Self {
            code,
            message: message.into(),
            path: path.to_string(),
        }
    }
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] Warning: {}", self.path, self.message)
    }
}

/// Warning codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationWarningCode {
    /// Constant payload does not match its declared type; the tree is not cacheable
    ConstantTypeMismatch,
    /// Variable name from the default alias generator
    GeneratedAlias,
    /// Provider-specific node; the tree is not cacheable
    ExtensionNode,
}

// ============================================================================
// Tree Walking
// ============================================================================

/// Visit every node with its path, parents before children
pub fn for_each_node<'a>(tree: &'a Expr, mut f: impl FnMut(&'a Expr, &str)) {
    let mut stack = vec![(tree, tree.label())];
    while let Some((node, path)) = stack.pop() {
        f(node, &path);
        let children = node.children();
        for (index, child) in children.into_iter().enumerate().rev() {
            stack.push((child, format!("{}/{}:{}", path, index, child.label())));
        }
    }
}

/// Variable names a node introduces or references
fn variable_names(node: &Expr) -> Vec<&str> {
    match &node.node {
        ExprBody::VariableReference { name } => vec![name.as_str()],
        ExprBody::Lambda { variables, .. } => variables.iter().map(|v| v.name.as_str()).collect(),
        ExprBody::Filter { input, .. }
        | ExprBody::Project { input, .. }
        | ExprBody::Skip { input, .. }
        | ExprBody::Sort { input, .. }
        | ExprBody::Quantifier { input, .. } => vec![input.variable.as_str()],
        ExprBody::CrossJoin { inputs } => inputs.iter().map(|b| b.variable.as_str()).collect(),
        ExprBody::Join { left, right, .. } => vec![left.variable.as_str(), right.variable.as_str()],
        ExprBody::Apply { input, apply, .. } => vec![input.variable.as_str(), apply.variable.as_str()],
        ExprBody::GroupBy { input, .. } => {
            vec![input.variable.as_str(), input.group_variable.as_str()]
        }
        _ => Vec::new(),
    }
}

// ============================================================================
// ValidationRule Trait
// ============================================================================

/// Trait for validation rules
pub trait ValidationRule {
    /// Get the rule name
    fn name(&self) -> &'static str;

    /// Get the rule description
    fn description(&self) -> &'static str;

    /// Validate a tree and return the result
    fn validate(&self, tree: &Expr) -> ValidationResult;
}

// ============================================================================
// Validator
// ============================================================================

/// Tree validator that runs multiple validation rules
#[derive(Default)]
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    /// Create a new validator
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Create a validator with default rules
    pub fn with_default_rules() -> Self {
        let mut validator = Self::new();
        validator.add_rule(Box::new(NamesRule));
        validator.add_rule(Box::new(IdentitiesRule));
        validator.add_rule(Box::new(ArityRule));
        validator.add_rule(Box::new(ConstantsRule));
        validator
    }

    /// Add a validation rule
    pub fn add_rule(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    /// Names of the configured rules
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Validate a tree with all rules
    pub fn validate(&self, tree: &Expr) -> ValidationResult {
        let mut result = ValidationResult::ok();

        for rule in &self.rules {
            result.merge(rule.validate(tree));
        }

        result
    }

    /// Validate and return Result
    pub fn validate_result(&self, tree: &Expr) -> PlanKeyResult<()> {
        self.validate(tree).to_result()
    }
}

impl Validatable for Expr {
    fn validate(&self) -> PlanKeyResult<()> {
        Validator::with_default_rules().validate_result(self)
    }

    fn validation_errors(&self) -> Vec<String> {
        Validator::with_default_rules()
            .validate(self)
            .errors
            .iter()
            .map(|e| e.to_string())
            .collect()
    }
}

// ============================================================================
// Built-in Validation Rules
// ============================================================================

/// Rule: variable, parameter and member names
pub struct NamesRule;

impl ValidationRule for NamesRule {
    fn name(&self) -> &'static str {
        "names"
    }

    fn description(&self) -> &'static str {
        "Validates that variables, parameters and members are named, and flags generated aliases"
    }

    fn validate(&self, tree: &Expr) -> ValidationResult {
        let mut result = ValidationResult::ok();

        for_each_node(tree, |node, path| {
            for name in variable_names(node) {
                if name.is_empty() {
                    result.add_error(ValidationError::new(
                        ValidationErrorCode::EmptyVariableName,
                        "Variable name cannot be empty",
                        path,
                    ));
                } else if is_generated_alias(name) {
                    result.add_warning(ValidationWarning::new(
                        ValidationWarningCode::GeneratedAlias,
                        format!("Variable '{}' comes from the default alias generator", name),
                        path,
                    ));
                }
            }

            match &node.node {
                ExprBody::ParameterReference { name } if name.is_empty() => {
                    result.add_error(ValidationError::new(
                        ValidationErrorCode::EmptyParameterName,
                        "Parameter name cannot be empty",
                        path,
                    ));
                }
                ExprBody::Property { property, .. } if property.name.is_empty() => {
                    result.add_error(ValidationError::new(
                        ValidationErrorCode::EmptyMemberName,
                        "Property name cannot be empty",
                        path,
                    ));
                }
                ExprBody::RelationshipNavigation { from, to, .. }
                    if from.name.is_empty() || to.name.is_empty() =>
                {
                    result.add_error(ValidationError::new(
                        ValidationErrorCode::EmptyMemberName,
                        "Relationship end names cannot be empty",
                        path,
                    ));
                }
                _ => {}
            }
        });

        result
    }
}

/// Rule: metadata identities
pub struct IdentitiesRule;

impl ValidationRule for IdentitiesRule {
    fn name(&self) -> &'static str {
        "identities"
    }

    fn description(&self) -> &'static str {
        "Validates that result types, functions and entity sets carry identities"
    }

    fn validate(&self, tree: &Expr) -> ValidationResult {
        let mut result = ValidationResult::ok();

        for_each_node(tree, |node, path| {
            let mut missing = |what: &str| {
                result.add_error(ValidationError::new(
                    ValidationErrorCode::EmptyIdentity,
                    format!("{} has no identity", what),
                    path,
                ));
            };

            if node.result_type.identity.is_empty() {
                missing("Result type");
            }
            match &node.node {
                ExprBody::Function { function, .. } if function.identity.is_empty() => {
                    missing("Function");
                }
                ExprBody::Scan { target } | ExprBody::Ref { entity_set: target, .. }
                    if target.container.is_empty() || target.name.is_empty() =>
                {
                    missing("Entity set");
                }
                ExprBody::IsOf { of_type, .. } | ExprBody::OfType { of_type, .. }
                    if of_type.edm_type.identity.is_empty() =>
                {
                    missing("Tested type");
                }
                ExprBody::GroupBy { aggregates, .. } => {
                    for aggregate in aggregates {
                        if let crate::expr::Aggregate::Function { function, .. } = aggregate {
                            if function.identity.is_empty() {
                                missing("Aggregate function");
                            }
                        }
                    }
                }
                _ => {}
            }
        });

        result
    }
}

/// Rule: operator arities and non-empty operand lists
pub struct ArityRule;

impl ValidationRule for ArityRule {
    fn name(&self) -> &'static str {
        "arity"
    }

    fn description(&self) -> &'static str {
        "Validates operand counts of arithmetic, IN, CROSS JOIN, CASE and sort operators"
    }

    fn validate(&self, tree: &Expr) -> ValidationResult {
        let mut result = ValidationResult::ok();

        for_each_node(tree, |node, path| match &node.node {
            ExprBody::Arithmetic { op, arguments } if arguments.len() != op.arity() => {
                result.add_error(ValidationError::new(
                    ValidationErrorCode::ArityMismatch,
                    format!(
                        "{} expects {} argument(s), found {}",
                        op.kind(),
                        op.arity(),
                        arguments.len()
                    ),
                    path,
                ));
            }
            ExprBody::In { list, .. } if list.is_empty() => {
                result.add_error(ValidationError::new(
                    ValidationErrorCode::EmptyList,
                    "IN list cannot be empty",
                    path,
                ));
            }
            ExprBody::CrossJoin { inputs } if inputs.len() < 2 => {
                result.add_error(ValidationError::new(
                    ValidationErrorCode::ArityMismatch,
                    format!("CrossJoin needs at least two inputs, found {}", inputs.len()),
                    path,
                ));
            }
            ExprBody::Case { arms, .. } if arms.is_empty() => {
                result.add_error(ValidationError::new(
                    ValidationErrorCode::EmptyList,
                    "Case needs at least one WHEN clause",
                    path,
                ));
            }
            ExprBody::Sort { sort_order, .. } | ExprBody::Skip { sort_order, .. }
                if sort_order.is_empty() =>
            {
                result.add_error(ValidationError::new(
                    ValidationErrorCode::EmptyList,
                    "Sort order cannot be empty",
                    path,
                ));
            }
            ExprBody::Extension { name, .. } => {
                result.add_warning(ValidationWarning::new(
                    ValidationWarningCode::ExtensionNode,
                    format!("Provider-specific node '{}' cannot be keyed", name),
                    path,
                ));
            }
            _ => {}
        });

        result
    }
}

/// Rule: constant payloads against their declared types
pub struct ConstantsRule;

impl ValidationRule for ConstantsRule {
    fn name(&self) -> &'static str {
        "constants"
    }

    fn description(&self) -> &'static str {
        "Validates that constants are scalar and that payloads match declared kinds"
    }

    fn validate(&self, tree: &Expr) -> ValidationResult {
        let mut result = ValidationResult::ok();

        for_each_node(tree, |node, path| {
            let ExprBody::Constant { value } = &node.node else {
                return;
            };
            match node.result_type.edm_type.scalar_kind() {
                None => {
                    let shape = match node.result_type.edm_type.kind {
                        EdmTypeKind::Collection { .. } => "a collection",
                        EdmTypeKind::Ref { .. } => "a reference",
                        _ => "a structural",
                    };
                    result.add_error(ValidationError::new(
                        ValidationErrorCode::NonScalarConstant,
                        format!(
                            "Constant is declared as {} type '{}'",
                            shape, node.result_type.identity
                        ),
                        path,
                    ));
                }
                Some(kind) if !value.fits(kind) => {
                    result.add_warning(ValidationWarning::new(
                        ValidationWarningCode::ConstantTypeMismatch,
                        format!(
                            "Constant declared as {} holds a {} value",
                            kind,
                            value.shape_name()
                        ),
                        path,
                    ));
                }
                Some(_) => {}
            }
        });

        result
    }
}

// ============================================================================
// Tests
// ============================================================================
