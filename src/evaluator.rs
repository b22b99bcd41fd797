use std::{borrow::Cow, collections::HashMap, fmt};

use tracing::trace;

use crate::{
    ast::{AttrRef, Expr, Operand, SetOp},
    relation::{Comparand, Relation, RelationError, TypeMismatch},
};

/// Name -> relation bindings visible to a script.
pub type Environment = HashMap<String, Relation>;

/// Label given to an unnamed left product operand.
pub const ANONYMOUS_LEFT: &str = "_1";
/// Label given to an unnamed right product operand.
pub const ANONYMOUS_RIGHT: &str = "_2";

/// Tunable evaluation behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvalOptions {
    /// Remove duplicate rows produced by a projection, as classic relational
    /// algebra does. Off by default: projection is a plain restriction.
    pub dedup_projection: bool,
}

/// The operation named in an attribute error, with its bracket body as
/// written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeOp {
    Projection(String),
    Limit(String),
}

impl fmt::Display for AttributeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeOp::Projection(body) => write!(f, "Projection({})", body),
            AttributeOp::Limit(body) => write!(f, "Limit({})", body),
        }
    }
}

/// Errors that can occur while evaluating an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// Identifier with no binding in the environment
    UndefinedReference(String),

    /// Set operation over relations with different schemas
    SchemaMismatch(SetOp),

    /// Projection or selection naming an attribute the relation lacks
    UnknownAttribute { op: AttributeOp, attribute: String },

    /// Projection listing the same attribute twice
    DuplicateAttribute { op: AttributeOp, attribute: String },

    /// Selection comparing incompatible types
    TypeMismatch {
        condition: String,
        mismatch: TypeMismatch,
    },

    /// Any other relation failure
    Relation(RelationError),
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::UndefinedReference(name) => write!(f, "Undefined relation: {}", name),
            EvalError::SchemaMismatch(op) => write!(
                f,
                "Cannot apply {}: relations' attribute types don't match",
                op
            ),
            EvalError::UnknownAttribute { op, attribute } => write!(
                f,
                "Cannot apply {}: relation's attributes do not include {}",
                op, attribute
            ),
            EvalError::DuplicateAttribute { op, attribute } => write!(
                f,
                "Cannot apply {}: attribute {} is listed more than once",
                op, attribute
            ),
            EvalError::TypeMismatch {
                condition,
                mismatch,
            } => write!(f, "Cannot apply Limit({}): {}", condition, mismatch),
            EvalError::Relation(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for EvalError {}

/// Walks an expression tree against an environment.
///
/// Identifiers borrow straight from the environment; only operator results
/// are allocated.
pub struct Evaluator<'env> {
    env: &'env Environment,
    options: EvalOptions,
}

impl<'env> Evaluator<'env> {
    pub fn new(env: &'env Environment) -> Self {
        Self::with_options(env, EvalOptions::default())
    }

    pub fn with_options(env: &'env Environment, options: EvalOptions) -> Self {
        Evaluator { env, options }
    }

    /// Evaluates an expression to a relation.
    ///
    /// # Examples
    ///
    /// ```
    /// use rela_lang::{Attribute, AttributeType, Environment, Evaluator, Expr, Relation, Schema};
    ///
    /// let schema = Schema::new(vec![Attribute::new("id", AttributeType::Numeric)]).unwrap();
    /// let mut env = Environment::new();
    /// env.insert("Users".to_string(), Relation::empty(schema));
    ///
    /// let evaluator = Evaluator::new(&env);
    /// let result = evaluator.evaluate(&Expr::Identifier("Users".to_string())).unwrap();
    /// assert!(result.is_empty());
    /// ```
    pub fn evaluate(&self, expr: &Expr) -> Result<Relation, EvalError> {
        self.eval_expr(expr).map(Cow::into_owned)
    }

    fn eval_expr(&self, expr: &Expr) -> Result<Cow<'env, Relation>, EvalError> {
        match expr {
            Expr::Identifier(name) => self
                .env
                .get(name)
                .map(Cow::Borrowed)
                .ok_or_else(|| EvalError::UndefinedReference(name.clone())),

            Expr::SetOp { op, left, right } => {
                let left = self.eval_expr(left)?;
                let right = self.eval_expr(right)?;
                let result = match op {
                    SetOp::Union => left.union(&right),
                    SetOp::Intersect => left.intersect(&right),
                    SetOp::Difference => left.difference(&right),
                }
                .map_err(|e| match e {
                    RelationError::SchemaMismatch(op) => EvalError::SchemaMismatch(op),
                    other => EvalError::Relation(other),
                })?;
                trace!(op = op.name(), rows = result.len(), "set operation");
                Ok(Cow::Owned(result))
            }

            Expr::Product { left, right } => {
                let (left_label, right_label) = product_labels(left, right);
                let left = self.eval_expr(left)?;
                let right = self.eval_expr(right)?;
                let result = left
                    .product(&right, &left_label, &right_label)
                    .map_err(EvalError::Relation)?;
                trace!(
                    left = %left_label,
                    right = %right_label,
                    rows = result.len(),
                    "product"
                );
                Ok(Cow::Owned(result))
            }

            Expr::Projection {
                base,
                attributes,
                text,
            } => {
                let base = self.eval_expr(base)?;
                let names: Vec<String> = attributes.iter().map(AttrRef::attribute_name).collect();
                let result = base
                    .project(&names, self.options.dedup_projection)
                    .map_err(|e| {
                        let op = AttributeOp::Projection(written(text, || names.join(", ")));
                        match e {
                            RelationError::UnknownAttribute(attribute) => {
                                EvalError::UnknownAttribute { op, attribute }
                            }
                            RelationError::DuplicateAttribute(attribute) => {
                                EvalError::DuplicateAttribute { op, attribute }
                            }
                            other => EvalError::Relation(other),
                        }
                    })?;
                trace!(attributes = names.len(), rows = result.len(), "projection");
                Ok(Cow::Owned(result))
            }

            Expr::Selection {
                base,
                condition,
                text,
            } => {
                let base = self.eval_expr(base)?;
                let attribute = condition.attribute.attribute_name();
                let operand_name;
                let rhs = match &condition.operand {
                    Operand::Attribute(attr) => {
                        operand_name = attr.attribute_name();
                        Comparand::Attribute(&operand_name)
                    }
                    Operand::Literal(literal) => Comparand::Literal(literal),
                };
                let result = base
                    .select(&attribute, condition.comparator, rhs)
                    .map_err(|e| {
                        let body = written(text, || condition.to_string());
                        match e {
                            RelationError::UnknownAttribute(attribute) => {
                                EvalError::UnknownAttribute {
                                    op: AttributeOp::Limit(body),
                                    attribute,
                                }
                            }
                            RelationError::TypeMismatch(mismatch) => EvalError::TypeMismatch {
                                condition: body,
                                mismatch,
                            },
                            other => EvalError::Relation(other),
                        }
                    })?;
                trace!(condition = %condition, rows = result.len(), "selection");
                Ok(Cow::Owned(result))
            }
        }
    }
}

/// Source text of a bracket body, or a rendering of it for trees built
/// without source.
fn written(text: &str, render: impl FnOnce() -> String) -> String {
    if text.is_empty() {
        render()
    } else {
        text.to_string()
    }
}

/// Qualifiers for a product's operands.
///
/// Named operands use their identifier; anonymous ones fall back to a
/// positional label. A self-product gets a `_2` suffix on the right.
pub fn product_labels(left: &Expr, right: &Expr) -> (String, String) {
    let left = left.display_name().unwrap_or(ANONYMOUS_LEFT).to_string();
    let right = right.display_name().unwrap_or(ANONYMOUS_RIGHT).to_string();

    if left == right {
        let right = format!("{}{}", right, ANONYMOUS_RIGHT);
        (left, right)
    } else {
        (left, right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_line;

    fn labels(line: &str) -> (String, String) {
        match parse_line(line).unwrap().expr {
            Expr::Product { left, right } => product_labels(&left, &right),
            other => panic!("Expected product, got {:?}", other),
        }
    }

    #[test]
    fn test_named_operands_label_themselves() {
        assert_eq!(labels("Users * Admins -> R"), ("Users".into(), "Admins".into()));
    }

    #[test]
    fn test_postfix_keeps_base_name() {
        assert_eq!(
            labels("Users[id > 1] * Admins[name] -> R"),
            ("Users".into(), "Admins".into())
        );
    }

    #[test]
    fn test_anonymous_operands_are_positional() {
        assert_eq!(
            labels("(Users | Admins) * (Users & Admins) -> R"),
            ("_1".into(), "_2".into())
        );
    }

    #[test]
    fn test_self_product_suffixes_right() {
        assert_eq!(labels("Users * Users -> R"), ("Users".into(), "Users_2".into()));
    }

    #[test]
    fn test_undefined_reference() {
        let env = Environment::new();
        let stmt = parse_line("Ghosts -> R").unwrap();
        let err = Evaluator::new(&env).evaluate(&stmt.expr).unwrap_err();
        assert_eq!(err, EvalError::UndefinedReference("Ghosts".to_string()));
        assert_eq!(err.to_string(), "Undefined relation: Ghosts");
    }
}
