use crate::ast::Expr;

/// A single script line.
///
/// Evaluates `expr` and binds the resulting relation under `target`.
///
/// # Example
/// ```text
/// (Users \ Admins) | (Admins \ Users) -> Exclusive
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub expr: Expr,
    pub target: String,
}
