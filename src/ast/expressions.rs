use std::fmt;

use rust_decimal::Decimal;

use crate::ast::{Comparator, SetOp};

/// Abstract Syntax Tree node representing a parsed relational expression.
///
/// Every node evaluates to a relation. Semantic checks (attribute existence,
/// type compatibility) happen during evaluation, once schemas are known.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Reference to a relation bound in the environment
    ///
    /// # Example
    /// ```text
    /// Users
    /// ```
    Identifier(String),

    /// Union, intersection or difference of two relations
    ///
    /// # Examples
    /// ```text
    /// Users | Admins
    /// Users & Admins
    /// Users \ Admins
    /// ```
    SetOp {
        op: SetOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Cartesian product
    ///
    /// # Example
    /// ```text
    /// Users * Admins
    /// ```
    Product {
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Projection onto an ordered attribute list
    ///
    /// # Examples
    /// ```text
    /// Users[name]
    /// (Users * Admins)[Users.name, Admins.name]
    /// ```
    Projection {
        base: Box<Expr>,
        attributes: Vec<AttrRef>,
        /// Bracket body as written, used in diagnostics
        text: String,
    },

    /// Selection ("limit") by a single comparison
    ///
    /// # Examples
    /// ```text
    /// Users[id > 1]
    /// Users[name = 'John']
    /// (Users * Admins)[Users.id = Admins.id]
    /// ```
    Selection {
        base: Box<Expr>,
        condition: Condition,
        /// Bracket body as written, used in diagnostics
        text: String,
    },
}

impl Expr {
    /// The identifier this expression is rooted at, looking through
    /// projections and selections. `None` for set operations and products.
    pub fn display_name(&self) -> Option<&str> {
        match self {
            Expr::Identifier(name) => Some(name),
            Expr::Projection { base, .. } | Expr::Selection { base, .. } => base.display_name(),
            Expr::SetOp { .. } | Expr::Product { .. } => None,
        }
    }
}

/// Attribute reference, optionally qualified with a relation name.
///
/// A qualifier selects one of the attributes a product renamed to
/// `Relation.attribute`. Chained products can stack qualifiers, so the
/// qualifier itself may contain dots (`Q.Users` in `Q.Users.id`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrRef {
    pub qualifier: Option<String>,
    pub name: String,
}

impl AttrRef {
    pub fn new(name: impl Into<String>) -> Self {
        AttrRef {
            qualifier: None,
            name: name.into(),
        }
    }

    pub fn qualified(qualifier: impl Into<String>, name: impl Into<String>) -> Self {
        AttrRef {
            qualifier: Some(qualifier.into()),
            name: name.into(),
        }
    }

    /// Name of the schema attribute this reference denotes.
    pub fn attribute_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AttrRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(qualifier) => write!(f, "{}.{}", qualifier, self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Literal on the right-hand side of a condition.
///
/// The syntactic form decides the type: bare numbers are numeric, quoted
/// text is a string (or a date, when compared against a date attribute).
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(Decimal),
    String(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(n) => write!(f, "{}", n),
            Literal::String(s) => write!(f, "'{}'", s),
        }
    }
}

/// Right-hand side of a condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Attribute(AttrRef),
    Literal(Literal),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Attribute(attr) => write!(f, "{}", attr),
            Operand::Literal(literal) => write!(f, "{}", literal),
        }
    }
}

/// Selection condition: `attr_ref comparator (attr_ref | literal)`.
///
/// Renders in compact form, e.g. `name='John'` or `id>1`. Diagnostics prefer
/// the source text kept on [`Expr::Selection`].
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub attribute: AttrRef,
    pub comparator: Comparator,
    pub operand: Operand,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.attribute, self.comparator, self.operand)
    }
}
