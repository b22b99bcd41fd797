//! # Rela Script Language - Abstract Syntax Tree
//!
//! This module defines the Abstract Syntax Tree (AST) for rela scripts: one
//! relational-algebra expression per line, bound to a new name.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[expressions]** - Expression nodes, attribute references, conditions
//! - **[operators]** - Set operators and comparators
//! - **[statements]** - A complete `<expression> -> <name>` line
//!
//! ## Quick Start
//!
//! ```text
//! Users & Admins -> Both
//! ```
//!
//! Binds the rows present in both `Users` and `Admins` to `Both`.
//!
//! ## Operators
//!
//! Lowest to highest precedence, all left-associative:
//!
//! - `&` intersection, `|` union, `\` difference
//! - `*` Cartesian product
//! - `[...]` postfix projection or selection
//!
//! Parentheses group as usual.
//!
//! ### Brackets
//!
//! A bracket body containing a comparator is a selection, anything else a
//! projection:
//!
//! ```text
//! Users[id >= 2] -> Later
//! Users[name] -> Names
//! ```
//!
//! ### Qualified Attributes
//!
//! A product renames attributes present on both sides to `Relation.attribute`:
//!
//! ```text
//! (Users * Admins)[Users.id = Admins.id] -> Matched
//! ```
pub mod expressions;
pub mod operators;
pub mod statements;
pub mod tokens;

pub use expressions::{AttrRef, Condition, Expr, Literal, Operand};
pub use operators::{Comparator, SetOp};
pub use statements::Statement;
pub use tokens::Token;
