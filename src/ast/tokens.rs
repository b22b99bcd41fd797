use std::fmt;

use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// Decimal number
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 3.14
    /// -1
    /// ```
    Number(Decimal),

    /// String literal enclosed in single quotes
    ///
    /// # Examples
    /// ```text
    /// 'John'
    /// '2024-01-31'
    /// ```
    String(String),

    // Identifiers
    /// Relation, attribute or binding name
    ///
    /// Must start with letter or underscore, followed by letters, digits, or underscores.
    ///
    /// # Examples
    /// ```text
    /// Users
    /// year_of_birth
    /// _1
    /// ```
    Identifier(String),

    // Set operators
    /// Intersection
    ///
    /// # Examples
    /// ```text
    /// Users & Admins -> Both
    /// ```
    Ampersand,

    /// Union
    ///
    /// # Examples
    /// ```text
    /// Users | Admins -> Everyone
    /// ```
    Pipe,

    /// Difference
    ///
    /// # Examples
    /// ```text
    /// Users \ Admins -> Regular
    /// ```
    Backslash,

    /// Cartesian product
    ///
    /// # Examples
    /// ```text
    /// Users * Orders -> Pairs
    /// ```
    Star,

    /// Binding arrow separating the expression from its target name
    Arrow,

    // Comparison
    /// Equality (`=`)
    Eq,

    /// Inequality (`!=`)
    NotEq,

    /// Less than
    Lt,

    /// Less than or equal
    LtEq,

    /// Greater than
    Gt,

    /// Greater than or equal
    GtEq,

    // Delimiters
    /// Left parenthesis for grouping
    LParen,

    /// Right parenthesis
    RParen,

    /// Left bracket opening a projection or selection
    LBracket,

    /// Right bracket
    RBracket,

    /// Comma between projected attributes
    Comma,

    /// Dot between a qualifier and an attribute name
    Dot,

    /// End of line
    Eof,
}

impl Token {
    /// Whether this token is one of the six comparators.
    pub fn is_comparator(&self) -> bool {
        matches!(
            self,
            Token::Eq | Token::NotEq | Token::Lt | Token::LtEq | Token::Gt | Token::GtEq
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "number {}", n),
            Token::String(s) => write!(f, "string '{}'", s),
            Token::Identifier(name) => write!(f, "identifier '{}'", name),
            Token::Ampersand => f.write_str("'&'"),
            Token::Pipe => f.write_str("'|'"),
            Token::Backslash => f.write_str("'\\'"),
            Token::Star => f.write_str("'*'"),
            Token::Arrow => f.write_str("'->'"),
            Token::Eq => f.write_str("'='"),
            Token::NotEq => f.write_str("'!='"),
            Token::Lt => f.write_str("'<'"),
            Token::LtEq => f.write_str("'<='"),
            Token::Gt => f.write_str("'>'"),
            Token::GtEq => f.write_str("'>='"),
            Token::LParen => f.write_str("'('"),
            Token::RParen => f.write_str("')'"),
            Token::LBracket => f.write_str("'['"),
            Token::RBracket => f.write_str("']'"),
            Token::Comma => f.write_str("','"),
            Token::Dot => f.write_str("'.'"),
            Token::Eof => f.write_str("end of line"),
        }
    }
}
