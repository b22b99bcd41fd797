use std::{cmp::Ordering, fmt};

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Format accepted for date cells and date literals.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The declared type of a relation attribute.
///
/// The set is closed: every attribute is numeric, textual or a calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeType {
    /// Decimal number
    Numeric,
    /// UTF-8 text
    String,
    /// Calendar date (no time component)
    Date,
}

impl AttributeType {
    /// Lower-case name used in diagnostics and in relation files.
    pub fn name(&self) -> &'static str {
        match self {
            AttributeType::Numeric => "numeric",
            AttributeType::String => "string",
            AttributeType::Date => "date",
        }
    }

    /// Parse a type name as written in relation files.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "numeric" | "number" => Some(AttributeType::Numeric),
            "string" | "text" => Some(AttributeType::String),
            "date" => Some(AttributeType::Date),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single cell of a relation.
///
/// Exactly one variant is active and it always matches the declared
/// [`AttributeType`] of the attribute the cell belongs to.
///
/// # Ordering
///
/// Values only compare against values of the same variant:
/// - numbers numerically (`1.0` equals `1.00`)
/// - strings lexicographically
/// - dates chronologically
///
/// # Examples
///
/// ```
/// use rela_lang::Value;
/// use rust_decimal::Decimal;
///
/// let id = Value::Numeric(Decimal::from(1));
/// let name = Value::String("John".to_string());
///
/// assert!(id.compare(&Value::Numeric(Decimal::from(2))).unwrap().is_lt());
/// assert!(id.compare(&name).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// Decimal number
    Numeric(Decimal),

    /// UTF-8 string
    String(String),

    /// Calendar date
    Date(NaiveDate),
}

impl Value {
    /// The attribute type this value belongs to.
    pub fn attribute_type(&self) -> AttributeType {
        match self {
            Value::Numeric(_) => AttributeType::Numeric,
            Value::String(_) => AttributeType::String,
            Value::Date(_) => AttributeType::Date,
        }
    }

    /// Compare two values of the same type.
    ///
    /// Returns `None` when the variants differ.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Numeric(a), Value::Numeric(b)) => Some(a.cmp(b)),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Get as decimal
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Numeric(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as date
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Parse a `YYYY-MM-DD` date.
    pub fn parse_date(text: &str) -> Option<Value> {
        NaiveDate::parse_from_str(text, DATE_FORMAT)
            .ok()
            .map(Value::Date)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Numeric(n) => write!(f, "{}", n.normalize()),
            Value::String(s) => f.write_str(s),
            Value::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Numeric(Decimal::from(n))
    }
}

impl From<Decimal> for Value {
    fn from(n: Decimal) -> Self {
        Value::Numeric(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_equality_ignores_scale() {
        let a = Value::Numeric("1.0".parse().unwrap());
        let b = Value::Numeric("1.00".parse().unwrap());
        assert_eq!(a, b);
        assert_eq!(a.compare(&b), Some(Ordering::Equal));
    }

    #[test]
    fn test_cross_type_comparison_is_undefined() {
        assert_eq!(Value::from(1).compare(&Value::from("1")), None);
    }

    #[test]
    fn test_dates_compare_chronologically() {
        let early = Value::parse_date("1999-12-31").unwrap();
        let late = Value::parse_date("2000-01-01").unwrap();
        assert_eq!(early.compare(&late), Some(Ordering::Less));
        assert_eq!(late.to_string(), "2000-01-01");
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert!(Value::parse_date("yesterday").is_none());
        assert!(Value::parse_date("2024-02-30").is_none());
    }

    #[test]
    fn test_type_names() {
        assert_eq!(AttributeType::parse("Numeric"), Some(AttributeType::Numeric));
        assert_eq!(AttributeType::parse("text"), Some(AttributeType::String));
        assert_eq!(AttributeType::parse("blob"), None);
        assert_eq!(Value::from("x").attribute_type().name(), "string");
    }
}
