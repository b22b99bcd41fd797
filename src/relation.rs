//! Typed, immutable relations and the algebra over them.
//!
//! Every operation borrows its operands and returns a fresh [`Relation`]; no
//! relation is ever modified in place.

use std::{
    collections::{HashMap, HashSet},
    fmt,
};

use crate::{
    ast::{Comparator, Literal, SetOp},
    value::{AttributeType, Value},
};

/// A named, typed column of a schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attribute {
    pub name: String,
    pub attr_type: AttributeType,
}

impl Attribute {
    pub fn new(name: impl Into<String>, attr_type: AttributeType) -> Self {
        Attribute {
            name: name.into(),
            attr_type,
        }
    }
}

/// Ordered list of attributes with unique names.
///
/// Order matters: two schemas are only compatible for set operations when
/// names, types and positions all agree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    attributes: Vec<Attribute>,
}

impl Schema {
    pub fn new(attributes: Vec<Attribute>) -> Result<Self, RelationError> {
        let mut seen = HashSet::new();
        for attribute in &attributes {
            if !seen.insert(attribute.name.as_str()) {
                return Err(RelationError::DuplicateAttribute(attribute.name.clone()));
            }
        }
        Ok(Schema { attributes })
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a.name == name)
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|a| a.name.as_str())
    }
}

/// Positional values, one per schema attribute.
pub type Row = Vec<Value>;

/// A row materialized as `attribute -> value` pairs in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    pub fn into_map(self) -> HashMap<String, Value> {
        self.fields.into_iter().collect()
    }
}

/// Right-hand side of a selection, as seen by the relation.
#[derive(Debug, Clone, Copy)]
pub enum Comparand<'a> {
    Attribute(&'a str),
    Literal(&'a Literal),
}

/// Why a selection condition is ill-typed.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeMismatch {
    /// Numeric literal compared against a string attribute
    NotAString(Literal),
    /// Quoted literal compared against a numeric attribute
    NotANumber(Literal),
    /// Numeric literal compared against a date attribute
    NotADate(Literal),
    /// Quoted literal that is not a `YYYY-MM-DD` date
    InvalidDate(Literal),
    /// Two attributes of different types
    Attributes {
        left: String,
        left_type: AttributeType,
        right: String,
        right_type: AttributeType,
    },
}

impl fmt::Display for TypeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeMismatch::NotAString(literal) => write!(f, "{} is not a string", literal),
            TypeMismatch::NotANumber(literal) => {
                write!(f, "{} cannot be parsed into a number", literal)
            }
            TypeMismatch::NotADate(literal) => write!(f, "{} is not a date", literal),
            TypeMismatch::InvalidDate(literal) => {
                write!(f, "{} cannot be parsed into a date", literal)
            }
            TypeMismatch::Attributes {
                left,
                left_type,
                right,
                right_type,
            } => write!(
                f,
                "{} and {} have different types ({}, {})",
                left, right, left_type, right_type
            ),
        }
    }
}

/// Errors raised by relation construction and algebra operations.
#[derive(Debug, Clone, PartialEq)]
pub enum RelationError {
    /// Two attributes share a name
    DuplicateAttribute(String),

    /// A row has the wrong number of values
    RowArity {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// A cell's value does not match its attribute's type
    CellType {
        row: usize,
        attribute: String,
        expected: AttributeType,
        found: AttributeType,
    },

    /// Operand schemas of a set operation differ
    SchemaMismatch(SetOp),

    /// An attribute is not part of the schema
    UnknownAttribute(String),

    /// A selection condition compares incompatible types
    TypeMismatch(TypeMismatch),
}

impl fmt::Display for RelationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationError::DuplicateAttribute(name) => {
                write!(f, "Attribute {} appears more than once", name)
            }
            RelationError::RowArity {
                row,
                expected,
                found,
            } => write!(f, "Row {} has {} values, expected {}", row, found, expected),
            RelationError::CellType {
                row,
                attribute,
                expected,
                found,
            } => write!(
                f,
                "Row {}: attribute {} expects a {} value, got {}",
                row, attribute, expected, found
            ),
            RelationError::SchemaMismatch(op) => write!(
                f,
                "Cannot apply {}: relations' attribute types don't match",
                op
            ),
            RelationError::UnknownAttribute(name) => {
                write!(f, "Relation's attributes do not include {}", name)
            }
            RelationError::TypeMismatch(mismatch) => write!(f, "{}", mismatch),
        }
    }
}

impl std::error::Error for RelationError {}

/// An immutable relation: a schema plus rows in a fixed order.
///
/// Rows may repeat unless an operation removes duplicates; equality is
/// structural.
///
/// # Examples
///
/// ```
/// use rela_lang::{Attribute, AttributeType, Relation, Schema, Value};
///
/// let schema = Schema::new(vec![
///     Attribute::new("id", AttributeType::Numeric),
///     Attribute::new("name", AttributeType::String),
/// ])
/// .unwrap();
///
/// let users = Relation::new(
///     schema,
///     vec![
///         vec![Value::from(1), Value::from("John")],
///         vec![Value::from(2), Value::from("Jane")],
///     ],
/// )
/// .unwrap();
///
/// let names = users.project(&["name".to_string()], false).unwrap();
/// assert_eq!(names.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    schema: Schema,
    rows: Vec<Row>,
}

impl Relation {
    /// Build a relation, checking every row against the schema.
    pub fn new(schema: Schema, rows: Vec<Row>) -> Result<Self, RelationError> {
        for (index, row) in rows.iter().enumerate() {
            if row.len() != schema.len() {
                return Err(RelationError::RowArity {
                    row: index,
                    expected: schema.len(),
                    found: row.len(),
                });
            }
            for (value, attribute) in row.iter().zip(schema.attributes()) {
                if value.attribute_type() != attribute.attr_type {
                    return Err(RelationError::CellType {
                        row: index,
                        attribute: attribute.name.clone(),
                        expected: attribute.attr_type,
                        found: value.attribute_type(),
                    });
                }
            }
        }
        Ok(Relation { schema, rows })
    }

    pub fn empty(schema: Schema) -> Self {
        Relation {
            schema,
            rows: Vec::new(),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.schema.attribute(name)
    }

    /// Rows as `attribute -> value` records, in row order.
    pub fn records(&self) -> Vec<Record> {
        self.rows
            .iter()
            .map(|row| Record {
                fields: self
                    .schema
                    .names()
                    .map(str::to_string)
                    .zip(row.iter().cloned())
                    .collect(),
            })
            .collect()
    }

    fn require_same_schema(&self, other: &Relation, op: SetOp) -> Result<(), RelationError> {
        if self.schema != other.schema {
            return Err(RelationError::SchemaMismatch(op));
        }
        Ok(())
    }

    /// Distinct rows of `self` followed by those of `other`, first-seen order.
    pub fn union(&self, other: &Relation) -> Result<Relation, RelationError> {
        self.require_same_schema(other, SetOp::Union)?;

        Ok(Relation {
            schema: self.schema.clone(),
            rows: distinct(self.rows.iter().chain(other.rows.iter())),
        })
    }

    /// Distinct rows of `self` that also occur in `other`, in `self`'s order.
    pub fn intersect(&self, other: &Relation) -> Result<Relation, RelationError> {
        self.require_same_schema(other, SetOp::Intersect)?;

        let lookup: HashSet<&Row> = other.rows.iter().collect();
        Ok(Relation {
            schema: self.schema.clone(),
            rows: distinct(self.rows.iter().filter(|row| lookup.contains(row))),
        })
    }

    /// Rows of `self` that do not occur in `other`, in `self`'s order.
    pub fn difference(&self, other: &Relation) -> Result<Relation, RelationError> {
        self.require_same_schema(other, SetOp::Difference)?;

        let lookup: HashSet<&Row> = other.rows.iter().collect();
        Ok(Relation {
            schema: self.schema.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| !lookup.contains(row))
                .cloned()
                .collect(),
        })
    }

    /// Cartesian product; `self` varies slowest.
    ///
    /// Clashing attribute names are qualified with the label of their side
    /// (`left.attr`, `right.attr`). Qualifying repeats until every name is
    /// unique, so a `Users.id` left over from an earlier product becomes
    /// `left.Users.id` when the right side contributes a fresh `Users.id`.
    /// Each attribute is qualified at most once; if equal labels still leave
    /// a clash, the product fails with [`RelationError::DuplicateAttribute`].
    pub fn product(
        &self,
        other: &Relation,
        left_label: &str,
        right_label: &str,
    ) -> Result<Relation, RelationError> {
        let left_len = self.schema.len();
        let mut attributes: Vec<Attribute> = self
            .schema
            .attributes()
            .iter()
            .chain(other.schema.attributes())
            .cloned()
            .collect();
        let mut qualified = vec![false; attributes.len()];

        loop {
            let clashing: Vec<usize> = {
                let mut counts: HashMap<&str, usize> = HashMap::new();
                for attribute in &attributes {
                    *counts.entry(attribute.name.as_str()).or_default() += 1;
                }
                attributes
                    .iter()
                    .enumerate()
                    .filter(|(index, a)| !qualified[*index] && counts[a.name.as_str()] > 1)
                    .map(|(index, _)| index)
                    .collect()
            };
            if clashing.is_empty() {
                break;
            }

            for index in clashing {
                let label = if index < left_len { left_label } else { right_label };
                let attribute = &mut attributes[index];
                attribute.name = format!("{}.{}", label, attribute.name);
                qualified[index] = true;
            }
        }
        let schema = Schema::new(attributes)?;

        let mut rows = Vec::with_capacity(self.rows.len() * other.rows.len());
        for left in &self.rows {
            for right in &other.rows {
                let mut row = Vec::with_capacity(left.len() + right.len());
                row.extend(left.iter().cloned());
                row.extend(right.iter().cloned());
                rows.push(row);
            }
        }

        Ok(Relation { schema, rows })
    }

    /// Restrict every row to `names`, in the order given.
    ///
    /// Duplicate result rows are kept unless `dedup` is set.
    pub fn project(&self, names: &[String], dedup: bool) -> Result<Relation, RelationError> {
        let mut indices = Vec::with_capacity(names.len());
        for name in names {
            let index = self
                .schema
                .index_of(name)
                .ok_or_else(|| RelationError::UnknownAttribute(name.clone()))?;
            indices.push(index);
        }

        let schema = Schema::new(
            indices
                .iter()
                .map(|&i| self.schema.attributes[i].clone())
                .collect(),
        )?;

        let projected = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect::<Row>());

        let rows = if dedup {
            let all: Vec<Row> = projected.collect();
            distinct(all.iter())
        } else {
            projected.collect()
        };

        Ok(Relation { schema, rows })
    }

    /// Keep the rows for which `attribute comparator rhs` holds.
    pub fn select(
        &self,
        attribute: &str,
        comparator: Comparator,
        rhs: Comparand<'_>,
    ) -> Result<Relation, RelationError> {
        let left = self
            .schema
            .index_of(attribute)
            .ok_or_else(|| RelationError::UnknownAttribute(attribute.to_string()))?;
        let left_type = self.schema.attributes[left].attr_type;

        let right = match rhs {
            Comparand::Attribute(name) => {
                let index = self
                    .schema
                    .index_of(name)
                    .ok_or_else(|| RelationError::UnknownAttribute(name.to_string()))?;
                let right_type = self.schema.attributes[index].attr_type;
                if right_type != left_type {
                    return Err(RelationError::TypeMismatch(TypeMismatch::Attributes {
                        left: attribute.to_string(),
                        left_type,
                        right: name.to_string(),
                        right_type,
                    }));
                }
                Side::Column(index)
            }
            Comparand::Literal(literal) => Side::Constant(coerce_literal(literal, left_type)?),
        };

        let rows = self
            .rows
            .iter()
            .filter(|row| {
                let rhs = match &right {
                    Side::Column(index) => &row[*index],
                    Side::Constant(value) => value,
                };
                row[left]
                    .compare(rhs)
                    .is_some_and(|ordering| comparator.holds(ordering))
            })
            .cloned()
            .collect();

        Ok(Relation {
            schema: self.schema.clone(),
            rows,
        })
    }
}

enum Side {
    Column(usize),
    Constant(Value),
}

/// Turn a literal into a value of `target` type, by its syntactic form.
fn coerce_literal(literal: &Literal, target: AttributeType) -> Result<Value, RelationError> {
    let mismatch = match (literal, target) {
        (Literal::Number(n), AttributeType::Numeric) => return Ok(Value::Numeric(*n)),
        (Literal::String(s), AttributeType::String) => return Ok(Value::String(s.clone())),
        (Literal::String(s), AttributeType::Date) => match Value::parse_date(s) {
            Some(date) => return Ok(date),
            None => TypeMismatch::InvalidDate(literal.clone()),
        },
        (Literal::Number(_), AttributeType::String) => TypeMismatch::NotAString(literal.clone()),
        (Literal::Number(_), AttributeType::Date) => TypeMismatch::NotADate(literal.clone()),
        (Literal::String(_), AttributeType::Numeric) => TypeMismatch::NotANumber(literal.clone()),
    };
    Err(RelationError::TypeMismatch(mismatch))
}

/// Clone rows in order, dropping any tuple already seen.
fn distinct<'a>(rows: impl Iterator<Item = &'a Row>) -> Vec<Row> {
    let mut seen = HashSet::new();
    rows.filter(|row| seen.insert(*row)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(values: &[i64]) -> Relation {
        let schema = Schema::new(vec![Attribute::new("n", AttributeType::Numeric)]).unwrap();
        Relation::new(schema, values.iter().map(|&v| vec![Value::from(v)]).collect()).unwrap()
    }

    #[test]
    fn test_schema_rejects_duplicate_names() {
        let err = Schema::new(vec![
            Attribute::new("id", AttributeType::Numeric),
            Attribute::new("id", AttributeType::String),
        ])
        .unwrap_err();
        assert_eq!(err, RelationError::DuplicateAttribute("id".to_string()));
    }

    #[test]
    fn test_new_checks_arity_and_types() {
        let schema = Schema::new(vec![Attribute::new("n", AttributeType::Numeric)]).unwrap();
        assert!(matches!(
            Relation::new(schema.clone(), vec![vec![]]),
            Err(RelationError::RowArity { row: 0, expected: 1, found: 0 })
        ));
        assert!(matches!(
            Relation::new(schema, vec![vec![Value::from("x")]]),
            Err(RelationError::CellType { .. })
        ));
    }

    #[test]
    fn test_union_collapses_duplicates_within_an_operand() {
        let result = numbers(&[1, 1, 2]).union(&numbers(&[2, 3])).unwrap();
        assert_eq!(result, numbers(&[1, 2, 3]));
    }

    #[test]
    fn test_intersect_emits_each_tuple_once() {
        let result = numbers(&[1, 2, 1, 3]).intersect(&numbers(&[1, 3])).unwrap();
        assert_eq!(result, numbers(&[1, 3]));
    }

    #[test]
    fn test_difference_keeps_order() {
        let result = numbers(&[3, 1, 2]).difference(&numbers(&[1])).unwrap();
        assert_eq!(result, numbers(&[3, 2]));
    }

    #[test]
    fn test_project_dedup_option() {
        let rel = numbers(&[1, 1, 2]);
        let names = vec!["n".to_string()];
        assert_eq!(rel.project(&names, false).unwrap().len(), 3);
        assert_eq!(rel.project(&names, true).unwrap().len(), 2);
    }

    #[test]
    fn test_select_on_empty_relation() {
        let rel = numbers(&[]);
        let literal = Literal::Number(5.into());
        let result = rel
            .select("n", Comparator::LessThan, Comparand::Literal(&literal))
            .unwrap();
        assert!(result.is_empty());
        assert_eq!(result.schema(), rel.schema());
    }
}
