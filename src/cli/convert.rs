//! JSON <-> relation conversion utilities
//!
//! Relations files look like:
//!
//! ```text
//! {
//!   "Users": {
//!     "schema": [{"name": "id", "type": "numeric"}, {"name": "name", "type": "string"}],
//!     "rows": [[1, "John"], [2, "Jane"]]
//!   }
//! }
//! ```

use std::{str::FromStr, sync::LazyLock};

use regex::Regex;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde_json::{Map, Number};

use super::CliError;
use crate::{Attribute, AttributeType, Environment, Relation, RelationError, Schema, Value};

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid")
});

fn check_identifier(kind: &str, name: &str) -> Result<(), CliError> {
    if IDENTIFIER.is_match(name) {
        Ok(())
    } else {
        Err(CliError::Load(format!(
            "{} name '{}' is not a valid identifier",
            kind, name
        )))
    }
}

/// Convert a relations document into an environment
pub fn json_to_environment(v: serde_json::Value) -> Result<Environment, CliError> {
    let serde_json::Value::Object(relations) = v else {
        return Err(CliError::Load("top level must be an object of relations".into()));
    };

    let mut env = Environment::new();
    for (name, body) in relations {
        check_identifier("Relation", &name)?;
        let relation = json_to_relation(&name, body)?;
        env.insert(name, relation);
    }
    Ok(env)
}

fn json_to_relation(name: &str, v: serde_json::Value) -> Result<Relation, CliError> {
    let serde_json::Value::Object(mut body) = v else {
        return Err(CliError::Load(format!("relation '{}' must be an object", name)));
    };

    let attributes = match body.remove("schema") {
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .map(|item| json_to_attribute(name, item))
            .collect::<Result<Vec<_>, _>>()?,
        _ => {
            return Err(CliError::Load(format!(
                "relation '{}' needs a \"schema\" array",
                name
            )));
        }
    };

    let rows = match body.remove("rows") {
        Some(serde_json::Value::Array(rows)) => rows,
        None => Vec::new(),
        Some(_) => {
            return Err(CliError::Load(format!(
                "relation '{}': \"rows\" must be an array",
                name
            )));
        }
    };

    let schema = Schema::new(attributes).map_err(|source| CliError::Relation {
        name: name.to_string(),
        source,
    })?;

    let mut values = Vec::with_capacity(rows.len());
    for (index, row) in rows.into_iter().enumerate() {
        let serde_json::Value::Array(cells) = row else {
            return Err(CliError::Load(format!(
                "relation '{}': row {} must be an array",
                name, index
            )));
        };
        if cells.len() != schema.len() {
            return Err(CliError::Relation {
                name: name.to_string(),
                source: RelationError::RowArity {
                    row: index,
                    expected: schema.len(),
                    found: cells.len(),
                },
            });
        }
        let row = cells
            .into_iter()
            .zip(schema.attributes())
            .map(|(cell, attribute)| json_to_value(cell, attribute))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| {
                CliError::Load(format!(
                    "relation '{}': row {} has a cell that does not match its attribute type",
                    name, index
                ))
            })?;
        values.push(row);
    }

    Relation::new(schema, values).map_err(|source| CliError::Relation {
        name: name.to_string(),
        source,
    })
}

fn json_to_attribute(relation: &str, v: &serde_json::Value) -> Result<Attribute, CliError> {
    let name = v.get("name").and_then(serde_json::Value::as_str);
    let attr_type = v.get("type").and_then(serde_json::Value::as_str);

    match (name, attr_type) {
        (Some(name), Some(attr_type)) => {
            check_identifier("Attribute", name)?;
            let attr_type = AttributeType::parse(attr_type).ok_or_else(|| {
                CliError::Load(format!(
                    "relation '{}': unknown type '{}' for attribute '{}'",
                    relation, attr_type, name
                ))
            })?;
            Ok(Attribute::new(name, attr_type))
        }
        _ => Err(CliError::Load(format!(
            "relation '{}': attributes need a \"name\" and a \"type\"",
            relation
        ))),
    }
}

fn json_to_value(v: serde_json::Value, attribute: &Attribute) -> Option<Value> {
    match (attribute.attr_type, v) {
        (AttributeType::Numeric, serde_json::Value::Number(n)) => {
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
                .map(Value::Numeric)
        }
        (AttributeType::String, serde_json::Value::String(s)) => Some(Value::String(s)),
        (AttributeType::Date, serde_json::Value::String(s)) => Value::parse_date(&s),
        _ => None,
    }
}

/// Convert a value to JSON; integral numbers become JSON integers
pub fn value_to_json(v: &Value) -> serde_json::Value {
    match v {
        Value::Numeric(n) => {
            if n.is_integer()
                && let Some(i) = n.to_i64()
            {
                serde_json::Value::Number(i.into())
            } else {
                // Exact digits; needs serde_json's arbitrary_precision
                let text = v.to_string();
                Number::from_str(&text)
                    .map(serde_json::Value::Number)
                    .unwrap_or(serde_json::Value::String(text))
            }
        }
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Date(_) => serde_json::Value::String(v.to_string()),
    }
}

/// Convert a relation to an array of `{attribute: value}` objects
pub fn relation_to_json(relation: &Relation) -> serde_json::Value {
    serde_json::Value::Array(
        relation
            .records()
            .into_iter()
            .map(|record| {
                serde_json::Value::Object(
                    record
                        .fields()
                        .iter()
                        .map(|(name, value)| (name.clone(), value_to_json(value)))
                        .collect::<Map<_, _>>(),
                )
            })
            .collect(),
    )
}

/// Convert the bindings named in `names` (all when empty) to a JSON object
pub fn environment_to_json(env: &Environment, names: &[String]) -> serde_json::Value {
    serde_json::Value::Object(
        env.iter()
            .filter(|(name, _)| names.is_empty() || names.contains(name))
            .map(|(name, relation)| (name.clone(), relation_to_json(relation)))
            .collect(),
    )
}
