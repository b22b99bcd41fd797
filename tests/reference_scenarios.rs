// Reference Scenario Tests
//
// End-to-end behavior over the two reference relations:
//   Users  {id: numeric, name: string} = (1, John), (2, Jane), (3, Peter)
//   Admins {id: numeric, name: string} = (1, John), (2, Anne)

use rela_lang::{
    Attribute, AttributeOp, AttributeType, Environment, Error, EvalError, Relation, Schema,
    Value, run,
};

fn people(rows: &[(i64, &str)]) -> Relation {
    let schema = Schema::new(vec![
        Attribute::new("id", AttributeType::Numeric),
        Attribute::new("name", AttributeType::String),
    ])
    .unwrap();
    Relation::new(
        schema,
        rows.iter()
            .map(|(id, name)| vec![Value::from(*id), Value::from(*name)])
            .collect(),
    )
    .unwrap()
}

fn env() -> Environment {
    let mut env = Environment::new();
    env.insert(
        "Users".to_string(),
        people(&[(1, "John"), (2, "Jane"), (3, "Peter")]),
    );
    env.insert("Admins".to_string(), people(&[(1, "John"), (2, "Anne")]));
    env
}

fn result_of(line: &str) -> Result<Relation, Error> {
    let mut env = run([line], env())?;
    Ok(env.remove("Res").expect("Res is bound"))
}

/// `(id, name)` pairs of a relation, in row order
fn rows(relation: &Relation) -> Vec<(i64, String)> {
    relation
        .records()
        .iter()
        .map(|r| {
            let id = r.get("id").and_then(Value::as_decimal).unwrap();
            let name = r.get("name").unwrap().to_string();
            (id.try_into().unwrap(), name)
        })
        .collect()
}

fn expect(pairs: &[(i64, &str)]) -> Vec<(i64, String)> {
    pairs.iter().map(|(id, name)| (*id, name.to_string())).collect()
}

// ============================================================================
// Section: Set Operations
// ============================================================================

#[test]
fn scenario_intersection() {
    let res = result_of("Users & Admins -> Res").unwrap();
    assert_eq!(rows(&res), expect(&[(1, "John")]));
}

#[test]
fn scenario_union() {
    let res = result_of("Users | Admins -> Res").unwrap();
    assert_eq!(
        rows(&res),
        expect(&[(1, "John"), (2, "Jane"), (3, "Peter"), (2, "Anne")])
    );
}

#[test]
fn scenario_difference() {
    let res = result_of("Users \\ Admins -> Res").unwrap();
    assert_eq!(rows(&res), expect(&[(2, "Jane"), (3, "Peter")]));
}

#[test]
fn scenario_symmetric_difference() {
    let res = result_of("(Users \\ Admins) | (Admins \\ Users) -> Res").unwrap();
    assert_eq!(rows(&res), expect(&[(2, "Jane"), (3, "Peter"), (2, "Anne")]));
}

// ============================================================================
// Section: Product
// ============================================================================

#[test]
fn scenario_product() {
    let res = result_of("Users * Admins -> Res").unwrap();
    assert_eq!(res.len(), 6);
    assert_eq!(
        res.schema().names().collect::<Vec<_>>(),
        vec!["Users.id", "Users.name", "Admins.id", "Admins.name"]
    );
    let first = &res.records()[0];
    assert_eq!(first.get("Users.name"), Some(&Value::from("John")));
    assert_eq!(first.get("Admins.name"), Some(&Value::from("John")));
}

// ============================================================================
// Section: Selection
// ============================================================================

#[test]
fn scenario_selection_numeric() {
    let res = result_of("Users[id>1] -> Res").unwrap();
    assert_eq!(rows(&res), expect(&[(2, "Jane"), (3, "Peter")]));
}

#[test]
fn scenario_selection_string() {
    let res = result_of("Users[name='John'] -> Res").unwrap();
    assert_eq!(rows(&res), expect(&[(1, "John")]));
}

#[test]
fn scenario_selection_string_literal_against_number() {
    let err = result_of("Users[name=1] -> Res").unwrap_err();
    match &err {
        Error::Eval(EvalError::TypeMismatch { mismatch, .. }) => {
            assert_eq!(mismatch.to_string(), "1 is not a string");
        }
        other => panic!("Expected type mismatch, got {:?}", other),
    }
    assert_eq!(err.to_string(), "Cannot apply Limit(name=1): 1 is not a string");
}

#[test]
fn scenario_selection_numeric_literal_against_string() {
    let err = result_of("Users[id='John'] -> Res").unwrap_err();
    match &err {
        Error::Eval(EvalError::TypeMismatch { mismatch, .. }) => {
            assert_eq!(mismatch.to_string(), "'John' cannot be parsed into a number");
        }
        other => panic!("Expected type mismatch, got {:?}", other),
    }
    assert_eq!(
        err.to_string(),
        "Cannot apply Limit(id='John'): 'John' cannot be parsed into a number"
    );
}

// ============================================================================
// Section: Projection
// ============================================================================

#[test]
fn scenario_projection_unknown_attribute() {
    let err = result_of("Users[year_of_birth] -> Res").unwrap_err();
    match &err {
        Error::Eval(EvalError::UnknownAttribute {
            op: AttributeOp::Projection(_),
            attribute,
        }) => assert_eq!(attribute, "year_of_birth"),
        other => panic!("Expected unknown attribute, got {:?}", other),
    }
    assert_eq!(
        err.to_string(),
        "Cannot apply Projection(year_of_birth): relation's attributes do not include year_of_birth"
    );
}

#[test]
fn scenario_projection_keeps_row_count() {
    let res = result_of("(Users | Admins)[id] -> Res").unwrap();
    assert_eq!(res.len(), 4);
    assert_eq!(res.schema().len(), 1);
}
