//! Runs scripts line by line against an environment.
//!
//! Each line is parsed, evaluated against the bindings accumulated so far,
//! and its result bound under the line's target name. The first failure
//! aborts the run.

use std::fmt;

use tracing::{debug, info};

use crate::{
    ast::Statement,
    evaluator::{Environment, EvalError, EvalOptions, Evaluator},
    parser::{ParseError, parse_line},
};

/// Errors surfaced by a script run.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A line is not of the form `<expression> -> <identifier>`
    Syntax { line: String, source: ParseError },

    /// A well-formed line failed to evaluate
    Eval(EvalError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Syntax { line, source } => write!(f, "Syntax error in '{}': {}", line, source),
            Error::Eval(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Syntax { source, .. } => Some(source),
            Error::Eval(e) => Some(e),
        }
    }
}

impl From<EvalError> for Error {
    fn from(e: EvalError) -> Self {
        Error::Eval(e)
    }
}

/// Runs `lines` against `env` with default options.
///
/// # Examples
///
/// ```
/// use rela_lang::{Attribute, AttributeType, Environment, Relation, Schema, Value, run};
///
/// let schema = Schema::new(vec![Attribute::new("id", AttributeType::Numeric)]).unwrap();
/// let users = Relation::new(schema, vec![vec![Value::from(1)], vec![Value::from(2)]]).unwrap();
///
/// let mut env = Environment::new();
/// env.insert("Users".to_string(), users);
///
/// let env = run(["Users[id > 1] -> Later"], env).unwrap();
/// assert_eq!(env["Later"].len(), 1);
/// ```
pub fn run<I, S>(lines: I, env: Environment) -> Result<Environment, Error>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Interpreter::new().run(lines, env)
}

/// Lines that carry no statement: blank, or starting with `#`.
fn is_skippable(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// Sequential script driver.
#[derive(Debug, Clone, Default)]
pub struct Interpreter {
    options: EvalOptions,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: EvalOptions) -> Self {
        Interpreter { options }
    }

    pub fn options(&self) -> EvalOptions {
        self.options
    }

    /// Runs every line in order, returning the extended environment.
    pub fn run<I, S>(&self, lines: I, mut env: Environment) -> Result<Environment, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut executed = 0usize;
        for line in lines {
            if self.execute_line(line.as_ref(), &mut env)?.is_some() {
                executed += 1;
            }
        }
        info!(lines = executed, bindings = env.len(), "script finished");
        Ok(env)
    }

    /// Executes one line, binding its result into `env`.
    ///
    /// Returns the bound name, or `None` for blank and comment lines.
    pub fn execute_line(&self, line: &str, env: &mut Environment) -> Result<Option<String>, Error> {
        if is_skippable(line) {
            return Ok(None);
        }

        debug!(line = line.trim(), "executing");
        let Statement { expr, target } = parse_statement(line)?;
        let relation = Evaluator::with_options(env, self.options).evaluate(&expr)?;

        debug!(
            target = %target,
            rows = relation.len(),
            attributes = relation.schema().len(),
            "bound relation"
        );
        env.insert(target.clone(), relation);
        Ok(Some(target))
    }

    /// Parses every line without evaluating anything.
    pub fn check<I, S>(&self, lines: I) -> Result<Vec<Statement>, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        lines
            .into_iter()
            .filter(|line| !is_skippable(line.as_ref()))
            .map(|line| parse_statement(line.as_ref()))
            .collect()
    }
}

fn parse_statement(line: &str) -> Result<Statement, Error> {
    parse_line(line).map_err(|source| Error::Syntax {
        line: line.trim().to_string(),
        source,
    })
}
