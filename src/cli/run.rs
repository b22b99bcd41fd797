//! Execute rela scripts against relations loaded from JSON

use tracing::debug;

use super::{CliError, environment_to_json, json_to_environment};
use crate::{Environment, EvalOptions, Interpreter, output::environment_to_tables};

/// How the final environment is rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
}

/// Options for the run command
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Script lines, in order
    pub script: Vec<String>,
    /// Relations document (JSON); an empty environment when absent
    pub relations: Option<String>,
    /// Output rendering
    pub format: OutputFormat,
    /// Pretty-print JSON output
    pub pretty: bool,
    /// Only validate syntax, don't execute
    pub syntax_only: bool,
    /// Bindings to print; all when empty
    pub show: Vec<String>,
    /// Evaluation settings
    pub eval: EvalOptions,
}

/// Result of a run operation
#[derive(Debug)]
pub enum RunResult {
    /// Every line parsed; holds the statement count
    SyntaxValid(usize),
    /// Script executed successfully, leaving this environment
    Success(Environment),
}

/// Execute a rela run operation
pub fn execute_run(options: &RunOptions) -> Result<RunResult, CliError> {
    let interpreter = Interpreter::with_options(options.eval);

    if options.syntax_only {
        let statements = interpreter.check(&options.script)?;
        return Ok(RunResult::SyntaxValid(statements.len()));
    }

    let env = match &options.relations {
        Some(text) => json_to_environment(serde_json::from_str(text)?)?,
        None => Environment::new(),
    };
    debug!(relations = env.len(), "loaded relations");

    let env = interpreter.run(&options.script, env)?;

    if let Some(missing) = options.show.iter().find(|name| !env.contains_key(*name)) {
        return Err(CliError::UnknownBinding(missing.clone()));
    }

    Ok(RunResult::Success(env))
}

/// Render a finished environment according to `options`
pub fn render(env: &Environment, options: &RunOptions) -> Result<String, CliError> {
    match options.format {
        OutputFormat::Json => {
            let json = environment_to_json(env, &options.show);
            let text = if options.pretty {
                serde_json::to_string_pretty(&json)?
            } else {
                serde_json::to_string(&json)?
            };
            Ok(text)
        }
        OutputFormat::Table => Ok(environment_to_tables(env, &options.show)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RELATIONS: &str = r#"{
        "Users": {
            "schema": [{"name": "id", "type": "numeric"}, {"name": "name", "type": "string"}],
            "rows": [[1, "John"], [2, "Jane"], [3, "Peter"]]
        }
    }"#;

    fn options(script: &[&str]) -> RunOptions {
        RunOptions {
            script: script.iter().map(|s| s.to_string()).collect(),
            relations: Some(RELATIONS.to_string()),
            show: vec!["Res".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_run_and_render_json() {
        let opts = options(&["Users[id > 2] -> Res"]);
        let RunResult::Success(env) = execute_run(&opts).unwrap() else {
            panic!("Expected execution");
        };
        assert_eq!(render(&env, &opts).unwrap(), r#"{"Res":[{"id":3,"name":"Peter"}]}"#);
    }

    #[test]
    fn test_syntax_only_skips_relations() {
        let mut opts = options(&["Missing -> Res", "Res[id] -> Ids"]);
        opts.syntax_only = true;
        opts.relations = Some("not json".to_string());
        assert!(matches!(execute_run(&opts).unwrap(), RunResult::SyntaxValid(2)));
    }

    #[test]
    fn test_unknown_show_name() {
        let mut opts = options(&["Users -> Copy"]);
        opts.show = vec!["Nope".to_string()];
        assert!(matches!(execute_run(&opts), Err(CliError::UnknownBinding(name)) if name == "Nope"));
    }
}
