//! CLI support for rela
//!
//! Provides programmatic access to the `rela` binary's functionality so
//! scripts can be run the same way from other tools.

mod convert;
mod docs;
mod run;

pub use convert::{environment_to_json, json_to_environment, relation_to_json, value_to_json};
pub use docs::{DocCategory, get_doc_category, get_docs_overview};
pub use run::{OutputFormat, RunOptions, RunResult, execute_run, render};

use std::io;

use crate::RelationError;

/// Errors that can occur during CLI operations
#[derive(Debug)]
pub enum CliError {
    /// Script failed to parse or evaluate
    Engine(crate::Error),
    /// Relations file has the wrong shape
    Load(String),
    /// A relation in the relations file violates its own schema
    Relation { name: String, source: RelationError },
    /// JSON parsing error
    Json(serde_json::Error),
    /// IO error
    Io(io::Error),
    /// No script provided
    NoScript,
    /// Requested output binding does not exist
    UnknownBinding(String),
    /// Unknown documentation category
    UnknownCategory(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Engine(e) => write!(f, "Error: {}", e),
            CliError::Load(msg) => write!(f, "Invalid relations file: {}", msg),
            CliError::Relation { name, source } => {
                write!(f, "Invalid relation '{}': {}", name, source)
            }
            CliError::Json(e) => write!(f, "Invalid JSON: {}", e),
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::NoScript => write!(
                f,
                "No script provided. Use --script, -e, or pipe the script to stdin."
            ),
            CliError::UnknownBinding(name) => write!(f, "No relation named '{}' to show", name),
            CliError::UnknownCategory(c) => {
                write!(f, "Unknown category: '{}'\nRun 'rela docs' to see available categories.", c)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Engine(e) => Some(e),
            CliError::Relation { source, .. } => Some(source),
            CliError::Json(e) => Some(e),
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<crate::Error> for CliError {
    fn from(e: crate::Error) -> Self {
        CliError::Engine(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}
