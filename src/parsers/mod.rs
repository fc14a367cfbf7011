//! Parsing of the translator-style task input: a text stream holding the
//! metric flag, variables, initial state, goal, operators, axioms, the
//! causal graph, the successor-generator decision tree, and the per-variable
//! domain transition graphs.

mod task;
mod tokens;

pub use task::parse_task;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed task input near: {context}")]
    Malformed { context: String },
    #[error("task input failed validation: {0}")]
    Invalid(String),
}

impl ParseError {
    pub(crate) fn from_remaining(remaining: &str) -> Self {
        let context: String = remaining.chars().take(40).collect();
        ParseError::Malformed { context }
    }
}
