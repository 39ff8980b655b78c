//! The diet reader.
//!
//! `ParserState` scans one source unit and drives a `RecoverySession` with
//! what it recognizes: declaration headers become fragments, braces,
//! semicolons, modifiers and annotation names become events. It never
//! fails; anything it cannot make sense of is reported and skipped.
//!
//! With `ParserOptions::diet`, method and initializer bodies whose braces
//! balance are skipped entirely, which is how outlines of large units are
//! recovered cheaply.

mod brace_table;
mod parse_rules;
mod state;
mod state_declarations;
mod state_expressions;
mod state_statements;
mod state_types;

pub use state::{ParserOptions, ParserState};

use crate::recovery::RecoveryResult;

/// Read `source` and return its recovered tree with every diagnostic.
pub fn parse_source(file_name: &str, source: &str, options: ParserOptions) -> RecoveryResult {
    ParserState::with_options(file_name.to_string(), source.to_string(), options).into_result()
}

#[cfg(test)]
#[path = "tests/reader_tests.rs"]
mod tests;
