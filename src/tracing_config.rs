//! Logging for the `jrec` binary.
//!
//! Recovery decides where every fragment and brace of a broken unit goes.
//! When a recovered outline looks wrong, those decisions are what you want
//! to read, so the parser crates trace each of them:
//!
//! - `jrec_parser::recovery` at `trace`: absorb, bubble, close and
//!   rollback decisions; at `debug`: checkpoints and finalization.
//! - `jrec_parser::parser` at `trace`: headers, captures and skipped bodies.
//!
//! `JREC_LOG` takes ordinary filter directives plus the short names
//! `recovery`, `session` and `reader`:
//!
//! ```bash
//! # Every recovery decision as an indented tree
//! JREC_LOG=recovery JREC_LOG_FORMAT=tree jrec Broken.java
//!
//! # Checkpoints and finalization only, as JSON
//! JREC_LOG=session JREC_LOG_FORMAT=json jrec Broken.java
//!
//! # Short names mix with directives
//! JREC_LOG="reader,jrec_parser::recovery::finalize=debug" jrec Broken.java
//! ```
//!
//! `RUST_LOG` is read when `JREC_LOG` is unset. With neither, nothing is
//! installed and reading costs no logging at all.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

/// How trace output is laid out on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One line per event (default).
    Text,
    /// Events indented under the spans they happen in.
    Tree,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Parse a format name; unknown names mean `Text`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Expand the short names of `JREC_LOG` into filter directives.
fn expand_directive(directive: &str) -> &str {
    match directive.trim() {
        "recovery" => "jrec_parser::recovery=trace",
        "session" => "jrec_parser::recovery=debug",
        "reader" => "jrec_parser::parser=trace",
        other => other,
    }
}

/// Logging resolved from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Filter directives, short names already expanded.
    pub filter: String,
    pub format: LogFormat,
}

impl LogSettings {
    /// Settings from the values of `JREC_LOG`, `RUST_LOG` and
    /// `JREC_LOG_FORMAT`. `None` when neither filter variable is set.
    pub fn resolve(
        jrec_log: Option<&str>,
        rust_log: Option<&str>,
        format: Option<&str>,
    ) -> Option<Self> {
        let filter = match (jrec_log, rust_log) {
            (Some(jrec), _) => jrec
                .split(',')
                .filter(|d| !d.trim().is_empty())
                .map(expand_directive)
                .collect::<Vec<_>>()
                .join(","),
            (None, Some(rust)) => rust.to_string(),
            (None, None) => return None,
        };
        Some(LogSettings {
            filter,
            format: LogFormat::parse(format.unwrap_or_default()),
        })
    }

    pub fn from_env() -> Option<Self> {
        let var = |name| std::env::var(name).ok();
        LogSettings::resolve(
            var("JREC_LOG").as_deref(),
            var("RUST_LOG").as_deref(),
            var("JREC_LOG_FORMAT").as_deref(),
        )
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::builder().parse_lossy(&self.filter)
    }
}

/// Install the global subscriber described by the environment. Output goes
/// to stderr so it never mixes with the outline on stdout.
pub fn init_tracing() {
    if let Some(settings) = LogSettings::from_env() {
        install(&settings);
    }
}

fn install(settings: &LogSettings) {
    let filter = settings.env_filter();
    match settings.format {
        LogFormat::Tree => {
            let tree_layer = tracing_tree::HierarchicalLayer::default()
                .with_writer(std::io::stderr)
                .with_indent_amount(2)
                .with_indent_lines(true)
                .with_targets(true);
            Registry::default().with(filter).with(tree_layer).init();
        }
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);
            Registry::default().with(filter).with(json_layer).init();
        }
        LogFormat::Text => {
            let text_layer = fmt::layer().with_target(true).with_writer(std::io::stderr);
            Registry::default().with(filter).with(text_layer).init();
        }
    }
}
