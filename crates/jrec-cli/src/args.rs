use clap::{Parser, ValueEnum};
use jrec::ParserOptions;
use std::path::PathBuf;

/// CLI arguments for the jrec binary.
#[derive(Parser, Debug)]
#[command(
    name = "jrec",
    version,
    about = "Recover the declarations of Java source files that do not parse"
)]
pub struct CliArgs {
    /// Source files to read.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// What to print for each file.
    #[arg(long, value_enum, ignore_case = true, default_value_t = OutputFormat::Outline)]
    pub format: OutputFormat,

    /// Print the problems found while recovering, with line:column positions.
    #[arg(short = 'd', long)]
    pub diagnostics: bool,

    /// Disable colored diagnostics.
    #[arg(long = "no-color", alias = "noColor")]
    pub no_color: bool,

    /// Skip method and initializer bodies whose braces balance.
    #[arg(long, conflicts_with = "statements_recovery")]
    pub diet: bool,

    /// Read the statements of method and initializer bodies (the default).
    #[arg(long = "statements-recovery", alias = "statementsRecovery")]
    pub statements_recovery: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Java-like outline of every declaration.
    Outline,
    /// The recovered tree and its diagnostics as JSON.
    Json,
    /// One line per declaration with its kind and span.
    Tree,
}

impl CliArgs {
    pub fn parser_options(&self) -> ParserOptions {
        if self.diet {
            ParserOptions::diet()
        } else {
            ParserOptions::default()
        }
    }
}
