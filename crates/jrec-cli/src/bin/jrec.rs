use anyhow::Result;
use clap::Parser;
use std::io::{IsTerminal, Write};

use jrec_cli::args::CliArgs;
use jrec_cli::driver;

fn main() -> Result<()> {
    // Initialize tracing if JREC_LOG or RUST_LOG is set.
    jrec::tracing_config::init_tracing();

    let args = CliArgs::parse();
    let color = !args.no_color && std::io::stdout().is_terminal();
    if !color {
        colored::control::set_override(false);
    }

    let output = driver::run(&args, color)?;
    tracing::debug!(diagnostics = output.diagnostic_count, "run finished");

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.stdout.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
