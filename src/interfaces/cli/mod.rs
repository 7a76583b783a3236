//! Command-line interface for SubSym.

use std::fmt;
use std::path::PathBuf;

use clap::Parser;

use crate::io::format::{log_display, log_title, subsym_output};

/// The current version of SubSym.
const VERSION: Option<&str> = option_env!("CARGO_PKG_VERSION");

// =======
// Structs
// =======

/// Structure to handle command-line interface parsing. SubSym takes no
/// required arguments: it locates `INDSOD`, `SPOSCAR` and `SGO` in the
/// working directory.
#[derive(Parser, Debug)]
#[command(author, version, about)]
#[command(next_line_help = true)]
pub struct Cli {
    /// The working directory holding INDSOD, SPOSCAR and SGO.
    #[arg(short = 'C', long, default_value = ".")]
    pub directory: PathBuf,

    /// Turn debugging information on.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub debug: u8,
}

impl fmt::Display for Cli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<17}: {}",
            "Working directory",
            self.directory.display()
        )?;
        writeln!(f, "{:<17}: {}", "Debug level", self.debug)?;
        Ok(())
    }
}

// =========
// Functions
// =========

/// Outputs a nicely formatted SubSym heading to the `subsym-output` logger.
pub fn subsym_output_heading() {
    let version = if let Some(ver) = VERSION {
        format!("v{ver}")
    } else {
        "v unknown".to_string()
    };
    subsym_output!("╭─────────────────────────────────────────────────────────────────────────────╮");
    subsym_output!("│                                                                             │");
    subsym_output!("│   ███████ ██    ██ ██████  ███████ ██    ██ ███    ███                      │");
    subsym_output!("│   ██      ██    ██ ██   ██ ██       ██  ██  ████  ████                      │");
    subsym_output!("│   ███████ ██    ██ ██████  ███████   ████   ██ ████ ██                      │");
    subsym_output!("│        ██ ██    ██ ██   ██      ██    ██    ██  ██  ██                      │");
    subsym_output!("│   ███████  ██████  ██████  ███████    ██    ██      ██                      │");
    subsym_output!("│                                                                             │");
    subsym_output!("│       symmetry-irreducible substitutional configurations {version:>10}          │");
    subsym_output!("│                                                                             │");
    subsym_output!("╰─────────────────────────────────────────────────────────────────────────────╯");
    subsym_output!("");
}

/// Outputs a summary of the run location.
///
/// # Arguments
///
/// * `cli` - The parsed command-line arguments.
pub fn subsym_output_run_summary(cli: &Cli) {
    log_title("Run Summary");
    subsym_output!("");
    log_display(cli);
    subsym_output!("");
}
