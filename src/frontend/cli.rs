//! Command-line arguments for the `troubleshooter` binary.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Run system-maintenance commands with live output.
#[derive(Debug, Clone, Parser)]
#[command(name = "troubleshooter", version, about, long_about = None)]
pub struct CliArgs {
    /// Settings file (TOML). Falls back to `TROUBLESHOOTER_CONFIG`.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TROUBLESHOOTER_LOG` or `warn` is used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    /// Print events as JSON lines instead of plain text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Action,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Action {
    /// Show the maintenance menu.
    List,

    /// Run a menu entry by label or 1-based number.
    Run {
        /// Label or number from `list`.
        task: String,
    },

    /// Run an arbitrary command.
    Exec {
        /// Program followed by its arguments.
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        argv: Vec<String>,
    },

    /// Report whether a package file would be installed.
    Check {
        /// Path to a `.deb` file.
        file: PathBuf,
    },

    /// Install a package file unless it is already installed.
    Install {
        /// Path to a `.deb` file.
        file: PathBuf,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

pub fn parse() -> CliArgs {
    CliArgs::parse()
}
