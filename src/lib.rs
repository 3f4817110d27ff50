//! # linux-troubleshooter
//!
//! Run system-maintenance commands without blocking the caller, stream their
//! output line by line, and install local package files only when they are
//! not already installed.
//!
//! The crate has two parts:
//!
//! - [`exec`]: launches one external command per call on a tokio task and
//!   yields [`ExecutionEvent`]s: `Progress(0)`, log lines as they arrive,
//!   `Progress(100)`, and a single terminal `Completed`.
//! - [`install`]: [`InstallGuard`] reads a package file's name, checks
//!   whether it is installed, and either short-circuits or starts
//!   `sudo apt install <file> -y` through the executor.
//!
//! Presentation is left to the caller: consume an [`EventStream`] directly,
//! or implement [`EventSink`] for callback-style delivery.
//!
//! ## Example
//!
//! ```rust,no_run
//! use linux_troubleshooter::{exec, ExecutionEvent, MaintenanceTask};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut events = exec::run(MaintenanceTask::CheckDiskSpace.command());
//!     while let Some(event) = events.recv().await {
//!         if let ExecutionEvent::LogLine { text } = event {
//!             println!("{}", text);
//!         }
//!     }
//! }
//! ```

mod command;
mod config;
pub mod exec;
pub mod install;

pub use command::{Command, MaintenanceTask};
pub use config::{CommandTable, ConfigError, PackageSettings, Settings, CONFIG_ENV_VAR};
pub use exec::{Completion, EventSink, EventStream, ExecutionEvent};
pub use install::{
    default_installer, install_command, parse_package_field, render_installer, Dpkg,
    InstallDecision, InstallGuard, InstallOutcome, PackageBackend, FILE_PLACEHOLDER,
    INSTALLED_MARKER,
};
