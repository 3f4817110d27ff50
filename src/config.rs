//! Command table and settings loaded at startup.
//!
//! Settings come from an optional TOML file. Without one, the built-in
//! maintenance menu and `dpkg` defaults apply.
//!
//! ```toml
//! [[task]]
//! label = "Check disk space"
//! command = ["df", "-h"]
//!
//! [package]
//! inspect_program = "dpkg-deb"
//! status_program = "dpkg"
//! query_timeout_secs = 10
//! installer = ["sudo", "apt", "install", "{file}", "-y"]
//! ```

use crate::install::{default_installer, Dpkg, InstallGuard};
use crate::{Command, MaintenanceTask};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming a settings file.
pub const CONFIG_ENV_VAR: &str = "TROUBLESHOOTER_CONFIG";

/// Errors raised while loading settings.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The settings file could not be read.
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The settings file is not valid TOML for this schema.
    #[error("Failed to parse config file {path:?}: {source}")]
    Parse {
        /// File that was being parsed.
        path: PathBuf,
        /// Underlying TOML error.
        source: toml::de::Error,
    },

    /// A task entry has no program.
    #[error("Task {label:?} has an empty command")]
    EmptyCommand {
        /// Label of the offending task.
        label: String,
    },

    /// `query_timeout_secs` must be at least one second.
    #[error("query_timeout_secs must be greater than zero")]
    ZeroQueryTimeout,

    /// Two task entries share a label.
    #[error("Duplicate task label {label:?}")]
    DuplicateLabel {
        /// The repeated label.
        label: String,
    },
}

/// Ordered mapping from menu label to command.
///
/// # Example
///
/// ```rust
/// use linux_troubleshooter::CommandTable;
///
/// let table = CommandTable::builtin();
/// assert_eq!(table.get("Check disk space").unwrap().to_string(), "df -h");
/// assert_eq!(table.nth(1).unwrap().0, "Check for updates");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTable {
    entries: Vec<(String, Command)>,
}

impl CommandTable {
    /// The built-in maintenance menu.
    pub fn builtin() -> Self {
        Self {
            entries: MaintenanceTask::all()
                .map(|task| (task.label().to_string(), task.command()))
                .collect(),
        }
    }

    /// Build a table from entries, rejecting duplicate labels.
    pub fn from_entries<I>(entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, Command)>,
    {
        let mut seen = HashSet::new();
        let mut table = Vec::new();
        for (label, command) in entries {
            if !seen.insert(label.clone()) {
                return Err(ConfigError::DuplicateLabel { label });
            }
            table.push((label, command));
        }
        Ok(Self { entries: table })
    }

    /// Command for an exact label.
    pub fn get(&self, label: &str) -> Option<&Command> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, cmd)| cmd)
    }

    /// Entry at a 1-based menu position.
    pub fn nth(&self, position: usize) -> Option<(&str, &Command)> {
        let index = position.checked_sub(1)?;
        self.entries
            .get(index)
            .map(|(label, cmd)| (label.as_str(), cmd))
    }

    /// Look up by label, falling back to a 1-based position.
    pub fn lookup(&self, key: &str) -> Option<(&str, &Command)> {
        if let Some((label, cmd)) = self.entries.iter().find(|(l, _)| l == key) {
            return Some((label.as_str(), cmd));
        }
        key.trim().parse().ok().and_then(|n| self.nth(n))
    }

    /// Entries in menu order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Command)> {
        self.entries.iter().map(|(label, cmd)| (label.as_str(), cmd))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Package query settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PackageSettings {
    /// Program used to read package file metadata.
    pub inspect_program: String,

    /// Program used to query install state.
    pub status_program: String,

    /// Timeout for each query, in seconds.
    pub query_timeout_secs: u64,

    /// Install command template; `{file}` is replaced by the package path.
    pub installer: Command,
}

impl Default for PackageSettings {
    fn default() -> Self {
        let dpkg = Dpkg::default();
        Self {
            inspect_program: dpkg.inspect_program,
            status_program: dpkg.status_program,
            query_timeout_secs: dpkg.timeout.as_secs(),
            installer: default_installer(),
        }
    }
}

impl PackageSettings {
    /// A [`Dpkg`] backend configured from these settings.
    pub fn backend(&self) -> Dpkg {
        Dpkg {
            inspect_program: self.inspect_program.clone(),
            status_program: self.status_program.clone(),
            timeout: Duration::from_secs(self.query_timeout_secs),
        }
    }

    /// An [`InstallGuard`] using this backend and installer.
    pub fn guard(&self) -> InstallGuard<Dpkg> {
        InstallGuard::new(self.backend()).with_installer(self.installer.clone())
    }
}

#[derive(Debug, Deserialize)]
struct TaskEntry {
    label: String,
    command: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    #[serde(default, rename = "task")]
    tasks: Vec<TaskEntry>,
    #[serde(default)]
    package: PackageSettings,
}

/// Everything the front end needs at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Menu of runnable commands.
    pub table: CommandTable,

    /// Package query configuration.
    pub package: PackageSettings,
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parse settings from TOML text.
    ///
    /// `[[task]]` entries, when present, replace the built-in menu.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let file: SettingsFile = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;

        if file.package.query_timeout_secs == 0 {
            return Err(ConfigError::ZeroQueryTimeout);
        }

        let table = if file.tasks.is_empty() {
            CommandTable::builtin()
        } else {
            let mut entries = Vec::with_capacity(file.tasks.len());
            for task in file.tasks {
                let command = Command::from_argv(task.command)
                    .ok_or_else(|| ConfigError::EmptyCommand {
                        label: task.label.clone(),
                    })?;
                entries.push((task.label, command));
            }
            CommandTable::from_entries(entries)?
        };

        Ok(Self {
            table,
            package: file.package,
        })
    }

    /// Load from `path`, else from [`CONFIG_ENV_VAR`], else defaults.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(p) if !p.is_empty() => Self::load(PathBuf::from(p)),
            _ => Ok(Self::default()),
        }
    }
}
