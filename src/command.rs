//! Commands and the built-in maintenance menu.
//!
//! A [`Command`] is an ordered program-plus-arguments sequence handed to the
//! executor. [`MaintenanceTask`] enumerates the fixed menu of system
//! maintenance commands the front end offers by default.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use strum::IntoEnumIterator;

/// An external command: a program followed by its arguments.
///
/// Commands are immutable once built. They serialize as a plain string
/// array (`["df", "-h"]`), which is also the form used in config files.
///
/// # Example
///
/// ```rust
/// use linux_troubleshooter::Command;
///
/// let cmd = Command::new("ping").args(["-c", "4", "8.8.8.8"]);
/// assert_eq!(cmd.program(), "ping");
/// assert_eq!(cmd.to_string(), "ping -c 4 8.8.8.8");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Command {
    program: String,
    args: Vec<String>,
}

impl Command {
    /// Create a command with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append a single argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Build a command from a full argv (program first).
    ///
    /// Returns `None` when `argv` is empty or the program is blank.
    ///
    /// # Example
    ///
    /// ```rust
    /// use linux_troubleshooter::Command;
    ///
    /// let cmd = Command::from_argv(vec!["df".to_string(), "-h".to_string()]).unwrap();
    /// assert_eq!(cmd.arguments(), ["-h".to_string()]);
    /// assert!(Command::from_argv(Vec::<String>::new()).is_none());
    /// ```
    pub fn from_argv<I, S>(argv: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut iter = argv.into_iter().map(Into::into);
        let program = iter.next()?;
        if program.trim().is_empty() {
            return None;
        }
        Some(Self {
            program,
            args: iter.collect(),
        })
    }

    /// The program to execute.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments passed to the program.
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Full argv, program first.
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }

    /// Whether the command runs through a privilege elevation tool.
    ///
    /// ```rust
    /// use linux_troubleshooter::Command;
    ///
    /// assert!(Command::new("sudo").arg("reboot").requires_privileges());
    /// assert!(!Command::new("df").arg("-h").requires_privileges());
    /// ```
    pub fn requires_privileges(&self) -> bool {
        matches!(self.program.as_str(), "sudo" | "pkexec" | "doas")
    }

    /// Locate the program on `PATH`.
    ///
    /// Returns `None` when the binary cannot be found. The executor does not
    /// require this check; a missing program surfaces as a spawn failure.
    pub fn resolve_program(&self) -> Option<PathBuf> {
        which::which(&self.program).ok()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

impl TryFrom<Vec<String>> for Command {
    type Error = String;

    fn try_from(argv: Vec<String>) -> Result<Self, Self::Error> {
        Self::from_argv(argv).ok_or_else(|| "command must name a program".to_string())
    }
}

impl From<Command> for Vec<String> {
    fn from(cmd: Command) -> Self {
        cmd.argv()
    }
}

/// The built-in maintenance menu.
///
/// Variants are listed in menu order; [`MaintenanceTask::all`] yields them in
/// that order.
///
/// # Example
///
/// ```rust
/// use linux_troubleshooter::MaintenanceTask;
///
/// for task in MaintenanceTask::all() {
///     println!("{}: {}", task.label(), task.command());
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[non_exhaustive]
pub enum MaintenanceTask {
    /// Refresh the package index.
    CheckUpdates,
    /// Upgrade all installed packages.
    UpgradeSystem,
    /// Repair broken package dependencies.
    FixBrokenDependencies,
    /// Show filesystem usage.
    CheckDiskSpace,
    /// Ping a public resolver.
    CheckNetwork,
    /// Remove packages that are no longer needed.
    CleanSystem,
    /// Show the most recent journal entries.
    ReadSystemLogs,
    /// Remove a third-party repository.
    RemovePpas,
    /// Reboot the machine.
    Reboot,
}

impl MaintenanceTask {
    /// Human-readable menu label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::CheckUpdates => "Check for updates",
            Self::UpgradeSystem => "Upgrade system",
            Self::FixBrokenDependencies => "Fix broken dependencies",
            Self::CheckDiskSpace => "Check disk space",
            Self::CheckNetwork => "Check network connectivity",
            Self::CleanSystem => "Clean system",
            Self::ReadSystemLogs => "Read system logs",
            Self::RemovePpas => "Remove problematic PPAs",
            Self::Reboot => "Reboot system",
        }
    }

    /// The command this entry runs.
    pub fn command(&self) -> Command {
        match self {
            Self::CheckUpdates => Command::new("sudo").args(["apt", "update"]),
            Self::UpgradeSystem => Command::new("sudo").args(["apt", "upgrade", "-y"]),
            Self::FixBrokenDependencies => {
                Command::new("sudo").args(["apt", "--fix-broken", "install"])
            }
            Self::CheckDiskSpace => Command::new("df").arg("-h"),
            Self::CheckNetwork => Command::new("ping").args(["-c", "4", "8.8.8.8"]),
            Self::CleanSystem => Command::new("sudo").args(["apt", "autoremove", "-y"]),
            Self::ReadSystemLogs => Command::new("sudo").args(["journalctl", "-n", "50"]),
            Self::RemovePpas => Command::new("sudo").args(["add-apt-repository", "--remove"]),
            Self::Reboot => Command::new("sudo").arg("reboot"),
        }
    }

    /// Iterator over all menu entries, in menu order.
    pub fn all() -> impl Iterator<Item = Self> {
        <Self as IntoEnumIterator>::iter()
    }
}
