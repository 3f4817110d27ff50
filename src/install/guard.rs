//! Idempotent install of a local package file.
//!
//! The guard reads the package name from the file, asks the backend whether
//! that package is already installed, and only then launches the privileged
//! install through the executor.

use crate::exec::{self, EventStream};
use crate::install::backend::{Dpkg, PackageBackend};
use crate::Command;
use std::path::{Path, PathBuf};
use tracing::info;

/// What to do with a package file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallDecision {
    /// A package with this name is already installed; nothing to run.
    AlreadyInstalled(String),

    /// Run this install command.
    Proceed(Command),
}

impl InstallDecision {
    /// Check if the install step should be skipped.
    pub fn is_already_installed(&self) -> bool {
        matches!(self, Self::AlreadyInstalled(_))
    }
}

/// Result of [`InstallGuard::install`].
#[derive(Debug)]
pub enum InstallOutcome {
    /// The package was already installed; no process was started.
    AlreadyInstalled(String),

    /// The install command is running.
    Started(EventStream),
}

/// Argument in an installer template replaced by the package file path.
pub const FILE_PLACEHOLDER: &str = "{file}";

/// The default installer template: `sudo apt install {file} -y`.
pub fn default_installer() -> Command {
    Command::new("sudo").args(["apt", "install", FILE_PLACEHOLDER, "-y"])
}

/// Path as handed to package tools.
///
/// Relative paths gain a `./` prefix: apt only treats an argument as a
/// local file when it contains a `/`, and a leading `-` would otherwise be
/// read as an option.
pub fn local_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_relative() && !path.starts_with(".") && !path.starts_with("..") {
        Path::new(".").join(path)
    } else {
        path.to_path_buf()
    }
}

/// Fill an installer template with a package file path.
///
/// Every [`FILE_PLACEHOLDER`] argument is replaced; a template without one
/// gets the path appended.
pub fn render_installer(template: &Command, path: impl AsRef<Path>) -> Command {
    let file = local_path(path).to_string_lossy().into_owned();
    let mut argv = template.argv();
    let mut placed = false;
    for arg in argv.iter_mut().filter(|a| a.as_str() == FILE_PLACEHOLDER) {
        *arg = file.clone();
        placed = true;
    }
    if !placed {
        argv.push(file);
    }
    Command::from_argv(argv).unwrap_or_else(|| template.clone())
}

/// Privileged install command for a local package file.
///
/// # Example
///
/// ```rust
/// use linux_troubleshooter::install_command;
///
/// let cmd = install_command("/tmp/hello.deb");
/// assert_eq!(cmd.to_string(), "sudo apt install /tmp/hello.deb -y");
///
/// let cmd = install_command("hello.deb");
/// assert_eq!(cmd.to_string(), "sudo apt install ./hello.deb -y");
/// ```
pub fn install_command(path: impl AsRef<Path>) -> Command {
    render_installer(&default_installer(), path)
}

/// Decides whether a package file needs installing.
///
/// # Example
///
/// ```rust,no_run
/// use linux_troubleshooter::{InstallGuard, InstallOutcome};
///
/// #[tokio::main]
/// async fn main() {
///     let guard: InstallGuard = InstallGuard::default();
///     match guard.install("/tmp/hello.deb").await {
///         InstallOutcome::AlreadyInstalled(name) => println!("{} is already installed", name),
///         InstallOutcome::Started(events) => {
///             let done = events.wait().await;
///             println!("install exited with {}", done.exit_code);
///         }
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct InstallGuard<B = Dpkg> {
    backend: B,
    installer: Command,
}

impl<B: Default> Default for InstallGuard<B> {
    fn default() -> Self {
        Self {
            backend: B::default(),
            installer: default_installer(),
        }
    }
}

impl<B: PackageBackend> InstallGuard<B> {
    /// Create a guard over the given backend.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            installer: default_installer(),
        }
    }

    /// Replace the installer template (see [`render_installer`]).
    pub fn with_installer(mut self, installer: Command) -> Self {
        self.installer = installer;
        self
    }

    /// The installer template.
    pub fn installer(&self) -> &Command {
        &self.installer
    }

    /// The backend used for metadata and status queries.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Decide whether `path` should be installed.
    ///
    /// Returns `AlreadyInstalled` only when a name was extracted and the
    /// backend reports it installed. Every failure leads to `Proceed`.
    /// Has no side effects beyond the two queries.
    pub async fn evaluate(&self, path: impl AsRef<Path>) -> InstallDecision {
        let path = local_path(path);
        let path = path.as_path();

        if let Some(name) = self.backend.package_name(path).await {
            if self.backend.is_installed(&name).await {
                info!(package = %name, path = %path.display(), "package already installed");
                return InstallDecision::AlreadyInstalled(name);
            }
            info!(package = %name, "package not installed");
        } else {
            info!(path = %path.display(), "package name unavailable, proceeding");
        }

        InstallDecision::Proceed(render_installer(&self.installer, path))
    }

    /// Evaluate `path` and, if needed, start the install.
    pub async fn install(&self, path: impl AsRef<Path>) -> InstallOutcome {
        match self.evaluate(path).await {
            InstallDecision::AlreadyInstalled(name) => InstallOutcome::AlreadyInstalled(name),
            InstallDecision::Proceed(command) => InstallOutcome::Started(exec::run(command)),
        }
    }
}
