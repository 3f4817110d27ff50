//! Guarded installation of local package files.
//!
//! [`InstallGuard::evaluate`] inspects a package file and decides between
//! [`InstallDecision::AlreadyInstalled`] and [`InstallDecision::Proceed`].
//! Metadata and status failures never abort the flow: an unreadable file or
//! a failed status query both lead to `Proceed`.
//!
//! # Example
//!
//! ```rust,no_run
//! use linux_troubleshooter::{InstallDecision, InstallGuard};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let guard: InstallGuard = InstallGuard::default();
//!     match guard.evaluate("/tmp/hello.deb").await {
//!         InstallDecision::AlreadyInstalled(name) => println!("{} already installed", name),
//!         InstallDecision::Proceed(cmd) => println!("would run: {}", cmd),
//!     }
//! }
//! ```

mod backend;
mod guard;

pub use backend::{
    parse_package_field, Dpkg, PackageBackend, DEFAULT_QUERY_TIMEOUT, INSTALLED_MARKER,
};
pub use guard::{
    default_installer, install_command, local_path, render_installer, InstallDecision,
    InstallGuard, InstallOutcome, FILE_PLACEHOLDER,
};
