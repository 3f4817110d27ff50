//! Package metadata and install-state queries.
//!
//! Both queries are single, short-lived subprocess calls. Neither reports
//! errors: a failed inspection yields no name, and a failed status query
//! reads as "not installed".

use regex::Regex;
use std::ffi::OsStr;
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Substring of the status query output that marks a package as installed.
pub const INSTALLED_MARKER: &str = "Status: install ok installed";

/// Default bound on each metadata or status query.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of package metadata and install state.
///
/// [`Dpkg`] is the real implementation; the seam exists so the install
/// decision can be exercised against any package manager front end.
pub trait PackageBackend: Send + Sync {
    /// Name recorded in a package file's control metadata, if readable.
    fn package_name(&self, path: &Path) -> impl Future<Output = Option<String>> + Send;

    /// Whether the named package is currently installed.
    fn is_installed(&self, name: &str) -> impl Future<Output = bool> + Send;
}

/// Queries backed by `dpkg-deb --info` and `dpkg -s`.
///
/// # Example
///
/// ```rust
/// use linux_troubleshooter::Dpkg;
/// use std::time::Duration;
///
/// let dpkg = Dpkg::default();
/// assert_eq!(dpkg.inspect_program, "dpkg-deb");
///
/// let dpkg = Dpkg {
///     timeout: Duration::from_secs(2),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Dpkg {
    /// Program invoked as `<inspect_program> --info <file>`.
    pub inspect_program: String,

    /// Program invoked as `<status_program> -s <name>`.
    pub status_program: String,

    /// Maximum time to wait for either query.
    ///
    /// Default: 10 seconds. A query that runs longer counts as failed.
    pub timeout: Duration,
}

impl Default for Dpkg {
    fn default() -> Self {
        Self {
            inspect_program: "dpkg-deb".to_string(),
            status_program: "dpkg".to_string(),
            timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }
}

impl Dpkg {
    /// Run a query and return its stdout, or `None` on spawn failure or
    /// timeout. Exit status is left to the caller.
    async fn query(&self, program: &str, args: &[&OsStr]) -> Option<(bool, String)> {
        let mut cmd = Command::new(program);
        cmd.args(args).kill_on_drop(true);

        let output = match timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                warn!(program, error = %e, "package query could not start");
                return None;
            }
            Err(_) => {
                warn!(program, timeout = ?self.timeout, "package query timed out");
                return None;
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        Some((output.status.success(), stdout))
    }
}

impl PackageBackend for Dpkg {
    async fn package_name(&self, path: &Path) -> Option<String> {
        let (ok, stdout) = self
            .query(&self.inspect_program, &[OsStr::new("--info"), path.as_os_str()])
            .await?;
        if !ok {
            debug!(path = %path.display(), "package inspection failed");
            return None;
        }
        parse_package_field(&stdout)
    }

    async fn is_installed(&self, name: &str) -> bool {
        match self
            .query(&self.status_program, &[OsStr::new("-s"), OsStr::new(name)])
            .await
        {
            Some((_, stdout)) => stdout.contains(INSTALLED_MARKER),
            None => false,
        }
    }
}

/// Extract the `Package` field from control metadata.
///
/// Takes the first line whose key is exactly `Package` (leading whitespace
/// allowed, as in `dpkg-deb --info` output) and returns the trimmed text
/// after the first colon. An empty value counts as missing.
///
/// # Example
///
/// ```rust
/// use linux_troubleshooter::parse_package_field;
///
/// let info = " new Debian package, version 2.0.\n Package: hello\n Version: 2.10-3\n";
/// assert_eq!(parse_package_field(info), Some("hello".to_string()));
/// assert_eq!(parse_package_field("Version: 1.0"), None);
/// ```
pub fn parse_package_field(text: &str) -> Option<String> {
    let re = Regex::new(r"(?m)^\s*Package\s*:(.*)$").expect("Invalid package field regex");
    let value = re.captures(text)?.get(1)?.as_str().trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
