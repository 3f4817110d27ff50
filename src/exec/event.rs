//! Events emitted by a command run.
//!
//! A run produces, in order: `Progress(0)`, any number of `LogLine`s,
//! `Progress(100)`, then exactly one `Completed`. Nothing follows
//! `Completed`.

use serde::{Deserialize, Serialize};

/// Exit code reported when the process could not be started, its output
/// could not be read, or it was terminated without an exit code.
pub const FAULT_EXIT_CODE: i32 = -1;

/// Terminal status of a run.
///
/// # Example
///
/// ```rust
/// use linux_troubleshooter::Completion;
///
/// let done = Completion { exit_code: 0, stderr_tail: String::new() };
/// assert!(done.is_success());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    /// Process exit code, or `-1` for spawn and read faults.
    pub exit_code: i32,

    /// Trailing portion of standard error, or the fault description.
    ///
    /// Empty on success.
    pub stderr_tail: String,
}

impl Completion {
    /// `true` only for exit code zero.
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }

    pub(crate) fn success() -> Self {
        Self {
            exit_code: 0,
            stderr_tail: String::new(),
        }
    }

    pub(crate) fn fault(description: impl Into<String>) -> Self {
        Self {
            exit_code: FAULT_EXIT_CODE,
            stderr_tail: description.into(),
        }
    }
}

/// A single event in a run's output stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ExecutionEvent {
    /// Coarse progress; only `0` and `100` are emitted.
    Progress {
        /// Percent complete.
        percent: u8,
    },

    /// One human-readable line for the log view.
    LogLine {
        /// Line text with trailing whitespace removed.
        text: String,
    },

    /// The run finished. Always the last event.
    Completed(Completion),
}

impl ExecutionEvent {
    pub(crate) fn progress(percent: u8) -> Self {
        Self::Progress { percent }
    }

    pub(crate) fn log(text: impl Into<String>) -> Self {
        Self::LogLine { text: text.into() }
    }

    /// Check if this is the terminal event.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_success() {
        assert!(Completion::success().is_success());
        assert!(Completion::success().stderr_tail.is_empty());
        let fault = Completion::fault("No such file or directory");
        assert!(!fault.is_success());
        assert_eq!(fault.exit_code, FAULT_EXIT_CODE);
    }

    #[test]
    fn test_is_terminal() {
        assert!(ExecutionEvent::Completed(Completion::success()).is_terminal());
        assert!(!ExecutionEvent::progress(100).is_terminal());
        assert!(!ExecutionEvent::log("hello").is_terminal());
    }

    #[test]
    fn test_event_json_shape() {
        let json = serde_json::to_value(ExecutionEvent::log("hello")).unwrap();
        assert_eq!(json["event"], "log_line");
        assert_eq!(json["text"], "hello");

        let json = serde_json::to_value(ExecutionEvent::Completed(Completion {
            exit_code: 2,
            stderr_tail: "boom".to_string(),
        }))
        .unwrap();
        assert_eq!(json["event"], "completed");
        assert_eq!(json["exit_code"], 2);
        assert_eq!(json["stderr_tail"], "boom");
    }
}
