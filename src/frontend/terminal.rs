//! Terminal rendering of run events.

use linux_troubleshooter::{Completion, EventSink, ExecutionEvent};

/// Prints log lines to stdout and progress to stderr, or every event as a
/// JSON line when `json` is set.
pub struct TerminalSink {
    json: bool,
}

impl TerminalSink {
    pub fn new(json: bool) -> Self {
        Self { json }
    }
}

impl EventSink for TerminalSink {
    fn on_progress(&mut self, percent: u8) {
        eprintln!("[{:>3}%]", percent);
    }

    fn on_log(&mut self, line: &str) {
        println!("{}", line);
    }

    fn on_done(&mut self, exit_code: i32) {
        if exit_code != 0 {
            eprintln!("exit code {}", exit_code);
        }
    }

    fn dispatch(&mut self, event: &ExecutionEvent) {
        if !self.json {
            match event {
                ExecutionEvent::Progress { percent } => self.on_progress(*percent),
                ExecutionEvent::LogLine { text } => self.on_log(text),
                ExecutionEvent::Completed(done) => self.on_done(done.exit_code),
            }
            return;
        }
        match serde_json::to_string(event) {
            Ok(line) => println!("{}", line),
            Err(e) => tracing::error!(error = %e, "failed to encode event"),
        }
    }
}

/// Map a run's status onto a process exit status.
///
/// Codes outside `1..=255`, including the `-1` fault code, become `1`.
pub fn exit_status(done: &Completion) -> u8 {
    match done.exit_code {
        0 => 0,
        code @ 1..=255 => code as u8,
        _ => 1,
    }
}
