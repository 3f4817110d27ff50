//! Callback-style delivery of run events.
//!
//! Front ends that prefer callbacks over a stream implement [`EventSink`]
//! and hand it to [`run_with_sink`].

use crate::exec::event::{Completion, ExecutionEvent};
use crate::exec::runner::{run, EventStream};
use crate::Command;
use tokio::task::JoinHandle;

/// Receiver for the three callback channels of a run.
///
/// Callbacks for one run are invoked in event order from a single task.
///
/// # Example
///
/// ```rust
/// use linux_troubleshooter::EventSink;
///
/// struct Printer;
///
/// impl EventSink for Printer {
///     fn on_progress(&mut self, percent: u8) {
///         println!("[{:>3}%]", percent);
///     }
///     fn on_log(&mut self, line: &str) {
///         println!("{}", line);
///     }
///     fn on_done(&mut self, exit_code: i32) {
///         println!("exit {}", exit_code);
///     }
/// }
/// ```
pub trait EventSink: Send {
    /// Progress changed (0 or 100).
    fn on_progress(&mut self, percent: u8);

    /// A line for the log view.
    fn on_log(&mut self, line: &str);

    /// The run finished with this exit code.
    fn on_done(&mut self, exit_code: i32);

    /// Route one event to the matching callback.
    fn dispatch(&mut self, event: &ExecutionEvent) {
        match event {
            ExecutionEvent::Progress { percent } => self.on_progress(*percent),
            ExecutionEvent::LogLine { text } => self.on_log(text),
            ExecutionEvent::Completed(done) => self.on_done(done.exit_code),
        }
    }
}

/// Feed every event of `stream` into `sink` and return the terminal status.
pub async fn forward<S>(mut stream: EventStream, sink: &mut S) -> Completion
where
    S: EventSink + ?Sized,
{
    let mut completion = None;
    while let Some(event) = stream.recv().await {
        sink.dispatch(&event);
        if let ExecutionEvent::Completed(done) = event {
            completion = Some(done);
        }
    }
    completion.unwrap_or_else(|| Completion::fault("run ended without a completion event"))
}

/// Run a command in the background, delivering events to `sink`.
///
/// Returns immediately; the handle resolves to the terminal status once
/// `on_done` has been called.
pub fn run_with_sink<S>(command: Command, mut sink: S) -> JoinHandle<Completion>
where
    S: EventSink + 'static,
{
    let stream = run(command);
    tokio::spawn(async move { forward(stream, &mut sink).await })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Recorder {
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl EventSink for Recorder {
        fn on_progress(&mut self, percent: u8) {
            self.calls.lock().unwrap().push(format!("progress:{}", percent));
        }
        fn on_log(&mut self, line: &str) {
            self.calls.lock().unwrap().push(format!("log:{}", line));
        }
        fn on_done(&mut self, exit_code: i32) {
            self.calls.lock().unwrap().push(format!("done:{}", exit_code));
        }
    }

    #[tokio::test]
    async fn test_callbacks_in_order() {
        let recorder = Recorder::default();
        let done = run_with_sink(Command::new("echo").arg("hi"), recorder.clone())
            .await
            .unwrap();

        assert!(done.is_success());
        let calls = recorder.calls.lock().unwrap();
        assert_eq!(calls.first().map(String::as_str), Some("progress:0"));
        assert_eq!(calls[1], "log:Running: echo hi");
        assert_eq!(calls[2], "log:hi");
        assert_eq!(calls[calls.len() - 2], "progress:100");
        assert_eq!(calls.last().map(String::as_str), Some("done:0"));
    }

    #[tokio::test]
    async fn test_done_called_once_on_spawn_failure() {
        let recorder = Recorder::default();
        let done = run_with_sink(Command::new("no_such_binary_abc987"), recorder.clone())
            .await
            .unwrap();

        assert_eq!(done.exit_code, -1);
        let calls = recorder.calls.lock().unwrap();
        let dones = calls.iter().filter(|c| c.starts_with("done:")).count();
        assert_eq!(dones, 1);
        assert_eq!(calls.last().map(String::as_str), Some("done:-1"));
    }
}
