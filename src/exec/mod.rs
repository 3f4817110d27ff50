//! Asynchronous command execution with streamed output.
//!
//! Each call to [`run`] launches one external process on its own tokio task
//! and returns an [`EventStream`]. Runs are independent and single-use:
//! there is no queue, no retry, and no cancellation.
//!
//! # Example
//!
//! ```rust,no_run
//! use linux_troubleshooter::{exec, Command};
//!
//! #[tokio::main]
//! async fn main() {
//!     let done = exec::run(Command::new("false")).wait().await;
//!     assert_eq!(done.exit_code, 1);
//! }
//! ```

mod event;
mod runner;
mod sink;

pub use event::{Completion, ExecutionEvent, FAULT_EXIT_CODE};
pub use runner::{run, EventStream, STDERR_CAPTURE_LIMIT, STDERR_TAIL_LIMIT};
pub use sink::{forward, run_with_sink, EventSink};
