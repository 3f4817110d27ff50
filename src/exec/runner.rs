//! Background execution of a single command.
//!
//! [`run`] spawns the process on its own tokio task and hands back an
//! [`EventStream`] the caller drains at its own pace. Every run ends with
//! `Progress(100)` followed by `Completed`, including when the program is
//! missing or its output cannot be read.

use crate::exec::event::{Completion, ExecutionEvent};
use crate::Command;
use futures::Stream;
use std::pin::Pin;
use std::process::Stdio;
use std::task::{Context, Poll};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::{ChildStderr, ChildStdout};
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace, warn};

/// Buffered events per run before the producer waits on the consumer.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Upper bound on the stderr text carried in [`Completion::stderr_tail`].
pub const STDERR_TAIL_LIMIT: usize = 4096;

/// Most stderr bytes kept in memory per run; older output is discarded.
pub const STDERR_CAPTURE_LIMIT: usize = 64 * 1024;

pub(crate) const SUCCESS_MARKER: &str = "✅ Task completed successfully.";

/// Live stream of events from one run.
///
/// Implements [`futures::Stream`]; [`EventStream::recv`] and
/// [`EventStream::wait`] cover the common cases without `StreamExt`.
/// Dropping the stream does not stop the process: the run still drains its
/// output and reaps the child.
#[derive(Debug)]
pub struct EventStream {
    rx: mpsc::Receiver<ExecutionEvent>,
}

impl EventStream {
    /// Receive the next event, or `None` once the run has finished.
    pub async fn recv(&mut self) -> Option<ExecutionEvent> {
        self.rx.recv().await
    }

    /// Discard remaining events and return the terminal status.
    pub async fn wait(mut self) -> Completion {
        let mut completion = None;
        while let Some(event) = self.recv().await {
            if let ExecutionEvent::Completed(done) = event {
                completion = Some(done);
            }
        }
        completion.unwrap_or_else(|| Completion::fault("run ended without a completion event"))
    }
}

impl Stream for EventStream {
    type Item = ExecutionEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

/// Run a command in the background and stream its events.
///
/// Must be called from within a tokio runtime. The returned stream yields
/// `Progress(0)`, a `Running: <command>` line, one `LogLine` per stdout line
/// as it arrives, a success or failure line, `Progress(100)`, and finally
/// `Completed`.
///
/// # Example
///
/// ```rust,no_run
/// use linux_troubleshooter::{exec, Command, ExecutionEvent};
///
/// #[tokio::main]
/// async fn main() {
///     let mut events = exec::run(Command::new("df").arg("-h"));
///     while let Some(event) = events.recv().await {
///         match event {
///             ExecutionEvent::LogLine { text } => println!("{}", text),
///             ExecutionEvent::Completed(done) => println!("exit {}", done.exit_code),
///             _ => {}
///         }
///     }
/// }
/// ```
pub fn run(command: Command) -> EventStream {
    let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    tokio::spawn(drive(command, tx));
    EventStream { rx }
}

async fn drive(command: Command, tx: mpsc::Sender<ExecutionEvent>) {
    emit(&tx, ExecutionEvent::progress(0)).await;
    emit(&tx, ExecutionEvent::log(format!("Running: {}", command))).await;

    let completion = execute(&command, &tx).await;

    emit(&tx, ExecutionEvent::progress(100)).await;
    emit(&tx, ExecutionEvent::Completed(completion)).await;
}

/// Send an event, ignoring a consumer that has gone away.
async fn emit(tx: &mpsc::Sender<ExecutionEvent>, event: ExecutionEvent) {
    if tx.send(event).await.is_err() {
        trace!("event consumer dropped");
    }
}

async fn execute(command: &Command, tx: &mpsc::Sender<ExecutionEvent>) -> Completion {
    let mut cmd = tokio::process::Command::new(command.program());
    cmd.args(command.arguments())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            let description = format!("Failed to start {}: {}", command.program(), e);
            error!(program = %command.program(), error = %e, "spawn failed");
            emit(tx, ExecutionEvent::log(format!("❌ {}", description))).await;
            return Completion::fault(description);
        }
    };

    info!(program = %command.program(), pid = ?child.id(), "process started");

    // Drain stderr concurrently so a chatty process cannot block on a full pipe.
    let stderr_task = child.stderr.take().map(|s| tokio::spawn(collect_stderr(s)));

    let read_result = match child.stdout.take() {
        Some(stdout) => forward_stdout(stdout, tx).await,
        None => Ok(()),
    };

    if read_result.is_err() {
        // Nobody is reading stdout any more; stop the child so wait() returns.
        if let Err(e) = child.start_kill() {
            debug!(error = %e, "kill after read fault failed");
        }
    }

    let status = child.wait().await;

    let stderr = match stderr_task {
        Some(handle) => handle.await.unwrap_or_default(),
        None => String::new(),
    };

    if let Err(e) = read_result {
        let description = format!("Error while reading output: {}", e);
        error!(program = %command.program(), error = %e, "output read failed");
        emit(tx, ExecutionEvent::log(format!("❌ {}", description))).await;
        return Completion::fault(description);
    }

    let status = match status {
        Ok(status) => status,
        Err(e) => {
            let description = format!("Failed to wait for {}: {}", command.program(), e);
            error!(program = %command.program(), error = %e, "wait failed");
            emit(tx, ExecutionEvent::log(format!("❌ {}", description))).await;
            return Completion::fault(description);
        }
    };

    if status.success() {
        info!(program = %command.program(), exit_code = 0, "process exited");
        emit(tx, ExecutionEvent::log(SUCCESS_MARKER)).await;
        return Completion::success();
    }

    let exit_code = status.code().unwrap_or(crate::exec::FAULT_EXIT_CODE);
    warn!(program = %command.program(), exit_code, "process failed");
    emit(
        tx,
        ExecutionEvent::log(format!("❌ Task failed with exit code {}.", exit_code)),
    )
    .await;
    if !stderr.is_empty() {
        emit(tx, ExecutionEvent::log(stderr.clone())).await;
    }

    Completion {
        exit_code,
        stderr_tail: stderr_tail(&stderr).to_string(),
    }
}

/// Forward stdout line by line as soon as each line is complete.
///
/// Lines are decoded lossily so a stray non-UTF-8 byte never ends the run.
async fn forward_stdout(
    stdout: ChildStdout,
    tx: &mpsc::Sender<ExecutionEvent>,
) -> std::io::Result<()> {
    let mut reader = BufReader::new(stdout);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            return Ok(());
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end();
        trace!(line, "stdout");
        emit(tx, ExecutionEvent::log(line)).await;
    }
}

async fn collect_stderr(stderr: ChildStderr) -> String {
    read_tail(stderr, STDERR_CAPTURE_LIMIT).await.trim_end().to_string()
}

/// Read `reader` to the end, keeping only its last `limit` bytes.
async fn read_tail<R: AsyncRead + Unpin>(mut reader: R, limit: usize) -> String {
    let mut kept = Vec::new();
    let mut chunk = [0u8; 8192];
    let mut dropped = 0usize;
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                kept.extend_from_slice(&chunk[..n]);
                if kept.len() > limit {
                    let excess = kept.len() - limit;
                    kept.drain(..excess);
                    dropped += excess;
                }
            }
            Err(e) => {
                debug!(error = %e, "stderr read stopped early");
                break;
            }
        }
    }
    if dropped > 0 {
        debug!(dropped, "stderr exceeded capture limit");
    }
    String::from_utf8_lossy(&kept).into_owned()
}

/// Last [`STDERR_TAIL_LIMIT`] bytes of `text`, cut on a char boundary.
fn stderr_tail(text: &str) -> &str {
    if text.len() <= STDERR_TAIL_LIMIT {
        return text;
    }
    let mut start = text.len() - STDERR_TAIL_LIMIT;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}
