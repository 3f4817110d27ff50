//! `troubleshooter`: terminal front end for the maintenance menu and
//! guarded package installs.

mod frontend;

use anyhow::{ensure, Context, Result};
use frontend::cli::{self, Action};
use frontend::logging::init_logging;
use frontend::terminal::{exit_status, TerminalSink};
use linux_troubleshooter::{
    exec, Command, InstallDecision, InstallOutcome, Settings,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = cli::parse();
    init_logging(args.log_level);

    let settings = Settings::resolve(args.config.as_deref()).context("loading settings")?;
    let mut sink = TerminalSink::new(args.json);

    let status = match args.command {
        Action::List => {
            for (i, (label, cmd)) in settings.table.iter().enumerate() {
                let missing = if cmd.resolve_program().is_some() { ' ' } else { '!' };
                let privileged = if cmd.requires_privileges() { '#' } else { ' ' };
                println!("{:>2}.{}{} {:<28} {}", i + 1, missing, privileged, label, cmd);
            }
            0
        }
        Action::Run { task } => {
            let (label, cmd) = settings
                .table
                .lookup(&task)
                .with_context(|| format!("no task labelled or numbered {:?}", task))?;
            info!(task = label, "running menu entry");
            let done = exec::run_with_sink(cmd.clone(), sink)
                .await
                .context("run task panicked")?;
            exit_status(&done)
        }
        Action::Exec { argv } => {
            let cmd = Command::from_argv(argv).context("missing program")?;
            let done = exec::run_with_sink(cmd, sink)
                .await
                .context("run task panicked")?;
            exit_status(&done)
        }
        Action::Check { file } => {
            let file = package_file(&file)?;
            let guard = settings.package.guard();
            match guard.evaluate(&file).await {
                InstallDecision::AlreadyInstalled(name) => {
                    println!("{} is already installed.", name)
                }
                InstallDecision::Proceed(cmd) => println!("Would run: {}", cmd),
            }
            0
        }
        Action::Install { file } => {
            let file = package_file(&file)?;
            let guard = settings.package.guard();
            match guard.install(&file).await {
                InstallOutcome::AlreadyInstalled(name) => {
                    println!("✅ {} is already installed.", name);
                    0
                }
                InstallOutcome::Started(events) => {
                    let done = exec::forward(events, &mut sink).await;
                    exit_status(&done)
                }
            }
        }
    };

    Ok(ExitCode::from(status))
}

/// Resolve a package file to an absolute path, as a file picker would.
fn package_file(file: &Path) -> Result<PathBuf> {
    let file = std::fs::canonicalize(file)
        .with_context(|| format!("cannot access {}", file.display()))?;
    ensure!(file.is_file(), "{} is not a file", file.display());
    Ok(file)
}
