//! Integration tests for the install guard.
//!
//! Fake `dpkg-deb` and `dpkg` scripts in a temporary directory stand in for
//! the real package tools, so the tests drive the actual subprocess path.

#![cfg(unix)]

use futures::StreamExt;
use linux_troubleshooter::{
    install_command, Command, Dpkg, ExecutionEvent, InstallDecision, InstallGuard,
    InstallOutcome, Settings, FILE_PLACEHOLDER,
};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Backend whose inspection prints `inspect_out` and whose status query
/// prints `status_out` with the given exit code.
fn fake_dpkg(dir: &TempDir, inspect_out: &str, status_out: &str, status_code: i32) -> Dpkg {
    let inspect = write_script(dir.path(), "fake-dpkg-deb", &format!("printf '{}'", inspect_out));
    let status = write_script(
        dir.path(),
        "fake-dpkg",
        &format!("printf '{}'; exit {}", status_out, status_code),
    );
    Dpkg {
        inspect_program: inspect.to_string_lossy().into_owned(),
        status_program: status.to_string_lossy().into_owned(),
        ..Default::default()
    }
}

const INFO: &str = " new Debian package, version 2.0.\\n Package: hello\\n Version: 2.10-3\\n";

#[tokio::test]
async fn test_installed_package_short_circuits() {
    let dir = TempDir::new().unwrap();
    let status = "Package: hello\\nStatus: install ok installed\\nVersion: 2.10-3\\n";
    let guard = InstallGuard::new(fake_dpkg(&dir, INFO, status, 0));

    let decision = guard.evaluate("/tmp/hello.deb").await;
    assert_eq!(decision, InstallDecision::AlreadyInstalled("hello".to_string()));
}

#[tokio::test]
async fn test_unknown_package_proceeds() {
    let dir = TempDir::new().unwrap();
    let guard = InstallGuard::new(fake_dpkg(&dir, INFO, "", 1));

    let decision = guard.evaluate("/tmp/hello.deb").await;
    assert_eq!(
        decision,
        InstallDecision::Proceed(install_command("/tmp/hello.deb"))
    );
}

#[tokio::test]
async fn test_removed_package_is_not_installed() {
    let dir = TempDir::new().unwrap();
    let status = "Package: hello\\nStatus: deinstall ok config-files\\n";
    let guard = InstallGuard::new(fake_dpkg(&dir, INFO, status, 0));

    assert!(matches!(
        guard.evaluate("/tmp/hello.deb").await,
        InstallDecision::Proceed(_)
    ));
}

#[tokio::test]
async fn test_unreadable_metadata_proceeds() {
    let dir = TempDir::new().unwrap();
    let status = "Status: install ok installed\\n";
    let guard = InstallGuard::new(fake_dpkg(&dir, "garbage\\n", status, 0));

    assert!(matches!(
        guard.evaluate("/tmp/hello.deb").await,
        InstallDecision::Proceed(_)
    ));
}

#[tokio::test]
async fn test_evaluate_twice_gives_same_decision() {
    let dir = TempDir::new().unwrap();
    let status = "Status: install ok installed\\n";
    let guard = InstallGuard::new(fake_dpkg(&dir, INFO, status, 0));

    let first = guard.evaluate("/tmp/hello.deb").await;
    let second = guard.evaluate("/tmp/hello.deb").await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_slow_status_query_fails_open() {
    let dir = TempDir::new().unwrap();
    let mut dpkg = fake_dpkg(&dir, INFO, "", 0);
    let slow = write_script(
        dir.path(),
        "slow-dpkg",
        "sleep 5; echo 'Status: install ok installed'",
    );
    dpkg.status_program = slow.to_string_lossy().into_owned();
    dpkg.timeout = std::time::Duration::from_millis(300);

    let guard = InstallGuard::new(dpkg);
    assert!(matches!(
        guard.evaluate("/tmp/hello.deb").await,
        InstallDecision::Proceed(_)
    ));
}

#[tokio::test]
async fn test_install_outcome_already_installed() {
    let dir = TempDir::new().unwrap();
    let status = "Status: install ok installed\\n";
    let guard = InstallGuard::new(fake_dpkg(&dir, INFO, status, 0));

    match guard.install("/tmp/hello.deb").await {
        InstallOutcome::AlreadyInstalled(name) => assert_eq!(name, "hello"),
        InstallOutcome::Started(_) => panic!("install should have been skipped"),
    }
}

#[tokio::test]
async fn test_settings_configure_backend() {
    let dir = TempDir::new().unwrap();
    let fake = fake_dpkg(&dir, INFO, "Status: install ok installed\\n", 0);
    let toml = format!(
        "[package]\ninspect_program = {:?}\nstatus_program = {:?}\nquery_timeout_secs = 2\n",
        fake.inspect_program, fake.status_program
    );

    let settings = Settings::from_toml(&toml).unwrap();
    let guard = InstallGuard::new(settings.package.backend());
    assert!(guard.evaluate("/tmp/hello.deb").await.is_already_installed());
}

#[tokio::test]
async fn test_install_runs_configured_installer() {
    let dir = TempDir::new().unwrap();
    let fake = fake_dpkg(&dir, INFO, "", 1);
    let installer = write_script(dir.path(), "fake-installer", "echo \"installer argv: $*\"");
    let package = dir.path().join("hello.deb");
    let toml = format!(
        "[package]\ninspect_program = {:?}\nstatus_program = {:?}\ninstaller = [{:?}, {:?}]\n",
        fake.inspect_program,
        fake.status_program,
        installer.to_string_lossy(),
        FILE_PLACEHOLDER
    );
    let settings = Settings::from_toml(&toml).unwrap();

    let events: Vec<ExecutionEvent> = match settings.package.guard().install(&package).await {
        InstallOutcome::Started(events) => events.collect().await,
        InstallOutcome::AlreadyInstalled(name) => panic!("unexpected skip of {}", name),
    };

    assert_eq!(events.first(), Some(&ExecutionEvent::Progress { percent: 0 }));
    let n = events.len();
    assert_eq!(events[n - 2], ExecutionEvent::Progress { percent: 100 });
    match &events[n - 1] {
        ExecutionEvent::Completed(done) => assert!(done.is_success()),
        other => panic!("expected completion, got {:?}", other),
    }

    let expected = format!("installer argv: {}", package.display());
    assert!(events.iter().any(|e| matches!(
        e,
        ExecutionEvent::LogLine { text } if *text == expected
    )));
}

#[tokio::test]
async fn test_relative_package_reaches_installer_with_slash() {
    let dir = TempDir::new().unwrap();
    let installer = write_script(dir.path(), "fake-installer", "echo \"$1\"");
    let guard = InstallGuard::new(fake_dpkg(&dir, "", "", 1))
        .with_installer(Command::new(installer.to_string_lossy()).arg(FILE_PLACEHOLDER));

    let events: Vec<ExecutionEvent> = match guard.install("-x.deb").await {
        InstallOutcome::Started(events) => events.collect().await,
        InstallOutcome::AlreadyInstalled(name) => panic!("unexpected skip of {}", name),
    };

    assert!(events.iter().any(|e| matches!(
        e,
        ExecutionEvent::LogLine { text } if text == "./-x.deb"
    )));
    assert!(matches!(events.last(), Some(ExecutionEvent::Completed(done)) if done.is_success()));
}
