use certiwipe::{closing_banner, header};
use certiwipe_core::audit_log::Outcome;
use certiwipe_core::cancel::CancelToken;
use certiwipe_core::cli::Cli;
use certiwipe_core::config::{Timings, WipeConfig};
use certiwipe_core::confirm::ScriptedPrompter;
use certiwipe_core::wipe::run_with_hal;
use certiwipe_hal::{FakeHal, FakeResponse};
use clap::Parser;
use std::sync::Arc;
use tempfile::tempdir;

fn attached_pixel() -> FakeHal {
    let hal = FakeHal::with_platform_tools();
    hal.respond(
        "adb devices",
        FakeResponse::ok("List of devices attached\nR5CT10XYZ\tdevice\n"),
    );
    hal.respond("adb shell getprop ro.product.model", FakeResponse::ok("SM-G991B"));
    hal.respond(
        "adb shell getprop ro.build.version.release",
        FakeResponse::ok("13"),
    );
    hal.respond("fastboot devices", FakeResponse::ok("R5CT10XYZ\tfastboot"));
    hal
}

fn config_from_args(args: &[&str]) -> WipeConfig {
    let cli = Cli::try_parse_from(args).expect("valid arguments");
    WipeConfig {
        timings: Timings::none(),
        ..WipeConfig::from(&cli)
    }
}

#[test]
fn header_warns_about_unlock() {
    let text = header();
    assert!(text.starts_with("Android Data Wiping Tool (Fastboot Method)"));
    assert!(text.contains("THIS WILL UNLOCK BOOTLOADER AND WIPE ALL DATA!"));
}

#[test]
fn successful_run_prints_device_and_log_path() {
    let dir = tempdir().unwrap();
    let log_file = dir.path().join("bench.json");
    let config = config_from_args(&["certiwipe", "-l", log_file.to_str().unwrap()]);

    let report = run_with_hal(
        config,
        Arc::new(attached_pixel()),
        &ScriptedPrompter::new(["ERASE EVERYTHING", "YES"]),
        CancelToken::new(),
    );

    assert_eq!(report.outcome, Outcome::Success);
    assert_eq!(report.exit_code(), 0);
    assert!(log_file.exists());

    let banner = closing_banner(&report);
    assert!(banner.contains("WIPE COMPLETED SUCCESSFULLY!"));
    assert!(banner.contains("Device: SM-G991B"));
    assert!(banner.contains("Android: 13"));
    assert!(banner.contains(&format!("Log saved to: {}", log_file.display())));
    let steps = format!(
        "Steps: {}/{} successful",
        report.summary.successful_steps, report.summary.total_steps
    );
    assert!(banner.contains(&steps));
}

#[test]
fn cancelled_run_exits_non_zero() {
    let dir = tempdir().unwrap();
    let log_file = dir.path().join("wipe_log.json");
    let config = config_from_args(&["certiwipe", "--log-file", log_file.to_str().unwrap()]);

    let report = run_with_hal(
        config,
        Arc::new(attached_pixel()),
        &ScriptedPrompter::new(["ERASE EVERYTHING", "nope"]),
        CancelToken::new(),
    );

    assert_eq!(report.exit_code(), 1);
    assert!(closing_banner(&report).contains("Operation cancelled by user."));
    assert!(log_file.exists());
}

#[test]
fn tool_override_that_does_not_exist_fails_the_run() {
    let dir = tempdir().unwrap();
    let log_file = dir.path().join("wipe_log.json");
    let missing = dir.path().join("no-such-adb");
    let config = config_from_args(&[
        "certiwipe",
        "--log-file",
        log_file.to_str().unwrap(),
        "--adb",
        missing.to_str().unwrap(),
    ]);
    let hal = attached_pixel();

    let report = run_with_hal(
        config,
        Arc::new(hal.clone()),
        &ScriptedPrompter::new(["ERASE EVERYTHING", "yes"]),
        CancelToken::new(),
    );

    assert_eq!(report.outcome, Outcome::Failed);
    assert_eq!(hal.operation_count(), 0);
    assert!(closing_banner(&report).starts_with("Wipe process failed"));
}

#[test]
fn unwritable_log_path_is_reported_on_the_report() {
    let dir = tempdir().unwrap();
    // A regular file where the log directory should be.
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "").unwrap();
    let log_file = blocker.join("wipe_log.json");
    let config = config_from_args(&["certiwipe", "-l", log_file.to_str().unwrap()]);

    let report = run_with_hal(
        config,
        Arc::new(attached_pixel()),
        &ScriptedPrompter::new(["no"]),
        CancelToken::new(),
    );

    assert_eq!(report.outcome, Outcome::Cancelled);
    assert!(report.save_error.is_some());
    assert!(!log_file.exists());
    assert!(closing_banner(&report).contains("Operation cancelled by user."));
}
