use certiwipe_core::audit_log::Outcome;
use certiwipe_core::cancel::{install_ctrlc_handler, CancelToken};
use certiwipe_core::cli::Cli;
use certiwipe_core::config::WipeConfig;
use certiwipe_core::confirm::TerminalPrompter;
use certiwipe_core::wipe::{run_with_hal, WipeReport};
use certiwipe_hal::{LinuxHal, WipeHal};
use clap::Parser;
use std::sync::Arc;

const RULE: &str = "============================================================";

/// Parse the command line, run one wipe and return the process exit code.
pub fn run() -> anyhow::Result<i32> {
    let cli = Cli::parse();
    certiwipe_core::logging::init(cli.verbose);

    let cancel = CancelToken::new();
    install_ctrlc_handler(cancel.clone())?;

    let config = WipeConfig::from(&cli);
    log::debug!("config: {:?}", config);

    println!("{}", header());
    let hal: Arc<dyn WipeHal> = Arc::new(LinuxHal::new());
    let report = run_with_hal(config, hal, &TerminalPrompter, cancel);

    if let Some(err) = &report.save_error {
        log::error!(
            "💥 Audit log {} was not written: {}",
            report.log_path.display(),
            err
        );
    }
    println!("{}", closing_banner(&report));
    Ok(report.exit_code())
}

pub fn header() -> String {
    let rule = &RULE[..50];
    format!(
        "Android Data Wiping Tool (Fastboot Method)\n{rule}\n\
         THIS WILL UNLOCK BOOTLOADER AND WIPE ALL DATA!\n{rule}"
    )
}

/// Text printed once the run is over and the log has been written.
pub fn closing_banner(report: &WipeReport) -> String {
    let log_path = report.log_path.display();
    match report.outcome {
        Outcome::Success => {
            let s = &report.summary;
            format!(
                "{RULE}\nWIPE COMPLETED SUCCESSFULLY!\n{RULE}\n\
                 Device: {}\n\
                 Android: {}\n\
                 Steps: {}/{} successful\n\
                 Duration: {:.1} seconds\n\
                 Log saved to: {}\n\
                 {RULE}\n\
                 Your device should now be completely erased.\n\
                 It may take several minutes to boot up for the first time.\n\
                 {RULE}",
                s.device_model,
                s.android_version,
                s.successful_steps,
                s.total_steps,
                s.duration_seconds,
                log_path,
            )
        }
        Outcome::Cancelled => format!("\nOperation cancelled by user.\nLog saved to: {}", log_path),
        _ => format!("Wipe process failed. Check log: {}", log_path),
    }
}
