use super::session::WipeSession;
use crate::audit_log::{Outcome, StepStatus};
use crate::errors::is_interrupted;
use crate::summary::Summary;
use anyhow::Result;
use std::path::PathBuf;

/// What a finished run hands back to the caller.
#[derive(Debug, Clone)]
pub struct WipeReport {
    pub outcome: Outcome,
    pub summary: Summary,
    pub log_path: PathBuf,
    /// Set when the log itself could not be written.
    pub save_error: Option<String>,
}

impl WipeReport {
    pub fn exit_code(&self) -> i32 {
        self.outcome.exit_code()
    }
}

impl WipeSession<'_> {
    /// Run the whole workflow. Every exit path (success, failure, cancellation, Ctrl+C,
    /// unexpected error) ends with the summary derived and the log written.
    pub fn run(mut self) -> WipeReport {
        log::info!("🧹 Android Data Wiping Tool (Fastboot Method)");
        self.log.log_step(
            "main",
            StepStatus::Started,
            "Android Data Wiping Tool started",
        );

        let outcome = match self.execute() {
            Ok(outcome) => outcome,
            Err(err) if is_interrupted(&err) => {
                log::warn!("🛑 Operation cancelled by user");
                self.log.log_step(
                    "main",
                    StepStatus::Interrupted,
                    "Operation cancelled by user",
                );
                Outcome::Cancelled
            }
            Err(err) => {
                let msg = format!("Unexpected error: {:#}", err);
                log::error!("{}", msg);
                self.log.log_step("main", StepStatus::Error, msg.clone());
                self.log.error(msg);
                Outcome::Error
            }
        };

        self.finish(outcome)
    }

    fn finish(mut self, outcome: Outcome) -> WipeReport {
        self.log.set_result(outcome);
        let summary = self.log.finalize();
        let save_error = match self.log.save() {
            Ok(()) => {
                log::info!("📝 Log saved to {}", self.log.path().display());
                None
            }
            Err(err) => {
                log::error!("Failed to save log: {:#}", err);
                Some(format!("{:#}", err))
            }
        };
        WipeReport {
            outcome,
            summary,
            log_path: self.log.path().to_path_buf(),
            save_error,
        }
    }

    fn abort(&mut self, outcome: Outcome, msg: &str) -> Outcome {
        let status = match outcome {
            Outcome::Cancelled => StepStatus::Cancelled,
            _ => StepStatus::Failed,
        };
        self.log.log_step("main", status, msg);
        outcome
    }

    fn execute(&mut self) -> Result<Outcome> {
        if !self.locate_tools()? {
            return Ok(self.abort(Outcome::Failed, "ADB or Fastboot not available"));
        }
        if !self.check_device_connection()? {
            return Ok(self.abort(Outcome::Failed, "No device connected"));
        }
        self.collect_device_info()?;

        if !self.confirm()? {
            return Ok(self.abort(Outcome::Cancelled, "User cancelled the operation"));
        }
        self.countdown()?;

        if !self.reboot_to_bootloader()? {
            return Ok(self.abort(Outcome::Failed, "Failed to reboot to bootloader"));
        }

        // The one retried stage: devices are often slow to enumerate after the reboot.
        if !self.check_fastboot_connection()? {
            log::warn!("🔁 Device not in fastboot mode yet; retrying once");
            self.reboot_to_bootloader()?;
            self.pause(self.config.timings.reboot_wait)?;
            if !self.check_fastboot_connection()? {
                return Ok(self.abort(Outcome::Failed, "Failed to connect in fastboot mode"));
            }
        }

        if !self.unlock_bootloader()? {
            return Ok(self.abort(Outcome::Failed, "Failed to unlock bootloader"));
        }
        if !self.wipe_partitions()? {
            return Ok(self.abort(Outcome::Failed, "Failed to wipe partitions"));
        }

        self.lock_bootloader()?;
        self.reboot_device()?;

        self.log
            .log_step("main", StepStatus::Completed, "Wipe process completed");
        Ok(Outcome::Success)
    }
}
