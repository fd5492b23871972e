//! The individual workflow stages. Each returns `Ok(false)` on an expected failure (already
//! recorded in the log) and `Err` only for interruption or unexpected errors.

use super::session::WipeSession;
use crate::audit_log::{BootloaderStatus, PartitionResult, PartitionStatus, StepStatus};
use crate::confirm::{confirm_wipe, Confirmation};
use crate::device::{parse_adb_devices, select_device, DeviceProperty, DeviceSelection};
use crate::errors::{is_read_interrupted, WipeError};
use crate::fastboot::{
    parse_fastboot_devices, reports_unlocked, LockMethod, LOCK_METHODS, UNLOCK_METHODS,
    WIPE_PLAN,
};
use anyhow::Result;
use certiwipe_hal::CommandRequest;
use chrono::Local;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy)]
enum Tool {
    Adb,
    Fastboot,
}

impl Tool {
    fn binary(self) -> &'static str {
        match self {
            Tool::Adb => "adb",
            Tool::Fastboot => "fastboot",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Tool::Adb => "ADB",
            Tool::Fastboot => "Fastboot",
        }
    }
}

impl WipeSession<'_> {
    /// Stage 1: resolve `adb` and `fastboot`. Stops at the first missing tool.
    pub(super) fn locate_tools(&mut self) -> Result<bool> {
        for tool in [Tool::Adb, Tool::Fastboot] {
            match self.locate(tool) {
                Some(path) => match tool {
                    Tool::Adb => self.adb = Some(path),
                    Tool::Fastboot => self.fastboot = Some(path),
                },
                None => return Ok(false),
            }
        }
        Ok(true)
    }

    fn locate(&mut self, tool: Tool) -> Option<PathBuf> {
        let step = format!("find_{}", tool.binary());
        self.log.log_step(
            &step,
            StepStatus::Started,
            format!("Looking for {} executable", tool.label()),
        );

        let override_path = match tool {
            Tool::Adb => self.config.adb_override.clone(),
            Tool::Fastboot => self.config.fastboot_override.clone(),
        };
        let found = match override_path {
            Some(path) if path.is_file() => Some(path),
            Some(path) => {
                log::warn!(
                    "{} override {} does not exist",
                    tool.label(),
                    path.display()
                );
                None
            }
            None => self.hal.find_program(tool.binary()),
        };

        match found {
            Some(path) => {
                self.log.log_step(
                    &step,
                    StepStatus::Success,
                    format!("Found {} at {}", tool.label(), path.display()),
                );
                Some(path)
            }
            None => {
                let msg = WipeError::ToolNotFound {
                    tool: tool.label().to_string(),
                }
                .to_string();
                log::error!("ERROR: {}", msg);
                self.log.log_step(&step, StepStatus::Failed, msg.clone());
                self.log.error(msg);
                None
            }
        }
    }

    /// Stage 2: exactly one authorized device must be reachable over adb.
    pub(super) fn check_device_connection(&mut self) -> Result<bool> {
        const STEP: &str = "check_connection";
        self.log
            .log_step(STEP, StepStatus::Started, "Checking device connection");

        let request = self.adb(&["devices"])?;
        let Some(out) = self.run_command(request)? else {
            self.log
                .log_step(STEP, StepStatus::Failed, "ADB devices command failed");
            return Ok(false);
        };

        let devices = parse_adb_devices(&out.stdout);
        if devices.is_empty() {
            let msg = WipeError::NoDevice.to_string();
            self.log.log_step(STEP, StepStatus::Failed, msg.clone());
            self.log.error(msg);
            println!("No devices found. Please connect an Android device with USB debugging enabled.");
            return Ok(false);
        }

        match select_device(&devices) {
            DeviceSelection::Authorized(id) => {
                self.log
                    .log_step(STEP, StepStatus::Success, format!("Device found: {}", id));
                self.log.device_info_mut().device_id = Some(id);
                println!("Device found and authorized.");
                Ok(true)
            }
            DeviceSelection::Unauthorized(_) => {
                let msg = WipeError::Unauthorized.to_string();
                self.log.set_detected_devices(devices);
                self.log.log_step(STEP, StepStatus::Failed, msg.clone());
                self.log.error(msg);
                println!("Device is not authorized. Please allow USB debugging on your device.");
                Ok(false)
            }
            DeviceSelection::NoneAuthorized => {
                let msg = "No authorized devices found";
                self.log.set_detected_devices(devices);
                self.log.log_step(STEP, StepStatus::Failed, msg);
                self.log.error(msg);
                println!("No authorized devices found.");
                Ok(false)
            }
        }
    }

    /// Stage 3: read identifying properties. Missing values become `unknown` plus a warning.
    pub(super) fn collect_device_info(&mut self) -> Result<()> {
        const STEP: &str = "get_device_info";
        self.log
            .log_step(STEP, StepStatus::Started, "Collecting device information");

        for prop in DeviceProperty::ALL {
            let request = self.adb(&["shell", "getprop", prop.prop()])?;
            let value = self
                .run_command(request)?
                .filter(|out| out.success() && !out.stdout.is_empty())
                .map(|out| out.stdout);
            match value {
                Some(v) => prop.apply(self.log.device_info_mut(), v),
                None => {
                    prop.apply(self.log.device_info_mut(), "unknown".to_string());
                    self.log
                        .warning(format!("Could not retrieve {} from device", prop.key()));
                }
            }
        }

        let info = self.log.device_info();
        let details = format!(
            "Collected info for {} {}",
            info.manufacturer_or_unknown(),
            info.model_or_unknown()
        );
        self.log.log_step(STEP, StepStatus::Completed, details);
        Ok(())
    }

    /// Stage 4: two typed confirmations.
    pub(super) fn confirm(&mut self) -> Result<bool> {
        const STEP: &str = "confirmation";
        self.log
            .log_step(STEP, StepStatus::Started, "Requesting user confirmation");

        let answer = match confirm_wipe(self.prompter, self.log.device_info()) {
            Ok(answer) => answer,
            // A prompt killed by Ctrl+C surfaces as a failed read, not as an answer.
            Err(err) if self.cancel.is_cancelled() || is_read_interrupted(&err) => {
                log::debug!("prompt aborted: {:#}", err);
                return Err(WipeError::Interrupted.into());
            }
            Err(err) => return Err(err),
        };
        self.check_cancel()?;

        let declined = match answer {
            Confirmation::Confirmed => {
                self.log
                    .log_step(STEP, StepStatus::Confirmed, "User confirmed wipe operation");
                return Ok(true);
            }
            Confirmation::PhraseMismatch => "User did not type the confirmation phrase",
            Confirmation::FinalDeclined => "User declined final confirmation",
        };
        self.log.log_step(STEP, StepStatus::Cancelled, declined);
        println!("Wipe cancelled.");
        Ok(false)
    }

    /// Last chance to back out before anything is touched.
    pub(super) fn countdown(&self) -> Result<()> {
        let secs = self.config.timings.countdown.as_secs();
        if secs > 0 {
            println!("Starting wipe process in {} seconds...", secs);
            println!("Press Ctrl+C to cancel");
        }
        self.pause(self.config.timings.countdown)
    }

    /// Stage 5: switch the device into fastboot mode.
    pub(super) fn reboot_to_bootloader(&mut self) -> Result<bool> {
        const STEP: &str = "reboot_bootloader";
        self.log
            .log_step(STEP, StepStatus::Started, "Rebooting to bootloader mode");
        let request = self.adb(&["reboot", "bootloader"])?;
        let ok = self
            .run_command(request)?
            .map(|out| out.success())
            .unwrap_or(false);
        self.pause(self.config.timings.reboot_wait)?;

        if ok {
            self.log
                .log_step(STEP, StepStatus::Success, "Reboot to bootloader requested");
        } else {
            self.log
                .log_step(STEP, StepStatus::Failed, "adb reboot bootloader failed");
            self.log.error("Failed to reboot to bootloader");
        }
        Ok(ok)
    }

    /// Stage 6: confirm the device shows up in `fastboot devices`.
    pub(super) fn check_fastboot_connection(&mut self) -> Result<bool> {
        const STEP: &str = "check_fastboot";
        self.log
            .log_step(STEP, StepStatus::Started, "Checking fastboot connection");

        let request = self.fastboot(&["devices"])?;
        let Some(out) = self.run_command(request)? else {
            self.log
                .log_step(STEP, StepStatus::Failed, "Fastboot devices command failed");
            return Ok(false);
        };

        match parse_fastboot_devices(&out.stdout) {
            Some(id) => {
                self.log
                    .log_step(STEP, StepStatus::Success, "Device found in fastboot mode");
                self.log.device_info_mut().fastboot_id = Some(id);
                Ok(true)
            }
            None => {
                let msg = "No devices found in fastboot mode";
                self.log.log_step(STEP, StepStatus::Failed, msg);
                self.log.error(msg);
                println!("No devices found in fastboot mode. Trying to reboot to bootloader again.");
                Ok(false)
            }
        }
    }

    fn lock_request(&self, method: &LockMethod) -> Result<CommandRequest> {
        let request = self.fastboot(method.args)?;
        Ok(match method.stdin {
            Some(input) => request.with_stdin(input),
            None => request,
        })
    }

    /// Try each method in order; returns the command line of the first that exits 0.
    fn first_accepted(&mut self, methods: &[LockMethod]) -> Result<Option<String>> {
        for method in methods {
            let request = self.lock_request(method)?;
            let display = request.display();
            if let Some(out) = self.run_command(request)? {
                if out.success() {
                    return Ok(Some(display));
                }
            }
        }
        Ok(None)
    }

    /// Stage 7: unlock the bootloader unless it already is.
    pub(super) fn unlock_bootloader(&mut self) -> Result<bool> {
        const STEP: &str = "unlock_bootloader";
        self.log
            .log_step(STEP, StepStatus::Started, "Unlocking bootloader");

        let request = self.fastboot(&["getvar", "unlocked"])?;
        if let Some(out) = self.run_command(request)? {
            if reports_unlocked(&out.stdout, &out.stderr) {
                self.log
                    .log_step(STEP, StepStatus::Skipped, "Bootloader already unlocked");
                self.log.device_info_mut().bootloader_status =
                    Some(BootloaderStatus::AlreadyUnlocked);
                return Ok(true);
            }
        }

        match self.first_accepted(&UNLOCK_METHODS)? {
            Some(method) => {
                self.log
                    .log_step(STEP, StepStatus::Success, "Bootloader unlock command sent");
                let info = self.log.device_info_mut();
                info.bootloader_status = Some(BootloaderStatus::Unlocked);
                info.unlock_method = Some(method);
                println!("Please confirm unlock on your device using volume and power buttons");
                self.pause(self.config.timings.lock_state_wait)?;
                Ok(true)
            }
            None => {
                self.log
                    .log_step(STEP, StepStatus::Failed, "Could not unlock bootloader");
                self.log.error("Failed to unlock bootloader");
                Ok(false)
            }
        }
    }

    /// Stage 8: erase/format every partition in the plan. Individual failures are recorded
    /// and warned about; the stage only fails when nothing could be wiped.
    pub(super) fn wipe_partitions(&mut self) -> Result<bool> {
        const STEP: &str = "wipe_partitions";
        self.log.log_step(STEP, StepStatus::Started, "Wiping partitions");

        let mut succeeded = 0usize;
        for op in WIPE_PLAN {
            let request = self.fastboot(&op.args())?;
            let ok = self
                .run_command(request)?
                .map(|out| out.success())
                .unwrap_or(false);

            let step = format!("wipe_{}", op.partition);
            let status = if ok {
                succeeded += 1;
                self.log.log_step(
                    &step,
                    StepStatus::Success,
                    format!("Successfully {} {}", op.action.past_tense(), op.partition),
                );
                PartitionStatus::Success
            } else {
                let msg = format!("Failed to {} {}", op.action.as_str(), op.partition);
                self.log.log_step(&step, StepStatus::Failed, msg.clone());
                self.log.warning(msg);
                PartitionStatus::Failed
            };
            self.log.push_wipe_result(PartitionResult {
                partition: op.partition.to_string(),
                action: op.action,
                status,
                timestamp: Local::now(),
            });

            self.pause(self.config.timings.partition_gap)?;
        }

        let tally = format!(
            "{}/{} partition operations succeeded",
            succeeded,
            WIPE_PLAN.len()
        );
        if succeeded == 0 {
            self.log.log_step(STEP, StepStatus::Failed, tally);
            self.log.error("No partition could be wiped");
            return Ok(false);
        }
        self.log.log_step(STEP, StepStatus::Completed, tally);
        Ok(true)
    }

    /// Stage 9: best-effort re-lock. Failure is a warning, never a stage failure.
    pub(super) fn lock_bootloader(&mut self) -> Result<bool> {
        const STEP: &str = "lock_bootloader";
        if !self.config.relock {
            self.log
                .log_step(STEP, StepStatus::Skipped, "Re-lock disabled (--no-relock)");
            return Ok(false);
        }
        self.log.log_step(STEP, StepStatus::Started, "Locking bootloader");

        match self.first_accepted(&LOCK_METHODS)? {
            Some(_) => {
                self.log
                    .log_step(STEP, StepStatus::Success, "Bootloader lock command sent");
                self.log.device_info_mut().bootloader_status = Some(BootloaderStatus::Locked);
                println!("Please confirm lock on your device using volume and power buttons");
                self.pause(self.config.timings.lock_state_wait)?;
                Ok(true)
            }
            None => {
                self.log
                    .log_step(STEP, StepStatus::Failed, "Could not lock bootloader");
                self.log.warning("Failed to lock bootloader");
                Ok(false)
            }
        }
    }

    /// Stage 10: reboot out of fastboot. The wipe is already done, so failure only warns.
    pub(super) fn reboot_device(&mut self) -> Result<bool> {
        const STEP: &str = "reboot_device";
        self.log.log_step(STEP, StepStatus::Started, "Rebooting device");
        let request = self.fastboot(&["reboot"])?;
        let ok = self
            .run_command(request)?
            .map(|out| out.success())
            .unwrap_or(false);
        self.pause(self.config.timings.final_reboot_wait)?;

        if ok {
            self.log.log_step(STEP, StepStatus::Success, "Reboot requested");
        } else {
            self.log
                .log_step(STEP, StepStatus::Failed, "fastboot reboot failed");
            self.log
                .warning("Device did not acknowledge reboot; reboot it manually");
        }
        Ok(ok)
    }
}
