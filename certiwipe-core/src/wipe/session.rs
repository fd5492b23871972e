use crate::audit_log::{AuditLog, CommandCompletion, StepStatus, SystemInfo, WipeLog};
use crate::cancel::CancelToken;
use crate::config::WipeConfig;
use crate::confirm::Prompter;
use crate::errors::WipeError;
use anyhow::{Context, Result};
use certiwipe_hal::{CommandRequest, WipeHal};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

const CANCEL_POLL: Duration = Duration::from_millis(100);

/// Captured result of a command that ran to completion (any exit code).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Mutable state of one wipe run: the HAL, the audit log and the resolved tool paths.
pub struct WipeSession<'a> {
    pub(super) hal: Arc<dyn WipeHal>,
    pub(super) prompter: &'a dyn Prompter,
    pub(super) cancel: CancelToken,
    pub(super) config: WipeConfig,
    pub(super) log: AuditLog,
    pub(super) adb: Option<PathBuf>,
    pub(super) fastboot: Option<PathBuf>,
}

impl<'a> WipeSession<'a> {
    pub fn new(
        config: WipeConfig,
        hal: Arc<dyn WipeHal>,
        prompter: &'a dyn Prompter,
        cancel: CancelToken,
    ) -> Self {
        let data = WipeLog::new(SystemInfo::collect(hal.as_ref()), config.settings());
        let log = AuditLog::new(config.log_file.clone(), config.verbose, data);
        Self {
            hal,
            prompter,
            cancel,
            config,
            log,
            adb: None,
            fastboot: None,
        }
    }

    pub(super) fn check_cancel(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(WipeError::Interrupted.into());
        }
        Ok(())
    }

    /// Sleep in short slices so Ctrl+C is honoured promptly.
    pub(super) fn pause(&self, duration: Duration) -> Result<()> {
        let deadline = Instant::now() + duration;
        loop {
            self.check_cancel()?;
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            std::thread::sleep(CANCEL_POLL.min(deadline - now));
        }
    }

    pub(super) fn adb_path(&self) -> Result<&Path> {
        self.adb.as_deref().context("adb path not resolved")
    }

    pub(super) fn fastboot_path(&self) -> Result<&Path> {
        self.fastboot.as_deref().context("fastboot path not resolved")
    }

    pub(super) fn adb(&self, args: &[&str]) -> Result<CommandRequest> {
        Ok(CommandRequest::new(
            self.adb_path()?,
            args.iter().copied(),
            self.config.command_timeout,
        ))
    }

    pub(super) fn fastboot(&self, args: &[&str]) -> Result<CommandRequest> {
        Ok(CommandRequest::new(
            self.fastboot_path()?,
            args.iter().copied(),
            self.config.command_timeout,
        ))
    }

    /// Run one external command, recording a `command` step before and after plus a command
    /// record.
    ///
    /// Returns `None` when the command never produced an exit status (timeout, spawn failure);
    /// those are also appended to the error list. A non-zero exit is returned to the caller
    /// and logged as `failed`.
    pub(super) fn run_command(&mut self, request: CommandRequest) -> Result<Option<CommandOutput>> {
        self.check_cancel()?;
        let command = request.display();
        self.log
            .log_step("command", StepStatus::Started, command.clone());
        let index = self.log.record_command(&request);

        let result = match self.hal.run(&request) {
            Ok(output) => {
                let out = CommandOutput {
                    code: output.status.code(),
                    stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                };
                self.log.complete_command(
                    index,
                    CommandCompletion::Exited {
                        returncode: out.code,
                        stdout: out.stdout.clone(),
                        stderr: out.stderr.clone(),
                    },
                );
                let status = if out.success() {
                    StepStatus::Success
                } else {
                    StepStatus::Failed
                };
                self.log.log_step(
                    "command",
                    status,
                    json!({
                        "command": command,
                        "returncode": out.code,
                        "stdout": out.stdout,
                        "stderr": out.stderr,
                    }),
                );
                Some(out)
            }
            Err(err) if err.is_timeout() => {
                let msg = format!("Command timed out: {}", command);
                log::error!("⏱️ {}", msg);
                self.log.log_step("command", StepStatus::Timeout, msg.clone());
                self.log.complete_command(
                    index,
                    CommandCompletion::Aborted {
                        error: "timeout".to_string(),
                    },
                );
                self.log.error(msg);
                None
            }
            Err(err) => {
                let msg = format!("Error running command: {}", err);
                log::error!("{}", msg);
                self.log.log_step("command", StepStatus::Error, msg.clone());
                self.log.complete_command(
                    index,
                    CommandCompletion::Aborted {
                        error: err.to_string(),
                    },
                );
                self.log.error(msg);
                None
            }
        };

        // SIGINT reaches the child too; report the interruption rather than its side effects.
        self.check_cancel()?;
        Ok(result)
    }
}
