//! Persistent wipe audit log.
//!
//! One JSON document per run, always written before the process exits, whatever the outcome.
//! Default path: `wipe_log.json` in the working directory (override with `--log-file`).

use crate::device::DetectedDevice;
use crate::summary::Summary;
use anyhow::Context;
use certiwipe_hal::{CommandRequest, HostInfoOps};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

pub const TOOL_NAME: &str = "Android Data Wiping Tool (Fastboot Method)";
pub const DEFAULT_LOG_FILE: &str = "wipe_log.json";

/// Terminal state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    NotStarted,
    Success,
    Failed,
    Cancelled,
    Error,
}

impl Outcome {
    /// Process exit code for this outcome.
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Success => 0,
            _ => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Started,
    Success,
    Failed,
    Timeout,
    Error,
    Skipped,
    Completed,
    Confirmed,
    Cancelled,
    Interrupted,
}

impl StepStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            StepStatus::Started => "started",
            StepStatus::Success => "success",
            StepStatus::Failed => "failed",
            StepStatus::Timeout => "timeout",
            StepStatus::Error => "error",
            StepStatus::Skipped => "skipped",
            StepStatus::Completed => "completed",
            StepStatus::Confirmed => "confirmed",
            StepStatus::Cancelled => "cancelled",
            StepStatus::Interrupted => "interrupted",
        }
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: String,
    pub timestamp: DateTime<Local>,
    pub status: StepStatus,
    pub details: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRecord {
    pub command: String,
    pub timestamp: DateTime<Local>,
    /// Seconds.
    pub timeout: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returncode: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionAction {
    Erase,
    Format,
}

impl PartitionAction {
    pub fn as_str(self) -> &'static str {
        match self {
            PartitionAction::Erase => "erase",
            PartitionAction::Format => "format",
        }
    }

    pub fn past_tense(self) -> &'static str {
        match self {
            PartitionAction::Erase => "erased",
            PartitionAction::Format => "formatted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionResult {
    pub partition: String,
    pub action: PartitionAction,
    pub status: PartitionStatus,
    pub timestamp: DateTime<Local>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    pub hostname: String,
    pub kernel_release: Option<String>,
    pub os: String,
    pub arch: String,
    pub tool_version: String,
    pub executable_path: Option<String>,
}

impl SystemInfo {
    pub fn collect<H: HostInfoOps + ?Sized>(host: &H) -> Self {
        Self {
            hostname: host.hostname().unwrap_or_else(|| "Unknown".to_string()),
            kernel_release: host.kernel_release(),
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            executable_path: std::env::current_exe()
                .ok()
                .map(|p| p.display().to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BootloaderStatus {
    AlreadyUnlocked,
    Unlocked,
    Locked,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub android_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardware: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fastboot_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bootloader_status: Option<BootloaderStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlock_method: Option<String>,
}

impl DeviceInfo {
    fn or_unknown(value: &Option<String>) -> &str {
        value.as_deref().unwrap_or("Unknown")
    }

    pub fn model_or_unknown(&self) -> &str {
        Self::or_unknown(&self.model)
    }

    pub fn manufacturer_or_unknown(&self) -> &str {
        Self::or_unknown(&self.manufacturer)
    }

    pub fn android_version_or_unknown(&self) -> &str {
        Self::or_unknown(&self.android_version)
    }

    pub fn serial_or_unknown(&self) -> &str {
        Self::or_unknown(&self.serial)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub verbose: bool,
    pub log_file: String,
    pub relock: bool,
    pub command_timeout_secs: u64,
    pub countdown_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WipeLog {
    pub tool: String,
    pub version: String,
    pub timestamp: DateTime<Local>,
    pub system_info: SystemInfo,
    pub device_info: DeviceInfo,
    pub settings: Settings,
    pub steps: Vec<StepRecord>,
    pub commands_executed: Vec<CommandRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_devices: Option<Vec<DetectedDevice>>,
    #[serde(default)]
    pub wipe_results: Vec<PartitionResult>,
    pub result: Outcome,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,
}

impl WipeLog {
    pub fn new(system_info: SystemInfo, settings: Settings) -> Self {
        Self {
            tool: TOOL_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Local::now(),
            system_info,
            device_info: DeviceInfo::default(),
            settings,
            steps: Vec::new(),
            commands_executed: Vec::new(),
            detected_devices: None,
            wipe_results: Vec::new(),
            result: Outcome::NotStarted,
            errors: Vec::new(),
            warnings: Vec::new(),
            summary: None,
        }
    }

    pub fn count_steps(&self, status: StepStatus) -> usize {
        self.steps.iter().filter(|s| s.status == status).count()
    }
}

/// Outcome of a finished command, as stored back into its [`CommandRecord`].
#[derive(Debug, Clone)]
pub enum CommandCompletion {
    Exited {
        returncode: Option<i32>,
        stdout: String,
        stderr: String,
    },
    Aborted {
        error: String,
    },
}

/// In-memory audit log bound to its output path.
pub struct AuditLog {
    path: PathBuf,
    verbose: bool,
    data: WipeLog,
}

impl AuditLog {
    pub fn new(path: PathBuf, verbose: bool, data: WipeLog) -> Self {
        Self {
            path,
            verbose,
            data,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn data(&self) -> &WipeLog {
        &self.data
    }

    pub fn device_info(&self) -> &DeviceInfo {
        &self.data.device_info
    }

    pub fn device_info_mut(&mut self) -> &mut DeviceInfo {
        &mut self.data.device_info
    }

    pub fn log_step(&mut self, step: &str, status: StepStatus, details: impl Into<Value>) {
        let details = details.into();
        if self.verbose {
            let rendered = match &details {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            log::info!("[{}] {}: {}", step, status, rendered);
        } else {
            log::info!("{}: {}", step, status);
        }
        self.data.steps.push(StepRecord {
            step: step.to_string(),
            timestamp: Local::now(),
            status,
            details,
        });
    }

    /// Append a pending command record and return its index.
    pub fn record_command(&mut self, request: &CommandRequest) -> usize {
        self.data.commands_executed.push(CommandRecord {
            command: request.display(),
            timestamp: Local::now(),
            timeout: request.timeout.as_secs(),
            returncode: None,
            stdout: None,
            stderr: None,
            completed: false,
            error: None,
        });
        self.data.commands_executed.len() - 1
    }

    pub fn complete_command(&mut self, index: usize, completion: CommandCompletion) {
        let Some(record) = self.data.commands_executed.get_mut(index) else {
            return;
        };
        match completion {
            CommandCompletion::Exited {
                returncode,
                stdout,
                stderr,
            } => {
                record.returncode = returncode;
                record.stdout = Some(stdout);
                record.stderr = Some(stderr);
                record.completed = true;
            }
            CommandCompletion::Aborted { error } => {
                record.completed = false;
                record.error = Some(error);
            }
        }
    }

    pub fn error(&mut self, msg: impl Into<String>) {
        self.data.errors.push(msg.into());
    }

    pub fn warning(&mut self, msg: impl Into<String>) {
        self.data.warnings.push(msg.into());
    }

    pub fn set_detected_devices(&mut self, devices: Vec<DetectedDevice>) {
        self.data.detected_devices = Some(devices);
    }

    pub fn push_wipe_result(&mut self, result: PartitionResult) {
        self.data.wipe_results.push(result);
    }

    pub fn set_result(&mut self, result: Outcome) {
        self.data.result = result;
    }

    /// Derive and store the summary as of now.
    pub fn finalize(&mut self) -> Summary {
        let summary = Summary::from_log(&self.data, Local::now());
        self.data.summary = Some(summary.clone());
        summary
    }

    pub fn save(&self) -> anyhow::Result<()> {
        write_json_atomic(&self.path, &self.data).context("failed to persist wipe log")
    }
}

fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| {
            format!("failed to create log directory: {}", parent.display())
        })?;
    }
    let tmp = path.with_extension("json.tmp");
    let payload = serde_json::to_string_pretty(value).context("failed to serialize log")?;
    fs::write(&tmp, payload).with_context(|| format!("failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("failed to atomically replace log: {}", path.display()))?;
    Ok(())
}
