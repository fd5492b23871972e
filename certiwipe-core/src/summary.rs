//! Run summary derived from the audit log.

use crate::audit_log::{StepStatus, WipeLog};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub start_time: DateTime<Local>,
    pub end_time: DateTime<Local>,
    pub duration_seconds: f64,
    pub total_steps: usize,
    pub successful_steps: usize,
    pub success_rate: String,
    pub errors_count: usize,
    pub warnings_count: usize,
    pub commands_executed: usize,
    pub device_model: String,
    pub manufacturer: String,
    pub android_version: String,
    pub serial: String,
}

impl Summary {
    pub fn from_log(log: &WipeLog, end_time: DateTime<Local>) -> Self {
        let total_steps = log.steps.len();
        let successful_steps = log.count_steps(StepStatus::Success);
        let duration_seconds =
            (end_time - log.timestamp).num_milliseconds().max(0) as f64 / 1000.0;
        let device = &log.device_info;
        Self {
            start_time: log.timestamp,
            end_time,
            duration_seconds,
            total_steps,
            successful_steps,
            success_rate: success_rate(successful_steps, total_steps),
            errors_count: log.errors.len(),
            warnings_count: log.warnings.len(),
            commands_executed: log.commands_executed.len(),
            device_model: device.model_or_unknown().to_string(),
            manufacturer: device.manufacturer_or_unknown().to_string(),
            android_version: device.android_version_or_unknown().to_string(),
            serial: device.serial_or_unknown().to_string(),
        }
    }
}

fn success_rate(successful: usize, total: usize) -> String {
    if total == 0 {
        return "0%".to_string();
    }
    format!("{:.1}%", successful as f64 / total as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit_log::{Settings, StepRecord, SystemInfo};
    use certiwipe_hal::FakeHal;
    use chrono::Duration;
    use serde_json::Value;

    fn empty_log() -> WipeLog {
        WipeLog::new(
            SystemInfo::collect(&FakeHal::new()),
            Settings {
                verbose: false,
                log_file: "wipe_log.json".to_string(),
                relock: true,
                command_timeout_secs: 120,
                countdown_secs: 0,
            },
        )
    }

    fn push(log: &mut WipeLog, step: &str, status: StepStatus) {
        log.steps.push(StepRecord {
            step: step.to_string(),
            timestamp: Local::now(),
            status,
            details: Value::Null,
        });
    }

    #[test]
    fn success_count_matches_filtered_steps_for_mixed_outcomes() {
        let statuses = [
            StepStatus::Started,
            StepStatus::Success,
            StepStatus::Timeout,
            StepStatus::Failed,
            StepStatus::Success,
            StepStatus::Completed,
            StepStatus::Error,
            StepStatus::Skipped,
            StepStatus::Success,
        ];
        // Every prefix of the sequence is its own run.
        for n in 0..=statuses.len() {
            let mut log = empty_log();
            for (i, status) in statuses[..n].iter().enumerate() {
                push(&mut log, &format!("step_{i}"), *status);
            }
            let summary = Summary::from_log(&log, Local::now());
            let filtered = log
                .steps
                .iter()
                .filter(|s| s.status == StepStatus::Success)
                .count();
            assert_eq!(summary.successful_steps, filtered);
            assert_eq!(summary.total_steps, n);
        }
    }

    #[test]
    fn success_rate_formats_one_decimal() {
        assert_eq!(success_rate(0, 0), "0%");
        assert_eq!(success_rate(1, 3), "33.3%");
        assert_eq!(success_rate(4, 4), "100.0%");
    }

    #[test]
    fn missing_device_fields_default_to_unknown() {
        let mut log = empty_log();
        log.device_info.model = Some("Pixel 7".to_string());
        log.errors.push("boom".to_string());
        log.warnings.push("meh".to_string());
        let end = log.timestamp + Duration::milliseconds(2500);

        let summary = Summary::from_log(&log, end);
        assert_eq!(summary.device_model, "Pixel 7");
        assert_eq!(summary.android_version, "Unknown");
        assert_eq!(summary.serial, "Unknown");
        assert_eq!(summary.errors_count, 1);
        assert_eq!(summary.warnings_count, 1);
        assert!((summary.duration_seconds - 2.5).abs() < f64::EPSILON);
    }
}
