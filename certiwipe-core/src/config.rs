//! Typed run configuration.

use crate::audit_log::Settings;
use crate::cli::Cli;
use std::path::PathBuf;
use std::time::Duration;

/// Waits between destructive steps. Tests run with [`Timings::none`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// Grace period after confirmation during which Ctrl+C still aborts untouched.
    pub countdown: Duration,
    /// After `adb reboot bootloader`, and before re-checking fastboot on retry.
    pub reboot_wait: Duration,
    /// After an unlock/lock command, while the user confirms on the device.
    pub lock_state_wait: Duration,
    /// Between partition operations.
    pub partition_gap: Duration,
    /// After the final `fastboot reboot`.
    pub final_reboot_wait: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            countdown: Duration::from_secs(10),
            reboot_wait: Duration::from_secs(10),
            lock_state_wait: Duration::from_secs(10),
            partition_gap: Duration::from_secs(2),
            final_reboot_wait: Duration::from_secs(5),
        }
    }
}

impl Timings {
    pub fn none() -> Self {
        Self {
            countdown: Duration::ZERO,
            reboot_wait: Duration::ZERO,
            lock_state_wait: Duration::ZERO,
            partition_gap: Duration::ZERO,
            final_reboot_wait: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WipeConfig {
    pub verbose: bool,
    pub log_file: PathBuf,
    pub adb_override: Option<PathBuf>,
    pub fastboot_override: Option<PathBuf>,
    pub relock: bool,
    pub command_timeout: Duration,
    pub timings: Timings,
}

impl Default for WipeConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            log_file: PathBuf::from(crate::audit_log::DEFAULT_LOG_FILE),
            adb_override: None,
            fastboot_override: None,
            relock: true,
            command_timeout: Duration::from_secs(120),
            timings: Timings::default(),
        }
    }
}

impl From<&Cli> for WipeConfig {
    fn from(cli: &Cli) -> Self {
        let reboot_wait = Duration::from_secs(cli.reboot_wait);
        Self {
            verbose: cli.verbose,
            log_file: cli.log_file.clone(),
            adb_override: cli.adb.clone(),
            fastboot_override: cli.fastboot.clone(),
            relock: !cli.no_relock,
            command_timeout: Duration::from_secs(cli.command_timeout),
            timings: Timings {
                countdown: Duration::from_secs(cli.countdown),
                reboot_wait,
                lock_state_wait: reboot_wait,
                ..Timings::default()
            },
        }
    }
}

impl WipeConfig {
    /// Settings block recorded in the audit log.
    pub fn settings(&self) -> Settings {
        Settings {
            verbose: self.verbose,
            log_file: self.log_file.display().to_string(),
            relock: self.relock,
            command_timeout_secs: self.command_timeout.as_secs(),
            countdown_secs: self.timings.countdown.as_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn cli_flags_map_onto_config() {
        let cli = Cli::try_parse_from([
            "certiwipe",
            "--no-relock",
            "--command-timeout",
            "30",
            "--countdown",
            "0",
            "--fastboot",
            "/opt/platform-tools/fastboot",
        ])
        .unwrap();
        let cfg = WipeConfig::from(&cli);
        assert!(!cfg.relock);
        assert_eq!(cfg.command_timeout, Duration::from_secs(30));
        assert_eq!(cfg.timings.countdown, Duration::ZERO);
        assert_eq!(
            cfg.fastboot_override,
            Some(PathBuf::from("/opt/platform-tools/fastboot"))
        );
        assert_eq!(cfg.timings.partition_gap, Duration::from_secs(2));
    }

    #[test]
    fn settings_reflect_config() {
        let cfg = WipeConfig::default();
        let settings = cfg.settings();
        assert!(settings.relock);
        assert_eq!(settings.log_file, "wipe_log.json");
        assert_eq!(settings.command_timeout_secs, 120);
    }
}
