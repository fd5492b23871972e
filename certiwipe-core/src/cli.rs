//! CLI argument parsing for certiwipe.
//!
//! There are no subcommands: a run is always the full wipe workflow.

use crate::audit_log::DEFAULT_LOG_FILE;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "certiwipe", version)]
#[command(about = "Android Data Wiping Tool (Fastboot Method)")]
#[command(long_about = "Android Data Wiping Tool (Fastboot Method)\n\n\
    Reboots an attached Android device into its bootloader, unlocks it and erases\n\
    userdata, cache, system, boot, recovery, persist and metadata with fastboot.\n\
    Every step and command is recorded in a JSON log.")]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// JSON log file name
    #[arg(short, long, default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Path to the adb executable (default: search PATH)
    #[arg(long, value_name = "PATH")]
    pub adb: Option<PathBuf>,

    /// Path to the fastboot executable (default: search PATH)
    #[arg(long, value_name = "PATH")]
    pub fastboot: Option<PathBuf>,

    /// Leave the bootloader unlocked after wiping
    #[arg(long)]
    pub no_relock: bool,

    /// Timeout for each external command, in seconds
    #[arg(long, value_name = "SECS", default_value_t = 120)]
    pub command_timeout: u64,

    /// Seconds to wait (Ctrl+C cancels) between confirmation and the first destructive step
    #[arg(long, value_name = "SECS", default_value_t = 10)]
    pub countdown: u64,

    /// Seconds to wait for the device after a reboot or lock-state change
    #[arg(long, value_name = "SECS", default_value_t = 10)]
    pub reboot_wait: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cli = Cli::try_parse_from(["certiwipe"]).unwrap();
        assert!(!cli.verbose);
        assert_eq!(cli.log_file, PathBuf::from("wipe_log.json"));
        assert_eq!(cli.command_timeout, 120);
        assert_eq!(cli.countdown, 10);
        assert!(!cli.no_relock);
        assert!(cli.adb.is_none());
    }

    #[test]
    fn short_flags_are_accepted() {
        let cli = Cli::try_parse_from(["certiwipe", "-v", "-l", "/tmp/run.json"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.log_file, PathBuf::from("/tmp/run.json"));
    }

    #[test]
    fn subcommands_are_rejected() {
        assert!(Cli::try_parse_from(["certiwipe", "wipe"]).is_err());
    }
}
