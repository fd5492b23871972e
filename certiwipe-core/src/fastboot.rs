//! Flashing-mode (`fastboot`) output parsing and the fixed command plans.

use crate::audit_log::PartitionAction;

/// Serial of the first device listed in fastboot mode.
pub fn parse_fastboot_devices(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .filter(|l| l.contains("fastboot"))
        .find_map(|l| l.split_whitespace().next().map(str::to_string))
}

/// `fastboot getvar unlocked` prints `unlocked: yes` (usually on stderr).
pub fn reports_unlocked(stdout: &str, stderr: &str) -> bool {
    stdout.lines().chain(stderr.lines()).any(|line| {
        line.trim()
            .strip_prefix("unlocked:")
            .map(|v| v.trim().eq_ignore_ascii_case("yes"))
            .unwrap_or(false)
    })
}

/// One way of asking the bootloader to change lock state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockMethod {
    pub args: &'static [&'static str],
    /// Answers the on-host confirmation some fastboot builds ask for.
    pub stdin: Option<&'static str>,
}

pub const UNLOCK_METHODS: [LockMethod; 3] = [
    LockMethod {
        args: &["flashing", "unlock"],
        stdin: Some("\ny\n"),
    },
    LockMethod {
        args: &["oem", "unlock"],
        stdin: None,
    },
    LockMethod {
        args: &["flashing", "unlock"],
        stdin: Some("y\n"),
    },
];

pub const LOCK_METHODS: [LockMethod; 3] = [
    LockMethod {
        args: &["flashing", "lock"],
        stdin: None,
    },
    LockMethod {
        args: &["flashing", "lock"],
        stdin: Some("y\n"),
    },
    LockMethod {
        args: &["oem", "lock"],
        stdin: None,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionOp {
    pub partition: &'static str,
    pub action: PartitionAction,
}

impl PartitionOp {
    const fn erase(partition: &'static str) -> Self {
        Self {
            partition,
            action: PartitionAction::Erase,
        }
    }

    const fn format(partition: &'static str) -> Self {
        Self {
            partition,
            action: PartitionAction::Format,
        }
    }

    pub fn args(&self) -> [&'static str; 2] {
        [self.action.as_str(), self.partition]
    }
}

/// Partitions cleared during the wipe, in order.
pub const WIPE_PLAN: [PartitionOp; 9] = [
    PartitionOp::erase("userdata"),
    PartitionOp::format("userdata"),
    PartitionOp::erase("cache"),
    PartitionOp::format("cache"),
    PartitionOp::erase("system"),
    PartitionOp::erase("boot"),
    PartitionOp::erase("recovery"),
    PartitionOp::erase("persist"),
    PartitionOp::erase("metadata"),
];
