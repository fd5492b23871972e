//! Device-bridge (`adb`) output parsing and property catalogue.

use crate::audit_log::DeviceInfo;
use serde::{Deserialize, Serialize};

/// One line of `adb devices`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedDevice {
    pub id: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceSelection {
    Authorized(String),
    Unauthorized(String),
    NoneAuthorized,
}

/// Parse `adb devices` output, skipping the header and daemon chatter (`* daemon started ...`).
pub fn parse_adb_devices(stdout: &str) -> Vec<DetectedDevice> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('*') && !l.starts_with("List of devices"))
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let id = parts.next()?;
            let status = parts.next()?;
            Some(DetectedDevice {
                id: id.to_string(),
                status: status.to_string(),
            })
        })
        .collect()
}

/// First device decides: an unauthorized device ahead of an authorized one stops the run.
pub fn select_device(devices: &[DetectedDevice]) -> DeviceSelection {
    for dev in devices {
        match dev.status.as_str() {
            "unauthorized" => return DeviceSelection::Unauthorized(dev.id.clone()),
            "device" => return DeviceSelection::Authorized(dev.id.clone()),
            _ => {}
        }
    }
    DeviceSelection::NoneAuthorized
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceProperty {
    Model,
    Manufacturer,
    AndroidVersion,
    Serial,
    ProductName,
    BuildId,
    BuildVersion,
    Hardware,
    Platform,
}

impl DeviceProperty {
    pub const ALL: [DeviceProperty; 9] = [
        DeviceProperty::Model,
        DeviceProperty::Manufacturer,
        DeviceProperty::AndroidVersion,
        DeviceProperty::Serial,
        DeviceProperty::ProductName,
        DeviceProperty::BuildId,
        DeviceProperty::BuildVersion,
        DeviceProperty::Hardware,
        DeviceProperty::Platform,
    ];

    /// Field name in the audit log.
    pub fn key(self) -> &'static str {
        match self {
            DeviceProperty::Model => "model",
            DeviceProperty::Manufacturer => "manufacturer",
            DeviceProperty::AndroidVersion => "android_version",
            DeviceProperty::Serial => "serial",
            DeviceProperty::ProductName => "product_name",
            DeviceProperty::BuildId => "build_id",
            DeviceProperty::BuildVersion => "build_version",
            DeviceProperty::Hardware => "hardware",
            DeviceProperty::Platform => "platform",
        }
    }

    /// System property read with `getprop`.
    pub fn prop(self) -> &'static str {
        match self {
            DeviceProperty::Model => "ro.product.model",
            DeviceProperty::Manufacturer => "ro.product.manufacturer",
            DeviceProperty::AndroidVersion => "ro.build.version.release",
            DeviceProperty::Serial => "ro.serialno",
            DeviceProperty::ProductName => "ro.product.name",
            DeviceProperty::BuildId => "ro.build.id",
            DeviceProperty::BuildVersion => "ro.build.version.incremental",
            DeviceProperty::Hardware => "ro.hardware",
            DeviceProperty::Platform => "ro.board.platform",
        }
    }

    pub fn apply(self, info: &mut DeviceInfo, value: String) {
        let slot = match self {
            DeviceProperty::Model => &mut info.model,
            DeviceProperty::Manufacturer => &mut info.manufacturer,
            DeviceProperty::AndroidVersion => &mut info.android_version,
            DeviceProperty::Serial => &mut info.serial,
            DeviceProperty::ProductName => &mut info.product_name,
            DeviceProperty::BuildId => &mut info.build_id,
            DeviceProperty::BuildVersion => &mut info.build_version,
            DeviceProperty::Hardware => &mut info.hardware,
            DeviceProperty::Platform => &mut info.platform,
        };
        *slot = Some(value);
    }
}
