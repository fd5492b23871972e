//! certiwipe Hardware Abstraction Layer (HAL).
//!
//! Everything that touches the outside world (spawning `adb`/`fastboot`, scanning `PATH`,
//! reading host identity) goes through the traits in [`hal`], so the wipe workflow can be
//! exercised against [`FakeHal`] without a phone attached.

pub mod hal;

pub use certiwipe_error::{HalError, HalResult};
pub use hal::{
    CommandRequest, FakeHal, FakeResponse, HostInfoOps, LinuxHal, Operation, ProcessOps,
    ToolLookupOps, WipeHal,
};
