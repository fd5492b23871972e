//! HAL trait definitions and implementations.
//!
//! This module defines the core traits for system operations and provides
//! both real (LinuxHal) and fake (FakeHal) implementations.

pub mod fake_hal;
pub mod host_info_ops;
pub mod linux_hal;
pub mod process_ops;

pub use fake_hal::{FakeHal, FakeResponse, Operation};
pub use host_info_ops::HostInfoOps;
pub use linux_hal::LinuxHal;
pub use process_ops::{CommandRequest, ProcessOps, ToolLookupOps};

/// Complete HAL combining all system operation traits.
pub trait WipeHal: ProcessOps + ToolLookupOps + HostInfoOps + Send + Sync {}

/// Automatically implement WipeHal for any type implementing all required traits.
impl<T> WipeHal for T where T: ProcessOps + ToolLookupOps + HostInfoOps + Send + Sync {}
