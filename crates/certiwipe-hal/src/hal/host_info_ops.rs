//! Host information (read-only).
//!
//! This is "world-touching" (reads `/etc`, `/proc`) and belongs in the HAL.

pub trait HostInfoOps {
    fn hostname(&self) -> Option<String>;
    fn kernel_release(&self) -> Option<String>;
}
