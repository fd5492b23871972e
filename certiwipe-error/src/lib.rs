use std::io;
use thiserror::Error;

pub type HalResult<T> = Result<T, HalError>;

#[derive(Error, Debug)]
pub enum HalError {
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("Command timed out: {program} after {timeout_secs}s")]
    CommandTimeout { program: String, timeout_secs: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl HalError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, HalError::CommandTimeout { .. })
    }
}

#[derive(Error, Debug)]
pub enum WipeError {
    #[error(transparent)]
    Hal(#[from] HalError),

    #[error("{tool} not found. Please install: sudo apt install adb fastboot")]
    ToolNotFound { tool: String },

    #[error("No devices found")]
    NoDevice,

    #[error("Device is not authorized")]
    Unauthorized,

    #[error("Operation interrupted (Ctrl+C)")]
    Interrupted,
}
