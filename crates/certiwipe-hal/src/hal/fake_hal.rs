//! Fake HAL implementation for testing.
//!
//! This implementation records all operations without executing them,
//! allowing for CI-safe testing without a device or the platform tools installed.

use super::{CommandRequest, HostInfoOps, ProcessOps, ToolLookupOps};
use crate::{HalError, HalResult};
use std::collections::{HashMap, VecDeque};
#[cfg(unix)]
use std::os::unix::process::ExitStatusExt;
use std::path::PathBuf;
use std::process::{ExitStatus, Output};
use std::sync::{Arc, Mutex};

/// Operation records for testing and verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Command {
        /// `<program name> <args...>`, e.g. `fastboot erase userdata`.
        key: String,
        stdin: Option<String>,
        timeout_secs: u64,
    },
}

impl Operation {
    pub fn key(&self) -> &str {
        match self {
            Operation::Command { key, .. } => key,
        }
    }
}

/// Scripted answer for a command.
#[derive(Debug, Clone)]
pub enum FakeResponse {
    Success(String),
    Exit {
        code: i32,
        stdout: String,
        stderr: String,
    },
    Timeout,
    NotFound,
}

impl FakeResponse {
    pub fn ok(stdout: &str) -> Self {
        FakeResponse::Success(stdout.to_string())
    }

    pub fn fail(code: i32, stderr: &str) -> Self {
        FakeResponse::Exit {
            code,
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }
}

#[derive(Debug, Default)]
struct FakeHalState {
    operations: Vec<Operation>,
    /// Queued responses per command key. The last response is sticky.
    responses: HashMap<String, VecDeque<FakeResponse>>,
    tools: HashMap<String, PathBuf>,
    hostname: Option<String>,
}

/// Fake HAL implementation that records operations without executing them.
///
/// Commands without a scripted response succeed with empty output.
#[derive(Debug, Clone, Default)]
pub struct FakeHal {
    state: Arc<Mutex<FakeHalState>>,
}

#[cfg(unix)]
fn exit_status(code: i32) -> ExitStatus {
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(code as u32)
}

fn command_key(request: &CommandRequest) -> String {
    let mut key = request.program_name();
    for arg in &request.args {
        key.push(' ');
        key.push_str(arg);
    }
    key
}

impl FakeHal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fake with `adb` and `fastboot` resolvable under `/fake/bin`.
    pub fn with_platform_tools() -> Self {
        let hal = Self::new();
        hal.add_tool("adb", "/fake/bin/adb");
        hal.add_tool("fastboot", "/fake/bin/fastboot");
        hal
    }

    pub fn add_tool(&self, name: &str, path: &str) {
        self.state
            .lock()
            .unwrap()
            .tools
            .insert(name.to_string(), PathBuf::from(path));
    }

    pub fn set_hostname(&self, hostname: &str) {
        self.state.lock().unwrap().hostname = Some(hostname.to_string());
    }

    /// Queue a response for `key` (`<program name> <args...>`).
    pub fn respond(&self, key: &str, response: FakeResponse) {
        self.state
            .lock()
            .unwrap()
            .responses
            .entry(key.to_string())
            .or_default()
            .push_back(response);
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<Operation> {
        self.state.lock().unwrap().operations.clone()
    }

    /// Command keys in execution order.
    pub fn command_keys(&self) -> Vec<String> {
        self.operations()
            .iter()
            .map(|op| op.key().to_string())
            .collect()
    }

    /// Get the number of operations recorded.
    pub fn operation_count(&self) -> usize {
        self.state.lock().unwrap().operations.len()
    }

    /// Check if a specific operation was recorded.
    pub fn has_operation(&self, check: impl Fn(&Operation) -> bool) -> bool {
        self.state.lock().unwrap().operations.iter().any(check)
    }

    fn next_response(&self, key: &str) -> Option<FakeResponse> {
        let mut state = self.state.lock().unwrap();
        let queue = state.responses.get_mut(key)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

impl ProcessOps for FakeHal {
    fn run(&self, request: &CommandRequest) -> HalResult<Output> {
        let key = command_key(request);
        log::info!("FAKE HAL: {}", key);
        self.state.lock().unwrap().operations.push(Operation::Command {
            key: key.clone(),
            stdin: request.stdin.clone(),
            timeout_secs: request.timeout.as_secs(),
        });

        match self
            .next_response(&key)
            .unwrap_or_else(|| FakeResponse::ok(""))
        {
            FakeResponse::Success(stdout) => Ok(Output {
                status: exit_status(0),
                stdout: stdout.into_bytes(),
                stderr: Vec::new(),
            }),
            FakeResponse::Exit {
                code,
                stdout,
                stderr,
            } => Ok(Output {
                status: exit_status(code),
                stdout: stdout.into_bytes(),
                stderr: stderr.into_bytes(),
            }),
            FakeResponse::Timeout => Err(HalError::CommandTimeout {
                program: request.program_name(),
                timeout_secs: request.timeout.as_secs(),
            }),
            FakeResponse::NotFound => Err(HalError::CommandNotFound(request.program_name())),
        }
    }
}

impl ToolLookupOps for FakeHal {
    fn find_program(&self, name: &str) -> Option<PathBuf> {
        self.state.lock().unwrap().tools.get(name).cloned()
    }
}

impl HostInfoOps for FakeHal {
    fn hostname(&self) -> Option<String> {
        self.state.lock().unwrap().hostname.clone()
    }

    fn kernel_release(&self) -> Option<String> {
        None
    }
}
