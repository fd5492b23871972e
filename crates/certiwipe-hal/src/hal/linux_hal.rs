//! Linux HAL implementation using real processes and the real filesystem.

use super::{CommandRequest, HostInfoOps, ProcessOps, ToolLookupOps};
use crate::{HalError, HalResult};
use std::env;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use wait_timeout::ChildExt;

/// Real HAL implementation for Linux systems.
#[derive(Debug, Clone, Default)]
pub struct LinuxHal;

impl LinuxHal {
    pub fn new() -> Self {
        Self
    }
}

fn map_command_err(program: &str, err: std::io::Error) -> HalError {
    if err.kind() == std::io::ErrorKind::NotFound {
        return HalError::CommandNotFound(program.to_string());
    }
    HalError::Io(err)
}

fn output_with_timeout(request: &CommandRequest) -> HalResult<Output> {
    let program = request.program_name();
    let mut cmd = Command::new(&request.program);
    cmd.args(&request.args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    // Avoid commands hanging waiting for input.
    if request.stdin.is_some() {
        cmd.stdin(Stdio::piped());
    } else {
        cmd.stdin(Stdio::null());
    }
    let mut child = cmd.spawn().map_err(|e| map_command_err(&program, e))?;

    let stdin_handle = match (child.stdin.take(), request.stdin.clone()) {
        (Some(mut pipe), Some(input)) => Some(std::thread::spawn(move || {
            // The child may exit without reading; a broken pipe is not our failure.
            let _ = pipe.write_all(input.as_bytes());
        })),
        _ => None,
    };

    let mut stdout = child.stdout.take();
    let mut stderr = child.stderr.take();

    // Drain pipes concurrently to avoid deadlocks on large output.
    let stdout_handle = std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut out) = stdout.take() {
            let _ = out.read_to_end(&mut buf);
        }
        buf
    });
    let stderr_handle = std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut err) = stderr.take() {
            let _ = err.read_to_end(&mut buf);
        }
        buf
    });

    let status = match child.wait_timeout(request.timeout).map_err(HalError::Io)? {
        Some(status) => status,
        None => {
            let _ = child.kill();
            let _ = child.wait();
            let _ = stdout_handle.join();
            let _ = stderr_handle.join();
            if let Some(h) = stdin_handle {
                let _ = h.join();
            }
            return Err(HalError::CommandTimeout {
                program,
                timeout_secs: request.timeout.as_secs(),
            });
        }
    };

    if let Some(h) = stdin_handle {
        let _ = h.join();
    }
    let stdout = stdout_handle.join().unwrap_or_default();
    let stderr = stderr_handle.join().unwrap_or_default();
    Ok(Output {
        status,
        stdout,
        stderr,
    })
}

impl ProcessOps for LinuxHal {
    fn run(&self, request: &CommandRequest) -> HalResult<Output> {
        log::debug!("exec: {}", request.display());
        output_with_timeout(request)
    }
}

fn is_executable(path: &Path) -> bool {
    let Ok(md) = fs::metadata(path) else {
        return false;
    };
    if !md.is_file() {
        return false;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        md.permissions().mode() & 0o111 != 0
    }
    #[cfg(not(unix))]
    {
        true
    }
}

fn find_in_paths(binary: &str, paths: &[PathBuf]) -> Option<PathBuf> {
    for dir in paths {
        let candidate = dir.join(binary);
        if is_executable(&candidate) {
            return Some(candidate);
        }
        #[cfg(windows)]
        {
            let alt = dir.join(format!("{binary}.exe"));
            if is_executable(&alt) {
                return Some(alt);
            }
        }
    }
    None
}

impl ToolLookupOps for LinuxHal {
    fn find_program(&self, name: &str) -> Option<PathBuf> {
        let path = env::var_os("PATH").unwrap_or_default();
        let entries = env::split_paths(&path).collect::<Vec<_>>();
        find_in_paths(name, &entries)
    }
}

fn read_trimmed(path: &str) -> Option<String> {
    fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl HostInfoOps for LinuxHal {
    fn hostname(&self) -> Option<String> {
        read_trimmed("/etc/hostname").or_else(|| read_trimmed("/proc/sys/kernel/hostname"))
    }

    fn kernel_release(&self) -> Option<String> {
        read_trimmed("/proc/sys/kernel/osrelease")
    }
}
