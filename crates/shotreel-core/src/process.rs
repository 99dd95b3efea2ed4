//! Target process lifecycle: launch, liveness polling, termination

use crate::error::{Error, Result};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

/// Time a politely signalled process gets before it is killed.
pub const TERMINATE_GRACE: Duration = Duration::from_secs(5);

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A process owned by the current session.
#[derive(Debug)]
pub struct ProcessHandle {
    pid: u32,
    child: Option<Child>,
}

impl ProcessHandle {
    pub fn from_child(child: Child) -> Self {
        Self {
            pid: child.id(),
            child: Some(child),
        }
    }

    /// Handle for a process this session did not spawn.
    pub fn detached(pid: u32) -> Self {
        Self { pid, child: None }
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }
}

/// Spawn `exe` with its own directory as working directory and null stdio.
pub fn launch(exe: &Path) -> Result<ProcessHandle> {
    if !exe.is_file() {
        return Err(Error::executable_not_found(exe));
    }
    let exe = exe
        .canonicalize()
        .map_err(|e| Error::launch_failed(exe, &e.to_string()))?;

    let mut command = Command::new(&exe);
    if let Some(dir) = exe.parent() {
        command.current_dir(dir);
    }
    let child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| Error::launch_failed(&exe, &e.to_string()))?;

    tracing::info!(pid = child.id(), exe = %exe.display(), "launched target");
    Ok(ProcessHandle::from_child(child))
}

/// Non-blocking liveness check.
pub fn is_alive(handle: &mut ProcessHandle) -> bool {
    match handle.child.as_mut() {
        Some(child) => matches!(child.try_wait(), Ok(None)),
        None => pid_exists(handle.pid),
    }
}

/// Ask the process to stop, then kill it if it is still running after `grace`.
pub fn terminate(handle: &mut ProcessHandle, grace: Duration) -> Result<()> {
    if !is_alive(handle) {
        return Ok(());
    }

    tracing::info!(pid = handle.pid, "terminating process");
    if request_stop(handle.pid) {
        let deadline = Instant::now() + grace;
        while Instant::now() < deadline {
            if !is_alive(handle) {
                return Ok(());
            }
            std::thread::sleep(POLL_INTERVAL);
        }
        tracing::info!(pid = handle.pid, "force killing hung process");
    }

    match handle.child.as_mut() {
        Some(child) => {
            child.kill()?;
            child.wait()?;
            Ok(())
        }
        None => force_kill(handle.pid),
    }
}

#[cfg(unix)]
fn request_stop(pid: u32) -> bool {
    unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) == 0 }
}

#[cfg(not(unix))]
fn request_stop(_pid: u32) -> bool {
    false
}

#[cfg(unix)]
fn pid_exists(pid: u32) -> bool {
    unsafe { libc::kill(pid as libc::pid_t, 0) == 0 }
}

#[cfg(not(unix))]
fn pid_exists(_pid: u32) -> bool {
    false
}

#[cfg(unix)]
fn force_kill(pid: u32) -> Result<()> {
    if unsafe { libc::kill(pid as libc::pid_t, libc::SIGKILL) } != 0 {
        return Err(std::io::Error::last_os_error().into());
    }
    Ok(())
}

#[cfg(not(unix))]
fn force_kill(pid: u32) -> Result<()> {
    Err(Error::action_failed(
        "kill",
        &format!("process {} was not spawned by this session", pid),
    ))
}
