//! Process lifecycle actions: pause, resume and terminate.
//!
//! Each action is one signal sent to one process. The public functions never
//! fail; they report an [`ActionOutcome`] carrying a success flag and a human
//! readable message. [`send_signal`] exposes the classified error for callers
//! that want to branch on it.

use crate::error::{ActionError, ActionResult};
use crate::types::Pid;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

/// The semantic signals this crate sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Continue a stopped process.
    Continue,
    /// Stop (suspend) a process. Cannot be caught.
    Stop,
    /// Cooperative termination request the target may handle.
    Terminate,
    /// Unconditional termination. Cannot be caught.
    Kill,
}

impl Signal {
    #[cfg(unix)]
    fn as_raw(self) -> libc::c_int {
        match self {
            Self::Continue => libc::SIGCONT,
            Self::Stop => libc::SIGSTOP,
            Self::Terminate => libc::SIGTERM,
            Self::Kill => libc::SIGKILL,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Continue => write!(f, "SIGCONT"),
            Self::Stop => write!(f, "SIGSTOP"),
            Self::Terminate => write!(f, "SIGTERM"),
            Self::Kill => write!(f, "SIGKILL"),
        }
    }
}

/// Result of a lifecycle action, as shown to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionOutcome {
    pub success: bool,
    pub message: String,
}

impl ActionOutcome {
    fn from_result(result: ActionResult<()>, pid: Pid, done: &str, verb: &str) -> Self {
        match result {
            Ok(()) => Self {
                success: true,
                message: format!("Process {} {}", pid, done),
            },
            Err(e) => Self {
                success: false,
                message: format!("Failed to {} process {}: {}", verb, pid, e),
            },
        }
    }
}

/// Deliver `signal` to `pid`.
///
/// Rejects non-positive pids, which `kill(2)` would interpret as process
/// groups.
#[cfg(unix)]
pub fn send_signal(pid: Pid, signal: Signal) -> ActionResult<()> {
    let raw = pid.as_i32();
    if raw <= 0 {
        return Err(ActionError::InvalidPid(raw.into()));
    }

    let rc = unsafe { libc::kill(raw, signal.as_raw()) };
    if rc == 0 {
        debug!(%pid, %signal, "signal delivered");
        return Ok(());
    }

    let err = std::io::Error::last_os_error();
    match err.raw_os_error() {
        Some(libc::ESRCH) => Err(ActionError::NoSuchProcess),
        Some(libc::EPERM) => Err(ActionError::PermissionDenied),
        _ => Err(ActionError::Os(err.to_string())),
    }
}

#[cfg(not(unix))]
pub fn send_signal(pid: Pid, _signal: Signal) -> ActionResult<()> {
    if pid.as_i32() <= 0 {
        return Err(ActionError::InvalidPid(pid.as_i32().into()));
    }
    Err(ActionError::Unsupported)
}

/// Continue a stopped process. Harmless if it was not stopped.
pub fn resume(pid: Pid) -> ActionOutcome {
    let outcome =
        ActionOutcome::from_result(send_signal(pid, Signal::Continue), pid, "resumed", "resume");
    info!(%pid, success = outcome.success, "resume");
    outcome
}

/// Suspend a process.
pub fn pause(pid: Pid) -> ActionOutcome {
    let outcome = ActionOutcome::from_result(send_signal(pid, Signal::Stop), pid, "paused", "pause");
    info!(%pid, success = outcome.success, "pause");
    outcome
}

/// Ask a process to exit, or kill it outright when `force` is set.
pub fn terminate(pid: Pid, force: bool) -> ActionOutcome {
    let signal = if force { Signal::Kill } else { Signal::Terminate };
    let done = if force { "killed" } else { "terminated" };
    let outcome = ActionOutcome::from_result(send_signal(pid, signal), pid, done, "terminate");
    info!(%pid, force, success = outcome.success, "terminate");
    outcome
}
