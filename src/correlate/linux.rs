//! Connection and process tables read from `/proc`.
//!
//! `/proc/net/tcp{,6}` lists sockets by inode but not by owner, so owners are
//! found by walking `/proc/<pid>/fd` for the matching socket inodes. Processes
//! whose fd directory we may not read are silently skipped; their sockets
//! simply have no visible owner.

use super::{ConnectionEntry, ConnectionTable, ProcessTable, SocketState};
use crate::error::{CorrelationError, CorrelationResult};
use crate::types::{Pid, ProcessInfo, ProcessStatus};
use chrono::{DateTime, Utc};
use procfs::net::TcpState;
use procfs::process::{FDTarget, Process};
use procfs::ProcError;
use std::collections::{HashMap, HashSet};
use std::ffi::CStr;
use std::io;
use tracing::{debug, warn};

/// Connection table backed by `/proc/net/tcp` and `/proc/net/tcp6`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcfsConnections;

impl ConnectionTable for ProcfsConnections {
    fn entries(&self) -> CorrelationResult<Vec<ConnectionEntry>> {
        let mut sockets = procfs::net::tcp().map_err(classify)?;
        // IPv6 may be disabled on the host.
        match procfs::net::tcp6() {
            Ok(v6) => sockets.extend(v6),
            Err(e) => debug!(error = %e, "tcp6 table unavailable"),
        }

        let listening: HashSet<u64> = sockets
            .iter()
            .filter(|s| s.state == TcpState::Listen)
            .map(|s| s.inode)
            .collect();
        let owners = socket_owners(&listening);

        Ok(sockets
            .into_iter()
            .map(|s| ConnectionEntry {
                local_port: s.local_address.port(),
                state: if s.state == TcpState::Listen {
                    SocketState::Listen
                } else {
                    SocketState::Other
                },
                pid: owners.get(&s.inode).copied(),
            })
            .collect())
    }
}

/// Map each wanted socket inode to the first process holding it open.
fn socket_owners(wanted: &HashSet<u64>) -> HashMap<u64, Pid> {
    let mut owners = HashMap::new();
    if wanted.is_empty() {
        return owners;
    }

    let processes = match procfs::process::all_processes() {
        Ok(processes) => processes,
        Err(e) => {
            warn!(error = %e, "cannot enumerate processes");
            return owners;
        }
    };

    for process in processes.flatten() {
        let Ok(fds) = process.fd() else {
            continue;
        };
        for fd in fds.flatten() {
            if let FDTarget::Socket(inode) = fd.target {
                if wanted.contains(&inode) {
                    owners.entry(inode).or_insert(Pid::new(process.pid()));
                }
            }
        }
        if owners.len() == wanted.len() {
            break;
        }
    }

    owners
}

/// Process table backed by `/proc/<pid>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcfsProcesses;

impl ProcessTable for ProcfsProcesses {
    fn inspect(&self, pid: Pid) -> CorrelationResult<ProcessInfo> {
        let process = Process::new(pid.as_i32()).map_err(classify)?;
        let stat = process.stat().map_err(classify)?;
        let command_line = process.cmdline().map_err(classify)?.join(" ");
        let uid = process.uid().map_err(classify)?;
        let user = user_name(uid).unwrap_or_else(|| uid.to_string());

        Ok(ProcessInfo::new(
            pid,
            stat.comm,
            command_line,
            user,
            ProcessStatus::from_state_char(stat.state),
            start_time(stat.starttime),
        ))
    }
}

fn classify(err: ProcError) -> CorrelationError {
    match err {
        ProcError::NotFound(_) => CorrelationError::NotFound,
        ProcError::PermissionDenied(_) => CorrelationError::AccessDenied,
        ProcError::Io(e, _) if e.kind() == io::ErrorKind::NotFound => CorrelationError::NotFound,
        ProcError::Io(e, _) if e.raw_os_error() == Some(libc::ESRCH) => CorrelationError::NotFound,
        ProcError::Io(e, _) if e.kind() == io::ErrorKind::PermissionDenied => {
            CorrelationError::AccessDenied
        }
        other => CorrelationError::Unavailable(other.to_string()),
    }
}

/// Convert a start time in clock ticks since boot to wall-clock time.
fn start_time(ticks_since_boot: u64) -> Option<DateTime<Utc>> {
    let boot = procfs::boot_time_secs().ok()?;
    let ticks_per_second = procfs::ticks_per_second();
    if ticks_per_second == 0 {
        return None;
    }
    let secs = boot + ticks_since_boot / ticks_per_second;
    let nanos = (ticks_since_boot % ticks_per_second) * 1_000_000_000 / ticks_per_second;
    DateTime::from_timestamp(i64::try_from(secs).ok()?, nanos as u32)
}

/// Look up the login name for `uid` in the password database.
fn user_name(uid: u32) -> Option<String> {
    let mut buf = vec![0 as libc::c_char; 4096];
    let mut pwd: libc::passwd = unsafe { std::mem::zeroed() };
    let mut result: *mut libc::passwd = std::ptr::null_mut();

    let rc = unsafe { libc::getpwuid_r(uid, &mut pwd, buf.as_mut_ptr(), buf.len(), &mut result) };
    if rc != 0 || result.is_null() || pwd.pw_name.is_null() {
        return None;
    }

    let name = unsafe { CStr::from_ptr(pwd.pw_name) };
    Some(name.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inspect_self() {
        let info = ProcfsProcesses.inspect(Pid::current()).unwrap();
        assert_eq!(info.pid, Pid::current());
        assert!(!info.is_degraded());
        assert!(info.name.is_some());
        assert!(info.created_at.is_some());
    }

    #[test]
    fn test_inspect_missing_pid() {
        // Above the kernel's pid_max ceiling (4194304), so it can never exist.
        let result = ProcfsProcesses.inspect(Pid::new(i32::MAX));
        assert!(matches!(result, Err(CorrelationError::NotFound)));
    }

    #[test]
    fn test_root_user_name() {
        assert_eq!(user_name(0).as_deref(), Some("root"));
    }

    #[test]
    fn test_classify_io_errors() {
        let gone = ProcError::Io(io::Error::from_raw_os_error(libc::ESRCH), None);
        assert!(matches!(classify(gone), CorrelationError::NotFound));
        let denied = ProcError::PermissionDenied(None);
        assert!(matches!(classify(denied), CorrelationError::AccessDenied));
    }
}
