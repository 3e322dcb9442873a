//! Process identity attached to open ports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An operating-system process id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pid(i32);

impl Pid {
    pub const fn new(pid: i32) -> Self {
        Self(pid)
    }

    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// The id of the current process.
    pub fn current() -> Self {
        Self(std::process::id() as i32)
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for Pid {
    fn from(pid: i32) -> Self {
        Self(pid)
    }
}

/// Lifecycle status of a process as last observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessStatus {
    Running,
    Sleeping,
    Stopped,
    Zombie,
    Unknown,
    /// Attribute resolution was refused by the OS.
    AccessDenied,
}

impl ProcessStatus {
    /// Map a Linux `/proc/<pid>/stat` state letter.
    pub fn from_state_char(state: char) -> Self {
        match state {
            'R' => Self::Running,
            'S' | 'D' | 'I' | 'W' | 'P' => Self::Sleeping,
            'T' | 't' => Self::Stopped,
            'Z' => Self::Zombie,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Sleeping => write!(f, "sleeping"),
            Self::Stopped => write!(f, "stopped"),
            Self::Zombie => write!(f, "zombie"),
            Self::Unknown => write!(f, "unknown"),
            Self::AccessDenied => write!(f, "access denied"),
        }
    }
}

/// Identity of the process listening on a port.
///
/// A degraded record (see [`ProcessInfo::degraded`]) carries only the pid and
/// [`ProcessStatus::AccessDenied`]; every other field is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessInfo {
    pub pid: Pid,
    pub name: Option<String>,
    pub command_line: Option<String>,
    pub user: Option<String>,
    pub status: ProcessStatus,
    pub created_at: Option<DateTime<Utc>>,
}

impl ProcessInfo {
    /// A fully resolved record.
    pub fn new(
        pid: Pid,
        name: impl Into<String>,
        command_line: impl Into<String>,
        user: impl Into<String>,
        status: ProcessStatus,
        created_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            pid,
            name: Some(name.into()),
            command_line: Some(command_line.into()),
            user: Some(user.into()),
            status,
            created_at,
        }
    }

    /// The record produced when the OS denies inspection of `pid`.
    pub fn degraded(pid: Pid) -> Self {
        Self {
            pid,
            name: None,
            command_line: None,
            user: None,
            status: ProcessStatus::AccessDenied,
            created_at: None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.status == ProcessStatus::AccessDenied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_char_mapping() {
        assert_eq!(ProcessStatus::from_state_char('R'), ProcessStatus::Running);
        assert_eq!(ProcessStatus::from_state_char('S'), ProcessStatus::Sleeping);
        assert_eq!(ProcessStatus::from_state_char('D'), ProcessStatus::Sleeping);
        assert_eq!(ProcessStatus::from_state_char('T'), ProcessStatus::Stopped);
        assert_eq!(ProcessStatus::from_state_char('Z'), ProcessStatus::Zombie);
        assert_eq!(ProcessStatus::from_state_char('X'), ProcessStatus::Unknown);
    }

    #[test]
    fn test_degraded_record() {
        let info = ProcessInfo::degraded(Pid::new(42));
        assert!(info.is_degraded());
        assert_eq!(info.pid, Pid::new(42));
        assert!(info.name.is_none() && info.user.is_none() && info.created_at.is_none());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&ProcessStatus::AccessDenied).unwrap();
        assert_eq!(json, "\"access_denied\"");
    }
}
