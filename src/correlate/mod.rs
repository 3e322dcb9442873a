//! Process correlation - maps an open port back to the process listening on it.
//!
//! Two independently read views of the host are joined here: the table of TCP
//! sockets and the table of processes. They are read at different instants,
//! so every step tolerates the other view having moved on. Nothing is cached;
//! each lookup reads fresh snapshots.

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "linux")]
pub use linux::{ProcfsConnections, ProcfsProcesses};

use crate::error::{CorrelationError, CorrelationResult};
use crate::types::{Pid, ProcessInfo};
use tracing::{debug, warn};

/// TCP socket state, as far as correlation cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketState {
    Listen,
    Other,
}

/// One row of the connection table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionEntry {
    pub local_port: u16,
    pub state: SocketState,
    /// Owning process, when the caller is allowed to see it.
    pub pid: Option<Pid>,
}

impl ConnectionEntry {
    pub fn listening(local_port: u16, pid: Option<Pid>) -> Self {
        Self {
            local_port,
            state: SocketState::Listen,
            pid,
        }
    }
}

/// Source of the host's TCP connection table.
pub trait ConnectionTable: Send + Sync {
    /// Read a fresh snapshot of the table.
    fn entries(&self) -> CorrelationResult<Vec<ConnectionEntry>>;
}

/// Source of process identity attributes.
pub trait ProcessTable: Send + Sync {
    /// Resolve identity attributes for `pid`.
    ///
    /// Must report a vanished process as [`CorrelationError::NotFound`] and a
    /// refused inspection as [`CorrelationError::AccessDenied`].
    fn inspect(&self, pid: Pid) -> CorrelationResult<ProcessInfo>;
}

/// Maps a port to its owning process.
///
/// Never fails: a miss of any kind is `None`, a permission problem is a
/// degraded [`ProcessInfo`].
pub trait Correlator: Send + Sync {
    fn correlate(&self, port: u16) -> Option<ProcessInfo>;
}

/// Joins a [`ConnectionTable`] with a [`ProcessTable`].
#[derive(Debug, Clone, Default)]
pub struct TableCorrelator<C, P> {
    connections: C,
    processes: P,
}

impl<C, P> TableCorrelator<C, P>
where
    C: ConnectionTable,
    P: ProcessTable,
{
    pub fn new(connections: C, processes: P) -> Self {
        Self {
            connections,
            processes,
        }
    }

    /// Find the pid of the first listening socket on `port` whose owner is
    /// visible to us.
    fn owner_of(&self, port: u16) -> Option<Pid> {
        let entries = match self.connections.entries() {
            Ok(entries) => entries,
            Err(e) => {
                warn!(port, error = %e, "connection table unavailable");
                return None;
            }
        };

        entries
            .into_iter()
            .filter(|e| e.local_port == port && e.state == SocketState::Listen)
            .find_map(|e| e.pid)
    }
}

impl<C, P> Correlator for TableCorrelator<C, P>
where
    C: ConnectionTable,
    P: ProcessTable,
{
    fn correlate(&self, port: u16) -> Option<ProcessInfo> {
        let Some(pid) = self.owner_of(port) else {
            debug!(port, "no visible listener owns this port");
            return None;
        };

        match self.processes.inspect(pid) {
            Ok(info) => Some(info),
            // Exited between the two table reads; same as no owner.
            Err(CorrelationError::NotFound) => {
                debug!(port, %pid, "owning process vanished before inspection");
                None
            }
            Err(CorrelationError::AccessDenied) => {
                debug!(port, %pid, "inspection denied");
                Some(ProcessInfo::degraded(pid))
            }
            Err(e) => {
                warn!(port, %pid, error = %e, "process table unavailable");
                None
            }
        }
    }
}

/// A correlator that never finds an owner.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCorrelation;

impl Correlator for NoCorrelation {
    fn correlate(&self, _port: u16) -> Option<ProcessInfo> {
        None
    }
}

/// Stand-in tables for platforms without a supported process table.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedTables;

impl ConnectionTable for UnsupportedTables {
    fn entries(&self) -> CorrelationResult<Vec<ConnectionEntry>> {
        Err(CorrelationError::Unavailable(
            "connection table is not supported on this platform".to_string(),
        ))
    }
}

impl ProcessTable for UnsupportedTables {
    fn inspect(&self, _pid: Pid) -> CorrelationResult<ProcessInfo> {
        Err(CorrelationError::Unavailable(
            "process table is not supported on this platform".to_string(),
        ))
    }
}

/// The correlator backed by the host's own tables.
#[cfg(target_os = "linux")]
pub type SystemCorrelator = TableCorrelator<ProcfsConnections, ProcfsProcesses>;

#[cfg(not(target_os = "linux"))]
pub type SystemCorrelator = TableCorrelator<UnsupportedTables, UnsupportedTables>;

/// Build the correlator for the current platform.
pub fn system_correlator() -> SystemCorrelator {
    TableCorrelator::new(Default::default(), Default::default())
}
