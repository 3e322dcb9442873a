//! Per-port and aggregate scan results.

use crate::types::{PortRange, ProcessInfo};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Outcome of probing a single port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortResult {
    pub port: u16,
    pub open: bool,
    /// Set only for open ports whose owner was found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process: Option<ProcessInfo>,
}

impl PortResult {
    pub fn open(port: u16, process: Option<ProcessInfo>) -> Self {
        Self {
            port,
            open: true,
            process,
        }
    }

    pub fn closed(port: u16) -> Self {
        Self {
            port,
            open: false,
            process: None,
        }
    }
}

/// Complete result of one scan.
///
/// Built once by the engine and immutable afterwards. Every port of the
/// scanned range appears exactly once, either in `open_ports` or in
/// `closed_ports`.
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    range: PortRange,
    open_ports: BTreeMap<u16, Option<ProcessInfo>>,
    /// Completion order; not stable across runs.
    closed_ports: Vec<u16>,
    total_scanned: usize,
    started_at: DateTime<Utc>,
    duration_ms: u64,
}

impl ScanResult {
    pub fn range(&self) -> PortRange {
        self.range
    }

    /// Open ports and their owners, ordered by port.
    pub fn open_ports(&self) -> &BTreeMap<u16, Option<ProcessInfo>> {
        &self.open_ports
    }

    /// Closed ports in the order their probes finished.
    pub fn closed_ports(&self) -> &[u16] {
        &self.closed_ports
    }

    pub fn total_scanned(&self) -> usize {
        self.total_scanned
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn is_open(&self, port: u16) -> bool {
        self.open_ports.contains_key(&port)
    }

    /// Owner of an open port, if one was found.
    pub fn process_for(&self, port: u16) -> Option<&ProcessInfo> {
        self.open_ports.get(&port).and_then(Option::as_ref)
    }
}

/// Collects per-port results as they arrive, in any order.
#[derive(Debug)]
pub(crate) struct Aggregator {
    range: PortRange,
    open_ports: BTreeMap<u16, Option<ProcessInfo>>,
    closed_ports: Vec<u16>,
    started_at: DateTime<Utc>,
}

impl Aggregator {
    pub(crate) fn new(range: PortRange) -> Self {
        Self {
            range,
            open_ports: BTreeMap::new(),
            closed_ports: Vec::new(),
            started_at: Utc::now(),
        }
    }

    pub(crate) fn record(&mut self, result: PortResult) {
        debug_assert!(self.range.contains(result.port));
        if result.open {
            let previous = self.open_ports.insert(result.port, result.process);
            debug_assert!(previous.is_none(), "port {} recorded twice", result.port);
        } else {
            self.closed_ports.push(result.port);
        }
    }

    pub(crate) fn completed(&self) -> usize {
        self.open_ports.len() + self.closed_ports.len()
    }

    pub(crate) fn finish(self, elapsed: Duration) -> ScanResult {
        let total_scanned = self.range.len();
        debug_assert_eq!(self.completed(), total_scanned);

        ScanResult {
            range: self.range,
            open_ports: self.open_ports,
            closed_ports: self.closed_ports,
            total_scanned,
            started_at: self.started_at,
            duration_ms: elapsed.as_millis() as u64,
        }
    }
}
