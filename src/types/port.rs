//! Port types with validation and parsing.
//!
//! The `Port` newtype ensures values are always valid port numbers (1-65535).
//! `PortRange` is the unit of work for a scan; `PortSpec` parses the textual
//! forms accepted on the command line.

use crate::error::{EngineResult, ScanError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A validated network port number (1-65535).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Port(u16);

impl Port {
    /// Minimum valid port number.
    pub const MIN: u16 = 1;
    /// Maximum valid port number.
    pub const MAX: u16 = 65535;

    /// Create a new Port from a u16, returning None if invalid.
    #[inline]
    pub const fn new(port: u16) -> Option<Self> {
        if port >= Self::MIN {
            Some(Self(port))
        } else {
            None
        }
    }

    /// Get the raw port number.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// System ports (< 1024) are usually owned by system services.
    #[inline]
    pub const fn is_system(self) -> bool {
        self.0 < 1024
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for Port {
    type Error = PortError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(PortError::OutOfRange(value.into()))
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

/// Error type for port specification parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("port {0} is out of valid range (1-65535)")]
    OutOfRange(u32),
    #[error("invalid port number: {0}")]
    InvalidFormat(String),
    #[error("invalid port range: start ({0}) > end ({1})")]
    InvalidRange(u16, u16),
    #[error("empty port specification")]
    Empty,
}

/// An inclusive range of ports, `1 <= start <= end <= 65535`.
///
/// Immutable once built; every scan covers exactly one range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRange")]
pub struct PortRange {
    start: Port,
    end: Port,
}

/// Unchecked wire form of a [`PortRange`]; deserialization goes through
/// [`PortRange::new`].
#[derive(Deserialize)]
struct RawRange {
    start: u16,
    end: u16,
}

impl TryFrom<RawRange> for PortRange {
    type Error = ScanError;

    fn try_from(raw: RawRange) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl PortRange {
    /// Validate and build a range. Fails with [`ScanError::InvalidRange`].
    pub fn new(start: u16, end: u16) -> EngineResult<Self> {
        match (Port::new(start), Port::new(end)) {
            (Some(s), Some(e)) if start <= end => Ok(Self { start: s, end: e }),
            _ => Err(ScanError::InvalidRange {
                start: start.into(),
                end: end.into(),
            }),
        }
    }

    /// Create a range containing a single port.
    pub const fn single(port: Port) -> Self {
        Self {
            start: port,
            end: port,
        }
    }

    /// Every valid port.
    pub const fn full() -> Self {
        Self {
            start: Port(Port::MIN),
            end: Port(Port::MAX),
        }
    }

    pub const fn start(&self) -> u16 {
        self.start.0
    }

    pub const fn end(&self) -> u16 {
        self.end.0
    }

    /// Number of ports in this range, `end - start + 1`.
    pub const fn len(&self) -> usize {
        (self.end.0 - self.start.0) as usize + 1
    }

    /// A valid range always holds at least one port.
    pub const fn is_empty(&self) -> bool {
        false
    }

    pub const fn contains(&self, port: u16) -> bool {
        port >= self.start.0 && port <= self.end.0
    }

    /// Iterate over all ports in this range.
    pub fn iter(&self) -> impl Iterator<Item = u16> {
        self.start.0..=self.end.0
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// A textual port specification.
///
/// Supports formats like:
/// - Single port: "80"
/// - Range: "1-1000"
/// - Comma-separated: "80,443,8080"
///
/// A scan always covers one contiguous range, so a specification is reduced
/// to its [`span`](PortSpec::span): the smallest range holding every port
/// it names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortSpec {
    ranges: Vec<PortRange>,
}

/// Well-known service ports covered by `--quick`.
pub const COMMON_PORTS: [u16; 22] = [
    21, 22, 23, 25, 53, 80, 110, 111, 135, 139, 143, 443, 445, 993, 995, 1723, 3306, 3389, 5900,
    8080, 8443, 8888,
];

impl PortSpec {
    /// Create an empty port specification.
    pub const fn new() -> Self {
        Self { ranges: Vec::new() }
    }

    pub fn add_range(&mut self, range: PortRange) {
        self.ranges.push(range);
    }

    pub fn add_port(&mut self, port: Port) {
        self.ranges.push(PortRange::single(port));
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// The smallest range covering every port in the specification.
    pub fn span(&self) -> Result<PortRange, PortError> {
        let start = self.ranges.iter().map(|r| r.start).min();
        let end = self.ranges.iter().map(|r| r.end).max();
        match (start, end) {
            (Some(start), Some(end)) => Ok(PortRange { start, end }),
            _ => Err(PortError::Empty),
        }
    }

    /// The common service ports.
    pub fn quick() -> Self {
        let mut spec = Self::new();
        for port in COMMON_PORTS.iter().filter_map(|&p| Port::new(p)) {
            spec.add_port(port);
        }
        spec
    }
}

fn parse_port(s: &str) -> Result<Port, PortError> {
    let s = s.trim();
    let value: u32 = s
        .parse()
        .map_err(|_| PortError::InvalidFormat(s.to_string()))?;
    u16::try_from(value)
        .ok()
        .and_then(Port::new)
        .ok_or(PortError::OutOfRange(value))
}

impl FromStr for PortSpec {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PortError::Empty);
        }

        let mut spec = Self::new();

        for part in s.split(',') {
            let part = part.trim();
            if let Some((start, end)) = part.split_once('-') {
                let start = parse_port(start)?;
                let end = parse_port(end)?;
                if start > end {
                    return Err(PortError::InvalidRange(start.0, end.0));
                }
                spec.add_range(PortRange { start, end });
            } else {
                spec.add_port(parse_port(part)?);
            }
        }

        Ok(spec)
    }
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.ranges.iter().map(|r| r.to_string()).collect();
        write!(f, "{}", parts.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_validation() {
        assert!(Port::new(0).is_none());
        assert!(Port::new(1).is_some());
        assert!(Port::new(65535).is_some());
        assert!(Port::new(80).unwrap().is_system());
        assert!(!Port::new(8080).unwrap().is_system());
    }

    #[test]
    fn test_port_range_bounds() {
        assert_eq!(PortRange::new(1, 1).unwrap().len(), 1);
        assert_eq!(PortRange::new(65535, 65535).unwrap().len(), 1);
        assert_eq!(PortRange::full().len(), 65535);
        assert_eq!(
            PortRange::new(0, 10),
            Err(ScanError::InvalidRange { start: 0, end: 10 })
        );
        assert_eq!(
            PortRange::new(5, 2),
            Err(ScanError::InvalidRange { start: 5, end: 2 })
        );
    }

    #[test]
    fn test_deserialize_validates() {
        assert!(serde_json::from_str::<PortRange>(r#"{"start":5,"end":2}"#).is_err());
        assert!(serde_json::from_str::<PortRange>(r#"{"start":0,"end":3}"#).is_err());
        assert!(serde_json::from_str::<Port>("0").is_err());

        let range: PortRange = serde_json::from_str(r#"{"start":80,"end":90}"#).unwrap();
        assert_eq!(range, PortRange::new(80, 90).unwrap());
        assert_eq!(range.len(), 11);
        assert_eq!(serde_json::to_string(&range).unwrap(), r#"{"start":80,"end":90}"#);
    }

    #[test]
    fn test_port_range_iter() {
        let range = PortRange::new(100, 104).unwrap();
        assert_eq!(range.iter().collect::<Vec<_>>(), vec![100, 101, 102, 103, 104]);
        assert!(range.contains(100));
        assert!(!range.contains(105));
        assert_eq!(range.to_string(), "100-104");
    }

    #[test]
    fn test_port_spec_span() {
        let spec: PortSpec = "80".parse().unwrap();
        assert_eq!(spec.span().unwrap(), PortRange::new(80, 80).unwrap());

        let spec: PortSpec = "80-8080".parse().unwrap();
        assert_eq!(spec.span().unwrap(), PortRange::new(80, 8080).unwrap());

        let spec: PortSpec = "443,80,8080".parse().unwrap();
        assert_eq!(spec.span().unwrap(), PortRange::new(80, 8080).unwrap());
    }

    #[test]
    fn test_port_spec_errors() {
        assert_eq!("".parse::<PortSpec>(), Err(PortError::Empty));
        assert_eq!("0".parse::<PortSpec>(), Err(PortError::OutOfRange(0)));
        assert_eq!("70000".parse::<PortSpec>(), Err(PortError::OutOfRange(70000)));
        assert_eq!("100-50".parse::<PortSpec>(), Err(PortError::InvalidRange(100, 50)));
        assert!(matches!("abc".parse::<PortSpec>(), Err(PortError::InvalidFormat(_))));
    }

    #[test]
    fn test_quick_span() {
        let range = PortSpec::quick().span().unwrap();
        assert_eq!((range.start(), range.end()), (21, 8888));
    }
}
