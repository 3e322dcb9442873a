//! Output formatting module.
//!
//! Provides formatters for plain text, JSON, and CSV output of scan results.
//! All of them render the same flattened [`OpenPortRow`]s, sorted by port.

mod csv_format;
mod json_format;
mod plain;

pub use csv_format::write_csv;
pub use json_format::{write_export_file, write_json, ExportDocument};
pub use plain::{
    print_error, print_info, print_scan_header, print_success, print_warning, write_plain,
};

use crate::scanner::ScanResult;
use crate::types::{Pid, Port, ProcessStatus};
use serde::Serialize;
use std::fmt;
use std::io;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Plain,
    /// JSON structured output
    Json,
    /// CSV format for data analysis
    Csv,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Plain
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plain" | "text" => Ok(Self::Plain),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(format!("unknown output format: {}", s)),
        }
    }
}

/// System ports (< 1024) versus everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PortKind {
    System,
    User,
}

impl PortKind {
    pub fn of(port: u16) -> Self {
        match Port::new(port) {
            Some(p) if !p.is_system() => Self::User,
            _ => Self::System,
        }
    }
}

impl fmt::Display for PortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => write!(f, "System"),
            Self::User => write!(f, "User"),
        }
    }
}

/// One open port, flattened for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenPortRow {
    pub port: u16,
    pub kind: PortKind,
    pub pid: Option<Pid>,
    pub name: Option<String>,
    pub user: Option<String>,
    pub status: Option<ProcessStatus>,
    pub command_line: Option<String>,
}

/// Rows for every open port, ordered by port.
pub fn open_port_rows(result: &ScanResult) -> Vec<OpenPortRow> {
    result
        .open_ports()
        .iter()
        .map(|(&port, process)| OpenPortRow {
            port,
            kind: PortKind::of(port),
            pid: process.as_ref().map(|p| p.pid),
            name: process.as_ref().and_then(|p| p.name.clone()),
            user: process.as_ref().and_then(|p| p.user.clone()),
            status: process.as_ref().map(|p| p.status),
            command_line: process.as_ref().and_then(|p| p.command_line.clone()),
        })
        .collect()
}

/// Format and print scan results to stdout.
pub fn print_results(result: &ScanResult, format: OutputFormat) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Plain => write_plain(&mut out, result),
        OutputFormat::Json => write_json(&mut out, result),
        OutputFormat::Csv => write_csv(&mut out, result),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_kind() {
        assert_eq!(PortKind::of(22), PortKind::System);
        assert_eq!(PortKind::of(1023), PortKind::System);
        assert_eq!(PortKind::of(1024), PortKind::User);
    }

    #[test]
    fn test_rows_sorted_by_port() {
        let rows = open_port_rows(&fixtures::sample_result());
        let ports: Vec<u16> = rows.iter().map(|r| r.port).collect();
        assert_eq!(ports, vec![22, 8080, 9000]);
        assert_eq!(rows[0].status, Some(ProcessStatus::AccessDenied));
        assert_eq!(rows[1].name.as_deref(), Some("node"));
        assert_eq!(rows[2].pid, None);
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("PLAIN".parse::<OutputFormat>().unwrap(), OutputFormat::Plain);
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
