//! JSON output formatting.

use super::{open_port_rows, OpenPortRow};
use crate::scanner::ScanResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// The exported form of a scan.
#[derive(Debug, Clone, Serialize)]
pub struct ExportDocument {
    pub scan_time: DateTime<Utc>,
    pub duration_secs: f64,
    pub port_range: String,
    pub total_scanned: usize,
    pub open_count: usize,
    pub closed_count: usize,
    pub open_ports: Vec<OpenPortRow>,
}

impl ExportDocument {
    pub fn from_result(result: &ScanResult) -> Self {
        Self {
            scan_time: result.started_at(),
            duration_secs: result.duration().as_secs_f64(),
            port_range: result.range().to_string(),
            total_scanned: result.total_scanned(),
            open_count: result.open_ports().len(),
            closed_count: result.closed_ports().len(),
            open_ports: open_port_rows(result),
        }
    }
}

/// Write results as pretty-printed JSON.
pub fn write_json<W: Write>(out: &mut W, result: &ScanResult) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, &ExportDocument::from_result(result))?;
    writeln!(out)
}

/// Save results as JSON to `path`.
pub fn write_export_file(result: &ScanResult, path: &Path) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_json(&mut out, result)?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::fixtures::sample_result;

    #[test]
    fn test_export_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.json");

        write_export_file(&sample_result(), &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["port_range"], "1-10000");
        assert_eq!(value["total_scanned"], 10000);
        assert_eq!(value["open_count"], 3);
        assert_eq!(value["open_ports"][1]["port"], 8080);
        assert_eq!(value["open_ports"][1]["pid"], i32::MAX);
        assert_eq!(value["open_ports"][1]["kind"], "user");
        assert_eq!(value["open_ports"][0]["status"], "access_denied");
        assert!(value["open_ports"][2]["pid"].is_null());
    }
}
