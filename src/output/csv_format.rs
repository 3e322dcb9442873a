//! CSV output formatting.

use super::open_port_rows;
use crate::scanner::ScanResult;
use std::io::{self, Write};

/// Write one CSV record per open port.
pub fn write_csv<W: Write>(out: &mut W, result: &ScanResult) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    wtr.write_record(["port", "type", "pid", "name", "user", "status", "command_line"])?;

    for row in open_port_rows(result) {
        let port = row.port.to_string();
        let kind = row.kind.to_string();
        let pid = row.pid.map_or(String::new(), |p| p.to_string());
        let status = row.status.map_or(String::new(), |s| s.to_string());
        wtr.write_record([
            port.as_str(),
            kind.as_str(),
            pid.as_str(),
            row.name.as_deref().unwrap_or(""),
            row.user.as_deref().unwrap_or(""),
            status.as_str(),
            row.command_line.as_deref().unwrap_or(""),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::fixtures::sample_result;

    #[test]
    fn test_csv_rows() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &sample_result()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "port,type,pid,name,user,status,command_line");
        assert_eq!(lines[1], "22,System,1,,,access denied,");
        assert_eq!(lines[2], "8080,User,2147483647,node,dev,sleeping,node server.js");
        assert_eq!(lines[3], "9000,User,,,,,");
        assert_eq!(lines.len(), 4);
    }
}
