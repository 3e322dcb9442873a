//! Plain text output formatting.
//!
//! Produces a human-readable table with colors.

use super::{open_port_rows, PortKind};
use crate::scanner::{ScanConfig, ScanResult};
use crate::types::{PortRange, ProcessStatus};
use console::{style, Style};
use std::io::{self, Write};

const RULE: &str = "────────────────────────────────────────────────────────────────────────";

/// Write the open-port table followed by totals.
pub fn write_plain<W: Write>(out: &mut W, result: &ScanResult) -> io::Result<()> {
    let rows = open_port_rows(result);

    writeln!(out)?;
    if rows.is_empty() {
        writeln!(
            out,
            "  {}",
            style("No open ports found in the specified range.").yellow()
        )?;
    } else {
        writeln!(out, "  {}", style("Open Ports").cyan().bold())?;
        writeln!(out, "  {}", style(RULE).dim())?;
        writeln!(
            out,
            "  {:>6}  {:>8}  {:<20}  {:<12}  {:<14}  {}",
            style("PORT").bold(),
            style("PID").bold(),
            style("PROCESS").bold(),
            style("USER").bold(),
            style("STATUS").bold(),
            style("TYPE").bold()
        )?;
        writeln!(out, "  {}", style(RULE).dim())?;

        for row in &rows {
            let port_style = match row.kind {
                PortKind::System => Style::new().red().bold(),
                PortKind::User => Style::new().green().bold(),
            };
            let (pid, name, user, status) = match row.status {
                None => (
                    "unknown".to_string(),
                    "unknown".to_string(),
                    "unknown".to_string(),
                    "unknown".to_string(),
                ),
                Some(ProcessStatus::AccessDenied) => (
                    row.pid.map(|p| p.to_string()).unwrap_or_default(),
                    "access denied".to_string(),
                    "n/a".to_string(),
                    ProcessStatus::AccessDenied.to_string(),
                ),
                Some(status) => (
                    row.pid.map(|p| p.to_string()).unwrap_or_default(),
                    row.name.clone().unwrap_or_default(),
                    row.user.clone().unwrap_or_default(),
                    status.to_string(),
                ),
            };

            writeln!(
                out,
                "  {:>6}  {:>8}  {:<20}  {:<12}  {:<14}  {}",
                port_style.apply_to(row.port),
                pid,
                truncate_string(&name, 20),
                truncate_string(&user, 12),
                status,
                row.kind
            )?;
        }

        writeln!(out, "  {}", style(RULE).dim())?;
    }

    writeln!(out)?;
    writeln!(
        out,
        "  {} {}",
        style("Total open ports:").green(),
        result.open_ports().len()
    )?;
    writeln!(
        out,
        "  {} {}",
        style("Total closed ports:").yellow(),
        result.closed_ports().len()
    )?;
    writeln!(
        out,
        "  {} {} in {:.2}s",
        style("Total ports scanned:").blue(),
        result.total_scanned(),
        result.duration().as_secs_f64()
    )?;
    writeln!(out)?;

    Ok(())
}

/// Print a scan header before scanning begins.
pub fn print_scan_header(range: PortRange, config: &ScanConfig) {
    println!();
    println!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("portwarden").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(
        "{} Scanning ports {} on {}",
        style("•").dim(),
        style(range).white().bold(),
        style("127.0.0.1").white()
    );
    println!(
        "{} {} workers, {}ms timeout",
        style("•").dim(),
        config.concurrency(),
        config.timeout().as_millis()
    );
    println!();
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Print an info message.
pub fn print_info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

/// Truncate a string to a maximum number of characters, adding ellipsis if truncated.
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
