//! Scan subcommand implementation.
//!
//! Handles `portwarden scan`, which is also what runs when no subcommand is
//! given.

use super::{Context, Shell};
use crate::error::{CliError, CliResult};
use crate::output::{self, OutputFormat};
use crate::scanner::{ScanEngine, ScanObserver, ScanSession};
use crate::types::{PortRange, PortSpec};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

/// Scan local ports and identify the processes behind them.
#[derive(Parser, Debug, Default)]
pub struct ScanCommand {
    /// Ports to scan (e.g., "80", "1-1000", "80,443,8080"). Defaults to all ports.
    ///
    /// A comma-separated list scans the whole span from its lowest to its
    /// highest port.
    #[arg(short, long, value_name = "SPEC", conflicts_with = "quick")]
    pub ports: Option<String>,

    /// Scan only the span of common service ports
    #[arg(short, long)]
    pub quick: bool,

    /// Connection timeout in milliseconds
    #[arg(short, long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Maximum number of concurrent probes
    #[arg(short, long, value_name = "N")]
    pub workers: Option<usize>,

    /// Output format for results
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Also save results as JSON to this file
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,

    /// Manage the found processes from a prompt after the scan
    #[arg(short, long)]
    pub interactive: bool,
}

impl ScanCommand {
    /// Execute the scan command.
    pub async fn execute(&self, ctx: &Context) -> CliResult<()> {
        let range = self.range()?;
        let config = ctx.settings.scan_config(self.timeout, self.workers)?;
        let format = self.format(ctx);
        let chatty = format == OutputFormat::Plain && !ctx.quiet;

        if chatty {
            output::print_scan_header(range, &config);
        }

        let engine = ScanEngine::new(config);
        let session = ScanSession::new();

        let progress = if chatty {
            let pb = ProgressBar::new(range.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                    .map_err(|e| CliError::Other(e.to_string()))?
                    .progress_chars("=>-"),
            );
            Some(pb)
        } else {
            None
        };

        let result = engine
            .scan_with_session(range, &session, progress.as_ref().map(|pb| pb as &dyn ScanObserver))
            .await?;

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        output::print_results(&result, format)?;

        if chatty {
            output::print_info(&format!(
                "Scan {} completed in {:.2}s",
                session.id().short(),
                result.duration().as_secs_f64()
            ));
        }

        if let Some(path) = &self.json {
            output::write_export_file(&result, path)?;
            if !ctx.quiet {
                output::print_success(&format!("Results saved to {}", path.display()));
            }
        }

        if self.interactive {
            if !is_root() {
                output::print_warning(
                    "Not running as root. Actions on other users' processes may fail.",
                );
            }
            let input = tokio::io::BufReader::new(tokio::io::stdin());
            let mut shell = Shell::new(
                engine,
                &session,
                range,
                result,
                ctx.settings.confirm_system_ports,
                input,
                std::io::stdout(),
            );
            shell.run().await?;
        }

        Ok(())
    }

    /// The range to scan: `--quick`, then `--ports`, then every port.
    fn range(&self) -> CliResult<PortRange> {
        if self.quick {
            return Ok(PortSpec::quick().span()?);
        }
        match &self.ports {
            Some(spec) => Ok(spec.parse::<PortSpec>()?.span()?),
            None => Ok(PortRange::full()),
        }
    }

    fn format(&self, ctx: &Context) -> OutputFormat {
        if let Some(format) = self.output {
            return format;
        }
        match ctx.settings.default_output_format.parse() {
            Ok(format) => format,
            Err(e) => {
                output::print_warning(&format!("{}, using plain", e));
                OutputFormat::Plain
            }
        }
    }
}

/// Check if running with root privileges.
fn is_root() -> bool {
    #[cfg(unix)]
    {
        unsafe { libc::geteuid() == 0 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}
