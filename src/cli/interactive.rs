//! Interactive prompt for managing the processes found by a scan.
//!
//! Commands: `list`, `resume` (or `start`), `pause`, `kill`, `refresh`,
//! `exit` (or `quit`).

use crate::error::CliResult;
use crate::output::write_plain;
use crate::process::{self, ActionOutcome};
use crate::scanner::{ScanEngine, ScanResult, ScanSession};
use crate::types::{Pid, Port, PortRange};
use console::style;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

const HELP: &str = "Available commands: list, resume, pause, kill, refresh, exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Resume,
    Pause,
    Kill,
}

/// A prompt loop over the latest scan result.
pub struct Shell<'a, R, W> {
    engine: ScanEngine,
    session: &'a ScanSession,
    range: PortRange,
    result: Arc<ScanResult>,
    confirm_system_ports: bool,
    input: R,
    out: W,
}

impl<'a, R, W> Shell<'a, R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(
        engine: ScanEngine,
        session: &'a ScanSession,
        range: PortRange,
        result: Arc<ScanResult>,
        confirm_system_ports: bool,
        input: R,
        out: W,
    ) -> Self {
        Self {
            engine,
            session,
            range,
            result,
            confirm_system_ports,
            input,
            out,
        }
    }

    /// Read commands until `exit` or end of input.
    pub async fn run(&mut self) -> CliResult<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{}", HELP)?;

        loop {
            let Some(line) = self.prompt("portwarden> ").await? else {
                break;
            };

            match line.to_lowercase().as_str() {
                "" => {}
                "list" | "ls" => write_plain(&mut self.out, &self.result)?,
                "resume" | "start" => self.act(Action::Resume).await?,
                "pause" => self.act(Action::Pause).await?,
                "kill" => self.act(Action::Kill).await?,
                "refresh" => self.refresh().await?,
                "exit" | "quit" | "q" => break,
                "help" | "?" => writeln!(self.out, "{}", HELP)?,
                other => writeln!(self.out, "Unknown command: {}. {}", other, HELP)?,
            }
        }

        Ok(())
    }

    /// Write `text` and read one trimmed line. `None` at end of input.
    async fn prompt(&mut self, text: &str) -> CliResult<Option<String>> {
        write!(self.out, "{}", text)?;
        self.out.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    async fn confirm(&mut self, text: &str) -> CliResult<bool> {
        let answer = self.prompt(text).await?.unwrap_or_default();
        Ok(matches!(answer.to_lowercase().as_str(), "yes" | "y"))
    }

    /// Ask for a port and resolve it to the pid that owns it.
    async fn pick_process(&mut self) -> CliResult<Option<(Port, Pid)>> {
        let Some(answer) = self.prompt("Enter port number: ").await? else {
            return Ok(None);
        };

        let Some(port) = answer.parse::<u16>().ok().and_then(Port::new) else {
            writeln!(self.out, "{}", style("Invalid port number.").red())?;
            return Ok(None);
        };

        if !self.result.is_open(port.as_u16()) {
            writeln!(
                self.out,
                "{}",
                style(format!("Port {} is not open or no process found.", port)).red()
            )?;
            return Ok(None);
        }

        match self.result.process_for(port.as_u16()) {
            Some(info) => Ok(Some((port, info.pid))),
            None => {
                writeln!(
                    self.out,
                    "{}",
                    style(format!(
                        "No process information available for port {}.",
                        port
                    ))
                    .red()
                )?;
                Ok(None)
            }
        }
    }

    async fn act(&mut self, action: Action) -> CliResult<()> {
        let Some((port, pid)) = self.pick_process().await? else {
            return Ok(());
        };

        if port.is_system() && self.confirm_system_ports {
            writeln!(
                self.out,
                "{}",
                style(format!(
                    "Warning: port {} is a system port. Acting on its process may affect system stability.",
                    port
                ))
                .yellow()
            )?;
            if !self.confirm("Are you sure? (yes/no): ").await? {
                writeln!(self.out, "Cancelled.")?;
                return Ok(());
            }
        }

        let outcome = match action {
            Action::Resume => process::resume(pid),
            Action::Pause => process::pause(pid),
            Action::Kill => {
                let force = self.confirm("Force kill? (yes/no): ").await?;
                process::terminate(pid, force)
            }
        };

        self.report(&outcome)
    }

    fn report(&mut self, outcome: &ActionOutcome) -> CliResult<()> {
        if outcome.success {
            writeln!(self.out, "{}", style(&outcome.message).green())?;
        } else {
            writeln!(self.out, "{}", style(&outcome.message).red())?;
        }
        Ok(())
    }

    async fn refresh(&mut self) -> CliResult<()> {
        writeln!(self.out, "Rescanning {}...", self.range)?;
        self.result = self
            .engine
            .scan_with_session(self.range, self.session, None)
            .await?;
        write_plain(&mut self.out, &self.result)?;
        Ok(())
    }
}
