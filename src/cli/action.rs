//! One-shot lifecycle actions: `resume`, `pause` and `kill`.

use crate::error::{CliError, CliResult};
use crate::output;
use crate::process::{self, ActionOutcome};
use crate::types::Pid;
use clap::Args;

/// Target of a lifecycle action.
#[derive(Args, Debug, Clone)]
pub struct ActionCommand {
    /// Process id
    #[arg(value_name = "PID", allow_negative_numbers = true)]
    pub pid: i32,
}

impl ActionCommand {
    pub fn resume(&self) -> CliResult<()> {
        report(process::resume(Pid::new(self.pid)))
    }

    pub fn pause(&self) -> CliResult<()> {
        report(process::pause(Pid::new(self.pid)))
    }

    pub fn kill(&self, force: bool) -> CliResult<()> {
        report(process::terminate(Pid::new(self.pid), force))
    }
}

/// Print a successful outcome, turn a failed one into an error exit.
fn report(outcome: ActionOutcome) -> CliResult<()> {
    if outcome.success {
        output::print_success(&outcome.message);
        Ok(())
    } else {
        Err(CliError::ActionFailed(outcome.message))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_missing_process_fails() {
        let cmd = ActionCommand { pid: i32::MAX };
        let err = cmd.kill(true).unwrap_err();
        assert!(matches!(err, CliError::ActionFailed(ref msg) if msg.contains("no such process")));
    }

    #[test]
    fn test_group_pid_rejected() {
        let cmd = ActionCommand { pid: -1 };
        assert!(cmd.pause().is_err());
    }
}
