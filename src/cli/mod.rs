//! CLI subcommand definitions and handlers.
//!
//! - `portwarden scan` - Scan local ports (the default when no subcommand is given)
//! - `portwarden resume|pause|kill <pid>` - Lifecycle actions on a process
//! - `portwarden config` - Show or initialize settings

mod action;
mod interactive;
mod scan;

pub use action::ActionCommand;
pub use interactive::Shell;
pub use scan::ScanCommand;

use crate::config::{AppSettings, Paths};
use crate::error::CliResult;
use crate::output;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// portwarden - find what listens on your local ports, and control it.
///
/// Scans TCP ports on 127.0.0.1, shows which process owns each open port,
/// and can pause, resume or kill those processes.
#[derive(Parser, Debug)]
#[command(name = "portwarden")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Scan local ports and manage the processes behind them", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Path to custom settings file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan local ports and identify their processes
    #[command(alias = "s")]
    Scan(ScanCommand),

    /// Resume a paused process
    #[command(alias = "start")]
    Resume(ActionCommand),

    /// Pause a running process
    Pause(ActionCommand),

    /// Terminate a process
    Kill {
        #[command(flatten)]
        target: ActionCommand,

        /// Kill unconditionally instead of asking the process to exit
        #[arg(short, long)]
        force: bool,
    },

    /// Show or initialize the settings file
    Config(ConfigCommand),
}

/// Options shared by every subcommand.
#[derive(Debug, Clone)]
pub struct Context {
    pub settings: AppSettings,
    pub verbose: bool,
    pub quiet: bool,
}

impl Cli {
    /// Load settings and dispatch to the selected subcommand.
    pub async fn run(self) -> CliResult<()> {
        let settings = match &self.config {
            Some(path) => AppSettings::load_from(path)?,
            None => AppSettings::load()?,
        };
        let ctx = Context {
            settings,
            verbose: self.verbose,
            quiet: self.quiet,
        };

        match self.command {
            None => ScanCommand::default().execute(&ctx).await,
            Some(Commands::Scan(cmd)) => cmd.execute(&ctx).await,
            Some(Commands::Resume(cmd)) => cmd.resume(),
            Some(Commands::Pause(cmd)) => cmd.pause(),
            Some(Commands::Kill { target, force }) => target.kill(force),
            Some(Commands::Config(cmd)) => cmd.execute(&ctx, self.config),
        }
    }
}

/// Show or initialize the settings file.
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    /// Write the current settings to the settings file
    #[arg(long)]
    pub init: bool,
}

impl ConfigCommand {
    pub fn execute(&self, ctx: &Context, path: Option<PathBuf>) -> CliResult<()> {
        let path = match path {
            Some(path) => path,
            None => Paths::resolve()?.settings_file(),
        };

        if self.init {
            ctx.settings.save_to(&path)?;
            output::print_success(&format!("Settings written to {}", path.display()));
            return Ok(());
        }

        if !ctx.quiet {
            output::print_info(&format!("Settings file: {}", path.display()));
        }
        let json = serde_json::to_string_pretty(&ctx.settings)
            .map_err(|e| crate::error::CliError::Other(e.to_string()))?;
        println!("{}", json);
        Ok(())
    }
}
