use anyhow::Context;
use clap::Parser;
use portwarden::cli::Cli;
use portwarden::error::CliError;
use portwarden::output;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so JSON and CSV on stdout stay parseable.
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings_path = cli.config.clone();
    match cli.run().await {
        Err(e @ CliError::Config(_)) => Err(e).with_context(|| match settings_path {
            Some(path) => format!("could not use settings file {}", path.display()),
            None => "could not use the default settings file".to_string(),
        }),
        other => Ok(other?),
    }
}
