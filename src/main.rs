// Entrypoint for the `be` binary.
// - Keeps `main` small: parse arguments, resolve configuration once and
//   hand both to the UI layer.
// - Any error ends the process with a non-zero exit code.

use anyhow::Context;
use be_cli::config::Config;
use be_cli::ui::{self, Cli};
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so stdout only carries the command's report.
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match try_main(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn try_main(cli: Cli) -> anyhow::Result<()> {
    let config = Config::resolve(cli.api_url.clone(), cli.config.as_deref())
        .context("failed to load config")?;
    ui::run(cli, &config)?;
    Ok(())
}
