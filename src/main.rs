use anyhow::{Context, Result};
use args::Cli;
use clap::Parser;
use config::{ConfigStore, DEFAULT_PROFILE};
use tracing::debug;

mod args;
mod client;
mod commands;
mod config;
mod dependencies;
mod file;
mod formatting;
mod interaction;
mod logging;
mod models;
mod table;
mod template;
mod watchers;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::setup_logging(cli.global_args.debug);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let store = ConfigStore::load().context("loading configuration")?;
    let profile_name = cli
        .global_args
        .profile
        .unwrap_or_else(|| DEFAULT_PROFILE.to_string());
    debug!(profile = %profile_name, config = %store.path().display(), "starting");

    // The --output flag wins over the profile's default output.
    let format = match cli.global_args.format {
        Some(format) => format,
        None => store.profile(&profile_name)?.output_format(),
    };

    let mut command = commands::command_from_args(cli.command, format, store, profile_name)?;
    command.execute().await
}
