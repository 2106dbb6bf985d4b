//! Root command for the CLI.
//!
//! The commands are defined in the [`AtlasArgs`](super::AtlasArgs) enum.
use clap::{Args, Parser};

use crate::formatting::Format;

use super::AtlasArgs;

/// Manage MongoDB Atlas and Ops Manager from the command line.
#[derive(Parser)]
#[command(name = "atlas", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global_args: GlobalArgs,

    #[command(subcommand)]
    pub command: AtlasArgs,
}

#[derive(Args)]
#[command(rename_all = "camelCase")]
pub struct GlobalArgs {
    /// Enable debug logging.
    ///
    /// Setting this flag will set the log level to debug and only show logs from this crate.
    /// The level can also be set through the `ATLAS_LOG` environment variable; when
    /// `ATLAS_LOG_ALL` is set, logs from all crates are shown at that level.
    #[arg(global = true, hide = true, long, short = 'D', default_value = "false")]
    pub debug: bool,

    /// Output format: plaintext, json, go-template=<template> or go-template-file=<path>.
    #[arg(global = true, long = "output", short = 'o')]
    pub format: Option<Format>,

    /// Name of the profile to use from your configuration file.
    #[arg(global = true, long, short = 'P', env = "MONGODB_ATLAS_PROFILE")]
    pub profile: Option<String>,
}
