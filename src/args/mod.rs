//! CLI argument parsing layer.
//!
//! This module provides the CLI interface using clap derive macros.
//! It handles parsing command-line arguments and converting them into structured data types.
//!
//! The business logic layer is [`crate::commands`], which receives these parsed arguments.
use std::time::Duration;

use clap::{Args, Subcommand};

use crate::{client::ListOptions, models::AutoScalingMode, watchers::WatchOptions};

pub mod access_lists;
pub mod alerts;
pub mod backups;
mod cli;
pub mod clusters;
pub mod config;
pub mod data_federation;
pub mod dbusers;
pub mod private_endpoints;
pub mod projects;
pub mod teams;

pub use cli::Cli;

/// Root command enum.
#[derive(Subcommand)]
pub enum AtlasArgs {
    /// Manage the profiles of your configuration file.
    #[command(subcommand)]
    Config(config::Config),
    /// Manage your projects.
    #[command(subcommand, visible_alias = "project")]
    Projects(projects::Projects),
    /// Manage clusters for your project.
    #[command(subcommand, visible_alias = "cluster")]
    Clusters(clusters::Clusters),
    /// Manage cloud backups for your project.
    #[command(subcommand, visible_alias = "backup")]
    Backups(backups::Backups),
    /// Manage alerts for your project.
    #[command(subcommand, visible_alias = "alert")]
    Alerts(alerts::Alerts),
    /// Manage database users for your project.
    #[command(subcommand, name = "dbusers", visible_alias = "dbuser")]
    DbUsers(dbusers::DbUsers),
    /// Manage the IP access list for your project.
    #[command(subcommand, name = "accessLists", visible_alias = "accessList")]
    AccessLists(access_lists::AccessLists),
    /// Manage private endpoints.
    #[command(subcommand, name = "privateEndpoints", visible_alias = "privateEndpoint")]
    PrivateEndpoints(private_endpoints::PrivateEndpoints),
    /// Manage the teams of your organization.
    #[command(subcommand, visible_alias = "team")]
    Teams(teams::Teams),
    /// Manage data federation for your project.
    #[command(subcommand, name = "dataFederation")]
    DataFederation(data_federation::DataFederation),
}

/// Project selection shared by project scoped commands.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
#[command(rename_all = "camelCase")]
pub struct ProjectArgs {
    /// Hexadecimal string that identifies the project to use. This option overrides the settings in the configuration file or environment variable.
    #[arg(long)]
    pub project_id: Option<String>,
}

/// Paging flags of list commands.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
#[command(rename_all = "camelCase")]
pub struct ListArgs {
    /// Page number that specifies a page of results.
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Number of items per results page, up to a maximum of 500.
    #[arg(long, default_value_t = 100)]
    pub limit: u32,

    /// Flag that indicates whether the JSON response returns the total number of items (totalCount) in the JSON response.
    #[arg(long)]
    pub omit_count: bool,
}

impl Default for ListArgs {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 100,
            omit_count: false,
        }
    }
}

impl From<&ListArgs> for ListOptions {
    fn from(args: &ListArgs) -> Self {
        Self {
            page_num: Some(args.page),
            items_per_page: Some(args.limit),
            include_count: Some(!args.omit_count),
        }
    }
}

/// Watch flags of commands that start a long running operation.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
#[command(rename_all = "camelCase")]
pub struct WatchArgs {
    /// Flag that indicates whether to watch the command until it completes its execution or the watch times out.
    #[arg(long, short = 'w')]
    pub watch: bool,

    /// Time to wait for the watch to complete, e.g. 90s or 10m. Waits indefinitely by default.
    #[arg(long, value_parser = parse_duration, requires = "watch")]
    pub watch_timeout: Option<Duration>,
}

impl WatchArgs {
    /// Watch options when `--watch` is set.
    pub fn options(&self) -> Option<WatchOptions> {
        self.watch
            .then(|| WatchOptions::with_timeout(self.watch_timeout))
    }
}

pub fn parse_duration(value: &str) -> Result<Duration, String> {
    duration_str::parse(value).map_err(|e| e.to_string())
}

pub fn parse_key_value(value: &str) -> Result<(String, String), String> {
    value
        .split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("invalid key=value pair: '{value}'"))
}

pub fn parse_auto_scaling_mode(value: &str) -> Result<AutoScalingMode, String> {
    value.parse()
}
