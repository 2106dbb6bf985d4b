use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::models::CloudProvider;

use super::{ProjectArgs, parse_duration};

#[derive(Subcommand)]
pub enum PrivateEndpoints {
    /// Manage AWS private endpoints.
    #[command(subcommand)]
    Aws(PrivateEndpointCommands),
    /// Manage Azure private endpoints.
    #[command(subcommand)]
    Azure(PrivateEndpointCommands),
    /// Manage GCP private endpoints.
    #[command(subcommand)]
    Gcp(PrivateEndpointCommands),
}

impl PrivateEndpoints {
    pub fn split(self) -> (CloudProvider, PrivateEndpointCommands) {
        match self {
            Self::Aws(command) => (CloudProvider::Aws, command),
            Self::Azure(command) => (CloudProvider::Azure, command),
            Self::Gcp(command) => (CloudProvider::Gcp, command),
        }
    }
}

#[derive(Subcommand)]
pub enum PrivateEndpointCommands {
    #[command(visible_alias = "ls")]
    List(List),
    Describe(Describe),
    Create(Create),
    #[command(visible_alias = "rm")]
    Delete(Delete),
    Watch(Watch),
}

/// Return all private endpoint services for your project.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct List {
    #[command(flatten)]
    pub project: ProjectArgs,
}

/// Return the details for the specified private endpoint service.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct Describe {
    /// Unique identifier of the private endpoint service.
    #[arg(index = 1)]
    pub id: String,

    #[command(flatten)]
    pub project: ProjectArgs,
}

/// Create a private endpoint service for your project.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct Create {
    /// Cloud provider region in which you want to create the private endpoint service.
    #[arg(long)]
    pub region: String,

    #[command(flatten)]
    pub project: ProjectArgs,
}

/// Remove the specified private endpoint service from your project.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct Delete {
    /// Unique identifier of the private endpoint service.
    #[arg(index = 1)]
    pub id: String,

    #[command(flatten)]
    pub project: ProjectArgs,

    /// Flag that indicates whether to skip the confirmation prompt before proceeding with the requested action.
    #[arg(long)]
    pub force: bool,
}

/// Watch the specified private endpoint service until it becomes available.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct Watch {
    /// Unique identifier of the private endpoint service.
    #[arg(index = 1)]
    pub id: String,

    #[command(flatten)]
    pub project: ProjectArgs,

    /// Time to wait for the endpoint service, e.g. 90s or 10m. Waits indefinitely by default.
    #[arg(long, value_parser = parse_duration)]
    pub watch_timeout: Option<Duration>,
}
