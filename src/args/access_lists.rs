use clap::{Parser, Subcommand};

use crate::models::AccessListEntryType;

use super::{ListArgs, ProjectArgs};

#[derive(Subcommand)]
pub enum AccessLists {
    #[command(visible_alias = "ls")]
    List(List),
    Describe(Describe),
    Create(Create),
    #[command(visible_alias = "rm")]
    Delete(Delete),
}

/// Return all IP access list entries for your project.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct List {
    #[command(flatten)]
    pub project: ProjectArgs,

    #[command(flatten)]
    pub list: ListArgs,
}

/// Return the details for the specified IP access list entry.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct Describe {
    /// IP address, CIDR block or AWS security group of the entry.
    #[arg(index = 1)]
    pub entry: String,

    #[command(flatten)]
    pub project: ProjectArgs,
}

/// Create an IP access list entry for your project.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct Create {
    /// IP address, CIDR block or AWS security group to allow.
    #[arg(index = 1)]
    pub entry: String,

    #[command(flatten)]
    pub project: ProjectArgs,

    /// Type of access list entry: ipAddress, cidrBlock or awsSecurityGroup.
    #[arg(long = "type", default_value = "ipAddress", value_parser = parse_entry_type)]
    pub entry_type: AccessListEntryType,

    /// Optional description of the entry.
    #[arg(long)]
    pub comment: Option<String>,

    /// ISO 8601-formatted date and time after which Atlas removes the entry.
    #[arg(long)]
    pub delete_after: Option<String>,
}

fn parse_entry_type(value: &str) -> Result<AccessListEntryType, String> {
    value.parse()
}

/// Remove the specified IP access list entry from your project.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct Delete {
    /// IP address, CIDR block or AWS security group of the entry.
    #[arg(index = 1)]
    pub entry: String,

    #[command(flatten)]
    pub project: ProjectArgs,

    /// Flag that indicates whether to skip the confirmation prompt before proceeding with the requested action.
    #[arg(long)]
    pub force: bool,
}
