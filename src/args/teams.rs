use clap::{Args, Parser, Subcommand};

use super::ListArgs;

#[derive(Subcommand)]
pub enum Teams {
    #[command(visible_alias = "ls")]
    List(List),
    Describe(Describe),
    Create(Create),
    #[command(visible_alias = "rm")]
    Delete(Delete),
}

/// Organization selection shared by team commands.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
#[command(rename_all = "camelCase")]
pub struct OrgArgs {
    /// Organization ID to use. This option overrides the settings in the configuration file or environment variable.
    #[arg(long)]
    pub org_id: Option<String>,
}

/// Return all teams in your organization.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct List {
    #[command(flatten)]
    pub org: OrgArgs,

    #[command(flatten)]
    pub list: ListArgs,
}

/// Return the details for the specified team, by ID or by name.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct Describe {
    /// Unique identifier of the team.
    #[arg(long, required_unless_present = "name", conflicts_with = "name")]
    pub id: Option<String>,

    /// Name of the team.
    #[arg(long)]
    pub name: Option<String>,

    #[command(flatten)]
    pub org: OrgArgs,
}

/// Create a team in your organization.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct Create {
    /// Label that identifies the team.
    #[arg(index = 1)]
    pub name: String,

    /// Usernames of the team members.
    #[arg(long = "username", required = true, value_delimiter = ',')]
    pub usernames: Vec<String>,

    #[command(flatten)]
    pub org: OrgArgs,
}

/// Remove the specified team from your organization.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct Delete {
    /// Unique identifier of the team.
    #[arg(index = 1)]
    pub id: String,

    #[command(flatten)]
    pub org: OrgArgs,

    /// Flag that indicates whether to skip the confirmation prompt before proceeding with the requested action.
    #[arg(long)]
    pub force: bool,
}
