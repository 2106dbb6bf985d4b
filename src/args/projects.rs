use clap::{Parser, Subcommand};

use super::ListArgs;

#[derive(Subcommand)]
pub enum Projects {
    #[command(visible_alias = "ls")]
    List(List),
    Describe(Describe),
    Create(Create),
    #[command(visible_alias = "rm")]
    Delete(Delete),
}

/// Return all projects you have access to.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct List {
    #[command(flatten)]
    pub list: ListArgs,
}

/// Return the details for the specified project.
#[derive(Parser, Debug, Clone)]
pub struct Describe {
    /// Unique 24-digit string that identifies the project.
    #[arg(index = 1)]
    pub id: String,
}

/// Create a project in your organization.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct Create {
    /// Label that identifies the project.
    #[arg(index = 1)]
    pub name: String,

    /// Organization ID to use. This option overrides the settings in the configuration file or environment variable.
    #[arg(long)]
    pub org_id: Option<String>,
}

/// Remove the specified project from your organization.
///
/// Projects that still contain clusters can't be deleted.
#[derive(Parser, Debug, Clone)]
pub struct Delete {
    /// Unique 24-digit string that identifies the project.
    #[arg(index = 1)]
    pub id: String,

    /// Flag that indicates whether to skip the confirmation prompt before proceeding with the requested action.
    #[arg(long)]
    pub force: bool,
}
