use clap::{Parser, Subcommand};

#[derive(Subcommand)]
pub enum Config {
    Init(Init),
    #[command(visible_alias = "ls")]
    List(List),
    Describe(Describe),
    Set(Set),
    #[command(visible_alias = "rm")]
    Delete(Delete),
    Rename(Rename),
}

/// Configure a profile to store access settings for your MongoDB deployment.
#[derive(Parser, Debug, Clone)]
pub struct Init {
    /// Configure the profile for MongoDB Atlas for Government.
    #[arg(long)]
    pub gov: bool,
}

/// Return a list of available profiles by name.
#[derive(Parser, Debug, Clone)]
pub struct List;

/// Return the settings of the specified profile. Secrets are redacted.
#[derive(Parser, Debug, Clone)]
pub struct Describe {
    /// Name of the profile.
    #[arg(index = 1)]
    pub name: String,
}

/// Configure specific properties of the current profile.
///
/// Available properties: service, public_api_key, private_api_key, client_id, client_secret,
/// access_token, ops_manager_url, org_id, project_id, output.
#[derive(Parser, Debug, Clone)]
pub struct Set {
    /// Property to set.
    #[arg(index = 1)]
    pub property: String,

    /// Value of the property. An empty value clears it.
    #[arg(index = 2)]
    pub value: String,
}

/// Delete the specified profile.
#[derive(Parser, Debug, Clone)]
pub struct Delete {
    /// Name of the profile.
    #[arg(index = 1)]
    pub name: String,

    /// Flag that indicates whether to skip the confirmation prompt before proceeding with the requested action.
    #[arg(long)]
    pub force: bool,
}

/// Rename a profile.
#[derive(Parser, Debug, Clone)]
pub struct Rename {
    /// Current name of the profile.
    #[arg(index = 1)]
    pub old_name: String,

    /// New name of the profile.
    #[arg(index = 2)]
    pub new_name: String,
}
