use clap::{Parser, Subcommand};

use super::{ListArgs, ProjectArgs};

#[derive(Subcommand)]
pub enum DbUsers {
    #[command(visible_alias = "ls")]
    List(List),
    Describe(Describe),
    Create(Create),
    Update(Update),
    #[command(visible_alias = "rm")]
    Delete(Delete),
}

/// Return all database users for your project.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct List {
    #[command(flatten)]
    pub project: ProjectArgs,

    #[command(flatten)]
    pub list: ListArgs,
}

/// Return the details for the specified database user.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct Describe {
    /// Username of the database user.
    #[arg(index = 1)]
    pub username: String,

    #[command(flatten)]
    pub project: ProjectArgs,

    /// Authentication database of the user: admin or $external.
    #[arg(long = "authDB", default_value = "admin")]
    pub auth_db: String,
}

/// Create a database user for your project.
///
/// Without --x509Type, --awsIAMType, --ldapType or --oidcType the user authenticates with SCRAM-SHA and you are prompted for a password when --password is not set.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct Create {
    /// Username of the database user.
    #[arg(index = 1)]
    pub username: String,

    #[command(flatten)]
    pub project: ProjectArgs,

    /// Password of the database user.
    #[arg(long, short = 'p')]
    pub password: Option<String>,

    /// User's roles and the databases or collections on which the roles apply, e.g. readWrite@sales.orders.
    #[arg(long = "role", value_delimiter = ',')]
    pub roles: Vec<String>,

    /// Clusters or data lakes the user has access to, e.g. Cluster0 or myLake:DATA_LAKE.
    #[arg(long = "scope", value_delimiter = ',')]
    pub scopes: Vec<String>,

    /// Timestamp in ISO 8601 format after which Atlas deletes the user.
    #[arg(long)]
    pub delete_after: Option<String>,

    /// X.509 method used to authenticate the user: NONE, MANAGED or CUSTOMER.
    #[arg(long = "x509Type", value_parser = ["NONE", "MANAGED", "CUSTOMER"])]
    pub x509_type: Option<String>,

    /// AWS IAM method used to authenticate the user: NONE, USER or ROLE.
    #[arg(long = "awsIAMType", value_parser = ["NONE", "USER", "ROLE"])]
    pub aws_iam_type: Option<String>,

    /// LDAP method used to authenticate the user: NONE, USER or GROUP.
    #[arg(long, value_parser = ["NONE", "USER", "GROUP"])]
    pub ldap_type: Option<String>,

    /// OIDC method used to authenticate the user: NONE, USER or IDP_GROUP.
    #[arg(long, value_parser = ["NONE", "USER", "IDP_GROUP"])]
    pub oidc_type: Option<String>,
}

/// Modify the details of a database user in your project.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct Update {
    /// Current username of the database user.
    #[arg(index = 1)]
    pub current_username: String,

    #[command(flatten)]
    pub project: ProjectArgs,

    /// New username of the database user.
    #[arg(long, short = 'u')]
    pub username: Option<String>,

    /// New password of the database user.
    #[arg(long, short = 'p')]
    pub password: Option<String>,

    /// Authentication database of the user: admin or $external.
    #[arg(long = "authDB", value_parser = ["admin", "$external"])]
    pub auth_db: Option<String>,

    /// Roles to set on the user, replacing the current ones.
    #[arg(long = "role", value_delimiter = ',')]
    pub roles: Vec<String>,

    /// Scopes to set on the user, replacing the current ones.
    #[arg(long = "scope", value_delimiter = ',')]
    pub scopes: Vec<String>,

    /// X.509 method used to authenticate the user: NONE, MANAGED or CUSTOMER.
    #[arg(long = "x509Type", value_parser = ["NONE", "MANAGED", "CUSTOMER"])]
    pub x509_type: Option<String>,
}

/// Remove the specified database user from your project.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct Delete {
    /// Username of the database user.
    #[arg(index = 1)]
    pub username: String,

    #[command(flatten)]
    pub project: ProjectArgs,

    /// Authentication database of the user: admin or $external.
    #[arg(long = "authDB", default_value = "admin")]
    pub auth_db: String,

    /// Flag that indicates whether to skip the confirmation prompt before proceeding with the requested action.
    #[arg(long)]
    pub force: bool,
}
