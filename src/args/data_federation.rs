use clap::{Parser, Subcommand};

use super::ProjectArgs;

#[derive(Subcommand)]
pub enum DataFederation {
    #[command(visible_alias = "ls")]
    List(List),
    Describe(Describe),
    Create(Create),
    #[command(visible_alias = "rm")]
    Delete(Delete),
}

/// Return all federated database instances for your project.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct List {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Type of federated database instances to return: USER or ONLINE_ARCHIVE.
    #[arg(long = "type", value_parser = ["USER", "ONLINE_ARCHIVE"])]
    pub data_type: Option<String>,
}

/// Return the details for the specified federated database instance.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct Describe {
    /// Name of the federated database instance.
    #[arg(index = 1)]
    pub name: String,

    #[command(flatten)]
    pub project: ProjectArgs,
}

/// Create a federated database instance for your project.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct Create {
    /// Name of the federated database instance.
    #[arg(index = 1)]
    pub name: String,

    #[command(flatten)]
    pub project: ProjectArgs,

    /// Unique identifier of the AWS IAM role that the instance uses to access the data stores.
    #[arg(long)]
    pub aws_role_id: Option<String>,

    /// Name of an S3 bucket that Atlas uses to validate the provided role.
    #[arg(long = "awsTestS3Bucket")]
    pub aws_test_s3_bucket: Option<String>,

    /// AWS region to which the instance routes client connections.
    #[arg(long)]
    pub region: Option<String>,
}

/// Remove the specified federated database instance from your project.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct Delete {
    /// Name of the federated database instance.
    #[arg(index = 1)]
    pub name: String,

    #[command(flatten)]
    pub project: ProjectArgs,

    /// Flag that indicates whether to skip the confirmation prompt before proceeding with the requested action.
    #[arg(long)]
    pub force: bool,
}
