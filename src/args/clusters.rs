use std::{path::PathBuf, time::Duration};

use clap::{Parser, Subcommand};

use crate::models::AutoScalingMode;

use super::{
    ListArgs, ProjectArgs, WatchArgs, parse_auto_scaling_mode, parse_duration, parse_key_value,
};

#[derive(Subcommand)]
pub enum Clusters {
    #[command(visible_alias = "ls")]
    List(List),
    Describe(Describe),
    Create(Create),
    Update(Update),
    #[command(visible_alias = "rm")]
    Delete(Delete),
    Watch(Watch),
    Pause(Pause),
    Start(Start),
    Upgrade(Upgrade),
    #[command(name = "autoScalingConfig")]
    AutoScalingConfig(AutoScalingConfig),
}

/// Return all clusters for your project.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct List {
    #[command(flatten)]
    pub project: ProjectArgs,

    #[command(flatten)]
    pub list: ListArgs,

    /// Tier of the clusters to return. Use FLEX to list flex clusters.
    #[arg(long)]
    pub tier: Option<String>,

    /// Auto scaling mode of the clusters to return: clusterWideScaling or independentShardScaling.
    #[arg(long, value_parser = parse_auto_scaling_mode)]
    pub auto_scaling_mode: Option<AutoScalingMode>,
}

/// Return the details for the specified cluster.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct Describe {
    /// Name of the cluster to retrieve.
    #[arg(index = 1)]
    pub name: String,

    #[command(flatten)]
    pub project: ProjectArgs,

    /// Shape used to describe the cluster: clusterWideScaling or independentShardScaling.
    #[arg(long, value_parser = parse_auto_scaling_mode)]
    pub auto_scaling_mode: Option<AutoScalingMode>,
}

/// Create a cluster for your project.
///
/// To get started quickly, specify a name for your cluster, a cloud provider, and a region to deploy a three-member replica set with the latest MongoDB server version.
/// For full control of your deployment, or to create multi-cloud clusters, provide a JSON or YAML configuration file with the --file flag.
///
/// Deprecation note: the M2 and M5 tiers are deprecated.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct Create {
    /// Name of the cluster. The cluster name cannot be changed after the cluster is created.
    #[arg(index = 1)]
    pub name: Option<String>,

    #[command(flatten)]
    pub project: ProjectArgs,

    /// Cloud service provider that applies to the provisioned cluster: AWS, AZURE or GCP.
    #[arg(long)]
    pub provider: Option<String>,

    /// Physical location of your MongoDB cluster.
    #[arg(long)]
    pub region: Option<String>,

    /// Tier for each data-bearing server in the cluster.
    #[arg(long, default_value = "FLEX")]
    pub tier: String,

    /// Number of electable nodes in the replica set.
    #[arg(long, short = 'm', default_value_t = 3)]
    pub members: u32,

    /// Number of physical shards in the cluster.
    #[arg(long, short = 's', default_value_t = 1)]
    pub shards: u32,

    /// Type of the cluster that you want to create: REPLICASET, SHARDED or GEOSHARDED.
    #[arg(long = "type", default_value = "REPLICASET")]
    pub cluster_type: String,

    /// Capacity, in gigabytes, of the host's root volume.
    #[arg(long = "diskSizeGB", default_value_t = 2.0)]
    pub disk_size_gb: f64,

    /// Major MongoDB version of the cluster.
    #[arg(long, default_value = "8.0")]
    pub mdb_version: String,

    /// Flag that indicates whether backups are enabled for the cluster.
    #[arg(long)]
    pub backup: bool,

    /// Flag that indicates whether BI Connector for Atlas is enabled on the cluster.
    #[arg(long)]
    pub bi_connector: bool,

    /// Flag that enables termination protection for your cluster.
    #[arg(long)]
    pub enable_termination_protection: bool,

    /// List that contains key-value pairs between 1 to 255 characters in length for tagging and categorizing the cluster.
    #[arg(long = "tag", value_parser = parse_key_value)]
    pub tags: Vec<(String, String)>,

    /// Auto scaling mode of the cluster: clusterWideScaling or independentShardScaling.
    #[arg(long, value_parser = parse_auto_scaling_mode)]
    pub auto_scaling_mode: Option<AutoScalingMode>,

    /// Path to an optional JSON or YAML configuration file that defines cluster settings.
    #[arg(
        long,
        short = 'f',
        conflicts_with_all = [
            "tier", "provider", "members", "region", "disk_size_gb",
            "mdb_version", "bi_connector", "cluster_type",
        ]
    )]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub watch: WatchArgs,
}

/// Modify the settings of the specified cluster.
///
/// You can't change the name of the cluster or downgrade the MongoDB version of your cluster.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct Update {
    /// Name of the cluster to update. Defaults to the name in the configuration file.
    #[arg(index = 1)]
    pub name: Option<String>,

    #[command(flatten)]
    pub project: ProjectArgs,

    /// Tier for each data-bearing server in the cluster.
    #[arg(long)]
    pub tier: Option<String>,

    /// Capacity, in gigabytes, of the host's root volume.
    #[arg(long = "diskSizeGB")]
    pub disk_size_gb: Option<f64>,

    /// Major MongoDB version of the cluster.
    #[arg(long)]
    pub mdb_version: Option<String>,

    /// Flag that enables termination protection for your cluster.
    #[arg(long, conflicts_with = "disable_termination_protection")]
    pub enable_termination_protection: bool,

    /// Flag that disables termination protection for your cluster.
    #[arg(long)]
    pub disable_termination_protection: bool,

    /// Tags to set on the cluster. Replaces the existing tags of dedicated clusters; `--tag =` removes them.
    #[arg(long = "tag", value_parser = parse_key_value)]
    pub tags: Vec<(String, String)>,

    /// Auto scaling mode of the cluster: clusterWideScaling or independentShardScaling.
    #[arg(long, value_parser = parse_auto_scaling_mode)]
    pub auto_scaling_mode: Option<AutoScalingMode>,

    /// Path to an optional JSON or YAML configuration file that defines cluster settings.
    #[arg(
        long,
        short = 'f',
        conflicts_with_all = [
            "tier", "disk_size_gb", "mdb_version",
            "enable_termination_protection", "disable_termination_protection",
        ]
    )]
    pub file: Option<PathBuf>,
}

/// Remove the specified cluster from your project.
///
/// The command prompts you to confirm the operation when you run the command without the --force option.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct Delete {
    /// Name of the cluster to delete.
    #[arg(index = 1)]
    pub name: String,

    #[command(flatten)]
    pub project: ProjectArgs,

    /// Flag that indicates whether to skip the confirmation prompt before proceeding with the requested action.
    #[arg(long)]
    pub force: bool,

    #[command(flatten)]
    pub watch: WatchArgs,
}

/// Watch the specified cluster in your project until it becomes available.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct Watch {
    /// Name of the cluster to watch.
    #[arg(index = 1)]
    pub name: String,

    #[command(flatten)]
    pub project: ProjectArgs,

    /// Time to wait for the cluster to become available, e.g. 90s or 10m. Waits indefinitely by default.
    #[arg(long, value_parser = parse_duration)]
    pub watch_timeout: Option<Duration>,
}

/// Pause the specified running MongoDB cluster.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct Pause {
    /// Name of the cluster to pause.
    #[arg(index = 1)]
    pub name: String,

    #[command(flatten)]
    pub project: ProjectArgs,

    #[command(flatten)]
    pub watch: WatchArgs,
}

/// Start the specified paused MongoDB cluster.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct Start {
    /// Name of the cluster to start.
    #[arg(index = 1)]
    pub name: String,

    #[command(flatten)]
    pub project: ProjectArgs,

    #[command(flatten)]
    pub watch: WatchArgs,
}

/// Upgrade a shared or flex cluster's tier, disk size, and/or MongoDB version.
///
/// This command is unavailable for dedicated clusters.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct Upgrade {
    /// Name of the cluster to upgrade.
    #[arg(index = 1)]
    pub name: String,

    #[command(flatten)]
    pub project: ProjectArgs,

    /// Tier to upgrade the cluster to.
    #[arg(long)]
    pub tier: Option<String>,

    /// Capacity, in gigabytes, of the host's root volume.
    #[arg(long = "diskSizeGB")]
    pub disk_size_gb: Option<f64>,

    /// Major MongoDB version of the cluster.
    #[arg(long)]
    pub mdb_version: Option<String>,

    /// Flag that enables termination protection for your cluster.
    #[arg(long, conflicts_with = "disable_termination_protection")]
    pub enable_termination_protection: bool,

    /// Flag that disables termination protection for your cluster.
    #[arg(long)]
    pub disable_termination_protection: bool,

    /// Tags to add to the upgraded cluster.
    #[arg(long = "tag", value_parser = parse_key_value)]
    pub tags: Vec<(String, String)>,

    #[command(flatten)]
    pub watch: WatchArgs,
}

/// Return the auto scaling mode of the specified cluster.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct AutoScalingConfig {
    /// Name of the cluster.
    #[arg(index = 1)]
    pub name: String,

    #[command(flatten)]
    pub project: ProjectArgs,
}
