use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

use super::{ListArgs, ProjectArgs, parse_duration};

#[derive(Subcommand)]
pub enum Backups {
    /// Manage cloud backup snapshots for your project.
    #[command(subcommand, visible_alias = "snapshot")]
    Snapshots(Snapshots),
    /// Manage cloud backup restore jobs for your project.
    #[command(subcommand, visible_alias = "restore")]
    Restores(Restores),
}

#[derive(Subcommand)]
pub enum Snapshots {
    #[command(visible_alias = "ls")]
    List(SnapshotList),
    Describe(SnapshotDescribe),
    Create(SnapshotCreate),
    #[command(visible_alias = "rm")]
    Delete(SnapshotDelete),
    Watch(SnapshotWatch),
}

#[derive(Subcommand)]
pub enum Restores {
    #[command(visible_alias = "ls")]
    List(RestoreList),
    Describe(RestoreDescribe),
    Start(RestoreStart),
    Watch(RestoreWatch),
}

/// Return all cloud backup snapshots for the specified cluster.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct SnapshotList {
    /// Name of the cluster.
    #[arg(long)]
    pub cluster_name: String,

    #[command(flatten)]
    pub project: ProjectArgs,

    #[command(flatten)]
    pub list: ListArgs,
}

/// Return the details for the specified snapshot.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct SnapshotDescribe {
    /// Unique identifier of the snapshot.
    #[arg(index = 1)]
    pub snapshot_id: String,

    /// Name of the cluster.
    #[arg(long)]
    pub cluster_name: String,

    #[command(flatten)]
    pub project: ProjectArgs,
}

/// Create a backup snapshot for the specified cluster.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct SnapshotCreate {
    /// Name of the cluster.
    #[arg(long)]
    pub cluster_name: String,

    #[command(flatten)]
    pub project: ProjectArgs,

    /// Description of the on-demand snapshot.
    #[arg(long = "desc")]
    pub description: Option<String>,

    /// Number of days that Atlas should retain the on-demand snapshot.
    #[arg(long = "retention", default_value_t = 1)]
    pub retention_in_days: u32,
}

/// Remove the specified backup snapshot.
///
/// The command prompts you to confirm the operation when you run the command without the --force option.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct SnapshotDelete {
    /// Unique identifier of the snapshot.
    #[arg(index = 1)]
    pub snapshot_id: String,

    /// Name of the cluster.
    #[arg(long)]
    pub cluster_name: String,

    #[command(flatten)]
    pub project: ProjectArgs,

    /// Flag that indicates whether to skip the confirmation prompt before proceeding with the requested action.
    #[arg(long)]
    pub force: bool,
}

/// Watch the specified snapshot in your project until it reaches a completed or failed status.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct SnapshotWatch {
    /// Unique identifier of the snapshot.
    #[arg(index = 1)]
    pub snapshot_id: String,

    /// Name of the cluster.
    #[arg(long)]
    pub cluster_name: String,

    #[command(flatten)]
    pub project: ProjectArgs,

    /// Time to wait for the snapshot, e.g. 90s or 10m. Waits indefinitely by default.
    #[arg(long, value_parser = parse_duration)]
    pub watch_timeout: Option<Duration>,
}

/// Return all cloud backup restore jobs for the specified cluster.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct RestoreList {
    /// Name of the cluster.
    #[arg(long)]
    pub cluster_name: String,

    #[command(flatten)]
    pub project: ProjectArgs,

    #[command(flatten)]
    pub list: ListArgs,
}

/// Describe a cloud backup restore job.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct RestoreDescribe {
    /// Unique identifier of the restore job.
    #[arg(index = 1)]
    pub restore_job_id: String,

    /// Name of the cluster.
    #[arg(long)]
    pub cluster_name: String,

    #[command(flatten)]
    pub project: ProjectArgs,
}

/// How a restore job delivers the snapshot.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
#[value(rename_all = "camelCase")]
pub enum RestoreMethod {
    Automated,
    Download,
    PointInTime,
}

impl RestoreMethod {
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Self::Automated => "automated",
            Self::Download => "download",
            Self::PointInTime => "pointInTime",
        }
    }
}

/// Start a restore job for your project and cluster.
///
/// If you create an automated or pointInTime restore job, Atlas removes all existing data on the target cluster prior to the restore.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct RestoreStart {
    /// Type of restore job to create: automated, download or pointInTime.
    #[arg(index = 1, value_enum)]
    pub method: RestoreMethod,

    /// Name of the cluster that contains the snapshot to restore.
    #[arg(long)]
    pub cluster_name: String,

    #[command(flatten)]
    pub project: ProjectArgs,

    /// Unique identifier of the snapshot to restore.
    #[arg(long)]
    pub snapshot_id: Option<String>,

    /// Unique identifier of the project that contains the destination cluster.
    #[arg(long)]
    pub target_project_id: Option<String>,

    /// Name of the destination cluster.
    #[arg(long)]
    pub target_cluster_name: Option<String>,

    /// Timestamp in seconds since epoch to restore to.
    #[arg(long = "pointInTimeUTCSeconds")]
    pub point_in_time_utc_seconds: Option<i64>,

    /// Oplog timestamp given as a timestamp in seconds since epoch. Requires --oplogInc.
    #[arg(long, requires = "oplog_inc")]
    pub oplog_ts: Option<i64>,

    /// 32-bit incrementing ordinal that represents operations within a given second. Requires --oplogTs.
    #[arg(long, requires = "oplog_ts")]
    pub oplog_inc: Option<i64>,
}

/// Watch for a restore job to complete.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct RestoreWatch {
    /// Unique identifier of the restore job.
    #[arg(index = 1)]
    pub restore_job_id: String,

    /// Name of the cluster.
    #[arg(long)]
    pub cluster_name: String,

    #[command(flatten)]
    pub project: ProjectArgs,

    /// Time to wait for the restore job, e.g. 90s or 10m. Waits indefinitely by default.
    #[arg(long, value_parser = parse_duration)]
    pub watch_timeout: Option<Duration>,
}
