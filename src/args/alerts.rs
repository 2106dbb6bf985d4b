use clap::{Parser, Subcommand, ValueEnum};

use super::{ListArgs, ProjectArgs};

#[derive(Subcommand)]
pub enum Alerts {
    #[command(visible_alias = "ls")]
    List(List),
    Describe(Describe),
    #[command(visible_alias = "ack")]
    Acknowledge(Acknowledge),
    #[command(visible_alias = "unack")]
    Unacknowledge(Unacknowledge),
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
#[value(rename_all = "UPPER")]
pub enum AlertStatus {
    Open,
    Tracking,
    Closed,
}

impl AlertStatus {
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Tracking => "TRACKING",
            Self::Closed => "CLOSED",
        }
    }
}

/// Return all alerts for your project.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct List {
    #[command(flatten)]
    pub project: ProjectArgs,

    #[command(flatten)]
    pub list: ListArgs,

    /// Status of the alerts to return.
    #[arg(long, value_enum)]
    pub status: Option<AlertStatus>,
}

/// Return the details for the specified alert.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct Describe {
    /// Unique identifier of the alert.
    #[arg(index = 1)]
    pub alert_id: String,

    #[command(flatten)]
    pub project: ProjectArgs,
}

/// Acknowledge the specified alert.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct Acknowledge {
    /// Unique identifier of the alert.
    #[arg(index = 1)]
    pub alert_id: String,

    #[command(flatten)]
    pub project: ProjectArgs,

    /// ISO 8601-formatted time until which the alert is acknowledged.
    #[arg(long, required_unless_present = "forever", conflicts_with = "forever")]
    pub until: Option<String>,

    /// Acknowledge the alert until further notice.
    #[arg(long, short = 'F')]
    pub forever: bool,

    /// Description of the acknowledgement.
    #[arg(long)]
    pub comment: Option<String>,
}

/// Unacknowledge the specified alert.
#[derive(Parser, Debug, Clone)]
#[command(rename_all = "camelCase")]
pub struct Unacknowledge {
    /// Unique identifier of the alert.
    #[arg(index = 1)]
    pub alert_id: String,

    #[command(flatten)]
    pub project: ProjectArgs,

    /// Description of the unacknowledgement.
    #[arg(long)]
    pub comment: Option<String>,
}
