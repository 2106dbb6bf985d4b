//! Watching long running operations from commands.
use std::fmt::Display;

use serde::Serialize;
use tracing::debug;

use crate::{
    interaction::SpinnerInteraction,
    watchers::{WatchError, Watcher},
};

/// Run `watcher` while a spinner shows `message`.
pub async fn watch_with_spinner<I>(
    interaction: &I,
    message: &str,
    watcher: Watcher<'_>,
) -> Result<(), WatchError>
where
    I: SpinnerInteraction + ?Sized,
{
    // A spinner that fails to start must not fail the watch.
    let _spinner = interaction.start_spinner(message.to_string()).ok();
    let result = watcher.watch().await;
    debug!(ok = result.is_ok(), "watch finished");
    result
}

/// Outcome of the standalone watch commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WatchResult {
    ClusterAvailable { name: String },
    SnapshotCompleted { id: String },
    RestoreCompleted { id: String },
    PrivateEndpointAvailable { id: String },
}

impl Display for WatchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ClusterAvailable { .. } => write!(f, "Cluster available."),
            Self::SnapshotCompleted { .. } => write!(f, "Snapshot changes completed."),
            Self::RestoreCompleted { .. } => write!(f, "Restore completed."),
            Self::PrivateEndpointAvailable { .. } => {
                write!(f, "Private endpoint changes completed.")
            }
        }
    }
}
