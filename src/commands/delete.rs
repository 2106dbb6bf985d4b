//! Shared pieces of the delete commands: the confirmation step and the outcome.
use std::fmt::Display;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::interaction::{
    ConfirmationPrompt, ConfirmationPromptOptions, ConfirmationPromptResult, SpinnerInteraction,
};

// Interaction dependencies of the delete commands
pub trait DeleteInteraction: ConfirmationPrompt + SpinnerInteraction + Send + Sync {}
impl<T: ConfirmationPrompt + SpinnerInteraction + Send + Sync> DeleteInteraction for T {}

/// Kind of resource a delete command removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Profile,
    Project,
    Cluster,
    Snapshot,
    DatabaseUser,
    AccessListEntry,
    PrivateEndpoint,
    Team,
    FederatedDatabaseInstance,
}

impl ResourceKind {
    fn label(&self) -> &'static str {
        match self {
            Self::Profile => "Profile",
            Self::Project => "Project",
            Self::Cluster => "Cluster",
            Self::Snapshot => "Snapshot",
            Self::DatabaseUser => "Database user",
            Self::AccessListEntry => "Access list entry",
            Self::PrivateEndpoint => "Private endpoint",
            Self::Team => "Team",
            Self::FederatedDatabaseInstance => "Federated database instance",
        }
    }

    fn noun(&self) -> String {
        self.label().to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeleteResult {
    Deleted { resource: ResourceKind, name: String },
    /// The deletion was accepted and completes in the background.
    Deleting { resource: ResourceKind, name: String },
    Canceled { resource: ResourceKind, name: String },
}

impl Display for DeleteResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deleted { resource, name } => write!(f, "{} '{}' deleted", resource.label(), name),
            Self::Deleting { resource, name } => {
                write!(f, "Deleting {} '{}'", resource.noun(), name)
            }
            Self::Canceled { resource, .. } => write!(f, "{} not deleted", resource.label()),
        }
    }
}

/// Ask the user to confirm a deletion, unless `force` is set.
///
/// Returns `true` when the deletion should go ahead.
pub fn confirm_deletion(
    interaction: &(impl ConfirmationPrompt + ?Sized),
    force: bool,
    message: String,
    help_text: Option<&str>,
) -> Result<bool> {
    if force {
        return Ok(true);
    }

    let options = match help_text {
        Some(help_text) => ConfirmationPromptOptions::builder()
            .message(message)
            .pre_confirmation_help_text(help_text.to_string())
            .default(false)
            .build(),
        None => ConfirmationPromptOptions::builder()
            .message(message)
            .default(false)
            .build(),
    };

    let confirmation = interaction
        .confirm(options)
        .context("confirming deletion")?;

    Ok(matches!(confirmation, ConfirmationPromptResult::Yes))
}

/// Default confirmation question of the delete commands.
pub fn delete_question(name: &str) -> String {
    format!("Are you sure you want to delete: {name}?")
}
