use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info};

use crate::{
    args::clusters as args,
    commands::{
        CommandWithOutput,
        delete::{DeleteInteraction, DeleteResult, ResourceKind, confirm_deletion},
        watch::watch_with_spinner,
        with_atlas::{AtlasContext, TryFromWithAtlasClient},
    },
    dependencies::{ClusterDeleter, ClusterDescriber},
    interaction::Interaction,
    watchers::{CLUSTER_DELETED, ClusterStateDescriber, WatchOptions, Watcher},
};

use super::CANNOT_USE_FLEX_CLUSTER_IN_CLUSTER_API;

const DELETE_HELP: &str = "This operation will delete the cluster and all of its data. Confirm your backup settings before terminating your cluster. This action cannot be undone.";

pub trait DeleteClusterStore: ClusterDeleter + ClusterDescriber + Send + Sync {}
impl<T: ClusterDeleter + ClusterDescriber + Send + Sync> DeleteClusterStore for T {}

pub struct Delete {
    store: Box<dyn DeleteClusterStore>,
    interaction: Box<dyn DeleteInteraction>,
    project_id: String,
    name: String,
    force: bool,
    watch: Option<WatchOptions>,
}

impl TryFromWithAtlasClient<args::Delete> for Delete {
    fn try_from_with_atlas(args: args::Delete, context: &AtlasContext) -> Result<Self> {
        Ok(Self {
            store: Box::new(context.client.clone()),
            interaction: Box::new(Interaction::new()),
            project_id: context.project_id(args.project.project_id)?,
            name: args.name,
            force: args.force,
            watch: args.watch.options(),
        })
    }
}

impl Delete {
    /// Delete the cluster, returning whether it was a flex cluster.
    async fn delete(&self) -> Result<bool> {
        match self
            .store
            .delete_cluster(&self.project_id, &self.name)
            .await
        {
            Ok(()) => Ok(false),
            Err(err) if err.has_error_code(CANNOT_USE_FLEX_CLUSTER_IN_CLUSTER_API) => {
                debug!(name = %self.name, "deleting flex cluster");
                self.store
                    .delete_flex_cluster(&self.project_id, &self.name)
                    .await
                    .with_context(|| format!("deleting flex cluster '{}'", self.name))?;
                Ok(true)
            }
            Err(err) => Err(err).with_context(|| format!("deleting cluster '{}'", self.name)),
        }
    }
}

#[async_trait]
impl CommandWithOutput for Delete {
    type Output = DeleteResult;

    async fn execute(&mut self) -> Result<Self::Output> {
        let confirmed = confirm_deletion(
            self.interaction.as_ref(),
            self.force,
            format!("Are you sure you want to terminate '{}'?", self.name),
            Some(DELETE_HELP),
        )?;

        if !confirmed {
            return Ok(DeleteResult::Canceled {
                resource: ResourceKind::Cluster,
                name: self.name.clone(),
            });
        }

        info!(name = %self.name, "deleting cluster");
        let flex = self.delete().await?;

        let Some(options) = self.watch else {
            return Ok(DeleteResult::Deleting {
                resource: ResourceKind::Cluster,
                name: self.name.clone(),
            });
        };

        let describer = ClusterStateDescriber {
            client: self.store.as_ref(),
            project_id: &self.project_id,
            name: &self.name,
            flex,
        };
        watch_with_spinner(
            self.interaction.as_ref(),
            "Waiting for cluster to be deleted...",
            Watcher::new(&describer, CLUSTER_DELETED, options),
        )
        .await
        .context("watching cluster deletion")?;

        Ok(DeleteResult::Deleted {
            resource: ResourceKind::Cluster,
            name: self.name.clone(),
        })
    }
}
