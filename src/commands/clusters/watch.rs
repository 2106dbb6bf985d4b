use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::{
    args::clusters as args,
    commands::{
        CommandWithOutput,
        watch::{WatchResult, watch_with_spinner},
        with_atlas::{AtlasContext, TryFromWithAtlasClient},
    },
    dependencies::ClusterDescriber,
    interaction::{Interaction, SpinnerInteraction},
    watchers::{CLUSTER_IDLE, ClusterStateDescriber, WatchOptions, Watcher},
};

use super::is_flex_cluster;

pub struct Watch {
    store: Box<dyn ClusterDescriber + Send + Sync>,
    interaction: Box<dyn SpinnerInteraction + Send + Sync>,
    project_id: String,
    name: String,
    options: WatchOptions,
}

impl TryFromWithAtlasClient<args::Watch> for Watch {
    fn try_from_with_atlas(args: args::Watch, context: &AtlasContext) -> Result<Self> {
        Ok(Self {
            store: Box::new(context.client.clone()),
            interaction: Box::new(Interaction::new()),
            project_id: context.project_id(args.project.project_id)?,
            name: args.name,
            options: WatchOptions::with_timeout(args.watch_timeout),
        })
    }
}

#[async_trait]
impl CommandWithOutput for Watch {
    type Output = WatchResult;

    async fn execute(&mut self) -> Result<Self::Output> {
        let flex = is_flex_cluster(self.store.as_ref(), &self.project_id, &self.name)
            .await
            .with_context(|| format!("describing cluster '{}'", self.name))?;

        let describer = ClusterStateDescriber {
            client: self.store.as_ref(),
            project_id: &self.project_id,
            name: &self.name,
            flex,
        };
        watch_with_spinner(
            self.interaction.as_ref(),
            "Waiting for cluster to be available...",
            Watcher::new(&describer, CLUSTER_IDLE, self.options),
        )
        .await
        .with_context(|| format!("watching cluster '{}'", self.name))?;

        Ok(WatchResult::ClusterAvailable {
            name: self.name.clone(),
        })
    }
}
