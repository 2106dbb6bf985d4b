//! `clusters pause` and `clusters start`: both toggle the `paused` setting of a dedicated cluster.
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

use crate::{
    args::clusters as args,
    commands::{
        CommandWithOutput,
        watch::watch_with_spinner,
        with_atlas::{AtlasContext, TryFromWithAtlasClient},
    },
    dependencies::{ClusterDescriber, ClusterShape, ClusterUpdater},
    interaction::{Interaction, SpinnerInteraction},
    models::Cluster,
    template::Templated,
    watchers::{CLUSTER_IDLE, ClusterStateDescriber, WatchOptions, Watcher},
};

use super::AnyCluster;

const PAUSE_TEMPLATE: &str = "Pausing cluster '{{.name}}'.\n";
const START_TEMPLATE: &str = "Starting cluster '{{.name}}'.\n";

pub trait PauseClusterStore: ClusterUpdater + ClusterDescriber + Send + Sync {}
impl<T: ClusterUpdater + ClusterDescriber + Send + Sync> PauseClusterStore for T {}

pub struct SetPaused {
    store: Box<dyn PauseClusterStore>,
    interaction: Box<dyn SpinnerInteraction + Send + Sync>,
    project_id: String,
    name: String,
    paused: bool,
    watch: Option<WatchOptions>,
}

impl TryFromWithAtlasClient<args::Pause> for SetPaused {
    fn try_from_with_atlas(args: args::Pause, context: &AtlasContext) -> Result<Self> {
        Ok(Self {
            store: Box::new(context.client.clone()),
            interaction: Box::new(Interaction::new()),
            project_id: context.project_id(args.project.project_id)?,
            name: args.name,
            paused: true,
            watch: args.watch.options(),
        })
    }
}

impl TryFromWithAtlasClient<args::Start> for SetPaused {
    fn try_from_with_atlas(args: args::Start, context: &AtlasContext) -> Result<Self> {
        Ok(Self {
            store: Box::new(context.client.clone()),
            interaction: Box::new(Interaction::new()),
            project_id: context.project_id(args.project.project_id)?,
            name: args.name,
            paused: false,
            watch: args.watch.options(),
        })
    }
}

#[async_trait]
impl CommandWithOutput for SetPaused {
    type Output = Templated<AnyCluster>;

    async fn execute(&mut self) -> Result<Self::Output> {
        let (action, template) = if self.paused {
            ("pausing", PAUSE_TEMPLATE)
        } else {
            ("starting", START_TEMPLATE)
        };

        let request = Cluster {
            paused: Some(self.paused),
            ..Default::default()
        };

        info!(name = %self.name, action, "updating paused setting");
        let updated = self
            .store
            .update_cluster(
                &self.project_id,
                &self.name,
                &request,
                ClusterShape::ClusterWideScaling,
            )
            .await
            .with_context(|| format!("{action} cluster '{}'", self.name))?;

        if let Some(options) = self.watch {
            let describer = ClusterStateDescriber {
                client: self.store.as_ref(),
                project_id: &self.project_id,
                name: &self.name,
                flex: false,
            };
            watch_with_spinner(
                self.interaction.as_ref(),
                "Waiting for cluster changes to be applied...",
                Watcher::new(&describer, CLUSTER_IDLE, options),
            )
            .await
            .with_context(|| format!("watching cluster '{}'", self.name))?;
        }

        Ok(Templated::new(template, AnyCluster::Dedicated(updated)))
    }
}
