use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    args::clusters as args,
    commands::{
        CommandWithOutput,
        with_atlas::{AtlasContext, TryFromWithAtlasClient},
    },
    dependencies::{
        AutoScalingConfigDescriber, ClusterDescriber, ClusterShape, ClusterUpdater, FileReader,
        RequestFiles,
    },
    file,
    models::{
        AutoScalingMode, Cluster, FlexCluster, FlexClusterUpdate, TIER_M2, TIER_M5, resource_tags,
    },
    template::Templated,
};

use super::{
    AnyCluster, ClusterError, append_tags, friendly_error, is_flex_cluster, termination_protection,
};

const UPDATE_TEMPLATE: &str = "Updating cluster '{{.name}}'.\n";

pub trait UpdateClusterStore:
    ClusterDescriber + ClusterUpdater + AutoScalingConfigDescriber + Send + Sync
{
}
impl<T: ClusterDescriber + ClusterUpdater + AutoScalingConfigDescriber + Send + Sync>
    UpdateClusterStore for T
{
}

/// Settings patched onto the current cluster when no file is given.
#[derive(Debug, Clone, Default, PartialEq)]
struct ClusterPatch {
    tier: Option<String>,
    disk_size_gb: Option<f64>,
    mdb_version: Option<String>,
    termination_protection: Option<bool>,
    tags: Vec<(String, String)>,
}

impl ClusterPatch {
    fn apply(&self, cluster: &mut Cluster, mode: AutoScalingMode) {
        if let Some(mdb_version) = &self.mdb_version {
            cluster.mongo_db_major_version = Some(mdb_version.clone());
        }

        if let Some(disk_size_gb) = self.disk_size_gb.filter(|size| *size > 0.0) {
            match mode {
                AutoScalingMode::ClusterWideScaling => cluster.disk_size_gb = Some(disk_size_gb),
                AutoScalingMode::IndependentShardScaling => {
                    cluster.set_hardware_disk_size(disk_size_gb)
                }
            }
        }

        if let Some(tier) = &self.tier {
            cluster.set_instance_size(&tier.to_uppercase());
        }

        cluster.termination_protection_enabled = self.termination_protection;

        // Tags given on the command line replace the current ones; `--tag =` clears them.
        if !self.tags.is_empty() {
            cluster.tags = Some(resource_tags(&self.tags));
        }
    }

    fn flex_update(&self, current: &FlexCluster) -> FlexClusterUpdate {
        FlexClusterUpdate {
            termination_protection_enabled: self.termination_protection,
            tags: append_tags(current.tags.clone(), &self.tags),
        }
    }
}

pub struct Update {
    store: Box<dyn UpdateClusterStore>,
    file_reader: Box<dyn FileReader + Send + Sync>,
    project_id: String,
    name: Option<String>,
    file: Option<PathBuf>,
    patch: ClusterPatch,
    auto_scaling_mode: Option<AutoScalingMode>,
}

impl TryFromWithAtlasClient<args::Update> for Update {
    fn try_from_with_atlas(args: args::Update, context: &AtlasContext) -> Result<Self> {
        if let Some(tier) = args.tier.as_deref() {
            let tier = tier.to_uppercase();
            if matches!(tier.as_str(), TIER_M2 | TIER_M5) {
                warn!("the {tier} tier is deprecated, learn more at https://dochub.mongodb.org/core/flex-migration");
            }
        }

        Ok(Self {
            store: Box::new(context.client.clone()),
            file_reader: Box::new(RequestFiles),
            project_id: context.project_id(args.project.project_id)?,
            name: args.name,
            file: args.file,
            patch: ClusterPatch {
                tier: args.tier,
                disk_size_gb: args.disk_size_gb,
                mdb_version: args.mdb_version,
                termination_protection: termination_protection(
                    args.enable_termination_protection,
                    args.disable_termination_protection,
                ),
                tags: args.tags,
            },
            auto_scaling_mode: args.auto_scaling_mode,
        })
    }
}

/// Request body loaded from `--file`.
struct FileBody {
    path: PathBuf,
    document: Value,
}

impl Update {
    async fn load_file(&self) -> Result<Option<FileBody>> {
        let Some(path) = &self.file else {
            return Ok(None);
        };
        let document = file::load_document(self.file_reader.as_ref(), path).await?;
        Ok(Some(FileBody {
            path: path.clone(),
            document,
        }))
    }

    async fn update_flex(&self, name: &str, body: Option<FileBody>) -> Result<AnyCluster> {
        if self.auto_scaling_mode == Some(AutoScalingMode::IndependentShardScaling) {
            return Err(ClusterError::FlexIncompatible(
                AutoScalingMode::IndependentShardScaling.to_string(),
            )
            .into());
        }

        let update = match body {
            Some(body) => file::from_document(&body.path, body.document)?,
            None => {
                let current = self
                    .store
                    .describe_flex_cluster(&self.project_id, name)
                    .await
                    .with_context(|| format!("describing flex cluster '{name}'"))?;
                self.patch.flex_update(&current)
            }
        };

        info!(name, "updating flex cluster");
        let updated = self
            .store
            .update_flex_cluster(&self.project_id, name, &update)
            .await
            .map_err(friendly_error)
            .context("updating flex cluster")?;

        Ok(AnyCluster::Flex(updated))
    }

    async fn update_dedicated(
        &self,
        name: &str,
        body: Option<FileBody>,
        mode: AutoScalingMode,
    ) -> Result<AnyCluster> {
        let shape = ClusterShape::from(mode);

        let cluster = match body {
            Some(body) => {
                let mut cluster: Cluster = file::from_document(&body.path, body.document)?;
                // The name of a cluster can't be changed.
                if cluster.name.as_deref().is_some_and(|file_name| file_name != name) {
                    debug!(name, "ignoring the name of the configuration file");
                    cluster.name = None;
                }
                cluster.remove_read_only_attributes();
                cluster
            }
            None => {
                let mut cluster = self
                    .store
                    .describe_cluster(&self.project_id, name, shape)
                    .await
                    .with_context(|| format!("describing cluster '{name}'"))?;
                cluster.remove_read_only_attributes();
                self.patch.apply(&mut cluster, mode);
                cluster
            }
        };

        info!(name, auto_scaling_mode = %mode, "updating cluster");
        let updated = self
            .store
            .update_cluster(&self.project_id, name, &cluster, shape)
            .await
            .map_err(friendly_error)
            .context("updating cluster")?;

        Ok(AnyCluster::Dedicated(updated))
    }

    /// Warn when a cluster scaling its shards independently is updated with the cluster wide shape.
    async fn warn_on_shape_mismatch(&self, name: &str) {
        match self
            .store
            .describe_auto_scaling_config(&self.project_id, name)
            .await
        {
            Ok(config) if config.mode() == AutoScalingMode::IndependentShardScaling => {
                warn!(
                    "'independentShardScaling' autoscaling cluster detected, updating it to clusterWideScaling is not possible, use --autoScalingMode 'independentShardScaling' instead"
                );
            }
            Ok(_) => {}
            Err(err) => debug!(error = %err, "describing auto scaling config failed"),
        }
    }
}

#[async_trait]
impl CommandWithOutput for Update {
    type Output = Templated<AnyCluster>;

    async fn execute(&mut self) -> Result<Self::Output> {
        let body = self.load_file().await?;

        let name = match (&self.name, &body) {
            (Some(name), _) => name.clone(),
            (None, Some(body)) => body
                .document
                .get("name")
                .and_then(Value::as_str)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .ok_or(ClusterError::MissingName)?,
            (None, None) => return Err(ClusterError::MissingName.into()),
        };

        let mode = match &body {
            Some(body) => AutoScalingMode::detect_from_document(&body.document),
            None => self.auto_scaling_mode.unwrap_or_default(),
        };

        let flex = is_flex_cluster(self.store.as_ref(), &self.project_id, &name)
            .await
            .with_context(|| format!("describing cluster '{name}'"))?;

        let updated = if flex {
            self.update_flex(&name, body).await?
        } else {
            if mode == AutoScalingMode::ClusterWideScaling {
                self.warn_on_shape_mismatch(&name).await;
            }
            self.update_dedicated(&name, body, mode).await?
        };

        Ok(Templated::new(UPDATE_TEMPLATE, updated))
    }
}
