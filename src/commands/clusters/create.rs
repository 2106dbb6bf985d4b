use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    args::clusters as args,
    commands::{
        CommandWithOutput,
        watch::watch_with_spinner,
        with_atlas::{AtlasContext, TryFromWithAtlasClient},
    },
    dependencies::{ClusterCreator, ClusterDescriber, ClusterShape, FileReader, RequestFiles},
    file,
    interaction::{Interaction, SpinnerInteraction},
    models::{
        AutoScalingMode, BiConnector, Cluster, DEFAULT_PRIORITY, DEFAULT_ZONE_NAME,
        FlexClusterCreate, FlexProviderSettings, HardwareSpec, RegionConfig, ReplicationSpec,
        TENANT_PROVIDER, TIER_FLEX, TIER_M0, TIER_M2, TIER_M5, resource_tags,
    },
    template::Templated,
    watchers::{CLUSTER_CREATED, ClusterStateDescriber, WatchOptions, Watcher},
};

use super::{AnyCluster, ClusterError, friendly_error};

const CREATE_TEMPLATE: &str = "Cluster '{{.name}}' is being created.\n";
const CREATE_WATCH_TEMPLATE: &str = "Cluster '{{.name}}' created successfully.\n";

pub trait CreateClusterStore: ClusterCreator + ClusterDescriber + Send + Sync {}
impl<T: ClusterCreator + ClusterDescriber + Send + Sync> CreateClusterStore for T {}

/// Cluster settings given on the command line.
#[derive(Debug, Clone, PartialEq)]
struct ClusterFlags {
    provider: Option<String>,
    region: Option<String>,
    tier: String,
    members: u32,
    shards: u32,
    cluster_type: String,
    disk_size_gb: f64,
    mdb_version: String,
    backup: bool,
    bi_connector: bool,
    termination_protection: bool,
    tags: Vec<(String, String)>,
}

pub struct Create {
    store: Box<dyn CreateClusterStore>,
    file_reader: Box<dyn FileReader + Send + Sync>,
    interaction: Box<dyn SpinnerInteraction + Send + Sync>,
    project_id: String,
    name: Option<String>,
    file: Option<PathBuf>,
    flags: ClusterFlags,
    auto_scaling_mode: Option<AutoScalingMode>,
    watch: Option<WatchOptions>,
}

impl TryFromWithAtlasClient<args::Create> for Create {
    fn try_from_with_atlas(args: args::Create, context: &AtlasContext) -> Result<Self> {
        Ok(Self {
            store: Box::new(context.client.clone()),
            file_reader: Box::new(RequestFiles),
            interaction: Box::new(Interaction::new()),
            project_id: context.project_id(args.project.project_id)?,
            name: args.name,
            file: args.file,
            flags: ClusterFlags {
                provider: args.provider,
                region: args.region,
                tier: args.tier,
                members: args.members,
                shards: args.shards,
                cluster_type: args.cluster_type,
                disk_size_gb: args.disk_size_gb,
                mdb_version: args.mdb_version,
                backup: args.backup,
                bi_connector: args.bi_connector,
                termination_protection: args.enable_termination_protection,
                tags: args.tags,
            },
            auto_scaling_mode: args.auto_scaling_mode,
            watch: args.watch.options(),
        })
    }
}

/// Request body of a creation: a flex cluster or a dedicated cluster in a given shape.
#[derive(Debug, Clone, PartialEq)]
enum CreateRequest {
    Flex(FlexClusterCreate),
    Dedicated(Cluster, AutoScalingMode),
}

impl Create {
    async fn request(&self) -> Result<CreateRequest> {
        match &self.file {
            Some(path) => self.request_from_file(path).await,
            None => self.request_from_flags(),
        }
    }

    async fn request_from_file(&self, path: &Path) -> Result<CreateRequest> {
        let document = file::load_document(self.file_reader.as_ref(), path).await?;
        let mode = self
            .auto_scaling_mode
            .unwrap_or_else(|| AutoScalingMode::detect_from_document(&document));

        // Flex cluster documents have no replication specs.
        if document.get("replicationSpecs").is_none_or(Value::is_null) {
            if mode == AutoScalingMode::IndependentShardScaling {
                return Err(ClusterError::FlexIncompatible(mode.to_string()).into());
            }

            let mut request: FlexClusterCreate = file::from_document(path, document)?;
            if let Some(name) = &self.name {
                request.name = name.clone();
            }
            if request.name.is_empty() {
                return Err(ClusterError::MissingName.into());
            }
            return Ok(CreateRequest::Flex(request));
        }

        let mut cluster: Cluster = file::from_document(path, document)?;
        cluster.remove_read_only_attributes();
        cluster.group_id = Some(self.project_id.clone());
        if let Some(name) = &self.name {
            cluster.name = Some(name.clone());
        }
        if cluster.name().is_empty() {
            return Err(ClusterError::MissingName.into());
        }

        debug!(auto_scaling_mode = %mode, "creating cluster from file");
        Ok(CreateRequest::Dedicated(cluster, mode))
    }

    fn request_from_flags(&self) -> Result<CreateRequest> {
        let name = self.name.clone().ok_or(ClusterError::MissingName)?;
        let flags = &self.flags;
        let tier = flags.tier.to_uppercase();
        let provider = flags
            .provider
            .as_deref()
            .map(str::to_uppercase)
            .ok_or(ClusterError::MissingFlag("--provider"))?;
        let region = flags
            .region
            .as_deref()
            .map(str::to_uppercase)
            .ok_or(ClusterError::MissingFlag("--region"))?;
        let mode = self.auto_scaling_mode.unwrap_or_default();
        let tags = resource_tags(&flags.tags);

        if matches!(tier.as_str(), TIER_M2 | TIER_M5) {
            warn!(
                "the {tier} tier is deprecated, a flex cluster will be created instead; learn more at https://dochub.mongodb.org/core/flex-migration"
            );
        }

        if matches!(tier.as_str(), TIER_FLEX | TIER_M2 | TIER_M5) {
            if mode == AutoScalingMode::IndependentShardScaling {
                return Err(ClusterError::FlexIncompatible(mode.to_string()).into());
            }

            return Ok(CreateRequest::Flex(FlexClusterCreate {
                name,
                provider_settings: FlexProviderSettings {
                    backing_provider_name: Some(provider),
                    region_name: Some(region),
                    ..Default::default()
                },
                termination_protection_enabled: Some(flags.termination_protection),
                tags: (!tags.is_empty()).then_some(tags),
            }));
        }

        let tenant = tier == TIER_M0;
        let independent = mode == AutoScalingMode::IndependentShardScaling;

        let region_config = RegionConfig {
            provider_name: Some(if tenant {
                TENANT_PROVIDER.to_string()
            } else {
                provider.clone()
            }),
            backing_provider_name: tenant.then(|| provider.clone()),
            region_name: Some(region),
            priority: Some(DEFAULT_PRIORITY),
            electable_specs: Some(HardwareSpec {
                instance_size: Some(tier.clone()),
                node_count: (!tenant).then_some(flags.members),
                disk_size_gb: (independent && !tenant).then_some(flags.disk_size_gb),
                ..Default::default()
            }),
            ..Default::default()
        };

        let replication_specs = if independent {
            (0..flags.shards.max(1))
                .map(|_| ReplicationSpec {
                    zone_name: Some(DEFAULT_ZONE_NAME.to_string()),
                    region_configs: Some(vec![region_config.clone()]),
                    ..Default::default()
                })
                .collect()
        } else {
            vec![ReplicationSpec {
                num_shards: Some(flags.shards),
                zone_name: Some(DEFAULT_ZONE_NAME.to_string()),
                region_configs: Some(vec![region_config]),
                ..Default::default()
            }]
        };

        let cluster = Cluster {
            name: Some(name),
            group_id: Some(self.project_id.clone()),
            cluster_type: Some(flags.cluster_type.to_uppercase()),
            mongo_db_major_version: Some(flags.mdb_version.clone()),
            termination_protection_enabled: Some(flags.termination_protection),
            backup_enabled: (!tenant).then_some(flags.backup),
            disk_size_gb: (!tenant && !independent).then_some(flags.disk_size_gb),
            bi_connector: (!tenant).then(|| BiConnector {
                enabled: Some(flags.bi_connector),
                read_preference: None,
            }),
            replication_specs: Some(replication_specs),
            tags: (!tags.is_empty()).then_some(tags),
            ..Default::default()
        };

        Ok(CreateRequest::Dedicated(cluster, mode))
    }
}

#[async_trait]
impl CommandWithOutput for Create {
    type Output = Templated<AnyCluster>;

    async fn execute(&mut self) -> Result<Self::Output> {
        let request = self.request().await?;

        let created = match &request {
            CreateRequest::Flex(request) => {
                info!(name = %request.name, "creating flex cluster");
                AnyCluster::Flex(
                    self.store
                        .create_flex_cluster(&self.project_id, request)
                        .await
                        .map_err(friendly_error)
                        .context("creating flex cluster")?,
                )
            }
            CreateRequest::Dedicated(cluster, mode) => {
                info!(name = cluster.name(), auto_scaling_mode = %mode, "creating cluster");
                AnyCluster::Dedicated(
                    self.store
                        .create_cluster(&self.project_id, cluster, ClusterShape::from(*mode))
                        .await
                        .map_err(friendly_error)
                        .context("creating cluster")?,
                )
            }
        };

        let Some(options) = self.watch else {
            return Ok(Templated::new(CREATE_TEMPLATE, created));
        };

        let describer = ClusterStateDescriber {
            client: self.store.as_ref(),
            project_id: &self.project_id,
            name: created.name(),
            flex: matches!(created, AnyCluster::Flex(_)),
        };
        watch_with_spinner(
            self.interaction.as_ref(),
            "Waiting for cluster to be created...",
            Watcher::new(&describer, CLUSTER_CREATED, options),
        )
        .await
        .context("watching cluster creation")?;

        Ok(Templated::new(CREATE_WATCH_TEMPLATE, created))
    }
}
