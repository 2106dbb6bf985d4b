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
    dependencies::{ClusterDescriber, ClusterShape, ClusterUpgrader},
    interaction::{Interaction, SpinnerInteraction},
    models::{
        Cluster, DEFAULT_PRIORITY, FlexCluster, HardwareSpec, REPLICA_SET_NODE_COUNT, RegionConfig,
        ReplicationSpec, SharedProviderSettings, SharedUpgradeRequest, TENANT_PROVIDER,
        TenantUpgradeRequest, is_tenant_tier, resource_tags,
    },
    template::Templated,
    watchers::{CLUSTER_UPGRADED, ClusterStateDescriber, WatchOptions, Watcher},
};

use super::{AnyCluster, append_tags, is_flex_cluster, termination_protection};

const UPGRADE_TEMPLATE: &str = "Upgrading cluster '{{.name}}'.\n";

pub trait UpgradeClusterStore: ClusterUpgrader + ClusterDescriber + Send + Sync {}
impl<T: ClusterUpgrader + ClusterDescriber + Send + Sync> UpgradeClusterStore for T {}

#[derive(Debug, Clone, Default, PartialEq)]
struct UpgradeSettings {
    tier: Option<String>,
    disk_size_gb: Option<f64>,
    mdb_version: Option<String>,
    termination_protection: Option<bool>,
    tags: Vec<(String, String)>,
}

impl UpgradeSettings {
    fn tier(&self) -> Option<String> {
        self.tier.as_deref().map(str::to_uppercase)
    }

    /// Upgrade of a shared (M0/M2/M5) cluster.
    fn shared_request(&self, current: &Cluster) -> SharedUpgradeRequest {
        let (provider, region) = current.provider_and_region().unwrap_or_default();
        let instance_size = self
            .tier()
            .or_else(|| current.instance_size().map(str::to_string))
            .unwrap_or_default();

        let provider_settings = if is_tenant_tier(&instance_size) {
            SharedProviderSettings {
                provider_name: TENANT_PROVIDER.to_string(),
                backing_provider_name: Some(provider),
                instance_size_name: instance_size,
                region_name: region,
            }
        } else {
            SharedProviderSettings {
                provider_name: provider,
                backing_provider_name: None,
                instance_size_name: instance_size,
                region_name: region,
            }
        };

        let tags = resource_tags(&self.tags);
        SharedUpgradeRequest {
            name: current.name().to_string(),
            provider_settings,
            mongo_db_major_version: self
                .mdb_version
                .clone()
                .or_else(|| current.mongo_db_major_version.clone()),
            disk_size_gb: self.disk_size_gb.filter(|size| *size > 0.0),
            termination_protection_enabled: self.termination_protection,
            tags: (!tags.is_empty()).then_some(tags),
        }
    }

    /// Upgrade of a flex cluster to a dedicated tier.
    fn flex_request(&self, current: &FlexCluster) -> TenantUpgradeRequest {
        let replication_specs = self.tier().map(|tier| {
            let settings = current.provider_settings.clone().unwrap_or_default();
            vec![ReplicationSpec {
                region_configs: Some(vec![RegionConfig {
                    provider_name: settings.backing_provider_name,
                    region_name: settings.region_name,
                    priority: Some(DEFAULT_PRIORITY),
                    electable_specs: Some(HardwareSpec {
                        instance_size: Some(tier),
                        node_count: Some(REPLICA_SET_NODE_COUNT),
                        disk_size_gb: self
                            .disk_size_gb
                            .filter(|size| *size > 0.0)
                            .or(settings.disk_size_gb),
                        ..Default::default()
                    }),
                    ..Default::default()
                }]),
                ..Default::default()
            }]
        });

        TenantUpgradeRequest {
            name: current.name().to_string(),
            backup_enabled: Some(
                current
                    .backup_settings
                    .as_ref()
                    .and_then(|settings| settings.enabled)
                    .unwrap_or_default(),
            ),
            cluster_type: current.cluster_type.clone(),
            group_id: current.group_id.clone(),
            mongo_db_version: self
                .mdb_version
                .clone()
                .or_else(|| current.mongo_db_version.clone()),
            tags: append_tags(current.tags.clone(), &self.tags),
            termination_protection_enabled: Some(
                self.termination_protection
                    .or(current.termination_protection_enabled)
                    .unwrap_or_default(),
            ),
            version_release_system: current.version_release_system.clone(),
            replication_specs,
        }
    }
}

pub struct Upgrade {
    store: Box<dyn UpgradeClusterStore>,
    interaction: Box<dyn SpinnerInteraction + Send + Sync>,
    project_id: String,
    name: String,
    settings: UpgradeSettings,
    watch: Option<WatchOptions>,
}

impl TryFromWithAtlasClient<args::Upgrade> for Upgrade {
    fn try_from_with_atlas(args: args::Upgrade, context: &AtlasContext) -> Result<Self> {
        Ok(Self {
            store: Box::new(context.client.clone()),
            interaction: Box::new(Interaction::new()),
            project_id: context.project_id(args.project.project_id)?,
            name: args.name,
            settings: UpgradeSettings {
                tier: args.tier,
                disk_size_gb: args.disk_size_gb,
                mdb_version: args.mdb_version,
                termination_protection: termination_protection(
                    args.enable_termination_protection,
                    args.disable_termination_protection,
                ),
                tags: args.tags,
            },
            watch: args.watch.options(),
        })
    }
}

#[async_trait]
impl CommandWithOutput for Upgrade {
    type Output = Templated<AnyCluster>;

    async fn execute(&mut self) -> Result<Self::Output> {
        let name = self.name.as_str();
        let flex = is_flex_cluster(self.store.as_ref(), &self.project_id, name)
            .await
            .with_context(|| format!("describing cluster '{name}'"))?;

        let upgraded = if flex {
            let current = self
                .store
                .describe_flex_cluster(&self.project_id, name)
                .await
                .with_context(|| format!("describing flex cluster '{name}'"))?;
            let request = self.settings.flex_request(&current);

            info!(name, "upgrading flex cluster");
            self.store
                .upgrade_flex_cluster(&self.project_id, &request)
                .await
                .context("upgrading flex cluster")?
        } else {
            let current = self
                .store
                .describe_cluster(&self.project_id, name, ClusterShape::ClusterWideScaling)
                .await
                .with_context(|| format!("describing cluster '{name}'"))?;
            let request = self.settings.shared_request(&current);

            info!(name, "upgrading shared cluster");
            self.store
                .upgrade_shared_cluster(&self.project_id, &request)
                .await
                .context("upgrading shared cluster")?
        };

        if let Some(options) = self.watch {
            // The upgraded cluster is a dedicated cluster.
            let describer = ClusterStateDescriber {
                client: self.store.as_ref(),
                project_id: &self.project_id,
                name,
                flex: false,
            };
            watch_with_spinner(
                self.interaction.as_ref(),
                "Waiting for cluster to be upgraded...",
                Watcher::new(&describer, CLUSTER_UPGRADED, options),
            )
            .await
            .with_context(|| format!("watching upgrade of cluster '{name}'"))?;
        }

        Ok(Templated::new(UPGRADE_TEMPLATE, AnyCluster::Dedicated(upgraded)))
    }
}
