//! Dedicated cluster descriptions.
//!
//! The same model is used for the cluster-wide scaling shape (`2023-02-01`) and the independent
//! shard scaling shape (`2024-08-05`). Fields the CLI does not touch are kept in `extra` so that a
//! describe, patch, update cycle does not drop them.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ResourceTag;

pub const TENANT_PROVIDER: &str = "TENANT";
pub const DEFAULT_ZONE_NAME: &str = "Zone 1";
pub const DEFAULT_PRIORITY: u32 = 7;
pub const REPLICA_SET_NODE_COUNT: u32 = 3;

pub const TIER_M0: &str = "M0";
pub const TIER_M2: &str = "M2";
pub const TIER_M5: &str = "M5";
pub const TIER_FLEX: &str = "FLEX";

/// Shared tiers run on a tenant provider.
pub fn is_tenant_tier(tier: &str) -> bool {
    matches!(tier, TIER_M0 | TIER_M2 | TIER_M5)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_type: Option<String>,
    #[serde(
        default,
        rename = "mongoDBVersion",
        skip_serializing_if = "Option::is_none"
    )]
    pub mongo_db_version: Option<String>,
    #[serde(
        default,
        rename = "mongoDBMajorVersion",
        skip_serializing_if = "Option::is_none"
    )]
    pub mongo_db_major_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paused: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination_protection_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pit_enabled: Option<bool>,
    #[serde(default, rename = "diskSizeGB", skip_serializing_if = "Option::is_none")]
    pub disk_size_gb: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bi_connector: Option<BiConnector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_at_rest_provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_strings: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_specs: Option<Vec<ReplicationSpec>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<ResourceTag>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiConnector {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_preference: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicationSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_shards: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_configs: Option<Vec<RegionConfig>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backing_provider_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub electable_specs: Option<HardwareSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only_specs: Option<HardwareSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analytics_specs: Option<HardwareSpec>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardwareSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_count: Option<u32>,
    #[serde(default, rename = "diskSizeGB", skip_serializing_if = "Option::is_none")]
    pub disk_size_gb: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Cluster {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub fn state_name(&self) -> &str {
        self.state_name.as_deref().unwrap_or_default()
    }

    fn region_configs(&self) -> impl Iterator<Item = &RegionConfig> {
        self.replication_specs
            .iter()
            .flatten()
            .flat_map(|spec| spec.region_configs.iter().flatten())
    }

    fn region_configs_mut(&mut self) -> impl Iterator<Item = &mut RegionConfig> {
        self.replication_specs
            .iter_mut()
            .flatten()
            .flat_map(|spec| spec.region_configs.iter_mut().flatten())
    }

    /// A cluster with any region on the tenant provider is a shared-tier cluster.
    pub fn is_tenant(&self) -> bool {
        self.region_configs()
            .any(|config| config.provider_name.as_deref() == Some(TENANT_PROVIDER))
    }

    /// Clear attributes the server computes, so the description can be sent back.
    pub fn remove_read_only_attributes(&mut self) {
        self.id = None;
        self.create_date = None;
        self.state_name = None;
        self.mongo_db_version = None;
        self.connection_strings = None;

        for spec in self.replication_specs.iter_mut().flatten() {
            spec.id = None;
        }

        if self.is_tenant() {
            self.bi_connector = None;
            self.encryption_at_rest_provider = None;
            self.disk_size_gb = None;
            self.mongo_db_major_version = None;
            self.pit_enabled = None;
            self.backup_enabled = None;

            for config in self.region_configs_mut() {
                if let Some(specs) = config.electable_specs.as_mut() {
                    specs.disk_size_gb = None;
                }
            }
        }
    }

    /// Apply an instance size to every electable, read-only and analytics spec.
    pub fn set_instance_size(&mut self, tier: &str) {
        for config in self.region_configs_mut() {
            for specs in [
                config.electable_specs.as_mut(),
                config.read_only_specs.as_mut(),
                config.analytics_specs.as_mut(),
            ]
            .into_iter()
            .flatten()
            {
                specs.instance_size = Some(tier.to_string());
            }
        }
    }

    /// Apply a disk size to every hardware spec (independent shard scaling shape).
    pub fn set_hardware_disk_size(&mut self, disk_size_gb: f64) {
        for config in self.region_configs_mut() {
            for specs in [
                config.electable_specs.as_mut(),
                config.read_only_specs.as_mut(),
                config.analytics_specs.as_mut(),
            ]
            .into_iter()
            .flatten()
            {
                specs.disk_size_gb = Some(disk_size_gb);
            }
        }
    }

    /// Instance size of the first electable spec.
    pub fn instance_size(&self) -> Option<&str> {
        self.region_configs()
            .find_map(|config| config.electable_specs.as_ref()?.instance_size.as_deref())
    }

    /// Provider and region of the first region config, resolving the backing provider of tenants.
    pub fn provider_and_region(&self) -> Option<(String, String)> {
        self.region_configs().next().map(|config| {
            let provider = match config.provider_name.as_deref() {
                Some(TENANT_PROVIDER) => config.backing_provider_name.clone(),
                other => other.map(str::to_string),
            };
            (
                provider.unwrap_or_default(),
                config.region_name.clone().unwrap_or_default(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn tenant_cluster() -> Cluster {
        serde_json::from_value(json!({
            "id": "5e2211c17a3e5a48f5497de3",
            "name": "Cluster0",
            "createDate": "2024-01-01T00:00:00Z",
            "stateName": "IDLE",
            "mongoDBVersion": "8.0.4",
            "mongoDBMajorVersion": "8.0",
            "diskSizeGB": 0.5,
            "backupEnabled": false,
            "pitEnabled": false,
            "biConnector": {"enabled": false, "readPreference": "secondary"},
            "encryptionAtRestProvider": "NONE",
            "connectionStrings": {"standardSrv": "mongodb+srv://cluster0.example.mongodb.net"},
            "versionReleaseSystem": "LTS",
            "replicationSpecs": [{
                "id": "abc",
                "numShards": 1,
                "zoneName": "Zone 1",
                "regionConfigs": [{
                    "providerName": "TENANT",
                    "backingProviderName": "AWS",
                    "regionName": "US_EAST_1",
                    "priority": 7,
                    "electableSpecs": {"instanceSize": "M0", "diskSizeGB": 0.5}
                }]
            }]
        }))
        .unwrap()
    }

    #[test]
    fn test_unknown_fields_round_trip() {
        let cluster = tenant_cluster();
        assert_eq!(cluster.extra["versionReleaseSystem"], "LTS");

        let value = serde_json::to_value(&cluster).unwrap();
        assert_eq!(value["versionReleaseSystem"], "LTS");
        assert_eq!(value["mongoDBVersion"], "8.0.4");
        assert_eq!(value["diskSizeGB"], 0.5);
    }

    #[test]
    fn test_remove_read_only_attributes_tenant() {
        let mut cluster = tenant_cluster();
        assert!(cluster.is_tenant());

        cluster.remove_read_only_attributes();

        assert_eq!(cluster.id, None);
        assert_eq!(cluster.create_date, None);
        assert_eq!(cluster.state_name, None);
        assert_eq!(cluster.mongo_db_version, None);
        assert_eq!(cluster.connection_strings, None);
        assert_eq!(cluster.bi_connector, None);
        assert_eq!(cluster.disk_size_gb, None);
        assert_eq!(cluster.backup_enabled, None);
        let spec = &cluster.replication_specs.as_ref().unwrap()[0];
        assert_eq!(spec.id, None);
        assert_eq!(
            spec.region_configs.as_ref().unwrap()[0]
                .electable_specs
                .as_ref()
                .unwrap()
                .disk_size_gb,
            None
        );
        assert_eq!(cluster.name(), "Cluster0");
    }

    #[test]
    fn test_remove_read_only_attributes_dedicated_keeps_settings() {
        let mut cluster: Cluster = serde_json::from_value(json!({
            "id": "1",
            "name": "c",
            "diskSizeGB": 10.0,
            "backupEnabled": true,
            "replicationSpecs": [{"id": "r", "regionConfigs": [{"providerName": "AWS"}]}]
        }))
        .unwrap();

        cluster.remove_read_only_attributes();

        assert_eq!(cluster.id, None);
        assert_eq!(cluster.disk_size_gb, Some(10.0));
        assert_eq!(cluster.backup_enabled, Some(true));
    }

    #[test]
    fn test_set_instance_size() {
        let mut cluster: Cluster = serde_json::from_value(json!({
            "replicationSpecs": [{"regionConfigs": [
                {"electableSpecs": {"instanceSize": "M10"}, "readOnlySpecs": {"instanceSize": "M10", "nodeCount": 0}},
                {"analyticsSpecs": {"instanceSize": "M10"}}
            ]}]
        }))
        .unwrap();

        cluster.set_instance_size("M30");

        let configs = cluster.replication_specs.as_ref().unwrap()[0]
            .region_configs
            .as_ref()
            .unwrap();
        assert_eq!(configs[0].electable_specs.as_ref().unwrap().instance_size.as_deref(), Some("M30"));
        assert_eq!(configs[0].read_only_specs.as_ref().unwrap().instance_size.as_deref(), Some("M30"));
        assert_eq!(configs[1].analytics_specs.as_ref().unwrap().instance_size.as_deref(), Some("M30"));
        assert_eq!(cluster.instance_size(), Some("M30"));
    }

    #[test]
    fn test_provider_and_region_resolves_backing_provider() {
        assert_eq!(
            tenant_cluster().provider_and_region(),
            Some(("AWS".to_string(), "US_EAST_1".to_string()))
        );
    }
}
