//! Resource models exchanged with the Administration API.
//!
//! Field names follow the wire format (camelCase), which is also what output templates address.
use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::Value;

mod access_list;
mod alert;
mod backup;
mod cluster;
mod data_federation;
mod database_user;
mod flex;
mod private_endpoint;
mod project;
mod team;

pub use access_list::*;
pub use alert::*;
pub use backup::*;
pub use cluster::*;
pub use data_federation::*;
pub use database_user::*;
pub use flex::*;
pub use private_endpoint::*;
pub use project::*;
pub use team::*;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceTag {
    pub key: String,
    pub value: String,
}

/// Build tags from `key=value` pairs, skipping pairs with an empty side.
pub fn resource_tags(pairs: &[(String, String)]) -> Vec<ResourceTag> {
    pairs
        .iter()
        .filter(|(key, value)| !key.is_empty() && !value.is_empty())
        .map(|(key, value)| ResourceTag {
            key: key.clone(),
            value: value.clone(),
        })
        .collect()
}

/// How a cluster scales its shards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AutoScalingMode {
    #[default]
    ClusterWideScaling,
    IndependentShardScaling,
}

impl FromStr for AutoScalingMode {
    type Err = String;

    /// Accepts both the flag spelling and the API response spelling, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        match lower.as_str() {
            "clusterwidescaling" | "cluster_wide_scaling" => Ok(Self::ClusterWideScaling),
            "independentshardscaling" | "independent_shard_scaling" => {
                Ok(Self::IndependentShardScaling)
            }
            _ => Err(format!("invalid auto scaling mode: {s}")),
        }
    }
}

impl Display for AutoScalingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ClusterWideScaling => write!(f, "clusterWideScaling"),
            Self::IndependentShardScaling => write!(f, "independentShardScaling"),
        }
    }
}

impl AutoScalingMode {
    /// Detect the cluster shape of a cluster document loaded from a file.
    ///
    /// `numShards` only exists in the cluster-wide shape; `zoneId` and hardware level
    /// `diskSizeGB` only exist in the independent shard scaling shape.
    pub fn detect_from_document(document: &Value) -> Self {
        let specs = match document.get("replicationSpecs").and_then(Value::as_array) {
            Some(specs) => specs,
            None => return Self::ClusterWideScaling,
        };

        if specs.iter().any(|spec| spec.get("numShards").is_some()) {
            return Self::ClusterWideScaling;
        }

        let hardware_disk_size = specs
            .iter()
            .filter_map(|spec| spec.get("regionConfigs").and_then(Value::as_array))
            .flatten()
            .flat_map(|config| {
                ["electableSpecs", "readOnlySpecs", "analyticsSpecs"]
                    .into_iter()
                    .filter_map(move |key| config.get(key))
            })
            .any(|specs| specs.get("diskSizeGB").is_some());

        if hardware_disk_size || specs.iter().any(|spec| spec.get("zoneId").is_some()) {
            Self::IndependentShardScaling
        } else {
            Self::ClusterWideScaling
        }
    }
}

/// Auto-scaling configuration of a cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoScalingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_scaling_mode: Option<String>,
}

impl AutoScalingConfig {
    pub fn mode(&self) -> AutoScalingMode {
        self.auto_scaling_mode
            .as_deref()
            .and_then(|mode| mode.parse().ok())
            .unwrap_or_default()
    }
}
