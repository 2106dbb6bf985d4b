//! Cluster commands.
//!
//! Atlas exposes three shapes of clusters: dedicated clusters scaling all shards together
//! (`2023-02-01`), dedicated clusters scaling shards independently (`2024-08-05`) and flex
//! clusters (`2024-11-13`). The commands try one shape and fall back to another based on the
//! error code returned by the API.
use serde::Serialize;

use crate::{
    client::{AtlasError, Paginated},
    dependencies::{ClusterDescriber, ClusterShape},
    models::{Cluster, FlexCluster, ResourceTag, resource_tags},
};

pub use crate::watchers::CANNOT_USE_FLEX_CLUSTER_IN_CLUSTER_API;

pub mod auto_scaling;
pub mod create;
pub mod delete;
pub mod describe;
pub mod list;
pub mod pause;
pub mod update;
pub mod upgrade;
pub mod watch;

pub const ASYMMETRIC_SHARD_UNSUPPORTED: &str = "ASYMMETRIC_SHARD_UNSUPPORTED";
pub const DUPLICATE_CLUSTER_NAME: &str = "DUPLICATE_CLUSTER_NAME";
pub const INVALID_ATTRIBUTE: &str = "INVALID_ATTRIBUTE";

const DESCRIBE_TEMPLATE: &str = "ID\tNAME\tMDB VER\tSTATE\n{{.id}}\t{{.name}}\t{{.mongoDBVersion}}\t{{.stateName}}\n";
const LIST_TEMPLATE: &str = "ID\tNAME\tMDB VER\tSTATE{{range .results}}\n{{.id}}\t{{.name}}\t{{.mongoDBVersion}}\t{{.stateName}}{{end}}\n";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ClusterError {
    #[error("cluster name missing")]
    MissingName,
    #[error("a cluster with that name already exists, choose a different name")]
    NameExists,
    #[error(
        "the region does not exist for the selected provider and tier, check the available regions in the Atlas UI and try again"
    )]
    NoRegionExists,
    #[error("flex is incompatible with {0} auto scaling mode")]
    FlexIncompatible(String),
    #[error("{0} is required when no configuration file is provided")]
    MissingFlag(&'static str),
}

/// Replace well known API errors with actionable ones.
pub fn friendly_error(err: AtlasError) -> anyhow::Error {
    match &err {
        AtlasError::Api(api)
            if api.error_code.as_deref() == Some(INVALID_ATTRIBUTE)
                && api
                    .detail
                    .as_deref()
                    .is_some_and(|detail| detail.contains("regionName")) =>
        {
            ClusterError::NoRegionExists.into()
        }
        _ if err.has_error_code(DUPLICATE_CLUSTER_NAME) => ClusterError::NameExists.into(),
        _ => err.into(),
    }
}

/// Whether `name` is a flex cluster, detected by asking the dedicated cluster API for it.
pub async fn is_flex_cluster<C>(client: &C, project_id: &str, name: &str) -> Result<bool, AtlasError>
where
    C: ClusterDescriber + Send + Sync + ?Sized,
{
    match client
        .describe_cluster(project_id, name, ClusterShape::ClusterWideScaling)
        .await
    {
        Ok(_) => Ok(false),
        Err(err) if err.has_error_code(CANNOT_USE_FLEX_CLUSTER_IN_CLUSTER_API) => Ok(true),
        // Asymmetric clusters only exist in the independent shard scaling shape.
        Err(err) if err.has_error_code(ASYMMETRIC_SHARD_UNSUPPORTED) => Ok(false),
        Err(err) => Err(err),
    }
}

/// Termination protection from a pair of enable/disable flags; `None` when neither is set.
pub fn termination_protection(enable: bool, disable: bool) -> Option<bool> {
    match (enable, disable) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

/// Existing tags followed by the tags given on the command line.
pub fn append_tags(existing: Option<Vec<ResourceTag>>, pairs: &[(String, String)]) -> Option<Vec<ResourceTag>> {
    let mut tags = existing.unwrap_or_default();
    tags.extend(resource_tags(pairs));
    (!tags.is_empty()).then_some(tags)
}

/// A dedicated or flex cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnyCluster {
    Dedicated(Cluster),
    Flex(FlexCluster),
}

impl AnyCluster {
    pub fn name(&self) -> &str {
        match self {
            Self::Dedicated(cluster) => cluster.name(),
            Self::Flex(cluster) => cluster.name(),
        }
    }
}

/// A page of dedicated or flex clusters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ClusterPage {
    Dedicated(Paginated<Cluster>),
    Flex(Paginated<FlexCluster>),
}


#[cfg(test)]
mod tests {
    use super::{test_support::*, *};
    use crate::{client::ApiError, dependencies::mocks::MockAtlas};

    #[test]
    fn test_friendly_errors() {
        let region = AtlasError::Api(
            ApiError::new(400, INVALID_ATTRIBUTE)
                .with_detail("Invalid attribute regionName specified."),
        );
        assert_eq!(
            friendly_error(region).downcast_ref::<ClusterError>(),
            Some(&ClusterError::NoRegionExists)
        );

        assert_eq!(
            friendly_error(api_error(DUPLICATE_CLUSTER_NAME)).downcast_ref::<ClusterError>(),
            Some(&ClusterError::NameExists)
        );

        let other = AtlasError::Api(
            ApiError::new(400, INVALID_ATTRIBUTE).with_detail("Invalid attribute diskSizeGB."),
        );
        assert!(friendly_error(other).downcast_ref::<ClusterError>().is_none());
    }

    #[tokio::test]
    async fn test_is_flex_cluster() {
        let mut client = MockAtlas::new();
        client
            .expect_describe_cluster()
            .returning(|_, name, _| match name {
                "flex0" => Err(api_error(CANNOT_USE_FLEX_CLUSTER_IN_CLUSTER_API)),
                "missing" => Err(api_error("CLUSTER_NOT_FOUND")),
                "asymmetric" => Err(api_error(ASYMMETRIC_SHARD_UNSUPPORTED)),
                _ => Ok(Cluster::default()),
            });

        assert!(is_flex_cluster(&client, PROJECT_ID, "flex0").await.unwrap());
        assert!(!is_flex_cluster(&client, PROJECT_ID, "Cluster0").await.unwrap());
        assert!(!is_flex_cluster(&client, PROJECT_ID, "asymmetric").await.unwrap());
        assert!(is_flex_cluster(&client, PROJECT_ID, "missing").await.is_err());
    }

    #[test]
    fn test_termination_protection() {
        assert_eq!(termination_protection(true, false), Some(true));
        assert_eq!(termination_protection(false, true), Some(false));
        assert_eq!(termination_protection(false, false), None);
    }

    #[test]
    fn test_append_tags() {
        let existing = vec![ResourceTag {
            key: "env".to_string(),
            value: "dev".to_string(),
        }];
        let tags = append_tags(Some(existing), &[("team".to_string(), "db".to_string())]).unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[1].key, "team");

        assert_eq!(append_tags(None, &[]), None);
    }
}
