use async_trait::async_trait;

use crate::{
    client::{ApiVersion, AtlasClient, AtlasError, ListOptions, Paginated},
    models::{
        AutoScalingConfig, AutoScalingMode, Cluster, FlexCluster, FlexClusterCreate,
        FlexClusterUpdate, SharedUpgradeRequest, TenantUpgradeRequest,
    },
};

/// Cluster description shape, selected through the API version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterShape {
    /// `2023-02-01`: symmetric shards described by `numShards`.
    ClusterWideScaling,
    /// `2024-08-05`: one replication spec per shard.
    IndependentShardScaling,
}

impl ClusterShape {
    pub fn version(&self) -> ApiVersion {
        match self {
            Self::ClusterWideScaling => ApiVersion::V20230201,
            Self::IndependentShardScaling => ApiVersion::V20240805,
        }
    }
}

impl From<AutoScalingMode> for ClusterShape {
    fn from(mode: AutoScalingMode) -> Self {
        match mode {
            AutoScalingMode::ClusterWideScaling => Self::ClusterWideScaling,
            AutoScalingMode::IndependentShardScaling => Self::IndependentShardScaling,
        }
    }
}

#[async_trait]
pub trait ClusterLister {
    async fn list_clusters(
        &self,
        project_id: &str,
        shape: ClusterShape,
        options: &ListOptions,
    ) -> Result<Paginated<Cluster>, AtlasError>;

    async fn list_flex_clusters(
        &self,
        project_id: &str,
        options: &ListOptions,
    ) -> Result<Paginated<FlexCluster>, AtlasError>;
}

#[async_trait]
pub trait ClusterDescriber {
    async fn describe_cluster(
        &self,
        project_id: &str,
        name: &str,
        shape: ClusterShape,
    ) -> Result<Cluster, AtlasError>;

    async fn describe_flex_cluster(
        &self,
        project_id: &str,
        name: &str,
    ) -> Result<FlexCluster, AtlasError>;
}

#[async_trait]
pub trait AutoScalingConfigDescriber {
    async fn describe_auto_scaling_config(
        &self,
        project_id: &str,
        name: &str,
    ) -> Result<AutoScalingConfig, AtlasError>;
}

#[async_trait]
pub trait ClusterCreator {
    async fn create_cluster(
        &self,
        project_id: &str,
        cluster: &Cluster,
        shape: ClusterShape,
    ) -> Result<Cluster, AtlasError>;

    async fn create_flex_cluster(
        &self,
        project_id: &str,
        cluster: &FlexClusterCreate,
    ) -> Result<FlexCluster, AtlasError>;
}

#[async_trait]
pub trait ClusterUpdater {
    async fn update_cluster(
        &self,
        project_id: &str,
        name: &str,
        cluster: &Cluster,
        shape: ClusterShape,
    ) -> Result<Cluster, AtlasError>;

    async fn update_flex_cluster(
        &self,
        project_id: &str,
        name: &str,
        update: &FlexClusterUpdate,
    ) -> Result<FlexCluster, AtlasError>;
}

#[async_trait]
pub trait ClusterDeleter {
    async fn delete_cluster(&self, project_id: &str, name: &str) -> Result<(), AtlasError>;

    async fn delete_flex_cluster(&self, project_id: &str, name: &str) -> Result<(), AtlasError>;
}

#[async_trait]
pub trait ClusterUpgrader {
    /// Upgrade a flex cluster to a dedicated tier.
    async fn upgrade_flex_cluster(
        &self,
        project_id: &str,
        request: &TenantUpgradeRequest,
    ) -> Result<Cluster, AtlasError>;

    /// Upgrade a shared (M0/M2/M5) cluster.
    async fn upgrade_shared_cluster(
        &self,
        project_id: &str,
        request: &SharedUpgradeRequest,
    ) -> Result<Cluster, AtlasError>;
}

#[async_trait]
impl ClusterLister for AtlasClient {
    async fn list_clusters(
        &self,
        project_id: &str,
        shape: ClusterShape,
        options: &ListOptions,
    ) -> Result<Paginated<Cluster>, AtlasError> {
        self.require_atlas()?;
        self.list(&["groups", project_id, "clusters"], shape.version(), options, &[])
            .await
    }

    async fn list_flex_clusters(
        &self,
        project_id: &str,
        options: &ListOptions,
    ) -> Result<Paginated<FlexCluster>, AtlasError> {
        self.require_atlas()?;
        self.list(
            &["groups", project_id, "flexClusters"],
            ApiVersion::V20241113,
            options,
            &[],
        )
        .await
    }
}

#[async_trait]
impl ClusterDescriber for AtlasClient {
    async fn describe_cluster(
        &self,
        project_id: &str,
        name: &str,
        shape: ClusterShape,
    ) -> Result<Cluster, AtlasError> {
        self.require_atlas()?;
        self.get(&["groups", project_id, "clusters", name], shape.version(), &[])
            .await
    }

    async fn describe_flex_cluster(
        &self,
        project_id: &str,
        name: &str,
    ) -> Result<FlexCluster, AtlasError> {
        self.require_atlas()?;
        self.get(
            &["groups", project_id, "flexClusters", name],
            ApiVersion::V20241113,
            &[],
        )
        .await
    }
}

#[async_trait]
impl AutoScalingConfigDescriber for AtlasClient {
    async fn describe_auto_scaling_config(
        &self,
        project_id: &str,
        name: &str,
    ) -> Result<AutoScalingConfig, AtlasError> {
        self.require_atlas()?;
        self.get(
            &["groups", project_id, "clusters", name, "autoScalingConfiguration"],
            ApiVersion::V20240805,
            &[],
        )
        .await
    }
}

#[async_trait]
impl ClusterCreator for AtlasClient {
    async fn create_cluster(
        &self,
        project_id: &str,
        cluster: &Cluster,
        shape: ClusterShape,
    ) -> Result<Cluster, AtlasError> {
        self.require_atlas()?;
        self.post(&["groups", project_id, "clusters"], shape.version(), cluster)
            .await
    }

    async fn create_flex_cluster(
        &self,
        project_id: &str,
        cluster: &FlexClusterCreate,
    ) -> Result<FlexCluster, AtlasError> {
        self.require_atlas()?;
        self.post(
            &["groups", project_id, "flexClusters"],
            ApiVersion::V20241113,
            cluster,
        )
        .await
    }
}

#[async_trait]
impl ClusterUpdater for AtlasClient {
    async fn update_cluster(
        &self,
        project_id: &str,
        name: &str,
        cluster: &Cluster,
        shape: ClusterShape,
    ) -> Result<Cluster, AtlasError> {
        self.require_atlas()?;
        self.patch(
            &["groups", project_id, "clusters", name],
            shape.version(),
            cluster,
        )
        .await
    }

    async fn update_flex_cluster(
        &self,
        project_id: &str,
        name: &str,
        update: &FlexClusterUpdate,
    ) -> Result<FlexCluster, AtlasError> {
        self.require_atlas()?;
        self.patch(
            &["groups", project_id, "flexClusters", name],
            ApiVersion::V20241113,
            update,
        )
        .await
    }
}

#[async_trait]
impl ClusterDeleter for AtlasClient {
    async fn delete_cluster(&self, project_id: &str, name: &str) -> Result<(), AtlasError> {
        self.require_atlas()?;
        self.delete(
            &["groups", project_id, "clusters", name],
            ApiVersion::V20230201,
            &[],
        )
        .await
    }

    async fn delete_flex_cluster(&self, project_id: &str, name: &str) -> Result<(), AtlasError> {
        self.require_atlas()?;
        self.delete(
            &["groups", project_id, "flexClusters", name],
            ApiVersion::V20241113,
            &[],
        )
        .await
    }
}

#[async_trait]
impl ClusterUpgrader for AtlasClient {
    async fn upgrade_flex_cluster(
        &self,
        project_id: &str,
        request: &TenantUpgradeRequest,
    ) -> Result<Cluster, AtlasError> {
        self.require_atlas()?;
        self.post(
            &["groups", project_id, "flexClusters:tenantUpgrade"],
            ApiVersion::V20241113,
            request,
        )
        .await
    }

    async fn upgrade_shared_cluster(
        &self,
        project_id: &str,
        request: &SharedUpgradeRequest,
    ) -> Result<Cluster, AtlasError> {
        self.require_atlas()?;
        self.post(
            &["groups", project_id, "clusters", "tenantUpgrade"],
            ApiVersion::V20230101,
            request,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use serde_json::json;

    use super::*;
    use crate::{client::Credentials, config::Service};

    const PROJECT_ID: &str = "5e2211c17a3e5a48f5497de3";

    fn client(server: &mockito::Server) -> AtlasClient {
        AtlasClient::new(
            &server.url(),
            Service::Cloud,
            Credentials::AccessToken("token".to_string()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_describe_cluster_uses_shape_version() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/atlas/v2/groups/5e2211c17a3e5a48f5497de3/clusters/Cluster0")
            .match_header("accept", "application/vnd.atlas.2024-08-05+json")
            .with_status(200)
            .with_body(json!({"name": "Cluster0", "stateName": "IDLE"}).to_string())
            .create_async()
            .await;

        let cluster = client(&server)
            .describe_cluster(PROJECT_ID, "Cluster0", ClusterShape::IndependentShardScaling)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(cluster.state_name(), "IDLE");
    }

    #[tokio::test]
    async fn test_list_flex_clusters() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/atlas/v2/groups/5e2211c17a3e5a48f5497de3/flexClusters")
            .match_header("accept", "application/vnd.atlas.2024-11-13+json")
            .match_query(Matcher::UrlEncoded("includeCount".into(), "true".into()))
            .with_status(200)
            .with_body(json!({"results": [{"name": "flex0"}], "totalCount": 1}).to_string())
            .create_async()
            .await;

        let options = ListOptions {
            include_count: Some(true),
            ..Default::default()
        };
        let page = client(&server)
            .list_flex_clusters(PROJECT_ID, &options)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(page.results[0].name(), "flex0");
        assert_eq!(page.total_count, Some(1));
    }

    #[tokio::test]
    async fn test_flex_tenant_upgrade_path() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock(
                "POST",
                "/api/atlas/v2/groups/5e2211c17a3e5a48f5497de3/flexClusters:tenantUpgrade",
            )
            .match_body(Matcher::PartialJson(json!({"name": "flex0"})))
            .with_status(200)
            .with_body(json!({"name": "flex0", "stateName": "UPDATING"}).to_string())
            .create_async()
            .await;

        let request = TenantUpgradeRequest {
            name: "flex0".to_string(),
            ..Default::default()
        };
        let cluster = client(&server)
            .upgrade_flex_cluster(PROJECT_ID, &request)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(cluster.state_name(), "UPDATING");
    }

    #[tokio::test]
    async fn test_clusters_unsupported_on_ops_manager() {
        let client = AtlasClient::new(
            "http://localhost:8080/",
            Service::OpsManager,
            Credentials::AccessToken("token".to_string()),
        )
        .unwrap();

        let err = client
            .describe_cluster(PROJECT_ID, "Cluster0", ClusterShape::ClusterWideScaling)
            .await
            .unwrap_err();
        assert!(matches!(err, AtlasError::UnsupportedService(Service::OpsManager)));
    }
}
