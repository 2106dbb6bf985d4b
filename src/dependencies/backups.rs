use async_trait::async_trait;

use crate::{
    client::{ApiVersion, AtlasClient, AtlasError, ListOptions, Paginated},
    models::{FlexRestoreJob, FlexSnapshot, RestoreJob, Snapshot, SnapshotRequest},
};

#[async_trait]
pub trait SnapshotLister {
    async fn list_snapshots(
        &self,
        project_id: &str,
        cluster_name: &str,
        options: &ListOptions,
    ) -> Result<Paginated<Snapshot>, AtlasError>;

    async fn list_flex_snapshots(
        &self,
        project_id: &str,
        cluster_name: &str,
        options: &ListOptions,
    ) -> Result<Paginated<FlexSnapshot>, AtlasError>;
}

#[async_trait]
pub trait SnapshotDescriber {
    async fn describe_snapshot(
        &self,
        project_id: &str,
        cluster_name: &str,
        snapshot_id: &str,
    ) -> Result<Snapshot, AtlasError>;

    async fn describe_flex_snapshot(
        &self,
        project_id: &str,
        cluster_name: &str,
        snapshot_id: &str,
    ) -> Result<FlexSnapshot, AtlasError>;
}

#[async_trait]
pub trait SnapshotCreator {
    async fn create_snapshot(
        &self,
        project_id: &str,
        cluster_name: &str,
        request: &SnapshotRequest,
    ) -> Result<Snapshot, AtlasError>;
}

#[async_trait]
pub trait SnapshotDeleter {
    async fn delete_snapshot(
        &self,
        project_id: &str,
        cluster_name: &str,
        snapshot_id: &str,
    ) -> Result<(), AtlasError>;
}

#[async_trait]
pub trait RestoreJobLister {
    async fn list_restore_jobs(
        &self,
        project_id: &str,
        cluster_name: &str,
        options: &ListOptions,
    ) -> Result<Paginated<RestoreJob>, AtlasError>;

    async fn list_flex_restore_jobs(
        &self,
        project_id: &str,
        cluster_name: &str,
        options: &ListOptions,
    ) -> Result<Paginated<FlexRestoreJob>, AtlasError>;
}

#[async_trait]
pub trait RestoreJobDescriber {
    async fn describe_restore_job(
        &self,
        project_id: &str,
        cluster_name: &str,
        job_id: &str,
    ) -> Result<RestoreJob, AtlasError>;

    async fn describe_flex_restore_job(
        &self,
        project_id: &str,
        cluster_name: &str,
        job_id: &str,
    ) -> Result<FlexRestoreJob, AtlasError>;
}

#[async_trait]
pub trait RestoreJobCreator {
    async fn create_restore_job(
        &self,
        project_id: &str,
        cluster_name: &str,
        job: &RestoreJob,
    ) -> Result<RestoreJob, AtlasError>;
}

#[async_trait]
impl SnapshotLister for AtlasClient {
    async fn list_snapshots(
        &self,
        project_id: &str,
        cluster_name: &str,
        options: &ListOptions,
    ) -> Result<Paginated<Snapshot>, AtlasError> {
        self.require_atlas()?;
        self.list(
            &["groups", project_id, "clusters", cluster_name, "backup", "snapshots"],
            ApiVersion::V20230101,
            options,
            &[],
        )
        .await
    }

    async fn list_flex_snapshots(
        &self,
        project_id: &str,
        cluster_name: &str,
        options: &ListOptions,
    ) -> Result<Paginated<FlexSnapshot>, AtlasError> {
        self.require_atlas()?;
        self.list(
            &["groups", project_id, "flexClusters", cluster_name, "backupSnapshots"],
            ApiVersion::V20241113,
            options,
            &[],
        )
        .await
    }
}

#[async_trait]
impl SnapshotDescriber for AtlasClient {
    async fn describe_snapshot(
        &self,
        project_id: &str,
        cluster_name: &str,
        snapshot_id: &str,
    ) -> Result<Snapshot, AtlasError> {
        self.require_atlas()?;
        self.get(
            &[
                "groups",
                project_id,
                "clusters",
                cluster_name,
                "backup",
                "snapshots",
                snapshot_id,
            ],
            ApiVersion::V20230101,
            &[],
        )
        .await
    }

    async fn describe_flex_snapshot(
        &self,
        project_id: &str,
        cluster_name: &str,
        snapshot_id: &str,
    ) -> Result<FlexSnapshot, AtlasError> {
        self.require_atlas()?;
        self.get(
            &[
                "groups",
                project_id,
                "flexClusters",
                cluster_name,
                "backupSnapshots",
                snapshot_id,
            ],
            ApiVersion::V20241113,
            &[],
        )
        .await
    }
}

#[async_trait]
impl SnapshotCreator for AtlasClient {
    async fn create_snapshot(
        &self,
        project_id: &str,
        cluster_name: &str,
        request: &SnapshotRequest,
    ) -> Result<Snapshot, AtlasError> {
        self.require_atlas()?;
        self.post(
            &["groups", project_id, "clusters", cluster_name, "backup", "snapshots"],
            ApiVersion::V20230101,
            request,
        )
        .await
    }
}

#[async_trait]
impl SnapshotDeleter for AtlasClient {
    async fn delete_snapshot(
        &self,
        project_id: &str,
        cluster_name: &str,
        snapshot_id: &str,
    ) -> Result<(), AtlasError> {
        self.require_atlas()?;
        self.delete(
            &[
                "groups",
                project_id,
                "clusters",
                cluster_name,
                "backup",
                "snapshots",
                snapshot_id,
            ],
            ApiVersion::V20230101,
            &[],
        )
        .await
    }
}

#[async_trait]
impl RestoreJobLister for AtlasClient {
    async fn list_restore_jobs(
        &self,
        project_id: &str,
        cluster_name: &str,
        options: &ListOptions,
    ) -> Result<Paginated<RestoreJob>, AtlasError> {
        self.require_atlas()?;
        self.list(
            &["groups", project_id, "clusters", cluster_name, "backup", "restoreJobs"],
            ApiVersion::V20230101,
            options,
            &[],
        )
        .await
    }

    async fn list_flex_restore_jobs(
        &self,
        project_id: &str,
        cluster_name: &str,
        options: &ListOptions,
    ) -> Result<Paginated<FlexRestoreJob>, AtlasError> {
        self.require_atlas()?;
        self.list(
            &["groups", project_id, "flexClusters", cluster_name, "backupRestoreJobs"],
            ApiVersion::V20241113,
            options,
            &[],
        )
        .await
    }
}

#[async_trait]
impl RestoreJobDescriber for AtlasClient {
    async fn describe_restore_job(
        &self,
        project_id: &str,
        cluster_name: &str,
        job_id: &str,
    ) -> Result<RestoreJob, AtlasError> {
        self.require_atlas()?;
        self.get(
            &[
                "groups",
                project_id,
                "clusters",
                cluster_name,
                "backup",
                "restoreJobs",
                job_id,
            ],
            ApiVersion::V20230101,
            &[],
        )
        .await
    }

    async fn describe_flex_restore_job(
        &self,
        project_id: &str,
        cluster_name: &str,
        job_id: &str,
    ) -> Result<FlexRestoreJob, AtlasError> {
        self.require_atlas()?;
        self.get(
            &[
                "groups",
                project_id,
                "flexClusters",
                cluster_name,
                "backupRestoreJobs",
                job_id,
            ],
            ApiVersion::V20241113,
            &[],
        )
        .await
    }
}

#[async_trait]
impl RestoreJobCreator for AtlasClient {
    async fn create_restore_job(
        &self,
        project_id: &str,
        cluster_name: &str,
        job: &RestoreJob,
    ) -> Result<RestoreJob, AtlasError> {
        self.require_atlas()?;
        self.post(
            &["groups", project_id, "clusters", cluster_name, "backup", "restoreJobs"],
            ApiVersion::V20230101,
            job,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{client::Credentials, config::Service};

    #[tokio::test]
    async fn test_describe_flex_snapshot() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock(
                "GET",
                "/api/atlas/v2/groups/5e2211c17a3e5a48f5497de3/flexClusters/flex0/backupSnapshots/snap1",
            )
            .match_header("accept", "application/vnd.atlas.2024-11-13+json")
            .with_status(200)
            .with_body(json!({"id": "snap1", "status": "PENDING"}).to_string())
            .create_async()
            .await;

        let client = AtlasClient::new(
            &server.url(),
            Service::Cloud,
            Credentials::AccessToken("token".to_string()),
        )
        .unwrap();
        let snapshot = client
            .describe_flex_snapshot("5e2211c17a3e5a48f5497de3", "flex0", "snap1")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(snapshot.status(), "PENDING");
    }
}
