use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    args::backups as args,
    client::{ListOptions, Paginated},
    commands::{
        CommandWithOutput,
        delete::{DeleteInteraction, DeleteResult, ResourceKind, confirm_deletion, delete_question},
        watch::{WatchResult, watch_with_spinner},
        with_atlas::{AtlasContext, TryFromWithAtlasClient},
    },
    dependencies::{SnapshotCreator, SnapshotDeleter, SnapshotDescriber, SnapshotLister},
    interaction::{Interaction, SpinnerInteraction},
    models::{FlexSnapshot, Snapshot, SnapshotRequest},
    template::Templated,
    watchers::{SNAPSHOT_FINISHED, SnapshotStateDescriber, WatchOptions, Watcher},
};

use super::is_dedicated_cluster_error;

const LIST_TEMPLATE: &str = "ID\tTYPE\tSTATUS\tCREATED AT\tEXPIRES AT{{range .results}}\n{{.id}}\t{{.snapshotType}}\t{{.status}}\t{{.createdAt}}\t{{.expiresAt}}{{end}}\n";
const FLEX_LIST_TEMPLATE: &str = "ID\tSTATUS\tMONGODB VERSION\tSTART TIME\tFINISH TIME\tEXPIRATION{{range .results}}\n{{.id}}\t{{.status}}\t{{.mongoDBVersion}}\t{{.startTime}}\t{{.finishTime}}\t{{.expiration}}{{end}}\n";
const DESCRIBE_TEMPLATE: &str = "ID\tTYPE\tSTATUS\tDESCRIPTION\tEXPIRES AT\n{{.id}}\t{{.snapshotType}}\t{{.status}}\t{{.description}}\t{{.expiresAt}}\n";
const FLEX_DESCRIBE_TEMPLATE: &str = "ID\tSTATUS\tMONGODB VERSION\tSTART TIME\tFINISH TIME\tEXPIRATION\n{{.id}}\t{{.status}}\t{{.mongoDBVersion}}\t{{.startTime}}\t{{.finishTime}}\t{{.expiration}}\n";
const CREATE_TEMPLATE: &str = "Snapshot '{{.id}}' created.\n";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SnapshotPage {
    Dedicated(Paginated<Snapshot>),
    Flex(Paginated<FlexSnapshot>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnySnapshot {
    Dedicated(Snapshot),
    Flex(FlexSnapshot),
}

pub struct List {
    store: Box<dyn SnapshotLister + Send + Sync>,
    project_id: String,
    cluster_name: String,
    options: ListOptions,
}

impl TryFromWithAtlasClient<args::SnapshotList> for List {
    fn try_from_with_atlas(args: args::SnapshotList, context: &AtlasContext) -> Result<Self> {
        Ok(Self {
            store: Box::new(context.client.clone()),
            project_id: context.project_id(args.project.project_id)?,
            cluster_name: args.cluster_name,
            options: ListOptions::from(&args.list),
        })
    }
}

#[async_trait]
impl CommandWithOutput for List {
    type Output = Templated<SnapshotPage>;

    async fn execute(&mut self) -> Result<Self::Output> {
        match self
            .store
            .list_flex_snapshots(&self.project_id, &self.cluster_name, &self.options)
            .await
        {
            Ok(page) => Ok(Templated::new(FLEX_LIST_TEMPLATE, SnapshotPage::Flex(page))),
            Err(err) if is_dedicated_cluster_error(&err) => {
                debug!(cluster = %self.cluster_name, "listing snapshots of dedicated cluster");
                let page = self
                    .store
                    .list_snapshots(&self.project_id, &self.cluster_name, &self.options)
                    .await
                    .context("listing snapshots")?;
                Ok(Templated::new(LIST_TEMPLATE, SnapshotPage::Dedicated(page)))
            }
            Err(err) => Err(err).context("listing snapshots"),
        }
    }
}

pub struct Describe {
    store: Box<dyn SnapshotDescriber + Send + Sync>,
    project_id: String,
    cluster_name: String,
    snapshot_id: String,
}

impl TryFromWithAtlasClient<args::SnapshotDescribe> for Describe {
    fn try_from_with_atlas(args: args::SnapshotDescribe, context: &AtlasContext) -> Result<Self> {
        Ok(Self {
            store: Box::new(context.client.clone()),
            project_id: context.project_id(args.project.project_id)?,
            cluster_name: args.cluster_name,
            snapshot_id: args.snapshot_id,
        })
    }
}

/// Describe a snapshot through the flex API, falling back to the dedicated one.
async fn describe_any_snapshot<C>(
    store: &C,
    project_id: &str,
    cluster_name: &str,
    snapshot_id: &str,
) -> Result<AnySnapshot>
where
    C: SnapshotDescriber + Send + Sync + ?Sized,
{
    match store
        .describe_flex_snapshot(project_id, cluster_name, snapshot_id)
        .await
    {
        Ok(snapshot) => Ok(AnySnapshot::Flex(snapshot)),
        Err(err) if is_dedicated_cluster_error(&err) => store
            .describe_snapshot(project_id, cluster_name, snapshot_id)
            .await
            .map(AnySnapshot::Dedicated)
            .with_context(|| format!("describing snapshot '{snapshot_id}'")),
        Err(err) => Err(err).with_context(|| format!("describing snapshot '{snapshot_id}'")),
    }
}

#[async_trait]
impl CommandWithOutput for Describe {
    type Output = Templated<AnySnapshot>;

    async fn execute(&mut self) -> Result<Self::Output> {
        let snapshot = describe_any_snapshot(
            self.store.as_ref(),
            &self.project_id,
            &self.cluster_name,
            &self.snapshot_id,
        )
        .await?;

        let template = match snapshot {
            AnySnapshot::Dedicated(_) => DESCRIBE_TEMPLATE,
            AnySnapshot::Flex(_) => FLEX_DESCRIBE_TEMPLATE,
        };
        Ok(Templated::new(template, snapshot))
    }
}

pub struct Create {
    store: Box<dyn SnapshotCreator + Send + Sync>,
    project_id: String,
    cluster_name: String,
    request: SnapshotRequest,
}

impl TryFromWithAtlasClient<args::SnapshotCreate> for Create {
    fn try_from_with_atlas(args: args::SnapshotCreate, context: &AtlasContext) -> Result<Self> {
        Ok(Self {
            store: Box::new(context.client.clone()),
            project_id: context.project_id(args.project.project_id)?,
            cluster_name: args.cluster_name,
            request: SnapshotRequest {
                description: args.description,
                retention_in_days: Some(args.retention_in_days),
            },
        })
    }
}

#[async_trait]
impl CommandWithOutput for Create {
    type Output = Templated<Snapshot>;

    async fn execute(&mut self) -> Result<Self::Output> {
        info!(cluster = %self.cluster_name, "taking on-demand snapshot");
        let snapshot = self
            .store
            .create_snapshot(&self.project_id, &self.cluster_name, &self.request)
            .await
            .with_context(|| format!("creating snapshot of cluster '{}'", self.cluster_name))?;

        Ok(Templated::new(CREATE_TEMPLATE, snapshot))
    }
}

pub struct Delete {
    store: Box<dyn SnapshotDeleter + Send + Sync>,
    interaction: Box<dyn DeleteInteraction>,
    project_id: String,
    cluster_name: String,
    snapshot_id: String,
    force: bool,
}

impl TryFromWithAtlasClient<args::SnapshotDelete> for Delete {
    fn try_from_with_atlas(args: args::SnapshotDelete, context: &AtlasContext) -> Result<Self> {
        Ok(Self {
            store: Box::new(context.client.clone()),
            interaction: Box::new(Interaction::new()),
            project_id: context.project_id(args.project.project_id)?,
            cluster_name: args.cluster_name,
            snapshot_id: args.snapshot_id,
            force: args.force,
        })
    }
}

#[async_trait]
impl CommandWithOutput for Delete {
    type Output = DeleteResult;

    async fn execute(&mut self) -> Result<Self::Output> {
        let confirmed = confirm_deletion(
            self.interaction.as_ref(),
            self.force,
            delete_question(&self.snapshot_id),
            None,
        )?;

        if !confirmed {
            return Ok(DeleteResult::Canceled {
                resource: ResourceKind::Snapshot,
                name: self.snapshot_id.clone(),
            });
        }

        self.store
            .delete_snapshot(&self.project_id, &self.cluster_name, &self.snapshot_id)
            .await
            .with_context(|| format!("deleting snapshot '{}'", self.snapshot_id))?;

        Ok(DeleteResult::Deleted {
            resource: ResourceKind::Snapshot,
            name: self.snapshot_id.clone(),
        })
    }
}

pub struct Watch {
    store: Box<dyn SnapshotDescriber + Send + Sync>,
    interaction: Box<dyn SpinnerInteraction + Send + Sync>,
    project_id: String,
    cluster_name: String,
    snapshot_id: String,
    options: WatchOptions,
}

impl TryFromWithAtlasClient<args::SnapshotWatch> for Watch {
    fn try_from_with_atlas(args: args::SnapshotWatch, context: &AtlasContext) -> Result<Self> {
        Ok(Self {
            store: Box::new(context.client.clone()),
            interaction: Box::new(Interaction::new()),
            project_id: context.project_id(args.project.project_id)?,
            cluster_name: args.cluster_name,
            snapshot_id: args.snapshot_id,
            options: WatchOptions::with_timeout(args.watch_timeout),
        })
    }
}

#[async_trait]
impl CommandWithOutput for Watch {
    type Output = WatchResult;

    async fn execute(&mut self) -> Result<Self::Output> {
        let snapshot = describe_any_snapshot(
            self.store.as_ref(),
            &self.project_id,
            &self.cluster_name,
            &self.snapshot_id,
        )
        .await?;

        let describer = SnapshotStateDescriber {
            client: self.store.as_ref(),
            project_id: &self.project_id,
            cluster_name: &self.cluster_name,
            snapshot_id: &self.snapshot_id,
            flex: matches!(snapshot, AnySnapshot::Flex(_)),
        };
        watch_with_spinner(
            self.interaction.as_ref(),
            "Waiting for snapshot to complete...",
            Watcher::new(&describer, SNAPSHOT_FINISHED, self.options),
        )
        .await
        .with_context(|| format!("watching snapshot '{}'", self.snapshot_id))?;

        Ok(WatchResult::SnapshotCompleted {
            id: self.snapshot_id.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        client::{ApiError, AtlasError},
        commands::backups::CANNOT_USE_NON_FLEX_CLUSTER_IN_FLEX_API,
        dependencies::mocks::MockAtlas,
        interaction::{SpinnerHandle, mocks::MockInteraction},
        watchers::WatchError,
    };

    const PROJECT_ID: &str = "5e2211c17a3e5a48f5497de3";

    fn not_flex() -> AtlasError {
        AtlasError::Api(ApiError::new(400, CANNOT_USE_NON_FLEX_CLUSTER_IN_FLEX_API))
    }

    fn snapshot(id: &str, status: &str) -> Snapshot {
        Snapshot {
            id: Some(id.to_string()),
            status: Some(status.to_string()),
            snapshot_type: Some("onDemand".to_string()),
            created_at: Some("2024-01-01T00:00:00Z".to_string()),
            expires_at: Some("2024-01-02T00:00:00Z".to_string()),
            description: Some("nightly".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_list_falls_back_to_dedicated() {
        let mut store = MockAtlas::new();
        store
            .expect_list_flex_snapshots()
            .return_once(|_, _, _| Err(not_flex()));
        store
            .expect_list_snapshots()
            .withf(|project, cluster, _| project == PROJECT_ID && cluster == "Cluster0")
            .return_once(|_, _, _| Ok(Paginated::new(vec![snapshot("s1", "completed")])));

        let output = List {
            store: Box::new(store),
            project_id: PROJECT_ID.to_string(),
            cluster_name: "Cluster0".to_string(),
            options: ListOptions::default(),
        }
        .execute()
        .await
        .unwrap();

        assert_eq!(
            output.to_string(),
            "ID    TYPE        STATUS       CREATED AT              EXPIRES AT\ns1    onDemand    completed    2024-01-01T00:00:00Z    2024-01-02T00:00:00Z\n"
        );
    }

    #[tokio::test]
    async fn test_list_flex_snapshots() {
        let mut store = MockAtlas::new();
        store.expect_list_flex_snapshots().return_once(|_, _, _| {
            Ok(Paginated::new(vec![FlexSnapshot {
                id: Some("f1".to_string()),
                status: Some("COMPLETED".to_string()),
                ..Default::default()
            }]))
        });
        store.expect_list_snapshots().never();

        let output = List {
            store: Box::new(store),
            project_id: PROJECT_ID.to_string(),
            cluster_name: "flex0".to_string(),
            options: ListOptions::default(),
        }
        .execute()
        .await
        .unwrap();

        assert_eq!(output.template, FLEX_LIST_TEMPLATE);
    }

    #[tokio::test]
    async fn test_list_other_errors_propagate() {
        let mut store = MockAtlas::new();
        store.expect_list_flex_snapshots().return_once(|_, _, _| {
            Err(AtlasError::Api(ApiError::new(401, "UNAUTHORIZED")))
        });
        store.expect_list_snapshots().never();

        let result = List {
            store: Box::new(store),
            project_id: PROJECT_ID.to_string(),
            cluster_name: "Cluster0".to_string(),
            options: ListOptions::default(),
        }
        .execute()
        .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_describe_dedicated_snapshot() {
        let mut store = MockAtlas::new();
        store
            .expect_describe_flex_snapshot()
            .return_once(|_, _, _| Err(not_flex()));
        store
            .expect_describe_snapshot()
            .withf(|_, _, id| id == "s1")
            .return_once(|_, _, id| Ok(snapshot(id, "completed")));

        let output = Describe {
            store: Box::new(store),
            project_id: PROJECT_ID.to_string(),
            cluster_name: "Cluster0".to_string(),
            snapshot_id: "s1".to_string(),
        }
        .execute()
        .await
        .unwrap();

        assert_eq!(output.template, DESCRIBE_TEMPLATE);
        assert!(output.to_string().contains("nightly"));
    }

    #[tokio::test]
    async fn test_create_snapshot() {
        let mut store = MockAtlas::new();
        store
            .expect_create_snapshot()
            .withf(|_, cluster, request| {
                cluster == "Cluster0"
                    && request
                        == &SnapshotRequest {
                            description: Some("before upgrade".to_string()),
                            retention_in_days: Some(3),
                        }
            })
            .return_once(|_, _, _| Ok(snapshot("s2", "queued")));

        let output = Create {
            store: Box::new(store),
            project_id: PROJECT_ID.to_string(),
            cluster_name: "Cluster0".to_string(),
            request: SnapshotRequest {
                description: Some("before upgrade".to_string()),
                retention_in_days: Some(3),
            },
        }
        .execute()
        .await
        .unwrap();

        assert_eq!(output.to_string(), "Snapshot 's2' created.\n");
    }

    #[tokio::test]
    async fn test_delete_snapshot() {
        let mut store = MockAtlas::new();
        store
            .expect_delete_snapshot()
            .withf(|_, cluster, id| cluster == "Cluster0" && id == "s1")
            .return_once(|_, _, _| Ok(()));

        let output = Delete {
            store: Box::new(store),
            interaction: Box::new(MockInteraction::new()),
            project_id: PROJECT_ID.to_string(),
            cluster_name: "Cluster0".to_string(),
            snapshot_id: "s1".to_string(),
            force: true,
        }
        .execute()
        .await
        .unwrap();

        assert_eq!(output.to_string(), "Snapshot 's1' deleted");
    }

    fn watch_command(store: MockAtlas) -> Watch {
        let mut interaction = MockInteraction::new();
        interaction
            .expect_start_spinner()
            .returning(|_| Ok(SpinnerHandle::new(Box::new(|| {}))));

        Watch {
            store: Box::new(store),
            interaction: Box::new(interaction),
            project_id: PROJECT_ID.to_string(),
            cluster_name: "Cluster0".to_string(),
            snapshot_id: "s1".to_string(),
            options: WatchOptions {
                interval: Duration::from_millis(10),
                timeout: None,
            },
        }
    }

    #[tokio::test]
    async fn test_watch_until_completed() {
        let mut store = MockAtlas::new();
        store
            .expect_describe_flex_snapshot()
            .returning(|_, _, _| Err(not_flex()));
        let mut statuses = vec!["completed", "inProgress", "queued"];
        store
            .expect_describe_snapshot()
            .times(3)
            .returning(move |_, _, id| Ok(snapshot(id, statuses.pop().unwrap_or("completed"))));

        let output = watch_command(store).execute().await.unwrap();

        assert_eq!(output.to_string(), "Snapshot changes completed.");
    }

    #[tokio::test]
    async fn test_watch_failed_snapshot() {
        let mut store = MockAtlas::new();
        store.expect_describe_flex_snapshot().returning(|_, _, _| {
            Ok(FlexSnapshot {
                status: Some("FAILED".to_string()),
                ..Default::default()
            })
        });
        store.expect_describe_snapshot().never();

        let err = watch_command(store).execute().await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<WatchError>(),
            Some(WatchError::Failed(state)) if state == "FAILED"
        ));
    }
}
