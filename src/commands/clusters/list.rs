use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::{
    args::clusters as args,
    client::{ListOptions, Paginated},
    commands::{
        CommandWithOutput,
        with_atlas::{AtlasContext, TryFromWithAtlasClient},
    },
    dependencies::{AutoScalingConfigDescriber, ClusterLister, ClusterShape},
    models::{AutoScalingMode, TIER_FLEX},
    template::Templated,
};

use super::{ClusterPage, LIST_TEMPLATE};

pub trait ListClustersStore: ClusterLister + AutoScalingConfigDescriber + Send + Sync {}
impl<T: ClusterLister + AutoScalingConfigDescriber + Send + Sync> ListClustersStore for T {}

pub struct List {
    store: Box<dyn ListClustersStore>,
    project_id: String,
    options: ListOptions,
    flex: bool,
    auto_scaling_mode: Option<AutoScalingMode>,
}

impl TryFromWithAtlasClient<args::List> for List {
    fn try_from_with_atlas(args: args::List, context: &AtlasContext) -> Result<Self> {
        Ok(Self {
            store: Box::new(context.client.clone()),
            project_id: context.project_id(args.project.project_id)?,
            options: ListOptions::from(&args.list),
            flex: args
                .tier
                .is_some_and(|tier| tier.eq_ignore_ascii_case(TIER_FLEX)),
            auto_scaling_mode: args.auto_scaling_mode,
        })
    }
}

impl List {
    async fn list_independent_shard_scaling(&self) -> Result<ClusterPage> {
        let page = self
            .store
            .list_clusters(
                &self.project_id,
                ClusterShape::IndependentShardScaling,
                &self.options,
            )
            .await
            .context("listing clusters")?;

        let mut results = Vec::with_capacity(page.results.len());
        for cluster in page.results {
            let config = self
                .store
                .describe_auto_scaling_config(&self.project_id, cluster.name())
                .await
                .with_context(|| {
                    format!("describing auto scaling config of cluster '{}'", cluster.name())
                })?;

            if config.mode() == AutoScalingMode::IndependentShardScaling {
                results.push(cluster);
            } else {
                debug!(cluster = cluster.name(), "skipping cluster wide scaling cluster");
            }
        }

        Ok(ClusterPage::Dedicated(Paginated {
            total_count: page.total_count.map(|_| results.len() as u64),
            results,
        }))
    }
}

#[async_trait]
impl CommandWithOutput for List {
    type Output = Templated<ClusterPage>;

    async fn execute(&mut self) -> Result<Self::Output> {
        let page = if self.flex {
            ClusterPage::Flex(
                self.store
                    .list_flex_clusters(&self.project_id, &self.options)
                    .await
                    .context("listing flex clusters")?,
            )
        } else if self.auto_scaling_mode == Some(AutoScalingMode::IndependentShardScaling) {
            self.list_independent_shard_scaling().await?
        } else {
            ClusterPage::Dedicated(
                self.store
                    .list_clusters(
                        &self.project_id,
                        ClusterShape::ClusterWideScaling,
                        &self.options,
                    )
                    .await
                    .context("listing clusters")?,
            )
        };

        Ok(Templated::new(LIST_TEMPLATE, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        commands::clusters::test_support::PROJECT_ID,
        dependencies::mocks::MockAtlas,
        models::{AutoScalingConfig, Cluster, FlexCluster},
    };

    fn cluster(id: &str, name: &str) -> Cluster {
        Cluster {
            id: Some(id.to_string()),
            name: Some(name.to_string()),
            mongo_db_version: Some("8.0.4".to_string()),
            state_name: Some("IDLE".to_string()),
            ..Default::default()
        }
    }

    fn command(store: MockAtlas, flex: bool, mode: Option<AutoScalingMode>) -> List {
        List {
            store: Box::new(store),
            project_id: PROJECT_ID.to_string(),
            options: ListOptions::default(),
            flex,
            auto_scaling_mode: mode,
        }
    }

    #[tokio::test]
    async fn test_list_clusters() {
        let mut store = MockAtlas::new();
        store
            .expect_list_clusters()
            .withf(|project, shape, _| {
                project == PROJECT_ID && *shape == ClusterShape::ClusterWideScaling
            })
            .return_once(|_, _, _| {
                Ok(Paginated {
                    results: vec![cluster("1", "Cluster0"), cluster("22", "Cluster1")],
                    total_count: Some(2),
                })
            });

        let output = command(store, false, None).execute().await.unwrap();

        assert_eq!(
            output.to_string(),
            "ID    NAME        MDB VER    STATE\n1     Cluster0    8.0.4      IDLE\n22    Cluster1    8.0.4      IDLE\n"
        );
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["totalCount"], 2);
        assert_eq!(json["results"][1]["name"], "Cluster1");
    }

    #[tokio::test]
    async fn test_list_flex_clusters() {
        let mut store = MockAtlas::new();
        store.expect_list_clusters().never();
        store.expect_list_flex_clusters().return_once(|_, _| {
            Ok(Paginated::new(vec![FlexCluster {
                id: Some("1".to_string()),
                name: Some("flex0".to_string()),
                mongo_db_version: Some("8.0.4".to_string()),
                state_name: Some("CREATING".to_string()),
                ..Default::default()
            }]))
        });

        let output = command(store, true, None).execute().await.unwrap();

        assert!(matches!(output.value, ClusterPage::Flex(_)));
        assert!(output.to_string().contains("flex0"));
    }

    #[tokio::test]
    async fn test_list_independent_shard_scaling_filters_by_config() {
        let mut store = MockAtlas::new();
        store
            .expect_list_clusters()
            .withf(|_, shape, _| *shape == ClusterShape::IndependentShardScaling)
            .return_once(|_, _, _| {
                Ok(Paginated {
                    results: vec![cluster("1", "iss"), cluster("2", "cws")],
                    total_count: Some(2),
                })
            });
        store
            .expect_describe_auto_scaling_config()
            .times(2)
            .returning(|_, name| {
                Ok(AutoScalingConfig {
                    auto_scaling_mode: Some(
                        if name == "iss" {
                            "INDEPENDENT_SHARD_SCALING"
                        } else {
                            "CLUSTER_WIDE_SCALING"
                        }
                        .to_string(),
                    ),
                })
            });

        let output = command(store, false, Some(AutoScalingMode::IndependentShardScaling))
            .execute()
            .await
            .unwrap();

        match output.value {
            ClusterPage::Dedicated(page) => {
                assert_eq!(page.results.len(), 1);
                assert_eq!(page.results[0].name(), "iss");
                assert_eq!(page.total_count, Some(1));
            }
            ClusterPage::Flex(_) => panic!("expected dedicated clusters"),
        }
    }
}
