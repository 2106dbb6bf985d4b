use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::{
    args::clusters as args,
    commands::{
        CommandWithOutput,
        with_atlas::{AtlasContext, TryFromWithAtlasClient},
    },
    dependencies::{ClusterDescriber, ClusterShape},
    models::AutoScalingMode,
    template::Templated,
};

use super::{
    ASYMMETRIC_SHARD_UNSUPPORTED, AnyCluster, CANNOT_USE_FLEX_CLUSTER_IN_CLUSTER_API,
    DESCRIBE_TEMPLATE,
};

pub struct Describe {
    store: Box<dyn ClusterDescriber + Send + Sync>,
    project_id: String,
    name: String,
    shape: ClusterShape,
}

impl TryFromWithAtlasClient<args::Describe> for Describe {
    fn try_from_with_atlas(args: args::Describe, context: &AtlasContext) -> Result<Self> {
        Ok(Self {
            store: Box::new(context.client.clone()),
            project_id: context.project_id(args.project.project_id)?,
            name: args.name,
            shape: args.auto_scaling_mode.unwrap_or_default().into(),
        })
    }
}

/// Describe a cluster in `shape`, falling back to the flex API or the independent shard scaling
/// shape when the API reports the cluster can't be described in that shape.
pub async fn describe_any_cluster<C>(
    store: &C,
    project_id: &str,
    name: &str,
    shape: ClusterShape,
) -> Result<AnyCluster>
where
    C: ClusterDescriber + Send + Sync + ?Sized,
{
    match store.describe_cluster(project_id, name, shape).await {
        Ok(cluster) => Ok(AnyCluster::Dedicated(cluster)),
        Err(err) if err.has_error_code(CANNOT_USE_FLEX_CLUSTER_IN_CLUSTER_API) => {
            debug!(name, "describing flex cluster");
            let cluster = store
                .describe_flex_cluster(project_id, name)
                .await
                .with_context(|| format!("describing flex cluster '{name}'"))?;
            Ok(AnyCluster::Flex(cluster))
        }
        Err(err)
            if err.has_error_code(ASYMMETRIC_SHARD_UNSUPPORTED)
                && shape == ClusterShape::ClusterWideScaling =>
        {
            debug!(name, "describing cluster with independent shard scaling");
            let cluster = store
                .describe_cluster(project_id, name, AutoScalingMode::IndependentShardScaling.into())
                .await
                .with_context(|| format!("describing cluster '{name}'"))?;
            Ok(AnyCluster::Dedicated(cluster))
        }
        Err(err) => Err(err).with_context(|| format!("describing cluster '{name}'")),
    }
}

#[async_trait]
impl CommandWithOutput for Describe {
    type Output = Templated<AnyCluster>;

    async fn execute(&mut self) -> Result<Self::Output> {
        let cluster =
            describe_any_cluster(self.store.as_ref(), &self.project_id, &self.name, self.shape)
                .await?;

        Ok(Templated::new(DESCRIBE_TEMPLATE, cluster))
    }
}
