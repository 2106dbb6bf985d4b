use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::{
    args::clusters as args,
    commands::{
        CommandWithOutput,
        with_atlas::{AtlasContext, TryFromWithAtlasClient},
    },
    dependencies::AutoScalingConfigDescriber,
    models::AutoScalingConfig,
    template::Templated,
};

const AUTO_SCALING_TEMPLATE: &str = "{{.autoScalingMode}}\n";

pub struct DescribeAutoScalingConfig {
    store: Box<dyn AutoScalingConfigDescriber + Send + Sync>,
    project_id: String,
    name: String,
}

impl TryFromWithAtlasClient<args::AutoScalingConfig> for DescribeAutoScalingConfig {
    fn try_from_with_atlas(args: args::AutoScalingConfig, context: &AtlasContext) -> Result<Self> {
        Ok(Self {
            store: Box::new(context.client.clone()),
            project_id: context.project_id(args.project.project_id)?,
            name: args.name,
        })
    }
}

#[async_trait]
impl CommandWithOutput for DescribeAutoScalingConfig {
    type Output = Templated<AutoScalingConfig>;

    async fn execute(&mut self) -> Result<Self::Output> {
        let config = self
            .store
            .describe_auto_scaling_config(&self.project_id, &self.name)
            .await
            .with_context(|| format!("describing auto scaling config of cluster '{}'", self.name))?;

        Ok(Templated::new(AUTO_SCALING_TEMPLATE, config))
    }
}
