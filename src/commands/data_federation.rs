use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

use crate::{
    args::data_federation as args,
    commands::{
        CommandWithOutput,
        delete::{DeleteInteraction, DeleteResult, ResourceKind, confirm_deletion, delete_question},
        with_atlas::{AtlasContext, TryFromWithAtlasClient},
    },
    dependencies::{
        DataFederationCreator, DataFederationDeleter, DataFederationDescriber,
        DataFederationLister,
    },
    interaction::Interaction,
    models::{
        AwsCloudProviderConfig, DataFederation, DataFederationCloudProviderConfig,
        DataProcessRegion,
    },
    template::Templated,
};

const LIST_TEMPLATE: &str = "NAME\tSTATE{{range .}}\n{{.name}}\t{{.state}}{{end}}\n";
const DESCRIBE_TEMPLATE: &str = "NAME\tSTATE\n{{.name}}\t{{.state}}\n";
const CREATE_TEMPLATE: &str = "Data federation '{{.name}}' created.\n";

// Data federation only processes data in AWS regions.
const DATA_PROCESS_PROVIDER: &str = "AWS";

pub struct List {
    store: Box<dyn DataFederationLister + Send + Sync>,
    project_id: String,
    data_type: Option<String>,
}

impl TryFromWithAtlasClient<args::List> for List {
    fn try_from_with_atlas(args: args::List, context: &AtlasContext) -> Result<Self> {
        Ok(Self {
            store: Box::new(context.client.clone()),
            project_id: context.project_id(args.project.project_id)?,
            data_type: args.data_type,
        })
    }
}

#[async_trait]
impl CommandWithOutput for List {
    type Output = Templated<Vec<DataFederation>>;

    async fn execute(&mut self) -> Result<Self::Output> {
        let instances = self
            .store
            .list_data_federations(&self.project_id, self.data_type.clone())
            .await
            .context("listing federated database instances")?;

        Ok(Templated::new(LIST_TEMPLATE, instances))
    }
}

pub struct Describe {
    store: Box<dyn DataFederationDescriber + Send + Sync>,
    project_id: String,
    name: String,
}

impl TryFromWithAtlasClient<args::Describe> for Describe {
    fn try_from_with_atlas(args: args::Describe, context: &AtlasContext) -> Result<Self> {
        Ok(Self {
            store: Box::new(context.client.clone()),
            project_id: context.project_id(args.project.project_id)?,
            name: args.name,
        })
    }
}

#[async_trait]
impl CommandWithOutput for Describe {
    type Output = Templated<DataFederation>;

    async fn execute(&mut self) -> Result<Self::Output> {
        let instance = self
            .store
            .describe_data_federation(&self.project_id, &self.name)
            .await
            .with_context(|| format!("describing federated database instance '{}'", self.name))?;

        Ok(Templated::new(DESCRIBE_TEMPLATE, instance))
    }
}

pub struct Create {
    store: Box<dyn DataFederationCreator + Send + Sync>,
    project_id: String,
    request: DataFederation,
}

/// Request body of `dataFederation create`.
pub fn federation_request(args: &args::Create) -> DataFederation {
    let aws = (args.aws_role_id.is_some() || args.aws_test_s3_bucket.is_some()).then(|| {
        DataFederationCloudProviderConfig {
            aws: Some(AwsCloudProviderConfig {
                role_id: args.aws_role_id.clone(),
                test_s3_bucket: args.aws_test_s3_bucket.clone(),
            }),
        }
    });

    DataFederation {
        name: args.name.clone(),
        cloud_provider_config: aws,
        data_process_region: args.region.as_ref().map(|region| DataProcessRegion {
            cloud_provider: DATA_PROCESS_PROVIDER.to_string(),
            region: region.clone(),
        }),
        ..Default::default()
    }
}

impl TryFromWithAtlasClient<args::Create> for Create {
    fn try_from_with_atlas(args: args::Create, context: &AtlasContext) -> Result<Self> {
        Ok(Self {
            store: Box::new(context.client.clone()),
            project_id: context.project_id(args.project.project_id.clone())?,
            request: federation_request(&args),
        })
    }
}

#[async_trait]
impl CommandWithOutput for Create {
    type Output = Templated<DataFederation>;

    async fn execute(&mut self) -> Result<Self::Output> {
        info!(name = %self.request.name, "creating federated database instance");
        let instance = self
            .store
            .create_data_federation(&self.project_id, &self.request)
            .await
            .with_context(|| format!("creating federated database instance '{}'", self.request.name))?;

        Ok(Templated::new(CREATE_TEMPLATE, instance))
    }
}

pub struct Delete {
    store: Box<dyn DataFederationDeleter + Send + Sync>,
    interaction: Box<dyn DeleteInteraction>,
    project_id: String,
    name: String,
    force: bool,
}

impl TryFromWithAtlasClient<args::Delete> for Delete {
    fn try_from_with_atlas(args: args::Delete, context: &AtlasContext) -> Result<Self> {
        Ok(Self {
            store: Box::new(context.client.clone()),
            interaction: Box::new(Interaction::new()),
            project_id: context.project_id(args.project.project_id)?,
            name: args.name,
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
            delete_question(&self.name),
            None,
        )?;
        if !confirmed {
            return Ok(DeleteResult::Canceled {
                resource: ResourceKind::FederatedDatabaseInstance,
                name: self.name.clone(),
            });
        }

        self.store
            .delete_data_federation(&self.project_id, &self.name)
            .await
            .with_context(|| format!("deleting federated database instance '{}'", self.name))?;

        Ok(DeleteResult::Deleted {
            resource: ResourceKind::FederatedDatabaseInstance,
            name: self.name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{args::ProjectArgs, dependencies::mocks::MockAtlas};

    const PROJECT_ID: &str = "5e2211c17a3e5a48f5497de3";

    fn instance(name: &str) -> DataFederation {
        DataFederation {
            name: name.to_string(),
            state: Some("ACTIVE".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_federation_request() {
        let args = args::Create {
            name: "lake".to_string(),
            project: ProjectArgs { project_id: None },
            aws_role_id: Some("role-1".to_string()),
            aws_test_s3_bucket: Some("bucket".to_string()),
            region: Some("VIRGINIA_USA".to_string()),
        };

        assert_eq!(
            serde_json::to_value(federation_request(&args)).unwrap(),
            json!({
                "name": "lake",
                "cloudProviderConfig": {"aws": {"roleId": "role-1", "testS3Bucket": "bucket"}},
                "dataProcessRegion": {"cloudProvider": "AWS", "region": "VIRGINIA_USA"}
            })
        );

        let bare = args::Create {
            aws_role_id: None,
            aws_test_s3_bucket: None,
            region: None,
            ..args
        };
        assert_eq!(
            serde_json::to_value(federation_request(&bare)).unwrap(),
            json!({"name": "lake"})
        );
    }

    #[tokio::test]
    async fn test_list_filters_by_type() {
        let mut store = MockAtlas::new();
        store
            .expect_list_data_federations()
            .withf(|_, data_type| data_type.as_deref() == Some("ONLINE_ARCHIVE"))
            .return_once(|_, _| Ok(vec![instance("archive")]));

        let output = List {
            store: Box::new(store),
            project_id: PROJECT_ID.to_string(),
            data_type: Some("ONLINE_ARCHIVE".to_string()),
        }
        .execute()
        .await
        .unwrap();

        assert_eq!(output.to_string(), "NAME       STATE\narchive    ACTIVE\n");
    }

    #[tokio::test]
    async fn test_describe_instance() {
        let mut store = MockAtlas::new();
        store
            .expect_describe_data_federation()
            .return_once(|_, name| Ok(instance(name)));

        let output = Describe {
            store: Box::new(store),
            project_id: PROJECT_ID.to_string(),
            name: "lake".to_string(),
        }
        .execute()
        .await
        .unwrap();

        assert_eq!(output.to_string(), "NAME    STATE\nlake    ACTIVE\n");
    }

    #[tokio::test]
    async fn test_create_instance() {
        let mut store = MockAtlas::new();
        store
            .expect_create_data_federation()
            .withf(|project, request| project == PROJECT_ID && request.name == "lake")
            .return_once(|_, request| Ok(request.clone()));

        let output = Create {
            store: Box::new(store),
            project_id: PROJECT_ID.to_string(),
            request: DataFederation {
                name: "lake".to_string(),
                ..Default::default()
            },
        }
        .execute()
        .await
        .unwrap();

        assert_eq!(output.to_string(), "Data federation 'lake' created.\n");
    }

    #[tokio::test]
    async fn test_delete_instance() {
        let mut store = MockAtlas::new();
        store
            .expect_delete_data_federation()
            .withf(|_, name| name == "lake")
            .return_once(|_, _| Ok(()));

        let output = Delete {
            store: Box::new(store),
            interaction: Box::new(crate::interaction::mocks::MockInteraction::new()),
            project_id: PROJECT_ID.to_string(),
            name: "lake".to_string(),
            force: true,
        }
        .execute()
        .await
        .unwrap();

        assert_eq!(output.to_string(), "Federated database instance 'lake' deleted");
    }
}
