use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

use crate::{
    args::projects as args,
    client::{ListOptions, Paginated},
    commands::{
        CommandWithOutput,
        delete::{DeleteInteraction, DeleteResult, ResourceKind, confirm_deletion, delete_question},
        validators::validate_object_id,
        with_atlas::{AtlasContext, TryFromWithAtlasClient},
    },
    dependencies::{ProjectCreator, ProjectDeleter, ProjectDescriber, ProjectLister},
    interaction::Interaction,
    models::Project,
    template::Templated,
};

const LIST_TEMPLATE: &str =
    "ID\tNAME{{range .results}}\n{{.id}}\t{{.name}}{{end}}\n";
const DESCRIBE_TEMPLATE: &str = "ID\tNAME\n{{.id}}\t{{.name}}\n";
const CREATE_TEMPLATE: &str = "Project '{{.id}}' created.\n";

pub struct List {
    store: Box<dyn ProjectLister + Send + Sync>,
    options: ListOptions,
}

impl TryFromWithAtlasClient<args::List> for List {
    fn try_from_with_atlas(args: args::List, context: &AtlasContext) -> Result<Self> {
        Ok(Self {
            store: Box::new(context.client.clone()),
            options: ListOptions::from(&args.list),
        })
    }
}

#[async_trait]
impl CommandWithOutput for List {
    type Output = Templated<Paginated<Project>>;

    async fn execute(&mut self) -> Result<Self::Output> {
        let page = self
            .store
            .list_projects(&self.options)
            .await
            .context("listing projects")?;

        Ok(Templated::new(LIST_TEMPLATE, page))
    }
}

pub struct Describe {
    store: Box<dyn ProjectDescriber + Send + Sync>,
    id: String,
}

impl TryFromWithAtlasClient<args::Describe> for Describe {
    fn try_from_with_atlas(args: args::Describe, context: &AtlasContext) -> Result<Self> {
        validate_object_id(&args.id).context("invalid project ID")?;
        Ok(Self {
            store: Box::new(context.client.clone()),
            id: args.id,
        })
    }
}

#[async_trait]
impl CommandWithOutput for Describe {
    type Output = Templated<Project>;

    async fn execute(&mut self) -> Result<Self::Output> {
        let project = self
            .store
            .describe_project(&self.id)
            .await
            .with_context(|| format!("describing project '{}'", self.id))?;

        Ok(Templated::new(DESCRIBE_TEMPLATE, project))
    }
}

pub struct Create {
    store: Box<dyn ProjectCreator + Send + Sync>,
    request: Project,
}

impl TryFromWithAtlasClient<args::Create> for Create {
    fn try_from_with_atlas(args: args::Create, context: &AtlasContext) -> Result<Self> {
        // API keys belong to an organization, so the organization is optional here.
        let org_id = match args.org_id.or_else(|| context.profile.org_id.clone()) {
            Some(org_id) if !org_id.is_empty() => Some(context.org_id(Some(org_id))?),
            _ => None,
        };

        Ok(Self {
            store: Box::new(context.client.clone()),
            request: Project {
                name: args.name,
                org_id,
                ..Default::default()
            },
        })
    }
}

#[async_trait]
impl CommandWithOutput for Create {
    type Output = Templated<Project>;

    async fn execute(&mut self) -> Result<Self::Output> {
        info!(name = %self.request.name, "creating project");
        let project = self
            .store
            .create_project(&self.request)
            .await
            .with_context(|| format!("creating project '{}'", self.request.name))?;

        Ok(Templated::new(CREATE_TEMPLATE, project))
    }
}

pub struct Delete {
    store: Box<dyn ProjectDeleter + Send + Sync>,
    interaction: Box<dyn DeleteInteraction>,
    id: String,
    force: bool,
}

impl TryFromWithAtlasClient<args::Delete> for Delete {
    fn try_from_with_atlas(args: args::Delete, context: &AtlasContext) -> Result<Self> {
        validate_object_id(&args.id).context("invalid project ID")?;
        Ok(Self {
            store: Box::new(context.client.clone()),
            interaction: Box::new(Interaction::new()),
            id: args.id,
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
            delete_question(&self.id),
            None,
        )?;
        if !confirmed {
            return Ok(DeleteResult::Canceled {
                resource: ResourceKind::Project,
                name: self.id.clone(),
            });
        }

        self.store
            .delete_project(&self.id)
            .await
            .with_context(|| format!("deleting project '{}'", self.id))?;

        Ok(DeleteResult::Deleted {
            resource: ResourceKind::Project,
            name: self.id.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dependencies::mocks::MockAtlas,
        interaction::{ConfirmationPromptOptions, ConfirmationPromptResult, mocks::MockInteraction},
    };

    const PROJECT_ID: &str = "5e2211c17a3e5a48f5497de3";

    fn project(id: &str, name: &str) -> Project {
        Project {
            id: Some(id.to_string()),
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_list_projects() {
        let mut store = MockAtlas::new();
        store
            .expect_list_projects()
            .withf(|options| options.items_per_page == Some(2))
            .return_once(|_| {
                Ok(Paginated::new(vec![
                    project(PROJECT_ID, "Project0"),
                    project("5e2211c17a3e5a48f5497de4", "Production"),
                ]))
            });

        let output = List {
            store: Box::new(store),
            options: ListOptions {
                items_per_page: Some(2),
                ..Default::default()
            },
        }
        .execute()
        .await
        .unwrap();

        assert_eq!(
            output.to_string(),
            "ID                          NAME\n5e2211c17a3e5a48f5497de3    Project0\n5e2211c17a3e5a48f5497de4    Production\n"
        );
        assert_eq!(serde_json::to_value(&output).unwrap()["totalCount"], 2);
    }

    #[tokio::test]
    async fn test_describe_project() {
        let mut store = MockAtlas::new();
        store
            .expect_describe_project()
            .withf(|id| id == PROJECT_ID)
            .return_once(|id| Ok(project(id, "Project0")));

        let output = Describe {
            store: Box::new(store),
            id: PROJECT_ID.to_string(),
        }
        .execute()
        .await
        .unwrap();

        assert_eq!(
            output.to_string(),
            "ID                          NAME\n5e2211c17a3e5a48f5497de3    Project0\n"
        );
    }

    #[tokio::test]
    async fn test_create_project() {
        let mut store = MockAtlas::new();
        store
            .expect_create_project()
            .withf(|request| request.name == "Project0" && request.org_id.is_none())
            .return_once(|request| Ok(project(PROJECT_ID, &request.name)));

        let output = Create {
            store: Box::new(store),
            request: Project {
                name: "Project0".to_string(),
                ..Default::default()
            },
        }
        .execute()
        .await
        .unwrap();

        assert_eq!(output.to_string(), "Project '5e2211c17a3e5a48f5497de3' created.\n");
    }

    #[tokio::test]
    async fn test_delete_declined() {
        let mut store = MockAtlas::new();
        store.expect_delete_project().never();
        let mut interaction = MockInteraction::new();
        interaction
            .expect_confirm()
            .return_once(|_| Ok(ConfirmationPromptResult::No));

        let output = Delete {
            store: Box::new(store),
            interaction: Box::new(interaction),
            id: PROJECT_ID.to_string(),
            force: false,
        }
        .execute()
        .await
        .unwrap();

        assert_eq!(output.to_string(), "Project not deleted");
    }

    #[tokio::test]
    async fn test_delete_confirmed() {
        let mut store = MockAtlas::new();
        store
            .expect_delete_project()
            .withf(|id| id == PROJECT_ID)
            .return_once(|_| Ok(()));
        let mut interaction = MockInteraction::new();
        interaction
            .expect_confirm()
            .withf(|options| {
                options
                    == &ConfirmationPromptOptions::builder()
                        .message(delete_question(PROJECT_ID))
                        .default(false)
                        .build()
            })
            .return_once(|_| Ok(ConfirmationPromptResult::Yes));

        let output = Delete {
            store: Box::new(store),
            interaction: Box::new(interaction),
            id: PROJECT_ID.to_string(),
            force: false,
        }
        .execute()
        .await
        .unwrap();

        assert_eq!(output.to_string(), "Project '5e2211c17a3e5a48f5497de3' deleted");
    }
}
