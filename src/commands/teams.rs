use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

use crate::{
    args::teams as args,
    client::{ListOptions, Paginated},
    commands::{
        CommandWithOutput,
        delete::{DeleteInteraction, DeleteResult, ResourceKind, confirm_deletion, delete_question},
        with_atlas::{AtlasContext, TryFromWithAtlasClient},
    },
    dependencies::{TeamCreator, TeamDeleter, TeamDescriber, TeamLister},
    interaction::Interaction,
    models::Team,
    template::Templated,
};

const LIST_TEMPLATE: &str = "ID\tNAME{{range .results}}\n{{.id}}\t{{.name}}{{end}}\n";
const DESCRIBE_TEMPLATE: &str = "ID\tNAME\n{{.id}}\t{{.name}}\n";
const CREATE_TEMPLATE: &str = "Team '{{.name}}' created.\n";

pub struct List {
    store: Box<dyn TeamLister + Send + Sync>,
    org_id: String,
    options: ListOptions,
}

impl TryFromWithAtlasClient<args::List> for List {
    fn try_from_with_atlas(args: args::List, context: &AtlasContext) -> Result<Self> {
        Ok(Self {
            store: Box::new(context.client.clone()),
            org_id: context.org_id(args.org.org_id)?,
            options: ListOptions::from(&args.list),
        })
    }
}

#[async_trait]
impl CommandWithOutput for List {
    type Output = Templated<Paginated<Team>>;

    async fn execute(&mut self) -> Result<Self::Output> {
        let page = self
            .store
            .list_teams(&self.org_id, &self.options)
            .await
            .context("listing teams")?;

        Ok(Templated::new(LIST_TEMPLATE, page))
    }
}

/// How `teams describe` looks a team up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeamSelector {
    Id(String),
    Name(String),
}

pub struct Describe {
    store: Box<dyn TeamDescriber + Send + Sync>,
    org_id: String,
    selector: TeamSelector,
}

impl TryFromWithAtlasClient<args::Describe> for Describe {
    fn try_from_with_atlas(args: args::Describe, context: &AtlasContext) -> Result<Self> {
        // clap requires exactly one of the two flags.
        let selector = match (args.id, args.name) {
            (Some(id), _) => TeamSelector::Id(id),
            (None, Some(name)) => TeamSelector::Name(name),
            (None, None) => anyhow::bail!("either --id or --name is required"),
        };

        Ok(Self {
            store: Box::new(context.client.clone()),
            org_id: context.org_id(args.org.org_id)?,
            selector,
        })
    }
}

#[async_trait]
impl CommandWithOutput for Describe {
    type Output = Templated<Team>;

    async fn execute(&mut self) -> Result<Self::Output> {
        let team = match &self.selector {
            TeamSelector::Id(id) => self
                .store
                .describe_team(&self.org_id, id)
                .await
                .with_context(|| format!("describing team '{id}'"))?,
            TeamSelector::Name(name) => self
                .store
                .describe_team_by_name(&self.org_id, name)
                .await
                .with_context(|| format!("describing team '{name}'"))?,
        };

        Ok(Templated::new(DESCRIBE_TEMPLATE, team))
    }
}

pub struct Create {
    store: Box<dyn TeamCreator + Send + Sync>,
    org_id: String,
    team: Team,
}

impl TryFromWithAtlasClient<args::Create> for Create {
    fn try_from_with_atlas(args: args::Create, context: &AtlasContext) -> Result<Self> {
        Ok(Self {
            store: Box::new(context.client.clone()),
            org_id: context.org_id(args.org.org_id)?,
            team: Team {
                id: None,
                name: args.name,
                usernames: Some(args.usernames),
            },
        })
    }
}

#[async_trait]
impl CommandWithOutput for Create {
    type Output = Templated<Team>;

    async fn execute(&mut self) -> Result<Self::Output> {
        info!(name = %self.team.name, "creating team");
        let team = self
            .store
            .create_team(&self.org_id, &self.team)
            .await
            .with_context(|| format!("creating team '{}'", self.team.name))?;

        Ok(Templated::new(CREATE_TEMPLATE, team))
    }
}

pub struct Delete {
    store: Box<dyn TeamDeleter + Send + Sync>,
    interaction: Box<dyn DeleteInteraction>,
    org_id: String,
    id: String,
    force: bool,
}

impl TryFromWithAtlasClient<args::Delete> for Delete {
    fn try_from_with_atlas(args: args::Delete, context: &AtlasContext) -> Result<Self> {
        Ok(Self {
            store: Box::new(context.client.clone()),
            interaction: Box::new(Interaction::new()),
            org_id: context.org_id(args.org.org_id)?,
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
                resource: ResourceKind::Team,
                name: self.id.clone(),
            });
        }

        self.store
            .delete_team(&self.org_id, &self.id)
            .await
            .with_context(|| format!("deleting team '{}'", self.id))?;

        Ok(DeleteResult::Deleted {
            resource: ResourceKind::Team,
            name: self.id.clone(),
        })
    }
}
