use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

use crate::{
    args::access_lists as args,
    client::{ListOptions, Paginated},
    commands::{
        CommandWithOutput,
        delete::{DeleteInteraction, DeleteResult, ResourceKind, confirm_deletion, delete_question},
        with_atlas::{AtlasContext, TryFromWithAtlasClient},
    },
    dependencies::{AccessListCreator, AccessListDeleter, AccessListDescriber, AccessListLister},
    interaction::Interaction,
    models::AccessListEntry,
    template::Templated,
};

const LIST_TEMPLATE: &str = "CIDR BLOCK\tAWS SECURITY GROUP{{range .results}}\n{{.cidrBlock}}\t{{.awsSecurityGroup}}{{end}}\n";
const DESCRIBE_TEMPLATE: &str = "CIDR BLOCK\tAWS SECURITY GROUP\n{{.cidrBlock}}\t{{.awsSecurityGroup}}\n";
const CREATE_TEMPLATE: &str = "Created new IP access list entry(s).\n";

pub struct List {
    store: Box<dyn AccessListLister + Send + Sync>,
    project_id: String,
    options: ListOptions,
}

impl TryFromWithAtlasClient<args::List> for List {
    fn try_from_with_atlas(args: args::List, context: &AtlasContext) -> Result<Self> {
        Ok(Self {
            store: Box::new(context.client.clone()),
            project_id: context.project_id(args.project.project_id)?,
            options: ListOptions::from(&args.list),
        })
    }
}

#[async_trait]
impl CommandWithOutput for List {
    type Output = Templated<Paginated<AccessListEntry>>;

    async fn execute(&mut self) -> Result<Self::Output> {
        let page = self
            .store
            .list_access_list(&self.project_id, &self.options)
            .await
            .context("listing IP access list")?;

        Ok(Templated::new(LIST_TEMPLATE, page))
    }
}

pub struct Describe {
    store: Box<dyn AccessListDescriber + Send + Sync>,
    project_id: String,
    entry: String,
}

impl TryFromWithAtlasClient<args::Describe> for Describe {
    fn try_from_with_atlas(args: args::Describe, context: &AtlasContext) -> Result<Self> {
        Ok(Self {
            store: Box::new(context.client.clone()),
            project_id: context.project_id(args.project.project_id)?,
            entry: args.entry,
        })
    }
}

#[async_trait]
impl CommandWithOutput for Describe {
    type Output = Templated<AccessListEntry>;

    async fn execute(&mut self) -> Result<Self::Output> {
        let entry = self
            .store
            .describe_access_list_entry(&self.project_id, &self.entry)
            .await
            .with_context(|| format!("describing IP access list entry '{}'", self.entry))?;

        Ok(Templated::new(DESCRIBE_TEMPLATE, entry))
    }
}

pub struct Create {
    store: Box<dyn AccessListCreator + Send + Sync>,
    project_id: String,
    entry: AccessListEntry,
}

impl TryFromWithAtlasClient<args::Create> for Create {
    fn try_from_with_atlas(args: args::Create, context: &AtlasContext) -> Result<Self> {
        let project_id = context.project_id(args.project.project_id)?;
        let mut entry = args
            .entry_type
            .build_entry(args.entry, args.comment, args.delete_after);
        entry.group_id = Some(project_id.clone());

        Ok(Self {
            store: Box::new(context.client.clone()),
            project_id,
            entry,
        })
    }
}

#[async_trait]
impl CommandWithOutput for Create {
    type Output = Templated<Paginated<AccessListEntry>>;

    async fn execute(&mut self) -> Result<Self::Output> {
        info!(entry = self.entry.entry(), "adding IP access list entry");
        let page = self
            .store
            .create_access_list_entries(&self.project_id, std::slice::from_ref(&self.entry))
            .await
            .with_context(|| format!("creating IP access list entry '{}'", self.entry.entry()))?;

        Ok(Templated::new(CREATE_TEMPLATE, page))
    }
}

pub struct Delete {
    store: Box<dyn AccessListDeleter + Send + Sync>,
    interaction: Box<dyn DeleteInteraction>,
    project_id: String,
    entry: String,
    force: bool,
}

impl TryFromWithAtlasClient<args::Delete> for Delete {
    fn try_from_with_atlas(args: args::Delete, context: &AtlasContext) -> Result<Self> {
        Ok(Self {
            store: Box::new(context.client.clone()),
            interaction: Box::new(Interaction::new()),
            project_id: context.project_id(args.project.project_id)?,
            entry: args.entry,
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
            delete_question(&self.entry),
            None,
        )?;
        if !confirmed {
            return Ok(DeleteResult::Canceled {
                resource: ResourceKind::AccessListEntry,
                name: self.entry.clone(),
            });
        }

        self.store
            .delete_access_list_entry(&self.project_id, &self.entry)
            .await
            .with_context(|| format!("deleting IP access list entry '{}'", self.entry))?;

        Ok(DeleteResult::Deleted {
            resource: ResourceKind::AccessListEntry,
            name: self.entry.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dependencies::mocks::MockAtlas,
        interaction::{ConfirmationPromptResult, mocks::MockInteraction},
        models::AccessListEntryType,
    };

    const PROJECT_ID: &str = "5e2211c17a3e5a48f5497de3";

    fn cidr(block: &str) -> AccessListEntry {
        AccessListEntry {
            group_id: Some(PROJECT_ID.to_string()),
            cidr_block: Some(block.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_list_entries() {
        let mut store = MockAtlas::new();
        store.expect_list_access_list().return_once(|_, _| {
            Ok(Paginated::new(vec![
                cidr("10.0.0.0/24"),
                AccessListEntry {
                    aws_security_group: Some("sg-0123456789".to_string()),
                    ..Default::default()
                },
            ]))
        });

        let output = List {
            store: Box::new(store),
            project_id: PROJECT_ID.to_string(),
            options: ListOptions::default(),
        }
        .execute()
        .await
        .unwrap();

        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["results"][0]["cidrBlock"], "10.0.0.0/24");
        assert_eq!(json["results"][1]["awsSecurityGroup"], "sg-0123456789");
        assert!(output.to_string().starts_with("CIDR BLOCK     AWS SECURITY GROUP\n10.0.0.0/24"));
    }

    #[tokio::test]
    async fn test_describe_cidr_entry() {
        let mut store = MockAtlas::new();
        store
            .expect_describe_access_list_entry()
            .withf(|_, entry| entry == "10.0.0.0/24")
            .return_once(|_, entry| Ok(cidr(entry)));

        let output = Describe {
            store: Box::new(store),
            project_id: PROJECT_ID.to_string(),
            entry: "10.0.0.0/24".to_string(),
        }
        .execute()
        .await
        .unwrap();

        assert_eq!(output.value, cidr("10.0.0.0/24"));
    }

    #[tokio::test]
    async fn test_create_entry() {
        let entry = AccessListEntryType::IpAddress.build_entry(
            "192.0.2.15".to_string(),
            Some("office".to_string()),
            None,
        );
        let expected = entry.clone();
        let mut store = MockAtlas::new();
        store
            .expect_create_access_list_entries()
            .withf(move |project, entries| project == PROJECT_ID && entries == [expected.clone()])
            .return_once(|_, entries| Ok(Paginated::new(entries.to_vec())));

        let output = Create {
            store: Box::new(store),
            project_id: PROJECT_ID.to_string(),
            entry,
        }
        .execute()
        .await
        .unwrap();

        assert_eq!(output.to_string(), "Created new IP access list entry(s).\n");
    }

    #[tokio::test]
    async fn test_delete_canceled() {
        let mut store = MockAtlas::new();
        store.expect_delete_access_list_entry().never();
        let mut interaction = MockInteraction::new();
        interaction
            .expect_confirm()
            .return_once(|_| Ok(ConfirmationPromptResult::Canceled));

        let output = Delete {
            store: Box::new(store),
            interaction: Box::new(interaction),
            project_id: PROJECT_ID.to_string(),
            entry: "10.0.0.0/24".to_string(),
            force: false,
        }
        .execute()
        .await
        .unwrap();

        assert_eq!(output.to_string(), "Access list entry not deleted");
    }
}
