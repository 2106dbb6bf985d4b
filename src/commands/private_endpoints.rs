//! Private endpoint services, one command set per cloud provider.
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

use crate::{
    args::private_endpoints as args,
    commands::{
        CommandWithOutput,
        delete::{DeleteInteraction, DeleteResult, ResourceKind, confirm_deletion, delete_question},
        watch::{WatchResult, watch_with_spinner},
        with_atlas::{AtlasContext, TryFromWithAtlasClient},
    },
    dependencies::{
        PrivateEndpointCreator, PrivateEndpointDeleter, PrivateEndpointDescriber,
        PrivateEndpointLister,
    },
    interaction::{Interaction, SpinnerInteraction},
    models::{CloudProvider, PrivateEndpointService, PrivateEndpointServiceRequest},
    template::Templated,
    watchers::{
        PRIVATE_ENDPOINT_AVAILABLE, PrivateEndpointStateDescriber, WatchOptions, Watcher,
    },
};

const LIST_TEMPLATE: &str = "ID\tENDPOINT SERVICE\tSTATUS\tERROR{{range .}}\n{{.id}}\t{{.endpointServiceName}}\t{{.status}}\t{{.errorMessage}}{{end}}\n";
const DESCRIBE_TEMPLATE: &str = "ID\tENDPOINT SERVICE\tSTATUS\tERROR\n{{.id}}\t{{.endpointServiceName}}\t{{.status}}\t{{.errorMessage}}\n";
const CREATE_TEMPLATE: &str = "Private endpoint '{{.id}}' created.\n";

pub struct List {
    store: Box<dyn PrivateEndpointLister + Send + Sync>,
    project_id: String,
    provider: CloudProvider,
}

impl TryFromWithAtlasClient<(CloudProvider, args::List)> for List {
    fn try_from_with_atlas(
        (provider, args): (CloudProvider, args::List),
        context: &AtlasContext,
    ) -> Result<Self> {
        Ok(Self {
            store: Box::new(context.client.clone()),
            project_id: context.project_id(args.project.project_id)?,
            provider,
        })
    }
}

#[async_trait]
impl CommandWithOutput for List {
    type Output = Templated<Vec<PrivateEndpointService>>;

    async fn execute(&mut self) -> Result<Self::Output> {
        let services = self
            .store
            .list_private_endpoint_services(&self.project_id, self.provider)
            .await
            .with_context(|| format!("listing {} private endpoints", self.provider))?;

        Ok(Templated::new(LIST_TEMPLATE, services))
    }
}

pub struct Describe {
    store: Box<dyn PrivateEndpointDescriber + Send + Sync>,
    project_id: String,
    provider: CloudProvider,
    id: String,
}

impl TryFromWithAtlasClient<(CloudProvider, args::Describe)> for Describe {
    fn try_from_with_atlas(
        (provider, args): (CloudProvider, args::Describe),
        context: &AtlasContext,
    ) -> Result<Self> {
        Ok(Self {
            store: Box::new(context.client.clone()),
            project_id: context.project_id(args.project.project_id)?,
            provider,
            id: args.id,
        })
    }
}

#[async_trait]
impl CommandWithOutput for Describe {
    type Output = Templated<PrivateEndpointService>;

    async fn execute(&mut self) -> Result<Self::Output> {
        let service = self
            .store
            .describe_private_endpoint_service(&self.project_id, self.provider, &self.id)
            .await
            .with_context(|| format!("describing private endpoint '{}'", self.id))?;

        Ok(Templated::new(DESCRIBE_TEMPLATE, service))
    }
}

pub struct Create {
    store: Box<dyn PrivateEndpointCreator + Send + Sync>,
    project_id: String,
    request: PrivateEndpointServiceRequest,
}

impl TryFromWithAtlasClient<(CloudProvider, args::Create)> for Create {
    fn try_from_with_atlas(
        (provider, args): (CloudProvider, args::Create),
        context: &AtlasContext,
    ) -> Result<Self> {
        Ok(Self {
            store: Box::new(context.client.clone()),
            project_id: context.project_id(args.project.project_id)?,
            request: PrivateEndpointServiceRequest {
                provider_name: provider.as_api_str().to_string(),
                region: args.region,
            },
        })
    }
}

#[async_trait]
impl CommandWithOutput for Create {
    type Output = Templated<PrivateEndpointService>;

    async fn execute(&mut self) -> Result<Self::Output> {
        info!(
            provider = %self.request.provider_name,
            region = %self.request.region,
            "creating private endpoint service"
        );
        let service = self
            .store
            .create_private_endpoint_service(&self.project_id, &self.request)
            .await
            .context("creating private endpoint service")?;

        Ok(Templated::new(CREATE_TEMPLATE, service))
    }
}

pub struct Delete {
    store: Box<dyn PrivateEndpointDeleter + Send + Sync>,
    interaction: Box<dyn DeleteInteraction>,
    project_id: String,
    provider: CloudProvider,
    id: String,
    force: bool,
}

impl TryFromWithAtlasClient<(CloudProvider, args::Delete)> for Delete {
    fn try_from_with_atlas(
        (provider, args): (CloudProvider, args::Delete),
        context: &AtlasContext,
    ) -> Result<Self> {
        Ok(Self {
            store: Box::new(context.client.clone()),
            interaction: Box::new(Interaction::new()),
            project_id: context.project_id(args.project.project_id)?,
            provider,
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
                resource: ResourceKind::PrivateEndpoint,
                name: self.id.clone(),
            });
        }

        self.store
            .delete_private_endpoint_service(&self.project_id, self.provider, &self.id)
            .await
            .with_context(|| format!("deleting private endpoint '{}'", self.id))?;

        // Endpoint services are torn down asynchronously.
        Ok(DeleteResult::Deleting {
            resource: ResourceKind::PrivateEndpoint,
            name: self.id.clone(),
        })
    }
}

pub struct Watch {
    store: Box<dyn PrivateEndpointDescriber + Send + Sync>,
    interaction: Box<dyn SpinnerInteraction + Send + Sync>,
    project_id: String,
    provider: CloudProvider,
    id: String,
    options: WatchOptions,
}

impl TryFromWithAtlasClient<(CloudProvider, args::Watch)> for Watch {
    fn try_from_with_atlas(
        (provider, args): (CloudProvider, args::Watch),
        context: &AtlasContext,
    ) -> Result<Self> {
        Ok(Self {
            store: Box::new(context.client.clone()),
            interaction: Box::new(Interaction::new()),
            project_id: context.project_id(args.project.project_id)?,
            provider,
            id: args.id,
            options: WatchOptions::with_timeout(args.watch_timeout),
        })
    }
}

#[async_trait]
impl CommandWithOutput for Watch {
    type Output = WatchResult;

    async fn execute(&mut self) -> Result<Self::Output> {
        let describer = PrivateEndpointStateDescriber {
            client: self.store.as_ref(),
            project_id: &self.project_id,
            provider: self.provider,
            service_id: &self.id,
        };
        watch_with_spinner(
            self.interaction.as_ref(),
            "Waiting for private endpoint to be available...",
            Watcher::new(&describer, PRIVATE_ENDPOINT_AVAILABLE, self.options),
        )
        .await
        .with_context(|| format!("watching private endpoint '{}'", self.id))?;

        Ok(WatchResult::PrivateEndpointAvailable {
            id: self.id.clone(),
        })
    }
}
