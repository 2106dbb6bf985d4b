use async_trait::async_trait;

use crate::{
    client::{ApiVersion, AtlasClient, AtlasError},
    models::{CloudProvider, PrivateEndpointService, PrivateEndpointServiceRequest},
};

#[async_trait]
pub trait PrivateEndpointLister {
    async fn list_private_endpoint_services(
        &self,
        project_id: &str,
        provider: CloudProvider,
    ) -> Result<Vec<PrivateEndpointService>, AtlasError>;
}

#[async_trait]
pub trait PrivateEndpointDescriber {
    async fn describe_private_endpoint_service(
        &self,
        project_id: &str,
        provider: CloudProvider,
        service_id: &str,
    ) -> Result<PrivateEndpointService, AtlasError>;
}

#[async_trait]
pub trait PrivateEndpointCreator {
    async fn create_private_endpoint_service(
        &self,
        project_id: &str,
        request: &PrivateEndpointServiceRequest,
    ) -> Result<PrivateEndpointService, AtlasError>;
}

#[async_trait]
pub trait PrivateEndpointDeleter {
    async fn delete_private_endpoint_service(
        &self,
        project_id: &str,
        provider: CloudProvider,
        service_id: &str,
    ) -> Result<(), AtlasError>;
}

#[async_trait]
impl PrivateEndpointLister for AtlasClient {
    async fn list_private_endpoint_services(
        &self,
        project_id: &str,
        provider: CloudProvider,
    ) -> Result<Vec<PrivateEndpointService>, AtlasError> {
        self.require_atlas()?;
        self.get(
            &[
                "groups",
                project_id,
                "privateEndpoint",
                provider.as_api_str(),
                "endpointService",
            ],
            ApiVersion::V20230101,
            &[],
        )
        .await
    }
}

#[async_trait]
impl PrivateEndpointDescriber for AtlasClient {
    async fn describe_private_endpoint_service(
        &self,
        project_id: &str,
        provider: CloudProvider,
        service_id: &str,
    ) -> Result<PrivateEndpointService, AtlasError> {
        self.require_atlas()?;
        self.get(
            &[
                "groups",
                project_id,
                "privateEndpoint",
                provider.as_api_str(),
                "endpointService",
                service_id,
            ],
            ApiVersion::V20230101,
            &[],
        )
        .await
    }
}

#[async_trait]
impl PrivateEndpointCreator for AtlasClient {
    async fn create_private_endpoint_service(
        &self,
        project_id: &str,
        request: &PrivateEndpointServiceRequest,
    ) -> Result<PrivateEndpointService, AtlasError> {
        self.require_atlas()?;
        self.post(
            &["groups", project_id, "privateEndpoint", "endpointService"],
            ApiVersion::V20230101,
            request,
        )
        .await
    }
}

#[async_trait]
impl PrivateEndpointDeleter for AtlasClient {
    async fn delete_private_endpoint_service(
        &self,
        project_id: &str,
        provider: CloudProvider,
        service_id: &str,
    ) -> Result<(), AtlasError> {
        self.require_atlas()?;
        self.delete(
            &[
                "groups",
                project_id,
                "privateEndpoint",
                provider.as_api_str(),
                "endpointService",
                service_id,
            ],
            ApiVersion::V20230101,
            &[],
        )
        .await
    }
}
