use async_trait::async_trait;

use crate::{
    client::{ApiVersion, AtlasClient, AtlasError},
    models::DataFederation,
};

#[async_trait]
pub trait DataFederationLister {
    /// `data_type` filters on `USER` or `ONLINE_ARCHIVE` instances.
    async fn list_data_federations(
        &self,
        project_id: &str,
        data_type: Option<String>,
    ) -> Result<Vec<DataFederation>, AtlasError>;
}

#[async_trait]
pub trait DataFederationDescriber {
    async fn describe_data_federation(
        &self,
        project_id: &str,
        name: &str,
    ) -> Result<DataFederation, AtlasError>;
}

#[async_trait]
pub trait DataFederationCreator {
    async fn create_data_federation(
        &self,
        project_id: &str,
        federation: &DataFederation,
    ) -> Result<DataFederation, AtlasError>;
}

#[async_trait]
pub trait DataFederationDeleter {
    async fn delete_data_federation(&self, project_id: &str, name: &str)
    -> Result<(), AtlasError>;
}

#[async_trait]
impl DataFederationLister for AtlasClient {
    async fn list_data_federations(
        &self,
        project_id: &str,
        data_type: Option<String>,
    ) -> Result<Vec<DataFederation>, AtlasError> {
        self.require_atlas()?;
        let query: Vec<(&str, String)> = data_type.into_iter().map(|t| ("type", t)).collect();
        self.get(
            &["groups", project_id, "dataFederation"],
            ApiVersion::V20230101,
            &query,
        )
        .await
    }
}

#[async_trait]
impl DataFederationDescriber for AtlasClient {
    async fn describe_data_federation(
        &self,
        project_id: &str,
        name: &str,
    ) -> Result<DataFederation, AtlasError> {
        self.require_atlas()?;
        self.get(
            &["groups", project_id, "dataFederation", name],
            ApiVersion::V20230101,
            &[],
        )
        .await
    }
}

#[async_trait]
impl DataFederationCreator for AtlasClient {
    async fn create_data_federation(
        &self,
        project_id: &str,
        federation: &DataFederation,
    ) -> Result<DataFederation, AtlasError> {
        self.require_atlas()?;
        self.post(
            &["groups", project_id, "dataFederation"],
            ApiVersion::V20230101,
            federation,
        )
        .await
    }
}

#[async_trait]
impl DataFederationDeleter for AtlasClient {
    async fn delete_data_federation(
        &self,
        project_id: &str,
        name: &str,
    ) -> Result<(), AtlasError> {
        self.require_atlas()?;
        self.delete(
            &["groups", project_id, "dataFederation", name],
            ApiVersion::V20230101,
            &[],
        )
        .await
    }
}
