use async_trait::async_trait;

use crate::{
    client::{ApiVersion, AtlasClient, AtlasError, ListOptions, Paginated},
    models::AccessListEntry,
};

#[async_trait]
pub trait AccessListLister {
    async fn list_access_list(
        &self,
        project_id: &str,
        options: &ListOptions,
    ) -> Result<Paginated<AccessListEntry>, AtlasError>;
}

#[async_trait]
pub trait AccessListDescriber {
    async fn describe_access_list_entry(
        &self,
        project_id: &str,
        entry: &str,
    ) -> Result<AccessListEntry, AtlasError>;
}

#[async_trait]
pub trait AccessListCreator {
    async fn create_access_list_entries(
        &self,
        project_id: &str,
        entries: &[AccessListEntry],
    ) -> Result<Paginated<AccessListEntry>, AtlasError>;
}

#[async_trait]
pub trait AccessListDeleter {
    async fn delete_access_list_entry(&self, project_id: &str, entry: &str)
    -> Result<(), AtlasError>;
}

// Entries are single path segments, so CIDR slashes are percent-encoded by the client.
#[async_trait]
impl AccessListLister for AtlasClient {
    async fn list_access_list(
        &self,
        project_id: &str,
        options: &ListOptions,
    ) -> Result<Paginated<AccessListEntry>, AtlasError> {
        self.require_atlas()?;
        self.list(
            &["groups", project_id, "accessList"],
            ApiVersion::V20230101,
            options,
            &[],
        )
        .await
    }
}

#[async_trait]
impl AccessListDescriber for AtlasClient {
    async fn describe_access_list_entry(
        &self,
        project_id: &str,
        entry: &str,
    ) -> Result<AccessListEntry, AtlasError> {
        self.require_atlas()?;
        self.get(
            &["groups", project_id, "accessList", entry],
            ApiVersion::V20230101,
            &[],
        )
        .await
    }
}

#[async_trait]
impl AccessListCreator for AtlasClient {
    async fn create_access_list_entries(
        &self,
        project_id: &str,
        entries: &[AccessListEntry],
    ) -> Result<Paginated<AccessListEntry>, AtlasError> {
        self.require_atlas()?;
        self.post(
            &["groups", project_id, "accessList"],
            ApiVersion::V20230101,
            entries,
        )
        .await
    }
}

#[async_trait]
impl AccessListDeleter for AtlasClient {
    async fn delete_access_list_entry(
        &self,
        project_id: &str,
        entry: &str,
    ) -> Result<(), AtlasError> {
        self.require_atlas()?;
        self.delete(
            &["groups", project_id, "accessList", entry],
            ApiVersion::V20230101,
            &[],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;

    use super::*;
    use crate::{client::Credentials, config::Service};

    #[tokio::test]
    async fn test_cidr_entry_is_a_single_segment() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock(
                "DELETE",
                Matcher::Regex(r"/accessList/10\.0\.0\.0%2F24$".to_string()),
            )
            .with_status(204)
            .create_async()
            .await;

        let client = AtlasClient::new(
            &server.url(),
            Service::Cloud,
            Credentials::AccessToken("token".to_string()),
        )
        .unwrap();
        client
            .delete_access_list_entry("5e2211c17a3e5a48f5497de3", "10.0.0.0/24")
            .await
            .unwrap();

        mock.assert_async().await;
    }
}
