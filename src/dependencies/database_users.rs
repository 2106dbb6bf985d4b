use async_trait::async_trait;

use crate::{
    client::{ApiVersion, AtlasClient, AtlasError, ListOptions, Paginated},
    models::DatabaseUser,
};

#[async_trait]
pub trait DatabaseUserLister {
    async fn list_database_users(
        &self,
        project_id: &str,
        options: &ListOptions,
    ) -> Result<Paginated<DatabaseUser>, AtlasError>;
}

#[async_trait]
pub trait DatabaseUserDescriber {
    async fn describe_database_user(
        &self,
        project_id: &str,
        auth_db: &str,
        username: &str,
    ) -> Result<DatabaseUser, AtlasError>;
}

#[async_trait]
pub trait DatabaseUserCreator {
    async fn create_database_user(
        &self,
        project_id: &str,
        user: &DatabaseUser,
    ) -> Result<DatabaseUser, AtlasError>;
}

#[async_trait]
pub trait DatabaseUserUpdater {
    async fn update_database_user(
        &self,
        project_id: &str,
        auth_db: &str,
        username: &str,
        user: &DatabaseUser,
    ) -> Result<DatabaseUser, AtlasError>;
}

#[async_trait]
pub trait DatabaseUserDeleter {
    async fn delete_database_user(
        &self,
        project_id: &str,
        auth_db: &str,
        username: &str,
    ) -> Result<(), AtlasError>;
}

#[async_trait]
impl DatabaseUserLister for AtlasClient {
    async fn list_database_users(
        &self,
        project_id: &str,
        options: &ListOptions,
    ) -> Result<Paginated<DatabaseUser>, AtlasError> {
        self.require_atlas()?;
        self.list(
            &["groups", project_id, "databaseUsers"],
            ApiVersion::V20230101,
            options,
            &[],
        )
        .await
    }
}

#[async_trait]
impl DatabaseUserDescriber for AtlasClient {
    async fn describe_database_user(
        &self,
        project_id: &str,
        auth_db: &str,
        username: &str,
    ) -> Result<DatabaseUser, AtlasError> {
        self.require_atlas()?;
        self.get(
            &["groups", project_id, "databaseUsers", auth_db, username],
            ApiVersion::V20230101,
            &[],
        )
        .await
    }
}

#[async_trait]
impl DatabaseUserCreator for AtlasClient {
    async fn create_database_user(
        &self,
        project_id: &str,
        user: &DatabaseUser,
    ) -> Result<DatabaseUser, AtlasError> {
        self.require_atlas()?;
        self.post(
            &["groups", project_id, "databaseUsers"],
            ApiVersion::V20230101,
            user,
        )
        .await
    }
}

#[async_trait]
impl DatabaseUserUpdater for AtlasClient {
    async fn update_database_user(
        &self,
        project_id: &str,
        auth_db: &str,
        username: &str,
        user: &DatabaseUser,
    ) -> Result<DatabaseUser, AtlasError> {
        self.require_atlas()?;
        self.patch(
            &["groups", project_id, "databaseUsers", auth_db, username],
            ApiVersion::V20230101,
            user,
        )
        .await
    }
}

#[async_trait]
impl DatabaseUserDeleter for AtlasClient {
    async fn delete_database_user(
        &self,
        project_id: &str,
        auth_db: &str,
        username: &str,
    ) -> Result<(), AtlasError> {
        self.require_atlas()?;
        self.delete(
            &["groups", project_id, "databaseUsers", auth_db, username],
            ApiVersion::V20230101,
            &[],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{client::Credentials, config::Service};

    #[tokio::test]
    async fn test_delete_database_user_path() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock(
                "DELETE",
                "/api/atlas/v2/groups/5e2211c17a3e5a48f5497de3/databaseUsers/$external/CN=app",
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
            .delete_database_user("5e2211c17a3e5a48f5497de3", "$external", "CN=app")
            .await
            .unwrap();

        mock.assert_async().await;
    }
}
