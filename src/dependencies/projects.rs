use async_trait::async_trait;

use crate::{
    client::{ApiVersion, AtlasClient, AtlasError, ListOptions, Paginated},
    models::Project,
};

#[async_trait]
pub trait ProjectLister {
    async fn list_projects(&self, options: &ListOptions) -> Result<Paginated<Project>, AtlasError>;
}

#[async_trait]
pub trait ProjectDescriber {
    async fn describe_project(&self, project_id: &str) -> Result<Project, AtlasError>;
}

#[async_trait]
pub trait ProjectCreator {
    async fn create_project(&self, project: &Project) -> Result<Project, AtlasError>;
}

#[async_trait]
pub trait ProjectDeleter {
    async fn delete_project(&self, project_id: &str) -> Result<(), AtlasError>;
}

// Projects are "groups" in both Atlas and Ops Manager.
#[async_trait]
impl ProjectLister for AtlasClient {
    async fn list_projects(&self, options: &ListOptions) -> Result<Paginated<Project>, AtlasError> {
        self.list(&["groups"], ApiVersion::V20230101, options, &[])
            .await
    }
}

#[async_trait]
impl ProjectDescriber for AtlasClient {
    async fn describe_project(&self, project_id: &str) -> Result<Project, AtlasError> {
        self.get(&["groups", project_id], ApiVersion::V20230101, &[])
            .await
    }
}

#[async_trait]
impl ProjectCreator for AtlasClient {
    async fn create_project(&self, project: &Project) -> Result<Project, AtlasError> {
        self.post(&["groups"], ApiVersion::V20230101, project).await
    }
}

#[async_trait]
impl ProjectDeleter for AtlasClient {
    async fn delete_project(&self, project_id: &str) -> Result<(), AtlasError> {
        self.delete(&["groups", project_id], ApiVersion::V20230101, &[])
            .await
    }
}
