use async_trait::async_trait;

use crate::{
    client::{ApiVersion, AtlasClient, AtlasError, ListOptions, Paginated},
    models::Team,
};

#[async_trait]
pub trait TeamLister {
    async fn list_teams(
        &self,
        org_id: &str,
        options: &ListOptions,
    ) -> Result<Paginated<Team>, AtlasError>;
}

#[async_trait]
pub trait TeamDescriber {
    async fn describe_team(&self, org_id: &str, team_id: &str) -> Result<Team, AtlasError>;

    async fn describe_team_by_name(&self, org_id: &str, name: &str) -> Result<Team, AtlasError>;
}

#[async_trait]
pub trait TeamCreator {
    async fn create_team(&self, org_id: &str, team: &Team) -> Result<Team, AtlasError>;
}

#[async_trait]
pub trait TeamDeleter {
    async fn delete_team(&self, org_id: &str, team_id: &str) -> Result<(), AtlasError>;
}

#[async_trait]
impl TeamLister for AtlasClient {
    async fn list_teams(
        &self,
        org_id: &str,
        options: &ListOptions,
    ) -> Result<Paginated<Team>, AtlasError> {
        self.list(&["orgs", org_id, "teams"], ApiVersion::V20230101, options, &[])
            .await
    }
}

#[async_trait]
impl TeamDescriber for AtlasClient {
    async fn describe_team(&self, org_id: &str, team_id: &str) -> Result<Team, AtlasError> {
        self.get(&["orgs", org_id, "teams", team_id], ApiVersion::V20230101, &[])
            .await
    }

    async fn describe_team_by_name(&self, org_id: &str, name: &str) -> Result<Team, AtlasError> {
        self.get(
            &["orgs", org_id, "teams", "byName", name],
            ApiVersion::V20230101,
            &[],
        )
        .await
    }
}

#[async_trait]
impl TeamCreator for AtlasClient {
    async fn create_team(&self, org_id: &str, team: &Team) -> Result<Team, AtlasError> {
        self.post(&["orgs", org_id, "teams"], ApiVersion::V20230101, team)
            .await
    }
}

#[async_trait]
impl TeamDeleter for AtlasClient {
    async fn delete_team(&self, org_id: &str, team_id: &str) -> Result<(), AtlasError> {
        self.delete(&["orgs", org_id, "teams", team_id], ApiVersion::V20230101, &[])
            .await
    }
}
