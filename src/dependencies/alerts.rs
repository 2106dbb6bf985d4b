use async_trait::async_trait;

use crate::{
    client::{ApiVersion, AtlasClient, AtlasError, ListOptions, Paginated},
    models::{Alert, AlertAcknowledgement},
};

#[async_trait]
pub trait AlertLister {
    async fn list_alerts(
        &self,
        project_id: &str,
        status: Option<String>,
        options: &ListOptions,
    ) -> Result<Paginated<Alert>, AtlasError>;
}

#[async_trait]
pub trait AlertDescriber {
    async fn describe_alert(&self, project_id: &str, alert_id: &str) -> Result<Alert, AtlasError>;
}

#[async_trait]
pub trait AlertAcknowledger {
    async fn acknowledge_alert(
        &self,
        project_id: &str,
        alert_id: &str,
        acknowledgement: &AlertAcknowledgement,
    ) -> Result<Alert, AtlasError>;
}

#[async_trait]
impl AlertLister for AtlasClient {
    async fn list_alerts(
        &self,
        project_id: &str,
        status: Option<String>,
        options: &ListOptions,
    ) -> Result<Paginated<Alert>, AtlasError> {
        let query: Vec<(&str, String)> = status.into_iter().map(|s| ("status", s)).collect();
        self.list(
            &["groups", project_id, "alerts"],
            ApiVersion::V20230101,
            options,
            &query,
        )
        .await
    }
}

#[async_trait]
impl AlertDescriber for AtlasClient {
    async fn describe_alert(&self, project_id: &str, alert_id: &str) -> Result<Alert, AtlasError> {
        self.get(
            &["groups", project_id, "alerts", alert_id],
            ApiVersion::V20230101,
            &[],
        )
        .await
    }
}

#[async_trait]
impl AlertAcknowledger for AtlasClient {
    async fn acknowledge_alert(
        &self,
        project_id: &str,
        alert_id: &str,
        acknowledgement: &AlertAcknowledgement,
    ) -> Result<Alert, AtlasError> {
        self.patch(
            &["groups", project_id, "alerts", alert_id],
            ApiVersion::V20230101,
            acknowledgement,
        )
        .await
    }
}
