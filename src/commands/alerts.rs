use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

use crate::{
    args::alerts as args,
    client::{ListOptions, Paginated},
    commands::{
        CommandWithOutput,
        with_atlas::{AtlasContext, TryFromWithAtlasClient},
    },
    dependencies::{AlertAcknowledger, AlertDescriber, AlertLister},
    models::{Alert, AlertAcknowledgement},
    template::Templated,
};

const LIST_TEMPLATE: &str = "ID\tTYPE\tMETRIC\tSTATUS{{range .results}}\n{{.id}}\t{{.eventTypeName}}\t{{.metricName}}\t{{.status}}{{end}}\n";
const DESCRIBE_TEMPLATE: &str =
    "ID\tTYPE\tMETRIC\tSTATUS\n{{.id}}\t{{.eventTypeName}}\t{{.metricName}}\t{{.status}}\n";
const ACKNOWLEDGE_TEMPLATE: &str = "Alert '{{.id}}' acknowledged until {{.acknowledgedUntil}}\n";
const UNACKNOWLEDGE_TEMPLATE: &str = "Alert '{{.id}}' unacknowledged\n";

/// Acknowledgement date used for `--forever`.
pub const ACKNOWLEDGE_FOREVER: &str = "2100-01-01T00:00:00Z";

pub struct List {
    store: Box<dyn AlertLister + Send + Sync>,
    project_id: String,
    status: Option<args::AlertStatus>,
    options: ListOptions,
}

impl TryFromWithAtlasClient<args::List> for List {
    fn try_from_with_atlas(args: args::List, context: &AtlasContext) -> Result<Self> {
        Ok(Self {
            store: Box::new(context.client.clone()),
            project_id: context.project_id(args.project.project_id)?,
            status: args.status,
            options: ListOptions::from(&args.list),
        })
    }
}

#[async_trait]
impl CommandWithOutput for List {
    type Output = Templated<Paginated<Alert>>;

    async fn execute(&mut self) -> Result<Self::Output> {
        let status = self.status.map(|status| status.as_api_str().to_string());
        let page = self
            .store
            .list_alerts(&self.project_id, status, &self.options)
            .await
            .context("listing alerts")?;

        Ok(Templated::new(LIST_TEMPLATE, page))
    }
}

pub struct Describe {
    store: Box<dyn AlertDescriber + Send + Sync>,
    project_id: String,
    alert_id: String,
}

impl TryFromWithAtlasClient<args::Describe> for Describe {
    fn try_from_with_atlas(args: args::Describe, context: &AtlasContext) -> Result<Self> {
        Ok(Self {
            store: Box::new(context.client.clone()),
            project_id: context.project_id(args.project.project_id)?,
            alert_id: args.alert_id,
        })
    }
}

#[async_trait]
impl CommandWithOutput for Describe {
    type Output = Templated<Alert>;

    async fn execute(&mut self) -> Result<Self::Output> {
        let alert = self
            .store
            .describe_alert(&self.project_id, &self.alert_id)
            .await
            .with_context(|| format!("describing alert '{}'", self.alert_id))?;

        Ok(Templated::new(DESCRIBE_TEMPLATE, alert))
    }
}

/// Acknowledge or unacknowledge an alert.
///
/// Unacknowledging is an acknowledgement without an until date.
pub struct Acknowledge {
    store: Box<dyn AlertAcknowledger + Send + Sync>,
    project_id: String,
    alert_id: String,
    acknowledgement: AlertAcknowledgement,
}

impl TryFromWithAtlasClient<args::Acknowledge> for Acknowledge {
    fn try_from_with_atlas(args: args::Acknowledge, context: &AtlasContext) -> Result<Self> {
        let until = if args.forever {
            Some(ACKNOWLEDGE_FOREVER.to_string())
        } else {
            args.until
        };

        Ok(Self {
            store: Box::new(context.client.clone()),
            project_id: context.project_id(args.project.project_id)?,
            alert_id: args.alert_id,
            acknowledgement: AlertAcknowledgement {
                acknowledged_until: until,
                acknowledgement_comment: args.comment,
            },
        })
    }
}

impl TryFromWithAtlasClient<args::Unacknowledge> for Acknowledge {
    fn try_from_with_atlas(args: args::Unacknowledge, context: &AtlasContext) -> Result<Self> {
        Ok(Self {
            store: Box::new(context.client.clone()),
            project_id: context.project_id(args.project.project_id)?,
            alert_id: args.alert_id,
            acknowledgement: AlertAcknowledgement {
                acknowledged_until: None,
                acknowledgement_comment: args.comment,
            },
        })
    }
}

#[async_trait]
impl CommandWithOutput for Acknowledge {
    type Output = Templated<Alert>;

    async fn execute(&mut self) -> Result<Self::Output> {
        let acknowledging = self.acknowledgement.acknowledged_until.is_some();
        info!(alert = %self.alert_id, acknowledging, "updating alert acknowledgement");

        let alert = self
            .store
            .acknowledge_alert(&self.project_id, &self.alert_id, &self.acknowledgement)
            .await
            .with_context(|| format!("acknowledging alert '{}'", self.alert_id))?;

        let template = if acknowledging {
            ACKNOWLEDGE_TEMPLATE
        } else {
            UNACKNOWLEDGE_TEMPLATE
        };
        Ok(Templated::new(template, alert))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependencies::mocks::MockAtlas;

    const PROJECT_ID: &str = "5e2211c17a3e5a48f5497de3";

    fn alert(id: &str) -> Alert {
        Alert {
            id: Some(id.to_string()),
            event_type_name: Some("OUTSIDE_METRIC_THRESHOLD".to_string()),
            metric_name: Some("ASSERT_REGULAR".to_string()),
            status: Some("OPEN".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_list_open_alerts() {
        let mut store = MockAtlas::new();
        store
            .expect_list_alerts()
            .withf(|project, status, _| project == PROJECT_ID && status.as_deref() == Some("OPEN"))
            .return_once(|_, _, _| Ok(Paginated::new(vec![alert("a1")])));

        let output = List {
            store: Box::new(store),
            project_id: PROJECT_ID.to_string(),
            status: Some(args::AlertStatus::Open),
            options: ListOptions::default(),
        }
        .execute()
        .await
        .unwrap();

        assert_eq!(
            output.to_string(),
            "ID    TYPE                        METRIC            STATUS\na1    OUTSIDE_METRIC_THRESHOLD    ASSERT_REGULAR    OPEN\n"
        );
    }

    #[tokio::test]
    async fn test_describe_alert() {
        let mut store = MockAtlas::new();
        store
            .expect_describe_alert()
            .withf(|_, id| id == "a1")
            .return_once(|_, id| Ok(alert(id)));

        let output = Describe {
            store: Box::new(store),
            project_id: PROJECT_ID.to_string(),
            alert_id: "a1".to_string(),
        }
        .execute()
        .await
        .unwrap();

        assert_eq!(serde_json::to_value(&output).unwrap()["status"], "OPEN");
    }

    #[tokio::test]
    async fn test_acknowledge() {
        let expected = AlertAcknowledgement {
            acknowledged_until: Some(ACKNOWLEDGE_FOREVER.to_string()),
            acknowledgement_comment: Some("known issue".to_string()),
        };
        let mut store = MockAtlas::new();
        let body = expected.clone();
        store
            .expect_acknowledge_alert()
            .withf(move |_, id, acknowledgement| id == "a1" && acknowledgement == &body)
            .return_once(|_, id, acknowledgement| {
                Ok(Alert {
                    acknowledged_until: acknowledgement.acknowledged_until.clone(),
                    ..alert(id)
                })
            });

        let output = Acknowledge {
            store: Box::new(store),
            project_id: PROJECT_ID.to_string(),
            alert_id: "a1".to_string(),
            acknowledgement: expected,
        }
        .execute()
        .await
        .unwrap();

        assert_eq!(
            output.to_string(),
            "Alert 'a1' acknowledged until 2100-01-01T00:00:00Z\n"
        );
    }

    #[tokio::test]
    async fn test_unacknowledge() {
        let mut store = MockAtlas::new();
        store
            .expect_acknowledge_alert()
            .withf(|_, _, acknowledgement| acknowledgement.acknowledged_until.is_none())
            .return_once(|_, id, _| Ok(alert(id)));

        let output = Acknowledge {
            store: Box::new(store),
            project_id: PROJECT_ID.to_string(),
            alert_id: "a1".to_string(),
            acknowledgement: AlertAcknowledgement::default(),
        }
        .execute()
        .await
        .unwrap();

        assert_eq!(output.to_string(), "Alert 'a1' unacknowledged\n");
    }
}
