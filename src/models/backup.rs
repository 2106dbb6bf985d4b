use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const SNAPSHOT_COMPLETED: &str = "COMPLETED";
pub const SNAPSHOT_FAILED: &str = "FAILED";

/// Snapshot of a dedicated cluster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mongod_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_size_bytes: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Snapshot {
    pub fn status(&self) -> &str {
        self.status.as_deref().unwrap_or_default()
    }
}

/// Request body of an on-demand snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_in_days: Option<u32>,
}

/// Restore job of a dedicated cluster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreJob {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_cluster_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oplog_ts: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oplog_inc: Option<i64>,
    #[serde(
        default,
        rename = "pointInTimeUTCSeconds",
        skip_serializing_if = "Option::is_none"
    )]
    pub point_in_time_utc_seconds: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expired: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_url: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RestoreJob {
    /// Whether the job reached a state it won't leave.
    pub fn is_done(&self) -> bool {
        if self.expired == Some(true)
            || self.cancelled == Some(true)
            || self.failed == Some(true)
            || self.finished_at.is_some()
        {
            return true;
        }

        self.delivery_type
            .as_deref()
            .is_some_and(|delivery| delivery.eq_ignore_ascii_case("download"))
            && self
                .delivery_url
                .as_ref()
                .is_some_and(|urls| !urls.is_empty())
    }
}

/// Snapshot of a flex cluster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlexSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<String>,
    #[serde(
        default,
        rename = "mongoDBVersion",
        skip_serializing_if = "Option::is_none"
    )]
    pub mongo_db_version: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FlexSnapshot {
    pub fn status(&self) -> &str {
        self.status.as_deref().unwrap_or_default()
    }
}

/// Restore job of a flex cluster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlexRestoreJob {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_deployment_item_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restore_finished_date: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FlexRestoreJob {
    pub fn status(&self) -> &str {
        self.status.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_restore_job_is_done() {
        assert!(!RestoreJob::default().is_done());

        let finished: RestoreJob =
            serde_json::from_value(json!({"finishedAt": "2024-01-01T00:00:00Z"})).unwrap();
        assert!(finished.is_done());

        let cancelled: RestoreJob = serde_json::from_value(json!({"cancelled": true})).unwrap();
        assert!(cancelled.is_done());

        let pending_download: RestoreJob =
            serde_json::from_value(json!({"deliveryType": "download", "deliveryUrl": []})).unwrap();
        assert!(!pending_download.is_done());

        let ready_download: RestoreJob = serde_json::from_value(
            json!({"deliveryType": "download", "deliveryUrl": ["https://example.com/snap.tgz"]}),
        )
        .unwrap();
        assert!(ready_download.is_done());
    }

    #[test]
    fn test_restore_job_wire_names() {
        let job = RestoreJob {
            delivery_type: Some("pointInTime".to_string()),
            point_in_time_utc_seconds: Some(1_700_000_000),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&job).unwrap(),
            json!({"deliveryType": "pointInTime", "pointInTimeUTCSeconds": 1_700_000_000})
        );
    }
}
