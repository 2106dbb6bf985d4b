//! Polling until a resource reaches a terminal state.
//!
//! [`poll_until`] is the generic loop; [`Watcher`] drives it with a [`StateDescriber`] and a
//! [`StateTransition`] describing which states and error codes end the wait.
use std::{future::Future, time::Duration};

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::{
    client::AtlasError,
    dependencies::{
        ClusterDescriber, ClusterShape, PrivateEndpointDescriber, SnapshotDescriber,
    },
    models::{CloudProvider, ENDPOINT_AVAILABLE, ENDPOINT_FAILED, SNAPSHOT_COMPLETED, SNAPSHOT_FAILED},
};

pub const DEFAULT_WATCH_INTERVAL: Duration = Duration::from_secs(4);

pub const CLUSTER_NOT_FOUND: &str = "CLUSTER_NOT_FOUND";
pub const CANNOT_USE_FLEX_CLUSTER_IN_CLUSTER_API: &str = "CANNOT_USE_FLEX_CLUSTER_IN_CLUSTER_API";

#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("timed out after {0:?} waiting for the operation to complete")]
    Timeout(Duration),
    #[error("the operation failed with state {0}")]
    Failed(String),
    #[error(transparent)]
    Describer(#[from] AtlasError),
}

pub enum Poll<T> {
    Done(T),
    Pending,
}

/// Call `poll` every `interval` until it is done, it fails, or `timeout` elapses.
pub async fn poll_until<T, F, Fut>(
    interval: Duration,
    timeout: Option<Duration>,
    mut poll: F,
) -> Result<T, WatchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Poll<T>, WatchError>>,
{
    let started = Instant::now();

    loop {
        if let Poll::Done(value) = poll().await? {
            return Ok(value);
        }

        if let Some(timeout) = timeout {
            if started.elapsed() + interval > timeout {
                return Err(WatchError::Timeout(timeout));
            }
        }

        tokio::time::sleep(interval).await;
    }
}

/// States and error codes that end (or keep) a watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTransition {
    pub end_states: &'static [&'static str],
    pub failure_states: &'static [&'static str],
    /// Error codes meaning the wait is over, e.g. a deleted resource.
    pub end_error_codes: &'static [&'static str],
    /// Error codes meaning the resource is temporarily unavailable.
    pub retryable_error_codes: &'static [&'static str],
}

pub const CLUSTER_CREATED: StateTransition = StateTransition {
    end_states: &["IDLE"],
    failure_states: &[],
    end_error_codes: &[],
    retryable_error_codes: &[],
};

pub const CLUSTER_IDLE: StateTransition = CLUSTER_CREATED;

pub const CLUSTER_DELETED: StateTransition = StateTransition {
    end_states: &[],
    failure_states: &[],
    end_error_codes: &[CLUSTER_NOT_FOUND],
    retryable_error_codes: &[],
};

// During an upgrade the cluster is briefly missing while it moves between APIs.
pub const CLUSTER_UPGRADED: StateTransition = StateTransition {
    end_states: &["IDLE"],
    failure_states: &[],
    end_error_codes: &[],
    // A cluster upgraded from flex is briefly still reported as flex.
    retryable_error_codes: &[CLUSTER_NOT_FOUND, CANNOT_USE_FLEX_CLUSTER_IN_CLUSTER_API],
};

pub const SNAPSHOT_FINISHED: StateTransition = StateTransition {
    end_states: &[SNAPSHOT_COMPLETED],
    failure_states: &[SNAPSHOT_FAILED],
    end_error_codes: &[],
    retryable_error_codes: &[],
};

pub const PRIVATE_ENDPOINT_AVAILABLE: StateTransition = StateTransition {
    end_states: &[ENDPOINT_AVAILABLE],
    failure_states: &[ENDPOINT_FAILED],
    end_error_codes: &[],
    retryable_error_codes: &[],
};

/// Interval and timeout of a watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    pub interval: Duration,
    pub timeout: Option<Duration>,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_WATCH_INTERVAL,
            timeout: None,
        }
    }
}

impl WatchOptions {
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            ..Default::default()
        }
    }
}

/// Something whose state can be polled.
#[async_trait]
pub trait StateDescriber: Send + Sync {
    async fn describe_state(&self) -> Result<String, AtlasError>;
}

pub struct Watcher<'a> {
    describer: &'a dyn StateDescriber,
    transition: StateTransition,
    options: WatchOptions,
}

impl<'a> Watcher<'a> {
    pub fn new(
        describer: &'a dyn StateDescriber,
        transition: StateTransition,
        options: WatchOptions,
    ) -> Self {
        Self {
            describer,
            transition,
            options,
        }
    }

    pub async fn watch(&self) -> Result<(), WatchError> {
        let transition = self.transition;

        poll_until(self.options.interval, self.options.timeout, || async move {
            match self.describer.describe_state().await {
                Ok(state) => {
                    trace!(state = %state, "polled state");
                    if transition.end_states.iter().any(|s| state.eq_ignore_ascii_case(s)) {
                        return Ok(Poll::Done(()));
                    }
                    if transition
                        .failure_states
                        .iter()
                        .any(|s| state.eq_ignore_ascii_case(s))
                    {
                        return Err(WatchError::Failed(state));
                    }
                    Ok(Poll::Pending)
                }
                Err(err) => {
                    let code = err.error_code();
                    if code.is_some_and(|code| transition.end_error_codes.iter().any(|c| *c == code)) {
                        debug!(code, "watch ended on error code");
                        return Ok(Poll::Done(()));
                    }
                    if code.is_some_and(|code| {
                        transition.retryable_error_codes.iter().any(|c| *c == code)
                    }) {
                        debug!(code, "retrying after error code");
                        return Ok(Poll::Pending);
                    }
                    Err(WatchError::Describer(err))
                }
            }
        })
        .await
    }
}

/// State of a dedicated or flex cluster.
pub struct ClusterStateDescriber<'a, C: ?Sized> {
    pub client: &'a C,
    pub project_id: &'a str,
    pub name: &'a str,
    pub flex: bool,
}

#[async_trait]
impl<C> StateDescriber for ClusterStateDescriber<'_, C>
where
    C: ClusterDescriber + Send + Sync + ?Sized,
{
    async fn describe_state(&self) -> Result<String, AtlasError> {
        if self.flex {
            let cluster = self
                .client
                .describe_flex_cluster(self.project_id, self.name)
                .await?;
            return Ok(cluster.state_name().to_string());
        }

        let cluster = self
            .client
            .describe_cluster(self.project_id, self.name, ClusterShape::ClusterWideScaling)
            .await?;
        Ok(cluster.state_name().to_string())
    }
}

/// Status of a dedicated or flex snapshot.
pub struct SnapshotStateDescriber<'a, C: ?Sized> {
    pub client: &'a C,
    pub project_id: &'a str,
    pub cluster_name: &'a str,
    pub snapshot_id: &'a str,
    pub flex: bool,
}

#[async_trait]
impl<C> StateDescriber for SnapshotStateDescriber<'_, C>
where
    C: SnapshotDescriber + Send + Sync + ?Sized,
{
    async fn describe_state(&self) -> Result<String, AtlasError> {
        if self.flex {
            let snapshot = self
                .client
                .describe_flex_snapshot(self.project_id, self.cluster_name, self.snapshot_id)
                .await?;
            return Ok(snapshot.status().to_string());
        }

        let snapshot = self
            .client
            .describe_snapshot(self.project_id, self.cluster_name, self.snapshot_id)
            .await?;
        Ok(snapshot.status().to_string())
    }
}

pub struct PrivateEndpointStateDescriber<'a, C: ?Sized> {
    pub client: &'a C,
    pub project_id: &'a str,
    pub provider: CloudProvider,
    pub service_id: &'a str,
}

#[async_trait]
impl<C> StateDescriber for PrivateEndpointStateDescriber<'_, C>
where
    C: PrivateEndpointDescriber + Send + Sync + ?Sized,
{
    async fn describe_state(&self) -> Result<String, AtlasError> {
        let service = self
            .client
            .describe_private_endpoint_service(self.project_id, self.provider, self.service_id)
            .await?;
        Ok(service.status().to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::{
        client::ApiError,
        dependencies::mocks::MockAtlas,
        models::{Cluster, FlexCluster},
    };

    struct Scripted {
        responses: Mutex<Vec<Result<String, AtlasError>>>,
    }

    impl Scripted {
        fn new(mut responses: Vec<Result<String, AtlasError>>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
            }
        }
    }

    #[async_trait]
    impl StateDescriber for Scripted {
        async fn describe_state(&self) -> Result<String, AtlasError> {
            self.responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Ok("PENDING".to_string()))
        }
    }

    fn fast() -> WatchOptions {
        WatchOptions {
            interval: Duration::from_millis(10),
            timeout: None,
        }
    }

    fn api_error(code: &str) -> AtlasError {
        AtlasError::Api(ApiError::new(404, code))
    }

    #[tokio::test]
    async fn test_watch_until_end_state() {
        let describer = Scripted::new(vec![
            Ok("CREATING".to_string()),
            Ok("UPDATING".to_string()),
            Ok("IDLE".to_string()),
        ]);

        Watcher::new(&describer, CLUSTER_CREATED, fast())
            .watch()
            .await
            .unwrap();
        assert!(describer.responses.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_watch_failure_state() {
        let describer = Scripted::new(vec![Ok("QUEUED".to_string()), Ok("FAILED".to_string())]);

        let err = Watcher::new(&describer, SNAPSHOT_FINISHED, fast())
            .watch()
            .await
            .unwrap_err();
        assert!(matches!(err, WatchError::Failed(state) if state == "FAILED"));
    }

    #[tokio::test]
    async fn test_watch_end_error_code() {
        let describer = Scripted::new(vec![
            Ok("DELETING".to_string()),
            Err(api_error(CLUSTER_NOT_FOUND)),
        ]);

        Watcher::new(&describer, CLUSTER_DELETED, fast())
            .watch()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_watch_retryable_error_code() {
        let describer = Scripted::new(vec![
            Err(api_error(CLUSTER_NOT_FOUND)),
            Ok("UPDATING".to_string()),
            Ok("IDLE".to_string()),
        ]);

        Watcher::new(&describer, CLUSTER_UPGRADED, fast())
            .watch()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_watch_upgrade_from_flex() {
        let describer = Scripted::new(vec![
            Err(api_error(CANNOT_USE_FLEX_CLUSTER_IN_CLUSTER_API)),
            Ok("UPDATING".to_string()),
            Ok("IDLE".to_string()),
        ]);

        Watcher::new(&describer, CLUSTER_UPGRADED, fast())
            .watch()
            .await
            .unwrap();

        let describer = Scripted::new(vec![Err(api_error(CANNOT_USE_FLEX_CLUSTER_IN_CLUSTER_API))]);
        assert!(
            Watcher::new(&describer, CLUSTER_CREATED, fast())
                .watch()
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_watch_other_error_fails() {
        let describer = Scripted::new(vec![Err(api_error("UNEXPECTED_ERROR"))]);

        let err = Watcher::new(&describer, CLUSTER_CREATED, fast())
            .watch()
            .await
            .unwrap_err();
        assert!(matches!(err, WatchError::Describer(_)));
    }

    #[tokio::test]
    async fn test_watch_timeout() {
        let describer = Scripted::new(vec![]);
        let options = WatchOptions {
            interval: Duration::from_millis(10),
            timeout: Some(Duration::from_millis(35)),
        };

        let err = Watcher::new(&describer, CLUSTER_CREATED, options)
            .watch()
            .await
            .unwrap_err();
        assert!(matches!(err, WatchError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_cluster_state_describer_flex() {
        let mut client = MockAtlas::new();
        client
            .expect_describe_flex_cluster()
            .withf(|project_id, name| project_id == "p" && name == "flex0")
            .returning(|_, _| {
                Ok(FlexCluster {
                    state_name: Some("IDLE".to_string()),
                    ..Default::default()
                })
            });
        client.expect_describe_cluster().never();

        let describer = ClusterStateDescriber {
            client: &client,
            project_id: "p",
            name: "flex0",
            flex: true,
        };
        assert_eq!(describer.describe_state().await.unwrap(), "IDLE");
    }

    #[tokio::test]
    async fn test_cluster_state_describer_dedicated() {
        let mut client = MockAtlas::new();
        client
            .expect_describe_cluster()
            .returning(|_, _, _| {
                Ok(Cluster {
                    state_name: Some("UPDATING".to_string()),
                    ..Default::default()
                })
            });

        let describer = ClusterStateDescriber {
            client: &client,
            project_id: "p",
            name: "Cluster0",
            flex: false,
        };
        assert_eq!(describer.describe_state().await.unwrap(), "UPDATING");
    }
}
