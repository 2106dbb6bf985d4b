use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    args::backups::{self as args, RestoreMethod},
    client::{ListOptions, Paginated},
    commands::{
        CommandWithOutput,
        watch::WatchResult,
        with_atlas::{AtlasContext, TryFromWithAtlasClient},
    },
    dependencies::{RestoreJobCreator, RestoreJobDescriber, RestoreJobLister},
    interaction::{Interaction, SpinnerInteraction},
    models::{FlexRestoreJob, RestoreJob, SNAPSHOT_COMPLETED, SNAPSHOT_FAILED},
    template::Templated,
    watchers::{Poll, WatchError, WatchOptions, poll_until},
};

use super::is_dedicated_cluster_error;

const LIST_TEMPLATE: &str = "ID\tSNAPSHOT\tCLUSTER\tTYPE\tEXPIRES AT{{range .results}}\n{{.id}}\t{{.snapshotId}}\t{{.targetClusterName}}\t{{.deliveryType}}\t{{.expiresAt}}{{end}}\n";
const FLEX_LIST_TEMPLATE: &str = "ID\tSNAPSHOT\tCLUSTER\tSTATUS\tFINISHED AT{{range .results}}\n{{.id}}\t{{.snapshotId}}\t{{.targetDeploymentItemName}}\t{{.status}}\t{{.restoreFinishedDate}}{{end}}\n";
const DESCRIBE_TEMPLATE: &str = "ID\tSNAPSHOT\tCLUSTER\tTYPE\tEXPIRES AT\n{{.id}}\t{{.snapshotId}}\t{{.targetClusterName}}\t{{.deliveryType}}\t{{.expiresAt}}\n";
const FLEX_DESCRIBE_TEMPLATE: &str = "ID\tSNAPSHOT\tCLUSTER\tSTATUS\tFINISHED AT\n{{.id}}\t{{.snapshotId}}\t{{.targetDeploymentItemName}}\t{{.status}}\t{{.restoreFinishedDate}}\n";
const START_TEMPLATE: &str = "Restore job '{{.id}}' successfully started\n";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RestoreError {
    #[error("--{flag} is required for {method} restores")]
    MissingFlag {
        flag: &'static str,
        method: &'static str,
    },
    #[error("restore failed")]
    Failed,
    #[error("restore expired")]
    Expired,
    #[error("restore cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RestoreJobPage {
    Dedicated(Paginated<RestoreJob>),
    Flex(Paginated<FlexRestoreJob>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnyRestoreJob {
    Dedicated(RestoreJob),
    Flex(FlexRestoreJob),
}

pub struct List {
    store: Box<dyn RestoreJobLister + Send + Sync>,
    project_id: String,
    cluster_name: String,
    options: ListOptions,
}

impl TryFromWithAtlasClient<args::RestoreList> for List {
    fn try_from_with_atlas(args: args::RestoreList, context: &AtlasContext) -> Result<Self> {
        Ok(Self {
            store: Box::new(context.client.clone()),
            project_id: context.project_id(args.project.project_id)?,
            cluster_name: args.cluster_name,
            options: ListOptions::from(&args.list),
        })
    }
}

#[async_trait]
impl CommandWithOutput for List {
    type Output = Templated<RestoreJobPage>;

    async fn execute(&mut self) -> Result<Self::Output> {
        match self
            .store
            .list_flex_restore_jobs(&self.project_id, &self.cluster_name, &self.options)
            .await
        {
            Ok(page) => Ok(Templated::new(FLEX_LIST_TEMPLATE, RestoreJobPage::Flex(page))),
            Err(err) if is_dedicated_cluster_error(&err) => {
                debug!(cluster = %self.cluster_name, "listing restore jobs of dedicated cluster");
                let page = self
                    .store
                    .list_restore_jobs(&self.project_id, &self.cluster_name, &self.options)
                    .await
                    .context("listing restore jobs")?;
                Ok(Templated::new(LIST_TEMPLATE, RestoreJobPage::Dedicated(page)))
            }
            Err(err) => Err(err).context("listing restore jobs"),
        }
    }
}

async fn describe_any_restore_job<C>(
    store: &C,
    project_id: &str,
    cluster_name: &str,
    job_id: &str,
) -> Result<AnyRestoreJob>
where
    C: RestoreJobDescriber + Send + Sync + ?Sized,
{
    match store
        .describe_flex_restore_job(project_id, cluster_name, job_id)
        .await
    {
        Ok(job) => Ok(AnyRestoreJob::Flex(job)),
        Err(err) if is_dedicated_cluster_error(&err) => store
            .describe_restore_job(project_id, cluster_name, job_id)
            .await
            .map(AnyRestoreJob::Dedicated)
            .with_context(|| format!("describing restore job '{job_id}'")),
        Err(err) => Err(err).with_context(|| format!("describing restore job '{job_id}'")),
    }
}

pub struct Describe {
    store: Box<dyn RestoreJobDescriber + Send + Sync>,
    project_id: String,
    cluster_name: String,
    job_id: String,
}

impl TryFromWithAtlasClient<args::RestoreDescribe> for Describe {
    fn try_from_with_atlas(args: args::RestoreDescribe, context: &AtlasContext) -> Result<Self> {
        Ok(Self {
            store: Box::new(context.client.clone()),
            project_id: context.project_id(args.project.project_id)?,
            cluster_name: args.cluster_name,
            job_id: args.restore_job_id,
        })
    }
}

#[async_trait]
impl CommandWithOutput for Describe {
    type Output = Templated<AnyRestoreJob>;

    async fn execute(&mut self) -> Result<Self::Output> {
        let job = describe_any_restore_job(
            self.store.as_ref(),
            &self.project_id,
            &self.cluster_name,
            &self.job_id,
        )
        .await?;

        let template = match job {
            AnyRestoreJob::Dedicated(_) => DESCRIBE_TEMPLATE,
            AnyRestoreJob::Flex(_) => FLEX_DESCRIBE_TEMPLATE,
        };
        Ok(Templated::new(template, job))
    }
}

pub struct Start {
    store: Box<dyn RestoreJobCreator + Send + Sync>,
    project_id: String,
    cluster_name: String,
    request: RestoreJob,
}

impl TryFromWithAtlasClient<args::RestoreStart> for Start {
    fn try_from_with_atlas(args: args::RestoreStart, context: &AtlasContext) -> Result<Self> {
        Ok(Self {
            store: Box::new(context.client.clone()),
            project_id: context.project_id(args.project.project_id.clone())?,
            cluster_name: args.cluster_name.clone(),
            request: restore_request(&args)?,
        })
    }
}

fn require<'a>(
    value: &'a Option<String>,
    flag: &'static str,
    method: RestoreMethod,
) -> Result<&'a str, RestoreError> {
    value.as_deref().ok_or(RestoreError::MissingFlag {
        flag,
        method: method.as_api_str(),
    })
}

/// Build the restore job request, checking the flags each method needs.
pub fn restore_request(args: &args::RestoreStart) -> Result<RestoreJob, RestoreError> {
    let method = args.method;
    let mut request = RestoreJob {
        delivery_type: Some(method.as_api_str().to_string()),
        ..Default::default()
    };

    match method {
        RestoreMethod::Automated => {
            request.snapshot_id = Some(require(&args.snapshot_id, "snapshotId", method)?.to_string());
            request.target_group_id =
                Some(require(&args.target_project_id, "targetProjectId", method)?.to_string());
            request.target_cluster_name =
                Some(require(&args.target_cluster_name, "targetClusterName", method)?.to_string());
        }
        RestoreMethod::PointInTime => {
            request.target_group_id =
                Some(require(&args.target_project_id, "targetProjectId", method)?.to_string());
            request.target_cluster_name =
                Some(require(&args.target_cluster_name, "targetClusterName", method)?.to_string());

            match (args.oplog_ts, args.oplog_inc) {
                (Some(ts), Some(inc)) => {
                    request.oplog_ts = Some(ts);
                    request.oplog_inc = Some(inc);
                }
                _ => request.point_in_time_utc_seconds = args.point_in_time_utc_seconds,
            }
        }
        RestoreMethod::Download => {
            request.snapshot_id = Some(require(&args.snapshot_id, "snapshotId", method)?.to_string());
        }
    }

    Ok(request)
}

#[async_trait]
impl CommandWithOutput for Start {
    type Output = Templated<RestoreJob>;

    async fn execute(&mut self) -> Result<Self::Output> {
        info!(
            cluster = %self.cluster_name,
            delivery = self.request.delivery_type.as_deref().unwrap_or_default(),
            "starting restore job"
        );
        let job = self
            .store
            .create_restore_job(&self.project_id, &self.cluster_name, &self.request)
            .await
            .with_context(|| format!("starting restore of cluster '{}'", self.cluster_name))?;

        Ok(Templated::new(START_TEMPLATE, job))
    }
}

/// Final outcome of a restore job that is done.
fn dedicated_outcome(job: &RestoreJob) -> Result<(), RestoreError> {
    if job.failed == Some(true) {
        return Err(RestoreError::Failed);
    }
    if job.expired == Some(true) {
        return Err(RestoreError::Expired);
    }
    if job.cancelled == Some(true) {
        return Err(RestoreError::Cancelled);
    }
    Ok(())
}

fn flex_outcome(job: &FlexRestoreJob) -> Option<Result<(), RestoreError>> {
    let status = job.status();
    if status.eq_ignore_ascii_case(SNAPSHOT_COMPLETED) {
        Some(Ok(()))
    } else if status.eq_ignore_ascii_case(SNAPSHOT_FAILED) {
        Some(Err(RestoreError::Failed))
    } else {
        None
    }
}

/// Describe the job once; done jobs carry their final outcome.
async fn poll_restore_job<C>(
    store: &C,
    project_id: &str,
    cluster_name: &str,
    job_id: &str,
    flex: bool,
) -> Result<Poll<Result<(), RestoreError>>, WatchError>
where
    C: RestoreJobDescriber + Send + Sync + ?Sized,
{
    if flex {
        let job = store
            .describe_flex_restore_job(project_id, cluster_name, job_id)
            .await?;
        return Ok(flex_outcome(&job).map_or(Poll::Pending, Poll::Done));
    }

    let job = store
        .describe_restore_job(project_id, cluster_name, job_id)
        .await?;
    if job.is_done() {
        Ok(Poll::Done(dedicated_outcome(&job)))
    } else {
        Ok(Poll::Pending)
    }
}

pub struct Watch {
    store: Box<dyn RestoreJobDescriber + Send + Sync>,
    interaction: Box<dyn SpinnerInteraction + Send + Sync>,
    project_id: String,
    cluster_name: String,
    job_id: String,
    options: WatchOptions,
}

impl TryFromWithAtlasClient<args::RestoreWatch> for Watch {
    fn try_from_with_atlas(args: args::RestoreWatch, context: &AtlasContext) -> Result<Self> {
        Ok(Self {
            store: Box::new(context.client.clone()),
            interaction: Box::new(Interaction::new()),
            project_id: context.project_id(args.project.project_id)?,
            cluster_name: args.cluster_name,
            job_id: args.restore_job_id,
            options: WatchOptions::with_timeout(args.watch_timeout),
        })
    }
}

#[async_trait]
impl CommandWithOutput for Watch {
    type Output = WatchResult;

    async fn execute(&mut self) -> Result<Self::Output> {
        let first = describe_any_restore_job(
            self.store.as_ref(),
            &self.project_id,
            &self.cluster_name,
            &self.job_id,
        )
        .await?;
        let flex = matches!(first, AnyRestoreJob::Flex(_));

        let store = self.store.as_ref();
        let project_id = self.project_id.as_str();
        let cluster_name = self.cluster_name.as_str();
        let job_id = self.job_id.as_str();

        let _spinner = self
            .interaction
            .start_spinner("Waiting for restore to complete...".to_string())
            .ok();

        let outcome = poll_until(self.options.interval, self.options.timeout, || {
            poll_restore_job(store, project_id, cluster_name, job_id, flex)
        })
        .await
        .with_context(|| format!("watching restore job '{}'", self.job_id))?;
        outcome?;

        Ok(WatchResult::RestoreCompleted {
            id: self.job_id.clone(),
        })
    }
}
