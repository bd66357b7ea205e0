//! Stateless accessors for runs, jobs, and annotations.
//!
//! Every function issues exactly one GET and propagates transport and decode
//! errors unchanged; callers decide how to label them.

use dispatch::{
    Annotation, AnnotationRecord, DispatchError, Job, JobsPage, RepositoryId, RestClient, Run,
    RunId, RunQuery, WorkflowRuns,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

/// Decodes a response body, treating an empty body as JSON `null`.
pub(crate) fn decode<T: DeserializeOwned>(body: &str) -> Result<T, DispatchError> {
    if body.trim().is_empty() {
        return Ok(serde_json::from_value(Value::Null)?);
    }
    Ok(serde_json::from_str(body)?)
}

async fn get_json<T: DeserializeOwned>(
    client: &dyn RestClient,
    path: &str,
) -> Result<T, DispatchError> {
    debug!(path, "GET");
    let body = client.get(path).await?;
    decode(&body)
}

/// Current snapshot of one run.
#[instrument(level = "debug", skip_all, fields(repo = %repo, run_id = %run_id))]
pub async fn fetch_run(
    client: &dyn RestClient,
    repo: &RepositoryId,
    run_id: RunId,
) -> Result<Run, DispatchError> {
    get_json(client, &format!("repos/{repo}/actions/runs/{run_id}")).await
}

/// Jobs of the run's first attempt, in the order the API lists them.
#[instrument(level = "debug", skip_all, fields(repo = %repo, run_id = %run_id))]
pub async fn fetch_jobs(
    client: &dyn RestClient,
    repo: &RepositoryId,
    run_id: RunId,
) -> Result<Vec<Job>, DispatchError> {
    let page: JobsPage =
        get_json(client, &format!("repos/{repo}/actions/runs/{run_id}/attempts/1/jobs")).await?;
    Ok(page.jobs)
}

/// Annotations of one job, each stamped with the job's id and name.
#[instrument(level = "debug", skip_all, fields(repo = %repo, job_id = %job.id))]
pub async fn fetch_annotations(
    client: &dyn RestClient,
    repo: &RepositoryId,
    job: &Job,
) -> Result<Vec<Annotation>, DispatchError> {
    let records: Vec<AnnotationRecord> =
        get_json(client, &format!("repos/{repo}/check-runs/{}/annotations", job.id)).await?;
    Ok(records
        .into_iter()
        .map(|record| Annotation::for_job(job, record))
        .collect())
}

/// Path of the run listing filtered to one workflow and dispatch event kind.
pub fn run_listing_path(repo: &RepositoryId, query: &RunQuery) -> String {
    let filter = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("name", query.workflow.as_str())
        .append_pair("event", query.event_kind.as_str())
        .finish();
    format!("repos/{repo}/actions/runs?{filter}")
}

/// Runs matching `query`, newest first.
#[instrument(level = "debug", skip_all, fields(repo = %repo, workflow = %query.workflow))]
pub async fn list_runs(
    client: &dyn RestClient,
    repo: &RepositoryId,
    query: &RunQuery,
) -> Result<Vec<Run>, DispatchError> {
    let listing: WorkflowRuns = get_json(client, &run_listing_path(repo, query)).await?;
    Ok(listing.workflow_runs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatch::{EventKind, WorkflowRef};

    #[test]
    fn listing_path_filters_by_name_and_event() {
        let repo = RepositoryId::new("OWNER/REPO").unwrap();
        let query = RunQuery {
            workflow: WorkflowRef::new("ci.yml").unwrap(),
            event_kind: EventKind::WorkflowDispatch,
        };
        assert_eq!(
            run_listing_path(&repo, &query),
            "repos/OWNER/REPO/actions/runs?name=ci.yml&event=workflow_dispatch"
        );
    }

    #[test]
    fn listing_path_encodes_display_names() {
        let repo = RepositoryId::new("OWNER/REPO").unwrap();
        let query = RunQuery {
            workflow: WorkflowRef::new("Nightly & Deploy").unwrap(),
            event_kind: EventKind::RepositoryDispatch,
        };
        assert_eq!(
            run_listing_path(&repo, &query),
            "repos/OWNER/REPO/actions/runs?name=Nightly+%26+Deploy&event=repository_dispatch"
        );
    }

    #[test]
    fn empty_body_decodes_as_null() {
        let value: Value = decode("").unwrap();
        assert_eq!(value, Value::Null);
        assert!(decode::<Run>("").is_err());
    }
}
