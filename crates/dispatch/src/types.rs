//! Wire and value types for dispatches, runs, jobs, and annotations.
//!
//! Run, job, and annotation types are read-only snapshots decoded from the
//! GitHub REST API. Nothing in the workspace mutates them in place; every poll
//! produces fresh values that replace the previous ones.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};

use crate::{EventType, GitRef, JobId, RepositoryId, RunId, WorkflowRef};

/// Decodes an explicit `null` the same way as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Status values
// ---------------------------------------------------------------------------

/// Lifecycle status of a run, job, or step.
///
/// Only [`RunStatus::Completed`] is terminal. A missing or unrecognised value
/// decodes as [`RunStatus::Unknown`], which is treated like any other
/// non-terminal status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Requested,
    Queued,
    Waiting,
    Pending,
    InProgress,
    Completed,
    #[default]
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    /// Returns `true` once the status can no longer change.
    pub fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Outcome of a completed run, job, or step. Absent until the status is
/// [`RunStatus::Completed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Conclusion {
    Success,
    Failure,
    Neutral,
    Cancelled,
    Skipped,
    TimedOut,
    ActionRequired,
    Stale,
    StartupFailure,
    #[serde(other)]
    Unknown,
}

// ---------------------------------------------------------------------------
// Runs
// ---------------------------------------------------------------------------

/// One snapshot of a workflow run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Run {
    pub id: RunId,
    #[serde(default)]
    pub workflow_id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: RunStatus,
    #[serde(default)]
    pub conclusion: Option<Conclusion>,
}

impl Run {
    /// Returns `true` if the run finished, whatever its conclusion.
    pub fn is_completed(&self) -> bool {
        self.status.is_completed()
    }

    /// Returns `true` if the run finished with [`Conclusion::Success`].
    pub fn succeeded(&self) -> bool {
        self.is_completed() && self.conclusion == Some(Conclusion::Success)
    }
}

/// Body of `GET repos/{repo}/actions/runs`, newest run first.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkflowRuns {
    #[serde(default, deserialize_with = "null_as_default")]
    pub workflow_runs: Vec<Run>,
}

// ---------------------------------------------------------------------------
// Jobs and steps
// ---------------------------------------------------------------------------

/// One job of a run, with its ordered steps.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Job {
    pub id: JobId,
    #[serde(default)]
    pub run_id: Option<RunId>,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: RunStatus,
    #[serde(default)]
    pub conclusion: Option<Conclusion>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub steps: Vec<Step>,
}

impl Job {
    /// Returns `true` while the job is running and its annotations are still
    /// provisional.
    pub fn is_in_progress(&self) -> bool {
        self.status == RunStatus::InProgress
    }

    /// Wall-clock time between start and completion, if both are known.
    pub fn elapsed(&self) -> Option<Duration> {
        elapsed_between(self.started_at, self.completed_at)
    }
}

/// One step of a job.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Step {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: RunStatus,
    #[serde(default)]
    pub conclusion: Option<Conclusion>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub number: u64,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Step {
    /// Wall-clock time between start and completion, if both are known.
    pub fn elapsed(&self) -> Option<Duration> {
        elapsed_between(self.started_at, self.completed_at)
    }
}

fn elapsed_between(
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
) -> Option<Duration> {
    let (start, end) = (started_at?, completed_at?);
    end.signed_duration_since(start).to_std().ok()
}

/// Body of `GET repos/{repo}/actions/runs/{id}/attempts/1/jobs`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobsPage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub jobs: Vec<Job>,
}

// ---------------------------------------------------------------------------
// Annotations
// ---------------------------------------------------------------------------

/// Severity of an annotation as reported by the check-runs API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationLevel {
    Notice,
    Warning,
    Failure,
    #[default]
    #[serde(other)]
    Unknown,
}

/// One element of `GET repos/{repo}/check-runs/{job}/annotations`, exactly as
/// the API returns it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnnotationRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub path: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub start_line: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub end_line: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub annotation_level: AnnotationLevel,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
}

/// A diagnostic attached to a job, carrying the job's name so it can be
/// rendered on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Job the annotation belongs to (non-owning back-reference).
    pub job_id: JobId,
    pub job_name: String,
    pub path: String,
    pub start_line: u64,
    pub end_line: u64,
    pub level: AnnotationLevel,
    pub title: Option<String>,
    pub message: String,
}

impl Annotation {
    /// Stamps a decoded record with the identity of the job it was fetched for.
    pub fn for_job(job: &Job, record: AnnotationRecord) -> Self {
        Self {
            job_id: job.id,
            job_name: job.name.clone(),
            path: record.path,
            start_line: record.start_line,
            end_line: record.end_line,
            level: record.annotation_level,
            title: record.title,
            message: record.message,
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatch requests
// ---------------------------------------------------------------------------

/// The event kind a run was started by, as used in the `event` filter of the
/// run listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    WorkflowDispatch,
    RepositoryDispatch,
}

impl EventKind {
    /// Value of the `event` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WorkflowDispatch => "workflow_dispatch",
            Self::RepositoryDispatch => "repository_dispatch",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the run resolver searches for after a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunQuery {
    pub workflow: WorkflowRef,
    pub event_kind: EventKind,
}

/// The event to dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchEvent {
    /// A `repository_dispatch` event. Only tracked when `workflow` names the
    /// workflow expected to react to it.
    Repository {
        event_type: EventType,
        client_payload: Value,
        workflow: Option<WorkflowRef>,
    },
    /// A `workflow_dispatch` event against one workflow.
    Workflow {
        workflow: WorkflowRef,
        inputs: Value,
        git_ref: Option<GitRef>,
    },
}

/// A dispatch to issue against one repository.
///
/// Consumed by value when the dispatch is triggered so it can only be sent once.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchRequest {
    pub repository: RepositoryId,
    pub event: DispatchEvent,
}

impl DispatchRequest {
    /// Pairs an event with the repository it is sent to.
    pub fn new(repository: RepositoryId, event: DispatchEvent) -> Self {
        Self { repository, event }
    }

    /// REST path the dispatch is POSTed to.
    pub fn path(&self) -> String {
        match &self.event {
            DispatchEvent::Repository { .. } => format!("repos/{}/dispatches", self.repository),
            DispatchEvent::Workflow { workflow, .. } => format!(
                "repos/{}/actions/workflows/{}/dispatches",
                self.repository, workflow
            ),
        }
    }

    /// JSON body of the dispatch.
    pub fn body(&self) -> Value {
        match &self.event {
            DispatchEvent::Repository {
                event_type,
                client_payload,
                ..
            } => json!({
                "event_type": event_type.as_str(),
                "client_payload": client_payload,
            }),
            DispatchEvent::Workflow {
                inputs, git_ref, ..
            } => {
                let mut body = json!({ "inputs": inputs });
                if let Some(git_ref) = git_ref {
                    body["ref"] = Value::String(git_ref.as_str().to_owned());
                }
                body
            }
        }
    }

    /// The run listing query that finds the run this dispatch starts, or
    /// `None` when there is nothing to track.
    pub fn run_query(&self) -> Option<RunQuery> {
        match &self.event {
            DispatchEvent::Repository { workflow, .. } => workflow.clone().map(|workflow| RunQuery {
                workflow,
                event_kind: EventKind::RepositoryDispatch,
            }),
            DispatchEvent::Workflow { workflow, .. } => Some(RunQuery {
                workflow: workflow.clone(),
                event_kind: EventKind::WorkflowDispatch,
            }),
        }
    }
}
