//! Run report rendering.
//!
//! [`render_run`] is the only place that decides whether a job's annotations
//! are fetched fresh or reused from the [`AnnotationCache`]. The text
//! functions below it are pure.

use std::time::Duration;

use dispatch::{
    Annotation, AnnotationCache, AnnotationLevel, Conclusion, DispatchError, Job, RepositoryId,
    RestClient, Run, RunId, RunStatus,
};
use tracing::{debug, instrument};

use crate::fetch::{fetch_annotations, fetch_jobs, fetch_run};

/// Re-fetches the run and its jobs and renders the report.
///
/// Annotations of settled jobs come from `cache` once they have been fetched;
/// in-progress jobs are re-fetched every time. Any failing fetch discards the
/// whole report.
#[instrument(level = "debug", skip_all, fields(repo = %repo, run_id = %run_id))]
pub async fn render_run(
    client: &dyn RestClient,
    repo: &RepositoryId,
    run_id: RunId,
    cache: &mut AnnotationCache,
) -> Result<(Run, String), DispatchError> {
    let run = fetch_run(client, repo, run_id)
        .await
        .map_err(DispatchError::run_fetch)?;
    let jobs = fetch_jobs(client, repo, run_id)
        .await
        .map_err(DispatchError::jobs_fetch)?;

    let mut annotations = Vec::new();
    for job in &jobs {
        if let Some(cached) = cache.get(job.id) {
            debug!(job_id = %job.id, "annotation cache hit");
            annotations.extend_from_slice(cached);
            continue;
        }

        let fetched = fetch_annotations(client, repo, job)
            .await
            .map_err(DispatchError::annotations_fetch)?;
        annotations.extend_from_slice(&fetched);
        cache.record(job, fetched);
    }

    Ok((run, compose_report(&jobs, &annotations)))
}

/// Report body: a leading blank line, then the `JOBS` section and, when there
/// is anything to show, the `ANNOTATIONS` section.
pub fn compose_report(jobs: &[Job], annotations: &[Annotation]) -> String {
    let mut report = String::from("\n");
    if jobs.is_empty() {
        return report;
    }

    report.push_str("JOBS\n");
    report.push_str(&render_jobs(jobs));
    report.push('\n');

    if !annotations.is_empty() {
        report.push_str("\nANNOTATIONS\n");
        report.push_str(&render_annotations(annotations));
        report.push('\n');
    }
    report
}

/// One line per job followed by its steps, indented by two spaces.
pub fn render_jobs(jobs: &[Job]) -> String {
    let mut lines = Vec::new();
    for job in jobs {
        let elapsed = job
            .elapsed()
            .map(|d| format!(" in {}", format_elapsed(d)))
            .unwrap_or_default();
        lines.push(format!(
            "{} {}{} (ID {})",
            status_glyph(job.status, job.conclusion),
            job.name,
            elapsed,
            job.id
        ));
        for step in &job.steps {
            lines.push(format!(
                "  {} {}",
                status_glyph(step.status, step.conclusion),
                step.name
            ));
        }
    }
    lines.join("\n")
}

/// Each annotation as its message line and a `job: path#line` location line.
pub fn render_annotations(annotations: &[Annotation]) -> String {
    let mut lines = Vec::new();
    for annotation in annotations {
        lines.push(format!(
            "{} {}",
            annotation_glyph(annotation.level),
            annotation.message
        ));
        lines.push(format!(
            "{}: {}#{}\n",
            annotation.job_name, annotation.path, annotation.start_line
        ));
    }
    lines.join("\n")
}

fn status_glyph(status: RunStatus, conclusion: Option<Conclusion>) -> &'static str {
    if !status.is_completed() {
        return "*";
    }
    match conclusion {
        Some(Conclusion::Success) => "✓",
        Some(Conclusion::Skipped | Conclusion::Neutral) => "-",
        _ => "X",
    }
}

fn annotation_glyph(level: AnnotationLevel) -> &'static str {
    match level {
        AnnotationLevel::Failure => "X",
        AnnotationLevel::Warning => "!",
        AnnotationLevel::Notice | AnnotationLevel::Unknown => "-",
    }
}

/// Formats whole seconds as `4s`, `1m59s`, or `1h0m5s`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}s")
    } else {
        format!("{seconds}s")
    }
}
