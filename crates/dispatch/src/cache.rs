//! Process-lifetime cache of annotations for jobs that can no longer change.

use std::collections::HashMap;

use crate::{Annotation, Job, JobId};

/// Maps a job to the annotations fetched for it once it stopped running.
///
/// Owned by the watch loop and passed by reference to each render. Entries are
/// never evicted: a job that is not in progress will not gain annotations, so
/// an entry stays valid for as long as the process runs.
#[derive(Debug, Default)]
pub struct AnnotationCache {
    entries: HashMap<JobId, Vec<Annotation>>,
}

impl AnnotationCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Annotations previously recorded for `job`, if any.
    pub fn get(&self, job: JobId) -> Option<&[Annotation]> {
        self.entries.get(&job).map(Vec::as_slice)
    }

    /// Records the annotations fetched for `job`.
    ///
    /// Refuses (returns `false`) while the job is in progress, since its
    /// annotations are still provisional.
    pub fn record(&mut self, job: &Job, annotations: Vec<Annotation>) -> bool {
        if job.is_in_progress() {
            return false;
        }
        tracing::debug!(job_id = %job.id, count = annotations.len(), "caching settled annotations");
        self.entries.insert(job.id, annotations);
        true
    }

    /// Number of jobs with recorded annotations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no job has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RunStatus;

    fn job(id: u64, status: RunStatus) -> Job {
        Job {
            id: JobId::new(id),
            run_id: None,
            name: format!("job-{id}"),
            status,
            conclusion: None,
            started_at: None,
            completed_at: None,
            steps: Vec::new(),
        }
    }

    #[test]
    fn in_progress_jobs_are_never_cached() {
        let mut cache = AnnotationCache::new();
        assert!(!cache.record(&job(1, RunStatus::InProgress), Vec::new()));
        assert!(cache.get(JobId::new(1)).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn settled_jobs_are_cached_even_when_empty() {
        let mut cache = AnnotationCache::new();
        assert!(cache.record(&job(1, RunStatus::Completed), Vec::new()));
        assert!(cache.record(&job(2, RunStatus::Queued), Vec::new()));
        assert_eq!(cache.get(JobId::new(1)), Some(&[][..]));
        assert_eq!(cache.len(), 2);
    }
}
