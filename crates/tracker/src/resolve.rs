//! Finding the run a dispatch started.
//!
//! The dispatch endpoints answer with no body, so there is no direct link from
//! a dispatch to its run. The resolver lists runs of the workflow filtered by
//! event kind and accepts the newest one as soon as it is not completed. This
//! assumes the listing is newest-first: a concurrent dispatch of the same
//! workflow can be picked instead, and if the newest entry stays completed the
//! resolver keeps listing until its policy gives up.

use std::time::Duration;

use dispatch::{DispatchError, Pacer, Pause, RepositoryId, RestClient, RunId, RunQuery};
use tracing::{debug, info, instrument};

use crate::fetch::list_runs;

/// How long the resolver keeps listing runs before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvePolicy {
    /// `None` retries until a run appears or a call fails.
    pub max_attempts: Option<u32>,
    /// Pause between listings. Zero re-lists immediately.
    pub interval: Duration,
}

impl ResolvePolicy {
    /// Lists until a run appears, with no pause between listings.
    pub fn unbounded() -> Self {
        Self {
            max_attempts: None,
            interval: Duration::ZERO,
        }
    }

    /// Gives up after `attempts` listings (at least one).
    pub fn bounded(attempts: u32) -> Self {
        Self {
            max_attempts: Some(attempts.max(1)),
            ..Self::unbounded()
        }
    }

    /// Sets the pause between listings.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

impl Default for ResolvePolicy {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// Lists runs until the newest match is still running and returns its id.
///
/// Listing failures propagate immediately; only "no running match yet" is
/// retried.
#[instrument(skip_all, fields(repo = %repo, workflow = %query.workflow, event = %query.event_kind))]
pub async fn resolve_run(
    client: &dyn RestClient,
    pacer: &dyn Pacer,
    repo: &RepositoryId,
    query: &RunQuery,
    policy: &ResolvePolicy,
) -> Result<RunId, DispatchError> {
    let mut attempts: u32 = 0;
    loop {
        attempts = next_attempt(attempts);
        let runs = list_runs(client, repo, query).await?;
        match runs.first() {
            Some(run) if !run.is_completed() => {
                info!(run_id = %run.id, attempts, "resolved dispatched run");
                return Ok(run.id);
            }
            Some(run) => debug!(run_id = %run.id, "newest run already completed"),
            None => debug!("no runs listed yet"),
        }

        if attempts == 1 {
            info!("dispatched run not listed yet, still waiting");
        }
        if policy.max_attempts.is_some_and(|max| attempts >= max) {
            return Err(DispatchError::ResolutionExhausted {
                workflow: query.workflow.clone(),
                attempts,
            });
        }
        if pacer.pause(policy.interval).await == Pause::Interrupted {
            return Err(DispatchError::Interrupted);
        }
    }
}

/// Counts one more listing. An unbounded policy can list forever, so the
/// count sticks at `u32::MAX` instead of wrapping.
fn next_attempt(attempts: u32) -> u32 {
    attempts.saturating_add(1)
}
