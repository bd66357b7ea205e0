//! The dispatch → resolve → poll/redraw loop.
//!
//! ```text
//! Triggering ──► Resolving ──► Rendering ⇄ Waiting
//!     │                            │
//!     └──────────── Done ◄─────────┘ (run completed)
//! ```
//!
//! Each render goes to an off-screen buffer first; the screen is only cleared
//! and redrawn once the whole frame is available, so a failing fetch never
//! leaves a half-drawn frame behind. Any error ends the loop immediately and
//! the normal screen is restored before it is returned.

use std::time::Duration;

use dispatch::{
    AnnotationCache, DispatchError, DispatchRequest, Pacer, Pause, RepositoryId, RestClient, Run,
    RunId, Terminal,
};
use tracing::{debug, info, instrument};

use crate::fetch::fetch_run;
use crate::render::render_run;
use crate::resolve::{resolve_run, ResolvePolicy};
use crate::trigger::trigger;

/// Interval between redraws when none is configured.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(3);

/// Loop timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchConfig {
    pub refresh_interval: Duration,
    pub resolve: ResolvePolicy,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            resolve: ResolvePolicy::default(),
        }
    }
}

/// How a dispatch ended.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// The event was sent but names no workflow to follow.
    Untracked,
    /// The dispatched run completed; this is its final snapshot.
    Finished(Run),
}

/// Drives one dispatch from trigger to the completed run.
pub struct Dispatcher<'a> {
    client: &'a dyn RestClient,
    terminal: &'a mut dyn Terminal,
    pacer: &'a dyn Pacer,
    config: WatchConfig,
}

impl<'a> Dispatcher<'a> {
    /// Wires the ports the dispatch runs against.
    pub fn new(
        client: &'a dyn RestClient,
        terminal: &'a mut dyn Terminal,
        pacer: &'a dyn Pacer,
        config: WatchConfig,
    ) -> Self {
        Self {
            client,
            terminal,
            pacer,
            config,
        }
    }

    /// Triggers `request` and, when it names a workflow, redraws the run until
    /// it completes.
    #[instrument(skip_all, fields(repo = %request.repository))]
    pub async fn dispatch(
        &mut self,
        request: DispatchRequest,
    ) -> Result<DispatchOutcome, DispatchError> {
        let repo = request.repository.clone();
        let Some(query) = trigger(self.client, request).await? else {
            info!("no workflow to follow");
            return Ok(DispatchOutcome::Untracked);
        };

        let run_id = resolve_run(
            self.client,
            self.pacer,
            &repo,
            &query,
            &self.config.resolve,
        )
        .await?;
        let run = fetch_run(self.client, &repo, run_id)
            .await
            .map_err(DispatchError::run_fetch)?;
        if run.is_completed() {
            info!(%run_id, "run already completed");
            return Ok(DispatchOutcome::Finished(run));
        }

        self.terminal.enter_alternate_screen()?;
        let watched = self.watch(&repo, run_id).await;
        let restored = self.terminal.leave_alternate_screen();
        let run = watched?;
        restored?;

        info!(%run_id, conclusion = ?run.conclusion, "run completed");
        Ok(DispatchOutcome::Finished(run))
    }

    /// Renders and redraws until the run completes. The run id never changes
    /// once resolved.
    async fn watch(&mut self, repo: &RepositoryId, run_id: RunId) -> Result<Run, DispatchError> {
        let mut cache = AnnotationCache::new();
        let mut cycle: u64 = 0;
        loop {
            cycle += 1;
            let (run, report) = render_run(self.client, repo, run_id, &mut cache).await?;
            debug!(cycle, status = ?run.status, cached_jobs = cache.len(), "rendered");
            if run.is_completed() {
                return Ok(run);
            }

            let frame = self.frame(repo, run_id, &report);
            self.terminal.refresh_screen()?;
            self.terminal.write_frame(&frame)?;

            if self.pacer.pause(self.config.refresh_interval).await == Pause::Interrupted {
                return Err(DispatchError::Interrupted);
            }
        }
    }

    fn frame(&self, repo: &RepositoryId, run_id: RunId, report: &str) -> String {
        format!(
            "Refreshing run status every {} seconds. Press Ctrl+C to quit.\n\n{}\n\n{}",
            self.config.refresh_interval.as_secs(),
            repo.run_permalink(run_id),
            report
        )
    }
}
