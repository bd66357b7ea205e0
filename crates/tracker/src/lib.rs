//! gh-dispatch orchestration.
//!
//! Triggers a dispatch, resolves the run it started, and redraws the run's job
//! tree and annotations until it completes.
//!
//! ## Architectural Layer
//!
//! **Orchestration.** Functions here sequence calls through the
//! [`dispatch::RestClient`], [`dispatch::Terminal`], and [`dispatch::Pacer`]
//! ports. They never touch HTTP, the terminal, or the clock directly.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`fetch`] | Run, job, annotation, and run-listing accessors |
//! | [`render`] | Report rendering and annotation caching decisions |
//! | [`resolve`] | Finding the run a dispatch started |
//! | [`trigger`] | Issuing the dispatch |
//! | [`dispatcher`] | The poll/redraw loop |

pub mod dispatcher;
pub mod fetch;
pub mod render;
pub mod resolve;
pub mod trigger;

pub use dispatcher::{DispatchOutcome, Dispatcher, WatchConfig, DEFAULT_REFRESH_INTERVAL};
pub use fetch::{fetch_annotations, fetch_jobs, fetch_run, list_runs};
pub use render::{compose_report, render_run};
pub use resolve::{resolve_run, ResolvePolicy};
pub use trigger::trigger;
