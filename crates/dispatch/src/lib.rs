//! Core domain for gh-dispatch.
//!
//! This crate contains every identifier, wire type, error type, and port trait
//! used to trigger a GitHub Actions dispatch and watch the run it starts.
//! Infrastructure crates implement the traits defined here; orchestration lives
//! in the `tracker` crate.
//!
//! ## Architectural Layer
//!
//! **Domain + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`RepositoryId`, `RunId`, `JobId`, etc.) |
//! | [`types`] | Runs, jobs, steps, annotations, and dispatch requests |
//! | [`errors`] | `TransportError` and `DispatchError` |
//! | [`cache`] | `AnnotationCache` |
//! | [`ports`] | `RestClient`, `Terminal`, and `Pacer` traits |

pub mod cache;
pub mod errors;
pub mod identifiers;
pub mod ports;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use cache::AnnotationCache;
pub use errors::{DispatchError, TransportError};
pub use identifiers::{EventType, GitRef, InvocationId, JobId, RepositoryId, RunId, WorkflowRef};
pub use ports::{Pacer, Pause, RestClient, Terminal};
pub use types::{
    Annotation, AnnotationLevel, AnnotationRecord, Conclusion, DispatchEvent, DispatchRequest,
    EventKind, Job, JobsPage, Run, RunQuery, RunStatus, Step, WorkflowRuns,
};
