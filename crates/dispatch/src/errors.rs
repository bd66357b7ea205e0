//! Error taxonomy for dispatching and watching runs.
//!
//! [`TransportError`] is produced by [`crate::RestClient`] implementations and
//! never inspected by the orchestration layer; it is surfaced unmodified.
//! [`DispatchError`] covers everything that stops a dispatch. Nothing here is
//! retryable: the only retry in the system is the run resolver waiting for a
//! run to appear, and that is not an error.

use thiserror::Error;

use crate::WorkflowRef;

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

/// A REST call failed before a response body could be handed back.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The server answered with a non-success status.
    #[error("HTTP {status}: {message} ({url})")]
    Status {
        status: u16,
        /// The `message` field of the error body, or the status reason.
        message: String,
        url: String,
    },

    /// The request never produced a response (DNS, TLS, connection reset...).
    #[error("{0}")]
    Connection(String),

    /// The request path could not be joined onto the API base URL.
    #[error("invalid request path '{path}': {reason}")]
    InvalidUrl { path: String, reason: String },
}

// ---------------------------------------------------------------------------
// Dispatch errors
// ---------------------------------------------------------------------------

/// Errors that abort a dispatch or the watch loop.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A response body was not the expected JSON. The message is exactly the
    /// decoder's.
    #[error(transparent)]
    Decode(#[from] serde_json::Error),

    #[error("failed to get run: {0}")]
    RunFetch(Box<DispatchError>),

    #[error("failed to get jobs: {0}")]
    JobsFetch(Box<DispatchError>),

    #[error("failed to get annotations: {0}")]
    AnnotationsFetch(Box<DispatchError>),

    /// A bounded resolve policy ran out of listing attempts before a running
    /// match appeared.
    #[error("no in-progress run of workflow '{workflow}' found after {attempts} attempts")]
    ResolutionExhausted { workflow: WorkflowRef, attempts: u32 },

    /// A frame could not be written to the terminal.
    #[error("failed to write to the terminal")]
    Terminal(#[from] std::io::Error),

    /// The user interrupted a pause.
    #[error("interrupted")]
    Interrupted,
}

impl DispatchError {
    /// Labels `inner` as a failure to fetch the run.
    pub fn run_fetch(inner: DispatchError) -> Self {
        Self::RunFetch(Box::new(inner))
    }

    /// Labels `inner` as a failure to fetch the run's jobs.
    pub fn jobs_fetch(inner: DispatchError) -> Self {
        Self::JobsFetch(Box::new(inner))
    }

    /// Labels `inner` as a failure to fetch a job's annotations.
    pub fn annotations_fetch(inner: DispatchError) -> Self {
        Self::AnnotationsFetch(Box::new(inner))
    }

    /// Returns `true` if the error only reports a user interrupt.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_keeps_decoder_text() {
        let raw = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let expected = raw.to_string();
        let err = DispatchError::from(raw);
        assert_eq!(err.to_string(), expected);
    }

    #[test]
    fn fetch_wrappers_prefix_the_stage() {
        let err = DispatchError::annotations_fetch(
            TransportError::Status {
                status: 502,
                message: "Bad Gateway".into(),
                url: "https://api.github.com/repos/o/r/check-runs/1/annotations".into(),
            }
            .into(),
        );
        assert_eq!(
            err.to_string(),
            "failed to get annotations: HTTP 502: Bad Gateway (https://api.github.com/repos/o/r/check-runs/1/annotations)"
        );
    }

    #[test]
    fn interrupted_is_recognised() {
        assert!(DispatchError::Interrupted.is_interrupted());
        assert!(!DispatchError::run_fetch(DispatchError::Interrupted).is_interrupted());
    }
}
