//! Port traits implemented by infrastructure crates.
//!
//! The orchestration layer sees GitHub only through [`RestClient`], the screen
//! only through [`Terminal`], and time only through [`Pacer`]. Each can be
//! replaced by an in-memory fake in tests.

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::TransportError;

/// Narrow REST capability over the GitHub API.
///
/// Paths are relative to the API root (`repos/{owner}/{name}/...`) and may
/// carry a query string. Response bodies are returned undecoded so decoding
/// failures surface with the decoder's own message; an empty body (e.g.
/// `204 No Content`) is returned as an empty string.
#[async_trait]
pub trait RestClient: Send + Sync {
    async fn get(&self, path: &str) -> Result<String, TransportError>;

    async fn post(&self, path: &str, body: &Value) -> Result<String, TransportError>;
}

/// Screen primitives used by the redraw loop.
///
/// Implementations for non-interactive outputs make the screen operations
/// no-ops and simply append frames.
pub trait Terminal {
    fn enter_alternate_screen(&mut self) -> io::Result<()>;

    fn leave_alternate_screen(&mut self) -> io::Result<()>;

    /// Clears the visible screen so the next frame is drawn from the top.
    fn refresh_screen(&mut self) -> io::Result<()>;

    fn write_frame(&mut self, frame: &str) -> io::Result<()>;
}

/// How a [`Pacer::pause`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pause {
    Elapsed,
    Interrupted,
}

/// Cancellable waiting between polls.
#[async_trait]
pub trait Pacer: Send + Sync {
    /// Waits for `interval` unless the user interrupts first.
    ///
    /// A zero interval returns immediately but still reports a pending
    /// interrupt.
    async fn pause(&self, interval: Duration) -> Pause;
}
