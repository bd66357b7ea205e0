//! Ctrl+C handling and the production [`Pacer`].
//!
//! The first Ctrl+C only raises a flag; the loop notices it at its next pause
//! and unwinds normally so the terminal is restored on the way out. A second
//! Ctrl+C means the loop is stuck in a request: the screen is restored here and
//! the process exits at once.

use std::time::Duration;

use async_trait::async_trait;
use dispatch::{Pacer, Pause};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::terminal;

/// Exit status for a run cut short by the user.
pub const INTERRUPTED_EXIT_CODE: u8 = 130;

/// Sleeps between polls unless the user has asked to stop.
#[derive(Debug, Clone)]
pub struct InterruptPacer {
    interrupted: watch::Receiver<bool>,
}

impl InterruptPacer {
    /// Spawns the Ctrl+C listener. Must be called inside a Tokio runtime.
    pub fn install() -> Self {
        let (tx, rx) = watch::channel(false);
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = %err, "cannot listen for Ctrl+C");
                return;
            }
            debug!("interrupt requested");
            let _ = tx.send(true);

            if tokio::signal::ctrl_c().await.is_ok() {
                terminal::force_restore();
                std::process::exit(i32::from(INTERRUPTED_EXIT_CODE));
            }
        });
        Self::from_receiver(rx)
    }

    /// Wraps an existing interrupt flag; `true` means the user asked to stop.
    pub fn from_receiver(interrupted: watch::Receiver<bool>) -> Self {
        Self { interrupted }
    }

    /// Returns `true` once Ctrl+C has been pressed.
    pub fn is_interrupted(&self) -> bool {
        *self.interrupted.borrow()
    }
}

#[async_trait]
impl Pacer for InterruptPacer {
    async fn pause(&self, interval: Duration) -> Pause {
        if self.is_interrupted() {
            return Pause::Interrupted;
        }
        if interval.is_zero() {
            return Pause::Elapsed;
        }

        let mut rx = self.interrupted.clone();
        let sleep = tokio::time::sleep(interval);
        tokio::pin!(sleep);
        tokio::select! {
            _ = &mut sleep => Pause::Elapsed,
            true = async { rx.wait_for(|flag| *flag).await.is_ok() } => Pause::Interrupted,
        }
    }
}
