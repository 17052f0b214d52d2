//! Automatic reset after the match ends.

use super::driver::DriverEvent;
use crate::games::tictactoe::{GameStatus, Generation};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument};

/// Schedules a fresh match a fixed delay after certain terminal statuses.
///
/// Only `Draw` and `OWins` reset on their own. `XWins` waits for a manual
/// reset; whether that asymmetry is intended is still an open product
/// question, so it is kept as is.
#[derive(Debug, Clone, Copy)]
pub struct ResetScheduler {
    delay: Duration,
}

impl ResetScheduler {
    /// Creates a scheduler with the given delay.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Returns the delay before a reset.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Whether `status` triggers an automatic reset.
    pub fn resets_after(status: GameStatus) -> bool {
        matches!(status, GameStatus::Draw | GameStatus::OWins)
    }

    /// Arms the reset timer for `generation` if `status` calls for it.
    ///
    /// The timer task only sends [`DriverEvent::ResetDue`]; the driver decides
    /// whether the generation is still live when it arrives.
    #[instrument(skip(self, events), fields(delay = ?self.delay))]
    pub fn schedule(
        &self,
        status: GameStatus,
        generation: Generation,
        events: &mpsc::UnboundedSender<DriverEvent>,
    ) -> bool {
        if !Self::resets_after(status) {
            debug!("No automatic reset for this status");
            return false;
        }

        info!("Reset scheduled");
        let delay = self.delay;
        let events = events.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if events.send(DriverEvent::ResetDue { generation }).is_err() {
                debug!(%generation, "Driver gone before reset fired");
            }
        });
        true
    }
}
