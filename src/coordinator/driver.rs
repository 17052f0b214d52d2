//! Async shell around the turn coordinator.
//!
//! The driver is the single control thread: it owns the [`TurnCoordinator`],
//! receives interactions from the presentation, and turns the coordinator's
//! requests into timers and remote calls. Spawned tasks never touch match
//! state; they report back through generation-tagged [`DriverEvent`]s.

use super::machine::{MatchSnapshot, RemoteDispatch, TurnCoordinator};
use super::scheduler::ResetScheduler;
use crate::error::MatchError;
use crate::failure_policy::{request_with_policy, FailurePolicy};
use crate::games::tictactoe::Generation;
use crate::remote_client::{MoveCalculator, MoveVerdict};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, instrument, Instrument};

/// Input from the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    /// A cell was clicked; carries its raw identifier, if it had one.
    Cell(Option<String>),
    /// Start over now.
    Reset,
    /// Stop the driver.
    Quit,
}

/// Results coming back from spawned work.
#[derive(Debug)]
pub enum DriverEvent {
    /// The move service answered (or the policy gave up).
    RemoteVerdict {
        /// Generation the request was issued under.
        generation: Generation,
        /// The verdict or the final error.
        result: Result<MoveVerdict, MatchError>,
    },
    /// A scheduled reset is due.
    ResetDue {
        /// Generation the reset was scheduled under.
        generation: Generation,
    },
}

/// Delays used by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverTimings {
    /// Pause between showing the human move and asking the service.
    pub move_delay: Duration,
    /// Pause before resetting after `Draw`/`OWins`.
    pub reset_delay: Duration,
}

impl Default for DriverTimings {
    fn default() -> Self {
        Self {
            move_delay: Duration::from_millis(750),
            reset_delay: Duration::from_millis(1500),
        }
    }
}

/// Runs one match after another for a single client.
pub struct MatchDriver {
    coordinator: TurnCoordinator,
    calculator: Arc<dyn MoveCalculator>,
    policy: Arc<dyn FailurePolicy>,
    move_delay: Duration,
    scheduler: ResetScheduler,
    events_tx: mpsc::UnboundedSender<DriverEvent>,
    events_rx: mpsc::UnboundedReceiver<DriverEvent>,
    snapshot_tx: watch::Sender<MatchSnapshot>,
}

impl MatchDriver {
    /// Creates a driver and the receiver the presentation renders from.
    #[instrument(skip(calculator, policy), fields(calculator = %calculator.name()))]
    pub fn new(
        calculator: Arc<dyn MoveCalculator>,
        policy: Arc<dyn FailurePolicy>,
        timings: DriverTimings,
    ) -> (Self, watch::Receiver<MatchSnapshot>) {
        let coordinator = TurnCoordinator::new();
        let (snapshot_tx, snapshot_rx) = watch::channel(coordinator.snapshot());
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let driver = Self {
            coordinator,
            calculator,
            policy,
            move_delay: timings.move_delay,
            scheduler: ResetScheduler::new(timings.reset_delay),
            events_tx,
            events_rx,
            snapshot_tx,
        };
        (driver, snapshot_rx)
    }

    /// Returns the coordinator.
    pub fn coordinator(&self) -> &TurnCoordinator {
        &self.coordinator
    }

    /// Handles one interaction. `Quit` is a no-op here; [`run`](Self::run) stops on it.
    #[instrument(skip(self), fields(generation = %self.coordinator.generation()))]
    pub fn handle_interaction(&mut self, interaction: Interaction) -> Result<(), MatchError> {
        match interaction {
            Interaction::Cell(raw) => {
                let dispatch = self.coordinator.play_human(raw.as_deref())?;
                self.publish();
                self.dispatch(dispatch);
            }
            Interaction::Reset => {
                self.coordinator.reset();
                self.publish();
            }
            Interaction::Quit => {}
        }
        Ok(())
    }

    /// Handles a result from spawned work.
    #[instrument(skip(self), fields(current = %self.coordinator.generation()))]
    pub fn handle_event(&mut self, event: DriverEvent) -> Result<(), MatchError> {
        let outcome = match event {
            DriverEvent::RemoteVerdict {
                generation,
                result: Ok(verdict),
            } => self
                .coordinator
                .apply_verdict(generation, verdict)
                .map(|status| {
                    self.scheduler.schedule(status, generation, &self.events_tx);
                }),
            DriverEvent::RemoteVerdict {
                generation,
                result: Err(e),
            } => self.coordinator.record_failure(generation).and(Err(e)),
            DriverEvent::ResetDue { generation } => {
                self.coordinator.reset_if_current(generation).map(|_| ())
            }
        };
        // Failures can still change state (stall flag), so publish either way.
        self.publish();
        outcome
    }

    /// Waits for the next result from spawned work.
    pub async fn next_event(&mut self) -> Option<DriverEvent> {
        self.events_rx.recv().await
    }

    /// Processes interactions and results until `Quit` or the presentation hangs up.
    pub async fn run(mut self, mut interactions: mpsc::UnboundedReceiver<Interaction>) {
        info!("Match driver started");

        loop {
            tokio::select! {
                interaction = interactions.recv() => match interaction {
                    Some(Interaction::Quit) | None => break,
                    Some(interaction) => {
                        if let Err(e) = self.handle_interaction(interaction) {
                            e.log();
                        }
                    }
                },
                Some(event) = self.events_rx.recv() => {
                    if let Err(e) = self.handle_event(event) {
                        e.log();
                    }
                }
            }
        }

        info!("Match driver stopped");
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.coordinator.snapshot());
    }

    /// Sends the board to the move service after the display delay.
    fn dispatch(&self, dispatch: RemoteDispatch) {
        let calculator = Arc::clone(&self.calculator);
        let policy = Arc::clone(&self.policy);
        let events = self.events_tx.clone();
        let delay = self.move_delay;
        let generation = *dispatch.generation();
        let span = tracing::info_span!("remote_dispatch", %generation);

        tokio::spawn(
            async move {
                tokio::time::sleep(delay).await;
                let result =
                    request_with_policy(calculator.as_ref(), policy.as_ref(), dispatch.board()).await;
                if events
                    .send(DriverEvent::RemoteVerdict { generation, result })
                    .is_err()
                {
                    debug!("Driver gone before remote move arrived");
                }
            }
            .instrument(span),
        );
    }
}
