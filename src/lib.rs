//! Tic-tac-toe client library - turn coordination against a remote opponent
//!
//! The human always plays `X` locally; a remote move-calculation service
//! plays `O`. This crate owns the match: it validates clicks, applies the
//! human move, asks the service for its reply, reconciles the answer and
//! starts new matches.
//!
//! # Architecture
//!
//! - **Model**: `Board`, `Cell`, `GameStatus`, `MatchState` (pure values)
//! - **Rules**: cell-id validation and move application (pure functions)
//! - **Remote client**: `PUT /calculate-move` over HTTP behind `MoveCalculator`
//! - **Coordinator**: `TurnCoordinator` state machine and `MatchDriver` async shell
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tictactoe_client::{ClientConfig, HttpMoveClient, Interaction, MatchDriver};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ClientConfig::default();
//! let client = HttpMoveClient::new(config.server_url(), config.request_timeout())?;
//! let (driver, snapshots) = MatchDriver::new(
//!     Arc::new(client),
//!     config.build_failure_policy(),
//!     config.timings(),
//! );
//!
//! let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
//! tokio::spawn(driver.run(rx));
//! tx.send(Interaction::Cell(Some("4".to_string())))?;
//! # let _ = snapshots;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod coordinator;
mod error;
mod failure_policy;
mod games;
mod remote_client;

// Crate-level exports - Configuration
pub use config::{ClientConfig, ConfigError, FailurePolicyKind};

// Crate-level exports - Errors
pub use error::{MatchError, MatchErrorKind};

// Crate-level exports - Coordination
pub use coordinator::{
    DriverEvent, DriverTimings, Interaction, MatchDriver, MatchSnapshot, RemoteDispatch,
    ResetScheduler, TurnCoordinator,
};

// Crate-level exports - Remote move service
pub use failure_policy::{request_with_policy, FailureAction, FailurePolicy, RetryWithBackoff, StallOnFailure};
pub use remote_client::{HttpMoveClient, MoveCalculator, MoveRequest, MoveVerdict, CALCULATE_MOVE_PATH};

// Crate-level exports - Game types
pub use games::tictactoe::{
    apply_move, is_successor_of, Board, Cell, GameStatus, Generation, Mark, MatchState, Position,
    Turn,
};
