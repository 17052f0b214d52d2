//! Error taxonomy for the match.
//!
//! None of these are fatal: the driver logs them and keeps running.

use crate::games::tictactoe::Generation;
use derive_more::{Display, Error};
use tracing::{debug, error, warn};

/// What went wrong.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum MatchErrorKind {
    /// Missing or malformed cell identifier from the presentation layer.
    #[display("Invalid input: {_0}")]
    InvalidInput(String),
    /// Valid cell, but occupied or not the human's turn.
    #[display("Illegal move: {_0}")]
    IllegalMove(String),
    /// Transport, decoding or consistency failure talking to the move service.
    #[display("Remote failure: {_0}")]
    RemoteFailure(String),
    /// A result issued under an older match generation.
    #[display("Stale response from generation {issued} (current is {current})")]
    StaleResponse {
        /// Generation the work was issued under.
        issued: Generation,
        /// Generation of the live match.
        current: Generation,
    },
}

/// Match error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("{} at {}:{}", kind, file, line)]
pub struct MatchError {
    /// Error kind.
    pub kind: MatchErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl MatchError {
    /// Creates a new match error with caller location tracking.
    #[track_caller]
    pub fn new(kind: MatchErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Shorthand for [`MatchErrorKind::InvalidInput`].
    #[track_caller]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(MatchErrorKind::InvalidInput(message.into()))
    }

    /// Shorthand for [`MatchErrorKind::IllegalMove`].
    #[track_caller]
    pub fn illegal_move(message: impl Into<String>) -> Self {
        Self::new(MatchErrorKind::IllegalMove(message.into()))
    }

    /// Shorthand for [`MatchErrorKind::RemoteFailure`].
    #[track_caller]
    pub fn remote_failure(message: impl Into<String>) -> Self {
        Self::new(MatchErrorKind::RemoteFailure(message.into()))
    }

    /// Shorthand for [`MatchErrorKind::StaleResponse`].
    #[track_caller]
    pub fn stale(issued: Generation, current: Generation) -> Self {
        Self::new(MatchErrorKind::StaleResponse { issued, current })
    }

    /// Logs the error at the level its kind calls for.
    pub fn log(&self) {
        match &self.kind {
            MatchErrorKind::InvalidInput(_) => warn!(error = %self, "Dropped interaction"),
            MatchErrorKind::IllegalMove(_) => warn!(error = %self, "Refused move"),
            MatchErrorKind::RemoteFailure(_) => error!(error = %self, "Move service failed"),
            MatchErrorKind::StaleResponse { .. } => debug!(error = %self, "Discarded stale result"),
        }
    }
}

impl From<reqwest::Error> for MatchError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        Self::remote_failure(format!("HTTP error: {}", err))
    }
}
