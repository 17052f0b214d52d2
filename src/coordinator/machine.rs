//! The turn-taking state machine.
//!
//! `TurnCoordinator` is the only owner of [`MatchState`] and the only gate
//! for moves. It performs no I/O and never waits: the driver feeds it
//! interactions and remote results and carries out the work it hands back.

use crate::error::MatchError;
use crate::games::tictactoe::{
    apply_move, is_successor_of, Board, GameStatus, Generation, Mark, MatchState, Position, Turn,
};
use crate::remote_client::MoveVerdict;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Remote request the coordinator wants sent, tagged with its generation.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct RemoteDispatch {
    /// Generation the request belongs to.
    generation: Generation,
    /// Board to send, after the human move.
    board: Board,
}

/// Read-only view handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    /// Current board.
    pub board: Board,
    /// Current status.
    pub status: GameStatus,
    /// Whose move is next.
    pub turn: Turn,
    /// Generation of the live match.
    pub generation: Generation,
    /// A remote move has been requested and not yet applied.
    pub awaiting_remote: bool,
    /// The last remote request failed and nothing more will happen until a reset.
    pub stalled: bool,
}

impl Default for MatchSnapshot {
    fn default() -> Self {
        TurnCoordinator::new().snapshot()
    }
}

/// Turn-taking state machine for one client.
#[derive(Debug, Clone, Default)]
pub struct TurnCoordinator {
    state: MatchState,
    generation: Generation,
    stalled: bool,
}

impl TurnCoordinator {
    /// Starts at generation 0 with a fresh match.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the match state.
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// Returns the live generation.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// True after a remote failure, until the next reset.
    pub fn is_stalled(&self) -> bool {
        self.stalled
    }

    /// True while the remote side owes a move.
    pub fn is_awaiting_remote(&self) -> bool {
        self.state.turn() == Mark::O && self.state.status().is_active() && !self.stalled
    }

    /// Captures the current state for the presentation layer.
    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            board: self.state.board().clone(),
            status: self.state.status(),
            turn: self.state.turn(),
            generation: self.generation,
            awaiting_remote: self.is_awaiting_remote(),
            stalled: self.stalled,
        }
    }

    /// Handles a human click carrying the raw cell identifier.
    ///
    /// On success the human's `X` is on the board, the status is
    /// `InProgress`, the turn is `O`, and the returned dispatch must be sent
    /// to the move service. On any error the state is untouched.
    #[instrument(skip(self), fields(generation = %self.generation))]
    pub fn play_human(&mut self, raw: Option<&str>) -> Result<RemoteDispatch, MatchError> {
        let position = Position::parse_cell_id(raw)?;

        let status = self.state.status();
        if status.is_terminal() {
            return Err(MatchError::illegal_move(format!("match is over ({})", status)));
        }
        if self.state.turn() != Mark::X {
            return Err(MatchError::illegal_move("waiting for the remote move"));
        }

        let board = apply_move(self.state.board(), position, Mark::X)?;
        self.state
            .replace(board.clone(), GameStatus::InProgress, Mark::X.opponent());

        info!(position = %position, "Human move applied");
        Ok(RemoteDispatch {
            generation: self.generation,
            board,
        })
    }

    /// Applies the move service's verdict for `generation`.
    ///
    /// The board is replaced wholesale. `NewGame` from the service counts as
    /// `InProgress`. Returns the resulting status.
    #[instrument(skip(self, verdict), fields(current = %self.generation))]
    pub fn apply_verdict(
        &mut self,
        generation: Generation,
        verdict: MoveVerdict,
    ) -> Result<GameStatus, MatchError> {
        self.check_pending(generation)?;

        let (board, status) = verdict.into_parts();
        if !is_successor_of(&board, self.state.board()) {
            self.stalled = true;
            return Err(MatchError::remote_failure(format!(
                "service board {:?} drops marks from {:?}",
                board.cells(),
                self.state.board().cells()
            )));
        }

        let status = match status {
            GameStatus::NewGame => GameStatus::InProgress,
            other => other,
        };
        self.state.replace(board, status, Mark::X);

        info!(status = %status, "Remote move applied");
        Ok(status)
    }

    /// Records that the remote request for `generation` failed for good.
    ///
    /// The match stays `InProgress` with `O` to move until reset.
    #[instrument(skip(self), fields(current = %self.generation))]
    pub fn record_failure(&mut self, generation: Generation) -> Result<(), MatchError> {
        self.check_pending(generation)?;
        self.stalled = true;
        info!("Match stalled awaiting reset");
        Ok(())
    }

    /// Starts a new match, invalidating all outstanding work.
    #[instrument(skip(self), fields(previous = %self.generation))]
    pub fn reset(&mut self) -> Generation {
        self.state = MatchState::new();
        self.generation = self.generation.next();
        self.stalled = false;
        info!(generation = %self.generation, "New match");
        self.generation
    }

    /// Runs a scheduled reset if it still targets the live match.
    pub fn reset_if_current(&mut self, generation: Generation) -> Result<Generation, MatchError> {
        if generation != self.generation {
            return Err(MatchError::stale(generation, self.generation));
        }
        Ok(self.reset())
    }

    /// A remote result is only wanted for the live generation while `O` owes a move.
    fn check_pending(&self, generation: Generation) -> Result<(), MatchError> {
        if generation != self.generation || !self.is_awaiting_remote() {
            debug!(issued = %generation, "Result does not match a pending request");
            return Err(MatchError::stale(generation, self.generation));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MatchErrorKind;
    use crate::games::tictactoe::Cell;

    fn board_from(cells: [&str; 9]) -> Board {
        serde_json::from_value(serde_json::json!(cells)).unwrap()
    }

    fn verdict(cells: [&str; 9], status: GameStatus) -> MoveVerdict {
        MoveVerdict::new(board_from(cells), status)
    }

    #[test]
    fn test_human_move_from_new_game() {
        let mut coordinator = TurnCoordinator::new();
        let dispatch = coordinator.play_human(Some("4")).unwrap();

        let state = coordinator.state();
        assert_eq!(state.board().get(Position::Center), Cell::X);
        assert_eq!(state.status(), GameStatus::InProgress);
        assert_eq!(state.turn(), Mark::O);
        for pos in Position::ALL.iter().filter(|p| **p != Position::Center) {
            assert_eq!(state.board().get(*pos), Cell::Empty);
        }
        assert_eq!(dispatch.board(), state.board());
        assert_eq!(*dispatch.generation(), Generation::default());
        assert!(coordinator.is_awaiting_remote());
    }

    #[test]
    fn test_invalid_input_leaves_state_unchanged() {
        let mut coordinator = TurnCoordinator::new();
        let before = coordinator.snapshot();

        for raw in [None, Some("x"), Some("9")] {
            let err = coordinator.play_human(raw).unwrap_err();
            assert!(matches!(err.kind, MatchErrorKind::InvalidInput(_)));
        }
        assert_eq!(coordinator.snapshot(), before);
    }

    #[test]
    fn test_refuses_move_while_remote_to_play() {
        let mut coordinator = TurnCoordinator::new();
        coordinator.play_human(Some("0")).unwrap();
        let before = coordinator.snapshot();

        let err = coordinator.play_human(Some("1")).unwrap_err();
        assert!(matches!(err.kind, MatchErrorKind::IllegalMove(_)));
        assert_eq!(coordinator.snapshot(), before);
    }

    #[test]
    fn test_refuses_occupied_cell() {
        let mut coordinator = TurnCoordinator::new();
        let generation = coordinator.generation();
        coordinator.play_human(Some("0")).unwrap();
        coordinator
            .apply_verdict(generation, verdict(["x", "", "", "", "o", "", "", "", ""], GameStatus::InProgress))
            .unwrap();
        let before = coordinator.snapshot();

        for raw in ["0", "4"] {
            let err = coordinator.play_human(Some(raw)).unwrap_err();
            assert!(matches!(err.kind, MatchErrorKind::IllegalMove(_)));
        }
        assert_eq!(coordinator.snapshot(), before);
    }

    #[test]
    fn test_end_to_end_round() {
        let mut coordinator = TurnCoordinator::new();
        let dispatch = coordinator.play_human(Some("0")).unwrap();
        let status = coordinator
            .apply_verdict(
                *dispatch.generation(),
                verdict(["x", "", "", "", "o", "", "", "", ""], GameStatus::InProgress),
            )
            .unwrap();

        assert_eq!(status, GameStatus::InProgress);
        let state = coordinator.state();
        assert_eq!(state.turn(), Mark::X);
        assert_eq!(state.status(), GameStatus::InProgress);
        assert_eq!(state.board(), &board_from(["x", "", "", "", "o", "", "", "", ""]));
    }

    #[test]
    fn test_terminal_verdict_replaces_board_wholesale() {
        let mut coordinator = TurnCoordinator::new();
        coordinator.play_human(Some("0")).unwrap();
        coordinator
            .apply_verdict(Generation::default(), verdict(["x", "", "", "", "o", "", "", "", ""], GameStatus::InProgress))
            .unwrap();
        coordinator.play_human(Some("8")).unwrap();

        let winning = ["x", "", "o", "", "o", "", "o", "", "x"];
        let status = coordinator
            .apply_verdict(Generation::default(), verdict(winning, GameStatus::OWins))
            .unwrap();

        assert_eq!(status, GameStatus::OWins);
        assert_eq!(coordinator.state().status(), GameStatus::OWins);
        assert_eq!(coordinator.state().turn(), Mark::X);
        assert_eq!(coordinator.state().board(), &board_from(winning));
    }

    #[test]
    fn test_refuses_moves_after_terminal_status() {
        let mut coordinator = TurnCoordinator::new();
        coordinator.play_human(Some("0")).unwrap();
        coordinator
            .apply_verdict(Generation::default(), verdict(["x", "", "", "", "", "", "", "", ""], GameStatus::XWins))
            .unwrap();
        let before = coordinator.snapshot();

        let err = coordinator.play_human(Some("5")).unwrap_err();
        assert!(matches!(err.kind, MatchErrorKind::IllegalMove(_)));
        assert_eq!(coordinator.snapshot(), before);
    }

    #[test]
    fn test_new_game_verdict_counts_as_in_progress() {
        let mut coordinator = TurnCoordinator::new();
        coordinator.play_human(Some("0")).unwrap();
        let status = coordinator
            .apply_verdict(Generation::default(), verdict(["x", "o", "", "", "", "", "", "", ""], GameStatus::NewGame))
            .unwrap();
        assert_eq!(status, GameStatus::InProgress);
    }

    #[test]
    fn test_stale_verdict_is_ignored() {
        let mut coordinator = TurnCoordinator::new();
        let dispatch = coordinator.play_human(Some("0")).unwrap();
        coordinator.reset();
        let before = coordinator.snapshot();

        let err = coordinator
            .apply_verdict(
                *dispatch.generation(),
                verdict(["x", "", "", "", "o", "", "", "", ""], GameStatus::InProgress),
            )
            .unwrap_err();
        assert!(matches!(err.kind, MatchErrorKind::StaleResponse { .. }));
        assert_eq!(coordinator.snapshot(), before);
    }

    #[test]
    fn test_unrequested_verdict_is_ignored() {
        let mut coordinator = TurnCoordinator::new();
        let before = coordinator.snapshot();
        let err = coordinator
            .apply_verdict(Generation::default(), verdict(["", "", "", "", "o", "", "", "", ""], GameStatus::InProgress))
            .unwrap_err();
        assert!(matches!(err.kind, MatchErrorKind::StaleResponse { .. }));
        assert_eq!(coordinator.snapshot(), before);
    }

    #[test]
    fn test_verdict_that_reverts_a_cell_is_rejected() {
        let mut coordinator = TurnCoordinator::new();
        coordinator.play_human(Some("0")).unwrap();
        let board_before = coordinator.state().board().clone();

        let err = coordinator
            .apply_verdict(Generation::default(), verdict(["", "", "", "", "o", "", "", "", ""], GameStatus::InProgress))
            .unwrap_err();
        assert!(matches!(err.kind, MatchErrorKind::RemoteFailure(_)));
        assert_eq!(coordinator.state().board(), &board_before);
        assert_eq!(coordinator.state().turn(), Mark::O);
        assert!(coordinator.is_stalled());
    }

    #[test]
    fn test_failure_stalls_until_reset() {
        let mut coordinator = TurnCoordinator::new();
        coordinator.play_human(Some("0")).unwrap();
        coordinator.record_failure(Generation::default()).unwrap();

        assert!(coordinator.is_stalled());
        assert_eq!(coordinator.state().status(), GameStatus::InProgress);
        assert_eq!(coordinator.state().turn(), Mark::O);
        assert!(coordinator.play_human(Some("1")).is_err());

        let generation = coordinator.reset();
        assert_eq!(generation, Generation::default().next());
        assert!(!coordinator.is_stalled());
        assert_eq!(coordinator.state(), &MatchState::new());
    }

    #[test]
    fn test_scheduled_reset_checks_generation() {
        let mut coordinator = TurnCoordinator::new();
        let first = coordinator.generation();
        coordinator.reset();

        let err = coordinator.reset_if_current(first).unwrap_err();
        assert!(matches!(err.kind, MatchErrorKind::StaleResponse { .. }));
        assert_eq!(coordinator.generation(), first.next());

        let current = coordinator.generation();
        assert_eq!(coordinator.reset_if_current(current).unwrap(), current.next());
    }
}
