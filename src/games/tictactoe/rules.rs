//! Pure board transformations.
//!
//! Nothing here mutates a board in place: every function takes a snapshot
//! and returns a new value, so a snapshot handed to another component stays
//! exactly as it was.

use super::position::Position;
use super::types::{Board, Cell, Mark};
use crate::error::MatchError;
use tracing::instrument;

/// Places `mark` on an empty cell, producing a new board.
///
/// # Errors
///
/// Returns `IllegalMove` if the cell is already occupied. The input board is
/// never modified.
#[instrument(skip_all, fields(position = %pos, mark = %mark))]
pub fn apply_move(board: &Board, pos: Position, mark: Mark) -> Result<Board, MatchError> {
    if let Some(owner) = board.get(pos).mark() {
        return Err(MatchError::illegal_move(format!(
            "{} is already taken by {}",
            pos, owner
        )));
    }

    Ok(board.with(pos, Cell::from(mark)))
}

/// Checks that `next` could follow `previous` within one match.
///
/// Every claimed cell of `previous` must carry the same mark in `next`;
/// empty cells may stay empty or be claimed by either side.
pub fn is_successor_of(next: &Board, previous: &Board) -> bool {
    previous
        .cells()
        .iter()
        .zip(next.cells().iter())
        .all(|(before, after)| *before == Cell::Empty || before == after)
}
