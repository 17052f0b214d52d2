//! Core domain types for the client-side match.

use derive_more::Display;
use serde::{Deserialize, Serialize};

use super::position::Position;

/// Mark placed by a player.
///
/// The local human always plays `X`; the remote move calculator always plays `O`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum Mark {
    /// The human side (moves first).
    X,
    /// The remote side.
    O,
}

impl Mark {
    /// Returns the opposing mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

/// Alias used where a mark identifies whose move is next.
pub type Turn = Mark;

/// A single cell on the board.
///
/// Serialized as `""`, `"x"` or `"o"`, which is what the move-calculation
/// service speaks on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    /// Nobody has played here.
    #[default]
    #[serde(rename = "")]
    Empty,
    /// Claimed by `X`.
    #[serde(rename = "x")]
    X,
    /// Claimed by `O`.
    #[serde(rename = "o")]
    O,
}

impl Cell {
    /// Returns the mark in this cell, if any.
    pub fn mark(self) -> Option<Mark> {
        match self {
            Cell::Empty => None,
            Cell::X => Some(Mark::X),
            Cell::O => Some(Mark::O),
        }
    }
}

impl From<Mark> for Cell {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::X => Cell::X,
            Mark::O => Cell::O,
        }
    }
}

/// 3x3 board as an immutable value.
///
/// Always exactly nine cells in row-major order. Decoding anything other
/// than a nine-element array fails.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: [Cell; 9],
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; 9],
        }
    }

    /// Gets the cell at a position.
    pub fn get(&self, pos: Position) -> Cell {
        self.cells[pos.to_index()]
    }

    /// Checks if a cell is empty.
    pub fn is_empty(&self, pos: Position) -> bool {
        self.get(pos) == Cell::Empty
    }

    /// Returns a copy of this board with one cell replaced.
    ///
    /// The receiver is left untouched so earlier snapshots stay valid.
    pub fn with(&self, pos: Position, cell: Cell) -> Self {
        let mut cells = self.cells;
        cells[pos.to_index()] = cell;
        Self { cells }
    }

    /// Returns all cells.
    pub fn cells(&self) -> &[Cell; 9] {
        &self.cells
    }

    /// Formats the board as a human-readable string.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for (i, cell) in self.cells.iter().enumerate() {
            if i > 0 && i % 3 == 0 {
                result.push_str("\n-+-+-\n");
            }
            match cell.mark() {
                Some(mark) => result.push_str(&mark.to_string()),
                None => result.push_str(&(i + 1).to_string()),
            }
            if i % 3 < 2 {
                result.push('|');
            }
        }
        result
    }
}

/// Status of a match, as exchanged with the move-calculation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum GameStatus {
    /// Fresh match, nobody has moved.
    NewGame,
    /// Moves are being exchanged.
    InProgress,
    /// The human completed a line.
    XWins,
    /// The remote side completed a line.
    OWins,
    /// Board full with no line.
    Draw,
}

impl GameStatus {
    /// Terminal statuses accept no further moves until a reset.
    pub fn is_terminal(self) -> bool {
        matches!(self, GameStatus::XWins | GameStatus::OWins | GameStatus::Draw)
    }

    /// Statuses in which moves are still exchanged.
    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }
}

/// Monotonic counter identifying one match; bumped on every reset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Display, Serialize, Deserialize,
)]
#[display("{_0}")]
pub struct Generation(u64);

impl Generation {
    /// Returns the generation that follows this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// The authoritative state of the current match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchState {
    board: Board,
    status: GameStatus,
    turn: Turn,
}

impl MatchState {
    /// Fresh match: empty board, `NewGame`, human to move.
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            status: GameStatus::NewGame,
            turn: Mark::X,
        }
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the match status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Returns whose move is next.
    pub fn turn(&self) -> Turn {
        self.turn
    }

    /// Replaces the whole state. Only the turn coordinator calls this.
    pub(crate) fn replace(&mut self, board: Board, status: GameStatus, turn: Turn) {
        self.board = board;
        self.status = status;
        self.turn = turn;
    }
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_wire_format() {
        let board = Board::new()
            .with(Position::TopLeft, Cell::X)
            .with(Position::Center, Cell::O);
        let json = serde_json::to_string(&board).unwrap();
        assert_eq!(json, r#"["x","","","","o","","","",""]"#);
    }

    #[test]
    fn test_board_rejects_wrong_length() {
        let result: Result<Board, _> = serde_json::from_str(r#"["x","","","","o","","",""]"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_board_rejects_unknown_mark() {
        let result: Result<Board, _> = serde_json::from_str(r#"["0","","","","","","","",""]"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_with_leaves_original_untouched() {
        let board = Board::new();
        let next = board.with(Position::Center, Cell::X);
        assert_eq!(board, Board::new());
        assert_eq!(next.get(Position::Center), Cell::X);
    }

    #[test]
    fn test_status_terminality() {
        assert!(GameStatus::NewGame.is_active());
        assert!(GameStatus::InProgress.is_active());
        assert!(GameStatus::XWins.is_terminal());
        assert!(GameStatus::OWins.is_terminal());
        assert!(GameStatus::Draw.is_terminal());
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(serde_json::to_string(&GameStatus::InProgress).unwrap(), r#""InProgress""#);
        let status: GameStatus = serde_json::from_str(r#""OWins""#).unwrap();
        assert_eq!(status, GameStatus::OWins);
    }

    #[test]
    fn test_fresh_match_state() {
        let state = MatchState::new();
        assert_eq!(state.board(), &Board::new());
        assert_eq!(state.status(), GameStatus::NewGame);
        assert_eq!(state.turn(), Mark::X);
    }

    #[test]
    fn test_display_marks_and_numbers() {
        let board = Board::new().with(Position::TopLeft, Cell::X);
        assert_eq!(board.display(), "X|2|3\n-+-+-\n4|5|6\n-+-+-\n7|8|9");
    }
}
