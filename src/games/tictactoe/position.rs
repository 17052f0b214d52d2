//! Board positions and validation of raw cell identifiers.

use super::types::Board;
use crate::error::MatchError;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// A position on the tic-tac-toe board (0-8, row-major).
///
/// Holding a `Position` means the index is already known to be in range,
/// so board access through it never goes out of bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    /// Top-left (position 0)
    TopLeft,
    /// Top-center (position 1)
    TopCenter,
    /// Top-right (position 2)
    TopRight,
    /// Middle-left (position 3)
    MiddleLeft,
    /// Center (position 4)
    Center,
    /// Middle-right (position 5)
    MiddleRight,
    /// Bottom-left (position 6)
    BottomLeft,
    /// Bottom-center (position 7)
    BottomCenter,
    /// Bottom-right (position 8)
    BottomRight,
}

impl Position {
    /// All 9 positions in index order.
    pub const ALL: [Position; 9] = [
        Position::TopLeft,
        Position::TopCenter,
        Position::TopRight,
        Position::MiddleLeft,
        Position::Center,
        Position::MiddleRight,
        Position::BottomLeft,
        Position::BottomCenter,
        Position::BottomRight,
    ];

    /// Get label for this position (for display).
    pub fn label(&self) -> &'static str {
        match self {
            Position::TopLeft => "Top-left",
            Position::TopCenter => "Top-center",
            Position::TopRight => "Top-right",
            Position::MiddleLeft => "Middle-left",
            Position::Center => "Center",
            Position::MiddleRight => "Middle-right",
            Position::BottomLeft => "Bottom-left",
            Position::BottomCenter => "Bottom-center",
            Position::BottomRight => "Bottom-right",
        }
    }

    /// Converts position to board index (0-8).
    pub fn to_index(self) -> usize {
        self as usize
    }

    /// Creates position from board index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Row (0-2) of this position.
    pub fn row(self) -> usize {
        self.to_index() / 3
    }

    /// Column (0-2) of this position.
    pub fn col(self) -> usize {
        self.to_index() % 3
    }

    /// Creates position from row and column, if both are in range.
    pub fn from_row_col(row: usize, col: usize) -> Option<Self> {
        if row < 3 && col < 3 {
            Self::from_index(row * 3 + col)
        } else {
            None
        }
    }

    /// Extracts a position from the identifier attached to an interacted cell.
    ///
    /// Fails with `InvalidInput` when the identifier is missing, is not an
    /// integer, or is outside `0..9`. Occupancy is not checked here.
    #[instrument]
    pub fn parse_cell_id(raw: Option<&str>) -> Result<Self, MatchError> {
        let raw = raw.ok_or_else(|| MatchError::invalid_input("cell id is missing"))?;

        let index: usize = raw
            .trim()
            .parse()
            .map_err(|_| MatchError::invalid_input(format!("cell id {:?} is not a number", raw)))?;

        let position = Self::from_index(index).ok_or_else(|| {
            MatchError::invalid_input(format!("cell id {} is outside the board", index))
        })?;

        debug!(position = %position, "Parsed cell id");
        Ok(position)
    }

    /// Filters positions by board state - returns only empty cells.
    pub fn valid_moves(board: &Board) -> Vec<Position> {
        Self::ALL
            .iter()
            .copied()
            .filter(|pos| board.is_empty(*pos))
            .collect()
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
