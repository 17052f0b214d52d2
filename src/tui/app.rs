//! Application state for the terminal client.

use super::input::move_cursor;
use crossterm::event::KeyCode;
use tictactoe_client::{GameStatus, Interaction, MatchSnapshot, Position};
use tracing::debug;

/// What the terminal shows: the latest snapshot plus the cursor.
pub struct App {
    snapshot: MatchSnapshot,
    cursor: Position,
}

impl App {
    /// Creates the app from the first snapshot.
    pub fn new(snapshot: MatchSnapshot) -> Self {
        Self {
            snapshot,
            cursor: Position::Center,
        }
    }

    /// Gets the latest snapshot.
    pub fn snapshot(&self) -> &MatchSnapshot {
        &self.snapshot
    }

    /// Gets the cursor position.
    pub fn cursor(&self) -> Position {
        self.cursor
    }

    /// Replaces the snapshot with a newer one.
    pub fn update(&mut self, snapshot: MatchSnapshot) {
        debug!(generation = %snapshot.generation, status = %snapshot.status, "Snapshot updated");
        self.snapshot = snapshot;
    }

    /// Maps a key press to an interaction for the driver.
    ///
    /// Digits `1`-`9` and Enter on the cursor both produce a raw cell id, so
    /// every click goes through the same validation.
    pub fn handle_key(&mut self, key: KeyCode) -> Option<Interaction> {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => Some(Interaction::Quit),
            KeyCode::Char('r') => Some(Interaction::Reset),
            KeyCode::Char(c) if c.is_ascii_digit() && c != '0' => {
                let digit = c.to_digit(10)? as usize;
                if let Some(pos) = Position::from_index(digit - 1) {
                    self.cursor = pos;
                }
                Some(Interaction::Cell(Some((digit - 1).to_string())))
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                Some(Interaction::Cell(Some(self.cursor.to_index().to_string())))
            }
            KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right => {
                self.cursor = move_cursor(self.cursor, key);
                None
            }
            _ => None,
        }
    }

    /// One-line description of the match for the status bar.
    pub fn status_line(&self) -> String {
        let snapshot = &self.snapshot;
        if snapshot.stalled {
            return "The move service did not answer. Press 'r' to start over.".to_string();
        }

        match snapshot.status {
            GameStatus::NewGame => {
                "Do you think you can beat the computer? Pick any square to begin.".to_string()
            }
            GameStatus::XWins => "You win! Press 'r' to play again.".to_string(),
            GameStatus::OWins => "O wins. A new game starts shortly...".to_string(),
            GameStatus::Draw => "Draw. A new game starts shortly...".to_string(),
            GameStatus::InProgress if snapshot.awaiting_remote => "O is thinking...".to_string(),
            GameStatus::InProgress => format!(
                "Your move ({} open squares)",
                Position::valid_moves(&snapshot.board).len()
            ),
        }
    }
}
