mod position;
mod rules;
mod types;

pub use position::Position;
pub use rules::{apply_move, is_successor_of};
pub use types::{Board, Cell, GameStatus, Generation, Mark, MatchState, Turn};
