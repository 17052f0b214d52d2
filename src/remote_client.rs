//! Client for the remote move-calculation service.
//!
//! One `PUT {server_url}/calculate-move` per human turn. The request always
//! claims an in-progress game; the response carries the service's board and
//! its verdict on the match.

use crate::error::MatchError;
use crate::games::tictactoe::{Board, GameStatus};
use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Path of the move-calculation endpoint, relative to the server URL.
pub const CALCULATE_MOVE_PATH: &str = "calculate-move";

/// Request body sent to the move service.
#[derive(Debug, Clone, Serialize)]
pub struct MoveRequest<'a> {
    /// Current board.
    pub board: &'a Board,
    /// Always `InProgress`.
    pub status: GameStatus,
}

impl<'a> MoveRequest<'a> {
    /// Builds a request for the given board.
    pub fn in_progress(board: &'a Board) -> Self {
        Self {
            board,
            status: GameStatus::InProgress,
        }
    }
}

/// The service's answer: its board and the resulting status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct MoveVerdict {
    /// Board after the remote side's move.
    board: Board,
    /// Match status as judged by the service.
    status: GameStatus,
}

impl MoveVerdict {
    /// Splits the verdict into its parts.
    pub fn into_parts(self) -> (Board, GameStatus) {
        (self.board, self.status)
    }
}

/// Anything that can answer a human move with the remote side's move.
#[async_trait::async_trait]
pub trait MoveCalculator: Send + Sync {
    /// Asks for the remote side's reply to `board`.
    async fn calculate_move(&self, board: &Board) -> Result<MoveVerdict, MatchError>;

    /// Returns a display name for logs.
    fn name(&self) -> &str;
}

/// HTTP implementation of [`MoveCalculator`].
#[derive(Debug, Clone)]
pub struct HttpMoveClient {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpMoveClient {
    /// Creates a client for the service at `base_url`.
    ///
    /// With `timeout = None` a request waits as long as the service does.
    #[instrument(skip_all, fields(base_url = %base_url, timeout = ?timeout))]
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, MatchError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        let endpoint = format!("{}/{}", base_url.trim_end_matches('/'), CALCULATE_MOVE_PATH);
        info!(endpoint = %endpoint, "Created move service client");

        Ok(Self { endpoint, client })
    }

    /// Returns the full endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl MoveCalculator for HttpMoveClient {
    #[instrument(skip(self, board), fields(endpoint = %self.endpoint))]
    async fn calculate_move(&self, board: &Board) -> Result<MoveVerdict, MatchError> {
        debug!(board = ?board.cells(), "Requesting remote move");

        let response = self
            .client
            .put(&self.endpoint)
            .json(&MoveRequest::in_progress(board))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MatchError::remote_failure(format!(
                "service answered {}: {}",
                status, body
            )));
        }

        let body = response.text().await?;
        let verdict: MoveVerdict = serde_json::from_str(&body).map_err(|e| {
            MatchError::remote_failure(format!("undecodable response ({}): {}", e, body))
        })?;

        debug!(status = %verdict.status, board = ?verdict.board.cells(), "Received remote move");
        Ok(verdict)
    }

    fn name(&self) -> &str {
        &self.endpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::tictactoe::{Cell, Position};

    #[test]
    fn test_request_always_claims_in_progress() {
        let board = Board::new().with(Position::TopLeft, Cell::X);
        let json = serde_json::to_value(MoveRequest::in_progress(&board)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "board": ["x", "", "", "", "", "", "", "", ""],
                "status": "InProgress"
            })
        );
    }

    #[test]
    fn test_verdict_decodes_service_payload() {
        let verdict: MoveVerdict = serde_json::from_str(
            r#"{"board":["x","","","","o","","","",""],"status":"InProgress"}"#,
        )
        .unwrap();
        assert_eq!(verdict.board().get(Position::Center), Cell::O);
        assert_eq!(*verdict.status(), GameStatus::InProgress);
    }

    #[test]
    fn test_endpoint_joins_path() {
        let client = HttpMoveClient::new("http://localhost:3000/", None).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:3000/calculate-move");
    }
}
