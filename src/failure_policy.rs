//! What to do when the move service fails.
//!
//! The state machine never retries on its own. Every remote call goes
//! through [`request_with_policy`], so swapping the policy is the only change
//! needed to move from the stall-on-failure behavior to retries.

use crate::error::MatchError;
use crate::games::tictactoe::Board;
use crate::remote_client::{MoveCalculator, MoveVerdict};
use derive_new::new;
use std::fmt::Debug;
use std::time::Duration;
use tracing::{instrument, warn};

/// Decision taken after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureAction {
    /// Try again after waiting.
    Retry {
        /// Pause before the next attempt.
        after: Duration,
    },
    /// Stop and report the failure; the match stalls.
    GiveUp,
}

/// Policy consulted after each failed remote attempt.
pub trait FailurePolicy: Send + Sync + Debug {
    /// Decides what follows failed attempt number `attempt` (1-based).
    fn on_failure(&self, attempt: u32, error: &MatchError) -> FailureAction;
}

/// Give up on the first failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct StallOnFailure;

impl FailurePolicy for StallOnFailure {
    fn on_failure(&self, _attempt: u32, _error: &MatchError) -> FailureAction {
        FailureAction::GiveUp
    }
}

/// Retry a bounded number of times with linearly growing pauses.
#[derive(Debug, Clone, Copy, new)]
pub struct RetryWithBackoff {
    max_retries: u32,
    backoff: Duration,
}

impl FailurePolicy for RetryWithBackoff {
    fn on_failure(&self, attempt: u32, _error: &MatchError) -> FailureAction {
        if attempt > self.max_retries {
            FailureAction::GiveUp
        } else {
            FailureAction::Retry {
                after: self.backoff * attempt,
            }
        }
    }
}

/// Calls the move service, consulting `policy` after every failure.
///
/// Returns the first verdict, or the last error once the policy gives up.
#[instrument(skip_all, fields(calculator = %calculator.name(), policy = ?policy))]
pub async fn request_with_policy(
    calculator: &dyn MoveCalculator,
    policy: &dyn FailurePolicy,
    board: &Board,
) -> Result<MoveVerdict, MatchError> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match calculator.calculate_move(board).await {
            Ok(verdict) => return Ok(verdict),
            Err(e) => match policy.on_failure(attempt, &e) {
                FailureAction::Retry { after } => {
                    warn!(attempt, error = %e, retry_in = ?after, "Remote move failed, retrying");
                    tokio::time::sleep(after).await;
                }
                FailureAction::GiveUp => return Err(e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::tictactoe::GameStatus;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails a fixed number of times, then answers.
    struct Flaky {
        failures: u32,
        calls: AtomicU32,
    }

    #[async_trait::async_trait]
    impl MoveCalculator for Flaky {
        async fn calculate_move(&self, board: &Board) -> Result<MoveVerdict, MatchError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.failures {
                Err(MatchError::remote_failure("connection refused"))
            } else {
                Ok(MoveVerdict::new(board.clone(), GameStatus::InProgress))
            }
        }

        fn name(&self) -> &str {
            "flaky"
        }
    }

    #[test]
    fn test_stall_gives_up_immediately() {
        let err = MatchError::remote_failure("boom");
        assert_eq!(StallOnFailure.on_failure(1, &err), FailureAction::GiveUp);
    }

    #[test]
    fn test_retry_backoff_grows_then_gives_up() {
        let policy = RetryWithBackoff::new(2, Duration::from_millis(100));
        let err = MatchError::remote_failure("boom");
        assert_eq!(
            policy.on_failure(1, &err),
            FailureAction::Retry { after: Duration::from_millis(100) }
        );
        assert_eq!(
            policy.on_failure(2, &err),
            FailureAction::Retry { after: Duration::from_millis(200) }
        );
        assert_eq!(policy.on_failure(3, &err), FailureAction::GiveUp);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stall_policy_makes_one_attempt() {
        let flaky = Flaky { failures: 1, calls: AtomicU32::new(0) };
        let result = request_with_policy(&flaky, &StallOnFailure, &Board::new()).await;
        assert!(result.is_err());
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_policy_recovers() {
        let flaky = Flaky { failures: 2, calls: AtomicU32::new(0) };
        let policy = RetryWithBackoff::new(3, Duration::from_millis(50));
        let result = request_with_policy(&flaky, &policy, &Board::new()).await;
        assert!(result.is_ok());
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 3);
    }
}
