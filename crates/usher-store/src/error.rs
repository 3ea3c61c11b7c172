//! Store error types.

use thiserror::Error;

/// Errors from state persistence and round-state commands.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The persisted document could not be read or written.
    #[error("State document I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted document is not valid JSON for the expected shape.
    #[error("State document is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// A command referenced a round in a phase that does not allow it.
    #[error("Round {round_id} is {phase}, cannot {action}")]
    InvalidPhase {
        round_id: String,
        phase: String,
        action: String,
    },
}
