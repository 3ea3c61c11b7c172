//! Operation kinds, per-item results, and batch summaries.
//!
//! One [`OperationResult`] is produced per attempted provider operation and
//! consumed by logging and the round-state update. Failures carry a
//! [`FailureReason`] so callers can distinguish retry-exhausted transient
//! errors from precondition skips and batch-level setup failures.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The homogeneous operation a batch performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    MoveToWaitingRoom,
    AdmitFromWaitingRoom,
    AssignToBreakoutRoom,
}

impl OperationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MoveToWaitingRoom => "move_to_waiting_room",
            Self::AdmitFromWaitingRoom => "admit_from_waiting_room",
            Self::AssignToBreakoutRoom => "assign_to_breakout_room",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an operation failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    /// Provider call failed and the retry budget is exhausted.
    Transient { message: String },
    /// Admit target was not in the waiting-room snapshot (left the meeting
    /// or was never moved). Never retried.
    NotInWaitingRoom,
    /// Breakout room creation or configuration failed; the whole batch is
    /// reported failed with the same reason.
    Setup { message: String },
}

impl FailureReason {
    /// Short human-readable reason. Always non-empty, never a raw provider
    /// code without a fallback.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Transient { message } => {
                if message.is_empty() {
                    "provider operation failed".to_string()
                } else {
                    message.clone()
                }
            }
            Self::NotInWaitingRoom => "not in waiting room".to_string(),
            Self::Setup { message } => {
                if message.is_empty() {
                    "breakout room setup failed".to_string()
                } else {
                    message.clone()
                }
            }
        }
    }
}

/// Outcome of one attempted operation against one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct OperationResult {
    pub participant_id: String,
    pub success: bool,
    /// Present iff `success` is false.
    pub failure: Option<FailureReason>,
    /// Retries actually consumed (0 = succeeded or failed on first attempt
    /// without retrying).
    pub retry_count: u32,
}

impl OperationResult {
    #[must_use]
    pub fn succeeded(participant_id: impl Into<String>, retry_count: u32) -> Self {
        Self {
            participant_id: participant_id.into(),
            success: true,
            failure: None,
            retry_count,
        }
    }

    #[must_use]
    pub fn failed(
        participant_id: impl Into<String>,
        reason: FailureReason,
        retry_count: u32,
    ) -> Self {
        Self {
            participant_id: participant_id.into(),
            success: false,
            failure: Some(reason),
            retry_count,
        }
    }
}

/// Counts summarizing a batch, for user-visible reporting.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: u32,
    pub failed: u32,
    /// Precondition failures (e.g., "not in waiting room") -- failed without
    /// any provider attempt.
    pub skipped: u32,
}

impl BatchSummary {
    /// Tally results into succeeded / failed / skipped counts.
    #[must_use]
    pub fn from_results(results: &[OperationResult]) -> Self {
        let mut summary = Self::default();
        for result in results {
            if result.success {
                summary.succeeded += 1;
            } else if matches!(result.failure, Some(FailureReason::NotInWaitingRoom)) {
                summary.skipped += 1;
            } else {
                summary.failed += 1;
            }
        }
        summary
    }
}
