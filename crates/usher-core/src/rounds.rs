//! Round lifecycle phase and per-round state record.
//!
//! ```text
//! unstarted → active → ended
//!                      ended → active (restart, e.g., late joiners)
//! ```
//!
//! The moved-set is the authoritative record of which participants this tool
//! placed in the waiting room for a round. It only grows during a round and
//! is consumed (not cleared) at end, so a partially failed return batch can
//! be retried and audits stay complete.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Lifecycle phase of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhase {
    Unstarted,
    Active,
    Ended,
}

impl RoundPhase {
    /// Valid next phases from the current phase.
    #[must_use]
    pub const fn allowed_next_phases(self) -> &'static [Self] {
        match self {
            Self::Unstarted => &[Self::Active],
            Self::Active => &[Self::Ended],
            // A round can be re-opened after ending without losing its
            // moved-set.
            Self::Ended => &[Self::Active],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_phases().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unstarted => "unstarted",
            Self::Active => "active",
            Self::Ended => "ended",
        }
    }
}

impl fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-round idempotent ledger.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct RoundState {
    pub round_id: String,
    pub phase: RoundPhase,
    /// Participant ids moved to the waiting room by this tool. Only
    /// confirmed-successful moves enter this set.
    pub moved: BTreeSet<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub moved_count: u32,
    pub admitted_count: u32,
}

impl RoundState {
    #[must_use]
    pub fn new(round_id: impl Into<String>) -> Self {
        Self {
            round_id: round_id.into(),
            phase: RoundPhase::Unstarted,
            moved: BTreeSet::new(),
            started_at: None,
            ended_at: None,
            moved_count: 0,
            admitted_count: 0,
        }
    }
}
