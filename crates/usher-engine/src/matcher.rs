//! Reconciling conflict emails against live participants.
//!
//! Pure set logic: no provider calls, no side effects. Deterministic for
//! identical input sets regardless of participant list order -- `matched`
//! and `no_email` follow input order, `not_found` is a sorted set.

use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use usher_core::email::normalize_email;
use usher_core::participant::Participant;

/// Partition produced by [`match_participants`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct MatchOutcome {
    /// Live participants whose email appears in the conflict set.
    pub matched: Vec<Participant>,
    /// Conflict emails with no corresponding live participant (not joined
    /// yet, or registered under a different address).
    pub not_found: BTreeSet<String>,
    /// Participants without any email -- candidates for manual fallback.
    pub no_email: Vec<Participant>,
}

/// Match a round's conflict emails against the live participant directory.
#[must_use]
pub fn match_participants(
    conflict_emails: &BTreeSet<String>,
    participants: &[Participant],
) -> MatchOutcome {
    let mut outcome = MatchOutcome::default();
    let mut found: BTreeSet<&str> = BTreeSet::new();

    for participant in participants {
        match participant.email.as_deref() {
            None => outcome.no_email.push(participant.clone()),
            Some(email) => {
                let normalized = normalize_email(email);
                if let Some(hit) = conflict_emails.get(&normalized) {
                    found.insert(hit.as_str());
                    outcome.matched.push(participant.clone());
                }
            }
        }
    }

    outcome.not_found = conflict_emails
        .iter()
        .filter(|email| !found.contains(email.as_str()))
        .cloned()
        .collect();

    outcome
}
