//! Conflict sets: round identifier -> set of normalized emails.
//!
//! Built once per CSV upload and replaced wholesale on re-upload. Emails are
//! normalized before insertion, so within a round the set is unique by
//! construction. `BTreeMap`/`BTreeSet` keep iteration order deterministic,
//! which keeps serialized documents and test output stable.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::email::normalize_email;

/// Supplementary email -> display name map. Non-authoritative: first-seen
/// name per email wins.
pub type EmailToName = BTreeMap<String, String>;

/// Mapping from round identifier to the set of conflicted (excluded) emails.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ConflictSet {
    rounds: BTreeMap<String, BTreeSet<String>>,
}

impl ConflictSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a conflict. The email is normalized before insertion; inserting
    /// the same (round, email) pair twice is a no-op.
    pub fn insert(&mut self, round_id: &str, email: &str) {
        self.rounds
            .entry(round_id.to_string())
            .or_default()
            .insert(normalize_email(email));
    }

    /// The emails excluded from a round. Empty set for unknown rounds.
    #[must_use]
    pub fn emails_for(&self, round_id: &str) -> BTreeSet<String> {
        self.rounds.get(round_id).cloned().unwrap_or_default()
    }

    /// Round identifiers, in sorted order.
    pub fn round_ids(&self) -> impl Iterator<Item = &str> {
        self.rounds.keys().map(String::as_str)
    }

    #[must_use]
    pub fn round_count(&self) -> usize {
        self.rounds.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    /// Count of distinct normalized emails across all rounds.
    #[must_use]
    pub fn distinct_email_count(&self) -> usize {
        self.rounds
            .values()
            .flatten()
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Rewrite every email through a mapping (e.g., registrant email ->
    /// meeting email). Emails without a mapping are kept as-is. Returns the
    /// number of replacements performed.
    #[must_use]
    pub fn rewrite_emails(&self, mapping: &BTreeMap<String, String>) -> (Self, usize) {
        let mut rewritten = Self::new();
        let mut replaced = 0;
        for (round_id, emails) in &self.rounds {
            for email in emails {
                match mapping.get(email) {
                    Some(mapped) => {
                        rewritten.insert(round_id, mapped);
                        replaced += 1;
                    }
                    None => rewritten.insert(round_id, email),
                }
            }
        }
        (rewritten, replaced)
    }

    /// Direct access to the underlying map (for serialization into the
    /// persisted document).
    #[must_use]
    pub const fn as_map(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.rounds
    }

    /// Rebuild from a persisted round -> email list map, normalizing on the
    /// way in so hand-edited documents stay consistent.
    #[must_use]
    pub fn from_map(map: BTreeMap<String, Vec<String>>) -> Self {
        let mut set = Self::new();
        for (round_id, emails) in map {
            for email in emails {
                set.insert(&round_id, &email);
            }
        }
        set
    }
}
