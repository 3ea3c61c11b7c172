//! Persisted state document.
//!
//! All Usher state for one meeting session is serialized into a single JSON
//! document: conflict sets, the email/name map, per-round state records,
//! email overrides, and the selected round. The in-memory store must
//! rehydrate from this shape and re-serialize it losslessly.
//!
//! The `v` field supports schema versioning: documents written before the
//! field existed deserialize with `v == 1` via `#[serde(default)]`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::conflicts::{ConflictSet, EmailToName};
use crate::rounds::RoundState;

/// Default document version for backward compatibility.
const fn default_document_version() -> u32 {
    1
}

/// The single JSON-serializable document holding all per-session state.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct StateDocument {
    /// Schema version. Defaults to 1 for old documents without this field.
    #[serde(default = "default_document_version")]
    pub v: u32,

    /// Process/session identifier this document is keyed by.
    pub session_id: String,

    /// Round identifier -> normalized conflict emails.
    pub conflicts: BTreeMap<String, Vec<String>>,

    /// Normalized email -> display name (supplementary, non-authoritative).
    #[serde(default)]
    pub names: EmailToName,

    /// Round identifier -> round state record.
    #[serde(default)]
    pub rounds: BTreeMap<String, RoundState>,

    /// Participant id -> manually supplied email. Wins over the
    /// directory-reported email; never expires.
    #[serde(default)]
    pub email_overrides: BTreeMap<String, String>,

    /// Round the operator currently has selected, if any.
    #[serde(default)]
    pub selected_round: Option<String>,
}

impl StateDocument {
    /// An empty document for a fresh session.
    #[must_use]
    pub fn empty(session_id: impl Into<String>) -> Self {
        Self {
            v: 1,
            session_id: session_id.into(),
            conflicts: BTreeMap::new(),
            names: EmailToName::new(),
            rounds: BTreeMap::new(),
            email_overrides: BTreeMap::new(),
            selected_round: None,
        }
    }

    /// Rebuild the conflict set from the persisted round -> email-list map.
    #[must_use]
    pub fn conflict_set(&self) -> ConflictSet {
        ConflictSet::from_map(self.conflicts.clone())
    }

    /// Replace the persisted conflict map from an in-memory conflict set.
    pub fn set_conflicts(&mut self, conflicts: &ConflictSet) {
        self.conflicts = conflicts
            .as_map()
            .iter()
            .map(|(round, emails)| (round.clone(), emails.iter().cloned().collect()))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rounds::RoundPhase;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn sample_document() -> StateDocument {
        let mut doc = StateDocument::empty("ses-1");
        let mut conflicts = ConflictSet::new();
        conflicts.insert("1", "alice@example.com");
        conflicts.insert("1", "bob@example.com");
        conflicts.insert("2", "alice@example.com");
        doc.set_conflicts(&conflicts);
        doc.names
            .insert("alice@example.com".into(), "Alice Cooper".into());
        let mut round = RoundState::new("1");
        round.phase = RoundPhase::Active;
        round.moved.insert("p1".into());
        round.moved.insert("p2".into());
        round.moved_count = 2;
        round.started_at = Some(Utc.with_ymd_and_hms(2026, 3, 14, 15, 0, 0).unwrap());
        doc.rounds.insert("1".into(), round);
        doc.email_overrides
            .insert("p9".into(), "p9@override.example".into());
        doc.selected_round = Some("1".into());
        doc
    }

    #[test]
    fn round_trips_losslessly() {
        let doc = sample_document();
        let json = serde_json::to_string_pretty(&doc).unwrap();
        let recovered: StateDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(recovered, doc);
    }

    #[test]
    fn conflict_set_rebuild_matches() {
        let doc = sample_document();
        let set = doc.conflict_set();
        assert_eq!(set.round_count(), 2);
        assert!(set.emails_for("1").contains("bob@example.com"));
        assert_eq!(set.distinct_email_count(), 2);
    }

    #[test]
    fn missing_version_defaults_to_one() {
        let json = r#"{"session_id":"ses-x","conflicts":{}}"#;
        let doc: StateDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.v, 1);
        assert!(doc.rounds.is_empty());
        assert_eq!(doc.selected_round, None);
    }
}
