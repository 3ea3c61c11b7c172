//! Participant and waiting-room types.
//!
//! Provider SDK payloads are loosely typed; these structs are the strict
//! internal schema. All ingestion goes through [`Participant::from_directory`]
//! so unexpected shapes are defaulted or rejected at the boundary instead of
//! leaking inward.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::email::normalize_email;

/// Role a participant holds in the meeting, as reported by the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    Host,
    CoHost,
    Attendee,
}

impl ParticipantRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::CoHost => "co_host",
            Self::Attendee => "attendee",
        }
    }
}

impl fmt::Display for ParticipantRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A live meeting participant.
///
/// The `id` is an opaque session-scoped identifier, unique per meeting
/// attendance. The directory may or may not report an email; `email` is
/// already normalized when present.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Participant {
    pub id: String,
    pub display_name: String,
    pub role: Option<ParticipantRole>,
    pub email: Option<String>,
}

impl Participant {
    /// Build a participant from raw directory fields, normalizing at the
    /// boundary. Blank emails are treated as absent.
    #[must_use]
    pub fn from_directory(
        id: impl Into<String>,
        display_name: impl Into<String>,
        role: Option<ParticipantRole>,
        email: Option<&str>,
    ) -> Self {
        let email = email
            .map(normalize_email)
            .filter(|normalized| !normalized.is_empty());
        Self {
            id: id.into(),
            display_name: display_name.into(),
            role,
            email,
        }
    }
}

/// An entry in the waiting room. The directory reports only id and name here.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct WaitingRoomEntry {
    pub id: String,
    pub display_name: String,
}

/// Meeting-level context reported by the provider.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct MeetingContext {
    pub is_host: bool,
    pub meeting_id: String,
}

/// Case-insensitive, trimmed display-name substring filter.
///
/// Pure helper for the manual fallback path when participants lack emails.
/// An empty (or whitespace-only) query matches nothing.
#[must_use]
pub fn filter_by_display_name<'a>(
    participants: &'a [Participant],
    query: &str,
) -> Vec<&'a Participant> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    participants
        .iter()
        .filter(|p| p.display_name.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn from_directory_normalizes_email() {
        let p = Participant::from_directory("p1", "Alice", None, Some(" Alice@Example.COM "));
        assert_eq!(p.email.as_deref(), Some("alice@example.com"));
    }

    #[test]
    fn from_directory_blank_email_is_none() {
        let p = Participant::from_directory("p1", "Alice", None, Some("   "));
        assert_eq!(p.email, None);
        let p = Participant::from_directory("p2", "Bob", Some(ParticipantRole::Attendee), None);
        assert_eq!(p.email, None);
    }

    #[test]
    fn name_filter_is_case_insensitive() {
        let participants = vec![
            Participant::from_directory("p1", "Alice Cooper", None, None),
            Participant::from_directory("p2", "Bob", None, None),
            Participant::from_directory("p3", "alicia keys", None, None),
        ];
        let hits = filter_by_display_name(&participants, "  ALI ");
        let ids: Vec<&str> = hits.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p3"]);
    }

    #[test]
    fn name_filter_empty_query_matches_nothing() {
        let participants = vec![Participant::from_directory("p1", "Alice", None, None)];
        assert!(filter_by_display_name(&participants, "   ").is_empty());
    }
}
