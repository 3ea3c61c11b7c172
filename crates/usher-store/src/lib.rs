//! # usher-store
//!
//! Single-writer state store for Usher.
//!
//! The store owns every mutable map the system relies on: conflict sets,
//! the email/name map, per-round state records, email overrides, and the
//! selected round. All mutation goes through its command methods, which run
//! synchronously on the caller's task -- readers always observe a committed
//! snapshot, never a partial mutation.
//!
//! State persists as a single JSON document per session
//! (`{dir}/{session_id}.json`), written atomically (temp file + rename) and
//! reloadable by session id. An append-only JSONL trail of attempted
//! operations lives alongside it for audit.

pub mod error;
pub mod trail;

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use chrono::Utc;

use usher_core::conflicts::{ConflictSet, EmailToName};
use usher_core::document::StateDocument;
use usher_core::email::normalize_email;
use usher_core::ops::{OperationKind, OperationResult};
use usher_core::participant::Participant;
use usher_core::rounds::{RoundPhase, RoundState};

use error::StoreError;
use trail::TrailWriter;

/// Counts reported by [`Store::end_round`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundCloseSummary {
    pub admitted: u32,
    pub failed: u32,
}

/// The single owner of all mutable Usher state for one session.
#[derive(Debug)]
pub struct Store {
    session_id: String,
    conflicts: ConflictSet,
    names: EmailToName,
    rounds: BTreeMap<String, RoundState>,
    overrides: BTreeMap<String, String>,
    selected_round: Option<String>,
    path: Option<PathBuf>,
    trail: TrailWriter,
}

impl Store {
    /// An in-memory store with no persistence (tests, dry runs).
    #[must_use]
    pub fn in_memory(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            conflicts: ConflictSet::new(),
            names: EmailToName::new(),
            rounds: BTreeMap::new(),
            overrides: BTreeMap::new(),
            selected_round: None,
            path: None,
            trail: TrailWriter::disabled(),
        }
    }

    /// Open (or create) the persisted store for `session_id` under `dir`.
    ///
    /// Rehydrates from `{dir}/{session_id}.json` when it exists; the trail
    /// is appended under `{dir}/trail/`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on unreadable directories or a corrupt document.
    pub fn open(dir: &Path, session_id: &str) -> Result<Self, StoreError> {
        Self::open_with_trail(dir, session_id, true)
    }

    /// Like [`Store::open`], but with the trail switched off when `trail` is
    /// false (configuration `storage.trail = false`). The state document is
    /// still persisted either way.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on unreadable directories or a corrupt document.
    pub fn open_with_trail(dir: &Path, session_id: &str, trail: bool) -> Result<Self, StoreError> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("{session_id}.json"));
        let document = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            StateDocument::empty(session_id)
        };
        let trail = if trail {
            TrailWriter::new(dir.join("trail"))?
        } else {
            TrailWriter::disabled()
        };
        let mut store = Self::from_document(document, trail);
        store.path = Some(path);
        Ok(store)
    }

    /// Rehydrate a store from a state document.
    #[must_use]
    pub fn from_document(document: StateDocument, trail: TrailWriter) -> Self {
        Self {
            session_id: document.session_id.clone(),
            conflicts: document.conflict_set(),
            names: document.names.clone(),
            rounds: document.rounds.clone(),
            overrides: document.email_overrides.clone(),
            selected_round: document.selected_round,
            path: None,
            trail: TrailWriter::disabled(),
        }
        .with_trail(trail)
    }

    fn with_trail(mut self, trail: TrailWriter) -> Self {
        self.trail = trail;
        self
    }

    /// Serialize the current state as a document (lossless round-trip with
    /// [`Store::from_document`]).
    #[must_use]
    pub fn document(&self) -> StateDocument {
        let mut document = StateDocument::empty(&self.session_id);
        document.set_conflicts(&self.conflicts);
        document.names = self.names.clone();
        document.rounds = self.rounds.clone();
        document.email_overrides = self.overrides.clone();
        document.selected_round = self.selected_round.clone();
        document
    }

    /// Write the document atomically: serialize to a sibling temp file,
    /// then rename over the target. No-op for in-memory stores.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` on write failure.
    pub fn save(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&self.document())?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;
        tracing::debug!(path = %path.display(), "state document saved");
        Ok(())
    }

    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    // ------------------------------------------------------------------
    // Conflict data
    // ------------------------------------------------------------------

    /// Replace the conflict data wholesale (CSV re-upload).
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if persisting fails.
    pub fn replace_conflicts(
        &mut self,
        conflicts: ConflictSet,
        names: EmailToName,
    ) -> Result<(), StoreError> {
        self.conflicts = conflicts;
        self.names = names;
        self.save()
    }

    #[must_use]
    pub const fn conflicts(&self) -> &ConflictSet {
        &self.conflicts
    }

    #[must_use]
    pub const fn names(&self) -> &EmailToName {
        &self.names
    }

    /// # Errors
    ///
    /// Returns `StoreError` if persisting fails.
    pub fn select_round(&mut self, round_id: Option<String>) -> Result<(), StoreError> {
        self.selected_round = round_id;
        self.save()
    }

    #[must_use]
    pub fn selected_round(&self) -> Option<&str> {
        self.selected_round.as_deref()
    }

    // ------------------------------------------------------------------
    // Email overrides
    // ------------------------------------------------------------------

    /// Manually supply an email for a participant id. Wins over the
    /// directory-reported email; never expires.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if persisting fails.
    pub fn set_email_override(
        &mut self,
        participant_id: &str,
        email: &str,
    ) -> Result<(), StoreError> {
        self.overrides
            .insert(participant_id.to_string(), normalize_email(email));
        self.save()
    }

    /// Merge an externally supplied id -> email map. Local overrides win;
    /// only ids without a local entry are taken from `associations`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if persisting fails.
    pub fn merge_associations(
        &mut self,
        associations: BTreeMap<String, String>,
    ) -> Result<(), StoreError> {
        for (id, email) in associations {
            self.overrides.entry(id).or_insert(normalize_email(&email));
        }
        self.save()
    }

    /// The effective email for a participant: override first, then the
    /// directory-reported one.
    #[must_use]
    pub fn effective_email(&self, participant: &Participant) -> Option<String> {
        self.overrides
            .get(&participant.id)
            .cloned()
            .or_else(|| participant.email.clone())
    }

    /// Copy of the participants with overrides applied to their email
    /// field, ready for matching.
    #[must_use]
    pub fn with_effective_emails(&self, participants: &[Participant]) -> Vec<Participant> {
        participants
            .iter()
            .map(|p| {
                let mut p = p.clone();
                p.email = self.effective_email(&p);
                p
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Round lifecycle
    // ------------------------------------------------------------------

    /// Start (or restart) a round. Creates the round's record and moved-set
    /// if absent and stamps the start time. Idempotent: a second start
    /// before any move only refreshes the timestamp -- it never duplicates
    /// the record or the moved-set.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if persisting fails.
    pub fn start_round(&mut self, round_id: &str) -> Result<(), StoreError> {
        let state = self
            .rounds
            .entry(round_id.to_string())
            .or_insert_with(|| RoundState::new(round_id));
        if state.phase == RoundPhase::Ended {
            tracing::info!(round_id, moved = state.moved.len(), "round restarted");
        }
        state.phase = RoundPhase::Active;
        state.started_at = Some(Utc::now());
        self.save()
    }

    /// Record the results of a move batch. Only confirmed-successful moves
    /// enter the moved-set; re-recording an already-moved id does not
    /// double-count. Every attempted result is appended to the trail.
    ///
    /// Returns the number of ids newly added to the moved-set.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidPhase` if the round is not active, or an
    /// I/O error from trail/document writes.
    pub fn record_moved(
        &mut self,
        round_id: &str,
        results: &[OperationResult],
    ) -> Result<u32, StoreError> {
        let state = self.active_round_mut(round_id, "record moves")?;
        let mut newly_moved = 0u32;
        for result in results {
            if result.success && state.moved.insert(result.participant_id.clone()) {
                newly_moved += 1;
            }
        }
        state.moved_count += newly_moved;
        self.trail.append_batch(
            &self.session_id,
            round_id,
            OperationKind::MoveToWaitingRoom,
            results,
        )?;
        self.save()?;
        Ok(newly_moved)
    }

    /// End a round: stamp the end time and tally admits from the return
    /// batch. The moved-set is retained -- a partially failed return batch
    /// can be retried later and audits need the full set.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidPhase` if the round is not active, or an
    /// I/O error from trail/document writes.
    pub fn end_round(
        &mut self,
        round_id: &str,
        admit_results: &[OperationResult],
    ) -> Result<RoundCloseSummary, StoreError> {
        let state = self.active_round_mut(round_id, "end round")?;
        let mut summary = RoundCloseSummary::default();
        for result in admit_results {
            if result.success {
                summary.admitted += 1;
            } else {
                summary.failed += 1;
            }
        }
        state.phase = RoundPhase::Ended;
        state.ended_at = Some(Utc::now());
        state.admitted_count += summary.admitted;
        self.trail.append_batch(
            &self.session_id,
            round_id,
            OperationKind::AdmitFromWaitingRoom,
            admit_results,
        )?;
        self.save()?;
        Ok(summary)
    }

    /// Record the results of a breakout assignment batch in the trail.
    /// Assignments live in the meeting, not in the document, so no state
    /// changes -- the trail is the only record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidPhase` if the round is not active, or an
    /// I/O error from the trail append.
    pub fn record_assignments(
        &mut self,
        round_id: &str,
        results: &[OperationResult],
    ) -> Result<(), StoreError> {
        self.active_round_mut(round_id, "record assignments")?;
        self.trail.append_batch(
            &self.session_id,
            round_id,
            OperationKind::AssignToBreakoutRoom,
            results,
        )
    }

    /// The authoritative moved-set for a round. Empty set (not an error)
    /// for unknown rounds.
    #[must_use]
    pub fn moved_participants(&self, round_id: &str) -> BTreeSet<String> {
        self.rounds
            .get(round_id)
            .map(|state| state.moved.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn round_state(&self, round_id: &str) -> Option<&RoundState> {
        self.rounds.get(round_id)
    }

    /// All round states, in round-id order.
    pub fn rounds(&self) -> impl Iterator<Item = &RoundState> {
        self.rounds.values()
    }

    fn active_round_mut(
        &mut self,
        round_id: &str,
        action: &str,
    ) -> Result<&mut RoundState, StoreError> {
        match self.rounds.get_mut(round_id) {
            Some(state) if state.phase == RoundPhase::Active => Ok(state),
            Some(state) => Err(StoreError::InvalidPhase {
                round_id: round_id.to_string(),
                phase: state.phase.to_string(),
                action: action.to_string(),
            }),
            None => Err(StoreError::InvalidPhase {
                round_id: round_id.to_string(),
                phase: RoundPhase::Unstarted.to_string(),
                action: action.to_string(),
            }),
        }
    }
}
