//! JSONL operation trail.
//!
//! Every attempted engine operation is appended as one JSON line to a
//! per-session `{trail_dir}/{session_id}.jsonl` file. The trail is
//! audit-only -- the state document stays authoritative -- but it survives
//! restarts and can be read back to reconstruct what the tool did and when.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use usher_core::ops::{OperationKind, OperationResult};

use crate::error::StoreError;

/// One attempted operation, as recorded in the trail.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct OperationRecord {
    pub ts: DateTime<Utc>,
    pub session_id: String,
    pub round_id: String,
    pub operation: OperationKind,
    #[serde(flatten)]
    pub result: OperationResult,
}

/// Appends operation records to per-session JSONL files.
#[derive(Debug)]
pub struct TrailWriter {
    trail_dir: PathBuf,
    enabled: bool,
}

impl TrailWriter {
    /// Create a writer pointing at `trail_dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the directory cannot be created.
    pub fn new(trail_dir: PathBuf) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&trail_dir)?;
        Ok(Self {
            trail_dir,
            enabled: true,
        })
    }

    /// A disabled writer for in-memory stores and tests.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            trail_dir: PathBuf::new(),
            enabled: false,
        }
    }

    /// Append one record per result to the session's trail file.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the append fails.
    pub fn append_batch(
        &self,
        session_id: &str,
        round_id: &str,
        operation: OperationKind,
        results: &[OperationResult],
    ) -> Result<(), StoreError> {
        if !self.enabled || results.is_empty() {
            return Ok(());
        }
        let ts = Utc::now();
        let records: Vec<OperationRecord> = results
            .iter()
            .map(|result| OperationRecord {
                ts,
                session_id: session_id.to_string(),
                round_id: round_id.to_string(),
                operation,
                result: result.clone(),
            })
            .collect();
        let path = self.trail_dir.join(format!("{session_id}.jsonl"));
        serde_jsonlines::append_json_lines(&path, &records)?;
        Ok(())
    }
}

/// Read every record from a session trail file, in append order.
///
/// # Errors
///
/// Returns `StoreError::Io` if the file cannot be read.
pub fn read_trail(trail_dir: &Path, session_id: &str) -> Result<Vec<OperationRecord>, StoreError> {
    let path = trail_dir.join(format!("{session_id}.jsonl"));
    if !path.exists() {
        return Ok(Vec::new());
    }
    let records = serde_jsonlines::json_lines(&path)?.collect::<Result<Vec<_>, _>>()?;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use usher_core::ops::FailureReason;

    #[test]
    fn append_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let writer = TrailWriter::new(dir.path().to_path_buf()).unwrap();
        let results = vec![
            OperationResult::succeeded("p1", 0),
            OperationResult::failed("p2", FailureReason::NotInWaitingRoom, 0),
        ];
        writer
            .append_batch("ses-1", "1", OperationKind::MoveToWaitingRoom, &results)
            .unwrap();
        writer
            .append_batch("ses-1", "1", OperationKind::AdmitFromWaitingRoom, &results[..1])
            .unwrap();

        let records = read_trail(dir.path(), "ses-1").unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].result.participant_id, "p1");
        assert_eq!(records[1].operation, OperationKind::MoveToWaitingRoom);
        assert_eq!(records[2].operation, OperationKind::AdmitFromWaitingRoom);
    }

    #[test]
    fn disabled_writer_writes_nothing() {
        let writer = TrailWriter::disabled();
        writer
            .append_batch(
                "ses-1",
                "1",
                OperationKind::MoveToWaitingRoom,
                &[OperationResult::succeeded("p1", 0)],
            )
            .unwrap();
    }

    #[test]
    fn missing_trail_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_trail(dir.path(), "ses-none").unwrap().is_empty());
    }
}
