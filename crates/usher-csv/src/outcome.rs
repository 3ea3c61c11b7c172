//! Parse outcome types.
//!
//! The parser never unwinds: hard failures and soft skips are both returned
//! as data so callers inspect `success` plus `errors`/`warnings` instead of
//! catching anything.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use usher_core::conflicts::{ConflictSet, EmailToName};

use crate::detect::CsvFormat;

/// Summary statistics over a parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ParseStats {
    /// Data rows read (header excluded), including skipped rows.
    pub total_rows: u32,
    /// Distinct rounds in the resulting conflict map.
    pub rounds_found: u32,
    /// Distinct normalized emails across all rounds.
    pub unique_emails: u32,
}

/// Successfully parsed conflict data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ParsedConflicts {
    pub format: CsvFormat,
    pub conflicts: ConflictSet,
    pub names: EmailToName,
}

/// Complete result of parsing a conflict CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ParseOutcome {
    pub success: bool,
    /// Present iff `success` is true.
    pub data: Option<ParsedConflicts>,
    /// Hard failures (unrecognized format, no data rows, empty result).
    pub errors: Vec<String>,
    /// Soft per-row skips, in input row order.
    pub warnings: Vec<String>,
    pub stats: ParseStats,
}

impl ParseOutcome {
    /// A failed outcome carrying a single hard error.
    #[must_use]
    pub fn failure(error: impl Into<String>, warnings: Vec<String>, stats: ParseStats) -> Self {
        Self {
            success: false,
            data: None,
            errors: vec![error.into()],
            warnings,
            stats,
        }
    }
}
