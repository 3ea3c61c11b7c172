//! Header-driven format detection.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which CSV layout the header row declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CsvFormat {
    /// `round_id,email[,name]` -- one conflict per row.
    RowBased,
    /// `email[,name],round_a,round_b,...` -- flag cells per round column.
    ColumnBased,
}

impl CsvFormat {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RowBased => "row_based",
            Self::ColumnBased => "column_based",
        }
    }
}

impl fmt::Display for CsvFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive substring check against a header cell.
fn header_contains(header: &str, needle: &str) -> bool {
    header.trim().to_ascii_lowercase().contains(needle)
}

/// Index of the first header containing `needle` (case-insensitive).
pub(crate) fn find_column(headers: &[String], needle: &str) -> Option<usize> {
    headers.iter().position(|h| header_contains(h, needle))
}

/// Detect the layout from the header row.
///
/// Row-based requires exactly one "round" column, an "email" column, and
/// 2-3 total columns (`email,round_1,round_2` has two round columns and is
/// a column-based sheet, not a malformed row-based one). Otherwise any
/// "email" column among more than one column means column-based. Anything
/// else is unrecognized.
pub(crate) fn detect_format(headers: &[String]) -> Option<CsvFormat> {
    let round_columns = headers
        .iter()
        .filter(|h| header_contains(h, "round"))
        .count();
    let has_email = find_column(headers, "email").is_some();

    if round_columns == 1 && has_email && (2..=3).contains(&headers.len()) {
        Some(CsvFormat::RowBased)
    } else if has_email && headers.len() > 1 {
        Some(CsvFormat::ColumnBased)
    } else {
        None
    }
}
