//! The conflict CSV parser.

use std::collections::BTreeMap;

use usher_core::conflicts::{ConflictSet, EmailToName};
use usher_core::email::{is_plausible_email, normalize_email};

use crate::detect::{CsvFormat, detect_format, find_column};
use crate::outcome::{ParseOutcome, ParseStats, ParsedConflicts};

/// Cell values (case-insensitive) that mark a conflict in column-based mode.
const CONFLICT_FLAGS: [&str; 4] = ["1", "true", "yes", "x"];

/// Parse raw CSV text into a conflict set plus email/name map.
///
/// Never returns `Err` -- inspect [`ParseOutcome::success`]. Parsing the same
/// content twice yields a structurally identical outcome; warnings are
/// emitted in input row order.
#[must_use]
pub fn parse_conflicts(text: &str) -> ParseOutcome {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = match reader.headers() {
        Ok(headers) => headers.iter().map(ToString::to_string).collect(),
        Err(e) => {
            return ParseOutcome::failure(
                format!("unreadable CSV header row: {e}"),
                Vec::new(),
                ParseStats::default(),
            );
        }
    };

    let Some(format) = detect_format(&headers) else {
        return ParseOutcome::failure(
            format!(
                "unrecognized CSV format: headers [{}] match neither round/email \
                 rows nor email/round-columns",
                headers.join(", ")
            ),
            Vec::new(),
            ParseStats::default(),
        );
    };

    let layout = match format {
        CsvFormat::RowBased => Layout::row_based(&headers),
        CsvFormat::ColumnBased => Layout::column_based(&headers),
    };

    let mut conflicts = ConflictSet::new();
    let mut names = EmailToName::new();
    let mut warnings = Vec::new();
    let mut total_rows: u32 = 0;

    for (index, record) in reader.records().enumerate() {
        let row = index + 1; // 1-based data row number for warnings
        total_rows += 1;
        match record {
            Ok(record) => layout.ingest_row(
                row,
                &record,
                &mut conflicts,
                &mut names,
                &mut warnings,
            ),
            Err(e) => warnings.push(format!("row {row}: unreadable -- skipped ({e})")),
        }
    }

    let stats = ParseStats {
        total_rows,
        rounds_found: u32::try_from(conflicts.round_count()).unwrap_or(u32::MAX),
        unique_emails: u32::try_from(conflicts.distinct_email_count()).unwrap_or(u32::MAX),
    };

    if total_rows == 0 {
        return ParseOutcome::failure("CSV contains no data rows", warnings, stats);
    }
    if conflicts.is_empty() {
        return ParseOutcome::failure(
            "no usable conflict rows (every row was skipped or unflagged)",
            warnings,
            stats,
        );
    }

    tracing::debug!(
        format = %format,
        rows = stats.total_rows,
        rounds = stats.rounds_found,
        emails = stats.unique_emails,
        skipped = warnings.len(),
        "parsed conflict CSV"
    );

    ParseOutcome {
        success: true,
        data: Some(ParsedConflicts {
            format,
            conflicts,
            names,
        }),
        errors: Vec::new(),
        warnings,
        stats,
    }
}

/// Column assignments resolved from the header row.
enum Layout {
    Row {
        round_col: usize,
        email_col: usize,
        name_col: Option<usize>,
    },
    Column {
        email_col: usize,
        name_col: Option<usize>,
        /// (column index, round identifier) pairs, in header order.
        round_cols: Vec<(usize, String)>,
    },
}

impl Layout {
    fn row_based(headers: &[String]) -> Self {
        // detect_format guarantees both columns exist.
        let round_col = find_column(headers, "round").unwrap_or(0);
        let email_col = find_column(headers, "email").unwrap_or(0);
        let name_col = (0..headers.len()).find(|&i| i != round_col && i != email_col);
        Self::Row {
            round_col,
            email_col,
            name_col,
        }
    }

    fn column_based(headers: &[String]) -> Self {
        let email_col = find_column(headers, "email").unwrap_or(0);
        let name_col = find_column(headers, "name").filter(|&i| i != email_col);
        let round_cols = headers
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != email_col && Some(i) != name_col)
            .map(|(i, header)| (i, header.trim().to_string()))
            .collect();
        Self::Column {
            email_col,
            name_col,
            round_cols,
        }
    }

    fn ingest_row(
        &self,
        row: usize,
        record: &csv::StringRecord,
        conflicts: &mut ConflictSet,
        names: &mut EmailToName,
        warnings: &mut Vec<String>,
    ) {
        match self {
            Self::Row {
                round_col,
                email_col,
                name_col,
            } => {
                let round_id = record.get(*round_col).unwrap_or("").trim();
                if round_id.is_empty() {
                    warnings.push(format!("row {row}: missing round identifier -- skipped"));
                    return;
                }
                let Some(email) = usable_email(row, record.get(*email_col), warnings) else {
                    return;
                };
                conflicts.insert(round_id, &email);
                record_name(names, &email, name_col.and_then(|i| record.get(i)));
            }
            Self::Column {
                email_col,
                name_col,
                round_cols,
            } => {
                let Some(email) = usable_email(row, record.get(*email_col), warnings) else {
                    return;
                };
                for (col, round_id) in round_cols {
                    let cell = record.get(*col).unwrap_or("").trim();
                    if is_conflict_flag(cell) {
                        conflicts.insert(round_id, &email);
                    }
                }
                record_name(names, &email, name_col.and_then(|i| record.get(i)));
            }
        }
    }
}

/// Validate and normalize a row's email cell, emitting a warning on skip.
fn usable_email(row: usize, cell: Option<&str>, warnings: &mut Vec<String>) -> Option<String> {
    let raw = cell.unwrap_or("").trim();
    if raw.is_empty() {
        warnings.push(format!("row {row}: missing email -- skipped"));
        return None;
    }
    if !is_plausible_email(raw) {
        warnings.push(format!("row {row}: invalid email '{raw}' -- skipped"));
        return None;
    }
    Some(normalize_email(raw))
}

/// First-seen display name per email wins.
fn record_name(names: &mut BTreeMap<String, String>, email: &str, cell: Option<&str>) {
    if let Some(name) = cell {
        let name = name.trim();
        if !name.is_empty() && !names.contains_key(email) {
            names.insert(email.to_string(), name.to_string());
        }
    }
}

/// Case-insensitive conflict-flag check; any other value means no conflict.
fn is_conflict_flag(cell: &str) -> bool {
    CONFLICT_FLAGS
        .iter()
        .any(|flag| cell.eq_ignore_ascii_case(flag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("1")]
    #[case("TRUE")]
    #[case("Yes")]
    #[case("x")]
    #[case("X")]
    fn conflict_flags_accepted(#[case] cell: &str) {
        assert!(is_conflict_flag(cell));
    }

    #[rstest]
    #[case("0")]
    #[case("")]
    #[case("no")]
    #[case("2")]
    #[case("maybe")]
    fn non_flags_rejected(#[case] cell: &str) {
        assert!(!is_conflict_flag(cell));
    }

    #[test]
    fn row_based_basic() {
        let outcome = parse_conflicts(
            "round_id,email\n1,alice@example.com\n1,bob@example.com\n2,alice@example.com",
        );
        assert!(outcome.success, "errors: {:?}", outcome.errors);
        let data = outcome.data.unwrap();
        assert_eq!(data.format, CsvFormat::RowBased);
        assert_eq!(
            data.conflicts.emails_for("1"),
            ["alice@example.com", "bob@example.com"]
                .map(String::from)
                .into()
        );
        assert_eq!(
            data.conflicts.emails_for("2"),
            ["alice@example.com"].map(String::from).into()
        );
        assert_eq!(
            outcome.stats,
            ParseStats {
                total_rows: 3,
                rounds_found: 2,
                unique_emails: 2
            }
        );
    }

    #[test]
    fn column_based_basic() {
        let outcome =
            parse_conflicts("email,round_1,round_2\nalice@example.com,1,0\nbob@example.com,yes,x");
        assert!(outcome.success, "errors: {:?}", outcome.errors);
        let data = outcome.data.unwrap();
        assert_eq!(data.format, CsvFormat::ColumnBased);
        assert_eq!(
            data.conflicts.emails_for("round_1"),
            ["alice@example.com", "bob@example.com"]
                .map(String::from)
                .into()
        );
        assert_eq!(
            data.conflicts.emails_for("round_2"),
            ["bob@example.com"].map(String::from).into()
        );
    }

    #[test]
    fn row_based_with_names_first_seen_wins() {
        let outcome = parse_conflicts(
            "round,email,name\n1,alice@example.com,Alice Cooper\n2,Alice@Example.com,A. Cooper",
        );
        let data = outcome.data.unwrap();
        assert_eq!(
            data.names.get("alice@example.com").map(String::as_str),
            Some("Alice Cooper")
        );
    }

    #[test]
    fn malformed_rows_warn_and_skip() {
        let outcome = parse_conflicts(
            "round_id,email\n,alice@example.com\n1,\n1,not-an-email\n2,ok@example.com",
        );
        assert!(outcome.success);
        assert_eq!(outcome.warnings.len(), 3);
        assert!(outcome.warnings[0].contains("missing round identifier"));
        assert!(outcome.warnings[1].contains("missing email"));
        assert!(outcome.warnings[2].contains("invalid email 'not-an-email'"));
        assert_eq!(outcome.stats.total_rows, 4);
        assert_eq!(outcome.stats.rounds_found, 1);
    }

    #[test]
    fn unrecognized_format_fails() {
        let outcome = parse_conflicts("id,value\n1,2");
        assert!(!outcome.success);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].contains("unrecognized CSV format"));
    }

    #[test]
    fn empty_input_fails() {
        let outcome = parse_conflicts("round_id,email\n");
        assert!(!outcome.success);
        assert!(outcome.errors[0].contains("no data rows"));
    }

    #[test]
    fn all_rows_skipped_fails() {
        let outcome = parse_conflicts("round_id,email\n1,broken\n2,also-broken");
        assert!(!outcome.success);
        assert_eq!(outcome.warnings.len(), 2);
        assert!(outcome.errors[0].contains("no usable conflict rows"));
    }

    #[test]
    fn column_based_excludes_name_column() {
        let outcome = parse_conflicts(
            "email,name,monday,tuesday\nalice@example.com,Alice,x,\nbob@example.com,Bob,,1",
        );
        let data = outcome.data.unwrap();
        assert_eq!(data.conflicts.round_count(), 2);
        assert!(data.conflicts.emails_for("monday").contains("alice@example.com"));
        assert!(data.conflicts.emails_for("tuesday").contains("bob@example.com"));
        assert_eq!(data.names.get("bob@example.com").map(String::as_str), Some("Bob"));
    }

    #[test]
    fn parse_is_idempotent() {
        let text = "round_id,email\n1,alice@example.com\n1,broken\n2,bob@example.com";
        let first = parse_conflicts(text);
        let second = parse_conflicts(text);
        assert_eq!(first, second);
    }
}
