//! # usher-csv
//!
//! Conflict CSV parsing for Usher.
//!
//! A conflict list maps round identifiers to sets of participant emails that
//! must be excluded from that round. Two upload formats are supported,
//! detected from the header row:
//!
//! - **Row-based**: `round_id,email[,name]` -- one conflict per row.
//! - **Column-based**: `email,round_1,round_2,...` -- one participant per
//!   row, flag cells (`1`/`true`/`yes`/`x`) marking conflicted rounds.
//!
//! Parsing never panics and never returns `Err`: the [`ParseOutcome`] carries
//! a success flag, hard errors, soft per-row warnings (in input row order),
//! and summary statistics. Malformed rows are skipped with a warning; the
//! parse only fails when the format is unrecognized, there are no data rows,
//! or every row was skipped.

mod detect;
mod outcome;
mod parser;
mod registrants;

pub use detect::CsvFormat;
pub use outcome::{ParseOutcome, ParseStats, ParsedConflicts};
pub use parser::parse_conflicts;
pub use registrants::parse_registrant_map;
