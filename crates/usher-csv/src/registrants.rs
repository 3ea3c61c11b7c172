//! Registrant email mapping.
//!
//! Conflict lists are usually exported with institutional emails, while the
//! meeting provider knows participants by the address they registered with.
//! A registrant sheet carrying both (e.g., `email,zoom_email`) bridges the
//! two: parse it here, then rewrite the conflict set through the mapping
//! with [`usher_core::conflicts::ConflictSet::rewrite_emails`].

use std::collections::BTreeMap;

use usher_core::email::{is_plausible_email, normalize_email};

use crate::detect::find_column;

/// Parse a registrant CSV into a source-email -> meeting-email map.
///
/// The first column containing "email" is the source; the next distinct
/// column containing "email" is the target. Rows with a missing or
/// implausible address on either side are skipped silently -- the mapping is
/// best-effort and unmapped conflict emails pass through unchanged.
///
/// Returns `None` when the header row lacks two email columns.
#[must_use]
pub fn parse_registrant_map(text: &str) -> Option<BTreeMap<String, String>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers().ok()?.iter().map(ToString::to_string).collect();
    let source_col = find_column(&headers, "email")?;
    let target_col = headers
        .iter()
        .enumerate()
        .position(|(i, h)| i != source_col && h.to_ascii_lowercase().contains("email"))?;

    let mut mapping = BTreeMap::new();
    for record in reader.records().flatten() {
        let source = record.get(source_col).unwrap_or("").trim();
        let target = record.get(target_col).unwrap_or("").trim();
        if is_plausible_email(source) && is_plausible_email(target) {
            mapping.insert(normalize_email(source), normalize_email(target));
        }
    }
    Some(mapping)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn maps_source_to_meeting_email() {
        let mapping = parse_registrant_map(
            "email,zoom_email\nalice@corp.example,Alice@Meet.example\nbob@corp.example,",
        )
        .unwrap();
        assert_eq!(mapping.len(), 1);
        assert_eq!(
            mapping.get("alice@corp.example").map(String::as_str),
            Some("alice@meet.example")
        );
    }

    #[test]
    fn missing_second_email_column_is_none() {
        assert_eq!(parse_registrant_map("email,name\na@b.com,Alice"), None);
        assert_eq!(parse_registrant_map("id,value\n1,2"), None);
    }
}
