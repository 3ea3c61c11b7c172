//! Email normalization and plausibility checks.
//!
//! Conflict emails arrive from CSV uploads and provider events with
//! inconsistent casing and stray whitespace. Every email is normalized
//! (trim + ASCII lowercase) before it enters a conflict set or is compared
//! against a participant, so matching is a plain set-membership test.

/// Normalize an email for storage and comparison: trim + ASCII lowercase.
#[must_use]
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

/// Basic `local@domain.tld` shape check.
///
/// Not RFC validation -- just enough to reject obviously broken CSV cells
/// (missing `@`, empty local part, domain without a dot). Rows failing this
/// check are skipped with a warning, never a hard parse failure.
#[must_use]
pub fn is_plausible_email(raw: &str) -> bool {
    let email = raw.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let Some((name, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !name.is_empty() && !tld.is_empty()
}
