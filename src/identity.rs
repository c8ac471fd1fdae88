//! # Identity Classifier
//!
//! Decides whether a string is a machine-generated identifier (a UUID-shaped
//! session token or a long hex blob such as a randomized MAC) rather than a
//! name a person would recognise.

use uuid::Uuid;

/// Hex-only strings at least this long are treated as random identifiers.
pub const MIN_HEX_BLOB_LEN: usize = 12;

/// Returns true when `value` carries no user-facing meaning.
///
/// Absent and empty values count as random.
pub fn looks_like_random_id(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(v) if v.is_empty() => true,
        Some(v) => is_uuid(v) || is_hex_blob(v),
    }
}

/// Case-insensitive UUID check.
pub fn is_uuid(value: &str) -> bool {
    Uuid::parse_str(value).is_ok()
}

pub fn is_hex_blob(value: &str) -> bool {
    value.chars().count() >= MIN_HEX_BLOB_LEN && value.chars().all(|c| c.is_ascii_hexdigit())
}
