//! Name normalization for view scopes.
//!
//! View names and view field names are uppercased before they are used as
//! registry keys. Every read and write path goes through
//! [`normalize_view_name`] so lookups never miss on casing.

/// Normalize a view (or view field) name to its registry key.
///
/// Uppercasing follows US-locale rules, i.e. ASCII only.
pub fn normalize_view_name(name: &str) -> String {
    name.to_ascii_uppercase()
}
