//! Genre name normalization
//!
//! Two genre names are duplicates iff their normalized forms are equal.

/// Trim, drop every character that is not a letter or digit, lowercase.
///
/// ```
/// use musicify_core::normalize_genre_name;
///
/// assert_eq!(normalize_genre_name("R&B / Soul"), "rbsoul");
/// assert_eq!(normalize_genre_name(""), "");
/// ```
pub fn normalize_genre_name(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        // Some lowercase mappings emit combining marks
        .filter(|c| c.is_alphanumeric())
        .collect()
}
