//! Stored-name generation for uploaded files.
//!
//! A stored name is `<uuid-v4>_<sanitized original name>`. The sanitized part
//! only contains `[A-Za-z0-9._-]`, so a stored name can never contain a path
//! separator and always resolves directly inside the storage root.

use uuid::Uuid;

/// Placeholder used when nothing of the original name survives sanitizing.
pub const UNNAMED: &str = "unnamed";

/// Maximum length of the sanitized part of a stored name (in bytes).
///
/// Together with the 37-byte token prefix this stays below the common 255-byte
/// filename limit.
pub const MAX_SANITIZED_NAME_LENGTH: usize = 200;

/// Separator between the random token and the sanitized name.
pub const TOKEN_SEPARATOR: char = '_';

fn is_safe_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_')
}

/// Map an arbitrary user-supplied file name to a filesystem-safe token.
///
/// Every character outside `[A-Za-z0-9._-]` becomes a single `_`. Never fails
/// and never returns an empty string.
///
/// # Examples
///
/// ```
/// use fileshare::file::sanitize_name;
///
/// assert_eq!(sanitize_name("report 2024.pdf"), "report_2024.pdf");
/// assert_eq!(sanitize_name("../../etc/passwd"), ".._.._etc_passwd");
/// assert_eq!(sanitize_name(""), "unnamed");
/// ```
pub fn sanitize_name(name: &str) -> String {
    let mut sanitized: String = name
        .chars()
        .map(|c| if is_safe_char(c) { c } else { '_' })
        .collect();

    // Only ASCII remains, so any byte index is a char boundary.
    sanitized.truncate(MAX_SANITIZED_NAME_LENGTH);

    if sanitized.is_empty() {
        return UNNAMED.to_string();
    }

    sanitized
}

/// Generate a collision-resistant stored name for an already sanitized name.
///
/// The prefix is a random v4 UUID (122 bits from the OS CSPRNG), so no
/// existence check against the storage root is needed.
pub fn generate_stored_name(sanitized: &str) -> String {
    format!("{}{TOKEN_SEPARATOR}{sanitized}", Uuid::new_v4())
}

/// Check that a stored name is a single plain path component made of safe
/// characters.
///
/// Names produced by [`generate_stored_name`] always pass. Anything read back
/// from metadata is checked again before it touches the filesystem.
pub fn is_valid_stored_name(stored_name: &str) -> bool {
    !stored_name.is_empty()
        && stored_name != "."
        && stored_name != ".."
        && stored_name.chars().all(is_safe_char)
}
