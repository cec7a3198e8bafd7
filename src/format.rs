//! Human-readable formatting helpers.

const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;

/// Format a byte count using base-1024 units.
///
/// Values below 1 KB are shown as whole bytes; larger values use the largest
/// unit that keeps the number at or above 1, with two decimals.
///
/// # Examples
///
/// ```
/// use fileshare::format::format_size;
///
/// assert_eq!(format_size(512), "512 B");
/// assert_eq!(format_size(2048), "2.00 KB");
/// ```
pub fn format_size(bytes: u64) -> String {
    if bytes < KB {
        format!("{bytes} B")
    } else if bytes < MB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else if bytes < GB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    }
}
