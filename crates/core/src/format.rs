//! Formatting helpers for audit log lines

use crate::classify::parse_timestamp;

const MIB: f64 = 1024.0 * 1024.0;

/// Convert bytes to mebibytes (binary, 1024²)
pub fn bytes_to_mib(bytes: u64) -> f64 {
    bytes as f64 / MIB
}

/// Format a raw creation timestamp as `YYYY-MM-DD`
///
/// Absent timestamps format as the empty string. A timestamp that does not
/// parse is passed through verbatim so the audit line still shows it.
pub fn format_created_date(raw: Option<&str>) -> String {
    match raw {
        None => String::new(),
        Some(raw) => match parse_timestamp(raw) {
            Ok(created) => created.format("%Y-%m-%d").to_string(),
            Err(_) => raw.to_string(),
        },
    }
}
