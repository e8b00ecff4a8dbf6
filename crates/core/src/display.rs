//! Text rendering helpers shared by the terminal views.

use chrono::{DateTime, Local};

/// Render a JSON cell the way result tables show it.
///
/// `null` becomes empty, strings are shown raw, objects and arrays are
/// pretty-printed, other scalars use their JSON text.
pub fn display_cell(value: Option<&serde_json::Value>) -> String {
    match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(v @ (serde_json::Value::Object(_) | serde_json::Value::Array(_))) => {
            serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string())
        }
        Some(other) => other.to_string(),
    }
}

/// Format an RFC 3339 timestamp in local time; unparseable input is
/// returned unchanged and a missing one renders as `-`.
pub fn display_timestamp(raw: Option<&str>) -> String {
    match raw {
        None => "-".to_string(),
        Some(s) => match DateTime::parse_from_rfc3339(s) {
            Ok(ts) => ts
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            Err(_) => s.to_string(),
        },
    }
}

/// `processed / total`, with an em dash while the total is unknown.
pub fn display_progress(processed: u64, total: u64) -> String {
    if total == 0 {
        format!("{processed} / \u{2014}")
    } else {
        format!("{processed} / {total}")
    }
}
