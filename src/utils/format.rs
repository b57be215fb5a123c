use chrono::{DateTime, Utc};

/// Render a past timestamp as a coarse age: "just now", "5m ago", "3h ago",
/// "2d ago". Future timestamps (clock skew) render as "just now".
pub fn relative_time(when: DateTime<Utc>) -> String {
    let minutes = (Utc::now() - when).num_minutes();
    if minutes < 1 {
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        format!("{}h ago", minutes / 60)
    } else {
        format!("{}d ago", minutes / 1440)
    }
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}
