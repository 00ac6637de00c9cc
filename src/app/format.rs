use chrono::{DateTime, Utc};

pub(crate) fn truncate(s: &str, max: usize) -> String {
    let mut out = s.to_string();
    if out.chars().count() > max {
        out = out.chars().take(max.saturating_sub(3)).collect::<String>() + "...";
    }
    out
}

/// Up to two uppercase initials from a display name, `?` when there are none.
pub(crate) fn initials(name: &str) -> String {
    let letters: String = name
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-' || c == '.')
        .filter_map(|word| word.chars().find(|c| c.is_alphanumeric()))
        .take(2)
        .flat_map(char::to_uppercase)
        .collect();
    if letters.is_empty() {
        "?".to_string()
    } else {
        letters
    }
}

/// Compact age of a story relative to `now`; unknown or future times read "now".
pub(crate) fn format_posted_age(posted_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(posted_at) = posted_at else {
        return "now".to_string();
    };
    let age = now.signed_duration_since(posted_at);
    if age.num_minutes() < 1 {
        "now".to_string()
    } else if age.num_hours() < 1 {
        format!("{}m", age.num_minutes())
    } else if age.num_days() < 1 {
        format!("{}h", age.num_hours())
    } else {
        format!("{}d", age.num_days())
    }
}

pub(crate) fn format_byte_size(bytes: usize) -> String {
    const KIB: f64 = 1024.0;
    let value = bytes as f64;
    if value < KIB {
        format!("{bytes} B")
    } else if value < KIB * KIB {
        format!("{:.1} KB", value / KIB)
    } else {
        format!("{:.1} MB", value / (KIB * KIB))
    }
}

/// Fill ratio of the progress segment for story `index` while `current` plays.
pub(crate) fn segment_ratio(index: usize, current: usize, progress: f64) -> f64 {
    match index.cmp(&current) {
        std::cmp::Ordering::Less => 1.0,
        std::cmp::Ordering::Equal => progress.clamp(0.0, 1.0),
        std::cmp::Ordering::Greater => 0.0,
    }
}

/// Half-open range of thumbnails that fit in `capacity` slots while keeping
/// `selected` visible, roughly centered.
pub(crate) fn visible_window(selected: usize, total: usize, capacity: usize) -> (usize, usize) {
    let capacity = capacity.max(1);
    if total <= capacity {
        return (0, total);
    }
    let selected = selected.min(total - 1);
    let start = selected
        .saturating_sub(capacity / 2)
        .min(total - capacity);
    (start, start + capacity)
}
