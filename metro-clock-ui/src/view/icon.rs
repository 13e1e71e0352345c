//! Weather icon from a free-text summary.

/// Keyword groups in priority order; the first group with a match wins.
const RULES: &[(&[&str], &str)] = &[
    (&["thunder", "storm"], "⛈️"),
    (&["rain", "shower"], "🌧️"),
    (&["snow", "sleet"], "🌨️"),
    (&["fog", "mist"], "🌫️"),
    (&["wind"], "🌬️"),
    (&["overcast", "cloud"], "☁️"),
    (&["sun", "clear"], "☀️"),
];

/// Shown when nothing in the summary matches
pub const GENERIC_ICON: &str = "🌡️";

pub fn icon_for_summary(summary: &str) -> &'static str {
    let summary = summary.to_lowercase();

    RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| summary.contains(k)))
        .map(|(_, icon)| *icon)
        .unwrap_or(GENERIC_ICON)
}
