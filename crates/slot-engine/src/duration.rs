//! Human-readable duration labels.
//!
//! Display only: logic compares [`DurationOption::minutes`](crate::availability::DurationOption),
//! never the label.

/// Format minutes the way the booking pages show them:
/// `45` → "45 minutes", `60` → "1 heure", `120` → "2 heures", `90` → "1h30".
pub fn format_duration(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;

    if hours == 0 {
        return format!("{} minutes", minutes);
    }
    if mins == 0 {
        let unit = if hours == 1 { "heure" } else { "heures" };
        return format!("{} {}", hours, unit);
    }
    format!("{}h{:02}", hours, mins)
}
