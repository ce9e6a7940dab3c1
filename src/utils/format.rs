use chrono::NaiveDate;

pub const TIME_PLACEHOLDER: &str = "--:--";

/// Format a duration in seconds the way the Arabic UI reads it:
/// "H ساعة و M دقيقة", or "M دقيقة" under an hour.
pub fn format_duration_ar(secs: i64) -> String {
    if secs <= 0 {
        return "الآن".to_string();
    }
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    if hours > 0 {
        format!("{} ساعة و {} دقيقة", hours, minutes)
    } else {
        format!("{} دقيقة", minutes)
    }
}

/// Format a date to "YYYY-MM-DD"
pub fn format_date(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

pub fn or_placeholder(value: Option<&str>) -> &str {
    value.unwrap_or(TIME_PLACEHOLDER)
}

/// Compass bearing with one decimal, e.g. "112.3°"
pub fn format_bearing(degrees: f64) -> String {
    format!("{:.1}°", degrees)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arabic_duration_drops_hours_under_one_hour() {
        assert_eq!(format_duration_ar(10_200), "2 ساعة و 50 دقيقة");
        assert_eq!(format_duration_ar(600), "10 دقيقة");
        assert_eq!(format_duration_ar(0), "الآن");
    }
}
