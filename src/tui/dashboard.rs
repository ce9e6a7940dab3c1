use chrono::NaiveDateTime;
use unicode_width::UnicodeWidthStr;

use crate::config::AppConfig;
use crate::models::Prayer;
use crate::prayer_times::{derive_state, DerivedPrayerState, PrayerSchedule};
use crate::utils::format::{
    format_bearing, format_date, format_duration_ar, or_placeholder, TIME_PLACEHOLDER,
};
use crate::utils::hijri::hijri_long;
use crate::utils::qibla::qibla_bearing;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Title,
    Plain,
    Dim,
    Current,
    Next,
    Accent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub tone: Tone,
    pub text: String,
}

impl Row {
    fn new(tone: Tone, text: impl Into<String>) -> Self {
        Self {
            tone,
            text: text.into(),
        }
    }

    fn blank() -> Self {
        Self::new(Tone::Plain, "")
    }
}

/// Today's panel: the six times, current/next prayer with countdowns,
/// Hijri date and Qibla. Shared by `times` and the live view.
pub fn dashboard(schedule: &PrayerSchedule, config: &AppConfig, now: NaiveDateTime) -> Vec<Row> {
    let today = now.date();
    let state = derive_state(schedule, now);
    let now_hm = now.format("%H:%M").to_string();

    let mut rows = vec![Row::new(
        Tone::Title,
        format!("  {} · {}", config.location.name, format_date(today)),
    )];
    if let Some(hijri) = hijri_long(today, config.location.hijri_offset) {
        rows.push(Row::new(Tone::Dim, format!("  {}", hijri)));
    }
    rows.push(Row::blank());

    let record = schedule.get(today);
    let sunrise = record.map(|r| r.sunrise.as_str());
    let mut table = vec![("Sunrise", "الشروق", sunrise, None)];
    for prayer in Prayer::all() {
        let time = record.map(|r| r.time_of(prayer));
        table.push((prayer.display_name(), prayer.arabic_name(), time, Some(prayer)));
    }
    // sunrise sits between fajr and dhuhr
    table.swap(0, 1);

    for (name, arabic, time, prayer) in table {
        let tone = match (time, prayer) {
            (None, _) => Tone::Dim,
            (Some(_), Some(p)) if is_current(&state, p) => Tone::Current,
            (Some(_), Some(p)) if is_next_today(&state, p, now) => Tone::Next,
            (Some(t), _) if t <= now_hm.as_str() => Tone::Dim,
            _ => Tone::Plain,
        };
        let marker = match tone {
            Tone::Current => "●",
            Tone::Next => "›",
            _ => " ",
        };
        rows.push(Row::new(
            tone,
            format!(
                "  {} {} {} {}",
                marker,
                pad(name, 8),
                pad(arabic, 8),
                or_placeholder(time)
            ),
        ));
    }
    rows.push(Row::blank());

    if state.is_empty() {
        rows.push(Row::new(Tone::Accent, "  لا توجد أوقات صلاة لهذا اليوم"));
    }

    match &state.next {
        Some(next) => rows.push(Row::new(
            Tone::Accent,
            format!(
                "  التالية: {} {} · بعد {}",
                next.prayer.arabic_name(),
                next.time,
                state.time_remaining.as_deref().unwrap_or(TIME_PLACEHOLDER)
            ),
        )),
        None => rows.push(Row::new(Tone::Dim, format!("  التالية: {}", TIME_PLACEHOLDER))),
    }
    if let Some(secs) = state.seconds_remaining {
        rows.push(Row::new(Tone::Dim, format!("  {}", format_duration_ar(secs))));
    }
    if let Some(current) = &state.current {
        rows.push(Row::new(
            Tone::Plain,
            format!(
                "  الحالية: {} · منذ {}",
                current.prayer.arabic_name(),
                state.time_since.as_deref().unwrap_or(TIME_PLACEHOLDER)
            ),
        ));
    }

    let bearing = qibla_bearing(config.location.latitude, config.location.longitude);
    rows.push(Row::new(Tone::Dim, format!("  القبلة: {}", format_bearing(bearing))));
    rows
}

/// Left-align by display width rather than char count.
fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(fill))
}

fn is_current(state: &DerivedPrayerState, prayer: Prayer) -> bool {
    state.current.as_ref().is_some_and(|c| c.prayer == prayer)
}

fn is_next_today(state: &DerivedPrayerState, prayer: Prayer, now: NaiveDateTime) -> bool {
    state
        .next
        .as_ref()
        .is_some_and(|n| n.prayer == prayer && n.date == now.date())
}
