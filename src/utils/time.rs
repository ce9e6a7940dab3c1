use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use std::time::Instant;

pub const NOW_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Local wall clock, optionally started at a fixed moment. A started clock
/// advances in whole seconds from that moment.
#[derive(Debug, Clone, Copy, Default)]
pub struct Clock {
    start: Option<(NaiveDateTime, Instant)>,
}

impl Clock {
    pub fn system() -> Self {
        Self::default()
    }

    pub fn starting_at(start: NaiveDateTime) -> Self {
        Self {
            start: Some((start, Instant::now())),
        }
    }

    pub fn parse(value: &str) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(value.trim(), NOW_FORMAT).ok()
    }

    pub fn now(&self) -> NaiveDateTime {
        match self.start {
            Some((start, since)) => start + Duration::seconds(since.elapsed().as_secs() as i64),
            None => Local::now().naive_local(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Parse a zero-padded `HH:MM` time-of-day.
pub fn parse_hm(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M").ok()
}

/// Countdown from `now` to `target` on `now`'s own calendar day, as
/// `HH:MM:SS`. A target that already passed yields `00:00:00`; callers pick
/// a future day with [`time_until_on`].
pub fn time_until(target: &str, now: NaiveDateTime) -> Option<String> {
    time_until_on(now.date(), target, now)
}

/// Countdown from `now` to `target` on `date`, as `HH:MM:SS`, clamped at zero.
pub fn time_until_on(date: NaiveDate, target: &str, now: NaiveDateTime) -> Option<String> {
    let at = date.and_time(parse_hm(target)?);
    Some(format_hms(clamp(at - now)))
}

/// Elapsed time from `target` today until `now`, as `HH:MM`, clamped at zero.
pub fn time_since(target: &str, now: NaiveDateTime) -> Option<String> {
    let at = now.date().and_time(parse_hm(target)?);
    Some(format_hm(clamp(now - at)))
}

fn clamp(d: Duration) -> Duration {
    if d < Duration::zero() { Duration::zero() } else { d }
}

fn format_hms(d: Duration) -> String {
    let secs = d.num_seconds();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

fn format_hm(d: Duration) -> String {
    let mins = d.num_minutes();
    format!("{:02}:{:02}", mins / 60, mins % 60)
}
