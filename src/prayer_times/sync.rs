use chrono::{NaiveDate, NaiveDateTime};

use crate::models::Prayer;
use crate::prayer_times::schedule::PrayerSchedule;
use crate::utils::time::{parse_hm, time_since, time_until, time_until_on};

/// A prayer pinned to the calendar day it falls on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrayerMoment {
    pub prayer: Prayer,
    pub time: String,
    pub date: NaiveDate,
}

/// Display state recomputed on every tick. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedPrayerState {
    pub current: Option<PrayerMoment>,
    pub next: Option<PrayerMoment>,
    /// `HH:MM:SS` until `next`
    pub time_remaining: Option<String>,
    /// `HH:MM` since `current`
    pub time_since: Option<String>,
    pub seconds_remaining: Option<i64>,
}

impl DerivedPrayerState {
    /// Nothing known for today: every field empty.
    pub fn is_empty(&self) -> bool {
        self.current.is_none() && self.next.is_none()
    }
}

/// Derive current/next prayer for `now` from the schedule.
///
/// Times compare as zero-padded `HH:MM` strings against `now` truncated to
/// the minute. Before today's fajr there is no current prayer; after isha the
/// next prayer is tomorrow's fajr if tomorrow is scheduled.
pub fn derive_state(schedule: &PrayerSchedule, now: NaiveDateTime) -> DerivedPrayerState {
    let today = now.date();
    let Some(record) = schedule.get(today) else {
        return DerivedPrayerState::default();
    };
    let now_hm = now.format("%H:%M").to_string();
    let prayers = record.prayers();

    let next = prayers
        .iter()
        .find(|(_, time)| *time > now_hm.as_str())
        .map(|(prayer, time)| PrayerMoment {
            prayer: *prayer,
            time: time.to_string(),
            date: today,
        })
        .or_else(|| {
            let tomorrow = today.succ_opt()?;
            schedule.get(tomorrow).map(|r| PrayerMoment {
                prayer: Prayer::Fajr,
                time: r.fajr.clone(),
                date: tomorrow,
            })
        });

    let current = prayers
        .iter()
        .take_while(|(_, time)| *time <= now_hm.as_str())
        .last()
        .map(|(prayer, time)| PrayerMoment {
            prayer: *prayer,
            time: time.to_string(),
            date: today,
        });

    let time_remaining = next.as_ref().and_then(|n| {
        if n.date == today {
            time_until(&n.time, now)
        } else {
            time_until_on(n.date, &n.time, now)
        }
    });
    let seconds_remaining = next.as_ref().and_then(|n| {
        let at = n.date.and_time(parse_hm(&n.time)?);
        Some((at - now).num_seconds().max(0))
    });
    let time_since = current.as_ref().and_then(|c| time_since(&c.time, now));

    DerivedPrayerState {
        current,
        next,
        time_remaining,
        time_since,
        seconds_remaining,
    }
}
