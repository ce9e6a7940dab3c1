//! Minimal RFC 5545 writer: VCALENDAR with VEVENTs and audio VALARMs.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::fmt::Write as _;

use super::ExportError;

const PRODID: &str = "-//minasati//prayer times//AR";
const MAX_LINE_OCTETS: usize = 75;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    Confirmed,
    Tentative,
}

impl EventStatus {
    fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Confirmed => "CONFIRMED",
            EventStatus::Tentative => "TENTATIVE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusyStatus {
    Free,
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alarm {
    pub minutes: u32,
    pub before: bool,
    pub description: String,
}

/// One event as handed to the writer. `start` is
/// `[year, month, day, hour, minute]` in floating local time and is only
/// validated when the calendar is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventAttributes {
    pub uid: String,
    pub start: [i64; 5],
    pub duration_minutes: u32,
    pub title: String,
    pub description: String,
    pub status: EventStatus,
    pub busy_status: BusyStatus,
    pub alarms: Vec<Alarm>,
}

impl EventAttributes {
    pub fn start_datetime(&self) -> Result<NaiveDateTime, ExportError> {
        let invalid = || ExportError::InvalidStart {
            uid: self.uid.clone(),
            start: self.start,
        };
        let [y, mo, d, h, mi] = self.start;
        let year = i32::try_from(y).map_err(|_| invalid())?;
        let part = |v: i64| u32::try_from(v).map_err(|_| invalid());
        NaiveDate::from_ymd_opt(year, part(mo)?, part(d)?)
            .and_then(|date| date.and_hms_opt(part(h).ok()?, part(mi).ok()?, 0))
            .ok_or_else(invalid)
    }
}

/// Serialise all events, or fail on the first invalid one. Never returns a
/// partial calendar.
pub fn create_events(
    events: &[EventAttributes],
    stamp: DateTime<Utc>,
) -> Result<String, ExportError> {
    let starts = events
        .iter()
        .map(EventAttributes::start_datetime)
        .collect::<Result<Vec<_>, _>>()?;

    let mut out = String::new();
    push_line(&mut out, "BEGIN:VCALENDAR");
    push_line(&mut out, "VERSION:2.0");
    push_line(&mut out, &format!("PRODID:{}", PRODID));
    push_line(&mut out, "CALSCALE:GREGORIAN");
    push_line(&mut out, "METHOD:PUBLISH");

    let dtstamp = stamp.format("%Y%m%dT%H%M%SZ").to_string();
    for (event, start) in events.iter().zip(starts) {
        write_event(&mut out, event, start, &dtstamp);
    }

    push_line(&mut out, "END:VCALENDAR");
    Ok(out)
}

fn write_event(out: &mut String, event: &EventAttributes, start: NaiveDateTime, dtstamp: &str) {
    push_line(out, "BEGIN:VEVENT");
    push_line(out, &format!("UID:{}", escape_text(&event.uid)));
    push_line(out, &format!("DTSTAMP:{}", dtstamp));
    push_line(out, &format!("DTSTART:{}", start.format("%Y%m%dT%H%M%S")));
    push_line(out, &format!("DURATION:PT{}M", event.duration_minutes));
    push_line(out, &format!("SUMMARY:{}", escape_text(&event.title)));
    if !event.description.is_empty() {
        push_line(out, &format!("DESCRIPTION:{}", escape_text(&event.description)));
    }
    push_line(out, &format!("STATUS:{}", event.status.as_str()));
    let (transp, busy) = match event.busy_status {
        BusyStatus::Free => ("TRANSPARENT", "FREE"),
        BusyStatus::Busy => ("OPAQUE", "BUSY"),
    };
    push_line(out, &format!("TRANSP:{}", transp));
    push_line(out, &format!("X-MICROSOFT-CDO-BUSYSTATUS:{}", busy));

    for alarm in &event.alarms {
        push_line(out, "BEGIN:VALARM");
        push_line(out, "ACTION:AUDIO");
        let sign = if alarm.before { "-" } else { "" };
        push_line(out, &format!("TRIGGER:{}PT{}M", sign, alarm.minutes));
        push_line(out, &format!("DESCRIPTION:{}", escape_text(&alarm.description)));
        push_line(out, "END:VALARM");
    }
    push_line(out, "END:VEVENT");
}

/// TEXT value escaping (RFC 5545 §3.3.11).
fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}

/// Append a content line, folded at 75 octets without splitting a UTF-8
/// sequence, terminated by CRLF.
fn push_line(out: &mut String, line: &str) {
    let mut budget = MAX_LINE_OCTETS;
    let mut used = 0;
    for c in line.chars() {
        let len = c.len_utf8();
        if used + len > budget {
            out.push_str("\r\n ");
            // the leading space counts against the continuation line
            budget = MAX_LINE_OCTETS - 1;
            used = 0;
        }
        out.push(c);
        used += len;
    }
    let _ = write!(out, "\r\n");
}
