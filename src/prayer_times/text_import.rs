//! Pasted prayer tables, e.g. copied from a mosque's monthly PDF:
//!
//! ```text
//! Día  Fajr   Salida  Duhr    Asr    Maghrib  Isha
//! 1    5:02   6:40    12:55   4:35 PM 7:10 PM 8:40 PM
//! ```

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use crate::models::prayer::normalize_time;
use crate::models::PrayerDayRecord;

static TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([0-9]{1,2}):([0-9]{2})(?:\s*(AM|PM))?").expect("time pattern is valid")
});

const MONTH_WORDS: &[(&str, u32)] = &[
    ("january", 1), ("jan", 1), ("enero", 1), ("ene", 1),
    ("february", 2), ("feb", 2), ("febrero", 2),
    ("march", 3), ("mar", 3), ("marzo", 3),
    ("april", 4), ("apr", 4), ("abril", 4), ("abr", 4),
    ("may", 5), ("mayo", 5),
    ("june", 6), ("jun", 6), ("junio", 6),
    ("july", 7), ("jul", 7), ("julio", 7),
    ("august", 8), ("aug", 8), ("agosto", 8), ("ago", 8),
    ("september", 9), ("sep", 9), ("septiembre", 9),
    ("october", 10), ("oct", 10), ("octubre", 10),
    ("november", 11), ("nov", 11), ("noviembre", 11),
    ("december", 12), ("dec", 12), ("diciembre", 12), ("dic", 12),
];

const COLUMNS: [&str; 6] = ["fajr", "sunrise", "dhuhr", "asr", "maghrib", "isha"];

/// Defaults for trailing columns a row left out: sunrise, dhuhr, asr,
/// maghrib, isha.
const FALLBACK: [&str; 5] = ["06:00", "12:00", "15:00", "18:00", "19:00"];

fn month_word(word: &str) -> Option<u32> {
    let lower = word.to_lowercase();
    MONTH_WORDS
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, m)| *m)
}

/// Year and month named in the text, if any. A month word only counts next
/// to a year ("June 2025", "2025 junio", "Noviembre de 2025").
pub fn detect_year_month(text: &str) -> (Option<i32>, Option<u32>) {
    let words: Vec<&str> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    let mut year = None;
    let mut month = None;
    for (i, word) in words.iter().enumerate() {
        let Some(y) = word
            .parse::<i32>()
            .ok()
            .filter(|y| word.len() == 4 && (1900..=2100).contains(y))
        else {
            continue;
        };
        year.get_or_insert(y);
        let near = [i.checked_sub(1), Some(i + 1), i.checked_sub(2)];
        if let Some(m) = near
            .into_iter()
            .flatten()
            .filter_map(|j| words.get(j))
            .find_map(|w| month_word(w))
        {
            month = Some(m);
            break;
        }
    }
    (year, month)
}

/// Parse every row that starts with a day number and carries at least five
/// times. Year and month fall back to the text, then to `today`. Rows with
/// an impossible time are skipped.
pub fn parse_prayer_table(
    text: &str,
    year: Option<i32>,
    month: Option<u32>,
    today: NaiveDate,
) -> Vec<PrayerDayRecord> {
    let (found_year, found_month) = detect_year_month(text);
    let year = year.or(found_year).unwrap_or(today.year());
    let month = month.or(found_month).unwrap_or(today.month());

    let mut records = Vec::new();
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let Some(day) = leading_day(line) else {
            continue;
        };
        let times = scan_times(line);
        if times.len() < 5 {
            continue;
        }
        let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
            log::warn!("Skipping row for day {} which is not in {}-{:02}", day, year, month);
            continue;
        };
        let checked: Result<Vec<String>, _> = COLUMNS
            .iter()
            .zip(&times)
            .map(|(field, time)| normalize_time(*field, time))
            .collect();
        let times = match checked {
            Ok(times) => times,
            Err(e) => {
                log::warn!("Skipping row for {}: {}", date, e);
                continue;
            }
        };
        let at = |i: usize| -> String {
            times
                .get(i)
                .cloned()
                .unwrap_or_else(|| FALLBACK[i - 1].to_string())
        };
        records.push(PrayerDayRecord {
            date,
            fajr: at(0),
            sunrise: at(1),
            dhuhr: at(2),
            asr: at(3),
            maghrib: at(4),
            isha: at(5),
        });
    }
    records
}

fn leading_day(line: &str) -> Option<u32> {
    let digits: String = line.chars().take_while(|c| c.is_ascii_digit()).take(2).collect();
    let day: u32 = digits.parse().ok()?;
    (1..=31).contains(&day).then_some(day)
}

/// Every `H:MM` / `HH:MM` in the line with AM/PM folded into 24-hour form.
/// Values are not range-checked here.
fn scan_times(line: &str) -> Vec<String> {
    TIME.captures_iter(line)
        .map(|caps| {
            let mut hour: u32 = caps[1].parse().unwrap_or_default();
            let minute = &caps[2];
            match caps.get(3).map(|m| m.as_str().to_ascii_uppercase()).as_deref() {
                Some("PM") if hour != 12 => hour += 12,
                Some("AM") if hour == 12 => hour = 0,
                _ => {}
            }
            format!("{:02}:{}", hour, minute)
        })
        .collect()
}
