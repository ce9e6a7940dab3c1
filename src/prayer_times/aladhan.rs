use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use crate::config::AppConfig;
use crate::models::{CalculationMethod, PrayerDayRecord};
use crate::models::prayer::normalize_time;

pub const DEFAULT_BASE_URL: &str = "https://api.aladhan.com/v1";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error! status: {0}")]
    Status(u16),
    #[error("invalid response from Aladhan API: {0}")]
    InvalidResponse(String),
    #[error("invalid month {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },
}

impl FetchError {
    /// The one message shown to the user, whatever went wrong.
    pub fn user_message(&self) -> &'static str {
        "فشل في جلب أوقات الصلاة من الإنترنت. تحقق من الاتصال بالإنترنت."
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    code: i64,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    data: Option<Vec<Day>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Timings {
    fajr: String,
    sunrise: String,
    dhuhr: String,
    asr: String,
    maghrib: String,
    isha: String,
}

#[derive(Debug, Deserialize)]
struct MonthRef {
    number: u32,
}

#[derive(Debug, Deserialize)]
struct Gregorian {
    day: String,
    month: MonthRef,
    year: String,
}

#[derive(Debug, Deserialize)]
struct DateInfo {
    gregorian: Gregorian,
}

#[derive(Debug, Deserialize)]
struct Day {
    timings: Timings,
    date: DateInfo,
}

/// Client for the Aladhan monthly calendar endpoint, pinned to one location.
pub struct AladhanClient {
    base_url: String,
    latitude: f64,
    longitude: f64,
    http: reqwest::blocking::Client,
}

impl AladhanClient {
    pub fn new(base_url: &str, latitude: f64, longitude: f64) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            latitude,
            longitude,
            http: reqwest::blocking::Client::new(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            &config.api.base_url,
            config.location.latitude,
            config.location.longitude,
        )
    }

    /// One request for the whole month; days come back sorted by date.
    pub fn fetch_month(
        &self,
        year: i32,
        month: u32,
        method: CalculationMethod,
    ) -> Result<Vec<PrayerDayRecord>, FetchError> {
        if !(1..=12).contains(&month) {
            return Err(FetchError::InvalidMonth { year, month });
        }
        log::info!(
            "Fetching prayer times for {}-{} with method {}...",
            year,
            month,
            method.code()
        );

        let url = format!("{}/calendar/{}/{}", self.base_url, year, month);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("latitude", self.latitude.to_string()),
                ("longitude", self.longitude.to_string()),
                ("method", method.code().to_string()),
            ])
            .send()?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let body = response.text()?;
        let records = parse_calendar(&body)?;
        log::info!("Received {} days from Aladhan API", records.len());
        Ok(records)
    }
}

pub fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month >= 12 { (year + 1, 1) } else { (year, month + 1) }
}

/// Decode a calendar envelope into records sorted by date.
fn parse_calendar(body: &str) -> Result<Vec<PrayerDayRecord>, FetchError> {
    let envelope: Envelope = serde_json::from_str(body)
        .map_err(|e| FetchError::InvalidResponse(e.to_string()))?;

    if envelope.code != 200 {
        return Err(FetchError::InvalidResponse(format!(
            "code {} ({})",
            envelope.code,
            envelope.status.as_deref().unwrap_or("no status")
        )));
    }
    let days = envelope
        .data
        .ok_or_else(|| FetchError::InvalidResponse("missing data".into()))?;

    let mut records = days
        .into_iter()
        .map(day_to_record)
        .collect::<Result<Vec<_>, _>>()?;
    records.sort_by_key(|r| r.date);
    Ok(records)
}

fn day_to_record(day: Day) -> Result<PrayerDayRecord, FetchError> {
    let g = &day.date.gregorian;
    let bad = |what: &str| FetchError::InvalidResponse(format!("bad {} in {:?}", what, g));
    let year: i32 = g.year.trim().parse().map_err(|_| bad("year"))?;
    let d: u32 = g.day.trim().parse().map_err(|_| bad("day"))?;
    let date = NaiveDate::from_ymd_opt(year, g.month.number, d).ok_or_else(|| bad("date"))?;

    let t = &day.timings;
    Ok(PrayerDayRecord {
        date,
        fajr: local_time("fajr", &t.fajr)?,
        sunrise: local_time("sunrise", &t.sunrise)?,
        dhuhr: local_time("dhuhr", &t.dhuhr)?,
        asr: local_time("asr", &t.asr)?,
        maghrib: local_time("maghrib", &t.maghrib)?,
        isha: local_time("isha", &t.isha)?,
    })
}

/// "05:30 (-03)" -> "05:30". The offset always matches the requested
/// coordinates' local time, so it is dropped.
fn local_time(field: &'static str, raw: &str) -> Result<String, FetchError> {
    let hm = raw.split_whitespace().next().unwrap_or_default();
    normalize_time(field, hm).map_err(|e| FetchError::InvalidResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn day_json(day: u32, fajr: &str) -> String {
        format!(
            r#"{{
                "timings": {{"Fajr": "{fajr} (-03)", "Sunrise": "07:55 (-03)", "Dhuhr": "12:55 (-03)",
                             "Asr": "15:35 (-03)", "Maghrib": "17:50 (-03)", "Isha": "19:12 (-03)",
                             "Imsak": "05:50 (-03)", "Midnight": "00:55 (-03)"}},
                "date": {{"readable": "x", "gregorian": {{"date": "{day:02}-06-2025", "day": "{day:02}",
                          "month": {{"number": 6, "en": "June"}}, "year": "2025"}}}}
            }}"#
        )
    }

    fn month_body(days: &[u32]) -> String {
        let data: Vec<String> = days.iter().map(|d| day_json(*d, "06:01")).collect();
        format!(r#"{{"code": 200, "status": "OK", "data": [{}]}}"#, data.join(","))
    }

    #[test]
    fn fetch_month_strips_offsets_and_sorts() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/calendar/2025/6")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("method".into(), "4".into()),
                Matcher::UrlEncoded("latitude".into(), "-34.6037".into()),
                Matcher::UrlEncoded("longitude".into(), "-58.3816".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(month_body(&[3, 1, 2]))
            .create();

        let client = AladhanClient::new(&server.url(), -34.6037, -58.3816);
        let records = client
            .fetch_month(2025, 6, CalculationMethod::UmmAlQura)
            .unwrap();

        mock.assert();
        let dates: Vec<String> = records.iter().map(|r| r.date.to_string()).collect();
        assert_eq!(dates, ["2025-06-01", "2025-06-02", "2025-06-03"]);
        assert_eq!(records[0].fajr, "06:01");
        assert_eq!(records[0].isha, "19:12");
    }

    #[test]
    fn non_200_code_in_envelope_is_an_error() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/calendar/2025/6")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"code": 400, "status": "BAD_REQUEST", "data": "Invalid method"}"#)
            .create();

        let client = AladhanClient::new(&server.url(), 0.0, 0.0);
        let err = client
            .fetch_month(2025, 6, CalculationMethod::Isna)
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidResponse(_)), "{:?}", err);
    }

    #[test]
    fn http_failure_status_is_an_error() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/calendar/2025/6")
            .match_query(Matcher::Any)
            .with_status(503)
            .create();

        let client = AladhanClient::new(&server.url(), 0.0, 0.0);
        let err = client
            .fetch_month(2025, 6, CalculationMethod::Isna)
            .unwrap_err();
        assert!(matches!(err, FetchError::Status(503)));
        assert!(err.user_message().contains("فشل"));
    }

    #[test]
    fn missing_data_field_is_an_error() {
        let err = parse_calendar(r#"{"code": 200, "status": "OK"}"#).unwrap_err();
        assert!(matches!(err, FetchError::InvalidResponse(_)));
    }

    #[test]
    fn next_month_wraps_december() {
        assert_eq!(next_month(2025, 12), (2026, 1));
        assert_eq!(next_month(2025, 6), (2025, 7));
    }

    #[test]
    fn local_time_accepts_bare_and_annotated() {
        assert_eq!(local_time("fajr", "05:30 (-03)").unwrap(), "05:30");
        assert_eq!(local_time("fajr", "05:30").unwrap(), "05:30");
        assert!(local_time("fajr", "").is_err());
    }
}
