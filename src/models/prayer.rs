use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// The five obligatory prayers. Sunrise is a solar marker carried on
/// [`PrayerDayRecord`] but never a member of this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Prayer {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl Prayer {
    pub fn all() -> Vec<Prayer> {
        vec![
            Prayer::Fajr,
            Prayer::Dhuhr,
            Prayer::Asr,
            Prayer::Maghrib,
            Prayer::Isha,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Prayer::Fajr => "fajr",
            Prayer::Dhuhr => "dhuhr",
            Prayer::Asr => "asr",
            Prayer::Maghrib => "maghrib",
            Prayer::Isha => "isha",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Prayer::Fajr => "Fajr",
            Prayer::Dhuhr => "Dhuhr",
            Prayer::Asr => "Asr",
            Prayer::Maghrib => "Maghrib",
            Prayer::Isha => "Isha",
        }
    }

    pub fn arabic_name(&self) -> &'static str {
        match self {
            Prayer::Fajr => "الفجر",
            Prayer::Dhuhr => "الظهر",
            Prayer::Asr => "العصر",
            Prayer::Maghrib => "المغرب",
            Prayer::Isha => "العشاء",
        }
    }
}

impl std::fmt::Display for Prayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Prayer {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fajr" => Ok(Prayer::Fajr),
            "dhuhr" | "zuhr" | "duhr" => Ok(Prayer::Dhuhr),
            "asr" => Ok(Prayer::Asr),
            "maghrib" => Ok(Prayer::Maghrib),
            "isha" => Ok(Prayer::Isha),
            _ => Err(anyhow::anyhow!("Unknown prayer: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("invalid time '{value}' for {field}, expected HH:MM")]
    InvalidTime { field: &'static str, value: String },
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
}

impl ValidationError {
    pub fn user_message(&self) -> String {
        match self {
            ValidationError::MissingField(field) => {
                format!("الرجاء ملء جميع الحقول المطلوبة ({})", field)
            }
            ValidationError::InvalidTime { field, value } => {
                format!("وقت غير صالح لـ {}: {}", field, value)
            }
            ValidationError::InvalidDate(value) => format!("تاريخ غير صالح: {}", value),
        }
    }
}

/// Parse `H:MM` or `HH:MM` and return the zero-padded 24-hour form.
pub fn normalize_time(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let invalid = || ValidationError::InvalidTime {
        field,
        value: value.to_string(),
    };
    let trimmed = value.trim();
    let (h, m) = trimmed.split_once(':').ok_or_else(invalid)?;
    if h.is_empty() || h.len() > 2 || m.len() != 2 {
        return Err(invalid());
    }
    let hours: u32 = h.parse().map_err(|_| invalid())?;
    let minutes: u32 = m.parse().map_err(|_| invalid())?;
    NaiveTime::from_hms_opt(hours, minutes, 0).ok_or_else(invalid)?;
    Ok(format!("{:02}:{:02}", hours, minutes))
}

/// One calendar day's six times, each a zero-padded `HH:MM` string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrayerDayRecord {
    pub date: NaiveDate,
    pub fajr: String,
    pub sunrise: String,
    pub dhuhr: String,
    pub asr: String,
    pub maghrib: String,
    pub isha: String,
}

impl PrayerDayRecord {
    pub fn time_of(&self, prayer: Prayer) -> &str {
        match prayer {
            Prayer::Fajr => &self.fajr,
            Prayer::Dhuhr => &self.dhuhr,
            Prayer::Asr => &self.asr,
            Prayer::Maghrib => &self.maghrib,
            Prayer::Isha => &self.isha,
        }
    }

    /// The five prayers with their times, in canonical order.
    pub fn prayers(&self) -> [(Prayer, &str); 5] {
        [
            (Prayer::Fajr, self.fajr.as_str()),
            (Prayer::Dhuhr, self.dhuhr.as_str()),
            (Prayer::Asr, self.asr.as_str()),
            (Prayer::Maghrib, self.maghrib.as_str()),
            (Prayer::Isha, self.isha.as_str()),
        ]
    }

    /// True when fajr ≤ sunrise ≤ dhuhr ≤ asr ≤ maghrib ≤ isha.
    pub fn is_ordered(&self) -> bool {
        let times = [
            &self.fajr,
            &self.sunrise,
            &self.dhuhr,
            &self.asr,
            &self.maghrib,
            &self.isha,
        ];
        times.windows(2).all(|w| w[0] <= w[1])
    }
}

/// Raw fields of a manually entered day, before validation.
#[derive(Debug, Clone, Default)]
pub struct ManualEntry {
    pub date: Option<String>,
    pub fajr: Option<String>,
    pub sunrise: Option<String>,
    pub dhuhr: Option<String>,
    pub asr: Option<String>,
    pub maghrib: Option<String>,
    pub isha: Option<String>,
}

impl ManualEntry {
    /// Validate into a record. Sunrise is optional and defaults to 06:00.
    pub fn into_record(self) -> Result<PrayerDayRecord, ValidationError> {
        fn required(
            field: &'static str,
            value: Option<String>,
        ) -> Result<String, ValidationError> {
            match value {
                Some(v) if !v.trim().is_empty() => normalize_time(field, &v),
                _ => Err(ValidationError::MissingField(field)),
            }
        }

        let date_str = self
            .date
            .filter(|d| !d.trim().is_empty())
            .ok_or(ValidationError::MissingField("date"))?;
        let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
            .map_err(|_| ValidationError::InvalidDate(date_str.clone()))?;

        let sunrise = match self.sunrise {
            Some(v) if !v.trim().is_empty() => normalize_time("sunrise", &v)?,
            _ => "06:00".to_string(),
        };

        Ok(PrayerDayRecord {
            date,
            fajr: required("fajr", self.fajr)?,
            sunrise,
            dhuhr: required("dhuhr", self.dhuhr)?,
            asr: required("asr", self.asr)?,
            maghrib: required("maghrib", self.maghrib)?,
            isha: required("isha", self.isha)?,
        })
    }
}
