use anyhow::{anyhow, Result};
use chrono::{FixedOffset, NaiveDate};
use salah::prelude::{
    Configuration, Coordinates, Madhab, Method, Prayer as SalahPrayer,
    PrayerSchedule as SalahSchedule,
};

use crate::config::AppConfig;
use crate::models::{CalculationMethod, PrayerDayRecord};
use crate::prayer_times::schedule::month_days;

/// Computes prayer days locally from coordinates, without the network.
pub struct PrayerCalculator {
    pub lat: f64,
    pub lng: f64,
    pub madhab_str: String,
    pub offset: FixedOffset,
}

impl PrayerCalculator {
    pub fn new(lat: f64, lng: f64, madhab: &str, tz_offset_minutes: i32) -> Result<Self> {
        let offset = FixedOffset::east_opt(tz_offset_minutes * 60)
            .ok_or_else(|| anyhow!("Invalid timezone offset: {}", tz_offset_minutes))?;
        // Validate madhab early
        parse_madhab(madhab)?;
        Ok(Self {
            lat,
            lng,
            madhab_str: madhab.to_string(),
            offset,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(
            config.location.latitude,
            config.location.longitude,
            &config.location.madhab,
            config.location.timezone_offset,
        )
    }

    pub fn day(&self, date: NaiveDate, method: CalculationMethod) -> Result<PrayerDayRecord> {
        let params = Configuration::with(salah_method(method), parse_madhab(&self.madhab_str)?);
        let times = SalahSchedule::new()
            .on(date)
            .for_location(Coordinates::new(self.lat, self.lng))
            .with_configuration(params)
            .calculate()
            .map_err(|e| anyhow!("Prayer calculation failed for {}: {}", date, e))?;

        let local = |prayer: SalahPrayer| -> String {
            times
                .time(prayer)
                .with_timezone(&self.offset)
                .format("%H:%M")
                .to_string()
        };

        Ok(PrayerDayRecord {
            date,
            fajr: local(SalahPrayer::Fajr),
            sunrise: local(SalahPrayer::Sunrise),
            dhuhr: local(SalahPrayer::Dhuhr),
            asr: local(SalahPrayer::Asr),
            maghrib: local(SalahPrayer::Maghrib),
            isha: local(SalahPrayer::Isha),
        })
    }

    pub fn month(
        &self,
        year: i32,
        month: u32,
        method: CalculationMethod,
    ) -> Result<Vec<PrayerDayRecord>> {
        let days = month_days(year, month).ok_or_else(|| anyhow!("Invalid month {}-{}", year, month))?;
        log::info!(
            "Calculating prayer times offline for {}-{} with method {}",
            year,
            month,
            method.code()
        );
        days.into_iter().map(|d| self.day(d, method)).collect()
    }
}

fn salah_method(method: CalculationMethod) -> Method {
    match method {
        CalculationMethod::Isna => Method::NorthAmerica,
        CalculationMethod::MuslimWorldLeague => Method::MuslimWorldLeague,
        CalculationMethod::UmmAlQura => Method::UmmAlQura,
        CalculationMethod::Egyptian => Method::Egyptian,
        CalculationMethod::Tehran => Method::Tehran,
        CalculationMethod::Turkey => Method::Turkey,
    }
}

fn parse_madhab(s: &str) -> Result<Madhab> {
    match s {
        "Hanafi" => Ok(Madhab::Hanafi),
        "Shafi" | "Shafi'i" => Ok(Madhab::Shafi),
        _ => Err(anyhow!("Unknown madhab: '{}'", s)),
    }
}
