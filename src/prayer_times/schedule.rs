use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

use crate::db::repository::{keys, KvStore};
use crate::models::{CalculationMethod, PrayerDayRecord};

/// Prayer days keyed and ordered by date. At most one record per date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrayerSchedule {
    days: BTreeMap<NaiveDate, PrayerDayRecord>,
}

impl PrayerSchedule {
    /// Build from records in any order; a later record wins on a duplicate date.
    pub fn from_records(records: impl IntoIterator<Item = PrayerDayRecord>) -> Self {
        let days = records.into_iter().map(|r| (r.date, r)).collect();
        Self { days }
    }

    pub fn get(&self, date: NaiveDate) -> Option<&PrayerDayRecord> {
        self.days.get(&date)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.days.contains_key(&date)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Records ascending by date.
    pub fn iter(&self) -> impl Iterator<Item = &PrayerDayRecord> {
        self.days.values()
    }

    pub fn records(&self) -> Vec<PrayerDayRecord> {
        self.days.values().cloned().collect()
    }

    pub fn in_month(&self, year: i32, month: u32) -> impl Iterator<Item = &PrayerDayRecord> {
        self.days
            .values()
            .filter(move |r| r.date.year() == year && r.date.month() == month)
    }

    /// True when every calendar day of the month has a record.
    pub fn has_full_month(&self, year: i32, month: u32) -> bool {
        month_days(year, month)
            .map(|days| days.iter().all(|d| self.contains(*d)))
            .unwrap_or(false)
    }

    /// Union with `incoming`, keeping existing records on overlapping dates.
    /// Returns the merged schedule and how many dates were added.
    pub fn merged_with(&self, incoming: &[PrayerDayRecord]) -> (Self, usize) {
        let mut next = self.clone();
        let mut added = 0;
        for record in incoming {
            if !next.days.contains_key(&record.date) {
                next.days.insert(record.date, record.clone());
                added += 1;
            }
        }
        (next, added)
    }

    /// Union with `incoming`, replacing existing records on overlapping dates.
    pub fn overlaid_with(&self, incoming: &[PrayerDayRecord]) -> Self {
        let mut next = self.clone();
        for record in incoming {
            next.days.insert(record.date, record.clone());
        }
        next
    }

    pub fn without(&self, date: NaiveDate) -> Self {
        let mut next = self.clone();
        next.days.remove(&date);
        next
    }
}

/// Every date of the given month, or None for an invalid month.
pub fn month_days(year: i32, month: u32) -> Option<Vec<NaiveDate>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    Some(
        first
            .iter_days()
            .take_while(|d| d.month() == month)
            .collect(),
    )
}

/// Owns the schedule and persists every transition through a [`KvStore`].
///
/// Each mutation builds the next schedule whole, writes it, then swaps it
/// in, so readers never observe a half-applied change.
pub struct ScheduleStore<S: KvStore> {
    kv: S,
    schedule: PrayerSchedule,
}

impl<S: KvStore> ScheduleStore<S> {
    pub fn open(kv: S) -> Result<Self> {
        let schedule = match kv.get(keys::PRAYER_TIMES)? {
            None => PrayerSchedule::default(),
            Some(json) => {
                let records: Vec<PrayerDayRecord> =
                    serde_json::from_str(&json).context("Parsing stored prayer times")?;
                PrayerSchedule::from_records(records)
            }
        };
        log::debug!("Loaded {} prayer days from storage", schedule.len());
        Ok(Self { kv, schedule })
    }

    pub fn schedule(&self) -> &PrayerSchedule {
        &self.schedule
    }

    /// Swap in a wholly new schedule (manual fetch, method change).
    pub fn replace(&mut self, records: Vec<PrayerDayRecord>) -> Result<()> {
        warn_unordered(&records);
        let next = PrayerSchedule::from_records(records);
        log::info!("Replacing schedule: {} -> {} days", self.schedule.len(), next.len());
        self.commit(next)
    }

    /// Add only the dates not already present; existing (possibly edited)
    /// records are kept. Returns the number of dates added.
    pub fn merge(&mut self, records: &[PrayerDayRecord]) -> Result<usize> {
        let (next, added) = self.schedule.merged_with(records);
        if added == 0 {
            log::debug!("Merge added nothing; schedule unchanged");
            return Ok(0);
        }
        warn_unordered(records);
        log::info!("Merged {} new days into schedule", added);
        self.commit(next)?;
        Ok(added)
    }

    /// Insert or overwrite the records' dates, keeping everything else.
    pub fn overlay(&mut self, records: &[PrayerDayRecord]) -> Result<()> {
        warn_unordered(records);
        let next = self.schedule.overlaid_with(records);
        log::info!("Overlaid {} days onto schedule", records.len());
        self.commit(next)
    }

    pub fn upsert(&mut self, record: PrayerDayRecord) -> Result<()> {
        self.overlay(std::slice::from_ref(&record))
    }

    /// Returns false when no record had that date.
    pub fn delete_by_date(&mut self, date: NaiveDate) -> Result<bool> {
        if !self.schedule.contains(date) {
            return Ok(false);
        }
        let next = self.schedule.without(date);
        log::info!("Deleted prayer day {}", date);
        self.commit(next)?;
        Ok(true)
    }

    pub fn calculation_method(&self) -> Result<CalculationMethod> {
        match self.kv.get(keys::CALCULATION_METHOD)? {
            None => Ok(CalculationMethod::default()),
            Some(raw) => raw.parse().context("Parsing stored calculation method"),
        }
    }

    pub fn set_calculation_method(&self, method: CalculationMethod) -> Result<()> {
        self.kv
            .set(keys::CALCULATION_METHOD, &method.code().to_string())
    }

    fn commit(&mut self, next: PrayerSchedule) -> Result<()> {
        let json = serde_json::to_string(&next.records()).context("Serializing prayer times")?;
        self.kv.set(keys::PRAYER_TIMES, &json)?;
        self.schedule = next;
        Ok(())
    }
}

fn warn_unordered(records: &[PrayerDayRecord]) {
    for r in records.iter().filter(|r| !r.is_ordered()) {
        log::warn!(
            "Prayer times for {} are out of order (fajr {}, sunrise {}, dhuhr {}, asr {}, maghrib {}, isha {})",
            r.date, r.fajr, r.sunrise, r.dhuhr, r.asr, r.maghrib, r.isha
        );
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::MemoryKv;

    pub(crate) fn day(date: &str) -> PrayerDayRecord {
        PrayerDayRecord {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            fajr: "04:10".into(),
            sunrise: "05:40".into(),
            dhuhr: "12:05".into(),
            asr: "15:40".into(),
            maghrib: "18:50".into(),
            isha: "20:10".into(),
        }
    }

    fn june(days: impl IntoIterator<Item = u32>) -> Vec<PrayerDayRecord> {
        days.into_iter()
            .map(|d| day(&format!("2025-06-{:02}", d)))
            .collect()
    }

    #[test]
    fn from_records_sorts_and_dedupes() {
        let mut later = day("2025-06-01");
        later.fajr = "04:00".into();
        let s = PrayerSchedule::from_records(vec![day("2025-06-03"), day("2025-06-01"), later]);
        let dates: Vec<_> = s.iter().map(|r| r.date.to_string()).collect();
        assert_eq!(dates, ["2025-06-01", "2025-06-03"]);
        assert_eq!(s.get(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()).unwrap().fajr, "04:00");
    }

    #[test]
    fn merge_yields_sorted_union_without_duplicates() {
        let mut store = ScheduleStore::open(MemoryKv::new()).unwrap();
        store.replace(june([2, 5, 9])).unwrap();

        let added = store.merge(&june(1..=30)).unwrap();
        assert_eq!(added, 27);
        let dates: Vec<u32> = store.schedule().iter().map(|r| r.date.day()).collect();
        assert_eq!(dates, (1..=30).collect::<Vec<_>>());
    }

    #[test]
    fn merge_keeps_manual_edits() {
        let mut store = ScheduleStore::open(MemoryKv::new()).unwrap();
        let mut edited = day("2025-06-05");
        edited.isha = "21:00".into();
        store.upsert(edited).unwrap();

        store.merge(&june(1..=30)).unwrap();
        let kept = store.schedule().get(NaiveDate::from_ymd_opt(2025, 6, 5).unwrap()).unwrap();
        assert_eq!(kept.isha, "21:00");
    }

    #[test]
    fn merge_of_full_month_is_idempotent() {
        let mut store = ScheduleStore::open(MemoryKv::new()).unwrap();
        store.merge(&june(1..=30)).unwrap();
        let before = store.schedule().clone();

        assert_eq!(store.merge(&june(1..=30)).unwrap(), 0);
        assert_eq!(store.schedule(), &before);
        assert!(store.schedule().has_full_month(2025, 6));
    }

    #[test]
    fn replace_discards_previous_days() {
        let mut store = ScheduleStore::open(MemoryKv::new()).unwrap();
        store.replace(june([1, 2])).unwrap();
        store.replace(vec![day("2025-07-01")]).unwrap();
        assert_eq!(store.schedule().len(), 1);
    }

    #[test]
    fn state_survives_reopen() {
        let kv = MemoryKv::new();
        {
            let mut store = ScheduleStore::open(&kv).unwrap();
            store.replace(june([1, 2, 3])).unwrap();
            assert!(store.delete_by_date(NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()).unwrap());
            assert!(!store.delete_by_date(NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()).unwrap());
            store.set_calculation_method(CalculationMethod::Egyptian).unwrap();
        }
        let store = ScheduleStore::open(&kv).unwrap();
        assert_eq!(store.schedule().len(), 2);
        assert_eq!(store.calculation_method().unwrap(), CalculationMethod::Egyptian);
    }

    #[test]
    fn month_days_handles_leap_years() {
        assert_eq!(month_days(2024, 2).unwrap().len(), 29);
        assert_eq!(month_days(2025, 2).unwrap().len(), 28);
        assert!(month_days(2025, 13).is_none());
    }
}
