pub mod aladhan;
pub mod calculator;
pub mod schedule;
pub mod sync;
pub mod text_import;

use anyhow::Result;
use chrono::{Datelike, NaiveDate};

use crate::db::KvStore;
use crate::models::{CalculationMethod, PrayerDayRecord};

pub use aladhan::{AladhanClient, FetchError};
pub use calculator::PrayerCalculator;
pub use schedule::{PrayerSchedule, ScheduleStore};
pub use sync::{derive_state, DerivedPrayerState, PrayerMoment};

/// Anything that can produce a month of prayer days.
pub trait MonthSource {
    fn month(&self, year: i32, month: u32, method: CalculationMethod)
        -> Result<Vec<PrayerDayRecord>>;

    /// The month `today` falls in.
    fn current_month(
        &self,
        today: NaiveDate,
        method: CalculationMethod,
    ) -> Result<Vec<PrayerDayRecord>> {
        self.month(today.year(), today.month(), method)
    }

    /// The month after the one `today` falls in.
    fn next_month(&self, today: NaiveDate, method: CalculationMethod) -> Result<Vec<PrayerDayRecord>> {
        let (year, month) = aladhan::next_month(today.year(), today.month());
        self.month(year, month, method)
    }
}

impl MonthSource for AladhanClient {
    fn month(
        &self,
        year: i32,
        month: u32,
        method: CalculationMethod,
    ) -> Result<Vec<PrayerDayRecord>> {
        Ok(self.fetch_month(year, month, method)?)
    }
}

impl MonthSource for PrayerCalculator {
    fn month(
        &self,
        year: i32,
        month: u32,
        method: CalculationMethod,
    ) -> Result<Vec<PrayerDayRecord>> {
        PrayerCalculator::month(self, year, month, method)
    }
}

/// Startup path: fill in missing days of the current month without touching
/// existing (possibly edited) ones. Skips the request entirely when the month
/// is already complete. Returns the number of days added.
pub fn ensure_current_month<S: KvStore>(
    store: &mut ScheduleStore<S>,
    source: &dyn MonthSource,
    today: NaiveDate,
    method: CalculationMethod,
) -> Result<usize> {
    if store.schedule().has_full_month(today.year(), today.month()) {
        log::debug!("Schedule already covers {}-{:02}", today.year(), today.month());
        return Ok(0);
    }
    let fetched = source.current_month(today, method)?;
    store.merge(&fetched)
}

/// Manual fetch of the current (or next) month: the result becomes the
/// whole schedule. Returns the number of days stored. An empty result leaves
/// the schedule alone.
pub fn refetch_month<S: KvStore>(
    store: &mut ScheduleStore<S>,
    source: &dyn MonthSource,
    today: NaiveDate,
    next: bool,
    method: CalculationMethod,
) -> Result<usize> {
    let fetched = if next {
        source.next_month(today, method)?
    } else {
        source.current_month(today, method)?
    };
    if fetched.is_empty() {
        log::warn!("No prayer times returned (next month: {})", next);
        return Ok(0);
    }
    let count = fetched.len();
    store.replace(fetched)?;
    Ok(count)
}
