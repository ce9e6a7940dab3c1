use chrono::{Datelike, Duration, NaiveDate};
use hijri_date::HijriDate;

const MONTHS_AR: [&str; 12] = [
    "محرم",
    "صفر",
    "ربيع الأول",
    "ربيع الآخر",
    "جمادى الأولى",
    "جمادى الآخرة",
    "رجب",
    "شعبان",
    "رمضان",
    "شوال",
    "ذو القعدة",
    "ذو الحجة",
];

fn convert(date: NaiveDate, offset_days: i32) -> Option<HijriDate> {
    let adjusted = date + Duration::days(offset_days as i64);
    HijriDate::from_gr(
        adjusted.year() as usize,
        adjusted.month() as usize,
        adjusted.day() as usize,
    )
    .map_err(|e| log::debug!("Hijri conversion failed for {}: {}", adjusted, e))
    .ok()
}

/// "D MonthName YYYY" in Arabic, or None outside the converter's range.
pub fn hijri_long(date: NaiveDate, offset_days: i32) -> Option<String> {
    let hd = convert(date, offset_days)?;
    let name = MONTHS_AR.get(hd.month().wrapping_sub(1))?;
    Some(format!("{} {} {}", hd.day(), name, hd.year()))
}

/// Compact "DD/MM" used in schedule tables.
pub fn hijri_day_month(date: NaiveDate, offset_days: i32) -> Option<String> {
    let hd = convert(date, offset_days)?;
    Some(format!("{:02}/{:02}", hd.day(), hd.month()))
}
