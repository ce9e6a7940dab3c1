use anyhow::{anyhow, bail, Context, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Utc};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::config::AppConfig;
use crate::db::KvStore;
use crate::export::ExportRequest;
use crate::models::{
    Appointment, CalculationMethod, ManualEntry, Prayer, TaskItem, ValidationError,
};
use crate::prayer_times::aladhan::next_month;
use crate::prayer_times::text_import::parse_prayer_table;
use crate::prayer_times::{
    ensure_current_month, refetch_month, AladhanClient, FetchError, MonthSource,
    PrayerCalculator, ScheduleStore,
};
use crate::tui::dashboard::{dashboard, Tone};
use crate::utils::format::{format_date, TIME_PLACEHOLDER};
use crate::utils::hijri::hijri_day_month;
use crate::utils::time::Clock;

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const GOLD: &str = "\x1b[38;2;196;160;68m";

fn ansi(tone: Tone) -> &'static str {
    match tone {
        Tone::Title => GOLD,
        Tone::Plain => "",
        Tone::Dim => DIM,
        Tone::Current => GREEN,
        Tone::Next => BOLD,
        Tone::Accent => AMBER,
    }
}

/// Put the Arabic user message on top of a typed error, keeping the cause.
fn explain(err: anyhow::Error) -> anyhow::Error {
    if let Some(message) = err.downcast_ref::<FetchError>().map(FetchError::user_message) {
        return err.context(message);
    }
    err
}

fn validation(err: ValidationError) -> anyhow::Error {
    let message = err.user_message();
    anyhow::Error::new(err).context(message)
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| validation(ValidationError::InvalidDate(value.to_string())))
}

fn source(config: &AppConfig, offline: bool) -> Result<Box<dyn MonthSource>> {
    Ok(if offline {
        Box::new(PrayerCalculator::from_config(config)?)
    } else {
        Box::new(AladhanClient::from_config(config))
    })
}

// ─── Times ───────────────────────────────────────────────────────────────────

pub fn handle_times<S: KvStore>(
    store: &ScheduleStore<S>,
    config: &AppConfig,
    now: NaiveDateTime,
) -> Result<()> {
    println!();
    for row in dashboard(store.schedule(), config, now) {
        println_colored!(ansi(row.tone), "{}", row.text);
    }
    println!();
    Ok(())
}

// ─── Watch ───────────────────────────────────────────────────────────────────

pub fn handle_watch<S: KvStore>(
    store: &ScheduleStore<S>,
    config: &AppConfig,
    clock: Clock,
) -> Result<()> {
    crate::tui::watch::run(store.schedule(), config, clock)
}

// ─── Fetch / sync ────────────────────────────────────────────────────────────

pub fn handle_fetch<S: KvStore>(
    store: &mut ScheduleStore<S>,
    config: &AppConfig,
    today: NaiveDate,
    next: bool,
    method_code: Option<u8>,
    offline: bool,
) -> Result<()> {
    if let Some(code) = method_code {
        let method = CalculationMethod::from_code(code)
            .ok_or_else(|| anyhow!("Unknown calculation method {}. Run `minasati method` for the list", code))?;
        store.set_calculation_method(method)?;
    }
    let method = store.calculation_method()?;
    let (year, month) = if next {
        next_month(today.year(), today.month())
    } else {
        (today.year(), today.month())
    };

    let source = source(config, offline)?;
    let count = refetch_month(store, source.as_ref(), today, next, method).map_err(explain)?;
    if count == 0 {
        println_colored!(AMBER, "  No prayer times returned for {}-{:02}", year, month);
    } else {
        println_colored!(
            GREEN,
            "  ✓ Stored {} days for {}-{:02} ({})",
            count,
            year,
            month,
            method.label()
        );
    }
    Ok(())
}

pub fn handle_sync<S: KvStore>(
    store: &mut ScheduleStore<S>,
    config: &AppConfig,
    today: NaiveDate,
    offline: bool,
) -> Result<()> {
    let method = store.calculation_method()?;
    let source = source(config, offline)?;
    let added = ensure_current_month(store, source.as_ref(), today, method).map_err(explain)?;
    if added == 0 {
        println_colored!(DIM, "  {}-{:02} is already complete", today.year(), today.month());
    } else {
        println_colored!(GREEN, "  ✓ Added {} days", added);
    }
    Ok(())
}

// ─── List ────────────────────────────────────────────────────────────────────

pub fn handle_list<S: KvStore>(
    store: &ScheduleStore<S>,
    config: &AppConfig,
    month: Option<&str>,
) -> Result<()> {
    let filter = match month {
        Some(m) => {
            let first = NaiveDate::parse_from_str(&format!("{}-01", m.trim()), "%Y-%m-%d")
                .map_err(|_| anyhow!("Invalid month '{}', expected YYYY-MM", m))?;
            Some((first.year(), first.month()))
        }
        None => None,
    };

    let records: Vec<_> = match filter {
        Some((y, m)) => store.schedule().in_month(y, m).collect(),
        None => store.schedule().iter().collect(),
    };
    if records.is_empty() {
        println_colored!(DIM, "  No stored prayer times");
        return Ok(());
    }

    println!();
    println_colored!(
        BOLD,
        "  {:<10}  {:<5}  {:>5}  {:>5}  {:>5}  {:>5}  {:>5}  {:>5}",
        "Date", "Hijri", "Fajr", "Rise", "Dhuhr", "Asr", "Mghrb", "Isha"
    );
    for r in records {
        let hijri = hijri_day_month(r.date, config.location.hijri_offset)
            .unwrap_or_else(|| TIME_PLACEHOLDER.to_string());
        let line = format!(
            "  {:<10}  {:<5}  {:>5}  {:>5}  {:>5}  {:>5}  {:>5}  {:>5}",
            format_date(r.date),
            hijri,
            r.fajr,
            r.sunrise,
            r.dhuhr,
            r.asr,
            r.maghrib,
            r.isha
        );
        if r.is_ordered() {
            println!("{}", line);
        } else {
            println_colored!(AMBER, "{}  !", line);
        }
    }
    println!();
    Ok(())
}

// ─── Manual entry ────────────────────────────────────────────────────────────

pub fn handle_add<S: KvStore>(store: &mut ScheduleStore<S>, entry: ManualEntry) -> Result<()> {
    let record = entry.into_record().map_err(validation)?;
    if !record.is_ordered() {
        println_colored!(AMBER, "  Times for {} are out of order; saved anyway", record.date);
    }
    let date = record.date;
    store.upsert(record)?;
    println_colored!(GREEN, "  ✓ Saved prayer times for {}", date);
    Ok(())
}

pub fn handle_delete<S: KvStore>(store: &mut ScheduleStore<S>, date: &str) -> Result<()> {
    let date = parse_date(date)?;
    if store.delete_by_date(date)? {
        println_colored!(GREEN, "  ✓ Deleted {}", date);
    } else {
        println_colored!(DIM, "  Nothing stored for {}", date);
    }
    Ok(())
}

// ─── Import ──────────────────────────────────────────────────────────────────

pub fn handle_import<S: KvStore>(
    store: &mut ScheduleStore<S>,
    file: &Path,
    year: Option<i32>,
    month: Option<u32>,
    today: NaiveDate,
) -> Result<()> {
    if let Some(m) = month {
        if !(1..=12).contains(&m) {
            bail!("Invalid month {}", m);
        }
    }
    let text =
        std::fs::read_to_string(file).with_context(|| format!("Reading {:?}", file))?;
    let records = parse_prayer_table(&text, year, month, today);
    let (Some(first), Some(last)) = (records.first(), records.last()) else {
        bail!("No prayer rows found in {:?}", file);
    };
    let (first, last) = (first.date, last.date);
    store.overlay(&records)?;
    println_colored!(
        GREEN,
        "  ✓ Imported {} days ({} … {})",
        records.len(),
        first,
        last
    );
    Ok(())
}

// ─── Method ──────────────────────────────────────────────────────────────────

pub fn handle_method<S: KvStore>(store: &ScheduleStore<S>, code: Option<u8>) -> Result<()> {
    if let Some(code) = code {
        let method = CalculationMethod::from_code(code)
            .ok_or_else(|| anyhow!("Unknown calculation method {}", code))?;
        store.set_calculation_method(method)?;
        log::info!("Calculation method set to {}", method.code());
        println_colored!(GREEN, "  ✓ Calculation method: {} {}", method.code(), method.label());
        println_colored!(DIM, "  Run `minasati fetch` to refresh the schedule");
        return Ok(());
    }

    let current = store.calculation_method()?;
    println!();
    for method in CalculationMethod::all() {
        if *method == current {
            println_colored!(GREEN, "  ● {:>2}  {}", method.code(), method.label());
        } else {
            println!("    {:>2}  {}", method.code(), method.label());
        }
    }
    println!();
    Ok(())
}

// ─── Export ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct ExportOptions {
    pub out: Option<PathBuf>,
    pub dates: Vec<String>,
    pub prayers: Option<Vec<String>>,
    pub no_at_adhan: bool,
    pub no_before: bool,
    pub before: Option<u32>,
    pub tasks: Option<PathBuf>,
    pub appointments: Option<PathBuf>,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Reading {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Parsing {:?}", path))
}

pub fn handle_export<S: KvStore>(
    store: &ScheduleStore<S>,
    config: &AppConfig,
    options: ExportOptions,
) -> Result<()> {
    let mut settings = config.export.settings.clone();
    if let Some(names) = &options.prayers {
        settings.selected_prayers = names
            .iter()
            .map(|n| Prayer::from_str(n))
            .collect::<Result<_>>()?;
    }
    settings.notify_at_adhan &= !options.no_at_adhan;
    settings.notify_before_adhan &= !options.no_before;
    if let Some(minutes) = options.before {
        settings.minutes_before_adhan = minutes;
    }

    let dates = options
        .dates
        .iter()
        .map(|d| parse_date(d))
        .collect::<Result<Vec<_>>>()?;
    let tasks: Vec<TaskItem> = match &options.tasks {
        Some(path) => read_json(path)?,
        None => Vec::new(),
    };
    let appointments: Vec<Appointment> = match &options.appointments {
        Some(path) => read_json(path)?,
        None => Vec::new(),
    };

    if store.schedule().is_empty() {
        bail!("لا توجد أوقات صلاة للتصدير (run `minasati fetch` first)");
    }
    let records = store.schedule().records();
    if !dates.is_empty() && !records.iter().any(|r| dates.contains(&r.date)) {
        bail!("الرجاء اختيار أيام للتصدير (no stored days match --date)");
    }
    let request = ExportRequest {
        records: &records,
        settings,
        tasks: &tasks,
        appointments: &appointments,
        selected_dates: (!dates.is_empty()).then_some(dates.as_slice()),
    };
    let calendar = request.generate(Utc::now()).map_err(|e| {
        let message = e.user_message();
        anyhow::Error::new(e).context(message)
    })?;

    let out = options
        .out
        .unwrap_or_else(|| PathBuf::from(&config.export.file_name));
    std::fs::write(&out, &calendar).with_context(|| format!("Writing {:?}", out))?;
    let events = calendar.matches("BEGIN:VEVENT").count();
    println_colored!(GREEN, "  ✓ Wrote {} events to {}", events, out.display());
    Ok(())
}
