pub mod ics;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use thiserror::Error;

use crate::models::{Appointment, ExportSettings, Prayer, PrayerDayRecord, TaskItem};
use ics::{Alarm, BusyStatus, EventAttributes, EventStatus};

const PRAYER_MINUTES: u32 = 30;
const TASK_MINUTES: u32 = 60;
const APPOINTMENT_MINUTES: u32 = 60;
pub const MAX_LEAD_MINUTES: u32 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    #[error("invalid start {start:?} for event {uid}")]
    InvalidStart { uid: String, start: [i64; 5] },
    #[error("cannot read {field} '{value}'")]
    InvalidField { field: &'static str, value: String },
    #[error("minutes before adhan must be at most 60, got {0}")]
    LeadMinutes(u32),
}

impl ExportError {
    pub fn user_message(&self) -> &'static str {
        "حدث خطأ أثناء إنشاء ملف التصدير"
    }
}

fn title(prayer: Prayer) -> String {
    format!("صلاة {}", prayer.arabic_name())
}

fn numbers(field: &'static str, value: &str, sep: char) -> Result<Vec<i64>, ExportError> {
    value
        .split(sep)
        .map(|p| p.trim().parse::<i64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| ExportError::InvalidField {
            field,
            value: value.to_string(),
        })
}

fn ymd(field: &'static str, value: &str) -> Result<[i64; 3], ExportError> {
    match numbers(field, value, '-')?.as_slice() {
        [y, m, d] => Ok([*y, *m, *d]),
        _ => Err(ExportError::InvalidField {
            field,
            value: value.to_string(),
        }),
    }
}

/// Hour and minute from "HH:MM" or "HH:MM:SS[...]".
fn hm(field: &'static str, value: &str) -> Result<[i64; 2], ExportError> {
    let mut parts = value.splitn(3, ':');
    let (Some(h), Some(m)) = (parts.next(), parts.next()) else {
        return Err(ExportError::InvalidField {
            field,
            value: value.to_string(),
        });
    };
    let nums = numbers(field, &format!("{}:{}", h, m.get(..2).unwrap_or(m)), ':')?;
    Ok([nums[0], nums[1]])
}

fn prayer_events(
    records: &[PrayerDayRecord],
    settings: &ExportSettings,
) -> Result<Vec<EventAttributes>, ExportError> {
    if settings.notify_before_adhan && settings.minutes_before_adhan > MAX_LEAD_MINUTES {
        return Err(ExportError::LeadMinutes(settings.minutes_before_adhan));
    }

    let mut prayers: Vec<Prayer> = Vec::new();
    for prayer in &settings.selected_prayers {
        if !prayers.contains(prayer) {
            prayers.push(*prayer);
        }
    }

    let mut events = Vec::new();
    for record in records {
        let (y, mo, d) = (
            record.date.year() as i64,
            record.date.month() as i64,
            record.date.day() as i64,
        );
        for prayer in &prayers {
            let time = record.time_of(*prayer);
            if time.is_empty() {
                continue;
            }
            let [h, mi] = hm(prayer.as_str(), time)?;
            let name = title(*prayer);

            let mut alarms = Vec::new();
            if settings.notify_at_adhan {
                alarms.push(Alarm {
                    minutes: 0,
                    before: true,
                    description: format!("حان وقت {}", name),
                });
            }
            if settings.notify_before_adhan && settings.minutes_before_adhan > 0 {
                alarms.push(Alarm {
                    minutes: settings.minutes_before_adhan,
                    before: true,
                    description: format!("{} بعد {} دقيقة", name, settings.minutes_before_adhan),
                });
            }

            events.push(EventAttributes {
                uid: format!("{}-{}@minasati", record.date, prayer.as_str()),
                start: [y, mo, d, h, mi],
                duration_minutes: PRAYER_MINUTES,
                description: format!("وقت {}", name),
                title: name,
                status: EventStatus::Confirmed,
                busy_status: BusyStatus::Free,
                alarms,
            });
        }
    }
    Ok(events)
}

fn task_events(tasks: &[TaskItem]) -> Result<Vec<EventAttributes>, ExportError> {
    let mut events = Vec::new();
    for (n, task) in tasks.iter().enumerate() {
        let Some(due) = task.due_date.as_deref().filter(|d| !d.trim().is_empty()) else {
            continue;
        };
        let (date_part, time_part) = match due.split_once('T') {
            Some((d, t)) => (d, Some(t)),
            None => (due, None),
        };
        let [y, mo, d] = ymd("task due date", date_part)?;
        // no time component means 09:00
        let [h, mi] = match time_part {
            Some(t) => hm("task due time", t)?,
            None => [9, 0],
        };

        events.push(EventAttributes {
            uid: format!("task-{}-{}@minasati", n, date_part),
            start: [y, mo, d, h, mi],
            duration_minutes: TASK_MINUTES,
            title: format!("مهمة: {}", task.title),
            description: task.description.clone().unwrap_or_default(),
            status: if task.completed {
                EventStatus::Confirmed
            } else {
                EventStatus::Tentative
            },
            busy_status: BusyStatus::Busy,
            alarms: Vec::new(),
        });
    }
    Ok(events)
}

fn appointment_events(appointments: &[Appointment]) -> Result<Vec<EventAttributes>, ExportError> {
    appointments
        .iter()
        .enumerate()
        .map(|(n, app)| {
            let [y, mo, d] = ymd("appointment date", &app.date)?;
            let [h, mi] = hm("appointment time", &app.time)?;
            Ok(EventAttributes {
                uid: format!("appointment-{}-{}@minasati", n, app.date),
                start: [y, mo, d, h, mi],
                duration_minutes: APPOINTMENT_MINUTES,
                title: format!("موعد: {}", app.title),
                description: app.location.clone().unwrap_or_default(),
                status: EventStatus::Confirmed,
                busy_status: BusyStatus::Busy,
                alarms: Vec::new(),
            })
        })
        .collect()
}

/// Everything one export needs.
#[derive(Debug, Clone, Default)]
pub struct ExportRequest<'a> {
    pub records: &'a [PrayerDayRecord],
    pub settings: ExportSettings,
    pub tasks: &'a [TaskItem],
    pub appointments: &'a [Appointment],
    /// Restrict prayer events to these dates; `None` exports every record.
    pub selected_dates: Option<&'a [NaiveDate]>,
}

impl ExportRequest<'_> {
    /// Prayer events first, then tasks, then appointments.
    pub fn build_events(&self) -> Result<Vec<EventAttributes>, ExportError> {
        let records: Vec<PrayerDayRecord> = match self.selected_dates {
            Some(dates) => self
                .records
                .iter()
                .filter(|r| dates.contains(&r.date))
                .cloned()
                .collect(),
            None => self.records.to_vec(),
        };

        let mut events = prayer_events(&records, &self.settings)?;
        events.extend(task_events(self.tasks)?);
        events.extend(appointment_events(self.appointments)?);
        Ok(events)
    }

    /// Build the whole `.ics` payload, or nothing.
    pub fn generate(&self, stamp: DateTime<Utc>) -> Result<String, ExportError> {
        let events = self.build_events()?;
        log::info!("Exporting {} calendar events", events.len());
        ics::create_events(&events, stamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prayer_times::schedule::tests::day;
    use chrono::TimeZone;

    fn two_days() -> Vec<PrayerDayRecord> {
        vec![day("2025-06-05"), day("2025-06-06")]
    }

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn all_prayers_give_five_events_per_day_at_source_times() {
        let records = two_days();
        let req = ExportRequest {
            records: &records,
            ..Default::default()
        };
        let events = req.build_events().unwrap();

        assert_eq!(events.len(), 5 * records.len());
        for (event, (record, prayer)) in events.iter().zip(
            records
                .iter()
                .flat_map(|r| Prayer::all().into_iter().map(move |p| (r, p))),
        ) {
            let expected = format!("{}T{}", record.date, record.time_of(prayer));
            let got = event.start_datetime().unwrap().format("%Y-%m-%dT%H:%M").to_string();
            assert_eq!(got, expected);
            assert_eq!(event.duration_minutes, 30);
            assert_eq!(event.title, title(prayer));
        }
    }

    #[test]
    fn fajr_and_maghrib_with_only_at_time_alarm() {
        let records = two_days();
        let req = ExportRequest {
            records: &records,
            settings: ExportSettings {
                selected_prayers: vec![Prayer::Fajr, Prayer::Maghrib],
                notify_at_adhan: true,
                notify_before_adhan: false,
                minutes_before_adhan: 15,
            },
            ..Default::default()
        };
        let events = req.build_events().unwrap();

        assert_eq!(events.len(), 4);
        for event in &events {
            assert_eq!(event.alarms.len(), 1);
            assert_eq!(event.alarms[0].minutes, 0);
            assert!(event.alarms[0].before);
        }
    }

    #[test]
    fn both_alarms_when_both_toggles_set() {
        let records = vec![day("2025-06-05")];
        let req = ExportRequest {
            records: &records,
            settings: ExportSettings {
                selected_prayers: vec![Prayer::Isha],
                ..Default::default()
            },
            ..Default::default()
        };
        let events = req.build_events().unwrap();
        let minutes: Vec<u32> = events[0].alarms.iter().map(|a| a.minutes).collect();
        assert_eq!(minutes, [0, 15]);
        assert_eq!(events[0].alarms[1].description, "صلاة العشاء بعد 15 دقيقة");
    }

    #[test]
    fn selected_dates_filter_prayer_days() {
        let records = two_days();
        let only = [NaiveDate::from_ymd_opt(2025, 6, 6).unwrap()];
        let req = ExportRequest {
            records: &records,
            selected_dates: Some(&only[..]),
            ..Default::default()
        };
        let events = req.build_events().unwrap();
        assert_eq!(events.len(), 5);
        assert!(events.iter().all(|e| e.start[2] == 6));
    }

    #[test]
    fn tasks_and_appointments_follow_prayers() {
        let records = vec![day("2025-06-05")];
        let tasks = vec![
            TaskItem {
                title: "شراء الخبز".into(),
                due_date: Some("2025-06-05".into()),
                description: None,
                completed: false,
            },
            TaskItem {
                title: "call".into(),
                due_date: Some("2025-06-06T14:30:00.000Z".into()),
                description: Some("mom".into()),
                completed: true,
            },
            TaskItem {
                title: "someday".into(),
                due_date: None,
                description: None,
                completed: false,
            },
        ];
        let appointments = vec![Appointment {
            title: "طبيب".into(),
            date: "2025-06-07".into(),
            time: "10:15".into(),
            location: Some("Clinic".into()),
        }];
        let req = ExportRequest {
            records: &records,
            settings: ExportSettings {
                selected_prayers: vec![Prayer::Fajr],
                ..Default::default()
            },
            tasks: &tasks,
            appointments: &appointments,
            selected_dates: None,
        };
        let events = req.build_events().unwrap();

        assert_eq!(events.len(), 1 + 2 + 1);
        let first_task = &events[1];
        assert_eq!(first_task.start, [2025, 6, 5, 9, 0]);
        assert_eq!(first_task.status, EventStatus::Tentative);
        assert_eq!(first_task.duration_minutes, 60);
        assert_eq!(first_task.title, "مهمة: شراء الخبز");

        assert_eq!(events[2].start, [2025, 6, 6, 14, 30]);
        assert_eq!(events[2].status, EventStatus::Confirmed);

        let appt = &events[3];
        assert_eq!(appt.start, [2025, 6, 7, 10, 15]);
        assert_eq!(appt.description, "Clinic");
        assert_eq!(appt.busy_status, BusyStatus::Busy);
    }

    #[test]
    fn malformed_input_produces_no_file() {
        let mut broken = day("2025-06-05");
        broken.asr = "3pm".into();
        let records = vec![broken];
        let req = ExportRequest {
            records: &records,
            ..Default::default()
        };
        assert!(req.generate(stamp()).is_err());

        let appointments = vec![Appointment {
            title: "x".into(),
            date: "2025-13-40".into(),
            time: "10:00".into(),
            location: None,
        }];
        let req = ExportRequest {
            appointments: &appointments,
            ..Default::default()
        };
        let err = req.generate(stamp()).unwrap_err();
        assert!(matches!(err, ExportError::InvalidStart { .. }));
    }

    #[test]
    fn generated_file_counts_events() {
        let records = two_days();
        let req = ExportRequest {
            records: &records,
            ..Default::default()
        };
        let ics = req.generate(stamp()).unwrap();
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 10);
        assert_eq!(ics.matches("BEGIN:VALARM").count(), 20);
    }

    #[test]
    fn lead_minutes_out_of_range() {
        let records = two_days();
        let req = ExportRequest {
            records: &records,
            settings: ExportSettings {
                minutes_before_adhan: 90,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(req.build_events().unwrap_err(), ExportError::LeadMinutes(90));
    }

    #[test]
    fn zero_lead_minutes_skips_the_early_alarm() {
        let records = vec![day("2025-06-05")];
        let req = ExportRequest {
            records: &records,
            settings: ExportSettings {
                selected_prayers: vec![Prayer::Fajr],
                notify_at_adhan: true,
                notify_before_adhan: true,
                minutes_before_adhan: 0,
            },
            ..Default::default()
        };
        let events = req.build_events().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].alarms.len(), 1);
        assert_eq!(events[0].alarms[0].minutes, 0);
    }

    #[test]
    fn repeated_prayer_selection_exports_once() {
        let records = vec![day("2025-06-05")];
        let req = ExportRequest {
            records: &records,
            settings: ExportSettings {
                selected_prayers: vec![Prayer::Fajr, Prayer::Fajr, Prayer::Isha],
                ..Default::default()
            },
            ..Default::default()
        };
        let uids: Vec<String> = req.build_events().unwrap().into_iter().map(|e| e.uid).collect();
        assert_eq!(uids, ["2025-06-05-fajr@minasati", "2025-06-05-isha@minasati"]);
    }
}
