pub mod export;
pub mod method;
pub mod prayer;

pub use export::{Appointment, ExportSettings, TaskItem};
pub use method::CalculationMethod;
pub use prayer::{ManualEntry, Prayer, PrayerDayRecord, ValidationError};
