use serde::{Deserialize, Serialize};

use super::Prayer;

fn default_true() -> bool {
    true
}
fn default_minutes_before() -> u32 {
    15
}
fn default_selected() -> Vec<Prayer> {
    Prayer::all()
}

/// Which prayers become calendar events, and which alarms they carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSettings {
    #[serde(default = "default_selected")]
    pub selected_prayers: Vec<Prayer>,
    #[serde(default = "default_true")]
    pub notify_at_adhan: bool,
    #[serde(default = "default_true")]
    pub notify_before_adhan: bool,
    /// Lead time for the early alarm, at most 60. Zero skips that alarm.
    #[serde(default = "default_minutes_before")]
    pub minutes_before_adhan: u32,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            selected_prayers: default_selected(),
            notify_at_adhan: true,
            notify_before_adhan: true,
            minutes_before_adhan: default_minutes_before(),
        }
    }
}

/// Task record owned by the task manager; only read here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskItem {
    pub title: String,
    /// `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM[...]`
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

/// Appointment record owned by the planner; only read here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub title: String,
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub location: Option<String>,
}
