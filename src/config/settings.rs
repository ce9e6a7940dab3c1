use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::export::MAX_LEAD_MINUTES;
use crate::models::ExportSettings;
use crate::prayer_times::aladhan::DEFAULT_BASE_URL;

fn default_location_name() -> String {
    "Buenos Aires".to_string()
}
fn default_latitude() -> f64 {
    -34.6037
}
fn default_longitude() -> f64 {
    -58.3816
}
fn default_timezone_offset() -> i32 {
    -180
}
fn default_madhab() -> String {
    "Shafi".to_string()
}
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_file_name() -> String {
    "prayer-times.ics".to_string()
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default = "default_location_name")]
    pub name: String,
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
    #[serde(default = "default_timezone_offset")]
    pub timezone_offset: i32, // minutes from UTC, offline calculator only
    #[serde(default = "default_madhab")]
    pub madhab: String,
    /// Days to add/subtract from the Hijri date for local moon sighting.
    #[serde(default)]
    pub hijri_offset: i32,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            name: default_location_name(),
            latitude: default_latitude(),
            longitude: default_longitude(),
            timezone_offset: default_timezone_offset(),
            madhab: default_madhab(),
            hijri_offset: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Fill in the current month on startup.
    #[serde(default = "default_true")]
    pub auto_fetch: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { auto_fetch: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_file_name")]
    pub file_name: String,
    #[serde(flatten)]
    pub settings: ExportSettings,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: default_file_name(),
            settings: ExportSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "minasati")
            .context("Could not determine project directories")
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.data_dir().to_path_buf())
    }

    pub fn db_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("minasati.db"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Reading {:?}", path))?;
        let config: AppConfig = toml::from_str(&content).context("Parsing config.toml")?;
        config.validate()?;
        Ok(config)
    }

    pub fn ensure_data_dir() -> Result<PathBuf> {
        let dir = Self::data_dir()?;
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    fn validate(&self) -> Result<()> {
        let minutes = self.export.settings.minutes_before_adhan;
        if minutes > MAX_LEAD_MINUTES {
            bail!("export.minutes_before_adhan must be at most 60, got {}", minutes);
        }
        if !(-90.0..=90.0).contains(&self.location.latitude)
            || !(-180.0..=180.0).contains(&self.location.longitude)
        {
            bail!(
                "location coordinates out of range: {}, {}",
                self.location.latitude,
                self.location.longitude
            );
        }
        Ok(())
    }
}
