use std::sync::OnceLock;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::module::catalog::ColumnMap;

pub const CONFIG_ENV: &str = "SATGLOBE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default)]
    pub catalog: CatalogSettings,

    #[serde(default)]
    pub tracker: TrackerSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// File path or http(s) URL of the CSV catalog
    #[serde(default = "default_catalog_source")]
    pub source: String,

    /// Optional three-line element file/URL merged into the catalog
    #[serde(default)]
    pub element_source: Option<String>,

    /// 0 disables reloading
    #[serde(default = "default_reload_interval_minutes")]
    pub reload_interval_minutes: u64,

    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    #[serde(default)]
    pub columns: ColumnMap,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerSettings {
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,

    /// Print each frame as one JSON line on stdout
    #[serde(default)]
    pub emit_frames: bool,

    #[serde(default)]
    pub max_element_age_days: Option<f64>,

    /// Compute a single frame at this instant and exit
    #[serde(default)]
    pub fixed_instant: Option<DateTime<Utc>>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_catalog_source() -> String {
    "data/satellites_with_tle.csv".to_string()
}

fn default_reload_interval_minutes() -> u64 {
    60
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_frame_interval_ms() -> u64 {
    1000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_dir: default_log_dir(),
            catalog: CatalogSettings::default(),
            tracker: TrackerSettings::default(),
        }
    }
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            source: default_catalog_source(),
            element_source: None,
            reload_interval_minutes: default_reload_interval_minutes(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            columns: ColumnMap::default(),
        }
    }
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            frame_interval_ms: default_frame_interval_ms(),
            emit_frames: false,
            max_element_age_days: None,
            fixed_instant: None,
        }
    }
}

impl AppConfig {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path))?;
        Self::from_toml_str(&content).with_context(|| format!("Failed to parse config file {}", path))
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(content)?;
        Ok(config)
    }
}

pub static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Load the config file once. A missing file falls back to defaults;
/// a file that fails to parse is an error.
pub fn read_config() -> anyhow::Result<&'static AppConfig> {
    if let Some(config) = CONFIG.get() {
        return Ok(config);
    }

    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    let config = if std::path::Path::new(&path).exists() {
        AppConfig::from_file(&path)?
    } else {
        eprintln!("Config file {} not found, using defaults", path);
        AppConfig::default()
    };

    Ok(CONFIG.get_or_init(|| config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Write;

    #[test]
    fn test_defaults_from_empty_file() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_dir, "logs");
        assert_eq!(config.catalog.reload_interval_minutes, 60);
        assert_eq!(config.catalog.columns.line1, "TLE_LINE1");
        assert_eq!(config.tracker.frame_interval_ms, 1000);
        assert!(!config.tracker.emit_frames);
        assert!(config.tracker.fixed_instant.is_none());
    }

    #[test]
    fn test_full_config() {
        let config = AppConfig::from_toml_str(
            r#"
            log_level = "debug"

            [catalog]
            source = "https://example.com/satellites.csv"
            element_source = "data/active.tle"
            reload_interval_minutes = 10

            [catalog.columns]
            short_name = "NAME"

            [tracker]
            frame_interval_ms = 250
            emit_frames = true
            max_element_age_days = 14.0
            fixed_instant = "2000-06-28T00:00:00Z"
            "#,
        )
        .unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.catalog.element_source.as_deref(), Some("data/active.tle"));
        assert_eq!(config.catalog.columns.short_name, "NAME");
        // untouched columns keep their defaults
        assert_eq!(config.catalog.columns.object_name, "OBJECT_NAME");
        assert_eq!(config.tracker.max_element_age_days, Some(14.0));
        assert_eq!(
            config.tracker.fixed_instant,
            Some(Utc.with_ymd_and_hms(2000, 6, 28, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "log_level = \"warn\"\n[tracker]\nemit_frames = true").unwrap();

        let config = AppConfig::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.log_level, "warn");
        assert!(config.tracker.emit_frames);

        assert!(AppConfig::from_file("/nonexistent/satglobe.toml").is_err());
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(AppConfig::from_toml_str("[tracker]\nframe_interval_ms = \"fast\"").is_err());
    }
}
