//! Application configuration.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Directory under the user's config dir holding `config.toml`.
pub const CONFIG_DIR: &str = "tidewatch";
/// Prefix of environment overrides, e.g. `TIDEWATCH_LEAD_BIAS`.
pub const ENV_PREFIX: &str = "TIDEWATCH";

const DEFAULT_CONFIG: &str = r#"# tidewatch configuration

# ACT network log file, or a directory containing Network_*.log files.
# log_path = "C:/Users/me/AppData/Roaming/Advanced Combat Tracker/FFXIVLogs"

# External catalog JSON. The built-in catalog is used when unset.
# catalog_path = "catalog.json"

# Zone ids treated as ocean fishing.
ocean_zone_ids = [900]

# Departure the rotation is counted from, and its index in the schedule.
anchor = "2021-11-25T00:00:00Z"
anchor_offset = 44

# Seconds the bite window highlight is shifted earlier.
lead_bias = 0.07

# Refresh cadence while a cast is timed, and while idle.
frame_interval_ms = 16
idle_interval_ms = 250
"#;

/// Runtime settings for the tracker and its shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Network log file or directory to follow.
    #[serde(default)]
    pub log_path: Option<PathBuf>,
    /// Catalog JSON overriding the embedded one.
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
    /// Zone identifiers that count as the ocean fishing activity.
    #[serde(default = "default_zone_ids")]
    pub ocean_zone_ids: Vec<u32>,
    /// Reference departure for the voyage rotation.
    #[serde(default = "default_anchor")]
    pub anchor: DateTime<Utc>,
    /// Rotation index of the voyage departing at `anchor`.
    #[serde(default = "default_anchor_offset")]
    pub anchor_offset: i64,
    /// Latency compensation for the bite window, in seconds.
    #[serde(default = "default_lead_bias")]
    pub lead_bias: f64,
    /// Frame cadence while a cast is being timed.
    #[serde(default = "default_frame_interval")]
    pub frame_interval_ms: u64,
    /// Redraw cadence when nothing is animating.
    #[serde(default = "default_idle_interval")]
    pub idle_interval_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_path: None,
            catalog_path: None,
            ocean_zone_ids: default_zone_ids(),
            anchor: default_anchor(),
            anchor_offset: default_anchor_offset(),
            lead_bias: default_lead_bias(),
            frame_interval_ms: default_frame_interval(),
            idle_interval_ms: default_idle_interval(),
        }
    }
}

impl AppConfig {
    /// Load from the default config file and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    /// Load from `path` (which may be missing) and the environment.
    pub fn load_from(path: &Path) -> Result<Self> {
        let settings = Config::builder()
            .add_source(
                File::from(path.to_path_buf())
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("ocean_zone_ids"),
            )
            .build()
            .with_context(|| format!("failed to read config {}", path.display()))?;

        let config: AppConfig = settings
            .try_deserialize()
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }
}

/// Location of `config.toml` under the user's config directory.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join("config.toml")
}

/// Write the commented default config if none exists yet.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = config_path();
    ensure_default_config_at(&path)?;
    Ok(path)
}

/// Write the commented default config to `path` unless it already exists.
pub fn ensure_default_config_at(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "Wrote default config");
    Ok(())
}

fn default_zone_ids() -> Vec<u32> {
    vec![900]
}

fn default_anchor() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 11, 25, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

fn default_anchor_offset() -> i64 {
    44
}

fn default_lead_bias() -> f64 {
    0.07
}

fn default_frame_interval() -> u64 {
    16
}

fn default_idle_interval() -> u64 {
    250
}
