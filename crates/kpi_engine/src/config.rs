use std::fs;
use std::path::Path;
use std::path::PathBuf;

use chrono::Weekday;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError
{
    #[error("could not read config file {path}: {source}")]
    Io
    {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Knobs of the indicator computation. Every field is optional in the JSON
/// file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KpiConfig
{
    /// First day of the `this_week` window.
    pub week_starts_on: Weekday,
    pub top_equipment_limit: usize,
    /// Bucket for delivered orders with no assigned technician.
    pub unknown_technician_label: String,
    /// Bucket for corrective history rows with no equipment name.
    pub unnamed_equipment_label: String,
}

impl Default for KpiConfig
{
    fn default() -> Self
    {
        Self {
            week_starts_on: Weekday::Sun,
            top_equipment_limit: 5,
            unknown_technician_label: "unknown".to_string(),
            unnamed_equipment_label: "S/N".to_string(),
        }
    }
}

impl KpiConfig
{
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError>
    {
        let config: KpiConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError>
    {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError>
    {
        if self.top_equipment_limit == 0 {
            return Err(ConfigError::Invalid("top_equipment_limit must be at least 1".to_string()));
        }
        if self.unknown_technician_label.is_empty() || self.unnamed_equipment_label.is_empty() {
            return Err(ConfigError::Invalid("bucket labels cannot be empty".to_string()));
        }
        Ok(())
    }
}
