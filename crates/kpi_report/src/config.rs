use std::fs;
use std::path::Path;

use kpi_engine::config::ConfigError;
use kpi_engine::config::KpiConfig;
use record_store::config::ExtractorConfig;
use record_store::config::StoreConfig;
use serde::Deserialize;

/// Environment variable consulted when the config file has no extractor
/// section.
pub const API_KEY_VARIABLE: &str = "GEMINI_API_KEY";

/// The `--config` file. Every section is optional.
///
/// ```json
/// {
///     "kpi": { "week_starts_on": "Monday" },
///     "store": { "endpoint": "https://script.google.com/macros/s/.../exec" },
///     "extractor": { "api_key": "...", "model": "gemini-2.5-flash" }
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReportConfig
{
    pub kpi: KpiConfig,
    pub store: Option<StoreConfig>,
    pub extractor: Option<ExtractorConfig>,
}

impl ReportConfig
{
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError>
    {
        let config: ReportConfig = serde_json::from_str(json)?;
        config.kpi.validate()?;
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

    /// `--endpoint` wins over the file.
    pub fn store_config(&self, endpoint: Option<&str>) -> Option<StoreConfig>
    {
        match (endpoint, &self.store) {
            (Some(endpoint), Some(store)) => Some(StoreConfig {
                endpoint: endpoint.to_string(),
                ..store.clone()
            }),
            (Some(endpoint), None) => Some(StoreConfig::new(endpoint)),
            (None, store) => store.clone(),
        }
    }

    pub fn extractor_config(&self, api_key_from_env: Option<String>) -> Option<ExtractorConfig>
    {
        self.extractor
            .clone()
            .or_else(|| api_key_from_env.filter(|key| !key.trim().is_empty()).map(ExtractorConfig::new))
    }
}
