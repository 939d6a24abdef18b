use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_EXTRACTOR_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Where the spreadsheet script lives.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig
{
    pub endpoint: String,
    #[serde(default = "default_store_timeout_secs")]
    pub timeout_secs: u64,
}

impl StoreConfig
{
    pub fn new(endpoint: impl Into<String>) -> Self
    {
        Self {
            endpoint: endpoint.into(),
            timeout_secs: default_store_timeout_secs(),
        }
    }

    pub fn timeout(&self) -> Duration
    {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractorConfig
{
    #[serde(default = "default_extractor_endpoint")]
    pub endpoint: String,
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_extractor_timeout_secs")]
    pub timeout_secs: u64,
}

impl ExtractorConfig
{
    pub fn new(api_key: impl Into<String>) -> Self
    {
        Self {
            endpoint: default_extractor_endpoint(),
            api_key: api_key.into(),
            model: default_model(),
            timeout_secs: default_extractor_timeout_secs(),
        }
    }

    pub fn timeout(&self) -> Duration
    {
        Duration::from_secs(self.timeout_secs)
    }
}

// The api key stays out of logs.
impl std::fmt::Debug for ExtractorConfig
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("ExtractorConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"***")
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_store_timeout_secs() -> u64
{
    15
}

fn default_extractor_timeout_secs() -> u64
{
    60
}

fn default_model() -> String
{
    DEFAULT_MODEL.to_string()
}

fn default_extractor_endpoint() -> String
{
    DEFAULT_EXTRACTOR_ENDPOINT.to_string()
}
