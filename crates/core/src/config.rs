use crate::error::ConfigError;
use crate::filter::LocationCatalog;
use crate::models::{SearchType, RESULTS_PER_PAGE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/graphql";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    pub endpoint: String,
    pub page_size: usize,
    pub search_type: SearchType,
    pub request_timeout_secs: Option<u64>,
    pub skip: bool,
    /// Display labels of the locations users can filter on.
    pub locations: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            page_size: RESULTS_PER_PAGE,
            search_type: SearchType::All,
            request_timeout_secs: Some(30),
            skip: false,
            locations: Vec::new(),
        }
    }
}

impl SearchConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be at least 1".to_string()));
        }
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("endpoint is empty".to_string()));
        }
        if self.request_timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be positive when set".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn location_catalog(&self) -> LocationCatalog {
        LocationCatalog::from_labels(self.locations.iter().cloned())
    }
}
