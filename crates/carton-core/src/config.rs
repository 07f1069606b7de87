//! Configuration types for the carton system
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};

/// Main carton configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartonConfig {
    /// Table store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Request authority configuration
    pub api: ApiConfig,

    /// Event notification settings
    #[serde(default)]
    pub events: EventsConfig,
}

impl CartonConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.store.validate()?;
        self.api.validate()?;
        self.events.validate()?;
        Ok(())
    }
}

/// Table store configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreConfig {
    /// In-memory store (not persistent)
    #[default]
    Memory,

    /// File-based store
    File {
        /// Path to the store file
        path: String,
    },
}

impl StoreConfig {
    /// Validate the store configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            StoreConfig::File { path } if path.trim().is_empty() => {
                Err(crate::Error::config("File store path cannot be empty"))
            }
            _ => Ok(()),
        }
    }

    /// Get the store type name
    pub fn type_name(&self) -> &str {
        match self {
            StoreConfig::Memory => "memory",
            StoreConfig::File { .. } => "file",
        }
    }
}

/// Request authority (REST gateway) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL, e.g. `http://localhost:9000/v2`
    pub url: String,

    /// Account email sent with every request
    #[serde(default)]
    pub email: Option<String>,

    /// API key sent with every request
    /// ⚠️ NEVER log this value
    #[serde(default)]
    pub api_key: Option<String>,

    /// HTTP timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ApiConfig {
    /// Create a configuration for `url` with defaults
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            email: None,
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Validate the API configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.url.is_empty() {
            return Err(crate::Error::config("API url cannot be empty"));
        }
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(crate::Error::config(format!(
                "API url must use http or https scheme. Got: {}",
                self.url
            )));
        }
        if !(1..=300).contains(&self.timeout_secs) {
            return Err(crate::Error::config(format!(
                "API timeout must be between 1 and 300 seconds. Got: {}",
                self.timeout_secs
            )));
        }
        Ok(())
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new("http://localhost:9000/v2")
    }
}

/// Event notification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsConfig {
    /// Capacity of the status event channel
    ///
    /// When full, new events are dropped (the status write still succeeds).
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl EventsConfig {
    /// Validate the event settings
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }
        Ok(())
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_channel_capacity() -> usize {
    1000
}
