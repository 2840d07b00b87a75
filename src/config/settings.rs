//! Typed views over the effective configuration, one per action.

use std::time::Duration;

use super::defaults::{BuiltinDefaults, DEFAULT_POLL_INTERVAL_SECONDS};
use super::effective::EffectiveConfig;

fn optional_seconds(value: Option<u64>) -> Option<Duration> {
    value.filter(|&s| s > 0).map(Duration::from_secs)
}

/// Settings for the Device Farm client and its polling loops.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceFarmSettings {
    pub region: String,
    /// Overrides the regional endpoint (for proxies and tests).
    pub endpoint: Option<String>,
    pub poll_interval: Duration,
    /// `None` waits without bound.
    pub max_wait: Option<Duration>,
    pub http_timeout: Option<Duration>,
}

impl Default for DeviceFarmSettings {
    fn default() -> Self {
        let defaults = BuiltinDefaults::default();
        Self {
            region: defaults.region,
            endpoint: None,
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECONDS),
            max_wait: None,
            http_timeout: None,
        }
    }
}

impl DeviceFarmSettings {
    pub fn from_config(config: &EffectiveConfig) -> Self {
        let defaults = Self::default();
        Self {
            region: config
                .get_str("device_farm.region")
                .map(str::to_string)
                .unwrap_or(defaults.region),
            endpoint: config.get_str("device_farm.endpoint").map(str::to_string),
            poll_interval: config
                .get_u64("device_farm.poll_interval_seconds")
                .map(Duration::from_secs)
                .unwrap_or(defaults.poll_interval),
            max_wait: optional_seconds(config.get_u64("device_farm.max_wait_seconds")),
            http_timeout: optional_seconds(config.get_u64("http.timeout_seconds")),
        }
    }

    /// Endpoint URL for the configured region.
    pub fn endpoint_url(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| format!("https://devicefarm.{}.amazonaws.com/", self.region))
    }
}

/// Settings for the Crittercism symbol upload.
#[derive(Debug, Clone, PartialEq)]
pub struct CrittercismSettings {
    pub files_url: String,
    pub app_url: String,
    pub http_timeout: Option<Duration>,
    /// Fallbacks for values not given on the command line.
    pub oauth_token: Option<String>,
    pub app_id: Option<String>,
}

impl CrittercismSettings {
    pub fn from_config(config: &EffectiveConfig) -> Self {
        let defaults = BuiltinDefaults::default();
        Self {
            files_url: config
                .get_str("crittercism.files_url")
                .map(str::to_string)
                .unwrap_or(defaults.crittercism_files_url),
            app_url: config
                .get_str("crittercism.app_url")
                .map(str::to_string)
                .unwrap_or(defaults.crittercism_app_url),
            http_timeout: optional_seconds(config.get_u64("http.timeout_seconds")),
            oauth_token: config.get_str("crittercism.oauth_token").map(str::to_string),
            app_id: config.get_str("crittercism.app_id").map(str::to_string),
        }
    }
}

/// Settings for the translations import.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationsSettings {
    pub tool: String,
}

impl TranslationsSettings {
    pub fn from_config(config: &EffectiveConfig) -> Self {
        Self {
            tool: config
                .get_str("translations.tool")
                .map(str::to_string)
                .unwrap_or_else(|| BuiltinDefaults::default().translations_tool),
        }
    }
}
