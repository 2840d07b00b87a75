//! Built-in defaults (layer 1)

use serde::{Deserialize, Serialize};

/// Default Device Farm status poll interval.
pub const DEFAULT_POLL_INTERVAL_SECONDS: u64 = 10;

/// Built-in default configuration values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Device Farm region (default: us-west-2)
    pub region: String,

    /// Seconds between upload/run status polls (default: 10)
    pub poll_interval_seconds: u64,

    /// Upper bound on any single wait; 0 waits forever (default: 0)
    pub max_wait_seconds: u64,

    /// Per-request HTTP timeout; 0 disables it (default: 0)
    pub http_timeout_seconds: u64,

    pub crittercism_files_url: String,
    pub crittercism_app_url: String,

    /// Executable invoked for `<tool> import` (default: "translations")
    pub translations_tool: String,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            region: devicefarm_protocol::DEFAULT_REGION.to_string(),
            poll_interval_seconds: DEFAULT_POLL_INTERVAL_SECONDS,
            max_wait_seconds: 0,
            http_timeout_seconds: 0,
            crittercism_files_url: "https://files.crittercism.com/api/v1".to_string(),
            crittercism_app_url: "https://app.crittercism.com/v1.0".to_string(),
            translations_tool: "translations".to_string(),
        }
    }
}

impl BuiltinDefaults {
    /// Convert to JSON Value for merging
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "device_farm": {
                "region": self.region,
                "poll_interval_seconds": self.poll_interval_seconds,
                "max_wait_seconds": self.max_wait_seconds
            },
            "http": {
                "timeout_seconds": self.http_timeout_seconds
            },
            "crittercism": {
                "files_url": self.crittercism_files_url,
                "app_url": self.crittercism_app_url
            },
            "translations": {
                "tool": self.translations_tool
            }
        })
    }
}
