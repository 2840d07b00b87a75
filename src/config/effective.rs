//! Effective configuration with provenance
//!
//! Captures the merged configuration, the files that contributed to it
//! (with SHA-256 digests) and which keys were redacted for display.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use super::defaults::BuiltinDefaults;
use super::merge::merge_layers;

/// Schema identifier
pub const SCHEMA_ID: &str = "mobile-lane/effective_config@1";

/// Repo-local config file name, looked up in the working directory
pub const REPO_CONFIG_FILE: &str = ".mobile-lane.toml";

/// Origin of a configuration source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Builtin,
    User,
    Repo,
    Cli,
}

/// A contributing config source with provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSource {
    pub origin: ConfigOrigin,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 of the raw file bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Merged configuration.
///
/// `config` is the display copy with secrets redacted; lookups go through
/// the unredacted merge.
#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    pub schema_id: String,
    pub created_at: DateTime<Utc>,
    pub config: Value,
    pub sources: Vec<ConfigSource>,
    pub redactions: Vec<String>,
    #[serde(skip)]
    raw: Value,
}

/// Keys that contain secrets and should be redacted
const SECRET_KEYS: &[&str] = &["password", "token", "secret", "api_key", "credential"];

/// Default location of the per-user config file:
/// `~/.config/mobile-lane/config.toml` on every platform.
pub fn default_user_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("mobile-lane").join("config.toml"))
}

impl EffectiveConfig {
    /// Build effective config from layers. Missing files are skipped.
    pub fn build(
        user_config_path: Option<&Path>,
        repo_config_path: Option<&Path>,
        cli_overrides: Option<Value>,
    ) -> Result<Self, ConfigError> {
        let mut layers = vec![BuiltinDefaults::default().to_value()];
        let mut sources = vec![ConfigSource {
            origin: ConfigOrigin::Builtin,
            path: None,
            digest: None,
        }];

        for (origin, path) in [
            (ConfigOrigin::User, user_config_path),
            (ConfigOrigin::Repo, repo_config_path),
        ] {
            let Some(path) = path else { continue };
            if !path.exists() {
                continue;
            }
            let (value, digest) = Self::load_toml_file(path)?;
            layers.push(value);
            sources.push(ConfigSource {
                origin,
                path: Some(path.to_string_lossy().to_string()),
                digest: Some(digest),
            });
        }

        if let Some(cli) = cli_overrides {
            layers.push(cli);
            sources.push(ConfigSource {
                origin: ConfigOrigin::Cli,
                path: None,
                digest: None,
            });
        }

        let raw = merge_layers(layers);
        Self::validate_config(&raw)?;

        let mut config = raw.clone();
        let mut redactions = Vec::new();
        Self::redact_recursive(&mut config, String::new(), &mut redactions);

        Ok(Self {
            schema_id: SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            config,
            sources,
            redactions,
            raw,
        })
    }

    /// Load and parse a TOML file, returning the value and digest
    fn load_toml_file(path: &Path) -> Result<(Value, String), ConfigError> {
        let bytes = fs::read(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;

        let digest = hex::encode(Sha256::digest(&bytes));

        let contents = String::from_utf8(bytes).map_err(|e| {
            ConfigError::ParseError(format!("{}: invalid UTF-8: {}", path.display(), e))
        })?;

        // toml::Value serializes into the equivalent JSON tree.
        let table: toml::Table = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;
        let value = serde_json::to_value(table)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;

        Ok((value, digest))
    }

    fn redact_recursive(value: &mut Value, path: String, redactions: &mut Vec<String>) {
        match value {
            Value::Object(map) => {
                for (key, val) in map.iter_mut() {
                    let current_path = if path.is_empty() {
                        key.clone()
                    } else {
                        format!("{}.{}", path, key)
                    };

                    let key_lower = key.to_lowercase();
                    let is_secret = SECRET_KEYS.iter().any(|s| key_lower.contains(s));

                    if is_secret && !val.is_object() && !val.is_array() {
                        *val = Value::String("[REDACTED]".to_string());
                        redactions.push(current_path);
                    } else {
                        Self::redact_recursive(val, current_path, redactions);
                    }
                }
            }
            Value::Array(arr) => {
                for (i, val) in arr.iter_mut().enumerate() {
                    Self::redact_recursive(val, format!("{}[{}]", path, i), redactions);
                }
            }
            _ => {}
        }
    }

    fn validate_config(config: &Value) -> Result<(), ConfigError> {
        let get = |path: &str| {
            path.split('.')
                .try_fold(config, |current, part| current.get(part))
        };

        match get("device_farm.region").map(|v| v.as_str()) {
            Some(Some(region)) if !region.trim().is_empty() => {}
            _ => {
                return Err(ConfigError::ValidationError(
                    "device_farm.region must be a non-empty string".to_string(),
                ))
            }
        }

        match get("device_farm.poll_interval_seconds").map(|v| v.as_u64()) {
            Some(Some(interval)) if interval > 0 && interval <= 3600 => {}
            _ => {
                return Err(ConfigError::ValidationError(
                    "device_farm.poll_interval_seconds must be in (0, 3600]".to_string(),
                ))
            }
        }

        if let Some(value) = get("device_farm.max_wait_seconds") {
            if value.as_u64().is_none() {
                return Err(ConfigError::ValidationError(
                    "device_farm.max_wait_seconds must be a non-negative integer".to_string(),
                ));
            }
        }

        if let Some(value) = get("http.timeout_seconds") {
            match value.as_u64() {
                Some(timeout) if timeout <= 3600 => {}
                _ => {
                    return Err(ConfigError::ValidationError(
                        "http.timeout_seconds must be in [0, 3600]".to_string(),
                    ))
                }
            }
        }

        match get("translations.tool").map(|v| v.as_str()) {
            Some(Some(tool)) if !tool.trim().is_empty() => {}
            _ => {
                return Err(ConfigError::ValidationError(
                    "translations.tool must be a non-empty string".to_string(),
                ))
            }
        }

        Ok(())
    }

    /// Serialize the redacted view to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Get an unredacted config value by dot-separated path
    pub fn get(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .try_fold(&self.raw, |current, part| current.get(part))
    }

    pub fn get_u64(&self, path: &str) -> Option<u64> {
        self.get(path).and_then(|v| v.as_u64())
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(|v| v.as_str())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl ConfigError {
    pub fn exit_code(&self) -> i32 {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_user_config_under_dot_config() {
        let path = default_user_config_path().unwrap();
        assert!(path.ends_with(".config/mobile-lane/config.toml"));
        assert!(path.starts_with(dirs::home_dir().unwrap()));
    }

    #[test]
    fn test_build_with_defaults_only() {
        let config = EffectiveConfig::build(None, None, None).unwrap();

        assert_eq!(config.schema_id, SCHEMA_ID);
        assert_eq!(config.get_str("device_farm.region"), Some("us-west-2"));
        assert_eq!(config.get_u64("device_farm.poll_interval_seconds"), Some(10));
        assert_eq!(config.sources.len(), 1);
        assert_eq!(config.sources[0].origin, ConfigOrigin::Builtin);
    }

    #[test]
    fn test_cli_override_wins() {
        let cli = serde_json::json!({"device_farm": {"region": "us-east-1"}});
        let config = EffectiveConfig::build(None, None, Some(cli)).unwrap();
        assert_eq!(config.get_str("device_farm.region"), Some("us-east-1"));
        assert_eq!(config.sources.last().unwrap().origin, ConfigOrigin::Cli);
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let cli = serde_json::json!({"device_farm": {"poll_interval_seconds": 0}});
        let err = EffectiveConfig::build(None, None, Some(cli)).unwrap_err();
        assert!(err.to_string().contains("poll_interval_seconds"));
    }

    #[test]
    fn test_http_timeout_bound() {
        let cli = serde_json::json!({"http": {"timeout_seconds": 7200}});
        let err = EffectiveConfig::build(None, None, Some(cli)).unwrap_err();
        assert!(err.to_string().contains("http.timeout_seconds"));
    }

    #[test]
    fn test_repo_file_layer_and_digest() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "[device_farm]").unwrap();
        writeln!(temp, "poll_interval_seconds = 30").unwrap();
        writeln!(temp, "max_wait_seconds = 3600").unwrap();

        let config = EffectiveConfig::build(None, Some(temp.path()), None).unwrap();

        assert_eq!(config.get_u64("device_farm.poll_interval_seconds"), Some(30));
        assert_eq!(config.get_u64("device_farm.max_wait_seconds"), Some(3600));
        assert_eq!(config.get_str("device_farm.region"), Some("us-west-2"));

        let repo = &config.sources[1];
        assert_eq!(repo.origin, ConfigOrigin::Repo);
        assert_eq!(repo.digest.as_ref().map(|d| d.len()), Some(64));
    }

    #[test]
    fn test_missing_file_skipped() {
        let config =
            EffectiveConfig::build(Some(Path::new("/nonexistent/config.toml")), None, None)
                .unwrap();
        assert_eq!(config.sources.len(), 1);
    }

    #[test]
    fn test_invalid_toml_reported() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "[device_farm").unwrap();
        let err = EffectiveConfig::build(Some(temp.path()), None, None).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_secrets_redacted_for_display_only() {
        let cli = serde_json::json!({"crittercism": {"oauth_token": "abc123", "app_id": "app"}});
        let config = EffectiveConfig::build(None, None, Some(cli)).unwrap();

        assert_eq!(config.config["crittercism"]["oauth_token"], "[REDACTED]");
        assert_eq!(config.config["crittercism"]["app_id"], "app");
        assert_eq!(config.redactions, vec!["crittercism.oauth_token".to_string()]);
        assert_eq!(config.get_str("crittercism.oauth_token"), Some("abc123"));
        assert!(!config.to_json().unwrap().contains("abc123"));
    }
}
