//! Configuration
//!
//! Layers, lowest precedence first:
//! 1. Built-in defaults
//! 2. User config (~/.config/mobile-lane/config.toml)
//! 3. Repo config (.mobile-lane.toml or --config)
//! 4. CLI flags and their environment variables

mod defaults;
mod effective;
mod merge;
mod settings;

pub use defaults::{BuiltinDefaults, DEFAULT_POLL_INTERVAL_SECONDS};
pub use effective::{
    default_user_config_path, ConfigError, ConfigOrigin, ConfigSource, EffectiveConfig,
    REPO_CONFIG_FILE,
};
pub use merge::{deep_merge, merge_layers};
pub use settings::{CrittercismSettings, DeviceFarmSettings, TranslationsSettings};
