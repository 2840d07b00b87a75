//! Tracing subscriber setup for the binary.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directives
pub const LOG_ENV: &str = "MOBILE_LANE_LOG";

/// Filter from `MOBILE_LANE_LOG`, else `info` (`debug` when verbose).
pub fn env_filter(verbose: bool) -> EnvFilter {
    let fallback = if verbose { "debug" } else { "info" };
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Install the stderr fmt subscriber. Safe to call more than once.
pub fn init(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    #[serial]
    fn test_fallback_levels() {
        std::env::remove_var(LOG_ENV);
        assert_eq!(env_filter(false).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(env_filter(true).max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    #[serial]
    fn test_env_overrides_verbose() {
        std::env::set_var(LOG_ENV, "warn");
        assert_eq!(env_filter(true).max_level_hint(), Some(LevelFilter::WARN));
        std::env::remove_var(LOG_ENV);
    }
}
