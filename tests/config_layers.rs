//! Configuration layering tests

use std::time::Duration;

use mobile_lane::config::{ConfigOrigin, DeviceFarmSettings, EffectiveConfig};
use mobile_lane::poll::PollPolicy;
use serde_json::json;
use tempfile::TempDir;

#[test]
fn test_user_repo_cli_precedence() {
    let dir = TempDir::new().unwrap();
    let user = dir.path().join("user.toml");
    let repo = dir.path().join(".mobile-lane.toml");
    std::fs::write(
        &user,
        "[device_farm]\nregion = \"eu-west-1\"\npoll_interval_seconds = 30\n\n[crittercism]\noauth_token = \"user-token\"\n",
    )
    .unwrap();
    std::fs::write(&repo, "[device_farm]\npoll_interval_seconds = 5\nmax_wait_seconds = 900\n").unwrap();

    let config = EffectiveConfig::build(
        Some(&user),
        Some(&repo),
        Some(json!({"device_farm": {"region": "us-west-2"}})),
    )
    .unwrap();

    let origins: Vec<ConfigOrigin> = config.sources.iter().map(|s| s.origin.clone()).collect();
    assert_eq!(
        origins,
        vec![ConfigOrigin::Builtin, ConfigOrigin::User, ConfigOrigin::Repo, ConfigOrigin::Cli]
    );
    assert!(config.sources[1].digest.as_ref().unwrap().len() == 64);

    let settings = DeviceFarmSettings::from_config(&config);
    assert_eq!(settings.region, "us-west-2");
    assert_eq!(settings.poll_interval, Duration::from_secs(5));
    assert_eq!(settings.max_wait, Some(Duration::from_secs(900)));

    let policy = PollPolicy::from_settings(&settings);
    assert_eq!(policy.interval, Duration::from_secs(5));

    let printed = config.to_json().unwrap();
    assert!(!printed.contains("user-token"));
    assert!(config.redactions.contains(&"crittercism.oauth_token".to_string()));
    assert_eq!(config.get_str("crittercism.oauth_token"), Some("user-token"));
}

#[test]
fn test_invalid_repo_value_rejected() {
    let dir = TempDir::new().unwrap();
    let repo = dir.path().join(".mobile-lane.toml");
    std::fs::write(&repo, "[device_farm]\npoll_interval_seconds = 7200\n").unwrap();

    let err = EffectiveConfig::build(None, Some(&repo), None).unwrap_err();
    assert!(err.to_string().contains("poll_interval_seconds"));
    assert_eq!(err.exit_code(), 1);
}
