// Config loading, validation, and account resolution tests

use std::collections::HashMap;
use zonewatch::config::{AppConfig, ConfigSource, SourceError, resolve_accounts_from};

const VALID_CONFIG: &str = r#"
[server]
port = 8081
host = "0.0.0.0"

[collector]
interval_secs = 3600
request_timeout_secs = 20
daily_window_days = 45
hourly_window_days = 3
api_url = "https://api.cloudflare.com/client/v4/graphql"
zones_file = "zones.toml"

[publishing]
output_path = "data/analytics.json"

[monitoring]
stats_log_interval_secs = 600
"#;

#[test]
fn test_config_loads_from_str() {
    let config = AppConfig::load_from_str(VALID_CONFIG).expect("load_from_str");
    assert_eq!(config.server.port, 8081);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.collector.interval_secs, 3600);
    assert_eq!(config.collector.request_timeout_secs, 20);
    assert_eq!(config.collector.daily_window_days, 45);
    assert_eq!(config.publishing.output_path, "data/analytics.json");
    assert_eq!(config.monitoring.stats_log_interval_secs, 600);
}

#[test]
fn test_config_defaults_when_empty() {
    let config = AppConfig::load_from_str("").expect("defaults");
    assert_eq!(config.server.port, 4000);
    assert_eq!(config.collector.interval_secs, 7200);
    assert_eq!(config.collector.request_timeout_secs, 30);
    assert_eq!(config.collector.hourly_window_days, 3);
    assert_eq!(config.collector.zones_file, "zones.toml");
    assert_eq!(config.publishing.output_path, "data/analytics.json");
}

#[test]
fn test_config_validation_rejects_invalid_port() {
    let bad = VALID_CONFIG.replace("port = 8081", "port = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("server.port"));
}

#[test]
fn test_config_validation_rejects_interval_zero() {
    let bad = VALID_CONFIG.replace("interval_secs = 3600", "interval_secs = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("interval_secs"));
}

#[test]
fn test_config_validation_rejects_timeout_below_range() {
    let bad = VALID_CONFIG.replace("request_timeout_secs = 20", "request_timeout_secs = 5");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("request_timeout_secs"));
}

#[test]
fn test_config_validation_rejects_timeout_above_range() {
    let bad = VALID_CONFIG.replace("request_timeout_secs = 20", "request_timeout_secs = 60");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("request_timeout_secs"));
}

#[test]
fn test_config_validation_rejects_daily_window_zero() {
    let bad = VALID_CONFIG.replace("daily_window_days = 45", "daily_window_days = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("daily_window_days"));
}

#[test]
fn test_config_validation_rejects_empty_output_path() {
    let bad = VALID_CONFIG.replace(
        "output_path = \"data/analytics.json\"",
        "output_path = \"\"",
    );
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("output_path"));
}

#[test]
fn test_config_validation_rejects_stats_log_interval_zero() {
    let bad = VALID_CONFIG.replace(
        "stats_log_interval_secs = 600",
        "stats_log_interval_secs = 0",
    );
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("stats_log_interval_secs"));
}

#[test]
fn test_config_validation_rejects_invalid_toml() {
    let err = AppConfig::load_from_str("not valid toml [[[").unwrap_err();
    assert!(!err.to_string().is_empty());
}

#[test]
fn test_config_load_from_file_via_env() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, VALID_CONFIG).unwrap();
    unsafe { std::env::set_var("CONFIG_FILE", path.to_str().unwrap()) };
    let result = AppConfig::load();
    unsafe { std::env::remove_var("CONFIG_FILE") };
    let config = result.expect("load from CONFIG_FILE");
    assert_eq!(config.server.port, 8081);
    assert_eq!(config.collector.interval_secs, 3600);
}

fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

const BLOB: &str = r#"{
    "accounts": [
        {
            "name": "Blob Account",
            "token": "blob-token",
            "zones": [ { "zone_id": "blob-zone", "domain": "blob.example" } ]
        }
    ]
}"#;

#[test]
fn test_resolve_blob_wins_over_shorthand() {
    let env = env(&[
        ("CF_CONFIG", BLOB),
        ("CF_TOKENS", "short-token"),
        ("CF_ZONES", "short-zone"),
    ]);
    let resolved = resolve_accounts_from(&env, "missing-zones.toml");
    assert_eq!(resolved.source, Some(ConfigSource::EnvJson));
    assert_eq!(resolved.accounts.len(), 1);
    assert_eq!(resolved.accounts[0].name, "Blob Account");
    assert_eq!(resolved.accounts[0].zones[0].domain, "blob.example");
    assert!(resolved.skipped.is_empty());
}

#[test]
fn test_resolve_malformed_blob_falls_through_to_shorthand() {
    let env = env(&[
        ("CF_CONFIG", "{ not json"),
        ("CF_TOKENS", "short-token"),
        ("CF_ZONES", "short-zone"),
    ]);
    let resolved = resolve_accounts_from(&env, "missing-zones.toml");
    assert_eq!(resolved.source, Some(ConfigSource::EnvShorthand));
    assert_eq!(resolved.accounts.len(), 1);
    assert_eq!(resolved.skipped.len(), 1);
    assert_eq!(resolved.skipped[0].source, ConfigSource::EnvJson);
    assert!(matches!(
        resolved.skipped[0].error,
        SourceError::BlobParse(_)
    ));
}

#[test]
fn test_resolve_shorthand_primary_and_indexed() {
    let env = env(&[
        ("CF_TOKENS", "token-a, extra-token"),
        ("CF_ZONES", "zone-a1,zone-a2"),
        ("CF_DOMAINS", "a1.example,a2.example"),
        ("CF_ACCOUNT_NAME", "Primary"),
        ("CF_TOKENS_1", "token-b"),
        ("CF_ZONES_1", "zone-b1"),
        // no CF_TOKENS_2: indexed accounts end here
        ("CF_TOKENS_3", "token-ignored"),
        ("CF_ZONES_3", "zone-ignored"),
    ]);
    let resolved = resolve_accounts_from(&env, "missing-zones.toml");
    assert_eq!(resolved.source, Some(ConfigSource::EnvShorthand));
    assert_eq!(resolved.accounts.len(), 2);

    let primary = &resolved.accounts[0];
    assert_eq!(primary.name, "Primary");
    assert_eq!(primary.token, "token-a");
    assert_eq!(primary.zones.len(), 2);
    assert_eq!(primary.zones[0].zone_id, "zone-a1");
    assert_eq!(primary.zones[0].domain, "a1.example");

    let indexed = &resolved.accounts[1];
    assert_eq!(indexed.name, "Account1");
    assert_eq!(indexed.token, "token-b");
    assert_eq!(indexed.zones[0].domain, "zone-b1");
}

#[test]
fn test_resolve_shorthand_domains_default_to_zone_ids() {
    let env = env(&[("CF_TOKENS", "t"), ("CF_ZONES", "z1,z2")]);
    let resolved = resolve_accounts_from(&env, "missing-zones.toml");
    assert_eq!(resolved.accounts.len(), 1);
    assert_eq!(resolved.accounts[0].name, "Default Account");
    assert_eq!(resolved.accounts[0].zones[0].domain, "z1");
    assert_eq!(resolved.accounts[0].zones[1].domain, "z2");
}

#[test]
fn test_resolve_file_fallback() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("zones.toml");
    std::fs::write(
        &path,
        r#"
[[accounts]]
name = "File Account"
token = "file-token"

[[accounts.zones]]
zone_id = "file-zone"
domain = "file.example"

[[accounts.zones]]
zone_id = "bare-zone"
"#,
    )
    .unwrap();

    let resolved = resolve_accounts_from(&HashMap::new(), path.to_str().unwrap());
    assert_eq!(resolved.source, Some(ConfigSource::File));
    assert_eq!(resolved.accounts.len(), 1);
    assert_eq!(resolved.accounts[0].name, "File Account");
    assert_eq!(resolved.accounts[0].zones[0].domain, "file.example");
    // domain omitted: zone id used as the label
    assert_eq!(resolved.accounts[0].zones[1].domain, "bare-zone");
    assert_eq!(resolved.skipped.len(), 2);
}

#[test]
fn test_resolve_nothing_yields_empty_list() {
    let resolved = resolve_accounts_from(&HashMap::new(), "definitely-missing.toml");
    assert!(resolved.accounts.is_empty());
    assert_eq!(resolved.source, None);
    assert_eq!(resolved.skipped.len(), 3);
    assert!(matches!(
        resolved.skipped[2].error,
        SourceError::FileRead { .. }
    ));
}
