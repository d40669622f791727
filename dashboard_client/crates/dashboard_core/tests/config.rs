use dashboard_core::config::{ConfigError, DashboardConfig, ReconcileMode};
use std::collections::HashMap;
use std::time::Duration;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_apply_when_only_the_url_is_set() {
    let cfg = DashboardConfig::from_lookup(lookup(&[("PLUGIN_API_URL", "http://localhost:8080/api")]))
        .unwrap();
    assert_eq!(cfg.api_url.as_str(), "http://localhost:8080/api");
    assert_eq!(cfg.timeout, Duration::from_secs(15));
    assert_eq!(cfg.max_attempts, 3);
    assert_eq!(cfg.initial_backoff, Duration::from_millis(500));
    assert_eq!(cfg.reconcile, ReconcileMode::Refetch);
}

#[test]
fn missing_or_blank_url_is_an_error() {
    assert_eq!(
        DashboardConfig::from_lookup(lookup(&[])).unwrap_err(),
        ConfigError::MissingApiUrl
    );
    assert_eq!(
        DashboardConfig::from_lookup(lookup(&[("PLUGIN_API_URL", "   ")])).unwrap_err(),
        ConfigError::MissingApiUrl
    );
}

#[test]
fn non_http_urls_are_rejected() {
    assert!(matches!(
        DashboardConfig::new("ftp://example.com/plugins"),
        Err(ConfigError::InvalidApiUrl { .. })
    ));
    assert!(matches!(
        DashboardConfig::new("not a url"),
        Err(ConfigError::InvalidApiUrl { .. })
    ));
}

#[test]
fn numeric_settings_are_clamped() {
    let cfg = DashboardConfig::from_lookup(lookup(&[
        ("PLUGIN_API_URL", "https://example.com/plugins"),
        ("PLUGIN_API_TIMEOUT_SECS", "0"),
        ("PLUGIN_API_ATTEMPTS", "99"),
        ("PLUGIN_API_BACKOFF_MS", "1"),
    ]))
    .unwrap();
    assert_eq!(cfg.timeout, Duration::from_secs(1));
    assert_eq!(cfg.max_attempts, 10);
    assert_eq!(cfg.initial_backoff, Duration::from_millis(50));
}

#[test]
fn unparsable_numbers_fall_back_to_defaults() {
    let cfg = DashboardConfig::from_lookup(lookup(&[
        ("PLUGIN_API_URL", "https://example.com/plugins"),
        ("PLUGIN_API_ATTEMPTS", "many"),
    ]))
    .unwrap();
    assert_eq!(cfg.max_attempts, 3);
}

#[test]
fn reconcile_mode_parses_aliases() {
    assert_eq!("local".parse::<ReconcileMode>().unwrap(), ReconcileMode::Local);
    assert_eq!(" Refetch ".parse::<ReconcileMode>().unwrap(), ReconcileMode::Refetch);
    assert_eq!(
        "sometimes".parse::<ReconcileMode>().unwrap_err(),
        ConfigError::UnknownReconcileMode("sometimes".to_string())
    );

    let err = DashboardConfig::from_lookup(lookup(&[
        ("PLUGIN_API_URL", "https://example.com/plugins"),
        ("PLUGIN_API_RECONCILE", "eventually"),
    ]))
    .unwrap_err();
    assert_eq!(err, ConfigError::UnknownReconcileMode("eventually".to_string()));
}

#[test]
fn attempts_count_the_first_request() {
    let cfg = DashboardConfig::from_lookup(lookup(&[
        ("PLUGIN_API_URL", "https://example.com/plugins"),
        ("PLUGIN_API_ATTEMPTS", "1"),
    ]))
    .unwrap();
    assert_eq!(cfg.max_attempts, 1);

    let cfg = DashboardConfig::from_lookup(lookup(&[
        ("PLUGIN_API_URL", "https://example.com/plugins"),
        ("PLUGIN_API_RETRIES", "7"),
    ]))
    .unwrap();
    assert_eq!(cfg.max_attempts, 3);
}
