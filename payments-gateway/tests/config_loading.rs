use std::collections::HashMap;
use std::time::Duration;

use payments_gateway::config::DEFAULT_STRIPE_API_BASE;
use payments_gateway::{ConfigError, GatewayConfig};

fn base_env() -> HashMap<&'static str, String> {
    HashMap::from([
        ("PORT", "3003".to_string()),
        ("STRIPE_SECRET", "sk_test_123".to_string()),
        ("STRIPE_WEBHOOK_SECRET", "whsec_123".to_string()),
        ("STRIPE_SUCCESS_URL", "http://localhost:3003/payments/success".to_string()),
        ("STRIPE_CANCEL_URL", "http://localhost:3003/payments/cancel".to_string()),
    ])
}

fn load(env: &HashMap<&'static str, String>) -> Result<GatewayConfig, ConfigError> {
    GatewayConfig::from_lookup(|key| env.get(key).cloned())
}

#[test]
fn required_settings_load_with_defaults() {
    let cfg = load(&base_env()).unwrap();
    assert_eq!(cfg.port, 3003);
    assert_eq!(cfg.host, "0.0.0.0");
    assert_eq!(cfg.stripe_secret, "sk_test_123");
    assert_eq!(cfg.stripe_webhook_secret, "whsec_123");
    assert_eq!(cfg.stripe_api_base, DEFAULT_STRIPE_API_BASE);
    assert_eq!(cfg.stripe_timeout, Duration::from_millis(15_000));
    assert_eq!(cfg.webhook_tolerance_secs, 300);
    assert!(cfg.bus_servers.is_empty());
}

#[test]
fn each_missing_required_key_is_named() {
    for key in ["PORT", "STRIPE_SECRET", "STRIPE_WEBHOOK_SECRET", "STRIPE_SUCCESS_URL", "STRIPE_CANCEL_URL"] {
        let mut env = base_env();
        env.remove(key);
        let err = load(&env).unwrap_err();
        assert_eq!(err, ConfigError::Missing(vec![key]));
        assert!(err.to_string().contains(key), "message should name {key}: {err}");
    }
}

#[test]
fn all_missing_keys_reported_together() {
    let err = load(&HashMap::new()).unwrap_err();
    let ConfigError::Missing(keys) = err else { panic!("expected missing keys") };
    assert_eq!(keys.len(), 5);
}

#[test]
fn blank_value_counts_as_missing() {
    let mut env = base_env();
    env.insert("STRIPE_WEBHOOK_SECRET", "   ".into());
    assert_eq!(load(&env).unwrap_err(), ConfigError::Missing(vec!["STRIPE_WEBHOOK_SECRET"]));
}

#[test]
fn malformed_port_is_rejected() {
    let mut env = base_env();
    env.insert("PORT", "eighty".into());
    match load(&env).unwrap_err() {
        ConfigError::Invalid { key, value } => {
            assert_eq!(key, "PORT");
            assert_eq!(value, "eighty");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn bus_servers_split_on_commas() {
    let mut env = base_env();
    env.insert("KAFKA_BOOTSTRAP", "kafka-1:9092, kafka-2:9092,".into());
    let cfg = load(&env).unwrap();
    assert_eq!(cfg.bus_servers, vec!["kafka-1:9092", "kafka-2:9092"]);
}

#[test]
fn unknown_settings_are_ignored_and_optionals_apply() {
    let mut env = base_env();
    env.insert("SOMETHING_ELSE", "whatever".into());
    env.insert("STRIPE_API_BASE", "http://localhost:12111/".into());
    env.insert("STRIPE_WEBHOOK_TOLERANCE_SECS", "0".into());
    env.insert("CORS_ALLOWED_ORIGINS", "https://shop.example".into());
    let cfg = load(&env).unwrap();
    assert_eq!(cfg.stripe_api_base, "http://localhost:12111");
    assert_eq!(cfg.webhook_tolerance_secs, 0);
    assert_eq!(cfg.cors_allowed_origins, vec!["https://shop.example"]);
}
