//! Unit tests for environment configuration

use mafafx::config::{parse_list, AppConfig, ConfigError};
use mafafx::logging::LogFormat;
use std::collections::HashMap;
use std::time::Duration;

fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    AppConfig::from_lookup(|name| map.get(name).cloned())
}

#[test]
fn test_defaults() {
    let config = load(&[("TWELVEDATA_API_KEY", "demo")]).unwrap();

    assert_eq!(config.port, 8080);
    assert_eq!(config.eval_interval_seconds, 60);
    assert_eq!(config.quotes.primary_symbol, "XAU/USD");
    assert_eq!(config.quotes.proxy_symbol, "EUR/USD");
    assert_eq!(config.quotes.interval, "15min");
    assert_eq!(config.quotes.output_size, 35);
    assert_eq!(config.ttls.price, Duration::from_secs(60));
    assert_eq!(config.ttls.yield_rate, Duration::from_secs(300));
    assert_eq!(config.ttls.calendar, Duration::from_secs(3600));
    assert_eq!(config.tz_offset_hours, 7);
    assert_eq!(config.rsi_period, 14);
    assert_eq!(config.pivot_window, 24);
    assert!(config.yields.enabled);
    assert!(config.calendar.enabled);
    assert!(config.telegram.is_none());
    assert!(config.redis_url.is_none());
}

#[test]
fn test_api_key_is_required() {
    assert!(matches!(
        load(&[]),
        Err(ConfigError::Missing("TWELVEDATA_API_KEY"))
    ));
    assert!(matches!(
        load(&[("TWELVEDATA_API_KEY", "   ")]),
        Err(ConfigError::Missing(_))
    ));
}

#[test]
fn test_invalid_number_is_reported() {
    let err = load(&[("TWELVEDATA_API_KEY", "k"), ("PORT", "eighty")]).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));
}

#[test]
fn test_overrides() {
    let config = load(&[
        ("TWELVEDATA_API_KEY", "k"),
        ("PRIMARY_SYMBOL", "XAG/USD"),
        ("YIELD_ENABLED", "false"),
        ("CALENDAR_ENABLED", "0"),
        ("PRICE_TTL_SECONDS", "30"),
        ("TELEGRAM_BOT_TOKEN", "123:abc"),
        ("TELEGRAM_CHAT_IDS", "111, 222,,333"),
        ("REDIS_URL", "redis://localhost:6379"),
    ])
    .unwrap();

    assert_eq!(config.quotes.primary_symbol, "XAG/USD");
    assert!(!config.yields.enabled);
    assert!(!config.calendar.enabled);
    assert_eq!(config.ttls.price, Duration::from_secs(30));
    let telegram = config.telegram.unwrap();
    assert_eq!(telegram.bot_token, "123:abc");
    assert_eq!(telegram.chat_ids, vec!["111", "222", "333"]);
    assert_eq!(config.redis_url.as_deref(), Some("redis://localhost:6379"));
}

#[test]
fn test_parse_list_drops_blanks() {
    assert_eq!(parse_list(" a ,b,, "), vec!["a", "b"]);
    assert!(parse_list("").is_empty());
}

#[test]
fn test_log_format_follows_environment() {
    assert_eq!(LogFormat::for_environment("production"), LogFormat::Json);
    assert_eq!(LogFormat::for_environment("PROD"), LogFormat::Json);
    assert_eq!(LogFormat::for_environment("sandbox"), LogFormat::Pretty);
}

#[test]
fn test_blank_redis_url_disables_persistence() {
    let config = load(&[("TWELVEDATA_API_KEY", "k"), ("REDIS_URL", "  "), ("PORT", "9090")]).unwrap();
    assert!(config.redis_url.is_none());
    assert_eq!(config.port, 9090);
}
