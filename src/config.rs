//! Environment-driven configuration.

use std::env;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

pub fn get_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "sandbox".to_string())
}

/// Price quote feed settings (Twelve Data).
#[derive(Debug, Clone)]
pub struct QuoteFeedConfig {
    pub base_url: String,
    pub api_key: String,
    pub primary_symbol: String,
    pub proxy_symbol: String,
    pub interval: String,
    pub output_size: u32,
}

/// Bond-yield feed settings (Yahoo chart API).
#[derive(Debug, Clone)]
pub struct YieldFeedConfig {
    pub enabled: bool,
    pub base_url: String,
    pub symbol: String,
    pub period: String,
    pub interval: String,
}

/// Macro calendar feed settings.
#[derive(Debug, Clone)]
pub struct CalendarFeedConfig {
    pub enabled: bool,
    pub url: String,
    pub country: String,
    pub impact: String,
    pub lookback_hours: i64,
    pub lookahead_hours: i64,
}

#[derive(Debug, Clone)]
pub struct CacheTtls {
    pub price: Duration,
    pub yield_rate: Duration,
    pub calendar: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            price: Duration::from_secs(60),
            yield_rate: Duration::from_secs(300),
            calendar: Duration::from_secs(3600),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub base_url: String,
    pub bot_token: String,
    pub chat_ids: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub eval_interval_seconds: u64,
    pub quotes: QuoteFeedConfig,
    pub yields: YieldFeedConfig,
    pub calendar: CalendarFeedConfig,
    pub ttls: CacheTtls,
    pub tz_offset_hours: i32,
    pub request_timeout: Duration,
    pub rsi_period: usize,
    pub pivot_window: usize,
    pub telegram: Option<TelegramConfig>,
    pub redis_url: Option<String>,
    pub memory_key: String,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let text = |name: &str, default: &str| get(name).unwrap_or_else(|| default.to_string());

        let api_key = get("TWELVEDATA_API_KEY").ok_or(ConfigError::Missing("TWELVEDATA_API_KEY"))?;

        let telegram = match get("TELEGRAM_BOT_TOKEN") {
            Some(bot_token) => Some(TelegramConfig {
                base_url: text("TELEGRAM_BASE_URL", "https://api.telegram.org"),
                bot_token,
                chat_ids: parse_list(&text("TELEGRAM_CHAT_IDS", "")),
            }),
            None => None,
        };

        Ok(Self {
            port: parse_var(&get, "PORT", 8080)?,
            eval_interval_seconds: parse_var(&get, "EVAL_INTERVAL_SECONDS", 60)?,
            quotes: QuoteFeedConfig {
                base_url: text("TWELVEDATA_BASE_URL", "https://api.twelvedata.com"),
                api_key,
                primary_symbol: text("PRIMARY_SYMBOL", "XAU/USD"),
                proxy_symbol: text("PROXY_SYMBOL", "EUR/USD"),
                interval: text("PRICE_INTERVAL", "15min"),
                output_size: parse_var(&get, "PRICE_OUTPUT_SIZE", 35)?,
            },
            yields: YieldFeedConfig {
                enabled: parse_bool(&get, "YIELD_ENABLED", true)?,
                base_url: text("YIELD_BASE_URL", "https://query1.finance.yahoo.com"),
                symbol: text("YIELD_SYMBOL", "^TNX"),
                period: text("YIELD_PERIOD", "1d"),
                interval: text("YIELD_INTERVAL", "15m"),
            },
            calendar: CalendarFeedConfig {
                enabled: parse_bool(&get, "CALENDAR_ENABLED", true)?,
                url: text(
                    "CALENDAR_URL",
                    "https://nfs.faireconomy.media/ff_calendar_thisweek.json",
                ),
                country: text("CALENDAR_COUNTRY", "USD"),
                impact: text("CALENDAR_IMPACT", "High"),
                lookback_hours: parse_var(&get, "CALENDAR_LOOKBACK_HOURS", 12)?,
                lookahead_hours: parse_var(&get, "CALENDAR_LOOKAHEAD_HOURS", 24)?,
            },
            ttls: CacheTtls {
                price: Duration::from_secs(parse_var(&get, "PRICE_TTL_SECONDS", 60)?),
                yield_rate: Duration::from_secs(parse_var(&get, "YIELD_TTL_SECONDS", 300)?),
                calendar: Duration::from_secs(parse_var(&get, "CALENDAR_TTL_SECONDS", 3600)?),
            },
            tz_offset_hours: parse_var(&get, "TZ_OFFSET_HOURS", 7)?,
            request_timeout: Duration::from_secs(parse_var(&get, "REQUEST_TIMEOUT_SECONDS", 8)?),
            rsi_period: parse_var(&get, "RSI_PERIOD", 14)?,
            pivot_window: parse_var(&get, "PIVOT_WINDOW", 24)?,
            telegram,
            redis_url: get("REDIS_URL"),
            memory_key: text("MEMORY_KEY", "mafafx:last_emitted_state"),
        })
    }
}

/// Split a comma separated list, dropping blanks.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

fn parse_var<T, G>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

fn parse_bool<G>(get: &G, name: &'static str, default: bool) -> Result<bool, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid { name, value }),
        },
        None => Ok(default),
    }
}
