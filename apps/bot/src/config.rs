use std::{env::var, time::Duration};

use anyhow::{Result, bail};
use market::{Registry, coingecko, news, yahoo};

pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Process-wide settings, read once at startup and shared read-only.
#[derive(Clone)]
pub struct Config {
    pub telegram_token: String,
    pub news_api_key: Option<String>,
    pub webapp_url: Option<String>,

    pub telegram_api_base: String,
    pub coingecko_api_base: String,
    pub yahoo_api_base: String,
    pub news_api_base: String,

    pub poll_timeout: Duration,
    pub http_timeout: Duration,
    pub retry_delay: Duration,

    pub registry: Registry,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let secs = |key: &str, default: u64| -> Result<Duration> {
            match get(key) {
                Some(raw) => match raw.parse::<u64>() {
                    Ok(n) => Ok(Duration::from_secs(n)),
                    Err(_) => bail!("{key} must be a whole number of seconds, got {raw:?}"),
                },
                None => Ok(Duration::from_secs(default)),
            }
        };

        let Some(telegram_token) = get("TELEGRAM_TOKEN") else {
            bail!("TELEGRAM_TOKEN not set");
        };

        Ok(Self {
            telegram_token,
            news_api_key: get("NEWS_API_KEY"),
            webapp_url: get("WEBAPP_URL"),

            telegram_api_base: get("TELEGRAM_API_BASE")
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_BASE.to_string()),
            coingecko_api_base: get("COINGECKO_API_BASE")
                .unwrap_or_else(|| coingecko::DEFAULT_BASE_API.to_string()),
            yahoo_api_base: get("YAHOO_API_BASE")
                .unwrap_or_else(|| yahoo::DEFAULT_BASE_API.to_string()),
            news_api_base: get("NEWS_API_BASE")
                .unwrap_or_else(|| news::DEFAULT_BASE_API.to_string()),

            poll_timeout: secs("POLL_TIMEOUT_SECS", 30)?,
            http_timeout: secs("HTTP_TIMEOUT_SECS", 15)?.max(Duration::from_secs(1)),
            retry_delay: secs("POLL_RETRY_DELAY_SECS", 1)?.max(Duration::from_secs(1)),

            registry: Registry::default(),
        })
    }
}
