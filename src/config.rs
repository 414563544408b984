use crate::error::ConfigError;
use log::warn;
use std::time::Duration;

pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_PRICE_DIFF_TRIGGER: f64 = 0.1;
pub const DEFAULT_ASSET_ID: &str = "ripple"; // CoinGecko id for XRP
pub const DEFAULT_ASSET_SYMBOL: &str = "XRP";

const CHECK_INTERVAL_VAR: &str = "CHECK_INTERVAL";
const PRICE_DIFF_TRIGGER_VAR: &str = "PRICE_DIFF_TRIGGER";
const ASSET_ID_VAR: &str = "COINGECKO_ASSET_ID";
const ASSET_SYMBOL_VAR: &str = "ASSET_SYMBOL";

const SENDGRID_API_KEY_VAR: &str = "SENDGRID_API_KEY";
const FROM_EMAIL_VAR: &str = "FROM_EMAIL";
const TO_EMAIL_VAR: &str = "TO_EMAIL";

/// Knobs for the polling loop.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorSettings {
    pub asset_id: String,
    pub symbol: String,
    pub interval: Duration,
    pub threshold: f64,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            asset_id: DEFAULT_ASSET_ID.to_string(),
            symbol: DEFAULT_ASSET_SYMBOL.to_string(),
            interval: Duration::from_secs(DEFAULT_CHECK_INTERVAL_SECS),
            threshold: DEFAULT_PRICE_DIFF_TRIGGER,
        }
    }
}

impl MonitorSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds settings from a variable lookup. Bad overrides are logged and
    /// replaced by the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(id) = non_empty(lookup(ASSET_ID_VAR)) {
            settings.asset_id = id;
        }
        if let Some(symbol) = non_empty(lookup(ASSET_SYMBOL_VAR)) {
            settings.symbol = symbol.to_uppercase();
        }

        if let Some(raw) = lookup(CHECK_INTERVAL_VAR) {
            match parse_positive::<u64>(CHECK_INTERVAL_VAR, &raw) {
                Ok(secs) => settings.interval = Duration::from_secs(secs),
                Err(e) => warn!("{}, using {}s", e, DEFAULT_CHECK_INTERVAL_SECS),
            }
        }

        if let Some(raw) = lookup(PRICE_DIFF_TRIGGER_VAR) {
            match parse_positive::<f64>(PRICE_DIFF_TRIGGER_VAR, &raw) {
                Ok(threshold) => settings.threshold = threshold,
                Err(e) => warn!("{}, using {}", e, DEFAULT_PRICE_DIFF_TRIGGER),
            }
        }

        settings
    }
}

/// SendGrid account details. Any of them may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MailSettings {
    pub api_key: Option<String>,
    pub from_email: Option<String>,
    pub to_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MailCredentials {
    pub api_key: String,
    pub from_email: String,
    pub to_email: String,
}

impl MailSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            api_key: lookup(SENDGRID_API_KEY_VAR),
            from_email: lookup(FROM_EMAIL_VAR),
            to_email: lookup(TO_EMAIL_VAR),
        }
    }

    /// All three values, or `None` if any is absent or blank.
    pub fn credentials(&self) -> Option<MailCredentials> {
        Some(MailCredentials {
            api_key: non_empty(self.api_key.clone())?,
            from_email: non_empty(self.from_email.clone())?,
            to_email: non_empty(self.to_email.clone())?,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

trait Positive {
    fn is_positive(&self) -> bool;
}

impl Positive for u64 {
    fn is_positive(&self) -> bool {
        *self > 0
    }
}

impl Positive for f64 {
    fn is_positive(&self) -> bool {
        self.is_finite() && *self > 0.0
    }
}

fn parse_positive<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + Positive,
{
    let value = raw
        .trim()
        .parse::<T>()
        .map_err(|_| ConfigError::NotANumber {
            name,
            value: raw.to_string(),
        })?;

    if !value.is_positive() {
        return Err(ConfigError::NotPositive {
            name,
            value: raw.trim().to_string(),
        });
    }
    Ok(value)
}
