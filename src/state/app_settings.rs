use anyhow::{Context, bail};
use log::LevelFilter;
use match_api::client::DEFAULT_BASE_URL;
use std::time::Duration;

pub const ENV_API_URL: &str = "MATCHTUI_API_URL";
pub const ENV_POLL_MS: &str = "MATCHTUI_POLL_MS";
pub const ENV_TIMEOUT_SECS: &str = "MATCHTUI_TIMEOUT_SECS";
pub const ENV_LOG: &str = "MATCHTUI_LOG";

const DEFAULT_POLL_MS: u64 = 3000;
const MIN_POLL_MS: u64 = 250;
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: LevelFilter,
    pub api_url: String,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            full_screen: false,
            log_level: LevelFilter::Warn,
            api_url: DEFAULT_BASE_URL.to_string(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_MS),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl AppSettings {
    /// Read settings from the process environment.
    pub fn load() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup. Unset or blank keys keep their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut settings = Self::default();

        if let Some(url) = get(ENV_API_URL) {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                bail!("{ENV_API_URL} must be an http(s) URL, got {url:?}");
            }
            settings.api_url = url;
        }

        if let Some(raw) = get(ENV_POLL_MS) {
            let ms: u64 = raw
                .parse()
                .with_context(|| format!("{ENV_POLL_MS} must be a whole number of milliseconds"))?;
            if ms < MIN_POLL_MS {
                bail!("{ENV_POLL_MS} must be at least {MIN_POLL_MS}, got {ms}");
            }
            settings.poll_interval = Duration::from_millis(ms);
        }

        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw
                .parse()
                .with_context(|| format!("{ENV_TIMEOUT_SECS} must be a whole number of seconds"))?;
            if secs == 0 {
                bail!("{ENV_TIMEOUT_SECS} must be greater than zero");
            }
            settings.request_timeout = Duration::from_secs(secs);
        }

        if let Some(raw) = get(ENV_LOG) {
            settings.log_level = raw
                .parse()
                .with_context(|| format!("{ENV_LOG} must be one of off, error, warn, info, debug, trace"))?;
        }

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_from(pairs: &[(&str, &str)]) -> anyhow::Result<AppSettings> {
        let env: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppSettings::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let settings = settings_from(&[]).unwrap();
        assert_eq!(settings.api_url, "http://localhost:9091");
        assert_eq!(settings.poll_interval, Duration::from_millis(3000));
        assert_eq!(settings.request_timeout, Duration::from_secs(10));
        assert_eq!(settings.log_level, LevelFilter::Warn);
        assert!(!settings.full_screen);
    }

    #[test]
    fn overrides_are_applied() {
        let settings = settings_from(&[
            (ENV_API_URL, "https://matches.example.com/api"),
            (ENV_POLL_MS, "1000"),
            (ENV_TIMEOUT_SECS, "3"),
            (ENV_LOG, "debug"),
        ])
        .unwrap();
        assert_eq!(settings.api_url, "https://matches.example.com/api");
        assert_eq!(settings.poll_interval, Duration::from_millis(1000));
        assert_eq!(settings.request_timeout, Duration::from_secs(3));
        assert_eq!(settings.log_level, LevelFilter::Debug);
    }

    #[test]
    fn blank_values_keep_defaults() {
        let settings = settings_from(&[(ENV_POLL_MS, "  "), (ENV_LOG, "")]).unwrap();
        assert_eq!(settings.poll_interval, Duration::from_millis(3000));
        assert_eq!(settings.log_level, LevelFilter::Warn);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(settings_from(&[(ENV_API_URL, "localhost:9091")]).is_err());
        assert!(settings_from(&[(ENV_POLL_MS, "fast")]).is_err());
        assert!(settings_from(&[(ENV_POLL_MS, "100")]).is_err());
        assert!(settings_from(&[(ENV_TIMEOUT_SECS, "0")]).is_err());
        assert!(settings_from(&[(ENV_LOG, "loud")]).is_err());
    }

    #[test]
    fn poll_interval_floor_is_inclusive() {
        let settings = settings_from(&[(ENV_POLL_MS, "250")]).unwrap();
        assert_eq!(settings.poll_interval, Duration::from_millis(250));
    }
}
