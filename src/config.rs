//! Environment driven settings

use anyhow::Context;
use log::warn;
use sqlx::sqlite::SqliteConnectOptions;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_OPERATOR_INBOX_URL: &str = "https://yourdomain.com/operator/inbox.html";
const DEFAULT_AUTO_CLOSE_INTERVAL_SECS: u64 = 10 * 60;
const DEFAULT_AUTO_CLOSE_AFTER_HOURS: i64 = 24;

#[derive(Debug, Clone)]
pub struct Settings {
    /// `None` selects the in-memory store.
    pub database: Option<SqliteConnectOptions>,
    pub port: u16,
    pub auth_url: Option<String>,
    pub auth_api_key: String,
    pub webhook_url: Option<String>,
    pub operator_inbox_url: String,
    pub auto_close_interval: Duration,
    pub auto_close_after: chrono::Duration,
    pub static_dir: PathBuf,
    pub operator_dir: PathBuf,
}

impl Settings {
    /// Reads settings from the process environment, loading `.env` first if present.
    pub fn from_env() -> anyhow::Result<Settings> {
        dotenvy::dotenv().ok();

        let database = match non_empty_var("DATABASE_URL") {
            Some(url) => Some(
                SqliteConnectOptions::from_str(&url)
                    .with_context(|| format!("invalid DATABASE_URL `{url}`"))?
                    .create_if_missing(true)
                    .foreign_keys(true),
            ),
            None => None,
        };

        Ok(Settings {
            database,
            port: parsed_var("PORT", DEFAULT_PORT),
            auth_url: non_empty_var("AUTH_URL").map(|url| url.trim_end_matches('/').to_owned()),
            auth_api_key: non_empty_var("AUTH_API_KEY").unwrap_or_default(),
            webhook_url: non_empty_var("CHAT_WEBHOOK_URL"),
            operator_inbox_url: non_empty_var("OPERATOR_INBOX_URL")
                .unwrap_or_else(|| DEFAULT_OPERATOR_INBOX_URL.to_owned()),
            auto_close_interval: sweep_interval(non_empty_var("AUTO_CLOSE_INTERVAL_SECS")),
            auto_close_after: idle_limit(non_empty_var("AUTO_CLOSE_AFTER_HOURS")),
            static_dir: non_empty_var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("public")),
            operator_dir: non_empty_var("OPERATOR_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("operator")),
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            database: None,
            port: DEFAULT_PORT,
            auth_url: None,
            auth_api_key: String::new(),
            webhook_url: None,
            operator_inbox_url: DEFAULT_OPERATOR_INBOX_URL.to_owned(),
            auto_close_interval: Duration::from_secs(DEFAULT_AUTO_CLOSE_INTERVAL_SECS),
            auto_close_after: chrono::Duration::hours(DEFAULT_AUTO_CLOSE_AFTER_HOURS),
            static_dir: PathBuf::from("public"),
            operator_dir: PathBuf::from("operator"),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn parsed_var<T: FromStr + Copy + std::fmt::Display>(name: &str, default: T) -> T {
    parse_or_default(name, non_empty_var(name), default, |_| true)
}

/// Parses `raw`, falling back to `default` when it is absent, unparsable or rejected by `accept`.
fn parse_or_default<T: FromStr + Copy + std::fmt::Display>(
    name: &str,
    raw: Option<String>,
    default: T,
    accept: impl Fn(&T) -> bool,
) -> T {
    let Some(raw) = raw else {
        return default;
    };
    match raw.parse::<T>() {
        Ok(value) if accept(&value) => value,
        _ => {
            warn!("{name}={raw} is not a valid value, using default {default}");
            default
        }
    }
}

/// Sweep period in seconds. Must be non-zero, `tokio::time::interval` panics otherwise.
fn sweep_interval(raw: Option<String>) -> Duration {
    Duration::from_secs(parse_or_default(
        "AUTO_CLOSE_INTERVAL_SECS",
        raw,
        DEFAULT_AUTO_CLOSE_INTERVAL_SECS,
        |secs| *secs > 0,
    ))
}

/// Idle time in hours before an open conversation is closed. Must be positive and representable.
fn idle_limit(raw: Option<String>) -> chrono::Duration {
    let hours = parse_or_default(
        "AUTO_CLOSE_AFTER_HOURS",
        raw,
        DEFAULT_AUTO_CLOSE_AFTER_HOURS,
        |hours| *hours > 0 && chrono::Duration::try_hours(*hours).is_some(),
    );
    chrono::Duration::try_hours(hours)
        .unwrap_or_else(|| chrono::Duration::hours(DEFAULT_AUTO_CLOSE_AFTER_HOURS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_match_reference_deployment() {
        let settings = Settings::default();

        assert_eq!(settings.port, 3000);
        assert_eq!(settings.auto_close_interval, Duration::from_secs(600));
        assert_eq!(settings.auto_close_after, chrono::Duration::hours(24));
        assert!(settings.database.is_none());
        assert!(settings.webhook_url.is_none());
    }

    #[test]
    fn test_zero_sweep_interval_falls_back_to_default() {
        assert_eq!(sweep_interval(Some("0".into())), Duration::from_secs(600));
        assert_eq!(sweep_interval(Some("-5".into())), Duration::from_secs(600));
        assert_eq!(sweep_interval(Some("30".into())), Duration::from_secs(30));
        assert_eq!(sweep_interval(None), Duration::from_secs(600));
    }

    #[test]
    fn test_non_positive_idle_limit_falls_back_to_default() {
        assert_eq!(idle_limit(Some("0".into())), chrono::Duration::hours(24));
        assert_eq!(idle_limit(Some("-1".into())), chrono::Duration::hours(24));
        assert_eq!(idle_limit(Some("48".into())), chrono::Duration::hours(48));
    }

    #[test]
    fn test_unrepresentable_idle_limit_falls_back_to_default() {
        let huge = i64::MAX.to_string();
        assert_eq!(idle_limit(Some(huge)), chrono::Duration::hours(24));
        assert_eq!(idle_limit(Some("soon".into())), chrono::Duration::hours(24));
    }
}
