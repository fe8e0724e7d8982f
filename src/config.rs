//! Client configuration resolved once at startup. The base origin comes from
//! the deployment environment (`AUTHSESSION_BASE_URL`) and is not reloadable;
//! a new client must be built to talk to a different origin. Configuration
//! values are public; do not store secrets here.

use anyhow::{anyhow, Context, Result};
use std::{env, time::Duration};
use url::Url;

pub const ENV_BASE_URL: &str = "AUTHSESSION_BASE_URL";
pub const ENV_ATTACH_BEARER_TOKEN: &str = "AUTHSESSION_ATTACH_BEARER_TOKEN";
pub const ENV_TIMEOUT: &str = "AUTHSESSION_TIMEOUT";
pub const ENV_REFRESH_COOKIE: &str = "AUTHSESSION_REFRESH_COOKIE";

/// Default request timeout applied to every transport call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Cookie name the auth service uses for the refresh session.
pub const DEFAULT_REFRESH_COOKIE: &str = "refresh_token";

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: Url,
    /// Send `Authorization: Bearer <token>` on requests made while authenticated.
    pub attach_bearer_token: bool,
    /// `None` lets a hung request block until the server answers.
    pub timeout: Option<Duration>,
    pub refresh_cookie: String,
}

impl ClientConfig {
    /// Builds a config with defaults for everything but the base origin.
    /// # Errors
    /// Returns an error if `base_url` is not an absolute http(s) URL with a host.
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            attach_bearer_token: false,
            timeout: Some(DEFAULT_TIMEOUT),
            refresh_cookie: DEFAULT_REFRESH_COOKIE.to_string(),
        })
    }

    /// Loads config from `AUTHSESSION_*` environment variables.
    /// # Errors
    /// Returns an error if the base URL is missing or invalid, or an optional
    /// value cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let base_url = read_env(ENV_BASE_URL)
            .ok_or_else(|| anyhow!("missing required environment variable: {ENV_BASE_URL}"))?;

        let mut config = Self::new(&base_url)?;

        if let Some(value) = read_env(ENV_ATTACH_BEARER_TOKEN) {
            config.attach_bearer_token = parse_bool(&value)
                .ok_or_else(|| anyhow!("invalid boolean in {ENV_ATTACH_BEARER_TOKEN}: {value}"))?;
        }

        if let Some(value) = read_env(ENV_TIMEOUT) {
            let seconds = value
                .parse::<u64>()
                .with_context(|| format!("invalid number of seconds in {ENV_TIMEOUT}: {value}"))?;
            config.timeout = timeout_from_secs(seconds);
        }

        if let Some(value) = read_env(ENV_REFRESH_COOKIE) {
            config.refresh_cookie = value;
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_attach_bearer_token(mut self, attach: bool) -> Self {
        self.attach_bearer_token = attach;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_refresh_cookie(mut self, name: impl Into<String>) -> Self {
        self.refresh_cookie = name.into();
        self
    }
}

/// Zero disables the timeout.
#[must_use]
pub fn timeout_from_secs(seconds: u64) -> Option<Duration> {
    (seconds > 0).then(|| Duration::from_secs(seconds))
}

/// # Errors
/// Returns an error if `raw` cannot be parsed, has no host, or uses an unsupported scheme.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed).with_context(|| format!("invalid base URL: {trimmed}"))?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(anyhow!("Error parsing URL: unsupported scheme {scheme}")),
    }

    if url.host().is_none() {
        return Err(anyhow!("Error parsing URL: no host specified"));
    }

    Ok(url)
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| normalize_value(&value))
}

fn normalize_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_value_trims_and_rejects_empty() {
        assert_eq!(normalize_value(""), None);
        assert_eq!(normalize_value("   "), None);
        assert_eq!(
            normalize_value("  https://api.example.test "),
            Some("https://api.example.test".to_string())
        );
    }

    #[test]
    fn parse_base_url_rejects_unsupported_scheme() {
        assert!(parse_base_url("ftp://files.example.test").is_err());
        assert!(parse_base_url("not a url").is_err());
        assert!(parse_base_url("https://api.example.test").is_ok());
    }

    #[test]
    fn new_uses_defaults() {
        let config = ClientConfig::new("http://localhost:8080").unwrap();
        assert!(!config.attach_bearer_token);
        assert_eq!(config.timeout, Some(DEFAULT_TIMEOUT));
        assert_eq!(config.refresh_cookie, DEFAULT_REFRESH_COOKIE);
    }

    #[test]
    fn timeout_zero_disables() {
        assert_eq!(timeout_from_secs(0), None);
        assert_eq!(timeout_from_secs(3), Some(Duration::from_secs(3)));
    }

    #[test]
    fn from_env_requires_base_url() {
        temp_env::with_vars([(ENV_BASE_URL, None::<&str>)], || {
            assert!(ClientConfig::from_env().is_err());
        });
    }

    #[test]
    fn from_env_reads_overrides() {
        temp_env::with_vars(
            [
                (ENV_BASE_URL, Some("https://auth.example.test")),
                (ENV_ATTACH_BEARER_TOKEN, Some("true")),
                (ENV_TIMEOUT, Some("0")),
                (ENV_REFRESH_COOKIE, Some("sid")),
            ],
            || {
                let config = ClientConfig::from_env().unwrap();
                assert_eq!(config.base_url.as_str(), "https://auth.example.test/");
                assert!(config.attach_bearer_token);
                assert_eq!(config.timeout, None);
                assert_eq!(config.refresh_cookie, "sid");
            },
        );
    }

    #[test]
    fn from_env_rejects_bad_boolean() {
        temp_env::with_vars(
            [
                (ENV_BASE_URL, Some("https://auth.example.test")),
                (ENV_ATTACH_BEARER_TOKEN, Some("maybe")),
                (ENV_TIMEOUT, None),
                (ENV_REFRESH_COOKIE, None),
            ],
            || {
                assert!(ClientConfig::from_env().is_err());
            },
        );
    }
}
