use crate::config::{ClientConfig, DEFAULT_REFRESH_COOKIE, DEFAULT_TIMEOUT};
use anyhow::Result;
use std::{path::PathBuf, time::Duration};

/// Options shared by every subcommand.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub base_url: String,
    pub store_path: PathBuf,
    pub attach_bearer_token: bool,
    pub timeout: Option<Duration>,
    pub refresh_cookie: String,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(base_url: String, store_path: PathBuf) -> Self {
        Self {
            base_url,
            store_path,
            attach_bearer_token: false,
            timeout: Some(DEFAULT_TIMEOUT),
            refresh_cookie: DEFAULT_REFRESH_COOKIE.to_string(),
        }
    }

    /// # Errors
    /// Returns an error if the base URL is not a valid http(s) origin.
    pub fn client_config(&self) -> Result<ClientConfig> {
        Ok(ClientConfig::new(&self.base_url)?
            .with_attach_bearer_token(self.attach_bearer_token)
            .with_timeout(self.timeout)
            .with_refresh_cookie(self.refresh_cookie.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_args() {
        let args = GlobalArgs::new(
            "https://auth.example.test".to_string(),
            PathBuf::from("/tmp/refresh.json"),
        );
        assert_eq!(args.base_url, "https://auth.example.test");
        assert!(!args.attach_bearer_token);

        let config = args.client_config().unwrap();
        assert_eq!(config.refresh_cookie, "refresh_token");
        assert_eq!(config.timeout, Some(DEFAULT_TIMEOUT));
    }

    #[test]
    fn test_client_config_rejects_bad_url() {
        let args = GlobalArgs::new("auth.example.test".to_string(), PathBuf::from("/tmp/x"));
        assert!(args.client_config().is_err());
    }
}
