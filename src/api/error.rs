use thiserror::Error;

/// Failures where no HTTP response was obtained. Non-2xx statuses are not
/// errors; they come back as an ordinary [`super::ApiResponse`].
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to build http client: {0}")]
    Build(#[source] reqwest::Error),
    #[error("failed to encode request body")]
    Encode(#[from] serde_json::Error),
    #[error("request timed out")]
    Timeout,
    #[error("unable to reach the server: {0}")]
    Network(#[source] reqwest::Error),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(err)
        }
    }
}
