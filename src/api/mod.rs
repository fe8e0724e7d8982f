//! HTTP transport for the auth service. Every call is reduced to an
//! [`ApiResponse`] carrying the status code and, when the server declared a
//! JSON body, the decoded payload. Non-2xx statuses are ordinary results so
//! callers classify outcomes by status code alone; only failures to complete
//! the exchange surface as [`TransportError`].
//!
//! Flow Overview:
//! - Join the request path onto the configured base origin.
//! - Attach the ambient cookie store and any caller-supplied headers.
//! - Serialize a JSON body (setting `Content-Type`) or pass a raw body through.
//! - Decode the response body only when its `Content-Type` mentions JSON.
//!
//! The transport never inspects tokens; it only forwards headers and cookies.

mod cookies;
mod error;

pub use cookies::SessionCookies;
pub use error::TransportError;

use crate::{config::ClientConfig, APP_USER_AGENT};
use reqwest::{
    header::{HeaderValue, CONTENT_TYPE},
    Client, Method,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info_span, Instrument};
use url::Url;

/// Status and optional JSON payload of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub data: Option<T>,
}

/// Request payload. Not `Debug`: JSON bodies routinely carry passwords.
#[derive(Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Raw(String),
}

#[derive(Default)]
pub struct RequestOptions {
    pub body: RequestBody,
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    /// # Errors
    /// Returns an error if `body` cannot be represented as JSON.
    pub fn json<B: Serialize>(body: &B) -> Result<Self, TransportError> {
        Ok(Self {
            body: RequestBody::Json(serde_json::to_value(body)?),
            headers: Vec::new(),
        })
    }

    #[must_use]
    pub fn raw(body: impl Into<String>) -> Self {
        Self {
            body: RequestBody::Raw(body.into()),
            headers: Vec::new(),
        }
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    cookies: Arc<SessionCookies>,
}

impl ApiClient {
    /// Build a transport bound to the configured base origin.
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let cookies = Arc::new(SessionCookies::new(&config.base_url));

        let mut builder = Client::builder()
            .user_agent(APP_USER_AGENT)
            .cookie_provider(Arc::clone(&cookies));

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(TransportError::Build)?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            cookies,
        })
    }

    /// Ambient cookies shared by every request made through this client.
    #[must_use]
    pub fn cookies(&self) -> &SessionCookies {
        &self.cookies
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds the full URL for `path` on the configured origin.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        build_url_with_base(self.base_url.as_str(), path)
    }

    /// Sends a request and classifies the response into `{status, data}`.
    /// # Errors
    /// Returns an error only if the exchange could not be completed (connection
    /// failure, timeout, unreadable body) or the JSON body could not be encoded.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse<T>, TransportError> {
        let url = self.url(path);

        let mut builder = self.client.request(method.clone(), &url);

        for (name, value) in &options.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match options.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(serde_json::to_vec(&value)?),
            RequestBody::Raw(text) => builder.body(text),
        };

        let span = info_span!(
            "api.request",
            http.method = %method,
            url = %url
        );

        let response = builder.send().instrument(span).await?;
        let status = response.status().as_u16();
        let is_json = is_json_content_type(response.headers().get(CONTENT_TYPE));

        debug!(status, is_json, "{} {} completed", method, url);

        let data = if is_json {
            let bytes = response.bytes().await?;
            decode_body(&bytes)
        } else {
            None
        };

        Ok(ApiResponse { status, data })
    }
}

/// Builds a URL from an explicit base URL and the provided path.
fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

fn is_json_content_type(value: Option<&HeaderValue>) -> bool {
    value
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.to_ascii_lowercase().contains("json"))
}

/// Empty or malformed JSON bodies decode to `None`.
fn decode_body<T: DeserializeOwned>(bytes: &[u8]) -> Option<T> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return None;
    }

    match serde_json::from_slice(bytes) {
        Ok(data) => Some(data),
        Err(err) => {
            debug!("discarding undecodable JSON body: {err}");
            None
        }
    }
}
