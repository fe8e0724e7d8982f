//! Ambient cookie storage for the transport. This stands in for the browser's
//! cookie jar: every response's `Set-Cookie` headers update it and every
//! request to the configured origin carries the cookies whose `Path` and
//! `Secure` attributes match. Cookies for any other host are neither stored
//! nor sent.
//!
//! Values are session credentials; they are exposed only as `SecretString` and
//! never logged.

use cookie::{
    time::{Duration, OffsetDateTime},
    Cookie, CookieJar,
};
use reqwest::{cookie::CookieStore, header::HeaderValue};
use secrecy::SecretString;
use std::sync::{PoisonError, RwLock};
use tracing::debug;
use url::Url;

#[derive(Debug)]
pub struct SessionCookies {
    host: Option<String>,
    jar: RwLock<CookieJar>,
}

impl SessionCookies {
    /// Creates an empty store bound to the host of `origin`.
    #[must_use]
    pub fn new(origin: &Url) -> Self {
        Self {
            host: origin.host_str().map(str::to_ascii_lowercase),
            jar: RwLock::new(CookieJar::new()),
        }
    }

    /// Value of a live cookie, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<SecretString> {
        let now = OffsetDateTime::now_utc();
        self.jar
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .filter(|cookie| !is_expired(cookie, now))
            .map(|cookie| SecretString::from(cookie.value().to_string()))
    }

    /// Stores a cookie restored from outside the HTTP exchange. It applies to
    /// every path on the origin.
    pub fn insert(&self, name: &str, value: &str) {
        let mut cookie = Cookie::new(name.to_string(), value.to_string());
        cookie.set_path("/");
        self.jar
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .add(cookie);
    }

    /// Returns `true` if a cookie was removed.
    pub fn remove(&self, name: &str) -> bool {
        let mut jar = self.jar.write().unwrap_or_else(PoisonError::into_inner);
        let present = jar.get(name).is_some();
        jar.force_remove(name);
        present
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        let now = OffsetDateTime::now_utc();
        !self
            .jar
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|cookie| !is_expired(cookie, now))
    }

    fn same_origin(&self, url: &Url) -> bool {
        match (&self.host, url.host_str()) {
            (Some(host), Some(other)) => host.eq_ignore_ascii_case(other),
            _ => false,
        }
    }

    fn apply(&self, cookie: Cookie<'static>, url: &Url, now: OffsetDateTime) {
        let mut jar = self.jar.write().unwrap_or_else(PoisonError::into_inner);

        if is_removal(&cookie, now) {
            debug!(cookie = %cookie.name(), "cookie cleared by server");
            jar.force_remove(cookie.name());
            return;
        }

        debug!(cookie = %cookie.name(), "cookie set by server");
        jar.add(normalize(cookie, url, now));
    }
}

impl CookieStore for SessionCookies {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        if !self.same_origin(url) {
            return;
        }

        let now = OffsetDateTime::now_utc();
        for header in cookie_headers {
            let Some(raw) = header.to_str().ok() else {
                continue;
            };

            match Cookie::parse(raw.to_string()) {
                Ok(cookie) => self.apply(cookie, url, now),
                Err(err) => debug!("ignoring malformed Set-Cookie header: {err}"),
            }
        }
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        if !self.same_origin(url) {
            return None;
        }

        let now = OffsetDateTime::now_utc();
        let secure_channel = url.scheme() == "https";
        let jar = self.jar.read().unwrap_or_else(PoisonError::into_inner);

        let mut pairs: Vec<String> = jar
            .iter()
            .filter(|cookie| !is_expired(cookie, now))
            .filter(|cookie| secure_channel || cookie.secure() != Some(true))
            .filter(|cookie| path_matches(cookie.path().unwrap_or("/"), url.path()))
            .map(|cookie| format!("{}={}", cookie.name(), cookie.value()))
            .collect();

        if pairs.is_empty() {
            return None;
        }

        pairs.sort();
        HeaderValue::from_str(&pairs.join("; ")).ok()
    }
}

/// A `Set-Cookie` that deletes rather than stores: empty value, non-positive
/// `Max-Age`, or an `Expires` date already in the past.
fn is_removal(cookie: &Cookie<'_>, now: OffsetDateTime) -> bool {
    cookie.value().is_empty()
        || cookie.max_age().is_some_and(|age| age <= Duration::ZERO)
        || (cookie.max_age().is_none() && is_expired(cookie, now))
}

fn is_expired(cookie: &Cookie<'_>, now: OffsetDateTime) -> bool {
    cookie.expires_datetime().is_some_and(|at| at <= now)
}

/// Pins `Max-Age` to an absolute expiry and fills in the default path, so
/// stored cookies can be matched later without the original response.
fn normalize(mut cookie: Cookie<'static>, url: &Url, now: OffsetDateTime) -> Cookie<'static> {
    if let Some(expires) = cookie.max_age().and_then(|age| now.checked_add(age)) {
        cookie.set_expires(expires);
    }

    if !cookie.path().is_some_and(|path| path.starts_with('/')) {
        cookie.set_path(default_path(url.path()));
    }

    cookie
}

/// Directory of the request path (RFC 6265 section 5.1.4).
fn default_path(request_path: &str) -> String {
    match request_path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(index) => request_path[..index].to_string(),
    }
}

fn path_matches(cookie_path: &str, request_path: &str) -> bool {
    if cookie_path == request_path {
        return true;
    }

    request_path.starts_with(cookie_path)
        && (cookie_path.ends_with('/') || request_path[cookie_path.len()..].starts_with('/'))
}
