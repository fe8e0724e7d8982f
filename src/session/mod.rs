//! Session state and the four auth operations.
//!
//! The session is one immutable value, either [`Session::Anonymous`] or
//! [`Session::Authenticated`], so a user without an access token (or a token
//! without a user) cannot be represented. Each operation produces a
//! [`Transition`] holding the replacement session and a status message; a
//! failed operation carries the previous session forward unchanged.
//!
//! Flow Overview:
//! | Operation | Request                  | Success                   |
//! |-----------|--------------------------|---------------------------|
//! | register  | POST /auth/register body | 201 `{user, accessToken}` |
//! | login     | POST /auth/login body    | 200 `{user, accessToken}` |
//! | refresh   | POST /auth/refresh       | 200 `{user, accessToken}` |
//! | logout    | POST /auth/logout        | 204                       |
//!
//! Refresh and logout rely on the refresh cookie held by the transport's cookie
//! store rather than on any token passed by the caller.

pub mod client;
mod error;
pub mod transition;

pub use client::SessionClient;
pub use error::AuthError;
pub use transition::Transition;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, sync::Arc};

/// Account as reported by the auth service. Replaced wholesale on every
/// successful auth response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    /// ISO-8601 timestamp, kept verbatim.
    pub created_at: String,
}

/// Short-lived opaque credential returned by register/login/refresh.
#[derive(Clone)]
pub struct AccessToken(Arc<SecretString>);

impl AccessToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(Arc::new(SecretString::from(token.into())))
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

impl PartialEq for AccessToken {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl Eq for AccessToken {}

impl<'de> Deserialize<'de> for AccessToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// Success body of register, login and refresh.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthGrant {
    pub user: User,
    pub access_token: AccessToken,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated {
        user: User,
        access_token: AccessToken,
    },
}

impl Session {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated { user, .. } => Some(user),
        }
    }

    #[must_use]
    pub fn access_token(&self) -> Option<&AccessToken> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated { access_token, .. } => Some(access_token),
        }
    }
}

impl From<AuthGrant> for Session {
    fn from(grant: AuthGrant) -> Self {
        Self::Authenticated {
            user: grant.user,
            access_token: grant.access_token,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Register,
    Login,
    Refresh,
    Logout,
}

impl Operation {
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Register => "/auth/register",
            Self::Login => "/auth/login",
            Self::Refresh => "/auth/refresh",
            Self::Logout => "/auth/logout",
        }
    }

    /// The only status code that can move the session forward.
    #[must_use]
    pub const fn success_status(self) -> u16 {
        match self {
            Self::Register => 201,
            Self::Login | Self::Refresh => 200,
            Self::Logout => 204,
        }
    }

    #[must_use]
    pub const fn success_message(self) -> &'static str {
        match self {
            Self::Register => "Registered",
            Self::Login => "Logged in",
            Self::Refresh => "Refreshed",
            Self::Logout => "Logged out",
        }
    }

    /// Status message shown for a failed operation.
    #[must_use]
    pub fn failure_message(self, error: &AuthError) -> String {
        match (self, error) {
            (_, AuthError::Validation) => "Invalid payload".to_string(),
            (_, AuthError::Conflict) => "Email already exists".to_string(),
            (Self::Login, AuthError::Unauthorized) => "Invalid credentials".to_string(),
            (Self::Refresh, AuthError::Unauthorized) => "No/invalid refresh cookie".to_string(),
            (_, AuthError::Unauthorized) => "Error: 401".to_string(),
            (_, AuthError::UnknownStatus(status) | AuthError::MalformedResponse(status)) => {
                format!("Error: {status}")
            }
            (_, AuthError::Network(_)) => "Error: network".to_string(),
            (_, AuthError::Busy) => "Another auth operation is in progress".to_string(),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::Login => "login",
            Self::Refresh => "refresh",
            Self::Logout => "logout",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
