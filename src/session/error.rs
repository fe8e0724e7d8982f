use crate::api::TransportError;
use thiserror::Error;

/// Why an auth operation did not produce its success transition. Every
/// variant is resolved at the operation boundary into a status message; none
/// is returned to callers as an `Err`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// 400: the server rejected the payload.
    #[error("payload rejected by server")]
    Validation,
    /// 409 on register: the email is already registered.
    #[error("email already registered")]
    Conflict,
    /// 401: bad credentials, or a missing/expired refresh session.
    #[error("not authorized")]
    Unauthorized,
    #[error("unexpected status {0}")]
    UnknownStatus(u16),
    /// The success status arrived without a usable `{user, accessToken}` body.
    #[error("status {0} without a usable body")]
    MalformedResponse(u16),
    #[error("network error: {0}")]
    Network(String),
    #[error("another auth operation is in progress")]
    Busy,
}

impl From<TransportError> for AuthError {
    fn from(err: TransportError) -> Self {
        Self::Network(err.to_string())
    }
}
