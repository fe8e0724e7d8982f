//! Pure classification of an operation's response into a session transition.
//! Nothing here performs I/O, so every edge of the state machine can be
//! exercised without a server.

use super::{AuthError, AuthGrant, Operation, Session};
use crate::api::{ApiResponse, TransportError};
use serde_json::Value;

/// Result of one operation: the session to install and the message to show.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub operation: Operation,
    pub session: Session,
    pub message: String,
    pub outcome: Result<(), AuthError>,
}

impl Transition {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// A failed operation: the current session is carried forward untouched.
    #[must_use]
    pub fn rejected(operation: Operation, current: &Session, error: AuthError) -> Self {
        Self {
            operation,
            session: current.clone(),
            message: operation.failure_message(&error),
            outcome: Err(error),
        }
    }

    fn accepted(operation: Operation, session: Session) -> Self {
        Self {
            operation,
            session,
            message: operation.success_message().to_string(),
            outcome: Ok(()),
        }
    }
}

/// What a successful response entitles the client to.
#[derive(Debug, PartialEq, Eq)]
pub enum Granted {
    Authenticated(AuthGrant),
    SignedOut,
}

/// Maps a response to its outcome by status code alone. The body is only
/// consulted on the operation's success code.
/// # Errors
/// Returns the classified [`AuthError`] for every non-success outcome.
pub fn classify(operation: Operation, response: ApiResponse<Value>) -> Result<Granted, AuthError> {
    let status = response.status;

    if status == operation.success_status() {
        if operation == Operation::Logout {
            return Ok(Granted::SignedOut);
        }

        return response
            .data
            .and_then(|data| serde_json::from_value::<AuthGrant>(data).ok())
            .map(Granted::Authenticated)
            .ok_or(AuthError::MalformedResponse(status));
    }

    Err(match (operation, status) {
        (Operation::Register, 409) => AuthError::Conflict,
        (Operation::Register | Operation::Login, 400) => AuthError::Validation,
        (Operation::Login | Operation::Refresh, 401) => AuthError::Unauthorized,
        _ => AuthError::UnknownStatus(status),
    })
}

/// Computes the next session from the current one and the transport result.
#[must_use]
pub fn apply(
    operation: Operation,
    current: &Session,
    result: Result<ApiResponse<Value>, TransportError>,
) -> Transition {
    let outcome = result
        .map_err(AuthError::from)
        .and_then(|response| classify(operation, response));

    match outcome {
        Ok(Granted::Authenticated(grant)) => Transition::accepted(operation, Session::from(grant)),
        Ok(Granted::SignedOut) => Transition::accepted(operation, Session::Anonymous),
        Err(error) => Transition::rejected(operation, current, error),
    }
}
