use crate::{
    cli::{actions::Action, globals::GlobalArgs},
    session::{SessionClient, Transition},
    store::FileStore,
};
use anyhow::{anyhow, Result};
use std::{process::ExitCode, sync::Arc};

/// Run one auth operation and print its status message.
/// # Errors
/// Returns an error if the client cannot be configured. Operation failures are
/// reported through the message and a non-zero exit code.
pub async fn handle(action: Action, globals: &GlobalArgs) -> Result<ExitCode> {
    let store = Arc::new(FileStore::new(globals.store_path.clone()));
    let client = SessionClient::new(globals.client_config()?, store)?;

    let transition = match action {
        Action::Register { email, password } => client.register(&email, &password).await,
        Action::Login { email, password } => client.login(&email, &password).await,
        Action::Refresh => client.refresh().await,
        Action::Logout => client.logout().await,
        Action::Status => return Err(anyhow!("status is not a session operation")),
    };

    print!("{}", render(&transition));

    Ok(if transition.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Status message, plus the account when the result is authenticated.
fn render(transition: &Transition) -> String {
    let mut output = format!("{}\n", transition.message);

    if transition.is_success() {
        if let Some(user) = transition.session.user() {
            output.push_str(&format!(
                "user: {} <{}> created {}\n",
                user.id, user.email, user.created_at
            ));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{AccessToken, AuthError, Operation, Session, User};

    #[test]
    fn render_shows_user_on_success() {
        let transition = Transition {
            operation: Operation::Login,
            session: Session::Authenticated {
                user: User {
                    id: "u1".to_string(),
                    email: "a@test.com".to_string(),
                    created_at: "2024-01-01T00:00:00Z".to_string(),
                },
                access_token: AccessToken::new("tok1"),
            },
            message: "Logged in".to_string(),
            outcome: Ok(()),
        };

        let output = render(&transition);
        assert_eq!(
            output,
            "Logged in\nuser: u1 <a@test.com> created 2024-01-01T00:00:00Z\n"
        );
        assert!(!output.contains("tok1"));
    }

    #[test]
    fn render_failure_is_message_only() {
        let transition =
            Transition::rejected(Operation::Refresh, &Session::Anonymous, AuthError::Unauthorized);
        assert_eq!(render(&transition), "No/invalid refresh cookie\n");
    }
}
