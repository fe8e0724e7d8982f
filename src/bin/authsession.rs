use anyhow::Result;
use authsession::cli::{actions, actions::Action, start, telemetry};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let (action, globals) = start()?;

    let result = match action {
        Action::Status => actions::status::handle(&globals),
        action => actions::session::handle(action, &globals).await,
    };

    telemetry::shutdown_tracer();

    result
}
