//! Drives the real command tree (`commands::new` -> `dispatch::handler` ->
//! `actions::session::handle`) against the mock auth service, with the refresh
//! handle persisted to a temporary file between invocations.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use authsession::cli::{
    actions::{self, Action},
    commands, dispatch,
    globals::GlobalArgs,
};
use common::{spawn_server, MockState, EMAIL, PASSWORD};
use std::{net::SocketAddr, path::Path, process::ExitCode};

const CLEARED: [(&str, Option<&str>); 9] = [
    ("AUTHSESSION_BASE_URL", None),
    ("AUTHSESSION_STORE", None),
    ("AUTHSESSION_TIMEOUT", None),
    ("AUTHSESSION_REFRESH_COOKIE", None),
    ("AUTHSESSION_ATTACH_BEARER_TOKEN", None),
    ("AUTHSESSION_EMAIL", None),
    ("AUTHSESSION_PASSWORD", None),
    ("AUTHSESSION_LOG_LEVEL", None),
    ("AUTHSESSION_LOG_JSON", None),
];

fn parse(addr: SocketAddr, store: &Path, command: &[&str]) -> (Action, GlobalArgs) {
    let base_url = format!("http://{addr}");
    let store = store.display().to_string();

    let mut argv = vec![
        "authsession",
        "--base-url",
        base_url.as_str(),
        "--store",
        store.as_str(),
    ];
    argv.extend_from_slice(command);

    temp_env::with_vars(CLEARED, || {
        let matches = commands::new().try_get_matches_from(argv).unwrap();
        dispatch::handler(&matches).unwrap()
    })
}

async fn run(addr: SocketAddr, store: &Path, command: &[&str]) -> ExitCode {
    let (action, globals) = parse(addr, store, command);
    actions::session::handle(action, &globals).await.unwrap()
}

#[tokio::test]
async fn login_refresh_logout_through_cli() {
    let (addr, _) = spawn_server(MockState::default().with_user("u1", EMAIL, PASSWORD)).await;
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("session").join("refresh.json");

    let code = run(addr, &store, &["login", "--email", EMAIL, "--password", PASSWORD]).await;
    assert_eq!(code, ExitCode::SUCCESS);
    assert!(store.exists());

    let code = run(addr, &store, &["refresh"]).await;
    assert_eq!(code, ExitCode::SUCCESS);

    let code = run(addr, &store, &["logout"]).await;
    assert_eq!(code, ExitCode::SUCCESS);
    assert!(!store.exists());

    let code = run(addr, &store, &["logout"]).await;
    assert_eq!(code, ExitCode::FAILURE);
}

#[tokio::test]
async fn failed_login_exits_non_zero_without_storing() {
    let (addr, _) = spawn_server(MockState::default().with_user("u1", EMAIL, PASSWORD)).await;
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("refresh.json");

    let code = run(addr, &store, &["login", "--email", EMAIL, "--password", "wrong"]).await;

    assert_eq!(code, ExitCode::FAILURE);
    assert!(!store.exists());
}

#[tokio::test]
async fn register_through_cli_persists_handle() {
    let (addr, _) = spawn_server(MockState::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("refresh.json");

    let code = run(
        addr,
        &store,
        &["register", "--email", "new@test.com", "--password", PASSWORD],
    )
    .await;

    assert_eq!(code, ExitCode::SUCCESS);
    assert!(store.exists());
}

#[test]
fn status_command_dispatches_to_status_action() {
    let dir = tempfile::tempdir().unwrap();
    let addr: SocketAddr = "127.0.0.1:9".parse().unwrap();
    let (action, globals) = parse(addr, &dir.path().join("refresh.json"), &["status"]);

    assert!(matches!(action, Action::Status));
    assert_eq!(actions::status::handle(&globals).unwrap(), ExitCode::SUCCESS);
}
