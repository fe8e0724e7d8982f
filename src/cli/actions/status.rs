use crate::{
    cli::globals::GlobalArgs,
    store::{FileStore, RefreshHandleStore},
    GIT_COMMIT_HASH,
};
use anyhow::Result;
use std::process::ExitCode;

/// Print the effective configuration and whether a refresh handle is stored.
/// Never contacts the server and never prints the handle itself.
/// # Errors
/// Returns an error if the base URL is invalid or the store cannot be read.
pub fn handle(globals: &GlobalArgs) -> Result<ExitCode> {
    let config = globals.client_config()?;
    let store = FileStore::new(globals.store_path.clone());
    let handle = store.load()?;

    print!("{}", render(globals, config.base_url.as_str(), handle.is_some()));

    Ok(ExitCode::SUCCESS)
}

fn render(globals: &GlobalArgs, base_url: &str, has_handle: bool) -> String {
    let timeout = globals
        .timeout
        .map_or_else(|| "none".to_string(), |timeout| format!("{}s", timeout.as_secs()));

    format!(
        "{} {} ({})\nbase url: {}\nstore: {}\nrefresh handle: {}\nattach bearer token: {}\ntimeout: {}\n",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        GIT_COMMIT_HASH,
        base_url,
        globals.store_path.display(),
        if has_handle { "present" } else { "absent" },
        globals.attach_bearer_token,
        timeout,
    )
}
