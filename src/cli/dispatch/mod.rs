//! Maps validated CLI matches to an [`Action`] and the shared [`GlobalArgs`].

use crate::{
    cli::{
        actions::Action,
        commands::{
            session::{ARG_ATTACH_BEARER_TOKEN, ARG_BASE_URL, ARG_REFRESH_COOKIE, ARG_STORE, ARG_TIMEOUT},
            CMD_LOGIN, CMD_LOGOUT, CMD_REFRESH, CMD_REGISTER, CMD_STATUS,
        },
        globals::GlobalArgs,
    },
    config::{timeout_from_secs, DEFAULT_REFRESH_COOKIE, DEFAULT_TIMEOUT},
    store::FileStore,
};
use anyhow::{anyhow, Context, Result};
use secrecy::SecretString;
use std::path::PathBuf;

/// # Errors
/// Returns an error if required arguments are missing or no store location
/// can be determined.
pub fn handler(matches: &clap::ArgMatches) -> Result<(Action, GlobalArgs)> {
    let globals = globals(matches)?;

    let action = match matches.subcommand() {
        Some((CMD_REGISTER, sub)) => {
            let (email, password) = credentials(sub)?;
            Action::Register { email, password }
        }
        Some((CMD_LOGIN, sub)) => {
            let (email, password) = credentials(sub)?;
            Action::Login { email, password }
        }
        Some((CMD_REFRESH, _)) => Action::Refresh,
        Some((CMD_LOGOUT, _)) => Action::Logout,
        Some((CMD_STATUS, _)) => Action::Status,
        Some((other, _)) => return Err(anyhow!("unknown command: {other}")),
        None => return Err(anyhow!("missing command")),
    };

    Ok((action, globals))
}

fn globals(matches: &clap::ArgMatches) -> Result<GlobalArgs> {
    let base_url = matches
        .get_one::<String>(ARG_BASE_URL)
        .cloned()
        .context("missing required argument: --base-url")?;

    let store_path = match matches.get_one::<PathBuf>(ARG_STORE) {
        Some(path) => path.clone(),
        None => FileStore::default_path()?,
    };

    let mut globals = GlobalArgs::new(base_url, store_path);
    globals.attach_bearer_token = matches.get_flag(ARG_ATTACH_BEARER_TOKEN);
    globals.timeout = matches
        .get_one::<u64>(ARG_TIMEOUT)
        .copied()
        .map_or(Some(DEFAULT_TIMEOUT), timeout_from_secs);
    globals.refresh_cookie = matches
        .get_one::<String>(ARG_REFRESH_COOKIE)
        .cloned()
        .unwrap_or_else(|| DEFAULT_REFRESH_COOKIE.to_string());

    Ok(globals)
}

fn credentials(matches: &clap::ArgMatches) -> Result<(String, SecretString)> {
    let email = matches
        .get_one::<String>("email")
        .cloned()
        .context("missing required argument: --email")?;
    let password = matches
        .get_one::<String>("password")
        .cloned()
        .map(SecretString::from)
        .context("missing required argument: --password")?;

    Ok((email, password))
}
