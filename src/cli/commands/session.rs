use crate::config::{DEFAULT_REFRESH_COOKIE, ENV_ATTACH_BEARER_TOKEN, ENV_BASE_URL, ENV_REFRESH_COOKIE, ENV_TIMEOUT};
use clap::{builder::BoolishValueParser, Arg, ArgAction, Command};
use std::path::PathBuf;

pub const ARG_BASE_URL: &str = "base-url";
pub const ARG_STORE: &str = "store";
pub const ARG_ATTACH_BEARER_TOKEN: &str = "attach-bearer-token";
pub const ARG_TIMEOUT: &str = "timeout";
pub const ARG_REFRESH_COOKIE: &str = "refresh-cookie";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_BASE_URL)
                .short('b')
                .long(ARG_BASE_URL)
                .help("Base origin of the auth service, example: https://auth.example.com")
                .env(ENV_BASE_URL)
                .required(true),
        )
        .arg(
            Arg::new(ARG_STORE)
                .long(ARG_STORE)
                .help("File holding the refresh handle (default: $HOME/.authsession/refresh.json)")
                .env("AUTHSESSION_STORE")
                .global(true)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new(ARG_ATTACH_BEARER_TOKEN)
                .long(ARG_ATTACH_BEARER_TOKEN)
                .help("Send the access token as an Authorization bearer header while authenticated")
                .env(ENV_ATTACH_BEARER_TOKEN)
                .global(true)
                .action(ArgAction::SetTrue)
                .value_parser(BoolishValueParser::new()),
        )
        .arg(
            Arg::new(ARG_TIMEOUT)
                .long(ARG_TIMEOUT)
                .help("Request timeout in seconds, 0 disables it")
                .env(ENV_TIMEOUT)
                .global(true)
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new(ARG_REFRESH_COOKIE)
                .long(ARG_REFRESH_COOKIE)
                .help("Name of the refresh-session cookie issued by the service")
                .env(ENV_REFRESH_COOKIE)
                .global(true)
                .default_value(DEFAULT_REFRESH_COOKIE),
        )
}
