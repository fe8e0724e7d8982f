pub mod session;

use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        BoolishValueParser,
    },
    Arg, ArgAction, ColorChoice, Command,
};

pub const ARG_VERBOSITY: &str = "verbosity";
pub const ARG_LOG_JSON: &str = "log-json";

pub const CMD_REGISTER: &str = "register";
pub const CMD_LOGIN: &str = "login";
pub const CMD_REFRESH: &str = "refresh";
pub const CMD_LOGOUT: &str = "logout";
pub const CMD_STATUS: &str = "status";

/// Accepts a level name or a number between 0 and 5.
/// # Errors
/// Returns an error string for anything else.
pub fn parse_log_level(level: &str) -> Result<u8, String> {
    if let Ok(parsed) = level.parse::<u8>() {
        if parsed <= 5 {
            return Ok(parsed);
        }
    }

    match level.to_lowercase().as_str() {
        "error" => Ok(0),
        "warn" => Ok(1),
        "info" => Ok(2),
        "debug" => Ok(3),
        "trace" => Ok(4),
        _ => Err("invalid log level".to_string()),
    }
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("authsession")
        .about("Register, log in, refresh and log out against an auth service")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new(ARG_VERBOSITY)
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("AUTHSESSION_LOG_LEVEL")
                .global(true)
                .action(ArgAction::Count)
                .value_parser(parse_log_level),
        )
        .arg(
            Arg::new(ARG_LOG_JSON)
                .long(ARG_LOG_JSON)
                .help("Write logs to stderr as JSON lines")
                .env("AUTHSESSION_LOG_JSON")
                .global(true)
                .action(ArgAction::SetTrue)
                .value_parser(BoolishValueParser::new()),
        );

    let command = session::with_args(command);

    command
        .subcommand(
            with_credential_args(Command::new(CMD_REGISTER))
                .about("Create an account and start a session"),
        )
        .subcommand(
            with_credential_args(Command::new(CMD_LOGIN))
                .about("Start a session with email and password"),
        )
        .subcommand(
            Command::new(CMD_REFRESH).about("Exchange the stored refresh session for a new access token"),
        )
        .subcommand(Command::new(CMD_LOGOUT).about("End the session and forget the refresh handle"))
        .subcommand(Command::new(CMD_STATUS).about("Show configuration and stored refresh handle"))
}

fn with_credential_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("email")
                .short('e')
                .long("email")
                .help("Account email")
                .env("AUTHSESSION_EMAIL")
                .required(true),
        )
        .arg(
            Arg::new("password")
                .short('p')
                .long("password")
                .help("Account password")
                .env("AUTHSESSION_PASSWORD")
                .hide_env_values(true)
                .required(true),
        )
}
