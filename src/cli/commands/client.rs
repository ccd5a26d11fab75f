use clap::{Arg, Command};

pub const ARG_API_URL: &str = "api-url";
pub const ARG_SITE_URL: &str = "site-url";
pub const ARG_STATE_DIR: &str = "state-dir";
pub const ARG_TIMEOUT: &str = "timeout";

/// Where the backend and the gateway live, and where the session is kept.
#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_API_URL)
                .long(ARG_API_URL)
                .help("Backend base URL")
                .env("AUTHGATE_API_URL")
                .default_value("http://localhost:8000")
                .global(true),
        )
        .arg(
            Arg::new(ARG_SITE_URL)
                .long(ARG_SITE_URL)
                .help("Front-end site URL the session cookie is scoped to")
                .env("AUTHGATE_SITE_URL")
                .default_value("http://localhost:3000")
                .global(true),
        )
        .arg(
            Arg::new(ARG_STATE_DIR)
                .long(ARG_STATE_DIR)
                .help("Directory holding storage.json with the session token")
                .env("AUTHGATE_STATE_DIR")
                .default_value(".authgate")
                .global(true),
        )
        .arg(
            Arg::new(ARG_TIMEOUT)
                .long(ARG_TIMEOUT)
                .help("Backend request timeout in seconds")
                .env("AUTHGATE_TIMEOUT")
                .default_value("10")
                .value_parser(clap::value_parser!(u64).range(1..))
                .global(true),
        )
}
