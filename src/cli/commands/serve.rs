use crate::guard::{DEFAULT_LOGIN_PATH, DEFAULT_PROTECTED};
use clap::{Arg, Command};

pub const ARG_PORT: &str = "port";
pub const ARG_ASSETS: &str = "assets";
pub const ARG_LOGIN_PATH: &str = "login-path";
pub const ARG_PROTECTED: &str = "protected";

#[must_use]
pub fn with_subcommand(command: Command) -> Command {
    command.subcommand(
        Command::new("serve")
            .about("Serve the front-end bundle behind the route guard")
            .arg(
                Arg::new(ARG_PORT)
                    .short('p')
                    .long(ARG_PORT)
                    .help("Port to listen on")
                    .default_value("3000")
                    .env("AUTHGATE_PORT")
                    .value_parser(clap::value_parser!(u16)),
            )
            .arg(
                Arg::new(ARG_ASSETS)
                    .long(ARG_ASSETS)
                    .help("Directory with the static front-end bundle")
                    .default_value("public")
                    .env("AUTHGATE_ASSETS"),
            )
            .arg(
                Arg::new(ARG_LOGIN_PATH)
                    .long(ARG_LOGIN_PATH)
                    .help("Where requests without a session are redirected")
                    .default_value(DEFAULT_LOGIN_PATH)
                    .env("AUTHGATE_LOGIN_PATH"),
            )
            .arg(
                Arg::new(ARG_PROTECTED)
                    .long(ARG_PROTECTED)
                    .help("Comma separated path patterns that need a session")
                    .long_help(
                        "Comma separated path patterns that need a session. `/dashboard`, `/dashboard/*` and `/dashboard/:path*` all cover /dashboard and everything below it.",
                    )
                    .env("AUTHGATE_PROTECTED")
                    .value_delimiter(',')
                    .default_values(DEFAULT_PROTECTED),
            ),
    )
}
