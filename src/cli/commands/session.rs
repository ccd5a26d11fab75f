use clap::{Arg, Command};

pub const ARG_EMAIL: &str = "email";
pub const ARG_USERNAME: &str = "username";
pub const ARG_PASSWORD: &str = "password";
pub const ARG_CONFIRM_PASSWORD: &str = "confirm-password";
pub const ARG_ID_TOKEN: &str = "id-token";
pub const ARG_REDIRECT: &str = "redirect";
pub const ARG_PATH: &str = "path";

fn email() -> Arg {
    Arg::new(ARG_EMAIL)
        .short('e')
        .long(ARG_EMAIL)
        .help("Account email")
        .env("AUTHGATE_EMAIL")
        .required(true)
}

fn password() -> Arg {
    Arg::new(ARG_PASSWORD)
        .long(ARG_PASSWORD)
        .help("Account password")
        .env("AUTHGATE_PASSWORD")
        .hide_env_values(true)
        .required(true)
}

fn redirect() -> Arg {
    Arg::new(ARG_REDIRECT)
        .long(ARG_REDIRECT)
        .help("Page to land on after signing in")
        .default_value("/dashboard")
}

#[must_use]
pub fn with_subcommands(command: Command) -> Command {
    command
        .subcommand(
            Command::new("login")
                .about("Sign in with email and password")
                .arg(email())
                .arg(password())
                .arg(redirect()),
        )
        .subcommand(
            Command::new("register")
                .about("Create an account")
                .arg(email())
                .arg(
                    Arg::new(ARG_USERNAME)
                        .short('u')
                        .long(ARG_USERNAME)
                        .help("Account username")
                        .env("AUTHGATE_USERNAME")
                        .required(true),
                )
                .arg(password())
                .arg(
                    Arg::new(ARG_CONFIRM_PASSWORD)
                        .long(ARG_CONFIRM_PASSWORD)
                        .help("Password confirmation")
                        .env("AUTHGATE_CONFIRM_PASSWORD")
                        .hide_env_values(true)
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("oauth")
                .about("Exchange a Google ID token for a session")
                .arg(
                    Arg::new(ARG_ID_TOKEN)
                        .long(ARG_ID_TOKEN)
                        .help("Google ID token")
                        .env("AUTHGATE_ID_TOKEN")
                        .hide_env_values(true)
                        .required(true),
                )
                .arg(redirect()),
        )
        .subcommand(Command::new("logout").about("End the session"))
        .subcommand(Command::new("status").about("Show whether a session token is stored"))
        .subcommand(Command::new("check").about("Verify the stored session with the backend"))
        .subcommand(
            Command::new("visit")
                .about("Request a site path with the session cookie and show what the guard did")
                .arg(
                    Arg::new(ARG_PATH)
                        .help("Site path, for example /dashboard")
                        .required(true),
                ),
        )
}
