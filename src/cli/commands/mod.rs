pub mod client;
pub mod logging;
pub mod serve;
pub mod session;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    ColorChoice, Command,
};

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

    let command = Command::new("authgate")
        .about("Client-side session gate: sign in, keep the token, guard routes")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true);

    let command = client::with_args(command);
    let command = session::with_subcommands(command);
    let command = serve::with_subcommand(command);
    logging::with_args(command)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const ENV: [&str; 9] = [
        "AUTHGATE_API_URL",
        "AUTHGATE_SITE_URL",
        "AUTHGATE_STATE_DIR",
        "AUTHGATE_TIMEOUT",
        "AUTHGATE_LOG_LEVEL",
        "AUTHGATE_EMAIL",
        "AUTHGATE_PASSWORD",
        "AUTHGATE_PROTECTED",
        "AUTHGATE_PORT",
    ];

    // Unsets every AUTHGATE_* variable the tests read, except those in `set`.
    fn with_env<F: FnOnce()>(set: &[(&str, &str)], f: F) {
        let mut vars: Vec<(&str, Option<&str>)> = ENV
            .iter()
            .filter(|name| !set.iter().any(|(key, _)| key == *name))
            .map(|name| (*name, None))
            .collect();
        vars.extend(set.iter().map(|(key, value)| (*key, Some(*value))));
        temp_env::with_vars(vars, f);
    }

    fn with_clean_env<F: FnOnce()>(f: F) {
        with_env(&[], f);
    }

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "authgate");
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_defaults() {
        with_clean_env(|| {
            let matches = new().get_matches_from(vec!["authgate", "status"]);
            assert_eq!(
                matches.get_one::<String>(client::ARG_API_URL).cloned(),
                Some("http://localhost:8000".to_string())
            );
            assert_eq!(
                matches.get_one::<String>(client::ARG_SITE_URL).cloned(),
                Some("http://localhost:3000".to_string())
            );
            assert_eq!(
                matches.get_one::<String>(client::ARG_STATE_DIR).cloned(),
                Some(".authgate".to_string())
            );
            assert_eq!(matches.get_one::<u64>(client::ARG_TIMEOUT).copied(), Some(10));
            assert_eq!(matches.subcommand_name(), Some("status"));
        });
    }

    #[test]
    fn test_global_args_after_subcommand() {
        with_clean_env(|| {
            let matches = new().get_matches_from(vec![
                "authgate",
                "check",
                "--api-url",
                "https://api.example.com",
                "--timeout",
                "3",
                "-vv",
            ]);
            assert_eq!(
                matches.get_one::<String>(client::ARG_API_URL).cloned(),
                Some("https://api.example.com".to_string())
            );
            assert_eq!(matches.get_one::<u64>(client::ARG_TIMEOUT).copied(), Some(3));
            assert_eq!(
                matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                Some(2)
            );
        });
    }

    #[test]
    fn test_login_args() {
        with_clean_env(|| {
            let matches = new().get_matches_from(vec![
                "authgate",
                "login",
                "--email",
                "a@b.com",
                "--password",
                "secret1",
            ]);
            let (name, sub) = matches.subcommand().unwrap();
            assert_eq!(name, "login");
            assert_eq!(
                sub.get_one::<String>(session::ARG_EMAIL).cloned(),
                Some("a@b.com".to_string())
            );
            assert_eq!(
                sub.get_one::<String>(session::ARG_REDIRECT).cloned(),
                Some("/dashboard".to_string())
            );
        });
    }

    #[test]
    fn test_login_requires_password() {
        with_clean_env(|| {
            let result =
                new().try_get_matches_from(vec!["authgate", "login", "--email", "a@b.com"]);
            assert_eq!(
                result.map_err(|e| e.kind()).err(),
                Some(clap::error::ErrorKind::MissingRequiredArgument)
            );
        });
    }

    #[test]
    fn test_missing_subcommand_fails() {
        with_clean_env(|| {
            let result = new().try_get_matches_from(vec!["authgate", "--timeout", "5"]);
            assert!(result.is_err());
        });
    }

    #[test]
    fn test_check_env() {
        with_env(
            &[
                ("AUTHGATE_API_URL", "https://api.example.com"),
                ("AUTHGATE_STATE_DIR", "/tmp/authgate"),
                ("AUTHGATE_EMAIL", "a@b.com"),
                ("AUTHGATE_PASSWORD", "secret1"),
                ("AUTHGATE_LOG_LEVEL", "info"),
            ],
            || {
                let matches = new().get_matches_from(vec!["authgate", "login"]);
                assert_eq!(
                    matches.get_one::<String>(client::ARG_API_URL).cloned(),
                    Some("https://api.example.com".to_string())
                );
                assert_eq!(
                    matches.get_one::<String>(client::ARG_STATE_DIR).cloned(),
                    Some("/tmp/authgate".to_string())
                );
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );
                let (_, sub) = matches.subcommand().unwrap();
                assert_eq!(
                    sub.get_one::<String>(session::ARG_PASSWORD).cloned(),
                    Some("secret1".to_string())
                );
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            with_env(&[("AUTHGATE_LOG_LEVEL", level)], || {
                let matches = new().get_matches_from(vec!["authgate", "status"]);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }

    #[test]
    fn test_serve_protected_list() {
        with_clean_env(|| {
            let matches = new().get_matches_from(vec!["authgate", "serve"]);
            let (_, sub) = matches.subcommand().unwrap();
            let protected: Vec<&String> =
                sub.get_many::<String>(serve::ARG_PROTECTED).unwrap().collect();
            assert_eq!(protected, ["/dashboard/*", "/profile/*"]);
            assert_eq!(sub.get_one::<u16>(serve::ARG_PORT).copied(), Some(3000));

            let matches = new().get_matches_from(vec![
                "authgate",
                "serve",
                "--protected",
                "/app/*,/settings",
                "--port",
                "8080",
            ]);
            let (_, sub) = matches.subcommand().unwrap();
            let protected: Vec<&String> =
                sub.get_many::<String>(serve::ARG_PROTECTED).unwrap().collect();
            assert_eq!(protected, ["/app/*", "/settings"]);
            assert_eq!(sub.get_one::<u16>(serve::ARG_PORT).copied(), Some(8080));
        });
    }
}
