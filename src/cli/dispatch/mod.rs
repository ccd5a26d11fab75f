use crate::{
    auth::{LoginCredentials, Registration},
    cli::{
        actions::{
            server,
            session::{self, ClientConfig, SessionCommand},
            Action,
        },
        commands::{client, serve, session as session_args},
    },
    gateway::GatewayConfig,
    guard::{ProtectedPaths, RouteGuard},
};
use anyhow::{anyhow, Context, Result};
use clap::ArgMatches;
use secrecy::SecretString;
use std::{path::PathBuf, time::Duration};
use url::Url;

fn required(matches: &ArgMatches, id: &str) -> Result<String> {
    matches
        .get_one::<String>(id)
        .cloned()
        .with_context(|| format!("missing required argument: --{id}"))
}

fn parse_url(matches: &ArgMatches, id: &str) -> Result<Url> {
    let value = required(matches, id)?;
    Url::parse(&value).with_context(|| format!("invalid --{id}: {value}"))
}

/// # Errors
/// Returns an error if a URL does not parse or a required argument is missing.
pub fn client_config(matches: &ArgMatches) -> Result<ClientConfig> {
    Ok(ClientConfig {
        api_url: parse_url(matches, client::ARG_API_URL)?,
        site_url: parse_url(matches, client::ARG_SITE_URL)?,
        state_dir: PathBuf::from(required(matches, client::ARG_STATE_DIR)?),
        timeout: Duration::from_secs(
            matches
                .get_one::<u64>(client::ARG_TIMEOUT)
                .copied()
                .unwrap_or(10),
        ),
    })
}

/// # Errors
/// Returns an error if required arguments are missing.
pub fn gateway_config(matches: &ArgMatches) -> Result<GatewayConfig> {
    let protected = ProtectedPaths::new(
        matches
            .get_many::<String>(serve::ARG_PROTECTED)
            .into_iter()
            .flatten(),
    );
    let guard =
        RouteGuard::new(protected).with_login_path(required(matches, serve::ARG_LOGIN_PATH)?);

    Ok(GatewayConfig {
        port: matches.get_one::<u16>(serve::ARG_PORT).copied().unwrap_or(3000),
        assets: PathBuf::from(required(matches, serve::ARG_ASSETS)?),
        guard,
    })
}

fn session_command(name: &str, sub: &ArgMatches) -> Result<SessionCommand> {
    let command = match name {
        "login" => SessionCommand::Login {
            credentials: LoginCredentials::new(
                required(sub, session_args::ARG_EMAIL)?,
                required(sub, session_args::ARG_PASSWORD)?,
            ),
            redirect: required(sub, session_args::ARG_REDIRECT)?,
        },
        "register" => SessionCommand::Register(Registration::new(
            required(sub, session_args::ARG_EMAIL)?,
            required(sub, session_args::ARG_USERNAME)?,
            required(sub, session_args::ARG_PASSWORD)?,
            required(sub, session_args::ARG_CONFIRM_PASSWORD)?,
        )),
        "oauth" => SessionCommand::OAuth {
            id_token: SecretString::from(required(sub, session_args::ARG_ID_TOKEN)?),
            redirect: required(sub, session_args::ARG_REDIRECT)?,
        },
        "logout" => SessionCommand::Logout,
        "status" => SessionCommand::Status,
        "check" => SessionCommand::Check,
        "visit" => SessionCommand::Visit(required(sub, session_args::ARG_PATH)?),
        other => return Err(anyhow!("unknown subcommand: {other}")),
    };

    Ok(command)
}

/// # Errors
/// Returns an error if required arguments are missing or invalid.
pub fn handler(matches: &ArgMatches) -> Result<Action> {
    let (name, sub) = matches
        .subcommand()
        .context("missing subcommand, see --help")?;

    if name == "serve" {
        return Ok(Action::Server(server::Args {
            gateway: gateway_config(sub)?,
        }));
    }

    Ok(Action::Session(session::Args {
        client: client_config(matches)?,
        command: session_command(name, sub)?,
    }))
}
