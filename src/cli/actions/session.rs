use crate::{
    api::{ApiClient, ApiConfig},
    auth::{AuthService, LoginCredentials, Registration},
    forms::{self, LOGIN_PATH},
    navigation::{HistoryRouter, Navigator},
    token::{CookieTokenStore, FileTokenStore},
    APP_USER_AGENT,
};
use anyhow::{bail, Context, Result};
use reqwest::{cookie::Jar, header::LOCATION, redirect::Policy};
use secrecy::SecretString;
use std::{path::PathBuf, sync::Arc, time::Duration};
use tracing::debug;
use url::Url;

/// Where the backend and the site live and where the session is kept.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_url: Url,
    pub site_url: Url,
    pub state_dir: PathBuf,
    pub timeout: Duration,
}

#[derive(Debug)]
pub enum SessionCommand {
    Login {
        credentials: LoginCredentials,
        redirect: String,
    },
    Register(Registration),
    OAuth {
        id_token: SecretString,
        redirect: String,
    },
    Logout,
    Status,
    Check,
    Visit(String),
}

#[derive(Debug)]
pub struct Args {
    pub client: ClientConfig,
    pub command: SessionCommand,
}

/// One client context: the stored token, its cookie mirror and a history
/// the submit flows navigate in.
struct Session {
    service: AuthService,
    navigator: Navigator,
    history: Arc<HistoryRouter>,
    storage: FileTokenStore,
    jar: Arc<Jar>,
    config: ClientConfig,
}

impl Session {
    fn open(config: ClientConfig) -> Result<Self> {
        let storage = FileTokenStore::in_dir(&config.state_dir);
        let jar = Arc::new(Jar::default());
        let cookie = CookieTokenStore::new(jar.clone(), config.site_url.clone());

        let api = ApiClient::new(
            ApiConfig::new(config.api_url.clone()).with_timeout(config.timeout),
            Arc::new(storage.clone()),
        )
        .context("Failed to build HTTP client")?;

        let service = AuthService::new(Arc::new(api)).with_cookie(Arc::new(cookie));
        service
            .hydrate()
            .context("Failed to restore the session cookie")?;

        let history = Arc::new(HistoryRouter::starting_at(LOGIN_PATH));
        let navigator = Navigator::new();
        navigator.register(history.clone());

        Ok(Self {
            service,
            navigator,
            history,
            storage,
            jar,
            config,
        })
    }

    fn landed_on(&self) -> String {
        self.history.current().unwrap_or_else(|| LOGIN_PATH.to_string())
    }

    async fn visit(&self, path: &str) -> Result<()> {
        let url = self
            .config
            .site_url
            .join(path)
            .with_context(|| format!("Invalid path: {path}"))?;

        let client = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .cookie_provider(self.jar.clone())
            .redirect(Policy::none())
            .timeout(self.config.timeout)
            .build()?;

        let response = client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to reach {url}"))?;

        let status = response.status();
        debug!("GET {url} -> {status}");

        match response.headers().get(LOCATION).and_then(|v| v.to_str().ok()) {
            Some(location) if status.is_redirection() => {
                println!("{status} {path} -> {location}");
            }
            _ => println!("{status} {path}"),
        }

        Ok(())
    }
}

/// # Errors
/// Returns an error when validation or the backend call fails, or when
/// `check` finds the session invalid.
pub async fn execute(args: Args) -> Result<()> {
    let session = Session::open(args.client)?;
    let service = &session.service;
    let navigator = &session.navigator;

    match args.command {
        SessionCommand::Login {
            credentials,
            redirect,
        } => {
            let success =
                forms::submit_login(service, navigator, &credentials, Some(&redirect)).await?;
            match success.user_id {
                Some(id) => println!("Signed in as user {id}; now at {}", session.landed_on()),
                None => println!("Signed in; now at {}", session.landed_on()),
            }
        }
        SessionCommand::Register(registration) => {
            let success = forms::submit_register(service, navigator, &registration).await?;
            if success.authenticated() {
                println!("Registered and signed in; now at {}", session.landed_on());
            } else {
                println!(
                    "Registered. Sign in to continue; now at {}",
                    session.landed_on()
                );
            }
        }
        SessionCommand::OAuth { id_token, redirect } => {
            let success =
                forms::submit_oauth(service, navigator, &id_token, Some(&redirect)).await?;
            let greeting = if success.new_user {
                "Account created with Google"
            } else {
                "Signed in with Google"
            };
            println!("{greeting}; now at {}", session.landed_on());
        }
        SessionCommand::Logout => {
            service.logout().await;
            println!("Signed out");
        }
        SessionCommand::Status => {
            if service.is_authenticated() {
                println!(
                    "Authenticated (token stored in {})",
                    session.storage.path().display()
                );
            } else {
                println!("Not authenticated");
            }
        }
        SessionCommand::Check => {
            if !service.validate_auth().await {
                bail!("Session is not valid; sign in again");
            }
            println!("Session is valid");
        }
        SessionCommand::Visit(path) => session.visit(&path).await?,
    }

    Ok(())
}
