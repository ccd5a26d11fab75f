//! Credential validation and the submit flows behind the login, registration
//! and Google sign-in forms.
//!
//! Validation runs before any request; a form that fails it never reaches the
//! auth service.

use crate::{
    auth::{AuthService, AuthSuccess, LoginCredentials, RegisterSuccess, Registration, OAUTH_FAILED},
    error::{AuthFailure, ValidationErrors},
    navigation::Navigator,
};
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::{debug, instrument};

pub const DASHBOARD_PATH: &str = "/dashboard";
pub const LOGIN_PATH: &str = "/login";

const MIN_PASSWORD_LEN: usize = 6;
const MIN_USERNAME_LEN: usize = 3;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("{0}")]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Auth(#[from] AuthFailure),
}

impl FormError {
    /// Text a form shows above its fields.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Validation(errors) => errors
                .errors()
                .first()
                .map_or_else(String::new, |error| error.message.to_string()),
            Self::Auth(failure) => failure.reason.clone(),
        }
    }
}

#[must_use]
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").is_ok_and(|re| re.is_match(email))
}

fn valid_username(username: &str) -> bool {
    Regex::new(r"^[a-zA-Z0-9_]+$").is_ok_and(|re| re.is_match(username))
}

fn check_email(errors: &mut ValidationErrors, email: &str) {
    let email = email.trim();
    if email.is_empty() {
        errors.push("email", "Email is required");
    } else if !valid_email(email) {
        errors.push("email", "Invalid email address");
    }
}

fn check_password(errors: &mut ValidationErrors, password: &SecretString) {
    let password = password.expose_secret();
    if password.is_empty() {
        errors.push("password", "Password is required");
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push("password", "Password must be at least 6 characters");
    }
}

/// # Errors
/// Returns every field that failed, in form order.
pub fn validate_login(credentials: &LoginCredentials) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    check_email(&mut errors, &credentials.email);
    check_password(&mut errors, &credentials.password);
    errors.into_result()
}

/// # Errors
/// Returns every field that failed, in form order.
pub fn validate_registration(registration: &Registration) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    check_email(&mut errors, &registration.email);

    let username = registration.username.trim();
    if username.is_empty() {
        errors.push("username", "Username is required");
    } else if username.chars().count() < MIN_USERNAME_LEN {
        errors.push("username", "Username must be at least 3 characters");
    } else if !valid_username(username) {
        errors.push(
            "username",
            "Username can only contain letters, numbers, and underscores",
        );
    }

    check_password(&mut errors, &registration.password);

    let confirm = registration.confirm_password.expose_secret();
    if confirm.is_empty() {
        errors.push("confirm_password", "Please confirm your password");
    } else if confirm != registration.password.expose_secret() {
        errors.push("confirm_password", "Passwords do not match");
    }

    errors.into_result()
}

/// Validates, logs in, then replaces the current entry with `redirect`
/// (the dashboard by default).
///
/// # Errors
/// [`FormError::Validation`] before any request, [`FormError::Auth`] when the
/// backend call fails. Nothing navigates on error.
#[instrument(skip_all)]
pub async fn submit_login(
    service: &AuthService,
    navigator: &Navigator,
    credentials: &LoginCredentials,
    redirect: Option<&str>,
) -> Result<AuthSuccess, FormError> {
    validate_login(credentials)?;
    let success = service.login(credentials).await?;
    navigator.navigate(redirect.unwrap_or(DASHBOARD_PATH), true);
    Ok(success)
}

/// Validates and registers. Lands on the dashboard when the backend logged
/// the user in, otherwise sends them to the login page.
///
/// # Errors
/// [`FormError::Validation`] before any request, [`FormError::Auth`] when the
/// backend call fails.
#[instrument(skip_all)]
pub async fn submit_register(
    service: &AuthService,
    navigator: &Navigator,
    registration: &Registration,
) -> Result<RegisterSuccess, FormError> {
    validate_registration(registration)?;
    let success = service.register(registration).await?;

    if success.authenticated() {
        navigator.navigate(DASHBOARD_PATH, true);
    } else {
        debug!("Registered without a session; sending user to login");
        navigator.navigate(LOGIN_PATH, false);
    }

    Ok(success)
}

/// Exchanges a Google credential and lands on `redirect`.
///
/// # Errors
/// A blank credential fails validation; backend failures come back as
/// [`FormError::Auth`].
#[instrument(skip_all)]
pub async fn submit_oauth(
    service: &AuthService,
    navigator: &Navigator,
    id_token: &SecretString,
    redirect: Option<&str>,
) -> Result<AuthSuccess, FormError> {
    if id_token.expose_secret().trim().is_empty() {
        let mut errors = ValidationErrors::default();
        errors.push("id_token", OAUTH_FAILED);
        return Err(errors.into());
    }

    let success = service.oauth_login(id_token).await?;
    navigator.navigate(redirect.unwrap_or(DASHBOARD_PATH), true);
    Ok(success)
}
