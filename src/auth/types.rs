use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Backend paths. One convention throughout: leading slash, no trailing slash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    pub login: String,
    pub register: String,
    pub logout: String,
    pub check_auth: String,
    pub oauth_login: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            login: "/auth/login".to_string(),
            register: "/auth/register".to_string(),
            logout: "/auth/logout".to_string(),
            check_auth: "/auth/check-auth".to_string(),
            oauth_login: "/api/auth/login".to_string(),
        }
    }
}

/// Observable session state.
#[derive(Clone, Debug)]
pub enum AuthState {
    Unauthenticated,
    Authenticated(SecretString),
}

impl AuthState {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

#[derive(Clone)]
pub struct LoginCredentials {
    pub email: String,
    pub password: SecretString,
}

impl LoginCredentials {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }
}

impl std::fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Clone)]
pub struct Registration {
    pub email: String,
    pub username: String,
    pub password: SecretString,
    pub confirm_password: SecretString,
}

impl Registration {
    #[must_use]
    pub fn new(
        email: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            username: username.into(),
            password: SecretString::from(password.into()),
            confirm_password: SecretString::from(confirm_password.into()),
        }
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &"***")
            .field("confirm_password", &"***")
            .finish()
    }
}

/// Successful login or OAuth exchange.
#[derive(Clone, Debug)]
pub struct AuthSuccess {
    pub token: SecretString,
    pub user_id: Option<String>,
    /// Set by the OAuth exchange when the backend created the account.
    pub new_user: bool,
}

/// Successful registration. `token` is present only when the backend
/// logged the new user in.
#[derive(Clone, Debug)]
pub struct RegisterSuccess {
    pub token: Option<SecretString>,
    pub user_id: Option<String>,
}

impl RegisterSuccess {
    #[must_use]
    pub fn authenticated(&self) -> bool {
        self.token.is_some()
    }
}

#[derive(Serialize)]
pub(super) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

impl<'a> From<&'a LoginCredentials> for LoginRequest<'a> {
    fn from(credentials: &'a LoginCredentials) -> Self {
        Self {
            email: credentials.email.trim(),
            password: credentials.password.expose_secret(),
        }
    }
}

#[derive(Serialize)]
pub(super) struct RegisterRequest<'a> {
    pub email: &'a str,
    pub username: &'a str,
    pub password: &'a str,
}

impl<'a> From<&'a Registration> for RegisterRequest<'a> {
    fn from(registration: &'a Registration) -> Self {
        Self {
            email: registration.email.trim(),
            username: registration.username.trim(),
            password: registration.password.expose_secret(),
        }
    }
}

#[derive(Serialize)]
pub(super) struct OAuthRequest<'a> {
    pub token: &'a str,
}

/// Body returned by login, register and OAuth endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct SessionResponse {
    pub status: Option<String>,
    pub tokens: Option<TokenPair>,
    pub token: Option<String>,
    pub user: Option<UserSummary>,
    pub new_user: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct TokenPair {
    pub access: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct UserSummary {
    pub id: Option<Value>,
}

impl SessionResponse {
    /// Lenient parse: anything that is not the expected object reads as empty.
    pub fn from_body(body: &Value) -> Self {
        serde_json::from_value(body.clone()).unwrap_or_default()
    }

    /// `status`, when the backend sent one, must say `success`.
    pub fn reports_success(&self) -> bool {
        self.status
            .as_deref()
            .map_or(true, |status| status.eq_ignore_ascii_case("success"))
    }

    /// Access token from `tokens.access`, falling back to a top-level `token`.
    pub fn access_token(&self) -> Option<SecretString> {
        self.tokens
            .as_ref()
            .and_then(|tokens| tokens.access.as_deref())
            .or(self.token.as_deref())
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| SecretString::from(token.to_string()))
    }

    pub fn user_id(&self) -> Option<String> {
        match self.user.as_ref()?.id.as_ref()? {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn endpoints_have_no_trailing_slash() {
        let endpoints = Endpoints::default();
        for path in [
            &endpoints.login,
            &endpoints.register,
            &endpoints.logout,
            &endpoints.check_auth,
            &endpoints.oauth_login,
        ] {
            assert!(path.starts_with('/'));
            assert!(!path.ends_with('/'));
        }
    }

    #[test]
    fn session_response_reads_nested_access_token() {
        let response = SessionResponse::from_body(&json!({
            "status": "success",
            "user": {"id": 7, "email": "a@b.com"},
            "tokens": {"access": "T1", "refresh": "R1"},
        }));
        assert!(response.reports_success());
        assert_eq!(response.access_token().unwrap().expose_secret(), "T1");
        assert_eq!(response.user_id().as_deref(), Some("7"));
        assert!(!response.new_user);
    }

    #[test]
    fn session_response_falls_back_to_top_level_token() {
        let response = SessionResponse::from_body(&json!({"token": "T2", "user": {"id": "u-1"}}));
        assert_eq!(response.access_token().unwrap().expose_secret(), "T2");
        assert_eq!(response.user_id().as_deref(), Some("u-1"));
    }

    #[test]
    fn session_response_tolerates_unexpected_shapes() {
        assert!(SessionResponse::from_body(&Value::Null).access_token().is_none());
        assert!(SessionResponse::from_body(&json!(["x"])).access_token().is_none());
        let blank = SessionResponse::from_body(&json!({"tokens": {"access": "  "}}));
        assert!(blank.access_token().is_none());
        let failed = SessionResponse::from_body(&json!({"status": "error"}));
        assert!(!failed.reports_success());
    }

    #[test]
    fn login_request_trims_email_only() {
        let credentials = LoginCredentials::new(" a@b.com ", " secret1 ");
        let request = LoginRequest::from(&credentials);
        assert_eq!(request.email, "a@b.com");
        assert_eq!(request.password, " secret1 ");
    }

    #[test]
    fn debug_output_hides_passwords() {
        let credentials = LoginCredentials::new("a@b.com", "secret1");
        assert!(!format!("{credentials:?}").contains("secret1"));
        let registration = Registration::new("a@b.com", "alice", "secret1", "secret1");
        assert!(!format!("{registration:?}").contains("secret1"));
    }
}
