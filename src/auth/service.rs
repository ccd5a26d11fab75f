use super::types::{
    AuthState, AuthSuccess, Endpoints, LoginCredentials, LoginRequest, OAuthRequest,
    RegisterRequest, RegisterSuccess, Registration, SessionResponse,
};
use crate::{
    api::ApiClient,
    error::{ApiError, AuthFailure, StoreError},
    token::TokenStore,
};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub const LOGIN_FAILED: &str = "Login failed. Please try again.";
pub const REGISTER_FAILED: &str = "Registration failed. Please try again.";
pub const OAUTH_FAILED: &str = "Google login failed. Please try again.";
const SESSION_SAVE_FAILED: &str = "Unable to save your session. Please try again.";

/// Login, registration, OAuth exchange, logout and session checks against
/// the backend.
///
/// The storage token store is the one the [`ApiClient`] reads its bearer
/// credential from. The optional cookie store mirrors it for the route
/// guard; every change to the token goes to both.
pub struct AuthService {
    api: Arc<ApiClient>,
    storage: Arc<dyn TokenStore>,
    cookie: Option<Arc<dyn TokenStore>>,
    endpoints: Endpoints,
}

impl AuthService {
    #[must_use]
    pub fn new(api: Arc<ApiClient>) -> Self {
        let storage = api.tokens();
        Self {
            api,
            storage,
            cookie: None,
            endpoints: Endpoints::default(),
        }
    }

    #[must_use]
    pub fn with_cookie(mut self, cookie: Arc<dyn TokenStore>) -> Self {
        self.cookie = Some(cookie);
        self
    }

    #[must_use]
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    #[must_use]
    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    #[must_use]
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    #[must_use]
    pub fn state(&self) -> AuthState {
        self.storage
            .read()
            .map_or(AuthState::Unauthenticated, AuthState::Authenticated)
    }

    /// Local, non-authoritative check: a token is stored. A stale token
    /// still counts; use [`Self::validate_auth`] to ask the backend.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.storage.is_present()
    }

    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.storage.read()
    }

    /// Drops the local token (storage, cookie and session default) without
    /// telling the backend.
    pub fn clear_token(&self) {
        self.forget();
    }

    /// Copies the stored token into the cookie mirror, for a cookie jar that
    /// starts empty while storage survived from an earlier run.
    ///
    /// # Errors
    /// Returns an error if the cookie store rejects the token.
    pub fn hydrate(&self) -> Result<(), StoreError> {
        let Some(cookie) = &self.cookie else {
            return Ok(());
        };
        match self.storage.read() {
            Some(token) => cookie.save(&token),
            None => cookie.clear(),
        }
    }

    /// Sends credentials to the login endpoint and persists the returned
    /// token. On failure the stored token is left untouched.
    ///
    /// # Errors
    /// Returns [`AuthFailure`] carrying the server reason (or a generic one)
    /// and the original [`ApiError`].
    #[instrument(skip_all, fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<AuthSuccess, AuthFailure> {
        let response = self
            .api
            .post(&self.endpoints.login, &LoginRequest::from(credentials))
            .await
            .map_err(|err| {
                warn!("Login rejected: {err}");
                AuthFailure::from_api(err, LOGIN_FAILED)
            })?;

        let success = self.establish(&response.body, LOGIN_FAILED)?;
        info!("Login succeeded");
        Ok(success)
    }

    /// Registers a new account. The user is logged in only when the
    /// response carries a token.
    ///
    /// # Errors
    /// Returns [`AuthFailure`] carrying the server reason (or a generic one)
    /// and the original [`ApiError`].
    #[instrument(skip_all, fields(email = %registration.email))]
    pub async fn register(
        &self,
        registration: &Registration,
    ) -> Result<RegisterSuccess, AuthFailure> {
        let response = self
            .api
            .post(&self.endpoints.register, &RegisterRequest::from(registration))
            .await
            .map_err(|err| {
                warn!("Registration rejected: {err}");
                AuthFailure::from_api(err, REGISTER_FAILED)
            })?;

        let session = SessionResponse::from_body(&response.body);
        let user_id = session.user_id();
        let token = session.access_token();

        if let Some(token) = &token {
            self.persist(token)?;
            info!("Registration succeeded; session established");
        } else {
            info!("Registration succeeded; login required");
        }

        Ok(RegisterSuccess { token, user_id })
    }

    /// Exchanges a third-party identity token for a backend session token.
    ///
    /// On success the token is persisted and also becomes the client's
    /// default credential for the rest of the session.
    ///
    /// # Errors
    /// A server rejection keeps its status and the server reason; a
    /// transport failure gets the generic OAuth reason. Use
    /// [`AuthFailure::is_rejected`] to tell them apart.
    #[instrument(skip_all)]
    pub async fn oauth_login(&self, id_token: &SecretString) -> Result<AuthSuccess, AuthFailure> {
        let request = OAuthRequest {
            token: id_token.expose_secret(),
        };

        let response = match self.api.post(&self.endpoints.oauth_login, &request).await {
            Ok(response) => response,
            Err(err @ ApiError::Rejected { .. }) => {
                warn!("OAuth exchange rejected: {err}");
                return Err(AuthFailure::from_api(err, OAUTH_FAILED));
            }
            Err(err) => {
                warn!("OAuth exchange failed: {err}");
                return Err(AuthFailure::generic(err, OAUTH_FAILED));
            }
        };

        let success = self.establish(&response.body, OAUTH_FAILED)?;
        self.api.set_default_token(Some(success.token.clone()));
        info!(new_user = success.new_user, "OAuth login succeeded");
        Ok(success)
    }

    /// Clears local state, then tells the backend. The backend call is best
    /// effort: its failure is logged and local state stays cleared.
    #[instrument(skip_all)]
    pub async fn logout(&self) {
        let token = self.api.current_token();
        self.forget();

        match self
            .api
            .send_with_token(Method::POST, &self.endpoints.logout, None, token.as_ref())
            .await
        {
            Ok(_) => debug!("Backend session closed"),
            Err(err) => warn!("Logout notification failed: {err}"),
        }
    }

    /// Authoritative check against the backend. Without a local token no
    /// request is made. Any failure, whether the backend reported an
    /// invalid session or the call itself failed, clears the local token.
    #[instrument(skip_all)]
    pub async fn validate_auth(&self) -> bool {
        if !self.is_authenticated() {
            return false;
        }

        match self.api.get(&self.endpoints.check_auth).await {
            Ok(response)
                if response.body.get("status").and_then(Value::as_str) == Some("success") =>
            {
                debug!("Session verified");
                true
            }
            Ok(response) => {
                warn!(status = response.status, "Session verification did not succeed");
                self.forget();
                false
            }
            Err(err) => {
                warn!("Session verification failed: {err}");
                self.forget();
                false
            }
        }
    }

    /// Reads the token out of a success body and persists it.
    fn establish(&self, body: &Value, fallback: &str) -> Result<AuthSuccess, AuthFailure> {
        let session = SessionResponse::from_body(body);

        let token = session
            .reports_success()
            .then(|| session.access_token())
            .flatten()
            .ok_or_else(|| {
                warn!("Authentication response did not contain a session token");
                AuthFailure::generic(
                    ApiError::Unknown("response did not contain a session token".to_string()),
                    fallback,
                )
            })?;

        self.persist(&token)?;

        Ok(AuthSuccess {
            token,
            user_id: session.user_id(),
            new_user: session.new_user,
        })
    }

    /// Writes the token to storage and cookie. If either write fails both go
    /// back to the token stored before the call.
    fn persist(&self, token: &SecretString) -> Result<(), AuthFailure> {
        let previous = self.storage.read();
        let result = self.storage.save(token).and_then(|()| match &self.cookie {
            Some(cookie) => cookie.save(token),
            None => Ok(()),
        });

        result.map_err(|err| {
            warn!("Failed to persist session token: {err}");
            self.restore(previous.as_ref());
            AuthFailure::generic(ApiError::Unknown(err.to_string()), SESSION_SAVE_FAILED)
        })
    }

    fn restore(&self, previous: Option<&SecretString>) {
        let stores = std::iter::once(&self.storage).chain(self.cookie.as_ref());
        for store in stores {
            let result = match previous {
                Some(token) => store.save(token),
                None => store.clear(),
            };
            if let Err(err) = result {
                warn!("Failed to restore previous session token: {err}");
            }
        }
    }

    fn forget(&self) {
        if let Err(err) = self.storage.clear() {
            warn!("Failed to clear stored token: {err}");
        }
        if let Some(cookie) = &self.cookie {
            if let Err(err) = cookie.clear() {
                warn!("Failed to clear session cookie: {err}");
            }
        }
        self.api.set_default_token(None);
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("api", &self.api)
            .field("authenticated", &self.is_authenticated())
            .field("cookie", &self.cookie.is_some())
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{
        api::ApiConfig,
        token::{CookieTokenStore, MemoryTokenStore},
    };
    use reqwest::cookie::Jar;
    use serde_json::json;
    use std::net::TcpListener;
    use url::Url;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    struct Harness {
        service: AuthService,
        storage: Arc<MemoryTokenStore>,
        cookie: Arc<CookieTokenStore>,
    }

    fn harness(uri: &str) -> Harness {
        let storage = Arc::new(MemoryTokenStore::new());
        let api = ApiClient::new(ApiConfig::new(Url::parse(uri).unwrap()), storage.clone()).unwrap();
        let cookie = Arc::new(CookieTokenStore::new(
            Arc::new(Jar::default()),
            Url::parse("https://app.example.com").unwrap(),
        ));
        let service = AuthService::new(Arc::new(api)).with_cookie(cookie.clone());
        Harness {
            service,
            storage,
            cookie,
        }
    }

    fn dead_uri() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{port}")
    }

    #[tokio::test]
    async fn login_persists_token_to_storage_and_cookie() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(json!({"email": "a@b.com", "password": "secret1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "user": {"id": 3},
                "tokens": {"access": "T1", "refresh": "R1"}
            })))
            .mount(&server)
            .await;

        let h = harness(&server.uri());
        let success = h
            .service
            .login(&LoginCredentials::new("a@b.com", "secret1"))
            .await
            .unwrap();

        assert_eq!(success.token.expose_secret(), "T1");
        assert_eq!(success.user_id.as_deref(), Some("3"));
        assert!(h.service.is_authenticated());
        assert!(h.service.state().is_authenticated());
        assert_eq!(h.storage.read().unwrap().expose_secret(), "T1");
        assert_eq!(h.cookie.read().unwrap().expose_secret(), "T1");
    }

    #[tokio::test]
    async fn login_rejection_keeps_previous_token() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "detail": "No active account found with the given credentials"
            })))
            .mount(&server)
            .await;

        let h = harness(&server.uri());
        h.storage.save(&secret("OLD")).unwrap();

        let failure = h
            .service
            .login(&LoginCredentials::new("a@b.com", "wrong-password"))
            .await
            .unwrap_err();

        assert!(failure.is_rejected());
        assert_eq!(failure.status(), Some(401));
        assert_eq!(
            failure.reason,
            "No active account found with the given credentials"
        );
        assert_eq!(h.storage.read().unwrap().expose_secret(), "OLD");
    }

    #[tokio::test]
    async fn login_without_token_in_response_fails_generically() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
            .mount(&server)
            .await;

        let h = harness(&server.uri());
        let failure = h
            .service
            .login(&LoginCredentials::new("a@b.com", "secret1"))
            .await
            .unwrap_err();

        assert_eq!(failure.reason, LOGIN_FAILED);
        assert!(matches!(failure.source, ApiError::Unknown(_)));
        assert!(!h.service.is_authenticated());
    }

    #[tokio::test]
    async fn register_without_token_does_not_authenticate() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/register"))
            .and(body_json(json!({
                "email": "a@b.com",
                "username": "alice",
                "password": "secret1"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "message": "User registered successfully",
                "user": {"id": 9}
            })))
            .mount(&server)
            .await;

        let h = harness(&server.uri());
        let outcome = h
            .service
            .register(&Registration::new("a@b.com", "alice", "secret1", "secret1"))
            .await
            .unwrap();

        assert!(!outcome.authenticated());
        assert_eq!(outcome.user_id.as_deref(), Some("9"));
        assert!(!h.service.is_authenticated());
    }

    #[tokio::test]
    async fn register_with_token_logs_in() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/register"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "message": "User registered successfully",
                "user": {"id": 9},
                "tokens": {"access": "T7", "refresh": "R7"}
            })))
            .mount(&server)
            .await;

        let h = harness(&server.uri());
        let outcome = h
            .service
            .register(&Registration::new("a@b.com", "alice", "secret1", "secret1"))
            .await
            .unwrap();

        assert!(outcome.authenticated());
        assert_eq!(h.service.token().unwrap().expose_secret(), "T7");
        assert_eq!(h.cookie.read().unwrap().expose_secret(), "T7");
    }

    #[tokio::test]
    async fn register_rejection_uses_server_reason() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/register"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "user with this email already exists."
            })))
            .mount(&server)
            .await;

        let h = harness(&server.uri());
        let failure = h
            .service
            .register(&Registration::new("a@b.com", "alice", "secret1", "secret1"))
            .await
            .unwrap_err();
        assert_eq!(failure.status(), Some(400));
        assert_eq!(failure.reason, "user with this email already exists.");
    }

    #[tokio::test]
    async fn oauth_login_sets_session_default_credential() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_json(json!({"token": "google-id-token"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "user": {"id": 5},
                "tokens": {"access": "G1"},
                "new_user": true
            })))
            .mount(&server)
            .await;

        let h = harness(&server.uri());
        let success = h
            .service
            .oauth_login(&secret("google-id-token"))
            .await
            .unwrap();

        assert!(success.new_user);
        assert_eq!(h.storage.read().unwrap().expose_secret(), "G1");
        assert_eq!(
            h.service.api().default_token().unwrap().expose_secret(),
            "G1"
        );
    }

    #[tokio::test]
    async fn oauth_rejection_keeps_status() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"error": "Invalid Google token"})),
            )
            .mount(&server)
            .await;

        let h = harness(&server.uri());
        let failure = h
            .service
            .oauth_login(&secret("bad"))
            .await
            .unwrap_err();

        assert!(failure.is_rejected());
        assert!(!failure.is_transport());
        assert_eq!(failure.status(), Some(400));
        assert_eq!(failure.reason, "Invalid Google token");
    }

    #[tokio::test]
    async fn oauth_transport_failure_is_wrapped_generically() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let h = harness(&dead_uri());
        let failure = h
            .service
            .oauth_login(&secret("google-id-token"))
            .await
            .unwrap_err();

        assert!(failure.is_transport());
        assert_eq!(failure.status(), None);
        assert_eq!(failure.reason, OAUTH_FAILED);
    }

    #[tokio::test]
    async fn logout_clears_even_when_backend_fails() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .and(header("Authorization", "Bearer T1"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let h = harness(&server.uri());
        h.storage.save(&secret("T1")).unwrap();
        h.service.hydrate().unwrap();
        h.service.api().set_default_token(Some(secret("T1")));

        h.service.logout().await;

        assert!(!h.service.is_authenticated());
        assert!(h.cookie.read().is_none());
        assert!(h.service.api().default_token().is_none());
    }

    #[tokio::test]
    async fn logout_clears_when_backend_unreachable() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let h = harness(&dead_uri());
        h.storage.save(&secret("T1")).unwrap();

        h.service.logout().await;
        assert!(!h.service.is_authenticated());
    }

    #[tokio::test]
    async fn validate_auth_true_on_success_status() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/check-auth"))
            .and(header("Authorization", "Bearer T1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
            .mount(&server)
            .await;

        let h = harness(&server.uri());
        h.storage.save(&secret("T1")).unwrap();
        assert!(h.service.validate_auth().await);
        assert!(h.service.is_authenticated());
    }

    #[tokio::test]
    async fn validate_auth_clears_on_rejection_and_on_bad_status() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/check-auth"))
            .and(header("Authorization", "Bearer EXPIRED"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/auth/check-auth"))
            .and(header("Authorization", "Bearer STALE"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "invalid"})))
            .mount(&server)
            .await;

        let h = harness(&server.uri());

        h.storage.save(&secret("EXPIRED")).unwrap();
        h.service.hydrate().unwrap();
        assert!(!h.service.validate_auth().await);
        assert!(!h.service.is_authenticated());
        assert!(h.cookie.read().is_none());

        h.storage.save(&secret("STALE")).unwrap();
        assert!(!h.service.validate_auth().await);
        assert!(!h.service.is_authenticated());
    }

    #[tokio::test]
    async fn validate_auth_without_token_makes_no_request() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/check-auth"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let h = harness(&server.uri());
        assert!(!h.service.validate_auth().await);
    }

    #[tokio::test]
    async fn validate_auth_clears_on_transport_failure() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let h = harness(&dead_uri());
        h.storage.save(&secret("T1")).unwrap();

        assert!(!h.service.validate_auth().await);
        assert!(!h.service.is_authenticated());
    }

    #[test]
    fn clear_token_drops_all_copies() {
        let h = harness("http://127.0.0.1:9");
        h.storage.save(&secret("T1")).unwrap();
        h.service.hydrate().unwrap();
        assert!(h.cookie.read().is_some());

        h.service.clear_token();
        assert!(h.service.token().is_none());
        assert!(h.cookie.read().is_none());
        h.service.clear_token();
        assert!(!h.service.state().is_authenticated());
    }

    struct ReadOnlyStore;

    impl TokenStore for ReadOnlyStore {
        fn save(&self, _token: &SecretString) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("read-only medium")))
        }

        fn read(&self) -> Option<SecretString> {
            None
        }

        fn clear(&self) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("read-only medium")))
        }
    }

    #[test]
    fn persist_failure_restores_previous_token() {
        let storage = Arc::new(MemoryTokenStore::with_token(secret("OLD")));
        let api = ApiClient::new(
            ApiConfig::new(Url::parse("http://127.0.0.1:9").unwrap()),
            storage.clone(),
        )
        .unwrap();
        let service = AuthService::new(Arc::new(api)).with_cookie(Arc::new(ReadOnlyStore));

        let failure = service.persist(&secret("T1")).unwrap_err();
        assert_eq!(failure.reason, SESSION_SAVE_FAILED);
        assert!(matches!(failure.source, ApiError::Unknown(_)));
        assert_eq!(storage.read().unwrap().expose_secret(), "OLD");
        assert_eq!(service.token().unwrap().expose_secret(), "OLD");
    }

    #[test]
    fn persist_failure_without_previous_token_leaves_nothing() {
        let storage = Arc::new(MemoryTokenStore::new());
        let api = ApiClient::new(
            ApiConfig::new(Url::parse("http://127.0.0.1:9").unwrap()),
            storage.clone(),
        )
        .unwrap();
        let service = AuthService::new(Arc::new(api)).with_cookie(Arc::new(ReadOnlyStore));

        assert!(service.persist(&secret("T1")).is_err());
        assert!(storage.read().is_none());
    }

    #[tokio::test]
    async fn login_accepts_tokens_with_separators() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "tokens": {"access": "abc def,ghi"}
            })))
            .mount(&server)
            .await;

        let h = harness(&server.uri());
        h.storage.save(&secret("OLD")).unwrap();

        let success = h
            .service
            .login(&LoginCredentials::new("a@b.com", "secret1"))
            .await
            .unwrap();

        assert_eq!(success.token.expose_secret(), "abc def,ghi");
        assert_eq!(h.storage.read().unwrap().expose_secret(), "abc def,ghi");
        assert_eq!(h.cookie.read().unwrap().expose_secret(), "abc def,ghi");
    }
}
