//! Request-time route guard.
//!
//! Protected paths need a session cookie (or a bearer header) to be present;
//! otherwise the request is redirected to the login page. Presence only: the
//! token itself is never checked here, the backend stays authoritative.

use crate::token::{cookie_value, SESSION_COOKIE_NAME};
use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, COOKIE},
        HeaderMap,
    },
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::{borrow::Cow, sync::Arc};
use tracing::debug;

pub const DEFAULT_PROTECTED: [&str; 2] = ["/dashboard/*", "/profile/*"];
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Path prefixes that require a session.
///
/// Accepts plain prefixes and the usual matcher spellings: `/dashboard`,
/// `/dashboard/*`, `/dashboard/**` and `/dashboard/:path*` all protect
/// `/dashboard` and everything below it. Matching is on segment boundaries,
/// so `/dashboards` is not covered by `/dashboard`. Repeated slashes in the
/// request path are collapsed first, so `//dashboard` is covered too.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProtectedPaths {
    prefixes: Vec<String>,
}

impl ProtectedPaths {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut prefixes: Vec<String> = patterns
            .into_iter()
            .filter_map(|pattern| normalize(pattern.as_ref()))
            .collect();
        prefixes.sort();
        prefixes.dedup();
        Self { prefixes }
    }

    #[must_use]
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        let path = collapse_slashes(path);
        let path = path.as_ref();
        self.prefixes.iter().any(|prefix| {
            prefix.is_empty()
                || path == prefix
                || path
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }
}

fn collapse_slashes(path: &str) -> Cow<'_, str> {
    if !path.contains("//") {
        return Cow::Borrowed(path);
    }
    let mut collapsed = String::with_capacity(path.len());
    for c in path.chars() {
        if c == '/' && collapsed.ends_with('/') {
            continue;
        }
        collapsed.push(c);
    }
    Cow::Owned(collapsed)
}

// `None` for blank patterns; `Some("")` for the root, which covers everything.
fn normalize(pattern: &str) -> Option<String> {
    let pattern = pattern.trim();
    if pattern.is_empty() {
        return None;
    }

    let mut prefix = pattern;
    for suffix in ["/:path*", "/**", "/*", "*"] {
        if let Some(stripped) = prefix.strip_suffix(suffix) {
            prefix = stripped;
            break;
        }
    }
    let prefix = prefix.trim_end_matches('/');

    if prefix.is_empty() {
        Some(String::new())
    } else if prefix.starts_with('/') {
        Some(prefix.to_string())
    } else {
        Some(format!("/{prefix}"))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(String),
}

#[derive(Clone, Debug)]
pub struct RouteGuard {
    protected: ProtectedPaths,
    login_path: String,
    cookie_name: String,
}

impl RouteGuard {
    #[must_use]
    pub fn new(protected: ProtectedPaths) -> Self {
        Self {
            protected,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            cookie_name: SESSION_COOKIE_NAME.to_string(),
        }
    }

    #[must_use]
    pub fn with_login_path(mut self, login_path: impl Into<String>) -> Self {
        self.login_path = login_path.into();
        self
    }

    #[must_use]
    pub fn with_cookie_name(mut self, cookie_name: impl Into<String>) -> Self {
        self.cookie_name = cookie_name.into();
        self
    }

    #[must_use]
    pub fn protected(&self) -> &ProtectedPaths {
        &self.protected
    }

    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// The login page itself is never guarded, whatever the patterns say.
    #[must_use]
    pub fn evaluate(&self, path: &str, headers: &HeaderMap) -> GuardDecision {
        let path = collapse_slashes(path);
        if *path == *self.login_path || !self.protected.matches(&path) {
            return GuardDecision::Allow;
        }

        if self.has_session_cookie(headers) || has_bearer_token(headers) {
            GuardDecision::Allow
        } else {
            GuardDecision::Redirect(self.login_path.clone())
        }
    }

    fn has_session_cookie(&self, headers: &HeaderMap) -> bool {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .any(|header| cookie_value(header, &self.cookie_name).is_some())
    }
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new(ProtectedPaths::new(DEFAULT_PROTECTED))
    }
}

fn has_bearer_token(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let trimmed = value.trim();
    trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))
        .is_some_and(|token| !token.trim().is_empty())
}

/// Middleware for `axum::middleware::from_fn_with_state`.
pub async fn require_session(
    State(guard): State<Arc<RouteGuard>>,
    request: Request,
    next: Next,
) -> Response {
    match guard.evaluate(request.uri().path(), request.headers()) {
        GuardDecision::Allow => next.run(request).await,
        GuardDecision::Redirect(location) => {
            debug!(path = request.uri().path(), "No session; redirecting to {location}");
            Redirect::temporary(&location).into_response()
        }
    }
}
