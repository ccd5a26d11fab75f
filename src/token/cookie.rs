use super::TokenStore;
use crate::error::StoreError;
use reqwest::cookie::{CookieStore, Jar};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use url::{form_urlencoded, Url};

/// Cookie the route guard looks for.
pub const SESSION_COOKIE_NAME: &str = "token";

/// Mirrors the token into a cookie jar for one site.
///
/// Requests made through a client sharing the jar carry the cookie, which is
/// what the gateway's route guard inspects. The value is form-urlencoded in
/// the jar so any token shape fits in a cookie. Clearing writes an empty value
/// rather than relying on expiry handling in the jar.
pub struct CookieTokenStore {
    jar: Arc<Jar>,
    site: Url,
    name: String,
}

impl CookieTokenStore {
    #[must_use]
    pub fn new(jar: Arc<Jar>, site: Url) -> Self {
        Self {
            jar,
            site,
            name: SESSION_COOKIE_NAME.to_string(),
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn jar(&self) -> Arc<Jar> {
        self.jar.clone()
    }

    fn set(&self, value: &str) {
        let cookie = format!("{}={value}; Path=/; SameSite=Lax", self.name);
        self.jar.add_cookie_str(&cookie, &self.site);
    }
}

impl TokenStore for CookieTokenStore {
    fn save(&self, token: &SecretString) -> Result<(), StoreError> {
        let value: String =
            form_urlencoded::byte_serialize(token.expose_secret().as_bytes()).collect();
        self.set(&value);
        Ok(())
    }

    fn read(&self) -> Option<SecretString> {
        let header = self.jar.cookies(&self.site)?;
        let header = header.to_str().ok()?;
        let raw = cookie_value(header, &self.name)?;
        // encoded values never contain '=' or '&', so the whole value is one key
        form_urlencoded::parse(raw.as_bytes())
            .next()
            .map(|(value, _)| SecretString::from(value.into_owned()))
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.set("");
        Ok(())
    }
}

impl std::fmt::Debug for CookieTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieTokenStore")
            .field("site", &self.site.as_str())
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Value of cookie `name` in a `Cookie` header, `None` when missing or empty.
#[must_use]
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key.trim() == name)
            .then(|| value.trim())
            .filter(|value| !value.is_empty())
    })
}
