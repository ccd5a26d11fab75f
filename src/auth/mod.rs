//! Auth service: the only component that changes the session token.
//!
//! Every flow that receives a token writes it to storage and to the cookie
//! mirror together; every flow that drops one clears both.

mod service;
pub mod types;

pub use service::{AuthService, LOGIN_FAILED, OAUTH_FAILED, REGISTER_FAILED};
pub use types::{
    AuthState, AuthSuccess, Endpoints, LoginCredentials, RegisterSuccess, Registration,
};
