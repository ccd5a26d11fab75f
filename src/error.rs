//! Error taxonomy shared by the HTTP adapter, the auth service and the forms.
//!
//! `ApiError` is what a single request can produce. `AuthFailure` is what an
//! auth flow hands back to its caller: a message fit for the user plus the
//! original `ApiError` so the status can drive different UI copy.

use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Why a request never produced a usable HTTP response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportKind {
    Connect,
    Timeout,
    Decode,
    Other,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Connect => "connect",
            Self::Timeout => "timeout",
            Self::Decode => "decode",
            Self::Other => "other",
        };
        f.write_str(label)
    }
}

#[derive(Clone, Debug, Error)]
pub enum ApiError {
    /// Network unreachable, timed out, or the response could not be decoded.
    #[error("transport error ({kind}): {message}")]
    Transport { kind: TransportKind, message: String },
    /// The server answered with a non-success status.
    #[error("request rejected ({status})")]
    Rejected { status: u16, body: Value },
    #[error("unexpected error: {0}")]
    Unknown(String),
}

impl ApiError {
    /// HTTP status of a rejection, `None` for transport and unknown errors.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Reason the backend gave for a rejection, if it gave one.
    ///
    /// Looks at `error`, `detail`, `message` and the first `non_field_errors`
    /// entry, in that order. Plain-text bodies are used as is.
    #[must_use]
    pub fn server_reason(&self) -> Option<String> {
        let Self::Rejected { body, .. } = self else {
            return None;
        };

        if let Value::String(text) = body {
            let trimmed = text.trim();
            return (!trimmed.is_empty()).then(|| trimmed.to_string());
        }

        ["error", "detail", "message"]
            .iter()
            .find_map(|key| body.get(*key).and_then(Value::as_str))
            .or_else(|| {
                body.get("non_field_errors")
                    .and_then(|v| v.get(0))
                    .and_then(Value::as_str)
            })
            .map(str::trim)
            .filter(|reason| !reason.is_empty())
            .map(ToString::to_string)
    }
}

/// Failed authentication attempt.
#[derive(Clone, Debug, Error)]
#[error("{reason}")]
pub struct AuthFailure {
    pub reason: String,
    #[source]
    pub source: ApiError,
}

impl AuthFailure {
    /// Keep the server's reason when there is one, otherwise use `fallback`.
    #[must_use]
    pub fn from_api(source: ApiError, fallback: &str) -> Self {
        let reason = source
            .server_reason()
            .unwrap_or_else(|| fallback.to_string());
        Self { reason, source }
    }

    /// Always use `reason`, keeping `source` for programmatic handling.
    #[must_use]
    pub fn generic(source: ApiError, reason: &str) -> Self {
        Self {
            reason: reason.to_string(),
            source,
        }
    }

    /// True when the server answered and said no.
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self.source, ApiError::Rejected { .. })
    }

    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self.source, ApiError::Transport { .. })
    }

    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.source.status()
    }
}

/// A single field that failed client-side validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn push(&mut self, field: &'static str, message: &'static str) {
        self.errors.push(FieldError { field, message });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// First message reported for `field`, mirroring what a form shows under it.
    #[must_use]
    pub fn message_for(&self, field: &str) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message)
    }

    /// `Ok(())` when nothing was pushed.
    ///
    /// # Errors
    /// Returns `self` when at least one field failed.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self
            .errors
            .iter()
            .map(|error| format!("{}: {}", error.field, error.message))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&summary)
    }
}

impl std::error::Error for ValidationErrors {}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage is not valid json: {0}")]
    Json(#[from] serde_json::Error),
}
