//! Error taxonomy for the portal login workflow

use std::fmt;

use reqwest::StatusCode;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, Error>;

/// Boxed transport error, so sessions other than reqwest can report failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Why the portal refused to establish a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    /// The server answered with a normal error body.
    Rejected { body: String },
    /// The server rejected the request and no session cookie was ever set.
    CookieNotFound,
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthFailure::Rejected { body } => f.write_str(body),
            AuthFailure::CookieNotFound => f.write_str("Authentication cookie was not found"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The portal base address could not be resolved.
    #[error("Invalid portal URL: {0}")]
    InvalidConfiguration(String),

    /// Login or tenant login returned a non-2xx status.
    #[error("Authentication failed (HTTP {}): {failure}", .status.as_u16())]
    AuthenticationFailed {
        status: StatusCode,
        failure: AuthFailure,
    },

    /// The tenant context switch failed; the connection info is discarded.
    #[error("Failed to switch to tenant {tenant_id}")]
    TenantSwitchFailed {
        tenant_id: Uuid,
        #[source]
        source: Box<Error>,
    },

    #[error("Request to {url} failed")]
    TransportFailure {
        url: String,
        #[source]
        source: BoxError,
    },

    #[error("Failed to parse {endpoint} response")]
    DeserializationFailure {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A non-authentication endpoint answered with a non-2xx status.
    #[error("HTTP {} from {endpoint}: {body}", .status.as_u16())]
    UnexpectedStatus {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },
}

impl Error {
    pub(crate) fn transport(url: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Error::TransportFailure {
            url: url.into(),
            source: source.into(),
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::AuthenticationFailed { status, .. } | Error::UnexpectedStatus { status, .. } => {
                Some(*status)
            }
            Error::TenantSwitchFailed { source, .. } => source.status(),
            _ => None,
        }
    }
}
