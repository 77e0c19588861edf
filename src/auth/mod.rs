//! Portal session login and tenant resolution
//!
//! Both public operations log in from scratch on a session of their own:
//! resolve the portal address, POST the credentials, then walk the
//! follow-up calls on the same cookie jar. Any failure aborts the operation.

pub mod tenant;
pub mod user_info;

use std::fmt;

use serde::de::DeserializeOwned;

use crate::error::{AuthFailure, Error, Result};
use crate::http::{HttpSession, PortalResponse};
use crate::portal::{Environment, PortalAddress};

pub use tenant::TenantAuthorizer;
pub use user_info::UserInfoResolver;

const LOGIN_PATH: &str = "/api/osr-authentication/login";

/// Portal username and password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// JSON body for the login endpoint.
    fn login_body(&self) -> serde_json::Value {
        serde_json::json!({
            "Username": self.username,
            "Password": self.password,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Everything needed to reach and log in to a portal.
#[derive(Debug, Clone)]
pub struct PortalSettings {
    pub environment: Environment,
    pub credentials: Credentials,
    /// Only used with `Environment::Custom`.
    pub custom_url: Option<String>,
}

impl PortalSettings {
    pub fn new(environment: Environment, credentials: Credentials) -> Self {
        Self {
            environment,
            credentials,
            custom_url: None,
        }
    }

    pub fn custom(url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            environment: Environment::Custom,
            credentials,
            custom_url: Some(url.into()),
        }
    }

    /// Resolved on every call so changed settings take effect immediately.
    pub fn address(&self) -> Result<PortalAddress> {
        PortalAddress::resolve(self.environment, self.custom_url.as_deref())
    }
}

/// POST the credentials and fail unless the portal accepts them.
pub(crate) async fn login<S: HttpSession>(
    session: &S,
    address: &PortalAddress,
    credentials: &Credentials,
) -> Result<()> {
    let url = address.endpoint(LOGIN_PATH);
    tracing::info!(
        "Cookies held for {} before login: {}",
        address,
        session.cookie_count(address.base())
    );

    let resp = session.post_json(&url, &credentials.login_body()).await?;
    tracing::info!(
        "Cookies held for {} after login: {}",
        url,
        session.cookie_count(&url)
    );

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await?;
        tracing::warn!(
            "Login as {} rejected (HTTP {})",
            credentials.username(),
            status.as_u16()
        );
        return Err(Error::AuthenticationFailed {
            status,
            failure: AuthFailure::Rejected { body },
        });
    }

    tracing::debug!("Logged in as {}", credentials.username());
    Ok(())
}

/// Pass through a 2xx response, otherwise fail with its status and body.
pub(crate) async fn expect_success<R: PortalResponse>(
    resp: R,
    endpoint: &'static str,
) -> Result<R> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await?;
    Err(Error::UnexpectedStatus {
        endpoint,
        status,
        body,
    })
}

/// Read the whole body and deserialize it as `T`.
pub(crate) async fn read_json<T, R>(resp: R, endpoint: &'static str) -> Result<T>
where
    T: DeserializeOwned,
    R: PortalResponse,
{
    let body = resp.bytes().await?;
    serde_json::from_slice(&body)
        .map_err(|source| Error::DeserializationFailure { endpoint, source })
}
