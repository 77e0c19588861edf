//! Cookie-bearing HTTP session used by the login workflow
//!
//! A session owns one cookie jar for its whole lifetime. The workflow opens
//! a fresh session for every public operation through a `SessionFactory`
//! and drops it when the operation finishes, so no cookies survive between
//! calls.

mod reqwest_session;
#[cfg(test)]
pub(crate) mod scripted;

use std::future::Future;

use reqwest::StatusCode;
use url::Url;

use crate::error::Result;

pub use reqwest_session::{ReqwestSession, ReqwestSessionFactory};

/// Response returned by an `HttpSession`.
///
/// The status is available as soon as headers arrive; the body is only read
/// when `bytes` or `text` is awaited.
pub trait PortalResponse: Send {
    fn status(&self) -> StatusCode;

    fn is_success(&self) -> bool {
        self.status().is_success()
    }

    fn bytes(self) -> impl Future<Output = Result<Vec<u8>>> + Send;

    fn text(self) -> impl Future<Output = Result<String>> + Send;
}

/// Cookie-bearing HTTP client: follows redirects, accumulates cookies and
/// transparently decompresses gzip bodies.
pub trait HttpSession: Send + Sync {
    type Response: PortalResponse;

    fn post_json(
        &self,
        url: &Url,
        body: &serde_json::Value,
    ) -> impl Future<Output = Result<Self::Response>> + Send;

    fn get(&self, url: &Url) -> impl Future<Output = Result<Self::Response>> + Send;

    /// Number of cookies the jar would attach to a request for `url`.
    fn cookie_count(&self, url: &Url) -> usize;
}

/// Opens one fresh session (and cookie jar) per operation.
pub trait SessionFactory: Send + Sync {
    type Session: HttpSession;

    fn open(&self) -> Result<Self::Session>;
}
