//! reqwest-backed session with a scoped cookie jar

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::redirect::Policy;
use reqwest::StatusCode;
use url::Url;

use super::{HttpSession, PortalResponse, SessionFactory};
use crate::error::{Error, Result};

const USER_AGENT: &str = concat!("osr-login/", env!("CARGO_PKG_VERSION"));
const MAX_REDIRECTS: usize = 10;

/// Builds a new reqwest client and cookie jar for every session.
#[derive(Debug, Clone, Default)]
pub struct ReqwestSessionFactory;

impl SessionFactory for ReqwestSessionFactory {
    type Session = ReqwestSession;

    fn open(&self) -> Result<ReqwestSession> {
        ReqwestSession::new()
    }
}

/// One login session: a reqwest client plus the jar it writes cookies into.
pub struct ReqwestSession {
    http: reqwest::Client,
    jar: Arc<Jar>,
}

impl ReqwestSession {
    pub fn new() -> Result<Self> {
        let jar = Arc::new(Jar::default());
        // gzip is negotiated and decoded by reqwest itself
        let http = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .gzip(true)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::transport("client construction", e))?;

        Ok(Self { http, jar })
    }
}

impl HttpSession for ReqwestSession {
    type Response = reqwest::Response;

    async fn post_json(&self, url: &Url, body: &serde_json::Value) -> Result<reqwest::Response> {
        tracing::debug!("POST {}", url);
        self.http
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| Error::transport(url.as_str(), e))
    }

    async fn get(&self, url: &Url) -> Result<reqwest::Response> {
        tracing::debug!("GET {}", url);
        self.http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::transport(url.as_str(), e))
    }

    fn cookie_count(&self, url: &Url) -> usize {
        self.jar
            .cookies(url)
            .and_then(|header| {
                header
                    .to_str()
                    .ok()
                    .map(|s| s.split(';').filter(|c| !c.trim().is_empty()).count())
            })
            .unwrap_or(0)
    }
}

impl PortalResponse for reqwest::Response {
    fn status(&self) -> StatusCode {
        reqwest::Response::status(self)
    }

    async fn bytes(self) -> Result<Vec<u8>> {
        let url = self.url().to_string();
        reqwest::Response::bytes(self)
            .await
            .map(|b| b.to_vec())
            .map_err(|e| Error::transport(url, e))
    }

    async fn text(self) -> Result<String> {
        let url = self.url().to_string();
        reqwest::Response::text(self)
            .await
            .map_err(|e| Error::transport(url, e))
    }
}
