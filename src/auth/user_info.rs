//! Tenant discovery for an authenticated user

use std::collections::BTreeMap;

use tracing::instrument::WithSubscriber;
use tracing::Dispatch;

use super::{expect_success, login, read_json, PortalSettings};
use crate::error::{Error, Result};
use crate::http::{HttpSession, PortalResponse, ReqwestSessionFactory, SessionFactory};
use crate::logging;
use crate::models::TenantUserInfo;

const DW_PATH: &str = "/api/dw";
const USER_PATH: &str = "api/portal/user";

/// Logs in and lists the tenants visible to the user.
pub struct UserInfoResolver<F = ReqwestSessionFactory> {
    settings: PortalSettings,
    sessions: F,
    dispatch: Option<Dispatch>,
}

impl UserInfoResolver {
    pub fn new(settings: PortalSettings) -> Self {
        Self::with_session_factory(settings, ReqwestSessionFactory)
    }
}

impl<F: SessionFactory> UserInfoResolver<F> {
    pub fn with_session_factory(settings: PortalSettings, sessions: F) -> Self {
        Self {
            settings,
            sessions,
            dispatch: None,
        }
    }

    /// Log to `dispatch` instead of the dispatcher current at each call.
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    fn dispatch(&self) -> Dispatch {
        self.dispatch
            .clone()
            .unwrap_or_else(logging::current_dispatch)
    }

    pub fn settings(&self) -> &PortalSettings {
        &self.settings
    }

    /// Log in on a fresh session and fetch the user's tenant info.
    pub async fn get_tenant_user_info(&self) -> Result<TenantUserInfo> {
        self.fetch().with_subscriber(self.dispatch()).await
    }

    async fn fetch(&self) -> Result<TenantUserInfo> {
        let address = self.settings.address()?;
        let session = self.sessions.open()?;

        login(&session, &address, &self.settings.credentials).await?;

        // The portal sets its active-tenant cookies on this call.
        let dw_url = address.endpoint(DW_PATH);
        tracing::debug!("Cookies held for {}: {}", dw_url, session.cookie_count(&dw_url));
        let resp = expect_success(session.get(&dw_url).await?, "dw").await?;
        let site_map = parse_site_map(&resp.bytes().await?)?;
        tracing::debug!("Portal site map ({} entries): {:?}", site_map.len(), site_map);

        let user_url = address.endpoint(USER_PATH);
        let resp = expect_success(session.get(&user_url).await?, "portal/user").await?;
        let info: TenantUserInfo = read_json(resp, "portal/user").await?;

        tracing::info!(
            "{} can access {} tenant(s)",
            self.settings.credentials.username(),
            info.tenants.len()
        );
        Ok(info)
    }
}

/// Flatten `[{"key": value}, ...]` into a key/value map.
///
/// Non-string values are kept as their JSON text. An empty object or a key
/// seen twice fails the whole map.
fn parse_site_map(body: &[u8]) -> Result<BTreeMap<String, String>> {
    let invalid = |reason: String| Error::DeserializationFailure {
        endpoint: "dw",
        source: serde::de::Error::custom(reason),
    };

    let entries: Vec<serde_json::Map<String, serde_json::Value>> = serde_json::from_slice(body)
        .map_err(|source| Error::DeserializationFailure {
            endpoint: "dw",
            source,
        })?;

    let mut site_map = BTreeMap::new();
    for entry in entries {
        let (key, value) = entry
            .into_iter()
            .next()
            .ok_or_else(|| invalid("empty object in site map".into()))?;
        let value = match value {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        if site_map.contains_key(&key) {
            return Err(invalid(format!("duplicate key {:?} in site map", key)));
        }
        site_map.insert(key, value);
    }
    Ok(site_map)
}
