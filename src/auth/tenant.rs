//! Tenant login: exchange a portal session for gateway connection info

use tracing::instrument::WithSubscriber;
use tracing::Dispatch;
use uuid::Uuid;

use super::{expect_success, login, read_json, PortalSettings};
use crate::error::{AuthFailure, Error, Result};
use crate::http::{HttpSession, PortalResponse, ReqwestSessionFactory, SessionFactory};
use crate::logging;
use crate::models::{GatewayConnectionInfo, Tenant};
use crate::portal::PortalAddress;

const TENANT_LOGIN_PATH: &str = "/api/dw/gateway/tenantLogin";
const ENTER_TENANT_PATH: &str = "/api/portal/entertenantcontext";

/// Logs in and resolves the gateway connection parameters for a tenant.
pub struct TenantAuthorizer<F = ReqwestSessionFactory> {
    settings: PortalSettings,
    sessions: F,
    dispatch: Option<Dispatch>,
}

impl TenantAuthorizer {
    pub fn new(settings: PortalSettings) -> Self {
        Self::with_session_factory(settings, ReqwestSessionFactory)
    }
}

impl<F: SessionFactory> TenantAuthorizer<F> {
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

    /// Log in on a fresh session and fetch the connection info for `tenant`.
    ///
    /// With `tenant_id` set, the session's active tenant context is switched
    /// before returning; a failed switch fails the whole call. The returned
    /// info always names `tenant`, whatever the server reported.
    pub async fn authorize_login(
        &self,
        tenant: &Tenant,
        tenant_id: Option<Uuid>,
    ) -> Result<GatewayConnectionInfo> {
        self.authorize(tenant, tenant_id)
            .with_subscriber(self.dispatch())
            .await
    }

    async fn authorize(
        &self,
        tenant: &Tenant,
        tenant_id: Option<Uuid>,
    ) -> Result<GatewayConnectionInfo> {
        let address = self.settings.address()?;
        let session = self.sessions.open()?;

        login(&session, &address, &self.settings.credentials).await?;

        let url = address.endpoint(TENANT_LOGIN_PATH);
        tracing::info!("Cookies held for {}: {}", url, session.cookie_count(&url));

        // Resolves once headers arrive; the body is read below.
        let resp = session.get(&url).await?;
        let status = resp.status();
        if !status.is_success() {
            if session.cookie_count(&url) == 0 {
                tracing::warn!(
                    "Tenant login rejected (HTTP {}) without a session cookie",
                    status.as_u16()
                );
                return Err(Error::AuthenticationFailed {
                    status,
                    failure: AuthFailure::CookieNotFound,
                });
            }
            let body = resp.text().await?;
            return Err(Error::AuthenticationFailed {
                status,
                failure: AuthFailure::Rejected { body },
            });
        }

        let info: GatewayConnectionInfo = read_json(resp, "tenantLogin").await?;

        if let Some(id) = tenant_id {
            enter_tenant_context(&session, &address, id).await?;
        }

        tracing::info!(
            "Authorized {} for tenant {} ({})",
            info.company_name,
            tenant.name,
            tenant.id
        );
        Ok(info.for_tenant(tenant))
    }
}

/// Switch the session's active tenant; the response body is unused.
async fn enter_tenant_context<S: HttpSession>(
    session: &S,
    address: &PortalAddress,
    tenant_id: Uuid,
) -> Result<()> {
    let url = address.endpoint(&format!("{}?tenantId={}", ENTER_TENANT_PATH, tenant_id));

    let outcome = match session.get(&url).await {
        Ok(resp) => expect_success(resp, "entertenantcontext").await.map(drop),
        Err(e) => Err(e),
    };

    outcome.map_err(|e| {
        tracing::error!(
            %tenant_id,
            "Error trying to switch to tenant {}: {}",
            tenant_id,
            e
        );
        Error::TenantSwitchFailed {
            tenant_id,
            source: Box::new(e),
        }
    })
}
