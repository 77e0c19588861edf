//! Gateway connection models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{null_as_default, Tenant};

/// Tenant-scoped parameters for connecting to the gateway.
///
/// The portal may send `null` or leave out any field. Missing strings read
/// as empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConnectionInfo {
    #[serde(default, deserialize_with = "null_as_default", alias = "CompanyName")]
    pub company_name: String,
    /// Set from the requested tenant; the server's value is never read.
    #[serde(skip_deserializing)]
    pub tenant_id: Uuid,
    /// Set from the requested tenant; the server's value is never read.
    #[serde(skip_deserializing)]
    pub tenant_name: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        rename = "signalrUrl",
        alias = "signalrurl",
        alias = "Signalrurl",
        alias = "SignalrUrl"
    )]
    pub realtime_channel_url: String,
}

impl GatewayConnectionInfo {
    /// Stamp the caller's tenant over whatever the server reported.
    pub fn for_tenant(mut self, tenant: &Tenant) -> Self {
        self.tenant_id = tenant.id;
        self.tenant_name = tenant.name.clone();
        self
    }
}
