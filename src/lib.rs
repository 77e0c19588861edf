//! OSR portal login
//!
//! Logs in to the multi-tenant OSR portal with a username and password,
//! lists the tenants the user can enter and exchanges the session for the
//! gateway connection parameters of one tenant.

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod models;
pub mod portal;

pub use auth::{Credentials, PortalSettings, TenantAuthorizer, UserInfoResolver};
pub use error::{AuthFailure, Error, Result};
pub use models::{GatewayConnectionInfo, Tenant, TenantUserInfo};
pub use portal::{Environment, PortalAddress};
