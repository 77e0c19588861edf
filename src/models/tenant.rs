//! Tenant-related models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::null_as_default;

/// A tenant the authenticated user may enter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    #[serde(alias = "Id", alias = "tenantId", alias = "TenantId")]
    pub id: Uuid,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        alias = "Name",
        alias = "tenantName",
        alias = "TenantName"
    )]
    pub name: String,
}

impl Tenant {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Tenants and user metadata visible to the authenticated identity.
///
/// Only `tenants` is typed; every other field of the payload is kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TenantUserInfo {
    #[serde(default, deserialize_with = "null_as_default", alias = "Tenants")]
    pub tenants: Vec<Tenant>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl TenantUserInfo {
    pub fn find_tenant(&self, id: Uuid) -> Option<&Tenant> {
        self.tenants.iter().find(|t| t.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_info_keeps_unknown_fields() {
        let id = Uuid::new_v4();
        let info: TenantUserInfo = serde_json::from_value(json!({
            "tenants": [{"id": id, "name": "Acme"}],
            "userName": "ada",
            "roles": ["admin"],
        }))
        .unwrap();

        assert_eq!(info.tenants, vec![Tenant::new(id, "Acme")]);
        assert_eq!(info.extra["userName"], "ada");
        assert_eq!(info.extra["roles"], json!(["admin"]));
        assert_eq!(info.find_tenant(id).map(|t| t.name.as_str()), Some("Acme"));
    }

    #[test]
    fn test_user_info_without_tenants() {
        let info: TenantUserInfo = serde_json::from_value(json!({"email": "ada@acme.test"})).unwrap();
        assert!(info.tenants.is_empty());
        assert!(info.find_tenant(Uuid::nil()).is_none());
    }

    #[test]
    fn test_null_tenants_is_empty() {
        let info: TenantUserInfo =
            serde_json::from_value(json!({"tenants": null, "userName": "ada"})).unwrap();
        assert!(info.tenants.is_empty());
        assert_eq!(info.extra["userName"], "ada");
        assert!(!info.extra.contains_key("tenants"));
    }

    #[test]
    fn test_tenant_with_null_name() {
        let id = Uuid::new_v4();
        let tenant: Tenant = serde_json::from_value(json!({"id": id, "name": null})).unwrap();
        assert_eq!(tenant, Tenant::new(id, ""));
    }

    #[test]
    fn test_user_info_rejects_non_object() {
        assert!(serde_json::from_value::<TenantUserInfo>(json!([1, 2])).is_err());
    }

    #[test]
    fn test_tenant_accepts_pascal_case() {
        let id = Uuid::new_v4();
        let tenant: Tenant =
            serde_json::from_value(json!({"TenantId": id, "TenantName": "Globex"})).unwrap();
        assert_eq!(tenant, Tenant::new(id, "Globex"));
    }
}
