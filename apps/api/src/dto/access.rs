use gestor_application::{
    ACCESS_RESTRICTED_MESSAGE, DenialReason, EffectivePermissionSet, GuardDecision, GuardRender,
};
use gestor_domain::{PermissionKey, Role};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Resolved permissions of the current subject.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/effective-permissions-response.ts"
)]
pub struct EffectivePermissionsResponse {
    /// One of `loading`, `anonymous`, `no_membership`, `resolved` or `failed`.
    pub status: String,
    pub subject: Option<String>,
    pub company_id: Option<String>,
    pub role: Option<String>,
    pub departments: Vec<String>,
    pub is_loading: bool,
    pub is_super_admin: bool,
    pub can_manage_system: bool,
    pub can_access_admin_panel: bool,
    /// Granted permission keys in catalog order.
    pub permissions: Vec<String>,
}

/// Incoming payload for an ad-hoc guard evaluation.
///
/// Every field is optional. With no requirements the guard allows any set
/// that is no longer loading.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/check-access-request.ts"
)]
pub struct CheckAccessRequest {
    #[serde(default)]
    pub require_system_admin: bool,
    #[serde(default)]
    pub require_company_admin: bool,
    #[serde(default)]
    pub required_role: Option<String>,
    #[serde(default)]
    pub required_permission: Option<String>,
    #[serde(default)]
    pub company_id: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    /// Whether a denied guard should show a placeholder. Defaults to true.
    #[serde(default)]
    pub show_fallback: Option<bool>,
}

/// Outcome of a guard evaluation.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/check-access-response.ts"
)]
pub struct CheckAccessResponse {
    pub allowed: bool,
    pub reason: Option<String>,
    pub message: Option<String>,
    /// One of `children`, `access_restricted` or `nothing`.
    pub render: String,
    /// Placeholder text when `render` is `access_restricted`.
    pub placeholder: Option<String>,
}

/// Default grants for one role.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/role-defaults-response.ts"
)]
pub struct RoleDefaultsResponse {
    pub role: String,
    pub display_name: String,
    pub default_permissions: Vec<String>,
}

/// Permission keys and role defaults known to the server.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/permission-catalog-response.ts"
)]
pub struct PermissionCatalogResponse {
    pub permissions: Vec<String>,
    pub roles: Vec<RoleDefaultsResponse>,
}

impl From<&EffectivePermissionSet> for EffectivePermissionsResponse {
    fn from(value: &EffectivePermissionSet) -> Self {
        Self {
            status: value.status().as_str().to_owned(),
            subject: value.subject().map(ToOwned::to_owned),
            company_id: value.company_id().map(|company_id| company_id.to_string()),
            role: value.role().map(|role| role.as_str().to_owned()),
            departments: value
                .scope()
                .map(|scope| {
                    scope
                        .departments
                        .iter()
                        .map(|department| department.as_str().to_owned())
                        .collect()
                })
                .unwrap_or_default(),
            is_loading: value.is_loading(),
            is_super_admin: value.is_super_admin(),
            can_manage_system: value.can_manage_system(),
            can_access_admin_panel: value.can_access_admin_panel(),
            permissions: value
                .granted_permissions()
                .into_iter()
                .map(|key| key.as_str().to_owned())
                .collect(),
        }
    }
}

impl CheckAccessResponse {
    /// Describes a guard outcome for a caller that supplies no fallback.
    #[must_use]
    pub fn from_guard(decision: GuardDecision, render: &GuardRender<()>) -> Self {
        let (reason, message) = match decision {
            GuardDecision::Allow => (None, None),
            GuardDecision::Deny(reason) => {
                (Some(denial_code(&reason).to_owned()), Some(reason.message()))
            }
        };
        let (render, placeholder) = match render {
            GuardRender::Children(()) | GuardRender::Fallback(()) => ("children", None),
            GuardRender::AccessRestricted => (
                "access_restricted",
                Some(ACCESS_RESTRICTED_MESSAGE.to_owned()),
            ),
            GuardRender::Nothing => ("nothing", None),
        };

        Self {
            allowed: decision.is_allowed(),
            reason,
            message,
            render: render.to_owned(),
            placeholder,
        }
    }
}

impl From<Role> for RoleDefaultsResponse {
    fn from(value: Role) -> Self {
        Self {
            role: value.as_str().to_owned(),
            display_name: value.display_name().to_owned(),
            default_permissions: value
                .default_permissions()
                .granted()
                .map(|key| key.as_str().to_owned())
                .collect(),
        }
    }
}

impl PermissionCatalogResponse {
    /// Builds the catalog from the compiled-in keys and roles.
    #[must_use]
    pub fn current() -> Self {
        Self {
            permissions: PermissionKey::all()
                .iter()
                .map(|key| key.as_str().to_owned())
                .collect(),
            roles: Role::all()
                .iter()
                .copied()
                .map(RoleDefaultsResponse::from)
                .collect(),
        }
    }
}

fn denial_code(reason: &DenialReason) -> &'static str {
    match reason {
        DenialReason::Pending => "pending",
        DenialReason::CustomCheck => "custom_check",
        DenialReason::SystemAdminRequired => "system_admin_required",
        DenialReason::CompanyAdminRequired => "company_admin_required",
        DenialReason::RoleRequired(_) => "role_required",
        DenialReason::PermissionRequired(_) => "permission_required",
    }
}

#[cfg(test)]
mod tests {
    use gestor_application::{
        ACCESS_RESTRICTED_MESSAGE, DenialReason, EffectivePermissionSet, GuardDecision,
        GuardRender,
    };
    use gestor_core::CompanyId;
    use gestor_domain::{CompanyMembership, Department, PermissionKey, PermissionMap, Role};

    use super::{CheckAccessResponse, EffectivePermissionsResponse, PermissionCatalogResponse};

    #[test]
    fn resolved_set_lists_granted_keys_only() {
        let permissions = PermissionMap::new()
            .with(PermissionKey::Vendas, true)
            .with(PermissionKey::Financeiro, false);
        let membership =
            CompanyMembership::new("alice", CompanyId::new(), Role::Operador, permissions)
                .map(|membership| {
                    membership.with_departments(
                        Department::new("Vendas").into_iter().collect(),
                    )
                });
        let Ok(membership) = membership else {
            panic!("membership should be valid");
        };

        let set = EffectivePermissionSet::from_membership(&membership);
        let response = EffectivePermissionsResponse::from(&set);

        assert_eq!(response.status, "resolved");
        assert_eq!(response.role.as_deref(), Some("operador"));
        assert_eq!(response.departments, vec!["vendas".to_owned()]);
        assert_eq!(response.permissions, vec!["vendas".to_owned()]);
        assert!(!response.is_super_admin);
    }

    #[test]
    fn anonymous_set_has_no_scope() {
        let response = EffectivePermissionsResponse::from(&EffectivePermissionSet::anonymous());

        assert_eq!(response.status, "anonymous");
        assert!(response.subject.is_none());
        assert!(response.company_id.is_none());
        assert!(response.permissions.is_empty());
    }

    #[test]
    fn denial_carries_code_message_and_placeholder() {
        let response = CheckAccessResponse::from_guard(
            GuardDecision::Deny(DenialReason::PermissionRequired(PermissionKey::Financeiro)),
            &GuardRender::AccessRestricted,
        );

        assert!(!response.allowed);
        assert_eq!(response.reason.as_deref(), Some("permission_required"));
        assert!(
            response
                .message
                .is_some_and(|message| message.contains("financeiro"))
        );
        assert_eq!(response.render, "access_restricted");
        assert_eq!(response.placeholder.as_deref(), Some(ACCESS_RESTRICTED_MESSAGE));
    }

    #[test]
    fn hidden_denial_has_no_placeholder() {
        let response = CheckAccessResponse::from_guard(
            GuardDecision::Deny(DenialReason::SystemAdminRequired),
            &GuardRender::Nothing,
        );

        assert_eq!(response.render, "nothing");
        assert!(response.placeholder.is_none());
    }

    #[test]
    fn catalog_lists_every_key_and_role() {
        let catalog = PermissionCatalogResponse::current();

        assert_eq!(catalog.permissions.len(), PermissionKey::all().len());
        assert_eq!(catalog.roles.len(), 3);
        assert!(
            catalog
                .roles
                .iter()
                .any(|role| role.role == "super_admin"
                    && role.default_permissions.contains(&"admin_panel".to_owned()))
        );
    }
}
