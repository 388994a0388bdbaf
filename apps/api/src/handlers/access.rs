use std::str::FromStr;

use axum::Json;
use axum::extract::Extension;
use gestor_application::{AccessGuard, EffectivePermissionSet};
use gestor_core::{AppResult, CompanyId};
use gestor_domain::{Department, PermissionKey, Role};

use crate::dto::{
    CheckAccessRequest, CheckAccessResponse, EffectivePermissionsResponse,
    PermissionCatalogResponse,
};
use crate::error::ApiResult;

pub async fn permissions_handler(
    Extension(permissions): Extension<EffectivePermissionSet>,
) -> Json<EffectivePermissionsResponse> {
    Json(EffectivePermissionsResponse::from(&permissions))
}

pub async fn check_access_handler(
    Extension(permissions): Extension<EffectivePermissionSet>,
    Json(payload): Json<CheckAccessRequest>,
) -> ApiResult<Json<CheckAccessResponse>> {
    let guard = guard_from_request(payload)?;
    let decision = guard.evaluate(&permissions);
    let render = guard.render(&permissions, (), None);

    Ok(Json(CheckAccessResponse::from_guard(decision, &render)))
}

pub async fn permission_catalog_handler() -> Json<PermissionCatalogResponse> {
    Json(PermissionCatalogResponse::current())
}

fn guard_from_request(payload: CheckAccessRequest) -> AppResult<AccessGuard> {
    let company_id = payload
        .company_id
        .as_deref()
        .map(CompanyId::from_str)
        .transpose()?;
    let department = payload
        .department
        .as_deref()
        .map(Department::new)
        .transpose()?;

    let mut guard = AccessGuard::new()
        .for_company(company_id)
        .for_department(department)
        .show_fallback(payload.show_fallback.unwrap_or(true));

    if payload.require_system_admin {
        guard = guard.require_system_admin();
    }
    if payload.require_company_admin {
        guard = guard.require_company_admin();
    }
    if let Some(role) = payload.required_role.as_deref() {
        guard = guard.require_role(Role::from_str(role)?);
    }
    if let Some(permission) = payload.required_permission.as_deref() {
        guard = guard.require_permission(PermissionKey::from_transport(permission)?);
    }

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use gestor_application::{DenialReason, EffectivePermissionSet, GuardDecision, GuardRender};
    use gestor_core::CompanyId;
    use gestor_domain::{CompanyMembership, PermissionKey, PermissionMap, Role};

    use super::guard_from_request;
    use crate::dto::CheckAccessRequest;

    fn contratante(company_id: CompanyId) -> EffectivePermissionSet {
        let permissions = PermissionMap::new().with(PermissionKey::Financeiro, true);
        match CompanyMembership::new("carla", company_id, Role::Contratante, permissions) {
            Ok(membership) => EffectivePermissionSet::from_membership(&membership),
            Err(error) => panic!("test membership must be valid: {error}"),
        }
    }

    #[test]
    fn empty_request_allows_resolved_subject() {
        let guard = guard_from_request(CheckAccessRequest::default());
        let Ok(guard) = guard else {
            panic!("empty request should build a guard");
        };

        assert_eq!(
            guard.evaluate(&contratante(CompanyId::new())),
            GuardDecision::Allow
        );
    }

    #[test]
    fn empty_request_allows_unscoped_sets_but_not_loading() {
        let Ok(guard) = guard_from_request(CheckAccessRequest::default()) else {
            panic!("empty request should build a guard");
        };

        assert!(
            guard
                .evaluate(&EffectivePermissionSet::anonymous())
                .is_allowed()
        );
        assert!(
            guard
                .evaluate(&EffectivePermissionSet::without_membership("novo"))
                .is_allowed()
        );
        assert_eq!(
            guard.evaluate(&EffectivePermissionSet::loading()),
            GuardDecision::Deny(DenialReason::Pending)
        );
    }

    #[test]
    fn show_fallback_false_hides_the_placeholder() {
        let request = CheckAccessRequest {
            require_system_admin: true,
            show_fallback: Some(false),
            ..CheckAccessRequest::default()
        };
        let Ok(guard) = guard_from_request(request) else {
            panic!("request should build a guard");
        };

        assert_eq!(
            guard.render(&contratante(CompanyId::new()), (), None),
            GuardRender::Nothing
        );
    }

    #[test]
    fn system_admin_requirement_denies_contratante() {
        let request = CheckAccessRequest {
            require_system_admin: true,
            ..CheckAccessRequest::default()
        };
        let Ok(guard) = guard_from_request(request) else {
            panic!("request should build a guard");
        };

        assert_eq!(
            guard.evaluate(&contratante(CompanyId::new())),
            GuardDecision::Deny(DenialReason::SystemAdminRequired)
        );
    }

    #[test]
    fn foreign_company_denies_company_admin_check() {
        let request = CheckAccessRequest {
            require_company_admin: true,
            company_id: Some(CompanyId::new().to_string()),
            ..CheckAccessRequest::default()
        };
        let Ok(guard) = guard_from_request(request) else {
            panic!("request should build a guard");
        };

        assert_eq!(
            guard.evaluate(&contratante(CompanyId::new())),
            GuardDecision::Deny(DenialReason::CompanyAdminRequired)
        );
    }

    #[test]
    fn unknown_keys_and_legacy_roles_are_rejected() {
        let unknown_permission = CheckAccessRequest {
            required_permission: Some("payroll".to_owned()),
            ..CheckAccessRequest::default()
        };
        let legacy_role = CheckAccessRequest {
            required_role: Some("admin".to_owned()),
            ..CheckAccessRequest::default()
        };
        let bad_company = CheckAccessRequest {
            company_id: Some("matriz".to_owned()),
            ..CheckAccessRequest::default()
        };

        assert!(guard_from_request(unknown_permission).is_err());
        assert!(guard_from_request(legacy_role).is_err());
        assert!(guard_from_request(bad_company).is_err());
    }
}
