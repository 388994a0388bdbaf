use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, State};
use gestor_application::EffectivePermissionSet;
use gestor_core::{AppError, CompanyId};
use gestor_domain::Department;

use crate::dto::{DepartmentSummaryResponse, MembershipResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_company_memberships_handler(
    State(state): State<AppState>,
    Extension(permissions): Extension<EffectivePermissionSet>,
    Path(company_id): Path<String>,
) -> ApiResult<Json<Vec<MembershipResponse>>> {
    let company_id = CompanyId::from_str(company_id.as_str())?;
    let memberships = state
        .membership_directory_service
        .list_company_memberships(&permissions, company_id)
        .await?
        .into_iter()
        .map(MembershipResponse::from)
        .collect();

    Ok(Json(memberships))
}

pub async fn list_own_company_memberships_handler(
    State(state): State<AppState>,
    Extension(permissions): Extension<EffectivePermissionSet>,
) -> ApiResult<Json<Vec<MembershipResponse>>> {
    let company_id = permissions.company_id().ok_or_else(|| {
        AppError::Forbidden("an active company membership is required".to_owned())
    })?;

    let memberships = state
        .membership_directory_service
        .list_company_memberships(&permissions, company_id)
        .await?
        .into_iter()
        .map(MembershipResponse::from)
        .collect();

    Ok(Json(memberships))
}

pub async fn department_summary_handler(
    State(state): State<AppState>,
    Extension(permissions): Extension<EffectivePermissionSet>,
    Path(department): Path<String>,
) -> ApiResult<Json<DepartmentSummaryResponse>> {
    let department = Department::new(department.as_str())?;
    let members = state
        .membership_directory_service
        .list_department_members(&permissions, &department)
        .await?
        .into_iter()
        .map(MembershipResponse::from)
        .collect();

    let company_id = permissions
        .company_id()
        .map(|company_id| company_id.to_string())
        .unwrap_or_default();

    Ok(Json(DepartmentSummaryResponse {
        company_id,
        department: department.as_str().to_owned(),
        members,
    }))
}
