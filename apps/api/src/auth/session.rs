use axum::Json;
use axum::extract::Extension;
use axum::http::StatusCode;
use gestor_application::EffectivePermissionSet;
use gestor_core::{AppError, UserIdentity};
use tower_sessions::Session;
use tracing::info;

use crate::dto::{EffectivePermissionsResponse, UserIdentityResponse};
use crate::error::ApiResult;

use super::SESSION_USER_KEY;

pub async fn logout_handler(session: Session) -> ApiResult<StatusCode> {
    let subject = session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .map(|identity| identity.subject().to_owned());

    session
        .delete()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

    if let Some(subject) = subject {
        info!(subject = subject.as_str(), "signed out");
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn me_handler(
    Extension(identity): Extension<UserIdentity>,
    Extension(permissions): Extension<EffectivePermissionSet>,
) -> Json<UserIdentityResponse> {
    Json(UserIdentityResponse {
        subject: identity.subject().to_owned(),
        email: identity.email().map(ToOwned::to_owned),
        permissions: EffectivePermissionsResponse::from(&permissions),
    })
}
