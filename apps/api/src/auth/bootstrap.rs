use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use gestor_core::{AppError, NonEmptyString, UserIdentity};
use tower_sessions::Session;
use tracing::{info, warn};

use crate::dto::BootstrapRequest;
use crate::error::ApiResult;
use crate::state::AppState;

use super::{SESSION_CREATED_AT_KEY, SESSION_USER_KEY};

pub async fn bootstrap_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<BootstrapRequest>,
) -> ApiResult<StatusCode> {
    if payload.token != state.bootstrap_token {
        warn!(subject = payload.subject.as_str(), "bootstrap sign-in rejected");
        return Err(AppError::Unauthorized("invalid bootstrap token".to_owned()).into());
    }

    let subject = NonEmptyString::new(payload.subject.trim())?;
    let email = payload
        .email
        .map(|email| email.trim().to_owned())
        .filter(|email| !email.is_empty());
    let identity = UserIdentity::new(String::from(subject), email);

    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;

    session
        .insert(SESSION_USER_KEY, &identity)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session identity: {error}"))
        })?;

    session
        .insert(SESSION_CREATED_AT_KEY, chrono::Utc::now().timestamp())
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session creation time: {error}"))
        })?;

    info!(subject = identity.subject(), "bootstrap sign-in");

    Ok(StatusCode::NO_CONTENT)
}
