use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, header};
use axum::middleware::Next;
use axum::response::Response;
use gestor_application::{RouteProtection, RouteState};
use gestor_core::AppError;
use tower_sessions::Session;
use tracing::{debug, error};

use crate::auth::read_session_state;
use crate::error::ApiResult;
use crate::state::AppState;

/// Resolves the caller's permissions and applies the route's [`RouteProtection`].
///
/// On success the resolved set and identity are inserted as request extensions.
pub async fn require_route_access(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let Some(protection) = request.extensions().get::<RouteProtection>().cloned() else {
        error!(path = request.uri().path(), "route has no access protection configured");
        return Err(AppError::Internal(format!(
            "route '{}' has no access protection configured",
            request.uri().path()
        ))
        .into());
    };

    let session_state = read_session_state(&session).await?;
    let permissions = state.permission_resolver.resolve(&session_state).await;

    let route_state = protection.evaluate(&permissions);
    if let RouteState::Denied(denial) = route_state {
        debug!(
            path = request.uri().path(),
            subject = permissions.subject().unwrap_or("anonymous"),
            denial = denial.as_str(),
            "route access denied"
        );
    }
    route_state.require_allowed()?;

    if let Some(identity) = session_state.identity() {
        request.extensions_mut().insert(identity.clone());
    }
    request.extensions_mut().insert(permissions);

    Ok(next.run(request).await)
}

pub async fn require_same_origin_for_mutations(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    if is_state_changing_method(request.method()) {
        let headers = request.headers();

        if let Some(fetch_site) = headers.get("sec-fetch-site")
            && fetch_site == HeaderValue::from_static("cross-site")
        {
            return Err(AppError::Unauthorized("cross-site request blocked".to_owned()).into());
        }

        let origin = headers
            .get(header::ORIGIN)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        let referer = headers
            .get(header::REFERER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        let allowed_origin = state.frontend_url;
        let origin_is_allowed = origin == allowed_origin;
        let referer_is_allowed = referer.starts_with(&format!("{allowed_origin}/"));

        if !origin_is_allowed && !referer_is_allowed {
            return Err(AppError::Unauthorized("origin validation failed".to_owned()).into());
        }
    }

    Ok(next.run(request).await)
}

fn is_state_changing_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}
