mod cors;
mod protected;

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use gestor_core::AppError;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{auth, handlers, middleware};

use self::cors::build_cors_layer;
use self::protected::{
    build_authenticated_routes, build_company_admin_routes, build_operational_routes,
    build_system_admin_routes,
};

/// Builds the HTTP router. The caller adds the session layer on top.
pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let cors_layer = build_cors_layer(frontend_url)?;

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/auth/bootstrap", post(auth::bootstrap_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .merge(build_authenticated_routes(app_state.clone()))
        .merge(build_system_admin_routes(app_state.clone()))
        .merge(build_company_admin_routes(app_state.clone()))
        .merge(build_operational_routes(app_state.clone()))
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(app_state))
}
