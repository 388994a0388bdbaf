use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use gestor_application::RouteProtection;

use crate::state::AppState;
use crate::{auth, handlers, middleware};

/// Any signed-in identity, with or without a membership.
pub(super) fn build_authenticated_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(auth::me_handler))
        .route(
            "/api/access/permissions",
            get(handlers::access::permissions_handler),
        )
        .route("/api/access/check", post(handlers::access::check_access_handler))
        .route(
            "/api/access/catalog",
            get(handlers::access::permission_catalog_handler),
        )
        .route_layer(from_fn_with_state(app_state, middleware::require_route_access))
        .layer(axum::Extension(RouteProtection::authenticated()))
}

pub(super) fn build_system_admin_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/admin/companies/{company_id}/memberships",
            get(handlers::memberships::list_company_memberships_handler),
        )
        .route_layer(from_fn_with_state(app_state, middleware::require_route_access))
        .layer(axum::Extension(
            RouteProtection::authenticated().require_super_admin(),
        ))
}

pub(super) fn build_company_admin_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/company/memberships",
            get(handlers::memberships::list_own_company_memberships_handler),
        )
        .route_layer(from_fn_with_state(app_state, middleware::require_route_access))
        .layer(axum::Extension(
            RouteProtection::authenticated().require_contratante(),
        ))
}

/// Department scoping happens in the handler, where the path is known.
pub(super) fn build_operational_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/operations/{department}/summary",
            get(handlers::memberships::department_summary_handler),
        )
        .route_layer(from_fn_with_state(app_state, middleware::require_route_access))
        .layer(axum::Extension(
            RouteProtection::authenticated().require_operador(),
        ))
}
