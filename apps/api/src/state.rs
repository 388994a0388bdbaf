use gestor_application::{MembershipDirectoryService, PermissionResolver};
use sqlx::PgPool;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub permission_resolver: PermissionResolver,
    pub membership_directory_service: MembershipDirectoryService,
    pub frontend_url: String,
    pub bootstrap_token: String,
    pub postgres_pool: Option<PgPool>,
}
