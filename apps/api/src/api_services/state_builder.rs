use std::sync::Arc;

use gestor_application::{
    MembershipDirectoryService, MembershipRepository, PermissionResolver,
};
use gestor_infrastructure::PostgresMembershipRepository;
use sqlx::PgPool;

use crate::api_config::ApiConfig;
use crate::state::AppState;

pub fn build_app_state(pool: PgPool, config: &ApiConfig) -> AppState {
    let membership_repository: Arc<dyn MembershipRepository> =
        Arc::new(PostgresMembershipRepository::new(pool.clone()));

    AppState {
        permission_resolver: PermissionResolver::new(membership_repository.clone()),
        membership_directory_service: MembershipDirectoryService::new(membership_repository),
        frontend_url: config.frontend_url.clone(),
        bootstrap_token: config.bootstrap_token.clone(),
        postgres_pool: Some(pool),
    }
}

/// Builds state around an arbitrary membership store, without a database pool.
#[cfg(test)]
pub fn build_in_memory_app_state(
    membership_repository: Arc<dyn MembershipRepository>,
    frontend_url: &str,
    bootstrap_token: &str,
) -> AppState {
    AppState {
        permission_resolver: PermissionResolver::new(membership_repository.clone()),
        membership_directory_service: MembershipDirectoryService::new(membership_repository),
        frontend_url: frontend_url.to_owned(),
        bootstrap_token: bootstrap_token.to_owned(),
        postgres_pool: None,
    }
}
