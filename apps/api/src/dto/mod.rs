mod access;
mod auth;
mod common;
mod memberships;

pub use access::{
    CheckAccessRequest, CheckAccessResponse, EffectivePermissionsResponse,
    PermissionCatalogResponse, RoleDefaultsResponse,
};
pub use auth::BootstrapRequest;
pub use common::{HealthDependencyStatus, HealthResponse, UserIdentityResponse};
pub use memberships::{DepartmentSummaryResponse, MembershipResponse};
