//! Application services and ports.

#![forbid(unsafe_code)]

mod access_guard;
mod effective_permissions;
mod membership_directory_service;
mod membership_ports;
mod permission_resolver;
mod role_checks;
mod route_protection;

pub use access_guard::{
    ACCESS_RESTRICTED_MESSAGE, AccessGuard, CustomCheck, DenialReason, GuardDecision, GuardRender,
};
pub use effective_permissions::{EffectivePermissionSet, MembershipScope, ResolutionStatus};
pub use membership_directory_service::MembershipDirectoryService;
pub use membership_ports::MembershipRepository;
pub use permission_resolver::PermissionResolver;
pub use route_protection::{RouteDenial, RouteProtection, RouteState, RouteStateMachine};
