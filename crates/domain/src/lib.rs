//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod membership;
mod permission;
mod role;

pub use membership::{CompanyMembership, Department};
pub use permission::{
    PermissionKey, PermissionMap, PermissionShapeIssue, validate_permission_map,
};
pub use role::Role;
