use gestor_core::CompanyId;
use gestor_domain::{CompanyMembership, Department, PermissionKey, PermissionMap, Role};

/// Outcome of one permission resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionStatus {
    /// The session check is still pending.
    Loading,
    /// No identity is signed in.
    Anonymous,
    /// The identity has no active membership.
    NoMembership,
    /// Permissions were resolved from an active membership.
    Resolved,
    /// The membership store failed and every permission was denied.
    Failed,
}

impl ResolutionStatus {
    /// Returns a stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Anonymous => "anonymous",
            Self::NoMembership => "no_membership",
            Self::Resolved => "resolved",
            Self::Failed => "failed",
        }
    }
}

/// Company-scoped part of a resolved membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipScope {
    /// Company the membership belongs to.
    pub company_id: CompanyId,
    /// Role held in the company.
    pub role: Role,
    /// Department assignments.
    pub departments: Vec<Department>,
}

/// Permission state derived for one request or render pass.
///
/// Never persisted. Everything defaults to deny.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectivePermissionSet {
    status: ResolutionStatus,
    subject: Option<String>,
    scope: Option<MembershipScope>,
    permissions: PermissionMap,
    is_super_admin: bool,
}

impl EffectivePermissionSet {
    /// Returns the set used while the session check is pending.
    #[must_use]
    pub fn loading() -> Self {
        Self::denied(ResolutionStatus::Loading, None)
    }

    /// Returns the set used when nobody is signed in.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::denied(ResolutionStatus::Anonymous, None)
    }

    /// Returns the set for a signed-in subject without an active membership.
    #[must_use]
    pub fn without_membership(subject: &str) -> Self {
        Self::denied(ResolutionStatus::NoMembership, Some(subject.to_owned()))
    }

    /// Returns the fail-closed set used after a membership fetch error.
    #[must_use]
    pub fn failed(subject: &str) -> Self {
        Self::denied(ResolutionStatus::Failed, Some(subject.to_owned()))
    }

    /// Derives the set from an active membership.
    #[must_use]
    pub fn from_membership(membership: &CompanyMembership) -> Self {
        let is_super_admin = membership.role() == Role::SuperAdmin;
        let permissions = if is_super_admin {
            PermissionKey::all().iter().copied().collect()
        } else {
            membership.permissions().clone()
        };

        Self {
            status: ResolutionStatus::Resolved,
            subject: Some(membership.subject().as_str().to_owned()),
            scope: Some(MembershipScope {
                company_id: membership.company_id(),
                role: membership.role(),
                departments: membership.departments().to_vec(),
            }),
            permissions,
            is_super_admin,
        }
    }

    fn denied(status: ResolutionStatus, subject: Option<String>) -> Self {
        Self {
            status,
            subject,
            scope: None,
            permissions: PermissionMap::new(),
            is_super_admin: false,
        }
    }

    /// Returns how the set was resolved.
    #[must_use]
    pub fn status(&self) -> ResolutionStatus {
        self.status
    }

    /// Returns whether the session check is still pending.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.status == ResolutionStatus::Loading
    }

    /// Returns whether an identity is signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.subject.is_some()
    }

    /// Returns the signed-in subject.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Returns the membership scope, if a membership was resolved.
    #[must_use]
    pub fn scope(&self) -> Option<&MembershipScope> {
        self.scope.as_ref()
    }

    /// Returns the membership role, if any.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.scope.as_ref().map(|scope| scope.role)
    }

    /// Returns the membership company, if any.
    #[must_use]
    pub fn company_id(&self) -> Option<CompanyId> {
        self.scope.as_ref().map(|scope| scope.company_id)
    }

    /// Returns whether the identity is a super admin.
    #[must_use]
    pub fn is_super_admin(&self) -> bool {
        self.is_super_admin
    }

    /// Returns whether the identity may manage the platform itself.
    #[must_use]
    pub fn can_manage_system(&self) -> bool {
        self.is_super_admin
    }

    /// Returns whether the identity may open the administration console.
    #[must_use]
    pub fn can_access_admin_panel(&self) -> bool {
        self.is_super_admin || self.permissions.is_granted(PermissionKey::AdminPanel)
    }

    /// Returns whether one screen permission is granted.
    #[must_use]
    pub fn has_permission(&self, key: PermissionKey) -> bool {
        self.permissions.is_granted(key)
    }

    /// Returns the granted permission keys in catalog order.
    #[must_use]
    pub fn granted_permissions(&self) -> Vec<PermissionKey> {
        self.permissions.granted().collect()
    }
}
