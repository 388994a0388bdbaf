use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use gestor_core::CompanyId;
use gestor_domain::{Department, PermissionKey, Role};

use crate::EffectivePermissionSet;

/// Placeholder text rendered when access is denied without a fallback.
pub const ACCESS_RESTRICTED_MESSAGE: &str = "Access Restricted";

/// Caller-supplied predicate evaluated before any role requirement.
pub type CustomCheck = Arc<dyn Fn(&EffectivePermissionSet) -> bool + Send + Sync>;

/// Why a guard denied access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// Permissions are still loading; no denial message should be shown yet.
    Pending,
    /// The custom predicate returned `false`.
    CustomCheck,
    /// System administration was required.
    SystemAdminRequired,
    /// Company administration was required.
    CompanyAdminRequired,
    /// A specific role was required.
    RoleRequired(Role),
    /// A specific screen permission was required.
    PermissionRequired(PermissionKey),
}

impl DenialReason {
    /// Returns the message shown to the user.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Pending => "Checking permissions".to_owned(),
            Self::CustomCheck => "You do not meet the requirements to view this content".to_owned(),
            Self::SystemAdminRequired => {
                "Only system administrators can view this content".to_owned()
            }
            Self::CompanyAdminRequired => {
                "Only company administrators can view this content".to_owned()
            }
            Self::RoleRequired(role) => {
                format!("The {} role is required to view this content", role.display_name())
            }
            Self::PermissionRequired(key) => {
                format!("Permission '{key}' is required to view this content")
            }
        }
    }
}

/// Result of evaluating a guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Render the protected content.
    Allow,
    /// Do not render the protected content.
    Deny(DenialReason),
}

impl GuardDecision {
    /// Returns whether access was allowed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// What a guard renders in place of its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardRender<T> {
    /// The protected content, unmodified.
    Children(T),
    /// The caller-supplied fallback.
    Fallback(T),
    /// The built-in [`ACCESS_RESTRICTED_MESSAGE`] placeholder.
    AccessRestricted,
    /// Nothing at all.
    Nothing,
}

/// Declarative access guard.
///
/// Requirements are checked in a fixed order and the first failing one wins:
/// custom check, system admin, company admin, required role, required
/// permission.
#[derive(Clone)]
pub struct AccessGuard {
    custom_check: Option<CustomCheck>,
    require_system_admin: bool,
    require_company_admin: bool,
    required_role: Option<Role>,
    required_permission: Option<PermissionKey>,
    company_id: Option<CompanyId>,
    department: Option<Department>,
    show_fallback: bool,
}

impl Default for AccessGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for AccessGuard {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("AccessGuard")
            .field("custom_check", &self.custom_check.is_some())
            .field("require_system_admin", &self.require_system_admin)
            .field("require_company_admin", &self.require_company_admin)
            .field("required_role", &self.required_role)
            .field("required_permission", &self.required_permission)
            .field("company_id", &self.company_id)
            .field("department", &self.department)
            .field("show_fallback", &self.show_fallback)
            .finish()
    }
}

impl AccessGuard {
    /// Creates a guard without requirements that renders fallbacks on denial.
    #[must_use]
    pub fn new() -> Self {
        Self {
            custom_check: None,
            require_system_admin: false,
            require_company_admin: false,
            required_role: None,
            required_permission: None,
            company_id: None,
            department: None,
            show_fallback: true,
        }
    }

    /// Guard that only lets super admins through.
    #[must_use]
    pub fn super_admin() -> Self {
        Self::new().require_role(Role::SuperAdmin)
    }

    /// Guard that lets company administrators of `company_id` through.
    #[must_use]
    pub fn contratante(company_id: Option<CompanyId>) -> Self {
        Self::new()
            .require_role(Role::Contratante)
            .for_company(company_id)
    }

    /// Guard that lets operators of `department` (and company admins) through.
    #[must_use]
    pub fn operador(company_id: Option<CompanyId>, department: Option<Department>) -> Self {
        Self::new()
            .require_role(Role::Operador)
            .for_company(company_id)
            .for_department(department)
    }

    /// Adds a custom predicate.
    #[must_use]
    pub fn custom_check(
        mut self,
        check: impl Fn(&EffectivePermissionSet) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.custom_check = Some(Arc::new(check));
        self
    }

    /// Requires system administration.
    #[must_use]
    pub fn require_system_admin(mut self) -> Self {
        self.require_system_admin = true;
        self
    }

    /// Requires company administration.
    #[must_use]
    pub fn require_company_admin(mut self) -> Self {
        self.require_company_admin = true;
        self
    }

    /// Requires a role.
    #[must_use]
    pub fn require_role(mut self, role: Role) -> Self {
        self.required_role = Some(role);
        self
    }

    /// Requires a screen permission.
    #[must_use]
    pub fn require_permission(mut self, key: PermissionKey) -> Self {
        self.required_permission = Some(key);
        self
    }

    /// Scopes company checks to a company.
    #[must_use]
    pub fn for_company(mut self, company_id: Option<CompanyId>) -> Self {
        self.company_id = company_id;
        self
    }

    /// Scopes operator checks to a department.
    #[must_use]
    pub fn for_department(mut self, department: Option<Department>) -> Self {
        self.department = department;
        self
    }

    /// Sets whether anything is rendered on denial.
    #[must_use]
    pub fn show_fallback(mut self, show_fallback: bool) -> Self {
        self.show_fallback = show_fallback;
        self
    }

    /// Evaluates the guard against resolved permissions.
    #[must_use]
    pub fn evaluate(&self, permissions: &EffectivePermissionSet) -> GuardDecision {
        if permissions.is_loading() {
            return GuardDecision::Deny(DenialReason::Pending);
        }

        if let Some(check) = &self.custom_check
            && !check(permissions)
        {
            return GuardDecision::Deny(DenialReason::CustomCheck);
        }

        if self.require_system_admin && !permissions.can_access_system_admin() {
            return GuardDecision::Deny(DenialReason::SystemAdminRequired);
        }

        if self.require_company_admin && !permissions.can_access_company_admin(self.company_id) {
            return GuardDecision::Deny(DenialReason::CompanyAdminRequired);
        }

        if let Some(role) = self.required_role
            && !self.role_check(permissions, role)
        {
            return GuardDecision::Deny(DenialReason::RoleRequired(role));
        }

        if let Some(key) = self.required_permission
            && !permissions.has_permission(key)
        {
            return GuardDecision::Deny(DenialReason::PermissionRequired(key));
        }

        GuardDecision::Allow
    }

    /// Chooses what to render for the given permissions.
    pub fn render<T>(
        &self,
        permissions: &EffectivePermissionSet,
        children: T,
        fallback: Option<T>,
    ) -> GuardRender<T> {
        match self.evaluate(permissions) {
            GuardDecision::Allow => GuardRender::Children(children),
            GuardDecision::Deny(DenialReason::Pending) => GuardRender::Nothing,
            GuardDecision::Deny(_) if !self.show_fallback => GuardRender::Nothing,
            GuardDecision::Deny(_) => {
                fallback.map_or(GuardRender::AccessRestricted, GuardRender::Fallback)
            }
        }
    }

    fn role_check(&self, permissions: &EffectivePermissionSet, role: Role) -> bool {
        match role {
            Role::SuperAdmin => permissions.can_access_system_admin(),
            Role::Contratante => permissions.can_access_company_admin(self.company_id),
            Role::Operador => permissions
                .can_access_operational_data(self.company_id, self.department.as_ref()),
        }
    }
}
