use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use gestor_core::{AppError, AppResult, CompanyId};
use gestor_domain::Department;

use crate::{AccessGuard, CustomCheck, EffectivePermissionSet};

/// Requirement that caused a route to be denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDenial {
    /// Nobody is signed in.
    Unauthenticated,
    /// The route is for super admins.
    SuperAdminRequired,
    /// The route is for company administrators.
    ContratanteRequired,
    /// The route is for operators of the department.
    OperadorRequired,
    /// The route uses the legacy administrator flag.
    AdminRequired,
    /// The route's custom predicate failed.
    CustomCheckFailed,
}

impl RouteDenial {
    /// Returns a stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::SuperAdminRequired => "super_admin_required",
            Self::ContratanteRequired => "contratante_required",
            Self::OperadorRequired => "operador_required",
            Self::AdminRequired => "admin_required",
            Self::CustomCheckFailed => "custom_check_failed",
        }
    }

    /// Returns the access-denied message for this requirement.
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "Sign in to access this page.",
            Self::SuperAdminRequired => "This page is restricted to super administrators.",
            Self::ContratanteRequired => {
                "This page is restricted to the company's contracting administrator."
            }
            Self::OperadorRequired => {
                "This page is restricted to operators assigned to this department."
            }
            Self::AdminRequired => "This page is restricted to administrators.",
            Self::CustomCheckFailed => "You do not have access to this page.",
        }
    }
}

/// Observable state of a protected route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteState {
    /// Permissions are still resolving; render a loading indicator.
    Loading,
    /// A requirement failed; render the typed access-denied message.
    Denied(RouteDenial),
    /// Render the page.
    Allowed,
}

impl RouteState {
    /// Converts the state into an application result for request handling.
    pub fn require_allowed(self) -> AppResult<()> {
        match self {
            Self::Allowed => Ok(()),
            Self::Loading => Err(AppError::Unauthorized(
                "session check is still pending".to_owned(),
            )),
            Self::Denied(RouteDenial::Unauthenticated) => Err(AppError::Unauthorized(
                RouteDenial::Unauthenticated.message().to_owned(),
            )),
            Self::Denied(denial) => Err(AppError::Forbidden(denial.message().to_owned())),
        }
    }
}

/// Requirements applied at a page or route boundary.
#[derive(Clone, Default)]
pub struct RouteProtection {
    require_super_admin: bool,
    require_contratante: bool,
    require_operador: bool,
    require_admin: bool,
    custom_check: Option<CustomCheck>,
    company_id: Option<CompanyId>,
    department: Option<Department>,
}

impl Debug for RouteProtection {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("RouteProtection")
            .field("require_super_admin", &self.require_super_admin)
            .field("require_contratante", &self.require_contratante)
            .field("require_operador", &self.require_operador)
            .field("require_admin", &self.require_admin)
            .field("custom_check", &self.custom_check.is_some())
            .field("company_id", &self.company_id)
            .field("department", &self.department)
            .finish()
    }
}

impl RouteProtection {
    /// Creates a protection that only requires a signed-in identity.
    #[must_use]
    pub fn authenticated() -> Self {
        Self::default()
    }

    /// Requires a super admin.
    #[must_use]
    pub fn require_super_admin(mut self) -> Self {
        self.require_super_admin = true;
        self
    }

    /// Requires the company's contracting administrator.
    #[must_use]
    pub fn require_contratante(mut self) -> Self {
        self.require_contratante = true;
        self
    }

    /// Requires an operator (company admins also pass).
    #[must_use]
    pub fn require_operador(mut self) -> Self {
        self.require_operador = true;
        self
    }

    /// Legacy administrator flag, equivalent to company administration.
    #[must_use]
    pub fn require_admin(mut self) -> Self {
        self.require_admin = true;
        self
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

    /// Computes the route state. No requirement is evaluated while loading.
    ///
    /// Each requirement is an [`AccessGuard`], checked in the guard's order:
    /// the custom check first, then super admin, contratante, operador and
    /// the legacy administrator flag.
    #[must_use]
    pub fn evaluate(&self, permissions: &EffectivePermissionSet) -> RouteState {
        if permissions.is_loading() {
            return RouteState::Loading;
        }

        if !permissions.is_authenticated() {
            return RouteState::Denied(RouteDenial::Unauthenticated);
        }

        self.requirement_guards()
            .into_iter()
            .find(|(_, guard)| !guard.evaluate(permissions).is_allowed())
            .map_or(RouteState::Allowed, |(denial, _)| RouteState::Denied(denial))
    }

    fn requirement_guards(&self) -> Vec<(RouteDenial, AccessGuard)> {
        let mut guards = Vec::new();

        if let Some(check) = &self.custom_check {
            let check = Arc::clone(check);
            guards.push((
                RouteDenial::CustomCheckFailed,
                AccessGuard::new().custom_check(move |permissions| check(permissions)),
            ));
        }
        if self.require_super_admin {
            guards.push((RouteDenial::SuperAdminRequired, AccessGuard::super_admin()));
        }
        if self.require_contratante {
            guards.push((
                RouteDenial::ContratanteRequired,
                AccessGuard::contratante(self.company_id),
            ));
        }
        if self.require_operador {
            guards.push((
                RouteDenial::OperadorRequired,
                AccessGuard::operador(self.company_id, self.department.clone()),
            ));
        }
        if self.require_admin {
            guards.push((
                RouteDenial::AdminRequired,
                AccessGuard::new()
                    .require_company_admin()
                    .for_company(self.company_id),
            ));
        }

        guards
    }
}

/// Tracks a route's state across session and membership changes.
#[derive(Debug, Clone)]
pub struct RouteStateMachine {
    protection: RouteProtection,
    state: RouteState,
}

impl RouteStateMachine {
    /// Creates a machine in the loading state.
    #[must_use]
    pub fn new(protection: RouteProtection) -> Self {
        Self {
            protection,
            state: RouteState::Loading,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> RouteState {
        self.state
    }

    /// The identity changed: decisions made for the previous one are dropped.
    pub fn session_changed(&mut self) {
        self.state = RouteState::Loading;
    }

    /// Re-evaluates after permissions resolved. Returns whether the state changed.
    pub fn permissions_resolved(&mut self, permissions: &EffectivePermissionSet) -> bool {
        let next = self.protection.evaluate(permissions);
        let changed = next != self.state;
        self.state = next;
        changed
    }
}

#[cfg(test)]
mod tests {
    use gestor_core::{AppError, CompanyId};
    use gestor_domain::{CompanyMembership, Department, PermissionKey, Role};

    use crate::{AccessGuard, EffectivePermissionSet};

    use super::{RouteDenial, RouteProtection, RouteState, RouteStateMachine};

    fn resolved(role: Role, company_id: CompanyId, departments: &[&str]) -> EffectivePermissionSet {
        let departments = departments
            .iter()
            .filter_map(|name| Department::new(name).ok())
            .collect();

        CompanyMembership::new("member", company_id, role, role.default_permissions())
            .map(|membership| {
                EffectivePermissionSet::from_membership(&membership.with_departments(departments))
            })
            .unwrap_or_else(|_| EffectivePermissionSet::anonymous())
    }

    #[test]
    fn loading_wins_over_any_requirement() {
        let protection = RouteProtection::authenticated()
            .require_super_admin()
            .custom_check(|_| false);

        assert_eq!(
            protection.evaluate(&EffectivePermissionSet::loading()),
            RouteState::Loading
        );
    }

    #[test]
    fn anonymous_is_unauthenticated() {
        assert_eq!(
            RouteProtection::authenticated().evaluate(&EffectivePermissionSet::anonymous()),
            RouteState::Denied(RouteDenial::Unauthenticated)
        );
    }

    #[test]
    fn signed_in_without_membership_passes_plain_protection() {
        let set = EffectivePermissionSet::without_membership("novo");
        assert_eq!(
            RouteProtection::authenticated().evaluate(&set),
            RouteState::Allowed
        );
        assert_eq!(
            RouteProtection::authenticated()
                .require_operador()
                .evaluate(&set),
            RouteState::Denied(RouteDenial::OperadorRequired)
        );
    }

    #[test]
    fn denial_message_names_the_failed_requirement() {
        let set = resolved(Role::Operador, CompanyId::new(), &["vendas"]);

        assert_eq!(
            RouteProtection::authenticated()
                .require_super_admin()
                .evaluate(&set),
            RouteState::Denied(RouteDenial::SuperAdminRequired)
        );
        assert_eq!(
            RouteProtection::authenticated()
                .require_contratante()
                .evaluate(&set),
            RouteState::Denied(RouteDenial::ContratanteRequired)
        );
        assert_eq!(
            RouteProtection::authenticated()
                .require_admin()
                .evaluate(&set),
            RouteState::Denied(RouteDenial::AdminRequired)
        );
        assert_eq!(
            RouteProtection::authenticated()
                .custom_check(|permissions| permissions.has_permission(PermissionKey::Financeiro))
                .evaluate(&set),
            RouteState::Denied(RouteDenial::CustomCheckFailed)
        );
    }

    #[test]
    fn failing_custom_check_denies_super_admin_route_first() {
        let set = resolved(Role::Operador, CompanyId::new(), &["vendas"]);
        let protection = RouteProtection::authenticated()
            .require_super_admin()
            .custom_check(|_| false);

        assert_eq!(
            protection.evaluate(&set),
            RouteState::Denied(RouteDenial::CustomCheckFailed)
        );
        assert_eq!(
            protection.evaluate(&resolved(Role::SuperAdmin, CompanyId::new(), &[])),
            RouteState::Denied(RouteDenial::CustomCheckFailed)
        );
    }

    #[test]
    fn route_and_component_guards_agree() {
        let company_id = CompanyId::new();
        let sets = [
            resolved(Role::SuperAdmin, CompanyId::new(), &[]),
            resolved(Role::Contratante, company_id, &[]),
            resolved(Role::Contratante, CompanyId::new(), &[]),
            resolved(Role::Operador, company_id, &["vendas"]),
            EffectivePermissionSet::without_membership("novo"),
        ];
        let vendas = Department::new("vendas").ok();

        for set in &sets {
            assert_eq!(
                RouteProtection::authenticated()
                    .require_contratante()
                    .for_company(Some(company_id))
                    .evaluate(set)
                    == RouteState::Allowed,
                AccessGuard::contratante(Some(company_id))
                    .evaluate(set)
                    .is_allowed()
            );
            assert_eq!(
                RouteProtection::authenticated()
                    .require_operador()
                    .for_company(Some(company_id))
                    .for_department(vendas.clone())
                    .evaluate(set)
                    == RouteState::Allowed,
                AccessGuard::operador(Some(company_id), vendas.clone())
                    .evaluate(set)
                    .is_allowed()
            );
        }
    }

    #[test]
    fn operador_route_respects_department() {
        let set = resolved(Role::Operador, CompanyId::new(), &["vendas"]);

        let vendas = RouteProtection::authenticated()
            .require_operador()
            .for_department(Department::new("vendas").ok());
        let financeiro = RouteProtection::authenticated()
            .require_operador()
            .for_department(Department::new("financeiro").ok());

        assert_eq!(vendas.evaluate(&set), RouteState::Allowed);
        assert_eq!(
            financeiro.evaluate(&set),
            RouteState::Denied(RouteDenial::OperadorRequired)
        );
    }

    #[test]
    fn require_allowed_maps_denials_to_errors() {
        assert!(RouteState::Allowed.require_allowed().is_ok());
        assert!(matches!(
            RouteState::Denied(RouteDenial::Unauthenticated).require_allowed(),
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            RouteState::Denied(RouteDenial::SuperAdminRequired).require_allowed(),
            Err(AppError::Forbidden(message))
                if message == RouteDenial::SuperAdminRequired.message()
        ));
    }

    #[test]
    fn machine_reenters_loading_on_session_change() {
        let company_id = CompanyId::new();
        let mut machine =
            RouteStateMachine::new(RouteProtection::authenticated().require_contratante());
        assert_eq!(machine.state(), RouteState::Loading);

        assert!(!machine.permissions_resolved(&EffectivePermissionSet::loading()));
        assert_eq!(machine.state(), RouteState::Loading);

        assert!(machine.permissions_resolved(&resolved(Role::Operador, company_id, &[])));
        assert_eq!(
            machine.state(),
            RouteState::Denied(RouteDenial::ContratanteRequired)
        );

        machine.session_changed();
        assert_eq!(machine.state(), RouteState::Loading);

        assert!(machine.permissions_resolved(&resolved(Role::Contratante, company_id, &[])));
        assert_eq!(machine.state(), RouteState::Allowed);
    }
}
