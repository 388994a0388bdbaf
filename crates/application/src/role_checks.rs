use gestor_core::CompanyId;
use gestor_domain::{Department, Role};

use crate::EffectivePermissionSet;

impl EffectivePermissionSet {
    /// Returns whether the identity may use system administration.
    #[must_use]
    pub fn can_access_system_admin(&self) -> bool {
        self.is_super_admin()
    }

    /// Returns whether the identity administers the company.
    ///
    /// `None` means "the caller's own company".
    #[must_use]
    pub fn can_access_company_admin(&self, company_id: Option<CompanyId>) -> bool {
        if self.is_super_admin() {
            return true;
        }

        let Some(scope) = self.scope() else {
            return false;
        };

        scope.role == Role::Contratante && matches_company(scope.company_id, company_id)
    }

    /// Returns whether the identity may work with operational data.
    ///
    /// Company admins always may. Operators may inside their company, limited
    /// to their assigned departments when a department is given.
    #[must_use]
    pub fn can_access_operational_data(
        &self,
        company_id: Option<CompanyId>,
        department: Option<&Department>,
    ) -> bool {
        if self.can_access_company_admin(company_id) {
            return true;
        }

        let Some(scope) = self.scope() else {
            return false;
        };

        scope.role == Role::Operador
            && matches_company(scope.company_id, company_id)
            && department.is_none_or(|department| scope.departments.contains(department))
    }
}

fn matches_company(member_company_id: CompanyId, requested: Option<CompanyId>) -> bool {
    requested.is_none_or(|company_id| company_id == member_company_id)
}
