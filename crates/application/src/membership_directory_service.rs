use std::sync::Arc;

use gestor_core::{AppError, AppResult, CompanyId};
use gestor_domain::{CompanyMembership, Department};

use crate::{EffectivePermissionSet, MembershipRepository};

/// Read-only membership listings for the administration screens.
#[derive(Clone)]
pub struct MembershipDirectoryService {
    repository: Arc<dyn MembershipRepository>,
}

impl MembershipDirectoryService {
    /// Creates a new directory service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn MembershipRepository>) -> Self {
        Self { repository }
    }

    /// Lists memberships of a company for its administrators.
    pub async fn list_company_memberships(
        &self,
        actor: &EffectivePermissionSet,
        company_id: CompanyId,
    ) -> AppResult<Vec<CompanyMembership>> {
        if !actor.can_access_company_admin(Some(company_id)) {
            return Err(AppError::Forbidden(format!(
                "subject '{}' cannot administer company '{company_id}'",
                actor.subject().unwrap_or("anonymous")
            )));
        }

        let mut memberships = self.repository.list_company_memberships(company_id).await?;
        memberships.sort_by(|left, right| left.subject().as_str().cmp(right.subject().as_str()));
        Ok(memberships)
    }

    /// Lists active members of the actor's company assigned to a department.
    pub async fn list_department_members(
        &self,
        actor: &EffectivePermissionSet,
        department: &Department,
    ) -> AppResult<Vec<CompanyMembership>> {
        let company_id = actor.company_id().ok_or_else(|| {
            AppError::Forbidden("an active company membership is required".to_owned())
        })?;

        if !actor.can_access_operational_data(Some(company_id), Some(department)) {
            return Err(AppError::Forbidden(format!(
                "subject '{}' cannot access department '{department}'",
                actor.subject().unwrap_or("anonymous")
            )));
        }

        let mut members: Vec<CompanyMembership> = self
            .repository
            .list_company_memberships(company_id)
            .await?
            .into_iter()
            .filter(|membership| membership.is_active() && membership.serves_department(department))
            .collect();
        members.sort_by(|left, right| left.subject().as_str().cmp(right.subject().as_str()));
        Ok(members)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use gestor_core::{AppError, AppResult, CompanyId};
    use gestor_domain::{CompanyMembership, Department, PermissionMap, Role};

    use crate::{EffectivePermissionSet, MembershipRepository};

    use super::MembershipDirectoryService;

    struct FakeMembershipRepository {
        memberships: Vec<CompanyMembership>,
    }

    #[async_trait]
    impl MembershipRepository for FakeMembershipRepository {
        async fn find_active_membership(
            &self,
            subject: &str,
        ) -> AppResult<Option<CompanyMembership>> {
            Ok(self
                .memberships
                .iter()
                .find(|membership| {
                    membership.is_active() && membership.subject().as_str() == subject
                })
                .cloned())
        }

        async fn list_company_memberships(
            &self,
            company_id: CompanyId,
        ) -> AppResult<Vec<CompanyMembership>> {
            Ok(self
                .memberships
                .iter()
                .filter(|membership| membership.company_id() == company_id)
                .cloned()
                .collect())
        }
    }

    fn member(
        subject: &str,
        company_id: CompanyId,
        role: Role,
        departments: &[&str],
    ) -> CompanyMembership {
        let departments = departments
            .iter()
            .filter_map(|name| Department::new(name).ok())
            .collect();

        match CompanyMembership::new(subject, company_id, role, PermissionMap::new()) {
            Ok(membership) => membership.with_departments(departments),
            Err(error) => panic!("test membership must be valid: {error}"),
        }
    }

    fn directory(company_id: CompanyId) -> MembershipDirectoryService {
        MembershipDirectoryService::new(Arc::new(FakeMembershipRepository {
            memberships: vec![
                member("carla", company_id, Role::Operador, &["vendas"]),
                member("ana", company_id, Role::Contratante, &[]),
                member("bia", company_id, Role::Operador, &["vendas", "estoque"]),
                member("davi", company_id, Role::Operador, &["vendas"]).with_active(false),
                member("eva", CompanyId::new(), Role::Operador, &["vendas"]),
            ],
        }))
    }

    #[tokio::test]
    async fn company_admin_lists_own_company_sorted() {
        let company_id = CompanyId::new();
        let actor = EffectivePermissionSet::from_membership(&member(
            "ana",
            company_id,
            Role::Contratante,
            &[],
        ));

        let memberships = directory(company_id)
            .list_company_memberships(&actor, company_id)
            .await;
        assert!(memberships.is_ok());

        let subjects: Vec<String> = memberships
            .unwrap_or_default()
            .iter()
            .map(|membership| membership.subject().as_str().to_owned())
            .collect();
        assert_eq!(subjects, vec!["ana", "bia", "carla", "davi"]);
    }

    #[tokio::test]
    async fn operador_cannot_list_company_memberships() {
        let company_id = CompanyId::new();
        let actor = EffectivePermissionSet::from_membership(&member(
            "bia",
            company_id,
            Role::Operador,
            &["vendas"],
        ));

        let result = directory(company_id)
            .list_company_memberships(&actor, company_id)
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn operador_lists_active_members_of_own_department() {
        let company_id = CompanyId::new();
        let actor = EffectivePermissionSet::from_membership(&member(
            "bia",
            company_id,
            Role::Operador,
            &["vendas", "estoque"],
        ));
        let Ok(vendas) = Department::new("vendas") else {
            return;
        };

        let members = directory(company_id)
            .list_department_members(&actor, &vendas)
            .await;
        assert!(members.is_ok());

        let subjects: Vec<String> = members
            .unwrap_or_default()
            .iter()
            .map(|membership| membership.subject().as_str().to_owned())
            .collect();
        assert_eq!(subjects, vec!["bia", "carla"]);
    }

    #[tokio::test]
    async fn operador_is_denied_other_department() {
        let company_id = CompanyId::new();
        let actor = EffectivePermissionSet::from_membership(&member(
            "carla",
            company_id,
            Role::Operador,
            &["vendas"],
        ));
        let Ok(financeiro) = Department::new("financeiro") else {
            return;
        };

        let result = directory(company_id)
            .list_department_members(&actor, &financeiro)
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn actor_without_membership_is_denied() {
        let Ok(vendas) = Department::new("vendas") else {
            return;
        };
        let result = directory(CompanyId::new())
            .list_department_members(&EffectivePermissionSet::without_membership("ghost"), &vendas)
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
