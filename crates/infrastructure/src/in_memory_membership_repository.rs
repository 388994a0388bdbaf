use async_trait::async_trait;
use gestor_application::MembershipRepository;
use gestor_core::{AppError, AppResult, CompanyId};
use gestor_domain::CompanyMembership;
use tokio::sync::RwLock;

/// In-memory membership repository kept in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryMembershipRepository {
    memberships: RwLock<Vec<CompanyMembership>>,
}

impl InMemoryMembershipRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            memberships: RwLock::new(Vec::new()),
        }
    }

    /// Stores a membership, rejecting a second active one for the same company.
    pub async fn insert(&self, membership: CompanyMembership) -> AppResult<()> {
        let mut memberships = self.memberships.write().await;

        let duplicate = membership.is_active()
            && memberships.iter().any(|stored| {
                stored.is_active()
                    && stored.company_id() == membership.company_id()
                    && stored.subject() == membership.subject()
            });
        if duplicate {
            return Err(AppError::Conflict(format!(
                "subject '{}' already has an active membership in company '{}'",
                membership.subject().as_str(),
                membership.company_id()
            )));
        }

        memberships.push(membership);
        Ok(())
    }
}

#[async_trait]
impl MembershipRepository for InMemoryMembershipRepository {
    async fn find_active_membership(
        &self,
        subject: &str,
    ) -> AppResult<Option<CompanyMembership>> {
        let memberships = self.memberships.read().await;

        Ok(memberships
            .iter()
            .find(|membership| membership.is_active() && membership.subject().as_str() == subject)
            .cloned())
    }

    async fn list_company_memberships(
        &self,
        company_id: CompanyId,
    ) -> AppResult<Vec<CompanyMembership>> {
        let memberships = self.memberships.read().await;

        Ok(memberships
            .iter()
            .filter(|membership| membership.company_id() == company_id)
            .cloned()
            .collect())
    }
}
