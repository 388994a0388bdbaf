use async_trait::async_trait;
use gestor_core::{AppResult, CompanyId};
use gestor_domain::CompanyMembership;

/// Read port for company memberships.
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Finds the active membership consulted for a subject.
    ///
    /// When a subject is active in several companies the adapter returns the
    /// oldest membership.
    async fn find_active_membership(&self, subject: &str)
    -> AppResult<Option<CompanyMembership>>;

    /// Lists every membership of a company, active or not.
    async fn list_company_memberships(
        &self,
        company_id: CompanyId,
    ) -> AppResult<Vec<CompanyMembership>>;
}
