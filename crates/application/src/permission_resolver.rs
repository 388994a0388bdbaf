use std::sync::Arc;

use gestor_core::SessionState;
use tracing::{debug, error, warn};

use crate::{EffectivePermissionSet, MembershipRepository};

/// Resolves the effective permissions of the current session.
#[derive(Clone)]
pub struct PermissionResolver {
    repository: Arc<dyn MembershipRepository>,
}

impl PermissionResolver {
    /// Creates a resolver backed by a membership repository.
    #[must_use]
    pub fn new(repository: Arc<dyn MembershipRepository>) -> Self {
        Self { repository }
    }

    /// Resolves the effective permission set for a session.
    ///
    /// Never fails: store errors are logged and resolve to an all-deny set.
    pub async fn resolve(&self, session: &SessionState) -> EffectivePermissionSet {
        let identity = match session {
            SessionState::Loading => return EffectivePermissionSet::loading(),
            SessionState::Anonymous => return EffectivePermissionSet::anonymous(),
            SessionState::Authenticated(identity) => identity,
        };
        let subject = identity.subject();

        let membership = match self.repository.find_active_membership(subject).await {
            Ok(Some(membership)) => membership,
            Ok(None) => {
                debug!(subject, "no active membership; denying all permissions");
                return EffectivePermissionSet::without_membership(subject);
            }
            Err(error) => {
                error!(subject, %error, "membership fetch failed; denying all permissions");
                return EffectivePermissionSet::failed(subject);
            }
        };

        if !membership.is_active() || membership.subject().as_str() != subject {
            warn!(
                subject,
                company_id = %membership.company_id(),
                "membership store returned an unusable membership; denying all permissions"
            );
            return EffectivePermissionSet::without_membership(subject);
        }

        for issue in membership.permission_issues() {
            warn!(
                subject,
                company_id = %membership.company_id(),
                %issue,
                "ignoring malformed stored permission"
            );
        }

        EffectivePermissionSet::from_membership(&membership)
    }
}
