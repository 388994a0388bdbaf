use std::str::FromStr;

use async_trait::async_trait;
use gestor_application::MembershipRepository;
use gestor_core::{AppError, AppResult, CompanyId};
use gestor_domain::{CompanyMembership, Department, PermissionMap, Role};
use sqlx::{FromRow, PgPool};
use tracing::warn;
use uuid::Uuid;

/// PostgreSQL-backed company membership repository.
#[derive(Clone)]
pub struct PostgresMembershipRepository {
    pool: PgPool,
}

impl PostgresMembershipRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a company unless it already exists.
    pub async fn ensure_company(&self, company_id: CompanyId, name: &str) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO companies (id, name)
            VALUES ($1, $2)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(company_id.as_uuid())
        .bind(name)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to ensure company '{company_id}': {error}"))
        })?;

        Ok(())
    }

    /// Creates or replaces the active membership of a subject in a company.
    pub async fn upsert_active_membership(&self, membership: &CompanyMembership) -> AppResult<()> {
        let departments: Vec<String> = membership
            .departments()
            .iter()
            .map(|department| department.as_str().to_owned())
            .collect();

        sqlx::query(
            r#"
            INSERT INTO company_memberships (company_id, subject, role, permissions, departments, is_active)
            VALUES ($1, $2, $3, $4, $5, TRUE)
            ON CONFLICT (subject, company_id) WHERE is_active
            DO UPDATE SET
                role = EXCLUDED.role,
                permissions = EXCLUDED.permissions,
                departments = EXCLUDED.departments,
                updated_at = now()
            "#,
        )
        .bind(membership.company_id().as_uuid())
        .bind(membership.subject().as_str())
        .bind(membership.role().as_str())
        .bind(membership.permissions().to_json())
        .bind(departments)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to save membership of '{}' in company '{}': {error}",
                membership.subject().as_str(),
                membership.company_id()
            ))
        })?;

        Ok(())
    }
}

#[derive(Debug, FromRow)]
struct MembershipRow {
    subject: String,
    company_id: Uuid,
    role: String,
    permissions: serde_json::Value,
    departments: Vec<String>,
    is_active: bool,
}

impl MembershipRow {
    fn into_membership(self) -> AppResult<CompanyMembership> {
        let company_id = CompanyId::from_uuid(self.company_id);
        let role = Role::from_str(self.role.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "failed to decode role '{}' of '{}' in company '{company_id}': {error}",
                self.role, self.subject
            ))
        })?;

        let (permissions, issues) = PermissionMap::from_stored(&self.permissions);

        let mut departments = Vec::with_capacity(self.departments.len());
        for raw in &self.departments {
            match Department::new(raw) {
                Ok(department) => departments.push(department),
                Err(error) => warn!(
                    subject = self.subject.as_str(),
                    %company_id,
                    %error,
                    "skipping invalid stored department"
                ),
            }
        }

        Ok(
            CompanyMembership::new(self.subject, company_id, role, permissions)?
                .with_departments(departments)
                .with_active(self.is_active)
                .with_permission_issues(issues),
        )
    }
}

#[async_trait]
impl MembershipRepository for PostgresMembershipRepository {
    async fn find_active_membership(
        &self,
        subject: &str,
    ) -> AppResult<Option<CompanyMembership>> {
        let row = sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT subject, company_id, role, permissions, departments, is_active
            FROM company_memberships
            WHERE subject = $1 AND is_active
            ORDER BY created_at ASC, id ASC
            LIMIT 1
            "#,
        )
        .bind(subject)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to load membership for subject '{subject}': {error}"
            ))
        })?;

        row.map(MembershipRow::into_membership).transpose()
    }

    async fn list_company_memberships(
        &self,
        company_id: CompanyId,
    ) -> AppResult<Vec<CompanyMembership>> {
        let rows = sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT subject, company_id, role, permissions, departments, is_active
            FROM company_memberships
            WHERE company_id = $1
            ORDER BY subject ASC, created_at ASC
            "#,
        )
        .bind(company_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list memberships of company '{company_id}': {error}"
            ))
        })?;

        rows.into_iter().map(MembershipRow::into_membership).collect()
    }
}

#[cfg(test)]
mod tests;
