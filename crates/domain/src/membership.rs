use std::fmt::{Display, Formatter};

use gestor_core::{AppError, AppResult, CompanyId, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::{PermissionMap, PermissionShapeIssue, Role};

/// Department name an operator is assigned to, normalized to lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Department(String);

impl Department {
    /// Creates a normalized department name.
    pub fn new(value: &str) -> AppResult<Self> {
        let normalized = value.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(AppError::Validation(
                "department must not be empty".to_owned(),
            ));
        }

        Ok(Self(normalized))
    }

    /// Returns the normalized name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for Department {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Association between an identity and a company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyMembership {
    subject: NonEmptyString,
    company_id: CompanyId,
    role: Role,
    permissions: PermissionMap,
    departments: Vec<Department>,
    is_active: bool,
    permission_issues: Vec<PermissionShapeIssue>,
}

impl CompanyMembership {
    /// Creates an active membership.
    pub fn new(
        subject: impl Into<String>,
        company_id: CompanyId,
        role: Role,
        permissions: PermissionMap,
    ) -> AppResult<Self> {
        Ok(Self {
            subject: NonEmptyString::new(subject)?,
            company_id,
            role,
            permissions,
            departments: Vec::new(),
            is_active: true,
            permission_issues: Vec::new(),
        })
    }

    /// Returns a copy assigned to the given departments.
    #[must_use]
    pub fn with_departments(mut self, departments: Vec<Department>) -> Self {
        self.departments = departments;
        self
    }

    /// Returns a copy with the activation flag set.
    #[must_use]
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Returns a copy carrying issues found while decoding stored permissions.
    #[must_use]
    pub fn with_permission_issues(mut self, issues: Vec<PermissionShapeIssue>) -> Self {
        self.permission_issues = issues;
        self
    }

    /// Returns the member subject.
    #[must_use]
    pub fn subject(&self) -> &NonEmptyString {
        &self.subject
    }

    /// Returns the company.
    #[must_use]
    pub fn company_id(&self) -> CompanyId {
        self.company_id
    }

    /// Returns the role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the stored per-key permissions.
    #[must_use]
    pub fn permissions(&self) -> &PermissionMap {
        &self.permissions
    }

    /// Returns the department assignments.
    #[must_use]
    pub fn departments(&self) -> &[Department] {
        &self.departments
    }

    /// Returns whether the membership is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns issues found while decoding stored permissions.
    #[must_use]
    pub fn permission_issues(&self) -> &[PermissionShapeIssue] {
        &self.permission_issues
    }

    /// Returns whether the member is assigned to the department.
    #[must_use]
    pub fn serves_department(&self, department: &Department) -> bool {
        self.departments.contains(department)
    }
}
