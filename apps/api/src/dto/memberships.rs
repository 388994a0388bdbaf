use gestor_domain::CompanyMembership;
use serde::Serialize;
use ts_rs::TS;

/// API representation of a company membership.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/membership-response.ts"
)]
pub struct MembershipResponse {
    pub subject: String,
    pub company_id: String,
    pub role: String,
    pub departments: Vec<String>,
    pub is_active: bool,
    /// Keys stored as `true` for the membership.
    pub permissions: Vec<String>,
}

/// Operational summary of one department.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/department-summary-response.ts"
)]
pub struct DepartmentSummaryResponse {
    pub company_id: String,
    pub department: String,
    pub members: Vec<MembershipResponse>,
}

impl From<CompanyMembership> for MembershipResponse {
    fn from(value: CompanyMembership) -> Self {
        Self {
            subject: value.subject().as_str().to_owned(),
            company_id: value.company_id().to_string(),
            role: value.role().as_str().to_owned(),
            departments: value
                .departments()
                .iter()
                .map(|department| department.as_str().to_owned())
                .collect(),
            is_active: value.is_active(),
            permissions: value
                .permissions()
                .granted()
                .map(|key| key.as_str().to_owned())
                .collect(),
        }
    }
}
