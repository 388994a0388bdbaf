use gestor_core::{AppResult, CompanyId};
use gestor_domain::{CompanyMembership, Department, PermissionKey, Role};
use gestor_infrastructure::PostgresMembershipRepository;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::api_config::ApiConfig;

const DEV_SEED_PLATFORM_COMPANY_ID: Uuid =
    Uuid::from_u128(0x1111_1111_1111_1111_1111_1111_1111_1111);
const DEV_SEED_PLATFORM_COMPANY_NAME: &str = "Gestor Plataforma";
const DEV_SEED_STORE_COMPANY_ID: Uuid =
    Uuid::from_u128(0x2222_2222_2222_2222_2222_2222_2222_2222);
const DEV_SEED_STORE_COMPANY_NAME: &str = "Loja Centro";

const DEV_SEED_SUPER_ADMIN_SUBJECT: &str = "dev-super-admin";
const DEV_SEED_CONTRATANTE_SUBJECT: &str = "dev-contratante";
const DEV_SEED_OPERADOR_SUBJECT: &str = "dev-operador";
const DEV_SEED_OPERADOR_DEPARTMENT: &str = "vendas";

/// Inserts the development companies and memberships. Safe to run repeatedly.
pub async fn run(pool: PgPool, config: &ApiConfig) -> AppResult<()> {
    let repository = PostgresMembershipRepository::new(pool);
    let platform_company = CompanyId::from_uuid(DEV_SEED_PLATFORM_COMPANY_ID);
    let store_company = CompanyId::from_uuid(DEV_SEED_STORE_COMPANY_ID);

    repository
        .ensure_company(platform_company, DEV_SEED_PLATFORM_COMPANY_NAME)
        .await?;
    repository
        .ensure_company(store_company, DEV_SEED_STORE_COMPANY_NAME)
        .await?;

    let operador_permissions = Role::Operador
        .default_permissions()
        .with(PermissionKey::Estoque, true);

    let memberships = [
        CompanyMembership::new(
            DEV_SEED_SUPER_ADMIN_SUBJECT,
            platform_company,
            Role::SuperAdmin,
            Role::SuperAdmin.default_permissions(),
        )?,
        CompanyMembership::new(
            DEV_SEED_CONTRATANTE_SUBJECT,
            store_company,
            Role::Contratante,
            Role::Contratante.default_permissions(),
        )?,
        CompanyMembership::new(
            DEV_SEED_OPERADOR_SUBJECT,
            store_company,
            Role::Operador,
            operador_permissions,
        )?
        .with_departments(vec![Department::new(DEV_SEED_OPERADOR_DEPARTMENT)?]),
    ];

    for membership in &memberships {
        repository.upsert_active_membership(membership).await?;
        info!(
            subject = membership.subject().as_str(),
            company_id = %membership.company_id(),
            role = membership.role().as_str(),
            "seeded membership"
        );
    }

    info!(
        frontend_url = config.frontend_url.as_str(),
        "sign in through POST /auth/bootstrap with one of the seeded subjects"
    );

    Ok(())
}
