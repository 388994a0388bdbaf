use gestor_application::MembershipRepository;
use gestor_core::CompanyId;
use gestor_domain::{CompanyMembership, Department, PermissionKey, PermissionMap, Role};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::PostgresMembershipRepository;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres membership tests: {error}");
    }

    Some(pool)
}

fn unique_subject(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4())
}

fn membership(subject: &str, company_id: CompanyId, role: Role) -> CompanyMembership {
    match CompanyMembership::new(subject, company_id, role, role.default_permissions()) {
        Ok(membership) => membership,
        Err(error) => panic!("test membership must be valid: {error}"),
    }
}

#[tokio::test]
async fn saved_membership_is_found_with_departments() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresMembershipRepository::new(pool);
    let company_id = CompanyId::new();
    let subject = unique_subject("operador");
    assert!(repository.ensure_company(company_id, "Loja Centro").await.is_ok());

    let departments = Department::new("vendas").into_iter().collect();
    let saved = repository
        .upsert_active_membership(
            &membership(&subject, company_id, Role::Operador).with_departments(departments),
        )
        .await;
    assert!(saved.is_ok());

    let found = repository.find_active_membership(&subject).await;
    assert!(found.is_ok());
    let found = found.ok().flatten();
    assert!(found.is_some());
    let Some(found) = found else {
        return;
    };

    assert_eq!(found.company_id(), company_id);
    assert_eq!(found.role(), Role::Operador);
    assert!(found.permissions().is_granted(PermissionKey::Vendas));
    assert_eq!(found.departments().len(), 1);
    assert!(found.permission_issues().is_empty());
}

#[tokio::test]
async fn malformed_stored_permissions_are_reported_not_fatal() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresMembershipRepository::new(pool.clone());
    let company_id = CompanyId::new();
    let subject = unique_subject("contratante");
    assert!(repository.ensure_company(company_id, "Loja Norte").await.is_ok());

    let insert = sqlx::query(
        r#"
        INSERT INTO company_memberships (company_id, subject, role, permissions)
        VALUES ($1, $2, 'contratante', $3)
        "#,
    )
    .bind(company_id.as_uuid())
    .bind(subject.as_str())
    .bind(serde_json::json!({"financeiro": "sim", "relatorios": true, "pdv": true}))
    .execute(&pool)
    .await;
    assert!(insert.is_ok());

    let found = repository.find_active_membership(&subject).await;
    assert!(found.is_ok());
    let Some(found) = found.ok().flatten() else {
        panic!("membership should exist");
    };

    assert!(found.permissions().is_granted(PermissionKey::Relatorios));
    assert!(!found.permissions().is_granted(PermissionKey::Financeiro));
    assert_eq!(found.permission_issues().len(), 2);
}

#[tokio::test]
async fn inactive_memberships_are_not_consulted() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresMembershipRepository::new(pool.clone());
    let company_id = CompanyId::new();
    let subject = unique_subject("inativo");
    assert!(repository.ensure_company(company_id, "Loja Sul").await.is_ok());

    let insert = sqlx::query(
        r#"
        INSERT INTO company_memberships (company_id, subject, role, is_active)
        VALUES ($1, $2, 'operador', FALSE)
        "#,
    )
    .bind(company_id.as_uuid())
    .bind(subject.as_str())
    .execute(&pool)
    .await;
    assert!(insert.is_ok());

    let found = repository.find_active_membership(&subject).await;
    assert!(matches!(found, Ok(None)));

    let listed = repository.list_company_memberships(company_id).await;
    assert!(listed.is_ok());
    let listed = listed.unwrap_or_default();
    assert_eq!(listed.len(), 1);
    assert!(!listed.iter().any(CompanyMembership::is_active));
}

#[tokio::test]
async fn upsert_replaces_active_membership_in_place() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresMembershipRepository::new(pool);
    let company_id = CompanyId::new();
    let subject = unique_subject("promovido");
    assert!(repository.ensure_company(company_id, "Loja Leste").await.is_ok());

    assert!(
        repository
            .upsert_active_membership(&membership(&subject, company_id, Role::Operador))
            .await
            .is_ok()
    );
    let promoted = CompanyMembership::new(
        subject.as_str(),
        company_id,
        Role::Contratante,
        PermissionMap::new().with(PermissionKey::Usuarios, true),
    );
    let Ok(promoted) = promoted else {
        panic!("promoted membership must be valid");
    };
    assert!(repository.upsert_active_membership(&promoted).await.is_ok());

    let listed = repository.list_company_memberships(company_id).await;
    let listed = listed.unwrap_or_default();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed.first().map(CompanyMembership::role), Some(Role::Contratante));
}
