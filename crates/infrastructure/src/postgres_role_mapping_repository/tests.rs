use std::collections::BTreeSet;

use cloudtrust_application::{
    CspRoleRepository, RoleMappingRepository, RoleMasterRepository, UpsertRoleMappingInput,
};
use cloudtrust_core::AppError;
use cloudtrust_domain::{
    AuthMethod, CspRole, CspRoleId, CspRoleInput, CspType, RoleId, RoleMaster, RoleMasterInput,
    RoleScope,
};
use serde_json::Map;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use super::PostgresRoleMappingRepository;
use crate::PostgresTrustStoreRepository;

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
        panic!("failed to run migrations for postgres role mapping tests: {error}");
    }

    Some(pool)
}

fn role_master(scopes: &[RoleScope]) -> RoleMaster {
    let role = RoleMaster::new(RoleMasterInput {
        id: RoleId::new(),
        parent_id: None,
        name: format!("role-{}", uuid::Uuid::new_v4()),
        description: None,
        predefined: false,
        scopes: scopes.iter().copied().collect::<BTreeSet<_>>(),
    });
    role.unwrap_or_else(|error| panic!("invalid role fixture: {error}"))
}

async fn stored_csp_role(pool: &PgPool, csp_type: CspType) -> CspRole {
    let role = CspRole::new(CspRoleInput {
        id: CspRoleId::new(),
        name: format!("csp-role-{}", uuid::Uuid::new_v4()),
        description: None,
        csp_type,
        idp_identifier: None,
        provider_role_id: None,
        status: None,
        max_session_duration: None,
        path: None,
        csp_account_id: None,
        csp_idp_config_id: None,
        extended_config: Map::new(),
    })
    .unwrap_or_else(|error| panic!("invalid csp role fixture: {error}"));

    let inserted = PostgresTrustStoreRepository::new(pool.clone())
        .insert_csp_role(role.clone())
        .await;
    assert!(inserted.is_ok());
    role
}

fn edge(role: &RoleMaster, auth_method: AuthMethod, csp_role: &CspRole) -> UpsertRoleMappingInput {
    UpsertRoleMappingInput {
        role_id: role.id(),
        auth_method,
        csp_role_id: csp_role.id(),
        description: None,
    }
}

#[tokio::test]
async fn role_roundtrip_keeps_scopes() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresRoleMappingRepository::new(pool);
    let role = role_master(&[RoleScope::Workspace]);
    assert!(repository.insert_role(role.clone()).await.is_ok());
    assert!(matches!(
        repository.insert_role(role.clone()).await,
        Err(AppError::AlreadyExists(_))
    ));

    assert!(
        repository
            .add_role_scope(role.id(), RoleScope::Csp)
            .await
            .is_ok()
    );
    assert!(
        repository
            .add_role_scope(role.id(), RoleScope::Csp)
            .await
            .is_ok()
    );

    let stored = repository.find_role_by_name(role.name().as_str()).await;
    assert!(matches!(
        stored,
        Ok(Some(ref stored))
            if stored.scopes() == &BTreeSet::from([RoleScope::Workspace, RoleScope::Csp])
    ));
    assert!(matches!(
        repository.add_role_scope(RoleId::new(), RoleScope::Csp).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn upsert_mapping_is_idempotent_and_updates_description() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresRoleMappingRepository::new(pool.clone());
    let role = role_master(&[RoleScope::Csp]);
    assert!(repository.insert_role(role.clone()).await.is_ok());
    let reader = stored_csp_role(&pool, CspType::Aws).await;

    let first = repository
        .upsert_mapping(UpsertRoleMappingInput {
            description: Some("initial".to_owned()),
            ..edge(&role, AuthMethod::Oidc, &reader)
        })
        .await;
    let second = repository
        .upsert_mapping(UpsertRoleMappingInput {
            description: Some("renamed".to_owned()),
            ..edge(&role, AuthMethod::Oidc, &reader)
        })
        .await;

    assert!(matches!(
        (&first, &second),
        (Ok(first), Ok(second))
            if first.created_at == second.created_at
                && second.description.as_deref() == Some("renamed")
    ));

    let mappings = repository
        .list_mappings_for_csp_role(reader.id())
        .await
        .unwrap_or_default();
    assert_eq!(mappings.len(), 1);

    let resolved = repository
        .list_csp_roles_for_role(role.id(), AuthMethod::Oidc)
        .await
        .unwrap_or_default();
    assert_eq!(resolved, vec![reader.clone()]);
    assert!(
        repository
            .list_csp_roles_for_role(role.id(), AuthMethod::Saml)
            .await
            .unwrap_or_default()
            .is_empty()
    );
}

#[tokio::test]
async fn upsert_mapping_checks_scope_and_endpoints() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresRoleMappingRepository::new(pool.clone());
    let platform_role = role_master(&[RoleScope::Platform]);
    assert!(repository.insert_role(platform_role.clone()).await.is_ok());
    let csp_role = role_master(&[RoleScope::Csp]);
    assert!(repository.insert_role(csp_role.clone()).await.is_ok());
    let reader = stored_csp_role(&pool, CspType::Aws).await;

    assert!(matches!(
        repository
            .upsert_mapping(edge(&platform_role, AuthMethod::Oidc, &reader))
            .await,
        Err(AppError::InvalidState(_))
    ));
    assert!(matches!(
        repository
            .upsert_mapping(edge(&role_master(&[RoleScope::Csp]), AuthMethod::Oidc, &reader))
            .await,
        Err(AppError::NotFound(_))
    ));

    let mut missing_role = edge(&csp_role, AuthMethod::Oidc, &reader);
    missing_role.csp_role_id = CspRoleId::new();
    assert!(matches!(
        repository.upsert_mapping(missing_role).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn delete_role_cascade_removes_edges_and_scopes() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresRoleMappingRepository::new(pool.clone());
    let role = role_master(&[RoleScope::Csp]);
    assert!(repository.insert_role(role.clone()).await.is_ok());
    let aws_reader = stored_csp_role(&pool, CspType::Aws).await;
    let gcp_reader = stored_csp_role(&pool, CspType::Gcp).await;
    for (method, target) in [
        (AuthMethod::Oidc, &aws_reader),
        (AuthMethod::Saml, &aws_reader),
        (AuthMethod::Oidc, &gcp_reader),
    ] {
        assert!(
            repository
                .upsert_mapping(edge(&role, method, target))
                .await
                .is_ok()
        );
    }

    let gcp_edges = repository
        .list_mappings_for_role_and_csp_type(role.id(), CspType::Gcp)
        .await
        .unwrap_or_default();
    assert_eq!(gcp_edges.len(), 1);

    assert!(matches!(
        repository
            .remove_mapping(role.id(), gcp_reader.id(), AuthMethod::Saml)
            .await,
        Err(AppError::NotFound(_))
    ));
    assert!(
        repository
            .remove_mapping(role.id(), gcp_reader.id(), AuthMethod::Oidc)
            .await
            .is_ok()
    );

    assert!(repository.delete_role_cascade(role.id()).await.is_ok());
    assert!(matches!(repository.find_role(role.id()).await, Ok(None)));
    assert!(
        repository
            .list_mappings_for_csp_role(aws_reader.id())
            .await
            .unwrap_or_default()
            .is_empty()
    );
    assert!(matches!(
        repository.remove_all_mappings_for_role(role.id()).await,
        Ok(0)
    ));
}
