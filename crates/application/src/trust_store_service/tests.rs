use serde_json::{Map, Value, json};

use cloudtrust_core::{AppError, AppResult};
use cloudtrust_domain::{
    AccountDescriptors, AuditAction, AuthMethod, CspAccount, CspType, PolicyDocument, PolicyType,
    TrustConfigEntries,
};

use crate::test_fakes::{Harness, actor};
use crate::trust_store_ports::{
    CreateCspAccountInput, CreateCspIdpConfigInput, CreateCspPolicyInput, CreateCspRoleInput,
    CspAccountFilter, CspIdpConfigFilter, UpdateCspAccountInput, UpdateCspIdpConfigInput,
};

use super::TrustStoreService;

fn descriptors(pairs: &[(&str, &str)]) -> AccountDescriptors {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
        .collect()
}

fn entries(pairs: &[(&str, &str)]) -> TrustConfigEntries {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
        .collect()
}

fn document() -> PolicyDocument {
    match json!({
        "Version": "2012-10-17",
        "Statement": [{"Effect": "Allow", "Action": "ce:Get*", "Resource": "*"}]
    }) {
        Value::Object(document) => document,
        _ => unreachable!(),
    }
}

async fn aws_account(service: &TrustStoreService, name: &str) -> AppResult<CspAccount> {
    service
        .create_account(
            &actor(),
            CreateCspAccountInput {
                name: name.to_owned(),
                csp_type: CspType::Aws,
                descriptors: descriptors(&[("account_id", "123456789012"), ("region", "us-east-1")]),
                description: None,
                is_active: true,
            },
        )
        .await
}

fn secret_key_config(account: &CspAccount, name: &str) -> CreateCspIdpConfigInput {
    CreateCspIdpConfigInput {
        name: name.to_owned(),
        csp_account_id: account.id(),
        auth_method: AuthMethod::SecretKey,
        config: entries(&[
            ("access_key_id", "AKIAEXAMPLE"),
            ("secret_access_key", "s3cr3t"),
        ]),
        description: None,
        is_active: true,
    }
}

#[tokio::test]
async fn create_account_rejects_duplicate_name_for_same_csp_type() -> AppResult<()> {
    let harness = Harness::new();
    let service = harness.trust_store();

    aws_account(&service, "prod").await?;
    let duplicate = aws_account(&service, "prod").await;
    assert!(matches!(duplicate, Err(AppError::AlreadyExists(_))));

    let other_provider = service
        .create_account(
            &actor(),
            CreateCspAccountInput {
                name: "prod".to_owned(),
                csp_type: CspType::Gcp,
                descriptors: descriptors(&[("project_id", "prod-project")]),
                description: None,
                is_active: true,
            },
        )
        .await;
    assert!(other_provider.is_ok());
    assert_eq!(harness.store.accounts.lock().await.len(), 2);
    Ok(())
}

#[tokio::test]
async fn create_account_writes_audit_event() -> AppResult<()> {
    let harness = Harness::new();
    let account = aws_account(&harness.trust_store(), "prod").await?;

    let events = harness.audit.events.lock().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, AuditAction::CspAccountCreated);
    assert_eq!(events[0].resource_id, account.id().to_string());
    assert_eq!(events[0].subject, "alice");
    Ok(())
}

#[tokio::test]
async fn list_accounts_combines_filter_fields() -> AppResult<()> {
    let harness = Harness::new();
    let service = harness.trust_store();

    let prod = aws_account(&service, "billing-prod").await?;
    let staging = aws_account(&service, "billing-staging").await?;
    aws_account(&service, "analytics").await?;
    service
        .set_account_active(&actor(), staging.id(), false)
        .await?;

    let active_billing = service
        .list_accounts(&CspAccountFilter {
            csp_type: Some(CspType::Aws),
            is_active: Some(true),
            name_contains: Some("BILLING".to_owned()),
        })
        .await?;

    assert_eq!(active_billing.len(), 1);
    assert_eq!(active_billing[0].id(), prod.id());
    Ok(())
}

#[tokio::test]
async fn update_account_keeps_csp_type_and_unset_fields() -> AppResult<()> {
    let harness = Harness::new();
    let service = harness.trust_store();
    let account = aws_account(&service, "prod").await?;

    let updated = service
        .update_account(
            &actor(),
            account.id(),
            UpdateCspAccountInput {
                description: Some("production payer".to_owned()),
                ..UpdateCspAccountInput::default()
            },
        )
        .await?;

    assert_eq!(updated.name().as_str(), "prod");
    assert_eq!(updated.csp_type(), CspType::Aws);
    assert_eq!(updated.region(), "us-east-1");
    assert_eq!(updated.description(), Some("production payer"));
    Ok(())
}

#[tokio::test]
async fn validate_account_reports_missing_descriptors() -> AppResult<()> {
    let harness = Harness::new();
    let service = harness.trust_store();
    let account = service
        .create_account(
            &actor(),
            CreateCspAccountInput {
                name: "tenant".to_owned(),
                csp_type: CspType::Azure,
                descriptors: descriptors(&[("subscription_id", "sub-1")]),
                description: None,
                is_active: true,
            },
        )
        .await?;

    let result = service.validate_account(account.id()).await;
    assert!(matches!(result, Err(AppError::InvalidArgument(message)) if message.contains("tenant_id")));
    Ok(())
}

#[tokio::test]
async fn delete_account_with_idp_config_reports_dependents() -> AppResult<()> {
    let harness = Harness::new();
    let service = harness.trust_store();
    let account = aws_account(&service, "prod").await?;
    let config = service
        .create_idp_config(&actor(), secret_key_config(&account, "static"))
        .await?;

    let blocked = service.delete_account(&actor(), account.id()).await;
    assert!(matches!(blocked, Err(AppError::DependentsExist(_))));
    assert!(service.account_exists(account.id()).await?);

    service.delete_idp_config(&actor(), config.id()).await?;
    service.delete_account(&actor(), account.id()).await?;
    assert!(!service.account_exists(account.id()).await?);
    Ok(())
}

#[tokio::test]
async fn create_idp_config_validates_required_keys_against_account_type() -> AppResult<()> {
    let harness = Harness::new();
    let service = harness.trust_store();
    let account = aws_account(&service, "prod").await?;

    let missing_arn = service
        .create_idp_config(
            &actor(),
            CreateCspIdpConfigInput {
                name: "keycloak".to_owned(),
                csp_account_id: account.id(),
                auth_method: AuthMethod::Oidc,
                config: entries(&[("workload_identity_provider", "projects/1/providers/x")]),
                description: None,
                is_active: true,
            },
        )
        .await;
    assert!(matches!(missing_arn, Err(AppError::InvalidArgument(message)) if message.contains("oidc_provider_arn")));
    assert!(harness.store.idp_configs.lock().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn create_idp_config_requires_existing_account_and_unique_name() -> AppResult<()> {
    let harness = Harness::new();
    let service = harness.trust_store();
    let account = aws_account(&service, "prod").await?;
    let orphan = aws_account(&service, "orphan").await?;
    service.delete_account(&actor(), orphan.id()).await?;

    let missing_account = service
        .create_idp_config(&actor(), secret_key_config(&orphan, "static"))
        .await;
    assert!(matches!(missing_account, Err(AppError::NotFound(_))));

    service
        .create_idp_config(&actor(), secret_key_config(&account, "static"))
        .await?;
    let duplicate = service
        .create_idp_config(&actor(), secret_key_config(&account, "static"))
        .await;
    assert!(matches!(duplicate, Err(AppError::AlreadyExists(_))));
    Ok(())
}

#[tokio::test]
async fn update_idp_config_revalidates_replacement_keys() -> AppResult<()> {
    let harness = Harness::new();
    let service = harness.trust_store();
    let account = aws_account(&service, "prod").await?;
    let config = service
        .create_idp_config(&actor(), secret_key_config(&account, "static"))
        .await?;

    let method_without_keys = service
        .update_idp_config(
            &actor(),
            config.id(),
            UpdateCspIdpConfigInput {
                auth_method: Some(AuthMethod::Oidc),
                ..UpdateCspIdpConfigInput::default()
            },
        )
        .await;
    assert!(matches!(method_without_keys, Err(AppError::InvalidArgument(_))));

    let switched = service
        .update_idp_config(
            &actor(),
            config.id(),
            UpdateCspIdpConfigInput {
                auth_method: Some(AuthMethod::Oidc),
                config: Some(entries(&[
                    (
                        "oidc_provider_arn",
                        "arn:aws:iam::123456789012:oidc-provider/sso.example.com",
                    ),
                    ("role_arn", "arn:aws:iam::123456789012:role/sync"),
                ])),
                ..UpdateCspIdpConfigInput::default()
            },
        )
        .await?;
    assert_eq!(switched.auth_method(), AuthMethod::Oidc);
    assert_eq!(
        switched.trust().role_arn(),
        Some("arn:aws:iam::123456789012:role/sync")
    );
    Ok(())
}

#[tokio::test]
async fn static_secrets_are_encrypted_on_create_and_replacement() -> AppResult<()> {
    let harness = Harness::new();
    let service = harness.trust_store();
    let account = aws_account(&service, "prod").await?;
    let created = service
        .create_idp_config(&actor(), secret_key_config(&account, "static"))
        .await?;

    let stored = service.get_idp_config(created.id()).await?.trust().to_entries();
    assert_eq!(
        stored.get("secret_access_key").map(String::as_str),
        Some("enc:s3cr3t")
    );
    assert_eq!(stored.get("encrypted").map(String::as_str), Some("true"));

    let renamed = service
        .update_idp_config(
            &actor(),
            created.id(),
            UpdateCspIdpConfigInput {
                name: Some("static-renamed".to_owned()),
                ..UpdateCspIdpConfigInput::default()
            },
        )
        .await?;
    assert_eq!(
        renamed.trust().to_entries().get("secret_access_key").map(String::as_str),
        Some("enc:s3cr3t")
    );

    let rotated = service
        .update_idp_config(
            &actor(),
            created.id(),
            UpdateCspIdpConfigInput {
                config: Some(entries(&[
                    ("access_key_id", "AKIAROTATED"),
                    ("secret_access_key", "n3w-s3cr3t"),
                ])),
                ..UpdateCspIdpConfigInput::default()
            },
        )
        .await?
        .trust()
        .to_entries();
    assert_eq!(
        rotated.get("secret_access_key").map(String::as_str),
        Some("enc:n3w-s3cr3t")
    );
    assert_eq!(rotated.get("encrypted").map(String::as_str), Some("true"));
    Ok(())
}

#[tokio::test]
async fn list_active_idp_configs_skips_inactive_ones() -> AppResult<()> {
    let harness = Harness::new();
    let service = harness.trust_store();
    let account = aws_account(&service, "prod").await?;
    let first = service
        .create_idp_config(&actor(), secret_key_config(&account, "first"))
        .await?;
    service
        .create_idp_config(&actor(), secret_key_config(&account, "second"))
        .await?;
    service
        .set_idp_config_active(&actor(), first.id(), false)
        .await?;

    let active = service
        .list_active_idp_configs_for_account(account.id())
        .await?;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].name().as_str(), "second");

    let by_method = service
        .list_idp_configs(&CspIdpConfigFilter {
            auth_method: Some(AuthMethod::Oidc),
            ..CspIdpConfigFilter::default()
        })
        .await?;
    assert!(by_method.is_empty());
    Ok(())
}

#[tokio::test]
async fn attached_policy_cannot_be_deleted_until_detached() -> AppResult<()> {
    let harness = Harness::new();
    let service = harness.trust_store();
    let account = aws_account(&service, "prod").await?;
    let policy = service
        .create_policy(
            &actor(),
            CreateCspPolicyInput {
                name: "billing-read".to_owned(),
                csp_account_id: account.id(),
                policy_type: PolicyType::Custom,
                provider_policy_id: None,
                document: document(),
                description: None,
            },
        )
        .await?;
    let csp_role = service
        .create_csp_role(
            &actor(),
            CreateCspRoleInput {
                name: "billing-reader".to_owned(),
                description: None,
                csp_type: CspType::Aws,
                idp_identifier: None,
                provider_role_id: Some("arn:aws:iam::123456789012:role/billing-reader".to_owned()),
                status: None,
                max_session_duration: Some(3600),
                path: None,
                csp_account_id: Some(account.id()),
                csp_idp_config_id: None,
                extended_config: Map::new(),
            },
        )
        .await?;

    service
        .attach_policy_to_role(&actor(), csp_role.id(), policy.id())
        .await?;
    let again = service
        .attach_policy_to_role(&actor(), csp_role.id(), policy.id())
        .await;
    assert!(matches!(again, Err(AppError::AlreadyExists(_))));

    let roles = service.list_roles_for_policy(policy.id()).await?;
    assert_eq!(roles.len(), 1);

    let blocked = service.delete_policy(&actor(), policy.id()).await;
    assert!(matches!(blocked, Err(AppError::DependentsExist(_))));

    service
        .detach_policy_from_role(&actor(), csp_role.id(), policy.id())
        .await?;
    let missing = service
        .detach_policy_from_role(&actor(), csp_role.id(), policy.id())
        .await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    service.delete_policy(&actor(), policy.id()).await?;
    assert!(harness.store.role_policies.lock().await.is_empty());
    assert!(matches!(
        service.get_policy(policy.id()).await,
        Err(AppError::NotFound(_))
    ));
    Ok(())
}

#[tokio::test]
async fn policy_document_is_round_tripped_unchanged() -> AppResult<()> {
    let harness = Harness::new();
    let service = harness.trust_store();
    let account = aws_account(&service, "prod").await?;
    let mut raw = document();
    raw.insert(
        "Condition".to_owned(),
        json!({"StringEquals": {"aws:RequestedRegion": ["us-east-1", "eu-west-1"]}}),
    );

    let policy = service
        .create_policy(
            &actor(),
            CreateCspPolicyInput {
                name: "regional".to_owned(),
                csp_account_id: account.id(),
                policy_type: PolicyType::Inline,
                provider_policy_id: None,
                document: raw.clone(),
                description: None,
            },
        )
        .await?;

    assert_eq!(service.get_policy(policy.id()).await?.document(), &raw);
    Ok(())
}

#[tokio::test]
async fn csp_role_name_is_unique_per_csp_type() -> AppResult<()> {
    let harness = Harness::new();
    let service = harness.trust_store();
    let input = CreateCspRoleInput {
        name: "reader".to_owned(),
        description: None,
        csp_type: CspType::Aws,
        idp_identifier: None,
        provider_role_id: None,
        status: None,
        max_session_duration: None,
        path: None,
        csp_account_id: None,
        csp_idp_config_id: None,
        extended_config: Map::new(),
    };

    service.create_csp_role(&actor(), input.clone()).await?;
    let duplicate = service.create_csp_role(&actor(), input.clone()).await;
    assert!(matches!(duplicate, Err(AppError::AlreadyExists(_))));

    let gcp = service
        .create_csp_role(
            &actor(),
            CreateCspRoleInput {
                csp_type: CspType::Gcp,
                ..input
            },
        )
        .await?;
    assert_eq!(
        service
            .find_csp_role_by_name("reader", CspType::Gcp)
            .await?
            .map(|role| role.id()),
        Some(gcp.id())
    );
    Ok(())
}
