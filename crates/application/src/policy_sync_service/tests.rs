use serde_json::{Value, json};

use cloudtrust_core::{AppError, AppResult, CallContext};
use cloudtrust_domain::{
    AccountDescriptors, AuthMethod, CspAccount, CspType, PolicyDocument, PolicyType,
    TrustConfigEntries,
};

use crate::provider_ports::{PolicyListScope, PolicyPage, ProviderPolicy};
use crate::test_fakes::{Harness, actor};
use crate::trust_store_ports::{
    CreateCspAccountInput, CreateCspIdpConfigInput, CreateCspPolicyInput, CspPolicyFilter,
};

fn provider_policy(name: &str) -> ProviderPolicy {
    ProviderPolicy {
        name: name.to_owned(),
        provider_policy_id: format!("arn:aws:iam::aws:policy/{name}"),
        path: Some("/".to_owned()),
        description: None,
        default_version_id: Some("v1".to_owned()),
        attachment_count: Some(0),
        created_at: None,
        updated_at: None,
    }
}

fn document() -> PolicyDocument {
    match json!({"Version": "2012-10-17", "Statement": []}) {
        Value::Object(document) => document,
        _ => unreachable!(),
    }
}

async fn synced_account(harness: &Harness, with_config: bool) -> AppResult<CspAccount> {
    let mut descriptors = AccountDescriptors::new();
    descriptors.insert("account_id".to_owned(), "123456789012".to_owned());

    let service = harness.trust_store();
    let account = service
        .create_account(
            &actor(),
            CreateCspAccountInput {
                name: "A".to_owned(),
                csp_type: CspType::Aws,
                descriptors,
                description: None,
                is_active: true,
            },
        )
        .await?;

    if with_config {
        service
            .create_idp_config(
                &actor(),
                CreateCspIdpConfigInput {
                    name: "keycloak".to_owned(),
                    csp_account_id: account.id(),
                    auth_method: AuthMethod::Oidc,
                    config: [
                        (
                            "oidc_provider_arn",
                            "arn:aws:iam::123456789012:oidc-provider/sso.example.com",
                        ),
                        ("role_arn", "arn:aws:iam::123456789012:role/policy-sync"),
                    ]
                    .into_iter()
                    .map(|(key, value)| (key.to_owned(), value.to_owned()))
                    .collect::<TrustConfigEntries>(),
                    description: None,
                    is_active: true,
                },
            )
            .await?;
    }

    Ok(account)
}

async fn seed_two_pages(harness: &Harness) {
    *harness.adapter.policy_pages.lock().await = vec![
        PolicyPage {
            policies: vec![
                provider_policy("ReadOnlyAccess"),
                provider_policy("Billing"),
            ],
            next_marker: Some("1".to_owned()),
        },
        PolicyPage {
            policies: vec![provider_policy("AmazonS3ReadOnlyAccess")],
            next_marker: None,
        },
    ];
}

#[tokio::test]
async fn sync_twice_produces_no_duplicates() -> AppResult<()> {
    let harness = Harness::new();
    let account = synced_account(&harness, true).await?;
    seed_two_pages(&harness).await;
    let service = harness.policy_sync();
    let context = CallContext::background();

    let first = service
        .sync_from_cloud(&context, &actor(), account.id(), PolicyListScope::Local)
        .await?;
    let after_first = harness
        .trust_store()
        .list_policies(&CspPolicyFilter::default())
        .await?;

    let second = service
        .sync_from_cloud(&context, &actor(), account.id(), PolicyListScope::Local)
        .await?;
    let after_second = harness
        .trust_store()
        .list_policies(&CspPolicyFilter::default())
        .await?;

    assert_eq!(first.reconciled.len(), 3);
    assert_eq!(second.reconciled.len(), 3);
    assert!(second.skipped.is_empty());
    assert_eq!(after_first, after_second);
    assert!(
        after_second
            .iter()
            .all(|policy| policy.policy_type() == PolicyType::Managed)
    );
    Ok(())
}

#[tokio::test]
async fn sync_follows_markers_with_requested_scope() -> AppResult<()> {
    let harness = Harness::new();
    let account = synced_account(&harness, true).await?;
    seed_two_pages(&harness).await;

    harness
        .policy_sync()
        .sync_from_cloud(
            &CallContext::background(),
            &actor(),
            account.id(),
            PolicyListScope::parse_lenient("AWS"),
        )
        .await?;

    let filters = harness.adapter.list_filters.lock().await;
    assert_eq!(filters.len(), 2);
    assert!(filters.iter().all(|filter| filter.scope == PolicyListScope::Provider));
    assert_eq!(filters[0].marker, None);
    assert_eq!(filters[1].marker.as_deref(), Some("1"));

    let requests = harness.adapter.web_identity_requests.lock().await;
    assert_eq!(requests[0].session_name, "cloudtrust-policy-sync");
    assert_eq!(requests[0].duration_seconds, 3600);
    assert_eq!(
        requests[0].role_arn,
        "arn:aws:iam::123456789012:role/policy-sync"
    );
    Ok(())
}

#[tokio::test]
async fn sync_refreshes_known_policy_and_skips_name_collisions() -> AppResult<()> {
    let harness = Harness::new();
    let account = synced_account(&harness, true).await?;
    let trust_store = harness.trust_store();

    let known = trust_store
        .create_policy(
            &actor(),
            CreateCspPolicyInput {
                name: "old-billing".to_owned(),
                csp_account_id: account.id(),
                policy_type: PolicyType::Custom,
                provider_policy_id: Some("arn:aws:iam::aws:policy/Billing".to_owned()),
                document: document(),
                description: None,
            },
        )
        .await?;
    trust_store
        .create_policy(
            &actor(),
            CreateCspPolicyInput {
                name: "ReadOnlyAccess".to_owned(),
                csp_account_id: account.id(),
                policy_type: PolicyType::Inline,
                provider_policy_id: None,
                document: document(),
                description: None,
            },
        )
        .await?;
    seed_two_pages(&harness).await;

    let report = harness
        .policy_sync()
        .sync_from_cloud(
            &CallContext::background(),
            &actor(),
            account.id(),
            PolicyListScope::All,
        )
        .await?;

    assert_eq!(report.skipped, vec!["ReadOnlyAccess".to_owned()]);
    assert_eq!(report.reconciled.len(), 2);

    let refreshed = trust_store.get_policy(known.id()).await?;
    assert_eq!(refreshed.name().as_str(), "Billing");
    assert_eq!(refreshed.policy_type(), PolicyType::Custom);
    assert_eq!(refreshed.document(), known.document());
    Ok(())
}

#[tokio::test]
async fn sync_without_active_config_is_invalid_state() -> AppResult<()> {
    let harness = Harness::new();
    let account = synced_account(&harness, false).await?;

    let result = harness
        .policy_sync()
        .sync_from_cloud(
            &CallContext::background(),
            &actor(),
            account.id(),
            PolicyListScope::Local,
        )
        .await;

    assert!(matches!(result, Err(AppError::InvalidState(_))));
    assert!(harness.adapter.list_filters.lock().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn policy_document_prefers_local_copy_then_provider_default_version() -> AppResult<()> {
    let harness = Harness::new();
    let account = synced_account(&harness, true).await?;
    let trust_store = harness.trust_store();
    let service = harness.policy_sync();
    let context = CallContext::background();

    let local = trust_store
        .create_policy(
            &actor(),
            CreateCspPolicyInput {
                name: "local".to_owned(),
                csp_account_id: account.id(),
                policy_type: PolicyType::Custom,
                provider_policy_id: None,
                document: document(),
                description: None,
            },
        )
        .await?;
    assert_eq!(
        service.policy_document(&context, &actor(), local.id()).await?,
        document()
    );

    let remote_document = match json!({"Version": "2012-10-17", "Statement": [{"Effect": "Deny"}]}) {
        Value::Object(document) => document,
        _ => unreachable!(),
    };
    harness.adapter.documents.lock().await.insert(
        "arn:aws:iam::aws:policy/Billing".to_owned(),
        remote_document.clone(),
    );
    let managed = trust_store
        .create_policy(
            &actor(),
            CreateCspPolicyInput {
                name: "Billing".to_owned(),
                csp_account_id: account.id(),
                policy_type: PolicyType::Managed,
                provider_policy_id: Some("arn:aws:iam::aws:policy/Billing".to_owned()),
                document: PolicyDocument::new(),
                description: None,
            },
        )
        .await?;
    assert_eq!(
        service.policy_document(&context, &actor(), managed.id()).await?,
        remote_document
    );
    assert_eq!(
        harness.adapter.web_identity_requests.lock().await[0].session_name,
        "cloudtrust-policy-get"
    );

    let empty_custom = trust_store
        .create_policy(
            &actor(),
            CreateCspPolicyInput {
                name: "empty".to_owned(),
                csp_account_id: account.id(),
                policy_type: PolicyType::Custom,
                provider_policy_id: None,
                document: PolicyDocument::new(),
                description: None,
            },
        )
        .await?;
    assert!(matches!(
        service
            .policy_document(&context, &actor(), empty_custom.id())
            .await,
        Err(AppError::NotFound(_))
    ));
    Ok(())
}
