//! Cloudtrust policy sync worker.

#![forbid(unsafe_code)]

use std::env;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use cloudtrust_application::provider_ports::PolicyListScope;
use cloudtrust_application::{
    CredentialIssuanceService, PolicySyncService, ProviderAdapterRegistry, RoleMappingService,
};
use cloudtrust_core::{AppError, AppResult, CallContext, CallerIdentity};
use cloudtrust_domain::CspAccountId;
use cloudtrust_infrastructure::{
    AesSecretEncryptor, AwsProviderAdapter, AzureProviderAdapter, GcpProviderAdapter,
    KeycloakBrokerConfig, KeycloakIdentityBroker, PostgresAuditRepository,
    PostgresRoleMappingRepository, PostgresTrustStoreRepository,
};

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const SYNC_JOB_NAME: &str = "policy-sync";

#[derive(Debug, Clone)]
struct WorkerConfig {
    database_url: String,
    keycloak: KeycloakBrokerConfig,
    secret_encryption_key: String,
    aws_endpoint_url: Option<String>,
    sync_account_ids: Vec<CspAccountId>,
    sync_policy_scope: PolicyListScope,
    sync_interval_seconds: u64,
    sync_pass_timeout_seconds: u64,
    provider_call_timeout_seconds: u64,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = WorkerConfig::load()?;
    let pool = connect_pool(config.database_url.as_str()).await?;
    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    let sync_service = build_policy_sync_service(pool, &config)?;
    let actor = CallerIdentity::system(SYNC_JOB_NAME);

    info!(
        accounts = config.sync_account_ids.len(),
        scope = config.sync_policy_scope.as_str(),
        interval_seconds = config.sync_interval_seconds,
        pass_timeout_seconds = config.sync_pass_timeout_seconds,
        provider_call_timeout_seconds = config.provider_call_timeout_seconds,
        "cloudtrust-worker started"
    );

    if config.sync_account_ids.is_empty() {
        warn!("SYNC_ACCOUNT_IDS is empty; the worker will idle");
    }

    loop {
        for account_id in &config.sync_account_ids {
            let pass_budget = Duration::from_secs(config.sync_pass_timeout_seconds);
            let context = CallContext::with_timeout(pass_budget);

            match sync_service
                .sync_from_cloud(&context, &actor, *account_id, config.sync_policy_scope)
                .await
            {
                Ok(report) => {
                    info!(
                        account_id = %account_id,
                        reconciled = report.reconciled.len(),
                        skipped = report.skipped.len(),
                        "policy sync pass finished"
                    );
                }
                Err(error) => {
                    warn!(
                        account_id = %account_id,
                        error = %error,
                        "policy sync pass failed"
                    );
                }
            }
        }

        tokio::time::sleep(Duration::from_secs(config.sync_interval_seconds)).await;
    }
}

async fn connect_pool(database_url: &str) -> AppResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))
}

fn build_policy_sync_service(pool: PgPool, config: &WorkerConfig) -> AppResult<PolicySyncService> {
    let trust_store_repository = Arc::new(PostgresTrustStoreRepository::new(pool.clone()));
    let role_mapping_repository = Arc::new(PostgresRoleMappingRepository::new(pool.clone()));
    let audit_repository = Arc::new(PostgresAuditRepository::new(pool));

    let call_timeout = Duration::from_secs(config.provider_call_timeout_seconds);
    let http_client = reqwest::Client::builder()
        .timeout(call_timeout)
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;
    let identity_broker = Arc::new(KeycloakIdentityBroker::new(
        http_client,
        config.keycloak.clone(),
    )?);
    let secret_encryptor = Arc::new(AesSecretEncryptor::from_hex(
        config.secret_encryption_key.as_str(),
    )?);

    let adapters = ProviderAdapterRegistry::new()
        .with_adapter(Arc::new(
            AwsProviderAdapter::new()
                .with_endpoint_url(config.aws_endpoint_url.clone())
                .with_call_timeout(call_timeout),
        ))
        .with_adapter(Arc::new(GcpProviderAdapter::new()))
        .with_adapter(Arc::new(AzureProviderAdapter::new()));

    let role_mapping_service = RoleMappingService::new(
        role_mapping_repository.clone(),
        role_mapping_repository,
        trust_store_repository.clone(),
        audit_repository.clone(),
    );
    let credential_issuance_service = CredentialIssuanceService::new(
        trust_store_repository.clone(),
        trust_store_repository.clone(),
        role_mapping_service,
        adapters.clone(),
        identity_broker,
        secret_encryptor,
        audit_repository.clone(),
    );

    Ok(PolicySyncService::new(
        trust_store_repository.clone(),
        trust_store_repository.clone(),
        trust_store_repository,
        credential_issuance_service,
        adapters,
        audit_repository,
    ))
}

impl WorkerConfig {
    fn load() -> AppResult<Self> {
        let database_url = required_env("DATABASE_URL")?;
        let keycloak = KeycloakBrokerConfig {
            base_url: required_env("KEYCLOAK_BASE_URL")?,
            realm: required_env("KEYCLOAK_REALM")?,
            client_id: required_env("KEYCLOAK_CLIENT_ID")?,
            client_secret: required_env("KEYCLOAK_CLIENT_SECRET")?,
            saml_audience: optional_env("KEYCLOAK_SAML_AUDIENCE"),
        };
        let secret_encryption_key = required_env("SECRET_ENCRYPTION_KEY")?;
        let aws_endpoint_url = optional_env("AWS_ENDPOINT_URL");
        let sync_account_ids =
            parse_account_ids(env::var("SYNC_ACCOUNT_IDS").unwrap_or_default().as_str())?;
        let sync_policy_scope = PolicyListScope::parse_lenient(
            env::var("SYNC_POLICY_SCOPE")
                .unwrap_or_else(|_| "Local".to_owned())
                .as_str(),
        );
        let sync_interval_seconds = parse_env_u64("SYNC_INTERVAL_SECONDS", 900)?;
        let sync_pass_timeout_seconds = parse_env_u64("SYNC_PASS_TIMEOUT_SECONDS", 600)?;
        let provider_call_timeout_seconds = parse_env_u64("PROVIDER_CALL_TIMEOUT_SECONDS", 30)?;

        validate_timings(
            sync_interval_seconds,
            sync_pass_timeout_seconds,
            provider_call_timeout_seconds,
        )?;

        Ok(Self {
            database_url,
            keycloak,
            secret_encryption_key,
            aws_endpoint_url,
            sync_account_ids,
            sync_policy_scope,
            sync_interval_seconds,
            sync_pass_timeout_seconds,
            provider_call_timeout_seconds,
        })
    }
}

/// Each sync pass runs under its own budget, which must leave room for at least one provider call.
fn validate_timings(
    sync_interval_seconds: u64,
    sync_pass_timeout_seconds: u64,
    provider_call_timeout_seconds: u64,
) -> AppResult<()> {
    for (name, value) in [
        ("SYNC_INTERVAL_SECONDS", sync_interval_seconds),
        ("SYNC_PASS_TIMEOUT_SECONDS", sync_pass_timeout_seconds),
        ("PROVIDER_CALL_TIMEOUT_SECONDS", provider_call_timeout_seconds),
    ] {
        if value == 0 {
            return Err(AppError::InvalidArgument(format!(
                "{name} must be greater than zero"
            )));
        }
    }

    if sync_pass_timeout_seconds < provider_call_timeout_seconds {
        return Err(AppError::InvalidArgument(format!(
            "SYNC_PASS_TIMEOUT_SECONDS ({sync_pass_timeout_seconds}) must not be shorter than \
             PROVIDER_CALL_TIMEOUT_SECONDS ({provider_call_timeout_seconds})"
        )));
    }

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> AppResult<String> {
    env::var(name).map_err(|_| AppError::InvalidArgument(format!("{name} is required")))
}

fn optional_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn parse_env_u64(name: &str, default: u64) -> AppResult<u64> {
    match env::var(name) {
        Ok(value) => value.parse::<u64>().map_err(|error| {
            AppError::InvalidArgument(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}

fn parse_account_ids(value: &str) -> AppResult<Vec<CspAccountId>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            CspAccountId::from_str(entry).map_err(|error| {
                AppError::InvalidArgument(format!(
                    "invalid SYNC_ACCOUNT_IDS entry '{entry}': {error}"
                ))
            })
        })
        .collect()
}
