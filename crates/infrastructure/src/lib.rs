//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod aes_secret_encryptor;
mod aws_provider_adapter;
mod azure_provider_adapter;
mod deadline;
mod gcp_provider_adapter;
mod keycloak_identity_broker;
mod postgres_audit_repository;
mod postgres_role_mapping_repository;
mod postgres_trust_store_repository;

pub use aes_secret_encryptor::AesSecretEncryptor;
pub use aws_provider_adapter::AwsProviderAdapter;
pub use azure_provider_adapter::AzureProviderAdapter;
pub use gcp_provider_adapter::GcpProviderAdapter;
pub use keycloak_identity_broker::{KeycloakBrokerConfig, KeycloakIdentityBroker};
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_role_mapping_repository::PostgresRoleMappingRepository;
pub use postgres_trust_store_repository::PostgresTrustStoreRepository;
