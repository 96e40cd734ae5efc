//! AWS implementation of the provider credential adapter.
//!
//! One base SDK configuration is loaded lazily and shared by every client, so
//! all calls reuse the same HTTP client and connection pool. Per-call clients
//! override region, credentials and endpoint from the [`ProviderSession`], so
//! one adapter serves every account and region. Federation calls
//! (`AssumeRoleWithWebIdentity`, `AssumeRoleWithSAML`) are sent unsigned; every
//! other call is signed with the session's credentials, or with the ambient AWS
//! credential chain when the session carries none.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_sts::config::Credentials;
use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;

use cloudtrust_application::provider_ports::{
    AssumeRoleRequest, AssumeRoleWithSamlRequest, AssumeRoleWithWebIdentityRequest,
    CloudProviderAdapter, CreateProviderPolicyInput, CreateProviderRoleInput, IssuedCredentials,
    PolicyListFilter, PolicyPage, ProviderAttachedPolicy, ProviderCallerIdentity, ProviderPolicy,
    ProviderRole, ProviderSession, UpdateProviderRoleInput,
};
use cloudtrust_core::{AppError, AppResult, CallContext};
use cloudtrust_domain::{CspType, PolicyDocument};

use crate::deadline::within_deadline;

mod errors;
mod iam_policies;
mod iam_roles;
mod sts;

use errors::map_sdk_error;

const CREDENTIAL_PROVIDER_NAME: &str = "cloudtrust";
/// Region of the shared base configuration; every client overrides it per session.
const BASE_REGION: &str = "us-east-1";
/// IAM keeps at most five versions of a managed policy.
const MAX_POLICY_VERSIONS: usize = 5;

/// Provider adapter backed by AWS IAM and STS.
#[derive(Clone, Debug, Default)]
pub struct AwsProviderAdapter {
    endpoint_url: Option<String>,
    call_timeout: Option<Duration>,
    base_config: Arc<OnceCell<SdkConfig>>,
}

impl AwsProviderAdapter {
    /// Creates an adapter that talks to the public AWS endpoints.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes calls without a session endpoint to the given URL, for example a local emulator.
    #[must_use]
    pub fn with_endpoint_url(mut self, endpoint_url: Option<String>) -> Self {
        self.endpoint_url = endpoint_url;
        self
    }

    /// Bounds every single SDK operation, retries included.
    ///
    /// Must be set before the first call; the base configuration is loaded once.
    #[must_use]
    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = Some(call_timeout);
        self
    }

    async fn base_config(&self) -> &SdkConfig {
        self.base_config
            .get_or_init(|| async {
                let mut loader = aws_config::defaults(BehaviorVersion::latest())
                    .region(Region::from_static(BASE_REGION));

                if let Some(call_timeout) = self.call_timeout {
                    loader = loader.timeout_config(
                        TimeoutConfig::builder()
                            .operation_timeout(call_timeout)
                            .build(),
                    );
                }

                loader.load().await
            })
            .await
    }

    fn endpoint_for<'a>(&'a self, session: &'a ProviderSession) -> Option<&'a str> {
        session
            .endpoint_url
            .as_deref()
            .or(self.endpoint_url.as_deref())
    }

    async fn iam_client(&self, session: &ProviderSession) -> aws_sdk_iam::Client {
        let mut builder = aws_sdk_iam::config::Builder::from(self.base_config().await)
            .region(Region::new(session.region.clone()));

        if let Some(credentials) = session_credentials(session) {
            builder = builder.credentials_provider(credentials);
        }
        if let Some(endpoint_url) = self.endpoint_for(session) {
            builder = builder.endpoint_url(endpoint_url);
        }

        aws_sdk_iam::Client::from_conf(builder.build())
    }

    async fn sts_client(&self, session: &ProviderSession, unsigned: bool) -> aws_sdk_sts::Client {
        let mut builder = aws_sdk_sts::config::Builder::from(self.base_config().await)
            .region(Region::new(session.region.clone()));

        if unsigned {
            builder.set_credentials_provider(None);
        } else if let Some(credentials) = session_credentials(session) {
            builder = builder.credentials_provider(credentials);
        }
        if let Some(endpoint_url) = self.endpoint_for(session) {
            builder = builder.endpoint_url(endpoint_url);
        }

        aws_sdk_sts::Client::from_conf(builder.build())
    }
}

fn session_credentials(session: &ProviderSession) -> Option<Credentials> {
    session.credentials.as_ref().map(|credentials| {
        Credentials::new(
            credentials.access_key_id.clone(),
            credentials.secret_access_key.clone(),
            credentials.session_token.clone(),
            None,
            CREDENTIAL_PROVIDER_NAME,
        )
    })
}

/// Decodes an IAM policy document, which the API returns URL-encoded.
fn decode_policy_document(raw: &str) -> AppResult<PolicyDocument> {
    let decoded = if raw.trim_start().starts_with('{') {
        raw.to_owned()
    } else {
        url::form_urlencoded::parse(raw.as_bytes())
            .map(|(key, value)| {
                if value.is_empty() {
                    key.into_owned()
                } else {
                    format!("{key}={value}")
                }
            })
            .collect::<Vec<_>>()
            .join("&")
    };

    serde_json::from_str::<PolicyDocument>(decoded.as_str()).map_err(|error| {
        AppError::Provider(format!("provider returned an unreadable policy document: {error}"))
    })
}

fn encode_policy_document(document: &PolicyDocument) -> AppResult<String> {
    serde_json::to_string(document).map_err(|error| {
        AppError::InvalidArgument(format!("policy document is not serializable: {error}"))
    })
}

fn to_utc(value: &aws_sdk_iam::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(value.secs(), value.subsec_nanos())
}

#[async_trait]
impl CloudProviderAdapter for AwsProviderAdapter {
    fn csp_type(&self) -> CspType {
        CspType::Aws
    }

    async fn create_role(
        &self,
        context: &CallContext,
        session: &ProviderSession,
        input: CreateProviderRoleInput,
    ) -> AppResult<ProviderRole> {
        within_deadline(context, "create_role", self.create_role_impl(session, input)).await
    }

    async fn get_role(
        &self,
        context: &CallContext,
        session: &ProviderSession,
        role_name: &str,
    ) -> AppResult<ProviderRole> {
        within_deadline(context, "get_role", self.get_role_impl(session, role_name)).await
    }

    async fn update_role(
        &self,
        context: &CallContext,
        session: &ProviderSession,
        input: UpdateProviderRoleInput,
    ) -> AppResult<ProviderRole> {
        within_deadline(context, "update_role", self.update_role_impl(session, input)).await
    }

    async fn delete_role(
        &self,
        context: &CallContext,
        session: &ProviderSession,
        role_name: &str,
    ) -> AppResult<()> {
        within_deadline(context, "delete_role", self.delete_role_impl(session, role_name)).await
    }

    async fn attach_role_policy(
        &self,
        context: &CallContext,
        session: &ProviderSession,
        role_name: &str,
        provider_policy_id: &str,
    ) -> AppResult<()> {
        within_deadline(
            context,
            "attach_role_policy",
            self.attach_role_policy_impl(session, role_name, provider_policy_id),
        )
        .await
    }

    async fn detach_role_policy(
        &self,
        context: &CallContext,
        session: &ProviderSession,
        role_name: &str,
        provider_policy_id: &str,
    ) -> AppResult<()> {
        within_deadline(
            context,
            "detach_role_policy",
            self.detach_role_policy_impl(session, role_name, provider_policy_id),
        )
        .await
    }

    async fn list_attached_role_policies(
        &self,
        context: &CallContext,
        session: &ProviderSession,
        role_name: &str,
    ) -> AppResult<Vec<ProviderAttachedPolicy>> {
        within_deadline(
            context,
            "list_attached_role_policies",
            self.list_attached_role_policies_impl(session, role_name),
        )
        .await
    }

    async fn list_role_policies(
        &self,
        context: &CallContext,
        session: &ProviderSession,
        role_name: &str,
    ) -> AppResult<Vec<String>> {
        within_deadline(
            context,
            "list_role_policies",
            self.list_role_policies_impl(session, role_name),
        )
        .await
    }

    async fn get_role_policy(
        &self,
        context: &CallContext,
        session: &ProviderSession,
        role_name: &str,
        policy_name: &str,
    ) -> AppResult<PolicyDocument> {
        within_deadline(
            context,
            "get_role_policy",
            self.get_role_policy_impl(session, role_name, policy_name),
        )
        .await
    }

    async fn put_role_policy(
        &self,
        context: &CallContext,
        session: &ProviderSession,
        role_name: &str,
        policy_name: &str,
        document: &PolicyDocument,
    ) -> AppResult<()> {
        within_deadline(
            context,
            "put_role_policy",
            self.put_role_policy_impl(session, role_name, policy_name, document),
        )
        .await
    }

    async fn delete_role_policy(
        &self,
        context: &CallContext,
        session: &ProviderSession,
        role_name: &str,
        policy_name: &str,
    ) -> AppResult<()> {
        within_deadline(
            context,
            "delete_role_policy",
            self.delete_role_policy_impl(session, role_name, policy_name),
        )
        .await
    }

    async fn create_policy(
        &self,
        context: &CallContext,
        session: &ProviderSession,
        input: CreateProviderPolicyInput,
    ) -> AppResult<ProviderPolicy> {
        within_deadline(context, "create_policy", self.create_policy_impl(session, input)).await
    }

    async fn get_policy(
        &self,
        context: &CallContext,
        session: &ProviderSession,
        provider_policy_id: &str,
    ) -> AppResult<ProviderPolicy> {
        within_deadline(
            context,
            "get_policy",
            self.get_policy_impl(session, provider_policy_id),
        )
        .await
    }

    async fn get_policy_document(
        &self,
        context: &CallContext,
        session: &ProviderSession,
        provider_policy_id: &str,
        version_id: Option<&str>,
    ) -> AppResult<PolicyDocument> {
        within_deadline(
            context,
            "get_policy_document",
            self.get_policy_document_impl(session, provider_policy_id, version_id),
        )
        .await
    }

    async fn update_policy(
        &self,
        context: &CallContext,
        session: &ProviderSession,
        provider_policy_id: &str,
        document: &PolicyDocument,
    ) -> AppResult<ProviderPolicy> {
        within_deadline(
            context,
            "update_policy",
            self.update_policy_impl(session, provider_policy_id, document),
        )
        .await
    }

    async fn delete_policy(
        &self,
        context: &CallContext,
        session: &ProviderSession,
        provider_policy_id: &str,
    ) -> AppResult<()> {
        within_deadline(
            context,
            "delete_policy",
            self.delete_policy_impl(session, provider_policy_id),
        )
        .await
    }

    async fn list_policies(
        &self,
        context: &CallContext,
        session: &ProviderSession,
        filter: &PolicyListFilter,
    ) -> AppResult<PolicyPage> {
        within_deadline(
            context,
            "list_policies",
            self.list_policies_impl(session, filter),
        )
        .await
    }

    async fn assume_role_with_web_identity(
        &self,
        context: &CallContext,
        request: AssumeRoleWithWebIdentityRequest,
    ) -> AppResult<IssuedCredentials> {
        within_deadline(
            context,
            "assume_role_with_web_identity",
            self.assume_role_with_web_identity_impl(request),
        )
        .await
    }

    async fn assume_role_with_saml(
        &self,
        context: &CallContext,
        request: AssumeRoleWithSamlRequest,
    ) -> AppResult<IssuedCredentials> {
        within_deadline(
            context,
            "assume_role_with_saml",
            self.assume_role_with_saml_impl(request),
        )
        .await
    }

    async fn assume_role(
        &self,
        context: &CallContext,
        request: AssumeRoleRequest,
    ) -> AppResult<IssuedCredentials> {
        within_deadline(context, "assume_role", self.assume_role_impl(request)).await
    }

    async fn verify_caller_identity(
        &self,
        context: &CallContext,
        session: &ProviderSession,
    ) -> AppResult<ProviderCallerIdentity> {
        within_deadline(
            context,
            "verify_caller_identity",
            self.verify_caller_identity_impl(session),
        )
        .await
    }
}
