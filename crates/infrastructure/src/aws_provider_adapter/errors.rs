use std::error::Error as StdError;

use aws_sdk_iam::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use cloudtrust_core::AppError;

/// Maps an SDK failure onto the adapter error kinds.
pub(super) fn map_sdk_error<E>(operation: &str, error: SdkError<E>) -> AppError
where
    E: ProvideErrorMetadata + StdError + Send + Sync + 'static,
{
    match &error {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => {
            AppError::ProviderUnavailable(format!(
                "{operation} could not reach the provider: {}",
                DisplayErrorContext(&error)
            ))
        }
        _ => {
            let code = error.code().map(str::to_owned);
            let message = error
                .message()
                .map(str::to_owned)
                .unwrap_or_else(|| DisplayErrorContext(&error).to_string());
            classify_error_code(operation, code.as_deref(), message)
        }
    }
}

/// Classifies a provider error code.
pub(super) fn classify_error_code(
    operation: &str,
    code: Option<&str>,
    message: String,
) -> AppError {
    let detail = format!("{operation} failed: {message}");

    match code {
        Some("NoSuchEntity" | "NoSuchEntityException") => AppError::NotFound(detail),
        Some("EntityAlreadyExists" | "EntityAlreadyExistsException") => {
            AppError::AlreadyExists(detail)
        }
        Some(
            "AccessDenied"
            | "AccessDeniedException"
            | "ExpiredToken"
            | "ExpiredTokenException"
            | "IDPRejectedClaim"
            | "InvalidClientTokenId"
            | "RegionDisabledException"
            | "UnrecognizedClientException",
        ) => AppError::PermissionDenied(detail),
        Some(
            "InvalidInput"
            | "MalformedPolicyDocument"
            | "PackedPolicyTooLarge"
            | "ValidationError"
            | "InvalidIdentityToken"
            | "InvalidParameterValue",
        ) => AppError::InvalidArgument(detail),
        Some(
            "Throttling"
            | "ThrottlingException"
            | "ServiceFailure"
            | "ServiceUnavailable"
            | "IDPCommunicationError"
            | "RequestTimeout",
        ) => AppError::ProviderUnavailable(detail),
        Some(code) => AppError::Provider(format!("{detail} ({code})")),
        None => AppError::Provider(detail),
    }
}
