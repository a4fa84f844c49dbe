//! AWS-backed collaborator implementations.
//!
//! Each client is built once from a shared `SdkConfig` and reused across
//! invocations.

mod comprehend;
mod dynamodb;
mod textract;

pub use comprehend::ComprehendDetector;
pub use dynamodb::DynamoDbSink;
pub use textract::TextractExtractor;

use aws_sdk_dynamodb::error::{ProvideErrorMetadata, SdkError};

/// Service error codes that indicate a transient condition.
const TRANSIENT_ERROR_CODES: &[&str] = &[
    "ThrottlingException",
    "TooManyRequestsException",
    "ProvisionedThroughputExceededException",
    "RequestLimitExceeded",
    "InternalServerError",
    "InternalServerException",
    "ServiceUnavailable",
    "ServiceUnavailableException",
];

/// Load the shared AWS configuration from the environment.
pub async fn load_sdk_config() -> aws_config::SdkConfig {
    aws_config::load_from_env().await
}

/// Decide whether an SDK error is worth retrying.
///
/// Timeouts and dispatch failures never reached the service; service errors
/// are transient when their code is a throttling or server-side fault.
pub(crate) fn is_transient<E, R>(err: &SdkError<E, R>) -> bool
where
    E: ProvideErrorMetadata,
{
    match err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => true,
        SdkError::ServiceError(service) => service
            .err()
            .code()
            .map(|code| TRANSIENT_ERROR_CODES.contains(&code))
            .unwrap_or(false),
        _ => false,
    }
}
