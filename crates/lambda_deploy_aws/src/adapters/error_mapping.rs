use aws_sdk_lambda::error::{DisplayErrorContext, ProvideErrorMetadata};
use lambda_deploy_core::error::{ProviderError, ProviderErrorKind};

/// Maps a Lambda service error code onto the provider-agnostic error kinds.
pub fn classify_error_code(code: Option<&str>) -> ProviderErrorKind {
    match code {
        Some("ResourceConflictException") => ProviderErrorKind::AlreadyExists,
        Some("ResourceNotFoundException") => ProviderErrorKind::NotFound,
        Some("InvalidParameterValueException" | "InvalidRequestContentException") => {
            ProviderErrorKind::InvalidParameter
        }
        _ => ProviderErrorKind::Service,
    }
}

pub fn provider_error<E>(operation: &str, error: E) -> ProviderError
where
    E: ProvideErrorMetadata + std::error::Error,
{
    let kind = classify_error_code(error.code());
    ProviderError::new(
        kind,
        format!("{operation} failed: {}", DisplayErrorContext(error)),
    )
}

/// Unwraps a field the Lambda API documents as always present.
pub fn required<T>(value: Option<T>, field: &str) -> Result<T, ProviderError> {
    value.ok_or_else(|| ProviderError::malformed_response(field))
}
