use crate::http_server::error::ApiError;

/// Always fails. Lets operators check how server errors are reported.
#[tracing::instrument]
pub async fn fail_handler() -> ApiError {
    ApiError::Server("deliberate failure".to_string())
}
