use axum::http::{Method, Uri};

use crate::http_server::error::ApiError;

pub async fn not_found_handler(method: Method, uri: Uri) -> ApiError {
    ApiError::NotFound(format!("{} {} not found", method, uri.path()))
}
