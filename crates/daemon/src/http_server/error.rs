use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use common::prelude::EnvelopeError;
use store::StoreError;

use crate::auth::{challenge, AuthError};

/// Every way a request can fail, and how each one is answered.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    UnsupportedMediaType(String),

    /// No route matched
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("no {kind} tagged {tag}")]
    MissingItem { kind: String, tag: String },

    #[error("no collection named {0}")]
    MissingCollection(String),

    /// Nothing anywhere carries the tag
    #[error("nothing tagged {0}")]
    Tagged(String),

    #[error("{0}")]
    Server(String),

    #[error("store error: {0}")]
    Store(StoreError),
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    name: &'static str,
    message: String,
    status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'a str>,
}

impl ApiError {
    pub fn missing_item(kind: impl Into<String>, tag: impl Into<String>) -> Self {
        ApiError::MissingItem {
            kind: kind.into(),
            tag: tag.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::NotFound(_)
            | ApiError::MissingItem { .. }
            | ApiError::MissingCollection(_)
            | ApiError::Tagged(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Server(_) | ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The `name` reported in the error body.
    pub fn name(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_)
            | ApiError::UnsupportedMediaType(_)
            | ApiError::NotFound(_)
            | ApiError::Unauthorized(_) => "ClientError",
            ApiError::Forbidden(_) => "ForbiddenError",
            ApiError::MissingItem { .. } => "MissingItemError",
            ApiError::MissingCollection(_) => "MissingCollectionError",
            ApiError::Tagged(_) => "TaggedError",
            ApiError::Server(_) | ApiError::Store(_) => "ServerError",
        }
    }

    fn is_server_error(&self) -> bool {
        self.status().is_server_error()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if self.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "internal server error".to_string()
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request refused");
            self.to_string()
        };

        let (tag, kind) = match &self {
            ApiError::MissingItem { kind, tag } => (Some(tag.as_str()), Some(kind.as_str())),
            ApiError::MissingCollection(collection) => (Some(collection.as_str()), None),
            ApiError::Tagged(tag) => (Some(tag.as_str()), None),
            _ => (None, None),
        };

        let body = ErrorBody {
            name: self.name(),
            message,
            status: status.as_u16(),
            tag,
            kind,
        };
        let mut response = (status, Json(body)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            if let Ok(value) = HeaderValue::from_str(&challenge()) {
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, value);
            }
        }
        response
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidKey(segment) => {
                ApiError::BadRequest(format!("invalid tag or name: {:?}", segment))
            }
            other => ApiError::Store(other),
        }
    }
}

impl From<EnvelopeError> for ApiError {
    fn from(err: EnvelopeError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials | AuthError::Rejected => {
                ApiError::Unauthorized(err.to_string())
            }
            AuthError::Forbidden(message) => ApiError::Forbidden(message),
            AuthError::Invalid(message) => ApiError::BadRequest(message),
            AuthError::Store(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_missing_item_body() {
        let response = ApiError::missing_item("thing", "abc").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({
                "name": "MissingItemError",
                "message": "no thing tagged abc",
                "status": 404,
                "tag": "abc",
                "kind": "thing"
            })
        );
    }

    #[tokio::test]
    async fn test_server_errors_hide_detail() {
        let err = ApiError::from(StoreError::Unavailable("/secret/path".into()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["name"], "ServerError");
        assert!(!body["message"].as_str().unwrap().contains("secret"));
    }

    #[tokio::test]
    async fn test_unauthorized_challenges() {
        let response = ApiError::from(AuthError::MissingCredentials).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers()[header::WWW_AUTHENTICATE],
            "Basic realm=\"nouns\""
        );
        assert_eq!(body_json(response).await["name"], "ClientError");
    }

    #[test]
    fn test_conversions() {
        assert!(matches!(
            ApiError::from(StoreError::InvalidKey("..".into())),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from(AuthError::Forbidden("no".into())),
            ApiError::Forbidden(_)
        ));
        assert_eq!(ApiError::Tagged("x".into()).name(), "TaggedError");
        assert_eq!(
            ApiError::MissingCollection("x".into()).status(),
            StatusCode::NOT_FOUND
        );
    }
}
