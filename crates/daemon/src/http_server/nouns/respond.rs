use axum::body::Body;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;

use common::prelude::{now_millis, Collection, Envelope, Receipt};

use super::media_type::{content_type_for, require_json};
use crate::auth::RequestContext;
use crate::http_server::error::ApiError;
use crate::ServiceState;

pub const IMMUTABLE_CACHE: &str = "public, max-age=31536000, immutable";
pub const MUTABLE_CACHE: &str = "no-cache";

/// Serves stored bytes with the type of their extension.
pub fn stored(extension: &str, data: Bytes, cache: &'static str) -> Response {
    let mut response = (StatusCode::OK, Body::from(data)).into_response();
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&content_type_for(extension)) {
        headers.insert(CONTENT_TYPE, value);
    }
    headers.insert(CACHE_CONTROL, HeaderValue::from_static(cache));
    response
}

/// Negotiates and parses a JSON noun body, stamping the current time if the
/// writer supplied none.
pub fn json_noun(headers: &HeaderMap, body: &Bytes) -> Result<Envelope, ApiError> {
    require_json(headers)?;
    let mut noun = Envelope::from_slice(body)?;
    noun.stamp_if_missing(now_millis());
    Ok(noun)
}

/// Reads a mutable record, or answers MissingItem.
pub async fn read_mutable(
    state: &ServiceState,
    collection: Collection,
    tag: &str,
    extension: &str,
) -> Result<Response, ApiError> {
    match state.store().read(collection, tag, extension).await? {
        Some(data) => Ok(stored(extension, data, MUTABLE_CACHE)),
        None => Err(ApiError::missing_item(collection.name(), tag)),
    }
}

/// Writes the noun carried by a context that has passed its pipeline.
pub async fn write_mutable(
    state: &ServiceState,
    collection: Collection,
    ctx: RequestContext,
) -> Result<Json<Receipt>, ApiError> {
    let noun = ctx
        .noun
        .ok_or_else(|| ApiError::Server("write without a body".to_string()))?;
    let store = match collection {
        Collection::Owner => state.store().owners(),
        Collection::Place => state.store().places(),
        other => {
            return Err(ApiError::Server(format!(
                "{} is not a mutable collection",
                other
            )))
        }
    };

    let receipt = store
        .put(
            &ctx.tag,
            "json",
            Bytes::from(noun.combined_bytes()),
            ctx.user,
            ctx.timestamp,
        )
        .await?;
    tracing::info!(
        collection = %collection,
        tag = %receipt.tag,
        user = ?receipt.user_tag,
        "wrote mutable noun"
    );
    Ok(Json(receipt))
}
