use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use serde_json::Value;

use common::prelude::{Collection, Receipt};
use store::PutOutcome;

use super::file::NounFile;
use super::respond::{json_noun, stored, IMMUTABLE_CACHE};
use crate::auth::{Credentials, RequestContext};
use crate::http_server::error::ApiError;
use crate::ServiceState;

pub async fn get_handler(
    State(state): State<ServiceState>,
    Path(file): Path<String>,
) -> Result<Response, ApiError> {
    let file = NounFile::parse(Collection::Thing, &file)?;
    match state.store().things().get(&file.tag, &file.extension).await? {
        Some(data) => Ok(stored(&file.extension, data, IMMUTABLE_CACHE)),
        None => Err(ApiError::missing_item(Collection::Thing.name(), file.tag)),
    }
}

/// Stores a JSON noun under the digest of its identity data.
///
/// Resubmitting content that already exists is not an error: the answer is
/// the stored record, so every submitter converges on the first author and
/// timestamp.
pub async fn post_handler(
    State(state): State<ServiceState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let noun = json_noun(&headers, &body)?;
    let tag = noun.identity_tag(state.identity());

    let ctx = RequestContext::new(tag, Credentials::from_headers(&headers)).with_noun(noun);
    let ctx = state.pipelines().thing_post.run(ctx).await?;
    let record = ctx
        .noun
        .as_ref()
        .map(|noun| Bytes::from(noun.combined_bytes()))
        .ok_or_else(|| ApiError::Server("write without a body".to_string()))?;

    match state.store().things().put(&ctx.tag, "json", record).await? {
        PutOutcome::Created => {
            tracing::info!(tag = %ctx.tag, user = ?ctx.user, "stored thing");
            let receipt = Receipt::new(ctx.tag).by(ctx.user).at(ctx.timestamp);
            Ok(Json(receipt).into_response())
        }
        PutOutcome::Exists { existing } => {
            tracing::debug!(tag = %ctx.tag, "thing already stored");
            let existing = existing
                .ok_or_else(|| ApiError::Server(format!("thing {} vanished", ctx.tag)))?;
            let mut record: Value = serde_json::from_slice(&existing)
                .map_err(|e| ApiError::Server(format!("stored thing {} is corrupt: {}", ctx.tag, e)))?;
            let Some(object) = record.as_object_mut() else {
                return Err(ApiError::Server(format!(
                    "stored thing {} is not an object",
                    ctx.tag
                )));
            };
            object.insert("tag".to_string(), Value::String(ctx.tag));
            Ok(Json(record).into_response())
        }
    }
}
