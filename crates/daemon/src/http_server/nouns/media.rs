use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::Json;
use bytes::Bytes;

use common::prelude::{now_millis, Collection, Receipt};
use store::PutOutcome;

use super::file::NounFile;
use super::media_type::extension_for;
use super::respond::{stored, IMMUTABLE_CACHE};
use crate::auth::{Credentials, RequestContext};
use crate::http_server::error::ApiError;
use crate::ServiceState;

pub async fn get_handler(
    State(state): State<ServiceState>,
    Path(file): Path<String>,
) -> Result<Response, ApiError> {
    let file = NounFile::parse(Collection::Media, &file)?;
    match state.store().media().get(&file.tag, &file.extension).await? {
        Some(data) => Ok(stored(&file.extension, data, IMMUTABLE_CACHE)),
        None => Err(ApiError::missing_item(Collection::Media.name(), file.tag)),
    }
}

/// Stores raw bytes under their digest. The extension comes from the
/// request's `Content-Type`.
pub async fn post_handler(
    State(state): State<ServiceState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Receipt>, ApiError> {
    let tag = state.identity().digest(&body);

    let ctx = RequestContext::new(tag, Credentials::from_headers(&headers));
    let ctx = state.pipelines().media_post.run(ctx).await?;
    let extension = extension_for(&headers)?;

    match state.store().media().put(&ctx.tag, &extension, body).await? {
        PutOutcome::Created => {
            tracing::info!(tag = %ctx.tag, extension = %extension, user = ?ctx.user, "stored media");
            Ok(Json(
                Receipt::new(ctx.tag)
                    .by(ctx.user)
                    .at(Some(now_millis())),
            ))
        }
        PutOutcome::Exists { .. } => Ok(Json(Receipt::new(ctx.tag))),
    }
}
