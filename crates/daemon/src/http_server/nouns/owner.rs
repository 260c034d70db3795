use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use common::prelude::Collection;

use super::file::NounFile;
use super::respond::{json_noun, read_mutable, write_mutable};
use crate::auth::{Credentials, RequestContext};
use crate::http_server::error::ApiError;
use crate::ServiceState;

pub async fn get_handler(
    State(state): State<ServiceState>,
    Path(file): Path<String>,
) -> Result<Response, ApiError> {
    let file = NounFile::json(Collection::Owner, &file)?;
    read_mutable(&state, Collection::Owner, &file.tag, &file.extension).await
}

/// A user claims or replaces their own owner record. The first write by an
/// unseen usertag records its password.
pub async fn put_handler(
    State(state): State<ServiceState>,
    Path(file): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let file = NounFile::json(Collection::Owner, &file)?;
    let noun = json_noun(&headers, &body)?;

    let ctx = RequestContext::new(file.tag, Credentials::from_headers(&headers)).with_noun(noun);
    let ctx = state.pipelines().owner_put.run(ctx).await?;

    write_mutable(&state, Collection::Owner, ctx).await
}
