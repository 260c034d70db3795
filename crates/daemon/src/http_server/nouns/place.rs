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

/// `!<tag>.json` reads the restricted record and requires membership in the
/// tag's restriction set. A plain `<tag>.json` never resolves to it.
pub async fn get_handler(
    State(state): State<ServiceState>,
    Path(file): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let Some(restricted) = file.strip_prefix('!') else {
        let file = NounFile::json(Collection::Place, &file)?;
        return read_mutable(&state, Collection::Place, &file.tag, &file.extension).await;
    };

    let file = NounFile::json(Collection::Place, restricted)?;
    let ctx = RequestContext::new(file.tag, Credentials::from_headers(&headers));
    let ctx = state.pipelines().place_read_restricted.run(ctx).await?;

    let tag = format!("!{}", ctx.tag);
    read_mutable(&state, Collection::Place, &tag, &file.extension).await
}

pub async fn put_handler(
    State(state): State<ServiceState>,
    Path(file): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    if file.starts_with('!') {
        return Err(ApiError::BadRequest(
            "restricted places are written through their plain tag".to_string(),
        ));
    }
    let file = NounFile::json(Collection::Place, &file)?;
    let noun = json_noun(&headers, &body)?;

    let ctx = RequestContext::new(file.tag, Credentials::from_headers(&headers)).with_noun(noun);
    let ctx = state.pipelines().place_put.run(ctx).await?;

    write_mutable(&state, Collection::Place, ctx).await
}
