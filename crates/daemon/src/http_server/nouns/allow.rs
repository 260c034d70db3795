use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;

use common::prelude::Receipt;

use crate::auth::{Credentials, RequestContext};
use crate::http_server::error::ApiError;
use crate::ServiceState;

/// Adds the authenticated user to the friend set of `tag`.
pub async fn handler(
    State(state): State<ServiceState>,
    Path(tag): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Receipt>, ApiError> {
    let ctx = RequestContext::new(tag, Credentials::from_headers(&headers));
    let ctx = state.pipelines().allow.run(ctx).await?;
    let user = ctx
        .user
        .ok_or_else(|| ApiError::Server("allow pipeline did not authenticate".to_string()))?;

    let scope = state.store().friends().add_member(&ctx.tag, &user).await?;
    tracing::info!(tag = %scope, user = %user, "added friend");
    Ok(Json(Receipt::new(scope)))
}
