use axum::extract::{Path, State};
use axum::Json;

use common::prelude::Receipt;

use crate::http_server::error::ApiError;
use crate::ServiceState;

/// Administrative delete of a tag from every collection, with its friend
/// set, private properties and restriction set.
pub async fn handler(
    State(state): State<ServiceState>,
    Path(tag): Path<String>,
) -> Result<Json<Receipt>, ApiError> {
    if state.store().purge(&tag).await? {
        Ok(Json(Receipt::new(tag)))
    } else {
        Err(ApiError::Tagged(tag))
    }
}
