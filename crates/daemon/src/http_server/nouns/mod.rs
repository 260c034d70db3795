//! Noun routes, mounted under `/noun`.

use axum::extract::OriginalUri;
use axum::routing::{delete, get, post};
use axum::Router;

use common::prelude::Collection;

use crate::http_server::error::ApiError;
use crate::ServiceState;

mod allow;
mod file;
mod media;
mod media_type;
mod owner;
mod place;
mod purge;
mod respond;
mod thing;

pub const NOUN_PREFIX: &str = "/noun";

pub fn router() -> Router<ServiceState> {
    Router::new()
        .route("/owner/:file", get(owner::get_handler).put(owner::put_handler))
        .route("/place/:file", get(place::get_handler).put(place::put_handler))
        .route("/allow/:tag", post(allow::handler))
        .route("/thing", post(thing::post_handler).get(missing_handler))
        .route("/thing/:file", get(thing::get_handler))
        .route("/media", post(media::post_handler).get(missing_handler))
        .route("/media/:file", get(media::get_handler))
        .route("/:tag", delete(purge::handler).get(missing_handler))
        .fallback(missing_handler)
}

/// Unmatched paths name either a missing item of a known collection or a
/// collection that does not exist.
async fn missing_handler(OriginalUri(uri): OriginalUri) -> ApiError {
    let path = uri.path();
    let path = path.strip_prefix(NOUN_PREFIX).unwrap_or(path);
    classify_missing(path)
}

fn classify_missing(path: &str) -> ApiError {
    let mut segments = path.trim_start_matches('/').splitn(2, '/');
    let collection = segments.next().unwrap_or_default();
    let rest = segments.next().unwrap_or_default();

    match collection.parse::<Collection>() {
        Ok(collection) => {
            let tag = rest.split('/').next().unwrap_or_default();
            let tag = tag.rsplit_once('.').map_or(tag, |(tag, _)| tag);
            ApiError::missing_item(collection.name(), tag)
        }
        Err(_) => ApiError::MissingCollection(collection.to_string()),
    }
}
