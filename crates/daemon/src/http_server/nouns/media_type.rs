use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;

use crate::http_server::error::ApiError;

/// Maps a request's `Content-Type` to the extension its payload is stored under.
///
/// Only the essence of the media type counts; parameters such as
/// `charset` are ignored. Image subtypes keep their structured-syntax
/// suffix, so `image/svg+xml` is stored as `svg+xml`.
pub fn extension_for(headers: &HeaderMap) -> Result<String, ApiError> {
    let value = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::UnsupportedMediaType("missing Content-Type".to_string()))?;
    let parsed: mime::Mime = value
        .parse()
        .map_err(|_| ApiError::UnsupportedMediaType(format!("unparseable Content-Type {}", value)))?;

    match (parsed.type_(), parsed.subtype()) {
        (mime::APPLICATION, mime::JSON) => Ok("json".to_string()),
        (mime::TEXT, mime::PLAIN) => Ok("txt".to_string()),
        (mime::IMAGE, _) => parsed
            .essence_str()
            .strip_prefix("image/")
            .filter(|subtype| !subtype.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                ApiError::UnsupportedMediaType(format!("unsupported media type {}", value))
            }),
        _ => Err(ApiError::UnsupportedMediaType(format!(
            "unsupported media type {}",
            parsed.essence_str()
        ))),
    }
}

/// JSON routes accept nothing else.
pub fn require_json(headers: &HeaderMap) -> Result<(), ApiError> {
    match extension_for(headers)?.as_str() {
        "json" => Ok(()),
        other => Err(ApiError::UnsupportedMediaType(format!(
            "expected application/json, got a {} payload",
            other
        ))),
    }
}

/// The `Content-Type` to serve a stored extension with.
pub fn content_type_for(extension: &str) -> String {
    match extension {
        "json" => mime::APPLICATION_JSON.to_string(),
        "txt" => mime::TEXT_PLAIN_UTF_8.to_string(),
        other => mime_guess::from_ext(other)
            .first()
            .map(|guess| guess.to_string())
            .unwrap_or_else(|| format!("image/{}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(content_type: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, content_type.parse().unwrap());
        headers
    }

    #[test]
    fn test_extension_for() {
        assert_eq!(extension_for(&headers("application/json")).unwrap(), "json");
        assert_eq!(
            extension_for(&headers("application/json; charset=utf-8")).unwrap(),
            "json"
        );
        assert_eq!(extension_for(&headers("text/plain")).unwrap(), "txt");
        assert_eq!(extension_for(&headers("image/png")).unwrap(), "png");
        assert_eq!(extension_for(&headers("image/jpeg")).unwrap(), "jpeg");
        assert_eq!(extension_for(&headers("image/svg+xml")).unwrap(), "svg+xml");
        assert_eq!(
            extension_for(&headers("image/svg+xml; charset=utf-8")).unwrap(),
            "svg+xml"
        );
    }

    #[test]
    fn test_unsupported() {
        assert!(matches!(
            extension_for(&headers("application/octet-stream")),
            Err(ApiError::UnsupportedMediaType(_))
        ));
        assert!(matches!(
            extension_for(&HeaderMap::new()),
            Err(ApiError::UnsupportedMediaType(_))
        ));
        assert!(matches!(
            require_json(&headers("text/plain")),
            Err(ApiError::UnsupportedMediaType(_))
        ));
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("json"), "application/json");
        assert_eq!(content_type_for("txt"), "text/plain; charset=utf-8");
        assert_eq!(content_type_for("png"), "image/png");
        assert_eq!(content_type_for("webp"), "image/webp");
        assert_eq!(content_type_for("svg+xml"), "image/svg+xml");
    }
}
