use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use http::header::AUTHORIZATION;
use http::HeaderMap;

/// Realm announced in `WWW-Authenticate` challenges.
pub const REALM: &str = "nouns";

/// A usertag and password taken from an `Authorization: Basic` header.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }

    /// Missing or malformed headers yield `None`.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
        Self::parse(value)
    }

    pub fn parse(value: &str) -> Option<Self> {
        let (scheme, encoded) = value.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return None;
        }
        let decoded = STANDARD.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (user, password) = decoded.split_once(':')?;
        if user.is_empty() {
            return None;
        }
        Some(Self::new(user, password))
    }

    /// The `Authorization` header value carrying these credentials.
    pub fn header_value(&self) -> String {
        let pair = format!("{}:{}", self.user, self.password);
        format!("Basic {}", STANDARD.encode(pair))
    }
}

/// The `WWW-Authenticate` challenge sent with 401 answers.
pub fn challenge() -> String {
    format!("Basic realm=\"{}\"", REALM)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trips_through_header() {
        let credentials = Credentials::new("user", "pa:ss");
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            credentials.header_value().parse().unwrap(),
        );
        assert_eq!(Credentials::from_headers(&headers), Some(credentials));
    }

    #[test]
    fn test_rejects_malformed_headers() {
        assert_eq!(Credentials::parse("Bearer abc"), None);
        assert_eq!(Credentials::parse("Basic !!!"), None);
        // "nocolon"
        assert_eq!(Credentials::parse("Basic bm9jb2xvbg=="), None);
        assert_eq!(Credentials::from_headers(&HeaderMap::new()), None);
    }

    #[test]
    fn test_debug_hides_password() {
        let rendered = format!("{:?}", Credentials::new("user", "secret"));
        assert!(!rendered.contains("secret"));
    }
}
