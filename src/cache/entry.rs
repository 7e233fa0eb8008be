//! Cache Entry Module
//!
//! Defines the stored response snapshot and the key it is filed under.

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use url::Url;

// == Request Key ==
/// Cache key for a GET request: the absolute URL without its fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestKey(String);

impl RequestKey {
    /// Builds the key for `url`, dropping any fragment.
    pub fn from_url(url: &Url) -> Self {
        let mut url = url.clone();
        url.set_fragment(None);
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// == Response Kind ==
/// How readable a response is to the page, mirroring fetch response types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    /// Same-origin response with a fully readable body
    Basic,
    /// Cross-origin response that passed CORS
    Cors,
    /// Cross-origin response with no readable body or status
    Opaque,
}

// == Stored Response ==
/// A response snapshot as kept in a cache store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers in arrival order
    pub headers: Vec<(String, String)>,
    /// Full response body
    #[serde(with = "body_base64")]
    pub body: Bytes,
    /// Final URL after redirects
    pub url: String,
    pub kind: ResponseKind,
    /// When this snapshot was taken (Unix milliseconds)
    pub stored_at: i64,
}

impl StoredResponse {
    // == Constructor ==
    /// Creates a same-origin response with no headers.
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
            url: url.into(),
            kind: ResponseKind::Basic,
            stored_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Adds a header, keeping any existing values.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_kind(mut self, kind: ResponseKind) -> Self {
        self.kind = kind;
        self
    }

    /// First value of header `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// True for 2xx statuses.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    // == Runtime Eligibility ==
    /// Whether this response may be written to the runtime store.
    ///
    /// Only complete same-origin successes qualify: status exactly 200 and
    /// a basic response type. Error pages, partial content, redirects and
    /// cross-origin bodies are never cached.
    pub fn is_cacheable(&self) -> bool {
        self.status == 200 && self.kind == ResponseKind::Basic
    }
}

mod body_base64 {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(body: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(body))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded)
            .map(Bytes::from)
            .map_err(serde::de::Error::custom)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_drops_fragment() {
        let url = Url::parse("http://site/notes/a.html#section-2").unwrap();
        let key = RequestKey::from_url(&url);
        assert_eq!(key.as_str(), "http://site/notes/a.html");
    }

    #[test]
    fn test_key_keeps_query() {
        let url = Url::parse("http://site/practice/?q=1").unwrap();
        assert_eq!(RequestKey::from_url(&url).as_str(), "http://site/practice/?q=1");
    }

    #[test]
    fn test_cacheable_requires_200_basic() {
        let ok = StoredResponse::new("http://site/a", 200, "a");
        assert!(ok.is_cacheable());

        let not_found = StoredResponse::new("http://site/a", 404, "missing");
        assert!(!not_found.is_cacheable());

        let partial = StoredResponse::new("http://site/a", 206, "a");
        assert!(!partial.is_cacheable());

        let cors = StoredResponse::new("http://cdn/a", 200, "a").with_kind(ResponseKind::Cors);
        assert!(!cors.is_cacheable());

        let opaque = StoredResponse::new("http://cdn/a", 0, "").with_kind(ResponseKind::Opaque);
        assert!(!opaque.is_cacheable());
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let response = StoredResponse::new("http://site/", 200, "<html>")
            .with_header("Content-Type", "text/html");
        assert_eq!(response.header("content-type"), Some("text/html"));
        assert_eq!(response.header("etag"), None);
    }

    #[test]
    fn test_body_serializes_as_base64() {
        let response = StoredResponse::new("http://site/icon.png", 200, vec![0u8, 159, 255]);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["body"], "AJ//");

        let back: StoredResponse = serde_json::from_value(json).unwrap();
        assert_eq!(back.body, response.body);
    }
}
