//! Request Descriptor
//!
//! What the worker knows about an intercepted request.

use bytes::Bytes;
use url::Url;

use crate::cache::RequestKey;

/// Request mode, as reported by the `Sec-Fetch-Mode` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    Navigate,
    SameOrigin,
    NoCors,
    Cors,
}

impl RequestMode {
    pub fn from_header(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "navigate" => Some(Self::Navigate),
            "same-origin" => Some(Self::SameOrigin),
            "no-cors" => Some(Self::NoCors),
            "cors" => Some(Self::Cors),
            _ => None,
        }
    }
}

/// Declared content category, as reported by the `Sec-Fetch-Dest` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Document,
    Style,
    Script,
    Image,
    Font,
    /// Plain `fetch()` calls and requests without a declared destination
    Empty,
    Other,
}

impl Destination {
    pub fn from_header(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "document" => Self::Document,
            "style" => Self::Style,
            "script" => Self::Script,
            "image" => Self::Image,
            "font" => Self::Font,
            "" | "empty" => Self::Empty,
            _ => Self::Other,
        }
    }

    /// Style, script, image and font requests.
    pub fn is_subresource_asset(self) -> bool {
        matches!(self, Self::Style | Self::Script | Self::Image | Self::Font)
    }
}

// == Request Descriptor ==
/// An intercepted request.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// Upper-case HTTP method
    pub method: String,
    /// Absolute request URL
    pub url: Url,
    pub mode: RequestMode,
    pub destination: Destination,
    /// End-to-end request headers to forward
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl RequestDescriptor {
    /// A plain GET with no declared mode or destination.
    pub fn get(url: Url) -> Self {
        Self {
            method: "GET".to_string(),
            url,
            mode: RequestMode::NoCors,
            destination: Destination::Empty,
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    /// A top-level page load.
    pub fn navigation(url: Url) -> Self {
        Self {
            mode: RequestMode::Navigate,
            destination: Destination::Document,
            ..Self::get(url)
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into().to_ascii_uppercase();
        self
    }

    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    pub fn with_mode(mut self, mode: RequestMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }

    /// Whether the page asked for a full document.
    pub fn wants_document(&self) -> bool {
        self.destination == Destination::Document
    }

    pub fn cache_key(&self) -> RequestKey {
        RequestKey::from_url(&self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(path: &str) -> Url {
        Url::parse("http://site").unwrap().join(path).unwrap()
    }

    #[test]
    fn test_destination_from_header() {
        assert_eq!(Destination::from_header("document"), Destination::Document);
        assert_eq!(Destination::from_header("Style"), Destination::Style);
        assert_eq!(Destination::from_header("empty"), Destination::Empty);
        assert_eq!(Destination::from_header("audioworklet"), Destination::Other);
        assert!(Destination::Font.is_subresource_asset());
        assert!(!Destination::Document.is_subresource_asset());
    }

    #[test]
    fn test_mode_from_header() {
        assert_eq!(RequestMode::from_header("navigate"), Some(RequestMode::Navigate));
        assert_eq!(RequestMode::from_header("websocket"), None);
    }

    #[test]
    fn test_navigation_wants_document() {
        let request = RequestDescriptor::navigation(url("/about.html"));
        assert!(request.is_get());
        assert!(request.wants_document());
        assert_eq!(request.mode, RequestMode::Navigate);
    }

    #[test]
    fn test_method_is_normalized() {
        let request = RequestDescriptor::get(url("/")).with_method("post");
        assert_eq!(request.method, "POST");
        assert!(!request.is_get());
    }

    #[test]
    fn test_cache_key_ignores_fragment() {
        let a = RequestDescriptor::get(url("/notes/x.html#top"));
        let b = RequestDescriptor::get(url("/notes/x.html"));
        assert_eq!(a.cache_key(), b.cache_key());
    }
}
