//! Network Module
//!
//! The worker's view of the network: a `Fetcher` seam with an HTTP client
//! implementation for real origins and an in-memory origin for tests and
//! demos.
//!
//! A fetch only fails when no response arrives at all. Any HTTP status,
//! including 404 and 500, is a successful fetch; callers decide what to do
//! with it.

mod http;
mod static_origin;

use async_trait::async_trait;
use url::Url;

use crate::cache::StoredResponse;
use crate::error::Result;
use crate::request::RequestDescriptor;

pub use http::HttpFetcher;
pub use static_origin::StaticOrigin;

/// Headers that describe a single connection and must not be forwarded.
pub const HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "content-length",
    "host",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

// == Fetcher ==
/// Performs a single network attempt for a request.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &RequestDescriptor) -> Result<StoredResponse>;
}

/// True when both URLs share scheme, host and port.
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.origin() == b.origin()
}

pub fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP_HEADERS
        .iter()
        .any(|h| h.eq_ignore_ascii_case(name))
}
