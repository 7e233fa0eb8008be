//! In-memory origin.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;
use url::Url;

use crate::cache::{ResponseKind, StoredResponse};
use crate::error::{Result, WorkerError};
use crate::network::{same_origin, Fetcher};
use crate::request::RequestDescriptor;

/// A site served from memory, with a switch to simulate losing the network.
///
/// Unknown paths answer 404. Requests for other origins answer with an
/// opaque response.
#[derive(Debug)]
pub struct StaticOrigin {
    origin: Url,
    pages: RwLock<HashMap<String, StoredResponse>>,
    failing: RwLock<HashSet<String>>,
    requests: RwLock<Vec<String>>,
    online: AtomicBool,
}

impl StaticOrigin {
    pub fn new(origin: Url) -> Self {
        Self {
            origin,
            pages: RwLock::new(HashMap::new()),
            failing: RwLock::new(HashSet::new()),
            requests: RwLock::new(Vec::new()),
            online: AtomicBool::new(true),
        }
    }

    /// Serves `body` with status 200 at `path`.
    pub async fn serve(&self, path: &str, content_type: &str, body: impl Into<Bytes>) {
        let response = StoredResponse::new(self.url(path), 200, body)
            .with_header("content-type", content_type);
        self.serve_response(path, response).await;
    }

    /// Serves an arbitrary response at `path`.
    pub async fn serve_response(&self, path: &str, response: StoredResponse) {
        self.pages.write().await.insert(path.to_string(), response);
    }

    /// Makes every request for `path` fail as if the connection dropped.
    pub async fn fail_path(&self, path: &str) {
        self.failing.write().await.insert(path.to_string());
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Paths requested so far, including failed attempts.
    pub async fn requests(&self) -> Vec<String> {
        self.requests.read().await.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.requests.read().await.len()
    }

    fn url(&self, path: &str) -> String {
        self.origin
            .join(path)
            .map(String::from)
            .unwrap_or_else(|_| path.to_string())
    }
}

fn path_and_query(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

#[async_trait]
impl Fetcher for StaticOrigin {
    async fn fetch(&self, request: &RequestDescriptor) -> Result<StoredResponse> {
        let path = path_and_query(&request.url);
        self.requests.write().await.push(path.clone());

        if !self.online.load(Ordering::SeqCst) {
            return Err(WorkerError::Network(format!("offline: {}", request.url)));
        }
        if self.failing.read().await.contains(&path) {
            return Err(WorkerError::Network(format!("connection reset: {}", request.url)));
        }
        if !same_origin(&request.url, &self.origin) {
            return Ok(StoredResponse::new(request.url.as_str(), 0, Bytes::new())
                .with_kind(ResponseKind::Opaque));
        }

        let found = self.pages.read().await.get(&path).cloned();
        Ok(found.unwrap_or_else(|| {
            StoredResponse::new(request.url.as_str(), 404, "Not Found")
                .with_header("content-type", "text/plain")
        }))
    }
}
