//! HTTP fetcher backed by reqwest.

use async_trait::async_trait;
use reqwest::{Client, Method};
use tracing::debug;
use url::Url;

use crate::cache::{ResponseKind, StoredResponse};
use crate::error::{Result, WorkerError};
use crate::network::{is_hop_by_hop, same_origin, Fetcher};
use crate::request::RequestDescriptor;

/// Fetches requests from the real network.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    origin: Url,
}

impl HttpFetcher {
    /// Creates a fetcher whose same-origin responses are those from `origin`.
    pub fn new(origin: Url) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| WorkerError::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, origin })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &RequestDescriptor) -> Result<StoredResponse> {
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| WorkerError::InvalidRequest(format!("bad method {}", request.method)))?;

        let mut builder = self.client.request(method, request.url.clone());
        for (name, value) in &request.headers {
            if !is_hop_by_hop(name) {
                builder = builder.header(name, value);
            }
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| WorkerError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let final_url = response.url().clone();
        let kind = if same_origin(&final_url, &self.origin) {
            ResponseKind::Basic
        } else {
            ResponseKind::Cors
        };
        let headers = response
            .headers()
            .iter()
            .filter(|(name, _)| !is_hop_by_hop(name.as_str()))
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| WorkerError::Network(e.to_string()))?;

        debug!(url = %final_url, status, bytes = body.len(), "fetched from network");

        Ok(StoredResponse {
            status,
            headers,
            body,
            url: final_url.into(),
            kind,
            stored_at: chrono::Utc::now().timestamp_millis(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_origin_is_network_error() {
        // Port 9 (discard) on localhost is expected to refuse connections
        let origin = Url::parse("http://127.0.0.1:9").unwrap();
        let fetcher = HttpFetcher::new(origin.clone()).unwrap();

        let result = fetcher.fetch(&RequestDescriptor::get(origin)).await;
        assert!(matches!(result, Err(WorkerError::Network(_))));
    }

    #[tokio::test]
    async fn test_invalid_method_is_rejected() {
        let origin = Url::parse("http://127.0.0.1:9").unwrap();
        let fetcher = HttpFetcher::new(origin.clone()).unwrap();

        let request = RequestDescriptor::get(origin).with_method("NOT A METHOD");
        let result = fetcher.fetch(&request).await;
        assert!(matches!(result, Err(WorkerError::InvalidRequest(_))));
    }
}
