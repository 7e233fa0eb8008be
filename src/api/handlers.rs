//! API Handlers
//!
//! The proxy handler that offers every page request to the controlling
//! worker, plus the admin endpoints.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{self, HeaderMap, StatusCode},
    response::Response,
    Json,
};
use tracing::debug;

use crate::cache::{CacheStorage, StoredResponse};
use crate::config::{Config, WorkerConfig};
use crate::error::{Result, WorkerError};
use crate::models::{HealthResponse, StatsResponse, UpdateRequest, UpdateResponse};
use crate::network::{is_hop_by_hop, Fetcher, HttpFetcher};
use crate::request::{Destination, RequestDescriptor, RequestMode};
use crate::worker::{FetchOutcome, OfflineWorker, Registration};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub registration: Arc<Registration>,
    /// Cache service shared by every worker version
    pub storage: CacheStorage,
    /// Network used by workers and for pass-through requests
    pub fetcher: Arc<dyn Fetcher>,
    /// Template for new worker versions
    pub worker_config: WorkerConfig,
    pub max_body_bytes: usize,
}

impl AppState {
    /// Creates a new AppState with no controlling worker.
    pub fn new(storage: CacheStorage, fetcher: Arc<dyn Fetcher>, worker_config: WorkerConfig) -> Self {
        Self {
            registration: Arc::new(Registration::new()),
            storage,
            fetcher,
            worker_config,
            max_body_bytes: Config::default().max_body_bytes,
        }
    }

    /// Creates a new AppState from configuration, fetching over HTTP.
    pub fn from_config(config: &Config, storage: CacheStorage) -> Result<Self> {
        let fetcher = HttpFetcher::new(config.worker.origin.clone())?;
        let mut state = Self::new(storage, Arc::new(fetcher), config.worker.clone());
        state.max_body_bytes = config.max_body_bytes;
        Ok(state)
    }

    /// Builds an unregistered worker for `version`.
    pub fn build_worker(&self, version: &str) -> Arc<OfflineWorker> {
        Arc::new(OfflineWorker::new(
            self.worker_config.with_version(version),
            self.storage.clone(),
            self.fetcher.clone(),
        ))
    }

    /// Builds a worker for `version` and makes it the controller.
    pub async fn register_version(&self, version: &str) -> Result<Vec<String>> {
        self.registration.register(self.build_worker(version)).await
    }

    /// Like `register_version`, but reuses a complete core store for
    /// `version` already present in storage instead of fetching it again.
    pub async fn resume_version(&self, version: &str) -> Result<Vec<String>> {
        self.registration.resume(self.build_worker(version)).await
    }
}

/// Fallback handler: every non-admin request.
///
/// The controlling worker answers or declines; declined requests, and all
/// requests while no worker is in control, go straight to the origin.
pub async fn proxy_handler(State(state): State<AppState>, request: Request) -> Result<Response> {
    let descriptor = describe_request(&state, request).await?;

    let outcome = match state.registration.controller().await {
        Some(worker) => worker.handle_fetch(descriptor).await,
        None => FetchOutcome::PassThrough(descriptor),
    };

    let response = match outcome {
        FetchOutcome::Respond(result) => result?,
        FetchOutcome::PassThrough(descriptor) => {
            debug!(method = %descriptor.method, url = %descriptor.url, "passing through");
            state.fetcher.fetch(&descriptor).await?
        }
    };

    into_http_response(response)
}

/// Handler for GET /__worker/health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let (version, worker_state) = match state.registration.controller().await {
        Some(worker) => (Some(worker.version().to_string()), Some(worker.state().await)),
        None => (None, None),
    };
    Json(HealthResponse::healthy(version, worker_state))
}

/// Handler for GET /__worker/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let controller = state.registration.controller().await;
    let (version, core_entries, runtime_entries) = match &controller {
        Some(worker) => (
            Some(worker.version().to_string()),
            state.storage.store_len(worker.core_cache_name()).await,
            state.storage.store_len(worker.runtime_cache_name()).await,
        ),
        None => (None, 0, 0),
    };

    Json(StatsResponse::new(
        version,
        state.storage.names().await,
        core_entries,
        runtime_entries,
        &state.storage.stats().await,
    ))
}

/// Handler for POST /__worker/update
///
/// Installs and activates a new version. If the install fails the current
/// version keeps serving.
pub async fn update_handler(
    State(state): State<AppState>,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<UpdateResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(WorkerError::InvalidRequest(error_msg));
    }

    let deleted = state.register_version(&req.version).await?;
    Ok(Json(UpdateResponse::new(req.version, deleted)))
}

// == Conversions ==
/// Turns an incoming request into a descriptor against the configured origin.
///
/// Only the path and query are taken from the request URI, so the result is
/// always same-origin. Mode and destination come from the `Sec-Fetch-*`
/// headers; a GET without them that accepts HTML is treated as a navigation.
async fn describe_request(state: &AppState, request: Request) -> Result<RequestDescriptor> {
    let (parts, body) = request.into_parts();

    let mut url = state.worker_config.origin.clone();
    url.set_path(parts.uri.path());
    url.set_query(parts.uri.query());

    let method = parts.method.as_str().to_ascii_uppercase();
    let (mode, destination) = fetch_metadata(&parts.headers, &method);

    let headers = parts
        .headers
        .iter()
        .filter(|(name, _)| !is_hop_by_hop(name.as_str()))
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();

    let body = axum::body::to_bytes(body, state.max_body_bytes)
        .await
        .map_err(|e| WorkerError::InvalidRequest(format!("unreadable request body: {e}")))?;

    Ok(RequestDescriptor {
        method,
        url,
        mode,
        destination,
        headers,
        body,
    })
}

fn fetch_metadata(headers: &HeaderMap, method: &str) -> (RequestMode, Destination) {
    let mode = header_str(headers, "sec-fetch-mode").and_then(RequestMode::from_header);
    let destination = header_str(headers, "sec-fetch-dest").map(Destination::from_header);

    match (mode, destination) {
        (None, None) if method == "GET" && accepts_html(headers) => {
            (RequestMode::Navigate, Destination::Document)
        }
        (mode, destination) => (
            mode.unwrap_or(RequestMode::NoCors),
            destination.unwrap_or(Destination::Empty),
        ),
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn accepts_html(headers: &HeaderMap) -> bool {
    headers
        .get_all("accept")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.contains("text/html"))
}

fn into_http_response(response: StoredResponse) -> Result<Response> {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::BAD_GATEWAY);

    let mut builder = http::Response::builder().status(status);
    for (name, value) in &response.headers {
        if !is_hop_by_hop(name) {
            builder = builder.header(name, value);
        }
    }

    builder
        .body(Body::from(response.body))
        .map_err(|e| WorkerError::Internal(format!("invalid stored response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::StaticOrigin;
    use url::Url;

    fn origin() -> Url {
        Url::parse("http://site").unwrap()
    }

    async fn state_with_site() -> (AppState, Arc<StaticOrigin>) {
        let site = Arc::new(StaticOrigin::new(origin()));
        for path in crate::config::DEFAULT_MANIFEST {
            site.serve(path, "text/html", format!("core {path}")).await;
        }
        let state = AppState::new(
            CacheStorage::new(),
            site.clone(),
            WorkerConfig::new(origin(), "v1"),
        );
        (state, site)
    }

    #[test]
    fn test_fetch_metadata_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("sec-fetch-mode", "no-cors".parse().unwrap());
        headers.insert("sec-fetch-dest", "image".parse().unwrap());

        assert_eq!(
            fetch_metadata(&headers, "GET"),
            (RequestMode::NoCors, Destination::Image)
        );
    }

    #[test]
    fn test_fetch_metadata_infers_navigation_from_accept() {
        let mut headers = HeaderMap::new();
        headers.insert("accept", "text/html,application/xhtml+xml".parse().unwrap());

        assert_eq!(
            fetch_metadata(&headers, "GET"),
            (RequestMode::Navigate, Destination::Document)
        );
        assert_eq!(
            fetch_metadata(&headers, "POST"),
            (RequestMode::NoCors, Destination::Empty)
        );
    }

    #[tokio::test]
    async fn test_describe_request_stays_on_origin() {
        let (state, _) = state_with_site().await;
        let request = Request::builder()
            .uri("//evil.example/steal?x=1")
            .body(Body::empty())
            .unwrap();

        let descriptor = describe_request(&state, request).await.unwrap();
        assert_eq!(descriptor.url.host_str(), Some("site"));
        assert_eq!(descriptor.url.query(), Some("x=1"));
    }

    #[tokio::test]
    async fn test_health_without_controller() {
        let (state, _) = state_with_site().await;

        let response = health_handler(State(state)).await;
        assert_eq!(response.status, "healthy");
        assert!(response.version.is_none());
    }

    #[tokio::test]
    async fn test_update_handler_registers_version() {
        let (state, _) = state_with_site().await;

        let req = UpdateRequest {
            version: "v1".to_string(),
        };
        let response = update_handler(State(state.clone()), Json(req)).await.unwrap();

        assert_eq!(response.version, "v1");
        let stats = stats_handler(State(state)).await;
        assert_eq!(stats.version.as_deref(), Some("v1"));
        assert_eq!(stats.core_entries, crate::config::DEFAULT_MANIFEST.len());
    }

    #[tokio::test]
    async fn test_update_handler_rejects_invalid_version() {
        let (state, _) = state_with_site().await;

        let req = UpdateRequest {
            version: "".to_string(),
        };
        let result = update_handler(State(state), Json(req)).await;
        assert!(matches!(result, Err(WorkerError::InvalidRequest(_))));
    }

    #[test]
    fn test_opaque_status_maps_to_bad_gateway() {
        let response = into_http_response(StoredResponse::new("http://cdn/x", 0, "")).unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
