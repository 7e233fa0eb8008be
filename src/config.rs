//! Configuration Module
//!
//! Handles loading and managing proxy and worker configuration from
//! environment variables.

use std::env;
use std::path::PathBuf;

use url::Url;

/// Paths every offline-capable deploy must carry in its core cache.
pub const DEFAULT_MANIFEST: &[&str] = &[
    "/",
    "/index.html",
    "/offline.html",
    "/manifest.json",
    "/assets/css/style.css",
    "/assets/js/script.js",
    "/components/nav.html",
    "/components/footer.html",
    "/components/support-cta.html",
    "/favicon.ico",
    "/favicon-48x48.png",
    "/icons/icon-192.png",
    "/icons/icon-512.png",
    "/about.html",
    "/class06/index.html",
    "/class07/index.html",
    "/class08/index.html",
    "/class09/index.html",
    "/class10/index.html",
    "/class11/index.html",
    "/class12/index.html",
];

const DEFAULT_ORIGIN: &str = "http://127.0.0.1:8080";

/// Path prefixes driving request classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePrefixes {
    pub static_assets: Vec<String>,
    pub components: Vec<String>,
    pub content: Vec<String>,
}

impl Default for RoutePrefixes {
    fn default() -> Self {
        Self {
            static_assets: vec!["/assets/".to_string()],
            components: vec!["/components/".to_string()],
            content: vec![
                "/notes/".to_string(),
                "/practice/".to_string(),
                "/practice-advanced/".to_string(),
            ],
        }
    }
}

/// Settings owned by a single worker version.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Origin the worker serves; anything else is cross-origin
    pub origin: Url,
    /// Deploy version, baked into both store names
    pub version: String,
    /// Store name prefix
    pub namespace: String,
    /// Path of the offline fallback document
    pub offline_url: String,
    /// Entry cap for the runtime store
    pub max_runtime_entries: usize,
    /// Ordered core asset paths
    pub manifest: Vec<String>,
    pub routes: RoutePrefixes,
}

impl WorkerConfig {
    /// Creates a worker config for `origin` with default manifest and routes.
    pub fn new(origin: Url, version: impl Into<String>) -> Self {
        Self {
            origin,
            version: version.into(),
            namespace: "offline".to_string(),
            offline_url: "/offline.html".to_string(),
            max_runtime_entries: 60,
            manifest: DEFAULT_MANIFEST.iter().map(|p| p.to_string()).collect(),
            routes: RoutePrefixes::default(),
        }
    }

    /// Name of the versioned core store.
    pub fn core_cache_name(&self) -> String {
        format!("{}-core-{}", self.namespace, self.version)
    }

    /// Name of the versioned runtime store.
    pub fn runtime_cache_name(&self) -> String {
        format!("{}-runtime-{}", self.namespace, self.version)
    }

    /// Clones this config for a new deploy version.
    pub fn with_version(&self, version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..self.clone()
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        let origin = Url::parse(DEFAULT_ORIGIN).expect("default origin is a valid URL");
        Self::new(origin, "v1")
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Where stores are persisted between runs, if anywhere
    pub snapshot_path: Option<PathBuf>,
    /// Largest request body accepted for forwarding
    pub max_body_bytes: usize,
    pub worker: WorkerConfig,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `ORIGIN_URL` - Origin being proxied (default: http://127.0.0.1:8080)
    /// - `CACHE_VERSION` - Deploy version (default: v1)
    /// - `CACHE_NAMESPACE` - Store name prefix (default: offline)
    /// - `OFFLINE_URL` - Offline fallback path (default: /offline.html)
    /// - `MAX_RUNTIME_ENTRIES` - Runtime store cap (default: 60)
    /// - `CORE_MANIFEST` - Comma separated core asset paths
    /// - `SNAPSHOT_PATH` - Store snapshot file (default: none)
    /// - `MAX_BODY_BYTES` - Request body limit (default: 10 MiB)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let origin = env::var("ORIGIN_URL")
            .ok()
            .and_then(|v| Url::parse(&v).ok())
            .unwrap_or(defaults.worker.origin.clone());

        let mut worker = WorkerConfig::new(
            origin,
            env::var("CACHE_VERSION").unwrap_or(defaults.worker.version.clone()),
        );
        if let Ok(namespace) = env::var("CACHE_NAMESPACE") {
            worker.namespace = namespace;
        }
        if let Ok(offline_url) = env::var("OFFLINE_URL") {
            worker.offline_url = offline_url;
        }
        worker.max_runtime_entries = env::var("MAX_RUNTIME_ENTRIES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.worker.max_runtime_entries);
        if let Some(manifest) = env::var("CORE_MANIFEST").ok().map(|v| parse_manifest(&v)) {
            if !manifest.is_empty() {
                worker.manifest = manifest;
            }
        }

        Self {
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            snapshot_path: env::var("SNAPSHOT_PATH").ok().map(PathBuf::from),
            max_body_bytes: env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_body_bytes),
            worker,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            snapshot_path: None,
            max_body_bytes: 10 * 1024 * 1024,
            worker: WorkerConfig::default(),
        }
    }
}

fn parse_manifest(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}
