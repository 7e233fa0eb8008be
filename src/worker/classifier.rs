//! Request Classifier
//!
//! Pure routing: decides whether a request is intercepted and, if so, which
//! strategy serves it. Nothing here is cached; every request is classified
//! afresh.

use crate::config::{RoutePrefixes, WorkerConfig};
use crate::network::same_origin;
use crate::request::{RequestDescriptor, RequestMode};

/// How an intercepted request is served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    CacheFirst,
    NetworkFirst,
}

/// What kind of resource a request is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    StaticAsset,
    ComponentPartial,
    NotesOrPractice,
    DocumentNavigation,
    Other,
}

impl RequestClass {
    /// Documents go to the network first; everything else, including
    /// unmatched requests, is served cache-first.
    pub fn strategy(self) -> Strategy {
        match self {
            RequestClass::DocumentNavigation => Strategy::NetworkFirst,
            _ => Strategy::CacheFirst,
        }
    }
}

/// Routing decision for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Not intercepted; the request goes out untouched
    PassThrough,
    Handle {
        class: RequestClass,
        strategy: Strategy,
    },
}

// == Classify ==
/// Routes a request. Rules apply in priority order:
///
/// 1. non-GET requests pass through
/// 2. cross-origin requests pass through
/// 3. static-asset paths and style/script/image/font destinations
/// 4. component partials
/// 5. notes and practice content
/// 6. navigations and document requests
/// 7. everything else
pub fn classify(request: &RequestDescriptor, config: &WorkerConfig) -> Route {
    if !request.is_get() || !same_origin(&request.url, &config.origin) {
        return Route::PassThrough;
    }

    let class = request_class(request, &config.routes);
    Route::Handle {
        class,
        strategy: class.strategy(),
    }
}

/// Classifies a same-origin GET request by path prefix and destination.
pub fn request_class(request: &RequestDescriptor, routes: &RoutePrefixes) -> RequestClass {
    let path = request.url.path();

    if has_prefix(path, &routes.static_assets) || request.destination.is_subresource_asset() {
        RequestClass::StaticAsset
    } else if has_prefix(path, &routes.components) {
        RequestClass::ComponentPartial
    } else if has_prefix(path, &routes.content) {
        RequestClass::NotesOrPractice
    } else if request.mode == RequestMode::Navigate || request.wants_document() {
        RequestClass::DocumentNavigation
    } else {
        RequestClass::Other
    }
}

fn has_prefix(path: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
}
