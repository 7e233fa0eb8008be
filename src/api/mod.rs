//! API Module
//!
//! HTTP surface of the offline cache proxy.
//!
//! # Endpoints
//! - `GET /__worker/health` - Health check with controlling version
//! - `GET /__worker/stats` - Cache statistics
//! - `POST /__worker/update` - Roll over to a new version
//! - everything else - Offered to the controlling worker, else forwarded

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
