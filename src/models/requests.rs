//! Request DTOs for the worker admin API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

/// Longest accepted version string
pub const MAX_VERSION_LENGTH: usize = 64;

/// Request body for a version rollover (POST /__worker/update)
///
/// # Fields
/// - `version`: The deploy version to install and activate
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRequest {
    pub version: String,
}

impl UpdateRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    /// Versions end up in store names, so only `[A-Za-z0-9._-]` is allowed.
    pub fn validate(&self) -> Option<String> {
        if self.version.is_empty() {
            return Some("Version cannot be empty".to_string());
        }
        if self.version.len() > MAX_VERSION_LENGTH {
            return Some(format!(
                "Version exceeds maximum length of {} characters",
                MAX_VERSION_LENGTH
            ));
        }
        if !self
            .version
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        {
            return Some("Version may only contain letters, digits, '.', '-' and '_'".to_string());
        }
        None
    }
}
