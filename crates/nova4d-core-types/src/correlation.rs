//! Correlation types for request tracking
//!
//! Every admission call carries a [`RequestContext`] so that its log lines
//! and the `requested_by` stamp on the queued command name the same caller.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Caller identity recorded when no explicit `requested_by` is supplied.
pub const DEFAULT_REQUESTED_BY: &str = "api";

/// Time-ordered id (UUIDv7) for a single admission request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(String);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Context carried through the admission boundary
///
/// `requested_by` mirrors the caller-identity header of the transport layer;
/// when absent, [`RequestContext::requested_by`] falls back to `"api"`.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: RequestId,
    requested_by: Option<String>,
}

impl RequestContext {
    /// Create a new anonymous context with a fresh RequestId
    pub fn new() -> Self {
        Self {
            request_id: RequestId::new(),
            requested_by: None,
        }
    }

    /// Record the caller identity; blank values are ignored
    pub fn with_requested_by(mut self, requested_by: impl Into<String>) -> Self {
        let value = requested_by.into();
        let trimmed = value.trim();
        self.requested_by = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self
    }

    /// Caller identity, defaulting to `"api"`
    pub fn requested_by(&self) -> &str {
        self.requested_by.as_deref().unwrap_or(DEFAULT_REQUESTED_BY)
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
