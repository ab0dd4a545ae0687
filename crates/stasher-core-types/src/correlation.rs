//! Correlation types for request tracking
//!
//! A scope store is labelled with a `RequestContext` so diagnostics emitted
//! while one request is processed can be told apart from another's.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a single request-processing lifetime
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a new random RequestId using UUIDv7
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create from an existing string (for deserialization)
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Context carried by a scope store for correlation
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: RequestId,
    /// Sequence id of the first event observed in this context
    pub first_sequence_id: Option<u64>,
}

impl RequestContext {
    /// Create a new context with a fresh RequestId
    pub fn new() -> Self {
        Self {
            request_id: RequestId::new(),
            first_sequence_id: None,
        }
    }

    /// Create a context with an existing RequestId
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            first_sequence_id: None,
        }
    }

    /// Record the sequence id of an observed event.
    ///
    /// Only the first observation sticks.
    pub fn observe(&mut self, sequence_id: u64) {
        if self.first_sequence_id.is_none() {
            self.first_sequence_id = Some(sequence_id);
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
