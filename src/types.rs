use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Statistics reported by the remote index, passed through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStatistics {
    pub document_count: u64,
    pub storage_size: u64,
}

/// What caused a schema snapshot to be published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncSource {
    /// Background scheduler tick.
    Scheduled,
    /// Reconcile against a bound index's live schema during a write.
    Inline,
    /// Forced refresh after the remote side reported a missing resource.
    Recovery,
}

/// Delivered to subscribers after every successful snapshot swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaSyncedEvent {
    pub service: String,
    pub generation: u64,
    pub field_count: usize,
    pub source: SyncSource,
    pub synced_at: DateTime<Utc>,
}

/// Raw transport signal forwarded to a [`TransportObserver`](crate::TransportObserver).
#[derive(Debug, Clone)]
pub struct TransportEvent {
    pub method: http::Method,
    pub uri: String,
    pub status: Option<http::StatusCode>,
    pub elapsed: Option<Duration>,
}

impl TransportEvent {
    pub fn request(method: http::Method, uri: impl Into<String>) -> Self {
        TransportEvent {
            method,
            uri: uri.into(),
            status: None,
            elapsed: None,
        }
    }

    pub fn response(
        method: http::Method,
        uri: impl Into<String>,
        status: http::StatusCode,
        elapsed: Duration,
    ) -> Self {
        TransportEvent {
            method,
            uri: uri.into(),
            status: Some(status),
            elapsed: Some(elapsed),
        }
    }

    /// Whether the remote side answered with a server error or throttling.
    pub fn is_unhealthy(&self) -> bool {
        self.status.is_some_and(|s| {
            s.is_server_error() || s == http::StatusCode::TOO_MANY_REQUESTS
        })
    }
}
