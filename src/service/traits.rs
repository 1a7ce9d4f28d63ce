//! Contracts of the collaborators the search service delegates to.
//!
//! Transport, schema reconciliation and index management live behind these
//! traits. Implementations must be individually thread-safe.

use crate::config::ConnectionSettings;
use crate::error::Result;
use crate::schema::FieldDefinition;
use crate::types::{IndexStatistics, TransportEvent};
use async_trait::async_trait;
use std::sync::Arc;

/// Answers whether the remote service can currently serve reads and writes.
///
/// Read on every call; the search service never caches the answer.
pub trait AvailabilityOracle: Send + Sync {
    fn can_read(&self) -> bool;
    fn can_write(&self) -> bool;
}

/// Receives raw transport signals from the document and management clients.
pub trait TransportObserver: Send + Sync {
    fn on_request(&self, event: &TransportEvent);
    fn on_response(&self, event: &TransportEvent);
}

/// Optional capability: accepts the connection settings during `connect`.
#[async_trait]
pub trait ConnectionInitializable: Send + Sync {
    async fn initialize_connection(
        &self,
        index_name: &str,
        settings: &ConnectionSettings,
    ) -> Result<()>;
}

/// Index management operations of the remote service.
#[async_trait]
pub trait IndexManagement: Send + Sync {
    async fn index_exists(&self) -> Result<bool>;
    async fn delete_index(&self) -> Result<()>;
    async fn get_index_statistics(&self) -> Result<IndexStatistics>;
    fn set_observer(&self, observer: Option<Arc<dyn TransportObserver>>);
}

/// Owns the authoritative pull and reconcile logic for the schema.
#[async_trait]
pub trait SchemaSynchronizer: Send + Sync {
    /// Make sure the remote side exists (e.g. create the index if absent).
    async fn ensure_is_initialized(&self) -> Result<()>;

    /// Pull the field list from the remote authority into local state.
    async fn refresh_local_schema(&self) -> Result<()>;

    /// Reconcile `fields` against the remote schema.
    async fn ensure_is_in_sync(&self, fields: &[FieldDefinition]) -> Result<()>;

    /// Latest local view of the remote fields.
    fn local_schema_snapshot(&self) -> Vec<FieldDefinition>;

    async fn cleanup_local_schema(&self) -> Result<()>;

    fn management(&self) -> Arc<dyn IndexManagement>;
}

/// Transport-level indexing writes and query reads.
#[async_trait]
pub trait DocumentOperations: Send + Sync {
    /// Submit a serialized batch. Fails with
    /// [`NotFound`](crate::SearchServiceError::NotFound) when the remote side
    /// lacks the target resource.
    async fn post_documents(&self, json: String) -> Result<()>;

    /// Run a raw query expression and return the raw response body.
    async fn search(&self, expression: &str) -> Result<String>;

    fn set_observer(&self, observer: Option<Arc<dyn TransportObserver>>);
}

/// Caller-supplied batch of documents; opaque to the search service.
pub trait CloudBatch: Send + Sync {
    fn to_json(&self) -> Result<String>;
}

/// Any index a search service could be bound to.
pub trait SearchIndex: Send + Sync {
    fn name(&self) -> &str;

    /// Short description of the concrete index kind, used in error messages.
    fn index_kind(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// The cloud capability, if this index is backed by the remote service.
    fn as_cloud_index(self: Arc<Self>) -> Option<Arc<dyn CloudSearchIndex>> {
        None
    }
}

/// An index backed by the remote search service.
pub trait CloudSearchIndex: SearchIndex {
    /// Name of the index on the remote service.
    fn cloud_index_name(&self) -> &str;

    /// Live schema the index wants, if it currently exposes one.
    fn schema_fields(&self) -> Option<Vec<FieldDefinition>>;
}
