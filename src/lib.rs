//! # searchlink
//!
//! A resilient client-side orchestrator for remote, schema-bearing search
//! index services.
//!
//! [`SearchService`] sits in front of the remote service and
//!
//! - keeps a local [`SchemaSnapshot`] fresh on a background cadence,
//! - publishes new snapshots atomically so concurrent readers never observe a
//!   half-updated schema,
//! - refuses reads and writes the [`AvailabilityOracle`] says cannot be served,
//! - retries a write exactly once, after a forced schema refresh, when the
//!   remote side reports the target resource as missing.
//!
//! Transport, schema reconciliation and index management are supplied by the
//! caller through the traits in [`service::traits`].
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use searchlink::{DocumentBatch, SearchService, SearchServiceConfig};
//! use serde_json::json;
//!
//! let service = SearchService::builder(SearchServiceConfig::new("00:00:10")?)
//!     .observing_availability(availability)
//!     .documents_with_connection(http_client)
//!     .synchronizer(schema_synchronizer)
//!     .build()?;
//!
//! service
//!     .connect("products", "serviceUrl=https://acme.search.windows.net;apiKey=...")
//!     .await?;
//! service.bind(products_index)?;
//!
//! let mut batch = DocumentBatch::new();
//! batch.upload(json!({"id": "1", "title": "MacBook Pro"}))?;
//! service.post_documents(&batch).await?;
//!
//! let raw = service.search("search=macbook&$top=10").await?;
//! ```
//!
//! ## Configuration
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `SEARCHLINK_SCHEMA_UPDATE_INTERVAL` | `00:01:00` | cadence of background schema syncs |
//! | `SEARCHLINK_INITIAL_SYNC_DELAY_MS` | `2000` | grace period before the first sync |

pub mod config;
pub mod error;
pub mod schema;
pub mod service;
pub mod types;

pub use config::{parse_interval, ConnectionSettings, SearchServiceConfig};
pub use error::{Operation, Result, SearchServiceError};
pub use schema::{FieldDefinition, FieldOptions, FieldType, SchemaSnapshot};
pub use service::batch::{BatchAction, DocumentBatch};
pub use service::builder::SearchServiceBuilder;
pub use service::status::SyncStatus;
pub use service::subscribers::SubscriptionId;
pub use service::traits::{
    AvailabilityOracle, CloudBatch, CloudSearchIndex, ConnectionInitializable,
    DocumentOperations, IndexManagement, SchemaSynchronizer, SearchIndex, TransportObserver,
};
pub use service::SearchService;
pub use types::{IndexStatistics, SchemaSyncedEvent, SyncSource, TransportEvent};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install a global `tracing` subscriber honouring `RUST_LOG`, falling back
/// to `default_filter`. Does nothing if a subscriber is already set.
pub fn init_tracing(default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
