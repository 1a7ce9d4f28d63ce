//! The search service orchestrator.
//!
//! [`SearchService`] fronts a remote search index: it keeps a local schema
//! snapshot fresh on a background cadence, gates reads and writes through the
//! availability oracle, and recovers once from a not-found write by forcing a
//! schema refresh.

pub mod batch;
pub mod builder;
pub mod scheduler;
pub mod status;
pub mod subscribers;
pub mod traits;

use crate::config::{ConnectionSettings, SearchServiceConfig};
use crate::error::{Operation, Result, SearchServiceError};
use crate::schema::{SchemaCell, SchemaSnapshot};
use crate::types::{IndexStatistics, SchemaSyncedEvent, SyncSource};
use arc_swap::ArcSwapOption;
use builder::SearchServiceBuilder;
use scheduler::PeriodicScheduler;
use status::{SyncStatus, SyncStatusTracker};
use std::any::Any;
use std::ops::ControlFlow;
use std::sync::{Arc, OnceLock};
use subscribers::{SchemaSyncedHandler, SubscriberList, SubscriptionId};
use traits::{
    AvailabilityOracle, CloudBatch, CloudSearchIndex, ConnectionInitializable,
    DocumentOperations, SchemaSynchronizer, SearchIndex, TransportObserver,
};

const UNCONNECTED: &str = "<unconnected>";

struct BoundIndex {
    index: Arc<dyn CloudSearchIndex>,
}

/// Resilient client-side orchestrator in front of a remote search service.
///
/// Lifecycle: build with [`SearchService::builder`], then
/// [`connect`](Self::connect) to start background schema sync,
/// [`bind`](Self::bind) to attach the target index, and finally
/// [`dispose`](Self::dispose) (or drop the last handle) to stop syncing.
///
/// All operations take `&self` and are safe to call concurrently.
///
/// # Examples
///
/// ```rust,ignore
/// let service = SearchService::builder(SearchServiceConfig::new("00:00:10")?)
///     .availability(oracle)
///     .documents(client)
///     .synchronizer(synchronizer)
///     .build()?;
/// service.connect("products", "serviceUrl=https://acme.search.windows.net;apiKey=...").await?;
/// service.bind(index)?;
/// service.post_documents(&batch).await?;
/// ```
pub struct SearchService {
    config: SearchServiceConfig,
    availability: Arc<dyn AvailabilityOracle>,
    transport_observer: Option<Arc<dyn TransportObserver>>,
    documents: Arc<dyn DocumentOperations>,
    synchronizer: Arc<dyn SchemaSynchronizer>,
    connection_initializers: Vec<Arc<dyn ConnectionInitializable>>,
    name: OnceLock<String>,
    schema: SchemaCell,
    bound_index: ArcSwapOption<BoundIndex>,
    scheduler: ArcSwapOption<PeriodicScheduler>,
    subscribers: SubscriberList,
    status: SyncStatusTracker,
}

impl SearchService {
    pub fn builder(config: SearchServiceConfig) -> SearchServiceBuilder {
        SearchServiceBuilder::new(config)
    }

    pub(crate) fn from_parts(
        config: SearchServiceConfig,
        availability: Arc<dyn AvailabilityOracle>,
        transport_observer: Option<Arc<dyn TransportObserver>>,
        documents: Arc<dyn DocumentOperations>,
        synchronizer: Arc<dyn SchemaSynchronizer>,
        connection_initializers: Vec<Arc<dyn ConnectionInitializable>>,
    ) -> Self {
        SearchService {
            config,
            availability,
            transport_observer,
            documents,
            synchronizer,
            connection_initializers,
            name: OnceLock::new(),
            schema: SchemaCell::new(),
            bound_index: ArcSwapOption::empty(),
            scheduler: ArcSwapOption::empty(),
            subscribers: SubscriberList::new(),
            status: SyncStatusTracker::new(),
        }
    }

    /// Resolve the service identity, initialize the remote side, take the
    /// initial schema snapshot and start background schema sync.
    ///
    /// Collaborator failures propagate unchanged. A service connects once.
    pub async fn connect(self: &Arc<Self>, index_name: &str, connection_string: &str) -> Result<()> {
        let settings = ConnectionSettings::parse(connection_string)?;
        if self.name.get().is_some() {
            return Err(SearchServiceError::Config(format!(
                "Search service {} is already connected",
                self.log_name()
            )));
        }

        for initializer in &self.connection_initializers {
            initializer
                .initialize_connection(index_name, &settings)
                .await?;
        }

        self.name
            .set(settings.service_name().to_string())
            .map_err(|_| {
                SearchServiceError::Config("Search service connected concurrently".into())
            })?;

        self.synchronizer.ensure_is_initialized().await?;

        let initial = self
            .schema
            .publish(self.synchronizer.local_schema_snapshot());

        tracing::info!(
            "[SCHEMA {}] connected index {} with {} fields",
            self.log_name(),
            index_name,
            initial.len()
        );

        self.start_scheduler();
        Ok(())
    }

    fn start_scheduler(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        let scheduler = PeriodicScheduler::start(
            format!("schema:{}", self.log_name()),
            self.config.initial_sync_delay,
            self.config.schema_update_interval,
            move || {
                let weak = weak.clone();
                async move {
                    match weak.upgrade() {
                        Some(service) => {
                            // Own task so a panicking collaborator cannot end the loop
                            let worker = Arc::clone(&service);
                            let outcome =
                                tokio::spawn(async move { worker.sync_schema().await }).await;
                            if let Err(e) = outcome {
                                if e.is_panic() {
                                    service.record_sync_panic(e.into_panic());
                                }
                            }
                            ControlFlow::Continue(())
                        }
                        None => ControlFlow::Break(()),
                    }
                }
            },
        );

        if let Some(previous) = self.scheduler.swap(Some(Arc::new(scheduler))) {
            previous.stop();
        }
    }

    /// Attach the service to its target index and wire the transport
    /// observer into the document and management clients.
    ///
    /// Fails with [`SearchServiceError::UnsupportedTarget`] before wiring
    /// anything if `index` is not backed by the remote service.
    pub fn bind(&self, index: Arc<dyn SearchIndex>) -> Result<()> {
        let actual = format!("{} ({})", index.name(), index.index_kind());
        let cloud = index
            .as_cloud_index()
            .ok_or(SearchServiceError::UnsupportedTarget {
                expected: "CloudSearchIndex",
                actual,
            })?;

        self.documents.set_observer(self.transport_observer.clone());
        self.synchronizer
            .management()
            .set_observer(self.transport_observer.clone());

        tracing::info!(
            "[SCHEMA {}] bound to index {} (transport observer: {})",
            self.log_name(),
            cloud.cloud_index_name(),
            self.transport_observer.is_some()
        );
        self.bound_index.store(Some(Arc::new(BoundIndex { index: cloud })));
        Ok(())
    }

    /// Refresh the schema from the remote authority and publish it.
    ///
    /// Driven by the scheduler. Failures are logged and recorded in
    /// [`sync_status`](Self::sync_status), never returned.
    pub async fn sync_schema(&self) {
        match self.synchronizer.refresh_local_schema().await {
            Ok(()) => {
                let snapshot = self.publish_local_schema(SyncSource::Scheduled);
                self.status.record_success();
                tracing::debug!(
                    "[SCHEMA {}] synced {} fields (generation {})",
                    self.log_name(),
                    snapshot.len(),
                    snapshot.generation()
                );
            }
            Err(e) => {
                self.status.record_failure(&e.to_string());
                tracing::warn!(
                    "[SCHEMA {}] schema synchronization failed: {}",
                    self.log_name(),
                    e
                );
            }
        }
    }

    fn record_sync_panic(&self, panic_info: Box<dyn Any + Send>) {
        let msg = if let Some(s) = panic_info.downcast_ref::<String>() {
            s.clone()
        } else if let Some(s) = panic_info.downcast_ref::<&str>() {
            s.to_string()
        } else {
            "unknown panic".to_string()
        };
        self.status
            .record_failure(&format!("schema synchronization panicked: {}", msg));
        tracing::error!(
            "[SCHEMA {}] schema synchronization panicked: {}",
            self.log_name(),
            msg
        );
    }

    fn publish_local_schema(&self, source: SyncSource) -> Arc<SchemaSnapshot> {
        let snapshot = self
            .schema
            .publish(self.synchronizer.local_schema_snapshot());
        let event = SchemaSyncedEvent {
            service: self.log_name().to_string(),
            generation: snapshot.generation(),
            field_count: snapshot.len(),
            source,
            synced_at: snapshot.synced_at(),
        };
        self.subscribers.dispatch(&event);
        snapshot
    }

    /// Index `batch` on the remote service.
    ///
    /// A not-found failure triggers one forced schema refresh and a single
    /// retry; a second not-found propagates.
    pub async fn post_documents<B: CloudBatch + ?Sized>(&self, batch: &B) -> Result<()> {
        match self.try_post_documents(batch).await {
            Err(e) if e.is_not_found() => {
                tracing::info!(
                    "[SCHEMA {}] write hit missing resource ({}), refreshing schema and retrying once",
                    self.log_name(),
                    e
                );
                self.synchronizer.refresh_local_schema().await?;
                self.publish_local_schema(SyncSource::Recovery);
                self.try_post_documents(batch).await
            }
            other => other,
        }
    }

    async fn try_post_documents<B: CloudBatch + ?Sized>(&self, batch: &B) -> Result<()> {
        let bound = self.bound_index.load_full();

        if let Some(fields) = bound.as_ref().and_then(|b| b.index.schema_fields()) {
            self.synchronizer.ensure_is_in_sync(&fields).await?;
            self.publish_local_schema(SyncSource::Inline);
        }

        if !self.availability.can_write() {
            let message = format!(
                "The service {} is not available for write operations",
                self.log_name()
            );
            return Err(SearchServiceError::unavailable(
                self.target_name(bound.as_deref()),
                Operation::Write,
                message,
            ));
        }

        let json = batch.to_json()?;
        self.documents.post_documents(json).await
    }

    /// Run a raw query expression and return the raw result.
    pub async fn search(&self, expression: &str) -> Result<String> {
        if !self.availability.can_read() {
            let bound = self.bound_index.load_full();
            let message = format!(
                "The service {} is not available for read operations",
                self.log_name()
            );
            return Err(SearchServiceError::unavailable(
                self.target_name(bound.as_deref()),
                Operation::Read,
                message,
            ));
        }

        self.documents.search(expression).await
    }

    pub async fn get_statistics(&self) -> Result<IndexStatistics> {
        self.synchronizer.management().get_index_statistics().await
    }

    /// Delete the remote index if it exists, drop local schema state, and
    /// tear the service down.
    pub async fn cleanup(&self) -> Result<()> {
        let management = self.synchronizer.management();
        if management.index_exists().await? {
            management.delete_index().await?;
            tracing::info!("[SCHEMA {}] deleted remote index", self.log_name());
        }

        self.synchronizer.cleanup_local_schema().await?;
        self.dispose();
        Ok(())
    }

    /// Stop background sync and detach all subscribers. Idempotent.
    ///
    /// A sync already in flight finishes and still swaps the snapshot.
    pub fn dispose(&self) {
        let stopped = self
            .scheduler
            .swap(None)
            .map(|scheduler| scheduler.stop())
            .unwrap_or(false);
        let detached = self.subscribers.clear();

        if stopped || detached > 0 {
            tracing::info!(
                "[SCHEMA {}] disposed: scheduler stopped={}, {} subscribers detached",
                self.log_name(),
                stopped,
                detached
            );
        }
    }

    /// Register a handler called after every schema snapshot swap.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&SchemaSyncedEvent) + Send + Sync + 'static,
    {
        let handler: SchemaSyncedHandler = Arc::new(handler);
        self.subscribers.subscribe(handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Resolved service name; `None` until connected.
    pub fn name(&self) -> Option<&str> {
        self.name.get().map(String::as_str)
    }

    /// Current schema snapshot.
    pub fn schema(&self) -> Arc<SchemaSnapshot> {
        self.schema.load()
    }

    pub fn availability(&self) -> &Arc<dyn AvailabilityOracle> {
        &self.availability
    }

    pub fn sync_status(&self) -> SyncStatus {
        self.status.get()
    }

    pub fn config(&self) -> &SearchServiceConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.name.get().is_some()
    }

    /// Whether the background sync scheduler is active.
    pub fn is_syncing(&self) -> bool {
        self.scheduler
            .load_full()
            .is_some_and(|s| s.is_running())
    }

    /// Remote name of the bound index, if any.
    pub fn bound_index_name(&self) -> Option<String> {
        self.bound_index
            .load_full()
            .map(|b| b.index.cloud_index_name().to_string())
    }

    fn log_name(&self) -> &str {
        self.name().unwrap_or(UNCONNECTED)
    }

    fn target_name(&self, bound: Option<&BoundIndex>) -> String {
        match bound {
            Some(b) => b.index.cloud_index_name().to_string(),
            None => self.log_name().to_string(),
        }
    }
}

impl Drop for SearchService {
    fn drop(&mut self) {
        self.dispose();
    }
}
