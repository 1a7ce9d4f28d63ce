#![allow(dead_code)]

use async_trait::async_trait;
use searchlink::{
    AvailabilityOracle, CloudSearchIndex, ConnectionInitializable, ConnectionSettings,
    DocumentOperations, FieldDefinition, FieldOptions, FieldType, IndexManagement,
    IndexStatistics, SchemaSynchronizer, SearchIndex, SearchService, SearchServiceConfig,
    SearchServiceError, TransportEvent, TransportObserver,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub const CONNECTION: &str =
    "serviceUrl=https://acme-search.search.windows.net;apiVersion=2017-11-11;apiKey=test-key";

pub fn fields(n: usize) -> Vec<FieldDefinition> {
    (0..n)
        .map(|i| {
            let options = if i == 0 {
                FieldOptions::key()
            } else {
                FieldOptions::searchable()
            };
            FieldDefinition::new(format!("field_{}", i), FieldType::String, options)
        })
        .collect()
}

// ============================================================
// AVAILABILITY
// ============================================================

pub struct MockAvailability {
    pub read: AtomicBool,
    pub write: AtomicBool,
    pub responses_seen: AtomicUsize,
}

impl MockAvailability {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            read: AtomicBool::new(true),
            write: AtomicBool::new(true),
            responses_seen: AtomicUsize::new(0),
        })
    }
}

impl AvailabilityOracle for MockAvailability {
    fn can_read(&self) -> bool {
        self.read.load(Ordering::SeqCst)
    }

    fn can_write(&self) -> bool {
        self.write.load(Ordering::SeqCst)
    }
}

impl TransportObserver for MockAvailability {
    fn on_request(&self, _event: &TransportEvent) {}

    fn on_response(&self, event: &TransportEvent) {
        self.responses_seen.fetch_add(1, Ordering::SeqCst);
        if event.is_unhealthy() {
            self.write.store(false, Ordering::SeqCst);
        }
    }
}

// ============================================================
// DOCUMENT OPERATIONS
// ============================================================

pub struct MockDocuments {
    pub posted: Mutex<Vec<String>>,
    pub searches: Mutex<Vec<String>>,
    pub post_calls: AtomicUsize,
    pub search_calls: AtomicUsize,
    pub not_found_remaining: AtomicUsize,
    pub fail_with: Mutex<Option<SearchServiceError>>,
    pub search_result: String,
    pub observer: Mutex<Option<Arc<dyn TransportObserver>>>,
    pub observer_sets: AtomicUsize,
    pub connections: Mutex<Vec<(String, String)>>,
}

impl MockDocuments {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            posted: Mutex::new(Vec::new()),
            searches: Mutex::new(Vec::new()),
            post_calls: AtomicUsize::new(0),
            search_calls: AtomicUsize::new(0),
            not_found_remaining: AtomicUsize::new(0),
            fail_with: Mutex::new(None),
            search_result: r#"{"value":[{"id":"1"}]}"#.to_string(),
            observer: Mutex::new(None),
            observer_sets: AtomicUsize::new(0),
            connections: Mutex::new(Vec::new()),
        })
    }

    /// Simulate a response passing through the transport layer.
    pub fn emit_response(&self, status: http::StatusCode) {
        let observer = self.observer.lock().unwrap().clone();
        if let Some(observer) = observer {
            observer.on_response(&TransportEvent::response(
                http::Method::POST,
                "/indexes/products/docs/index",
                status,
                std::time::Duration::from_millis(5),
            ));
        }
    }
}

#[async_trait]
impl DocumentOperations for MockDocuments {
    async fn post_documents(&self, json: String) -> searchlink::Result<()> {
        self.post_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.fail_with.lock().unwrap().clone() {
            return Err(err);
        }
        let remaining = self.not_found_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.not_found_remaining
                .store(remaining - 1, Ordering::SeqCst);
            return Err(SearchServiceError::not_found(
                "products-cloud",
                "index 'products-cloud' was not found",
            ));
        }
        self.posted.lock().unwrap().push(json);
        Ok(())
    }

    async fn search(&self, expression: &str) -> searchlink::Result<String> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.searches.lock().unwrap().push(expression.to_string());
        Ok(self.search_result.clone())
    }

    fn set_observer(&self, observer: Option<Arc<dyn TransportObserver>>) {
        self.observer_sets.fetch_add(1, Ordering::SeqCst);
        *self.observer.lock().unwrap() = observer;
    }
}

#[async_trait]
impl ConnectionInitializable for MockDocuments {
    async fn initialize_connection(
        &self,
        index_name: &str,
        settings: &ConnectionSettings,
    ) -> searchlink::Result<()> {
        self.connections
            .lock()
            .unwrap()
            .push((index_name.to_string(), settings.service_url().to_string()));
        Ok(())
    }
}

// ============================================================
// MANAGEMENT + SYNCHRONIZER
// ============================================================

pub struct MockManagement {
    pub exists: AtomicBool,
    pub exists_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    pub stats: IndexStatistics,
    pub observer: Mutex<Option<Arc<dyn TransportObserver>>>,
    pub observer_sets: AtomicUsize,
}

impl MockManagement {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            exists: AtomicBool::new(true),
            exists_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
            stats: IndexStatistics {
                document_count: 42,
                storage_size: 8192,
            },
            observer: Mutex::new(None),
            observer_sets: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl IndexManagement for MockManagement {
    async fn index_exists(&self) -> searchlink::Result<bool> {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.exists.load(Ordering::SeqCst))
    }

    async fn delete_index(&self) -> searchlink::Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.exists.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn get_index_statistics(&self) -> searchlink::Result<IndexStatistics> {
        Ok(self.stats.clone())
    }

    fn set_observer(&self, observer: Option<Arc<dyn TransportObserver>>) {
        self.observer_sets.fetch_add(1, Ordering::SeqCst);
        *self.observer.lock().unwrap() = observer;
    }
}

pub struct MockSynchronizer {
    /// Fields the remote authority currently reports.
    pub remote: Mutex<Vec<FieldDefinition>>,
    local: Mutex<Vec<FieldDefinition>>,
    pub management: Arc<MockManagement>,
    pub refresh_calls: AtomicUsize,
    pub in_sync_calls: AtomicUsize,
    pub init_calls: AtomicUsize,
    pub cleanup_calls: AtomicUsize,
    pub fail_refresh: AtomicBool,
    /// When set, the next `refresh_local_schema` panics.
    pub panic_refresh: AtomicBool,
    /// When set, `refresh_local_schema` blocks until `gate` is notified.
    pub gated: AtomicBool,
    pub gate: Notify,
}

impl MockSynchronizer {
    pub fn new(initial_fields: usize) -> Arc<Self> {
        Arc::new(Self {
            remote: Mutex::new(fields(initial_fields)),
            local: Mutex::new(Vec::new()),
            management: MockManagement::new(),
            refresh_calls: AtomicUsize::new(0),
            in_sync_calls: AtomicUsize::new(0),
            init_calls: AtomicUsize::new(0),
            cleanup_calls: AtomicUsize::new(0),
            fail_refresh: AtomicBool::new(false),
            panic_refresh: AtomicBool::new(false),
            gated: AtomicBool::new(false),
            gate: Notify::new(),
        })
    }

    pub fn set_remote(&self, n: usize) {
        *self.remote.lock().unwrap() = fields(n);
    }

    pub fn local_len(&self) -> usize {
        self.local.lock().unwrap().len()
    }
}

#[async_trait]
impl SchemaSynchronizer for MockSynchronizer {
    async fn ensure_is_initialized(&self) -> searchlink::Result<()> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        let remote = self.remote.lock().unwrap().clone();
        *self.local.lock().unwrap() = remote;
        Ok(())
    }

    async fn refresh_local_schema(&self) -> searchlink::Result<()> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        if self.gated.load(Ordering::SeqCst) {
            self.gate.notified().await;
        }
        if self.panic_refresh.swap(false, Ordering::SeqCst) {
            panic!("schema store corrupted");
        }
        if self.fail_refresh.load(Ordering::SeqCst) {
            return Err(SearchServiceError::Transport(
                "connection reset by peer".to_string(),
            ));
        }
        let remote = self.remote.lock().unwrap().clone();
        *self.local.lock().unwrap() = remote;
        Ok(())
    }

    async fn ensure_is_in_sync(&self, fields: &[FieldDefinition]) -> searchlink::Result<()> {
        self.in_sync_calls.fetch_add(1, Ordering::SeqCst);
        *self.remote.lock().unwrap() = fields.to_vec();
        *self.local.lock().unwrap() = fields.to_vec();
        Ok(())
    }

    fn local_schema_snapshot(&self) -> Vec<FieldDefinition> {
        self.local.lock().unwrap().clone()
    }

    async fn cleanup_local_schema(&self) -> searchlink::Result<()> {
        self.cleanup_calls.fetch_add(1, Ordering::SeqCst);
        self.local.lock().unwrap().clear();
        Ok(())
    }

    fn management(&self) -> Arc<dyn IndexManagement> {
        self.management.clone()
    }
}

// ============================================================
// INDEXES
// ============================================================

pub struct CloudIndex {
    pub name: String,
    pub schema: Option<Vec<FieldDefinition>>,
}

impl CloudIndex {
    pub fn new(schema: Option<Vec<FieldDefinition>>) -> Arc<Self> {
        Arc::new(Self {
            name: "products-cloud".to_string(),
            schema,
        })
    }
}

impl SearchIndex for CloudIndex {
    fn name(&self) -> &str {
        &self.name
    }

    fn as_cloud_index(self: Arc<Self>) -> Option<Arc<dyn CloudSearchIndex>> {
        Some(self)
    }
}

impl CloudSearchIndex for CloudIndex {
    fn cloud_index_name(&self) -> &str {
        &self.name
    }

    fn schema_fields(&self) -> Option<Vec<FieldDefinition>> {
        self.schema.clone()
    }
}

/// An index that is not backed by the remote service.
pub struct EmbeddedIndex;

impl SearchIndex for EmbeddedIndex {
    fn name(&self) -> &str {
        "products-embedded"
    }

    fn index_kind(&self) -> &str {
        "embedded"
    }
}

// ============================================================
// HARNESS
// ============================================================

pub struct Harness {
    pub service: Arc<SearchService>,
    pub availability: Arc<MockAvailability>,
    pub documents: Arc<MockDocuments>,
    pub synchronizer: Arc<MockSynchronizer>,
}

impl Harness {
    pub fn management(&self) -> &Arc<MockManagement> {
        &self.synchronizer.management
    }
}

pub fn config(interval: &str) -> SearchServiceConfig {
    SearchServiceConfig::new(interval).unwrap()
}

/// Service with an observing oracle and a connection-aware document client.
pub fn harness(interval: &str, initial_fields: usize) -> Harness {
    let availability = MockAvailability::new();
    let documents = MockDocuments::new();
    let synchronizer = MockSynchronizer::new(initial_fields);

    let service = SearchService::builder(config(interval))
        .observing_availability(availability.clone())
        .documents_with_connection(documents.clone())
        .synchronizer(synchronizer.clone())
        .build()
        .unwrap();

    Harness {
        service,
        availability,
        documents,
        synchronizer,
    }
}

pub async fn connected(interval: &str, initial_fields: usize) -> Harness {
    let h = harness(interval, initial_fields);
    h.service.connect("products", CONNECTION).await.unwrap();
    h
}

pub fn init_test_tracing() {
    searchlink::init_tracing("searchlink=debug");
}
