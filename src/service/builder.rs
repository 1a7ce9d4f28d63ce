use super::traits::{
    AvailabilityOracle, ConnectionInitializable, DocumentOperations, SchemaSynchronizer,
    TransportObserver,
};
use super::SearchService;
use crate::config::SearchServiceConfig;
use crate::error::{Result, SearchServiceError};
use std::sync::Arc;

/// Assembles a [`SearchService`] from its collaborators.
///
/// Optional capabilities are declared here, once: use
/// [`observing_availability`](Self::observing_availability) for an oracle
/// that also watches transport traffic, and the `*_with_connection` setters
/// for collaborators that want the connection settings during `connect`.
pub struct SearchServiceBuilder {
    config: SearchServiceConfig,
    availability: Option<Arc<dyn AvailabilityOracle>>,
    transport_observer: Option<Arc<dyn TransportObserver>>,
    documents: Option<Arc<dyn DocumentOperations>>,
    documents_init: Option<Arc<dyn ConnectionInitializable>>,
    synchronizer: Option<Arc<dyn SchemaSynchronizer>>,
    synchronizer_init: Option<Arc<dyn ConnectionInitializable>>,
}

impl SearchServiceBuilder {
    pub fn new(config: SearchServiceConfig) -> Self {
        SearchServiceBuilder {
            config,
            availability: None,
            transport_observer: None,
            documents: None,
            documents_init: None,
            synchronizer: None,
            synchronizer_init: None,
        }
    }

    pub fn availability<T: AvailabilityOracle + 'static>(mut self, oracle: Arc<T>) -> Self {
        self.availability = Some(oracle);
        self.transport_observer = None;
        self
    }

    pub fn observing_availability<T>(mut self, oracle: Arc<T>) -> Self
    where
        T: AvailabilityOracle + TransportObserver + 'static,
    {
        self.transport_observer = Some(oracle.clone());
        self.availability = Some(oracle);
        self
    }

    pub fn documents<T: DocumentOperations + 'static>(mut self, documents: Arc<T>) -> Self {
        self.documents = Some(documents);
        self.documents_init = None;
        self
    }

    pub fn documents_with_connection<T>(mut self, documents: Arc<T>) -> Self
    where
        T: DocumentOperations + ConnectionInitializable + 'static,
    {
        self.documents_init = Some(documents.clone());
        self.documents = Some(documents);
        self
    }

    pub fn synchronizer<T: SchemaSynchronizer + 'static>(mut self, synchronizer: Arc<T>) -> Self {
        self.synchronizer = Some(synchronizer);
        self.synchronizer_init = None;
        self
    }

    pub fn synchronizer_with_connection<T>(mut self, synchronizer: Arc<T>) -> Self
    where
        T: SchemaSynchronizer + ConnectionInitializable + 'static,
    {
        self.synchronizer_init = Some(synchronizer.clone());
        self.synchronizer = Some(synchronizer);
        self
    }

    pub fn build(self) -> Result<Arc<SearchService>> {
        if self.config.schema_update_interval.is_zero() {
            return Err(SearchServiceError::Config(
                "schema_update_interval must be greater than zero".into(),
            ));
        }
        let availability = self
            .availability
            .ok_or_else(|| SearchServiceError::Config("availability oracle is required".into()))?;
        let documents = self.documents.ok_or_else(|| {
            SearchServiceError::Config("document operations client is required".into())
        })?;
        let synchronizer = self
            .synchronizer
            .ok_or_else(|| SearchServiceError::Config("schema synchronizer is required".into()))?;

        let connection_initializers = self
            .documents_init
            .into_iter()
            .chain(self.synchronizer_init)
            .collect();

        Ok(Arc::new(SearchService::from_parts(
            self.config,
            availability,
            self.transport_observer,
            documents,
            synchronizer,
            connection_initializers,
        )))
    }
}
