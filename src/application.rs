//! Wires storage, dictionaries, trace stack and identifier generation together.

use crate::api;
use crate::cache::{CachedLookup, Dictionary};
use crate::core::{Config, Result};
use crate::ids::{GlobalIdGenerator, InstanceRegistry};
use crate::stack::TraceStackService;
use crate::storage::{Fixture, InMemoryTraceStore};
use std::sync::Arc;

/// Main application struct that owns every component of tracestack.
pub struct Application {
    /// Segment store serving the stack lookups
    store: Arc<InMemoryTraceStore>,
    /// Application code dictionary
    applications: Arc<Dictionary>,
    /// Service name dictionary
    service_names: Arc<Dictionary>,
    /// Trace stack reconstruction
    stack: TraceStackService,
    /// Identifier generator for this process
    ids: GlobalIdGenerator,
    /// Application configuration
    config: Config,
}

impl Application {
    /// Create an application from `config`, loading the configured fixture if any.
    pub async fn bootstrap(config: Config) -> Result<Self> {
        let store = Arc::new(InMemoryTraceStore::new());
        let applications = Arc::new(Dictionary::new());
        let service_names = Arc::new(Dictionary::new());

        if let Some(path) = &config.storage.fixture {
            Fixture::from_file(path)
                .await?
                .apply(&store, &applications, &service_names);
        }

        let cache_size = config.storage.dictionary_cache_size;
        let stack = TraceStackService::new(
            store.clone(),
            store.clone(),
            Arc::new(CachedLookup::new(Arc::clone(&applications), cache_size)),
            Arc::new(CachedLookup::new(Arc::clone(&service_names), cache_size)),
        )
        .with_config(&config);

        tracing::info!(
            segments = store.segment_count(),
            traces = store.trace_count(),
            "application initialized"
        );

        Ok(Self {
            store,
            applications,
            service_names,
            stack,
            ids: GlobalIdGenerator::new(InstanceRegistry::from_config(&config.agent)),
            config,
        })
    }

    /// Serve the read API until shutdown.
    pub async fn run(self) -> Result<()> {
        api::start_server(self.stack, &self.config.server).await
    }

    /// Get a reference to the segment store.
    pub fn store(&self) -> &Arc<InMemoryTraceStore> {
        &self.store
    }

    /// Get a reference to the application code dictionary.
    pub fn applications(&self) -> &Arc<Dictionary> {
        &self.applications
    }

    /// Get a reference to the service name dictionary.
    pub fn service_names(&self) -> &Arc<Dictionary> {
        &self.service_names
    }

    /// Get a reference to the trace stack service.
    pub fn stack(&self) -> &TraceStackService {
        &self.stack
    }

    /// Get a reference to the identifier generator.
    pub fn ids(&self) -> &GlobalIdGenerator {
        &self.ids
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}
