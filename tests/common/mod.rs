//! Common test utilities and fixtures.

#![allow(dead_code)]

use std::sync::Arc;
use tracestack_lib::cache::{service_name_entry, Dictionary};
use tracestack_lib::core::{Result, TraceSegmentObject, TraceStackError, TraceStackSpan};
use tracestack_lib::stack::TraceStackService;
use tracestack_lib::storage::{GlobalTraceDao, InMemoryTraceStore, SegmentDao};

/// A store, its dictionaries and a stack service reading from them.
pub struct StackFixture {
    pub store: Arc<InMemoryTraceStore>,
    pub applications: Arc<Dictionary>,
    pub service_names: Arc<Dictionary>,
    pub stack: TraceStackService,
}

impl StackFixture {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryTraceStore::new());
        let applications = Arc::new(Dictionary::new());
        let service_names = Arc::new(Dictionary::new());
        let stack = TraceStackService::new(
            store.clone(),
            store.clone(),
            applications.clone(),
            service_names.clone(),
        );

        Self {
            store,
            applications,
            service_names,
            stack,
        }
    }

    /// Register an application and return its id.
    pub fn application(&self, code: &str) -> i32 {
        self.applications.register(code)
    }

    /// Register an operation of an application and return its dictionary code.
    pub fn operation(&self, application_id: i32, name: &str) -> i32 {
        self.service_names.register(&service_name_entry(application_id, name))
    }

    /// Store a segment under one global trace.
    pub fn store(&self, global_trace_id: &str, segment: TraceSegmentObject) -> String {
        self.store.insert_segment([global_trace_id], segment)
    }

    pub async fn load(&self, global_trace_id: &str) -> Vec<TraceStackSpan> {
        self.stack.load(global_trace_id).await
    }
}

/// Segment lookups that always fail.
pub struct FailingStore;

#[async_trait::async_trait]
impl GlobalTraceDao for FailingStore {
    async fn get_segment_ids(&self, _global_trace_id: &str) -> Result<Vec<String>> {
        Err(TraceStackError::storage("segment index offline"))
    }
}

#[async_trait::async_trait]
impl SegmentDao for FailingStore {
    async fn load(&self, _segment_id: &str) -> Result<Option<TraceSegmentObject>> {
        Err(TraceStackError::storage("segment table offline"))
    }
}

/// Segment keys of a span list, in order.
pub fn segment_span_ids(spans: &[TraceStackSpan]) -> Vec<&str> {
    spans.iter().map(|s| s.segment_span_id.as_str()).collect()
}

/// Macro for asserting the parent link of a stack span.
#[macro_export]
macro_rules! assert_parent {
    ($span:expr, $parent:expr) => {
        assert_eq!(
            $span.segment_parent_span_id, $parent,
            "unexpected parent of {}",
            $span.segment_span_id
        );
    };
}
