//! In-memory segment storage.

use super::{GlobalTraceDao, SegmentDao};
use crate::core::{Result, TraceSegmentObject};
use dashmap::DashMap;

/// Segment store backed by concurrent hash maps.
#[derive(Debug, Default)]
pub struct InMemoryTraceStore {
    /// Global trace id to segment ids, in insertion order.
    global_traces: DashMap<String, Vec<String>>,
    /// Segments indexed by segment id.
    segments: DashMap<String, TraceSegmentObject>,
}

impl InMemoryTraceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a segment and index it under each global trace id it belongs to.
    ///
    /// Returns the segment id. Storing the same segment id again replaces
    /// the body without duplicating index entries.
    pub fn insert_segment<I, S>(&self, global_trace_ids: I, segment: TraceSegmentObject) -> String
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segment_id = segment.segment_id();

        for global_trace_id in global_trace_ids {
            let mut ids = self.global_traces.entry(global_trace_id.into()).or_default();
            if !ids.contains(&segment_id) {
                ids.push(segment_id.clone());
            }
        }

        tracing::debug!(segment_id = %segment_id, spans = segment.spans.len(), "stored segment");
        self.segments.insert(segment_id.clone(), segment);
        segment_id
    }

    /// Index an already known segment id under a global trace id without a body.
    ///
    /// Lookups of such ids yield no segment.
    pub fn link_segment_id(&self, global_trace_id: &str, segment_id: &str) {
        let mut ids = self.global_traces.entry(global_trace_id.to_string()).or_default();
        if !ids.iter().any(|id| id == segment_id) {
            ids.push(segment_id.to_string());
        }
    }

    /// Number of stored segments.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Number of indexed global traces.
    pub fn trace_count(&self) -> usize {
        self.global_traces.len()
    }
}

#[async_trait::async_trait]
impl GlobalTraceDao for InMemoryTraceStore {
    async fn get_segment_ids(&self, global_trace_id: &str) -> Result<Vec<String>> {
        Ok(self
            .global_traces
            .get(global_trace_id)
            .map(|ids| ids.value().clone())
            .unwrap_or_default())
    }
}

#[async_trait::async_trait]
impl SegmentDao for InMemoryTraceStore {
    async fn load(&self, segment_id: &str) -> Result<Option<TraceSegmentObject>> {
        Ok(self.segments.get(segment_id).map(|segment| segment.value().clone()))
    }
}
