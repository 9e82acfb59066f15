//! Lookup traits the trace stack reads segments through.

use crate::core::{Result, TraceSegmentObject};

/// Maps a global trace id to the segments recorded for it.
#[async_trait::async_trait]
pub trait GlobalTraceDao: Send + Sync {
    /// Ids of the segments belonging to `global_trace_id`, possibly empty.
    async fn get_segment_ids(&self, global_trace_id: &str) -> Result<Vec<String>>;
}

/// Loads segment bodies.
#[async_trait::async_trait]
pub trait SegmentDao: Send + Sync {
    /// The segment stored under `segment_id`, if any.
    async fn load(&self, segment_id: &str) -> Result<Option<TraceSegmentObject>>;
}
