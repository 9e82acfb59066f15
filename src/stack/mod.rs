//! Trace stack reconstruction.
//!
//! Given a global trace id, [`TraceStackService::load`] gathers every
//! segment recorded for the trace, links spans to their parents across
//! segment boundaries and returns one ordered list of spans forming the
//! call tree. Lookup failures never fail the load; they only leave spans,
//! names or segments out of the result.

pub mod tree;

pub use tree::assemble;

use crate::cache::{operation_name_of, DictionaryCache};
use crate::core::{segment_span_key, Config, TraceSegmentObject, TraceStackSpan};
use crate::storage::{GlobalTraceDao, SegmentDao};
use std::sync::Arc;

/// Default deepest call depth walked below a root span.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Reconstructs trace stacks from stored segments.
#[derive(Clone)]
pub struct TraceStackService {
    global_trace_dao: Arc<dyn GlobalTraceDao>,
    segment_dao: Arc<dyn SegmentDao>,
    application_cache: Arc<dyn DictionaryCache>,
    service_name_cache: Arc<dyn DictionaryCache>,
    max_depth: usize,
}

impl TraceStackService {
    /// Create a service reading through the given collaborators.
    pub fn new(
        global_trace_dao: Arc<dyn GlobalTraceDao>,
        segment_dao: Arc<dyn SegmentDao>,
        application_cache: Arc<dyn DictionaryCache>,
        service_name_cache: Arc<dyn DictionaryCache>,
    ) -> Self {
        Self {
            global_trace_dao,
            segment_dao,
            application_cache,
            service_name_cache,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Limit how deep below a root span the tree is walked.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Apply the stack settings of `config`.
    pub fn with_config(self, config: &Config) -> Self {
        self.with_max_depth(config.stack.max_depth)
    }

    /// Load the ordered span list of `global_trace_id`.
    ///
    /// Returns an empty list when the trace is unknown or none of its
    /// segments can be loaded.
    pub async fn load(&self, global_trace_id: &str) -> Vec<TraceStackSpan> {
        let segment_ids = match self.global_trace_dao.get_segment_ids(global_trace_id).await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(global_trace_id, error = %e, "failed to look up segment ids");
                return Vec::new();
            },
        };

        let mut spans = Vec::new();
        for segment_id in &segment_ids {
            match self.segment_dao.load(segment_id).await {
                Ok(Some(segment)) => spans.extend(self.build_span_list(segment_id, &segment)),
                Ok(None) => {
                    tracing::debug!(global_trace_id, segment_id = %segment_id, "segment not found, skipping");
                },
                Err(e) => {
                    tracing::warn!(
                        global_trace_id,
                        segment_id = %segment_id,
                        error = %e,
                        "failed to load segment, skipping"
                    );
                },
            }
        }

        let ordered = assemble(spans, self.max_depth);
        tracing::debug!(
            global_trace_id,
            segments = segment_ids.len(),
            spans = ordered.len(),
            "assembled trace stack"
        );
        ordered
    }

    /// Expand the raw spans of one segment into stack spans.
    ///
    /// The entry span of a segment called from other segments is emitted
    /// once per reference, so it shows up under every caller.
    pub fn build_span_list(&self, segment_id: &str, segment: &TraceSegmentObject) -> Vec<TraceStackSpan> {
        let application_code = self
            .application_cache
            .get(segment.application_id)
            .unwrap_or_default();

        let mut spans = Vec::with_capacity(segment.spans.len() + segment.refs.len());
        for span_object in &segment.spans {
            let segment_span_id = segment_span_key(segment_id, span_object.span_id);
            let operation_name = self.operation_name(span_object.operation_name_id, &span_object.operation_name);
            let cost = span_object.end_time.saturating_sub(span_object.start_time).max(1);

            let stack_span = |parent_span_id: i32, segment_parent_span_id: String| TraceStackSpan {
                span_id: span_object.span_id,
                parent_span_id,
                segment_span_id: segment_span_id.clone(),
                segment_parent_span_id,
                start_time: span_object.start_time,
                operation_name: operation_name.clone(),
                application_code: application_code.clone(),
                cost,
                is_root: false,
            };

            if span_object.is_segment_entry() && !segment.refs.is_empty() {
                for reference in &segment.refs {
                    let parent_segment_id = reference.parent_trace_segment_id.to_segment_id();
                    spans.push(stack_span(
                        reference.parent_span_id,
                        segment_span_key(&parent_segment_id, reference.parent_span_id),
                    ));
                }
            } else {
                spans.push(stack_span(
                    span_object.parent_span_id,
                    segment_span_key(segment_id, span_object.parent_span_id),
                ));
            }
        }
        spans
    }

    fn operation_name(&self, code: i32, inline_name: &str) -> String {
        if code == 0 {
            return inline_name.to_string();
        }
        self.service_name_cache
            .get(code)
            .map(|entry| operation_name_of(&entry).to_string())
            .unwrap_or_default()
    }
}
