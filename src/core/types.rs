use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between a segment id and a span id in a segment span key.
pub const SEGMENT_SPAN_SPLIT: &str = "S";

/// Separator between the numeric parts of a [`UniqueId`] rendered as a segment id.
pub const ID_PART_SPLIT: &str = ".";

/// Separator between the application id and the name in a service name dictionary entry.
pub const ID_SPLIT: &str = "_";

/// Local parent span id meaning "no parent within this segment".
pub const NO_PARENT_SPAN_ID: i32 = -1;

/// Multi-part identifier carried by segments and segment references.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniqueId {
    /// Numeric parts of the identifier, most significant first
    pub id_parts: Vec<i64>,
}

impl UniqueId {
    /// Creates a unique id from its parts
    pub fn new(id_parts: Vec<i64>) -> Self {
        Self { id_parts }
    }

    /// Renders the id as a segment id string, parts joined by `.`
    pub fn to_segment_id(&self) -> String {
        self.id_parts
            .iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(ID_PART_SPLIT)
    }
}

impl fmt::Display for UniqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_segment_id())
    }
}

/// A raw span as recorded by an agent inside a segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanObject {
    /// Span id, unique within its segment
    pub span_id: i32,
    /// Local parent span id, `-1` for the first span of the segment
    pub parent_span_id: i32,
    /// Start time in milliseconds
    pub start_time: i64,
    /// End time in milliseconds
    pub end_time: i64,
    /// Inline operation name, used when no dictionary code was assigned
    #[serde(default)]
    pub operation_name: String,
    /// Service name dictionary code, `0` when unassigned
    #[serde(default)]
    pub operation_name_id: i32,
}

impl SpanObject {
    /// Creates a span without an operation name
    pub fn new(span_id: i32, parent_span_id: i32, start_time: i64, end_time: i64) -> Self {
        Self {
            span_id,
            parent_span_id,
            start_time,
            end_time,
            operation_name: String::new(),
            operation_name_id: 0,
        }
    }

    /// Sets the inline operation name
    pub fn with_operation_name<S: Into<String>>(mut self, name: S) -> Self {
        self.operation_name = name.into();
        self
    }

    /// Sets the service name dictionary code
    pub fn with_operation_name_id(mut self, code: i32) -> Self {
        self.operation_name_id = code;
        self
    }

    /// Returns true if this span has no local parent
    pub fn is_segment_entry(&self) -> bool {
        self.parent_span_id == NO_PARENT_SPAN_ID
    }
}

/// Reference from a segment to the span that called it in another segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceSegmentReference {
    /// Id of the segment holding the calling span
    pub parent_trace_segment_id: UniqueId,
    /// Id of the calling span inside that segment
    pub parent_span_id: i32,
}

/// A segment: the spans one process recorded for one trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceSegmentObject {
    /// Segment id
    pub trace_segment_id: UniqueId,
    /// Owning application id
    #[serde(default)]
    pub application_id: i32,
    /// Owning application instance id
    #[serde(default)]
    pub application_instance_id: i32,
    /// Spans in recording order
    #[serde(default)]
    pub spans: Vec<SpanObject>,
    /// Cross-segment references
    #[serde(default)]
    pub refs: Vec<TraceSegmentReference>,
}

impl TraceSegmentObject {
    /// Creates an empty segment
    pub fn new(trace_segment_id: UniqueId, application_id: i32) -> Self {
        Self {
            trace_segment_id,
            application_id,
            application_instance_id: 0,
            spans: Vec::new(),
            refs: Vec::new(),
        }
    }

    /// Appends a span
    pub fn with_span(mut self, span: SpanObject) -> Self {
        self.spans.push(span);
        self
    }

    /// Appends a reference to a parent span in another segment
    pub fn with_ref(mut self, parent_trace_segment_id: UniqueId, parent_span_id: i32) -> Self {
        self.refs.push(TraceSegmentReference {
            parent_trace_segment_id,
            parent_span_id,
        });
        self
    }

    /// Returns the segment id string
    pub fn segment_id(&self) -> String {
        self.trace_segment_id.to_segment_id()
    }
}

/// Builds the key identifying a span across all segments of a trace.
pub fn segment_span_key(segment_id: &str, span_id: i32) -> String {
    format!("{segment_id}{SEGMENT_SPAN_SPLIT}{span_id}")
}

/// A span of a reconstructed trace stack, as returned to readers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceStackSpan {
    /// Span id within its segment
    pub span_id: i32,
    /// Parent span id, local or taken from a segment reference
    pub parent_span_id: i32,
    /// Segment id + span id
    pub segment_span_id: String,
    /// Segment id + span id of the parent, possibly in another segment
    pub segment_parent_span_id: String,
    /// Start time, relative to the earliest span once the stack is assembled
    pub start_time: i64,
    /// Resolved operation name
    pub operation_name: String,
    /// Resolved application code
    pub application_code: String,
    /// Duration in milliseconds, at least 1
    pub cost: i64,
    /// True if no span in the stack is this span's parent
    pub is_root: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_id_rendering() {
        let id = UniqueId::new(vec![2, 35, 15_000_000_000_003]);
        assert_eq!(id.to_segment_id(), "2.35.15000000000003");
        assert_eq!(UniqueId::default().to_segment_id(), "");
    }

    #[test]
    fn test_segment_span_key() {
        assert_eq!(segment_span_key("1.2.3", 0), "1.2.3S0");
        assert_eq!(segment_span_key("1.2.3", -1), "1.2.3S-1");
    }

    #[test]
    fn test_stack_span_json_fields() {
        let span = TraceStackSpan {
            span_id: 1,
            parent_span_id: 0,
            segment_span_id: "s1S1".to_string(),
            segment_parent_span_id: "s1S0".to_string(),
            start_time: 0,
            operation_name: "/orders".to_string(),
            application_code: "gateway".to_string(),
            cost: 1,
            is_root: false,
        };

        let json = serde_json::to_value(&span).unwrap();
        for field in [
            "spanId",
            "parentSpanId",
            "segmentSpanId",
            "segmentParentSpanId",
            "startTime",
            "operationName",
            "applicationCode",
            "cost",
            "isRoot",
        ] {
            assert!(json.get(field).is_some(), "missing field {field}");
        }
    }

    #[test]
    fn test_segment_json_defaults() {
        let json = r#"{"traceSegmentId":{"idParts":[1,2,3]},"spans":[{"spanId":0,"parentSpanId":-1,"startTime":10,"endTime":20}]}"#;
        let segment: TraceSegmentObject = serde_json::from_str(json).unwrap();
        assert_eq!(segment.segment_id(), "1.2.3");
        assert!(segment.refs.is_empty());
        assert!(segment.spans[0].is_segment_entry());
        assert_eq!(segment.spans[0].operation_name_id, 0);
    }
}
