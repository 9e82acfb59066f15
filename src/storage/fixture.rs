//! JSON fixture files preloading segments and dictionaries.
//!
//! ```json
//! {
//!   "applications": ["gateway", "orders"],
//!   "serviceNames": ["1_/checkout", "2_OrderDao.insert"],
//!   "segments": [
//!     { "globalTraceIds": ["trace-1"], "segment": { "traceSegmentId": { "idParts": [1, 1, 1] }, ... } }
//!   ]
//! }
//! ```
//!
//! Dictionary names are registered in file order, so the first name gets code 1.

use super::InMemoryTraceStore;
use crate::cache::Dictionary;
use crate::core::{Result, TraceSegmentObject, TraceStackError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Contents of a fixture file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Fixture {
    /// Application codes, in registration order
    pub applications: Vec<String>,
    /// Service name entries (`<applicationId>_<operation>`), in registration order
    pub service_names: Vec<String>,
    /// Segments with the global traces they belong to
    pub segments: Vec<FixtureSegment>,
}

/// One stored segment of a fixture.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureSegment {
    /// Global trace ids the segment is indexed under
    pub global_trace_ids: Vec<String>,
    /// Segment body
    pub segment: TraceSegmentObject,
}

impl Fixture {
    /// Parse a fixture from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a fixture file.
    pub async fn from_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            TraceStackError::storage(format!("Failed to read fixture {:?}: {}", path, e))
        })?;
        let fixture = Self::from_json(&content)?;
        tracing::info!(
            path = ?path,
            segments = fixture.segments.len(),
            "loaded segment fixture"
        );
        Ok(fixture)
    }

    /// Load everything into the given store and dictionaries.
    pub fn apply(self, store: &InMemoryTraceStore, applications: &Dictionary, service_names: &Dictionary) {
        for name in &self.applications {
            applications.register(name);
        }
        for entry in &self.service_names {
            service_names.register(entry);
        }
        for FixtureSegment {
            global_trace_ids,
            segment,
        } in self.segments
        {
            store.insert_segment(global_trace_ids, segment);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{GlobalTraceDao, SegmentDao};

    const FIXTURE: &str = r#"{
        "applications": ["gateway"],
        "serviceNames": ["1_/checkout"],
        "segments": [{
            "globalTraceIds": ["trace-1"],
            "segment": {
                "traceSegmentId": {"idParts": [1, 2, 3]},
                "applicationId": 1,
                "spans": [{"spanId": 0, "parentSpanId": -1, "startTime": 5, "endTime": 9, "operationNameId": 1}]
            }
        }]
    }"#;

    #[tokio::test]
    async fn test_apply_fixture() {
        let fixture = Fixture::from_json(FIXTURE).unwrap();
        let store = InMemoryTraceStore::new();
        let applications = Dictionary::new();
        let service_names = Dictionary::new();

        fixture.apply(&store, &applications, &service_names);

        assert_eq!(applications.code("gateway"), Some(1));
        assert_eq!(service_names.name(1).unwrap().as_ref(), "1_/checkout");
        assert_eq!(store.get_segment_ids("trace-1").await.unwrap(), vec!["1.2.3".to_string()]);
        let segment = store.load("1.2.3").await.unwrap().unwrap();
        assert_eq!(segment.spans[0].operation_name_id, 1);
    }

    #[test]
    fn test_invalid_fixture() {
        assert!(Fixture::from_json("{\"segments\": 3}").is_err());
    }
}
