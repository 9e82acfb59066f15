//! Application bootstrap tests: fixture loading, dictionary caches and stack settings.

use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use tracestack_lib::core::{ConfigBuilder, TraceStackError};
use tracestack_lib::Application;

const FIXTURE: &str = r#"{
    "applications": ["gateway", "orders"],
    "serviceNames": ["1_/checkout", "2_OrderDao.insert"],
    "segments": [
        {
            "globalTraceIds": ["trace-1"],
            "segment": {
                "traceSegmentId": {"idParts": [1, 1, 1]},
                "applicationId": 1,
                "spans": [
                    {"spanId": 0, "parentSpanId": -1, "startTime": 1000, "endTime": 1200, "operationNameId": 1},
                    {"spanId": 1, "parentSpanId": 0, "startTime": 1010, "endTime": 1150, "operationName": "orders-rpc"}
                ]
            }
        },
        {
            "globalTraceIds": ["trace-1"],
            "segment": {
                "traceSegmentId": {"idParts": [2, 1, 1]},
                "applicationId": 2,
                "refs": [{"parentTraceSegmentId": {"idParts": [1, 1, 1]}, "parentSpanId": 1}],
                "spans": [
                    {"spanId": 0, "parentSpanId": -1, "startTime": 1020, "endTime": 1140, "operationName": "/orders"},
                    {"spanId": 1, "parentSpanId": 0, "startTime": 1030, "endTime": 1030, "operationNameId": 2}
                ]
            }
        }
    ]
}"#;

fn write_fixture(dir: &Path) -> PathBuf {
    let path = dir.join("segments.json");
    std::fs::write(&path, FIXTURE).unwrap();
    path
}

#[tokio::test]
async fn test_bootstrap_loads_fixture() {
    let dir = tempfile::tempdir().unwrap();
    let config = ConfigBuilder::new()
        .fixture(write_fixture(dir.path()))
        .instance_id(5)
        .build()
        .unwrap();

    let app = Application::bootstrap(config).await.unwrap();

    assert_eq!(app.store().segment_count(), 2);
    assert_eq!(app.store().trace_count(), 1);
    assert_eq!(app.applications().code("orders"), Some(2));
    assert_eq!(app.service_names().len(), 2);

    let spans = app.stack().load("trace-1").await;
    let keys: Vec<&str> = spans.iter().map(|s| s.segment_span_id.as_str()).collect();
    assert_eq!(keys, vec!["1.1.1S0", "1.1.1S1", "2.1.1S0", "2.1.1S1"]);

    assert_eq!(spans[0].operation_name, "/checkout");
    assert_eq!(spans[0].application_code, "gateway");
    assert_eq!(spans[1].operation_name, "orders-rpc");
    assert_eq!(spans[3].operation_name, "OrderDao.insert");
    assert_eq!(spans[3].application_code, "orders");
    assert_eq!(spans[3].start_time, 30);

    // Cached lookups answer repeat loads the same way.
    assert_eq!(app.stack().load("trace-1").await, spans);
}

#[tokio::test]
async fn test_bootstrap_applies_max_depth() {
    let dir = tempfile::tempdir().unwrap();
    let config = ConfigBuilder::new()
        .fixture(write_fixture(dir.path()))
        .max_depth(2)
        .build()
        .unwrap();

    let app = Application::bootstrap(config).await.unwrap();
    let spans = app.stack().load("trace-1").await;

    let keys: Vec<&str> = spans.iter().map(|s| s.segment_span_id.as_str()).collect();
    assert_eq!(keys, vec!["1.1.1S0", "1.1.1S1", "2.1.1S0"]);
}

#[tokio::test]
async fn test_bootstrap_identifier_generator_follows_config() {
    let registered = Application::bootstrap(ConfigBuilder::new().instance_id(5).build().unwrap())
        .await
        .unwrap();
    assert_eq!(registered.ids().generate().unwrap().owner_id, 5);

    let unregistered = Application::bootstrap(ConfigBuilder::new().build().unwrap())
        .await
        .unwrap();
    assert!(matches!(unregistered.ids().generate(), Err(TraceStackError::NotReady)));
    assert_eq!(unregistered.store().segment_count(), 0);
}

#[tokio::test]
async fn test_bootstrap_fails_on_missing_fixture() {
    let dir = tempfile::tempdir().unwrap();
    let config = ConfigBuilder::new()
        .fixture(dir.path().join("missing.json"))
        .build()
        .unwrap();

    assert!(Application::bootstrap(config).await.is_err());
}
