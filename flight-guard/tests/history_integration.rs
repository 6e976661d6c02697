//! Integration tests for recording analysis runs.

use std::collections::BTreeMap;

use flight_guard::history::{InMemoryRunHistory, JsonLinesRunHistory, RunHistory};
use flight_guard::prelude::*;
use flight_guard::test_fixtures::{anomalous_dataset, clean_dataset};
use tempfile::TempDir;

fn tags(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

async fn record_two_runs(history: &dyn RunHistory) {
    let engine = AnomalyEngine::new(AnalysisConfig::default()).unwrap();

    let clean = engine.run(&clean_dataset().unwrap()).await.unwrap();
    history
        .record(&clean, tags(&[("dataset", "clean")]))
        .await
        .unwrap();

    // Sleep past the millisecond so the second run is strictly newer.
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let anomalous = engine.run(&anomalous_dataset().unwrap()).await.unwrap();
    let key = history
        .record(&anomalous, tags(&[("dataset", "anomalous")]))
        .await
        .unwrap();
    assert_eq!(key.timestamp, anomalous.generated_at().timestamp_millis());
}

#[tokio::test]
async fn test_in_memory_history() {
    let history = InMemoryRunHistory::new();
    record_two_runs(&history).await;

    assert_eq!(history.len().await, 2);
    let latest = history.latest().await.unwrap().unwrap();
    assert_eq!(latest.key.tags["dataset"], "anomalous");
    assert_eq!(latest.summary.integrity_total(), 7);
}

#[tokio::test]
async fn test_json_lines_history_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("validation_history.jsonl");

    record_two_runs(&JsonLinesRunHistory::new(&path)).await;

    let reopened = JsonLinesRunHistory::new(&path);
    let records = reopened.load().await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].summary.integrity_total(), 0);
    assert_eq!(records[1].dataset.routes, 13);
    assert_eq!(records[1].run_id, records[1].key.run_id());

    let clean = reopened.find(&tags(&[("dataset", "clean")])).await.unwrap();
    assert_eq!(clean.len(), 1);
    assert_eq!(clean[0].dataset.routes, 6);
}

#[tokio::test]
async fn test_invalid_tags_are_not_recorded() {
    let dir = TempDir::new().unwrap();
    let history = JsonLinesRunHistory::new(dir.path().join("history.jsonl"));
    let report = AnomalyEngine::new(AnalysisConfig::default())
        .unwrap()
        .run(&clean_dataset().unwrap())
        .await
        .unwrap();

    let err = history.record(&report, tags(&[("", "x")])).await.unwrap_err();
    assert!(matches!(err, GuardError::History(_)));
    assert!(history.load().await.unwrap().is_empty());
}
