//! Integration tests for the airline ranking analyzer.

use flight_guard::analyzers::{Analyzer, RankingAnalyzer, RankingEntry};
use flight_guard::config::AnalysisConfig;
use flight_guard::test_fixtures::{anomalous_dataset, dataset_with_airline_counts};

fn summarize(entries: &[RankingEntry]) -> Vec<(String, u64, u64, bool)> {
    entries
        .iter()
        .map(|e| (e.airline_code.clone(), e.route_count, e.rank, e.tied))
        .collect()
}

#[tokio::test]
async fn test_dense_rank_example() {
    // A:5, B:5, C:3 => A=1, B=1, C=2
    let dataset = dataset_with_airline_counts(&[5, 5, 3]).unwrap();
    let entries = RankingAnalyzer::default().analyze(&dataset).await.unwrap();
    assert_eq!(
        summarize(&entries),
        vec![
            ("L00".to_string(), 5, 1, true),
            ("L01".to_string(), 5, 1, true),
            ("L02".to_string(), 3, 2, false),
        ]
    );
}

#[tokio::test]
async fn test_ties_ordered_by_code() {
    let dataset = dataset_with_airline_counts(&[1, 4, 4, 4, 2]).unwrap();
    let entries = RankingAnalyzer::default().analyze(&dataset).await.unwrap();
    let order: Vec<&str> = entries.iter().map(|e| e.airline_code.as_str()).collect();
    assert_eq!(order, vec!["L01", "L02", "L03", "L04", "L00"]);
    let ranks: Vec<u64> = entries.iter().map(|e| e.rank).collect();
    assert_eq!(ranks, vec![1, 1, 1, 2, 3]);
}

#[tokio::test]
async fn test_sample_network_ranking() {
    let dataset = anomalous_dataset().unwrap();
    let entries = RankingAnalyzer::from_config(&AnalysisConfig::default())
        .analyze(&dataset)
        .await
        .unwrap();
    assert_eq!(
        summarize(&entries),
        vec![
            ("AA".to_string(), 5, 1, false),
            ("UA".to_string(), 4, 2, false),
            ("DL".to_string(), 2, 3, false),
            ("ZZ".to_string(), 0, 4, false),
        ]
    );
}

#[tokio::test]
async fn test_excluding_zero_route_airlines() {
    let dataset = anomalous_dataset().unwrap();
    let config = AnalysisConfig::default().with_zero_route_airlines(false);
    let entries = RankingAnalyzer::from_config(&config)
        .analyze(&dataset)
        .await
        .unwrap();
    assert_eq!(entries.len(), 3);
    assert!(entries.iter().all(|e| e.route_count > 0));
}

#[tokio::test]
async fn test_one_entry_per_airline() {
    let dataset = dataset_with_airline_counts(&[0, 0, 3, 0]).unwrap();
    let entries = RankingAnalyzer::default().analyze(&dataset).await.unwrap();
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[0].airline_code, "L02");
    assert!(entries[1..].iter().all(|e| e.rank == 2 && e.tied));
}
