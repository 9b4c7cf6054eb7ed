//! Integration tests for the siftr filter engine
//!
//! These tests verify end-to-end behavior over raw JSON records: debounced
//! commits, both filtering strategies, supersession of stale queries, and
//! clean engine teardown across repeated create/destroy cycles.

use serde_json::{Value, json};
use siftr::{EngineConfig, FilterEngine};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Short debounce window so tests settle quickly
fn fast_config() -> EngineConfig {
    EngineConfig {
        debounce_ms: 20,
        ..EngineConfig::default()
    }
}

/// Records shaped like a selection-modal payload, nested sites included
fn records() -> Vec<Value> {
    vec![
        json!({
            "id": "A1",
            "notes": "north region",
            "balance": 2500.0,
            "opened": "2023-05-12",
            "sites": [{"name": "North Harbor"}, {"name": "Cold Store"}]
        }),
        json!({
            "id": "B2",
            "notes": "south region",
            "balance": 800.0,
            "opened": "2024-01-03",
            "sites": [{"name": "South Quay"}]
        }),
        json!({
            "id": "C3",
            "notes": "pending review",
            "balance": 120.5,
            "opened": "2024-11-20",
            "sites": []
        }),
    ]
}

fn settle(engine: &FilterEngine<Value>, config: &EngineConfig) {
    std::thread::sleep(config.debounce() + Duration::from_millis(150));
    let deadline = Instant::now() + Duration::from_secs(2);
    while engine.is_busy() {
        assert!(Instant::now() < deadline, "engine did not settle in time");
        std::thread::sleep(Duration::from_millis(5));
    }
}

fn ids(result: &[Value]) -> Vec<&str> {
    result
        .iter()
        .filter_map(|r| r.get("id").and_then(Value::as_str))
        .collect()
}

#[test]
fn test_initial_result_is_full_collection() {
    let engine = FilterEngine::with_config(records(), fast_config()).unwrap();
    assert_eq!(engine.match_count(), 3);
    assert!(!engine.is_busy());
}

#[test]
fn test_substring_query_selects_matching_records() {
    let config = fast_config();
    let engine = FilterEngine::with_config(records(), config.clone()).unwrap();

    engine.set_query("nor");
    settle(&engine, &config);

    assert_eq!(ids(&engine.current_result()), vec!["A1"]);
}

#[test]
fn test_empty_query_shows_everything() {
    let config = fast_config();
    let engine = FilterEngine::with_config(records(), config.clone()).unwrap();

    engine.set_query("nor");
    settle(&engine, &config);
    engine.set_query("");
    settle(&engine, &config);

    assert_eq!(engine.match_count(), 3);

    engine.set_query("   ");
    settle(&engine, &config);
    assert_eq!(engine.match_count(), 3);
}

#[test]
fn test_no_match_yields_empty_sequence() {
    let config = fast_config();
    let engine = FilterEngine::with_config(records(), config.clone()).unwrap();

    engine.set_query("zzz");
    settle(&engine, &config);

    assert_eq!(engine.match_count(), 0);
    assert!(engine.current_result().is_empty());
}

#[test]
fn test_short_expression_shows_everything() {
    let config = fast_config();
    let engine = FilterEngine::with_config(records(), config.clone()).unwrap();

    engine.set_query("/fx");
    settle(&engine, &config);

    assert_eq!(engine.match_count(), 3);
}

#[test]
fn test_expression_query_on_named_fields() {
    let config = fast_config();
    let engine = FilterEngine::with_config(records(), config.clone()).unwrap();

    engine.set_query("/fbalance > 500");
    settle(&engine, &config);
    assert_eq!(ids(&engine.current_result()), vec!["A1", "B2"]);

    engine.set_query("/fopened >= 2024-01-01 & notes : review");
    settle(&engine, &config);
    assert_eq!(ids(&engine.current_result()), vec!["C3"]);
}

#[test]
fn test_expression_query_reaches_nested_fields() {
    let config = fast_config();
    let engine = FilterEngine::with_config(records(), config.clone()).unwrap();

    engine.set_query("/fsites.name : harbor");
    settle(&engine, &config);

    assert_eq!(ids(&engine.current_result()), vec!["A1"]);
}

#[test]
fn test_malformed_expression_shows_everything() {
    let config = fast_config();
    let engine = FilterEngine::with_config(records(), config.clone()).unwrap();

    engine.set_query("/fbalance >> oops");
    settle(&engine, &config);

    assert_eq!(engine.match_count(), 3);
    assert!(!engine.is_busy());
}

#[test]
fn test_substring_query_reaches_nested_fields() {
    let config = fast_config();
    let engine = FilterEngine::with_config(records(), config.clone()).unwrap();

    engine.set_query("quay");
    settle(&engine, &config);

    assert_eq!(ids(&engine.current_result()), vec!["B2"]);
}

#[test]
fn test_rapid_keystrokes_commit_once() {
    let config = fast_config();
    let commits = Arc::new(AtomicUsize::new(0));
    let seen = commits.clone();
    let engine = FilterEngine::with_notify(records(), config.clone(), move || {
        seen.fetch_add(1, Ordering::SeqCst);
    })
    .unwrap();

    engine.set_query("n");
    engine.set_query("no");
    engine.set_query("nor");
    settle(&engine, &config);

    assert_eq!(commits.load(Ordering::SeqCst), 1);
    assert_eq!(ids(&engine.current_result()), vec!["A1"]);
}

#[test]
fn test_later_query_always_wins() {
    let config = fast_config();
    let engine = FilterEngine::with_config(records(), config.clone()).unwrap();

    // Let the first query commit and dispatch, then supersede it while its
    // result may still be in flight
    engine.set_query("north");
    std::thread::sleep(config.debounce() + Duration::from_millis(5));
    engine.set_query("south");
    settle(&engine, &config);

    assert_eq!(ids(&engine.current_result()), vec!["B2"]);
}

#[test]
fn test_result_order_follows_input_order() {
    let config = fast_config();
    let engine = FilterEngine::with_config(records(), config.clone()).unwrap();

    // "region" appears in A1 and B2, in that input order
    engine.set_query("region");
    settle(&engine, &config);

    assert_eq!(ids(&engine.current_result()), vec!["A1", "B2"]);
}

#[test]
fn test_match_count_tracks_result() {
    let config = fast_config();
    let engine = FilterEngine::with_config(records(), config.clone()).unwrap();

    engine.set_query("region");
    settle(&engine, &config);
    assert_eq!(engine.match_count(), engine.current_result().len());
    assert_eq!(engine.match_count(), 2);
}

#[test]
fn test_create_destroy_cycles_leak_nothing() {
    let config = fast_config();
    for _ in 0..30 {
        let engine = FilterEngine::with_config(records(), config.clone()).unwrap();
        engine.set_query("nor");
        settle(&engine, &config);
        assert_eq!(engine.match_count(), 1);
        // Drop joins the control and worker threads
    }
}

#[test]
fn test_query_after_heavy_churn_still_correct() {
    let config = fast_config();
    let engine = FilterEngine::with_config(records(), config.clone()).unwrap();

    for _ in 0..5 {
        engine.set_query("north");
        engine.set_query("");
        engine.set_query("/fbalance > 500");
        engine.set_query("south");
    }
    settle(&engine, &config);

    assert_eq!(ids(&engine.current_result()), vec!["B2"]);
}
