// Pagination fetcher tests against an in-memory search backend that
// honors the query document's size and timestamp range the way the
// production cluster does.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use trxlens::config::{FieldMapping, ReportTypeConfig, Vocabulary};
use trxlens::core::{AppError, Result};
use trxlens::modules::reports::models::ReportWindow;
use trxlens::modules::search::{PageFetcher, SearchBackend, SearchHit};

#[derive(Debug, Clone)]
struct Doc {
    id: String,
    timestamp: String,
}

/// In-memory backend over a chronologically sorted document list.
/// Timestamps share one fixed offset and length, so lexicographic
/// comparison matches chronological order.
struct FakeBackend {
    docs: Vec<Doc>,
    calls: AtomicUsize,
    fail_on_call: Option<usize>,
}

impl FakeBackend {
    fn new(docs: Vec<Doc>) -> Self {
        Self {
            docs,
            calls: AtomicUsize::new(0),
            fail_on_call: None,
        }
    }

    fn failing_on(docs: Vec<Doc>, call: usize) -> Self {
        Self {
            docs,
            calls: AtomicUsize::new(0),
            fail_on_call: Some(call),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchBackend for FakeBackend {
    async fn search(&self, _index: &str, query: &Value) -> Result<Vec<SearchHit>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on_call == Some(call) {
            return Err(AppError::backend("cluster unreachable"));
        }

        let size = query["size"].as_u64().expect("query must set size") as usize;
        let range = &query["query"]["bool"]["filter"][0]["range"]["@timestamp"];
        let gte = range["gte"].as_str();
        let gt = range["gt"].as_str();
        let lt = range["lt"].as_str().expect("query must set lt");

        let hits = self
            .docs
            .iter()
            .filter(|doc| {
                let after_lower = match (gte, gt) {
                    (Some(bound), _) => doc.timestamp.as_str() >= bound,
                    (None, Some(bound)) => doc.timestamp.as_str() > bound,
                    (None, None) => true,
                };
                after_lower && doc.timestamp.as_str() < lt
            })
            .take(size)
            .map(|doc| {
                serde_json::from_value(json!({
                    "_id": doc.id,
                    "_source": { "@timestamp": doc.timestamp, "total": 1 }
                }))
                .unwrap()
            })
            .collect();
        Ok(hits)
    }
}

fn report_type(page_size: usize) -> ReportTypeConfig {
    ReportTypeConfig {
        name: "corporate".to_string(),
        index: "trx-corporate-*".to_string(),
        vocabulary: Vocabulary::Transaction,
        split_sub_types: false,
        fields: FieldMapping {
            timestamp: "@timestamp".to_string(),
            max: "max_tps".to_string(),
            avg: "avg_tps".to_string(),
            total: "total".to_string(),
            total_debit: None,
            sub_type: None,
        },
        page_size,
        chart_days: 20,
        query: json!({
            "query": { "bool": { "filter": [ { "range": { "@timestamp": {} } } ] } },
            "sort": [ { "@timestamp": { "order": "asc" } } ]
        }),
    }
}

fn docs_with_distinct_timestamps(count: usize) -> Vec<Doc> {
    (0..count)
        .map(|i| Doc {
            id: format!("doc-{:03}", i),
            timestamp: format!(
                "2025-06-{:02}T{:02}:{:02}:00+07:00",
                i / 24 / 60 + 1,
                i / 60 % 24,
                i % 60
            ),
        })
        .collect()
}

#[tokio::test]
async fn fetches_union_of_all_pages_without_repeats() {
    let backend = Arc::new(FakeBackend::new(docs_with_distinct_timestamps(25)));
    let fetcher = PageFetcher::new(backend.clone());
    let window = ReportWindow::month(2025, 6).unwrap();

    let records = fetcher.fetch_all(&report_type(10), &window).await;

    assert_eq!(records.len(), 25);
    let unique: HashSet<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(unique.len(), 25);
    // 10 + 10 + 5, then one empty page ends the loop
    assert_eq!(backend.call_count(), 4);
}

#[tokio::test]
async fn short_first_page_stops_without_second_round_trip() {
    let backend = Arc::new(FakeBackend::new(docs_with_distinct_timestamps(5)));
    let fetcher = PageFetcher::new(backend.clone());
    let window = ReportWindow::month(2025, 6).unwrap();

    let records = fetcher.fetch_all(&report_type(10), &window).await;

    assert_eq!(records.len(), 5);
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test]
async fn initial_failure_yields_empty_result() {
    let backend = Arc::new(FakeBackend::failing_on(docs_with_distinct_timestamps(25), 0));
    let fetcher = PageFetcher::new(backend);
    let window = ReportWindow::month(2025, 6).unwrap();

    let records = fetcher.fetch_all(&report_type(10), &window).await;

    assert!(records.is_empty());
}

#[tokio::test]
async fn continuation_failure_keeps_partial_results() {
    let backend = Arc::new(FakeBackend::failing_on(docs_with_distinct_timestamps(25), 1));
    let fetcher = PageFetcher::new(backend);
    let window = ReportWindow::month(2025, 6).unwrap();

    let records = fetcher.fetch_all(&report_type(10), &window).await;

    // The first page survives; the failed continuation is the final word
    assert_eq!(records.len(), 10);
}

#[tokio::test]
async fn records_outside_window_are_not_fetched() {
    let mut docs = docs_with_distinct_timestamps(5);
    docs.push(Doc {
        id: "july".to_string(),
        timestamp: "2025-07-01T00:00:00+07:00".to_string(),
    });
    let backend = Arc::new(FakeBackend::new(docs));
    let fetcher = PageFetcher::new(backend);
    let window = ReportWindow::month(2025, 6).unwrap();

    let records = fetcher.fetch_all(&report_type(10), &window).await;

    assert_eq!(records.len(), 5);
    assert!(records.iter().all(|r| r.id != "july"));
}

// Documents the known cursor gap rather than fixing it: when records
// share the exact timestamp across a page boundary, the exclusive
// continuation bound skips the ones beyond the first page.
#[tokio::test]
async fn duplicate_timestamp_at_page_boundary_drops_records() {
    let mut docs = docs_with_distinct_timestamps(12);
    // doc-010 shares its timestamp with doc-009, exactly at the
    // page-size-10 boundary
    docs[10].timestamp = docs[9].timestamp.clone();
    let backend = Arc::new(FakeBackend::new(docs));
    let fetcher = PageFetcher::new(backend);
    let window = ReportWindow::month(2025, 6).unwrap();

    let records = fetcher.fetch_all(&report_type(10), &window).await;

    let ids: HashSet<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert!(!ids.contains("doc-010"));
    assert_eq!(records.len(), 11);
}
