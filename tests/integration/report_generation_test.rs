// End-to-end report generation against an in-memory backend: artifact
// naming and bytes, type rejection before any network call, and the
// empty-data notice path.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use trxlens::config::{FieldMapping, ReportTypeConfig, TypeRegistry, Vocabulary};
use trxlens::core::progress::ProgressObserver;
use trxlens::core::{AppError, Result};
use trxlens::modules::reports::models::ReportSelection;
use trxlens::modules::reports::services::ExportKind;
use trxlens::modules::reports::ReportService;
use trxlens::modules::search::{SearchBackend, SearchHit};

/// Serves one fixed page of June records and counts queries
struct SinglePageBackend {
    calls: AtomicUsize,
}

impl SinglePageBackend {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchBackend for SinglePageBackend {
    async fn search(&self, _index: &str, query: &Value) -> Result<Vec<SearchHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let range = &query["query"]["bool"]["filter"][0]["range"]["@timestamp"];
        let lower = range["gte"]
            .as_str()
            .or_else(|| range["gt"].as_str())
            .expect("query must set a lower bound");
        // Only the June window holds data; the previous-month fetch of
        // the PDF path comes back empty.
        if !lower.starts_with("2025-06") {
            return Ok(Vec::new());
        }

        let hits = vec![
            json!({ "_id": "a", "_source": { "@timestamp": "2025-06-01T08:00:00+07:00", "max_tps": 10, "avg_tps": 8, "total": 45 } }),
            json!({ "_id": "b", "_source": { "@timestamp": "2025-06-02T08:00:00+07:00", "max_tps": 12, "avg_tps": 9, "total": 30 } }),
        ];
        Ok(hits
            .into_iter()
            .map(|hit| serde_json::from_value(hit).unwrap())
            .collect())
    }
}

/// Records every progress event
#[derive(Default)]
struct CollectingProgress {
    seen: Mutex<Vec<u8>>,
}

impl ProgressObserver for CollectingProgress {
    fn update(&self, percent: u8) {
        self.seen.lock().unwrap().push(percent);
    }
}

fn registry() -> Arc<TypeRegistry> {
    let corporate = ReportTypeConfig {
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
        page_size: 10_000,
        chart_days: 20,
        query: json!({
            "query": { "bool": { "filter": [ { "range": { "@timestamp": {} } } ] } },
            "sort": [ { "@timestamp": { "order": "asc" } } ]
        }),
    };
    Arc::new(TypeRegistry::new(vec![corporate]).unwrap())
}

fn selection(type_name: &str, month: u32) -> ReportSelection {
    ReportSelection {
        type_name: type_name.to_string(),
        month,
        year: 2025,
    }
}

#[tokio::test]
async fn spreadsheet_artifact_has_name_mime_and_zip_bytes() {
    let backend = Arc::new(SinglePageBackend::new());
    let service = ReportService::new(registry(), backend);
    let progress = CollectingProgress::default();

    let artifact = service
        .generate(ExportKind::Spreadsheet, &selection("corporate", 6), &progress)
        .await
        .unwrap()
        .expect("window holds data");

    assert_eq!(artifact.file_name, "Report-June-2025-corporate.xlsx");
    assert_eq!(
        artifact.mime_type,
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    assert_eq!(&artifact.bytes[..2], b"PK");
    assert_eq!(*progress.seen.lock().unwrap(), vec![0, 80, 90, 100]);
}

#[tokio::test]
async fn unknown_type_is_rejected_before_any_backend_call() {
    let backend = Arc::new(SinglePageBackend::new());
    let service = ReportService::new(registry(), backend.clone());
    let progress = CollectingProgress::default();

    let result = service
        .generate(ExportKind::Spreadsheet, &selection("missing", 6), &progress)
        .await;

    assert!(matches!(result, Err(AppError::UnknownType(_))));
    assert_eq!(backend.call_count(), 0);
    assert!(progress.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn empty_window_yields_notice_not_error() {
    let backend = Arc::new(SinglePageBackend::new());
    let service = ReportService::new(registry(), backend);
    let progress = CollectingProgress::default();

    // May 2025 holds no data in the fake backend
    let result = service
        .generate(ExportKind::Spreadsheet, &selection("corporate", 5), &progress)
        .await
        .unwrap();

    assert!(result.is_none());
}

#[tokio::test]
async fn invalid_month_is_a_validation_error() {
    let backend = Arc::new(SinglePageBackend::new());
    let service = ReportService::new(registry(), backend);
    let progress = CollectingProgress::default();

    let result = service
        .generate(ExportKind::Spreadsheet, &selection("corporate", 13), &progress)
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn guard_releases_after_each_run() {
    let backend = Arc::new(SinglePageBackend::new());
    let service = ReportService::new(registry(), backend);
    let progress = CollectingProgress::default();

    for _ in 0..2 {
        let artifact = service
            .generate(ExportKind::Spreadsheet, &selection("corporate", 6), &progress)
            .await
            .unwrap();
        assert!(artifact.is_some());
    }
}
