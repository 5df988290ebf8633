use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::ReportTypeConfig;
use crate::modules::reports::models::ReportWindow;
use crate::modules::search::client::SearchBackend;
use crate::modules::search::models::{Record, SearchHit};
use crate::modules::search::query::{build_query, LowerBound};

/// Cursor-paginated fetch of every record in a time window.
///
/// Failure never propagates out of here: a failed continuation page
/// keeps whatever was already accumulated as the final result, and a
/// failed initial page yields an empty result. The caller treats both
/// as "this is the data".
pub struct PageFetcher {
    backend: Arc<dyn SearchBackend>,
}

impl PageFetcher {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend }
    }

    /// Fetch all records of `report_type` inside `window`.
    ///
    /// The first page uses an inclusive lower bound on the window start;
    /// each continuation resumes strictly after the last fetched
    /// record's timestamp. A first page shorter than the page size ends
    /// the fetch without a second round-trip; a continuation page with
    /// zero hits ends the loop.
    ///
    /// Known gap: when several records share the exact timestamp at a
    /// page boundary, the `gt` cursor skips the ones beyond the first
    /// page. Tie-breaking is deliberately not applied here.
    pub async fn fetch_all(
        &self,
        report_type: &ReportTypeConfig,
        window: &ReportWindow,
    ) -> Vec<Record> {
        let timestamp_field = &report_type.fields.timestamp;
        let page_size = report_type.page_size;
        let range_start = window.start_param();
        let range_end = window.end_param();

        let query = match build_query(
            &report_type.query,
            page_size,
            timestamp_field,
            &range_start,
            &range_end,
            LowerBound::Inclusive,
        ) {
            Ok(query) => query,
            Err(e) => {
                warn!(report_type = %report_type.name, error = %e, "cannot build initial query");
                return Vec::new();
            }
        };

        let mut records = Vec::new();

        let first_page = match self.backend.search(&report_type.index, &query).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!(report_type = %report_type.name, error = %e, "initial search page failed");
                return Vec::new();
            }
        };
        let first_page_full = first_page.len() >= page_size;
        collect_records(first_page, timestamp_field, &mut records);

        if !first_page_full {
            debug!(report_type = %report_type.name, fetched = records.len(), "single-page fetch");
            return records;
        }

        loop {
            let Some(last) = records.last() else {
                break;
            };
            let query = match build_query(
                &report_type.query,
                page_size,
                timestamp_field,
                &last.raw_timestamp,
                &range_end,
                LowerBound::Exclusive,
            ) {
                Ok(query) => query,
                Err(e) => {
                    warn!(report_type = %report_type.name, error = %e, "cannot build continuation query");
                    break;
                }
            };

            match self.backend.search(&report_type.index, &query).await {
                Ok(hits) if hits.is_empty() => {
                    debug!(report_type = %report_type.name, "no further hits");
                    break;
                }
                Ok(hits) => collect_records(hits, timestamp_field, &mut records),
                Err(e) => {
                    warn!(
                        report_type = %report_type.name,
                        fetched = records.len(),
                        error = %e,
                        "continuation page failed, keeping partial results"
                    );
                    break;
                }
            }
        }

        debug!(report_type = %report_type.name, fetched = records.len(), "fetch complete");
        records
    }
}

fn collect_records(hits: Vec<SearchHit>, timestamp_field: &str, out: &mut Vec<Record>) {
    for hit in hits {
        let id = hit.id.clone();
        match Record::from_hit(hit, timestamp_field) {
            Some(record) => out.push(record),
            None => warn!(record_id = %id, "record skipped: missing or unparseable timestamp"),
        }
    }
}
