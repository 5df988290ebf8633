use std::sync::Arc;

use tracing::{info, warn};

use crate::config::TypeRegistry;
use crate::core::timezone;
use crate::core::{AppError, ProgressObserver, Result};
use crate::modules::reports::models::{ReportSelection, ReportWindow, Rollups};
use crate::modules::reports::services::aggregator::aggregate;
use crate::modules::reports::services::excel;
use crate::modules::reports::services::formatter::format_report;
use crate::modules::reports::services::guard::{ExportGuard, ExportKind};
use crate::modules::reports::services::pdf;
use crate::modules::search::{PageFetcher, SearchBackend};

/// A finished report ready to be offered as a download
#[derive(Debug, Clone)]
pub struct ReportArtifact {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Service orchestrating one report generation:
/// selection → window → fetch → aggregate → format → export.
///
/// Holds the per-kind single-flight guard; everything else is built
/// fresh per request and discarded with it.
pub struct ReportService {
    registry: Arc<TypeRegistry>,
    fetcher: PageFetcher,
    guard: ExportGuard,
}

impl ReportService {
    pub fn new(registry: Arc<TypeRegistry>, backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            registry,
            fetcher: PageFetcher::new(backend),
            guard: ExportGuard::new(),
        }
    }

    /// Generate a report for the selection, or `None` when the window
    /// holds no data.
    ///
    /// An unconfigured type is rejected before any backend call. The
    /// single-flight guard is held for the whole run and released on
    /// every exit path.
    pub async fn generate(
        &self,
        kind: ExportKind,
        selection: &ReportSelection,
        progress: &dyn ProgressObserver,
    ) -> Result<Option<ReportArtifact>> {
        let report_type = self
            .registry
            .get(&selection.type_name)
            .ok_or_else(|| AppError::unknown_type(&selection.type_name))?;

        let _permit = self.guard.try_acquire(kind)?;
        progress.update(0);

        let window = ReportWindow::month(selection.year, selection.month)?;
        info!(
            report_type = %report_type.name,
            kind = kind.label(),
            start = %window.start,
            end = %window.end,
            "generating report"
        );

        let records = self.fetcher.fetch_all(report_type, &window).await;
        if records.is_empty() {
            warn!(report_type = %report_type.name, "no records in window, nothing to report");
            return Ok(None);
        }

        let rollups = aggregate(&records, report_type);
        let Some(report) = format_report(&rollups, report_type) else {
            warn!(report_type = %report_type.name, "rollups empty after aggregation");
            return Ok(None);
        };
        progress.update(80);

        let bytes = match kind {
            ExportKind::Spreadsheet => excel::write_workbook(&report)?,
            ExportKind::Pdf => {
                let previous = self.previous_month_rollups(selection).await;
                pdf::write_document(&report, &rollups, previous.as_ref(), report_type)?
            }
        };
        progress.update(90);

        let artifact = ReportArtifact {
            file_name: format!(
                "Report-{}-{}-{}.{}",
                selection.month_name(),
                selection.year,
                report_type.name,
                kind.extension()
            ),
            mime_type: kind.mime_type(),
            bytes,
        };

        info!(
            file_name = %artifact.file_name,
            size = artifact.bytes.len(),
            "report generated"
        );
        progress.update(100);
        Ok(Some(artifact))
    }

    /// Previous calendar month's rollups for the chart comparison
    /// series; `None` when that month has no data
    async fn previous_month_rollups(&self, selection: &ReportSelection) -> Option<Rollups> {
        let report_type = self.registry.get(&selection.type_name)?;
        let (year, month) = timezone::previous_month(selection.year, selection.month);
        let window = ReportWindow::month(year, month).ok()?;

        let records = self.fetcher.fetch_all(report_type, &window).await;
        if records.is_empty() {
            return None;
        }
        Some(aggregate(&records, report_type))
    }
}
