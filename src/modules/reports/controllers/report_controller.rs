use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::error;

use crate::core::{AppError, Result, TracingProgress};
use crate::modules::reports::models::ReportSelection;
use crate::modules::reports::services::{ExportKind, ReportService};

/// Query parameters shared by both download endpoints
#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    /// Configured report type name
    #[serde(rename = "type")]
    pub report_type: String,
    /// Calendar month, 1-12
    pub month: u32,
    /// Calendar year
    pub year: i32,
}

/// GET /reports/spreadsheet
pub async fn download_spreadsheet(
    service: web::Data<ReportService>,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse> {
    generate(service, query.into_inner(), ExportKind::Spreadsheet).await
}

/// GET /reports/pdf
pub async fn download_pdf(
    service: web::Data<ReportService>,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse> {
    generate(service, query.into_inner(), ExportKind::Pdf).await
}

async fn generate(
    service: web::Data<ReportService>,
    query: ReportQuery,
    kind: ExportKind,
) -> Result<HttpResponse> {
    if !(1..=12).contains(&query.month) {
        return Err(AppError::validation(format!(
            "invalid month: {}",
            query.month
        )));
    }

    let selection = ReportSelection {
        type_name: query.report_type,
        month: query.month,
        year: query.year,
    };

    let result = service
        .generate(kind, &selection, &TracingProgress)
        .await;
    if let Err(e) = &result {
        error!(kind = kind.label(), error = %e, "report generation failed");
    }

    match result? {
        Some(artifact) => Ok(HttpResponse::Ok()
            .content_type(artifact.mime_type)
            .insert_header((
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", artifact.file_name),
            ))
            .body(artifact.bytes)),
        None => Ok(HttpResponse::Ok().json(serde_json::json!({
            "notice": "data is empty"
        }))),
    }
}
