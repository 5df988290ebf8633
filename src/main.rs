use std::sync::Arc;

use actix_web::{web, App, HttpResponse, HttpServer};
use anyhow::Context;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trxlens::config::Config;
use trxlens::modules::reports::controllers::report_controller;
use trxlens::modules::reports::ReportService;
use trxlens::modules::search::{HttpSearchBackend, SearchBackend};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trxlens=debug,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    config
        .validate()
        .context("Configuration validation failed")?;

    tracing::info!("Starting trxlens reporting service");
    tracing::info!("Environment: {}", config.app.env);
    tracing::info!("Report types configured: {}", config.types.names().join(", "));
    tracing::info!("Server binding to: {}", config.server.bind_address());

    let backend: Arc<dyn SearchBackend> = Arc::new(
        HttpSearchBackend::new(&config.backend)
            .context("Failed to build search backend client")?,
    );
    let service = web::Data::new(ReportService::new(Arc::new(config.types.clone()), backend));

    // Start HTTP server
    let bind_address = config.server.bind_address();
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(service.clone())
            .route("/health", web::get().to(health_check))
            .route("/", web::get().to(index))
            .route(
                "/reports/spreadsheet",
                web::get().to(report_controller::download_spreadsheet),
            )
            .route("/reports/pdf", web::get().to(report_controller::download_pdf))
    })
    .bind(&bind_address)?
    .run();

    tracing::info!("Server started at http://{}", bind_address);

    server.await?;
    Ok(())
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "trxlens"
    }))
}

async fn index() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "service": "trxlens Self-Service Reporting",
        "version": "0.1.0",
        "status": "running"
    }))
}
