use serde::Deserialize;
use std::env;
use std::path::Path;

use crate::core::{AppError, Result};

pub mod backend;
pub mod server;
pub mod types;

pub use backend::BackendConfig;
pub use server::ServerConfig;
pub use types::{FieldMapping, ReportTypeConfig, TypeRegistry, Vocabulary};

/// Main application configuration.
///
/// Built once in `main` and passed into each component; nothing reads
/// configuration globals after startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub types: TypeRegistry,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub log_level: String,
}

/// On-disk shape of the report configuration document: backend
/// connection plus the per-type registry (index names, field mappings,
/// vocabulary, base query templates).
#[derive(Debug, Deserialize)]
struct ReportConfigFile {
    backend: BackendConfig,
    types: Vec<ReportTypeConfig>,
}

impl Config {
    /// Load configuration from environment variables and the report
    /// configuration file. Any failure here aborts startup before a
    /// single request can be served.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config_path =
            env::var("REPORT_CONFIG").unwrap_or_else(|_| "config/report_types.yaml".to_string());
        let file = Self::load_report_config(Path::new(&config_path))?;

        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| AppError::Configuration("Invalid PORT".to_string()))?;

        Ok(Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            },
            server: ServerConfig::new(
                env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port,
            ),
            backend: file.backend,
            types: TypeRegistry::new(file.types)?,
        })
    }

    fn load_report_config(path: &Path) -> Result<ReportConfigFile> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::Configuration(format!(
                "cannot read report configuration {}: {}",
                path.display(),
                e
            ))
        })?;
        serde_yaml::from_str(&raw).map_err(|e| {
            AppError::Configuration(format!(
                "cannot parse report configuration {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.backend.validate()?;

        if self.types.is_empty() {
            return Err(AppError::Configuration(
                "at least one report type must be configured".to_string(),
            ));
        }

        Ok(())
    }
}
