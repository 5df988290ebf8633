pub mod controllers;
pub mod models;
pub mod services;

pub use models::{DayRollup, MonthRollup, Rollups, Summary};
pub use services::{ExportKind, ReportArtifact, ReportService};
