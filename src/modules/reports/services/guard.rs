use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::core::{AppError, Result};

/// Export kind: one spreadsheet and one PDF generation may run at a
/// time, independently of each other
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Spreadsheet,
    Pdf,
}

impl ExportKind {
    pub fn label(&self) -> &'static str {
        match self {
            ExportKind::Spreadsheet => "spreadsheet",
            ExportKind::Pdf => "PDF",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportKind::Spreadsheet => "xlsx",
            ExportKind::Pdf => "pdf",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportKind::Spreadsheet => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportKind::Pdf => "application/pdf",
        }
    }
}

/// In-process single-flight guard, one lock per export kind.
///
/// Acquisition is scoped: the returned guard releases the kind on drop,
/// on the success and the error path alike. A second request of the
/// same kind while the lock is held is rejected, not queued.
#[derive(Debug, Default)]
pub struct ExportGuard {
    spreadsheet: Arc<Mutex<()>>,
    pdf: Arc<Mutex<()>>,
}

impl ExportGuard {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, kind: ExportKind) -> &Arc<Mutex<()>> {
        match kind {
            ExportKind::Spreadsheet => &self.spreadsheet,
            ExportKind::Pdf => &self.pdf,
        }
    }

    pub fn try_acquire(&self, kind: ExportKind) -> Result<OwnedMutexGuard<()>> {
        self.slot(kind).clone().try_lock_owned().map_err(|_| {
            AppError::busy(format!(
                "{} generation is in progress. Please wait until it completes.",
                kind.label()
            ))
        })
    }
}
