// ==========================================
// Asset Ledger - upload pipeline types
// ==========================================
// RawRow / ValidationError / FailedRow / UploadResult
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// One parsed physical spreadsheet row.
///
/// `cells` maps header title -> trimmed cell text. `row_number` is the
/// 1-based data-row position in the file (header excluded) and stays
/// stable even when fully blank rows are dropped, so the error report
/// points at the row the operator actually sees.
#[derive(Debug, Clone)]
pub struct RawRow {
    pub row_number: usize,
    pub cells: HashMap<String, String>,
}

impl RawRow {
    /// Cell text for a column title. Blank cells read as `None`.
    pub fn cell(&self, title: &str) -> Option<&str> {
        self.cells
            .get(title)
            .map(|v| v.as_str())
            .filter(|v| !v.is_empty())
    }
}

/// One field-level rule violation on one row.
///
/// Only ever surfaces through `UploadResult` and the error report; it
/// is never written to the primary store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    pub row_number: usize,
    pub field: String,
    pub message: String,
    pub rejected_value: Option<String>,
}

impl ValidationError {
    pub fn new(
        row_number: usize,
        field: impl Into<String>,
        message: impl Into<String>,
        rejected_value: Option<String>,
    ) -> Self {
        Self {
            row_number,
            field: field.into(),
            message: message.into(),
            rejected_value,
        }
    }
}

/// A rejected input row retained for the error report: the original
/// cell values in descriptor order plus every message for the row.
#[derive(Debug, Clone, Serialize)]
pub struct FailedRow {
    pub row_number: usize,
    pub cells: Vec<String>,
    pub messages: Vec<String>,
}

/// Outcome of one upload invocation.
///
/// Accumulated row by row in input order; immutable once returned.
/// `total_rows = succeeded + failed + skipped`.
#[derive(Debug, Serialize)]
pub struct UploadResult {
    pub batch_id: String,
    pub total_rows: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Rows whose required identifying fields were all blank. Counted
    /// separately so trailing blank rows never pollute the report.
    pub skipped: usize,
    /// All violations, in input row order.
    pub errors: Vec<ValidationError>,
    /// Identifiers of successfully created records, in input row order.
    pub created_ids: Vec<String>,
    /// Rejected rows, in input row order, for the error report.
    pub failed_rows: Vec<FailedRow>,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl UploadResult {
    pub fn new(batch_id: String) -> Self {
        Self {
            batch_id,
            total_rows: 0,
            succeeded: 0,
            failed: 0,
            skipped: 0,
            errors: Vec::new(),
            created_ids: Vec::new(),
            failed_rows: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}
