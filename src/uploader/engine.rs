// ==========================================
// Asset Ledger - bulk upload engine
// ==========================================
// Generic over a RecordProcessor. Rows run strictly in input order:
// parse -> empty-row skip -> validate -> duplicate check -> convert ->
// persist -> collect. One malformed row never blocks or rolls back its
// siblings; only infrastructure failures abort the batch.
// ==========================================

use crate::config::UploadConfig;
use crate::domain::upload::{FailedRow, RawRow, UploadResult, ValidationError};
use crate::uploader::column_map::ColumnDescriptor;
use crate::uploader::error::UploadError;
use crate::uploader::file_parser::{FileParser, UniversalFileParser};
use crate::uploader::processor::{ConvertError, RecordProcessor};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

pub struct BulkUploadEngine {
    config: UploadConfig,
}

impl BulkUploadEngine {
    pub fn new(config: UploadConfig) -> Self {
        Self { config }
    }

    /// Run one upload batch for one record type.
    ///
    /// Returns `Ok` with per-row accounting even when every row was
    /// rejected; `Err` only for batch-level failures (unreadable file,
    /// oversized file, infrastructure), in which case the batch state
    /// is indeterminate and nothing per-row is reported.
    #[instrument(skip(self, processor), fields(kind = processor.record_kind()))]
    pub async fn process<P: RecordProcessor>(
        &self,
        file_path: &Path,
        processor: &P,
    ) -> Result<UploadResult, UploadError> {
        let start = Instant::now();
        let batch_id = Uuid::new_v4().to_string();

        info!(batch_id = %batch_id, file = %file_path.display(), "upload started");

        let rows = UniversalFileParser.parse_rows(file_path)?;
        if rows.len() > self.config.max_rows {
            return Err(UploadError::TooManyRows {
                limit: self.config.max_rows,
                actual: rows.len(),
            });
        }
        debug!(rows = rows.len(), "file parsed");

        let descriptors = processor.descriptors();
        let mut result = UploadResult::new(batch_id.clone());

        for row in &rows {
            result.total_rows += 1;

            let dto = processor.parse(row);

            // Step 2: all required identifying fields blank -> skip
            // silently; not a success, not a failure.
            if processor.is_empty(&dto) {
                result.skipped += 1;
                debug!(row = row.row_number, "empty row skipped");
                continue;
            }

            // Step 3: field validation. A repository failure here is
            // infrastructure and aborts via `?`.
            let errors = processor.validate(&dto, row.row_number).await?;
            if !errors.is_empty() {
                debug!(row = row.row_number, violations = errors.len(), "row rejected");
                reject(&mut result, row, descriptors, errors);
                continue;
            }

            // Step 4: duplicate natural key -> one synthesized error.
            if processor.is_duplicate(&dto).await? {
                let error = ValidationError::new(
                    row.row_number,
                    "duplicate",
                    "a record with this natural key already exists",
                    processor.natural_key(&dto),
                );
                debug!(row = row.row_number, "duplicate rejected");
                reject(&mut result, row, descriptors, vec![error]);
                continue;
            }

            // Step 5: conversion. A reference can vanish between
            // validation and here; that race downgrades to a row error.
            let entity = match processor.convert(&dto).await {
                Ok(entity) => entity,
                Err(ConvertError::Repository(e)) => return Err(e.into()),
                Err(e) => {
                    warn!(row = row.row_number, error = %e, "conversion failed");
                    let error =
                        ValidationError::new(row.row_number, e.field(), e.to_string(), None);
                    reject(&mut result, row, descriptors, vec![error]);
                    continue;
                }
            };

            // Step 6: persist, one row = one commit unit. Constraint
            // violations the validator could not see downgrade to a
            // row error; anything else aborts the batch.
            match processor.persist(entity).await {
                Ok(created_id) => {
                    result.succeeded += 1;
                    result.created_ids.push(created_id);
                }
                Err(e) if e.is_constraint_violation() => {
                    warn!(row = row.row_number, error = %e, "persistence rejected row");
                    let error = ValidationError::new(
                        row.row_number,
                        "persistence",
                        e.to_string(),
                        None,
                    );
                    reject(&mut result, row, descriptors, vec![error]);
                }
                Err(e) => return Err(e.into()),
            }
        }

        result.elapsed = start.elapsed();
        info!(
            batch_id = %batch_id,
            total = result.total_rows,
            succeeded = result.succeeded,
            failed = result.failed,
            skipped = result.skipped,
            elapsed_ms = result.elapsed.as_millis() as u64,
            "upload complete"
        );

        Ok(result)
    }
}

/// Record a rejected row: all its violations plus the original cell
/// values (descriptor order) for the error report.
fn reject(
    result: &mut UploadResult,
    row: &RawRow,
    descriptors: &[ColumnDescriptor],
    errors: Vec<ValidationError>,
) {
    result.failed += 1;

    let cells = descriptors
        .iter()
        .map(|d| row.cell(d.title).unwrap_or("").to_string())
        .collect();
    let messages = errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect();

    result.failed_rows.push(FailedRow {
        row_number: row.row_number,
        cells,
        messages,
    });
    result.errors.extend(errors);
}
