// ==========================================
// Asset Ledger - record processor capability trait
// ==========================================
// One implementation per record type supplies everything the generic
// engine needs: descriptors, parsing, validation, duplicate detection,
// conversion and persistence. Composition over subclassing: the engine
// never knows the concrete record type.
// ==========================================

use crate::domain::upload::{RawRow, ValidationError};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::uploader::column_map::ColumnDescriptor;
use async_trait::async_trait;
use thiserror::Error;

/// DTO-to-entity conversion failures.
///
/// `ReferenceNotFound` and `InvalidValue` are row-recoverable: a
/// reference can disappear between validation and conversion, and the
/// engine downgrades them to a row error instead of aborting the
/// batch. A `Repository` infrastructure failure aborts.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("{label} '{value}' does not exist")]
    ReferenceNotFound {
        /// Column title, for the error report.
        field: String,
        label: &'static str,
        value: String,
    },

    #[error("invalid value for {field}: '{value}'")]
    InvalidValue { field: String, value: String },

    #[error("code generation busy: {0}; resubmit this row")]
    CodeGeneration(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ConvertError {
    /// Column title to attribute the row error to.
    pub fn field(&self) -> &str {
        match self {
            ConvertError::ReferenceNotFound { field, .. } => field,
            ConvertError::InvalidValue { field, .. } => field,
            ConvertError::CodeGeneration(_) => "code generation",
            ConvertError::Repository(_) => "row",
        }
    }
}

/// Everything one record type contributes to the bulk upload pipeline.
#[async_trait]
pub trait RecordProcessor: Send + Sync {
    /// Raw per-row DTO: one optional text field per column.
    type Dto: Send + Sync;
    /// Fully resolved entity handed to persistence.
    type Entity: Send;

    /// Record-kind name for registry lookup and logging.
    fn record_kind(&self) -> &'static str;

    /// Column mapping table for this record type.
    fn descriptors(&self) -> &'static [ColumnDescriptor];

    /// Build the DTO from a parsed row. Infallible: missing or blank
    /// cells become `None`, never an error.
    fn parse(&self, row: &RawRow) -> Self::Dto;

    /// True when all required identifying fields are blank; such rows
    /// are skipped silently (trailing blank spreadsheet rows).
    fn is_empty(&self, dto: &Self::Dto) -> bool;

    /// All field-level violations for the row, not just the first.
    /// Read-only; reference-data lookups are the only side channel.
    async fn validate(
        &self,
        dto: &Self::Dto,
        row_number: usize,
    ) -> RepositoryResult<Vec<ValidationError>>;

    /// Cheaper natural-key uniqueness probe, run only after `validate`
    /// returned no errors.
    async fn is_duplicate(&self, dto: &Self::Dto) -> RepositoryResult<bool>;

    /// The natural key value, for the synthesized duplicate error.
    fn natural_key(&self, dto: &Self::Dto) -> Option<String>;

    /// Resolve natural keys to ids, parse typed fields, assign
    /// generated codes.
    async fn convert(&self, dto: &Self::Dto) -> Result<Self::Entity, ConvertError>;

    /// Persist in the entity's own transaction scope and return the
    /// created-record identifier.
    async fn persist(&self, entity: Self::Entity) -> RepositoryResult<String>;
}
