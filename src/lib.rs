// ==========================================
// Asset Ledger - core library
// ==========================================
// Asset/financial record-keeping core: the generic bulk-upload
// pipeline and the concurrency-safe sequential code generator.
// Routing, auth and the wider entity model live outside this crate.
// ==========================================

// ==========================================
// Modules
// ==========================================

// Domain layer - entities and value types
pub mod domain;

// Repository layer - data access
pub mod repository;

// Upload layer - spreadsheet batch import
pub mod uploader;

// Sequence layer - code generation
pub mod sequence;

// Configuration
pub mod config;

// Database infrastructure (connection init / unified PRAGMAs / schema)
pub mod db;

// Logging
pub mod logging;

// ==========================================
// Re-exports
// ==========================================

pub use config::UploadConfig;
pub use domain::{FailedRow, RawRow, UploadResult, ValidationError};
pub use repository::{
    AssetRepository, ReferenceRepository, RepositoryError, SequenceRepository,
    SqliteAssetRepository, SqliteReferenceRepository, SqliteSequenceRepository,
};
pub use sequence::{CounterKey, GeneratedCode, SequenceError, SequenceGenerator};
pub use uploader::{
    BulkUploadEngine, ColumnDescriptor, ErrorReportBuilder, RecordProcessor, UploadError,
    UploadService,
};

// ==========================================
// Constants
// ==========================================

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const APP_NAME: &str = "Asset Ledger";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
