// ==========================================
// Asset Ledger - bulk upload layer
// ==========================================
// Spreadsheet-driven batch import: parse, validate, duplicate-check,
// convert, persist row by row, with partial-failure isolation and an
// error report for the rejected rows.
// ==========================================

pub mod asset_processor;
pub mod column_map;
pub mod engine;
pub mod error;
pub mod error_report;
pub mod file_parser;
pub mod processor;
pub mod registry;
pub mod template;

pub use asset_processor::{
    asset_tag_parent_check, format_asset_tag, AssetProcessor, ASSET_COLUMNS, ASSET_RECORD_KIND,
    ASSET_TAG_SCOPE,
};
pub use column_map::ColumnDescriptor;
pub use engine::BulkUploadEngine;
pub use error::UploadError;
pub use error_report::{ErrorReportBuilder, ERROR_COLUMN_TITLE};
pub use file_parser::{CsvParser, ExcelParser, FileParser, UniversalFileParser};
pub use processor::{ConvertError, RecordProcessor};
pub use registry::{ProcessorHandler, UploadHandler, UploadService};
pub use template::TemplateBuilder;
