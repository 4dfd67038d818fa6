// ==========================================
// Asset Ledger - domain layer
// ==========================================
// Entities and value types shared across the upload pipeline,
// repositories and the sequence generator.
// ==========================================

pub mod asset;
pub mod reference;
pub mod upload;

pub use asset::{Asset, AssetUploadDto, NewAsset};
pub use reference::{ReferenceKind, ReferenceRecord};
pub use upload::{FailedRow, RawRow, UploadResult, ValidationError};
