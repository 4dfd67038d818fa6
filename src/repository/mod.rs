// ==========================================
// Asset Ledger - repository layer
// ==========================================
// Data access behind trait seams: reference lookups, row-scoped asset
// persistence, and the sequence counter store.
// ==========================================

pub mod asset_repo;
pub mod error;
pub mod reference_repo;
pub mod sequence_repo;

pub use asset_repo::{AssetRepository, SqliteAssetRepository};
pub use error::{RepositoryError, RepositoryResult};
pub use reference_repo::{ReferenceRepository, SqliteReferenceRepository};
pub use sequence_repo::{ParentCheck, SequenceRepository, SqliteSequenceRepository};
