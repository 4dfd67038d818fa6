// ==========================================
// Asset Ledger - reference (master) data
// ==========================================
// Banks, vendors, asset categories and sites are the already-persisted
// reference data that uploads resolve natural keys against.
// ==========================================

use serde::{Deserialize, Serialize};

/// The reference tables a natural-key lookup can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceKind {
    Bank,
    Vendor,
    AssetCategory,
    Site,
}

impl ReferenceKind {
    pub fn table_name(&self) -> &'static str {
        match self {
            ReferenceKind::Bank => "banks",
            ReferenceKind::Vendor => "vendors",
            ReferenceKind::AssetCategory => "asset_categories",
            ReferenceKind::Site => "sites",
        }
    }

    /// Label used in error messages ("bank code 'XYZ' does not exist").
    pub fn label(&self) -> &'static str {
        match self {
            ReferenceKind::Bank => "bank",
            ReferenceKind::Vendor => "vendor",
            ReferenceKind::AssetCategory => "asset category",
            ReferenceKind::Site => "site",
        }
    }
}

/// One reference-data record. All four reference tables share this
/// shape: a surrogate id plus a unique natural-key code and a name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceRecord {
    pub id: i64,
    pub code: String,
    pub name: String,
}
