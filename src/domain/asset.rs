// ==========================================
// Asset Ledger - asset entity and upload DTO
// ==========================================
// AssetUploadDto carries raw cell text (Option<String> per field) so
// parsing never fails; typing happens at validation/conversion time.
// NewAsset is the fully resolved entity handed to the repository.
// ==========================================

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Raw upload row for an asset, one field per spreadsheet column.
///
/// Every field is optional text: a missing or blank cell is `None`.
/// Format and range checks happen in the validator, not here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetUploadDto {
    pub asset_name: Option<String>,
    pub category_code: Option<String>,
    pub vendor_code: Option<String>,
    pub bank_code: Option<String>,
    pub site_code: Option<String>,
    pub serial_no: Option<String>,
    pub cost: Option<String>,
    pub purchase_date: Option<String>,
    pub row_number: usize,
}

/// A resolved asset ready to persist: natural keys replaced by ids,
/// text fields parsed into their real types, tag already assigned.
#[derive(Debug, Clone)]
pub struct NewAsset {
    pub asset_tag: String,
    pub name: String,
    pub category_id: i64,
    pub vendor_id: i64,
    pub bank_id: i64,
    pub site_id: Option<i64>,
    pub serial_no: String,
    pub cost: f64,
    pub purchase_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// A persisted asset as read back from the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: i64,
    pub asset_tag: String,
    pub name: String,
    pub category_id: i64,
    pub vendor_id: i64,
    pub bank_id: i64,
    pub site_id: Option<i64>,
    pub serial_no: String,
    pub cost: f64,
    pub purchase_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}
