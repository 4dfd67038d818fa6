// ==========================================
// Asset Ledger - asset upload processor
// ==========================================
// The representative RecordProcessor: asset rows reference category,
// vendor, bank and (optionally) site master data by code; the serial
// number is the duplicate natural key; the asset tag is assigned from
// the category+vendor+bank sequence counter at conversion time.
// ==========================================

use crate::config::UploadConfig;
use crate::domain::asset::{AssetUploadDto, NewAsset};
use crate::domain::reference::ReferenceKind;
use crate::domain::upload::{RawRow, ValidationError};
use crate::repository::asset_repo::AssetRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::reference_repo::ReferenceRepository;
use crate::repository::sequence_repo::{ParentCheck, SequenceRepository};
use crate::sequence::generator::{CounterKey, SequenceError, SequenceGenerator};
use crate::uploader::column_map::{self, ColumnDescriptor};
use crate::uploader::processor::{ConvertError, RecordProcessor};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::OptionalExtension;
use std::sync::Arc;

pub const ASSET_RECORD_KIND: &str = "asset";

/// Counter scope for asset tags; one counter per category+vendor+bank.
pub const ASSET_TAG_SCOPE: &str = "asset_tag";

pub const MAX_ASSET_NAME_LEN: usize = 120;
pub const MAX_SERIAL_LEN: usize = 40;
pub const MAX_COST: f64 = 1_000_000_000.0;

/// Column mapping for asset uploads. Order is the sheet layout and the
/// error-report layout.
pub const ASSET_COLUMNS: &[ColumnDescriptor] = &[
    ColumnDescriptor {
        field: "asset_name",
        title: "Asset Name",
        order: 0,
        required: true,
        example: "Front Office ATM",
    },
    ColumnDescriptor {
        field: "category_code",
        title: "Category Code",
        order: 1,
        required: true,
        example: "ATM",
    },
    ColumnDescriptor {
        field: "vendor_code",
        title: "Vendor Code",
        order: 2,
        required: true,
        example: "V1",
    },
    ColumnDescriptor {
        field: "bank_code",
        title: "Bank Code",
        order: 3,
        required: true,
        example: "SBI",
    },
    ColumnDescriptor {
        field: "site_code",
        title: "Site Code",
        order: 4,
        required: false,
        example: "MUM01",
    },
    ColumnDescriptor {
        field: "serial_no",
        title: "Serial No",
        order: 5,
        required: true,
        example: "SN-2043",
    },
    ColumnDescriptor {
        field: "cost",
        title: "Cost",
        order: 6,
        required: true,
        example: "125000.50",
    },
    ColumnDescriptor {
        field: "purchase_date",
        title: "Purchase Date",
        order: 7,
        required: false,
        example: "2025-04-18",
    },
];

/// Asset tag layout: category + vendor + bank codes followed by the
/// zero-padded sequence. Sequences wider than `width` widen the field.
pub fn format_asset_tag(
    category: &str,
    vendor: &str,
    bank: &str,
    sequence: i64,
    width: usize,
) -> String {
    format!(
        "{}{}{}{:0width$}",
        category,
        vendor,
        bank,
        sequence,
        width = width
    )
}

/// Parent check for the asset-tag counter scope: the category, vendor
/// and bank behind the key must exist before any lock is taken.
pub fn asset_tag_parent_check() -> ParentCheck {
    Box::new(|conn, key| {
        let segments = key.segments();
        if segments.len() != 3 {
            return Err(RepositoryError::InternalError(format!(
                "asset_tag key expects 3 segments, got {}",
                segments.len()
            )));
        }

        let parents = [
            (ReferenceKind::AssetCategory, &segments[0]),
            (ReferenceKind::Vendor, &segments[1]),
            (ReferenceKind::Bank, &segments[2]),
        ];

        for (kind, code) in parents {
            let sql = format!("SELECT 1 FROM {} WHERE code = ?1 LIMIT 1", kind.table_name());
            let found: Option<i64> = conn
                .query_row(&sql, rusqlite::params![code], |row| row.get(0))
                .optional()?;
            if found.is_none() {
                return Err(RepositoryError::NotFound {
                    entity: kind.label().to_string(),
                    key: code.to_string(),
                });
            }
        }
        Ok(())
    })
}

// ==========================================
// AssetProcessor
// ==========================================
pub struct AssetProcessor<R, A, S>
where
    R: ReferenceRepository,
    A: AssetRepository,
    S: SequenceRepository,
{
    reference_repo: R,
    asset_repo: A,
    generator: Arc<SequenceGenerator<S>>,
    config: UploadConfig,
}

impl<R, A, S> AssetProcessor<R, A, S>
where
    R: ReferenceRepository,
    A: AssetRepository,
    S: SequenceRepository,
{
    pub fn new(
        reference_repo: R,
        asset_repo: A,
        generator: Arc<SequenceGenerator<S>>,
        config: UploadConfig,
    ) -> Self {
        Self {
            reference_repo,
            asset_repo,
            generator,
            config,
        }
    }

    async fn check_reference(
        &self,
        errors: &mut Vec<ValidationError>,
        row_number: usize,
        kind: ReferenceKind,
        title: &str,
        code: &Option<String>,
    ) -> RepositoryResult<()> {
        if let Some(code) = code {
            if !self.reference_repo.exists(kind, code).await? {
                errors.push(ValidationError::new(
                    row_number,
                    title,
                    format!("{} '{}' does not exist", kind.label(), code),
                    Some(code.clone()),
                ));
            }
        }
        Ok(())
    }

    async fn resolve_reference(
        &self,
        kind: ReferenceKind,
        title: &'static str,
        code: &Option<String>,
    ) -> Result<i64, ConvertError> {
        let code = code.as_deref().ok_or_else(|| ConvertError::InvalidValue {
            field: title.to_string(),
            value: String::new(),
        })?;
        self.reference_repo
            .find_id(kind, code)
            .await?
            .ok_or_else(|| ConvertError::ReferenceNotFound {
                field: title.to_string(),
                label: kind.label(),
                value: code.to_string(),
            })
    }
}

fn require(
    errors: &mut Vec<ValidationError>,
    row_number: usize,
    title: &str,
    value: &Option<String>,
) {
    if value.is_none() {
        errors.push(ValidationError::new(
            row_number,
            title,
            "required field is missing",
            None,
        ));
    }
}

#[async_trait]
impl<R, A, S> RecordProcessor for AssetProcessor<R, A, S>
where
    R: ReferenceRepository,
    A: AssetRepository,
    S: SequenceRepository + 'static,
{
    type Dto = AssetUploadDto;
    type Entity = NewAsset;

    fn record_kind(&self) -> &'static str {
        ASSET_RECORD_KIND
    }

    fn descriptors(&self) -> &'static [ColumnDescriptor] {
        ASSET_COLUMNS
    }

    fn parse(&self, row: &RawRow) -> AssetUploadDto {
        AssetUploadDto {
            asset_name: row.cell("Asset Name").map(str::to_string),
            category_code: row.cell("Category Code").map(str::to_string),
            vendor_code: row.cell("Vendor Code").map(str::to_string),
            bank_code: row.cell("Bank Code").map(str::to_string),
            site_code: row.cell("Site Code").map(str::to_string),
            serial_no: row.cell("Serial No").map(str::to_string),
            cost: row.cell("Cost").map(str::to_string),
            purchase_date: row.cell("Purchase Date").map(str::to_string),
            row_number: row.row_number,
        }
    }

    fn is_empty(&self, dto: &AssetUploadDto) -> bool {
        dto.asset_name.is_none()
            && dto.category_code.is_none()
            && dto.vendor_code.is_none()
            && dto.bank_code.is_none()
            && dto.serial_no.is_none()
            && dto.cost.is_none()
    }

    async fn validate(
        &self,
        dto: &AssetUploadDto,
        row_number: usize,
    ) -> RepositoryResult<Vec<ValidationError>> {
        let mut errors = Vec::new();

        // required-field presence
        require(&mut errors, row_number, "Asset Name", &dto.asset_name);
        require(&mut errors, row_number, "Category Code", &dto.category_code);
        require(&mut errors, row_number, "Vendor Code", &dto.vendor_code);
        require(&mut errors, row_number, "Bank Code", &dto.bank_code);
        require(&mut errors, row_number, "Serial No", &dto.serial_no);
        require(&mut errors, row_number, "Cost", &dto.cost);

        // length / format constraints
        if let Some(name) = &dto.asset_name {
            if name.chars().count() > MAX_ASSET_NAME_LEN {
                errors.push(ValidationError::new(
                    row_number,
                    "Asset Name",
                    format!("must be at most {} characters", MAX_ASSET_NAME_LEN),
                    Some(name.clone()),
                ));
            }
        }

        if let Some(serial) = &dto.serial_no {
            let well_formed = serial.len() <= MAX_SERIAL_LEN
                && serial
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
            if !well_formed {
                errors.push(ValidationError::new(
                    row_number,
                    "Serial No",
                    format!(
                        "may contain only letters, digits, '-' and '_' (max {} characters)",
                        MAX_SERIAL_LEN
                    ),
                    Some(serial.clone()),
                ));
            }
        }

        if let Some(cost) = &dto.cost {
            match column_map::parse_decimal(cost) {
                None => errors.push(ValidationError::new(
                    row_number,
                    "Cost",
                    "is not a number",
                    Some(cost.clone()),
                )),
                Some(v) if v <= 0.0 || v > MAX_COST => errors.push(ValidationError::new(
                    row_number,
                    "Cost",
                    format!("must be greater than 0 and at most {}", MAX_COST),
                    Some(cost.clone()),
                )),
                Some(_) => {}
            }
        }

        if let Some(date) = &dto.purchase_date {
            match column_map::parse_date(date, &self.config.date_format) {
                None => errors.push(ValidationError::new(
                    row_number,
                    "Purchase Date",
                    format!("expected format {}", self.config.date_format),
                    Some(date.clone()),
                )),
                Some(d) if d > Utc::now().date_naive() => errors.push(ValidationError::new(
                    row_number,
                    "Purchase Date",
                    "must not be in the future",
                    Some(date.clone()),
                )),
                Some(_) => {}
            }
        }

        // foreign-key existence against persisted reference data
        self.check_reference(
            &mut errors,
            row_number,
            ReferenceKind::AssetCategory,
            "Category Code",
            &dto.category_code,
        )
        .await?;
        self.check_reference(
            &mut errors,
            row_number,
            ReferenceKind::Vendor,
            "Vendor Code",
            &dto.vendor_code,
        )
        .await?;
        self.check_reference(
            &mut errors,
            row_number,
            ReferenceKind::Bank,
            "Bank Code",
            &dto.bank_code,
        )
        .await?;
        self.check_reference(
            &mut errors,
            row_number,
            ReferenceKind::Site,
            "Site Code",
            &dto.site_code,
        )
        .await?;

        Ok(errors)
    }

    async fn is_duplicate(&self, dto: &AssetUploadDto) -> RepositoryResult<bool> {
        match &dto.serial_no {
            Some(serial) => self.asset_repo.exists_by_serial(serial).await,
            None => Ok(false),
        }
    }

    fn natural_key(&self, dto: &AssetUploadDto) -> Option<String> {
        dto.serial_no.clone()
    }

    async fn convert(&self, dto: &AssetUploadDto) -> Result<NewAsset, ConvertError> {
        let category_id = self
            .resolve_reference(ReferenceKind::AssetCategory, "Category Code", &dto.category_code)
            .await?;
        let vendor_id = self
            .resolve_reference(ReferenceKind::Vendor, "Vendor Code", &dto.vendor_code)
            .await?;
        let bank_id = self
            .resolve_reference(ReferenceKind::Bank, "Bank Code", &dto.bank_code)
            .await?;
        let site_id = match &dto.site_code {
            Some(_) => Some(
                self.resolve_reference(ReferenceKind::Site, "Site Code", &dto.site_code)
                    .await?,
            ),
            None => None,
        };

        let name = dto
            .asset_name
            .clone()
            .ok_or_else(|| ConvertError::InvalidValue {
                field: "Asset Name".to_string(),
                value: String::new(),
            })?;
        let serial_no = dto
            .serial_no
            .clone()
            .ok_or_else(|| ConvertError::InvalidValue {
                field: "Serial No".to_string(),
                value: String::new(),
            })?;

        let cost_raw = dto.cost.as_deref().unwrap_or("");
        let cost =
            column_map::parse_decimal(cost_raw).ok_or_else(|| ConvertError::InvalidValue {
                field: "Cost".to_string(),
                value: cost_raw.to_string(),
            })?;

        let purchase_date = match &dto.purchase_date {
            Some(raw) => Some(
                column_map::parse_date(raw, &self.config.date_format).ok_or_else(|| {
                    ConvertError::InvalidValue {
                        field: "Purchase Date".to_string(),
                        value: raw.clone(),
                    }
                })?,
            ),
            None => None,
        };

        // assign the tag from the category+vendor+bank counter. The
        // generator blocks (per-key wait + rusqlite), so it runs on the
        // blocking pool instead of an async worker.
        let category_code = dto.category_code.clone().unwrap_or_default();
        let vendor_code = dto.vendor_code.clone().unwrap_or_default();
        let bank_code = dto.bank_code.clone().unwrap_or_default();
        let width = self.config.tag_padding_width;
        let generator = Arc::clone(&self.generator);
        let generated = tokio::task::spawn_blocking(move || {
            let key = CounterKey::new(
                ASSET_TAG_SCOPE,
                [
                    category_code.as_str(),
                    vendor_code.as_str(),
                    bank_code.as_str(),
                ],
            );
            generator.next_value(&key, |seq| {
                format_asset_tag(&category_code, &vendor_code, &bank_code, seq, width)
            })
        })
        .await
        .map_err(|e| {
            ConvertError::Repository(RepositoryError::InternalError(format!(
                "code generation task failed: {}",
                e
            )))
        })?
        .map_err(|e| match e {
            SequenceError::LockTimeout { .. } => ConvertError::CodeGeneration(e.to_string()),
            SequenceError::UnregisteredScope(scope) => ConvertError::Repository(
                RepositoryError::InternalError(format!("counter scope '{}' not wired", scope)),
            ),
            SequenceError::Repository(RepositoryError::NotFound { entity, key }) => {
                ConvertError::ReferenceNotFound {
                    field: "Asset Tag".to_string(),
                    label: "reference",
                    value: format!("{} '{}'", entity, key),
                }
            }
            SequenceError::Repository(repo) => ConvertError::Repository(repo),
        })?;

        Ok(NewAsset {
            asset_tag: generated.code,
            name,
            category_id,
            vendor_id,
            bank_id,
            site_id,
            serial_no,
            cost,
            purchase_date,
            created_at: Utc::now(),
        })
    }

    async fn persist(&self, entity: NewAsset) -> RepositoryResult<String> {
        self.asset_repo.insert(&entity).await
    }
}
