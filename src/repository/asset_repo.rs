// ==========================================
// Asset Ledger - asset repository
// ==========================================
// Row-scoped persistence: one insert = one transaction = one commit
// unit, so a constraint failure on one upload row never touches its
// siblings.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::asset::{Asset, NewAsset};
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

#[async_trait]
pub trait AssetRepository: Send + Sync {
    /// Persist one asset in its own transaction. Returns the asset tag
    /// as the created-record identifier.
    async fn insert(&self, asset: &NewAsset) -> RepositoryResult<String>;

    /// Duplicate probe on the natural key.
    async fn exists_by_serial(&self, serial_no: &str) -> RepositoryResult<bool>;

    async fn find_by_tag(&self, asset_tag: &str) -> RepositoryResult<Option<Asset>>;

    async fn count(&self) -> RepositoryResult<usize>;
}

// ==========================================
// SQLite implementation
// ==========================================
pub struct SqliteAssetRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteAssetRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn with_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn lock(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| RepositoryError::LockError("connection mutex poisoned".to_string()))
    }
}

#[async_trait]
impl AssetRepository for SqliteAssetRepository {
    async fn insert(&self, asset: &NewAsset) -> RepositoryResult<String> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        tx.execute(
            r#"
            INSERT INTO assets (
                asset_tag, name, category_id, vendor_id, bank_id, site_id,
                serial_no, cost, purchase_date, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                asset.asset_tag,
                asset.name,
                asset.category_id,
                asset.vendor_id,
                asset.bank_id,
                asset.site_id,
                asset.serial_no,
                asset.cost,
                asset.purchase_date.map(|d| d.format("%Y-%m-%d").to_string()),
                asset.created_at,
            ],
        )?;

        tx.commit()
            .map_err(|e| RepositoryError::TransactionError(e.to_string()))?;

        Ok(asset.asset_tag.clone())
    }

    async fn exists_by_serial(&self, serial_no: &str) -> RepositoryResult<bool> {
        let conn = self.lock()?;
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM assets WHERE serial_no = ?1 LIMIT 1",
                params![serial_no],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    async fn find_by_tag(&self, asset_tag: &str) -> RepositoryResult<Option<Asset>> {
        let conn = self.lock()?;
        let asset = conn
            .query_row(
                r#"
                SELECT id, asset_tag, name, category_id, vendor_id, bank_id,
                       site_id, serial_no, cost, purchase_date, created_at
                FROM assets WHERE asset_tag = ?1
                "#,
                params![asset_tag],
                |row| {
                    let purchase_date: Option<String> = row.get(9)?;
                    Ok(Asset {
                        id: row.get(0)?,
                        asset_tag: row.get(1)?,
                        name: row.get(2)?,
                        category_id: row.get(3)?,
                        vendor_id: row.get(4)?,
                        bank_id: row.get(5)?,
                        site_id: row.get(6)?,
                        serial_no: row.get(7)?,
                        cost: row.get(8)?,
                        purchase_date: purchase_date
                            .and_then(|d| chrono::NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
                        created_at: row.get(10)?,
                    })
                },
            )
            .optional()?;
        Ok(asset)
    }

    async fn count(&self) -> RepositoryResult<usize> {
        let conn = self.lock()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM assets", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}
