// ==========================================
// Asset Ledger - reference data repository
// ==========================================
// Natural-key lookups against the master tables (banks, vendors,
// asset categories, sites). Read paths are what the row validator and
// converter consult; insert exists for seeding and master maintenance.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::reference::{ReferenceKind, ReferenceRecord};
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

#[async_trait]
pub trait ReferenceRepository: Send + Sync {
    /// Surrogate id for a natural-key code, if the record exists.
    async fn find_id(&self, kind: ReferenceKind, code: &str) -> RepositoryResult<Option<i64>>;

    /// Full record for a natural-key code.
    async fn find_by_code(
        &self,
        kind: ReferenceKind,
        code: &str,
    ) -> RepositoryResult<Option<ReferenceRecord>>;

    /// Cheap existence probe used by row validation.
    async fn exists(&self, kind: ReferenceKind, code: &str) -> RepositoryResult<bool>;

    /// Insert a reference record, returning its id.
    async fn insert(&self, kind: ReferenceKind, code: &str, name: &str) -> RepositoryResult<i64>;
}

// ==========================================
// SQLite implementation
// ==========================================
pub struct SqliteReferenceRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteReferenceRepository {
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
impl ReferenceRepository for SqliteReferenceRepository {
    async fn find_id(&self, kind: ReferenceKind, code: &str) -> RepositoryResult<Option<i64>> {
        let conn = self.lock()?;
        let sql = format!("SELECT id FROM {} WHERE code = ?1", kind.table_name());
        let id = conn
            .query_row(&sql, params![code], |row| row.get(0))
            .optional()?;
        Ok(id)
    }

    async fn find_by_code(
        &self,
        kind: ReferenceKind,
        code: &str,
    ) -> RepositoryResult<Option<ReferenceRecord>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT id, code, name FROM {} WHERE code = ?1",
            kind.table_name()
        );
        let record = conn
            .query_row(&sql, params![code], |row| {
                Ok(ReferenceRecord {
                    id: row.get(0)?,
                    code: row.get(1)?,
                    name: row.get(2)?,
                })
            })
            .optional()?;
        Ok(record)
    }

    async fn exists(&self, kind: ReferenceKind, code: &str) -> RepositoryResult<bool> {
        let conn = self.lock()?;
        let sql = format!("SELECT 1 FROM {} WHERE code = ?1 LIMIT 1", kind.table_name());
        let found: Option<i64> = conn
            .query_row(&sql, params![code], |row| row.get(0))
            .optional()?;
        Ok(found.is_some())
    }

    async fn insert(&self, kind: ReferenceKind, code: &str, name: &str) -> RepositoryResult<i64> {
        let conn = self.lock()?;
        let sql = format!(
            "INSERT INTO {} (code, name) VALUES (?1, ?2)",
            kind.table_name()
        );
        conn.execute(&sql, params![code, name])?;
        Ok(conn.last_insert_rowid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn in_memory_repo() -> SqliteReferenceRepository {
        let conn = Connection::open_in_memory().unwrap();
        db::configure_sqlite_connection(&conn).unwrap();
        db::init_schema(&conn).unwrap();
        SqliteReferenceRepository::with_connection(Arc::new(Mutex::new(conn)))
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let repo = in_memory_repo();

        let id = repo
            .insert(ReferenceKind::Bank, "SBI", "State Bank")
            .await
            .unwrap();

        assert_eq!(repo.find_id(ReferenceKind::Bank, "SBI").await.unwrap(), Some(id));
        assert!(repo.exists(ReferenceKind::Bank, "SBI").await.unwrap());
        assert!(!repo.exists(ReferenceKind::Bank, "HDFC").await.unwrap());
        assert!(!repo.exists(ReferenceKind::Vendor, "SBI").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_code_is_unique_violation() {
        let repo = in_memory_repo();
        repo.insert(ReferenceKind::Site, "MUM01", "Mumbai 1")
            .await
            .unwrap();

        let err = repo
            .insert(ReferenceKind::Site, "MUM01", "Mumbai duplicate")
            .await
            .unwrap_err();
        assert!(err.is_constraint_violation());
    }
}
