// ==========================================
// Asset Ledger - sequence counter repository
// ==========================================
// The read-modify-write on a counter runs inside an IMMEDIATE
// transaction: the write lock is taken up front, so two connections
// can never both read the same current_value. Combined with the
// connection busy_timeout this is the SQLite equivalent of a
// pessimistic row lock with a bounded wait.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::sequence::generator::CounterKey;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Verifies the parent reference entities behind a counter key exist.
/// One check is registered per key scope at wiring time.
pub type ParentCheck =
    Box<dyn Fn(&Connection, &CounterKey) -> RepositoryResult<()> + Send + Sync>;

pub trait SequenceRepository: Send + Sync {
    /// Whether a parent check was registered for this scope. A missing
    /// scope is a wiring defect, not a per-request condition.
    fn has_scope(&self, scope: &str) -> bool;

    /// Fail fast when the key's parent entities do not exist. Called
    /// before any lock is taken, so no orphaned counter is created.
    fn verify_parents(&self, key: &CounterKey) -> RepositoryResult<()>;

    /// Atomically increment the counter for `key`, creating it at zero
    /// on first use, and return the new value.
    fn fetch_and_increment(&self, key: &CounterKey) -> RepositoryResult<i64>;

    /// Last issued value, if the counter exists.
    fn current_value(&self, key: &CounterKey) -> RepositoryResult<Option<i64>>;
}

// ==========================================
// SQLite implementation
// ==========================================
pub struct SqliteSequenceRepository {
    conn: Arc<Mutex<Connection>>,
    parent_checks: HashMap<String, ParentCheck>,
}

impl SqliteSequenceRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::ConnectionError(e.to_string()))?;
        Ok(Self::with_connection(Arc::new(Mutex::new(conn))))
    }

    pub fn with_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            conn,
            parent_checks: HashMap::new(),
        }
    }

    /// Register the parent check for a key scope. Wiring-time only.
    pub fn register_parent_check(&mut self, scope: impl Into<String>, check: ParentCheck) {
        self.parent_checks.insert(scope.into(), check);
    }

    fn lock(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| RepositoryError::LockError("connection mutex poisoned".to_string()))
    }
}

impl SequenceRepository for SqliteSequenceRepository {
    fn has_scope(&self, scope: &str) -> bool {
        self.parent_checks.contains_key(scope)
    }

    fn verify_parents(&self, key: &CounterKey) -> RepositoryResult<()> {
        let check = self.parent_checks.get(key.scope()).ok_or_else(|| {
            RepositoryError::InternalError(format!(
                "no parent check registered for scope '{}'",
                key.scope()
            ))
        })?;
        let conn = self.lock()?;
        check(&conn, key)
    }

    fn fetch_and_increment(&self, key: &CounterKey) -> RepositoryResult<i64> {
        let key_string = key.key_string();
        let now = Utc::now();

        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
            r#"
            INSERT INTO sequence_counter (counter_key, current_value, updated_at)
            VALUES (?1, 0, ?2)
            ON CONFLICT(counter_key) DO NOTHING
            "#,
            params![key_string, now],
        )?;

        let current: i64 = tx.query_row(
            "SELECT current_value FROM sequence_counter WHERE counter_key = ?1",
            params![key_string],
            |row| row.get(0),
        )?;

        let next = current + 1;
        tx.execute(
            "UPDATE sequence_counter SET current_value = ?1, updated_at = ?2 WHERE counter_key = ?3",
            params![next, now, key_string],
        )?;

        tx.commit()
            .map_err(|e| RepositoryError::TransactionError(e.to_string()))?;

        Ok(next)
    }

    fn current_value(&self, key: &CounterKey) -> RepositoryResult<Option<i64>> {
        let conn = self.lock()?;
        let value = conn
            .query_row(
                "SELECT current_value FROM sequence_counter WHERE counter_key = ?1",
                params![key.key_string()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn open_repo() -> SqliteSequenceRepository {
        let conn = Connection::open_in_memory().unwrap();
        db::configure_sqlite_connection(&conn).unwrap();
        db::init_schema(&conn).unwrap();
        let mut repo = SqliteSequenceRepository::with_connection(Arc::new(Mutex::new(conn)));
        repo.register_parent_check("test", Box::new(|_conn, _key| Ok(())));
        repo
    }

    #[test]
    fn test_first_increment_creates_counter_at_one() {
        let repo = open_repo();
        let key = CounterKey::new("test", ["A"]);

        assert_eq!(repo.current_value(&key).unwrap(), None);
        assert_eq!(repo.fetch_and_increment(&key).unwrap(), 1);
        assert_eq!(repo.fetch_and_increment(&key).unwrap(), 2);
        assert_eq!(repo.current_value(&key).unwrap(), Some(2));
    }

    #[test]
    fn test_counters_are_independent_per_key() {
        let repo = open_repo();
        let a = CounterKey::new("test", ["A"]);
        let b = CounterKey::new("test", ["B"]);

        assert_eq!(repo.fetch_and_increment(&a).unwrap(), 1);
        assert_eq!(repo.fetch_and_increment(&a).unwrap(), 2);
        assert_eq!(repo.fetch_and_increment(&b).unwrap(), 1);
    }

    #[test]
    fn test_unregistered_scope_is_internal_error() {
        let repo = open_repo();
        let key = CounterKey::new("unwired", ["A"]);

        assert!(!repo.has_scope("unwired"));
        let err = repo.verify_parents(&key).unwrap_err();
        assert!(matches!(err, RepositoryError::InternalError(_)));
    }
}
