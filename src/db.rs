// ==========================================
// Asset Ledger - SQLite connection setup
// ==========================================
// Goals:
// - One place for Connection::open PRAGMA behavior, so foreign keys are
//   never enabled in some modules and disabled in others
// - One busy_timeout for every connection, to soak up transient busy
//   errors under concurrent writers
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// Default busy_timeout (milliseconds)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Apply the unified PRAGMA set to a connection.
///
/// foreign_keys and busy_timeout are per-connection settings and must be
/// applied to every connection we open.
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Open a SQLite connection with the unified configuration applied.
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// Create the core tables if they do not exist yet.
///
/// Reference tables (banks, vendors, asset_categories, sites) hold the
/// already-persisted master data that uploads resolve natural keys
/// against. `sequence_counter` is owned exclusively by the sequence
/// generator.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS banks (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            code        TEXT NOT NULL UNIQUE,
            name        TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS vendors (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            code        TEXT NOT NULL UNIQUE,
            name        TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS asset_categories (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            code        TEXT NOT NULL UNIQUE,
            name        TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS sites (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            code        TEXT NOT NULL UNIQUE,
            name        TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS assets (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            asset_tag     TEXT NOT NULL UNIQUE,
            name          TEXT NOT NULL,
            category_id   INTEGER NOT NULL REFERENCES asset_categories(id),
            vendor_id     INTEGER NOT NULL REFERENCES vendors(id),
            bank_id       INTEGER NOT NULL REFERENCES banks(id),
            site_id       INTEGER REFERENCES sites(id),
            serial_no     TEXT NOT NULL UNIQUE,
            cost          REAL NOT NULL,
            purchase_date TEXT,
            created_at    TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS sequence_counter (
            counter_key   TEXT PRIMARY KEY,
            current_value INTEGER NOT NULL DEFAULT 0,
            updated_at    TEXT NOT NULL
        );
        "#,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        let n: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='sequence_counter'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(n, 1);
    }
}
