// ==========================================
// Shared integration-test helpers
// ==========================================
// Scratch SQLite databases, seeded reference data and a fully wired
// asset processor.
// ==========================================

use asset_ledger::config::UploadConfig;
use asset_ledger::db;
use asset_ledger::repository::{
    SqliteAssetRepository, SqliteReferenceRepository, SqliteSequenceRepository,
};
use asset_ledger::sequence::SequenceGenerator;
use asset_ledger::uploader::{asset_tag_parent_check, AssetProcessor, ASSET_TAG_SCOPE};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;

pub type WiredAssetProcessor =
    AssetProcessor<SqliteReferenceRepository, SqliteAssetRepository, SqliteSequenceRepository>;

/// Create a scratch database file with the core schema applied.
pub fn create_test_db() -> (NamedTempFile, String) {
    let file = NamedTempFile::new().expect("temp db file");
    let path = file.path().to_str().expect("utf-8 path").to_string();

    let conn = db::open_sqlite_connection(&path).expect("open db");
    db::init_schema(&conn).expect("init schema");

    (file, path)
}

/// Seed the master data uploads resolve natural keys against.
pub fn seed_reference_data(db_path: &str) {
    let conn = db::open_sqlite_connection(db_path).expect("open db");
    conn.execute_batch(
        r#"
        INSERT INTO asset_categories (code, name) VALUES
            ('ATM', 'ATM Machines'),
            ('SRV', 'Servers');
        INSERT INTO vendors (code, name) VALUES
            ('V1', 'Vendor One'),
            ('V2', 'Vendor Two');
        INSERT INTO banks (code, name) VALUES
            ('SBI', 'State Bank'),
            ('HDFC', 'HDFC Bank');
        INSERT INTO sites (code, name) VALUES
            ('MUM01', 'Mumbai Site 1');
        "#,
    )
    .expect("seed reference data");
}

/// Sequence generator wired for the asset-tag scope.
pub fn build_generator(db_path: &str) -> Arc<SequenceGenerator<SqliteSequenceRepository>> {
    build_generator_with_wait(db_path, UploadConfig::default().lock_wait())
}

pub fn build_generator_with_wait(
    db_path: &str,
    lock_wait: Duration,
) -> Arc<SequenceGenerator<SqliteSequenceRepository>> {
    let mut repo = SqliteSequenceRepository::new(db_path).expect("sequence repo");
    repo.register_parent_check(ASSET_TAG_SCOPE, asset_tag_parent_check());
    Arc::new(SequenceGenerator::new(repo, lock_wait))
}

/// Asset processor with real SQLite repositories on `db_path`. The
/// generator's lock wait comes from the config, as in real wiring.
pub fn build_asset_processor(db_path: &str, config: UploadConfig) -> WiredAssetProcessor {
    let reference_repo = SqliteReferenceRepository::new(db_path).expect("reference repo");
    let asset_repo = SqliteAssetRepository::new(db_path).expect("asset repo");
    let generator = build_generator_with_wait(db_path, config.lock_wait());
    AssetProcessor::new(reference_repo, asset_repo, generator, config)
}

/// Write CSV lines to a temp file with a .csv extension.
pub fn write_csv(lines: &[&str]) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .expect("temp csv");
    for line in lines {
        writeln!(file, "{}", line).expect("write csv line");
    }
    file.flush().expect("flush csv");
    file
}

pub const ASSET_HEADER: &str =
    "Asset Name,Category Code,Vendor Code,Bank Code,Site Code,Serial No,Cost,Purchase Date";
