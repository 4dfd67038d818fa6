// ==========================================
// Asset Ledger - upload configuration
// ==========================================

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Tuning knobs for the bulk-upload pipeline and code generator.
///
/// Loaded from a JSON file when one is provided, otherwise defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Hard cap on data rows per uploaded file. Files above the cap are
    /// rejected before any row is processed.
    pub max_rows: usize,

    /// Zero-padding width for generated sequence codes. Sequences wider
    /// than this widen the field; nothing is ever truncated.
    pub tag_padding_width: usize,

    /// Expected date format for date cells (chrono format string).
    pub date_format: String,

    /// Upper bound for the per-key lock wait in the sequence generator
    /// (milliseconds). Exceeding it fails the call with a lock timeout.
    pub lock_wait_ms: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_rows: 5_000,
            tag_padding_width: 4,
            date_format: "%Y-%m-%d".to_string(),
            lock_wait_ms: 2_000,
        }
    }
}

impl UploadConfig {
    /// Load from a JSON file. Missing keys fall back to defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = serde_json::from_str(&text)?;
        Ok(config)
    }

    /// The generator lock wait as a `Duration`. Pass this to
    /// `SequenceGenerator::new` when wiring.
    pub fn lock_wait(&self) -> Duration {
        Duration::from_millis(self.lock_wait_ms)
    }
}
