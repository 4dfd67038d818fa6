// ==========================================
// Asset Ledger - column mapping descriptors
// ==========================================
// Explicit per-record-type tables binding DTO fields to spreadsheet
// column titles. Replaces annotation/reflection-driven mapping with
// plain data: testable, and shared by the parser, the validator
// messages and the error report layout.
// ==========================================

use chrono::NaiveDate;

/// Binding of one DTO field to one spreadsheet column.
///
/// Defined once per record type as a static table; shared read-only
/// across all uploads of that type.
#[derive(Debug, Clone, Copy)]
pub struct ColumnDescriptor {
    /// DTO field name (snake_case).
    pub field: &'static str,
    /// Column title as shown in the sheet header.
    pub title: &'static str,
    /// Zero-based column position.
    pub order: usize,
    /// Required columns participate in the empty-row test and get a
    /// presence check during validation.
    pub required: bool,
    /// Example value for template generation.
    pub example: &'static str,
}

// ==========================================
// Cell parsing helpers
// ==========================================
// Validation-time typing of raw cell text. Parsing at DTO construction
// never fails; these are what the validators and converters call.

/// Parse a decimal cell. Accepts plain numbers and comma-grouped
/// figures ("1,25,000.50" or "125,000.50").
pub fn parse_decimal(value: &str) -> Option<f64> {
    let cleaned: String = value.chars().filter(|c| *c != ',').collect();
    cleaned.trim().parse::<f64>().ok()
}

/// Parse a date cell with the configured format.
pub fn parse_date(value: &str, format: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), format).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("125000.50"), Some(125_000.50));
        assert_eq!(parse_decimal("1,25,000.50"), Some(125_000.50));
        assert_eq!(parse_decimal("abc"), None);
        assert_eq!(parse_decimal(""), None);
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2025-04-18", "%Y-%m-%d"),
            NaiveDate::from_ymd_opt(2025, 4, 18)
        );
        assert_eq!(parse_date("18/04/2025", "%Y-%m-%d"), None);
    }
}
