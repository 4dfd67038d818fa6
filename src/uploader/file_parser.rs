// ==========================================
// Asset Ledger - spreadsheet file parsers
// ==========================================
// Excel (.xlsx/.xls) via calamine, CSV via csv. Both yield RawRow
// records keyed by header title, with 1-based data-row numbers that
// track the physical file position: fully blank rows are dropped but
// still consume a row number, so the error report always points at the
// row the operator sees in their spreadsheet tool.
// ==========================================

use crate::domain::upload::RawRow;
use crate::uploader::error::UploadError;
use calamine::{open_workbook, Reader, Xlsx};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

pub trait FileParser: Send + Sync {
    fn parse_rows(&self, file_path: &Path) -> Result<Vec<RawRow>, UploadError>;
}

/// Header cell -> column title. Trims whitespace and the trailing '*'
/// the upload template uses to mark required columns, so a filled-in
/// template parses without edits.
fn normalize_header(raw: &str) -> String {
    raw.trim().trim_end_matches('*').trim_end().to_string()
}

fn build_row(
    headers: &[String],
    cells: impl Iterator<Item = String>,
    row_number: usize,
) -> Option<RawRow> {
    let mut map = HashMap::new();
    for (col_idx, value) in cells.enumerate() {
        if let Some(header) = headers.get(col_idx) {
            map.insert(header.clone(), value.trim().to_string());
        }
    }

    // Fully blank rows are dropped; the row number slot is kept.
    if map.values().all(|v| v.is_empty()) {
        return None;
    }

    Some(RawRow {
        row_number,
        cells: map,
    })
}

// ==========================================
// CSV parser
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_rows(&self, file_path: &Path) -> Result<Vec<RawRow>, UploadError> {
        if !file_path.exists() {
            return Err(UploadError::FileNotFound(
                file_path.display().to_string(),
            ));
        }

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // tolerate ragged row lengths
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(normalize_header)
            .collect();

        let mut rows = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            let record = result?;
            if let Some(row) = build_row(
                &headers,
                record.iter().map(|v| v.to_string()),
                row_idx + 1,
            ) {
                rows.push(row);
            }
        }

        Ok(rows)
    }
}

// ==========================================
// Excel parser
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_rows(&self, file_path: &Path) -> Result<Vec<RawRow>, UploadError> {
        if !file_path.exists() {
            return Err(UploadError::FileNotFound(
                file_path.display().to_string(),
            ));
        }

        let mut workbook: Xlsx<_> = open_workbook(file_path)
            .map_err(|e: calamine::XlsxError| UploadError::ExcelParseError(e.to_string()))?;

        let sheet_names = workbook.sheet_names();
        if sheet_names.is_empty() {
            return Err(UploadError::ExcelParseError(
                "workbook has no worksheets".to_string(),
            ));
        }

        let sheet_name = sheet_names[0].clone();
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| UploadError::ExcelParseError(e.to_string()))?;

        let mut sheet_rows = range.rows();
        let header_row = sheet_rows
            .next()
            .ok_or_else(|| UploadError::ExcelParseError("worksheet has no header row".to_string()))?;

        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| normalize_header(&cell.to_string()))
            .collect();

        let mut rows = Vec::new();
        for (row_idx, data_row) in sheet_rows.enumerate() {
            if let Some(row) = build_row(
                &headers,
                data_row.iter().map(|cell| cell.to_string()),
                row_idx + 1,
            ) {
                rows.push(row);
            }
        }

        Ok(rows)
    }
}

// ==========================================
// Extension-dispatching parser
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse_rows(&self, file_path: &Path) -> Result<Vec<RawRow>, UploadError> {
        let ext = file_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => CsvParser.parse_rows(file_path),
            "xlsx" | "xls" => ExcelParser.parse_rows(file_path),
            _ => Err(UploadError::UnsupportedFormat(ext)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(lines: &[&str]) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    #[test]
    fn test_csv_parser_basic() {
        let file = csv_file(&[
            "Asset Name,Bank Code",
            "Front Office ATM,SBI",
            "Back Office ATM,HDFC",
        ]);

        let rows = CsvParser.parse_rows(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row_number, 1);
        assert_eq!(rows[0].cell("Asset Name"), Some("Front Office ATM"));
        assert_eq!(rows[1].cell("Bank Code"), Some("HDFC"));
    }

    #[test]
    fn test_csv_parser_file_not_found() {
        let result = CsvParser.parse_rows(Path::new("does_not_exist.csv"));
        assert!(matches!(result, Err(UploadError::FileNotFound(_))));
    }

    #[test]
    fn test_blank_rows_dropped_but_numbering_preserved() {
        let file = csv_file(&[
            "Asset Name,Bank Code",
            "Front Office ATM,SBI",
            ",",
            "Back Office ATM,HDFC",
        ]);

        let rows = CsvParser.parse_rows(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
        // the blank physical row 2 still consumed its number
        assert_eq!(rows[0].row_number, 1);
        assert_eq!(rows[1].row_number, 3);
    }

    #[test]
    fn test_universal_parser_rejects_unknown_extension() {
        let result = UniversalFileParser.parse_rows(Path::new("upload.pdf"));
        assert!(matches!(result, Err(UploadError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_required_marker_stripped_from_headers() {
        let file = csv_file(&["Asset Name*,Bank Code", "Front Office ATM,SBI"]);

        let rows = CsvParser.parse_rows(file.path()).unwrap();
        assert_eq!(rows[0].cell("Asset Name"), Some("Front Office ATM"));
    }

    #[test]
    fn test_values_are_trimmed() {
        let file = csv_file(&["Asset Name,Bank Code", "  Front Office ATM  , SBI "]);

        let rows = CsvParser.parse_rows(file.path()).unwrap();
        assert_eq!(rows[0].cell("Asset Name"), Some("Front Office ATM"));
        assert_eq!(rows[0].cell("Bank Code"), Some("SBI"));
    }
}
