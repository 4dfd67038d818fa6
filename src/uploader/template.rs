// ==========================================
// Asset Ledger - upload template builder
// ==========================================
// Writes the blank .xlsx template operators fill in before uploading:
// the descriptor column titles as a bold header row plus one example
// row. Required columns are marked with a trailing '*'.
// ==========================================

use crate::uploader::column_map::ColumnDescriptor;
use crate::uploader::error::UploadError;
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;
use tracing::info;

const SHEET_NAME: &str = "Upload";

pub struct TemplateBuilder;

impl TemplateBuilder {
    /// Build the template workbook in memory.
    pub fn build(descriptors: &[ColumnDescriptor]) -> Result<Workbook, UploadError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME)?;

        let header_format = Format::new().set_bold();

        for (col, descriptor) in descriptors.iter().enumerate() {
            let title = if descriptor.required {
                format!("{}*", descriptor.title)
            } else {
                descriptor.title.to_string()
            };
            worksheet.write_string_with_format(0, col as u16, &title, &header_format)?;
            worksheet.write_string(1, col as u16, descriptor.example)?;
        }

        Ok(workbook)
    }

    /// Build and save the template to disk.
    pub fn write(descriptors: &[ColumnDescriptor], path: &Path) -> Result<(), UploadError> {
        let mut workbook = Self::build(descriptors)?;
        workbook.save(path)?;
        info!(columns = descriptors.len(), path = %path.display(), "upload template written");
        Ok(())
    }
}
