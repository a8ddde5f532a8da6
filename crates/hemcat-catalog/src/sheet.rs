//! Spreadsheet sources and the reader seam over them.

use std::path::PathBuf;

use calamine::{open_workbook_auto, Data, Reader};
use hemcat_core::CatalogueConfig;

use crate::error::CatalogError;

/// One catalogue's spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadsheetSource {
    pub catalogue: String,
    pub path: PathBuf,
}

impl SpreadsheetSource {
    pub fn new(catalogue: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            catalogue: catalogue.into(),
            path: path.into(),
        }
    }
}

impl From<&CatalogueConfig> for SpreadsheetSource {
    fn from(config: &CatalogueConfig) -> Self {
        Self::new(config.name.clone(), config.path.clone())
    }
}

/// A sheet as text: the header row and the data rows below it.
///
/// Every cell is a string; blank cells are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

pub trait SheetReader {
    /// Reads the first sheet of `source`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::SourceMissing`] when the file is absent and
    /// [`CatalogError::SheetRead`] when it cannot be parsed.
    fn read_sheet(&self, source: &SpreadsheetSource) -> Result<RawSheet, CatalogError>;
}

/// Reads `.xlsx`/`.xls`/`.ods` workbooks from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkbookReader;

impl SheetReader for WorkbookReader {
    fn read_sheet(&self, source: &SpreadsheetSource) -> Result<RawSheet, CatalogError> {
        let path = &source.path;
        if !path.is_file() {
            return Err(CatalogError::SourceMissing {
                catalogue: source.catalogue.clone(),
                path: path.display().to_string(),
            });
        }

        let read_err = |reason: String| CatalogError::SheetRead {
            path: path.display().to_string(),
            reason,
        };

        let mut workbook = open_workbook_auto(path).map_err(|e| read_err(e.to_string()))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| read_err("workbook has no sheets".to_string()))?
            .map_err(|e| read_err(e.to_string()))?;

        let mut rows = range.rows();
        let headers = rows
            .next()
            .map(|row| row.iter().map(cell_text).collect())
            .unwrap_or_default();
        let rows = rows
            .map(|row| row.iter().map(cell_text).collect::<Vec<_>>())
            .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
            .collect();

        Ok(RawSheet { headers, rows })
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_reported_with_catalogue() {
        let dir = tempfile::tempdir().unwrap();
        let source = SpreadsheetSource::new("Line A", dir.path().join("absent.xlsx"));
        let err = WorkbookReader.read_sheet(&source).unwrap_err();
        match err {
            CatalogError::SourceMissing { catalogue, .. } => assert_eq!(catalogue, "Line A"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn corrupt_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"not a workbook").unwrap();
        let err = WorkbookReader
            .read_sheet(&SpreadsheetSource::new("Line A", &path))
            .unwrap_err();
        assert!(matches!(err, CatalogError::SheetRead { .. }));
    }

    #[test]
    fn cells_render_as_plain_text() {
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::String("Rose".to_string())), "Rose");
        assert_eq!(cell_text(&Data::Int(7)), "7");
        assert_eq!(cell_text(&Data::Float(1.0)), "1");
        assert_eq!(cell_text(&Data::Float(2.5)), "2.5");
    }
}
