//! # cellforge
//!
//! A Rust library for building spreadsheets in memory and writing them as
//! XLSX (Office Open XML).
//!
//! ## Features
//!
//! - Sparse cell model with typed values, formulas and cached results
//! - Data validations and auto filters
//! - Streaming worksheet serialization with shared or inline strings
//! - Optional parallel serialization of worksheets
//!
//! ## Example
//!
//! ```rust
//! use cellforge::prelude::*;
//!
//! // Create a new workbook
//! let mut workbook = Workbook::new();
//!
//! // Get the first worksheet
//! let sheet = workbook.worksheet_mut(0).unwrap();
//!
//! // Set cell values
//! sheet.set_cell_value("A1", "Hello").unwrap();
//! sheet.set_cell_value("B1", 42.0).unwrap();
//! sheet.set_cell_value("C1", true).unwrap();
//!
//! // Set a formula
//! sheet.set_cell_formula("D1", "=B1*2").unwrap();
//!
//! // Save to file
//! // workbook.save("output.xlsx").unwrap();
//! ```

pub mod prelude;

// Re-export core types
pub use cellforge_core::{
    parse_integer,
    parse_number,
    validate_sheet_name,
    // Filters
    AutoFilter,
    // Cell types
    CachedValue,
    CellAddress,
    CellData,
    CellRange,
    CellStorage,
    CellValue,
    ColumnLayout,
    Comparison,
    // Data validation types
    DataValidation,
    // Error types
    Error,
    FilterCondition,
    FilterCriterion,
    FilterJoin,
    FilterOperator,
    NumberFormatError,
    // Numbers
    NumberFormatter,
    ParseNumberError,
    Result,
    SharedString,
    ValidationErrorStyle,
    ValidationOperator,
    ValidationType,
    // Main types
    Workbook,
    Worksheet,

    DEFAULT_COLUMN_WIDTH,
    MAX_COLS,
    // Constants
    MAX_ROWS,
    MAX_SHEET_NAME_LEN,
};

// Re-export I/O types
pub use cellforge_xlsx::{
    Compression, MemorySink, PartSink, SharedStringTable, StringStorage, XlsxError, XlsxResult,
    XlsxWriteOptions, XlsxWriter, ZipSink,
};

use std::path::{Path, PathBuf};

/// Errors from [`WorkbookExt::save`]
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// The file extension names no format this crate writes
    #[error("unsupported file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// XLSX writing failed
    #[error(transparent)]
    Xlsx(#[from] XlsxError),
}

/// Extension trait for Workbook to add file output
pub trait WorkbookExt {
    /// Save the workbook to a file, choosing the format by extension
    fn save<P: AsRef<Path>>(&self, path: P) -> std::result::Result<(), SaveError>;

    /// Save with explicit XLSX options
    fn save_with_options<P: AsRef<Path>>(
        &self,
        path: P,
        options: &XlsxWriteOptions,
    ) -> std::result::Result<(), SaveError>;
}

impl WorkbookExt for Workbook {
    fn save<P: AsRef<Path>>(&self, path: P) -> std::result::Result<(), SaveError> {
        self.save_with_options(path, &XlsxWriteOptions::default())
    }

    fn save_with_options<P: AsRef<Path>>(
        &self,
        path: P,
        options: &XlsxWriteOptions,
    ) -> std::result::Result<(), SaveError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match extension.as_deref() {
            Some("xlsx") => Ok(XlsxWriter::write_file_with_options(self, path, options)?),
            _ => Err(SaveError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}
