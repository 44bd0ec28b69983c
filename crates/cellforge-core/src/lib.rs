//! # cellforge-core
//!
//! Core data structures for the cellforge spreadsheet library.
//!
//! This crate provides the fundamental types used throughout cellforge:
//! - [`CellValue`] - Represents cell values (strings, numbers, integers, booleans, formulas)
//! - [`CellAddress`] and [`CellRange`] - Cell addressing and ranges
//! - [`Workbook`], [`Worksheet`] - The main document structures
//! - [`DataValidation`] and [`AutoFilter`] - Sheet metadata consumed by writers
//! - [`NumberFormatter`] and [`parse_number`] - Locale-free number text conversion
//!
//! ## Example
//!
//! ```rust
//! use cellforge_core::{Workbook, CellValue};
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//!
//! // Using string addresses
//! sheet.set_cell_value("A1", "Hello").unwrap();
//! sheet.set_cell_value("B1", 42.5).unwrap();
//!
//! // Or using row/column indices (0-based)
//! sheet.set_cell_value_at(1, 0, CellValue::string("World")).unwrap();
//! sheet.set_cell_value_at(1, 1, CellValue::Integer(7)).unwrap();
//! ```

pub mod cell;
pub mod column;
pub mod error;
pub mod filter;
pub mod number;
pub mod validation;
pub mod workbook;
pub mod worksheet;

// Re-exports for convenience
pub use cell::{
    CachedValue, CellAddress, CellData, CellRange, CellStorage, CellValue, SharedString,
};
pub use column::{ColumnLayout, DEFAULT_COLUMN_WIDTH};
pub use error::{Error, Result};
pub use filter::{AutoFilter, FilterCondition, FilterCriterion, FilterJoin, FilterOperator};
pub use number::{parse_integer, parse_number, NumberFormatError, NumberFormatter, ParseNumberError};
pub use validation::{
    Comparison, DataValidation, ValidationErrorStyle, ValidationOperator, ValidationType,
};
pub use workbook::{validate_sheet_name, Workbook};
pub use worksheet::Worksheet;

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;
