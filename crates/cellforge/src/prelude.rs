//! Prelude module - common imports for cellforge users
//!
//! ```rust
//! use cellforge::prelude::*;
//! ```

pub use crate::{
    AutoFilter,
    CachedValue,
    CellAddress,
    CellRange,
    // Cell types
    CellValue,
    // Data validation types
    DataValidation,
    // Error types
    Error,
    FilterOperator,
    Result,
    SaveError,

    ValidationErrorStyle,
    ValidationOperator,
    ValidationType,
    // Main types
    Workbook,
    // Extension traits
    WorkbookExt,
    Worksheet,

    // I/O types
    XlsxWriteOptions,
    XlsxWriter,
};
