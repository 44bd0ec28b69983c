//! XLSX error types

use thiserror::Error;

use crate::writer::WriterState;

/// Result type for XLSX operations
pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

/// Errors that can occur while writing XLSX
#[derive(Debug, Error)]
pub enum XlsxError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A streaming writer method was called out of sequence
    #[error("cannot {operation} while writer is {state:?}")]
    InvalidState {
        operation: &'static str,
        state: WriterState,
    },

    /// Rows must be written in strictly ascending order
    #[error("row {row} written after row {previous}")]
    RowOrder { row: u32, previous: u32 },

    /// A number that cannot be written to a cell
    #[error(transparent)]
    Number(#[from] cellforge_core::NumberFormatError),

    /// A package needs at least one worksheet
    #[error("workbook has no worksheets")]
    EmptyWorkbook,

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] cellforge_core::Error),

    /// The finished temporary file could not be moved into place
    #[error("could not persist output file: {0}")]
    Persist(#[from] tempfile::PersistError),
}
