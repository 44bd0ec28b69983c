//! # cellforge-xlsx
//!
//! Streaming XLSX (Office Open XML) writer for cellforge.
//!
//! Each worksheet is serialized in one row-major pass into a byte buffer by
//! a [`StreamingSheetWriter`]; strings are either written inline or
//! deduplicated into a workbook-wide [`SharedStringTable`]. Finished parts go
//! to a [`PartSink`], normally a ZIP archive.

pub mod error;
pub mod escape;
pub mod options;
pub mod policy;
pub mod shared_strings;
pub mod sink;
pub mod writer;

mod styles;

pub use error::{XlsxError, XlsxResult};
pub use options::{Compression, XlsxWriteOptions};
pub use policy::{should_use_inline, StringStorage};
pub use shared_strings::{SharedStringTable, StringInterner};
pub use sink::{MemorySink, PartSink, ZipSink};
pub use writer::{serialize_worksheet, SheetStats, StreamingSheetWriter, WriterState, XlsxWriter};
