//! XLSX write options

use cellforge_core::NumberFormatter;

use crate::policy::StringStorage;

/// Options for writing XLSX packages
#[derive(Debug, Clone, Default)]
pub struct XlsxWriteOptions {
    /// How `Number` cells are rendered (default: two decimals, trimmed)
    pub number_format: NumberFormatter,
    /// Shared vs inline placement of string cells
    pub string_storage: StringStorage,
    /// ZIP compression of package parts
    pub compression: Compression,
    /// Serialize worksheets on separate threads
    pub parallel: bool,
}

impl XlsxWriteOptions {
    /// Set the number formatter
    pub fn with_number_format(mut self, number_format: NumberFormatter) -> Self {
        self.number_format = number_format;
        self
    }

    /// Set string placement
    pub fn with_string_storage(mut self, storage: StringStorage) -> Self {
        self.string_storage = storage;
        self
    }

    /// Set compression
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Enable or disable parallel worksheet serialization
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Compression of ZIP entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// Deflate (what Excel writes)
    #[default]
    Deflated,
    /// No compression
    Stored,
}
