//! Destinations for finished package parts

use std::io::{Seek, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::XlsxResult;
use crate::options::Compression;

/// Accepts complete, named package parts
pub trait PartSink {
    /// Store one part under `name` (e.g. `xl/worksheets/sheet1.xml`)
    fn write_part(&mut self, name: &str, bytes: &[u8]) -> XlsxResult<()>;
}

/// Writes parts as entries of a ZIP archive
pub struct ZipSink<W: Write + Seek> {
    zip: ZipWriter<W>,
    options: SimpleFileOptions,
}

impl<W: Write + Seek> ZipSink<W> {
    /// Start an archive on `writer`
    pub fn new(writer: W, compression: Compression) -> Self {
        let method = match compression {
            Compression::Deflated => CompressionMethod::Deflated,
            Compression::Stored => CompressionMethod::Stored,
        };
        Self {
            zip: ZipWriter::new(writer),
            options: SimpleFileOptions::default().compression_method(method),
        }
    }

    /// Write the central directory and return the underlying writer
    pub fn finish(self) -> XlsxResult<W> {
        Ok(self.zip.finish()?)
    }
}

impl<W: Write + Seek> PartSink for ZipSink<W> {
    fn write_part(&mut self, name: &str, bytes: &[u8]) -> XlsxResult<()> {
        self.zip.start_file(name, self.options)?;
        self.zip.write_all(bytes)?;
        Ok(())
    }
}

/// Keeps parts in memory, in the order they were written
#[derive(Debug, Default)]
pub struct MemorySink {
    parts: Vec<(String, Vec<u8>)>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a part by name
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, bytes)| bytes.as_slice())
    }

    /// Get a part as UTF-8 text
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Part names in write order
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|(n, _)| n.as_str())
    }

    /// Take all parts
    pub fn into_parts(self) -> Vec<(String, Vec<u8>)> {
        self.parts
    }
}

impl PartSink for MemorySink {
    fn write_part(&mut self, name: &str, bytes: &[u8]) -> XlsxResult<()> {
        self.parts.push((name.to_string(), bytes.to_vec()));
        Ok(())
    }
}
