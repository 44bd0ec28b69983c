//! Shared string table
//!
//! Deduplicates string cell values into the workbook-level
//! `xl/sharedStrings.xml` part. An index, once issued, refers to the same
//! string until the table is reset; index 0 is the first string interned.

use std::sync::{Arc, Mutex, PoisonError};

use ahash::AHashMap;

use crate::escape::escape_into;

/// Interns strings and hands out stable indices
pub trait StringInterner {
    /// Get the index for `text`, adding it if unseen
    fn intern(&mut self, text: &str) -> u32;
}

/// Table of unique strings in first-seen order
#[derive(Debug, Default)]
pub struct SharedStringTable {
    strings: Vec<Arc<str>>,
    index: AHashMap<Arc<str>, u32>,
    frequency: Vec<u32>,
}

impl SharedStringTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the index for `text`, adding it if unseen
    pub fn intern(&mut self, text: &str) -> u32 {
        if let Some(&idx) = self.index.get(text) {
            self.frequency[idx as usize] += 1;
            return idx;
        }

        let idx = self.strings.len() as u32;
        let s: Arc<str> = Arc::from(text);
        self.strings.push(Arc::clone(&s));
        self.index.insert(s, idx);
        self.frequency.push(1);
        idx
    }

    /// Strings in index order
    pub fn strings(&self) -> impl ExactSizeIterator<Item = &str> {
        self.strings.iter().map(|s| s.as_ref())
    }

    /// Get a string by index
    pub fn get(&self, index: u32) -> Option<&str> {
        self.strings.get(index as usize).map(|s| s.as_ref())
    }

    /// Number of times a string was interned
    pub fn frequency(&self, index: u32) -> u32 {
        self.frequency.get(index as usize).copied().unwrap_or(0)
    }

    /// Number of unique strings
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Total number of references across all strings
    pub fn total_references(&self) -> u64 {
        self.frequency.iter().map(|&f| f as u64).sum()
    }

    /// Clear all strings and counters
    pub fn reset(&mut self) {
        self.strings.clear();
        self.index.clear();
        self.frequency.clear();
    }

    /// Render `xl/sharedStrings.xml`
    pub fn to_xml(&self) -> Vec<u8> {
        let payload: usize = self.strings.iter().map(|s| s.len() + 16).sum();
        let mut buf = Vec::with_capacity(256 + payload);

        buf.extend_from_slice(
            b"<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
<sst xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\" count=\"",
        );
        buf.extend_from_slice(itoa::Buffer::new().format(self.total_references()).as_bytes());
        buf.extend_from_slice(b"\" uniqueCount=\"");
        buf.extend_from_slice(itoa::Buffer::new().format(self.strings.len()).as_bytes());
        buf.extend_from_slice(b"\">");

        for s in &self.strings {
            if needs_preserve(s) {
                buf.extend_from_slice(b"<si><t xml:space=\"preserve\">");
            } else {
                buf.extend_from_slice(b"<si><t>");
            }
            escape_into(s, &mut buf);
            buf.extend_from_slice(b"</t></si>");
        }

        buf.extend_from_slice(b"</sst>");
        buf
    }
}

impl StringInterner for SharedStringTable {
    fn intern(&mut self, text: &str) -> u32 {
        SharedStringTable::intern(self, text)
    }
}

/// Interning through a lock, for sheets serialized on several threads
impl StringInterner for &Mutex<SharedStringTable> {
    fn intern(&mut self, text: &str) -> u32 {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .intern(text)
    }
}

/// Leading or trailing whitespace is dropped by XML readers unless preserved
pub(crate) fn needs_preserve(text: &str) -> bool {
    text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace)
}
