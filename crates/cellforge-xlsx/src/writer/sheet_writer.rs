//! Streaming worksheet XML writer
//!
//! Appends one worksheet document to a growable byte buffer, fragment by
//! fragment, and hands the finished buffer to a [`PartSink`] as a single
//! part. No element tree is built.
//!
//! Calls must follow the document order:
//!
//! ```text
//! Idle -> start_worksheet -> HeaderWritten
//!      -> write_column_width*            (only if columns were announced)
//!      -> start_sheet_data -> SheetDataOpen
//!      -> (start_row -> write_cell_* -> end_row)*
//!      -> end_sheet_data -> SheetDataClosed
//!      -> write_fragment*
//!      -> end_worksheet -> Finalized
//!      -> write_to / into_bytes
//! ```
//!
//! A call out of sequence returns [`XlsxError::InvalidState`] without
//! touching the buffer.

use cellforge_core::{CachedValue, NumberFormatter};

use crate::error::{XlsxError, XlsxResult};
use crate::escape::escape_into;
use crate::shared_strings::needs_preserve;
use crate::sink::PartSink;

const WORKSHEET_PROLOG: &[u8] = b"<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
<worksheet xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\" \
xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\">";

/// Position of a [`StreamingSheetWriter`] in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    Idle,
    HeaderWritten,
    SheetDataOpen,
    RowOpen,
    SheetDataClosed,
    Finalized,
}

/// Writes one worksheet document into a byte buffer
#[derive(Debug)]
pub struct StreamingSheetWriter {
    buf: Vec<u8>,
    state: WriterState,
    number_format: NumberFormatter,
    cols_open: bool,
    last_row: Option<u32>,
    rows_written: u32,
    cells_written: u64,
}

impl StreamingSheetWriter {
    /// Create a writer with an empty buffer
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a writer with `capacity` bytes reserved
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            state: WriterState::Idle,
            number_format: NumberFormatter::default(),
            cols_open: false,
            last_row: None,
            rows_written: 0,
            cells_written: 0,
        }
    }

    /// Use `number_format` for number cells
    pub fn with_number_format(mut self, number_format: NumberFormatter) -> Self {
        self.number_format = number_format;
        self
    }

    /// Current state
    pub fn state(&self) -> WriterState {
        self.state
    }

    /// Bytes written so far
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if nothing has been written
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Number of `<row>` elements started
    pub fn rows_written(&self) -> u32 {
        self.rows_written
    }

    /// Number of `<c>` elements written
    pub fn cells_written(&self) -> u64 {
        self.cells_written
    }

    fn expect(&self, state: WriterState, operation: &'static str) -> XlsxResult<()> {
        if self.state == state {
            Ok(())
        } else {
            Err(XlsxError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    /// Write the prolog, root element and `<dimension>`
    ///
    /// With `has_custom_columns`, a `<cols>` element is opened for
    /// [`write_column_width`](Self::write_column_width).
    pub fn start_worksheet(&mut self, dimension_ref: &str, has_custom_columns: bool) -> XlsxResult<()> {
        self.expect(WriterState::Idle, "start worksheet")?;

        self.buf.extend_from_slice(WORKSHEET_PROLOG);
        self.buf.extend_from_slice(b"<dimension ref=\"");
        escape_into(dimension_ref, &mut self.buf);
        self.buf.extend_from_slice(b"\"/>");

        if has_custom_columns {
            self.buf.extend_from_slice(b"<cols>");
            self.cols_open = true;
        }
        self.state = WriterState::HeaderWritten;
        Ok(())
    }

    /// Write a `<col>` width entry (0-based column)
    pub fn write_column_width(&mut self, col: u16, width: f64) -> XlsxResult<()> {
        self.expect(WriterState::HeaderWritten, "write column width")?;
        if !self.cols_open {
            return Err(XlsxError::InvalidState {
                operation: "write column width without announced columns",
                state: self.state,
            });
        }
        let width = NumberFormatter::round_trip().format(width)?;

        let mut n = itoa::Buffer::new();
        let col = n.format(col as u32 + 1);
        self.buf.extend_from_slice(b"<col min=\"");
        self.buf.extend_from_slice(col.as_bytes());
        self.buf.extend_from_slice(b"\" max=\"");
        self.buf.extend_from_slice(col.as_bytes());
        self.buf.extend_from_slice(b"\" width=\"");
        self.buf.extend_from_slice(width.as_bytes());
        self.buf.extend_from_slice(b"\" customWidth=\"1\"/>");
        Ok(())
    }

    /// Open `<sheetData>`, closing `<cols>` if it was opened
    pub fn start_sheet_data(&mut self) -> XlsxResult<()> {
        self.expect(WriterState::HeaderWritten, "start sheet data")?;
        if self.cols_open {
            self.buf.extend_from_slice(b"</cols>");
            self.cols_open = false;
        }
        self.buf.extend_from_slice(b"<sheetData>");
        self.state = WriterState::SheetDataOpen;
        Ok(())
    }

    /// Open a `<row>` (0-based index); rows must ascend strictly
    pub fn start_row(&mut self, row: u32) -> XlsxResult<()> {
        self.expect(WriterState::SheetDataOpen, "start row")?;
        if let Some(previous) = self.last_row {
            if row <= previous {
                return Err(XlsxError::RowOrder { row, previous });
            }
        }

        self.buf.extend_from_slice(b"<row r=\"");
        self.buf
            .extend_from_slice(itoa::Buffer::new().format(row as u64 + 1).as_bytes());
        self.buf.extend_from_slice(b"\">");

        self.last_row = Some(row);
        self.rows_written += 1;
        self.state = WriterState::RowOpen;
        Ok(())
    }

    /// Close the current `<row>`
    pub fn end_row(&mut self) -> XlsxResult<()> {
        self.expect(WriterState::RowOpen, "end row")?;
        self.buf.extend_from_slice(b"</row>");
        self.state = WriterState::SheetDataOpen;
        Ok(())
    }

    /// Write `<c r=".." [s=".."] [t=".."]>`, or the self-closing form when `empty`
    fn open_cell(&mut self, cell_ref: &str, style: u32, cell_type: Option<&[u8]>, empty: bool) {
        self.buf.extend_from_slice(b"<c r=\"");
        self.buf.extend_from_slice(cell_ref.as_bytes());
        self.buf.push(b'"');
        if style != 0 {
            self.buf.extend_from_slice(b" s=\"");
            self.buf
                .extend_from_slice(itoa::Buffer::new().format(style).as_bytes());
            self.buf.push(b'"');
        }
        if let Some(t) = cell_type {
            self.buf.extend_from_slice(b" t=\"");
            self.buf.extend_from_slice(t);
            self.buf.push(b'"');
        }
        if empty {
            self.buf.extend_from_slice(b"/>");
        } else {
            self.buf.push(b'>');
        }
        self.cells_written += 1;
    }

    fn write_value(&mut self, text: &[u8]) {
        self.buf.extend_from_slice(b"<v>");
        self.buf.extend_from_slice(text);
        self.buf.extend_from_slice(b"</v>");
    }

    /// Write a number cell
    ///
    /// Fails with [`XlsxError::Number`] for NaN or infinity.
    pub fn write_cell_number(&mut self, cell_ref: &str, value: f64, style: u32) -> XlsxResult<()> {
        self.expect(WriterState::RowOpen, "write number cell")?;
        let text = self.number_format.format(value)?;
        self.open_cell(cell_ref, style, None, false);
        self.write_value(text.as_bytes());
        self.buf.extend_from_slice(b"</c>");
        Ok(())
    }

    /// Write an integer cell
    pub fn write_cell_integer(&mut self, cell_ref: &str, value: i64, style: u32) -> XlsxResult<()> {
        self.expect(WriterState::RowOpen, "write integer cell")?;
        self.open_cell(cell_ref, style, None, false);
        self.write_value(itoa::Buffer::new().format(value).as_bytes());
        self.buf.extend_from_slice(b"</c>");
        Ok(())
    }

    /// Write a boolean cell (`t="b"`, value 1 or 0)
    pub fn write_cell_boolean(&mut self, cell_ref: &str, value: bool, style: u32) -> XlsxResult<()> {
        self.expect(WriterState::RowOpen, "write boolean cell")?;
        self.open_cell(cell_ref, style, Some(&b"b"[..]), false);
        self.write_value(if value { b"1" } else { b"0" });
        self.buf.extend_from_slice(b"</c>");
        Ok(())
    }

    /// Write a cell referencing the shared string table
    pub fn write_cell_shared_string(
        &mut self,
        cell_ref: &str,
        index: u32,
        style: u32,
    ) -> XlsxResult<()> {
        self.expect(WriterState::RowOpen, "write shared string cell")?;
        self.open_cell(cell_ref, style, Some(&b"s"[..]), false);
        self.write_value(itoa::Buffer::new().format(index).as_bytes());
        self.buf.extend_from_slice(b"</c>");
        Ok(())
    }

    /// Write a cell carrying its text inline
    pub fn write_cell_inline_string(
        &mut self,
        cell_ref: &str,
        text: &str,
        style: u32,
    ) -> XlsxResult<()> {
        self.expect(WriterState::RowOpen, "write inline string cell")?;
        self.open_cell(cell_ref, style, Some(&b"inlineStr"[..]), false);
        if needs_preserve(text) {
            self.buf.extend_from_slice(b"<is><t xml:space=\"preserve\">");
        } else {
            self.buf.extend_from_slice(b"<is><t>");
        }
        escape_into(text, &mut self.buf);
        self.buf.extend_from_slice(b"</t></is></c>");
        Ok(())
    }

    /// Write a formula cell with an optional cached result
    ///
    /// A leading `=` is dropped; `<f>` holds the bare expression.
    pub fn write_cell_formula(
        &mut self,
        cell_ref: &str,
        formula: &str,
        cached: Option<&CachedValue>,
        style: u32,
    ) -> XlsxResult<()> {
        self.expect(WriterState::RowOpen, "write formula cell")?;

        let cached_number = match cached {
            Some(CachedValue::Number(n)) => Some(self.number_format.format(*n)?),
            _ => None,
        };
        let cell_type: Option<&[u8]> = match cached {
            Some(CachedValue::String(_)) => Some(&b"str"[..]),
            Some(CachedValue::Boolean(_)) => Some(&b"b"[..]),
            _ => None,
        };

        self.open_cell(cell_ref, style, cell_type, false);
        self.buf.extend_from_slice(b"<f>");
        escape_into(formula.strip_prefix('=').unwrap_or(formula), &mut self.buf);
        self.buf.extend_from_slice(b"</f>");

        match cached {
            None => {}
            Some(CachedValue::Number(_)) => {
                if let Some(text) = cached_number {
                    self.write_value(text.as_bytes());
                }
            }
            Some(CachedValue::Integer(i)) => {
                self.write_value(itoa::Buffer::new().format(*i).as_bytes());
            }
            Some(CachedValue::Boolean(b)) => self.write_value(if *b { b"1" } else { b"0" }),
            Some(CachedValue::String(s)) => {
                self.buf.extend_from_slice(b"<v>");
                escape_into(s.as_str(), &mut self.buf);
                self.buf.extend_from_slice(b"</v>");
            }
        }
        self.buf.extend_from_slice(b"</c>");
        Ok(())
    }

    /// Write a cell with a style but no value
    pub fn write_cell_blank(&mut self, cell_ref: &str, style: u32) -> XlsxResult<()> {
        self.expect(WriterState::RowOpen, "write blank cell")?;
        self.open_cell(cell_ref, style, None, true);
        Ok(())
    }

    /// Close `<sheetData>`
    pub fn end_sheet_data(&mut self) -> XlsxResult<()> {
        self.expect(WriterState::SheetDataOpen, "end sheet data")?;
        self.buf.extend_from_slice(b"</sheetData>");
        self.state = WriterState::SheetDataClosed;
        Ok(())
    }

    /// Append a pre-built sibling element such as `<autoFilter>`
    ///
    /// Fragments land after `</sheetData>` in call order; the caller keeps
    /// them in schema order.
    pub fn write_fragment(&mut self, xml: &[u8]) -> XlsxResult<()> {
        self.expect(WriterState::SheetDataClosed, "write fragment")?;
        self.buf.extend_from_slice(xml);
        Ok(())
    }

    /// Close the root element
    pub fn end_worksheet(&mut self) -> XlsxResult<()> {
        self.expect(WriterState::SheetDataClosed, "end worksheet")?;
        self.buf.extend_from_slice(b"</worksheet>");
        self.state = WriterState::Finalized;
        Ok(())
    }

    /// Take the finished document
    pub fn into_bytes(self) -> XlsxResult<Vec<u8>> {
        self.expect(WriterState::Finalized, "take document")?;
        Ok(self.buf)
    }

    /// Hand the finished document to `sink` as `part_name`
    pub fn write_to<S: PartSink + ?Sized>(self, sink: &mut S, part_name: &str) -> XlsxResult<()> {
        let bytes = self.into_bytes()?;
        sink.write_part(part_name, &bytes)
    }
}

impl Default for StreamingSheetWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use pretty_assertions::assert_eq;

    fn body(writer: StreamingSheetWriter) -> String {
        let bytes = writer.into_bytes().unwrap();
        let xml = String::from_utf8(bytes).unwrap();
        let start = xml.find("<dimension").unwrap();
        xml[start..].to_string()
    }

    fn open_row() -> StreamingSheetWriter {
        let mut w = StreamingSheetWriter::new();
        w.start_worksheet("A1:A1", false).unwrap();
        w.start_sheet_data().unwrap();
        w.start_row(0).unwrap();
        w
    }

    fn finish(mut w: StreamingSheetWriter) -> StreamingSheetWriter {
        w.end_row().unwrap();
        w.end_sheet_data().unwrap();
        w.end_worksheet().unwrap();
        w
    }

    #[test]
    fn test_empty_sheet() {
        let mut w = StreamingSheetWriter::new();
        w.start_worksheet("A1:A1", false).unwrap();
        w.start_sheet_data().unwrap();
        w.end_sheet_data().unwrap();
        w.end_worksheet().unwrap();

        let xml = String::from_utf8(w.into_bytes().unwrap()).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>"));
        assert!(xml.contains("xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\""));
        assert!(xml.ends_with("<dimension ref=\"A1:A1\"/><sheetData></sheetData></worksheet>"));
    }

    #[test]
    fn test_cell_kinds() {
        let mut w = open_row();
        w.write_cell_number("A1", 123.40, 0).unwrap();
        w.write_cell_integer("B1", -42, 3).unwrap();
        w.write_cell_boolean("C1", true, 0).unwrap();
        w.write_cell_shared_string("D1", 7, 0).unwrap();
        w.write_cell_inline_string("E1", "a < b", 0).unwrap();
        w.write_cell_blank("F1", 2).unwrap();
        let w = finish(w);
        assert_eq!(w.cells_written(), 6);

        assert_eq!(
            body(w),
            "<dimension ref=\"A1:A1\"/><sheetData><row r=\"1\">\
<c r=\"A1\"><v>123.4</v></c>\
<c r=\"B1\" s=\"3\"><v>-42</v></c>\
<c r=\"C1\" t=\"b\"><v>1</v></c>\
<c r=\"D1\" t=\"s\"><v>7</v></c>\
<c r=\"E1\" t=\"inlineStr\"><is><t>a &lt; b</t></is></c>\
<c r=\"F1\" s=\"2\"/>\
</row></sheetData></worksheet>"
        );
    }

    #[test]
    fn test_formula_cells() {
        let mut w = open_row();
        w.write_cell_formula("A1", "=SUM(B1:C1)", Some(&CachedValue::Number(3001.0)), 0)
            .unwrap();
        w.write_cell_formula("B1", "=\"a\"&\"b\"", Some(&CachedValue::string("ab")), 0)
            .unwrap();
        w.write_cell_formula("C1", "A1>0", Some(&CachedValue::Boolean(false)), 0)
            .unwrap();
        w.write_cell_formula("D1", "=NOW()", None, 1).unwrap();

        assert_eq!(
            body(finish(w)),
            "<dimension ref=\"A1:A1\"/><sheetData><row r=\"1\">\
<c r=\"A1\"><f>SUM(B1:C1)</f><v>3001</v></c>\
<c r=\"B1\" t=\"str\"><f>&quot;a&quot;&amp;&quot;b&quot;</f><v>ab</v></c>\
<c r=\"C1\" t=\"b\"><f>A1&gt;0</f><v>0</v></c>\
<c r=\"D1\" s=\"1\"><f>NOW()</f></c>\
</row></sheetData></worksheet>"
        );
    }

    #[test]
    fn test_inline_string_preserves_edge_whitespace() {
        let mut w = open_row();
        w.write_cell_inline_string("A1", " x", 0).unwrap();
        let xml = body(finish(w));
        assert!(xml.contains("<is><t xml:space=\"preserve\"> x</t></is>"));
    }

    #[test]
    fn test_column_widths() {
        let mut w = StreamingSheetWriter::new();
        w.start_worksheet("A1:C3", true).unwrap();
        w.write_column_width(0, 12.5).unwrap();
        w.write_column_width(2, 20.0).unwrap();
        w.start_sheet_data().unwrap();
        w.end_sheet_data().unwrap();
        w.end_worksheet().unwrap();

        assert_eq!(
            body(w),
            "<dimension ref=\"A1:C3\"/><cols>\
<col min=\"1\" max=\"1\" width=\"12.5\" customWidth=\"1\"/>\
<col min=\"3\" max=\"3\" width=\"20\" customWidth=\"1\"/>\
</cols><sheetData></sheetData></worksheet>"
        );
    }

    #[test]
    fn test_out_of_order_calls_fail() {
        let mut w = StreamingSheetWriter::new();
        assert!(matches!(
            w.start_sheet_data(),
            Err(XlsxError::InvalidState {
                state: WriterState::Idle,
                ..
            })
        ));
        assert!(w.is_empty());

        w.start_worksheet("A1:A1", false).unwrap();
        // no columns were announced
        assert!(w.write_column_width(0, 10.0).is_err());
        w.start_sheet_data().unwrap();
        assert!(w.write_column_width(0, 10.0).is_err());
        assert!(w.write_cell_integer("A1", 1, 0).is_err());
        assert!(w.end_row().is_err());

        let before = w.len();
        assert!(w.write_fragment(b"<x/>").is_err());
        assert_eq!(w.len(), before);
    }

    #[test]
    fn test_rows_must_ascend() {
        let mut w = StreamingSheetWriter::new();
        w.start_worksheet("A1:A3", false).unwrap();
        w.start_sheet_data().unwrap();
        w.start_row(2).unwrap();
        w.end_row().unwrap();
        assert!(matches!(
            w.start_row(2),
            Err(XlsxError::RowOrder {
                row: 2,
                previous: 2
            })
        ));
        assert!(w.start_row(1).is_err());
        w.start_row(3).unwrap();
        assert_eq!(w.rows_written(), 2);
    }

    #[test]
    fn test_non_finite_number_leaves_buffer_untouched() {
        let mut w = open_row();
        let before = w.len();
        assert!(matches!(
            w.write_cell_number("A1", f64::NAN, 0),
            Err(XlsxError::Number(_))
        ));
        assert!(w
            .write_cell_formula("A1", "=1/0", Some(&CachedValue::Number(f64::INFINITY)), 0)
            .is_err());
        assert_eq!(w.len(), before);
        assert_eq!(w.cells_written(), 0);
    }

    #[test]
    fn test_write_to_requires_finalized() {
        let mut sink = MemorySink::new();
        let w = open_row();
        assert!(w.write_to(&mut sink, "xl/worksheets/sheet1.xml").is_err());
        assert!(sink.get("xl/worksheets/sheet1.xml").is_none());

        let w = finish(open_row());
        w.write_to(&mut sink, "xl/worksheets/sheet1.xml").unwrap();
        assert!(sink
            .get_str("xl/worksheets/sheet1.xml")
            .unwrap()
            .ends_with("</worksheet>"));
    }

    #[test]
    fn test_fragments_follow_sheet_data() {
        let mut w = StreamingSheetWriter::new();
        w.start_worksheet("A1:A1", false).unwrap();
        w.start_sheet_data().unwrap();
        w.end_sheet_data().unwrap();
        w.write_fragment(b"<autoFilter ref=\"A1:B2\"/>").unwrap();
        w.end_worksheet().unwrap();
        assert!(body(w).ends_with("</sheetData><autoFilter ref=\"A1:B2\"/></worksheet>"));
    }
}
