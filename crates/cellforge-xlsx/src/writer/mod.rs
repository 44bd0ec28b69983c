//! XLSX writer
//!
//! Worksheets are serialized first, each straight into the sink, so a
//! sequential save buffers one sheet document at a time. The workbook-level
//! parts that depend on the shared string table follow.

mod filter;
mod sheet_writer;
mod validation;
mod worksheet;

pub use sheet_writer::{StreamingSheetWriter, WriterState};
pub use worksheet::{serialize_worksheet, SheetStats};

use std::io::{Seek, Write};
use std::path::Path;
#[cfg(feature = "parallel")]
use std::sync::{Mutex, PoisonError};

#[cfg(feature = "parallel")]
use cellforge_core::Worksheet;
use cellforge_core::Workbook;
use tempfile::NamedTempFile;

use crate::error::{XlsxError, XlsxResult};
use crate::escape::escape;
use crate::options::XlsxWriteOptions;
use crate::shared_strings::SharedStringTable;
use crate::sink::{PartSink, ZipSink};
use crate::styles::default_styles_xml;

/// XLSX file writer
pub struct XlsxWriter;

impl XlsxWriter {
    /// Write a workbook to a file path
    pub fn write_file<P: AsRef<Path>>(workbook: &Workbook, path: P) -> XlsxResult<()> {
        Self::write_file_with_options(workbook, path, &XlsxWriteOptions::default())
    }

    /// Write a workbook to a file path with options
    ///
    /// The package is built in a temporary file next to `path` and moved
    /// into place once complete.
    pub fn write_file_with_options<P: AsRef<Path>>(
        workbook: &Workbook,
        path: P,
        options: &XlsxWriteOptions,
    ) -> XlsxResult<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)?;
        Self::write_with_options(workbook, tmp.as_file_mut(), options)?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(path)?;
        Ok(())
    }

    /// Write a workbook to a writer
    pub fn write<W: Write + Seek>(workbook: &Workbook, writer: W) -> XlsxResult<()> {
        Self::write_with_options(workbook, writer, &XlsxWriteOptions::default())
    }

    /// Write a workbook to a writer with options
    pub fn write_with_options<W: Write + Seek>(
        workbook: &Workbook,
        writer: W,
        options: &XlsxWriteOptions,
    ) -> XlsxResult<()> {
        let mut sink = ZipSink::new(writer, options.compression);
        Self::write_to_sink(workbook, &mut sink, options)?;
        sink.finish()?;
        Ok(())
    }

    /// Write every package part of a workbook to `sink`
    pub fn write_to_sink<S: PartSink + ?Sized>(
        workbook: &Workbook,
        sink: &mut S,
        options: &XlsxWriteOptions,
    ) -> XlsxResult<()> {
        if workbook.is_empty() {
            return Err(XlsxError::EmptyWorkbook);
        }

        let (strings, max_style_index) = if options.parallel && workbook.sheet_count() > 1 {
            Self::write_worksheets_parallel(workbook, sink, options)?
        } else {
            Self::write_worksheets(workbook, sink, options)?
        };

        log::debug!(
            "shared strings: {} unique, {} references",
            strings.len(),
            strings.total_references()
        );
        let has_shared_strings = !strings.is_empty();
        if has_shared_strings {
            sink.write_part("xl/sharedStrings.xml", &strings.to_xml())?;
        }

        sink.write_part(
            "xl/styles.xml",
            default_styles_xml(max_style_index.saturating_add(1)).as_bytes(),
        )?;
        Self::write_workbook_xml(sink, workbook)?;
        Self::write_workbook_rels(sink, workbook, has_shared_strings)?;
        Self::write_root_rels(sink)?;
        Self::write_content_types(sink, workbook, has_shared_strings)?;
        Ok(())
    }

    fn write_worksheets<S: PartSink + ?Sized>(
        workbook: &Workbook,
        sink: &mut S,
        options: &XlsxWriteOptions,
    ) -> XlsxResult<(SharedStringTable, u32)> {
        let mut strings = SharedStringTable::new();
        let mut max_style_index = 0;

        for (i, sheet) in workbook.worksheets().enumerate() {
            let (writer, stats) = serialize_worksheet(sheet, &mut strings, options)?;
            max_style_index = max_style_index.max(stats.max_style_index);
            writer.write_to(sink, &sheet_part_name(i))?;
        }
        Ok((strings, max_style_index))
    }

    /// Serialize sheets on the rayon pool; parts still go out in sheet order
    #[cfg(feature = "parallel")]
    fn write_worksheets_parallel<S: PartSink + ?Sized>(
        workbook: &Workbook,
        sink: &mut S,
        options: &XlsxWriteOptions,
    ) -> XlsxResult<(SharedStringTable, u32)> {
        use rayon::prelude::*;

        let strings = Mutex::new(SharedStringTable::new());
        let sheets: Vec<&Worksheet> = workbook.worksheets().collect();

        let results: Vec<XlsxResult<(StreamingSheetWriter, SheetStats)>> = sheets
            .par_iter()
            .map(|sheet| {
                let mut interner = &strings;
                serialize_worksheet(sheet, &mut interner, options)
            })
            .collect();

        let mut max_style_index = 0;
        for (i, result) in results.into_iter().enumerate() {
            let (writer, stats) = result?;
            max_style_index = max_style_index.max(stats.max_style_index);
            writer.write_to(sink, &sheet_part_name(i))?;
        }

        let strings = strings.into_inner().unwrap_or_else(PoisonError::into_inner);
        Ok((strings, max_style_index))
    }

    #[cfg(not(feature = "parallel"))]
    fn write_worksheets_parallel<S: PartSink + ?Sized>(
        workbook: &Workbook,
        sink: &mut S,
        options: &XlsxWriteOptions,
    ) -> XlsxResult<(SharedStringTable, u32)> {
        log::debug!("built without the `parallel` feature, serializing sheets in order");
        Self::write_worksheets(workbook, sink, options)
    }

    fn write_content_types<S: PartSink + ?Sized>(
        sink: &mut S,
        workbook: &Workbook,
        has_shared_strings: bool,
    ) -> XlsxResult<()> {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
    <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
        );

        for i in 0..workbook.sheet_count() {
            content.push_str(&format!(
                r#"
    <Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
                i + 1
            ));
        }

        if has_shared_strings {
            content.push_str(
                r#"
    <Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>"#,
            );
        }

        content.push_str("\n</Types>");
        sink.write_part("[Content_Types].xml", content.as_bytes())
    }

    fn write_root_rels<S: PartSink + ?Sized>(sink: &mut S) -> XlsxResult<()> {
        let content = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

        sink.write_part("_rels/.rels", content.as_bytes())
    }

    fn write_workbook_xml<S: PartSink + ?Sized>(sink: &mut S, workbook: &Workbook) -> XlsxResult<()> {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
    <sheets>"#,
        );

        for (i, sheet) in workbook.worksheets().enumerate() {
            content.push_str(&format!(
                r#"
        <sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                escape(sheet.name()),
                i + 1,
                i + 1
            ));
        }

        content.push_str(
            r#"
    </sheets>
</workbook>"#,
        );

        sink.write_part("xl/workbook.xml", content.as_bytes())
    }

    fn write_workbook_rels<S: PartSink + ?Sized>(
        sink: &mut S,
        workbook: &Workbook,
        has_shared_strings: bool,
    ) -> XlsxResult<()> {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );

        for i in 0..workbook.sheet_count() {
            content.push_str(&format!(
                r#"
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                i + 1,
                i + 1
            ));
        }

        let styles_rid = workbook.sheet_count() + 1;
        content.push_str(&format!(
            r#"
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
            styles_rid
        ));

        if has_shared_strings {
            content.push_str(&format!(
                r#"
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>"#,
                styles_rid + 1
            ));
        }

        content.push_str("\n</Relationships>");
        sink.write_part("xl/_rels/workbook.xml.rels", content.as_bytes())
    }
}

fn sheet_part_name(index: usize) -> String {
    format!("xl/worksheets/sheet{}.xml", index + 1)
}
