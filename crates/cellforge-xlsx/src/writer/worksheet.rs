//! Worksheet serialization
//!
//! Walks a [`Worksheet`] once, in row-major order, and drives a
//! [`StreamingSheetWriter`] through the whole document.

use std::collections::BTreeMap;

use cellforge_core::{
    CachedValue, CellAddress, CellData, CellRange, CellValue, Worksheet, MAX_COLS, MAX_ROWS,
};

use super::filter::auto_filter_xml;
use super::sheet_writer::StreamingSheetWriter;
use super::validation::data_validations_xml;
use crate::error::XlsxResult;
use crate::options::XlsxWriteOptions;
use crate::shared_strings::StringInterner;

/// Dimension written for a sheet with no cells
const EMPTY_DIMENSION: &str = "A1:A1";

/// Rough size of one serialized cell, used to pre-size the buffer
const BYTES_PER_CELL: u64 = 40;

/// Counters from one worksheet pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SheetStats {
    pub rows: u32,
    pub cells: u64,
    /// Cells left out (beyond sheet limits, or numbers that are not finite)
    pub skipped: u64,
    /// Highest style index referenced by a written cell
    pub max_style_index: u32,
}

/// Serialize `sheet` into a finished worksheet document
///
/// Strings are placed inline or interned per `options.string_storage`.
pub fn serialize_worksheet<I>(
    sheet: &Worksheet,
    interner: &mut I,
    options: &XlsxWriteOptions,
) -> XlsxResult<(StreamingSheetWriter, SheetStats)>
where
    I: StringInterner + ?Sized,
{
    let mut stats = SheetStats::default();
    let rows = bucket_rows(sheet, &mut stats);
    let bounds = written_bounds(&rows);

    let dimension = bounds.map(|r| r.to_dimension_ref());
    let estimate: u64 = rows.values().map(|cells| cells.len() as u64).sum();
    let capacity = 512 + estimate.saturating_mul(BYTES_PER_CELL).min(usize::MAX as u64) as usize;

    let mut writer = StreamingSheetWriter::with_capacity(capacity)
        .with_number_format(options.number_format);

    let columns: Vec<(u16, f64)> = sheet
        .custom_column_widths()
        .filter(|&(col, width)| {
            if !width.is_finite() || col >= MAX_COLS {
                log::warn!(
                    "sheet '{}': skipping width {width} of column {col}",
                    sheet.name()
                );
                return false;
            }
            true
        })
        .collect();
    writer.start_worksheet(
        dimension.as_deref().unwrap_or(EMPTY_DIMENSION),
        !columns.is_empty(),
    )?;
    for (col, width) in columns {
        writer.write_column_width(col, width)?;
    }

    writer.start_sheet_data()?;
    let mut cell_ref = String::with_capacity(12);

    for (row, cells) in rows {
        writer.start_row(row)?;
        for (col, data) in cells {
            cell_ref.clear();
            CellAddress::new(row, col).write_a1(&mut cell_ref);
            write_cell(&mut writer, &cell_ref, data, interner, options)?;
            stats.max_style_index = stats.max_style_index.max(data.style_index);
        }
        writer.end_row()?;
    }
    writer.end_sheet_data()?;

    if let Some(xml) = sheet.auto_filter().map(auto_filter_xml).transpose()?.flatten() {
        writer.write_fragment(&xml)?;
    }
    if let Some(xml) = data_validations_xml(sheet.data_validations())? {
        writer.write_fragment(&xml)?;
    }
    writer.end_worksheet()?;

    stats.rows = writer.rows_written();
    stats.cells = writer.cells_written();
    log::debug!(
        "serialized sheet '{}': {} rows, {} cells, {} skipped, {} bytes",
        sheet.name(),
        stats.rows,
        stats.cells,
        stats.skipped,
        writer.len()
    );

    Ok((writer, stats))
}

type Rows<'a> = BTreeMap<u32, Vec<(u16, &'a CellData)>>;

/// Group writable cells by row, rows ascending, columns ascending within a row
///
/// A number that is not finite loses its value; the cell stays only when it
/// carries a style.
fn bucket_rows<'a>(sheet: &'a Worksheet, stats: &mut SheetStats) -> Rows<'a> {
    let mut rows: Rows<'a> = BTreeMap::new();

    for (row, col, data) in sheet.iter_cells() {
        if row >= MAX_ROWS || col >= MAX_COLS {
            log::warn!(
                "sheet '{}': skipping cell at row {row}, column {col} beyond sheet limits",
                sheet.name()
            );
            stats.skipped += 1;
            continue;
        }
        if data.is_default() {
            continue;
        }
        if let CellValue::Number(n) = data.value {
            if !n.is_finite() {
                log::warn!(
                    "sheet '{}': dropping {} at {}, not a finite number",
                    sheet.name(),
                    n,
                    CellAddress::new(row, col).to_a1_string()
                );
                stats.skipped += 1;
                if data.style_index == 0 {
                    continue;
                }
            }
        }
        rows.entry(row).or_default().push((col, data));
    }

    for cells in rows.values_mut() {
        cells.sort_unstable_by_key(|&(col, _)| col);
    }
    rows
}

/// Bounding range of the cells that will be written
fn written_bounds(rows: &Rows<'_>) -> Option<CellRange> {
    let (&first_row, _) = rows.first_key_value()?;
    let (&last_row, _) = rows.last_key_value()?;
    let (first_col, last_col) = rows
        .values()
        .filter_map(|cells| Some((cells.first()?.0, cells.last()?.0)))
        .fold((u16::MAX, 0), |(lo, hi), (a, b)| (lo.min(a), hi.max(b)));
    Some(CellRange::from_indices(first_row, first_col, last_row, last_col))
}

fn write_cell<I>(
    writer: &mut StreamingSheetWriter,
    cell_ref: &str,
    data: &CellData,
    interner: &mut I,
    options: &XlsxWriteOptions,
) -> XlsxResult<()>
where
    I: StringInterner + ?Sized,
{
    let style = data.style_index;
    match &data.value {
        CellValue::Empty => writer.write_cell_blank(cell_ref, style),
        CellValue::String(s) => {
            if options.string_storage.use_inline(s.as_str()) {
                writer.write_cell_inline_string(cell_ref, s.as_str(), style)
            } else {
                let index = interner.intern(s.as_str());
                writer.write_cell_shared_string(cell_ref, index, style)
            }
        }
        CellValue::Number(n) if !n.is_finite() => writer.write_cell_blank(cell_ref, style),
        CellValue::Number(n) => writer.write_cell_number(cell_ref, *n, style),
        CellValue::Integer(i) => writer.write_cell_integer(cell_ref, *i, style),
        CellValue::Boolean(b) => writer.write_cell_boolean(cell_ref, *b, style),
        CellValue::Formula { text, cached } => {
            let cached = match cached {
                Some(CachedValue::Number(n)) if !n.is_finite() => {
                    log::warn!("{cell_ref}: dropping cached result {n}, not a finite number");
                    None
                }
                other => other.as_ref(),
            };
            writer.write_cell_formula(cell_ref, text, cached, style)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::StringStorage;
    use crate::shared_strings::SharedStringTable;
    use cellforge_core::{AutoFilter, CellStorage, DataValidation, NumberFormatter};
    use pretty_assertions::assert_eq;

    fn serialize(sheet: &Worksheet, table: &mut SharedStringTable) -> (String, SheetStats) {
        serialize_with(sheet, table, &XlsxWriteOptions::default())
    }

    fn serialize_with(
        sheet: &Worksheet,
        table: &mut SharedStringTable,
        options: &XlsxWriteOptions,
    ) -> (String, SheetStats) {
        let (writer, stats) = serialize_worksheet(sheet, table, options).unwrap();
        (String::from_utf8(writer.into_bytes().unwrap()).unwrap(), stats)
    }

    fn sheet_data(xml: &str) -> &str {
        let start = xml.find("<sheetData>").unwrap();
        let end = xml.find("</sheetData>").unwrap() + "</sheetData>".len();
        &xml[start..end]
    }

    #[test]
    fn test_empty_sheet() {
        let sheet = Worksheet::new("Empty");
        let mut table = SharedStringTable::new();
        let (xml, stats) = serialize(&sheet, &mut table);

        assert!(xml.contains("<dimension ref=\"A1:A1\"/><sheetData></sheetData></worksheet>"));
        assert_eq!(stats, SheetStats::default());
        assert!(table.is_empty());
    }

    #[test]
    fn test_mixed_row() {
        let mut sheet = Worksheet::new("Sheet1");
        sheet.set_cell_value("A1", "Hi").unwrap();
        sheet.set_cell_value("B1", 1000.0).unwrap();
        sheet.set_cell_value("C1", 2001i64).unwrap();
        sheet
            .set_cell_value(
                "D1",
                CellValue::formula_with_result("=SUM(A1:C1)", CachedValue::Number(3001.0)),
            )
            .unwrap();

        let mut table = SharedStringTable::new();
        let (xml, stats) = serialize(&sheet, &mut table);

        assert!(xml.contains("<dimension ref=\"A1:D1\"/>"));
        assert_eq!(
            sheet_data(&xml),
            "<sheetData><row r=\"1\">\
<c r=\"A1\" t=\"s\"><v>0</v></c>\
<c r=\"B1\"><v>1000</v></c>\
<c r=\"C1\"><v>2001</v></c>\
<c r=\"D1\"><f>SUM(A1:C1)</f><v>3001</v></c>\
</row></sheetData>"
        );
        assert_eq!(table.get(0), Some("Hi"));
        assert_eq!(stats.rows, 1);
        assert_eq!(stats.cells, 4);
    }

    #[test]
    fn test_rows_and_columns_are_ordered() {
        let mut sheet = Worksheet::new("Sheet1");
        sheet.set_cell_value_at(9, 2, 3i64).unwrap();
        sheet.set_cell_value_at(0, 5, 2i64).unwrap();
        sheet.set_cell_value_at(9, 0, 1i64).unwrap();
        sheet.set_cell_value_at(0, 1, 0i64).unwrap();

        let mut table = SharedStringTable::new();
        let (xml, _) = serialize(&sheet, &mut table);

        assert!(xml.contains("<dimension ref=\"A1:F10\"/>"));
        assert_eq!(
            sheet_data(&xml),
            "<sheetData>\
<row r=\"1\"><c r=\"B1\"><v>0</v></c><c r=\"F1\"><v>2</v></c></row>\
<row r=\"10\"><c r=\"A10\"><v>1</v></c><c r=\"C10\"><v>3</v></c></row>\
</sheetData>"
        );
    }

    #[test]
    fn test_string_placement() {
        let mut sheet = Worksheet::new("Sheet1");
        sheet.set_cell_value("A1", "Category").unwrap();
        sheet.set_cell_value("A2", "Category").unwrap();
        sheet.set_cell_value("A3", "x").unwrap();
        sheet.set_cell_value("A4", "Tom & Jerry").unwrap();

        let mut table = SharedStringTable::new();
        let (xml, _) = serialize(&sheet, &mut table);

        assert!(xml.contains("<c r=\"A1\" t=\"s\"><v>0</v></c>"));
        assert!(xml.contains("<c r=\"A2\" t=\"s\"><v>0</v></c>"));
        assert!(xml.contains("<c r=\"A3\" t=\"inlineStr\"><is><t>x</t></is></c>"));
        assert!(xml.contains("<c r=\"A4\" t=\"inlineStr\"><is><t>Tom &amp; Jerry</t></is></c>"));
        assert_eq!(table.len(), 1);
        assert_eq!(table.frequency(0), 2);

        let options = XlsxWriteOptions::default().with_string_storage(StringStorage::AlwaysInline);
        let mut table = SharedStringTable::new();
        let (xml, _) = serialize_with(&sheet, &mut table, &options);
        assert!(!xml.contains("t=\"s\""));
        assert!(table.is_empty());
    }

    #[test]
    fn test_styled_blank_and_booleans() {
        let mut sheet = Worksheet::new("Sheet1");
        sheet.set_cell_style_index("B2", 4).unwrap();
        sheet.set_cell_value("A2", true).unwrap();

        let mut table = SharedStringTable::new();
        let (xml, stats) = serialize(&sheet, &mut table);

        assert!(xml.contains(
            "<row r=\"2\"><c r=\"A2\" t=\"b\"><v>1</v></c><c r=\"B2\" s=\"4\"/></row>"
        ));
        assert_eq!(stats.max_style_index, 4);
    }

    #[test]
    fn test_non_finite_numbers_are_skipped() {
        let mut sheet = Worksheet::new("Sheet1");
        sheet.set_cell_value("A1", f64::NAN).unwrap();
        sheet.set_cell_value("B1", 1.5).unwrap();
        sheet
            .set_cell_value(
                "C1",
                CellValue::formula_with_result("=1/0", CachedValue::Number(f64::INFINITY)),
            )
            .unwrap();

        let mut table = SharedStringTable::new();
        let (xml, stats) = serialize(&sheet, &mut table);

        assert!(!xml.contains("r=\"A1\""));
        assert!(xml.contains("<dimension ref=\"B1:C1\"/>"));
        assert!(xml.contains("<c r=\"B1\"><v>1.5</v></c>"));
        assert!(xml.contains("<c r=\"C1\"><f>1/0</f></c>"));
        assert_eq!(stats.skipped, 1);
    }

    #[test]
    fn test_non_finite_number_keeps_style() {
        let mut sheet = Worksheet::new("Sheet1");
        sheet.set_cell_value("A1", f64::INFINITY).unwrap();
        sheet.set_cell_style_index("A1", 3).unwrap();

        let mut table = SharedStringTable::new();
        let (xml, stats) = serialize(&sheet, &mut table);

        assert_eq!(
            sheet_data(&xml),
            "<sheetData><row r=\"1\"><c r=\"A1\" s=\"3\"/></row></sheetData>"
        );
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.max_style_index, 3);
    }

    #[test]
    fn test_non_finite_column_width_is_skipped() {
        let mut sheet = Worksheet::new("Sheet1");
        sheet.set_cell_value("A1", 1i64).unwrap();
        sheet.columns_mut().set_width(0, f64::NAN);
        sheet.columns_mut().set_width(2, 12.5);

        let mut table = SharedStringTable::new();
        let (xml, _) = serialize(&sheet, &mut table);
        assert!(xml.contains("<cols><col min=\"3\" max=\"3\" width=\"12.5\" customWidth=\"1\"/></cols>"));
        assert!(!xml.contains("min=\"1\""));

        let mut sheet = Worksheet::new("Sheet1");
        sheet.columns_mut().set_width(1, f64::INFINITY);
        let (xml, _) = serialize(&sheet, &mut table);
        assert!(!xml.contains("<cols>"));
    }

    #[test]
    fn test_filter_beyond_sheet_limits_is_skipped() {
        let mut sheet = Worksheet::new("Sheet1");
        sheet.set_cell_value("A1", "Region").unwrap();
        sheet.set_auto_filter(AutoFilter::new(CellRange::from_indices(0, 0, 5, 20_000)));

        let mut table = SharedStringTable::new();
        let (xml, _) = serialize(&sheet, &mut table);
        assert!(!xml.contains("<autoFilter"));
        assert!(xml.ends_with("</sheetData></worksheet>"));
    }

    #[test]
    fn test_cells_beyond_limits_are_skipped() {
        let mut cells = CellStorage::new();
        cells.set(0, 0, CellData::new(CellValue::Integer(1)));
        cells.set(MAX_ROWS + 5, 0, CellData::new(CellValue::Integer(2)));
        let sheet = Worksheet::with_cells("Sheet1", cells);

        let mut table = SharedStringTable::new();
        let (xml, stats) = serialize(&sheet, &mut table);

        assert!(xml.contains("<dimension ref=\"A1:A1\"/>"));
        assert_eq!(xml.matches("<row ").count(), 1);
        assert_eq!(stats.skipped, 1);
    }

    #[test]
    fn test_number_format_option() {
        let mut sheet = Worksheet::new("Sheet1");
        sheet.set_cell_value("A1", 3.14159).unwrap();

        let mut table = SharedStringTable::new();
        let (xml, _) = serialize(&sheet, &mut table);
        assert!(xml.contains("<v>3.14</v>"));

        let options =
            XlsxWriteOptions::default().with_number_format(NumberFormatter::with_decimal_places(4));
        let (xml, _) = serialize_with(&sheet, &mut table, &options);
        assert!(xml.contains("<v>3.1416</v>"));
    }

    #[test]
    fn test_columns_filter_and_validations_in_schema_order() {
        let mut sheet = Worksheet::new("Sheet1");
        sheet.set_cell_value("A1", "Region").unwrap();
        sheet.set_cell_value("B2", 10i64).unwrap();
        sheet.set_column_width(1, 18.0).unwrap();

        let range = CellRange::parse("A1:B2").unwrap();
        let mut filter = AutoFilter::new(range);
        filter.add_between(1, "5", "20").unwrap();
        sheet.set_auto_filter(filter);
        sheet.add_data_validation(
            DataValidation::list("North,South").with_range(CellRange::parse("A2").unwrap()),
        );

        let mut table = SharedStringTable::new();
        let (xml, _) = serialize(&sheet, &mut table);

        let dimension = xml.find("<dimension").unwrap();
        let cols = xml.find("<cols>").unwrap();
        let data = xml.find("<sheetData>").unwrap();
        let filter = xml.find("<autoFilter ref=\"A1:B2\">").unwrap();
        let validations = xml.find("<dataValidations count=\"1\">").unwrap();
        assert!(dimension < cols && cols < data && data < filter && filter < validations);
        assert!(xml.contains("<col min=\"2\" max=\"2\" width=\"18\" customWidth=\"1\"/>"));
        assert!(xml.contains("<filterColumn colId=\"1\"><customFilters and=\"1\">"));
        assert!(xml.ends_with("</dataValidations></worksheet>"));
    }
}
