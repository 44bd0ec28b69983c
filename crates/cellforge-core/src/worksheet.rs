//! Worksheet type

use crate::cell::{CachedValue, CellAddress, CellData, CellRange, CellStorage, CellValue};
use crate::column::ColumnLayout;
use crate::error::{Error, Result};
use crate::filter::AutoFilter;
use crate::number::{parse_integer, parse_number, ParseNumberError};
use crate::validation::DataValidation;
use crate::{MAX_COLS, MAX_ROWS};

/// A worksheet (single sheet in a workbook)
#[derive(Debug, Clone)]
pub struct Worksheet {
    /// Sheet name
    name: String,
    /// Sparse cell storage
    cells: CellStorage,
    /// Column widths
    columns: ColumnLayout,
    /// Data validations, in insertion order
    data_validations: Vec<DataValidation>,
    /// Auto filter
    auto_filter: Option<AutoFilter>,
}

impl Worksheet {
    /// Create a new worksheet with the given name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self::with_cells(name, CellStorage::new())
    }

    /// Create a worksheet around cells built elsewhere
    ///
    /// Positions are not checked; writers skip cells beyond the sheet limits.
    pub fn with_cells<S: Into<String>>(name: S, cells: CellStorage) -> Self {
        Self {
            name: name.into(),
            cells,
            columns: ColumnLayout::new(),
            data_validations: Vec::new(),
            auto_filter: None,
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the sheet name
    ///
    /// Use [`crate::Workbook::rename_worksheet`] to keep names unique.
    pub fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
    }

    // === Cell Access ===

    /// Get a cell by address string (e.g., "A1")
    pub fn cell(&self, address: &str) -> Result<Option<&CellData>> {
        let addr = CellAddress::parse(address)?;
        Ok(self.cells.get(addr.row, addr.col))
    }

    /// Get a cell by row and column indices
    pub fn cell_at(&self, row: u32, col: u16) -> Option<&CellData> {
        self.cells.get(row, col)
    }

    /// Get cell value (convenience method)
    pub fn get_value(&self, address: &str) -> Result<CellValue> {
        let addr = CellAddress::parse(address)?;
        Ok(self.get_value_at(addr.row, addr.col))
    }

    /// Get cell value by indices
    pub fn get_value_at(&self, row: u32, col: u16) -> CellValue {
        self.cells
            .get(row, col)
            .map(|c| c.value.clone())
            .unwrap_or_default()
    }

    /// Get a cell's style index by address string
    ///
    /// Returns 0 if the cell does not exist or has the default style.
    pub fn cell_style_index(&self, address: &str) -> Result<u32> {
        let addr = CellAddress::parse(address)?;
        Ok(self.cells.style_index(addr.row, addr.col))
    }

    /// Get a cell's style index by row/column
    pub fn cell_style_index_at(&self, row: u32, col: u16) -> u32 {
        self.cells.style_index(row, col)
    }

    /// Get the formula text at a cell position (if it's a formula)
    pub fn get_formula_at(&self, row: u32, col: u16) -> Option<&str> {
        self.cells
            .get(row, col)
            .and_then(|cell| cell.value.formula_text())
    }

    // === Cell Modification ===

    /// Set a cell value by address string
    pub fn set_cell_value<V: Into<CellValue>>(&mut self, address: &str, value: V) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_value_at(addr.row, addr.col, value)
    }

    /// Set a cell value by row and column indices
    pub fn set_cell_value_at<V: Into<CellValue>>(
        &mut self,
        row: u32,
        col: u16,
        value: V,
    ) -> Result<()> {
        self.validate_cell_position(row, col)?;
        self.cells.set_value(row, col, value.into());
        Ok(())
    }

    /// Set a cell from user-typed text
    ///
    /// Text starting with `=` becomes a formula, `TRUE`/`FALSE` (any case) a
    /// boolean, whole numbers an integer and other numeric text a number.
    /// Everything else is stored as a string.
    pub fn set_cell_text(&mut self, address: &str, text: &str) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_text_at(addr.row, addr.col, text)
    }

    /// Set a cell from user-typed text by indices
    pub fn set_cell_text_at(&mut self, row: u32, col: u16, text: &str) -> Result<()> {
        self.validate_cell_position(row, col)?;
        self.cells.set_value(row, col, coerce_text(text));
        Ok(())
    }

    /// Set a cell formula by address string
    pub fn set_cell_formula(&mut self, address: &str, formula: &str) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_formula_at(addr.row, addr.col, formula)
    }

    /// Set a cell formula by row and column indices
    pub fn set_cell_formula_at(&mut self, row: u32, col: u16, formula: &str) -> Result<()> {
        self.validate_cell_position(row, col)?;

        let formula = if formula.starts_with('=') {
            formula.to_string()
        } else {
            format!("={}", formula)
        };

        self.cells.set_value(row, col, CellValue::formula(formula));
        Ok(())
    }

    /// Set the cached result of a formula cell
    ///
    /// Fails if the cell is missing or does not hold a formula.
    pub fn set_formula_result(&mut self, row: u32, col: u16, result: CachedValue) -> Result<()> {
        let cell = self.cells.get_mut(row, col).ok_or_else(|| {
            Error::InvalidAddress(format!("cell at ({}, {}) not found", row, col))
        })?;

        match &mut cell.value {
            CellValue::Formula { cached, .. } => {
                *cached = Some(result);
                Ok(())
            }
            other => Err(Error::InvalidValueType {
                expected: "formula",
                actual: other.type_name(),
            }),
        }
    }

    /// Set a cell's style index by address string
    pub fn set_cell_style_index(&mut self, address: &str, style_index: u32) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_style_index_at(addr.row, addr.col, style_index)
    }

    /// Set a cell's style index by row and column indices
    pub fn set_cell_style_index_at(&mut self, row: u32, col: u16, style_index: u32) -> Result<()> {
        self.validate_cell_position(row, col)?;
        self.cells.set_style(row, col, style_index);
        Ok(())
    }

    /// Clear a cell
    pub fn clear_cell(&mut self, address: &str) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.cells.remove(addr.row, addr.col);
        Ok(())
    }

    /// Clear a cell by indices
    pub fn clear_cell_at(&mut self, row: u32, col: u16) {
        self.cells.remove(row, col);
    }

    // === Range Operations ===

    /// Get the used range (bounds of all non-default cells)
    pub fn used_range(&self) -> Option<CellRange> {
        self.cells.used_bounds()
    }

    /// Clear all cells in a range
    pub fn clear_range(&mut self, range: &CellRange) {
        for addr in range.cells() {
            self.cells.remove(addr.row, addr.col);
        }
    }

    // === Columns ===

    /// Get column width
    pub fn column_width(&self, col: u16) -> f64 {
        self.columns.width(col)
    }

    /// Set column width
    pub fn set_column_width(&mut self, col: u16, width: f64) -> Result<()> {
        if col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1));
        }
        if !width.is_finite() || width < 0.0 {
            return Err(Error::InvalidColumnWidth(width));
        }
        self.columns.set_width(col, width);
        Ok(())
    }

    /// Custom column widths in ascending column order
    pub fn custom_column_widths(&self) -> impl Iterator<Item = (u16, f64)> + '_ {
        self.columns.custom_widths()
    }

    /// Column layout
    pub fn columns(&self) -> &ColumnLayout {
        &self.columns
    }

    /// Mutable column layout, widths unchecked
    pub fn columns_mut(&mut self) -> &mut ColumnLayout {
        &mut self.columns
    }

    // === Data Validation ===

    /// Add a data validation rule
    ///
    /// # Example
    ///
    /// ```rust
    /// use cellforge_core::{Worksheet, DataValidation, CellRange};
    ///
    /// let mut ws = Worksheet::new("Test");
    /// let validation = DataValidation::list("Yes,No,Maybe")
    ///     .with_range(CellRange::parse("A1:A10").unwrap());
    /// ws.add_data_validation(validation);
    /// ```
    pub fn add_data_validation(&mut self, validation: DataValidation) {
        self.data_validations.push(validation);
    }

    /// Get all data validations
    pub fn data_validations(&self) -> &[DataValidation] {
        &self.data_validations
    }

    /// Get the first data validation covering a cell
    pub fn data_validation_at(&self, row: u32, col: u16) -> Option<&DataValidation> {
        self.data_validations
            .iter()
            .find(|v| v.applies_to(row, col))
    }

    /// Remove data validation by index
    pub fn remove_data_validation(&mut self, index: usize) -> Option<DataValidation> {
        if index < self.data_validations.len() {
            Some(self.data_validations.remove(index))
        } else {
            None
        }
    }

    /// Get the number of data validations
    pub fn data_validation_count(&self) -> usize {
        self.data_validations.len()
    }

    /// Clear all data validations
    pub fn clear_data_validations(&mut self) {
        self.data_validations.clear();
    }

    // === Auto Filter ===

    /// Set the auto filter, replacing any existing one
    pub fn set_auto_filter(&mut self, filter: AutoFilter) {
        self.auto_filter = Some(filter);
    }

    /// Get the auto filter
    pub fn auto_filter(&self) -> Option<&AutoFilter> {
        self.auto_filter.as_ref()
    }

    /// Get the auto filter for modification
    pub fn auto_filter_mut(&mut self) -> Option<&mut AutoFilter> {
        self.auto_filter.as_mut()
    }

    /// Remove the auto filter
    pub fn clear_auto_filter(&mut self) -> Option<AutoFilter> {
        self.auto_filter.take()
    }

    // === Internal ===

    fn validate_cell_position(&self, row: u32, col: u16) -> Result<()> {
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }
        if col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1));
        }
        Ok(())
    }

    /// Get the number of stored cells
    pub fn cell_count(&self) -> usize {
        self.cells.cell_count()
    }

    /// Check if the worksheet has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterate over all stored cells in unspecified order
    pub fn iter_cells(&self) -> impl Iterator<Item = (u32, u16, &CellData)> {
        self.cells.iter()
    }
}

impl Default for Worksheet {
    fn default() -> Self {
        Self::new("Sheet1")
    }
}

fn coerce_text(text: &str) -> CellValue {
    if text.starts_with('=') {
        return CellValue::formula(text);
    }
    if text.eq_ignore_ascii_case("true") {
        return CellValue::Boolean(true);
    }
    if text.eq_ignore_ascii_case("false") {
        return CellValue::Boolean(false);
    }

    match parse_integer(text) {
        Ok(n) => return CellValue::Integer(n),
        // too big for i64 but still a number
        Err(ParseNumberError::OutOfRange) => {}
        Err(ParseNumberError::Empty) => return CellValue::string(text),
        Err(ParseNumberError::InvalidFormat) => {}
    }

    match parse_number(text) {
        Ok(n) => CellValue::Number(n),
        Err(_) => CellValue::string(text),
    }
}
