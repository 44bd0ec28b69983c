//! Cell storage implementation
//!
//! Sparse, unordered storage for spreadsheet cells. Only non-default cells
//! are stored; writers sort what they read.

use ahash::AHashMap;

use super::{CellAddress, CellRange, CellValue};

/// Complete data for a single cell
#[derive(Debug, Clone, PartialEq)]
pub struct CellData {
    /// The cell's value
    pub value: CellValue,
    /// Index into the workbook's cell formats (0 = default style)
    pub style_index: u32,
}

impl CellData {
    /// Create a new cell with a value and default style
    pub fn new(value: CellValue) -> Self {
        Self {
            value,
            style_index: 0,
        }
    }

    /// Create a new cell with a value and style
    pub fn with_style(value: CellValue, style_index: u32) -> Self {
        Self { value, style_index }
    }

    /// A cell is default when it has no value and no style
    pub fn is_default(&self) -> bool {
        self.value.is_empty() && self.style_index == 0
    }
}

impl Default for CellData {
    fn default() -> Self {
        Self::new(CellValue::Empty)
    }
}

/// Sparse hash-based storage for worksheet cells
///
/// Keyed by `(row, col)`, both 0-based. Iteration order is unspecified.
#[derive(Debug, Clone, Default)]
pub struct CellStorage {
    cells: AHashMap<(u32, u16), CellData>,
}

impl CellStorage {
    /// Create empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage with room for `capacity` cells
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cells: AHashMap::with_capacity(capacity),
        }
    }

    /// Store a cell, removing the slot if the data is default
    pub fn set(&mut self, row: u32, col: u16, data: CellData) {
        if data.is_default() {
            self.cells.remove(&(row, col));
        } else {
            self.cells.insert((row, col), data);
        }
    }

    /// Set a cell's value, keeping its style
    pub fn set_value(&mut self, row: u32, col: u16, value: CellValue) {
        let style_index = self.style_index(row, col);
        self.set(row, col, CellData::with_style(value, style_index));
    }

    /// Set a cell's style index, keeping its value
    pub fn set_style(&mut self, row: u32, col: u16, style_index: u32) {
        let value = self
            .cells
            .get(&(row, col))
            .map(|c| c.value.clone())
            .unwrap_or_default();
        self.set(row, col, CellData::with_style(value, style_index));
    }

    /// Get a cell
    pub fn get(&self, row: u32, col: u16) -> Option<&CellData> {
        self.cells.get(&(row, col))
    }

    /// Get a mutable reference to a cell
    pub fn get_mut(&mut self, row: u32, col: u16) -> Option<&mut CellData> {
        self.cells.get_mut(&(row, col))
    }

    /// Style index of a cell (0 if absent)
    pub fn style_index(&self, row: u32, col: u16) -> u32 {
        self.cells.get(&(row, col)).map_or(0, |c| c.style_index)
    }

    /// Remove a cell, returning its data
    pub fn remove(&mut self, row: u32, col: u16) -> Option<CellData> {
        self.cells.remove(&(row, col))
    }

    /// Number of stored cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Check if no cells are stored
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Remove all cells
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Bounding range over all non-default cells, recomputed on each call
    pub fn used_bounds(&self) -> Option<CellRange> {
        let mut iter = self
            .cells
            .iter()
            .filter(|(_, data)| !data.is_default())
            .map(|(&key, _)| key);
        let (first_row, first_col) = iter.next()?;

        let (mut min_row, mut max_row) = (first_row, first_row);
        let (mut min_col, mut max_col) = (first_col, first_col);
        for (row, col) in iter {
            min_row = min_row.min(row);
            max_row = max_row.max(row);
            min_col = min_col.min(col);
            max_col = max_col.max(col);
        }

        Some(CellRange::new(
            CellAddress::new(min_row, min_col),
            CellAddress::new(max_row, max_col),
        ))
    }

    /// Iterate over stored cells in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (u32, u16, &CellData)> {
        self.cells.iter().map(|(&(row, col), data)| (row, col, data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut storage = CellStorage::new();
        storage.set_value(0, 0, CellValue::Number(1.5));
        assert_eq!(storage.get(0, 0).unwrap().value, CellValue::Number(1.5));
        assert!(storage.get(0, 1).is_none());
        assert_eq!(storage.cell_count(), 1);
    }

    #[test]
    fn test_default_cells_are_dropped() {
        let mut storage = CellStorage::new();
        storage.set_value(3, 3, CellValue::Integer(1));
        storage.set_value(3, 3, CellValue::Empty);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_style_only_cell_is_kept() {
        let mut storage = CellStorage::new();
        storage.set_style(2, 4, 5);
        assert_eq!(storage.cell_count(), 1);
        assert_eq!(storage.style_index(2, 4), 5);

        // a value written later keeps the style
        storage.set_value(2, 4, CellValue::Boolean(true));
        assert_eq!(storage.get(2, 4).unwrap().style_index, 5);

        storage.set_style(2, 4, 0);
        storage.set_value(2, 4, CellValue::Empty);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_used_bounds() {
        let mut storage = CellStorage::new();
        assert!(storage.used_bounds().is_none());

        storage.set_value(5, 2, CellValue::Integer(1));
        storage.set_value(1, 7, CellValue::Integer(2));
        storage.set_style(9, 0, 1);

        let bounds = storage.used_bounds().unwrap();
        assert_eq!(bounds.to_a1_string(), "A2:H10");

        storage.remove(9, 0);
        assert_eq!(storage.used_bounds().unwrap().to_a1_string(), "C2:H6");
    }
}
