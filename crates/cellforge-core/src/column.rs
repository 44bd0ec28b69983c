//! Column layout

use std::collections::BTreeMap;

/// Default column width in characters
pub const DEFAULT_COLUMN_WIDTH: f64 = 8.43;

/// Column widths for a worksheet
///
/// Only columns with a width different from the default are tracked.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLayout {
    default_width: f64,
    widths: BTreeMap<u16, f64>,
}

impl ColumnLayout {
    /// Create a layout with the standard default width
    pub fn new() -> Self {
        Self {
            default_width: DEFAULT_COLUMN_WIDTH,
            widths: BTreeMap::new(),
        }
    }

    /// Default width applied to columns without a custom width
    pub fn default_width(&self) -> f64 {
        self.default_width
    }

    /// Width of a column
    pub fn width(&self, col: u16) -> f64 {
        self.widths.get(&col).copied().unwrap_or(self.default_width)
    }

    /// Set the width of a column
    pub fn set_width(&mut self, col: u16, width: f64) {
        self.widths.insert(col, width);
    }

    /// Reset a column to the default width
    pub fn reset_width(&mut self, col: u16) {
        self.widths.remove(&col);
    }

    /// Check if any column has a custom width
    pub fn has_custom_widths(&self) -> bool {
        !self.widths.is_empty()
    }

    /// Custom widths in ascending column order
    pub fn custom_widths(&self) -> impl Iterator<Item = (u16, f64)> + '_ {
        self.widths.iter().map(|(&col, &width)| (col, width))
    }
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_widths() {
        let mut layout = ColumnLayout::new();
        assert!(!layout.has_custom_widths());
        assert_eq!(layout.width(3), DEFAULT_COLUMN_WIDTH);

        layout.set_width(5, 20.0);
        layout.set_width(1, 12.5);
        assert_eq!(layout.width(5), 20.0);
        assert_eq!(
            layout.custom_widths().collect::<Vec<_>>(),
            vec![(1, 12.5), (5, 20.0)]
        );

        layout.reset_width(1);
        assert_eq!(layout.custom_widths().count(), 1);
    }
}
