//! Worksheet auto filter
//!
//! An auto filter covers a header range and carries per-column criteria.
//! Conditions are kept in insertion order; writers group them by column.

use std::collections::BTreeMap;

use crate::cell::CellRange;
use crate::error::{Error, Result};

/// How conditions on the same column combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FilterJoin {
    /// Any condition may match
    #[default]
    Or,
    /// All conditions must match
    And,
}

/// Comparison operator of a custom filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FilterOperator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl FilterOperator {
    /// Get the XLSX operator string
    pub fn xlsx_operator(&self) -> &'static str {
        match self {
            FilterOperator::Equal => "equal",
            FilterOperator::NotEqual => "notEqual",
            FilterOperator::GreaterThan => "greaterThan",
            FilterOperator::GreaterThanOrEqual => "greaterThanOrEqual",
            FilterOperator::LessThan => "lessThan",
            FilterOperator::LessThanOrEqual => "lessThanOrEqual",
        }
    }
}

/// What a filter condition tests
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FilterCriterion {
    /// Compare each cell against a value
    Custom {
        operator: FilterOperator,
        value: String,
    },
    /// Keep the top (or bottom) N items or percent
    Top10 {
        top: bool,
        percent: bool,
        value: f64,
    },
    /// Keep cells whose text is one of the listed values
    Values(Vec<String>),
}

/// A criterion applied to one column
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterCondition {
    /// Absolute 0-based column index on the sheet
    pub column: u16,
    pub criterion: FilterCriterion,
}

/// Auto filter over a range
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AutoFilter {
    /// Filtered range, header row included
    pub range: CellRange,
    conditions: Vec<FilterCondition>,
    joins: BTreeMap<u16, FilterJoin>,
}

impl AutoFilter {
    /// Create a filter with no conditions (dropdown buttons only)
    pub fn new(range: CellRange) -> Self {
        Self {
            range,
            conditions: Vec::new(),
            joins: BTreeMap::new(),
        }
    }

    /// Add a condition on an absolute column
    ///
    /// Fails if the column lies outside the filter range.
    pub fn add_condition(&mut self, column: u16, criterion: FilterCriterion) -> Result<()> {
        if column < self.range.start.col || column > self.range.end.col {
            return Err(Error::InvalidRange(format!(
                "column {} is outside filter range {}",
                column, self.range
            )));
        }
        self.conditions.push(FilterCondition { column, criterion });
        Ok(())
    }

    /// Add a custom comparison
    pub fn add_custom(
        &mut self,
        column: u16,
        operator: FilterOperator,
        value: impl Into<String>,
    ) -> Result<()> {
        self.add_condition(
            column,
            FilterCriterion::Custom {
                operator,
                value: value.into(),
            },
        )
    }

    /// Keep values between `min` and `max`, both inclusive
    ///
    /// Stored as two conditions on the same column joined with And.
    pub fn add_between(
        &mut self,
        column: u16,
        min: impl Into<String>,
        max: impl Into<String>,
    ) -> Result<()> {
        self.add_custom(column, FilterOperator::GreaterThanOrEqual, min)?;
        self.add_custom(column, FilterOperator::LessThanOrEqual, max)?;
        self.set_join(column, FilterJoin::And);
        Ok(())
    }

    /// Keep the top or bottom `value` items (or percent)
    pub fn add_top10(&mut self, column: u16, top: bool, percent: bool, value: f64) -> Result<()> {
        self.add_condition(
            column,
            FilterCriterion::Top10 {
                top,
                percent,
                value,
            },
        )
    }

    /// Keep cells matching one of `values`
    pub fn add_values<I, S>(&mut self, column: u16, values: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.add_condition(column, FilterCriterion::Values(values))
    }

    /// Set how conditions on a column combine
    pub fn set_join(&mut self, column: u16, join: FilterJoin) {
        self.joins.insert(column, join);
    }

    /// Join mode of a column (Or unless set)
    pub fn join(&self, column: u16) -> FilterJoin {
        self.joins.get(&column).copied().unwrap_or_default()
    }

    /// All conditions in insertion order
    pub fn conditions(&self) -> &[FilterCondition] {
        &self.conditions
    }

    /// Conditions grouped by column, columns ascending
    pub fn columns(&self) -> BTreeMap<u16, Vec<&FilterCriterion>> {
        let mut grouped: BTreeMap<u16, Vec<&FilterCriterion>> = BTreeMap::new();
        for condition in &self.conditions {
            grouped
                .entry(condition.column)
                .or_default()
                .push(&condition.criterion);
        }
        grouped
    }

    /// Remove all conditions on a column
    pub fn clear_column(&mut self, column: u16) {
        self.conditions.retain(|c| c.column != column);
        self.joins.remove(&column);
    }

    /// Check if any condition is set
    pub fn has_conditions(&self) -> bool {
        !self.conditions.is_empty()
    }
}
