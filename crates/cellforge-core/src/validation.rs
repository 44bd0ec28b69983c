//! Data validation
//!
//! Validation rules restrict what users may type into a range of cells.
//! The rules are plain data; writers translate them into `<dataValidation>`
//! nodes.
//!
//! ## Example
//!
//! ```rust
//! use cellforge_core::{Workbook, DataValidation, CellRange};
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//!
//! let validation = DataValidation::list("Yes,No,Maybe")
//!     .with_range(CellRange::parse("A1:A10").unwrap())
//!     .with_error_message("Invalid value", "Please select from the list");
//!
//! sheet.add_data_validation(validation);
//! ```

use crate::cell::CellRange;

/// Data validation rule for one or more ranges
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataValidation {
    /// Type of validation
    pub validation_type: ValidationType,
    /// Cell ranges this validation applies to
    pub ranges: Vec<CellRange>,
    /// Allow blank/empty cells
    pub allow_blank: bool,

    /// Show input message when cell is selected
    pub show_input_message: bool,
    /// Input message title
    pub input_title: Option<String>,
    /// Input message text
    pub input_message: Option<String>,

    /// Show error alert when invalid data entered
    pub show_error_alert: bool,
    /// Error alert style
    pub error_style: ValidationErrorStyle,
    /// Error alert title
    pub error_title: Option<String>,
    /// Error alert message
    pub error_message: Option<String>,
}

impl Default for DataValidation {
    fn default() -> Self {
        Self {
            validation_type: ValidationType::None,
            ranges: Vec::new(),
            allow_blank: true,
            show_input_message: false,
            input_title: None,
            input_message: None,
            show_error_alert: true,
            error_style: ValidationErrorStyle::Stop,
            error_title: None,
            error_message: None,
        }
    }
}

impl DataValidation {
    /// Create a validation of the given type
    pub fn new(validation_type: ValidationType) -> Self {
        Self {
            validation_type,
            ..Self::default()
        }
    }

    /// Create a list validation (dropdown)
    ///
    /// `source` is either comma-separated values ("Yes,No") or a range
    /// reference ("=Sheet1!$A$1:$A$5").
    pub fn list(source: impl Into<String>) -> Self {
        Self::new(ValidationType::List {
            source: source.into(),
        })
    }

    /// Create a whole number validation
    pub fn whole_number(operator: ValidationOperator, value: impl Into<String>) -> Self {
        Self::new(ValidationType::Whole(Comparison::single(operator, value)))
    }

    /// Create a whole number validation with two bounds
    pub fn whole_number_between(
        operator: ValidationOperator,
        min: impl Into<String>,
        max: impl Into<String>,
    ) -> Self {
        Self::new(ValidationType::Whole(Comparison::pair(operator, min, max)))
    }

    /// Create a decimal number validation
    pub fn decimal(operator: ValidationOperator, value: impl Into<String>) -> Self {
        Self::new(ValidationType::Decimal(Comparison::single(operator, value)))
    }

    /// Create a decimal number validation with two bounds
    pub fn decimal_between(
        operator: ValidationOperator,
        min: impl Into<String>,
        max: impl Into<String>,
    ) -> Self {
        Self::new(ValidationType::Decimal(Comparison::pair(operator, min, max)))
    }

    /// Create a date validation
    pub fn date(operator: ValidationOperator, value: impl Into<String>) -> Self {
        Self::new(ValidationType::Date(Comparison::single(operator, value)))
    }

    /// Create a time validation
    pub fn time(operator: ValidationOperator, value: impl Into<String>) -> Self {
        Self::new(ValidationType::Time(Comparison::single(operator, value)))
    }

    /// Create a text length validation
    pub fn text_length(operator: ValidationOperator, value: impl Into<String>) -> Self {
        Self::new(ValidationType::TextLength(Comparison::single(operator, value)))
    }

    /// Create a custom formula validation
    ///
    /// The formula must evaluate to TRUE for valid input.
    pub fn custom(formula: impl Into<String>) -> Self {
        Self::new(ValidationType::Custom {
            formula: formula.into(),
        })
    }

    /// Add a cell range to this validation
    pub fn with_range(mut self, range: CellRange) -> Self {
        self.ranges.push(range);
        self
    }

    /// Set whether blank cells are allowed
    pub fn with_allow_blank(mut self, allow: bool) -> Self {
        self.allow_blank = allow;
        self
    }

    /// Set an input message (shown when cell is selected)
    pub fn with_input_message(
        mut self,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.show_input_message = true;
        self.input_title = Some(title.into());
        self.input_message = Some(message.into());
        self
    }

    /// Set an error message (shown when invalid data entered)
    pub fn with_error_message(
        mut self,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.show_error_alert = true;
        self.error_title = Some(title.into());
        self.error_message = Some(message.into());
        self
    }

    /// Set the error style
    pub fn with_error_style(mut self, style: ValidationErrorStyle) -> Self {
        self.error_style = style;
        self
    }

    /// Check if this validation applies to a specific cell
    pub fn applies_to(&self, row: u32, col: u16) -> bool {
        self.ranges.iter().any(|r| r.contains_indices(row, col))
    }

    /// Space-separated list of the ranges ("A1:A10 C1:C10")
    pub fn sqref(&self) -> String {
        self.ranges
            .iter()
            .map(|r| r.to_a1_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Operator and operands of a comparison rule
///
/// Operands are formula text: literals ("10"), references ("$B$1") or
/// expressions ("TODAY()").
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Comparison {
    pub operator: ValidationOperator,
    pub value1: String,
    pub value2: Option<String>,
}

impl Comparison {
    /// A comparison with a single operand
    pub fn single(operator: ValidationOperator, value: impl Into<String>) -> Self {
        Self {
            operator,
            value1: value.into(),
            value2: None,
        }
    }

    /// A comparison with two operands (between / not between)
    pub fn pair(
        operator: ValidationOperator,
        value1: impl Into<String>,
        value2: impl Into<String>,
    ) -> Self {
        Self {
            operator,
            value1: value1.into(),
            value2: Some(value2.into()),
        }
    }
}

/// Types of data validation
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValidationType {
    /// No validation (any value allowed)
    #[default]
    None,
    /// Must be a whole number
    Whole(Comparison),
    /// Must be a decimal number
    Decimal(Comparison),
    /// Must be from a list
    List {
        /// Either comma-separated values or a range reference
        source: String,
    },
    /// Must be a date
    Date(Comparison),
    /// Must be a time
    Time(Comparison),
    /// Text length constraint
    TextLength(Comparison),
    /// Custom formula validation
    Custom {
        /// Formula that returns TRUE/FALSE
        formula: String,
    },
}

impl ValidationType {
    /// Get the XLSX type string for this validation type
    pub fn xlsx_type(&self) -> &'static str {
        match self {
            ValidationType::None => "none",
            ValidationType::Whole(_) => "whole",
            ValidationType::Decimal(_) => "decimal",
            ValidationType::List { .. } => "list",
            ValidationType::Date(_) => "date",
            ValidationType::Time(_) => "time",
            ValidationType::TextLength(_) => "textLength",
            ValidationType::Custom { .. } => "custom",
        }
    }

    /// The comparison of this rule, if it has one
    ///
    /// List, custom and none rules carry no operator.
    pub fn comparison(&self) -> Option<&Comparison> {
        match self {
            ValidationType::Whole(c)
            | ValidationType::Decimal(c)
            | ValidationType::Date(c)
            | ValidationType::Time(c)
            | ValidationType::TextLength(c) => Some(c),
            ValidationType::None | ValidationType::List { .. } | ValidationType::Custom { .. } => {
                None
            }
        }
    }

    /// Content of the `<formula1>` element
    pub fn formula1(&self) -> Option<&str> {
        match self {
            ValidationType::None => None,
            ValidationType::List { source } => Some(source),
            ValidationType::Custom { formula } => Some(formula),
            _ => self.comparison().map(|c| c.value1.as_str()),
        }
    }

    /// Content of the `<formula2>` element
    pub fn formula2(&self) -> Option<&str> {
        self.comparison().and_then(|c| c.value2.as_deref())
    }
}

/// Comparison operators for validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValidationOperator {
    /// Value must be between value1 and value2
    #[default]
    Between,
    /// Value must NOT be between value1 and value2
    NotBetween,
    /// Value must equal value1
    Equal,
    /// Value must NOT equal value1
    NotEqual,
    /// Value must be greater than value1
    GreaterThan,
    /// Value must be less than value1
    LessThan,
    /// Value must be greater than or equal to value1
    GreaterThanOrEqual,
    /// Value must be less than or equal to value1
    LessThanOrEqual,
}

impl ValidationOperator {
    /// Get the XLSX operator string
    pub fn xlsx_operator(&self) -> &'static str {
        match self {
            ValidationOperator::Between => "between",
            ValidationOperator::NotBetween => "notBetween",
            ValidationOperator::Equal => "equal",
            ValidationOperator::NotEqual => "notEqual",
            ValidationOperator::GreaterThan => "greaterThan",
            ValidationOperator::LessThan => "lessThan",
            ValidationOperator::GreaterThanOrEqual => "greaterThanOrEqual",
            ValidationOperator::LessThanOrEqual => "lessThanOrEqual",
        }
    }

    /// Check if this operator requires two values
    pub fn requires_two_values(&self) -> bool {
        matches!(
            self,
            ValidationOperator::Between | ValidationOperator::NotBetween
        )
    }
}

/// Error alert styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValidationErrorStyle {
    /// Reject invalid data (default)
    #[default]
    Stop,
    /// Warn but allow
    Warning,
    /// Just inform
    Information,
}

impl ValidationErrorStyle {
    /// Get the XLSX error style string
    pub fn xlsx_style(&self) -> &'static str {
        match self {
            ValidationErrorStyle::Stop => "stop",
            ValidationErrorStyle::Warning => "warning",
            ValidationErrorStyle::Information => "information",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_validation() {
        let v = DataValidation::list("Yes,No,Maybe");
        assert_eq!(v.validation_type.xlsx_type(), "list");
        assert_eq!(v.validation_type.formula1(), Some("Yes,No,Maybe"));
        assert!(v.validation_type.comparison().is_none());
    }

    #[test]
    fn test_whole_number_validation() {
        let v = DataValidation::whole_number(ValidationOperator::GreaterThan, "0");
        let cmp = v.validation_type.comparison().unwrap();
        assert_eq!(cmp.operator, ValidationOperator::GreaterThan);
        assert_eq!(v.validation_type.formula1(), Some("0"));
        assert_eq!(v.validation_type.formula2(), None);
    }

    #[test]
    fn test_between_validation() {
        let v = DataValidation::decimal_between(ValidationOperator::Between, "1", "100");
        assert_eq!(v.validation_type.xlsx_type(), "decimal");
        assert_eq!(v.validation_type.formula1(), Some("1"));
        assert_eq!(v.validation_type.formula2(), Some("100"));
        assert!(ValidationOperator::Between.requires_two_values());
    }

    #[test]
    fn test_custom_has_formula_but_no_operator() {
        let v = DataValidation::custom("MOD(A1,5)=0");
        assert_eq!(v.validation_type.formula1(), Some("MOD(A1,5)=0"));
        assert!(v.validation_type.comparison().is_none());
    }

    #[test]
    fn test_with_messages() {
        let v = DataValidation::list("A,B,C")
            .with_input_message("Choose", "Select a value from the list")
            .with_error_message("Error", "Invalid selection")
            .with_error_style(ValidationErrorStyle::Warning);

        assert!(v.show_input_message);
        assert_eq!(v.input_title.as_deref(), Some("Choose"));
        assert!(v.show_error_alert);
        assert_eq!(v.error_message.as_deref(), Some("Invalid selection"));
        assert_eq!(v.error_style.xlsx_style(), "warning");
    }

    #[test]
    fn test_applies_to_and_sqref() {
        let v = DataValidation::list("A,B")
            .with_range(CellRange::parse("A1:C10").unwrap())
            .with_range(CellRange::parse("E5").unwrap());

        assert!(v.applies_to(0, 0));
        assert!(v.applies_to(9, 2));
        assert!(v.applies_to(4, 4));
        assert!(!v.applies_to(10, 0));
        assert_eq!(v.sqref(), "A1:C10 E5");
    }

    #[test]
    fn test_operator_xlsx_strings() {
        assert_eq!(ValidationOperator::Between.xlsx_operator(), "between");
        assert_eq!(ValidationOperator::NotBetween.xlsx_operator(), "notBetween");
        assert_eq!(
            ValidationOperator::LessThanOrEqual.xlsx_operator(),
            "lessThanOrEqual"
        );
    }
}
