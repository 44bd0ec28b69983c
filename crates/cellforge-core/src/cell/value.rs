//! Cell value types

use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Represents the value stored in a cell
///
/// The variant is the cell's type tag. Writers dispatch on it directly and
/// never re-derive a type from the payload.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Empty cell (no value)
    Empty,

    /// String value
    String(SharedString),

    /// Floating point value (dates are stored as serial numbers)
    Number(f64),

    /// Integer value, written without any decimal formatting
    Integer(i64),

    /// Boolean value (TRUE/FALSE)
    Boolean(bool),

    /// Formula with an optional cached result
    Formula {
        /// Formula text as entered (e.g., "=SUM(A1:A10)")
        text: String,
        /// Last calculated value (if any)
        cached: Option<CachedValue>,
    },
}

impl CellValue {
    /// Create a new string value
    pub fn string<S: Into<String>>(s: S) -> Self {
        CellValue::String(SharedString::new(s.into()))
    }

    /// Create a new formula value without a cached result
    pub fn formula<S: Into<String>>(text: S) -> Self {
        CellValue::Formula {
            text: text.into(),
            cached: None,
        }
    }

    /// Create a formula value carrying a cached result
    pub fn formula_with_result<S: Into<String>>(text: S, cached: CachedValue) -> Self {
        CellValue::Formula {
            text: text.into(),
            cached: Some(cached),
        }
    }

    /// Check if the cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Check if the cell contains a formula
    pub fn is_formula(&self) -> bool {
        matches!(self, CellValue::Formula { .. })
    }

    /// Try to get the value as a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Boolean(true) => Some(1.0),
            CellValue::Boolean(false) => Some(0.0),
            CellValue::Formula {
                cached: Some(v), ..
            } => v.as_number(),
            _ => None,
        }
    }

    /// Try to get the value as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Boolean(b) => Some(*b),
            CellValue::Number(n) => Some(*n != 0.0),
            CellValue::Integer(i) => Some(*i != 0),
            CellValue::Formula {
                cached: Some(CachedValue::Boolean(b)),
                ..
            } => Some(*b),
            _ => None,
        }
    }

    /// Try to get the value as a string
    pub fn as_string(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s.as_str()),
            CellValue::Formula {
                cached: Some(CachedValue::String(s)),
                ..
            } => Some(s.as_str()),
            _ => None,
        }
    }

    /// Get the formula text if this is a formula cell
    pub fn formula_text(&self) -> Option<&str> {
        match self {
            CellValue::Formula { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Get the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Empty => "empty",
            CellValue::String(_) => "string",
            CellValue::Number(_) => "number",
            CellValue::Integer(_) => "integer",
            CellValue::Boolean(_) => "boolean",
            CellValue::Formula { .. } => "formula",
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Empty
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => write!(f, ""),
            CellValue::String(s) => write!(f, "{}", s.as_str()),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Integer(i) => write!(f, "{}", i),
            CellValue::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            CellValue::Formula {
                cached: Some(v), ..
            } => write!(f, "{}", v),
            CellValue::Formula { text, .. } => write!(f, "{}", text),
        }
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Integer(n as i64)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Integer(n)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::string(s)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::string(s)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        CellValue::Number(excel_serial(dt))
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        CellValue::Number(excel_serial(d.and_time(NaiveTime::MIN)))
    }
}

/// Convert a date-time to an Excel 1900-system serial number
///
/// Day 0 is 1899-12-30, which absorbs Excel's phantom 1900-02-29 for all
/// dates after February 1900.
fn excel_serial(dt: NaiveDateTime) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)
        .unwrap_or(NaiveDate::MIN)
        .and_time(NaiveTime::MIN);
    let elapsed = dt - epoch;
    let days = elapsed.num_days();
    let seconds = (elapsed - chrono::Duration::days(days)).num_milliseconds() as f64 / 1000.0;
    days as f64 + seconds / 86_400.0
}

/// The cached result of a formula
#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    /// String result
    String(SharedString),
    /// Floating point result
    Number(f64),
    /// Integer result
    Integer(i64),
    /// Boolean result
    Boolean(bool),
}

impl CachedValue {
    /// Create a cached string result
    pub fn string<S: Into<String>>(s: S) -> Self {
        CachedValue::String(SharedString::new(s.into()))
    }

    /// Try to get the cached result as a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CachedValue::Number(n) => Some(*n),
            CachedValue::Integer(i) => Some(*i as f64),
            CachedValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            CachedValue::String(_) => None,
        }
    }
}

impl fmt::Display for CachedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CachedValue::String(s) => write!(f, "{}", s.as_str()),
            CachedValue::Number(n) => write!(f, "{}", n),
            CachedValue::Integer(i) => write!(f, "{}", i),
            CachedValue::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
        }
    }
}

impl From<f64> for CachedValue {
    fn from(n: f64) -> Self {
        CachedValue::Number(n)
    }
}

impl From<i64> for CachedValue {
    fn from(n: i64) -> Self {
        CachedValue::Integer(n)
    }
}

impl From<bool> for CachedValue {
    fn from(b: bool) -> Self {
        CachedValue::Boolean(b)
    }
}

impl From<&str> for CachedValue {
    fn from(s: &str) -> Self {
        CachedValue::string(s)
    }
}

/// Reference-counted string shared between cells
///
/// Strings are often repeated across cells (e.g., "Yes", "No", category names).
/// Using `Arc<str>` lets clones of a value share the same allocation.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SharedString(Arc<str>);

impl SharedString {
    /// Create a new shared string
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        SharedString(Arc::from(s.as_ref()))
    }

    /// Get the string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the length of the string in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the string is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SharedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl fmt::Display for SharedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for SharedString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SharedString {
    fn from(s: &str) -> Self {
        SharedString::new(s)
    }
}

impl From<String> for SharedString {
    fn from(s: String) -> Self {
        SharedString::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_value_conversions() {
        assert_eq!(CellValue::from(42), CellValue::Integer(42));
        assert_eq!(CellValue::from(3.25), CellValue::Number(3.25));
        assert_eq!(CellValue::from(true), CellValue::Boolean(true));

        let s = CellValue::from("hello");
        assert_eq!(s.as_string(), Some("hello"));
    }

    #[test]
    fn test_cell_value_as_number() {
        assert_eq!(CellValue::Number(42.0).as_number(), Some(42.0));
        assert_eq!(CellValue::Integer(-7).as_number(), Some(-7.0));
        assert_eq!(CellValue::Boolean(true).as_number(), Some(1.0));
        assert_eq!(CellValue::string("hello").as_number(), None);
        assert_eq!(CellValue::Empty.as_number(), None);

        let f = CellValue::formula_with_result("=1+2", CachedValue::Number(3.0));
        assert_eq!(f.as_number(), Some(3.0));
    }

    #[test]
    fn test_formula_cached_string() {
        let f = CellValue::formula_with_result("=A1&B1", CachedValue::string("ab"));
        assert!(f.is_formula());
        assert_eq!(f.formula_text(), Some("=A1&B1"));
        assert_eq!(f.as_string(), Some("ab"));
        assert_eq!(f.to_string(), "ab");
    }

    #[test]
    fn test_date_serials() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(CellValue::from(d), CellValue::Number(45292.0));

        let noon = d.and_hms_opt(12, 0, 0).unwrap();
        assert_eq!(CellValue::from(noon), CellValue::Number(45292.5));
    }

    #[test]
    fn test_type_names() {
        assert_eq!(CellValue::Empty.type_name(), "empty");
        assert_eq!(CellValue::Integer(1).type_name(), "integer");
        assert_eq!(CellValue::formula("=A1").type_name(), "formula");
    }
}
