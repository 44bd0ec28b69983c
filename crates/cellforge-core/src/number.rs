//! Number text conversion
//!
//! Cell XML needs locale-free decimal text that Excel reads back as the same
//! value, and text coercion needs a parser that reports *why* a string is not
//! a number instead of failing opaquely.

use std::num::IntErrorKind;

use thiserror::Error;

/// Error returned when a value cannot be written as cell text
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum NumberFormatError {
    /// NaN or infinity has no representation in cell XML
    #[error("non-finite number {0} cannot be written to a cell")]
    NonFinite(f64),
}

/// Why a string did not parse as a number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseNumberError {
    /// Blank or whitespace-only input
    #[error("empty input")]
    Empty,
    /// Not a decimal or scientific number, or trailing garbage
    #[error("invalid number format")]
    InvalidFormat,
    /// Valid syntax, but the value does not fit the target type
    #[error("number out of range")]
    OutOfRange,
}

/// Formats doubles as Excel-safe decimal text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NumberFormatter {
    /// Fixed precision for non-integral values before trimming
    ///
    /// `None` renders the shortest text that round-trips.
    pub decimal_places: Option<usize>,
}

impl NumberFormatter {
    /// Create a formatter with a fixed precision
    pub fn with_decimal_places(places: usize) -> Self {
        Self {
            decimal_places: Some(places),
        }
    }

    /// Create a formatter that keeps full precision
    pub fn round_trip() -> Self {
        Self {
            decimal_places: None,
        }
    }

    /// Format a value
    ///
    /// # Examples
    /// ```
    /// use cellforge_core::NumberFormatter;
    ///
    /// let f = NumberFormatter::default();
    /// assert_eq!(f.format(3000.0).unwrap(), "3000");
    /// assert_eq!(f.format(123.40).unwrap(), "123.4");
    /// assert!(f.format(f64::NAN).is_err());
    /// ```
    pub fn format(&self, value: f64) -> Result<String, NumberFormatError> {
        if !value.is_finite() {
            return Err(NumberFormatError::NonFinite(value));
        }

        let mut text = if value == value.trunc() {
            format!("{:.0}", value)
        } else {
            match self.decimal_places {
                Some(places) => {
                    let mut s = format!("{:.*}", places, value);
                    trim_fraction(&mut s);
                    s
                }
                None => format!("{}", value),
            }
        };

        if text == "-0" {
            text.truncate(0);
            text.push('0');
        }
        Ok(text)
    }
}

impl Default for NumberFormatter {
    fn default() -> Self {
        Self::with_decimal_places(2)
    }
}

/// Strip trailing zeros and a bare decimal point
fn trim_fraction(s: &mut String) {
    if !s.contains('.') {
        return;
    }
    let keep = s.trim_end_matches('0').trim_end_matches('.').len();
    s.truncate(keep);
}

/// Parse decimal or scientific text as a double
///
/// Surrounding whitespace is ignored. Words such as `inf` and `NaN` are
/// rejected even though Rust's float parser accepts them.
pub fn parse_number(text: &str) -> Result<f64, ParseNumberError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ParseNumberError::Empty);
    }

    let unsigned = text.strip_prefix(&['+', '-'][..]).unwrap_or(text);
    match unsigned.bytes().next() {
        Some(b) if b.is_ascii_digit() || b == b'.' => {}
        _ => return Err(ParseNumberError::InvalidFormat),
    }

    let value: f64 = text
        .parse()
        .map_err(|_| ParseNumberError::InvalidFormat)?;
    if value.is_infinite() {
        return Err(ParseNumberError::OutOfRange);
    }
    Ok(value)
}

/// Parse text as an integer
///
/// Scientific or decimal spellings of whole numbers (`"1e3"`, `"3.0"`) are
/// accepted; anything with a fractional part is `InvalidFormat`.
pub fn parse_integer(text: &str) -> Result<i64, ParseNumberError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ParseNumberError::Empty);
    }

    match text.parse::<i64>() {
        Ok(n) => return Ok(n),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                return Err(ParseNumberError::OutOfRange)
            }
            _ => {}
        },
    }

    let value = parse_number(text)?;
    if value.fract() != 0.0 {
        return Err(ParseNumberError::InvalidFormat);
    }
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
    if value < i64::MIN as f64 || value >= i64::MAX as f64 {
        return Err(ParseNumberError::OutOfRange);
    }
    Ok(value as i64)
}
