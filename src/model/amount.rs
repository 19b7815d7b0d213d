use std::num::ParseIntError;

use thiserror::Error;

/// Error type for amount parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    /// What remains of the amount once separators are stripped is not a
    /// signed 64 bits integer (non digit characters, empty string, overflow).
    #[error("Invalid amount: {source}")]
    Invalid {
        /// The underlying integer parse error.
        source: ParseIntError,
    },
}

/// Error type for amount format creation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountFormatError {
    /// Decimal and thousands separators must differ.
    #[error("Decimal and thousands separators are both '{0}'.")]
    AmbiguousSeparators(char),
}

/// Locale convention used to read and write monetary amounts.
///
/// Amounts are integer counts of minor units (cents). Parsing removes every
/// separator and reads the remaining digits as an integer, so the input must
/// carry exactly two fractional digits to be scaled correctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountFormat {
    decimal_separator: char,
    thousands_separator: char,
}

impl Default for AmountFormat {
    fn default() -> Self {
        Self {
            decimal_separator: '.',
            thousands_separator: ',',
        }
    }
}

impl AmountFormat {
    /// Create a new amount format.
    ///
    /// ```
    /// use record_reader::model::{AmountFormat, AmountFormatError};
    ///
    /// let format = AmountFormat::new(',', '.').unwrap();
    /// assert_eq!(format.parse("1.234,56").unwrap(), 123456);
    ///
    /// // both separators cannot be the same character
    /// let error = AmountFormat::new(',', ',').unwrap_err();
    /// assert_eq!(error, AmountFormatError::AmbiguousSeparators(','));
    /// ```
    pub fn new(
        decimal_separator: char,
        thousands_separator: char,
    ) -> Result<Self, AmountFormatError> {
        if decimal_separator == thousands_separator {
            return Err(AmountFormatError::AmbiguousSeparators(decimal_separator));
        }

        Ok(Self {
            decimal_separator,
            thousands_separator,
        })
    }

    /// The decimal separator.
    pub fn decimal_separator(&self) -> char {
        self.decimal_separator
    }

    /// The thousands separator.
    pub fn thousands_separator(&self) -> char {
        self.thousands_separator
    }

    /// Parse the given amount into minor units.
    ///
    /// Both separators are removed and the remaining text is parsed as a
    /// signed integer. The last two digits are the fractional part.
    ///
    /// ```
    /// use record_reader::model::AmountFormat;
    ///
    /// let format = AmountFormat::default();
    /// assert_eq!(format.parse("1,234.56").unwrap(), 123456);
    /// assert_eq!(format.parse("-50.00").unwrap(), -5000);
    /// assert!(format.parse("12a.00").is_err());
    /// ```
    pub fn parse(&self, amount: &str) -> Result<i64, AmountError> {
        let digits: String = amount
            .chars()
            .filter(|c| *c != self.decimal_separator && *c != self.thousands_separator)
            .collect();

        digits
            .parse::<i64>()
            .map_err(|source| AmountError::Invalid { source })
    }

    /// Tell if the amount ends with a decimal separator followed by exactly
    /// two digits. Amounts failing this check are parsed with a wrong scale.
    pub fn has_two_digit_fraction(&self, amount: &str) -> bool {
        match amount.rsplit_once(self.decimal_separator) {
            Some((_, fraction)) => {
                fraction.len() == 2 && fraction.chars().all(|c| c.is_ascii_digit())
            }
            None => false,
        }
    }

    /// Format the given minor units amount the way exports print it: the
    /// thousands separator is inserted before the last two digits, without
    /// any grouping. Amounts below one unit are zero padded.
    ///
    /// ```
    /// use record_reader::model::AmountFormat;
    ///
    /// let format = AmountFormat::default();
    /// assert_eq!(format.format(123456), "1234,56");
    /// assert_eq!(format.format(-5), "-0,05");
    /// ```
    pub fn format(&self, amount: i64) -> String {
        let absolute = amount.unsigned_abs();
        let sign = if amount < 0 { "-" } else { "" };

        format!(
            "{sign}{}{}{:02}",
            absolute / 100,
            self.thousands_separator,
            absolute % 100
        )
    }
}
