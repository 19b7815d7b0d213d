use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::AmountFormat;

/// One transaction line of an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// The transaction date.
    pub time: NaiveDate,

    /// The free-form description, taken verbatim from the export.
    pub text: String,

    /// The signed amount in minor units (cents).
    pub amount: i64,
}

impl Record {
    /// Create a new record.
    pub fn new(time: NaiveDate, text: impl Into<String>, amount: i64) -> Self {
        Self {
            time,
            text: text.into(),
            amount,
        }
    }

    /// Format the amount with the default amount format.
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use record_reader::model::Record;
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    /// let record = Record::new(date, "Groceries", 123456);
    ///
    /// assert_eq!(record.string_amount(), "1234,56");
    /// ```
    pub fn string_amount(&self) -> String {
        AmountFormat::default().format(self.amount)
    }

    /// The tab separated line representation of the record, the amount being
    /// written with the given format.
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use record_reader::model::{AmountFormat, Record};
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    /// let record = Record::new(date, "Groceries", 123456);
    /// let format = AmountFormat::new(',', '.').unwrap();
    ///
    /// assert_eq!(record.line(&format), "2024-01-02\tGroceries\t1234.56");
    /// ```
    pub fn line(&self, format: &AmountFormat) -> String {
        format!(
            "{}\t{}\t{}",
            self.time.format("%Y-%m-%d"),
            self.text,
            format.format(self.amount)
        )
    }

    /// The amount as a decimal number of major units.
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use rust_decimal_macros::dec;
    /// use record_reader::model::Record;
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    /// let record = Record::new(date, "Refund", -5000);
    ///
    /// assert_eq!(record.decimal_amount(), dec!(-50.00));
    /// ```
    pub fn decimal_amount(&self) -> Decimal {
        Decimal::new(self.amount, 2)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.line(&AmountFormat::default()))
    }
}
