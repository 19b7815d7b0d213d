//! Record reader
//!
//! Reads delimited transaction exports. Each row is split with the `csv`
//! crate (quoted fields may hold delimiters and newlines) then validated and
//! turned into a [Record].

use std::io::Read;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use log::{debug, warn};
use thiserror::Error;

use super::quote_tracker::QuoteTracker;
use crate::model::{AmountError, AmountFormat, Record};

/// Rows with fewer fields are skipped.
pub const MIN_FIELDS: usize = 4;

/// Failure of the delimited stream itself.
#[derive(Debug, Error)]
pub enum StreamError {
    /// IO failure or invalid UTF-8 reported by the CSV parser.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// The input ended inside a quoted field.
    #[error("Unterminated quoted field.")]
    UnterminatedQuote,
}

/// Date field error.
#[derive(Debug, Error)]
pub enum DateError {
    /// The field could not be parsed at all.
    #[error(transparent)]
    Invalid(#[from] chrono::ParseError),

    /// The field holds a date but not written with the expected layout
    /// (missing leading zeros, short year, surrounding spaces).
    #[error("Date is not written as '{0}'.")]
    Layout(String),
}

/// Error raised while reading records. Rows are counted from 1.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The delimited stream itself could not be decoded (IO failure,
    /// invalid UTF-8, unterminated quote).
    #[error("Could not read row after {rows_read} rows: {source}")]
    Stream {
        /// Number of rows successfully read before the failure.
        rows_read: usize,

        /// The underlying stream error.
        source: StreamError,
    },

    /// The first field is not a valid date.
    #[error("Invalid date found on row {row}: {text:?}")]
    DateParse {
        /// The row of the faulty field.
        row: usize,

        /// The raw field content.
        text: String,

        /// The underlying date error.
        source: DateError,
    },

    /// The fourth field is not a valid amount.
    #[error("Invalid amount found on row {row}: {text:?}")]
    AmountParse {
        /// The row of the faulty field.
        row: usize,

        /// The raw field content.
        text: String,

        /// The underlying amount error.
        source: AmountError,
    },
}

/// Record reader trait.
///
/// Implementations consume their stream and return every record it holds in
/// input order or the first error met. No partial result is ever returned.
pub trait RecordReader {
    /// Read all the records.
    fn read(&mut self) -> Result<Vec<Record>, ReadError>;
}

/// Configuration of a [DelimitedRecordReader].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderConfig {
    /// The field delimiter.
    pub delimiter: u8,

    /// The `chrono` format of the date field. Dates must be written exactly
    /// as this format prints them.
    pub date_format: String,

    /// The amount separators.
    pub amount: AmountFormat,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            delimiter: b';',
            date_format: "%d.%m.%Y".to_string(),
            amount: AmountFormat::default(),
        }
    }
}

impl ReaderConfig {
    /// Parse a date field. `chrono` is lenient (single digit day, short or
    /// negative year, leading spaces) so the parsed date must print back to
    /// the very same text.
    fn parse_date(&self, raw_time: &str) -> Result<NaiveDate, DateError> {
        let time = NaiveDate::parse_from_str(raw_time, &self.date_format)?;

        if time.format(&self.date_format).to_string() != raw_time {
            return Err(DateError::Layout(self.date_format.clone()));
        }

        Ok(time)
    }

    /// Turn a row holding at least [MIN_FIELDS] fields into a record.
    fn parse_row(&self, row: usize, fields: &StringRecord) -> Result<Record, ReadError> {
        let raw_time = &fields[0];
        let time = self
            .parse_date(raw_time)
            .map_err(|source| ReadError::DateParse {
                row,
                text: raw_time.to_string(),
                source,
            })?;

        let raw_amount = &fields[3];
        let amount = self
            .amount
            .parse(raw_amount)
            .map_err(|source| ReadError::AmountParse {
                row,
                text: raw_amount.to_string(),
                source,
            })?;
        if !self.amount.has_two_digit_fraction(raw_amount) {
            warn!("Amount {raw_amount:?} on row {row} has no two digits fraction, read as {amount} cents.");
        }

        Ok(Record::new(time, &fields[2], amount))
    }
}

/// Reader of delimited text exports.
pub struct DelimitedRecordReader<R> {
    reader: csv::Reader<QuoteTracker<R>>,
    config: ReaderConfig,
}

impl<R: Read> DelimitedRecordReader<R> {
    /// Create a new reader with the given configuration.
    pub fn with_config(stream: R, config: ReaderConfig) -> Self {
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(config.delimiter)
            .from_reader(QuoteTracker::new(stream, config.delimiter));

        Self { reader, config }
    }

    /// The reader configuration.
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }
}

/// Create a reader using the default configuration: `;` delimited fields,
/// `DD.MM.YYYY` dates and `1,234.56` amounts.
///
/// ```
/// use record_reader::adapter::{new_reader, RecordReader};
///
/// let data = "02.01.2024;ignored;Groceries;1,234.56\n";
/// let records = new_reader(data.as_bytes()).read().unwrap();
///
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].text, "Groceries");
/// assert_eq!(records[0].amount, 123456);
/// ```
pub fn new_reader<R: Read>(stream: R) -> DelimitedRecordReader<R> {
    DelimitedRecordReader::with_config(stream, ReaderConfig::default())
}

impl<R: Read> RecordReader for DelimitedRecordReader<R> {
    fn read(&mut self) -> Result<Vec<Record>, ReadError> {
        let mut records = Vec::new();
        let mut pending: Option<StringRecord> = None;
        let mut row: usize = 0;

        // A row is processed once the next fetch tells whether the input
        // ended inside one of its quoted fields.
        loop {
            let mut fields = StringRecord::new();
            let fetched = self.reader.read_record(&mut fields);

            if matches!(fetched, Ok(false)) && self.reader.get_ref().in_quoted_field() {
                return Err(ReadError::Stream {
                    rows_read: row.saturating_sub(1),
                    source: StreamError::UnterminatedQuote,
                });
            }
            if let Some(previous) = pending.take() {
                if previous.len() < MIN_FIELDS {
                    debug!("Skipping row {row}: {} fields.", previous.len());
                } else {
                    records.push(self.config.parse_row(row, &previous)?);
                }
            }

            match fetched {
                Ok(true) => {
                    row += 1;
                    pending = Some(fields);
                }
                Ok(false) => break,
                Err(source) => {
                    return Err(ReadError::Stream {
                        rows_read: row,
                        source: source.into(),
                    });
                }
            }
        }
        debug!("Read {} records out of {row} rows.", records.len());

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn read(data: &str) -> Result<Vec<Record>, ReadError> {
        new_reader(data.as_bytes()).read()
    }

    #[test]
    fn test_single_record() {
        let records = read("02.01.2024;ignored;Groceries;1,234.56\n").unwrap();

        assert_eq!(
            records,
            vec![Record::new(date(2024, 1, 2), "Groceries", 123456)]
        );
    }

    #[test]
    fn test_negative_amount() {
        let records = read("02.01.2024;ignored;Refund;-50.00\n").unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].amount, -5000);
    }

    #[test]
    fn test_records_keep_input_order() {
        let data = r#"01.03.2024;1;First;1.00
02.03.2024;2;Second;2.00
03.03.2024;3;Third;3.00
04.03.2024;4;Fourth;4.00"#;
        let records = read(data).unwrap();
        let texts: Vec<&str> = records.iter().map(|r| r.text.as_str()).collect();

        assert_eq!(texts, vec!["First", "Second", "Third", "Fourth"]);
        assert_eq!(records[3].time, date(2024, 3, 4));
        assert_eq!(records[3].amount, 400);
    }

    #[test]
    fn test_short_rows_are_skipped() {
        let data = r#"a;b
02.01.2024;x;Kept;10.00
single
02.01.2024;x;Also kept;20.00
1;2;3"#;
        let records = read(data).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text, "Kept");
        assert_eq!(records[1].text, "Also kept");
    }

    #[test]
    fn test_empty_lines() {
        let data = "\n02.01.2024;x;Kept;10.00\n\n\n03.01.2024;x;Kept too;11.00\n\n";
        let records = read(data).unwrap();

        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(read("").unwrap().is_empty());
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let records = read("02.01.2024;x;Groceries;1.00;EUR;whatever\n").unwrap();

        assert_eq!(records[0].amount, 100);
    }

    #[test]
    fn test_description_is_verbatim() {
        let data = "02.01.2024;x;  spaced  ;1.00\n";
        let records = read(data).unwrap();

        assert_eq!(records[0].text, "  spaced  ");
    }

    #[test]
    fn test_quoted_fields() {
        let data = "\"02.01.2024\";\"a;b\";\"Multi\nline; \"\"quoted\"\"\";\"1,000.00\"\n02.01.2024;x;Next;2.00\n";
        let records = read(data).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text, "Multi\nline; \"quoted\"");
        assert_eq!(records[0].amount, 100000);
        assert_eq!(records[1].text, "Next");
    }

    #[test]
    fn test_header_row_is_not_special() {
        // a four fields header is a data row with an invalid date
        let data = "Date;Reference;Text;Amount\n02.01.2024;x;Groceries;1.00\n";
        let error = read(data).unwrap_err();

        assert!(matches!(
            error,
            ReadError::DateParse { row: 1, ref text, .. } if text == "Date"
        ));
    }

    #[test]
    fn test_invalid_date() {
        let data = r#"a;b
02.01.2024;x;Fine;1.00
31.02.2024;x;Not a day;1.00
03.01.2024;x;Never read;1.00"#;
        let error = read(data).unwrap_err();

        assert!(matches!(
            error,
            ReadError::DateParse { row: 3, ref text, .. } if text == "31.02.2024"
        ));
        assert_eq!(
            error.to_string(),
            "Invalid date found on row 3: \"31.02.2024\""
        );
    }

    #[test]
    fn test_date_layout_is_strict() {
        for raw in ["2.1.2024", "02.1.2024", " 02.01.2024", "02.01.2024 ", "02.01.24", "02.01.-024"] {
            let error = read(&format!("{raw};x;T;1.00\n")).unwrap_err();

            assert!(
                matches!(error, ReadError::DateParse { row: 1, ref text, .. } if text == raw),
                "{raw:?} should be rejected, got {error:?}"
            );
        }
    }

    #[test]
    fn test_date_layout_error() {
        let error = read("02.01.24;x;T;1.00\n").unwrap_err();

        assert!(matches!(
            error,
            ReadError::DateParse { source: DateError::Layout(ref layout), .. } if layout == "%d.%m.%Y"
        ));
    }

    #[test]
    fn test_invalid_amount() {
        let data = r#"02.01.2024;x;Fine;1.00
02.01.2024;x;Broken;12.3O"#;
        let error = read(data).unwrap_err();

        assert!(matches!(
            error,
            ReadError::AmountParse { row: 2, ref text, source: AmountError::Invalid { .. } } if text == "12.3O"
        ));
    }

    #[test]
    fn test_empty_amount() {
        let error = read("02.01.2024;x;Empty;\n").unwrap_err();

        assert!(matches!(error, ReadError::AmountParse { row: 1, .. }));
    }

    #[test]
    fn test_misscaled_amounts_are_kept() {
        let data = "02.01.2024;x;No fraction;1\n02.01.2024;x;Short fraction;1.5\n";
        let records = read(data).unwrap();

        assert_eq!(records[0].amount, 1);
        assert_eq!(records[1].amount, 15);
    }

    #[test]
    fn test_stream_error() {
        let data = b"02.01.2024;x;Fine;1.00\n02.01.2024;x;\xff\xfe;1.00\n";
        let error = new_reader(&data[..]).read().unwrap_err();

        assert!(matches!(
            error,
            ReadError::Stream {
                rows_read: 1,
                source: StreamError::Csv(_)
            }
        ));
    }

    #[test]
    fn test_unterminated_quote() {
        let data = r#"02.01.2024;x;Fine;1.00
02.01.2024;x;"oops;1.00
03.01.2024;x;Swallowed;2.00
04.01.2024;x;Swallowed too;3.00
"#;
        let error = read(data).unwrap_err();

        assert!(matches!(
            error,
            ReadError::Stream {
                rows_read: 1,
                source: StreamError::UnterminatedQuote
            }
        ));
    }

    #[test]
    fn test_unterminated_quote_in_last_field() {
        let error = read("02.01.2024;x;Open;\"1.00\n").unwrap_err();

        assert!(matches!(
            error,
            ReadError::Stream {
                rows_read: 0,
                source: StreamError::UnterminatedQuote
            }
        ));
    }

    #[test]
    fn test_error_before_unterminated_quote_wins() {
        let data = "99.99.2024;x;Bad date;1.00\n02.01.2024;x;\"open;1.00\n";
        let error = read(data).unwrap_err();

        assert!(matches!(error, ReadError::DateParse { row: 1, .. }));
    }

    #[test]
    fn test_exhausted_stream() {
        let mut reader = new_reader(Cursor::new("02.01.2024;x;Once;1.00\n"));

        assert_eq!(reader.read().unwrap().len(), 1);
        assert!(reader.read().unwrap().is_empty());
    }

    #[test]
    fn test_custom_config() {
        let config = ReaderConfig {
            delimiter: b'|',
            date_format: "%Y-%m-%d".to_string(),
            amount: AmountFormat::new(',', '.').unwrap(),
        };
        let data = "2024-01-02|x|Groceries|1.234,56\n";
        let mut reader = DelimitedRecordReader::with_config(data.as_bytes(), config.clone());

        assert_eq!(reader.config(), &config);
        assert_eq!(
            reader.read().unwrap(),
            vec![Record::new(date(2024, 1, 2), "Groceries", 123456)]
        );
    }

    #[test]
    fn test_shared_config() {
        let config = ReaderConfig::default();
        let inputs = ["02.01.2024;x;A;1.00\n", "03.01.2024;x;B;2.00\n"];

        std::thread::scope(|scope| {
            let handlers: Vec<_> = inputs
                .iter()
                .map(|input| {
                    let config = &config;
                    scope.spawn(move || {
                        DelimitedRecordReader::with_config(input.as_bytes(), config.clone()).read()
                    })
                })
                .collect();

            for (handler, amount) in handlers.into_iter().zip([100, 200]) {
                let records = handler.join().unwrap().unwrap();
                assert_eq!(records[0].amount, amount);
            }
        });
    }

    #[test]
    fn test_trait_object() {
        let mut reader: Box<dyn RecordReader> =
            Box::new(new_reader("02.01.2024;x;Boxed;3.00\n".as_bytes()));

        assert_eq!(reader.read().unwrap()[0].text, "Boxed");
    }
}
