//! # Record Printer Actor
//!
//! This module provides the actor writing records for a human reader, one
//! tab separated line per record.

use std::io::Write;

use log::debug;

use crate::{
    model::{AmountFormat, Record},
    Result,
};

/// The record printer actor.
pub struct RecordPrinter {
    /// The records to print.
    records: Vec<Record>,

    /// The format of printed amounts.
    amount_format: AmountFormat,

    /// A Write interface to print the records to
    writer: Box<dyn Write + Sync + Send>,
}

impl RecordPrinter {
    /// Create a new record printer actor.
    pub fn new(
        records: Vec<Record>,
        amount_format: AmountFormat,
        writer: Box<dyn Write + Sync + Send>,
    ) -> Self {
        Self {
            records,
            amount_format,
            writer,
        }
    }

    /// Run the record printer actor.
    /// The actor writes every record in order and flushes the writer.
    pub fn run(mut self) -> Result<()> {
        debug!("Record Printer Actor started");

        for record in &self.records {
            writeln!(self.writer, "{}", record.line(&self.amount_format))?;
        }
        self.writer.flush()?;

        debug!("Record Printer Actor stopped, {} records printed", self.records.len());

        Ok(())
    }
}
