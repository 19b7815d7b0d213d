use std::{
    io::{stdout, BufReader},
    path::PathBuf,
};

use anyhow::bail;
use clap::Parser;
use log::{debug, error, info};

use record_reader::{
    actor::RecordPrinter,
    adapter::{DelimitedRecordReader, ReaderConfig, RecordReader},
    model::AmountFormat,
    Result,
};

/// Command line arguments
#[derive(Debug, Parser)]
struct CLIArguments {
    /// The path to the export file to read.
    file: PathBuf,

    /// The decimal separator of amounts.
    #[arg(long, default_value_t = '.')]
    decimal_separator: char,

    /// The thousands separator of amounts.
    #[arg(long, default_value_t = ',')]
    thousands_separator: char,
}

struct Application {
    file: PathBuf,
    config: ReaderConfig,
}

impl Application {
    fn new(arguments: CLIArguments) -> Result<Self> {
        if !arguments.file.exists() {
            bail!("Export file does not exist: '{}'.", arguments.file.display());
        }
        if !arguments.file.is_file() {
            bail!("Export file is not a file: '{}'.", arguments.file.display());
        }
        let amount = AmountFormat::new(arguments.decimal_separator, arguments.thousands_separator)?;
        let this = Self {
            file: arguments.file,
            config: ReaderConfig {
                amount,
                ..ReaderConfig::default()
            },
        };

        Ok(this)
    }

    fn run(&self) -> Result<()> {
        info!("Starting RECORD_READER version {}", env!("CARGO_PKG_VERSION"));
        debug!("Reading export file: '{:?}'.", self.file.canonicalize());

        let buffer = BufReader::new(std::fs::File::open(&self.file)?);
        let mut reader: Box<dyn RecordReader> =
            Box::new(DelimitedRecordReader::with_config(buffer, self.config.clone()));
        let records = reader.read()?;

        RecordPrinter::new(records, self.config.amount, Box::new(stdout())).run()
    }
}

fn main() -> Result<()> {
    let arguments = CLIArguments::parse();
    env_logger::init();
    let application = Application::new(arguments)?;

    let result = application.run();

    match &result {
        Ok(_) => {
            info!("RECORD_READER completed successfully");
        }
        Err(error) => {
            error!("RECORD_READER failed with error: {}", error);
        }
    };

    result
}
