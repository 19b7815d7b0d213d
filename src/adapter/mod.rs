//! The adapter module holds the code that talks to the outside world, here
//! the readers turning byte streams into records.

mod quote_tracker;
mod record_reader;

pub use record_reader::*;
