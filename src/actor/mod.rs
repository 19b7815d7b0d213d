//! # Actor module
//!
//! The actors are controlers. They consume what the adapters produce.

mod printer;

pub use printer::*;
