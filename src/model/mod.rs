//! # Model module
//!
//! Plain data types. Nothing in here performs any IO.

mod amount;
mod record;

pub use amount::*;
pub use record::*;
