//! RECORD READER LIBRARY
//!
//! This library reads semicolon delimited transaction exports and turns them
//! into typed [model::Record] values.

pub mod actor;
pub mod adapter;
pub mod model;

pub type Result<T> = anyhow::Result<T>;
