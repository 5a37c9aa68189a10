//! Log processing for logsieve
//!
//! This crate provides access log parsing, query validation, filtering,
//! and time ordering.

mod error;
mod filter;
mod parser;
mod pipeline;
mod sort;
mod validate;

pub use error::{QueryError, Result};
pub use filter::QueryFilter;
pub use parser::LogParser;
pub use pipeline::select;
pub use sort::{TimedEntry, sort_descending};
pub use validate::validate;

// Re-export types used in our public API
pub use logsieve_types::{ParsedLogEntry, QueryParams, RawLogLine};
