//! Output module for exporting product records
//!
//! This module handles:
//! - The `RecordSink` interface the job coordinator hands finished batches to
//! - Writing one delimited file per job with a fixed column order
//! - Deriving the column order from an import template

mod csv;
mod template;
mod traits;

pub use self::csv::{format_row, CsvSink};
pub use template::{parse_header_row, read_template_columns};
pub use traits::RecordSink;
