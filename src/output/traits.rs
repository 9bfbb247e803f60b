//! Record sink trait
//!
//! The job coordinator only knows that a finished batch is handed to a sink
//! and that the sink reports where it wrote the records.

use crate::product::ProductRecord;
use crate::SinkResult;
use std::path::PathBuf;

/// Destination for the records of one finished job
///
/// Implementations must be thread-safe; a single sink serves every job.
pub trait RecordSink: Send + Sync {
    /// Writes every record and returns the location of the output
    ///
    /// # Arguments
    ///
    /// * `records` - The records of one job, in submission order
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - Path of the freshly created output
    /// * `Err(SinkError)` - The output could not be written
    fn write(&self, records: &[ProductRecord]) -> SinkResult<PathBuf>;
}
