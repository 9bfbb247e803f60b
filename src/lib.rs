//! Listing Harvester: resilient product listing extraction
//!
//! This crate fetches e-commerce product pages with paced, retrying requests,
//! extracts listing fields through declarative fallback rules, and runs each
//! batch of URLs as a background job with observable progress and a single
//! terminal result per job.

pub mod config;
pub mod extract;
pub mod fetch;
pub mod input;
pub mod job;
pub mod output;
pub mod product;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Listing Harvester operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("No products were successfully parsed")]
    BatchExhausted,

    #[error("Unknown job: {0}")]
    UnknownJob(job::JobId),

    #[error("Job {0} is still running")]
    JobActive(job::JobId),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: job::JobStatus,
        to: job::JobStatus,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// A page that could not be fetched once every attempt was spent
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Invalid header value for {name}: {message}")]
    InvalidHeader { name: &'static str, message: String },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Field-level extraction failures
///
/// These never abort a record; the affected field falls back to empty.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Invalid selector '{0}'")]
    InvalidSelector(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Malformed structured data: {0}")]
    MalformedStructuredData(String),
}

/// Rejected job submissions; no job is started
#[derive(Debug, Error)]
pub enum InputError {
    #[error("No valid URLs provided")]
    NoUrls,

    #[error("Invalid file type '{0}'. Only .txt and .csv files are allowed")]
    DisallowedExtension(String),

    #[error("No valid URLs found in file {}", .0.display())]
    NoUrlsInFile(PathBuf),

    #[error("Error processing file: {0}")]
    Io(#[from] std::io::Error),
}

/// Record sink failures
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid column template: {0}")]
    Template(String),

    #[error("No output columns configured")]
    NoColumns,
}

/// Result type alias for Listing Harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for sink operations
pub type SinkResult<T> = std::result::Result<T, SinkError>;

// Re-export commonly used types
pub use config::Config;
pub use extract::{ExtractedFields, ExtractionRules, FieldExtractor};
pub use fetch::RequestClient;
pub use job::{JobAccepted, JobId, JobManager, JobState, JobStatus, ResultEnvelope, ResultPoll};
pub use output::{CsvSink, RecordSink};
pub use product::ProductRecord;
