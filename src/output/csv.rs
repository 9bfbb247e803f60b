//! Delimited file sink
//!
//! Each call to `write` creates a new timestamp-named file; an existing file
//! is never reopened or appended to.

use crate::config::OutputConfig;
use crate::output::template::read_template_columns;
use crate::output::traits::RecordSink;
use crate::product::{minimal_columns, ProductRecord};
use crate::{SinkError, SinkResult};
use chrono::Utc;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

/// Upper bound on `_<n>` suffixes tried when a file name is taken
const MAX_NAME_COLLISIONS: u32 = 1000;

/// Writes records as comma-separated rows with a header line
#[derive(Debug, Clone)]
pub struct CsvSink {
    directory: PathBuf,
    file_prefix: String,
    template: Option<PathBuf>,
}

impl CsvSink {
    pub fn new(directory: impl Into<PathBuf>, file_prefix: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            file_prefix: file_prefix.into(),
            template: None,
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self {
            directory: config.directory.clone(),
            file_prefix: config.file_prefix.clone(),
            template: config.template_path.clone(),
        }
    }

    /// Takes the column order from a template's header row instead of the
    /// minimal schema
    pub fn with_template(mut self, template: impl Into<PathBuf>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Column order used for the next write
    pub fn columns(&self) -> SinkResult<Vec<String>> {
        match &self.template {
            Some(path) => read_template_columns(path),
            None => Ok(minimal_columns()),
        }
    }

    /// Creates a new output file, adding a numeric suffix if the name is taken
    fn create_output_file(&self) -> SinkResult<(File, PathBuf)> {
        std::fs::create_dir_all(&self.directory)?;

        let stem = format!(
            "{}_{}",
            self.file_prefix,
            Utc::now().format("%Y%m%d_%H%M%S")
        );

        for attempt in 0..MAX_NAME_COLLISIONS {
            let name = if attempt == 0 {
                format!("{}.csv", stem)
            } else {
                format!("{}_{}.csv", stem, attempt)
            };
            let path = self.directory.join(name);

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((file, path)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(SinkError::Io(std::io::Error::new(
            ErrorKind::AlreadyExists,
            format!("no free output name for {}", stem),
        )))
    }
}

impl RecordSink for CsvSink {
    fn write(&self, records: &[ProductRecord]) -> SinkResult<PathBuf> {
        let columns = self.columns()?;
        if columns.is_empty() {
            return Err(SinkError::NoColumns);
        }

        let mut content = format_row(&columns);
        for record in records {
            let row: Vec<String> = columns.iter().map(|c| record.field(c)).collect();
            content.push_str(&format_row(&row));
        }

        let (mut file, path) = self.create_output_file()?;
        file.write_all(content.as_bytes())?;
        file.flush()?;

        tracing::info!("Wrote {} records to {}", records.len(), path.display());
        Ok(path)
    }
}

/// Formats one CSV row terminated by CRLF
///
/// Fields containing a comma, quote, CR or LF are quoted with inner quotes
/// doubled.
pub fn format_row<S: AsRef<str>>(fields: &[S]) -> String {
    let mut row = fields
        .iter()
        .map(|f| escape_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    row.push_str("\r\n");
    row
}

fn escape_field(field: &str) -> String {
    if field.contains(|c: char| matches!(c, ',' | '"' | '\r' | '\n')) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
