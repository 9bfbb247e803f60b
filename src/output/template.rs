use crate::{SinkError, SinkResult};
use std::path::Path;

/// Reads the header row of an import template as the output column order
pub fn read_template_columns(path: &Path) -> SinkResult<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        SinkError::Template(format!("cannot read {}: {}", path.display(), e))
    })?;

    let header = content
        .lines()
        .next()
        .ok_or_else(|| SinkError::Template(format!("{} is empty", path.display())))?;

    let columns = parse_header_row(header);
    if columns.iter().all(|c| c.is_empty()) {
        return Err(SinkError::NoColumns);
    }
    Ok(columns)
}

/// Splits one CSV header line, honoring quoted fields
pub fn parse_header_row(line: &str) -> Vec<String> {
    let line = line.trim_start_matches('\u{feff}').trim_end_matches('\r');
    let mut columns = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => columns.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }
    columns.push(current);
    columns
}
