//! URL intake for job submission
//!
//! Two sources feed a batch: a pasted block of newline-separated URLs and an
//! uploaded `.txt`/`.csv` file. Lines that do not look like URLs are dropped
//! silently; only an empty result is an error.

use crate::InputError;
use std::path::Path;

/// File extensions accepted for URL lists
pub const ALLOWED_EXTENSIONS: &[&str] = &["txt", "csv"];

/// Splits a pasted block into trimmed, non-empty lines
pub fn urls_from_text(block: &str) -> Result<Vec<String>, InputError> {
    let urls: Vec<String> = block
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    if urls.is_empty() {
        return Err(InputError::NoUrls);
    }
    Ok(urls)
}

/// Keeps the trimmed lines that start with `http`, in order
pub fn urls_from_lines<I, S>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .map(|line| line.as_ref().trim().to_string())
        .filter(|line| line.starts_with("http"))
        .collect()
}

/// Returns true if the file name carries an allowed extension
pub fn is_allowed_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            ALLOWED_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

/// Reads a URL list from an uploaded file
///
/// # Returns
///
/// * `Ok(Vec<String>)` - URLs in file order
/// * `Err(InputError::DisallowedExtension)` - The file is not `.txt` or `.csv`
/// * `Err(InputError::NoUrlsInFile)` - No line starts with `http`
/// * `Err(InputError::Io)` - The file could not be read
pub fn urls_from_file(path: &Path) -> Result<Vec<String>, InputError> {
    if !is_allowed_file(path) {
        return Err(InputError::DisallowedExtension(
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        ));
    }

    let content = std::fs::read_to_string(path)?;
    let urls = urls_from_lines(content.lines());
    if urls.is_empty() {
        return Err(InputError::NoUrlsInFile(path.to_path_buf()));
    }

    tracing::info!("Found {} URLs in {}", urls.len(), path.display());
    Ok(urls)
}
