use crate::ExtractionError;
use serde_json::Value;

/// Parses one embedded ld+json block and returns its description, if any
///
/// The block may be a single object, an array of objects, or an object with
/// an `@graph` array; the first non-empty string `description` wins.
pub fn description_from_ld_json(raw: &str) -> Result<Option<String>, ExtractionError> {
    let value: Value = serde_json::from_str(raw.trim())
        .map_err(|e| ExtractionError::MalformedStructuredData(e.to_string()))?;
    Ok(find_description(&value))
}

fn find_description(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(description)) = map.get("description") {
                let description = description.trim();
                if !description.is_empty() {
                    return Some(description.to_string());
                }
            }
            map.get("@graph").and_then(find_description)
        }
        Value::Array(items) => items.iter().find_map(find_description),
        _ => None,
    }
}
