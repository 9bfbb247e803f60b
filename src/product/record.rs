use crate::extract::ExtractedFields;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Number of photo columns every record carries
pub const PHOTO_SLOTS: usize = 10;

/// Separator used when joining tags into a single field
const TAG_SEPARATOR: &str = ", ";

/// One product listing, ready for export
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductRecord {
    pub title: String,
    pub price: String,
    pub description: String,
    /// Tags joined with ", "
    pub tags: String,
    pub source_url: String,
    pub parsed_at: DateTime<Utc>,
    /// Always exactly `PHOTO_SLOTS` entries; unused slots are empty strings
    pub photos: [String; PHOTO_SLOTS],
}

impl ProductRecord {
    /// Returns the value for an output column
    ///
    /// Columns the record does not carry resolve to an empty string, which is
    /// how wider import templates are projected from the same record.
    pub fn field(&self, column: &str) -> String {
        match column {
            "title" => self.title.clone(),
            "price" => self.price.clone(),
            "description" => self.description.clone(),
            "tags" => self.tags.clone(),
            "source_url" => self.source_url.clone(),
            "parsed_at" => self.parsed_at.to_rfc3339(),
            other => photo_index(other)
                .map(|i| self.photos[i].clone())
                .unwrap_or_default(),
        }
    }

    /// Number of non-empty photo slots
    pub fn photo_count(&self) -> usize {
        self.photos.iter().filter(|p| !p.is_empty()).count()
    }
}

/// Builds a record from extracted fields
///
/// Photos beyond `PHOTO_SLOTS` are dropped and missing ones padded with empty
/// strings. Performs no I/O.
pub fn assemble(fields: ExtractedFields, source_url: &str, parsed_at: DateTime<Utc>) -> ProductRecord {
    let mut photos: [String; PHOTO_SLOTS] = Default::default();
    for (slot, image) in photos.iter_mut().zip(fields.images) {
        *slot = image;
    }

    ProductRecord {
        title: fields.title,
        price: fields.price,
        description: fields.description,
        tags: fields.tags.join(TAG_SEPARATOR),
        source_url: source_url.to_string(),
        parsed_at,
        photos,
    }
}

/// Column name for a 1-based photo slot
pub fn photo_column(slot: usize) -> String {
    format!("Photo {}", slot)
}

/// Column order of the minimal output schema
///
/// `title, price, description, tags, Photo 1, ..., Photo 10`
pub fn minimal_columns() -> Vec<String> {
    let mut columns: Vec<String> = ["title", "price", "description", "tags"]
        .iter()
        .map(|c| c.to_string())
        .collect();
    columns.extend((1..=PHOTO_SLOTS).map(photo_column));
    columns
}

/// Maps "Photo N" (1..=PHOTO_SLOTS) to a zero-based slot index
fn photo_index(column: &str) -> Option<usize> {
    let slot: usize = column.strip_prefix("Photo ")?.parse().ok()?;
    (1..=PHOTO_SLOTS).contains(&slot).then(|| slot - 1)
}
