//! Product field extraction
//!
//! This module turns a product page into raw field values:
//! - Declarative per-field rule tables (`ExtractionRules`)
//! - Price amount parsing
//! - Embedded ld+json description lookup
//! - Image URL collection with de-duplication and a fixed limit

mod extractor;
mod price;
mod rules;
mod structured;

pub use extractor::{normalize_image_url, ExtractedFields, FieldExtractor};
pub use price::PriceParser;
pub use rules::{ExtractionRules, ImageRule, TagRule, TextRule, ValueSource};
pub use structured::description_from_ld_json;
