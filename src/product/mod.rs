//! Product records
//!
//! A `ProductRecord` is the fixed-schema row produced for each successfully
//! parsed page. Records are built once by `assemble` and never modified.

mod record;

pub use record::{assemble, minimal_columns, photo_column, ProductRecord, PHOTO_SLOTS};
