//! Data models for the catalog: queries, normalized records, result pages
//! and tool inputs.
//!
//! Record models use `#[serde(default)]` for optional fields so partially
//! populated records still serialize and deserialize cleanly.

mod collection;
mod enums;
mod inputs;
mod query;
mod record;
mod result;

pub use collection::{COLLECTIONS, Collection, find_collection};
pub use enums::{RecordFormat, ResponseFormat};
pub use inputs::*;
pub use query::{
    AppliedFilter, CatalogQuery, CatalogQueryBuilder, QueryField, SortOrder, SortSpec,
    check_date_order, parse_date,
};
pub use record::{CatalogRecord, Holding, PublicationDate, normalize_identifier, validate_record_id};
pub use result::SearchResult;
