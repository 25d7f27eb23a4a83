//! Named search variants.
//!
//! Each variant is a pure function from its arguments to a validated
//! [`CatalogQuery`]; running it is always
//! [`CatalogClient::search`](crate::client::CatalogClient::search).
//! Nothing here touches the network.

use crate::error::ClientResult;
use crate::models::{AdvancedSearchInput, CatalogQuery, PageInput, QueryField, SortOrder, check_date_order};

/// Page size and offset for a search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Paging {
    /// Requested page size; `None` uses the configured default.
    pub limit: Option<u32>,
    /// Records to skip.
    pub offset: u32,
}

impl Paging {
    /// Paging with an explicit limit.
    #[must_use]
    pub const fn new(limit: u32, offset: u32) -> Self {
        Self { limit: Some(limit), offset }
    }
}

impl From<&PageInput> for Paging {
    fn from(page: &PageInput) -> Self {
        Self { limit: page.limit, offset: page.offset }
    }
}

fn single(field: QueryField, value: &str, paging: Paging) -> ClientResult<CatalogQuery> {
    CatalogQuery::builder()
        .field(field, value)
        .limit_opt(paging.limit)
        .offset(paging.offset)
        .build()
}

/// Free-text search across all indexed fields.
///
/// # Errors
///
/// Returns a validation error if `query` is blank.
pub fn search_catalog(query: &str, paging: Paging) -> ClientResult<CatalogQuery> {
    single(QueryField::Query, query, paging)
}

/// Search by title words.
///
/// # Errors
///
/// Returns a validation error if `title` is blank.
pub fn by_title(title: &str, paging: Paging) -> ClientResult<CatalogQuery> {
    single(QueryField::Title, title, paging)
}

/// Search by author or creator.
///
/// # Errors
///
/// Returns a validation error if `author` is blank.
pub fn by_author(author: &str, paging: Paging) -> ClientResult<CatalogQuery> {
    single(QueryField::Author, author, paging)
}

/// Search by subject heading.
///
/// # Errors
///
/// Returns a validation error if `subject` is blank.
pub fn by_subject(subject: &str, paging: Paging) -> ClientResult<CatalogQuery> {
    single(QueryField::Subject, subject, paging)
}

/// Search within one collection.
///
/// # Errors
///
/// Returns a validation error if `collection` is blank.
pub fn by_collection(collection: &str, paging: Paging) -> ClientResult<CatalogQuery> {
    single(QueryField::Collection, collection, paging)
}

/// Search a publication date range, optionally narrowed by keywords.
///
/// # Errors
///
/// Returns a validation error if either date is not `YYYY-MM-DD`, the start
/// is after the end, or `query` is given but blank.
pub fn by_date_range(start: &str, end: &str, query: Option<&str>, paging: Paging) -> ClientResult<CatalogQuery> {
    check_date_order(start, end)?;
    CatalogQuery::builder()
        .field(QueryField::DateFrom, start)
        .field(QueryField::DateTo, end)
        .field_opt(QueryField::Query, query)
        .limit_opt(paging.limit)
        .offset(paging.offset)
        .build()
}

/// Search by place of origin, optionally narrowed by keywords.
///
/// # Errors
///
/// Returns a validation error if `place` is blank or `query` is given but blank.
pub fn by_geographic_origin(place: &str, query: Option<&str>, paging: Paging) -> ClientResult<CatalogQuery> {
    CatalogQuery::builder()
        .field(QueryField::GeographicOrigin, place)
        .field_opt(QueryField::Query, query)
        .limit_opt(paging.limit)
        .offset(paging.offset)
        .build()
}

/// Search on any combination of fields.
///
/// # Errors
///
/// Returns a validation error if no field is set, a field is blank, or the
/// date range is malformed or inverted.
pub fn advanced(
    fields: &[(QueryField, &str)],
    sort: Option<(&str, SortOrder)>,
    paging: Paging,
) -> ClientResult<CatalogQuery> {
    let mut builder = CatalogQuery::builder().limit_opt(paging.limit).offset(paging.offset);
    for (field, value) in fields {
        builder = builder.field(*field, *value);
    }
    if let Some((key, order)) = sort {
        builder = builder.sort(key, order);
    }
    builder.build()
}

/// Field list for [`advanced`] from tool input. Absent fields are skipped.
#[must_use]
pub fn advanced_fields(input: &AdvancedSearchInput) -> Vec<(QueryField, &str)> {
    [
        (QueryField::Query, &input.query),
        (QueryField::Title, &input.title),
        (QueryField::Author, &input.author),
        (QueryField::Subject, &input.subject),
        (QueryField::Collection, &input.collection),
        (QueryField::DateFrom, &input.start_date),
        (QueryField::DateTo, &input.end_date),
        (QueryField::GeographicOrigin, &input.origin_place),
        (QueryField::PublicationPlace, &input.publication_place),
        (QueryField::Language, &input.language),
        (QueryField::ResourceType, &input.format_type),
    ]
    .into_iter()
    .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
    .collect()
}
