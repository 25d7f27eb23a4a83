//! Catalog query model.
//!
//! A [`CatalogQuery`] is built once through [`CatalogQueryBuilder`] and never
//! mutated afterwards. Field storage is a `BTreeMap` keyed by [`QueryField`],
//! so the upstream parameter list comes out in the same order every time.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid date regex"));

static SORT_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9._]{0,63}$").expect("valid sort regex"));

/// A searchable field and its upstream parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryField {
    /// Free-text keyword search.
    Query,
    /// Title words.
    Title,
    /// Author or creator name.
    Author,
    /// Subject heading.
    Subject,
    /// Collection (set) identifier.
    Collection,
    /// Earliest publication date, `YYYY-MM-DD`.
    DateFrom,
    /// Latest publication date, `YYYY-MM-DD`.
    DateTo,
    /// Place the item originates from.
    GeographicOrigin,
    /// Place of publication.
    PublicationPlace,
    /// Language name or code.
    Language,
    /// Resource type (text, still image, cartographic...).
    ResourceType,
}

impl QueryField {
    /// Every field, in parameter order.
    pub const ALL: [Self; 11] = [
        Self::Query,
        Self::Title,
        Self::Author,
        Self::Subject,
        Self::Collection,
        Self::DateFrom,
        Self::DateTo,
        Self::GeographicOrigin,
        Self::PublicationPlace,
        Self::Language,
        Self::ResourceType,
    ];

    /// Upstream query parameter name.
    #[must_use]
    pub const fn param(self) -> &'static str {
        match self {
            Self::Query => "q",
            Self::Title => "title",
            Self::Author => "author",
            Self::Subject => "subject",
            Self::Collection => "setName",
            Self::DateFrom => "dates.start",
            Self::DateTo => "dates.end",
            Self::GeographicOrigin => "originPlace",
            Self::PublicationPlace => "pubPlace",
            Self::Language => "language",
            Self::ResourceType => "resourceType",
        }
    }

    /// Field name as used in tool arguments.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Title => "title",
            Self::Author => "author",
            Self::Subject => "subject",
            Self::Collection => "collection",
            Self::DateFrom => "date_from",
            Self::DateTo => "date_to",
            Self::GeographicOrigin => "geographic_origin",
            Self::PublicationPlace => "publication_place",
            Self::Language => "language",
            Self::ResourceType => "resource_type",
        }
    }

    const fn is_date(self) -> bool {
        matches!(self, Self::DateFrom | Self::DateTo)
    }
}

impl fmt::Display for QueryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending (upstream default).
    #[default]
    Asc,
    /// Descending.
    Desc,
}

/// Sort key and direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    /// Upstream sort field, e.g. `title` or `dateIssued`.
    pub field: String,
    /// Direction.
    #[serde(default)]
    pub order: SortOrder,
}

/// One filter that was sent upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedFilter {
    /// Field name.
    pub field: QueryField,
    /// Upstream parameter name.
    pub param: String,
    /// Value sent.
    pub value: String,
}

/// An immutable, validated search description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogQuery {
    fields: BTreeMap<QueryField, String>,
    limit: Option<u32>,
    offset: u32,
    sort: Option<SortSpec>,
}

impl CatalogQuery {
    /// Start building a query.
    #[must_use]
    pub fn builder() -> CatalogQueryBuilder {
        CatalogQueryBuilder::default()
    }

    /// Value of one field, if set.
    #[must_use]
    pub fn get(&self, field: QueryField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    /// Fields that are set, in parameter order.
    pub fn fields(&self) -> impl Iterator<Item = (QueryField, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Number of fields set.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Requested page size, before clamping.
    #[must_use]
    pub fn limit(&self) -> Option<u32> {
        self.limit
    }

    /// Result offset.
    #[must_use]
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Sort, if any.
    #[must_use]
    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    /// Page size actually requested: the caller's limit (or `default_limit`)
    /// clamped into `1..=max_limit`.
    #[must_use]
    pub fn effective_limit(&self, default_limit: u32, max_limit: u32) -> u32 {
        let max = max_limit.max(1);
        self.limit.unwrap_or(default_limit).clamp(1, max)
    }

    /// Filters as they will be sent upstream.
    #[must_use]
    pub fn applied_filters(&self) -> Vec<AppliedFilter> {
        self.fields
            .iter()
            .map(|(field, value)| AppliedFilter {
                field: *field,
                param: field.param().to_string(),
                value: value.clone(),
            })
            .collect()
    }

    /// Upstream query parameters, in a fixed order: fields, sort, `limit`, `start`.
    #[must_use]
    pub fn to_params(&self, default_limit: u32, max_limit: u32) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = self
            .fields
            .iter()
            .map(|(field, value)| (field.param().to_string(), value.clone()))
            .collect();

        if let Some(sort) = &self.sort {
            params.push(("sort".to_string(), sort.field.clone()));
            if sort.order == SortOrder::Desc {
                params.push(("sortDirection".to_string(), "descending".to_string()));
            }
        }

        params.push(("limit".to_string(), self.effective_limit(default_limit, max_limit).to_string()));
        params.push(("start".to_string(), self.offset.to_string()));
        params
    }
}

/// Builder for [`CatalogQuery`].
#[derive(Debug, Clone, Default)]
pub struct CatalogQueryBuilder {
    fields: BTreeMap<QueryField, String>,
    limit: Option<u32>,
    offset: u32,
    sort: Option<SortSpec>,
}

impl CatalogQueryBuilder {
    /// Set a field. Later values for the same field replace earlier ones.
    #[must_use]
    pub fn field(mut self, field: QueryField, value: impl Into<String>) -> Self {
        self.fields.insert(field, value.into());
        self
    }

    /// Set a field when `value` is `Some`.
    #[must_use]
    pub fn field_opt(self, field: QueryField, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(v) => self.field(field, v),
            None => self,
        }
    }

    /// Requested page size.
    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Requested page size, if any.
    #[must_use]
    pub fn limit_opt(mut self, limit: Option<u32>) -> Self {
        self.limit = limit;
        self
    }

    /// Result offset.
    #[must_use]
    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    /// Sort field and direction.
    #[must_use]
    pub fn sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some(SortSpec { field: field.into(), order });
        self
    }

    /// Validate and freeze the query.
    ///
    /// Values are trimmed. Blank values are rejected rather than dropped so a
    /// caller never gets a broader search than they asked for.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] if no field is set, a value is
    /// blank, a date is not `YYYY-MM-DD`, the date range is inverted, the
    /// limit is zero, or the sort key is malformed.
    pub fn build(self) -> ClientResult<CatalogQuery> {
        let mut fields = BTreeMap::new();
        for (field, value) in self.fields {
            let value = value.trim();
            if value.is_empty() {
                return Err(ClientError::validation(field.as_str(), "must not be empty"));
            }
            if field.is_date() {
                parse_date(field.as_str(), value)?;
            }
            fields.insert(field, value.to_string());
        }

        if fields.is_empty() {
            return Err(ClientError::validation("query", "at least one search field must be set"));
        }

        if let (Some(from), Some(to)) = (fields.get(&QueryField::DateFrom), fields.get(&QueryField::DateTo)) {
            check_date_order(from, to)?;
        }

        if self.limit == Some(0) {
            return Err(ClientError::validation("limit", "must be at least 1"));
        }

        if let Some(sort) = &self.sort {
            if !SORT_KEY.is_match(&sort.field) {
                return Err(ClientError::validation("sort_by", "must be a plain field name"));
            }
        }

        Ok(CatalogQuery { fields, limit: self.limit, offset: self.offset, sort: self.sort })
    }
}

/// Parse a strict `YYYY-MM-DD` calendar date.
///
/// # Errors
///
/// Returns a validation error naming `field` if the text is not a real date
/// in that exact shape.
pub fn parse_date(field: &str, value: &str) -> ClientResult<NaiveDate> {
    let value = value.trim();
    if !ISO_DATE.is_match(value) {
        return Err(ClientError::validation(field, format!("'{value}' is not in YYYY-MM-DD format")));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ClientError::validation(field, format!("'{value}' is not a valid calendar date")))
}

/// Check that `start` is on or before `end`.
///
/// # Errors
///
/// Returns a validation error if either date is malformed or `start > end`.
pub fn check_date_order(start: &str, end: &str) -> ClientResult<()> {
    let from = parse_date("start_date", start)?;
    let to = parse_date("end_date", end)?;
    if from > to {
        return Err(ClientError::validation(
            "start_date",
            format!("{start} is after end date {end}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_rejected() {
        let err = CatalogQuery::builder().limit(10).build().unwrap_err();
        assert!(matches!(err, ClientError::Validation { .. }));
    }

    #[test]
    fn test_blank_value_rejected() {
        let err = CatalogQuery::builder().field(QueryField::Title, "   ").build().unwrap_err();
        assert!(err.to_string().contains("title"));
    }

    #[test]
    fn test_values_trimmed() {
        let q = CatalogQuery::builder().field(QueryField::Author, "  Dickens ").build().unwrap();
        assert_eq!(q.get(QueryField::Author), Some("Dickens"));
    }

    #[test]
    fn test_params_fixed_order() {
        let q = CatalogQuery::builder()
            .field(QueryField::Subject, "whaling")
            .field(QueryField::Query, "moby dick")
            .sort("title", SortOrder::Desc)
            .limit(5)
            .offset(10)
            .build()
            .unwrap();

        let params = q.to_params(20, 100);
        let keys: Vec<&str> = params.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["q", "subject", "sort", "sortDirection", "limit", "start"]);
        assert_eq!(params[4].1, "5");
        assert_eq!(params[5].1, "10");
    }

    #[test]
    fn test_limit_clamped() {
        let q = CatalogQuery::builder().field(QueryField::Query, "x").limit(500).build().unwrap();
        assert_eq!(q.effective_limit(20, 100), 100);

        let q = CatalogQuery::builder().field(QueryField::Query, "x").build().unwrap();
        assert_eq!(q.effective_limit(20, 100), 20);
    }

    #[test]
    fn test_zero_limit_rejected() {
        assert!(CatalogQuery::builder().field(QueryField::Query, "x").limit(0).build().is_err());
    }

    #[test]
    fn test_date_shape_enforced() {
        assert!(parse_date("d", "2020-01-01").is_ok());
        assert!(parse_date("d", "2020-1-1").is_err());
        assert!(parse_date("d", "2020-02-30").is_err());
        assert!(parse_date("d", "01/02/2020").is_err());
        assert!(parse_date("d", "١٨٥١-05-01").is_err());
    }

    #[test]
    fn test_inverted_range_rejected_in_builder() {
        let err = CatalogQuery::builder()
            .field(QueryField::DateFrom, "2023-01-01")
            .field(QueryField::DateTo, "2020-01-01")
            .build()
            .unwrap_err();
        assert!(matches!(err, ClientError::Validation { .. }));
    }

    #[test]
    fn test_bad_sort_key_rejected() {
        let err = CatalogQuery::builder()
            .field(QueryField::Query, "x")
            .sort("title&limit=1000", SortOrder::Asc)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("sort_by"));
    }
}
