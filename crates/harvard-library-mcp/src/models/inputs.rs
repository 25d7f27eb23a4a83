//! Input models for MCP tool parameters.

use serde::{Deserialize, Serialize};

use super::{RecordFormat, ResponseFormat, SortOrder};

/// Paging and output options shared by every search tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageInput {
    /// Maximum records to return (clamped to the configured maximum).
    #[serde(default)]
    pub limit: Option<u32>,

    /// Records to skip.
    #[serde(default)]
    pub offset: u32,

    /// Output format.
    #[serde(default)]
    pub response_format: ResponseFormat,
}

/// Input for free-text catalog search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchCatalogInput {
    /// Keywords, e.g. "whaling voyages".
    pub query: String,

    #[serde(flatten)]
    pub page: PageInput,
}

/// Input for title search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleSearchInput {
    /// Title words.
    pub title: String,

    #[serde(flatten)]
    pub page: PageInput,
}

/// Input for author search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorSearchInput {
    /// Author name, e.g. "Melville, Herman".
    pub author: String,

    #[serde(flatten)]
    pub page: PageInput,
}

/// Input for subject search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectSearchInput {
    /// Subject heading.
    pub subject: String,

    #[serde(flatten)]
    pub page: PageInput,
}

/// Input for collection search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionSearchInput {
    /// Collection identifier (see `get_collections_list`).
    pub collection: String,

    #[serde(flatten)]
    pub page: PageInput,
}

/// Input for date range search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateRangeSearchInput {
    /// Start date, `YYYY-MM-DD`.
    pub start_date: String,

    /// End date, `YYYY-MM-DD`, on or after the start.
    pub end_date: String,

    /// Optional keywords to narrow the range.
    #[serde(default)]
    pub query: Option<String>,

    #[serde(flatten)]
    pub page: PageInput,
}

/// Input for geographic origin search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeographicSearchInput {
    /// Place of origin, e.g. "Boston".
    pub origin_place: String,

    /// Optional keywords.
    #[serde(default)]
    pub query: Option<String>,

    #[serde(flatten)]
    pub page: PageInput,
}

/// Input for multi-field search. At least one field must be given.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdvancedSearchInput {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub collection: Option<String>,
    #[serde(default)]
    pub origin_place: Option<String>,
    #[serde(default)]
    pub publication_place: Option<String>,
    #[serde(default)]
    pub language: Option<String>,

    /// Resource type, e.g. "text" or "still image".
    #[serde(default)]
    pub format_type: Option<String>,

    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,

    /// Upstream sort field.
    #[serde(default)]
    pub sort_by: Option<String>,

    #[serde(default)]
    pub sort_order: SortOrder,

    #[serde(flatten)]
    pub page: PageInput,
}

/// Input for single record lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordDetailsInput {
    /// Catalog record identifier.
    pub record_id: String,

    /// Upstream representation to fetch.
    #[serde(default)]
    pub source_format: RecordFormat,

    /// Output format.
    #[serde(default)]
    pub response_format: ResponseFormat,
}

/// Input for the collections list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionsListInput {
    /// Output format.
    #[serde(default)]
    pub response_format: ResponseFormat,
}

/// Input for local MODS parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseModsInput {
    /// Raw MODS XML document.
    pub mods_xml: String,

    /// Output format.
    #[serde(default)]
    pub response_format: ResponseFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults() {
        let input: SearchCatalogInput = serde_json::from_value(serde_json::json!({"query": "x"})).unwrap();
        assert_eq!(input.page.limit, None);
        assert_eq!(input.page.offset, 0);
        assert_eq!(input.page.response_format, ResponseFormat::Json);
    }

    #[test]
    fn test_flattened_page_fields() {
        let input: DateRangeSearchInput = serde_json::from_value(serde_json::json!({
            "start_date": "1800-01-01",
            "end_date": "1850-12-31",
            "limit": 5,
            "offset": 10,
            "response_format": "markdown"
        }))
        .unwrap();
        assert_eq!(input.page.limit, Some(5));
        assert_eq!(input.page.offset, 10);
        assert!(input.page.response_format.is_markdown());
    }

    #[test]
    fn test_negative_limit_rejected() {
        let result: Result<SearchCatalogInput, _> =
            serde_json::from_value(serde_json::json!({"query": "x", "limit": -1}));
        assert!(result.is_err());
    }
}
