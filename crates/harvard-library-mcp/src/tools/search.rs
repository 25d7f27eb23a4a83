//! Search tools: search_catalog, search_by_title, search_by_author,
//! search_by_subject, search_by_collection, search_by_date_range,
//! search_by_geographic_origin, advanced_search.

use serde_json::{Value, json};

use super::{McpTool, ToolContext, search_schema};
use crate::error::{ToolError, ToolResult};
use crate::formatters;
use crate::models::{
    AdvancedSearchInput, AuthorSearchInput, CatalogQuery, CollectionSearchInput, DateRangeSearchInput,
    GeographicSearchInput, ResponseFormat, SearchCatalogInput, SubjectSearchInput, TitleSearchInput,
};
use crate::search::{self, Paging};

/// Run a built query and format the page.
async fn run_search(ctx: &ToolContext, query: &CatalogQuery, format: ResponseFormat) -> ToolResult<String> {
    let result = ctx.call(ctx.client.search(query)).await.map_err(ToolError::from)?;

    tracing::debug!(
        returned = result.len(),
        total = result.total_count,
        diagnostics = result.diagnostics.len(),
        "Search complete"
    );

    match format {
        ResponseFormat::Markdown => Ok(formatters::format_search_markdown(&result)),
        ResponseFormat::Json => Ok(serde_json::to_string_pretty(&formatters::search_result_json(&result))?),
    }
}

/// Free-text catalog search tool.
pub struct SearchCatalogTool;

#[async_trait::async_trait]
impl McpTool for SearchCatalogTool {
    fn name(&self) -> &'static str {
        "search_catalog"
    }

    fn description(&self) -> &'static str {
        "Search the Harvard Library catalog by keyword across all indexed fields."
    }

    fn input_schema(&self) -> Value {
        search_schema(
            json!({
                "query": {
                    "type": "string",
                    "description": "Keywords, e.g. \"whaling voyages\""
                }
            }),
            &["query"],
        )
    }

    async fn execute(&self, ctx: &ToolContext, input: Value) -> ToolResult<String> {
        let params: SearchCatalogInput = serde_json::from_value(input)?;
        let query = search::search_catalog(&params.query, Paging::from(&params.page))?;
        run_search(ctx, &query, params.page.response_format).await
    }
}

/// Title search tool.
pub struct TitleSearchTool;

#[async_trait::async_trait]
impl McpTool for TitleSearchTool {
    fn name(&self) -> &'static str {
        "search_by_title"
    }

    fn description(&self) -> &'static str {
        "Search the catalog by title words."
    }

    fn input_schema(&self) -> Value {
        search_schema(
            json!({
                "title": {
                    "type": "string",
                    "description": "Title or part of a title"
                }
            }),
            &["title"],
        )
    }

    async fn execute(&self, ctx: &ToolContext, input: Value) -> ToolResult<String> {
        let params: TitleSearchInput = serde_json::from_value(input)?;
        let query = search::by_title(&params.title, Paging::from(&params.page))?;
        run_search(ctx, &query, params.page.response_format).await
    }
}

/// Author search tool.
pub struct AuthorSearchTool;

#[async_trait::async_trait]
impl McpTool for AuthorSearchTool {
    fn name(&self) -> &'static str {
        "search_by_author"
    }

    fn description(&self) -> &'static str {
        "Search the catalog by author or creator name."
    }

    fn input_schema(&self) -> Value {
        search_schema(
            json!({
                "author": {
                    "type": "string",
                    "description": "Author name, e.g. \"Melville, Herman\""
                }
            }),
            &["author"],
        )
    }

    async fn execute(&self, ctx: &ToolContext, input: Value) -> ToolResult<String> {
        let params: AuthorSearchInput = serde_json::from_value(input)?;
        let query = search::by_author(&params.author, Paging::from(&params.page))?;
        run_search(ctx, &query, params.page.response_format).await
    }
}

/// Subject search tool.
pub struct SubjectSearchTool;

#[async_trait::async_trait]
impl McpTool for SubjectSearchTool {
    fn name(&self) -> &'static str {
        "search_by_subject"
    }

    fn description(&self) -> &'static str {
        "Search the catalog by subject heading."
    }

    fn input_schema(&self) -> Value {
        search_schema(
            json!({
                "subject": {
                    "type": "string",
                    "description": "Subject heading, e.g. \"Whaling\""
                }
            }),
            &["subject"],
        )
    }

    async fn execute(&self, ctx: &ToolContext, input: Value) -> ToolResult<String> {
        let params: SubjectSearchInput = serde_json::from_value(input)?;
        let query = search::by_subject(&params.subject, Paging::from(&params.page))?;
        run_search(ctx, &query, params.page.response_format).await
    }
}

/// Collection search tool.
pub struct CollectionSearchTool;

#[async_trait::async_trait]
impl McpTool for CollectionSearchTool {
    fn name(&self) -> &'static str {
        "search_by_collection"
    }

    fn description(&self) -> &'static str {
        "Search within one library collection. \
         Use get_collections_list for known collection IDs."
    }

    fn input_schema(&self) -> Value {
        search_schema(
            json!({
                "collection": {
                    "type": "string",
                    "description": "Collection identifier, e.g. \"Harvard_Medical_School\""
                }
            }),
            &["collection"],
        )
    }

    async fn execute(&self, ctx: &ToolContext, input: Value) -> ToolResult<String> {
        let params: CollectionSearchInput = serde_json::from_value(input)?;
        let query = search::by_collection(&params.collection, Paging::from(&params.page))?;
        run_search(ctx, &query, params.page.response_format).await
    }
}

/// Date range search tool.
pub struct DateRangeSearchTool;

#[async_trait::async_trait]
impl McpTool for DateRangeSearchTool {
    fn name(&self) -> &'static str {
        "search_by_date_range"
    }

    fn description(&self) -> &'static str {
        "Search for records published within a date range (YYYY-MM-DD, inclusive), \
         optionally narrowed by keywords."
    }

    fn input_schema(&self) -> Value {
        search_schema(
            json!({
                "start_date": {
                    "type": "string",
                    "pattern": "^\\d{4}-\\d{2}-\\d{2}$",
                    "description": "Earliest date, YYYY-MM-DD"
                },
                "end_date": {
                    "type": "string",
                    "pattern": "^\\d{4}-\\d{2}-\\d{2}$",
                    "description": "Latest date, YYYY-MM-DD, not before start_date"
                },
                "query": {
                    "type": "string",
                    "description": "Optional keywords"
                }
            }),
            &["start_date", "end_date"],
        )
    }

    async fn execute(&self, ctx: &ToolContext, input: Value) -> ToolResult<String> {
        let params: DateRangeSearchInput = serde_json::from_value(input)?;
        let query = search::by_date_range(
            &params.start_date,
            &params.end_date,
            params.query.as_deref(),
            Paging::from(&params.page),
        )?;
        run_search(ctx, &query, params.page.response_format).await
    }
}

/// Geographic origin search tool.
pub struct GeographicSearchTool;

#[async_trait::async_trait]
impl McpTool for GeographicSearchTool {
    fn name(&self) -> &'static str {
        "search_by_geographic_origin"
    }

    fn description(&self) -> &'static str {
        "Search for records by place of origin, optionally narrowed by keywords."
    }

    fn input_schema(&self) -> Value {
        search_schema(
            json!({
                "origin_place": {
                    "type": "string",
                    "description": "Place of origin, e.g. \"Boston\""
                },
                "query": {
                    "type": "string",
                    "description": "Optional keywords"
                }
            }),
            &["origin_place"],
        )
    }

    async fn execute(&self, ctx: &ToolContext, input: Value) -> ToolResult<String> {
        let params: GeographicSearchInput = serde_json::from_value(input)?;
        let query =
            search::by_geographic_origin(&params.origin_place, params.query.as_deref(), Paging::from(&params.page))?;
        run_search(ctx, &query, params.page.response_format).await
    }
}

/// Multi-field search tool.
pub struct AdvancedSearchTool;

#[async_trait::async_trait]
impl McpTool for AdvancedSearchTool {
    fn name(&self) -> &'static str {
        "advanced_search"
    }

    fn description(&self) -> &'static str {
        "Search on any combination of fields. At least one field is required; \
         all given fields must match."
    }

    fn input_schema(&self) -> Value {
        let text = |description: &str| json!({"type": "string", "description": description});
        search_schema(
            json!({
                "query": text("Keywords across all fields"),
                "title": text("Title words"),
                "author": text("Author or creator name"),
                "subject": text("Subject heading"),
                "collection": text("Collection identifier"),
                "origin_place": text("Place of origin"),
                "publication_place": text("Place of publication"),
                "language": text("Language name or code"),
                "format_type": text("Resource type, e.g. \"text\" or \"still image\""),
                "start_date": text("Earliest date, YYYY-MM-DD"),
                "end_date": text("Latest date, YYYY-MM-DD"),
                "sort_by": text("Upstream sort field, e.g. \"title\""),
                "sort_order": {
                    "type": "string",
                    "enum": ["asc", "desc"],
                    "default": "asc"
                }
            }),
            &[],
        )
    }

    async fn execute(&self, ctx: &ToolContext, input: Value) -> ToolResult<String> {
        let params: AdvancedSearchInput = serde_json::from_value(input)?;

        let fields = search::advanced_fields(&params);
        if fields.is_empty() {
            return Err(ToolError::validation("advanced_search", "at least one search field is required"));
        }

        let sort = params.sort_by.as_deref().map(|key| (key, params.sort_order));
        let query = search::advanced(&fields, sort, Paging::from(&params.page))?;
        run_search(ctx, &query, params.page.response_format).await
    }
}
