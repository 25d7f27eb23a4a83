//! MCP tool implementations.
//!
//! Each tool:
//! 1. Parses and validates its input parameters
//! 2. Builds a query through [`crate::search`] or calls the normalizer directly
//! 3. Formats results as JSON or Markdown

mod records;
mod search;

pub use records::*;
pub use search::*;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};

use crate::client::{CatalogClient, with_deadline};
use crate::error::{ClientResult, ToolResult};

/// Tool execution context.
pub struct ToolContext {
    /// API client.
    pub client: Arc<CatalogClient>,

    /// Deadline applied to every catalog call made by a tool.
    pub deadline: Option<Duration>,
}

impl ToolContext {
    /// Create a new tool context with no deadline.
    #[must_use]
    pub const fn new(client: Arc<CatalogClient>) -> Self {
        Self { client, deadline: None }
    }

    /// Set the per-call deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Run a catalog call under this context's deadline, if any.
    ///
    /// # Errors
    ///
    /// Returns whatever `fut` returns, or a cancellation error on expiry.
    pub async fn call<T, F>(&self, fut: F) -> ClientResult<T>
    where
        F: Future<Output = ClientResult<T>>,
    {
        match self.deadline {
            Some(deadline) => with_deadline(deadline, fut).await,
            None => fut.await,
        }
    }
}

impl std::fmt::Debug for ToolContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolContext").field("client", &self.client).field("deadline", &self.deadline).finish()
    }
}

/// Trait for MCP tools.
#[async_trait::async_trait]
pub trait McpTool: Send + Sync {
    /// Tool name (e.g., "search_by_title").
    fn name(&self) -> &'static str;

    /// Tool description for LLM.
    fn description(&self) -> &'static str;

    /// JSON Schema for input parameters.
    fn input_schema(&self) -> Value;

    /// Execute the tool with given input.
    async fn execute(&self, ctx: &ToolContext, input: Value) -> ToolResult<String>;
}

/// Register all tools.
#[must_use]
pub fn register_all_tools() -> Vec<Box<dyn McpTool>> {
    vec![
        // Search tools (8)
        Box::new(search::SearchCatalogTool),
        Box::new(search::TitleSearchTool),
        Box::new(search::AuthorSearchTool),
        Box::new(search::SubjectSearchTool),
        Box::new(search::CollectionSearchTool),
        Box::new(search::DateRangeSearchTool),
        Box::new(search::GeographicSearchTool),
        Box::new(search::AdvancedSearchTool),

        // Record and utility tools (3)
        Box::new(records::RecordDetailsTool),
        Box::new(records::CollectionsListTool),
        Box::new(records::ParseModsTool),
    ]
}

fn response_format_schema() -> Value {
    json!({
        "type": "string",
        "enum": ["json", "markdown"],
        "default": "json",
        "description": "Output format"
    })
}

/// Schema for a search tool: its own properties plus the shared paging ones.
fn search_schema(mut properties: Value, required: &[&str]) -> Value {
    properties["limit"] = json!({
        "type": "integer",
        "minimum": 1,
        "maximum": 100,
        "default": 20,
        "description": "Maximum records to return"
    });
    properties["offset"] = json!({
        "type": "integer",
        "minimum": 0,
        "default": 0,
        "description": "Records to skip"
    });
    properties["response_format"] = response_format_schema();

    json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}
