//! Record and utility tools: get_record_details, get_collections_list,
//! parse_mods_metadata.

use serde_json::{Value, json};

use super::{McpTool, ToolContext, response_format_schema};
use crate::error::{ToolError, ToolResult};
use crate::formatters;
use crate::models::{CollectionsListInput, ParseModsInput, RecordDetailsInput, ResponseFormat};
use crate::normalize::mods::{self, XmlBody};

/// Single record lookup tool.
pub struct RecordDetailsTool;

#[async_trait::async_trait]
impl McpTool for RecordDetailsTool {
    fn name(&self) -> &'static str {
        "get_record_details"
    }

    fn description(&self) -> &'static str {
        "Get the full bibliographic record for one catalog ID, \
         including the original MODS XML."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "record_id": {
                    "type": "string",
                    "description": "Catalog record identifier"
                },
                "source_format": {
                    "type": "string",
                    "enum": ["json", "mods"],
                    "default": "json",
                    "description": "Upstream representation to fetch"
                },
                "response_format": response_format_schema()
            },
            "required": ["record_id"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: Value) -> ToolResult<String> {
        let params: RecordDetailsInput = serde_json::from_value(input)?;

        let record = ctx
            .call(ctx.client.get_record_as(&params.record_id, params.source_format))
            .await
            .map_err(ToolError::from)?;

        if record.is_partial() {
            tracing::warn!(id = %record.id, notes = record.diagnostics.len(), "Record partially parsed");
        }

        match params.response_format {
            ResponseFormat::Markdown => Ok(formatters::format_record_markdown(&record)),
            ResponseFormat::Json => Ok(serde_json::to_string_pretty(&record)?),
        }
    }
}

/// Curated collections list tool.
pub struct CollectionsListTool;

#[async_trait::async_trait]
impl McpTool for CollectionsListTool {
    fn name(&self) -> &'static str {
        "get_collections_list"
    }

    fn description(&self) -> &'static str {
        "List known library collections with IDs usable in search_by_collection."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "response_format": response_format_schema()
            }
        })
    }

    async fn execute(&self, _ctx: &ToolContext, input: Value) -> ToolResult<String> {
        // Clients may send null for a tool with no required arguments.
        let params: CollectionsListInput =
            if input.is_null() { CollectionsListInput::default() } else { serde_json::from_value(input)? };

        match params.response_format {
            ResponseFormat::Markdown => Ok(formatters::format_collections_markdown()),
            ResponseFormat::Json => Ok(serde_json::to_string_pretty(&formatters::collections_json())?),
        }
    }
}

/// Local MODS parsing tool.
pub struct ParseModsTool;

#[async_trait::async_trait]
impl McpTool for ParseModsTool {
    fn name(&self) -> &'static str {
        "parse_mods_metadata"
    }

    fn description(&self) -> &'static str {
        "Parse a MODS XML document into structured metadata without calling the catalog. \
         A <modsCollection> yields one record per <mods> element."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "mods_xml": {
                    "type": "string",
                    "description": "Raw MODS XML"
                },
                "response_format": response_format_schema()
            },
            "required": ["mods_xml"]
        })
    }

    async fn execute(&self, _ctx: &ToolContext, input: Value) -> ToolResult<String> {
        let params: ParseModsInput = serde_json::from_value(input)?;

        if params.mods_xml.trim().is_empty() {
            return Err(ToolError::validation("mods_xml", "must not be empty"));
        }

        let (records, notes) = match mods::body_from_xml(&params.mods_xml)? {
            XmlBody::Record(record) => (vec![record], Vec::new()),
            // No <mods> anywhere: read what we can from the root instead.
            XmlBody::Page(page) if page.records.is_empty() => {
                (vec![mods::record_from_xml(&params.mods_xml)?], Vec::new())
            }
            XmlBody::Page(page) => (page.records, page.diagnostics),
        };

        match params.response_format {
            ResponseFormat::Markdown => {
                let mut output =
                    records.iter().map(formatters::format_record_markdown).collect::<Vec<_>>().join("\n---\n\n");
                for note in &notes {
                    output.push_str(&format!("\n- {note}"));
                }
                Ok(output)
            }
            ResponseFormat::Json => match records.as_slice() {
                [single] if notes.is_empty() => Ok(serde_json::to_string_pretty(single)?),
                many => Ok(serde_json::to_string_pretty(&json!({
                    "count": many.len(),
                    "records": many,
                    "diagnostics": notes
                }))?),
            },
        }
    }
}
