//! Enumeration types for tool parameters.

use serde::{Deserialize, Serialize};

/// Output format for tool responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// Normalized structures as JSON.
    #[default]
    Json,
    /// Human-readable Markdown summary.
    Markdown,
}

impl ResponseFormat {
    /// Check if this is markdown format.
    #[must_use]
    pub const fn is_markdown(self) -> bool {
        matches!(self, Self::Markdown)
    }
}

/// Upstream representation to fetch for a single record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordFormat {
    /// `items/{id}.json`, MODS inline or by reference.
    #[default]
    Json,
    /// `items/{id}.xml`, MODS directly.
    #[serde(alias = "xml")]
    Mods,
}

impl RecordFormat {
    /// File extension on the record endpoint.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Mods => "xml",
        }
    }
}
