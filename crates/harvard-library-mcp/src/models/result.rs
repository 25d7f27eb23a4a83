//! Search result envelope.

use serde::{Deserialize, Serialize};

use super::{AppliedFilter, CatalogRecord};

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Records in upstream order, ids unique.
    pub records: Vec<CatalogRecord>,

    /// Total matches reported upstream; may exceed `records.len()`.
    pub total_count: u64,

    /// Page size requested upstream after clamping.
    pub limit: u32,

    /// Offset requested upstream.
    pub offset: u32,

    /// True if more results exist past this page.
    pub has_more: bool,

    /// Filters sent upstream.
    #[serde(default)]
    pub filters_applied: Vec<AppliedFilter>,

    /// Notes on records or fields that could not be read.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<String>,
}

impl SearchResult {
    /// Number of records on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if this page has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Compute `has_more` from the page position and total.
    #[must_use]
    pub fn more_after(offset: u32, returned: usize, total: u64) -> bool {
        u64::from(offset) + (returned as u64) < total
    }
}
