//! JSON output formatting.
//!
//! Search pages use a compact record form that leaves out the MODS text;
//! single records are emitted whole.

use serde_json::{Value, json};

use crate::models::{COLLECTIONS, CatalogRecord, SearchResult};

/// Create a compact record representation for search listings.
#[must_use]
pub fn compact_record(record: &CatalogRecord) -> Value {
    let mut obj = json!({
        "id": record.id,
        "title": record.title,
    });

    if !record.authors.is_empty() {
        obj["authors"] = json!(record.authors);
    }

    if let Some(date) = &record.publication_date {
        obj["date"] = json!(date.display);
        if let Some(year) = date.year {
            obj["year"] = json!(year);
        }
    }

    if let Some(publisher) = &record.publisher {
        obj["publisher"] = json!(publisher);
    }

    if let Some(language) = &record.language {
        obj["language"] = json!(language);
    }

    if let Some(kind) = &record.resource_type {
        obj["resourceType"] = json!(kind);
    }

    if !record.subjects.is_empty() {
        obj["subjects"] = json!(record.subjects);
    }

    if !record.identifiers.is_empty() {
        obj["identifiers"] = json!(record.identifiers);
    }

    if !record.collections.is_empty() {
        obj["collections"] = json!(record.collections);
    }

    if record.digital_content {
        obj["digitalContent"] = json!(true);
    }

    if let Some(score) = record.stackscore {
        obj["stackscore"] = json!(score);
    }

    obj["hasMods"] = json!(record.mods_xml.is_some());

    if record.is_partial() {
        obj["diagnostics"] = json!(record.diagnostics);
    }

    obj
}

/// A search page with compact records and its paging metadata.
#[must_use]
pub fn search_result_json(result: &SearchResult) -> Value {
    let mut obj = json!({
        "totalCount": result.total_count,
        "returned": result.len(),
        "limit": result.limit,
        "offset": result.offset,
        "hasMore": result.has_more,
        "filtersApplied": result.filters_applied,
        "records": result.records.iter().map(compact_record).collect::<Vec<_>>(),
    });

    if !result.diagnostics.is_empty() {
        obj["diagnostics"] = json!(result.diagnostics);
    }

    obj
}

/// The curated collections list.
#[must_use]
pub fn collections_json() -> Value {
    json!({
        "count": COLLECTIONS.len(),
        "collections": COLLECTIONS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PublicationDate;

    #[test]
    fn test_compact_record() {
        let record = CatalogRecord {
            id: "990001".to_string(),
            title: "Moby-Dick".to_string(),
            authors: vec!["Melville, Herman".to_string()],
            publication_date: PublicationDate::parse("1851"),
            mods_xml: Some("<mods/>".to_string()),
            ..Default::default()
        };

        let compact = compact_record(&record);

        assert_eq!(compact["id"], "990001");
        assert_eq!(compact["title"], "Moby-Dick");
        assert_eq!(compact["year"], 1851);
        assert_eq!(compact["authors"], json!(["Melville, Herman"]));
        assert_eq!(compact["hasMods"], true);
        assert!(compact.get("publisher").is_none());
        assert!(compact.get("diagnostics").is_none());
    }

    #[test]
    fn test_search_result_json_paging() {
        let result = SearchResult { total_count: 45, limit: 20, offset: 20, has_more: true, ..Default::default() };
        let value = search_result_json(&result);
        assert_eq!(value["totalCount"], 45);
        assert_eq!(value["returned"], 0);
        assert_eq!(value["hasMore"], true);
    }

    #[test]
    fn test_collections_json() {
        let value = collections_json();
        assert_eq!(value["count"], COLLECTIONS.len());
        assert_eq!(value["collections"][0]["id"], COLLECTIONS[0].id);
    }
}
