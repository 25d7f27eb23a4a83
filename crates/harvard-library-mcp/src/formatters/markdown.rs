//! Markdown output formatting.

use std::borrow::Cow;

use crate::models::{COLLECTIONS, CatalogRecord, SearchResult};

/// Longest description shown in a listing.
const MAX_DESCRIPTION: usize = 300;

/// Format a search page as Markdown.
#[must_use]
pub fn format_search_markdown(result: &SearchResult) -> String {
    if result.is_empty() {
        let mut output = "No records found.".to_string();
        if !result.filters_applied.is_empty() {
            output.push_str(&format!("\n\n**Filters**: {}", filter_line(result)));
        }
        return output;
    }

    let first = u64::from(result.offset) + 1;
    let last = u64::from(result.offset) + result.len() as u64;
    let mut output = format!("# Records {first}-{last} of {}\n\n", result.total_count);

    if !result.filters_applied.is_empty() {
        output.push_str(&format!("**Filters**: {}\n\n", filter_line(result)));
    }

    for (i, record) in result.records.iter().enumerate() {
        output.push_str(&format_record_summary(record, result.offset as usize + i + 1));
        output.push_str("\n---\n\n");
    }

    if result.has_more {
        output.push_str(&format!("_More results available: use offset {last}._\n"));
    }

    if !result.diagnostics.is_empty() {
        output.push_str("\n**Notes**:\n");
        for note in &result.diagnostics {
            output.push_str(&format!("- {note}\n"));
        }
    }

    output
}

fn filter_line(result: &SearchResult) -> String {
    result
        .filters_applied
        .iter()
        .map(|f| format!("{} = \"{}\"", f.field, f.value))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Format one record as a numbered listing entry.
#[must_use]
pub fn format_record_summary(record: &CatalogRecord, index: usize) -> String {
    let mut output = String::new();

    output.push_str(&format!("## {}. {}\n\n", index, title_or_default(record)));

    if !record.authors.is_empty() {
        output.push_str(&format!("**Authors**: {}\n\n", record.author_line()));
    }

    let meta = meta_line(record);
    if !meta.is_empty() {
        output.push_str(&format!("{meta}\n\n"));
    }

    if !record.subjects.is_empty() {
        output.push_str(&format!("**Subjects**: {}\n\n", record.subjects.join("; ")));
    }

    if let Some(desc) = &record.description {
        let truncated: Cow<'_, str> = if desc.chars().count() > MAX_DESCRIPTION {
            Cow::Owned(format!("{}...", desc.chars().take(MAX_DESCRIPTION).collect::<String>()))
        } else {
            Cow::Borrowed(desc)
        };
        output.push_str(&format!("**Description**: {truncated}\n\n"));
    }

    output.push_str(&format!("**Record ID**: `{}`\n", record.id));

    output
}

/// Format a full record as Markdown.
#[must_use]
pub fn format_record_markdown(record: &CatalogRecord) -> String {
    let mut output = format!("# {}\n\n", title_or_default(record));

    output.push_str(&format!("**Record ID**: `{}`\n\n", record.id));

    if !record.authors.is_empty() {
        output.push_str("## Authors\n\n");
        for author in &record.authors {
            output.push_str(&format!("- {author}\n"));
        }
        output.push('\n');
    }

    let meta = meta_line(record);
    if !meta.is_empty() {
        output.push_str(&format!("{meta}\n\n"));
    }

    if let Some(place) = &record.origin_place {
        output.push_str(&format!("**Place of origin**: {place}\n\n"));
    }

    if let Some(desc) = &record.description {
        output.push_str(&format!("## Description\n\n{desc}\n\n"));
    }

    if !record.subjects.is_empty() {
        output.push_str("## Subjects\n\n");
        for subject in &record.subjects {
            output.push_str(&format!("- {subject}\n"));
        }
        output.push('\n');
    }

    if !record.identifiers.is_empty() {
        output.push_str("## Identifiers\n\n");
        for (scheme, value) in &record.identifiers {
            output.push_str(&format!("- **{scheme}**: {value}\n"));
        }
        output.push('\n');
    }

    if !record.classification.is_empty() {
        output.push_str(&format!("**Classification**: {}\n\n", record.classification.join(", ")));
    }

    if !record.collections.is_empty() {
        output.push_str(&format!("**Collections**: {}\n\n", record.collections.join(", ")));
    }

    if !record.holdings.is_empty() {
        output.push_str("## Holdings\n\n");
        for holding in &record.holdings {
            let mut line = holding.location.clone().unwrap_or_else(|| "Unknown location".to_string());
            if let Some(shelf) = &holding.shelf_locator {
                line.push_str(&format!(" ({shelf})"));
            }
            if let Some(url) = &holding.url {
                line.push_str(&format!(" <{url}>"));
            }
            output.push_str(&format!("- {line}\n"));
        }
        output.push('\n');
    }

    if record.digital_content {
        output.push_str("**Digital copy**: available\n\n");
    }

    if let Some(score) = record.stackscore {
        output.push_str(&format!("**Stackscore**: {score}\n\n"));
    }

    if let Some(mods) = &record.mods_xml {
        output.push_str(&format!("_Original MODS XML available ({} bytes)._\n\n", mods.len()));
    }

    if record.is_partial() {
        output.push_str("## Parse notes\n\n");
        for note in &record.diagnostics {
            output.push_str(&format!("- {note}\n"));
        }
    }

    output
}

/// Format the curated collections list as Markdown.
#[must_use]
pub fn format_collections_markdown() -> String {
    let mut output = format!("# Collections ({})\n\n", COLLECTIONS.len());

    for collection in COLLECTIONS {
        output.push_str(&format!("## {}\n\n", collection.name));
        output.push_str(&format!("**ID**: `{}`\n\n", collection.id));
        output.push_str(&format!("{}\n\n", collection.description));
    }

    output.push_str("Pass an ID to `search_by_collection` to search within it.\n");
    output
}

fn title_or_default(record: &CatalogRecord) -> &str {
    if record.title.is_empty() { "[Untitled]" } else { &record.title }
}

fn meta_line(record: &CatalogRecord) -> String {
    let mut meta = Vec::new();
    if let Some(date) = &record.publication_date {
        meta.push(format!("**Date**: {}", date.display));
    }
    if let Some(publisher) = &record.publisher {
        meta.push(format!("**Publisher**: {publisher}"));
    }
    if let Some(language) = &record.language {
        meta.push(format!("**Language**: {language}"));
    }
    if let Some(kind) = &record.resource_type {
        meta.push(format!("**Type**: {kind}"));
    }
    meta.join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppliedFilter, Holding, PublicationDate, QueryField};

    fn record() -> CatalogRecord {
        CatalogRecord {
            id: "990001".to_string(),
            title: "Walden".to_string(),
            authors: vec!["Thoreau, Henry David".to_string()],
            publication_date: PublicationDate::parse("1854"),
            publisher: Some("Ticknor and Fields".to_string()),
            subjects: vec!["Natural history -- Massachusetts".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_search() {
        let result = SearchResult::default();
        assert_eq!(format_search_markdown(&result), "No records found.");
    }

    #[test]
    fn test_search_listing() {
        let result = SearchResult {
            records: vec![record()],
            total_count: 40,
            limit: 1,
            offset: 10,
            has_more: true,
            filters_applied: vec![AppliedFilter {
                field: QueryField::Title,
                param: "title".to_string(),
                value: "Walden".to_string(),
            }],
            diagnostics: Vec::new(),
        };

        let md = format_search_markdown(&result);
        assert!(md.starts_with("# Records 11-11 of 40"));
        assert!(md.contains("## 11. Walden"));
        assert!(md.contains("title = \"Walden\""));
        assert!(md.contains("use offset 11"));
    }

    #[test]
    fn test_record_markdown() {
        let md = format_record_markdown(&record());
        assert!(md.starts_with("# Walden"));
        assert!(md.contains("- Thoreau, Henry David"));
        assert!(md.contains("**Date**: 1854"));
        assert!(!md.contains("Parse notes"));
    }

    #[test]
    fn test_record_markdown_holdings() {
        let held = CatalogRecord {
            holdings: vec![Holding {
                location: Some("Houghton Library".to_string()),
                shelf_locator: Some("AC85 T3935 854w".to_string()),
                url: None,
            }],
            digital_content: true,
            stackscore: Some(12.0),
            ..record()
        };
        let md = format_record_markdown(&held);
        assert!(md.contains("- Houghton Library (AC85 T3935 854w)"));
        assert!(md.contains("**Digital copy**: available"));
        assert!(md.contains("**Stackscore**: 12"));
    }

    #[test]
    fn test_untitled_partial_record() {
        let partial = CatalogRecord {
            id: "x".to_string(),
            diagnostics: vec!["missing titleInfo/title".to_string()],
            ..Default::default()
        };
        let md = format_record_markdown(&partial);
        assert!(md.starts_with("# [Untitled]"));
        assert!(md.contains("missing titleInfo/title"));
    }

    #[test]
    fn test_collections_markdown() {
        let md = format_collections_markdown();
        for c in COLLECTIONS {
            assert!(md.contains(c.id));
        }
    }
}
