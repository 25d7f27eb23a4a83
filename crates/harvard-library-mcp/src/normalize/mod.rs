//! Response normalization.
//!
//! Upstream bodies are either a JSON envelope or MODS XML. The declared
//! content type picks the parser ([`Payload`]); the body is never sniffed.
//! Both paths produce the same [`CatalogRecord`] shape and are pure: the same
//! bytes always normalize to the same records.

pub mod json;
pub mod mods;

use std::collections::BTreeSet;

use sha2::{Digest, Sha256};

use crate::error::{ClientError, ClientResult};
use crate::models::CatalogRecord;

/// Canonical JSON content type.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Canonical XML content type.
pub const CONTENT_TYPE_XML: &str = "application/xml";

/// Which parser a body goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// JSON envelope or JSON record.
    Json,
    /// MODS XML, single record or collection.
    Mods,
}

impl PayloadKind {
    /// Pick the parser from a `Content-Type` header value.
    ///
    /// `fallback` applies only when the header is absent or blank.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Parse`] for a content type that is neither JSON nor XML.
    pub fn from_content_type(content_type: Option<&str>, fallback: Self) -> ClientResult<Self> {
        let Some(raw) = content_type else { return Ok(fallback) };
        let mime = raw.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();

        if mime.is_empty() {
            Ok(fallback)
        } else if mime == "application/json" || mime == "text/json" || mime.ends_with("+json") {
            Ok(Self::Json)
        } else if mime.ends_with("/xml") || mime.ends_with("+xml") {
            Ok(Self::Mods)
        } else {
            Err(ClientError::parse(raw, "unsupported content type"))
        }
    }
}

/// A raw body tagged with the parser it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload<'a> {
    /// JSON text.
    Json(&'a str),
    /// MODS XML text.
    Mods(&'a str),
}

impl<'a> Payload<'a> {
    /// Tag `body` by its declared content type.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Parse`] for an unsupported content type.
    pub fn new(body: &'a str, content_type: Option<&str>, fallback: PayloadKind) -> ClientResult<Self> {
        Ok(match PayloadKind::from_content_type(content_type, fallback)? {
            PayloadKind::Json => Self::Json(body),
            PayloadKind::Mods => Self::Mods(body),
        })
    }

    /// Parser this payload goes to.
    #[must_use]
    pub const fn kind(&self) -> PayloadKind {
        match self {
            Self::Json(_) => PayloadKind::Json,
            Self::Mods(_) => PayloadKind::Mods,
        }
    }
}

/// Records read from a search response, before paging metadata is attached.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    /// Records with unique ids, upstream order.
    pub records: Vec<CatalogRecord>,
    /// Upstream total, or the number of records if none was reported.
    pub total_count: u64,
    /// Document-level notes and dropped duplicates.
    pub diagnostics: Vec<String>,
}

/// A single record, plus a MODS reference still to be resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDraft {
    /// Fields read so far.
    pub record: CatalogRecord,
    /// URL of the full MODS document when the body only referenced it.
    pub mods_ref: Option<String>,
}

/// Output of [`normalize`].
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    /// A page of records.
    Search(SearchPage),
    /// One record.
    Record(CatalogRecord),
}

/// Normalize a body whose shape is implied by its payload kind: JSON is a
/// search envelope, XML is a record when its root is `<mods>` and a page
/// otherwise.
///
/// # Errors
///
/// Returns [`ClientError::Parse`] if the body is entirely unreadable.
pub fn normalize(payload: Payload<'_>) -> ClientResult<Normalized> {
    match payload {
        Payload::Json(_) => normalize_search(payload).map(Normalized::Search),
        Payload::Mods(xml) => Ok(match mods::body_from_xml(xml)? {
            mods::XmlBody::Record(record) => Normalized::Record(record),
            mods::XmlBody::Page(page) => Normalized::Search(finish_page(page.records, page.total, page.diagnostics)),
        }),
    }
}

/// Normalize a search response.
///
/// # Errors
///
/// Returns [`ClientError::Parse`] if the body is entirely unreadable.
pub fn normalize_search(payload: Payload<'_>) -> ClientResult<SearchPage> {
    match payload {
        Payload::Json(body) => {
            let page = json::page_from_json(body)?;
            let records = page.records.into_iter().map(|d| d.record).collect();
            Ok(finish_page(records, page.total, page.diagnostics))
        }
        Payload::Mods(xml) => {
            let page = mods::records_from_xml(xml)?;
            Ok(finish_page(page.records, page.total, page.diagnostics))
        }
    }
}

/// Normalize a single-record response.
///
/// # Errors
///
/// Returns [`ClientError::Parse`] if the body is entirely unreadable.
pub fn normalize_record(payload: Payload<'_>) -> ClientResult<RecordDraft> {
    match payload {
        Payload::Json(body) => json::record_from_json(body),
        Payload::Mods(xml) => Ok(RecordDraft { record: mods::record_from_xml(xml)?, mods_ref: None }),
    }
}

fn finish_page(records: Vec<CatalogRecord>, total: Option<u64>, mut diagnostics: Vec<String>) -> SearchPage {
    let records = dedupe_ids(records, &mut diagnostics);
    let total_count = total.unwrap_or(records.len() as u64);
    SearchPage { records, total_count, diagnostics }
}

/// Drop records whose id was already seen, keeping the first.
#[must_use]
pub fn dedupe_ids(records: Vec<CatalogRecord>, diagnostics: &mut Vec<String>) -> Vec<CatalogRecord> {
    let mut seen = BTreeSet::new();
    records
        .into_iter()
        .filter(|r| {
            let fresh = seen.insert(r.id.clone());
            if !fresh {
                diagnostics.push(format!("duplicate record id {} dropped", r.id));
            }
            fresh
        })
        .collect()
}

/// Deterministic id for a record with none of its own.
#[must_use]
pub fn fallback_id(raw: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(raw.as_bytes()));
    format!("sha256:{}", &digest[..16])
}

/// MODS `url/@access` values that point at the digital object itself.
pub(crate) fn is_digital_access(access: &str) -> bool {
    matches!(access.trim(), "raw object" | "object in context")
}

/// A usage score, if `raw` is a finite number.
pub(crate) fn parse_stackscore(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|score| score.is_finite())
}

pub(crate) fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_dispatch() {
        let json = Some("application/json; charset=utf-8");
        assert_eq!(PayloadKind::from_content_type(json, PayloadKind::Mods).unwrap(), PayloadKind::Json);
        assert_eq!(
            PayloadKind::from_content_type(Some("application/mods+xml"), PayloadKind::Json).unwrap(),
            PayloadKind::Mods
        );
        assert_eq!(PayloadKind::from_content_type(Some("text/xml"), PayloadKind::Json).unwrap(), PayloadKind::Mods);
        assert_eq!(PayloadKind::from_content_type(None, PayloadKind::Mods).unwrap(), PayloadKind::Mods);
        assert!(PayloadKind::from_content_type(Some("text/html"), PayloadKind::Json).is_err());
    }

    #[test]
    fn test_declared_type_wins_over_body_shape() {
        // XML text declared as JSON goes to the JSON parser and fails there.
        let payload = Payload::new("<mods/>", Some("application/json"), PayloadKind::Mods).unwrap();
        assert!(matches!(normalize_search(payload), Err(ClientError::Parse { .. })));
    }

    #[test]
    fn test_duplicate_ids_dropped() {
        let body = r#"{"items":[{"id":"a","title":"First"},{"id":"a","title":"Second"},{"id":"b","title":"B"}]}"#;
        let page = normalize_search(Payload::Json(body)).unwrap();
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.records[0].title, "First");
        assert_eq!(page.total_count, 2);
        assert_eq!(page.diagnostics, ["duplicate record id a dropped"]);
    }

    #[test]
    fn test_normalize_picks_shape() {
        let record = normalize(Payload::Mods("<mods><titleInfo><title>T</title></titleInfo></mods>")).unwrap();
        assert!(matches!(record, Normalized::Record(r) if r.title == "T"));

        let page = normalize(Payload::Json(r#"{"items":[]}"#)).unwrap();
        assert!(matches!(page, Normalized::Search(p) if p.records.is_empty()));
    }

    #[test]
    fn test_fallback_id_shape() {
        let id = fallback_id("abc");
        assert_eq!(id.len(), "sha256:".len() + 16);
        assert_eq!(id, fallback_id("abc"));
        assert_ne!(id, fallback_id("abd"));
    }
}
