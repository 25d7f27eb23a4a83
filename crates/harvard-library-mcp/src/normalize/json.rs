//! JSON envelope normalization.
//!
//! Search responses wrap records as `{"pagination": {...}, "items": ...}`
//! where `items` is a list, or an object holding `mods` or `item` as a list
//! or single object. Each record is MODS rendered as JSON (`titleInfo`,
//! `name`, `originInfo`, ...), sometimes with flat convenience fields
//! (`title`, `author`, `date`) and sometimes with MODS XML inline
//! (`modsXml`) or by reference (`modsUrl`).
//!
//! Text nodes appear as plain strings, as objects carrying `#text`, `text`
//! or `$`, or as arrays of either.

use serde_json::{Map, Value};

use super::{CONTENT_TYPE_JSON, RecordDraft, fallback_id, is_digital_access, mods, parse_stackscore, push_unique};
use crate::error::{ClientError, ClientResult};
use crate::models::{CatalogRecord, Holding, PublicationDate, normalize_identifier};

/// Flat fields that flag a digital copy.
const DIGITAL_FLAGS: [&str; 4] = ["digital", "online", "electronic", "hasDigital"];

/// Flat fields that may carry the usage score.
const STACKSCORE_FIELDS: [&str; 4] = ["stackscore", "Stackscore", "usage", "popularity"];

/// Records and reported total from a JSON search envelope.
#[derive(Debug)]
pub struct JsonPage {
    /// Records in envelope order.
    pub records: Vec<RecordDraft>,
    /// Upstream total, when reported.
    pub total: Option<u64>,
    /// Items that could not be read.
    pub diagnostics: Vec<String>,
}

fn parse_body(body: &str) -> ClientResult<Value> {
    serde_json::from_str(body).map_err(|e| ClientError::parse(CONTENT_TYPE_JSON, e.to_string()))
}

/// Normalize a JSON search envelope.
///
/// # Errors
///
/// Returns [`ClientError::Parse`] if the body is not JSON or not an object.
pub fn page_from_json(body: &str) -> ClientResult<JsonPage> {
    let value = parse_body(body)?;
    let Value::Object(envelope) = value else {
        return Err(ClientError::parse(CONTENT_TYPE_JSON, "expected a JSON object envelope"));
    };

    let mut diagnostics = Vec::new();
    let mut records = Vec::new();
    for (index, item) in envelope_items(&envelope).into_iter().enumerate() {
        match item {
            Value::Object(obj) => records.push(record_from_object(obj)),
            other => diagnostics.push(format!("item {index} skipped: expected object, found {}", kind(other))),
        }
    }

    let total = envelope
        .get("pagination")
        .and_then(|p| p.get("numFound").or_else(|| p.get("total")))
        .and_then(as_count);

    Ok(JsonPage { records, total, diagnostics })
}

/// Normalize a JSON single-record body.
///
/// Accepts a bare record object or an envelope holding one record.
///
/// # Errors
///
/// Returns [`ClientError::Parse`] if the body is not JSON or holds no record object.
pub fn record_from_json(body: &str) -> ClientResult<RecordDraft> {
    let value = parse_body(body)?;
    let Value::Object(obj) = value else {
        return Err(ClientError::parse(CONTENT_TYPE_JSON, "expected a JSON object"));
    };

    if obj.contains_key("items") {
        return envelope_items(&obj)
            .into_iter()
            .find_map(Value::as_object)
            .map(record_from_object)
            .ok_or_else(|| ClientError::parse(CONTENT_TYPE_JSON, "envelope holds no record"));
    }

    match obj.get("mods").and_then(Value::as_object) {
        Some(inner) => {
            let mut found = record_from_object(inner);
            if let Some(id) = explicit_id(&obj) {
                found.record.id = id;
            }
            fill_flat_fields(&mut found.record, &obj);
            Ok(found)
        }
        None => Ok(record_from_object(&obj)),
    }
}

fn envelope_items(envelope: &Map<String, Value>) -> Vec<&Value> {
    match envelope.get("items") {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(Value::Object(items)) => match items.get("mods").or_else(|| items.get("item")) {
            Some(Value::Array(list)) => list.iter().collect(),
            Some(single @ Value::Object(_)) => vec![single],
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Project one JSON item onto a record.
#[must_use]
pub fn record_from_object(item: &Map<String, Value>) -> RecordDraft {
    let mut record = CatalogRecord::default();

    record.title = title(item).unwrap_or_default();
    if record.title.is_empty() {
        record.diagnostics.push("missing titleInfo/title".to_string());
    }

    if let Some(names) = item.get("name") {
        for name in as_list(names) {
            if let Some(line) = name_line(name) {
                record.authors.push(line);
            }
        }
    }

    let origins = item.get("originInfo").map(as_list).unwrap_or_default();
    record.publication_date = origins
        .iter()
        .find_map(|o| o.get("dateIssued").and_then(first_text))
        .as_deref()
        .and_then(PublicationDate::parse);
    record.publisher = origins.iter().find_map(|o| o.get("publisher").and_then(first_text));
    record.origin_place = origins
        .iter()
        .filter_map(|o| o.get("place"))
        .flat_map(as_list)
        .filter_map(|p| p.get("placeTerm"))
        .flat_map(as_list)
        .find(|t| attr(t, "type") != Some("code"))
        .and_then(first_text)
        .map(|t| t.trim_end_matches([':', ';', ',']).trim().to_string());

    let language_terms: Vec<&Value> = item
        .get("language")
        .map(as_list)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|l| l.get("languageTerm"))
        .flat_map(as_list)
        .collect();
    record.language = language_terms
        .iter()
        .find(|t| attr(t, "type") == Some("code"))
        .or_else(|| language_terms.first())
        .and_then(|t| first_text(t));

    if let Some(subjects) = item.get("subject") {
        for subject in as_list(subjects) {
            if let Some(heading) = subject_heading(subject) {
                push_unique(&mut record.subjects, heading);
            }
        }
    }

    if let Some(ids) = item.get("identifier") {
        for id in as_list(ids) {
            if attr(id, "invalid") == Some("yes") {
                continue;
            }
            let Some(value) = first_text(id) else { continue };
            if let Some((scheme, value)) = normalize_identifier(attr(id, "type").unwrap_or_default(), &value) {
                record.identifiers.entry(scheme).or_insert(value);
            }
        }
    }

    record.description = item.get("abstract").and_then(first_text);
    record.resource_type = item
        .get("typeOfResource")
        .and_then(first_text)
        .or_else(|| item.get("physicalDescription").and_then(|p| p.get("form")).and_then(first_text));
    record.classification =
        item.get("classification").map(texts).unwrap_or_default();

    let mut collections = Vec::new();
    collect_set_names(item, &mut collections);
    for name in collections {
        push_unique(&mut record.collections, name);
    }

    if let Some(locations) = item.get("location") {
        let locations = as_list(locations);
        record.holdings = locations.iter().copied().filter_map(holding).collect();
        record.digital_content = locations
            .iter()
            .filter_map(|l| l.get("url"))
            .flat_map(as_list)
            .any(|u| attr(u, "access").is_some_and(is_digital_access));
    }

    if let Some(raw) = item.get("extension").and_then(|e| find_key(e, &["stackscore", "stackScore"])) {
        match first_text(raw).as_deref().and_then(parse_stackscore) {
            Some(score) => record.stackscore = Some(score),
            None => record.diagnostics.push(format!("unreadable stackscore {raw}")),
        }
    }

    let record_identifier = item
        .get("recordInfo")
        .and_then(|r| r.get("recordIdentifier"))
        .and_then(first_text);
    record.id = explicit_id(item).or(record_identifier).unwrap_or_else(|| {
        let canonical = serde_json::to_string(item).unwrap_or_default();
        fallback_id(&canonical)
    });

    fill_flat_fields(&mut record, item);

    let mut mods_ref = None;
    if let Some(xml) = ["modsXml", "mods_xml", "mods"].iter().find_map(|k| item.get(*k).and_then(Value::as_str)) {
        match mods::record_from_xml(xml) {
            Ok(parsed) => merge_inline_mods(&mut record, parsed),
            Err(e) => record.diagnostics.push(format!("inline MODS unreadable: {e}")),
        }
    } else if let Some(url) = item.get("modsUrl").and_then(Value::as_str) {
        mods_ref = Some(url.to_string());
    }

    RecordDraft { record, mods_ref }
}

/// Merge a MODS-derived record into one read from JSON.
///
/// MODS is the richer source: its fields win, JSON fills the gaps, and the
/// JSON id is kept when there was one.
pub fn merge_inline_mods(record: &mut CatalogRecord, mut parsed: CatalogRecord) {
    let id = std::mem::take(&mut record.id);
    let json_title_missing = record.title.is_empty();

    // A missing JSON title is only a problem if MODS lacks one too.
    if json_title_missing && !parsed.title.is_empty() {
        record.diagnostics.retain(|d| d != "missing titleInfo/title");
    }

    let json = std::mem::take(record);
    parsed.fill_from(json);
    if !id.is_empty() && !id.starts_with("sha256:") {
        parsed.id = id;
    }
    let mut notes = Vec::new();
    for note in parsed.diagnostics.drain(..) {
        push_unique(&mut notes, note);
    }
    parsed.diagnostics = notes;
    *record = parsed;
}

fn fill_flat_fields(record: &mut CatalogRecord, item: &Map<String, Value>) {
    if record.title.is_empty() {
        if let Some(t) = ["title", "Title"].iter().find_map(|k| item.get(*k).and_then(first_text)) {
            record.title = t;
            record.diagnostics.retain(|d| d != "missing titleInfo/title");
        }
    }
    if record.authors.is_empty() {
        for key in ["author", "creator", "authors"] {
            if let Some(v) = item.get(key) {
                record.authors.extend(texts(v));
            }
        }
    }
    if record.publication_date.is_none() {
        record.publication_date = ["dateIssued", "date", "publicationDate"]
            .iter()
            .find_map(|k| item.get(*k).and_then(first_text))
            .as_deref()
            .and_then(PublicationDate::parse);
    }
    if record.subjects.is_empty() {
        if let Some(v) = item.get("subjects") {
            for s in texts(v) {
                push_unique(&mut record.subjects, s);
            }
        }
    }
    if record.description.is_none() {
        record.description = item.get("description").and_then(first_text);
    }
    if record.collections.is_empty() {
        for key in ["collection", "collections"] {
            if let Some(v) = item.get(key) {
                for c in texts(v) {
                    push_unique(&mut record.collections, c);
                }
            }
        }
    }
    if record.holdings.is_empty() {
        if let Some(v) = ["holdings", "Holdings"].iter().find_map(|k| item.get(*k)) {
            record.holdings = as_list(v).into_iter().filter_map(holding).collect();
        }
    }
    if !record.digital_content {
        record.digital_content = DIGITAL_FLAGS.iter().filter_map(|k| item.get(*k)).any(is_truthy);
    }
    if record.stackscore.is_none() {
        record.stackscore = STACKSCORE_FIELDS
            .iter()
            .filter_map(|k| item.get(*k))
            .find_map(|v| first_text(v).as_deref().and_then(parse_stackscore));
    }
}

/// A holding from a MODS `location` object, a flat holdings entry, or a
/// bare location name.
fn holding(value: &Value) -> Option<Holding> {
    if let Some(name) = scalar_text(value) {
        return Some(Holding { location: Some(name), ..Holding::default() });
    }
    let obj = value.as_object()?;
    let pick = |keys: &[&str]| keys.iter().find_map(|k| obj.get(*k).and_then(first_text));

    let shelf_locator = pick(&["shelfLocator", "callNumber"]).or_else(|| {
        obj.get("holdingSimple")
            .and_then(|h| h.get("copyInformation"))
            .and_then(|c| c.get("shelfLocator"))
            .and_then(first_text)
    });
    let holding = Holding {
        location: pick(&["physicalLocation", "location", "library"]),
        shelf_locator,
        url: pick(&["url"]),
    };
    (!holding.is_empty()).then_some(holding)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "yes" | "1"),
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    }
}

/// First value under any of `keys`, searching nested objects and arrays.
fn find_key<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    match value {
        Value::Object(obj) => keys
            .iter()
            .find_map(|k| obj.get(*k))
            .or_else(|| obj.values().find_map(|v| find_key(v, keys))),
        Value::Array(list) => list.iter().find_map(|v| find_key(v, keys)),
        _ => None,
    }
}

fn title(item: &Map<String, Value>) -> Option<String> {
    let infos = item.get("titleInfo").map(as_list).unwrap_or_default();
    let info = infos.iter().find(|t| attr(t, "type").is_none()).or_else(|| infos.first())?;
    let main = info.get("title").and_then(first_text)?;

    let mut out = String::new();
    if let Some(non_sort) = info.get("nonSort").and_then(first_text) {
        out.push_str(non_sort.trim_end());
        if !non_sort.ends_with('\'') {
            out.push(' ');
        }
    }
    out.push_str(&main);
    if let Some(sub) = info.get("subTitle").and_then(first_text) {
        out.push_str(": ");
        out.push_str(&sub);
    }
    Some(out)
}

fn name_line(name: &Value) -> Option<String> {
    if let Some(s) = scalar_text(name) {
        return Some(s);
    }
    let parts = name.get("namePart").map(as_list).unwrap_or_default();
    let typed = |ty: &str| parts.iter().find(|p| attr(p, "type") == Some(ty)).and_then(|p| first_text(p));

    let line = match (typed("family"), typed("given")) {
        (Some(family), Some(given)) => format!("{family}, {given}"),
        _ => parts
            .iter()
            .filter(|p| matches!(attr(p, "type"), None | Some("family" | "given")))
            .filter_map(|p| first_text(p))
            .collect::<Vec<_>>()
            .join(", "),
    };
    (!line.is_empty()).then_some(line)
}

fn subject_heading(subject: &Value) -> Option<String> {
    if let Some(s) = scalar_text(subject) {
        return Some(s);
    }
    let obj = subject.as_object()?;
    let mut parts = Vec::new();
    for (key, value) in obj {
        match key.as_str() {
            "topic" | "geographic" | "temporal" | "genre" | "occupation" => parts.extend(texts(value)),
            "name" => parts.extend(as_list(value).into_iter().filter_map(name_line)),
            "titleInfo" => parts.extend(
                as_list(value).into_iter().filter_map(|t| t.get("title")).filter_map(first_text),
            ),
            _ => {}
        }
    }
    (!parts.is_empty()).then(|| parts.join(" -- "))
}

fn explicit_id(item: &Map<String, Value>) -> Option<String> {
    ["id", "@id", "recordId"].iter().find_map(|k| item.get(*k).and_then(scalar_text))
}

/// `setName` values anywhere below `obj`.
fn collect_set_names(obj: &Map<String, Value>, out: &mut Vec<String>) {
    for (key, child) in obj {
        if key == "setName" {
            out.extend(texts(child));
            continue;
        }
        match child {
            Value::Object(inner) => collect_set_names(inner, out),
            Value::Array(list) => {
                for inner in list.iter().filter_map(Value::as_object) {
                    collect_set_names(inner, out);
                }
            }
            _ => {}
        }
    }
}

/// A value as a list: arrays as-is, anything else as one element.
fn as_list(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(list) => list.iter().collect(),
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

/// Attribute from `@name` or `name`.
fn attr<'a>(value: &'a Value, name: &str) -> Option<&'a str> {
    let obj = value.as_object()?;
    obj.get(&format!("@{name}")).or_else(|| obj.get(name)).and_then(Value::as_str)
}

fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// First non-empty text in a value.
fn first_text(value: &Value) -> Option<String> {
    texts(value).into_iter().next()
}

/// All non-empty texts in a value, in order.
fn texts(value: &Value) -> Vec<String> {
    match value {
        Value::Array(list) => list.iter().flat_map(texts).collect(),
        Value::Object(obj) => ["#text", "text", "$"]
            .iter()
            .find_map(|k| obj.get(*k))
            .and_then(scalar_text)
            .into_iter()
            .collect(),
        other => scalar_text(other).into_iter().collect(),
    }
}

fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
