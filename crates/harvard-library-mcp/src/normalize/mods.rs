//! MODS XML normalization.
//!
//! The document is read with the `quick_xml` event reader into a small
//! element tree (local names only, namespaces dropped). Field extraction then
//! walks that tree. A reader error or a truncated document keeps whatever
//! was built before the failure and records a diagnostic. Only a document
//! with no element at all is a hard failure.

use std::collections::BTreeMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use super::{CONTENT_TYPE_XML, fallback_id, is_digital_access, parse_stackscore, push_unique};
use crate::error::{ClientError, ClientResult};
use crate::models::{CatalogRecord, Holding, PublicationDate, normalize_identifier};

/// One XML element with its text and children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Local name, prefix stripped.
    pub name: String,
    /// Attributes by local name, document order.
    pub attrs: Vec<(String, String)>,
    /// Direct text content, trimmed; separate runs joined by a space.
    pub text: String,
    /// Child elements in document order.
    pub children: Vec<Element>,
    /// Byte range of the whole element in the source, for `<mods>` elements.
    span: Option<(usize, usize)>,
}

impl Element {
    fn open(start: &BytesStart<'_>) -> Self {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let attrs = start
            .attributes()
            .flatten()
            .map(|a| {
                let key = String::from_utf8_lossy(a.key.local_name().as_ref()).into_owned();
                let value = a
                    .unescape_value()
                    .map(|v| v.into_owned())
                    .unwrap_or_else(|_| String::from_utf8_lossy(&a.value).into_owned());
                (key, value)
            })
            .collect();
        Self { name, attrs, ..Self::default() }
    }

    /// Attribute value by local name.
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Direct children with the given local name.
    pub fn children_named<'a, 'n>(&'a self, name: &'n str) -> impl Iterator<Item = &'a Self> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// First direct child with the given local name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.children_named(name).next()
    }

    /// Own text, if non-empty.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        let text = self.text.trim();
        (!text.is_empty()).then_some(text)
    }

    /// Text of the first direct child with the given name.
    #[must_use]
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.children_named(name).find_map(Self::text)
    }

    /// First element with the given name, depth first, `self` included.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Self> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    /// All elements with the given name, depth first, not descending into matches.
    #[must_use]
    pub fn find_all<'a>(&'a self, name: &str) -> Vec<&'a Self> {
        let mut out = Vec::new();
        self.collect_named(name, &mut out);
        out
    }

    fn collect_named<'a>(&'a self, name: &str, out: &mut Vec<&'a Self>) {
        if self.name == name {
            out.push(self);
            return;
        }
        for child in &self.children {
            child.collect_named(name, out);
        }
    }
}

/// A parsed document plus notes on anything skipped.
#[derive(Debug)]
pub struct Document {
    /// Root element.
    pub root: Element,
    /// Problems hit while reading.
    pub diagnostics: Vec<String>,
}

/// Deepest element nesting kept in the tree; anything below is skipped.
pub const MAX_DEPTH: usize = 256;

/// Read `xml` into an element tree.
///
/// Subtrees nested deeper than [`MAX_DEPTH`] are dropped with a diagnostic,
/// so every later walk over the tree has bounded depth.
///
/// # Errors
///
/// Returns [`ClientError::Parse`] if no element could be read at all.
pub fn parse_document(xml: &str) -> ClientResult<Document> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;
    let mut diagnostics = Vec::new();
    // Open elements inside the subtree currently being skipped.
    let mut skipping = 0usize;
    let mut pruned = 0usize;

    loop {
        let before = reader.buffer_position() as usize;
        match reader.read_event() {
            Ok(Event::Start(_)) if skipping > 0 || stack.len() >= MAX_DEPTH => {
                if skipping == 0 {
                    pruned += 1;
                }
                skipping += 1;
            }
            Ok(Event::Start(e)) => {
                let mut el = Element::open(&e);
                if el.name == "mods" {
                    el.span = Some((tag_start(xml, before), 0));
                }
                stack.push(el);
            }
            Ok(Event::Empty(_)) if skipping > 0 || stack.len() >= MAX_DEPTH => {
                if skipping == 0 {
                    pruned += 1;
                }
            }
            Ok(Event::Empty(e)) => {
                let mut el = Element::open(&e);
                if el.name == "mods" {
                    el.span = Some((tag_start(xml, before), reader.buffer_position() as usize));
                }
                attach(&mut stack, &mut root, el, &mut diagnostics);
            }
            Ok(Event::End(_)) if skipping > 0 => skipping -= 1,
            Ok(Event::End(_)) => {
                if let Some(mut el) = stack.pop() {
                    if let Some((start, _)) = el.span {
                        el.span = Some((start, reader.buffer_position() as usize));
                    }
                    attach(&mut stack, &mut root, el, &mut diagnostics);
                }
            }
            Ok(Event::Text(_) | Event::CData(_)) if skipping > 0 => {}
            Ok(Event::Text(t)) => match t.unescape() {
                Ok(text) => push_text(&mut stack, &text),
                Err(e) => {
                    diagnostics.push(format!("undecodable text at byte {before}: {e}"));
                    push_text(&mut stack, &String::from_utf8_lossy(&t));
                }
            },
            Ok(Event::CData(c)) => push_text(&mut stack, &String::from_utf8_lossy(&c)),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                diagnostics.push(format!("malformed XML near byte {}: {e}", reader.buffer_position()));
                break;
            }
        }
    }

    if pruned > 0 {
        diagnostics.push(format!("{pruned} element(s) nested deeper than {MAX_DEPTH} levels skipped"));
    }

    if !stack.is_empty() || skipping > 0 {
        diagnostics.push(format!("document ended with {} unclosed element(s)", stack.len() + skipping));
        while let Some(mut el) = stack.pop() {
            if let Some((start, 0)) = el.span {
                el.span = Some((start, xml.len()));
            }
            attach(&mut stack, &mut root, el, &mut diagnostics);
        }
    }

    match root {
        Some(root) => {
            for note in &diagnostics {
                tracing::warn!(diagnostic = %note, "Degraded XML parse");
            }
            Ok(Document { root, diagnostics })
        }
        None => Err(ClientError::parse(
            CONTENT_TYPE_XML,
            diagnostics.into_iter().next().unwrap_or_else(|| "no root element".to_string()),
        )),
    }
}

fn tag_start(xml: &str, from: usize) -> usize {
    xml.get(from..).and_then(|rest| rest.find('<')).map_or(from, |i| from + i)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, el: Element, diagnostics: &mut Vec<String>) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(el);
    } else if root.is_none() {
        *root = Some(el);
    } else {
        diagnostics.push(format!("extra top-level <{}> ignored", el.name));
    }
}

fn push_text(stack: &mut [Element], text: &str) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    if let Some(top) = stack.last_mut() {
        if !top.text.is_empty() {
            top.text.push(' ');
        }
        top.text.push_str(text);
    }
}

/// Normalize a single-record MODS document.
///
/// The whole input is kept verbatim as the record's `mods_xml`.
///
/// # Errors
///
/// Returns [`ClientError::Parse`] if the input has no readable element.
pub fn record_from_xml(xml: &str) -> ClientResult<CatalogRecord> {
    parse_document(xml).map(|doc| record_from_document(doc, xml))
}

fn record_from_document(doc: Document, xml: &str) -> CatalogRecord {
    let (mods, mut diagnostics) = match doc.root.find("mods") {
        Some(mods) => (mods, doc.diagnostics),
        None => {
            let mut notes = doc.diagnostics;
            notes.push(format!("no <mods> element; fields read from <{}>", doc.root.name));
            (&doc.root, notes)
        }
    };

    let mut record = record_from_element(mods, xml);
    diagnostics.append(&mut record.diagnostics);
    record.diagnostics = diagnostics;
    record
}

/// Records and reported total from an XML search response.
#[derive(Debug)]
pub struct XmlPage {
    /// One record per `<mods>` element, document order.
    pub records: Vec<CatalogRecord>,
    /// `numFound`/`total`/`totalResults`, when present.
    pub total: Option<u64>,
    /// Document-level problems.
    pub diagnostics: Vec<String>,
}

/// Normalize an XML search response holding any number of `<mods>` elements.
///
/// Each record keeps the exact source bytes of its own `<mods>` element.
///
/// # Errors
///
/// Returns [`ClientError::Parse`] if the input has no readable element.
pub fn records_from_xml(xml: &str) -> ClientResult<XmlPage> {
    parse_document(xml).map(|doc| page_from_document(doc, xml))
}

fn page_from_document(doc: Document, xml: &str) -> XmlPage {
    let records = doc
        .root
        .find_all("mods")
        .into_iter()
        .map(|mods| {
            let raw = mods.span.and_then(|(start, end)| xml.get(start..end)).unwrap_or_default();
            record_from_element(mods, raw)
        })
        .collect();

    let total = ["numFound", "total", "totalResults"]
        .iter()
        .filter_map(|name| doc.root.find(name))
        .find_map(|el| el.text().and_then(|t| t.parse().ok()));

    XmlPage { records, total, diagnostics: doc.diagnostics }
}

/// An XML body read as whichever shape its root says it is.
#[derive(Debug)]
pub enum XmlBody {
    /// Root element is `<mods>`.
    Record(CatalogRecord),
    /// Any other root: a collection of zero or more `<mods>`.
    Page(XmlPage),
}

/// Normalize an XML body, choosing single-record or page by the root element.
///
/// # Errors
///
/// Returns [`ClientError::Parse`] if the input has no readable element.
pub fn body_from_xml(xml: &str) -> ClientResult<XmlBody> {
    let doc = parse_document(xml)?;
    if doc.root.name == "mods" {
        Ok(XmlBody::Record(record_from_document(doc, xml)))
    } else {
        Ok(XmlBody::Page(page_from_document(doc, xml)))
    }
}

/// Project one `<mods>` element onto a record.
///
/// `raw` is the source text of the element; it becomes `mods_xml` and seeds
/// the fallback id.
#[must_use]
pub fn record_from_element(mods: &Element, raw: &str) -> CatalogRecord {
    let mut record = CatalogRecord::default();

    match title(mods) {
        Some(t) => record.title = t,
        None => record.diagnostics.push("missing titleInfo/title".to_string()),
    }

    record.authors = mods.children_named("name").filter_map(name_line).collect();

    let origins: Vec<&Element> = mods.children_named("originInfo").collect();
    record.publication_date = date_issued(&origins).and_then(PublicationDate::parse);
    record.publisher = origins.iter().find_map(|o| o.child_text("publisher")).map(str::to_string);
    record.origin_place = origin_place(&origins);

    record.language = language(mods);

    for subject in mods.children_named("subject") {
        if let Some(heading) = subject_heading(subject) {
            push_unique(&mut record.subjects, heading);
        }
    }

    record.identifiers = identifiers(mods);

    record.description = mods.child_text("abstract").map(str::to_string);
    record.resource_type = mods
        .child_text("typeOfResource")
        .or_else(|| mods.child("physicalDescription").and_then(|p| p.child_text("form")))
        .map(str::to_string);
    record.classification =
        mods.children_named("classification").filter_map(Element::text).map(str::to_string).collect();

    for set_name in mods.find_all("setName") {
        if let Some(name) = set_name.text() {
            push_unique(&mut record.collections, name.to_string());
        }
    }
    for host in mods.children_named("relatedItem").filter(|r| r.attr("type") == Some("host")) {
        if let Some(name) = host.child("titleInfo").and_then(|t| t.child_text("title")) {
            push_unique(&mut record.collections, name.to_string());
        }
    }

    record.holdings = mods.children_named("location").filter_map(holding).collect();
    record.digital_content = mods
        .children_named("location")
        .flat_map(|l| l.children_named("url"))
        .any(|u| u.attr("access").is_some_and(is_digital_access));

    if let Some(raw) = stackscore(mods) {
        match parse_stackscore(raw) {
            Some(score) => record.stackscore = Some(score),
            None => record.diagnostics.push(format!("unreadable stackscore '{raw}'")),
        }
    }

    record.id = mods
        .child("recordInfo")
        .and_then(|r| r.child_text("recordIdentifier"))
        .map_or_else(|| fallback_id(raw), str::to_string);

    if !raw.is_empty() {
        record.mods_xml = Some(raw.to_string());
    }

    record
}

fn title(mods: &Element) -> Option<String> {
    let infos: Vec<&Element> = mods.children_named("titleInfo").collect();
    let info = infos.iter().find(|t| t.attr("type").is_none()).or_else(|| infos.first())?;
    let main = info.child_text("title")?;

    let mut out = String::new();
    if let Some(non_sort) = info.child_text("nonSort") {
        out.push_str(non_sort);
        if !non_sort.ends_with('\'') {
            out.push(' ');
        }
    }
    out.push_str(main);
    if let Some(sub) = info.child_text("subTitle") {
        out.push_str(": ");
        out.push_str(sub);
    }
    Some(out)
}

fn name_line(name: &Element) -> Option<String> {
    let parts: Vec<&Element> = name.children_named("namePart").collect();
    let typed = |ty: &str| parts.iter().find(|p| p.attr("type") == Some(ty)).and_then(|p| p.text());

    let line = match (typed("family"), typed("given")) {
        (Some(family), Some(given)) => format!("{family}, {given}"),
        _ => parts
            .iter()
            .filter(|p| matches!(p.attr("type"), None | Some("family" | "given")))
            .filter_map(|p| p.text())
            .collect::<Vec<_>>()
            .join(", "),
    };

    (!line.is_empty()).then_some(line)
}

fn date_issued<'a>(origins: &[&'a Element]) -> Option<&'a str> {
    let issued: Vec<&Element> = origins.iter().flat_map(|o| o.children_named("dateIssued")).collect();
    issued
        .iter()
        .find(|d| d.attr("keyDate") == Some("yes"))
        .or_else(|| issued.iter().find(|d| d.attr("encoding") != Some("marc")))
        .or_else(|| issued.first())
        .and_then(|d| d.text())
        .or_else(|| origins.iter().find_map(|o| o.child_text("dateCreated")))
}

fn origin_place(origins: &[&Element]) -> Option<String> {
    let terms: Vec<&Element> = origins
        .iter()
        .flat_map(|o| o.children_named("place"))
        .flat_map(|p| p.children_named("placeTerm"))
        .collect();
    terms
        .iter()
        .find(|t| t.attr("type") == Some("text"))
        .or_else(|| terms.iter().find(|t| t.attr("type") != Some("code")))
        .or_else(|| terms.first())
        .and_then(|t| t.text())
        .map(|t| t.trim_end_matches([':', ';', ',']).trim().to_string())
}

fn language(mods: &Element) -> Option<String> {
    let terms: Vec<&Element> =
        mods.children_named("language").flat_map(|l| l.children_named("languageTerm")).collect();
    terms
        .iter()
        .find(|t| t.attr("type") == Some("code"))
        .or_else(|| terms.first())
        .and_then(|t| t.text())
        .map(str::to_string)
}

fn subject_heading(subject: &Element) -> Option<String> {
    let parts: Vec<String> = subject
        .children
        .iter()
        .filter_map(|c| match c.name.as_str() {
            "topic" | "geographic" | "temporal" | "genre" | "occupation" => {
                c.text().map(str::to_string)
            }
            "name" => name_line(c),
            "titleInfo" => c.child_text("title").map(str::to_string),
            _ => None,
        })
        .collect();
    (!parts.is_empty()).then(|| parts.join(" -- "))
}

fn holding(location: &Element) -> Option<Holding> {
    let shelf_locator = location.child_text("shelfLocator").or_else(|| {
        location
            .child("holdingSimple")
            .and_then(|h| h.child("copyInformation"))
            .and_then(|c| c.child_text("shelfLocator"))
    });
    let holding = Holding {
        location: location.child_text("physicalLocation").map(str::to_string),
        shelf_locator: shelf_locator.map(str::to_string),
        url: location.children_named("url").find_map(Element::text).map(str::to_string),
    };
    (!holding.is_empty()).then_some(holding)
}

fn stackscore(mods: &Element) -> Option<&str> {
    mods.children_named("extension")
        .find_map(|e| e.find("stackscore").or_else(|| e.find("stackScore")))
        .and_then(Element::text)
}

fn identifiers(mods: &Element) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for id in mods.children_named("identifier") {
        if id.attr("invalid") == Some("yes") {
            continue;
        }
        let Some(value) = id.text() else { continue };
        if let Some((scheme, value)) = normalize_identifier(id.attr("type").unwrap_or_default(), value) {
            out.entry(scheme).or_insert(value);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<mods xmlns="http://www.loc.gov/mods/v3" version="3.6">
  <titleInfo><nonSort>The</nonSort><title>whale</title><subTitle>a novel</subTitle></titleInfo>
  <titleInfo type="alternative"><title>Moby-Dick</title></titleInfo>
  <name type="personal"><namePart>Melville, Herman</namePart><namePart type="date">1819-1891</namePart></name>
  <name type="personal"><namePart type="family">Bentley</namePart><namePart type="given">Richard</namePart></name>
  <originInfo>
    <place><placeTerm type="code" authority="marccountry">enk</placeTerm></place>
    <place><placeTerm type="text">London :</placeTerm></place>
    <publisher>Richard Bentley</publisher>
    <dateIssued encoding="marc">1851</dateIssued>
    <dateIssued>1851.</dateIssued>
  </originInfo>
  <language><languageTerm type="code" authority="iso639-2b">eng</languageTerm></language>
  <subject authority="lcsh"><topic>Whaling</topic><geographic>Pacific Ocean</geographic></subject>
  <subject authority="lcsh"><topic>Whaling</topic><geographic>Pacific Ocean</geographic></subject>
  <subject><topic>Sea stories</topic></subject>
  <identifier type="isbn">978-0-14-243724-7</identifier>
  <identifier type="oclc">ocm12345</identifier>
  <identifier type="isbn" invalid="yes">0000</identifier>
  <typeOfResource>text</typeOfResource>
  <abstract>Ishmael &amp; the whale.</abstract>
  <classification authority="lcc">PS2384 .M6 1851</classification>
  <recordInfo><recordIdentifier source="MH:ALMA">990012345670203941</recordIdentifier></recordInfo>
</mods>"#;

    #[test]
    fn test_full_record_extraction() {
        let record = record_from_xml(SAMPLE).unwrap();
        assert_eq!(record.id, "990012345670203941");
        assert_eq!(record.title, "The whale: a novel");
        assert_eq!(record.authors, ["Melville, Herman", "Bentley, Richard"]);
        assert_eq!(record.publisher.as_deref(), Some("Richard Bentley"));
        assert_eq!(record.origin_place.as_deref(), Some("London"));
        assert_eq!(record.language.as_deref(), Some("eng"));
        assert_eq!(record.subjects, ["Whaling -- Pacific Ocean", "Sea stories"]);
        assert_eq!(record.identifiers["ISBN"], "9780142437247");
        assert_eq!(record.identifiers["OCLC"], "ocm12345");
        assert_eq!(record.description.as_deref(), Some("Ishmael & the whale."));
        assert_eq!(record.resource_type.as_deref(), Some("text"));
        assert_eq!(record.classification, ["PS2384 .M6 1851"]);
        assert_eq!(record.year(), Some(1851));
        assert_eq!(record.publication_date.as_ref().unwrap().raw, "1851.");
        assert!(record.diagnostics.is_empty());
        assert_eq!(record.mods_xml.as_deref(), Some(SAMPLE));
    }

    #[test]
    fn test_truncated_document_is_partial() {
        let xml = "<mods><titleInfo><title>Broadside</title></titleInfo><name><namePart>Anon.";
        let record = record_from_xml(xml).unwrap();
        assert_eq!(record.title, "Broadside");
        assert_eq!(record.authors, ["Anon."]);
        assert!(record.is_partial());
        assert_eq!(record.mods_xml.as_deref(), Some(xml));
    }

    #[test]
    fn test_mismatched_close_is_partial() {
        let xml = "<mods><titleInfo><title>Kept</title></titleInfo><name><namePart>A</wrong></name></mods>";
        let record = record_from_xml(xml).unwrap();
        assert_eq!(record.title, "Kept");
        assert!(record.is_partial());
    }

    #[test]
    fn test_no_element_is_total_failure() {
        let err = record_from_xml("this is not xml").unwrap_err();
        assert!(matches!(err, ClientError::Parse { .. }));
        assert!(record_from_xml("").is_err());
    }

    #[test]
    fn test_non_mods_root_uses_root() {
        let record = record_from_xml("<record><titleInfo><title>X</title></titleInfo></record>").unwrap();
        assert_eq!(record.title, "X");
        assert!(record.diagnostics.iter().any(|d| d.contains("no <mods>")));
    }

    #[test]
    fn test_fallback_id_is_stable() {
        let xml = "<mods><titleInfo><title>No id</title></titleInfo></mods>";
        let a = record_from_xml(xml).unwrap();
        let b = record_from_xml(xml).unwrap();
        assert!(a.id.starts_with("sha256:"));
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn test_deep_nesting_is_pruned() {
        let depth = 100_000;
        let xml = format!(
            "<mods><titleInfo><title>Deep</title></titleInfo>{}{}<setName>Kept</setName></mods>",
            "<a>".repeat(depth),
            "</a>".repeat(depth)
        );
        let record = record_from_xml(&xml).unwrap();
        assert_eq!(record.title, "Deep");
        assert_eq!(record.collections, ["Kept"]);
        assert!(record.diagnostics.iter().any(|d| d.contains("nested deeper than 256")));
    }

    #[test]
    fn test_unclosed_deep_nesting_counts_skipped_levels() {
        let xml = format!("<mods>{}", "<a>".repeat(MAX_DEPTH + 10));
        let doc = parse_document(&xml).unwrap();
        assert!(doc.diagnostics.iter().any(|d| d == &format!("document ended with {} unclosed element(s)", MAX_DEPTH + 11)));
    }

    #[test]
    fn test_empty_mods_in_collection_keep_their_slices() {
        let xml = "<modsCollection><mods/><mods ID=\"b\"/></modsCollection>";
        let page = records_from_xml(xml).unwrap();
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.records[0].mods_xml.as_deref(), Some("<mods/>"));
        assert_eq!(page.records[1].mods_xml.as_deref(), Some("<mods ID=\"b\"/>"));
        assert_ne!(page.records[0].id, page.records[1].id);
    }

    #[test]
    fn test_extra_top_level_element_is_noted() {
        let doc = parse_document("<a/><mods><titleInfo><title>Late</title></titleInfo></mods>").unwrap();
        assert_eq!(doc.root.name, "a");
        assert!(doc.diagnostics.contains(&"extra top-level <mods> ignored".to_string()));
    }

    #[test]
    fn test_collection_slices_are_exact() {
        let first = r#"<mods:mods><mods:titleInfo><mods:title>One</mods:title></mods:titleInfo></mods:mods>"#;
        let second = r#"<mods:mods><mods:titleInfo><mods:title>Two</mods:title></mods:titleInfo></mods:mods>"#;
        let xml = format!(
            "<results xmlns:mods=\"http://www.loc.gov/mods/v3\"><pagination><numFound>42</numFound></pagination><items>\n  {first}\n  {second}\n</items></results>"
        );
        let page = records_from_xml(&xml).unwrap();
        assert_eq!(page.total, Some(42));
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.records[0].title, "One");
        assert_eq!(page.records[0].mods_xml.as_deref(), Some(first));
        assert_eq!(page.records[1].mods_xml.as_deref(), Some(second));
    }
}
