//! Normalized bibliographic record.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

static RECORD_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._:-]{1,128}$").expect("valid record id regex"));

static YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{4}").expect("valid year regex"));

static YEAR_MONTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{4})-([0-9]{1,2})$").expect("valid year-month regex"));

static FULL_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{4})-([0-9]{1,2})-([0-9]{1,2})$").expect("valid date regex"));

static YEAR_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{4})\s*[-/]\s*([0-9]{4})$").expect("valid range regex"));

static CIRCA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i:ca?)\.?\s*([0-9]{4})").expect("valid circa regex"));

static BRACKETED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[([0-9]{4})\??\]$").expect("valid bracket regex"));

/// A catalog record in the normalized schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    /// Stable identifier, unique within a result set.
    pub id: String,

    /// Title. Empty when the source had none.
    pub title: String,

    /// Author and contributor names in source order.
    #[serde(default)]
    pub authors: Vec<String>,

    /// Publication date as found plus its parsed forms.
    #[serde(default)]
    pub publication_date: Option<PublicationDate>,

    /// Publisher name.
    #[serde(default)]
    pub publisher: Option<String>,

    /// Language code or name.
    #[serde(default)]
    pub language: Option<String>,

    /// Subject headings, first occurrence order, no duplicates.
    #[serde(default)]
    pub subjects: Vec<String>,

    /// Identifier scheme (upper-case) to value.
    #[serde(default)]
    pub identifiers: BTreeMap<String, String>,

    /// MODS XML exactly as received.
    #[serde(default)]
    pub mods_xml: Option<String>,

    /// Resource type, e.g. "text".
    #[serde(default)]
    pub resource_type: Option<String>,

    /// Abstract or description.
    #[serde(default)]
    pub description: Option<String>,

    /// Classification numbers.
    #[serde(default)]
    pub classification: Vec<String>,

    /// Collections the record belongs to.
    #[serde(default)]
    pub collections: Vec<String>,

    /// Place of origin.
    #[serde(default)]
    pub origin_place: Option<String>,

    /// Physical and online locations.
    #[serde(default)]
    pub holdings: Vec<Holding>,

    /// True if a digital copy is available.
    #[serde(default)]
    pub digital_content: bool,

    /// Library usage score.
    #[serde(default)]
    pub stackscore: Option<f64>,

    /// Notes on fields that could not be read.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<String>,
}

/// One place the item is held or can be reached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    /// Holding library or repository.
    #[serde(default)]
    pub location: Option<String>,

    /// Call number or shelf mark.
    #[serde(default)]
    pub shelf_locator: Option<String>,

    /// Link to the item or its catalog page.
    #[serde(default)]
    pub url: Option<String>,
}

impl Holding {
    /// True if no part of the holding is known.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.location.is_none() && self.shelf_locator.is_none() && self.url.is_none()
    }
}

impl CatalogRecord {
    /// True if any part of the source failed to parse.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Publication year, if one could be read.
    #[must_use]
    pub fn year(&self) -> Option<i32> {
        self.publication_date.as_ref().and_then(|d| d.year)
    }

    /// First ISBN, if any.
    #[must_use]
    pub fn isbn(&self) -> Option<&str> {
        self.identifiers.get("ISBN").map(String::as_str)
    }

    /// Authors joined for display.
    #[must_use]
    pub fn author_line(&self) -> String {
        match self.authors.len() {
            0 => String::new(),
            1..=3 => self.authors.join("; "),
            n => format!("{}; et al. ({} contributors)", self.authors[..3].join("; "), n),
        }
    }

    /// Fill empty fields of `self` from `other`.
    ///
    /// Used when a record is assembled from two representations of the
    /// same item. Diagnostics from both are kept.
    pub fn fill_from(&mut self, other: Self) {
        if self.id.is_empty() {
            self.id = other.id;
        }
        if self.title.is_empty() {
            self.title = other.title;
        }
        if self.authors.is_empty() {
            self.authors = other.authors;
        }
        if self.publication_date.is_none() {
            self.publication_date = other.publication_date;
        }
        self.publisher = self.publisher.take().or(other.publisher);
        self.language = self.language.take().or(other.language);
        for subject in other.subjects {
            if !self.subjects.contains(&subject) {
                self.subjects.push(subject);
            }
        }
        for (scheme, value) in other.identifiers {
            self.identifiers.entry(scheme).or_insert(value);
        }
        self.mods_xml = self.mods_xml.take().or(other.mods_xml);
        self.resource_type = self.resource_type.take().or(other.resource_type);
        self.description = self.description.take().or(other.description);
        if self.classification.is_empty() {
            self.classification = other.classification;
        }
        for collection in other.collections {
            if !self.collections.contains(&collection) {
                self.collections.push(collection);
            }
        }
        self.origin_place = self.origin_place.take().or(other.origin_place);
        if self.holdings.is_empty() {
            self.holdings = other.holdings;
        }
        self.digital_content |= other.digital_content;
        self.stackscore = self.stackscore.or(other.stackscore);
        self.diagnostics.extend(other.diagnostics);
    }
}

/// A publication date as found in the record, plus what could be parsed from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationDate {
    /// Source text, trimmed.
    pub raw: String,
    /// First four-digit year in the text.
    #[serde(default)]
    pub year: Option<i32>,
    /// ISO 8601 form (`YYYY`, `YYYY-MM` or `YYYY-MM-DD`) when the text is exact.
    #[serde(default)]
    pub iso: Option<String>,
    /// Display form: padded ISO for exact dates, `[YYYY]` for approximate ones,
    /// `YYYY-YYYY` for ranges, otherwise the source text.
    pub display: String,
}

impl PublicationDate {
    /// Parse a free-form catalog date. Returns `None` for blank input.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let year = YEAR.find(raw).and_then(|m| m.as_str().parse().ok());
        let mut date = Self { raw: raw.to_string(), year, iso: None, display: raw.to_string() };

        if raw.len() == 4 && raw.bytes().all(|b| b.is_ascii_digit()) {
            date.iso = Some(raw.to_string());
        } else if let Some(c) = YEAR_MONTH.captures(raw) {
            let month: u32 = c[2].parse().unwrap_or(0);
            if (1..=12).contains(&month) {
                let iso = format!("{}-{month:02}", &c[1]);
                date.display.clone_from(&iso);
                date.iso = Some(iso);
            }
        } else if let Some(c) = FULL_DATE.captures(raw) {
            let parsed = NaiveDate::from_ymd_opt(
                c[1].parse().unwrap_or(0),
                c[2].parse().unwrap_or(0),
                c[3].parse().unwrap_or(0),
            );
            if let Some(d) = parsed {
                let iso = d.format("%Y-%m-%d").to_string();
                date.display.clone_from(&iso);
                date.iso = Some(iso);
            }
        } else if let Some(c) = YEAR_RANGE.captures(raw) {
            date.display = format!("{}-{}", &c[1], &c[2]);
        } else if let Some(c) = CIRCA.captures(raw).or_else(|| BRACKETED.captures(raw)) {
            date.display = format!("[{}]", &c[1]);
        }

        Some(date)
    }
}

/// Check a record identifier before it is placed in a URL path.
///
/// # Errors
///
/// Returns a validation error unless the id is 1 to 128 characters of
/// `[A-Za-z0-9._:-]`.
pub fn validate_record_id(id: &str) -> ClientResult<&str> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ClientError::validation("record_id", "must not be empty"));
    }
    if !RECORD_ID.is_match(id) {
        return Err(ClientError::validation(
            "record_id",
            "must be at most 128 characters of letters, digits, '.', '_', ':' or '-'",
        ));
    }
    Ok(id)
}

/// Canonical identifier scheme key and value.
///
/// Scheme names are upper-cased; ISBN and ISSN values lose hyphens and spaces.
/// Returns `None` if the value is blank.
#[must_use]
pub fn normalize_identifier(scheme: &str, value: &str) -> Option<(String, String)> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let scheme = match scheme.trim() {
        "" => "ID".to_string(),
        s => s.to_ascii_uppercase(),
    };
    let value = if scheme == "ISBN" || scheme == "ISSN" {
        value.chars().filter(|c| *c != '-' && !c.is_whitespace()).collect()
    } else {
        value.to_string()
    };
    Some((scheme, value))
}
