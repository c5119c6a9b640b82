//! Provenance carried by qualified edges: citation, evidence, annotations.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::bel::lexer::quote;
use crate::{Error, Result};

/// Citation types accepted in `SET Citation`, in their canonical spelling.
pub const CITATION_TYPES: &[&str] = &[
    "PubMed",
    "PubMed Central",
    "PMC",
    "Book",
    "Journal",
    "Online Resource",
    "URL",
    "DOI",
    "Other",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A literature reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Citation {
    pub db: String,
    pub name: String,
    pub reference: String,
    pub date: Option<NaiveDate>,
    pub authors: Option<String>,
    pub comment: Option<String>,
}

impl Citation {
    /// Build from the 3 or 6 strings of a `SET Citation = {...}` line.
    pub fn from_fields(fields: &[String]) -> Result<Self> {
        if fields.len() != 3 && fields.len() != 6 {
            return Err(Error::InvalidCitation(format!(
                "expected 3 or 6 fields, got {}",
                fields.len()
            )));
        }

        let db = CITATION_TYPES
            .iter()
            .find(|t| t.eq_ignore_ascii_case(fields[0].trim()))
            .ok_or_else(|| Error::InvalidCitation(format!("unknown citation type: {}", fields[0])))?;

        let reference = fields[2].trim();
        if reference.is_empty() {
            return Err(Error::InvalidCitation("empty citation reference".into()));
        }
        if *db == "PubMed" && !reference.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::InvalidCitation(format!("PubMed identifier is not numeric: {reference}")));
        }

        let mut citation = Citation {
            db: db.to_string(),
            name: fields[1].clone(),
            reference: reference.to_string(),
            date: None,
            authors: None,
            comment: None,
        };

        if fields.len() == 6 {
            let date = fields[3].trim();
            if !date.is_empty() {
                let parsed = NaiveDate::parse_from_str(date, DATE_FORMAT)
                    .map_err(|_| Error::InvalidCitation(format!("date is not YYYY-MM-DD: {date}")))?;
                citation.date = Some(parsed);
            }
            citation.authors = non_empty(&fields[4]);
            citation.comment = non_empty(&fields[5]);
        }

        Ok(citation)
    }

    /// `citation_*` pairs, in the order they appear in a `SET Citation` line.
    pub fn annotation_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("citation_type", self.db.clone()),
            ("citation_name", self.name.clone()),
            ("citation_reference", self.reference.clone()),
        ];
        if let Some(date) = self.date {
            pairs.push(("citation_date", date.format(DATE_FORMAT).to_string()));
        }
        if let Some(authors) = &self.authors {
            pairs.push(("citation_authors", authors.clone()));
        }
        if let Some(comment) = &self.comment {
            pairs.push(("citation_comment", comment.clone()));
        }
        pairs
    }

    fn is_extended(&self) -> bool {
        self.date.is_some() || self.authors.is_some() || self.comment.is_some()
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Renders the braced list used on the right of `SET Citation =`.
impl fmt::Display for Citation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}, {}, {}", quote(&self.db), quote(&self.name), quote(&self.reference))?;
        if self.is_extended() {
            let date = self.date.map(|d| d.format(DATE_FORMAT).to_string()).unwrap_or_default();
            write!(
                f,
                ", {}, {}, {}",
                quote(&date),
                quote(self.authors.as_deref().unwrap_or_default()),
                quote(self.comment.as_deref().unwrap_or_default()),
            )?;
        }
        f.write_str("}")
    }
}

/// Annotation key -> set of values, in the order keys were SET.
///
/// Serializes with keys sorted so that edge identity does not depend on the
/// order annotations were declared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Annotations(IndexMap<String, BTreeSet<String>>);

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the values of `key`, keeping its original position if present.
    pub fn set(&mut self, key: impl Into<String>, values: BTreeSet<String>) {
        self.0.insert(key.into(), values);
    }

    /// Remove `key`, preserving the order of the rest. Returns whether it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        self.0.shift_remove(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&BTreeSet<String>> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Entries sorted by key.
    pub fn sorted(&self) -> BTreeMap<&String, &BTreeSet<String>> {
        self.0.iter().collect()
    }
}

impl Serialize for Annotations {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.sorted().serialize(serializer)
    }
}

impl FromIterator<(String, BTreeSet<String>)> for Annotations {
    fn from_iter<I: IntoIterator<Item = (String, BTreeSet<String>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The ambient document context stamped on a qualified edge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    pub citation: Option<Citation>,
    pub evidence: Option<String>,
    pub annotations: Annotations,
}
