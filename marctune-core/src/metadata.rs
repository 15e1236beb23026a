//! Catalog metadata extracted from a record
//!
//! These are the descriptive values a cataloguer reads off the item itself
//! and that the model is asked to expand into a full record.

use crate::record::{DataField, Record};
use serde::{Deserialize, Serialize};

/// Title used when 245$a is missing
pub const UNTITLED: &str = "Sem título";

/// Descriptive metadata for one book
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookMetadata {
    /// Title proper with remainder and statement of responsibility
    pub full_title: String,
    /// Main entry personal name
    pub author: String,
    /// Date of publication
    pub year: String,
    /// Edition statement
    pub edition: String,
    /// Place, publisher and date
    pub imprint: String,
    /// Topical subject with subdivisions
    pub subjects: String,
}

impl BookMetadata {
    /// Extract metadata from a MARC record
    pub fn from_record(record: &Record) -> Self {
        let year = record
            .field("260")
            .and_then(|f| f.subfield('c'))
            .or_else(|| record.field("264").and_then(|f| f.subfield('c')))
            .unwrap_or("")
            .to_string();

        let imprint = record
            .field("260")
            .or_else(|| record.field("264"))
            .map(|f| imprint_of(f, &year))
            .unwrap_or_default();

        Self {
            full_title: full_title(record.field("245")),
            author: author_of(record.field("100")),
            edition: record
                .field("250")
                .map(|f| f.subfield_or_empty('a').to_string())
                .unwrap_or_default(),
            subjects: subjects_of(record.field("650")),
            year,
            imprint,
        }
    }

    /// Placeholder names and values for template rendering
    pub fn placeholders(&self) -> [(&'static str, &str); 6] {
        [
            ("full_title", self.full_title.as_str()),
            ("author", self.author.as_str()),
            ("year", self.year.as_str()),
            ("edition", self.edition.as_str()),
            ("imprint", self.imprint.as_str()),
            ("subjects", self.subjects.as_str()),
        ]
    }
}

fn full_title(field: Option<&DataField>) -> String {
    let Some(field) = field else {
        return UNTITLED.to_string();
    };

    let mut title = field.subfield('a').unwrap_or(UNTITLED).to_string();
    let subtitle = field.subfield_or_empty('b');
    if !subtitle.is_empty() {
        title.push_str(" : ");
        title.push_str(subtitle);
    }
    let responsibility = field.subfield_or_empty('c');
    if !responsibility.is_empty() {
        title.push_str(" / ");
        title.push_str(responsibility);
    }
    title
}

fn author_of(field: Option<&DataField>) -> String {
    field
        .map(|f| join_words(['a', 'c', 'q', 'd'].iter().map(|&code| f.subfield_or_empty(code))))
        .unwrap_or_default()
}

fn subjects_of(field: Option<&DataField>) -> String {
    field
        .map(|f| {
            ['a', 'x', 'z', 'y']
                .iter()
                .map(|&code| f.subfield_or_empty(code).trim())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join("; ")
        })
        .unwrap_or_default()
}

fn imprint_of(field: &DataField, year: &str) -> String {
    let place = field.subfield_or_empty('a');
    let publisher = field.subfield_or_empty('b');
    format!("{place} : {publisher}, {year}")
        .trim_matches(|c: char| matches!(c, ' ' | ':' | ','))
        .to_string()
}

/// Join parts with single spaces, collapsing any runs of whitespace
fn join_words<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
