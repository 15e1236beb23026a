//! MARC21 record model
//!
//! Fields keep the order in which they were read. Rendering follows the
//! mnemonic line format used by cataloguing tools:
//!
//! ```text
//! =LDR  00000nam a2200000 a 4500
//! =001  12345
//! =245  10$aO segredo de Luísa /$cFernando Dolabela.
//! ```
//!
//! Blank indicators are written as `\`.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// One coded subfield of a data field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subfield {
    /// Subfield code (`a`, `b`, ...)
    pub code: char,
    /// Subfield content
    pub value: String,
}

/// Control field (`001`–`009`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlField {
    /// Three-character tag
    pub tag: String,
    /// Unstructured field content
    pub value: String,
}

/// Variable data field with indicators and subfields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataField {
    /// Three-character tag
    pub tag: String,
    /// First indicator, space when blank
    pub ind1: char,
    /// Second indicator, space when blank
    pub ind2: char,
    /// Subfields in record order
    pub subfields: SmallVec<[Subfield; 4]>,
}

impl DataField {
    /// Create a data field without subfields
    pub fn new(tag: impl Into<String>, ind1: char, ind2: char) -> Self {
        Self {
            tag: tag.into(),
            ind1,
            ind2,
            subfields: SmallVec::new(),
        }
    }

    /// Builder-style subfield append
    pub fn with_subfield(mut self, code: char, value: impl Into<String>) -> Self {
        self.push_subfield(code, value);
        self
    }

    /// Append a subfield
    pub fn push_subfield(&mut self, code: char, value: impl Into<String>) {
        self.subfields.push(Subfield {
            code,
            value: value.into(),
        });
    }

    /// First value of the given subfield code
    pub fn subfield(&self, code: char) -> Option<&str> {
        self.subfields
            .iter()
            .find(|sf| sf.code == code)
            .map(|sf| sf.value.as_str())
    }

    /// First value of the given subfield code, or an empty string
    pub fn subfield_or_empty(&self, code: char) -> &str {
        self.subfield(code).unwrap_or("")
    }
}

/// A field of either kind, kept in record order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Field {
    /// Control field
    Control(ControlField),
    /// Data field
    Data(DataField),
}

impl Field {
    /// Tag of the field
    pub fn tag(&self) -> &str {
        match self {
            Field::Control(f) => &f.tag,
            Field::Data(f) => &f.tag,
        }
    }
}

/// A bibliographic record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// 24-character leader, empty when the source had none
    pub leader: String,
    fields: Vec<Field>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a control field
    pub fn add_control_field(&mut self, tag: impl Into<String>, value: impl Into<String>) {
        self.fields.push(Field::Control(ControlField {
            tag: tag.into(),
            value: value.into(),
        }));
    }

    /// Append a data field
    pub fn add_data_field(&mut self, field: DataField) {
        self.fields.push(Field::Data(field));
    }

    /// All fields in record order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// First data field with the given tag
    pub fn field(&self, tag: &str) -> Option<&DataField> {
        self.fields.iter().find_map(|f| match f {
            Field::Data(df) if df.tag == tag => Some(df),
            _ => None,
        })
    }

    /// Every data field with the given tag
    pub fn data_fields<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a DataField> + 'a {
        self.fields.iter().filter_map(move |f| match f {
            Field::Data(df) if df.tag == tag => Some(df),
            _ => None,
        })
    }

    /// First control field value with the given tag
    pub fn control_field(&self, tag: &str) -> Option<&str> {
        self.fields.iter().find_map(|f| match f {
            Field::Control(cf) if cf.tag == tag => Some(cf.value.as_str()),
            _ => None,
        })
    }

    /// True when the record has no leader and no fields
    pub fn is_empty(&self) -> bool {
        self.leader.is_empty() && self.fields.is_empty()
    }
}

fn indicator(c: char) -> char {
    if c == ' ' {
        '\\'
    } else {
        c
    }
}

impl fmt::Display for DataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "={}  {}{}", self.tag, indicator(self.ind1), indicator(self.ind2))?;
        for sf in &self.subfields {
            write!(f, "${}{}", sf.code, sf.value)?;
        }
        Ok(())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Control(cf) => write!(f, "={}  {}", cf.tag, cf.value),
            Field::Data(df) => write!(f, "{df}"),
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=LDR  {}", self.leader)?;
        for field in &self.fields {
            writeln!(f, "{field}")?;
        }
        Ok(())
    }
}
