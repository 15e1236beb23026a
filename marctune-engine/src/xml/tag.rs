//! Record element marker

use crate::error::{EngineError, Result};
use std::fmt;
use std::str::FromStr;

/// Namespace of MARCXML (MARC21 slim)
pub const MARC21_SLIM_NS: &str = "http://www.loc.gov/MARC21/slim";

/// Name of the repeating record element
///
/// Written in Clark notation: `record` or
/// `{http://www.loc.gov/MARC21/slim}record`. A tag without a namespace
/// matches the local name in any namespace, including none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordTag {
    namespace: Option<String>,
    local: String,
}

impl Default for RecordTag {
    fn default() -> Self {
        Self::new("record")
    }
}

impl RecordTag {
    /// Match a local name in any namespace
    pub fn new(local: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local: local.into(),
        }
    }

    /// Match a local name in one namespace only
    pub fn with_namespace(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local: local.into(),
        }
    }

    /// `record` in the MARC21 slim namespace
    pub fn marc21_slim() -> Self {
        Self::with_namespace(MARC21_SLIM_NS, "record")
    }

    /// Local name
    pub fn local(&self) -> &str {
        &self.local
    }

    /// Required namespace, if any
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Whether an element with this resolved name is a record
    pub fn matches(&self, namespace: Option<&str>, local: &str) -> bool {
        if self.local != local {
            return false;
        }
        match &self.namespace {
            None => true,
            Some(expected) => namespace == Some(expected.as_str()),
        }
    }
}

impl FromStr for RecordTag {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let tag = match s.strip_prefix('{') {
            Some(rest) => {
                let (namespace, local) = rest.split_once('}').ok_or_else(|| {
                    EngineError::ConfigError(format!("unterminated namespace in record tag: {s}"))
                })?;
                if namespace.is_empty() {
                    RecordTag::new(local)
                } else {
                    RecordTag::with_namespace(namespace, local)
                }
            }
            None => RecordTag::new(s),
        };

        if tag.local.is_empty() || tag.local.contains([':', '{', '}', ' ', '<', '>']) {
            return Err(EngineError::ConfigError(format!("invalid record tag: {s}")));
        }
        Ok(tag)
    }
}

impl fmt::Display for RecordTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{ns}}}{}", self.local),
            None => f.write_str(&self.local),
        }
    }
}
