//! Streaming record reader
//!
//! Only the subtree of the record currently being read is held in memory.
//! Everything outside records is reduced to a stack of open element names
//! and the namespace declarations they carry.

use super::node::{RecordNode, XmlNode};
use super::tag::RecordTag;
use crate::error::{EngineError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const READ_BUFFER_BYTES: usize = 64 * 1024;

/// Element open outside any record
#[derive(Debug)]
struct Scope {
    name: String,
    /// `(prefix, uri)`; the default namespace has an empty prefix
    declarations: Vec<(String, String)>,
}

enum Step {
    Record(RecordNode),
    Continue,
    End,
}

/// Pull parser yielding one record element at a time
///
/// In recovery mode a malformed fragment (mismatched end tag, bad entity,
/// bad attribute, syntax error, truncated record) discards the record being
/// read and scanning resumes at the next record start tag. After a syntax
/// error the parser is rebuilt over the bytes not yet consumed. The number of
/// discarded fragments is available from [`RecordReader::skipped`]. In
/// strict mode the first such error is returned and the iterator ends.
pub struct RecordReader<R: BufRead> {
    reader: Option<Reader<R>>,
    /// Bytes consumed by parsers discarded after syntax errors
    offset: u64,
    tag: RecordTag,
    recover: bool,
    buf: Vec<u8>,
    scopes: Vec<Scope>,
    open: Vec<RecordNode>,
    records: usize,
    skipped: usize,
    last_error_at: Option<u64>,
    done: bool,
}

impl RecordReader<BufReader<File>> {
    /// Open a file for reading
    pub fn open(path: &Path, tag: RecordTag, recover: bool) -> Result<Self> {
        let file = File::open(path).map_err(|e| EngineError::file(path, e))?;
        Ok(Self::new(
            BufReader::with_capacity(READ_BUFFER_BYTES, file),
            tag,
            recover,
        ))
    }
}

impl<R: BufRead> RecordReader<R> {
    /// Wrap a buffered byte source
    pub fn new(input: R, tag: RecordTag, recover: bool) -> Self {
        Self {
            reader: Some(parser(input)),
            offset: 0,
            tag,
            recover,
            buf: Vec::new(),
            scopes: Vec::new(),
            open: Vec::new(),
            records: 0,
            skipped: 0,
            last_error_at: None,
            done: false,
        }
    }

    /// Records yielded so far
    pub fn records(&self) -> usize {
        self.records
    }

    /// Malformed fragments skipped so far
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Bytes consumed from the input
    pub fn byte_position(&self) -> u64 {
        self.offset + self.reader.as_ref().map_or(0, Reader::buffer_position)
    }

    fn step(&mut self) -> Result<Step> {
        let mut buf = std::mem::take(&mut self.buf);
        buf.clear();
        let step = self.handle_event(&mut buf);
        self.buf = buf;
        step
    }

    fn handle_event(&mut self, buf: &mut Vec<u8>) -> Result<Step> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(Step::End);
        };
        let event = match reader.read_event_into(buf) {
            Ok(event) => event,
            Err(e) => {
                let step = self.malformed(e.to_string())?;
                self.restart();
                return Ok(step);
            }
        };

        match event {
            Event::Start(e) => {
                if self.open.is_empty() {
                    Ok(self.enter(&e, false))
                } else {
                    let node = match element(&e) {
                        Ok(node) => node,
                        Err(message) => return self.malformed(message),
                    };
                    self.open.push(node);
                    Ok(Step::Continue)
                }
            }
            Event::Empty(e) => {
                if self.open.is_empty() {
                    Ok(self.enter(&e, true))
                } else {
                    let node = match element(&e) {
                        Ok(node) => node,
                        Err(message) => return self.malformed(message),
                    };
                    self.append(XmlNode::Element(node));
                    Ok(Step::Continue)
                }
            }
            Event::End(e) => {
                let name = match std::str::from_utf8(e.name().as_ref()) {
                    Ok(name) => name.to_string(),
                    Err(err) => return self.malformed(format!("invalid end tag name: {err}")),
                };
                self.close(name)
            }
            Event::Text(e) => {
                if !self.open.is_empty() {
                    match e.unescape() {
                        Ok(text) => self.append(XmlNode::Text(text.into_owned())),
                        Err(err) => return self.malformed(format!("invalid text: {err}")),
                    }
                }
                Ok(Step::Continue)
            }
            Event::CData(e) => {
                if !self.open.is_empty() {
                    match String::from_utf8(e.into_inner().into_owned()) {
                        Ok(data) => self.append(XmlNode::CData(data)),
                        Err(err) => return self.malformed(format!("invalid CDATA: {err}")),
                    }
                }
                Ok(Step::Continue)
            }
            Event::Comment(e) => {
                if !self.open.is_empty() {
                    let comment = String::from_utf8_lossy(&e).into_owned();
                    self.append(XmlNode::Comment(comment));
                }
                Ok(Step::Continue)
            }
            Event::Eof => {
                if !self.open.is_empty() {
                    self.malformed("unexpected end of input inside a record".to_string())?;
                } else if !self.scopes.is_empty() && !self.recover {
                    return Err(self.parse_error(format!(
                        "unexpected end of input, <{}> is not closed",
                        self.scopes[self.scopes.len() - 1].name
                    )));
                }
                Ok(Step::End)
            }
            Event::Decl(_) | Event::PI(_) | Event::DocType(_) => Ok(Step::Continue),
        }
    }

    /// Start tag seen outside any record
    fn enter(&mut self, start: &BytesStart<'_>, empty: bool) -> Step {
        // Attribute problems outside records only matter for record roots
        let Ok(mut node) = element(start) else {
            if !empty {
                self.scopes.push(Scope {
                    name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
                    declarations: Vec::new(),
                });
            }
            return Step::Continue;
        };

        let declarations = namespace_declarations(&node.attributes);
        let (prefix, local) = match node.name.split_once(':') {
            Some((prefix, local)) => (prefix, local),
            None => ("", node.name.as_str()),
        };
        let namespace = resolve(&self.scopes, &declarations, prefix);

        if !self.tag.matches(namespace.as_deref(), local) {
            if !empty {
                self.scopes.push(Scope {
                    name: node.name,
                    declarations,
                });
            }
            return Step::Continue;
        }

        // Re-declare inherited bindings so the record stands alone
        let mut attributes: Vec<(String, String)> = in_scope(&self.scopes)
            .into_iter()
            .filter(|(prefix, _)| !declarations.iter().any(|(p, _)| p == prefix))
            .map(|(prefix, uri)| (declaration_key(&prefix), uri))
            .collect();
        attributes.append(&mut node.attributes);
        node.attributes = attributes;

        if empty {
            Step::Record(node)
        } else {
            self.open.push(node);
            Step::Continue
        }
    }

    fn close(&mut self, name: String) -> Result<Step> {
        let Some(top) = self.open.last() else {
            // Outside records, a stray end tag is left over from a skipped fragment
            if self.scopes.last().is_some_and(|scope| scope.name == name) {
                self.scopes.pop();
            } else if !self.recover {
                return Err(self.parse_error(format!("unexpected end tag </{name}>")));
            }
            return Ok(Step::Continue);
        };

        if top.name != name {
            let message = format!("expected </{}>, found </{name}>", top.name);
            return self.malformed(message);
        }

        let Some(node) = self.open.pop() else {
            return Ok(Step::Continue);
        };
        if self.open.is_empty() {
            Ok(Step::Record(node))
        } else {
            self.append(XmlNode::Element(node));
            Ok(Step::Continue)
        }
    }

    fn append(&mut self, child: XmlNode) {
        if let Some(parent) = self.open.last_mut() {
            parent.children.push(child);
        }
    }

    /// quick-xml reports only `Eof` once a read has failed
    fn restart(&mut self) {
        if let Some(reader) = self.reader.take() {
            self.offset += reader.buffer_position();
            self.reader = Some(parser(reader.into_inner()));
        }
    }

    fn parse_error(&self, message: String) -> EngineError {
        EngineError::Parse {
            position: self.byte_position(),
            message,
        }
    }

    /// Drop the partial record; fatal unless recovering
    fn malformed(&mut self, message: String) -> Result<Step> {
        if !self.recover {
            return Err(self.parse_error(message));
        }

        let position = self.byte_position();
        log::debug!("skipping malformed fragment at byte {position}: {message}");
        self.open.clear();
        self.skipped += 1;

        // A parser that stops advancing would loop forever
        if self.last_error_at == Some(position) {
            log::warn!("parser stalled at byte {position}, stopping");
            return Ok(Step::End);
        }
        self.last_error_at = Some(position);
        Ok(Step::Continue)
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<RecordNode>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            match self.step() {
                Ok(Step::Record(node)) => {
                    self.records += 1;
                    return Some(Ok(node));
                }
                Ok(Step::Continue) => {}
                Ok(Step::End) => self.done = true,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
        None
    }
}

fn parser<R: BufRead>(input: R) -> Reader<R> {
    let mut reader = Reader::from_reader(input);
    // End tags are matched here so a mismatch only costs one record
    reader.config_mut().check_end_names = false;
    reader
}

/// Build an element from a start tag
fn element(start: &BytesStart<'_>) -> std::result::Result<RecordNode, String> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| format!("invalid element name: {e}"))?
        .to_string();

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| format!("invalid attribute on <{name}>: {e}"))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| format!("invalid attribute name on <{name}>: {e}"))?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| format!("invalid attribute value on <{name}>: {e}"))?
            .into_owned();
        attributes.push((key, value));
    }

    Ok(RecordNode {
        name,
        attributes,
        children: Vec::new(),
    })
}

fn namespace_declarations(attributes: &[(String, String)]) -> Vec<(String, String)> {
    attributes
        .iter()
        .filter_map(|(key, value)| {
            if key == "xmlns" {
                Some((String::new(), value.clone()))
            } else {
                key.strip_prefix("xmlns:")
                    .map(|prefix| (prefix.to_string(), value.clone()))
            }
        })
        .collect()
}

fn declaration_key(prefix: &str) -> String {
    if prefix.is_empty() {
        "xmlns".to_string()
    } else {
        format!("xmlns:{prefix}")
    }
}

/// Namespace bound to `prefix`, innermost declaration first
fn resolve(scopes: &[Scope], own: &[(String, String)], prefix: &str) -> Option<String> {
    own.iter()
        .chain(scopes.iter().rev().flat_map(|scope| scope.declarations.iter()))
        .find(|(p, _)| p == prefix)
        .map(|(_, uri)| uri.clone())
        .filter(|uri| !uri.is_empty())
}

/// Every binding visible from the innermost scope, outermost first
fn in_scope(scopes: &[Scope]) -> Vec<(String, String)> {
    let mut bindings: Vec<(String, String)> = Vec::new();
    for scope in scopes {
        for (prefix, uri) in &scope.declarations {
            match bindings.iter_mut().find(|(p, _)| p == prefix) {
                Some(binding) => binding.1 = uri.clone(),
                None => bindings.push((prefix.clone(), uri.clone())),
            }
        }
    }
    bindings
}
