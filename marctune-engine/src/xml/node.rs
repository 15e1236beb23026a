//! Owned element tree for a single record

use quick_xml::escape::{escape, partial_escape};

/// Child of an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    /// Nested element
    Element(RecordNode),
    /// Character data, unescaped
    Text(String),
    /// CDATA section content
    CData(String),
    /// Comment content
    Comment(String),
}

/// One element with its attributes and children
///
/// Names are kept exactly as written in the source, prefix included.
/// Attribute values are stored unescaped and escaped again on output.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordNode {
    /// Qualified name as written (`record`, `marc:record`)
    pub name: String,
    /// Attributes in source order
    pub attributes: Vec<(String, String)>,
    /// Children in source order
    pub children: Vec<XmlNode>,
}

impl RecordNode {
    /// Element without attributes or children
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Name without its prefix
    pub fn local_name(&self) -> &str {
        self.name
            .split_once(':')
            .map_or(self.name.as_str(), |(_, local)| local)
    }

    /// Value of an attribute by its qualified name
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Child elements in order
    pub fn elements(&self) -> impl Iterator<Item = &RecordNode> {
        self.children.iter().filter_map(|child| match child {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Concatenated text and CDATA content of all descendants
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                XmlNode::Element(element) => element.collect_text(out),
                XmlNode::Text(text) | XmlNode::CData(text) => out.push_str(text),
                XmlNode::Comment(_) => {}
            }
        }
    }

    /// Serialize the element and its subtree
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write_xml(&mut out);
        out
    }

    fn write_xml(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attributes {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape(value.as_str()));
            out.push('"');
        }

        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }

        out.push('>');
        for child in &self.children {
            match child {
                XmlNode::Element(element) => element.write_xml(out),
                XmlNode::Text(text) => out.push_str(&partial_escape(text.as_str())),
                XmlNode::CData(data) => {
                    out.push_str("<![CDATA[");
                    out.push_str(data);
                    out.push_str("]]>");
                }
                XmlNode::Comment(comment) => {
                    out.push_str("<!--");
                    out.push_str(comment);
                    out.push_str("-->");
                }
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subfield(code: &str, value: &str) -> RecordNode {
        RecordNode {
            name: "subfield".to_string(),
            attributes: vec![("code".to_string(), code.to_string())],
            children: vec![XmlNode::Text(value.to_string())],
        }
    }

    #[test]
    fn test_serialize_nested() {
        let mut field = RecordNode::new("datafield");
        field.attributes.push(("tag".to_string(), "245".to_string()));
        field.children.push(XmlNode::Element(subfield("a", "Tom & Jerry <1>")));

        let mut record = RecordNode::new("record");
        record.children.push(XmlNode::Element(field));

        assert_eq!(
            record.to_xml(),
            r#"<record><datafield tag="245"><subfield code="a">Tom &amp; Jerry &lt;1&gt;</subfield></datafield></record>"#
        );
    }

    #[test]
    fn test_attribute_escaping() {
        let mut node = RecordNode::new("x");
        node.attributes.push(("v".to_string(), "a\"b".to_string()));
        assert_eq!(node.to_xml(), r#"<x v="a&quot;b"/>"#);
    }

    #[test]
    fn test_cdata_and_comment_kept() {
        let mut node = RecordNode::new("note");
        node.children.push(XmlNode::Comment(" local ".to_string()));
        node.children.push(XmlNode::CData("1 < 2".to_string()));
        assert_eq!(node.to_xml(), "<note><!-- local --><![CDATA[1 < 2]]></note>");
        assert_eq!(node.text(), "1 < 2");
    }

    #[test]
    fn test_local_name_and_lookup() {
        let node = RecordNode {
            name: "marc:subfield".to_string(),
            attributes: vec![("code".to_string(), "a".to_string())],
            children: Vec::new(),
        };
        assert_eq!(node.local_name(), "subfield");
        assert_eq!(node.attribute("code"), Some("a"));
        assert_eq!(node.attribute("tag"), None);
    }
}
