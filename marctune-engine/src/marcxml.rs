//! MARCXML decoding
//!
//! Maps a `<record>` element in the MARC21 slim layout onto the record
//! model. Prefixes are ignored; unknown child elements are skipped.

use crate::error::{EngineError, Result};
use crate::xml::RecordNode;
use marctune_core::{DataField, Record};

/// Decode one MARCXML record element
pub fn to_record(node: &RecordNode) -> Result<Record> {
    if node.local_name() != "record" {
        return Err(EngineError::InvalidRecord(format!(
            "expected <record>, found <{}>",
            node.name
        )));
    }

    let mut record = Record::new();
    for child in node.elements() {
        match child.local_name() {
            "leader" => record.leader = child.text(),
            "controlfield" => {
                let tag = required_tag(child)?;
                record.add_control_field(tag, child.text());
            }
            "datafield" => record.add_data_field(data_field(child)?),
            _ => {}
        }
    }
    Ok(record)
}

fn required_tag(field: &RecordNode) -> Result<&str> {
    field
        .attribute("tag")
        .filter(|tag| !tag.trim().is_empty())
        .ok_or_else(|| {
            EngineError::InvalidRecord(format!("<{}> without a tag attribute", field.name))
        })
}

fn indicator(field: &RecordNode, key: &str) -> char {
    field
        .attribute(key)
        .and_then(|value| value.chars().next())
        .unwrap_or(' ')
}

fn data_field(node: &RecordNode) -> Result<DataField> {
    let mut field = DataField::new(
        required_tag(node)?,
        indicator(node, "ind1"),
        indicator(node, "ind2"),
    );

    for subfield in node.elements().filter(|e| e.local_name() == "subfield") {
        let code = subfield
            .attribute("code")
            .and_then(|code| code.chars().next())
            .ok_or_else(|| {
                EngineError::InvalidRecord(format!(
                    "subfield without a code in field {}",
                    field.tag
                ))
            })?;
        field.push_subfield(code, subfield.text());
    }
    Ok(field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::{RecordReader, RecordTag};

    fn parse(xml: &str) -> RecordNode {
        RecordReader::new(xml.as_bytes(), RecordTag::default(), false)
            .next()
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_decode_full_record() {
        let node = parse(
            r#"<record xmlns="http://www.loc.gov/MARC21/slim">
  <leader>00000nam a2200000 a 4500</leader>
  <controlfield tag="001">12345</controlfield>
  <datafield tag="245" ind1="1" ind2="0">
    <subfield code="a">O segredo de Luísa /</subfield>
    <subfield code="c">Fernando Dolabela.</subfield>
  </datafield>
  <datafield tag="650" ind1=" " ind2="4">
    <subfield code="a">Empreendedorismo</subfield>
  </datafield>
</record>"#,
        );

        let record = to_record(&node).unwrap();
        assert_eq!(record.leader, "00000nam a2200000 a 4500");
        assert_eq!(record.control_field("001"), Some("12345"));
        let title = record.field("245").unwrap();
        assert_eq!(title.ind1, '1');
        assert_eq!(title.subfield('c'), Some("Fernando Dolabela."));
        assert_eq!(record.field("650").unwrap().ind1, ' ');
        assert_eq!(
            record.to_string(),
            "=LDR  00000nam a2200000 a 4500\n=001  12345\n=245  10$aO segredo de Luísa /$cFernando Dolabela.\n=650  \\4$aEmpreendedorismo\n"
        );
    }

    #[test]
    fn test_prefixed_elements() {
        let node = parse(
            r#"<marc:record xmlns:marc="http://www.loc.gov/MARC21/slim"><marc:datafield tag="100" ind1="1"><marc:subfield code="a">Dolabela, Fernando</marc:subfield></marc:datafield></marc:record>"#,
        );
        let record = to_record(&node).unwrap();
        let author = record.field("100").unwrap();
        assert_eq!(author.ind2, ' ');
        assert_eq!(author.subfield('a'), Some("Dolabela, Fernando"));
    }

    #[test]
    fn test_missing_tag_rejected() {
        let node = parse("<record><datafield ind1=\"1\"/></record>");
        assert!(matches!(to_record(&node), Err(EngineError::InvalidRecord(_))));
    }

    #[test]
    fn test_missing_subfield_code_rejected() {
        let node = parse(r#"<record><datafield tag="245"><subfield>x</subfield></datafield></record>"#);
        assert!(to_record(&node).is_err());
    }

    #[test]
    fn test_wrong_root() {
        let node = RecordNode::new("collection");
        assert!(to_record(&node).is_err());
    }
}
