//! MARCXML reader.
//!
//! Parses the LOC MARCXML envelope (<https://www.loc.gov/standards/marcxml/>)
//! into [`RawRecord`]s. Both a `<collection>` of records and a bare
//! `<record>` document are accepted, with the default namespace
//! (`<record xmlns="...">`), a prefixed namespace (`<marc:record>`), or no
//! namespace at all.
//!
//! Records are split out of the document before they are deserialized, so a
//! malformed record fails on its own and the rest of the batch is still read.
//!
//! # Examples
//!
//! ```
//! use mrrc_ingest::marcxml;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let xml = r#"<collection xmlns="http://www.loc.gov/MARC21/slim">
//!   <record>
//!     <leader>00000nam a2200000 i 4500</leader>
//!     <controlfield tag="001">2654497</controlfield>
//!     <datafield tag="245" ind1=" " ind2=" ">
//!       <subfield code="a">Quantum field theory</subfield>
//!     </datafield>
//!   </record>
//! </collection>"#;
//!
//! let records = marcxml::read_records(xml)?;
//! assert_eq!(records[0].recid(), Some("2654497"));
//! # Ok(())
//! # }
//! ```

use crate::error::{IngestError, Result};
use crate::leader::Leader;
use crate::record::{RawField, RawRecord};
use lazy_static::lazy_static;
use quick_xml::de::from_str as xml_from_str;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

lazy_static! {
    static ref RE_XMLNS: Regex = Regex::new(r#"\s+xmlns(?::\w+)?="[^"]*""#).unwrap();
    static ref RE_PREFIX: Regex = Regex::new(r"<(/?)(\w+):").unwrap();
    static ref RE_RECORD: Regex =
        Regex::new(r"(?s)<record(?:\s[^>]*)?(?:/>|>.*?</record>)").unwrap();
}

#[derive(Debug, Deserialize)]
#[serde(rename = "record")]
struct XmlRecord {
    #[serde(default)]
    leader: Option<String>,
    #[serde(default, rename = "$value")]
    fields: Vec<XmlField>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum XmlField {
    Controlfield(XmlControlField),
    Datafield(XmlDataField),
}

#[derive(Debug, Deserialize)]
struct XmlControlField {
    #[serde(rename = "@tag")]
    tag: String,
    #[serde(default, rename = "$text")]
    value: String,
}

#[derive(Debug, Deserialize)]
struct XmlDataField {
    #[serde(rename = "@tag")]
    tag: String,
    #[serde(default, rename = "@ind1")]
    ind1: String,
    #[serde(default, rename = "@ind2")]
    ind2: String,
    #[serde(default)]
    subfield: Vec<XmlSubfield>,
}

#[derive(Debug, Deserialize)]
struct XmlSubfield {
    #[serde(rename = "@code")]
    code: String,
    #[serde(default, rename = "$text")]
    value: String,
}

// ---------------------------------------------------------------------------
// Namespace stripping
// ---------------------------------------------------------------------------

/// Strip namespace declarations and element prefixes so one set of serde
/// structs reads every namespace variant.
fn strip_marcxml_ns(xml: &str) -> String {
    let stripped = RE_XMLNS.replace_all(xml, "");
    RE_PREFIX.replace_all(&stripped, "<$1").to_string()
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Parse every record of a MARCXML document, failing on the first bad one.
///
/// # Errors
///
/// Returns [`IngestError::Xml`] if any record cannot be parsed.
pub fn read_records(xml: &str) -> Result<Vec<RawRecord>> {
    read_records_lenient(xml).into_iter().collect()
}

/// Parse every record of a MARCXML document independently.
///
/// Each element of the result corresponds to one `<record>` element in
/// document order; a malformed record yields an `Err` in its slot.
#[must_use]
pub fn read_records_lenient(xml: &str) -> Vec<Result<RawRecord>> {
    let cleaned = strip_marcxml_ns(xml);
    RE_RECORD
        .find_iter(&cleaned)
        .map(|m| parse_record(m.as_str()))
        .collect()
}

/// Read a MARCXML file.
///
/// # Errors
///
/// Returns [`IngestError::Io`] if the file cannot be read. Per-record parse
/// failures are returned inside the vector.
pub fn read_file(path: &Path) -> Result<Vec<Result<RawRecord>>> {
    let xml = std::fs::read_to_string(path)?;
    Ok(read_records_lenient(&xml))
}

/// Parse a single `<record>` element.
///
/// # Errors
///
/// Returns [`IngestError::Xml`] if the XML is invalid, or
/// [`IngestError::MalformedRecord`] if a field is structurally broken.
pub fn parse_record(xml: &str) -> Result<RawRecord> {
    let cleaned = strip_marcxml_ns(xml);
    let xml_record: XmlRecord = xml_from_str(&cleaned)
        .map_err(|e| IngestError::Xml(format!("Failed to parse MARCXML record: {e}")))?;
    convert(xml_record)
}

fn indicator(raw: &str) -> char {
    raw.chars().next().unwrap_or(' ')
}

fn convert(xml_record: XmlRecord) -> Result<RawRecord> {
    let leader = xml_record.leader.unwrap_or_default();
    let mut record = RawRecord::new(Leader::new(leader));

    for field in xml_record.fields {
        match field {
            XmlField::Controlfield(cf) => {
                if cf.tag.len() != 3 {
                    return Err(IngestError::MalformedRecord(format!(
                        "invalid control field tag '{}'",
                        cf.tag
                    )));
                }
                record.push(RawField::control(&cf.tag, cf.value));
            },
            XmlField::Datafield(df) => {
                if df.tag.len() != 3 {
                    return Err(IngestError::MalformedRecord(format!(
                        "invalid data field tag '{}'",
                        df.tag
                    )));
                }
                let mut raw = RawField::data(&df.tag, indicator(&df.ind1), indicator(&df.ind2));
                for sf in df.subfield {
                    let code = sf.code.chars().next().ok_or_else(|| {
                        IngestError::MalformedRecord(format!(
                            "missing subfield code in field {}",
                            df.tag
                        ))
                    })?;
                    raw.push_subfield(code, sf.value);
                }
                record.push(raw);
            },
        }
    }

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FieldData;

    const RECORD: &str = r#"<record>
        <leader>00000nam a2200000 i 4500</leader>
        <controlfield tag="001">2654497</controlfield>
        <controlfield tag="003">SzGeCERN</controlfield>
        <datafield tag="020" ind1=" " ind2=" ">
            <subfield code="a">9781630814434</subfield>
            <subfield code="u">electronic version</subfield>
        </datafield>
        <datafield tag="690" ind1="C" ind2=" ">
            <subfield code="a">BOOK</subfield>
        </datafield>
        <datafield tag="693" ind1=" " ind2=" ">
            <subfield code="a">LHC</subfield>
            <subfield code="a">SPS</subfield>
            <subfield code="e"/>
        </datafield>
    </record>"#;

    #[test]
    fn test_parse_single_record() {
        let record = parse_record(RECORD).unwrap();
        assert_eq!(record.leader.as_str(), "00000nam a2200000 i 4500");
        assert_eq!(record.recid(), Some("2654497"));
        assert_eq!(record.agency_code(), Some("SzGeCERN"));
        let keys: Vec<String> = record.fields().iter().map(RawField::key).collect();
        assert_eq!(keys, vec!["001", "003", "020__", "690C_", "693__"]);
    }

    #[test]
    fn test_repeated_and_empty_subfields() {
        let record = parse_record(RECORD).unwrap();
        let field = &record.fields()[4];
        let subfields = field.subfields().unwrap();
        assert_eq!(subfields.all('a'), vec!["LHC", "SPS"]);
        assert_eq!(subfields.first('e'), Some(""));
    }

    #[test]
    fn test_parse_collection_with_default_namespace() {
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
            <collection xmlns="http://www.loc.gov/MARC21/slim">{RECORD}{RECORD}</collection>"#
        );
        let records = read_records(&xml).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_parse_collection_with_prefix_namespace() {
        let xml = r#"<marc:collection xmlns:marc="http://www.loc.gov/MARC21/slim">
            <marc:record>
                <marc:leader>00000nam a2200000 i 4500</marc:leader>
                <marc:controlfield tag="001">1</marc:controlfield>
                <marc:datafield tag="245" ind1="1" ind2="0">
                    <marc:subfield code="a">Title</marc:subfield>
                </marc:datafield>
            </marc:record>
        </marc:collection>"#;
        let records = read_records(xml).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].fields()[1].key(), "24510");
    }

    #[test]
    fn test_control_field_value() {
        let record = parse_record(RECORD).unwrap();
        assert_eq!(
            record.fields()[0].data,
            FieldData::Control("2654497".to_string())
        );
    }

    #[test]
    fn test_malformed_record_fails_alone() {
        let xml = format!(
            r#"<collection>{RECORD}<record><datafield tag="24" ind1=" " ind2=" "></datafield></record>{RECORD}</collection>"#
        );
        let results = read_records_lenient(&xml);
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }

    #[test]
    fn test_record_without_leader() {
        let xml = r#"<record><controlfield tag="001">9</controlfield></record>"#;
        let record = parse_record(xml).unwrap();
        assert!(record.leader.is_empty());
        assert_eq!(record.recid(), Some("9"));
    }
}
