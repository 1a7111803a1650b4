//! Raw MARC record structures.
//!
//! This module provides the types the reader produces and the translation
//! engine consumes:
//! - [`RawRecord`]: leader plus the ordered list of fields
//! - [`RawField`]: one control or data field instance
//! - [`Subfields`]: ordered subfield map of a data field
//! - [`SubfieldValue`]: a single value or the list of values of a repeated code
//!
//! Field order and subfield order are preserved exactly as read.
//!
//! # Examples
//!
//! ```
//! use mrrc_ingest::{RawField, RawRecord};
//!
//! let record = RawRecord::builder()
//!     .control("001", "2654497")
//!     .field(
//!         RawField::data("020", ' ', ' ')
//!             .subfield('a', "9781630814434")
//!             .subfield('u', "electronic version"),
//!     )
//!     .build();
//!
//! assert_eq!(record.recid(), Some("2654497"));
//! assert_eq!(record.fields()[1].key(), "020__");
//! ```

use crate::leader::Leader;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Value of one subfield code within a field.
///
/// Repeated codes collapse into [`SubfieldValue::Many`] in reading order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubfieldValue {
    /// Code appeared once.
    One(String),
    /// Code appeared more than once.
    Many(SmallVec<[String; 2]>),
}

impl SubfieldValue {
    /// First value for the code.
    #[must_use]
    pub fn first(&self) -> &str {
        match self {
            SubfieldValue::One(v) => v,
            SubfieldValue::Many(vs) => vs.first().map_or("", String::as_str),
        }
    }

    /// All values in reading order.
    #[must_use]
    pub fn values(&self) -> Vec<&str> {
        match self {
            SubfieldValue::One(v) => vec![v.as_str()],
            SubfieldValue::Many(vs) => vs.iter().map(String::as_str).collect(),
        }
    }

    /// True when the code was repeated.
    #[must_use]
    pub fn is_repeated(&self) -> bool {
        matches!(self, SubfieldValue::Many(_))
    }

    fn push(&mut self, value: String) {
        match self {
            SubfieldValue::One(first) => {
                let mut vs = SmallVec::new();
                vs.push(std::mem::take(first));
                vs.push(value);
                *self = SubfieldValue::Many(vs);
            },
            SubfieldValue::Many(vs) => vs.push(value),
        }
    }
}

/// Ordered mapping from subfield code to value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Subfields(IndexMap<char, SubfieldValue>);

impl Subfields {
    /// Create an empty subfield map.
    #[must_use]
    pub fn new() -> Self {
        Subfields(IndexMap::new())
    }

    /// Append a value, turning the code into a list when it repeats.
    pub fn push(&mut self, code: char, value: impl Into<String>) {
        let value = value.into();
        match self.0.get_mut(&code) {
            Some(existing) => existing.push(value),
            None => {
                self.0.insert(code, SubfieldValue::One(value));
            },
        }
    }

    /// Value stored under `code`.
    #[must_use]
    pub fn get(&self, code: char) -> Option<&SubfieldValue> {
        self.0.get(&code)
    }

    /// Whether `code` is present.
    #[must_use]
    pub fn contains(&self, code: char) -> bool {
        self.0.contains_key(&code)
    }

    /// First value of `code`.
    #[must_use]
    pub fn first(&self, code: char) -> Option<&str> {
        self.0.get(&code).map(SubfieldValue::first)
    }

    /// Every value of `code`, empty if absent.
    #[must_use]
    pub fn all(&self, code: char) -> Vec<&str> {
        self.0.get(&code).map(SubfieldValue::values).unwrap_or_default()
    }

    /// Codes in reading order.
    pub fn codes(&self) -> impl Iterator<Item = char> + '_ {
        self.0.keys().copied()
    }

    /// `(code, value)` pairs in reading order.
    pub fn iter(&self) -> impl Iterator<Item = (char, &SubfieldValue)> {
        self.0.iter().map(|(c, v)| (*c, v))
    }

    /// Number of distinct codes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no subfield was read.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Content of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldData {
    /// Control field (`001`-`009`) string value.
    Control(String),
    /// Data field subfields.
    Data(Subfields),
}

/// One field instance of a raw record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawField {
    /// Three character tag.
    pub tag: String,
    /// First indicator, space when blank.
    pub ind1: char,
    /// Second indicator, space when blank.
    pub ind2: char,
    /// Field content.
    pub data: FieldData,
}

/// Normalise a blank indicator to the `_` used in field keys.
#[must_use]
pub fn key_indicator(ind: char) -> char {
    if ind == ' ' || ind == '#' {
        '_'
    } else {
        ind
    }
}

/// Whether a tag is a control field tag (`000`-`009`).
#[must_use]
pub fn is_control_tag(tag: &str) -> bool {
    tag.len() == 3 && tag.starts_with("00")
}

impl RawField {
    /// Create a control field.
    #[must_use]
    pub fn control(tag: &str, value: impl Into<String>) -> Self {
        RawField {
            tag: tag.to_string(),
            ind1: ' ',
            ind2: ' ',
            data: FieldData::Control(value.into()),
        }
    }

    /// Create an empty data field.
    #[must_use]
    pub fn data(tag: &str, ind1: char, ind2: char) -> Self {
        RawField {
            tag: tag.to_string(),
            ind1,
            ind2,
            data: FieldData::Data(Subfields::new()),
        }
    }

    /// Builder helper: append a subfield to a data field.
    ///
    /// Ignored for control fields.
    #[must_use]
    pub fn subfield(mut self, code: char, value: impl Into<String>) -> Self {
        self.push_subfield(code, value);
        self
    }

    /// Append a subfield to a data field.
    pub fn push_subfield(&mut self, code: char, value: impl Into<String>) {
        if let FieldData::Data(subfields) = &mut self.data {
            subfields.push(code, value);
        }
    }

    /// Dispatch key: the tag for control fields, `tag+ind1+ind2` otherwise,
    /// with blank indicators written as `_`.
    #[must_use]
    pub fn key(&self) -> String {
        match self.data {
            FieldData::Control(_) => self.tag.clone(),
            FieldData::Data(_) => {
                let mut key = String::with_capacity(5);
                key.push_str(&self.tag);
                key.push(key_indicator(self.ind1));
                key.push(key_indicator(self.ind2));
                key
            },
        }
    }

    /// Control field value.
    #[must_use]
    pub fn control_value(&self) -> Option<&str> {
        match &self.data {
            FieldData::Control(v) => Some(v),
            FieldData::Data(_) => None,
        }
    }

    /// Data field subfields.
    #[must_use]
    pub fn subfields(&self) -> Option<&Subfields> {
        match &self.data {
            FieldData::Data(s) => Some(s),
            FieldData::Control(_) => None,
        }
    }

    /// Strings a field contributes to lossy-conversion reports: the key for
    /// control fields, `key+code` for each subfield of a data field.
    #[must_use]
    pub fn coverage_keys(&self) -> Vec<String> {
        let key = self.key();
        match &self.data {
            FieldData::Control(_) => vec![key],
            FieldData::Data(s) if s.is_empty() => vec![key],
            FieldData::Data(s) => s.codes().map(|c| format!("{key}{c}")).collect(),
        }
    }

    /// Every string value in the field, in reading order.
    #[must_use]
    pub fn all_values(&self) -> Vec<&str> {
        match &self.data {
            FieldData::Control(v) => vec![v.as_str()],
            FieldData::Data(s) => s.iter().flat_map(|(_, v)| v.values()).collect(),
        }
    }
}

/// A raw record as read from the interchange format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Record leader.
    pub leader: Leader,
    /// Fields in reading order, control fields included.
    pub fields: Vec<RawField>,
}

impl RawRecord {
    /// Create an empty record with the given leader.
    #[must_use]
    pub fn new(leader: Leader) -> Self {
        RawRecord {
            leader,
            fields: Vec::new(),
        }
    }

    /// Start building a record.
    #[must_use]
    pub fn builder() -> RawRecordBuilder {
        RawRecordBuilder {
            record: RawRecord::default(),
        }
    }

    /// Append a field.
    pub fn push(&mut self, field: RawField) {
        self.fields.push(field);
    }

    /// All fields in reading order.
    #[must_use]
    pub fn fields(&self) -> &[RawField] {
        &self.fields
    }

    /// Fields with the given tag, ignoring indicators.
    pub fn fields_by_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a RawField> + 'a {
        self.fields.iter().filter(move |f| f.tag == tag)
    }

    /// Value of the first control field with the given tag.
    #[must_use]
    pub fn control_value(&self, tag: &str) -> Option<&str> {
        self.fields
            .iter()
            .filter(|f| f.tag == tag)
            .find_map(RawField::control_value)
    }

    /// Distinct field keys in first-appearance order.
    #[must_use]
    pub fn key_set(&self) -> IndexSet<String> {
        self.fields.iter().map(RawField::key).collect()
    }

    /// Provider-local record identifier (`001`).
    #[must_use]
    pub fn recid(&self) -> Option<&str> {
        self.control_value("001").map(str::trim)
    }

    /// Agency code (`003`).
    #[must_use]
    pub fn agency_code(&self) -> Option<&str> {
        self.control_value("003").map(str::trim)
    }

    /// Whether the leader marks the record as deleted.
    #[must_use]
    pub fn is_deletable(&self) -> bool {
        self.leader.is_deletable()
    }

    /// JSON rendering used as the raw snippet of failure diagnostics.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Builder for [`RawRecord`].
#[derive(Debug)]
pub struct RawRecordBuilder {
    record: RawRecord,
}

impl RawRecordBuilder {
    /// Set the leader.
    #[must_use]
    pub fn leader(mut self, leader: &str) -> Self {
        self.record.leader = Leader::new(leader);
        self
    }

    /// Append a control field.
    #[must_use]
    pub fn control(mut self, tag: &str, value: &str) -> Self {
        self.record.push(RawField::control(tag, value));
        self
    }

    /// Append a field.
    #[must_use]
    pub fn field(mut self, field: RawField) -> Self {
        self.record.push(field);
        self
    }

    /// Finish the record.
    #[must_use]
    pub fn build(self) -> RawRecord {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_subfield_becomes_list() {
        let field = RawField::data("693", ' ', ' ')
            .subfield('a', "LHC")
            .subfield('e', "ATLAS")
            .subfield('a', "SPS");
        let subfields = field.subfields().unwrap();
        assert!(subfields.get('a').unwrap().is_repeated());
        assert_eq!(subfields.all('a'), vec!["LHC", "SPS"]);
        assert_eq!(subfields.first('e'), Some("ATLAS"));
        assert_eq!(subfields.codes().collect::<Vec<_>>(), vec!['a', 'e']);
    }

    #[test]
    fn test_key_normalises_blank_indicators() {
        assert_eq!(RawField::data("690", 'C', ' ').key(), "690C_");
        assert_eq!(RawField::data("856", '4', ' ').key(), "8564_");
        assert_eq!(RawField::data("024", '7', ' ').key(), "0247_");
        assert_eq!(RawField::control("001", "1").key(), "001");
    }

    #[test]
    fn test_coverage_keys() {
        let field = RawField::data("020", ' ', ' ')
            .subfield('a', "x")
            .subfield('q', "y");
        assert_eq!(field.coverage_keys(), vec!["020__a", "020__q"]);
        assert_eq!(RawField::control("005", "2020").coverage_keys(), vec!["005"]);
    }

    #[test]
    fn test_control_value_by_tag() {
        let record = RawRecord::builder()
            .field(RawField::data("001", ' ', ' ').subfield('a', "not a control field"))
            .control("001", " 2654497 ")
            .control("003", "SzGeCERN")
            .build();
        let tag = String::from("001");
        assert_eq!(record.control_value(&tag), Some(" 2654497 "));
        assert_eq!(record.recid(), Some("2654497"));
        assert_eq!(record.agency_code(), Some("SzGeCERN"));
        assert_eq!(record.control_value("005"), None);
    }

    #[test]
    fn test_record_accessors_preserve_order() {
        let record = RawRecord::builder()
            .leader("00000dam a2200000 i 4500")
            .control("001", " 123 ")
            .control("003", "SzGeCERN")
            .field(RawField::data("700", ' ', ' ').subfield('a', "B"))
            .field(RawField::data("100", ' ', ' ').subfield('a', "A"))
            .field(RawField::data("700", ' ', ' ').subfield('a', "C"))
            .build();
        assert_eq!(record.recid(), Some("123"));
        assert_eq!(record.agency_code(), Some("SzGeCERN"));
        assert!(record.is_deletable());
        let keys: Vec<String> = record.key_set().into_iter().collect();
        assert_eq!(keys, vec!["001", "003", "700__", "100__"]);
        let names: Vec<&str> = record
            .fields_by_tag("700")
            .filter_map(|f| f.subfields().and_then(|s| s.first('a')))
            .collect();
        assert_eq!(names, vec!["B", "C"]);
    }

    #[test]
    fn test_raw_json_snippet() {
        let record = RawRecord::builder()
            .control("001", "1")
            .field(RawField::data("245", ' ', ' ').subfield('a', "T"))
            .build();
        let json = record.to_json();
        assert_eq!(json["fields"][1]["data"]["a"], "T");
    }
}
