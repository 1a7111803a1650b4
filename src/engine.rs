//! The translation engine.
//!
//! [`Overdo`] turns one [`RawRecord`] into a [`Document`]: it seeds a fresh
//! document from the model's defaults, dispatches every field in reading
//! order to the rule registered for its key, merges the fragments the rule
//! emits, and finally reports the fields that no rule consumed.

use crate::document::Document;
use crate::error::{IngestError, Result};
use crate::handlers::{Diagnostic, HandlerTable};
use crate::record::{FieldData, RawField, RawRecord};
use crate::registry::{RuleOutcome, RuleRegistry};
use indexmap::IndexSet;
use log::{debug, trace};
use std::collections::HashSet;

/// Output of one translation.
#[derive(Debug, Clone, Default)]
pub struct Translation {
    /// Translated document, before coalescing.
    pub document: Document,
    /// Errors recorded by the handler table.
    pub diagnostics: Vec<Diagnostic>,
    /// Field keys that had no rule, in reading order.
    pub missing_rules: Vec<String>,
}

/// Rule-driven translator for one model.
#[derive(Debug, Clone)]
pub struct Overdo {
    registry: RuleRegistry,
    ignore: HashSet<String>,
    defaults: fn() -> Document,
}

impl Overdo {
    /// Engine over a resolved registry.
    ///
    /// `ignore` holds tags, keys or `key+code` strings that may appear
    /// without a rule. `defaults` builds the seed document of each record.
    #[must_use]
    pub fn new(registry: RuleRegistry, ignore: &[&str], defaults: fn() -> Document) -> Self {
        Overdo {
            registry,
            ignore: ignore.iter().map(|k| k.replace(' ', "_")).collect(),
            defaults,
        }
    }

    /// Resolved rule table.
    #[must_use]
    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Fresh seed document.
    #[must_use]
    pub fn make_defaults(&self) -> Document {
        (self.defaults)()
    }

    /// Whether a field may go untranslated.
    #[must_use]
    pub fn is_ignored(&self, field: &RawField) -> bool {
        self.ignore.contains(&field.tag) || self.ignore.contains(&field.key())
    }

    fn uncovered(&self, field: &RawField) -> Vec<String> {
        if self.is_ignored(field) {
            return Vec::new();
        }
        match &field.data {
            FieldData::Control(_) => vec![field.tag.clone()],
            FieldData::Data(_) => field
                .coverage_keys()
                .into_iter()
                .filter(|k| !self.ignore.contains(k))
                .collect(),
        }
    }

    /// Translate one record.
    ///
    /// # Errors
    ///
    /// A rule error escalated by `handlers`, or `LossyConversion` when the
    /// table is strict and some field had neither a rule nor an ignore entry.
    pub fn translate(&self, record: &RawRecord, handlers: &HandlerTable) -> Result<Translation> {
        let mut document = self.make_defaults();
        let mut diagnostics = Vec::new();
        let mut missing: IndexSet<String> = IndexSet::new();
        let mut missing_rules: IndexSet<String> = IndexSet::new();

        for field in record.fields() {
            let key = field.key();
            let Some(rule) = self.registry.lookup(&key) else {
                let uncovered = self.uncovered(field);
                if !uncovered.is_empty() {
                    trace!("no rule for {key}");
                    missing_rules.insert(key);
                    missing.extend(uncovered);
                }
                continue;
            };
            debug!("{key} -> {} ({})", rule.name(), rule.pattern());
            match rule.apply(&document, field) {
                Ok(RuleOutcome::Emit(fragments)) => {
                    for fragment in fragments {
                        document.apply(fragment, rule.merge());
                    }
                },
                Ok(RuleOutcome::Skip) => {},
                Err(err) => handlers.handle(err.at(&key), &mut diagnostics)?,
            }
        }

        if !missing.is_empty() && handlers.is_strict() {
            return Err(IngestError::LossyConversion {
                missing: missing.into_iter().collect(),
            });
        }
        Ok(Translation {
            document,
            diagnostics,
            missing_rules: missing_rules.into_iter().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, RuleError};
    use crate::fragment::{Fragment, Property};
    use crate::parsers::clean_val;
    use crate::registry::{Rule, RuleSet};

    fn title(doc: &Document, field: &RawField) -> std::result::Result<RuleOutcome, RuleError> {
        if doc.title.is_some() {
            return Err(RuleError::unexpected_field().with_message("second title"));
        }
        let value = clean_val('a', field.subfields().unwrap()).required().string()?;
        Ok(RuleOutcome::many(value.map(|v| Fragment::new(Property::Title(v))).into_iter().collect()))
    }

    fn note(_: &Document, field: &RawField) -> std::result::Result<RuleOutcome, RuleError> {
        match field.subfields().and_then(|s| s.first('a')) {
            Some(v) => Ok(RuleOutcome::emit(Property::Note(v.to_string()))),
            None => Ok(RuleOutcome::Skip),
        }
    }

    fn seeded() -> Document {
        Document {
            provider: Some("cds".to_string()),
            ..Document::default()
        }
    }

    fn engine() -> Overdo {
        let set = RuleSet::new("test")
            .rule(Rule::assign("245__", "title", title))
            .rule(Rule::append("^500..", "note", note));
        Overdo::new(RuleRegistry::build(&[&set]).unwrap(), &["005", "595__z"], seeded)
    }

    fn record() -> RawRecord {
        RawRecord::builder()
            .control("005", "20200101")
            .field(RawField::data("245", ' ', ' ').subfield('a', "Title"))
            .field(RawField::data("500", ' ', ' ').subfield('a', "one"))
            .field(RawField::data("500", '1', ' ').subfield('a', "two"))
            .build()
    }

    #[test]
    fn test_dispatch_in_reading_order() {
        let out = engine().translate(&record(), &HandlerTable::strict()).unwrap();
        assert_eq!(out.document.title.as_deref(), Some("Title"));
        assert_eq!(out.document.note.as_deref(), Some("one \ntwo"));
        assert_eq!(out.document.provider.as_deref(), Some("cds"));
        assert!(out.missing_rules.is_empty());
    }

    #[test]
    fn test_lossy_conversion_in_strict_mode() {
        let mut rec = record();
        rec.push(RawField::data("999", ' ', ' ').subfield('a', "x").subfield('b', "y"));
        rec.push(RawField::data("595", ' ', ' ').subfield('z', "ignored"));
        let err = engine().translate(&rec, &HandlerTable::strict()).unwrap_err();
        match err {
            IngestError::LossyConversion { missing } => {
                assert_eq!(missing, vec!["999__a", "999__b"]);
            },
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_lenient_mode_drops_missing_rules() {
        let mut rec = record();
        rec.push(RawField::data("999", ' ', ' ').subfield('a', "x"));
        let out = engine().translate(&rec, &HandlerTable::lenient()).unwrap();
        assert_eq!(out.missing_rules, vec!["999__"]);
        assert_eq!(out.document.title.as_deref(), Some("Title"));
    }

    #[test]
    fn test_rule_error_carries_location() {
        let mut rec = record();
        rec.push(RawField::data("245", ' ', ' ').subfield('a', "Again"));
        let err = engine().translate(&rec, &HandlerTable::strict()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedValue);
        assert!(err.to_string().contains("second title in <245__>"));

        let out = engine().translate(&rec, &HandlerTable::lenient()).unwrap();
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.document.title.as_deref(), Some("Title"));
    }

    #[test]
    fn test_missing_required_always_fails() {
        let rec = RawRecord::builder()
            .field(RawField::data("245", ' ', ' ').subfield('b', "Sub"))
            .build();
        let err = engine().translate(&rec, &HandlerTable::lenient()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredField);
        assert_eq!(err.subfield(), Some("a"));
    }

    #[test]
    fn test_defaults_are_fresh_per_record() {
        let engine = engine();
        let first = engine.translate(&record(), &HandlerTable::strict()).unwrap();
        let second = engine.translate(&RawRecord::default(), &HandlerTable::strict()).unwrap();
        assert!(first.document.title.is_some());
        assert!(second.document.title.is_none());
        assert!(second.document.note.is_none());
    }
}
