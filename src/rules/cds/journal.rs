//! Journal records (`980__:PERI`).
//!
//! Journals do not inherit the document rules. Their children (issues,
//! electronic and print holdings) are only recorded in the sidecar.

use crate::document::{
    AlternativeTitle, Document, ElectronicHolding, Identifier, IdentifierScheme, InternalNote,
    PendingRelation, TitleType,
};
use crate::fragment::{Fragment, MigrationFragment, Property};
use crate::record::RawField;
use crate::registry::{Rule, RuleOutcome, RuleSet};
use crate::rules::cds::base::{record_languages, title};
use crate::rules::{agency_code, data, emit, legacy_recid, optional, required, RuleResult};
use crate::vocabulary::{Lookup, IDENTIFIER_MATERIAL};

/// Keys journals carry without translation.
pub const JOURNAL_IGNORE_FIELDS: &[&str] = &[
    "080__a", "020__C", "080__c", "030__a", "030__9", "044__a", "044__b", "222__a", "310__a",
    "938__a", "246_39", "85641m", "85641g", "85641n", "8564_8", "8564_s", "8564_x", "6531_9",
    "246_3i", "650__a", "690C_a", "938__p", "938__f", "939__a", "939__d", "939__u", "939__v",
    "6531_a", "780__i", "780__t", "785__i", "785__t", "85641y", "866__g", "866__x", "933__a",
    "962__n", "960__a", "960__c", "980__a", "980__b",
];

/// `246_3`: alternative title.
fn alternative_titles(_: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let mut titles = Vec::new();
    if s.contains('a') {
        titles.push(AlternativeTitle {
            value: required('a', s)?,
            kind: TitleType::AlternativeTitle,
            language: None,
        });
    }
    if s.contains('b') {
        titles.push(AlternativeTitle {
            value: required('b', s)?,
            kind: TitleType::Subtitle,
            language: None,
        });
    }
    Ok(RuleOutcome::many(vec![Fragment::new(Property::AlternativeTitles(titles))]))
}

fn abbreviated_title(_: &Document, field: &RawField) -> RuleResult {
    Ok(RuleOutcome::emit(Property::AbbreviatedTitle(required('a', data(field)?)?)))
}

/// `022`: ISSN.
fn issns(_: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let mut identifier = Identifier::new(required('a', s)?, IdentifierScheme::Issn);
    identifier.material = optional('b', s)?.and_then(|b| IDENTIFIER_MATERIAL.lookup(&b));
    Ok(RuleOutcome::emit(Property::Identifiers(vec![identifier])))
}

fn internal_notes(_: &Document, field: &RawField) -> RuleResult {
    Ok(RuleOutcome::emit(Property::InternalNotes(vec![InternalNote {
        value: required('a', data(field)?)?,
    }])))
}

fn note(_: &Document, field: &RawField) -> RuleResult {
    Ok(RuleOutcome::emit(Property::Note(required('a', data(field)?)?)))
}

fn publisher(_: &Document, field: &RawField) -> RuleResult {
    Ok(RuleOutcome::emit(Property::Publisher(required('b', data(field)?)?)))
}

/// `362`, `85641`, `866`: holdings of the journal.
fn holdings(_: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let fragment = match field.tag.as_str() {
        "362" => MigrationFragment::ElectronicHolding(ElectronicHolding {
            subscription: optional('a', s)?,
            ..ElectronicHolding::default()
        }),
        "856" => MigrationFragment::ElectronicHolding(ElectronicHolding {
            subscription: optional('3', s)?,
            url: optional('u', s)?,
            access_type: optional('x', s)?,
            note: optional('z', s)?,
        }),
        _ => match optional('a', s)? {
            Some(subscription) => MigrationFragment::PrintHolding(subscription),
            None => return Ok(RuleOutcome::Skip),
        },
    };
    Ok(RuleOutcome::emit(Property::Migration(fragment)))
}

/// `780`, `785`: preceding and succeeding journal.
fn sequence(_: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    emit(vec![Fragment::migration(MigrationFragment::PendingRelation(PendingRelation {
        tag: field.key(),
        recid: Some(required('w', s)?),
        relation: None,
        description: None,
    }))])
}

/// Rules of journal records.
#[must_use]
pub fn rules() -> RuleSet {
    RuleSet::new("cds.journal")
        .rule(Rule::assign("001", "legacy_recid", legacy_recid))
        .rule(Rule::assign("003", "agency_code", agency_code))
        .rule(Rule::append("^022..", "identifiers", issns))
        .rule(Rule::append("^041..", "languages", record_languages))
        .rule(Rule::assign("^210..", "abbreviated_title", abbreviated_title))
        .rule(Rule::assign("^245..", "title", title))
        .rule(Rule::append("246_3", "alternative_titles", alternative_titles))
        .rule(Rule::append("^362..", "_migration", holdings))
        .rule(Rule::append("^780..", "_migration", sequence))
        .rule(Rule::append("^785..", "_migration", sequence))
        .rule(Rule::append("85641", "_migration", holdings))
        .rule(Rule::append("^866..", "_migration", holdings))
        .rule(Rule::assign("^933..", "publisher", publisher))
        .rule(Rule::assign("^935..", "note", note))
        .rule(Rule::append("^937..", "internal_notes", internal_notes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::Merge;

    fn run(rule: fn(&Document, &RawField) -> RuleResult, field: RawField) -> Document {
        let mut doc = Document::default();
        if let RuleOutcome::Emit(fragments) = rule(&doc.clone(), &field).unwrap() {
            for fragment in fragments {
                doc.apply(fragment, Merge::Append);
            }
        }
        doc
    }

    #[test]
    fn test_issn_with_material() {
        let field = RawField::data("022", ' ', ' ')
            .subfield('a', "1234-5678")
            .subfield('b', "Online");
        let doc = run(issns, field);
        assert_eq!(doc.identifiers[0].scheme, IdentifierScheme::Issn);
        assert!(doc.identifiers[0].material.is_some());
    }

    #[test]
    fn test_holdings_go_to_sidecar() {
        let doc = run(
            holdings,
            RawField::data("856", '4', '1')
                .subfield('3', "2005-")
                .subfield('u', "https://journal.example.org")
                .subfield('x', "Subscription"),
        );
        let holding = &doc.migration.electronic_items[0];
        assert_eq!(holding.subscription.as_deref(), Some("2005-"));
        assert_eq!(holding.url.as_deref(), Some("https://journal.example.org"));

        let doc = run(holdings, RawField::data("866", ' ', ' ').subfield('a', "1990-2001"));
        assert_eq!(doc.migration.print_holdings, vec!["1990-2001"]);
    }

    #[test]
    fn test_sequence_requires_recid() {
        let field = RawField::data("780", ' ', ' ').subfield('t', "Old name");
        let err = sequence(&Document::default(), &field).unwrap_err();
        assert_eq!(err.subfield.as_deref(), Some("w"));

        let doc = run(sequence, RawField::data("785", ' ', ' ').subfield('w', "123"));
        assert_eq!(doc.pending.relations[0].tag, "785__");
    }

    #[test]
    fn test_rule_set_builds() {
        let registry = crate::registry::RuleRegistry::build(&[&rules()]).unwrap();
        assert!(registry.lookup("246_3").is_some());
        assert!(registry.lookup("24630").is_none());
        assert!(registry.lookup("020__").is_none());
    }
}
