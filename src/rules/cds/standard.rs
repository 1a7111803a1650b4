//! Standards (`690C_:STANDARD`, `980__:STANDARD`).

use crate::document::{Document, PublicationInfo, Subject, SubjectScheme, Url};
use crate::fragment::{Fragment, Property};
use crate::record::RawField;
use crate::registry::{Rule, RuleOutcome, RuleSet};
use crate::rules::cds::base::translated_titles;
use crate::rules::{data, emit, optional, required, RuleResult};

/// `246`: French title of the standard.
fn french_titles(_: &Document, field: &RawField) -> RuleResult {
    translated_titles(data(field)?, "FRA")
}

/// `084`: ICS class from `$c`.
fn ics_class(doc: &Document, field: &RawField) -> RuleResult {
    let subject = Subject {
        value: required('c', data(field)?)?,
        scheme: SubjectScheme::Ics,
    };
    if doc.subjects.contains(&subject) {
        return Ok(RuleOutcome::Skip);
    }
    Ok(RuleOutcome::emit(Property::Subjects(vec![subject])))
}

/// `962`: pages in the host and link to the legacy record it is a chapter of.
fn publication_additional(doc: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let mut out = Vec::new();
    if let Some(pages) = optional('k', s)? {
        let mut infos = doc.publication_info.clone();
        match infos.first_mut() {
            Some(first) => first.pages = Some(pages),
            None => infos.push(PublicationInfo {
                pages: Some(pages),
                ..PublicationInfo::default()
            }),
        }
        out.push(Fragment::assign(Property::PublicationInfo(infos)));
    }
    if let Some(recid) = optional('b', s)? {
        out.push(Fragment::append(Property::Urls(vec![Url {
            value: format!("/legacy/{recid}"),
            description: Some("is chapter of".to_string()),
        }])));
    }
    emit(out)
}

/// Rules specific to standards.
#[must_use]
pub fn rules() -> RuleSet {
    RuleSet::new("cds.standard")
        .rule(Rule::append("^084..", "subjects", ics_class).overriding())
        .rule(Rule::append("^246..", "alternative_titles", french_titles).overriding())
        .rule(Rule::assign("^962..", "publication_info", publication_additional).overriding())
}
