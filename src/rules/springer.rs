//! Springer ebook records (agency `DE-He213`).

use crate::document::{Document, Identifier, IdentifierScheme, Imprint, Subject, SubjectScheme};
use crate::error::RuleError;
use crate::fragment::{Fragment, Property};
use crate::parsers::clean_val;
use crate::record::RawField;
use crate::registry::{Rule, RuleOutcome, RuleSet};
use crate::rules::cds::base::{edition, serial};
use crate::rules::{
    agency_code, control, data, ebook_url, emit, ensure_single_year, languages, optional,
    orcid_person, page_count, plain_abstract, provider_title, required, RuleResult,
};
use crate::vocabulary::{Lookup, DOCUMENT_TYPE, IDENTIFIER_MATERIAL};

/// Keys Springer records carry without translation.
pub const SPRINGER_IGNORE_FIELDS: &[&str] = &[
    "005", "006", "007", "008", "016", "040__a", "040__b", "040__c", "040__d", "040__e",
    "072_7a", "072_72", "072_7x", "24510c", "264_4c", "336__a", "336__b", "336__2", "337__a",
    "337__b", "337__2", "338__a", "338__b", "338__2", "347__a", "347__b", "347__2", "50500a",
    "650_0a", "650_0x", "650_14a", "650_24a", "650_24x", "7102_a", "773__t", "77608i",
    "77608t", "77608z", "77608w", "85640z", "912__a",
];

/// `001`: Springer identifier.
fn provider_recid(_: &Document, field: &RawField) -> RuleResult {
    Ok(RuleOutcome::emit(Property::ProviderRecid(control(field)?.to_string())))
}

fn title(doc: &Document, field: &RawField) -> RuleResult {
    provider_title(doc, field, |v| v.trim().to_string())
}

/// `1001_`, `7001_`: authors with their ORCID.
fn authors(_: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let author = orcid_person(s, required('a', s)?)?;
    Ok(RuleOutcome::emit(Property::Authors(vec![author])))
}

/// `980__`: document type, which must be a known one.
fn document_type(_: &Document, field: &RawField) -> RuleResult {
    let value = optional('a', data(field)?)?.unwrap_or_default();
    match DOCUMENT_TYPE.lookup(&value) {
        Some(kind) => Ok(RuleOutcome::emit(Property::DocumentType(kind))),
        None => Err(RuleError::manual("a")
            .with_message(format!("Document type {value} is not allowed."))),
    }
}

/// `264_1`: imprint; several publishers are joined.
fn imprint(doc: &Document, field: &RawField) -> RuleResult {
    ensure_single_year(doc)?;
    let s = data(field)?;
    let date = optional('c', s)?;
    let publishers = clean_val('b', s).strings()?;
    let mut out = Vec::new();
    if let Some(year) = &date {
        out.push(Fragment::new(Property::PublicationYear(year.clone())));
    }
    out.push(Fragment::new(Property::Imprint(Imprint {
        place: optional('a', s)?,
        publisher: Some(publishers.join(", ")).filter(|p| !p.is_empty()),
        date,
        reprint: None,
    })));
    emit(out)
}

fn eitem_url(_: &Document, field: &RawField) -> RuleResult {
    ebook_url(field, "E-book by Springer")
}

/// `595__`: internal note of the electronic item.
fn eitem_note(_: &Document, field: &RawField) -> RuleResult {
    match optional('a', data(field)?)? {
        Some(note) => Ok(RuleOutcome::emit(Property::EItemNote(note))),
        None => Ok(RuleOutcome::Skip),
    }
}

/// `020__`: ISBN with its material from `$u`.
fn isbns(_: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let mut identifier = Identifier::new(required('a', s)?, IdentifierScheme::Isbn);
    identifier.material = optional('u', s)?.and_then(|u| IDENTIFIER_MATERIAL.lookup(&u));
    Ok(RuleOutcome::emit(Property::Identifiers(vec![identifier])))
}

/// `024`: DOI.
fn dois(_: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let scheme = optional('2', s)?.unwrap_or_default();
    if !scheme.eq_ignore_ascii_case("doi") {
        return Err(RuleError::manual("2").with_message("wrong DOI marc"));
    }
    let mut identifier = Identifier::new(required('a', s)?, IdentifierScheme::Doi);
    identifier.material = optional('u', s)?.and_then(|u| IDENTIFIER_MATERIAL.lookup(&u));
    Ok(RuleOutcome::emit(Property::Identifiers(vec![identifier])))
}

fn subject(field: &RawField, scheme: SubjectScheme) -> RuleResult {
    Ok(RuleOutcome::emit(Property::Subjects(vec![Subject {
        value: required('a', data(field)?)?,
        scheme,
    }])))
}

fn loc_subjects(_: &Document, field: &RawField) -> RuleResult {
    subject(field, SubjectScheme::Loc)
}

fn dewey_subjects(_: &Document, field: &RawField) -> RuleResult {
    subject(field, SubjectScheme::Dewey)
}

fn record_languages(_: &Document, field: &RawField) -> RuleResult {
    let values = languages(data(field)?, 'a')?;
    Ok(RuleOutcome::many(vec![Fragment::new(Property::Languages(values))]))
}

/// Rules of Springer records.
#[must_use]
pub fn rules() -> RuleSet {
    RuleSet::new("springer")
        .rule(Rule::assign("001", "provider_recid", provider_recid))
        .rule(Rule::assign("003", "agency_code", agency_code))
        .rule(Rule::append("^020..", "identifiers", isbns))
        .rule(Rule::append("^024..", "identifiers", dois))
        .rule(Rule::append("^041..", "languages", record_languages))
        .rule(Rule::append("0504_", "subjects", loc_subjects))
        .rule(Rule::append("0824_", "subjects", dewey_subjects))
        .rule(Rule::append("1001_", "authors", authors))
        .rule(Rule::assign("24510", "title", title))
        .rule(Rule::assign("^250..", "edition", edition))
        .rule(Rule::assign("264_1", "imprint", imprint))
        .rule(Rule::assign("^300..", "number_of_pages", page_count))
        .rule(Rule::append("^490..", "_migration", serial))
        .rule(Rule::assign("^520..", "abstract", plain_abstract))
        .rule(Rule::assign("^595..", "_eitem", eitem_note))
        .rule(Rule::append("7001_", "authors", authors))
        .rule(Rule::append("85640", "_eitem", eitem_url))
        .rule(Rule::assign("980__", "document_type", document_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentType;
    use crate::error::ErrorKind;
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
    fn test_authors_with_orcid() {
        let doc = run(
            authors,
            RawField::data("700", '1', ' ')
                .subfield('a', "Klabnik, Steve")
                .subfield('e', "editor")
                .subfield('0', "(orcid)0000-0002-1825-0097"),
        );
        let author = &doc.authors[0];
        assert_eq!(author.identifiers[0].scheme, "ORCID");
        assert_eq!(author.identifiers[0].value, "0000-0002-1825-0097");
    }

    #[test]
    fn test_imprint_joins_publishers() {
        let doc = run(
            imprint,
            RawField::data("264", ' ', '1')
                .subfield('a', "Cham")
                .subfield('b', "Springer International Publishing")
                .subfield('b', "Imprint: Springer")
                .subfield('c', "2020"),
        );
        let imprint = doc.imprint.unwrap();
        assert_eq!(
            imprint.publisher.as_deref(),
            Some("Springer International Publishing, Imprint: Springer")
        );
        assert_eq!(doc.publication_year.as_deref(), Some("2020"));
    }

    #[test]
    fn test_doubled_publication_year() {
        let doc = Document {
            publication_year: Some("2019".into()),
            ..Document::default()
        };
        let field = RawField::data("264", ' ', '1').subfield('c', "2020");
        assert_eq!(imprint(&doc, &field).unwrap_err().kind, ErrorKind::UnexpectedValue);
    }

    #[test]
    fn test_document_type() {
        let doc = run(document_type, RawField::data("980", ' ', ' ').subfield('a', "BOOK"));
        assert_eq!(doc.document_type, Some(DocumentType::Book));
        let field = RawField::data("980", ' ', ' ').subfield('a', "POSTER");
        let err = document_type(&Document::default(), &field).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ManualImportRequired);
    }

    #[test]
    fn test_doi_scheme_checked() {
        let field = RawField::data("024", '7', ' ').subfield('a', "10.1007/978-3-030").subfield('2', "urn");
        assert_eq!(dois(&Document::default(), &field).unwrap_err().kind, ErrorKind::ManualImportRequired);
    }

    #[test]
    fn test_eitem_fields() {
        let doc = run(
            eitem_url,
            RawField::data("856", '4', '0').subfield('u', "https://doi.org/10.1007/978-3-030"),
        );
        let eitem = doc.eitem.unwrap();
        assert_eq!(eitem.urls[0].description.as_deref(), Some("E-book by Springer"));
    }
}
