//! O'Reilly Safari records (agency `CaSebORM`).
//!
//! Safari delivers books, audiobooks and videos; the medium is read from the
//! leader when the record is imported.

use crate::document::{
    AlternativeIdentifier, Copyright, Document, Identifier, IdentifierScheme, Imprint,
};
use crate::fragment::{Fragment, Property};
use crate::parsers::clean_val;
use crate::record::RawField;
use crate::registry::{Rule, RuleOutcome, RuleSet};
use crate::rules::{
    agency_code, control, data, ebook_url, emit, ensure_single_year, languages, optional,
    page_count, person, plain_abstract, provider_title, required, RuleResult,
};

/// Keys Safari records carry without translation.
pub const SAFARI_IGNORE_FIELDS: &[&str] = &[
    "005", "006", "007", "008", "010__a", "010__z", "015__2", "015__a", "016__2", "016__a",
    "019__a", "0247_2", "0247_a", "024__2", "024__a", "024__q", "028__a", "028__b", "029__a",
    "029__b", "035__a", "035__z", "037__a", "037__b", "037__f", "037__n", "040__a", "040__b",
    "040__c", "040__d", "040__e", "041__h", "042__a", "049__a", "050_4a", "050_4b", "050__b",
    "072_7a", "072_72", "072_7x", "082042", "08204a", "082__2", "084__2", "084__a", "1001_0",
    "1001_4", "1001_d", "1001_q", "24510c", "24510h", "24510n", "24510p", "246__n", "246__p",
    "2463_a", "264_4c", "300__b", "300__c", "336__2", "336__a", "336__b", "337__2", "337__a",
    "337__b", "338__2", "338__a", "338__b", "344__a", "347__a", "347__b", "4901_a", "4901_v",
    "4901_x", "490__a", "500__a", "504__a", "5050_a", "506__a", "511__a", "520__b", "538__a",
    "542__f", "542__g", "546__a", "588__a", "5880_a", "590__a", "650_0a", "650_0x", "650_6a",
    "650_7a", "650_72", "650_70", "655_4a", "655_7a", "655_72", "7001_0", "7001_4", "7001_d",
    "7001_e", "7102_a", "710__a", "776__i", "776__t", "776__z", "77608i", "77608t", "77608z",
    "830_0a", "830_0v", "85640z", "938__a", "938__b", "938__c", "938__n", "994__a", "994__b",
];

/// `001`: provider identifier.
fn recid(_: &Document, field: &RawField) -> RuleResult {
    let value = control(field)?;
    emit(vec![
        Fragment::new(Property::ProviderRecid(value.to_string())),
        Fragment::append(Property::AlternativeIdentifiers(vec![AlternativeIdentifier {
            value: value.to_string(),
            scheme: "SAFARI".to_string(),
        }])),
    ])
}

fn title(doc: &Document, field: &RawField) -> RuleResult {
    provider_title(doc, field, |v| v.trim().trim_end_matches('.').trim_end().to_string())
}

fn authors(_: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let author = person(s, required('a', s)?)?;
    Ok(RuleOutcome::emit(Property::Authors(vec![author])))
}

fn eitem_url(_: &Document, field: &RawField) -> RuleResult {
    ebook_url(field, "E-book by Safari")
}

/// `020__$z`: ISBN.
fn isbns(_: &Document, field: &RawField) -> RuleResult {
    Ok(RuleOutcome::emit(Property::Identifiers(vec![Identifier::new(
        required('z', data(field)?)?,
        IdentifierScheme::Isbn,
    )])))
}

fn record_languages(_: &Document, field: &RawField) -> RuleResult {
    let values = languages(data(field)?, 'a')?;
    Ok(RuleOutcome::many(vec![Fragment::new(Property::Languages(values))]))
}

fn edition(_: &Document, field: &RawField) -> RuleResult {
    match optional('a', data(field)?)? {
        Some(value) => Ok(RuleOutcome::emit(Property::Edition(value))),
        None => Ok(RuleOutcome::Skip),
    }
}

/// `264_1`: publisher and year.
fn imprint(doc: &Document, field: &RawField) -> RuleResult {
    ensure_single_year(doc)?;
    let s = data(field)?;
    let year = optional('c', s)?.map(|c| c.trim_end_matches('.').to_string());
    let mut out = Vec::new();
    if let Some(year) = &year {
        out.push(Fragment::new(Property::PublicationYear(year.clone())));
    }
    out.push(Fragment::new(Property::Imprint(Imprint {
        place: None,
        publisher: optional('b', s)?.map(|b| b.trim_end_matches(',').trim().to_string()),
        date: year,
        reprint: None,
    })));
    emit(out)
}

/// `542__`: copyright statement and year.
fn copyrights(_: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let copyright = Copyright {
        statement: optional('f', s)?,
        year: clean_val('g', s).int()?,
        ..Copyright::default()
    };
    if copyright == Copyright::default() {
        return Ok(RuleOutcome::Skip);
    }
    Ok(RuleOutcome::emit(Property::Copyrights(vec![copyright])))
}

/// Rules of Safari records.
#[must_use]
pub fn rules() -> RuleSet {
    RuleSet::new("safari")
        .rule(Rule::assign("001", "alternative_identifiers", recid))
        .rule(Rule::assign("003", "agency_code", agency_code))
        .rule(Rule::append("020__", "identifiers", isbns))
        .rule(Rule::append("0410_", "languages", record_languages))
        .rule(Rule::append("1001_", "authors", authors))
        .rule(Rule::assign("24510", "title", title))
        .rule(Rule::assign("250__", "edition", edition))
        .rule(Rule::assign("264_1", "imprint", imprint))
        .rule(Rule::assign("300__", "number_of_pages", page_count))
        .rule(Rule::assign("520__", "abstract", plain_abstract))
        .rule(Rule::append("542__", "copyrights", copyrights))
        .rule(Rule::append("7001_", "authors", authors))
        .rule(Rule::append("85640", "_eitem", eitem_url))
}
