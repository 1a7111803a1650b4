//! EBL (ProQuest Ebook Central) records, agency `MiAaPQ`.
//!
//! Titles, names and series come with trailing ISBD punctuation that is
//! stripped here.

use crate::document::{
    AlternativeIdentifier, Document, Identifier, IdentifierScheme, Imprint, Keyword, Material,
    SerialRef, Subject, SubjectScheme,
};
use crate::fragment::{Fragment, MigrationFragment, Property};
use crate::parsers::{collapse_whitespace, strip_trailing_punctuation};
use crate::record::RawField;
use crate::registry::{Rule, RuleOutcome, RuleSet};
use crate::rules::{
    agency_code, control, data, ebook_url, emit, ensure_single_year, first_number, languages,
    optional, page_count, person, plain_abstract, provider_title, required, RuleResult,
};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RE_SERIES_ABBREVIATION: Regex = Regex::new(r"\b[Ss]er\.$").unwrap();
    static ref RE_EDITION: Regex = Regex::new(r"ed\.|edition").unwrap();
}

/// Keys EBL records carry without translation.
pub const EBL_IGNORE_FIELDS: &[&str] = &[
    "005", "006", "007", "008", "020__q", "035__a", "040__a", "040__e", "040__c", "040__d",
    "264_4c", "336__a", "336__b", "337__a", "337__b", "337__2", "338__a", "338__b", "338__2",
    "500__a", "5058_a", "588__a", "590__a", "655_4a", "77608i", "77608a", "77608t", "77608d",
    "77608z", "7972_a", "830_0a", "336__2", "24514a", "85640z",
];

/// `001`: provider identifier, also kept without its `EBC` prefix.
fn recid(_: &Document, field: &RawField) -> RuleResult {
    let value = control(field)?;
    emit(vec![
        Fragment::new(Property::ProviderRecid(value.to_string())),
        Fragment::append(Property::AlternativeIdentifiers(vec![AlternativeIdentifier {
            value: value.replace("EBC", ""),
            scheme: "EBL".to_string(),
        }])),
    ])
}

fn title(doc: &Document, field: &RawField) -> RuleResult {
    provider_title(doc, field, |v| collapse_whitespace(&strip_trailing_punctuation(v)))
}

/// `100`, `700`: persons.
fn authors(_: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let name = required('a', s)?.trim_end_matches('.').to_string();
    Ok(RuleOutcome::emit(Property::Authors(vec![person(s, name)?])))
}

fn eitem_url(_: &Document, field: &RawField) -> RuleResult {
    ebook_url(field, "e-book")
}

/// `020__`: ISBN of the ebook in `$a`, of the print version in `$z`.
fn isbns(_: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let mut found = Vec::new();
    for (code, material) in [('a', Material::Digital), ('z', Material::PrintVersion)] {
        if let Some(value) = optional(code, s)? {
            let mut identifier = Identifier::new(value, IdentifierScheme::Isbn);
            identifier.material = Some(material);
            found.push(identifier);
        }
    }
    Ok(RuleOutcome::many(vec![Fragment::new(Property::Identifiers(found))]))
}

/// `035__`: EBL number behind the `(Au-PeEL)` prefix.
fn ebl_number(_: &Document, field: &RawField) -> RuleResult {
    let Some(value) = optional('a', data(field)?)?.filter(|v| v.contains("(Au-PeEL)")) else {
        return Ok(RuleOutcome::Skip);
    };
    Ok(RuleOutcome::emit(Property::AlternativeIdentifiers(vec![AlternativeIdentifier {
        value: value.replace("(Au-PeEL)", "").replace("EBL", ""),
        scheme: "EBL".to_string(),
    }])))
}

/// `040__$b`: language of the record.
fn record_languages(_: &Document, field: &RawField) -> RuleResult {
    let values = languages(data(field)?, 'b')?;
    Ok(RuleOutcome::many(vec![Fragment::new(Property::Languages(values))]))
}

fn subject(field: &RawField, scheme: SubjectScheme) -> RuleResult {
    match optional('a', data(field)?)? {
        Some(value) => Ok(RuleOutcome::emit(Property::Subjects(vec![Subject { value, scheme }]))),
        None => Ok(RuleOutcome::Skip),
    }
}

fn loc_subjects(_: &Document, field: &RawField) -> RuleResult {
    subject(field, SubjectScheme::Loc)
}

fn dewey_subjects(_: &Document, field: &RawField) -> RuleResult {
    subject(field, SubjectScheme::Dewey)
}

fn edition(_: &Document, field: &RawField) -> RuleResult {
    let Some(value) = optional('a', data(field)?)? else {
        return Ok(RuleOutcome::Skip);
    };
    let value = RE_EDITION.replace_all(&value, "").trim().to_string();
    if value.is_empty() {
        return Ok(RuleOutcome::Skip);
    }
    Ok(RuleOutcome::emit(Property::Edition(value)))
}

/// `264_1`: imprint and publication year.
fn imprint(doc: &Document, field: &RawField) -> RuleResult {
    ensure_single_year(doc)?;
    let s = data(field)?;
    let mut out = Vec::new();
    if let Some(year) = optional('c', s)? {
        out.push(Fragment::new(Property::PublicationYear(
            year.trim_end_matches('.').to_string(),
        )));
    }
    out.push(Fragment::new(Property::Imprint(Imprint {
        place: optional('a', s)?.map(|a| a.trim_end_matches(':').trim().to_string()),
        publisher: optional('b', s)?.map(|b| b.trim_end_matches(',').trim().to_string()),
        date: None,
        reprint: None,
    })));
    emit(out)
}

/// `490`: series; a trailing `ser.` is spelt out.
fn serial(_: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let title = required('a', s)?;
    let title = title.trim_end_matches([',', ';']).trim();
    let title = collapse_whitespace(&RE_SERIES_ABBREVIATION.replace(title, "series"));
    Ok(RuleOutcome::emit(Property::Migration(MigrationFragment::Serial(SerialRef {
        title,
        volume: optional('v', s)?.and_then(|v| first_number(&v)),
        issn: optional('x', s)?.map(|x| x.trim_end_matches(';').to_string()),
    }))))
}

/// `5050_`: table of content.
fn table_of_content(_: &Document, field: &RawField) -> RuleResult {
    let Some(value) = optional('a', data(field)?)? else {
        return Ok(RuleOutcome::Skip);
    };
    let chapters = value
        .split("--")
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();
    Ok(RuleOutcome::emit(Property::TableOfContent(chapters)))
}

/// `650_0`: keywords.
fn keywords(_: &Document, field: &RawField) -> RuleResult {
    let value = required('a', data(field)?)?;
    Ok(RuleOutcome::emit(Property::Keywords(vec![Keyword {
        value: value.trim_end_matches(':').trim().to_string(),
        source: Some("EBL".to_string()),
    }])))
}

/// Rules of EBL records.
#[must_use]
pub fn rules() -> RuleSet {
    RuleSet::new("ebl")
        .rule(Rule::assign("001", "alternative_identifiers", recid))
        .rule(Rule::assign("003", "agency_code", agency_code))
        .rule(Rule::append("020__", "identifiers", isbns))
        .rule(Rule::append("035__", "alternative_identifiers", ebl_number))
        .rule(Rule::append("040__", "languages", record_languages))
        .rule(Rule::append("050_4", "subjects", loc_subjects))
        .rule(Rule::append("0820_", "subjects", dewey_subjects))
        .rule(Rule::append("^100..", "authors", authors))
        .rule(Rule::assign("^245..", "title", title))
        .rule(Rule::assign("250__", "edition", edition))
        .rule(Rule::assign("264_1", "imprint", imprint))
        .rule(Rule::assign("300__", "number_of_pages", page_count))
        .rule(Rule::append("^490..", "_migration", serial))
        .rule(Rule::append("5050_", "table_of_content", table_of_content))
        .rule(Rule::assign("520__", "abstract", plain_abstract))
        .rule(Rule::append("650_0", "keywords", keywords))
        .rule(Rule::append("^700..", "authors", authors))
        .rule(Rule::append("85640", "_eitem", eitem_url))
}
