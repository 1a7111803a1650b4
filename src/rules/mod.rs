//! Rule sets of every provider.
//!
//! Each provider module exposes functions returning [`RuleSet`]s and the
//! ignore lists its models use. The helpers below are shared by all of them:
//! they turn a field instance into subfields or a control value, read
//! required and optional subfields, and build the fragments that several
//! providers emit the same way (record identifiers, people, languages).
//!
//! [`RuleSet`]: crate::registry::RuleSet

pub mod cds;
pub mod ebl;
pub mod safari;
pub mod springer;

use crate::document::{
    AlternativeTitle, Author, AuthorIdentifier, AuthorType, ConferenceIdentifier, ConferenceInfo,
    Document, Role, TitleType, Url,
};
use crate::error::RuleError;
use crate::fragment::{Fragment, Property};
use crate::parsers::{clean_val, language_alpha3};
use crate::record::{RawField, Subfields};
use crate::registry::RuleOutcome;
use crate::vocabulary::{mapping, ROLES};
use lazy_static::lazy_static;
use regex::Regex;

/// Return type of every rule function.
pub type RuleResult = std::result::Result<RuleOutcome, RuleError>;

lazy_static! {
    static ref RE_FIRST_NUMBER: Regex = Regex::new(r"[0-9]+").unwrap();
}

/// Subfields of a data field.
pub(crate) fn data(field: &RawField) -> Result<&Subfields, RuleError> {
    field.subfields().ok_or_else(|| {
        RuleError::unexpected_field().with_message(format!("{} is not a data field", field.tag))
    })
}

/// Trimmed value of a control field.
pub(crate) fn control(field: &RawField) -> Result<&str, RuleError> {
    field
        .control_value()
        .map(str::trim)
        .ok_or_else(|| {
            RuleError::unexpected_field()
                .with_message(format!("{} is not a control field", field.tag))
        })
}

/// Cleaned value of a subfield that must be present.
pub(crate) fn required(code: char, subfields: &Subfields) -> Result<String, RuleError> {
    clean_val(code, subfields)
        .required()
        .string()?
        .ok_or_else(|| RuleError::missing(&code.to_string()))
}

/// Cleaned value of an optional, non-repeatable subfield.
pub(crate) fn optional(code: char, subfields: &Subfields) -> Result<Option<String>, RuleError> {
    clean_val(code, subfields).string()
}

/// Wrap fragments into an outcome.
pub(crate) fn emit(fragments: Vec<Fragment>) -> RuleResult {
    Ok(RuleOutcome::many(fragments))
}

/// First run of digits in a value.
pub(crate) fn first_number(value: &str) -> Option<String> {
    RE_FIRST_NUMBER.find(value).map(|m| m.as_str().to_string())
}

/// `001`: numeric legacy identifier, kept as the provider identifier too.
pub(crate) fn legacy_recid(_: &Document, field: &RawField) -> RuleResult {
    let value = control(field)?;
    let recid = value.parse::<u64>().map_err(|_| {
        RuleError::unexpected_field().with_message(format!("record id '{value}' is not numeric"))
    })?;
    emit(vec![
        Fragment::new(Property::LegacyRecid(recid)),
        Fragment::new(Property::ProviderRecid(value.to_string())),
    ])
}

/// `003`: agency code.
pub(crate) fn agency_code(_: &Document, field: &RawField) -> RuleResult {
    let value = control(field)?;
    if value.is_empty() {
        return Ok(RuleOutcome::Skip);
    }
    Ok(RuleOutcome::emit(Property::AgencyCode(value.to_string())))
}

/// Role names of subfield `$e`, `AUTHOR` when absent.
pub(crate) fn roles(subfields: &Subfields) -> Result<Vec<Role>, RuleError> {
    let mut roles = Vec::new();
    for token in clean_val('e', subfields).strings()? {
        let role = mapping(&ROLES, &token, true)
            .map_err(|e| e.on('e'))?
            .unwrap_or(Role::Author);
        if !roles.contains(&role) {
            roles.push(role);
        }
    }
    if roles.is_empty() {
        roles.push(Role::Author);
    }
    Ok(roles)
}

/// Person named in `$a` with roles from `$e`.
pub(crate) fn person(subfields: &Subfields, name: String) -> Result<Author, RuleError> {
    let mut author = Author::new(name, AuthorType::Person);
    author.roles = roles(subfields)?;
    Ok(author)
}

/// Person with an ORCID in `$0`, as the ebook providers catalogue them.
pub(crate) fn orcid_person(subfields: &Subfields, name: String) -> Result<Author, RuleError> {
    let mut author = person(subfields, name)?;
    for value in clean_val('0', subfields).strings()? {
        let id = value.trim_start_matches("(orcid)").trim().to_string();
        if !id.is_empty() {
            author.identifiers.push(AuthorIdentifier {
                scheme: "ORCID".to_string(),
                value: id,
            });
        }
    }
    Ok(author)
}

/// ISO 639-3 codes of every `code` value.
pub(crate) fn languages(subfields: &Subfields, code: char) -> Result<Vec<String>, RuleError> {
    clean_val(code, subfields)
        .strings()?
        .iter()
        .map(|token| {
            language_alpha3(token).ok_or_else(|| {
                RuleError::unexpected(&code.to_string())
                    .with_message(format!("unknown language '{token}'"))
            })
        })
        .collect()
}

/// Replace the conference list, updating its first entry in place.
pub(crate) fn with_conference(doc: &Document, update: impl FnOnce(&mut ConferenceInfo)) -> Fragment {
    let mut conferences = doc.conference_info.clone();
    if conferences.is_empty() {
        conferences.push(ConferenceInfo::default());
    }
    update(&mut conferences[0]);
    Fragment::assign(Property::ConferenceInfo(conferences))
}

/// Add an identifier to the first conference, skipping duplicates.
pub(crate) fn conference_identifier(doc: &Document, scheme: &str, value: String) -> Fragment {
    with_conference(doc, |conference| {
        let id = ConferenceIdentifier {
            scheme: scheme.to_string(),
            value,
        };
        if !conference.identifiers.contains(&id) {
            conference.identifiers.push(id);
        }
    })
}

/// Title and subtitle of an ebook provider, each passed through `clean`.
pub(crate) fn provider_title(
    doc: &Document,
    field: &RawField,
    clean: fn(&str) -> String,
) -> RuleResult {
    let s = data(field)?;
    if doc.title.is_some() {
        return Err(RuleError::unexpected_field().with_message("Ambiguous title"));
    }
    let mut out = Vec::new();
    if let Some(subtitle) = optional('b', s)? {
        out.push(Fragment::append(Property::AlternativeTitles(vec![AlternativeTitle {
            value: clean(&subtitle),
            kind: TitleType::Subtitle,
            language: None,
        }])));
    }
    out.push(Fragment::new(Property::Title(clean(&required('a', s)?))));
    emit(out)
}

/// `85640`: access link of a provider ebook.
pub(crate) fn ebook_url(field: &RawField, description: &str) -> RuleResult {
    Ok(RuleOutcome::emit(Property::EItemUrls(vec![Url {
        value: required('u', data(field)?)?,
        description: Some(description.to_string()),
    }])))
}

/// `300`: first number of the extent.
pub(crate) fn page_count(_: &Document, field: &RawField) -> RuleResult {
    let Some(extent) = optional('a', data(field)?)? else {
        return Ok(RuleOutcome::Skip);
    };
    let pages = first_number(&extent).ok_or_else(|| {
        RuleError::unexpected("a").with_message(format!("no page count in '{extent}'"))
    })?;
    Ok(RuleOutcome::emit(Property::NumberOfPages(pages)))
}

/// Publication year may only be set once per record.
pub(crate) fn ensure_single_year(doc: &Document) -> Result<(), RuleError> {
    if doc.publication_year.is_some() {
        return Err(RuleError::unexpected("c").with_message("doubled publication year"));
    }
    Ok(())
}

/// `520`: abstract.
pub(crate) fn plain_abstract(_: &Document, field: &RawField) -> RuleResult {
    match optional('a', data(field)?)? {
        Some(value) => Ok(RuleOutcome::emit(Property::Abstract(value))),
        None => Ok(RuleOutcome::Skip),
    }
}
