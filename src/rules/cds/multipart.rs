//! Multipart monographs (`596__:MULTIVOLUMES`).
//!
//! A multipart record describes the whole set. Per-volume data (titles,
//! ISBNs, barcodes, links) is parked in the sidecar and correlated by volume
//! token after translation.

use crate::document::{
    AlternativeTitle, Document, Identifier, IdentifierScheme, Material, PendingUrl, TitleType,
    Volume, VolumeIdentifiers,
};
use crate::error::RuleError;
use crate::fragment::{Fragment, MigrationFragment, Property};
use crate::parsers::pages::extract_number_of_volumes;
use crate::parsers::{extract_parts, extract_volume_info, extract_volume_number};
use crate::record::RawField;
use crate::registry::{Rule, RuleOutcome, RuleSet};
use crate::rules::cds::base::{report_number_or_barcode, serial};
use crate::rules::{agency_code, data, emit, legacy_recid, optional, required, RuleResult};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RE_SET: Regex = Regex::new(r"(.*?)\(set\.*\)").unwrap();
    static ref RE_DIGITS: Regex = Regex::new(r"\d+").unwrap();
}

/// Keys multipart records carry without translation, on top of the CDS list.
pub const MULTIPART_IGNORE_FIELDS: &[&str] = &[
    "020__c", "021__a", "021__b", "022__a", "022__b", "0247_2", "0247_9", "0247_a", "0247_q",
    "0247_y", "0248_q", "035__9", "035__a", "035__d", "035__h", "035__m", "035__t", "035__u",
    "035_a9", "035_aa", "037__9", "037__a", "037__c", "041__a", "044__a", "050_4a", "050__a",
    "080__a", "082042", "08204a", "082__a", "084__2", "084__a", "084__c", "088__9", "088__a",
    "100__a", "100__e", "100__u", "100__9", "110__a", "111__9", "111__a", "111__c", "111__g",
    "111__n", "111__w", "111__y", "111__z", "210__a", "222__a", "242__a", "246__i", "250__a",
    "260__a", "260__b", "260__c", "270__a", "270__d", "270__k", "270__l", "270__m", "300__b",
    "310__a", "4901_a", "490__a", "490__b", "490__c", "490__v", "500__9", "500__a", "5050_a",
    "5050_t", "505__a", "505__t", "520__9", "520__a", "536__a", "536__c", "536__f", "536__r",
    "540__3", "540__a", "540__u", "541__9", "542__3", "542__d", "542__g", "583__c", "595__9",
    "595__a", "595__i", "595__z", "65027b", "6531_9", "6531_a", "690C_a", "690c_a", "693__a",
    "693__e", "695__9", "695__a", "697C_a", "700__0", "700__9", "700__a", "700__e", "700__i",
    "700__u", "710__5", "710__a", "710__e", "710__g", "711__9", "711__a", "711__c", "711__d",
    "711__f", "711__g", "711__n", "711__w", "711__z", "773__c", "773__n", "773__p", "773__v",
    "773__w", "773__y", "775__a", "775__b", "775__c", "775__w", "852__p", "8564_8", "8564_s",
    "8564_t", "8564_w", "8564_x", "859__f", "901__u", "912__f", "912__r", "916__a", "916__s",
    "916__w", "933__a", "933__b", "938__a", "938__p", "960__a", "962__k", "970__a", "970__d",
    "980__a", "980__b", "980__c", "993__r", "999C6a",
];

fn isbn(value: String, electronic: bool) -> Identifier {
    let mut identifier = Identifier::new(value, IdentifierScheme::Isbn);
    if electronic {
        identifier.material = Some(Material::Digital);
    }
    identifier
}

/// `020`: ISBN of one volume, of the whole set, or of the record.
fn isbns(_: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let electronic = s.contains('b');
    let Some(medium) = optional('u', s)? else {
        let Some(value) = optional('a', s)? else {
            return Err(RuleError::unexpected("a").with_message("ISBN not provided"));
        };
        return Ok(RuleOutcome::emit(Property::Identifiers(vec![isbn(value, electronic)])));
    };
    if let Some(info) = extract_volume_info(&medium) {
        return Ok(RuleOutcome::emit(Property::Migration(MigrationFragment::VolumeIdentifiers(
            VolumeIdentifiers {
                volume: info.volume,
                identifiers: vec![isbn(required('a', s)?, electronic)],
                physical_description: Some(info.description).filter(|d| !d.is_empty()),
            },
        ))));
    }
    let description = match RE_SET.captures(&medium) {
        Some(caps) => caps[1].trim().to_string(),
        None if extract_volume_number(&medium, true, None)?.is_some() => {
            return Err(RuleError::unexpected("u")
                .with_message("found a volume but failed to parse the description"));
        },
        None => medium,
    };
    let mut out = Vec::new();
    if !description.is_empty() {
        out.push(Fragment::new(Property::PhysicalDescription(description)));
    }
    if let Some(value) = optional('a', s)? {
        out.push(Fragment::append(Property::Identifiers(vec![isbn(value, electronic)])));
    }
    emit(out)
}

/// `245`: title of the set.
fn title(_: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let mut out = Vec::new();
    if let Some(subtitle) = optional('b', s)? {
        out.push(Fragment::append(Property::AlternativeTitles(vec![AlternativeTitle {
            value: subtitle,
            kind: TitleType::Subtitle,
            language: None,
        }])));
    }
    if let Some(value) = optional('a', s)? {
        out.push(Fragment::new(Property::Title(value)));
    }
    emit(out)
}

fn missing_title() -> RuleError {
    RuleError::missing("a").with_message("the record is missing a main title")
}

/// `246`: title of one volume.
fn volume_title(doc: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let number = optional('n', s)?;
    let part = optional('p', s)?;
    let Some(number) = number else {
        let message = if part.is_some() {
            "volume title without a volume number"
        } else {
            "the record is probably not a series"
        };
        return Err(RuleError::unexpected("n").with_message(message));
    };
    if let Some(part) = &part {
        if extract_volume_number(part, true, None)?.is_some() {
            return Err(RuleError::unexpected("p").with_message("found a volume number in the title"));
        }
    }
    if RE_DIGITS.find_iter(&number).count() > 1 {
        return Err(RuleError::unexpected("n").with_message("volume has more than one number"));
    }
    let Some(token) = extract_volume_number(&number, false, Some("n"))? else {
        return Err(RuleError::missing("n"));
    };
    if doc.title.is_none() {
        return Err(missing_title());
    }
    let mut volume = Volume::new(token);
    volume.title = part;
    emit(vec![
        Fragment::migration(MigrationFragment::Volume(volume)),
        Fragment::migration(MigrationFragment::IsMultipart(true)),
    ])
}

/// `300`: number of volumes, as in `"3 v."`.
fn number_of_volumes(doc: &Document, field: &RawField) -> RuleResult {
    if doc.title.is_none() {
        return Err(missing_title());
    }
    let Some(value) = optional('a', data(field)?)? else {
        return Ok(RuleOutcome::Skip);
    };
    if extract_parts(&value).number_of_pages.is_some() {
        return Ok(RuleOutcome::Skip);
    }
    match extract_number_of_volumes(&value) {
        Some(volumes) => Ok(RuleOutcome::emit(Property::NumberOfVolumes(volumes))),
        None => Ok(RuleOutcome::Skip),
    }
}

/// `8564_`: link, attached to a volume when its label names one.
fn urls(_: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let label = optional('y', s)?;
    let volume = match &label {
        Some(label) => extract_volume_number(label, true, None)?,
        None => None,
    };
    Ok(RuleOutcome::emit(Property::Migration(MigrationFragment::PendingUrl(PendingUrl {
        url: required('u', s)?,
        label,
        volume,
    }))))
}

/// Rules of multipart monographs.
#[must_use]
pub fn rules() -> RuleSet {
    RuleSet::new("cds.multipart")
        .rule(Rule::assign("001", "legacy_recid", legacy_recid))
        .rule(Rule::assign("003", "agency_code", agency_code))
        .rule(Rule::append("^020..", "identifiers", isbns))
        .rule(Rule::append("^088..", "_migration", report_number_or_barcode))
        .rule(Rule::assign("^245..", "title", title))
        .rule(Rule::append("^246..", "_migration", volume_title))
        .rule(Rule::assign("^300..", "number_of_volumes", number_of_volumes))
        .rule(Rule::append("^490..", "_migration", serial))
        .rule(Rule::append("8564_", "_migration", urls))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::fragment::Merge;

    fn titled() -> Document {
        Document {
            title: Some("Handbook".into()),
            ..Document::default()
        }
    }

    fn run(rule: fn(&Document, &RawField) -> RuleResult, doc: &Document, field: RawField) -> Document {
        let mut out = doc.clone();
        if let RuleOutcome::Emit(fragments) = rule(doc, &field).unwrap() {
            for fragment in fragments {
                out.apply(fragment, Merge::Append);
            }
        }
        out
    }

    #[test]
    fn test_isbn_of_one_volume() {
        let field = RawField::data("020", ' ', ' ')
            .subfield('a', "9783540200484")
            .subfield('u', "print version (v.2)");
        let doc = run(isbns, &titled(), field);
        let ids = &doc.migration.volumes_identifiers[0];
        assert_eq!(ids.volume, "2");
        assert_eq!(ids.physical_description.as_deref(), Some("print version"));
        assert!(doc.identifiers.is_empty());
    }

    #[test]
    fn test_isbn_of_the_set() {
        let field = RawField::data("020", ' ', ' ')
            .subfield('a', "9783540200491")
            .subfield('u', "print version (set)");
        let doc = run(isbns, &titled(), field);
        assert_eq!(doc.identifiers[0].value, "9783540200491");
        assert_eq!(doc.physical_description.as_deref(), Some("print version"));
    }

    #[test]
    fn test_isbn_without_value() {
        let field = RawField::data("020", ' ', ' ').subfield('q', "x");
        assert_eq!(
            isbns(&titled(), &field).unwrap_err().kind,
            ErrorKind::UnexpectedValue
        );
    }

    #[test]
    fn test_volume_title() {
        let field = RawField::data("246", ' ', ' ')
            .subfield('n', "v.2")
            .subfield('p', "Termologia");
        let doc = run(volume_title, &titled(), field);
        assert_eq!(doc.migration.volumes[0].volume, "2");
        assert_eq!(doc.migration.volumes[0].title.as_deref(), Some("Termologia"));
        assert!(doc.migration.is_multipart);
    }

    #[test]
    fn test_volume_title_errors() {
        let only_part = RawField::data("246", ' ', ' ').subfield('p', "Termologia");
        let err = volume_title(&titled(), &only_part).unwrap_err();
        assert_eq!(err.subfield.as_deref(), Some("n"));

        let number_in_part = RawField::data("246", ' ', ' ')
            .subfield('n', "v.1")
            .subfield('p', "Volume 1");
        let err = volume_title(&titled(), &number_in_part).unwrap_err();
        assert_eq!(err.subfield.as_deref(), Some("p"));

        let untitled = RawField::data("246", ' ', ' ').subfield('n', "v.1").subfield('p', "Intro");
        let err = volume_title(&Document::default(), &untitled).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingRequiredField);
    }

    #[test]
    fn test_number_of_volumes() {
        let doc = run(number_of_volumes, &titled(), RawField::data("300", ' ', ' ').subfield('a', "3 v."));
        assert_eq!(doc.number_of_volumes.as_deref(), Some("3"));
        let doc = run(number_of_volumes, &titled(), RawField::data("300", ' ', ' ').subfield('a', "350 p"));
        assert!(doc.number_of_volumes.is_none());
    }

    #[test]
    fn test_url_with_volume_label() {
        let field = RawField::data("856", '4', ' ')
            .subfield('u', "https://cds.cern.ch/record/1/files/v1.pdf")
            .subfield('y', "Fulltext v.1");
        let doc = run(urls, &titled(), field);
        assert_eq!(doc.pending.urls[0].volume.as_deref(), Some("1"));
    }
}
