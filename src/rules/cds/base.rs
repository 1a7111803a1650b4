//! Rules shared by every CDS document model.

use crate::document::{
    Affiliation, AlternativeIdentifier, AlternativeTitle, Author, AuthorIdentifier, AuthorType,
    ConferenceIdentifier, Copyright, CreatedBy, CreatedByType, Document, DocumentType, Identifier,
    IdentifierScheme, Imprint, InternalNote, ItemMedium, JournalRef, Keyword, License, LicenseRef,
    PendingBarcode, PendingDoi, PendingRelation, PendingUrl, PublicationInfo, SerialRef, Subject,
    SubjectScheme, Tag, TitleType, Volume,
};
use crate::error::RuleError;
use crate::fragment::{Fragment, MigrationFragment, Property};
use crate::parsers::{
    clean_email, clean_pages_range, clean_val, country_alpha3, extract_parts,
    extract_volume_number, is_excluded, parse_date, parse_year_week, Transform,
};
use crate::record::{RawField, Subfields};
use crate::registry::{Rule, RuleOutcome, RuleSet};
use crate::rules::{
    conference_identifier, data, emit, languages, optional, person, required, with_conference,
    RuleResult,
};
use crate::vocabulary::{
    mapping, Collection, Lookup, ACQUISITION_METHOD, APPLICABILITY, ARXIV_CATEGORIES, COLLECTION,
    DOCUMENT_TYPE, EXTERNAL_SYSTEM_IDENTIFIERS, EXTERNAL_SYSTEM_IDENTIFIERS_TO_IGNORE,
    IDENTIFIER_MATERIAL, ITEM_MEDIUM, MATERIALS, SUBJECT_CLASSIFICATION_EXCEPTIONS,
};
use chrono::{Local, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RE_ISBN_VOLUME: Regex = Regex::new(r"(\(*v[.| ]*\d+.*\)*)").unwrap();
    static ref RE_LEGACY_SOURCE: Regex = Regex::new(r"^[A-Z]{3}[0-9]{6}$").unwrap();
    static ref RE_WEEK: Regex = Regex::new(r"^\d{6}$").unwrap();
    static ref RE_AUTHOR_ID: Regex =
        Regex::new(r"^AUTHOR\|\((INSPIRE|CDS|SzGeCERN)\)(.+)$").unwrap();
    static ref RE_TOC_SPLIT: Regex = Regex::new(r"; | -- |--").unwrap();
    static ref RE_EDITION: Regex = Regex::new(r"(?i)\s*ed\.").unwrap();
    static ref RE_REPRINT: Regex = Regex::new(r"(?i)repr\.").unwrap();
    static ref RE_COLLABORATION: Regex = Regex::new(r"(?i)\s*collaboration\s*").unwrap();
}

/// Conference identifier scheme of the legacy catalogue.
pub const CERN_CODE: &str = "CERN_CODE";

/// Conference identifier scheme of INSPIRE.
pub const INSPIRE_CNUM: &str = "INSPIRE_CNUM";

fn is_et_al(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    v == "et al." || v == "et al"
}

// ----------------------------------------------------------------------------
// Titles
// ----------------------------------------------------------------------------

fn alternative_title(value: String, kind: TitleType, language: Option<&str>) -> AlternativeTitle {
    AlternativeTitle {
        value,
        kind,
        language: language.map(str::to_string),
    }
}

/// `245`: title and subtitle.
pub(crate) fn title(doc: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    if doc.title.is_some() {
        return Err(RuleError::unexpected_field().with_message("Ambiguous title"));
    }
    let mut out = vec![Fragment::new(Property::Title(required('a', s)?))];
    if let Some(subtitle) = optional('b', s)? {
        out.push(Fragment::append(Property::AlternativeTitles(vec![
            alternative_title(subtitle, TitleType::Subtitle, None),
        ])));
    }
    emit(out)
}

/// Translated title and subtitle in `language`.
pub(crate) fn translated_titles(s: &Subfields, language: &str) -> RuleResult {
    let mut titles = Vec::new();
    if let Some(value) = optional('a', s)? {
        titles.push(alternative_title(value, TitleType::TranslatedTitle, Some(language)));
    }
    if let Some(value) = optional('b', s)? {
        titles.push(alternative_title(value, TitleType::TranslatedSubtitle, Some(language)));
    }
    if titles.is_empty() {
        return Ok(RuleOutcome::Skip);
    }
    Ok(RuleOutcome::emit(Property::AlternativeTitles(titles)))
}

fn english_titles(_: &Document, field: &RawField) -> RuleResult {
    translated_titles(data(field)?, "ENG")
}

/// Plain alternative title and subtitle.
pub(crate) fn alternative_titles(_: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let mut titles = Vec::new();
    if let Some(value) = optional('a', s)? {
        titles.push(alternative_title(value, TitleType::AlternativeTitle, None));
    }
    if let Some(value) = optional('b', s)? {
        titles.push(alternative_title(value, TitleType::Subtitle, None));
    }
    if titles.is_empty() {
        return Ok(RuleOutcome::Skip);
    }
    Ok(RuleOutcome::emit(Property::AlternativeTitles(titles)))
}

/// `246`: volume title when `$n`/`$p` are given, alternative titles otherwise.
fn volume_or_alternative_title(doc: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let number = optional('n', s)?;
    let part = optional('p', s)?;
    match (number, part) {
        (Some(n), Some(p)) => {
            let token = extract_volume_number(&n, false, Some("n"))?.unwrap_or(n);
            let mut volume = Volume::new(token);
            volume.title = Some(p);
            emit(vec![
                Fragment::migration(MigrationFragment::Volume(volume)),
                Fragment::migration(MigrationFragment::IsMultipart(true)),
            ])
        },
        (None, None) => alternative_titles(doc, field),
        _ => Err(RuleError::missing("n or p").with_message("volume needs both number and title")),
    }
}

// ----------------------------------------------------------------------------
// Record metadata
// ----------------------------------------------------------------------------

/// `859`: cataloguer email.
fn created_by_email(_: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let Some(email) = optional('f', s)?.and_then(|f| clean_email(&f)) else {
        return Ok(RuleOutcome::Skip);
    };
    Ok(RuleOutcome::emit(Property::CreatedBy(CreatedBy {
        kind: CreatedByType::User,
        email: Some(email),
    })))
}

/// `916`: acquisition method and creation week.
///
/// The earliest week wins across repetitions; a week in the future falls back
/// to today.
fn created(doc: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let mut out = Vec::new();
    if doc.created_by.is_none() {
        let method = optional('s', s)?.unwrap_or_else(|| "migration".to_string());
        if let Some(kind) = mapping(&ACQUISITION_METHOD, &method, true).map_err(|e| e.on('s'))? {
            out.push(Fragment::new(Property::CreatedBy(CreatedBy { kind, email: None })));
        }
    }
    let mut earliest: Option<NaiveDate> = doc.created;
    for week in clean_val('w', s).regex(&RE_WEEK).strings()? {
        let date = parse_year_week(&week)
            .ok_or_else(|| RuleError::unexpected("w").with_message(format!("bad week '{week}'")))?;
        earliest = Some(earliest.map_or(date, |e| e.min(date)));
    }
    if let Some(date) = earliest {
        let today = Local::now().date_naive();
        out.push(Fragment::new(Property::Created(date.min(today))));
    }
    emit(out)
}

/// `595`: acquisition source stamp or internal note.
fn source_or_note(_: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let Some(value) = optional('a', s)? else {
        return Ok(RuleOutcome::Skip);
    };
    if RE_LEGACY_SOURCE.is_match(&value) {
        let mut out = vec![Fragment::new(Property::Source(value[..3].to_string()))];
        let year = value[3..7].parse::<i32>().ok();
        let month = value[7..9].parse::<u32>().ok();
        if let Some(date) = year.zip(month).and_then(|(y, m)| NaiveDate::from_ymd_opt(y, m, 1)) {
            out.push(Fragment::new(Property::Created(date)));
        }
        return emit(out);
    }
    Ok(RuleOutcome::emit(Property::InternalNotes(vec![InternalNote { value }])))
}

/// `690C_`, `697C_`, `960__`, `980__`: collections and document type.
fn collections(doc: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let mut out = Vec::new();
    let mut document_type = doc.document_type;
    for code in ['a', 'b'] {
        let Some(value) = optional(code, s)? else {
            continue;
        };
        if let Some(collection) = COLLECTION.lookup(&value) {
            let tag = match collection {
                Collection::BookSuggestion => Some(Tag::BookSuggestion),
                Collection::Legserlib => Some(Tag::LegalServiceLibrary),
                Collection::DesignReport => Some(Tag::DesignReport),
                Collection::Bookshop => Some(Tag::Bookshop),
                Collection::LegserlibIntLaw => Some(Tag::LegserlibIntLaw),
                Collection::LegserlibCivLaw => Some(Tag::LegserlibCivLaw),
                Collection::LegserlibLegRes => Some(Tag::LegserlibLegRes),
                Collection::YellowReport => {
                    out.push(Fragment::migration(MigrationFragment::YellowReport(true)));
                    None
                },
                Collection::Cern => None,
            };
            if let Some(tag) = tag {
                out.push(Fragment::append(Property::Tags(vec![tag])));
            }
            continue;
        }
        match (DOCUMENT_TYPE.lookup(&value), document_type) {
            (Some(found), Some(existing)) if found != existing => {
                return Err(RuleError::manual(&code.to_string())
                    .with_message(format!("inconsistent document type '{value}'")));
            },
            (Some(found), _) => {
                document_type = Some(found);
                out.push(Fragment::new(Property::DocumentType(found)));
            },
            (None, Some(_)) => {},
            (None, None) => {
                return Err(RuleError::unexpected(&code.to_string())
                    .with_message(format!("unknown collection or document type '{value}'")));
            },
        }
    }
    emit(out)
}

// ----------------------------------------------------------------------------
// Contributors
// ----------------------------------------------------------------------------

/// `100`, `700`: persons.
fn authors(_: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let Some(name) = optional('a', s)? else {
        return Ok(RuleOutcome::Skip);
    };
    let mut author = person(s, name)?;
    let mut et_al = false;
    for affiliation in clean_val('u', s).strings()? {
        if is_et_al(&affiliation) {
            et_al = true;
        } else {
            author.affiliations.push(Affiliation { name: affiliation });
        }
    }
    for id in clean_val('0', s).strings()? {
        if let Some(caps) = RE_AUTHOR_ID.captures(&id) {
            let scheme = match &caps[1] {
                "INSPIRE" => "INSPIRE ID",
                "CDS" => "CDS",
                _ => "CERN",
            };
            author.identifiers.push(AuthorIdentifier {
                scheme: scheme.to_string(),
                value: caps[2].trim().to_string(),
            });
        }
    }
    let mut out = vec![Fragment::append(Property::Authors(vec![author]))];
    if et_al {
        out.push(Fragment::new(Property::OtherAuthors(true)));
    }
    emit(out)
}

/// `110`, `710`: corporate authors and collaborations.
fn organisations(_: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let name = match optional('a', s)? {
        Some(name) => Some(name),
        None => optional('g', s)?
            .or(optional('5', s)?)
            .map(|c| RE_COLLABORATION.replace_all(&c, " ").trim().to_string())
            .filter(|c| !c.is_empty()),
    };
    let Some(name) = name else {
        return Ok(RuleOutcome::Skip);
    };
    Ok(RuleOutcome::emit(Property::Authors(vec![Author::new(name, AuthorType::Organisation)])))
}

/// `720`: alternative name of the next author without one.
fn alternative_names(doc: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let Some(name) = optional('a', s)? else {
        return Ok(RuleOutcome::Skip);
    };
    let Some(index) = doc.authors.iter().position(|a| a.alternative_names.is_empty()) else {
        return Ok(RuleOutcome::Skip);
    };
    Ok(RuleOutcome::emit(Property::AuthorAlternativeName { index, name }))
}

// ----------------------------------------------------------------------------
// Identifiers
// ----------------------------------------------------------------------------

/// `020`: ISBN, with material and volume taken from `$u`.
fn isbns(doc: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let Some(value) = optional('a', s)?.or(optional('z', s)?) else {
        return Err(RuleError::manual("a or z").with_message("ISBN not provided"));
    };
    let mut out = Vec::new();
    let mut identifier = Identifier::new(value, IdentifierScheme::Isbn);
    if let Some(medium) = optional('u', s)? {
        let mut rest = medium.clone();
        if let Some(found) = RE_ISBN_VOLUME.find(&medium) {
            if doc.volume.is_some() {
                return Err(RuleError::manual("u").with_message("volume already set"));
            }
            let marker = found.as_str().trim_matches(|c| c == '(' || c == ')' || c == ' ');
            let token = extract_volume_number(marker, true, None)?.unwrap_or_else(|| marker.to_string());
            out.push(Fragment::new(Property::Volume(token)));
            rest = RE_ISBN_VOLUME.replace(&medium, "").trim().to_string();
        }
        identifier.material = IDENTIFIER_MATERIAL.lookup(&rest);
    }
    out.push(Fragment::append(Property::Identifiers(vec![identifier])));
    emit(out)
}

/// `021`: standard number.
fn standard_numbers(_: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let Some(value) = optional('a', s)?.or(optional('b', s)?) else {
        return Err(RuleError::missing("a or b"));
    };
    Ok(RuleOutcome::emit(Property::Identifiers(vec![Identifier::new(
        value,
        IdentifierScheme::StandardNumber,
    )])))
}

/// `0247_`: DOI, which also yields an external electronic item.
fn dois(_: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let scheme = optional('2', s)?.unwrap_or_default();
    match scheme.to_uppercase().as_str() {
        "DOI" => {
            let doi = required('a', s)?;
            let label = optional('q', s)?;
            let material = match &label {
                Some(q) => mapping(&IDENTIFIER_MATERIAL, q, true).map_err(|e| e.on('q'))?,
                None => None,
            };
            let mut identifier = Identifier::new(doi.clone(), IdentifierScheme::Doi);
            identifier.material = material;
            emit(vec![
                Fragment::new(Property::Identifiers(vec![identifier])),
                Fragment::migration(MigrationFragment::PendingDoi(PendingDoi { doi, label })),
            ])
        },
        "ASIN" => Ok(RuleOutcome::Skip),
        _ => Err(RuleError::unexpected("2").with_message(format!("unknown scheme '{scheme}'"))),
    }
}

/// `035`: identifiers in external systems.
fn external_identifiers(doc: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let value = optional('a', s)?;
    let system = optional('9', s)?;
    let is_cercer = |v: &Option<String>| v.as_deref().is_some_and(|v| v.contains("CERCER"));
    if is_cercer(&value) || is_cercer(&system) {
        return Ok(RuleOutcome::Skip);
    }
    let value = required('a', s)?;
    let system = required('9', s)?;
    if system.eq_ignore_ascii_case("INSPIRE-CNUM") {
        return emit(vec![conference_identifier(doc, INSPIRE_CNUM, value)]);
    }
    if let Some(scheme) = EXTERNAL_SYSTEM_IDENTIFIERS.lookup(&system) {
        return Ok(RuleOutcome::emit(Property::AlternativeIdentifiers(vec![
            AlternativeIdentifier {
                value,
                scheme: scheme.to_string(),
            },
        ])));
    }
    if EXTERNAL_SYSTEM_IDENTIFIERS_TO_IGNORE.contains(&system) {
        return Ok(RuleOutcome::Skip);
    }
    Err(RuleError::unexpected("9").with_message(format!("unknown external system '{system}'")))
}

/// `036`: identifier with an explicit scheme.
fn scheme_identifiers(_: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    Ok(RuleOutcome::emit(Property::AlternativeIdentifiers(vec![
        AlternativeIdentifier {
            value: required('a', s)?,
            scheme: required('9', s)?.to_uppercase(),
        },
    ])))
}

/// `037`: arXiv eprint or report number.
fn arxiv_or_report_number(_: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let value = optional('a', s)?;
    let cancelled = optional('z', s)?;
    let system = optional('9', s)?;
    if value.is_none() && cancelled.is_none() && system.is_none() {
        return Err(RuleError::missing("9 or a or z"));
    }
    if system.as_deref().is_some_and(|v| v.eq_ignore_ascii_case("arXiv")) {
        let mut out = vec![Fragment::new(Property::AlternativeIdentifiers(vec![
            AlternativeIdentifier {
                value: required('a', s)?,
                scheme: "ARXIV".to_string(),
            },
        ]))];
        if let Some(category) = optional('c', s)? {
            let category = mapping(&ARXIV_CATEGORIES, &category, true)
                .map_err(|e| e.on('c'))?
                .unwrap_or_default();
            out.push(Fragment::new(Property::Keywords(vec![Keyword {
                value: category.to_string(),
                source: Some("arXiv".to_string()),
            }])));
        }
        return emit(out);
    }
    let Some(number) = value.or(cancelled).or(system) else {
        return Ok(RuleOutcome::Skip);
    };
    Ok(RuleOutcome::emit(Property::Identifiers(vec![Identifier::new(
        number,
        IdentifierScheme::ReportNumber,
    )])))
}

/// `088`: report number, or the barcode of one volume.
pub(crate) fn report_number_or_barcode(_: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let value = optional('a', s)?;
    let cancelled = optional('z', s)?;
    let system = optional('9', s)?;
    let volume = optional('n', s)?;
    let barcode = optional('x', s)?;
    if value.is_none() && system.is_none() && (volume.is_some() || barcode.is_some()) {
        let volume = match volume {
            Some(n) => extract_volume_number(&n, false, Some("n"))?,
            None => None,
        };
        let Some(barcode) = barcode else {
            return Err(RuleError::missing("x").with_message("volume without barcode"));
        };
        return Ok(RuleOutcome::emit(Property::Migration(MigrationFragment::PendingBarcode(
            PendingBarcode { volume, barcode },
        ))));
    }
    let Some(number) = value.or(cancelled).or(system) else {
        return Err(RuleError::missing("9 or a or z or n or x"));
    };
    Ok(RuleOutcome::emit(Property::Identifiers(vec![Identifier::new(
        number,
        IdentifierScheme::ReportNumber,
    )])))
}

/// `041`: languages.
pub(crate) fn record_languages(_: &Document, field: &RawField) -> RuleResult {
    let values = languages(data(field)?, 'a')?;
    if values.is_empty() {
        return Ok(RuleOutcome::Skip);
    }
    Ok(RuleOutcome::emit(Property::Languages(values)))
}

// ----------------------------------------------------------------------------
// Classification
// ----------------------------------------------------------------------------

fn subject(s: &Subfields, scheme: SubjectScheme) -> RuleResult {
    Ok(RuleOutcome::emit(Property::Subjects(vec![Subject {
        value: required('a', s)?,
        scheme,
    }])))
}

fn loc_subjects(_: &Document, field: &RawField) -> RuleResult {
    subject(data(field)?, SubjectScheme::Loc)
}

fn udc_subjects(_: &Document, field: &RawField) -> RuleResult {
    subject(data(field)?, SubjectScheme::Udc)
}

fn dewey_subjects(_: &Document, field: &RawField) -> RuleResult {
    subject(data(field)?, SubjectScheme::Dewey)
}

/// `084`: ICS class, or keyword for sources that are not classifications.
fn ics_subjects(_: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    if let Some(source) = optional('2', s)?.filter(|src| SUBJECT_CLASSIFICATION_EXCEPTIONS.contains(src)) {
        let Some(value) = optional('a', s)? else {
            return Ok(RuleOutcome::Skip);
        };
        return Ok(RuleOutcome::emit(Property::Keywords(vec![Keyword {
            value,
            source: Some(source),
        }])));
    }
    subject(s, SubjectScheme::Ics)
}

/// `6531_`: free keywords.
fn keywords(_: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let Some(value) = optional('a', s)? else {
        return Ok(RuleOutcome::Skip);
    };
    let source = optional('9', s)?.or(optional('g', s)?);
    Ok(RuleOutcome::emit(Property::Keywords(vec![Keyword { value, source }])))
}

// ----------------------------------------------------------------------------
// Conferences and host publications
// ----------------------------------------------------------------------------

fn conference_date(s: &Subfields, code: char) -> Result<NaiveDate, RuleError> {
    let value = required(code, s)?;
    parse_date(&value).ok_or_else(|| {
        RuleError::unexpected("9 or z").with_message(format!("bad conference date '{value}'"))
    })
}

/// `111`: conference.
fn conference(doc: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let title = required('a', s)?;
    let place = required('c', s)?;
    let start = conference_date(s, '9')?;
    let end = conference_date(s, 'z')?;
    let country = match optional('w', s)? {
        Some(code) => Some(country_alpha3(&code).ok_or_else(|| {
            RuleError::unexpected("w").with_message(format!("unknown country '{code}'"))
        })?),
        None => None,
    };
    let series = clean_val('n', s).int()?.map(|n| n.to_string());
    let cern_code = optional('g', s)?;
    let conference = with_conference(doc, |c| {
        c.title = Some(title.clone());
        c.place = Some(place);
        c.dates = Some(format!("{} - {}", start.format("%Y-%m-%d"), end.format("%Y-%m-%d")));
        c.country = country;
        c.series = series;
        if let Some(code) = cern_code {
            let id = ConferenceIdentifier {
                scheme: CERN_CODE.to_string(),
                value: code,
            };
            if !c.identifiers.contains(&id) {
                c.identifiers.push(id);
            }
        }
    });
    emit(vec![
        conference,
        Fragment::migration(MigrationFragment::ConferenceTitle(title)),
    ])
}

/// `711`: conference acronym.
fn conference_acronym(doc: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let Some(acronym) = optional('a', s)? else {
        return Ok(RuleOutcome::Skip);
    };
    emit(vec![with_conference(doc, |c| c.acronym = Some(acronym))])
}

/// `773`: host publication.
fn publication_info(_: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let note = [optional('o', s)?, optional('x', s)?]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
    let info = PublicationInfo {
        pages: match optional('c', s)? {
            Some(pages) => clean_pages_range(&pages, "c")?,
            None => None,
        },
        year: clean_val('y', s).int()?,
        journal_title: optional('p', s)?,
        journal_issue: optional('n', s)?,
        journal_volume: optional('v', s)?,
        note: Some(note.trim().to_string()).filter(|n| !n.is_empty()),
    };
    if info.is_empty() {
        return Ok(RuleOutcome::Skip);
    }
    Ok(RuleOutcome::emit(Property::PublicationInfo(vec![info])))
}

/// `962`: pages in a host publication, parent journal, conference code.
fn host_publication(doc: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let mut out = Vec::new();
    if let Some(pages) = optional('k', s)? {
        if let Some(pages) = clean_pages_range(&pages, "k")? {
            let mut infos = doc.publication_info.clone();
            match infos.first_mut() {
                Some(first) if first.pages.is_none() => first.pages = Some(pages),
                Some(_) => {},
                None => infos.push(PublicationInfo {
                    pages: Some(pages),
                    ..PublicationInfo::default()
                }),
            }
            out.push(Fragment::assign(Property::PublicationInfo(infos)));
        }
    }
    if let Some(recid) = optional('b', s)? {
        out.push(Fragment::migration(MigrationFragment::Journal(JournalRef {
            recid,
            volume: optional('v', s)?,
        })));
        out.push(Fragment::new(Property::DocumentType(DocumentType::PeriodicalIssue)));
    }
    if let Some(code) = optional('n', s)? {
        if !code.eq_ignore_ascii_case("BOOK") {
            out.push(conference_identifier(doc, CERN_CODE, code));
        }
    }
    emit(out)
}

// ----------------------------------------------------------------------------
// Publication and physical description
// ----------------------------------------------------------------------------

/// `250`: edition.
pub(crate) fn edition(_: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let Some(value) = optional('a', s)? else {
        return Ok(RuleOutcome::Skip);
    };
    let value = RE_EDITION.replace_all(&value, "").trim().to_string();
    if value.is_empty() {
        return Ok(RuleOutcome::Skip);
    }
    Ok(RuleOutcome::emit(Property::Edition(value)))
}

/// `260`: imprint and publication year.
fn imprint(_: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let date = required('c', s)?;
    let parsed = parse_date(&date).ok_or_else(|| {
        RuleError::unexpected("c").with_message(format!("bad publication date '{date}'"))
    })?;
    let reprint = optional('g', s)?
        .map(|g| RE_REPRINT.replace_all(&g.to_lowercase(), "").trim().to_string())
        .filter(|g| !g.is_empty());
    emit(vec![
        Fragment::new(Property::PublicationYear(parsed.format("%Y").to_string())),
        Fragment::new(Property::Imprint(Imprint {
            place: optional('a', s)?,
            publisher: optional('b', s)?,
            date: Some(date),
            reprint,
        })),
    ])
}

/// `300`: number of pages and accompanying material.
pub(crate) fn number_of_pages(_: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let Some(value) = optional('a', s)? else {
        return Ok(RuleOutcome::Skip);
    };
    if is_excluded(&value) {
        return Ok(RuleOutcome::Skip);
    }
    let parts = extract_parts(&value);
    if parts.has_extra {
        return Err(RuleError::unexpected("a").with_message(format!("unparsed extent '{value}'")));
    }
    let mut out = Vec::new();
    if let Some(description) = parts.physical_description {
        out.push(Fragment::new(Property::PhysicalDescription(description)));
    }
    match parts.number_of_pages {
        Some(pages) => out.push(Fragment::new(Property::NumberOfPages(pages))),
        None if out.is_empty() => {
            return Err(RuleError::unexpected("a").with_message(format!("no pages in '{value}'")));
        },
        None => {},
    }
    emit(out)
}

/// `340`: medium of one item.
fn item_medium(_: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let Some(barcode) = optional('x', s)? else {
        return Ok(RuleOutcome::Skip);
    };
    let medium = required('a', s)?;
    let Some(medium) = mapping(&ITEM_MEDIUM, &medium, true).map_err(|e| e.on('a'))? else {
        return Ok(RuleOutcome::Skip);
    };
    Ok(RuleOutcome::emit(Property::Migration(MigrationFragment::ItemMedium(ItemMedium {
        barcode,
        medium,
    }))))
}

/// `490`: series.
pub(crate) fn serial(_: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    Ok(RuleOutcome::emit(Property::Migration(MigrationFragment::Serial(SerialRef {
        title: required('a', s)?,
        volume: optional('v', s)?,
        issn: optional('x', s)?,
    }))))
}

// ----------------------------------------------------------------------------
// Notes and abstracts
// ----------------------------------------------------------------------------

/// `500`: public note.
fn note(_: &Document, field: &RawField) -> RuleResult {
    Ok(RuleOutcome::emit(Property::Note(required('a', data(field)?)?)))
}

/// `505`: table of content.
pub(crate) fn table_of_content(_: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let text = format!(
        "{} -- {}",
        optional('a', s)?.unwrap_or_default(),
        optional('t', s)?.unwrap_or_default()
    );
    let text = text.trim();
    if text == "--" {
        return Err(RuleError::unexpected("a or t").with_message("empty table of content"));
    }
    let chapters: Vec<String> = RE_TOC_SPLIT
        .split(text)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();
    Ok(RuleOutcome::many(vec![Fragment::new(Property::TableOfContent(chapters))]))
}

/// `520`: abstract, further ones become alternative abstracts.
pub(crate) fn abstracts(doc: &Document, field: &RawField) -> RuleResult {
    let value = required('a', data(field)?)?;
    if doc.r#abstract.is_none() {
        return Ok(RuleOutcome::emit(Property::Abstract(value)));
    }
    Ok(RuleOutcome::emit(Property::AlternativeAbstracts(vec![value])))
}

/// `536`: open access statement for the whole record.
fn open_access(_: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let is_open = optional('r', s)?.is_some_and(|r| r.to_lowercase().contains("open access"));
    if !is_open {
        return Ok(RuleOutcome::Skip);
    }
    Ok(RuleOutcome::emit(Property::Migration(MigrationFragment::OpenAccess(true))))
}

fn material(s: &Subfields) -> Result<Option<String>, RuleError> {
    match clean_val('3', s).transform(Transform::Lower).string()? {
        Some(value) => Ok(mapping(&MATERIALS, &value, true)
            .map_err(|e| e.on('3'))?
            .map(str::to_string)),
        None => Ok(None),
    }
}

/// `540`: license.
fn licenses(_: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    Ok(RuleOutcome::emit(Property::Licenses(vec![License {
        license: LicenseRef {
            id: None,
            name: optional('a', s)?,
            url: optional('u', s)?,
        },
        material: material(s)?,
        internal_notes: optional('g', s)?,
    }])))
}

/// `542`: copyright.
pub(crate) fn copyrights(_: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let copyright = Copyright {
        material: material(s)?,
        holder: optional('d', s)?,
        statement: optional('f', s)?,
        year: clean_val('g', s).int()?,
        url: optional('u', s)?,
    };
    if copyright == Copyright::default() {
        return Ok(RuleOutcome::Skip);
    }
    Ok(RuleOutcome::emit(Property::Copyrights(vec![copyright])))
}

// ----------------------------------------------------------------------------
// Extensions
// ----------------------------------------------------------------------------

/// `693`: accelerator, experiment and project.
fn units(doc: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let mut extensions = doc.extensions.clone();
    if let Some(accelerator) = optional('a', s)? {
        extensions.unit_accelerator = Some(match extensions.unit_accelerator.take() {
            Some(existing) if existing.split("; ").any(|a| a == accelerator) => existing,
            Some(existing) => format!("{existing}; {accelerator}"),
            None => accelerator,
        });
    }
    for experiment in clean_val('e', s).strings()? {
        if !extensions.unit_experiment.contains(&experiment) {
            extensions.unit_experiment.push(experiment);
        }
    }
    for project in clean_val('p', s).strings()? {
        if !extensions.unit_project.contains(&project) {
            extensions.unit_project.push(project);
        }
    }
    if extensions == doc.extensions {
        return Ok(RuleOutcome::Skip);
    }
    Ok(RuleOutcome::emit(Property::Extensions(extensions)))
}

/// `925`: review of a standard.
fn standard_review(doc: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let mut extensions = doc.extensions.clone();
    if let Some(value) = optional('i', s)? {
        if let Some(applicability) = mapping(&APPLICABILITY, &value, true).map_err(|e| e.on('i'))? {
            let applicability = applicability.to_string();
            if !extensions.standard_review_applicability.contains(&applicability) {
                extensions.standard_review_applicability.push(applicability);
            }
        }
    }
    if let Some(validity) = optional('v', s)? {
        extensions.standard_review_standard_validity = Some(validity);
    }
    if let Some(checkdate) = optional('z', s)? {
        let date = parse_date(&checkdate).ok_or_else(|| {
            RuleError::unexpected("z").with_message(format!("bad check date '{checkdate}'"))
        })?;
        extensions.standard_review_checkdate = Some(date.format("%Y-%m-%d").to_string());
    }
    if let Some(expert) = optional('p', s)? {
        extensions.standard_review_expert = Some(expert);
    }
    Ok(RuleOutcome::emit(Property::Extensions(extensions)))
}

// ----------------------------------------------------------------------------
// Links and relations
// ----------------------------------------------------------------------------

/// `8564_`: URL, classified after translation.
fn urls(_: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    Ok(RuleOutcome::emit(Property::Migration(MigrationFragment::PendingUrl(PendingUrl {
        url: required('u', s)?,
        label: optional('y', s)?,
        volume: None,
    }))))
}

/// `770`, `772`, `775`, `780`, `785`, `787`: related records, typed later.
pub(crate) fn relations(_: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let description = if field.tag == "775" {
        optional('b', s)?
    } else {
        optional('i', s)?
    };
    Ok(RuleOutcome::emit(Property::Migration(MigrationFragment::PendingRelation(
        PendingRelation {
            tag: field.key(),
            recid: optional('w', s)?,
            relation: optional('x', s)?,
            description,
        },
    ))))
}

/// Rules of every CDS document.
#[must_use]
pub fn rules() -> RuleSet {
    RuleSet::new("cds")
        .rule(Rule::assign("001", "legacy_recid", crate::rules::legacy_recid))
        .rule(Rule::assign("003", "agency_code", crate::rules::agency_code))
        .rule(Rule::append("^020..", "identifiers", isbns))
        .rule(Rule::append("^021..", "identifiers", standard_numbers))
        .rule(Rule::append("0247_", "identifiers", dois))
        .rule(Rule::append("^035..", "alternative_identifiers", external_identifiers))
        .rule(Rule::append("^036..", "alternative_identifiers", scheme_identifiers))
        .rule(Rule::append("^037..", "identifiers", arxiv_or_report_number))
        .rule(Rule::append("^041..", "languages", record_languages))
        .rule(Rule::append("^050..", "subjects", loc_subjects))
        .rule(Rule::append("^080..", "subjects", udc_subjects))
        .rule(Rule::append("^082..", "subjects", dewey_subjects))
        .rule(Rule::append("^084..", "subjects", ics_subjects))
        .rule(Rule::append("^088..", "identifiers", report_number_or_barcode))
        .rule(Rule::append("^100..", "authors", authors))
        .rule(Rule::append("^110..", "authors", organisations))
        .rule(Rule::assign("^111..", "conference_info", conference))
        .rule(Rule::append("^242..", "alternative_titles", english_titles))
        .rule(Rule::assign("^245..", "title", title))
        .rule(Rule::append("^246..", "alternative_titles", volume_or_alternative_title))
        .rule(Rule::assign("^250..", "edition", edition))
        .rule(Rule::assign("^260..", "imprint", imprint))
        .rule(Rule::assign("^300..", "number_of_pages", number_of_pages))
        .rule(Rule::append("^340..", "_migration", item_medium))
        .rule(Rule::append("^490..", "_migration", serial))
        .rule(Rule::append("^500..", "note", note))
        .rule(Rule::append("^505..", "table_of_content", table_of_content))
        .rule(Rule::append("^520..", "abstract", abstracts))
        .rule(Rule::assign("^536..", "_migration", open_access))
        .rule(Rule::append("^540..", "licenses", licenses))
        .rule(Rule::append("^542..", "copyrights", copyrights))
        .rule(Rule::append("^595..", "internal_notes", source_or_note))
        .rule(Rule::append("6531_", "keywords", keywords))
        .rule(Rule::append("690C_", "tags", collections))
        .rule(Rule::assign("^693..", "extensions", units))
        .rule(Rule::append("697C_", "tags", collections))
        .rule(Rule::append("^700..", "authors", authors))
        .rule(Rule::append("^710..", "authors", organisations))
        .rule(Rule::assign("^711..", "conference_info", conference_acronym))
        .rule(Rule::assign("^720..", "authors", alternative_names))
        .rule(Rule::append("^773..", "publication_info", publication_info))
        .rule(Rule::append("^7(70|72|75|80|85|87)..", "_migration", relations))
        .rule(Rule::append("^856..", "_migration", urls))
        .rule(Rule::assign("^859..", "created_by", created_by_email))
        .rule(Rule::assign("^916..", "created_by", created))
        .rule(Rule::assign("^925..", "extensions", standard_review))
        .rule(Rule::append("960__", "document_type", collections))
        .rule(Rule::assign("^962..", "publication_info", host_publication))
        .rule(Rule::append("980__", "document_type", collections))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Material, RelationType};
    use crate::error::ErrorKind;

    fn run(rule: fn(&Document, &RawField) -> RuleResult, doc: &Document, field: RawField) -> Document {
        let mut out = doc.clone();
        if let RuleOutcome::Emit(fragments) = rule(doc, &field).unwrap() {
            for fragment in fragments {
                out.apply(fragment, crate::fragment::Merge::Append);
            }
        }
        out
    }

    #[test]
    fn test_isbn_material_from_medium() {
        let doc = run(
            isbns,
            &Document::default(),
            RawField::data("020", ' ', ' ')
                .subfield('a', "9781630814434")
                .subfield('u', "electronic version"),
        );
        assert_eq!(doc.identifiers.len(), 1);
        assert_eq!(doc.identifiers[0].material, Some(Material::Digital));
        assert!(doc.volume.is_none());
    }

    #[test]
    fn test_isbn_volume_marker() {
        let doc = run(
            isbns,
            &Document::default(),
            RawField::data("020", ' ', ' ')
                .subfield('a', "9780080247076")
                .subfield('u', "print version (v.2)"),
        );
        assert_eq!(doc.volume.as_deref(), Some("2"));
        assert_eq!(doc.identifiers[0].material, Some(Material::PrintVersion));

        let err = isbns(&doc, &RawField::data("020", ' ', ' ').subfield('a', "1").subfield('u', "(v.3)"))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ManualImportRequired);
    }

    #[test]
    fn test_isbn_missing() {
        let err = isbns(&Document::default(), &RawField::data("020", ' ', ' ').subfield('u', "x"))
            .unwrap_err();
        assert_eq!(err.subfield.as_deref(), Some("a or z"));
    }

    #[test]
    fn test_doi_parks_pending_eitem() {
        let doc = run(
            dois,
            &Document::default(),
            RawField::data("024", '7', ' ')
                .subfield('2', "DOI")
                .subfield('a', "10.1007/978-1-4613-0247-6")
                .subfield('q', "e-book"),
        );
        assert_eq!(doc.identifiers[0].scheme, IdentifierScheme::Doi);
        assert_eq!(doc.identifiers[0].material, Some(Material::Digital));
        assert_eq!(doc.pending.dois.len(), 1);

        let err = dois(&Document::default(), &RawField::data("024", '7', ' ').subfield('2', "HDL"))
            .unwrap_err();
        assert_eq!(err.subfield.as_deref(), Some("2"));
    }

    #[test]
    fn test_external_identifiers() {
        let doc = run(
            external_identifiers,
            &Document::default(),
            RawField::data("035", ' ', ' ').subfield('9', "Inspire").subfield('a', "1234"),
        );
        assert_eq!(doc.alternative_identifiers[0].scheme, "INSPIRE");
        let skip = external_identifiers(
            &Document::default(),
            &RawField::data("035", ' ', ' ').subfield('9', "SPIRES").subfield('a', "1"),
        )
        .unwrap();
        assert_eq!(skip, RuleOutcome::Skip);
        let err = external_identifiers(
            &Document::default(),
            &RawField::data("035", ' ', ' ').subfield('9', "NOWHERE").subfield('a', "1"),
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedValue);
    }

    #[test]
    fn test_arxiv_and_report_numbers() {
        let doc = run(
            arxiv_or_report_number,
            &Document::default(),
            RawField::data("037", ' ', ' ')
                .subfield('9', "arXiv")
                .subfield('a', "arXiv:1808.02335")
                .subfield('c', "hep-th"),
        );
        assert_eq!(doc.alternative_identifiers[0].scheme, "ARXIV");
        assert_eq!(doc.keywords[0].value, "hep-th");
        let err = arxiv_or_report_number(&Document::default(), &RawField::data("037", ' ', ' '))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingRequiredField);
    }

    #[test]
    fn test_barcode_or_report_number() {
        let doc = run(
            report_number_or_barcode,
            &Document::default(),
            RawField::data("088", ' ', ' ').subfield('n', "v.1").subfield('x', "80-1209-8"),
        );
        assert_eq!(doc.pending.barcodes[0].volume.as_deref(), Some("1"));
        let doc = run(
            report_number_or_barcode,
            &Document::default(),
            RawField::data("088", ' ', ' ').subfield('a', "CERN-2018-001").subfield('x', "1"),
        );
        assert_eq!(doc.identifiers[0].scheme, IdentifierScheme::ReportNumber);
        assert!(doc.pending.barcodes.is_empty());
    }

    #[test]
    fn test_authors_and_et_al() {
        let doc = run(
            authors,
            &Document::default(),
            RawField::data("700", ' ', ' ')
                .subfield('a', "Ellis, John")
                .subfield('e', "ed.")
                .subfield('u', "CERN")
                .subfield('u', "et al.")
                .subfield('0', "AUTHOR|(INSPIRE)INSPIRE-00123"),
        );
        let author = &doc.authors[0];
        assert_eq!(author.affiliations.len(), 1);
        assert_eq!(author.identifiers[0].scheme, "INSPIRE ID");
        assert!(doc.other_authors);
    }

    #[test]
    fn test_collaboration() {
        let doc = run(
            organisations,
            &Document::default(),
            RawField::data("710", ' ', ' ').subfield('g', "ATLAS Collaboration"),
        );
        assert_eq!(doc.authors[0].full_name, "ATLAS");
        assert_eq!(doc.authors[0].kind, AuthorType::Organisation);
    }

    #[test]
    fn test_collections_and_document_type() {
        let doc = run(
            collections,
            &Document::default(),
            RawField::data("690", 'C', ' ').subfield('a', "BOOK"),
        );
        assert_eq!(doc.document_type, Some(DocumentType::Book));
        let doc = run(
            collections,
            &doc,
            RawField::data("980", ' ', ' ').subfield('a', "LEGSERLIB").subfield('b', "PERI"),
        );
        assert_eq!(doc.tags, vec![Tag::LegalServiceLibrary]);
        let err = collections(&doc, &RawField::data("980", ' ', ' ').subfield('a', "PROCEEDINGS"))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ManualImportRequired);
        let err = collections(&Document::default(), &RawField::data("980", ' ', ' ').subfield('a', "ARTICLE"))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedValue);
    }

    #[test]
    fn test_conference() {
        let doc = run(
            conference,
            &Document::default(),
            RawField::data("111", ' ', ' ')
                .subfield('a', "2nd Workshop on X")
                .subfield('c', "Bari, Italy")
                .subfield('9', "20040621")
                .subfield('z', "20040621")
                .subfield('w', "IT"),
        );
        let conf = &doc.conference_info[0];
        assert_eq!(conf.dates.as_deref(), Some("2004-06-21 - 2004-06-21"));
        assert_eq!(conf.country.as_deref(), Some("ITA"));
        assert_eq!(doc.migration.conference_title.as_deref(), Some("2nd Workshop on X"));
        let err = conference(
            &Document::default(),
            &RawField::data("111", ' ', ' ')
                .subfield('a', "X")
                .subfield('c', "Y")
                .subfield('9', "someday")
                .subfield('z', "20040621"),
        )
        .unwrap_err();
        assert_eq!(err.subfield.as_deref(), Some("9 or z"));
    }

    #[test]
    fn test_title_twice() {
        let doc = run(title, &Document::default(), RawField::data("245", ' ', ' ').subfield('a', "T").subfield('b', "S"));
        assert_eq!(doc.alternative_titles[0].kind, TitleType::Subtitle);
        assert!(title(&doc, &RawField::data("245", ' ', ' ').subfield('a', "U")).is_err());
    }

    #[test]
    fn test_volume_title() {
        let doc = run(
            volume_or_alternative_title,
            &Document::default(),
            RawField::data("246", ' ', ' ').subfield('n', "v.2").subfield('p', "Termologia"),
        );
        assert_eq!(doc.migration.volumes[0].volume, "2");
        assert!(doc.migration.is_multipart);
        let err = volume_or_alternative_title(
            &Document::default(),
            &RawField::data("246", ' ', ' ').subfield('n', "v.2"),
        )
        .unwrap_err();
        assert_eq!(err.subfield.as_deref(), Some("n or p"));
    }

    #[test]
    fn test_imprint_and_edition() {
        let doc = run(
            imprint,
            &Document::default(),
            RawField::data("260", ' ', ' ')
                .subfield('a', "Geneva")
                .subfield('b', "CERN")
                .subfield('c', "2013")
                .subfield('g', "repr. 2015"),
        );
        assert_eq!(doc.publication_year.as_deref(), Some("2013"));
        assert_eq!(doc.imprint.as_ref().unwrap().reprint.as_deref(), Some("2015"));
        let doc = run(edition, &doc, RawField::data("250", ' ', ' ').subfield('a', "3rd ed."));
        assert_eq!(doc.edition.as_deref(), Some("3rd"));
    }

    #[test]
    fn test_pages() {
        let doc = run(
            number_of_pages,
            &Document::default(),
            RawField::data("300", ' ', ' ').subfield('a', "373 p ; 1 CD-ROM"),
        );
        assert_eq!(doc.number_of_pages.as_deref(), Some("373"));
        assert_eq!(doc.physical_description.as_deref(), Some("1 CD-ROM"));
        let skip = number_of_pages(&Document::default(), &RawField::data("300", ' ', ' ').subfield('a', "mult. p"))
            .unwrap();
        assert_eq!(skip, RuleOutcome::Skip);
    }

    #[test]
    fn test_table_of_content() {
        let doc = run(
            table_of_content,
            &Document::default(),
            RawField::data("505", '0', ' ').subfield('a', "Intro -- Theory; Practice"),
        );
        assert_eq!(doc.table_of_content, vec!["Intro", "Theory", "Practice"]);
        let err = table_of_content(&Document::default(), &RawField::data("505", '0', ' '))
            .unwrap_err();
        assert_eq!(err.subfield.as_deref(), Some("a or t"));
    }

    #[test]
    fn test_abstracts() {
        let field = RawField::data("520", ' ', ' ').subfield('a', "First");
        let doc = run(abstracts, &Document::default(), field);
        let doc = run(abstracts, &doc, RawField::data("520", ' ', ' ').subfield('a', "Second"));
        assert_eq!(doc.r#abstract.as_deref(), Some("First"));
        assert_eq!(doc.alternative_abstracts, vec!["Second"]);
    }

    #[test]
    fn test_legacy_source_stamp() {
        let doc = run(
            source_or_note,
            &Document::default(),
            RawField::data("595", ' ', ' ').subfield('a', "SPR201809"),
        );
        assert_eq!(doc.source.as_deref(), Some("SPR"));
        assert_eq!(doc.created, NaiveDate::from_ymd_opt(2018, 9, 1));
        let doc = run(
            source_or_note,
            &Document::default(),
            RawField::data("595", ' ', ' ').subfield('a', "Checked by JD"),
        );
        assert_eq!(doc.internal_notes[0].value, "Checked by JD");
    }

    #[test]
    fn test_creation_week() {
        let doc = run(
            created,
            &Document::default(),
            RawField::data("916", ' ', ' ').subfield('s', "h").subfield('w', "201829"),
        );
        assert_eq!(doc.created, NaiveDate::from_ymd_opt(2018, 7, 16));
        assert_eq!(doc.created_by.as_ref().unwrap().kind, CreatedByType::User);
        let doc = run(created, &doc, RawField::data("916", ' ', ' ').subfield('w', "201901"));
        assert_eq!(doc.created, NaiveDate::from_ymd_opt(2018, 7, 16));
        let doc = run(
            created,
            &Document::default(),
            RawField::data("916", ' ', ' ').subfield('w', "299901"),
        );
        assert_eq!(doc.created, Some(Local::now().date_naive()));
    }

    #[test]
    fn test_relations_are_parked() {
        let doc = run(
            relations,
            &Document::default(),
            RawField::data("775", ' ', ' ').subfield('w', "748392").subfield('x', "language"),
        );
        let pending = &doc.pending.relations[0];
        assert_eq!(pending.tag, "775__");
        assert_eq!(pending.recid.as_deref(), Some("748392"));
        assert_eq!(crate::vocabulary::RELATION_TYPES.lookup("language"), Some(RelationType::Language));
    }

    #[test]
    fn test_license_material() {
        let doc = run(
            licenses,
            &Document::default(),
            RawField::data("540", ' ', ' ').subfield('a', "CC-BY-4.0").subfield('3', "Publication"),
        );
        assert_eq!(doc.licenses[0].material.as_deref(), Some("publication"));
        let err = licenses(&Document::default(), &RawField::data("540", ' ', ' ').subfield('3', "poster"))
            .unwrap_err();
        assert_eq!(err.subfield.as_deref(), Some("3"));
    }

    #[test]
    fn test_rule_set_builds() {
        let registry = crate::registry::RuleRegistry::build(&[&rules()]).unwrap();
        assert!(registry.lookup("8564_").is_some());
        assert!(registry.lookup("690C_").is_some());
        assert!(registry.lookup("999C5").is_none());
    }
}
