//! The normalized document produced by translation.
//!
//! [`Document`] is a typed record with optional properties. Everything that
//! cannot yet be resolved to a final reference (volumes, items, serials,
//! related records, electronic items) lives in the [`Migration`] sidecar,
//! serialized as `_migration` and always present.
//!
//! Rules never write to a document directly: they return fragments that the
//! engine merges (see [`crate::fragment`]). Data that only coalescers consume
//! is parked in [`Pending`], which is never serialized.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

fn is_false(b: &bool) -> bool {
    !*b
}

// ============================================================================
// Enumerations
// ============================================================================

/// Kind of alternative title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TitleType {
    /// Other title of the same work.
    AlternativeTitle,
    /// Subtitle.
    Subtitle,
    /// Translated title.
    TranslatedTitle,
    /// Translated subtitle.
    TranslatedSubtitle,
    /// Abbreviated title.
    Abbreviation,
}

/// Kind of contributor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthorType {
    /// A person.
    Person,
    /// A corporate body or collaboration.
    Organisation,
}

/// Contributor role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Author.
    Author,
    /// Editor.
    Editor,
    /// Thesis supervisor.
    Supervisor,
    /// Illustrator.
    Illustrator,
}

/// Scheme of a standard identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IdentifierScheme {
    /// ISBN.
    Isbn,
    /// ISSN.
    Issn,
    /// DOI.
    Doi,
    /// Institutional report number.
    ReportNumber,
    /// Standard number (ISO, IEC, ...).
    StandardNumber,
}

/// Physical or electronic form an identifier applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Material {
    /// Electronic version.
    Digital,
    /// Printed version.
    PrintVersion,
    /// Audiobook.
    Audiobook,
    /// CD-ROM.
    Cdrom,
    /// DVD.
    Dvd,
}

/// Subject classification scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubjectScheme {
    /// Library of Congress classification.
    Loc,
    /// Dewey decimal classification.
    Dewey,
    /// Universal decimal classification.
    Udc,
    /// International classification for standards.
    Ics,
}

/// Document type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    /// Book.
    Book,
    /// Conference proceedings.
    Proceedings,
    /// Standard.
    Standard,
    /// Issue of a periodical.
    PeriodicalIssue,
    /// Audio or video material.
    Multimedia,
}

/// Mode of issuance for series-typed records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModeOfIssuance {
    /// Monograph in several volumes.
    MultipartMonograph,
    /// Serial.
    Serial,
}

/// Collection tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tag {
    /// Legal service library.
    LegalServiceLibrary,
    /// Suggested for acquisition.
    BookSuggestion,
    /// Design report.
    DesignReport,
    /// Legal service library, international law.
    #[serde(rename = "LEGSERLIBINTLAW")]
    LegserlibIntLaw,
    /// Legal service library, legal research.
    #[serde(rename = "LEGSERLIBLEGRES")]
    LegserlibLegRes,
    /// Legal service library, civil law.
    #[serde(rename = "LEGSERLIBCIVLAW")]
    LegserlibCivLaw,
    /// Bookshop.
    Bookshop,
}

/// How the record entered the legacy catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreatedByType {
    /// Catalogued by hand.
    User,
    /// Loaded by the batch uploader.
    Batchuploader,
    /// Created by a previous migration.
    Migration,
}

/// Record type recorded in the sidecar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    /// Single document.
    #[default]
    Document,
    /// Multipart monograph.
    Multipart,
    /// Serial.
    Serial,
    /// Journal.
    Journal,
}

/// Relation between records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationType {
    /// Other edition.
    Edition,
    /// Other language.
    Language,
    /// Preceding or succeeding title.
    Sequence,
    /// Anything else.
    Other,
}

/// Direction of a sequence relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceOrder {
    /// The related record precedes this one.
    Previous,
    /// The related record follows this one.
    Next,
}

/// Physical medium of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Medium {
    /// Paper.
    Paper,
    /// CD-ROM.
    Cdrom,
    /// DVD.
    Dvd,
    /// VHS cassette.
    Vhs,
}

// ============================================================================
// Property values
// ============================================================================

/// Alternative title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlternativeTitle {
    /// Title text.
    pub value: String,
    /// Kind of title.
    #[serde(rename = "type")]
    pub kind: TitleType,
    /// ISO 639-3 language of translated titles.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub language: Option<String>,
}

/// Identifier of an author.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthorIdentifier {
    /// Scheme such as `ORCID` or `INSPIRE ID`.
    pub scheme: String,
    /// Identifier value.
    pub value: String,
}

/// Affiliation of an author.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Affiliation {
    /// Institution name.
    pub name: String,
}

/// Contributor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Full name as catalogued.
    pub full_name: String,
    /// Person or organisation.
    #[serde(rename = "type")]
    pub kind: AuthorType,
    /// Roles, in order of appearance.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub roles: Vec<Role>,
    /// Affiliations.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub affiliations: Vec<Affiliation>,
    /// Author identifiers.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub identifiers: Vec<AuthorIdentifier>,
    /// Other name forms.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub alternative_names: Vec<String>,
}

impl Author {
    /// Author with only a name and a type.
    #[must_use]
    pub fn new(full_name: impl Into<String>, kind: AuthorType) -> Self {
        Author {
            full_name: full_name.into(),
            kind,
            roles: Vec::new(),
            affiliations: Vec::new(),
            identifiers: Vec::new(),
            alternative_names: Vec::new(),
        }
    }
}

/// Standard identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier {
    /// Identifier value.
    pub value: String,
    /// Scheme.
    pub scheme: IdentifierScheme,
    /// Form the identifier applies to.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub material: Option<Material>,
}

impl Identifier {
    /// Identifier without material.
    #[must_use]
    pub fn new(value: impl Into<String>, scheme: IdentifierScheme) -> Self {
        Identifier {
            value: value.into(),
            scheme,
            material: None,
        }
    }
}

/// Identifier in an external system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlternativeIdentifier {
    /// Identifier value.
    pub value: String,
    /// Uppercase system name (`ARXIV`, `INSPIRE`, `EBL`, ...).
    pub scheme: String,
}

/// Subject classification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subject {
    /// Class number.
    pub value: String,
    /// Scheme.
    pub scheme: SubjectScheme,
}

/// Free keyword.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Keyword {
    /// Keyword text.
    pub value: String,
    /// Origin of the keyword.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub source: Option<String>,
}

/// Publication statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Imprint {
    /// Place of publication.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub place: Option<String>,
    /// Publisher.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub publisher: Option<String>,
    /// Publication date, `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub date: Option<String>,
    /// Reprint date.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub reprint: Option<String>,
}

/// Internal note.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InternalNote {
    /// Note text.
    pub value: String,
}

/// Link with an optional label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Url {
    /// URL.
    pub value: String,
    /// Label.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
}

/// Host publication of an article or chapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationInfo {
    /// Page or page range.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub pages: Option<String>,
    /// Year of publication.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub year: Option<i64>,
    /// Journal title.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub journal_title: Option<String>,
    /// Journal issue.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub journal_issue: Option<String>,
    /// Journal volume.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub journal_volume: Option<String>,
    /// Free text.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub note: Option<String>,
}

impl PublicationInfo {
    /// True when no property is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == PublicationInfo::default()
    }
}

/// Identifier of a conference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConferenceIdentifier {
    /// Scheme (`CERN`, `INSPIRE_CNUM`).
    pub scheme: String,
    /// Identifier value.
    pub value: String,
}

/// Conference the document originates from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConferenceInfo {
    /// Conference name.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub title: Option<String>,
    /// Place.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub place: Option<String>,
    /// `YYYY-MM-DD - YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub dates: Option<String>,
    /// ISO 3166 alpha-3 country.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub country: Option<String>,
    /// Series number(s).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub series: Option<String>,
    /// Acronym.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub acronym: Option<String>,
    /// Identifiers.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub identifiers: Vec<ConferenceIdentifier>,
}

/// License reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseRef {
    /// Known license identifier.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<String>,
    /// License name as catalogued.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    /// License URL.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub url: Option<String>,
}

/// License statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    /// License.
    pub license: LicenseRef,
    /// Material the license applies to.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub material: Option<String>,
    /// Internal note.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub internal_notes: Option<String>,
}

/// Copyright statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Copyright {
    /// Material the copyright applies to.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub material: Option<String>,
    /// Holder.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub holder: Option<String>,
    /// Statement.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub statement: Option<String>,
    /// Year.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub year: Option<i64>,
    /// URL.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub url: Option<String>,
}

/// Institution specific extension properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extensions {
    /// Accelerators, joined with `; `.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub unit_accelerator: Option<String>,
    /// Experiments.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub unit_experiment: Vec<String>,
    /// Projects.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub unit_project: Vec<String>,
    /// Review applicability of a standard.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub standard_review_applicability: Vec<String>,
    /// Validity of a standard.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub standard_review_standard_validity: Option<String>,
    /// Last review date, `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub standard_review_checkdate: Option<String>,
    /// Reviewing expert.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub standard_review_expert: Option<String>,
}

impl Extensions {
    /// True when no extension is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Extensions::default()
    }
}

/// Who created the legacy record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedBy {
    /// Acquisition method.
    #[serde(rename = "type")]
    pub kind: CreatedByType,
    /// Cataloguer email.
    #[serde(rename = "_email", skip_serializing_if = "Option::is_none", default)]
    pub email: Option<String>,
}

/// Electronic item block carried by provider records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EItemBlock {
    /// Media type (`e-book`, `audiobook`, `video`).
    #[serde(rename = "_type", skip_serializing_if = "Option::is_none", default)]
    pub kind: Option<String>,
    /// Access URLs.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub urls: Vec<Url>,
    /// Internal notes.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub internal_notes: Option<String>,
    /// Open access.
    #[serde(default)]
    pub open_access: bool,
}

// ============================================================================
// Migration sidecar
// ============================================================================

/// Per-volume data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    /// Normalised volume token.
    pub volume: String,
    /// First barcode seen for the volume.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub barcode: Option<String>,
    /// Barcodes of further copies of the volume.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub copies: Vec<String>,
    /// Volume title.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub title: Option<String>,
    /// Publication year.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub publication_year: Option<String>,
    /// Physical description.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub physical_description: Option<String>,
    /// Identifiers of the volume.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub identifiers: Vec<Identifier>,
}

impl Volume {
    /// Empty entry for a token.
    #[must_use]
    pub fn new(volume: impl Into<String>) -> Self {
        Volume {
            volume: volume.into(),
            ..Volume::default()
        }
    }
}

/// Identifiers attached to one volume.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeIdentifiers {
    /// Normalised volume token.
    pub volume: String,
    /// Identifiers.
    pub identifiers: Vec<Identifier>,
    /// Physical description of the identified form.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub physical_description: Option<String>,
}

/// Electronic item entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EItem {
    /// Access URL.
    pub url: Url,
    /// Open access flag, for proxy and external items.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub open_access: Option<bool>,
}

/// Electronic items by access channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EItemChannels {
    /// Behind the EBL login.
    pub eitems_ebl: Vec<EItem>,
    /// O'Reilly learning platform.
    pub eitems_safari: Vec<EItem>,
    /// Through the institutional proxy.
    pub eitems_proxy: Vec<EItem>,
    /// Files attached to the record.
    pub eitems_file_links: Vec<EItem>,
    /// Publisher hosted.
    pub eitems_external: Vec<EItem>,
    /// `eitems_ebl` is not empty.
    pub eitems_has_ebl: bool,
    /// `eitems_safari` is not empty.
    pub eitems_has_safari: bool,
    /// `eitems_proxy` is not empty.
    pub eitems_has_proxy: bool,
    /// `eitems_file_links` is not empty.
    pub eitems_has_files: bool,
    /// `eitems_external` is not empty.
    pub eitems_has_external: bool,
}

impl EItemChannels {
    /// Recompute the `eitems_has_*` flags from the lists.
    pub fn sync_flags(&mut self) {
        self.eitems_has_ebl = !self.eitems_ebl.is_empty();
        self.eitems_has_safari = !self.eitems_safari.is_empty();
        self.eitems_has_proxy = !self.eitems_proxy.is_empty();
        self.eitems_has_files = !self.eitems_file_links.is_empty();
        self.eitems_has_external = !self.eitems_external.is_empty();
    }

    /// Total number of electronic items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.eitems_ebl.len()
            + self.eitems_safari.len()
            + self.eitems_proxy.len()
            + self.eitems_file_links.len()
            + self.eitems_external.len()
    }

    /// True when no channel holds an item.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// URLs of one volume.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeUrls {
    /// Normalised volume token.
    pub volume: String,
    /// Plain URLs.
    pub urls: Vec<Url>,
    /// Electronic items of the volume.
    #[serde(rename = "_migration")]
    pub eitems: EItemChannels,
}

/// Physical item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    /// Normalised volume token.
    pub volume: Option<String>,
    /// Barcode.
    pub barcode: String,
}

/// Series the document belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SerialRef {
    /// Series title.
    pub title: String,
    /// Volume within the series.
    pub volume: Option<String>,
    /// ISSN of the series.
    pub issn: Option<String>,
}

/// Relation to another legacy record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Related {
    /// Legacy identifier of the related record.
    pub related_recid: String,
    /// Relation type.
    pub relation_type: RelationType,
    /// Free text description.
    pub relation_description: Option<String>,
    /// Direction of sequence relations.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sequence_order: Option<SequenceOrder>,
}

/// Parent journal of an article.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JournalRef {
    /// Legacy identifier of the journal record.
    pub recid: String,
    /// Volume within the journal.
    pub volume: Option<String>,
}

/// Item medium declared in `340`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemMedium {
    /// Barcode of the item.
    pub barcode: String,
    /// Medium.
    pub medium: Medium,
}

/// Electronic holding of a journal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectronicHolding {
    /// Subscription coverage.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub subscription: Option<String>,
    /// Access URL.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub url: Option<String>,
    /// Access type.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub access_type: Option<String>,
    /// Note.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub note: Option<String>,
}

/// `_migration` sidecar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Migration {
    /// Record type.
    pub record_type: RecordType,
    /// Merged per-volume data.
    pub volumes: Vec<Volume>,
    /// Identifiers per volume.
    pub volumes_identifiers: Vec<VolumeIdentifiers>,
    /// URLs per volume.
    pub volumes_urls: Vec<VolumeUrls>,
    /// Physical items.
    pub items: Vec<Item>,
    /// Series.
    pub serials: Vec<SerialRef>,
    /// `serials` is not empty.
    pub has_serial: bool,
    /// Related records.
    pub related: Vec<Related>,
    /// `related` is not empty.
    pub has_related: bool,
    /// Electronic items of the whole record.
    #[serde(flatten)]
    pub eitems: EItemChannels,
    /// Open access declared for the whole record.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub eitems_open_access: Option<bool>,
    /// Internal notes for electronic items, joined with `; `.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub eitems_internal_notes: Option<String>,
    /// Parent journals.
    pub journal_record_legacy_recids: Vec<JournalRef>,
    /// `journal_record_legacy_recids` is not empty.
    pub has_journal: bool,
    /// Conference name.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub conference_title: Option<String>,
    /// Identifier of the parent multipart.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub multipart_id: Option<String>,
    /// Record describes a multi-volume set.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub multivolume_record: Option<bool>,
    /// Record turned out to be a multipart monograph.
    pub is_multipart: bool,
    /// Record belongs to the yellow report series.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub is_yellow_report: Option<bool>,
    /// Item media.
    pub item_medium: Vec<ItemMedium>,
    /// `item_medium` is not empty.
    pub has_medium: bool,
    /// Electronic holdings of a journal.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub electronic_items: Vec<ElectronicHolding>,
    /// Print holdings of a journal.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub print_holdings: Vec<String>,
}

// ============================================================================
// Pending data
// ============================================================================

/// URL waiting for classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUrl {
    /// URL as catalogued.
    pub url: String,
    /// Label (`$y`).
    pub label: Option<String>,
    /// Volume token when the URL belongs to one volume.
    pub volume: Option<String>,
}

/// DOI waiting for its electronic item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDoi {
    /// DOI.
    pub doi: String,
    /// Qualifier (`$q`).
    pub label: Option<String>,
}

/// Barcode waiting for volume correlation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingBarcode {
    /// Volume token.
    pub volume: Option<String>,
    /// Barcode.
    pub barcode: String,
}

/// Relation field waiting for typing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRelation {
    /// Source tag (`775`, `787`, ...).
    pub tag: String,
    /// `$w`.
    pub recid: Option<String>,
    /// `$x`.
    pub relation: Option<String>,
    /// `$b` or `$i`.
    pub description: Option<String>,
}

/// Fragments parked by rules for the coalescers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pending {
    /// URLs from `856`.
    pub urls: Vec<PendingUrl>,
    /// DOIs from `0247_`.
    pub dois: Vec<PendingDoi>,
    /// Barcodes from `088`.
    pub barcodes: Vec<PendingBarcode>,
    /// Relations in field order.
    pub relations: Vec<PendingRelation>,
}

// ============================================================================
// Document
// ============================================================================

/// Translated document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Provider the record came from.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub provider: Option<String>,
    /// Provider-local identifier.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub provider_recid: Option<String>,
    /// Numeric identifier in the legacy catalogue.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub legacy_recid: Option<u64>,
    /// Agency code of the record.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub agency_code: Option<String>,
    /// Title.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub title: Option<String>,
    /// Other titles.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub alternative_titles: Vec<AlternativeTitle>,
    /// Abbreviated title of a journal.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub abbreviated_title: Option<String>,
    /// Contributors in order.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub authors: Vec<Author>,
    /// Some author entry carried an "et al." marker.
    #[serde(skip_serializing_if = "is_false", default)]
    pub other_authors: bool,
    /// Standard identifiers.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub identifiers: Vec<Identifier>,
    /// External system identifiers.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub alternative_identifiers: Vec<AlternativeIdentifier>,
    /// Subject classifications.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub subjects: Vec<Subject>,
    /// Keywords.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub keywords: Vec<Keyword>,
    /// ISO 639-3 languages.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub languages: Vec<String>,
    /// Year of publication.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub publication_year: Option<String>,
    /// Imprint.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub imprint: Option<Imprint>,
    /// Publisher of a journal.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub publisher: Option<String>,
    /// Edition statement.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub edition: Option<String>,
    /// Volume marker of a single-volume record.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub volume: Option<String>,
    /// Number of pages.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub number_of_pages: Option<String>,
    /// Number of volumes of a multipart.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub number_of_volumes: Option<String>,
    /// Accompanying material.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub physical_description: Option<String>,
    /// Abstract.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub r#abstract: Option<String>,
    /// Further abstracts.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub alternative_abstracts: Vec<String>,
    /// Chapters.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub table_of_content: Vec<String>,
    /// Public note.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub note: Option<String>,
    /// Internal notes.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub internal_notes: Vec<InternalNote>,
    /// Uncategorised links.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub urls: Vec<Url>,
    /// Host publications.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub publication_info: Vec<PublicationInfo>,
    /// Conferences.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub conference_info: Vec<ConferenceInfo>,
    /// Licenses.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub licenses: Vec<License>,
    /// Copyrights.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub copyrights: Vec<Copyright>,
    /// Extensions.
    #[serde(skip_serializing_if = "Extensions::is_empty", default)]
    pub extensions: Extensions,
    /// Document type.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub document_type: Option<DocumentType>,
    /// Mode of issuance.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub mode_of_issuance: Option<ModeOfIssuance>,
    /// Collection tags.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<Tag>,
    /// Acquisition source code.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub source: Option<String>,
    /// Creation date of the legacy record.
    #[serde(rename = "_created", skip_serializing_if = "Option::is_none", default)]
    pub created: Option<NaiveDate>,
    /// Legacy record creator.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub created_by: Option<CreatedBy>,
    /// Electronic item block of provider records.
    #[serde(rename = "_eitem", skip_serializing_if = "Option::is_none", default)]
    pub eitem: Option<EItemBlock>,
    /// Migration sidecar.
    #[serde(rename = "_migration", default)]
    pub migration: Migration,
    /// Record leader marks it deleted.
    #[serde(skip)]
    pub is_deletable: bool,
    /// Data parked for the coalescers.
    #[serde(skip)]
    pub pending: Pending,
}

impl Document {
    /// Compact JSON rendering.
    ///
    /// # Errors
    ///
    /// Returns a serialization error, which cannot happen for well-formed
    /// documents.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Conference title, if any conference was recorded.
    #[must_use]
    pub fn conference_title(&self) -> Option<&str> {
        self.conference_info.first().and_then(|c| c.title.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_keeps_migration() {
        let doc = Document::default();
        let json: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        assert!(json.get("title").is_none());
        assert_eq!(json["_migration"]["record_type"], "document");
        assert_eq!(json["_migration"]["eitems_has_proxy"], false);
        assert!(json["_migration"]["volumes"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_enum_serialization() {
        let id = Identifier {
            value: "9781630814434".to_string(),
            scheme: IdentifierScheme::Isbn,
            material: Some(Material::Digital),
        };
        let json = serde_json::to_value(&id).unwrap();
        assert_eq!(json["scheme"], "ISBN");
        assert_eq!(json["material"], "DIGITAL");
        assert_eq!(
            serde_json::to_value(ModeOfIssuance::MultipartMonograph).unwrap(),
            "MULTIPART_MONOGRAPH"
        );
        assert_eq!(serde_json::to_value(Tag::LegserlibIntLaw).unwrap(), "LEGSERLIBINTLAW");
    }

    #[test]
    fn test_related_serializes_null_description() {
        let related = Related {
            related_recid: "748392".to_string(),
            relation_type: RelationType::Language,
            relation_description: None,
            sequence_order: None,
        };
        let json = serde_json::to_value(&related).unwrap();
        assert_eq!(json["relation_type"], "language");
        assert!(json["relation_description"].is_null());
        assert!(json.get("sequence_order").is_none());
    }

    #[test]
    fn test_created_date_format() {
        let doc = Document {
            created: NaiveDate::from_ymd_opt(2018, 7, 16),
            r#abstract: Some("A".to_string()),
            ..Document::default()
        };
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["_created"], "2018-07-16");
        assert_eq!(json["abstract"], "A");
    }

    #[test]
    fn test_channel_flags() {
        let mut channels = EItemChannels::default();
        channels.eitems_proxy.push(EItem {
            url: Url {
                value: "https://x".to_string(),
                description: None,
            },
            open_access: Some(false),
        });
        channels.sync_flags();
        assert!(channels.eitems_has_proxy);
        assert!(!channels.eitems_has_ebl);
        assert_eq!(channels.len(), 1);
    }
}
