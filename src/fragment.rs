//! Rule output fragments and how they merge into a [`Document`].
//!
//! A rule never touches the document it is given. It returns zero or more
//! [`Fragment`]s, and the engine merges them in visitation order:
//!
//! - [`Merge::Assign`] replaces the property (lists are replaced wholesale).
//! - [`Merge::Append`] extends lists. Lists that must stay unique
//!   (`identifiers`, `alternative_identifiers`, `subjects`, `keywords`,
//!   `alternative_titles`, `languages`, `tags`, ...) skip values already
//!   present. Appending to `note` joins with `" \n"`.
//!
//! Sidecar fragments ([`MigrationFragment`]) always accumulate.

use crate::document::{
    AlternativeIdentifier, AlternativeTitle, Author, ConferenceInfo, Copyright, CreatedBy,
    Document, DocumentType, EItemBlock, ElectronicHolding, Extensions, Identifier, Imprint,
    InternalNote, Item, ItemMedium, JournalRef, Keyword, License, ModeOfIssuance, PendingBarcode,
    PendingDoi, PendingRelation, PendingUrl, PublicationInfo, RecordType, SerialRef, Subject, Tag,
    Url, Volume, VolumeIdentifiers,
};
use chrono::NaiveDate;

/// How a fragment combines with the current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Merge {
    /// Replace the current value.
    #[default]
    Assign,
    /// Extend the current value.
    Append,
}

/// A value destined for one sidecar property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationFragment {
    /// Record type.
    RecordType(RecordType),
    /// Volume contribution.
    Volume(Volume),
    /// Identifiers of a volume.
    VolumeIdentifiers(VolumeIdentifiers),
    /// Physical item.
    Item(Item),
    /// Series membership.
    Serial(SerialRef),
    /// Parent journal.
    Journal(JournalRef),
    /// Conference name.
    ConferenceTitle(String),
    /// Parent multipart.
    MultipartId(String),
    /// Multi-volume set.
    MultivolumeRecord(bool),
    /// Multipart monograph detected.
    IsMultipart(bool),
    /// Yellow report series.
    YellowReport(bool),
    /// Open access for the whole record.
    OpenAccess(bool),
    /// Internal note for electronic items.
    EItemsInternalNote(String),
    /// Medium of an item.
    ItemMedium(ItemMedium),
    /// Electronic holding of a journal.
    ElectronicHolding(ElectronicHolding),
    /// Print holding of a journal.
    PrintHolding(String),
    /// URL for the classifier.
    PendingUrl(PendingUrl),
    /// DOI for the electronic item synthesiser.
    PendingDoi(PendingDoi),
    /// Barcode for volume correlation.
    PendingBarcode(PendingBarcode),
    /// Relation for typing.
    PendingRelation(PendingRelation),
}

/// A value destined for one document property.
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    /// `provider_recid`.
    ProviderRecid(String),
    /// `legacy_recid`.
    LegacyRecid(u64),
    /// `agency_code`.
    AgencyCode(String),
    /// `title`.
    Title(String),
    /// `alternative_titles`.
    AlternativeTitles(Vec<AlternativeTitle>),
    /// `abbreviated_title`.
    AbbreviatedTitle(String),
    /// `authors`.
    Authors(Vec<Author>),
    /// Alternative name of the author at `index`.
    AuthorAlternativeName {
        /// Position in `authors`.
        index: usize,
        /// Name form.
        name: String,
    },
    /// `other_authors`.
    OtherAuthors(bool),
    /// `identifiers`.
    Identifiers(Vec<Identifier>),
    /// `alternative_identifiers`.
    AlternativeIdentifiers(Vec<AlternativeIdentifier>),
    /// `subjects`.
    Subjects(Vec<Subject>),
    /// `keywords`.
    Keywords(Vec<Keyword>),
    /// `languages`.
    Languages(Vec<String>),
    /// `publication_year`.
    PublicationYear(String),
    /// `imprint`.
    Imprint(Imprint),
    /// `publisher`.
    Publisher(String),
    /// `edition`.
    Edition(String),
    /// `volume`.
    Volume(String),
    /// `number_of_pages`.
    NumberOfPages(String),
    /// `number_of_volumes`.
    NumberOfVolumes(String),
    /// `physical_description`.
    PhysicalDescription(String),
    /// `abstract`.
    Abstract(String),
    /// `alternative_abstracts`.
    AlternativeAbstracts(Vec<String>),
    /// `table_of_content`.
    TableOfContent(Vec<String>),
    /// `note`.
    Note(String),
    /// `internal_notes`.
    InternalNotes(Vec<InternalNote>),
    /// `urls`.
    Urls(Vec<Url>),
    /// `publication_info`.
    PublicationInfo(Vec<PublicationInfo>),
    /// `conference_info`.
    ConferenceInfo(Vec<ConferenceInfo>),
    /// `licenses`.
    Licenses(Vec<License>),
    /// `copyrights`.
    Copyrights(Vec<Copyright>),
    /// `extensions`.
    Extensions(Extensions),
    /// `document_type`.
    DocumentType(DocumentType),
    /// `mode_of_issuance`.
    ModeOfIssuance(ModeOfIssuance),
    /// `tags`.
    Tags(Vec<Tag>),
    /// `source`.
    Source(String),
    /// `_created`.
    Created(NaiveDate),
    /// `created_by`.
    CreatedBy(CreatedBy),
    /// `_eitem.urls`.
    EItemUrls(Vec<Url>),
    /// `_eitem.internal_notes`.
    EItemNote(String),
    /// A sidecar property.
    Migration(MigrationFragment),
}

/// One property value produced by a rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    /// Target property and value.
    pub property: Property,
    /// Merge mode; `None` uses the mode declared by the rule.
    pub merge: Option<Merge>,
}

impl Fragment {
    /// Fragment merged with the rule's mode.
    #[must_use]
    pub fn new(property: Property) -> Self {
        Fragment {
            property,
            merge: None,
        }
    }

    /// Fragment that always extends.
    #[must_use]
    pub fn append(property: Property) -> Self {
        Fragment {
            property,
            merge: Some(Merge::Append),
        }
    }

    /// Fragment that always replaces.
    #[must_use]
    pub fn assign(property: Property) -> Self {
        Fragment {
            property,
            merge: Some(Merge::Assign),
        }
    }

    /// Sidecar fragment.
    #[must_use]
    pub fn migration(fragment: MigrationFragment) -> Self {
        Fragment::new(Property::Migration(fragment))
    }
}

impl From<Property> for Fragment {
    fn from(property: Property) -> Self {
        Fragment::new(property)
    }
}

fn extend_unique<T: PartialEq>(target: &mut Vec<T>, values: Vec<T>) {
    for value in values {
        if !target.contains(&value) {
            target.push(value);
        }
    }
}

fn merge_list<T: PartialEq>(target: &mut Vec<T>, values: Vec<T>, merge: Merge, unique: bool) {
    match merge {
        Merge::Assign => {
            target.clear();
            if unique {
                extend_unique(target, values);
            } else {
                target.extend(values);
            }
        },
        Merge::Append if unique => extend_unique(target, values),
        Merge::Append => target.extend(values),
    }
}

fn eitem_block(doc: &mut Document) -> &mut EItemBlock {
    doc.eitem.get_or_insert_with(EItemBlock::default)
}

impl Document {
    /// Merge one fragment, using `default` when the fragment has no mode.
    pub fn apply(&mut self, fragment: Fragment, default: Merge) {
        let merge = fragment.merge.unwrap_or(default);
        match fragment.property {
            Property::ProviderRecid(v) => self.provider_recid = Some(v),
            Property::LegacyRecid(v) => self.legacy_recid = Some(v),
            Property::AgencyCode(v) => self.agency_code = Some(v),
            Property::Title(v) => self.title = Some(v),
            Property::AlternativeTitles(v) => {
                merge_list(&mut self.alternative_titles, v, merge, true);
            },
            Property::AbbreviatedTitle(v) => self.abbreviated_title = Some(v),
            Property::Authors(v) => merge_list(&mut self.authors, v, merge, false),
            Property::AuthorAlternativeName { index, name } => {
                if let Some(author) = self.authors.get_mut(index) {
                    if !author.alternative_names.contains(&name) {
                        author.alternative_names.push(name);
                    }
                }
            },
            Property::OtherAuthors(v) => self.other_authors = v,
            Property::Identifiers(v) => merge_list(&mut self.identifiers, v, merge, true),
            Property::AlternativeIdentifiers(v) => {
                merge_list(&mut self.alternative_identifiers, v, merge, true);
            },
            Property::Subjects(v) => merge_list(&mut self.subjects, v, merge, true),
            Property::Keywords(v) => merge_list(&mut self.keywords, v, merge, true),
            Property::Languages(v) => merge_list(&mut self.languages, v, merge, true),
            Property::PublicationYear(v) => self.publication_year = Some(v),
            Property::Imprint(v) => self.imprint = Some(v),
            Property::Publisher(v) => self.publisher = Some(v),
            Property::Edition(v) => self.edition = Some(v),
            Property::Volume(v) => self.volume = Some(v),
            Property::NumberOfPages(v) => self.number_of_pages = Some(v),
            Property::NumberOfVolumes(v) => self.number_of_volumes = Some(v),
            Property::PhysicalDescription(v) => self.physical_description = Some(v),
            Property::Abstract(v) => self.r#abstract = Some(v),
            Property::AlternativeAbstracts(v) => {
                merge_list(&mut self.alternative_abstracts, v, merge, true);
            },
            Property::TableOfContent(v) => merge_list(&mut self.table_of_content, v, merge, false),
            Property::Note(v) => {
                self.note = match (merge, self.note.take()) {
                    (Merge::Append, Some(existing)) => Some(format!("{existing} \n{v}")),
                    _ => Some(v),
                };
            },
            Property::InternalNotes(v) => merge_list(&mut self.internal_notes, v, merge, true),
            Property::Urls(v) => merge_list(&mut self.urls, v, merge, true),
            Property::PublicationInfo(v) => merge_list(&mut self.publication_info, v, merge, false),
            Property::ConferenceInfo(v) => merge_list(&mut self.conference_info, v, merge, false),
            Property::Licenses(v) => merge_list(&mut self.licenses, v, merge, true),
            Property::Copyrights(v) => merge_list(&mut self.copyrights, v, merge, true),
            Property::Extensions(v) => self.extensions = v,
            Property::DocumentType(v) => self.document_type = Some(v),
            Property::ModeOfIssuance(v) => self.mode_of_issuance = Some(v),
            Property::Tags(v) => merge_list(&mut self.tags, v, merge, true),
            Property::Source(v) => self.source = Some(v),
            Property::Created(v) => self.created = Some(v),
            Property::CreatedBy(v) => self.created_by = Some(v),
            Property::EItemUrls(v) => merge_list(&mut eitem_block(self).urls, v, merge, true),
            Property::EItemNote(v) => eitem_block(self).internal_notes = Some(v),
            Property::Migration(m) => self.apply_migration(m),
        }
    }

    fn apply_migration(&mut self, fragment: MigrationFragment) {
        let migration = &mut self.migration;
        match fragment {
            MigrationFragment::RecordType(v) => migration.record_type = v,
            MigrationFragment::Volume(v) => migration.volumes.push(v),
            MigrationFragment::VolumeIdentifiers(v) => migration.volumes_identifiers.push(v),
            MigrationFragment::Item(v) => {
                if !migration.items.contains(&v) {
                    migration.items.push(v);
                }
            },
            MigrationFragment::Serial(v) => {
                if !migration.serials.contains(&v) {
                    migration.serials.push(v);
                }
                migration.has_serial = true;
            },
            MigrationFragment::Journal(v) => {
                if !migration.journal_record_legacy_recids.contains(&v) {
                    migration.journal_record_legacy_recids.push(v);
                }
                migration.has_journal = true;
            },
            MigrationFragment::ConferenceTitle(v) => migration.conference_title = Some(v),
            MigrationFragment::MultipartId(v) => migration.multipart_id = Some(v),
            MigrationFragment::MultivolumeRecord(v) => migration.multivolume_record = Some(v),
            MigrationFragment::IsMultipart(v) => migration.is_multipart = v,
            MigrationFragment::YellowReport(v) => migration.is_yellow_report = Some(v),
            MigrationFragment::OpenAccess(v) => migration.eitems_open_access = Some(v),
            MigrationFragment::EItemsInternalNote(v) => {
                migration.eitems_internal_notes = Some(match migration.eitems_internal_notes.take() {
                    Some(existing) => format!("{existing}; {v}"),
                    None => v,
                });
            },
            MigrationFragment::ItemMedium(v) => {
                if !migration.item_medium.contains(&v) {
                    migration.item_medium.push(v);
                }
                migration.has_medium = true;
            },
            MigrationFragment::ElectronicHolding(v) => migration.electronic_items.push(v),
            MigrationFragment::PrintHolding(v) => migration.print_holdings.push(v),
            MigrationFragment::PendingUrl(v) => self.pending.urls.push(v),
            MigrationFragment::PendingDoi(v) => self.pending.dois.push(v),
            MigrationFragment::PendingBarcode(v) => self.pending.barcodes.push(v),
            MigrationFragment::PendingRelation(v) => self.pending.relations.push(v),
        }
    }
}
