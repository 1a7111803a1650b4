//! Translation models and their selection.
//!
//! A [`Model`] bundles a match predicate, a seed document, a resolved rule
//! registry and an ignore list, i.e. everything [`Overdo`] needs for one
//! record shape of one provider. [`ModelCatalogue::standard`] builds the
//! models of every configured provider once per process; they are read-only
//! afterwards and shared between worker threads.
//!
//! Selection is per provider: query models are tried in registration order
//! and the first match wins. When none matches, the provider's fallback model
//! (if any) is used.

use crate::document::{Document, DocumentType, EItemBlock, ModeOfIssuance, RecordType};
use crate::engine::Overdo;
use crate::error::{IngestError, Result};
use crate::query::Query;
use crate::record::RawRecord;
use crate::registry::{RuleRegistry, RuleSet};
use crate::rules::cds::{
    self, base, book, journal, multipart, serial, standard, DOCUMENT_IGNORE_FIELDS,
};
use crate::rules::{ebl, safari, springer};
use log::debug;

const JOURNAL_QUERY: &str = "003:SzGeCERN 980__:PERI -980__:DELETED -980__:MIGRATED";
const MULTIPART_QUERY: &str = "003:SzGeCERN 596__:MULTIVOLUMES -980__:DELETED -980__:MIGRATED";
const STANDARD_QUERY: &str =
    "003:SzGeCERN (690C_:STANDARD OR 980__:STANDARD) -980__:DELETED -980__:MIGRATED";
const SNV_QUERY: &str = "003:SNV (690C_:STANDARD OR 980__:STANDARD)";
const BOOK_QUERY: &str = r#"(690C_:BOOK OR 690C_:"YELLOW REPORT" OR 980__:PROCEEDINGS OR 980__:PERI OR 980__:BOOK OR 697C_:LEGSERLIB) -980__:DELETED -980__:MIGRATED -980__:STANDARD -690C_:STANDARD -596__:MULTIVOLUMES"#;

/// How a model is picked for a record.
#[derive(Debug, Clone)]
pub enum Selector {
    /// Records matching the query.
    Query(Query),
    /// Every record of the provider that no query model took.
    Fallback,
    /// Never selected automatically; only reachable by name.
    Explicit,
}

/// One translation model.
#[derive(Debug, Clone)]
pub struct Model {
    name: &'static str,
    provider: &'static str,
    selector: Selector,
    overdo: Overdo,
    proceedings: bool,
    media_from_leader: bool,
    primary_eitem: bool,
}

impl Model {
    /// Model of `provider` translating with `overdo`.
    #[must_use]
    pub fn new(name: &'static str, provider: &'static str, selector: Selector, overdo: Overdo) -> Self {
        Model {
            name,
            provider,
            selector,
            overdo,
            proceedings: false,
            media_from_leader: false,
            primary_eitem: false,
        }
    }

    /// Mark the model as one whose records may be conference proceedings.
    #[must_use]
    pub fn proceedings(mut self) -> Self {
        self.proceedings = true;
        self
    }

    /// Read the medium of each record from its leader.
    #[must_use]
    pub fn media_from_leader(mut self) -> Self {
        self.media_from_leader = true;
        self
    }

    /// Build the `_eitem` block from the first external or proxy item.
    #[must_use]
    pub fn primary_eitem(mut self) -> Self {
        self.primary_eitem = true;
        self
    }

    /// Model name, e.g. `cds.book`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Provider the model belongs to.
    #[must_use]
    pub fn provider(&self) -> &'static str {
        self.provider
    }

    /// Selection rule.
    #[must_use]
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Translation engine of the model.
    #[must_use]
    pub fn overdo(&self) -> &Overdo {
        &self.overdo
    }

    /// Whether a missing title may be taken from the conference.
    #[must_use]
    pub fn is_proceedings(&self) -> bool {
        self.proceedings
    }

    /// Whether the record leader decides the medium.
    #[must_use]
    pub fn reads_media_type(&self) -> bool {
        self.media_from_leader
    }

    /// Whether the `_eitem` block is taken from the item channels.
    #[must_use]
    pub fn builds_primary_eitem(&self) -> bool {
        self.primary_eitem
    }

    /// Whether the model's query accepts the record. Fallback and explicit
    /// models never match by query.
    #[must_use]
    pub fn matches(&self, record: &RawRecord) -> bool {
        match &self.selector {
            Selector::Query(query) => query.matches(record),
            Selector::Fallback | Selector::Explicit => false,
        }
    }
}

/// All models, in selection order.
#[derive(Debug, Clone, Default)]
pub struct ModelCatalogue {
    models: Vec<Model>,
}

fn document_defaults() -> Document {
    Document::default()
}

fn journal_defaults() -> Document {
    let mut doc = Document::default();
    doc.migration.record_type = RecordType::Journal;
    doc.migration.is_multipart = false;
    doc
}

fn multipart_defaults() -> Document {
    let mut doc = Document::default();
    doc.migration.record_type = RecordType::Multipart;
    doc.mode_of_issuance = Some(ModeOfIssuance::MultipartMonograph);
    doc
}

fn serial_defaults() -> Document {
    let mut doc = Document::default();
    doc.migration.record_type = RecordType::Serial;
    doc.mode_of_issuance = Some(ModeOfIssuance::Serial);
    doc
}

fn ebook_defaults() -> Document {
    Document {
        document_type: Some(DocumentType::Book),
        ..Document::default()
    }
}

fn snv_defaults() -> Document {
    Document {
        eitem: Some(EItemBlock {
            kind: Some("e-book".to_string()),
            ..EItemBlock::default()
        }),
        ..Document::default()
    }
}

fn engine(layers: &[&RuleSet], ignore: &[&str], defaults: fn() -> Document) -> Result<Overdo> {
    Ok(Overdo::new(RuleRegistry::build(layers)?, ignore, defaults))
}

fn query(source: &str) -> Result<Selector> {
    Ok(Selector::Query(Query::parse(source)?))
}

impl ModelCatalogue {
    /// Empty catalogue.
    #[must_use]
    pub fn new() -> Self {
        ModelCatalogue::default()
    }

    /// Models of every known provider.
    ///
    /// CDS records try journal, multipart, standard and book in that order
    /// and fall back to the generic document model. The serial model is only
    /// reachable by name. SNV delivers standards only, through the CDS
    /// base rules.
    ///
    /// # Errors
    ///
    /// `Configuration` if a rule pattern or model query does not parse.
    pub fn standard() -> Result<Self> {
        let base = base::rules();
        let document_ignore = cds::ignore_fields(DOCUMENT_IGNORE_FIELDS);
        let mut catalogue = ModelCatalogue::new();

        catalogue.register(Model::new(
            "cds.journal",
            "cds",
            query(JOURNAL_QUERY)?,
            engine(
                &[&journal::rules()],
                &cds::ignore_fields(journal::JOURNAL_IGNORE_FIELDS),
                journal_defaults,
            )?,
        ));
        catalogue.register(Model::new(
            "cds.multipart",
            "cds",
            query(MULTIPART_QUERY)?,
            engine(
                &[&multipart::rules()],
                &cds::ignore_fields(multipart::MULTIPART_IGNORE_FIELDS),
                multipart_defaults,
            )?,
        ));
        catalogue.register(Model::new(
            "cds.standard",
            "cds",
            query(STANDARD_QUERY)?,
            engine(&[&base, &standard::rules()], &document_ignore, document_defaults)?,
        ));
        catalogue.register(
            Model::new(
                "cds.book",
                "cds",
                query(BOOK_QUERY)?,
                engine(&[&base, &book::rules()], &document_ignore, document_defaults)?,
            )
            .proceedings(),
        );
        catalogue.register(
            Model::new(
                "cds.document",
                "cds",
                Selector::Fallback,
                engine(&[&base], &document_ignore, document_defaults)?,
            )
            .proceedings(),
        );
        catalogue.register(Model::new(
            "cds.serial",
            "cds",
            Selector::Explicit,
            engine(
                &[&serial::rules()],
                &cds::ignore_fields(multipart::MULTIPART_IGNORE_FIELDS),
                serial_defaults,
            )?,
        ));

        catalogue.register(
            Model::new(
                "springer",
                "springer",
                query("003:DE-He213")?,
                engine(&[&springer::rules()], springer::SPRINGER_IGNORE_FIELDS, ebook_defaults)?,
            )
            .media_from_leader(),
        );
        catalogue.register(
            Model::new(
                "ebl",
                "ebl",
                query("003:MiAaPQ")?,
                engine(&[&ebl::rules()], ebl::EBL_IGNORE_FIELDS, ebook_defaults)?,
            )
            .media_from_leader(),
        );
        catalogue.register(
            Model::new(
                "safari",
                "safari",
                query("003:CaSebORM")?,
                engine(&[&safari::rules()], safari::SAFARI_IGNORE_FIELDS, ebook_defaults)?,
            )
            .media_from_leader(),
        );
        catalogue.register(
            Model::new(
                "snv.standard",
                "snv",
                query(SNV_QUERY)?,
                engine(
                    &[&base, &standard::rules()],
                    &cds::ignore_fields(&["001"]),
                    snv_defaults,
                )?,
            )
            .primary_eitem(),
        );
        Ok(catalogue)
    }

    /// Append a model; it is tried after every model registered before it.
    pub fn register(&mut self, model: Model) {
        self.models.push(model);
    }

    /// Registered models in selection order.
    #[must_use]
    pub fn models(&self) -> &[Model] {
        &self.models
    }

    /// Model by name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&Model> {
        self.models.iter().find(|m| m.name == name)
    }

    /// Pick the model for a record of `provider`.
    ///
    /// # Errors
    ///
    /// `RecordModelMissing` when no query model matches and the provider has
    /// no fallback.
    pub fn select(&self, record: &RawRecord, provider: &str) -> Result<&Model> {
        let mut fallback = None;
        let mut selected = None;
        for model in self.models.iter().filter(|m| m.provider == provider) {
            if model.matches(record) {
                selected = Some(model);
                break;
            }
            if fallback.is_none() && matches!(model.selector, Selector::Fallback) {
                fallback = Some(model);
            }
        }
        let model = selected.or(fallback).ok_or(IngestError::RecordModelMissing)?;
        debug!(
            "record {} -> model {}",
            record.recid().unwrap_or("?"),
            model.name
        );
        Ok(model)
    }
}
