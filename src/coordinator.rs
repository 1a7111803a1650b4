//! Batch import driver.
//!
//! [`Importer`] owns everything that is built once per process (the model
//! catalogue, the handler table, the coalescer) and runs each record through
//! the pipeline:
//!
//! 1. provider checks: the named provider must be configured and the
//!    record's `003` must be its agency code;
//! 2. deletion policy: deletions are honoured only for providers with
//!    `may_delete`, and only for records whose leader marks them deleted;
//! 3. model selection, translation and coalescing;
//! 4. media type from the leader for ebook providers;
//! 5. required-field completeness.
//!
//! Records are independent. A batch is cut into chunks that are translated
//! on a rayon pool; a producer thread sends the outcomes of each chunk, in
//! input order, over a bounded channel to the calling thread, which feeds
//! them to the [`RecordSink`]. The output is therefore identical whatever
//! the number of worker threads.
//!
//! # Examples
//!
//! ```
//! use mrrc_ingest::config::Config;
//! use mrrc_ingest::coordinator::{ImportMode, Importer};
//! use mrrc_ingest::marcxml;
//! use mrrc_ingest::sink::MemorySink;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let xml = r#"<record>
//!   <leader>00000nam a2200000 i 4500</leader>
//!   <controlfield tag="001">2654497</controlfield>
//!   <controlfield tag="003">SzGeCERN</controlfield>
//!   <datafield tag="245" ind1=" " ind2=" "><subfield code="a">Gauge theories</subfield></datafield>
//!   <datafield tag="980" ind1=" " ind2=" "><subfield code="a">BOOK</subfield></datafield>
//! </record>"#;
//!
//! let importer = Importer::new(Config::default())?;
//! let mut sink = MemorySink::new();
//! let records = marcxml::read_records_lenient(xml);
//! let report = importer.import_records(records, "cds", ImportMode::Create, &mut sink)?;
//! assert_eq!(report.succeeded, 1);
//! assert_eq!(sink.upserts[0].title.as_deref(), Some("Gauge theories"));
//! # Ok(())
//! # }
//! ```

use crate::coalesce::Coalescer;
use crate::config::{Config, ProviderConfig};
use crate::document::{Document, DocumentType, EItemBlock, RecordType};
use crate::error::{IngestError, Result, RuleError};
use crate::handlers::{Diagnostic, HandlerTable};
use crate::leader::MediaType;
use crate::marcxml;
use crate::models::{Model, ModelCatalogue};
use crate::record::RawRecord;
use crate::sink::{Failure, RecordSink};
use crossbeam_channel::bounded;
use log::{debug, info, warn};
use rayon::prelude::*;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

const CHUNK_SIZE: usize = 256;
const CHANNEL_CAPACITY: usize = 1024;

/// What a batch does with its records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImportMode {
    /// Create or update documents; deleted records are removed.
    #[default]
    Create,
    /// Remove records; every record must be marked deleted.
    Delete,
}

impl FromStr for ImportMode {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "create" => Ok(ImportMode::Create),
            "delete" => Ok(ImportMode::Delete),
            _ => Err(IngestError::Configuration(format!("unknown import mode '{s}'"))),
        }
    }
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportMode::Create => f.write_str("create"),
            ImportMode::Delete => f.write_str("delete"),
        }
    }
}

/// Shared flag stopping a batch between records.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Fresh token.
    #[must_use]
    pub fn new() -> Self {
        CancellationToken::default()
    }

    /// Stop after the records already in translation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Clear a cancellation.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    /// Whether [`cancel`](Self::cancel) was called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Result of one record.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Translated document, ready for the sink.
    Upserted {
        /// The document.
        document: Box<Document>,
        /// Model that translated it.
        model: &'static str,
        /// Errors recorded in lenient mode, and review notes.
        diagnostics: Vec<Diagnostic>,
        /// Field keys without a rule.
        missing_rules: Vec<String>,
    },
    /// Record to remove.
    Deleted {
        /// Provider name.
        provider: String,
        /// Provider-local identifier.
        provider_recid: String,
    },
    /// Record failed.
    Failed(Failure),
    /// Batch was cancelled before this record.
    Cancelled,
}

/// Counters of one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Records read.
    pub total: usize,
    /// Documents upserted.
    pub succeeded: usize,
    /// Records deleted.
    pub deleted: usize,
    /// Records failed.
    pub failed: usize,
    /// Records skipped after cancellation.
    pub cancelled: usize,
}

impl BatchReport {
    fn count(&mut self, outcome: &Outcome) {
        self.total += 1;
        match outcome {
            Outcome::Upserted { .. } => self.succeeded += 1,
            Outcome::Deleted { .. } => self.deleted += 1,
            Outcome::Failed(_) => self.failed += 1,
            Outcome::Cancelled => self.cancelled += 1,
        }
    }
}

/// Import coordinator.
#[derive(Debug)]
pub struct Importer {
    config: Config,
    catalogue: ModelCatalogue,
    handlers: HandlerTable,
    coalescer: Coalescer,
    cancel: CancellationToken,
    pool: Option<rayon::ThreadPool>,
}

fn emit<S: RecordSink + ?Sized>(sink: &mut S, outcome: &Outcome) -> Result<()> {
    match outcome {
        Outcome::Upserted {
            document,
            model,
            missing_rules,
            ..
        } => {
            for key in missing_rules {
                sink.missing_rule(model, key)?;
            }
            sink.upsert(document)
        },
        Outcome::Deleted {
            provider,
            provider_recid,
        } => sink.delete(provider, provider_recid),
        Outcome::Failed(failure) => sink.record_failure(failure),
        Outcome::Cancelled => Ok(()),
    }
}

impl Importer {
    /// Importer with the standard model catalogue.
    ///
    /// # Errors
    ///
    /// `Configuration` when the configuration is invalid, a model fails to
    /// build or the worker pool cannot be created.
    pub fn new(config: Config) -> Result<Self> {
        Importer::with_catalogue(config, ModelCatalogue::standard()?)
    }

    /// Importer over a custom catalogue.
    ///
    /// # Errors
    ///
    /// As [`Importer::new`].
    pub fn with_catalogue(config: Config, catalogue: ModelCatalogue) -> Result<Self> {
        config.validate()?;
        let pool = if config.threads > 0 {
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(config.threads)
                    .build()
                    .map_err(|e| IngestError::Configuration(e.to_string()))?,
            )
        } else {
            None
        };
        Ok(Importer {
            handlers: HandlerTable::for_mode(config.strict_mode),
            coalescer: Coalescer::new(&config.doi_resolver_prefix, &config.proxy_prefix),
            catalogue,
            config,
            cancel: CancellationToken::new(),
            pool,
        })
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Models in use.
    #[must_use]
    pub fn catalogue(&self) -> &ModelCatalogue {
        &self.catalogue
    }

    /// Token cancelling this importer's batches.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Whether a file may be imported.
    #[must_use]
    pub fn allowed_file(&self, path: &Path) -> bool {
        self.config.allowed_file(path)
    }

    fn provider(&self, name: &str) -> Result<&ProviderConfig> {
        self.config
            .provider(name)
            .ok_or_else(|| IngestError::UnknownProvider {
                provider: name.to_string(),
            })
    }

    /// Translate or delete one record.
    ///
    /// # Errors
    ///
    /// Any policy, translation or completeness failure of the record.
    pub fn import_record(&self, record: &RawRecord, provider: &str, mode: ImportMode) -> Result<Outcome> {
        let settings = self.provider(provider)?;
        if let Some(found) = record.agency_code() {
            if found != settings.agency_code {
                return Err(IngestError::InvalidProvider {
                    expected: provider.to_string(),
                    found: found.to_string(),
                });
            }
        }

        if mode == ImportMode::Delete || record.is_deletable() {
            if !settings.may_delete {
                return Err(IngestError::ProviderNotAllowedDeletion(provider.to_string()));
            }
            if !record.is_deletable() {
                return Err(IngestError::RecordNotDeletable);
            }
            let provider_recid = record
                .recid()
                .filter(|r| !r.is_empty())
                .ok_or_else(|| IngestError::MalformedRecord("record without 001".into()))?;
            return Ok(Outcome::Deleted {
                provider: provider.to_string(),
                provider_recid: provider_recid.to_string(),
            });
        }

        let model = self.catalogue.select(record, provider)?;
        let translation = model.overdo().translate(record, &self.handlers)?;
        let mut document = translation.document;
        let mut diagnostics = translation.diagnostics;
        self.coalescer.run(
            &mut document,
            record,
            model.is_proceedings(),
            &self.handlers,
            &mut diagnostics,
        )?;
        if model.reads_media_type() {
            apply_media_type(&mut document, record)?;
        }
        if model.builds_primary_eitem() {
            apply_primary_eitem(&mut document);
        }
        document.provider = Some(provider.to_string());
        self.complete(&mut document, model)?;

        Ok(Outcome::Upserted {
            document: Box::new(document),
            model: model.name(),
            diagnostics,
            missing_rules: translation.missing_rules,
        })
    }

    /// Required fields every stored document has.
    fn complete(&self, document: &mut Document, model: &Model) -> Result<()> {
        if document.title.is_none() {
            return Err(RuleError::missing("a")
                .with_message(format!("{} record has no title", model.name()))
                .at("245__")
                .into());
        }
        if document.document_type.is_none() && document.migration.record_type == RecordType::Document {
            return Err(RuleError::missing("a")
                .with_message("document type is not set")
                .at("980__")
                .into());
        }
        if document.languages.is_empty() {
            document.languages.push(self.config.default_language.clone());
        }
        Ok(())
    }

    fn process(&self, record: &Result<RawRecord>, provider: &str, mode: ImportMode) -> Outcome {
        if self.cancel.is_cancelled() {
            return Outcome::Cancelled;
        }
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                warn!("unreadable record: {err}");
                return Outcome::Failed(Failure::new(None, err, serde_json::Value::Null));
            },
        };
        match self.import_record(record, provider, mode) {
            Ok(outcome) => {
                if let Outcome::Upserted { diagnostics, .. } = &outcome {
                    for diagnostic in diagnostics {
                        debug!("record {}: {}", record.recid().unwrap_or("?"), diagnostic.message);
                    }
                }
                outcome
            },
            Err(err) => {
                warn!("record {} failed: {err}", record.recid().unwrap_or("?"));
                Outcome::Failed(Failure::new(record.recid(), &err, record.to_json()))
            },
        }
    }

    fn process_chunk(&self, chunk: &[Result<RawRecord>], provider: &str, mode: ImportMode) -> Vec<Outcome> {
        let run = || -> Vec<Outcome> {
            chunk
                .par_iter()
                .map(|record| self.process(record, provider, mode))
                .collect()
        };
        match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }

    /// Import a batch, feeding every outcome to `sink` in input order.
    ///
    /// Per-record failures go to the sink's failure log and do not stop the
    /// batch. A cancellation stops the running batch, or the next one when
    /// no batch is running; the token is cleared when the batch returns.
    ///
    /// # Errors
    ///
    /// `UnknownProvider` or `ProviderNotAllowedDeletion` before any record
    /// is read, or a sink failure.
    pub fn import_records<S: RecordSink + ?Sized>(
        &self,
        records: Vec<Result<RawRecord>>,
        provider: &str,
        mode: ImportMode,
        sink: &mut S,
    ) -> Result<BatchReport> {
        let report = self.run_batch(records, provider, mode, sink);
        self.cancel.reset();
        report
    }

    fn run_batch<S: RecordSink + ?Sized>(
        &self,
        records: Vec<Result<RawRecord>>,
        provider: &str,
        mode: ImportMode,
        sink: &mut S,
    ) -> Result<BatchReport> {
        let settings = self.provider(provider)?;
        if mode == ImportMode::Delete && !settings.may_delete {
            return Err(IngestError::ProviderNotAllowedDeletion(provider.to_string()));
        }
        info!("{mode} import of {} {provider} records", records.len());

        let (tx, rx) = bounded::<Outcome>(CHANNEL_CAPACITY);
        let report = thread::scope(|scope| -> Result<BatchReport> {
            scope.spawn(move || {
                for chunk in records.chunks(CHUNK_SIZE) {
                    for outcome in self.process_chunk(chunk, provider, mode) {
                        if tx.send(outcome).is_err() {
                            return;
                        }
                    }
                }
            });
            let mut report = BatchReport::default();
            for outcome in rx {
                report.count(&outcome);
                emit(sink, &outcome)?;
            }
            Ok(report)
        })?;
        sink.flush()?;

        info!(
            "{provider}: {} records, {} upserted, {} deleted, {} failed, {} cancelled",
            report.total, report.succeeded, report.deleted, report.failed, report.cancelled
        );
        Ok(report)
    }

    /// Import a MARCXML file.
    ///
    /// # Errors
    ///
    /// `DisallowedFileExtension`, `Io` or `Xml` when the file cannot be
    /// read, and the errors of [`Importer::import_records`].
    pub fn import_file<S: RecordSink + ?Sized>(
        &self,
        path: &Path,
        provider: &str,
        mode: ImportMode,
        sink: &mut S,
    ) -> Result<BatchReport> {
        if !self.allowed_file(path) {
            return Err(IngestError::DisallowedFileExtension(path.display().to_string()));
        }
        let records = marcxml::read_file(path)?;
        self.import_records(records, provider, mode, sink)
    }
}

/// Medium of an ebook provider record, from leader bytes 6-7.
fn apply_media_type(document: &mut Document, record: &RawRecord) -> Result<()> {
    let media = record
        .leader
        .media_type()
        .ok_or_else(|| IngestError::UnrecognisedImportMediaType {
            leader: record.leader.to_string(),
        })?;
    document
        .eitem
        .get_or_insert_with(EItemBlock::default)
        .kind = Some(media.as_str().to_string());
    if media == MediaType::Video {
        document.document_type = Some(DocumentType::Multimedia);
    }
    Ok(())
}

/// The single electronic item of a record: its first publisher link, or
/// its first proxied link. Records with neither carry no `_eitem` block.
fn apply_primary_eitem(document: &mut Document) {
    let channels = &document.migration.eitems;
    let Some(primary) = channels
        .eitems_external
        .first()
        .or_else(|| channels.eitems_proxy.first())
        .cloned()
    else {
        document.eitem = None;
        return;
    };
    let open_access =
        primary.open_access.unwrap_or(false) || document.migration.eitems_open_access.unwrap_or(false);
    let internal_notes = document.migration.eitems_internal_notes.clone();
    let block = document.eitem.get_or_insert_with(EItemBlock::default);
    block.urls = vec![primary.url];
    block.open_access = open_access;
    if block.internal_notes.is_none() {
        block.internal_notes = internal_notes;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;
    use crate::document::{EItem, Url};
    use crate::error::ErrorKind;
    use crate::record::RawField;
    use crate::sink::MemorySink;

    fn cds_book(recid: &str) -> RawRecord {
        RawRecord::builder()
            .leader("00000nam a2200000 i 4500")
            .control("001", recid)
            .control("003", "SzGeCERN")
            .field(RawField::data("245", ' ', ' ').subfield('a', "Gauge theories"))
            .field(RawField::data("980", ' ', ' ').subfield('a', "BOOK"))
            .build()
    }

    fn safari(leader: &str) -> RawRecord {
        RawRecord::builder()
            .leader(leader)
            .control("001", "9781492052586")
            .control("003", "CaSebORM")
            .field(RawField::data("245", '1', '0').subfield('a', "Programming Rust."))
            .build()
    }

    fn snv_standard() -> RawRecord {
        RawRecord::builder()
            .leader("00000nam a2200000 i 4500")
            .control("001", "1066")
            .control("003", "SNV")
            .field(RawField::data("245", ' ', ' ').subfield('a', "Quality management systems"))
            .field(RawField::data("980", ' ', ' ').subfield('a', "STANDARD"))
            .build()
    }

    fn importer() -> Importer {
        Importer::new(Config::default()).unwrap()
    }

    #[test]
    fn test_book_gets_defaults() {
        let outcome = importer()
            .import_record(&cds_book("1"), "cds", ImportMode::Create)
            .unwrap();
        let Outcome::Upserted { document, model, .. } = outcome else {
            panic!("expected an upsert");
        };
        assert_eq!(model, "cds.book");
        assert_eq!(document.provider.as_deref(), Some("cds"));
        assert_eq!(document.languages, vec!["ENG"]);
        assert_eq!(document.document_type, Some(DocumentType::Book));
    }

    #[test]
    fn test_provider_checks() {
        let importer = importer();
        let err = importer
            .import_record(&cds_book("1"), "nobody", ImportMode::Create)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownProvider);
        let err = importer
            .import_record(&cds_book("1"), "ebl", ImportMode::Create)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidProvider);
    }

    #[test]
    fn test_deletion_policy() {
        let importer = importer();
        let err = importer
            .import_record(&safari("00000nam a2200000 i 4500"), "safari", ImportMode::Delete)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RecordNotDeletable);

        let outcome = importer
            .import_record(&safari("00000dam a2200000 i 4500"), "safari", ImportMode::Delete)
            .unwrap();
        assert!(matches!(outcome, Outcome::Deleted { ref provider_recid, .. } if provider_recid == "9781492052586"));

        let mut sink = MemorySink::new();
        let err = importer
            .import_records(vec![Ok(cds_book("1"))], "cds", ImportMode::Delete, &mut sink)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ProviderNotAllowedDeletion);
    }

    #[test]
    fn test_media_type_from_leader() {
        let importer = importer();
        let Outcome::Upserted { document, .. } = importer
            .import_record(&safari("00000ngm a2200000 i 4500"), "safari", ImportMode::Create)
            .unwrap()
        else {
            panic!("expected an upsert");
        };
        assert_eq!(document.document_type, Some(DocumentType::Multimedia));
        assert_eq!(document.eitem.unwrap().kind.as_deref(), Some("video"));

        let err = importer
            .import_record(&safari("00000nkm a2200000 i 4500"), "safari", ImportMode::Create)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnrecognisedImportMediaType);
    }

    #[test]
    fn test_missing_title_fails() {
        let record = RawRecord::builder()
            .control("001", "5")
            .control("003", "SzGeCERN")
            .field(RawField::data("980", ' ', ' ').subfield('a', "BOOK"))
            .build();
        let err = importer()
            .import_record(&record, "cds", ImportMode::Create)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredField);
    }

    #[test]
    fn test_batch_order_and_report() {
        let config = Config::default()
            .with_threads(3)
            .with_provider("cds", ProviderConfig::new(1, "SzGeCERN", false));
        let importer = Importer::new(config).unwrap();
        let mut records: Vec<Result<RawRecord>> =
            (0..600).map(|i| Ok(cds_book(&i.to_string()))).collect();
        records.insert(10, Err(IngestError::MalformedRecord("truncated".into())));

        let mut sink = MemorySink::new();
        let report = importer
            .import_records(records, "cds", ImportMode::Create, &mut sink)
            .unwrap();
        assert_eq!(report.total, 601);
        assert_eq!(report.succeeded, 600);
        assert_eq!(report.failed, 1);
        let recids: Vec<String> = sink
            .upserts
            .iter()
            .filter_map(|d| d.provider_recid.clone())
            .collect();
        let expected: Vec<String> = (0..600).map(|i| i.to_string()).collect();
        assert_eq!(recids, expected);
        assert_eq!(sink.failures[0].kind, ErrorKind::MalformedRecord);
    }

    #[test]
    fn test_cancelled_batch() {
        let importer = importer();
        importer.cancellation_token().cancel();
        let mut sink = MemorySink::new();
        let report = importer
            .import_records(vec![Ok(cds_book("1")), Ok(cds_book("2"))], "cds", ImportMode::Create, &mut sink)
            .unwrap();
        assert_eq!(report.cancelled, 2);
        assert!(sink.upserts.is_empty());
    }

    #[test]
    fn test_cancellation_ends_with_its_batch() {
        let importer = importer();
        let token = importer.cancellation_token();
        token.cancel();
        let mut sink = MemorySink::new();
        let batch = || vec![Ok(cds_book("1")), Ok(cds_book("2"))];

        let first = importer.import_records(batch(), "cds", ImportMode::Create, &mut sink).unwrap();
        assert_eq!(first.cancelled, 2);
        assert!(!token.is_cancelled());

        let second = importer.import_records(batch(), "cds", ImportMode::Create, &mut sink).unwrap();
        assert_eq!(second.cancelled, 0);
        assert_eq!(second.succeeded, 2);
        assert_eq!(sink.upserts.len(), 2);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("DELETE".parse::<ImportMode>().unwrap(), ImportMode::Delete);
        assert!("merge".parse::<ImportMode>().is_err());
        assert_eq!(ImportMode::Create.to_string(), "create");
    }

    #[test]
    fn test_primary_eitem_prefers_external_links() {
        let mut document = Document::default();
        document.migration.eitems.eitems_proxy.push(EItem {
            url: Url {
                value: "https://proxied.example/std".into(),
                description: None,
            },
            open_access: Some(false),
        });
        document.migration.eitems_internal_notes = Some("licence 2025".into());
        apply_primary_eitem(&mut document);
        let block = document.eitem.clone().unwrap();
        assert_eq!(block.urls[0].value, "https://proxied.example/std");
        assert_eq!(block.internal_notes.as_deref(), Some("licence 2025"));
        assert!(!block.open_access);

        document.migration.eitems.eitems_external.push(EItem {
            url: Url {
                value: "https://publisher.example/std".into(),
                description: None,
            },
            open_access: Some(true),
        });
        apply_primary_eitem(&mut document);
        let block = document.eitem.unwrap();
        assert_eq!(block.urls.len(), 1);
        assert_eq!(block.urls[0].value, "https://publisher.example/std");
        assert!(block.open_access);
    }

    #[test]
    fn test_snv_standard_without_links_has_no_eitem() {
        let outcome = importer().import_record(&snv_standard(), "snv", ImportMode::Create).unwrap();
        let Outcome::Upserted { document, model, .. } = outcome else {
            panic!("expected an upsert");
        };
        assert_eq!(model, "snv.standard");
        assert_eq!(document.document_type, Some(DocumentType::Standard));
        assert!(document.eitem.is_none());
    }
}
