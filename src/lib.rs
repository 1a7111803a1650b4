#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! ## Modules
//!
//! - [`record`]: raw MARC records, fields and subfields
//! - [`leader`]: record leader and the media type it declares
//! - [`marcxml`]: MARCXML reading
//! - [`parsers`]: subfield value cleaning and coercion
//! - [`vocabulary`]: controlled vocabularies
//! - [`document`]: the normalized document model
//! - [`fragment`]: partial documents emitted by rules, and how they merge
//! - [`registry`]: rules and rule sets, indexed by field key
//! - [`engine`]: the translation engine
//! - [`query`]: record selection queries
//! - [`models`]: record models and model selection
//! - [`rules`]: rule sets of every provider
//! - [`coalesce`]: post-translation passes over a document
//! - [`handlers`]: strict and lenient error handling
//! - [`coordinator`]: batch import
//! - [`sink`]: output of import outcomes
//! - [`config`]: importer configuration
//! - [`error`]: error types and result type

pub mod coalesce;
pub mod config;
pub mod coordinator;
pub mod document;
pub mod engine;
pub mod error;
pub mod fragment;
pub mod handlers;
pub mod leader;
pub mod marcxml;
pub mod models;
pub mod parsers;
pub mod query;
/// Raw MARC records (`RawRecord`, `RawField`, `Subfields`)
pub mod record;
pub mod registry;
pub mod rules;
pub mod sink;
pub mod vocabulary;

pub use config::{Config, ProviderConfig};
pub use coordinator::{BatchReport, CancellationToken, ImportMode, Importer, Outcome};
pub use document::Document;
pub use engine::{Overdo, Translation};
pub use error::{ErrorKind, IngestError, Result, RuleError};
pub use handlers::{Diagnostic, HandlerTable};
pub use leader::{Leader, MediaType};
pub use models::{Model, ModelCatalogue, Selector};
pub use query::Query;
pub use record::{RawField, RawRecord, Subfields};
pub use registry::{Rule, RuleOutcome, RuleRegistry, RuleSet};
pub use sink::{Failure, JsonLinesSink, MemorySink, RecordSink};
