//! Error types for record ingestion.
//!
//! Two layers of errors exist:
//!
//! - [`RuleError`] is raised by value parsers and translation rules while a
//!   single field is being converted. It carries the offending subfield so the
//!   engine can point diagnostics at an exact `tag+indicators+subfield`
//!   location.
//! - [`IngestError`] is the crate-wide error. Every failure that reaches the
//!   import coordinator is one of its variants, and [`IngestError::kind`]
//!   gives the stable [`ErrorKind`] written to the failure log.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Stable category of an ingestion failure.
///
/// The serialized form (`UNEXPECTED_VALUE`, `LOSSY_CONVERSION`, ...) is what
/// the failure log and the CLI report use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Subfield present but its value violates the expected format.
    UnexpectedValue,
    /// A required subfield is absent.
    MissingRequiredField,
    /// The record is ambiguous and must be imported by a cataloguer.
    ManualImportRequired,
    /// At least one field had no rule and was not ignored.
    LossyConversion,
    /// No rule matched a field key.
    MissingRule,
    /// Delete requested for a record whose leader is not marked deleted.
    RecordNotDeletable,
    /// Delete requested for a provider outside the deletion allowlist.
    ProviderNotAllowedDeletion,
    /// Provider name or agency code is not configured.
    UnknownProvider,
    /// Agency code of the record does not belong to the requested provider.
    InvalidProvider,
    /// No model matched the record and no fallback applies.
    RecordModelMissing,
    /// Leader does not describe a supported media type.
    UnrecognisedImportMediaType,
    /// The raw record could not be parsed.
    MalformedRecord,
    /// Invalid configuration or input file.
    Configuration,
    /// Underlying I/O or serialization failure.
    Io,
}

impl ErrorKind {
    /// Name used in logs and reports.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::UnexpectedValue => "UNEXPECTED_VALUE",
            ErrorKind::MissingRequiredField => "MISSING_REQUIRED_FIELD",
            ErrorKind::ManualImportRequired => "MANUAL_IMPORT_REQUIRED",
            ErrorKind::LossyConversion => "LOSSY_CONVERSION",
            ErrorKind::MissingRule => "MISSING_RULE",
            ErrorKind::RecordNotDeletable => "RECORD_NOT_DELETABLE",
            ErrorKind::ProviderNotAllowedDeletion => "PROVIDER_NOT_ALLOWED_DELETION",
            ErrorKind::UnknownProvider => "UNKNOWN_PROVIDER",
            ErrorKind::InvalidProvider => "INVALID_PROVIDER",
            ErrorKind::RecordModelMissing => "RECORD_MODEL_MISSING",
            ErrorKind::UnrecognisedImportMediaType => "UNRECOGNISED_IMPORT_MEDIA_TYPE",
            ErrorKind::MalformedRecord => "MALFORMED_RECORD",
            ErrorKind::Configuration => "CONFIGURATION",
            ErrorKind::Io => "IO",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure raised while translating one field instance.
///
/// Only the three field-level kinds are meaningful here:
/// [`ErrorKind::UnexpectedValue`], [`ErrorKind::MissingRequiredField`] and
/// [`ErrorKind::ManualImportRequired`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", self.render())]
pub struct RuleError {
    /// Failure category.
    pub kind: ErrorKind,
    /// Subfield code(s) the failure refers to, e.g. `"a"` or `"9 or z"`.
    pub subfield: Option<String>,
    /// Extra human readable detail.
    pub message: Option<String>,
    /// Field key the failure happened in, filled by the engine.
    pub key: Option<String>,
}

impl RuleError {
    fn new(kind: ErrorKind, subfield: Option<&str>) -> Self {
        RuleError {
            kind,
            subfield: subfield.map(str::to_string),
            message: None,
            key: None,
        }
    }

    /// Subfield present with an invalid value.
    #[must_use]
    pub fn unexpected(subfield: &str) -> Self {
        Self::new(ErrorKind::UnexpectedValue, Some(subfield))
    }

    /// Invalid field without a specific subfield.
    #[must_use]
    pub fn unexpected_field() -> Self {
        Self::new(ErrorKind::UnexpectedValue, None)
    }

    /// Required subfield absent.
    #[must_use]
    pub fn missing(subfield: &str) -> Self {
        Self::new(ErrorKind::MissingRequiredField, Some(subfield))
    }

    /// Value needs a cataloguer to resolve it.
    #[must_use]
    pub fn manual(subfield: &str) -> Self {
        Self::new(ErrorKind::ManualImportRequired, Some(subfield))
    }

    /// Attach a detail message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Point the error at subfield `code` unless it already names one.
    #[must_use]
    pub fn on(mut self, code: char) -> Self {
        if self.subfield.is_none() {
            self.subfield = Some(code.to_string());
        }
        self
    }

    /// Record the field key the error was raised in.
    #[must_use]
    pub fn at(mut self, key: &str) -> Self {
        if self.key.is_none() {
            self.key = Some(key.to_string());
        }
        self
    }

    fn prefix(&self) -> &'static str {
        match self.kind {
            ErrorKind::MissingRequiredField => "[MISSING REQUIRED FIELD]",
            ErrorKind::ManualImportRequired => "[MANUAL IMPORT REQUIRED]",
            _ => "[UNEXPECTED INPUT VALUE]",
        }
    }

    fn render(&self) -> String {
        let mut out = self.prefix().to_string();
        if let Some(message) = &self.message {
            out.push(' ');
            out.push_str(message);
        }
        if let Some(key) = &self.key {
            out.push_str(&format!(
                " in <{}{}> ",
                key,
                self.subfield.as_deref().unwrap_or("")
            ));
        }
        out
    }
}

/// Error type for all ingestion operations.
#[derive(Error, Debug)]
pub enum IngestError {
    /// A rule or parser rejected a field.
    #[error("{0}")]
    Rule(#[from] RuleError),

    /// Fields without a rule that are not on the model's ignore list.
    #[error("Lossy conversion: {}", missing.join(", "))]
    LossyConversion {
        /// Key and subfield strings that were not translated.
        missing: Vec<String>,
    },

    /// Delete mode on a record without the deleted status.
    #[error("Record is not marked as deletable")]
    RecordNotDeletable,

    /// Delete requested for a provider without `may_delete`.
    #[error("This provider {0} is not allowed to delete records")]
    ProviderNotAllowedDeletion(String),

    /// Provider name or agency code not in the configuration.
    #[error("Unknown record provider.")]
    UnknownProvider {
        /// Name or agency code that failed the lookup.
        provider: String,
    },

    /// Record agency code belongs to a different provider.
    #[error("Invalid record provider.")]
    InvalidProvider {
        /// Provider requested by the caller.
        expected: String,
        /// Agency code found in the record.
        found: String,
    },

    /// No model matched and no fallback applies.
    #[error("[Record did not match any available model]")]
    RecordModelMissing,

    /// Leader bytes 6-7 do not describe a supported medium.
    #[error("Record media type is not recognised.")]
    UnrecognisedImportMediaType {
        /// The offending leader.
        leader: String,
    },

    /// The raw record could not be read.
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// XML syntax or structure error from the reader.
    #[error("XML error: {0}")]
    Xml(String),

    /// Input file extension not in the configured allowlist.
    #[error("File extension not allowed: {0}")]
    DisallowedFileExtension(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// JSON serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error from the underlying source/destination.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IngestError {
    /// Stable category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            IngestError::Rule(e) => e.kind,
            IngestError::LossyConversion { .. } => ErrorKind::LossyConversion,
            IngestError::RecordNotDeletable => ErrorKind::RecordNotDeletable,
            IngestError::ProviderNotAllowedDeletion(_) => ErrorKind::ProviderNotAllowedDeletion,
            IngestError::UnknownProvider { .. } => ErrorKind::UnknownProvider,
            IngestError::InvalidProvider { .. } => ErrorKind::InvalidProvider,
            IngestError::RecordModelMissing => ErrorKind::RecordModelMissing,
            IngestError::UnrecognisedImportMediaType { .. } => {
                ErrorKind::UnrecognisedImportMediaType
            },
            IngestError::MalformedRecord(_) | IngestError::Xml(_) => ErrorKind::MalformedRecord,
            IngestError::DisallowedFileExtension(_) | IngestError::Configuration(_) => {
                ErrorKind::Configuration
            },
            IngestError::Json(_) | IngestError::Io(_) => ErrorKind::Io,
        }
    }

    /// Subfield location for field-level failures.
    #[must_use]
    pub fn subfield(&self) -> Option<&str> {
        match self {
            IngestError::Rule(e) => e.subfield.as_deref(),
            _ => None,
        }
    }
}

/// Convenience type alias for [`std::result::Result`] with [`IngestError`].
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_error_message_carries_location() {
        let err = RuleError::unexpected("a").at("020__");
        assert_eq!(err.to_string(), "[UNEXPECTED INPUT VALUE] in <020__a> ");
    }

    #[test]
    fn test_rule_error_location_is_set_once() {
        let err = RuleError::missing("w").at("775__").at("999__");
        assert_eq!(err.key.as_deref(), Some("775__"));
        assert!(err.to_string().starts_with("[MISSING REQUIRED FIELD]"));
    }

    #[test]
    fn test_kind_of_wrapped_rule_error() {
        let err: IngestError = RuleError::manual("u").with_message("volume clash").into();
        assert_eq!(err.kind(), ErrorKind::ManualImportRequired);
        assert_eq!(err.subfield(), Some("u"));
        assert!(err.to_string().contains("volume clash"));
    }

    #[test]
    fn test_lossy_conversion_lists_keys() {
        let err = IngestError::LossyConversion {
            missing: vec!["999__a".to_string(), "998__b".to_string()],
        };
        assert_eq!(err.to_string(), "Lossy conversion: 999__a, 998__b");
        assert_eq!(err.kind().as_str(), "LOSSY_CONVERSION");
    }

    #[test]
    fn test_kind_serializes_screaming_snake() {
        let json = serde_json::to_string(&ErrorKind::ProviderNotAllowedDeletion).unwrap();
        assert_eq!(json, "\"PROVIDER_NOT_ALLOWED_DELETION\"");
    }
}
