//! Error handlers for field-level failures.
//!
//! When a rule or a coalescer raises a [`RuleError`], the engine asks the
//! [`HandlerTable`] what to do with it. A handler may consume the error,
//! record it as a [`Diagnostic`] and continue, or escalate it so the record
//! fails.
//!
//! The strict table escalates everything. The lenient table records
//! `UnexpectedValue` and carries on. `MissingRequiredField` and
//! `ManualImportRequired` always escalate, whatever the table says.

use crate::error::{ErrorKind, IngestError, Result, RuleError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Code of the diagnostic raised when `775` and `787` both produce relations.
pub const RELATION_OVERLAP: &str = "RELATION_OVERLAP";

/// What to do with a field-level error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerAction {
    /// Drop the error silently.
    Skip,
    /// Keep translating and attach a diagnostic to the outcome.
    Record,
    /// Fail the record.
    Escalate,
}

/// Structured note attached to a record outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Error kind name or a dedicated code such as [`RELATION_OVERLAP`].
    pub code: String,
    /// Field key the note refers to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Subfield the note refers to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subfield: Option<String>,
    /// Human readable message.
    pub message: String,
}

impl Diagnostic {
    /// Diagnostic with a custom code.
    #[must_use]
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Diagnostic {
            code: code.to_string(),
            key: None,
            subfield: None,
            message: message.into(),
        }
    }
}

impl From<&RuleError> for Diagnostic {
    fn from(err: &RuleError) -> Self {
        Diagnostic {
            code: err.kind.as_str().to_string(),
            key: err.key.clone(),
            subfield: err.subfield.clone(),
            message: err.to_string(),
        }
    }
}

/// Mapping from error kind to handler action.
#[derive(Debug, Clone)]
pub struct HandlerTable {
    strict: bool,
    actions: HashMap<ErrorKind, HandlerAction>,
}

impl Default for HandlerTable {
    fn default() -> Self {
        HandlerTable::strict()
    }
}

impl HandlerTable {
    /// Every field-level error fails the record, missing rules included.
    #[must_use]
    pub fn strict() -> Self {
        HandlerTable {
            strict: true,
            actions: HashMap::new(),
        }
    }

    /// Unexpected values are recorded, missing rules are dropped.
    #[must_use]
    pub fn lenient() -> Self {
        let mut actions = HashMap::new();
        actions.insert(ErrorKind::UnexpectedValue, HandlerAction::Record);
        HandlerTable {
            strict: false,
            actions,
        }
    }

    /// Strict or lenient table.
    #[must_use]
    pub fn for_mode(strict: bool) -> Self {
        if strict {
            HandlerTable::strict()
        } else {
            HandlerTable::lenient()
        }
    }

    /// Builder helper: choose the action for one kind.
    #[must_use]
    pub fn set(mut self, kind: ErrorKind, action: HandlerAction) -> Self {
        self.actions.insert(kind, action);
        self
    }

    /// Whether fields without a rule fail the record.
    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Action for an error kind.
    #[must_use]
    pub fn action(&self, kind: ErrorKind) -> HandlerAction {
        match kind {
            ErrorKind::MissingRequiredField | ErrorKind::ManualImportRequired => {
                HandlerAction::Escalate
            },
            _ => self
                .actions
                .get(&kind)
                .copied()
                .unwrap_or(HandlerAction::Escalate),
        }
    }

    /// Apply the table to one error.
    ///
    /// # Errors
    ///
    /// The error itself, wrapped, when the action is `Escalate`.
    pub fn handle(&self, err: RuleError, diagnostics: &mut Vec<Diagnostic>) -> Result<()> {
        match self.action(err.kind) {
            HandlerAction::Skip => Ok(()),
            HandlerAction::Record => {
                log::debug!("recorded {}", err);
                diagnostics.push(Diagnostic::from(&err));
                Ok(())
            },
            HandlerAction::Escalate => Err(IngestError::Rule(err)),
        }
    }
}
