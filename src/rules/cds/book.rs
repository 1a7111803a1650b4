//! Book layer over the CDS base rules.
//!
//! Books read `246` as plain alternative titles: volume numbering in books is
//! handled by the multipart model.

use crate::registry::{Rule, RuleSet};
use crate::rules::cds::base::alternative_titles;

/// Rules specific to books.
#[must_use]
pub fn rules() -> RuleSet {
    RuleSet::new("cds.book")
        .rule(Rule::append("^246..", "alternative_titles", alternative_titles).overriding())
}
