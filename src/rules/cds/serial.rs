//! Serials: the series a book belongs to, imported on their own.

use crate::document::{Document, Identifier, IdentifierScheme, ModeOfIssuance};
use crate::fragment::{Fragment, Property};
use crate::record::RawField;
use crate::registry::{Rule, RuleSet};
use crate::rules::{agency_code, data, emit, legacy_recid, optional, required, RuleResult};

/// `490`: series title and ISSN.
fn title(_: &Document, field: &RawField) -> RuleResult {
    let s = data(field)?;
    let mut out = Vec::new();
    if let Some(issn) = optional('x', s)? {
        out.push(Fragment::append(Property::Identifiers(vec![Identifier::new(
            issn,
            IdentifierScheme::Issn,
        )])));
    }
    out.push(Fragment::new(Property::ModeOfIssuance(ModeOfIssuance::Serial)));
    out.push(Fragment::new(Property::Title(required('a', s)?)));
    emit(out)
}

/// Rules of serial records.
#[must_use]
pub fn rules() -> RuleSet {
    RuleSet::new("cds.serial")
        .rule(Rule::assign("001", "legacy_recid", legacy_recid))
        .rule(Rule::assign("003", "agency_code", agency_code))
        .rule(Rule::assign("^490..", "title", title))
}
