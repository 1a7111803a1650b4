//! Controlled vocabularies.
//!
//! A vocabulary is either a map from a canonical value to the legacy aliases
//! that designate it, or a plain list of accepted tokens. Lookups strip the
//! token and compare case-insensitively. Every table here is a `const` and is
//! never mutated, so all threads share them freely.

use crate::document::{CreatedByType, DocumentType, IdentifierScheme, Material, Medium, RelationType, Role};
use crate::error::RuleError;

/// Lookup behaviour shared by maps and lists.
pub trait Lookup {
    /// Canonical value returned on a match.
    type Output;

    /// Name of the vocabulary, used in error messages.
    fn name(&self) -> &'static str;

    /// Canonical value designated by `token`, if any.
    fn lookup(&self, token: &str) -> Option<Self::Output>;
}

/// Canonical values with their legacy aliases.
#[derive(Debug, Clone, Copy)]
pub struct VocabularyMap<T: 'static> {
    name: &'static str,
    entries: &'static [(T, &'static [&'static str])],
}

impl<T: 'static> VocabularyMap<T> {
    /// Build a map from `(canonical, aliases)` pairs.
    #[must_use]
    pub const fn new(name: &'static str, entries: &'static [(T, &'static [&'static str])]) -> Self {
        VocabularyMap { name, entries }
    }

    /// Canonical values in declaration order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(value, _)| value)
    }
}

impl<T: Copy + 'static> Lookup for VocabularyMap<T> {
    type Output = T;

    fn name(&self) -> &'static str {
        self.name
    }

    fn lookup(&self, token: &str) -> Option<T> {
        let wanted = token.trim().to_uppercase();
        if wanted.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|(_, aliases)| aliases.iter().any(|a| a.to_uppercase() == wanted))
            .map(|(value, _)| *value)
    }
}

/// Accepted tokens.
#[derive(Debug, Clone, Copy)]
pub struct VocabularyList {
    name: &'static str,
    entries: &'static [&'static str],
}

impl VocabularyList {
    /// Build a list vocabulary.
    #[must_use]
    pub const fn new(name: &'static str, entries: &'static [&'static str]) -> Self {
        VocabularyList { name, entries }
    }

    /// Whether `token` belongs to the list.
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.lookup(token).is_some()
    }
}

impl Lookup for VocabularyList {
    type Output = &'static str;

    fn name(&self) -> &'static str {
        self.name
    }

    fn lookup(&self, token: &str) -> Option<&'static str> {
        let wanted = token.trim();
        if wanted.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|entry| entry.eq_ignore_ascii_case(wanted))
            .copied()
    }
}

/// Map a legacy token through a vocabulary.
///
/// Returns the canonical value, or `None` when nothing matches and
/// `raise_exception` is false.
///
/// # Errors
///
/// `UnexpectedValue` when nothing matches and `raise_exception` is set. The
/// error carries no subfield; attach one with [`RuleError::on`].
pub fn mapping<V: Lookup + ?Sized>(
    vocabulary: &V,
    token: &str,
    raise_exception: bool,
) -> Result<Option<V::Output>, RuleError> {
    match vocabulary.lookup(token) {
        Some(value) => Ok(Some(value)),
        None if raise_exception => Err(RuleError::unexpected_field().with_message(format!(
            "'{}' is not a known {} value",
            token.trim(),
            vocabulary.name()
        ))),
        None => Ok(None),
    }
}

/// Collection designated in `980`, `690C_` and `697C_`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Suggested for acquisition.
    BookSuggestion,
    /// Legal service library.
    Legserlib,
    /// Yellow report series.
    YellowReport,
    /// Institutional collection, carries no tag.
    Cern,
    /// Design report.
    DesignReport,
    /// Bookshop.
    Bookshop,
    /// Legal service library, international law.
    LegserlibIntLaw,
    /// Legal service library, civil law.
    LegserlibCivLaw,
    /// Legal service library, legal research.
    LegserlibLegRes,
}

/// Document types.
pub const DOCUMENT_TYPE: VocabularyMap<DocumentType> = VocabularyMap::new(
    "DOCUMENT_TYPE",
    &[
        (DocumentType::Proceedings, &["PROCEEDINGS", "42", "43"]),
        (DocumentType::Book, &["BOOK", "21"]),
        (DocumentType::Standard, &["STANDARD"]),
    ],
);

/// Collections.
pub const COLLECTION: VocabularyMap<Collection> = VocabularyMap::new(
    "COLLECTION",
    &[
        (Collection::BookSuggestion, &["BOOKSUGGESTION", "BOOK SUGGESTION"]),
        (Collection::Legserlib, &["LEGSERLIB"]),
        (Collection::YellowReport, &["YELLOW REPORT", "YELLOWREPORT"]),
        (Collection::Cern, &["CERN"]),
        (Collection::DesignReport, &["DESIGN REPORT", "DESIGNREPORT"]),
        (Collection::Bookshop, &["BOOKSHOP"]),
        (Collection::LegserlibIntLaw, &["LEGSERLIBINTLAW"]),
        (Collection::LegserlibCivLaw, &["LEGSERLIBCIVLAW"]),
        (Collection::LegserlibLegRes, &["LEGSERLIBLEGRES"]),
    ],
);

/// Acquisition methods of `916__$s`.
pub const ACQUISITION_METHOD: VocabularyMap<CreatedByType> = VocabularyMap::new(
    "ACQUISITION_METHOD",
    &[
        (CreatedByType::User, &["H", "R"]),
        (CreatedByType::Batchuploader, &["N", "M"]),
        (CreatedByType::Migration, &["MIGRATION"]),
    ],
);

/// Medium statements accepted in `020__$u`.
pub const MEDIUM_TYPES: VocabularyList = VocabularyList::new(
    "MEDIUM_TYPES",
    &[
        "ELECTRONIC VERSION",
        "PRINT VERSION",
        "PRINT VERSION, HARDBACK",
        "PRINT VERSION, PAPERBACK",
        "PRINT VERSION, SPIRAL-BOUND",
        "CD-ROM",
        "AUDIOBOOK",
        "DVD",
    ],
);

/// Material of an identifier, from its medium statement or DOI qualifier.
pub const IDENTIFIER_MATERIAL: VocabularyMap<Material> = VocabularyMap::new(
    "IDENTIFIER_MATERIAL",
    &[
        (
            Material::Digital,
            &["ELECTRONIC VERSION", "ELECTRONIC", "E-BOOK", "EBOOK", "E-PROCEEDINGS", "ONLINE"],
        ),
        (
            Material::PrintVersion,
            &[
                "PRINT VERSION",
                "PRINT VERSION, HARDBACK",
                "PRINT VERSION, PAPERBACK",
                "PRINT VERSION, SPIRAL-BOUND",
                "PRINT",
                "HARDBACK",
                "PAPERBACK",
                "SOFTCOVER",
                "HARDCOVER",
            ],
        ),
        (Material::Audiobook, &["AUDIOBOOK"]),
        (Material::Cdrom, &["CD-ROM", "CDROM"]),
        (Material::Dvd, &["DVD"]),
    ],
);

/// Materials named in licenses and copyrights (`$3`).
pub const MATERIALS: VocabularyList = VocabularyList::new(
    "MATERIALS",
    &[
        "addendum",
        "additional material",
        "data",
        "e-proceedings",
        "ebook",
        "editorial note",
        "erratum",
        "preprint",
        "publication",
        "reprint",
        "software",
        "translation",
    ],
);

/// `084__$2` sources that are keywords rather than classifications.
pub const SUBJECT_CLASSIFICATION_EXCEPTIONS: VocabularyList = VocabularyList::new(
    "SUBJECT_CLASSIFICATION_EXCEPTIONS",
    &["PACS", "CERN LIBRARY", "CERN YELLOW REPORT"],
);

/// External systems whose identifiers are kept (`035__$9`).
pub const EXTERNAL_SYSTEM_IDENTIFIERS: VocabularyList = VocabularyList::new(
    "EXTERNAL_SYSTEM_IDENTIFIERS",
    &[
        "DCL",
        "DESY",
        "DOE",
        "EBL",
        "FIZ",
        "HAL",
        "IEECONF",
        "INDICO.CERN.CH",
        "INIS",
        "INSPIRE",
        "KEK",
        "LHCLHC",
        "SAFARI",
        "SCEM",
        "UDCCERN",
        "WAI01",
    ],
);

/// External systems whose identifiers are dropped (`035__$9`).
pub const EXTERNAL_SYSTEM_IDENTIFIERS_TO_IGNORE: VocabularyList = VocabularyList::new(
    "EXTERNAL_SYSTEM_IDENTIFIERS_TO_IGNORE",
    &[
        "ARXIV",
        "CERN ANNUAL REPORT",
        "HTTP://INSPIREHEP.NET/OAI2D",
        "SLAC",
        "SLACCONF",
        "SPIRES",
    ],
);

/// Identifier schemes named in `0247_$2`.
pub const IDENTIFIER_SCHEME: VocabularyMap<IdentifierScheme> = VocabularyMap::new(
    "IDENTIFIER_SCHEME",
    &[
        (IdentifierScheme::Isbn, &["ISBN"]),
        (IdentifierScheme::Issn, &["ISSN"]),
        (IdentifierScheme::Doi, &["DOI"]),
        (IdentifierScheme::ReportNumber, &["REPORT NUMBER", "REPORT_NUMBER", "RN"]),
        (IdentifierScheme::StandardNumber, &["STANDARD NUMBER", "STANDARD_NUMBER"]),
    ],
);

/// Review applicability of standards (`925__$i`).
pub const APPLICABILITY: VocabularyMap<&'static str> = VocabularyMap::new(
    "APPLICABILITY",
    &[
        ("APPLICABLE", &["APPLICABLE", "APPLICABLE AT CERN"]),
        ("NO_LONGER_APPLICABLE", &["NO LONGER APPLICABLE", "NOT APPLICABLE"]),
        ("UNDER_REVIEW", &["UNDER REVIEW", "REVIEW"]),
    ],
);

/// Contributor roles (`$e`).
pub const ROLES: VocabularyMap<Role> = VocabularyMap::new(
    "ROLES",
    &[
        (Role::Author, &["AUTHOR", "AUTHOR.", "AUT"]),
        (Role::Editor, &["EDITOR", "EDITOR.", "ED.", "ED", "EDS.", "EDS"]),
        (Role::Supervisor, &["SUPERVISOR", "THESIS SUPERVISOR", "DIR.", "DIR"]),
        (Role::Illustrator, &["ILLUSTRATOR", "ILL.", "ILL"]),
    ],
);

/// Relation types of `775__$x` and `787__$x`.
pub const RELATION_TYPES: VocabularyMap<RelationType> = VocabularyMap::new(
    "RELATION_TYPES",
    &[
        (RelationType::Edition, &["EDITION", "EDITIONS"]),
        (RelationType::Language, &["LANGUAGE", "TRANSLATION"]),
        (RelationType::Other, &["OTHER"]),
    ],
);

/// Item media of `340__$a`.
pub const ITEM_MEDIUM: VocabularyMap<Medium> = VocabularyMap::new(
    "ITEM_MEDIUM",
    &[
        (Medium::Paper, &["PAPER", "PRINT"]),
        (Medium::Cdrom, &["CD-ROM", "CDROM", "CD"]),
        (Medium::Dvd, &["DVD", "DVD-ROM", "DVD VIDEO"]),
        (Medium::Vhs, &["VHS", "VIDEO CASSETTE"]),
    ],
);

/// arXiv subject categories.
pub const ARXIV_CATEGORIES: VocabularyList = VocabularyList::new(
    "ARXIV_CATEGORIES",
    &[
        "astro-ph", "astro-ph.CO", "astro-ph.EP", "astro-ph.GA", "astro-ph.HE", "astro-ph.IM",
        "astro-ph.SR", "cond-mat", "cond-mat.dis-nn", "cond-mat.mes-hall", "cond-mat.mtrl-sci",
        "cond-mat.other", "cond-mat.quant-gas", "cond-mat.soft", "cond-mat.stat-mech",
        "cond-mat.str-el", "cond-mat.supr-con", "cs", "cs.AI", "cs.AR", "cs.CC", "cs.CE",
        "cs.CG", "cs.CL", "cs.CR", "cs.CV", "cs.CY", "cs.DB", "cs.DC", "cs.DL", "cs.DM", "cs.DS",
        "cs.ET", "cs.FL", "cs.GL", "cs.GR", "cs.GT", "cs.HC", "cs.IR", "cs.IT", "cs.LG", "cs.LO",
        "cs.MA", "cs.MM", "cs.MS", "cs.NA", "cs.NE", "cs.NI", "cs.OH", "cs.OS", "cs.PF", "cs.PL",
        "cs.RO", "cs.SC", "cs.SD", "cs.SE", "cs.SI", "cs.SY", "econ", "econ.EM", "eess",
        "eess.AS", "eess.IV", "eess.SP", "gr-qc", "hep-ex", "hep-lat", "hep-ph", "hep-th",
        "math", "math-ph", "math.AC", "math.AG", "math.AP", "math.AT", "math.CA", "math.CO",
        "math.CT", "math.CV", "math.DG", "math.DS", "math.FA", "math.GM", "math.GN", "math.GR",
        "math.GT", "math.HO", "math.IT", "math.KT", "math.LO", "math.MG", "math.MP", "math.NA",
        "math.NT", "math.OA", "math.OC", "math.PR", "math.QA", "math.RA", "math.RT", "math.SG",
        "math.SP", "math.ST", "nlin", "nlin.AO", "nlin.CD", "nlin.CG", "nlin.PS", "nlin.SI",
        "nucl-ex", "nucl-th", "physics", "physics.acc-ph", "physics.ao-ph", "physics.app-ph",
        "physics.atm-clus", "physics.atom-ph", "physics.bio-ph", "physics.chem-ph",
        "physics.class-ph", "physics.comp-ph", "physics.data-an", "physics.ed-ph",
        "physics.flu-dyn", "physics.gen-ph", "physics.geo-ph", "physics.hist-ph",
        "physics.ins-det", "physics.med-ph", "physics.optics", "physics.plasm-ph",
        "physics.pop-ph", "physics.soc-ph", "physics.space-ph", "q-bio", "q-bio.BM", "q-bio.CB",
        "q-bio.GN", "q-bio.MN", "q-bio.NC", "q-bio.OT", "q-bio.PE", "q-bio.QM", "q-bio.SC",
        "q-bio.TO", "q-fin", "q-fin.CP", "q-fin.EC", "q-fin.GN", "q-fin.MF", "q-fin.PM",
        "q-fin.PR", "q-fin.RM", "q-fin.ST", "q-fin.TR", "quant-ph", "stat", "stat.AP",
        "stat.CO", "stat.ME", "stat.ML", "stat.OT", "stat.TH",
    ],
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_map_lookup_is_case_insensitive() {
        assert_eq!(mapping(&DOCUMENT_TYPE, " book ", true).unwrap(), Some(DocumentType::Book));
        assert_eq!(mapping(&DOCUMENT_TYPE, "42", true).unwrap(), Some(DocumentType::Proceedings));
        assert_eq!(
            mapping(&ACQUISITION_METHOD, "migration", true).unwrap(),
            Some(CreatedByType::Migration)
        );
        assert_eq!(
            mapping(&IDENTIFIER_MATERIAL, "electronic version", false).unwrap(),
            Some(Material::Digital)
        );
    }

    #[test]
    fn test_unknown_token() {
        assert_eq!(mapping(&DOCUMENT_TYPE, "THESIS", false).unwrap(), None);
        let err = mapping(&DOCUMENT_TYPE, "THESIS", true).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedValue);
        assert_eq!(err.on('a').subfield.as_deref(), Some("a"));
    }

    #[test]
    fn test_empty_token_never_matches() {
        assert_eq!(mapping(&COLLECTION, "  ", false).unwrap(), None);
        assert!(mapping(&MATERIALS, "", true).is_err());
    }

    #[test]
    fn test_list_returns_canonical_spelling() {
        assert_eq!(mapping(&ARXIV_CATEGORIES, "HEP-PH", true).unwrap(), Some("hep-ph"));
        assert_eq!(mapping(&ARXIV_CATEGORIES, "cs.ai", true).unwrap(), Some("cs.AI"));
        assert!(MATERIALS.contains("Erratum"));
        assert!(!MATERIALS.contains("poster"));
    }

    #[test]
    fn test_aliases_are_unique_per_map() {
        let mut seen = std::collections::HashSet::new();
        for (_, aliases) in COLLECTION.entries {
            for alias in *aliases {
                assert!(seen.insert(alias.to_uppercase()), "duplicate alias {alias}");
            }
        }
    }
}
