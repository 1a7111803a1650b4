//! Physical extent (`300__$a`) and page range parsing.

use crate::error::RuleError;
use lazy_static::lazy_static;
use regex::Regex;

/// Page counts at or above this value are rejected as typos.
pub const MAX_PAGES_NUMBER: u32 = 8192;

const EXCLUDED: &[&str] = &[
    "mul. p",
    "mult p",
    "mult. p",
    "mult. p.",
    "multi p",
    "multi pages",
];

const DASHES: &str = "\\-\u{2010}\u{2011}\u{2012}\u{2013}\u{2014}\u{2015}\u{207B}\u{208B}\u{2212}\u{FE58}\u{FE63}\u{FF0D}";

lazy_static! {
    static ref RE_PAGES: Regex = Regex::new(r"(?i)([0-9]+) *p").unwrap();
    static ref RE_PHYSICAL: Regex =
        Regex::new(r"(?i)\b([0-9]+ (?:CD-ROM|DVD-ROM|DVD|CD|diskette|VHS))").unwrap();
    static ref RE_BENIGN: Regex =
        Regex::new(r"(?i)^(?:[ivxlcdm]+|ill\.?|illus\.?|fig\.?|figs\.?|[0-9]+ ?cm\.?|suppl\.?)$").unwrap();
    static ref RE_PAGE_RANGE: Regex =
        Regex::new(&format!(r"^[0-9]+(?:[{DASHES}]*[0-9]*)$")).unwrap();
    static ref RE_DASHES: Regex = Regex::new(&format!(r"[{DASHES}]+")).unwrap();
    static ref RE_VOLUMES: Regex = Regex::new(r"(?i)^([0-9]+) *v(?:ol)?s?\.?$").unwrap();
}

/// True for extents that carry no usable page information.
#[must_use]
pub fn is_excluded(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    v.is_empty() || EXCLUDED.contains(&v.as_str())
}

/// Page count when `value` mentions exactly one `NNN p` below the maximum.
#[must_use]
pub fn extract_number_of_pages(value: &str) -> Option<u32> {
    let found: Vec<u32> = RE_PAGES
        .captures_iter(value)
        .filter_map(|c| c.get(1).and_then(|m| m.as_str().parse().ok()))
        .collect();
    match found.as_slice() {
        [pages] if *pages < MAX_PAGES_NUMBER => Some(*pages),
        _ => None,
    }
}

/// Accompanying material (`2 CD-ROM, 1 DVD`), uppercased.
#[must_use]
pub fn extract_physical_description(value: &str) -> Option<String> {
    let found: Vec<&str> = RE_PHYSICAL
        .captures_iter(value)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();
    if found.is_empty() {
        None
    } else {
        Some(found.join(", ").to_uppercase())
    }
}

/// Parsed physical extent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parts {
    /// Number of pages, as decimal digits.
    pub number_of_pages: Option<String>,
    /// Accompanying material.
    pub physical_description: Option<String>,
    /// Some part was neither pages, material, nor a known harmless note.
    pub has_extra: bool,
}

/// Split an extent statement on `+ ; , :` and classify its parts.
#[must_use]
pub fn extract_parts(value: &str) -> Parts {
    let has_extra = value
        .split(['+', ';', ',', ':'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .any(|part| {
            !(RE_PAGES.is_match(part)
                || RE_PHYSICAL.is_match(part)
                || RE_BENIGN.is_match(part)
                || is_excluded(part))
        });
    Parts {
        number_of_pages: extract_number_of_pages(value).map(|p| p.to_string()),
        physical_description: extract_physical_description(value),
        has_extra,
    }
}

/// Number of volumes from an extent such as `"3 v"` or `"2 vols."`.
#[must_use]
pub fn extract_number_of_volumes(value: &str) -> Option<String> {
    RE_VOLUMES
        .captures(value.trim())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Validate a page or page range, normalising dash variants to `-`.
///
/// # Errors
///
/// `UnexpectedValue(subfield)` when the value is not `N` or `N-M`.
pub fn clean_pages_range(value: &str, subfield: &str) -> Result<Option<String>, RuleError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if !RE_PAGE_RANGE.is_match(trimmed) {
        return Err(RuleError::unexpected(subfield));
    }
    let pages: Vec<&str> = RE_DASHES.split(trimmed).filter(|p| !p.is_empty()).collect();
    Ok(Some(pages.join("-")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excluded() {
        assert!(is_excluded(""));
        assert!(is_excluded(" Mult. p "));
        assert!(!is_excluded("42 p"));
    }

    #[test]
    fn test_pages_with_material() {
        let parts = extract_parts("480 p. ; 1 CD-ROM suppl");
        assert_eq!(parts.number_of_pages.as_deref(), Some("480"));
        assert_eq!(parts.physical_description.as_deref(), Some("1 CD-ROM"));
        assert!(!parts.has_extra);
    }

    #[test]
    fn test_several_materials() {
        let parts = extract_parts("42 p. ; 2 CD-ROM ; 1 DVD, 1 vhs");
        assert_eq!(parts.number_of_pages.as_deref(), Some("42"));
        assert_eq!(parts.physical_description.as_deref(), Some("2 CD-ROM, 1 DVD, 1 VHS"));
        assert!(!parts.has_extra);
    }

    #[test]
    fn test_ambiguous_pages() {
        let parts = extract_parts("42 p. + 17 p");
        assert_eq!(parts.number_of_pages, None);
        assert_eq!(extract_parts("2 v").number_of_pages, None);
        assert_eq!(extract_number_of_pages("9000 p"), None);
    }

    #[test]
    fn test_extra_part() {
        assert!(extract_parts("480 p. ; a poster").has_extra);
        assert!(!extract_parts("xii, 480 p. : ill. ; 24 cm").has_extra);
    }

    #[test]
    fn test_number_of_volumes() {
        assert_eq!(extract_number_of_volumes("3 v").as_deref(), Some("3"));
        assert_eq!(extract_number_of_volumes("2 vols.").as_deref(), Some("2"));
        assert_eq!(extract_number_of_volumes("300 p"), None);
    }

    #[test]
    fn test_pages_range() {
        assert_eq!(clean_pages_range("1692-1695", "c").unwrap().as_deref(), Some("1692-1695"));
        assert_eq!(clean_pages_range("12\u{2013}20", "c").unwrap().as_deref(), Some("12-20"));
        assert_eq!(clean_pages_range("7", "c").unwrap().as_deref(), Some("7"));
        assert_eq!(clean_pages_range("", "c").unwrap(), None);
        assert!(clean_pages_range("pp. 7", "c").is_err());
    }
}
