//! Volume token recognition.
//!
//! Catalogue data names volumes in many ways: `v.1`, `Vol. 2`, `pt 3`,
//! `Tome IV`, `Bd. 2a`, `suppl A`. Both functions here reduce such a marker
//! to its bare token (`1`, `2`, `3`, `IV`, `2a`, `A`), which is the key used
//! to correlate volume data arriving through different tags.

use crate::error::RuleError;
use lazy_static::lazy_static;
use regex::Regex;

const PREFIX: &str = r"(?:(?:[Vv](?:ol(?:ume)?)?|[Pp](?:art(?:ie)?|t)?|[Tt](?:eil)?|[Bb]d|[Tt]ome?|course|conference|fasc(?:icule)?|book|unit|suppl|Tafeln|Tomo)[\s\.]*)";
const ROMAN: &str = r"(?:(?:IX|IV|V?I{1,3})|X{1,3}(?:IX|IV|V?I{0,3}))";
const SPECIAL: &str = r"[^0-9A-Za-zÀ-ÿ\-/]";

fn suffix() -> String {
    format!(r"([0-9]{{1,4}}|[0-9][0-9]?[a-zA-Z]|[a-zA-Z][0-9]|[A-H]|{ROMAN})")
}

lazy_static! {
    static ref RE_VOLUME_MATCH: Regex = Regex::new(&format!(
        r"^(?:^|{SPECIAL}){PREFIX}?{}(?:$|{SPECIAL})",
        suffix()
    ))
    .unwrap();
    static ref RE_VOLUME_SEARCH: Regex = Regex::new(&format!(
        r"(?:^|{SPECIAL}){PREFIX}?{}(?:$|{SPECIAL})",
        suffix()
    ))
    .unwrap();
    static ref RE_VOLUME_INFO: Regex =
        Regex::new(&format!(r"(.*?)\({PREFIX}?{}\)", suffix())).unwrap();
}

/// Extract the bare volume token from a marker such as `"v.1"`.
///
/// With `search` the marker may appear anywhere in the value; otherwise it
/// must open the value.
///
/// # Errors
///
/// `MissingRequiredField` when nothing matches and `raise` is set.
pub fn extract_volume_number(
    value: &str,
    search: bool,
    raise: Option<&str>,
) -> Result<Option<String>, RuleError> {
    let re: &Regex = if search {
        &RE_VOLUME_SEARCH
    } else {
        &RE_VOLUME_MATCH
    };
    if let Some(token) = re
        .captures(value.trim())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
    {
        return Ok(Some(token));
    }
    match raise {
        Some(subfield) => {
            Err(RuleError::missing(subfield).with_message("failed to parse volume number"))
        },
        None => Ok(None),
    }
}

/// Description and volume token split out of `"description (v.N)"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeInfo {
    /// Text before the parenthesised marker.
    pub description: String,
    /// Bare volume token.
    pub volume: String,
}

/// Split `"print version (v.2)"` into description and volume token.
#[must_use]
pub fn extract_volume_info(value: &str) -> Option<VolumeInfo> {
    let caps = RE_VOLUME_INFO.captures(value.trim())?;
    Some(VolumeInfo {
        description: caps.get(1).map_or("", |m| m.as_str()).trim().to_string(),
        volume: caps.get(2)?.as_str().to_string(),
    })
}
