//! Value parsers.
//!
//! Pure functions that clean, validate and coerce subfield strings. Every
//! failure is a [`RuleError`] carrying the offending subfield code, so rules
//! can propagate parser failures with `?`.
//!
//! The universal entry point is [`clean_val`], a small builder over one
//! subfield of a field:
//!
//! ```
//! use mrrc_ingest::parsers::clean_val;
//! use mrrc_ingest::RawField;
//!
//! let field = RawField::data("260", ' ', ' ').subfield('c', " 2013 ");
//! let subfields = field.subfields().unwrap();
//!
//! let date = clean_val('c', subfields).required().string().unwrap();
//! assert_eq!(date.as_deref(), Some("2013"));
//! assert!(clean_val('b', subfields).required().string().is_err());
//! ```

pub mod codes;
pub mod dates;
pub mod pages;
pub mod url;
pub mod volume;

pub use codes::{country_alpha3, language_alpha3};
pub use dates::{get_week_start, parse_date, parse_year_week};
pub use pages::{clean_pages_range, extract_parts, is_excluded, Parts};
pub use url::{classify_url, UrlClass};
pub use volume::{extract_volume_info, extract_volume_number, VolumeInfo};

use crate::error::RuleError;
use crate::record::{SubfieldValue, Subfields};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RE_WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// String transformation applied after cleaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Lowercase the value.
    Lower,
    /// Uppercase the value.
    Upper,
    /// Capitalise the first letter of every word.
    Title,
}

impl Transform {
    fn apply(self, value: &str) -> String {
        match self {
            Transform::Lower => value.to_lowercase(),
            Transform::Upper => value.to_uppercase(),
            Transform::Title => value
                .split(' ')
                .map(|word| {
                    let mut chars = word.chars();
                    match chars.next() {
                        Some(first) => first
                            .to_uppercase()
                            .chain(chars.flat_map(char::to_lowercase))
                            .collect(),
                        None => String::new(),
                    }
                })
                .collect::<Vec<String>>()
                .join(" "),
        }
    }
}

/// Clean one string value.
///
/// The regex, if any, must match at the start of the raw value. Whitespace is
/// stripped; an empty result is `None`, or [`MissingRequiredField`] when
/// `required` is set.
///
/// Errors carry no subfield; [`clean_val`] fills it in.
///
/// # Errors
///
/// `UnexpectedValue` on a regex mismatch, `MissingRequiredField` on an empty
/// required value.
///
/// [`MissingRequiredField`]: crate::ErrorKind::MissingRequiredField
pub fn clean_str(
    value: &str,
    regex: Option<&Regex>,
    required: bool,
    transform: Option<Transform>,
) -> Result<Option<String>, RuleError> {
    if let Some(re) = regex {
        if !re.find(value).is_some_and(|m| m.start() == 0) {
            return Err(RuleError::unexpected_field());
        }
    }
    let cleaned = value.trim();
    if cleaned.is_empty() {
        if required {
            return Err(RuleError {
                kind: crate::ErrorKind::MissingRequiredField,
                subfield: None,
                message: None,
                key: None,
            });
        }
        return Ok(None);
    }
    Ok(Some(match transform {
        Some(t) => t.apply(cleaned),
        None => cleaned.to_string(),
    }))
}

/// Builder returned by [`clean_val`].
#[derive(Debug, Clone)]
pub struct CleanVal<'a> {
    code: char,
    subfields: &'a Subfields,
    required: bool,
    default: Option<&'a str>,
    manual: bool,
    regex: Option<&'a Regex>,
    transform: Option<Transform>,
}

/// Start cleaning subfield `code` of a field.
#[must_use]
pub fn clean_val(code: char, subfields: &Subfields) -> CleanVal<'_> {
    CleanVal {
        code,
        subfields,
        required: false,
        default: None,
        manual: false,
        regex: None,
        transform: None,
    }
}

impl<'a> CleanVal<'a> {
    /// Fail with `MissingRequiredField` when absent or empty.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Value returned when the subfield is absent.
    #[must_use]
    pub fn default(mut self, value: &'a str) -> Self {
        self.default = Some(value);
        self
    }

    /// Fail with `ManualImportRequired` when the subfield carries a value.
    #[must_use]
    pub fn manual(mut self) -> Self {
        self.manual = true;
        self
    }

    /// Require values to match `regex` at their start.
    #[must_use]
    pub fn regex(mut self, regex: &'a Regex) -> Self {
        self.regex = Some(regex);
        self
    }

    /// Transform the cleaned value.
    #[must_use]
    pub fn transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    fn code_str(&self) -> String {
        self.code.to_string()
    }

    fn locate(&self, mut err: RuleError) -> RuleError {
        if err.subfield.is_none() {
            err.subfield = Some(self.code_str());
        }
        err
    }

    fn check_presence(&self) -> Result<Option<&'a SubfieldValue>, RuleError> {
        let raw = self.subfields.get(self.code);
        if self.manual && raw.is_some_and(|v| !v.first().trim().is_empty()) {
            return Err(RuleError::manual(&self.code_str()));
        }
        if raw.is_none() && self.required && self.default.is_none() {
            return Err(RuleError::missing(&self.code_str()));
        }
        Ok(raw)
    }

    fn clean_one(&self, value: &str) -> Result<Option<String>, RuleError> {
        clean_str(value, self.regex, self.required, self.transform).map_err(|e| self.locate(e))
    }

    /// Single string value. A repeated subfield is an `UnexpectedValue`.
    ///
    /// # Errors
    ///
    /// See [`clean_str`]; also `ManualImportRequired` in manual mode.
    pub fn string(self) -> Result<Option<String>, RuleError> {
        match self.check_presence()? {
            None => Ok(self.default.map(str::to_string)),
            Some(SubfieldValue::Many(_)) => Err(RuleError::unexpected(&self.code_str())),
            Some(SubfieldValue::One(v)) => self.clean_one(v),
        }
    }

    /// Every value of a possibly repeated subfield, empty ones dropped.
    ///
    /// # Errors
    ///
    /// See [`clean_str`].
    pub fn strings(self) -> Result<Vec<String>, RuleError> {
        match self.check_presence()? {
            None => Ok(self.default.map(str::to_string).into_iter().collect()),
            Some(value) => {
                let mut out = Vec::new();
                for v in value.values() {
                    if let Some(cleaned) = self.clean_one(v)? {
                        out.push(cleaned);
                    }
                }
                Ok(out)
            },
        }
    }

    /// Integer value.
    ///
    /// # Errors
    ///
    /// `UnexpectedValue` when the value is not a decimal integer.
    pub fn int(self) -> Result<Option<i64>, RuleError> {
        let code = self.code_str();
        match self.string()? {
            None => Ok(None),
            Some(v) => v
                .parse::<i64>()
                .map(Some)
                .map_err(|_| RuleError::unexpected(&code)),
        }
    }

    /// True when the subfield is present with a non-empty value.
    ///
    /// # Errors
    ///
    /// Only in manual or required mode.
    pub fn flag(self) -> Result<bool, RuleError> {
        Ok(self
            .check_presence()?
            .is_some_and(|v| v.values().iter().any(|s| !s.trim().is_empty())))
    }
}

/// Normalise a legacy CERN email (`"jdoe [CERN]"`) to `jdoe@cern.ch`.
#[must_use]
pub fn clean_email(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(
        trimmed
            .replace(" [CERN]", "@cern.ch")
            .replace("[CERN]", "@cern.ch"),
    )
}

/// Render a CERN email in the legacy `name [CERN]` notation.
#[must_use]
pub fn to_legacy_email(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(match trimmed.strip_suffix("@cern.ch") {
        Some(name) => format!("{name} [CERN]"),
        None => trimmed.to_string(),
    })
}

/// Collapse runs of whitespace into single spaces and trim.
#[must_use]
pub fn collapse_whitespace(value: &str) -> String {
    RE_WHITESPACE.replace_all(value.trim(), " ").to_string()
}

/// Strip trailing ISBD punctuation (` /`, ` :`, `.`, `,`, `;`).
#[must_use]
pub fn strip_trailing_punctuation(value: &str) -> String {
    value
        .trim()
        .trim_end_matches(|c: char| matches!(c, '/' | ':' | ';' | ',' | '.') || c.is_whitespace())
        .to_string()
}
