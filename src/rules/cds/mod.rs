//! Rules for records exported by the CDS catalogue (agency `SzGeCERN`).
//!
//! [`base`] holds the rules every CDS document model inherits. The other
//! modules are model layers stacked on top of it ([`book`], [`standard`]) or
//! standalone sets that reuse some base functions ([`journal`],
//! [`multipart`], [`serial`]).

pub mod base;
pub mod book;
pub mod journal;
pub mod multipart;
pub mod serial;
pub mod standard;

/// Keys that CDS records carry without any translation.
pub const CDS_IGNORE_FIELDS: &[&str] = &[
    "003", "005", "020__q", "020__c", "020__b", "020__C", "0248_a", "0248_p", "041__h", "035__z",
    "037__c", "050__b", "050_4b", "082002", "082042", "0820_2", "082__2", "084__a", "084__2",
    "100__9", "111__d", "111__f", "145__a", "246__i", "269__a", "269__b", "269__c", "270__m",
    "300__b", "340__a", "440_3a", "541__9", "541__a", "541__h", "502__a", "502__b", "502__c",
    "502__d", "5208_a", "520__9", "536__a", "536__c", "536__f", "540__b", "540__f", "595__z",
    "595__9", "596__a", "597__a", "650172", "65017a", "650272", "65027a", "690__c", "694__9",
    "694__a", "695__2", "695__a", "700__9", "710__5", "773__r", "773__w", "773__z", "775__c",
    "852__c", "852__h", "852__p", "8564_8", "8564_s", "8564_x", "900__s", "900__u", "900__y",
    "901__a", "901__u", "916__a", "916__d", "916__e", "916__y", "940__u", "961__c", "961__h",
    "961__l", "961__x", "962__b", "962__n", "963__a", "964__a", "970__a", "970__d", "980__c",
    "981__a",
];

/// Extra keys ignored by the generic document and book models.
pub const DOCUMENT_IGNORE_FIELDS: &[&str] = &[
    "020__b", "0247_9", "270__b", "540__u", "700__i", "700__m", "100__m", "775__n", "775__p",
];

/// Union of two ignore lists.
#[must_use]
pub fn ignore_fields(extra: &[&'static str]) -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = CDS_IGNORE_FIELDS.to_vec();
    keys.extend(extra.iter().filter(|k| !CDS_IGNORE_FIELDS.contains(k)));
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignore_union_has_no_duplicates() {
        assert!(CDS_IGNORE_FIELDS.contains(&"005"));
        assert!(!CDS_IGNORE_FIELDS.contains(&"0247_9"));
        let keys = ignore_fields(&["005", "0247_9"]);
        assert_eq!(keys.len(), CDS_IGNORE_FIELDS.len() + 1);
        assert!(keys.contains(&"0247_9"));
        assert_eq!(keys.iter().filter(|k| **k == "005").count(), 1);
    }
}
